use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::GamificationService;
use crate::models::{
    ApiResponse, ErrorCode,
    gamification::{
        entities::XpRule,
        requests::{AwardXpRequest, CreateXpRuleRequest, SchoolScopedParams, UpdateXpRuleRequest},
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal, rejection_response,
    tenancy::{Access, SchoolScope, request_scope, write_school},
};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

/// 单次发放的学生上限
const MAX_AWARD_BATCH: usize = 200;

fn rule_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::XpRuleNotFound,
        "XP rule not found",
    )
}

fn bad_request(msg: &str) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg)
}

fn check_rule_fields(name: Option<&String>, xp_amount: Option<i64>) -> Option<HttpResponse> {
    if let Some(name) = name
        && let Err(msg) = validate_name(name)
    {
        return Some(bad_request(msg));
    }
    if xp_amount.is_some_and(|xp| xp <= 0) {
        return Some(bad_request("xp_amount must be greater than 0"));
    }
    None
}

async fn rule_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<XpRule>> {
    let rule = or_internal(
        "Failed to retrieve XP rule",
        storage.get_xp_rule_by_id(id).await,
    )?;
    Ok(rule.filter(|r| scope.permits(r.school_id)))
}

impl GamificationService {
    pub async fn list_xp_rules(
        &self,
        query: SchoolScopedParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match storage.list_xp_rules(scope.school_id()).await {
            Ok(rules) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                rules,
                "XP rules retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve XP rules", e)),
        }
    }

    pub async fn create_xp_rule(
        &self,
        rule: CreateXpRuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, rule.school_id).await?;
        if let Some(resp) = check_rule_fields(Some(&rule.name), Some(rule.xp_amount)) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        match storage.create_xp_rule(school_id, rule).await {
            Ok(rule) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(rule, "XP rule created")))
            }
            Err(e) => Ok(internal_error("XP rule creation failed", e)),
        }
    }

    pub async fn get_xp_rule(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match rule_in_scope(&*storage, id, scope).await? {
            Some(rule) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                rule,
                "XP rule retrieved successfully",
            ))),
            None => Ok(rule_not_found()),
        }
    }

    pub async fn update_xp_rule(
        &self,
        id: i64,
        update: UpdateXpRuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if rule_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(rule_not_found());
        }
        if let Some(resp) = check_rule_fields(update.name.as_ref(), update.xp_amount) {
            return Ok(resp);
        }

        match storage.update_xp_rule(id, update).await {
            Ok(Some(rule)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(rule, "XP rule updated")))
            }
            Ok(None) => Ok(rule_not_found()),
            Err(e) => Ok(internal_error("XP rule update failed", e)),
        }
    }

    pub async fn delete_xp_rule(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if rule_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(rule_not_found());
        }
        match storage.delete_xp_rule(id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("XP rule deleted")))
            }
            Ok(false) => Ok(rule_not_found()),
            Err(e) => Ok(internal_error("XP rule deletion failed", e)),
        }
    }

    /// 按规则给一组学生发放经验值，任一学生不合法则整体回滚
    pub async fn award_xp(
        &self,
        rule_id: i64,
        award: AwardXpRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if award.student_ids.is_empty() {
            return Ok(bad_request("student_ids must not be empty"));
        }
        if award.student_ids.len() > MAX_AWARD_BATCH {
            return Ok(bad_request("Too many students in a single award"));
        }
        if rule_in_scope(&*storage, rule_id, scope).await?.is_none() {
            return Ok(rule_not_found());
        }

        match storage
            .award_xp(rule_id, &award.student_ids, profile.id, award.note)
            .await
        {
            Ok(Ok(result)) => {
                info!(
                    "XP rule {} awarded to {} students by {}",
                    rule_id,
                    award.student_ids.len(),
                    profile.id
                );
                Ok(HttpResponse::Ok().json(ApiResponse::success(result, "XP awarded")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("XP award failed", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_fields() {
        assert!(check_rule_fields(Some(&"Participação".to_string()), Some(10)).is_none());
        assert!(check_rule_fields(None, Some(0)).is_some());
        assert!(check_rule_fields(Some(&"x".to_string()), None).is_some());
        assert!(check_rule_fields(None, None).is_none());
    }
}
