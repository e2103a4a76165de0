use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::GamificationService;
use crate::models::{
    ApiResponse, ErrorCode,
    gamification::requests::{SchoolScopedParams, UpdateEconomyRequest},
};
use crate::services::{
    current_profile, error_response, internal_error,
    tenancy::{Access, SchoolScope, request_scope, write_school},
};

fn invalid_economy(update: &UpdateEconomyRequest) -> Option<&'static str> {
    if update.xp_per_atom.is_some_and(|v| v <= 0) {
        return Some("xp_per_atom must be greater than 0");
    }
    if update.max_order_items.is_some_and(|v| v <= 0) {
        return Some("max_order_items must be greater than 0");
    }
    None
}

impl GamificationService {
    pub async fn get_economy(
        &self,
        query: SchoolScopedParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = match request_scope(request, &profile, query.school_id, Access::Read)
            .await?
        {
            SchoolScope::School(id) => id,
            SchoolScope::All => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::SchoolIdRequired,
                    "school_id is required",
                ));
            }
        };

        let storage = self.get_storage(request)?;
        match storage.get_economy_config(school_id).await {
            Ok(config) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                config,
                "Economy configuration retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve economy configuration", e)),
        }
    }

    pub async fn update_economy(
        &self,
        update: UpdateEconomyRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, update.school_id).await?;
        if let Some(msg) = invalid_economy(&update) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::EconomyConfigInvalid,
                msg,
            ));
        }

        let storage = self.get_storage(request)?;
        match storage.update_economy_config(school_id, update).await {
            Ok(config) => {
                info!(
                    "Economy of school {} updated: {} XP per atom, store {}",
                    school_id,
                    config.xp_per_atom,
                    if config.store_enabled { "on" } else { "off" }
                );
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    config,
                    "Economy configuration updated",
                )))
            }
            Err(e) => Ok(internal_error("Economy configuration update failed", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_economy() {
        let ok = UpdateEconomyRequest {
            xp_per_atom: Some(10),
            max_order_items: Some(3),
            ..Default::default()
        };
        assert!(invalid_economy(&ok).is_none());
        assert!(invalid_economy(&UpdateEconomyRequest::default()).is_none());

        let zero = UpdateEconomyRequest {
            xp_per_atom: Some(0),
            ..Default::default()
        };
        assert!(invalid_economy(&zero).is_some());

        let negative_items = UpdateEconomyRequest {
            max_order_items: Some(-1),
            ..Default::default()
        };
        assert!(invalid_economy(&negative_items).is_some());
    }
}
