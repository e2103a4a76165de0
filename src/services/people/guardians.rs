use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::{PeopleService, check_identity_update, draft_login, email_taken, forget_login};
use crate::models::{
    ApiResponse, ErrorCode,
    people::{
        entities::Guardian,
        requests::{CreateGuardianRequest, PeopleListParams, PeopleListQuery, UpdateGuardianRequest},
        responses::CreatedPersonResponse,
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, SchoolScope, request_scope, write_school},
    write_failure,
};
use crate::storage::Storage;

fn guardian_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::GuardianNotFound,
        "Guardian not found",
    )
}

async fn guardian_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Guardian>> {
    let guardian = or_internal(
        "Failed to retrieve guardian",
        storage.get_guardian_by_id(id).await,
    )?;
    Ok(guardian.filter(|t| scope.permits(t.school_id)))
}

impl PeopleService {
    pub async fn list_guardians(
        &self,
        query: PeopleListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match storage
            .list_guardians(PeopleListQuery::from_params(query, scope.school_id()))
            .await
        {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Guardian list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve guardian list", e)),
        }
    }

    pub async fn create_guardian(
        &self,
        mut guardian: CreateGuardianRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, guardian.school_id).await?;
        let storage = self.get_storage(request)?;

        let draft = match draft_login(
            &*storage,
            school_id,
            &guardian.email,
            &guardian.full_name,
            guardian.password.take(),
        )
        .await?
        {
            Ok(draft) => draft,
            Err(resp) => return Ok(resp),
        };
        guardian.email = draft.login.email.clone();
        guardian.full_name = draft.login.full_name.clone();

        match storage.create_guardian(draft.login, guardian).await {
            Ok(person) => {
                info!("Guardian {} created in school {}", person.id, school_id);
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    CreatedPersonResponse {
                        person,
                        initial_password: draft.initial_password,
                    },
                    "Guardian created",
                )))
            }
            Err(e) if e.is_unique_violation() => Ok(email_taken()),
            Err(e) => Ok(internal_error("Guardian creation failed", e)),
        }
    }

    pub async fn get_guardian(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match guardian_in_scope(&*storage, id, scope).await? {
            Some(guardian) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                guardian,
                "Guardian retrieved successfully",
            ))),
            None => Ok(guardian_not_found()),
        }
    }

    pub async fn update_guardian(
        &self,
        id: i64,
        mut update: UpdateGuardianRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if guardian_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(guardian_not_found());
        }
        update.email = update.email.map(|e| e.trim().to_lowercase());
        if let Some(resp) = check_identity_update(update.email.as_ref(), update.full_name.as_ref())
        {
            return Ok(resp);
        }

        match storage.update_guardian(id, update).await {
            Ok(Some(guardian)) => {
                forget_login(request, guardian.profile_id).await?;
                Ok(HttpResponse::Ok().json(ApiResponse::success(guardian, "Guardian updated")))
            }
            Ok(None) => Ok(guardian_not_found()),
            Err(e) => Ok(write_failure(
                "Guardian update failed",
                e,
                ErrorCode::ProfileEmailAlreadyExists,
                "Email already exists",
            )),
        }
    }

    pub async fn delete_guardian(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(guardian) = guardian_in_scope(&*storage, id, scope).await? else {
            return Ok(guardian_not_found());
        };
        match storage.delete_guardian(id).await {
            Ok(true) => {
                forget_login(request, guardian.profile_id).await?;
                info!("Guardian {} deleted by {}", id, profile.id);
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Guardian deleted")))
            }
            Ok(false) => Ok(guardian_not_found()),
            Err(e) => Ok(internal_error("Guardian deletion failed", e)),
        }
    }

    /// 监护人查看自己的孩子
    pub async fn list_my_students(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        let guardian = or_internal(
            "Failed to retrieve guardian",
            storage.get_guardian_by_profile_id(profile.id).await,
        )?;
        let Some(guardian) = guardian else {
            return Ok(guardian_not_found());
        };

        match storage.list_students_by_guardian(guardian.id).await {
            Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                students,
                "Students retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve students", e)),
        }
    }
}
