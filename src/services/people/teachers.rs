use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::{PeopleService, check_identity_update, draft_login, email_taken, forget_login};
use crate::models::{
    ApiResponse, ErrorCode,
    people::{
        entities::Teacher,
        requests::{CreateTeacherRequest, PeopleListParams, PeopleListQuery, UpdateTeacherRequest},
        responses::CreatedPersonResponse,
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, SchoolScope, request_scope, write_school},
    write_failure,
};
use crate::storage::Storage;

fn teacher_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::TeacherNotFound,
        "Teacher not found",
    )
}

async fn teacher_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Teacher>> {
    let teacher = or_internal(
        "Failed to retrieve teacher",
        storage.get_teacher_by_id(id).await,
    )?;
    Ok(teacher.filter(|t| scope.permits(t.school_id)))
}

impl PeopleService {
    pub async fn list_teachers(
        &self,
        query: PeopleListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match storage
            .list_teachers(PeopleListQuery::from_params(query, scope.school_id()))
            .await
        {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Teacher list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve teacher list", e)),
        }
    }

    pub async fn create_teacher(
        &self,
        mut teacher: CreateTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, teacher.school_id).await?;
        let storage = self.get_storage(request)?;

        let draft = match draft_login(
            &*storage,
            school_id,
            &teacher.email,
            &teacher.full_name,
            teacher.password.take(),
        )
        .await?
        {
            Ok(draft) => draft,
            Err(resp) => return Ok(resp),
        };
        teacher.email = draft.login.email.clone();
        teacher.full_name = draft.login.full_name.clone();

        match storage.create_teacher(draft.login, teacher).await {
            Ok(person) => {
                info!("Teacher {} created in school {}", person.id, school_id);
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    CreatedPersonResponse {
                        person,
                        initial_password: draft.initial_password,
                    },
                    "Teacher created",
                )))
            }
            Err(e) if e.is_unique_violation() => Ok(email_taken()),
            Err(e) => Ok(internal_error("Teacher creation failed", e)),
        }
    }

    pub async fn get_teacher(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match teacher_in_scope(&*storage, id, scope).await? {
            Some(teacher) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                teacher,
                "Teacher retrieved successfully",
            ))),
            None => Ok(teacher_not_found()),
        }
    }

    pub async fn update_teacher(
        &self,
        id: i64,
        mut update: UpdateTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if teacher_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(teacher_not_found());
        }
        update.email = update.email.map(|e| e.trim().to_lowercase());
        if let Some(resp) = check_identity_update(update.email.as_ref(), update.full_name.as_ref())
        {
            return Ok(resp);
        }

        match storage.update_teacher(id, update).await {
            Ok(Some(teacher)) => {
                forget_login(request, teacher.profile_id).await?;
                Ok(HttpResponse::Ok().json(ApiResponse::success(teacher, "Teacher updated")))
            }
            Ok(None) => Ok(teacher_not_found()),
            Err(e) => Ok(write_failure(
                "Teacher update failed",
                e,
                ErrorCode::ProfileEmailAlreadyExists,
                "Email already exists",
            )),
        }
    }

    pub async fn delete_teacher(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(teacher) = teacher_in_scope(&*storage, id, scope).await? else {
            return Ok(teacher_not_found());
        };
        match storage.delete_teacher(id).await {
            Ok(true) => {
                forget_login(request, teacher.profile_id).await?;
                info!("Teacher {} deleted by {}", id, profile.id);
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Teacher deleted")))
            }
            Ok(false) => Ok(teacher_not_found()),
            Err(e) => Ok(internal_error("Teacher deletion failed", e)),
        }
    }
}
