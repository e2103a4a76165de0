use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{CatalogService, check_course};
use crate::models::{
    ApiResponse, ErrorCode,
    catalog::{
        entities::Subject,
        requests::{
            CatalogListParams, CatalogListQuery, CreateSubjectRequest, UpdateSubjectRequest,
        },
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, SchoolScope, request_scope, write_school},
    write_failure,
};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

fn subject_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::SubjectNotFound,
        "Subject not found",
    )
}

fn invalid_workload(hours: Option<i32>) -> Option<HttpResponse> {
    hours.filter(|h| *h <= 0).map(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "workload_hours must be greater than 0",
        )
    })
}

const SUBJECT_EXISTS: &str = "A subject with this name already exists in this school";

async fn subject_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Subject>> {
    let subject = or_internal(
        "Failed to retrieve subject",
        storage.get_subject_by_id(id).await,
    )?;
    Ok(subject.filter(|s| scope.permits(s.school_id)))
}

impl CatalogService {
    pub async fn list_subjects(
        &self,
        query: CatalogListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let list_query = CatalogListQuery::from_params(query, scope.school_id());
        match storage.list_subjects(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Subject list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve subject list", e)),
        }
    }

    pub async fn create_subject(
        &self,
        subject: CreateSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, subject.school_id).await?;

        if let Err(msg) = validate_name(&subject.name) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }
        if let Some(resp) = invalid_workload(subject.workload_hours) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        if let Some(resp) = check_course(&*storage, school_id, subject.course_id).await? {
            return Ok(resp);
        }

        match storage.create_subject(school_id, subject).await {
            Ok(subject) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(subject, "Subject created")))
            }
            Err(e) => Ok(write_failure(
                "Subject creation failed",
                e,
                ErrorCode::SubjectAlreadyExists,
                SUBJECT_EXISTS,
            )),
        }
    }

    pub async fn get_subject(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match subject_in_scope(&*storage, id, scope).await? {
            Some(subject) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                subject,
                "Subject retrieved successfully",
            ))),
            None => Ok(subject_not_found()),
        }
    }

    pub async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(existing) = subject_in_scope(&*storage, id, scope).await? else {
            return Ok(subject_not_found());
        };
        if let Some(ref name) = update.name
            && let Err(msg) = validate_name(name)
        {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }
        if let Some(resp) = invalid_workload(update.workload_hours) {
            return Ok(resp);
        }
        if let Some(resp) = check_course(&*storage, existing.school_id, update.course_id).await? {
            return Ok(resp);
        }

        match storage.update_subject(id, update).await {
            Ok(Some(subject)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(subject, "Subject updated")))
            }
            Ok(None) => Ok(subject_not_found()),
            Err(e) => Ok(write_failure(
                "Subject update failed",
                e,
                ErrorCode::SubjectAlreadyExists,
                SUBJECT_EXISTS,
            )),
        }
    }

    pub async fn delete_subject(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if subject_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(subject_not_found());
        }
        match storage.delete_subject(id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Subject deleted")))
            }
            Ok(false) => Ok(subject_not_found()),
            Err(e) => Ok(internal_error("Subject deletion failed", e)),
        }
    }
}
