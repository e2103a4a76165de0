use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::{CatalogService, check_course};
use crate::models::{
    ApiResponse, ErrorCode,
    catalog::{
        entities::Class,
        requests::{
            CatalogListParams, CatalogListQuery, CreateClassRequest, UpdateClassRequest,
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

fn class_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::ClassNotFound,
        "Class not found",
    )
}

fn invalid_school_year(year: Option<i32>) -> Option<HttpResponse> {
    year.filter(|y| *y <= 0).map(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "school_year must be greater than 0",
        )
    })
}

const CLASS_EXISTS: &str = "A class with this name already exists in this school";

async fn class_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Class>> {
    let class = or_internal(
        "Failed to retrieve class",
        storage.get_class_by_id(id).await,
    )?;
    Ok(class.filter(|c| scope.permits(c.school_id)))
}

impl CatalogService {
    pub async fn list_classes(
        &self,
        query: CatalogListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let list_query = CatalogListQuery::from_params(query, scope.school_id());
        match storage.list_classes(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Class list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve class list", e)),
        }
    }

    pub async fn create_class(
        &self,
        class: CreateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, class.school_id).await?;

        if let Err(msg) = validate_name(&class.name) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }
        if let Some(resp) = invalid_school_year(Some(class.school_year)) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        if let Some(resp) = check_course(&*storage, school_id, class.course_id).await? {
            return Ok(resp);
        }

        match storage.create_class(school_id, class).await {
            Ok(class) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(class, "Class created")))
            }
            Err(e) => Ok(write_failure(
                "Class creation failed",
                e,
                ErrorCode::ClassAlreadyExists,
                CLASS_EXISTS,
            )),
        }
    }

    pub async fn get_class(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match class_in_scope(&*storage, id, scope).await? {
            Some(class) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                class,
                "Class retrieved successfully",
            ))),
            None => Ok(class_not_found()),
        }
    }

    pub async fn update_class(
        &self,
        id: i64,
        update: UpdateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let Some(existing) = class_in_scope(&*storage, id, scope).await? else {
            return Ok(class_not_found());
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
        if let Some(resp) = invalid_school_year(update.school_year) {
            return Ok(resp);
        }
        if let Some(resp) = check_course(&*storage, existing.school_id, update.course_id).await? {
            return Ok(resp);
        }

        match storage.update_class(id, update).await {
            Ok(Some(class)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(class, "Class updated")))
            }
            Ok(None) => Ok(class_not_found()),
            Err(e) => Ok(write_failure(
                "Class update failed",
                e,
                ErrorCode::ClassAlreadyExists,
                CLASS_EXISTS,
            )),
        }
    }

    pub async fn delete_class(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if class_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(class_not_found());
        }
        match storage.delete_class(id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Class deleted")))
            }
            Ok(false) => Ok(class_not_found()),
            Err(e) => Ok(internal_error("Class deletion failed", e)),
        }
    }
}
