use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::CatalogService;
use crate::models::{
    ApiResponse, ErrorCode,
    catalog::requests::{
        CatalogListParams, CatalogListQuery, CreateCourseRequest, UpdateCourseRequest,
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, SchoolScope, request_scope, write_school},
    write_failure,
};
use crate::utils::validate::validate_name;

fn course_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::CourseNotFound,
        "Course not found",
    )
}

const COURSE_EXISTS: &str = "A course with this name already exists in this school";

impl CatalogService {
    pub async fn list_courses(
        &self,
        query: CatalogListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let list_query = CatalogListQuery::from_params(query, scope.school_id());
        match storage.list_courses(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Course list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve course list", e)),
        }
    }

    pub async fn create_course(
        &self,
        course: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, course.school_id).await?;

        if let Err(msg) = validate_name(&course.name) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }

        let storage = self.get_storage(request)?;
        match storage.create_course(school_id, course).await {
            Ok(course) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course created")))
            }
            Err(e) => Ok(write_failure(
                "Course creation failed",
                e,
                ErrorCode::CourseAlreadyExists,
                COURSE_EXISTS,
            )),
        }
    }

    pub async fn get_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        match or_internal("Failed to retrieve course", storage.get_course_by_id(id).await)? {
            Some(course) if scope.permits(course.school_id) => Ok(HttpResponse::Ok().json(
                ApiResponse::success(course, "Course retrieved successfully"),
            )),
            _ => Ok(course_not_found()),
        }
    }

    pub async fn update_course(
        &self,
        id: i64,
        update: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if !self.course_in_scope(&*storage, id, scope).await? {
            return Ok(course_not_found());
        }
        if let Some(ref name) = update.name
            && let Err(msg) = validate_name(name)
        {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                msg,
            ));
        }

        match storage.update_course(id, update).await {
            Ok(Some(course)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course updated")))
            }
            Ok(None) => Ok(course_not_found()),
            Err(e) => Ok(write_failure(
                "Course update failed",
                e,
                ErrorCode::CourseAlreadyExists,
                COURSE_EXISTS,
            )),
        }
    }

    pub async fn delete_course(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if !self.course_in_scope(&*storage, id, scope).await? {
            return Ok(course_not_found());
        }
        match storage.delete_course(id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Course deleted")))
            }
            Ok(false) => Ok(course_not_found()),
            Err(e) => Ok(internal_error("Course deletion failed", e)),
        }
    }

    async fn course_in_scope(
        &self,
        storage: &dyn crate::storage::Storage,
        id: i64,
        scope: SchoolScope,
    ) -> ActixResult<bool> {
        let course = or_internal(
            "Failed to retrieve course",
            storage.get_course_by_id(id).await,
        )?;
        Ok(course.is_some_and(|c| scope.permits(c.school_id)))
    }
}
