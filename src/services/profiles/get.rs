use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ProfileService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, internal_error};

pub async fn get_profile(
    service: &ProfileService,
    profile_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_profile_by_id(profile_id).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            profile,
            "Profile retrieved successfully",
        ))),
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound,
            "Profile not found",
        )),
        Err(e) => Ok(internal_error("Failed to retrieve profile", e)),
    }
}
