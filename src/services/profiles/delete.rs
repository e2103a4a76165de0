use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::ProfileService;
use crate::middlewares::require_jwt::forget_cached_profile;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    cache_from, current_profile, error_response, internal_error, tenancy::forget_school_of,
};

pub async fn delete_profile(
    service: &ProfileService,
    profile_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = current_profile(request)?;
    if current.id == profile_id {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::CanNotDeleteCurrentUser,
            "You cannot delete your own account",
        ));
    }

    let storage = service.get_storage(request)?;
    match storage.delete_profile(profile_id).await {
        Ok(true) => {
            let cache = cache_from(request)?;
            forget_cached_profile(cache.as_ref(), profile_id).await;
            forget_school_of(cache.as_ref(), &[Some(profile_id)]).await;
            info!("Profile {} deleted by {}", profile_id, current.id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Profile deleted")))
        }
        Ok(false) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound,
            "Profile not found",
        )),
        Err(e) => Ok(internal_error("Profile deletion failed", e)),
    }
}
