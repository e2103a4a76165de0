use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::ProfileService;
use crate::middlewares::require_jwt::forget_cached_profile;
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::requests::{ProfileChanges, UpdateProfileRequest},
};
use crate::services::{
    cache_from, error_response, internal_error, tenancy::forget_school_of, write_failure,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password_simple};

pub async fn update_profile(
    service: &ProfileService,
    profile_id: i64,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Some(ref email) = email
        && let Err(msg) = validate_email(email)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileEmailInvalid,
            msg,
        ));
    }
    if let Some(ref name) = update_data.full_name
        && let Err(msg) = validate_name(name)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileNameInvalid,
            msg,
        ));
    }

    let password_hash = match update_data.password {
        Some(ref password) => {
            if let Err(msg) = validate_password_simple(password) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ProfilePasswordInvalid,
                    msg,
                ));
            }
            match hash_password(password) {
                Ok(hash) => Some(hash),
                Err(e) => return Ok(internal_error("Password hashing failed", e)),
            }
        }
        None => None,
    };

    let storage = service.get_storage(request)?;
    let changes = ProfileChanges {
        email,
        password_hash,
        full_name: update_data.full_name,
        user_type: update_data.user_type,
        status: update_data.status,
        school_id: update_data.school_id,
        avatar_url: update_data.avatar_url,
    };

    match storage.update_profile(profile_id, changes).await {
        Ok(Some(profile)) => {
            // 类型、状态或 school_id 可能改变认证与解析结果
            let cache = cache_from(request)?;
            forget_cached_profile(cache.as_ref(), profile.id).await;
            forget_school_of(cache.as_ref(), &[Some(profile.id)]).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(profile, "Profile updated")))
        }
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound,
            "Profile not found",
        )),
        Err(e) => Ok(write_failure(
            "Profile update failed",
            e,
            ErrorCode::ProfileEmailAlreadyExists,
            "Email already exists",
        )),
    }
}
