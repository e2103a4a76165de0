use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::ProfileService;
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::{
        entities::ProfileStatus,
        requests::{CreateProfileRequest, NewProfile},
    },
};
use crate::services::{error_response, internal_error, write_failure};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password_simple};

pub async fn create_profile(
    service: &ProfileService,
    profile_data: CreateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = profile_data.email.trim().to_lowercase();
    if let Err(msg) = validate_email(&email) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileEmailInvalid,
            msg,
        ));
    }
    if let Err(msg) = validate_name(&profile_data.full_name) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileNameInvalid,
            msg,
        ));
    }
    if let Err(msg) = validate_password_simple(&profile_data.password) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfilePasswordInvalid,
            msg,
        ));
    }

    let password_hash = match hash_password(&profile_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    let storage = service.get_storage(request)?;
    let new_profile = NewProfile {
        email,
        password_hash,
        full_name: profile_data.full_name.trim().to_string(),
        user_type: profile_data.user_type,
        status: ProfileStatus::Active,
        school_id: profile_data.school_id,
        avatar_url: profile_data.avatar_url,
    };

    match storage.create_profile(new_profile).await {
        Ok(profile) => {
            info!("Profile {} created ({})", profile.id, profile.user_type);
            Ok(HttpResponse::Created().json(ApiResponse::success(profile, "Profile created")))
        }
        Err(e) => Ok(write_failure(
            "Profile creation failed",
            e,
            ErrorCode::ProfileEmailAlreadyExists,
            "Email already exists",
        )),
    }
}
