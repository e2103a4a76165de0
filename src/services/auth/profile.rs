use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::middlewares::require_jwt::forget_cached_profile;
use crate::models::auth::requests::UpdateOwnProfileRequest;
use crate::models::profiles::requests::ProfileChanges;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from, current_profile, error_response, internal_error};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_name, validate_password_simple};

use super::AuthService;

/// 自助修改姓名、头像与密码，改密码需要提供当前密码
pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateOwnProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = current_profile(request)?;
    let storage = service.get_storage(request)?;

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
            // 缓存中的账户不含哈希，重新读取
            let stored = match storage.get_profile_by_id(current.id).await {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    return Ok(error_response(
                        StatusCode::NOT_FOUND,
                        ErrorCode::ProfileNotFound,
                        "Profile not found",
                    ));
                }
                Err(e) => return Ok(internal_error("Profile lookup failed", e)),
            };
            let current_ok = update_data
                .current_password
                .as_deref()
                .is_some_and(|p| verify_password(p, &stored.password_hash));
            if !current_ok {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ProfilePasswordInvalid,
                    "Current password is incorrect",
                ));
            }
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

    // 类型、状态与学校只能由管理员修改
    let changes = ProfileChanges {
        full_name: update_data.full_name,
        avatar_url: update_data.avatar_url,
        password_hash,
        ..Default::default()
    };

    match storage.update_profile(current.id, changes).await {
        Ok(Some(profile)) => {
            forget_cached_profile(cache_from(request)?.as_ref(), profile.id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(profile, "Profile updated")))
        }
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::ProfileNotFound,
            "Profile not found",
        )),
        Err(e) => Ok(internal_error("Profile update failed", e)),
    }
}
