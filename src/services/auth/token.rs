use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use crate::models::auth::responses::{
    MeResponse, RefreshTokenResponse, TokenVerificationResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_profile, error_response, internal_error, tenancy};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

fn expired_session() -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Login expired or invalid, please login again",
        ))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ));
    };

    let claims = match JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            info!("Refresh token rejected: {}", e);
            return Ok(expired_session());
        }
    };
    let Some(profile_id) = claims.profile_id() else {
        return Ok(expired_session());
    };

    // 刷新时重新检查账户状态
    let storage = service.get_storage(request)?;
    let profile = match storage.get_profile_by_id(profile_id).await {
        Ok(Some(profile)) if profile.is_active() => profile,
        Ok(_) => return Ok(expired_session()),
        Err(e) => return Ok(internal_error("Refresh profile lookup failed", e)),
    };

    match JwtUtils::generate_access_token(profile.id, profile.user_type.as_str()) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: JwtUtils::access_token_ttl_secs(),
            },
            "Token refreshed successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to generate access token", e)),
    }
}

pub async fn handle_verify_token(_request: &HttpRequest) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TokenVerificationResponse { is_valid: true },
        "Token is valid",
    )))
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    let school_id = tenancy::caller_school(request, &profile).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MeResponse { profile, school_id },
        "Profile retrieved successfully",
    )))
}
