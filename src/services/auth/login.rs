use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::{info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
};
use crate::services::{error_response, internal_error};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;

const BAD_CREDENTIALS: &str = "Email or password is incorrect";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let email = login_request.email.trim().to_lowercase();

    // 1. 按邮箱查找账户
    let profile = match storage.get_profile_by_email(&email).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Ok(error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::AuthFailed,
                BAD_CREDENTIALS,
            ));
        }
        Err(e) => return Ok(internal_error("Login lookup failed", e)),
    };

    // 2. 校验密码
    if !verify_password(&login_request.password, &profile.password_hash) {
        warn!("Failed login attempt for profile {}", profile.id);
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            BAD_CREDENTIALS,
        ));
    }

    if !profile.is_active() {
        return Ok(error_response(
            StatusCode::FORBIDDEN,
            ErrorCode::AccountInactive,
            "Account is not active",
        ));
    }

    // 3. 更新最后登录时间，失败不影响登录
    if let Err(e) = storage.update_last_login(profile.id).await {
        warn!("Failed to update last login for {}: {}", profile.id, e);
    }

    // 4. 生成令牌对
    let refresh_expiry = JwtUtils::refresh_expiry(login_request.remember_me);
    let token_pair = match profile.generate_token_pair(Some(refresh_expiry)) {
        Ok(pair) => pair,
        Err(e) => return Ok(internal_error("Failed to generate JWT token", e)),
    };

    info!("Profile {} ({}) logged in", profile.id, profile.user_type);

    let refresh_cookie =
        JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_expiry);
    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: service
            .get_config()
            .jwt
            .access_token_expiry
            .saturating_mul(60),
        profile,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
