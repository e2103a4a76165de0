//! 找回密码
//!
//! 令牌存放在对象缓存 `pwreset:{token}` 中，值为账户 id，一次性使用。
//! 投递在进程外完成：令牌以 info 级别记录，仅开发环境在响应中返回。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::{info, warn};

use crate::cache::{CacheResult, get_json, insert_json};
use crate::models::auth::requests::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::models::auth::responses::ForgotPasswordResponse;
use crate::models::profiles::requests::ProfileChanges;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from, error_response, internal_error};
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_random_code;
use crate::utils::validate::validate_password_simple;

use super::AuthService;

const RESET_TOKEN_LEN: usize = 48;
const FORGOT_MESSAGE: &str = "If the account exists, password reset instructions have been sent";

pub fn reset_cache_key(token: &str) -> String {
    format!("pwreset:{token}")
}

pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request)?;
    let config = service.get_config();
    let email = forgot_request.email.trim().to_lowercase();

    let mut reset_token = None;
    match storage.get_profile_by_email(&email).await {
        Ok(Some(profile)) if profile.is_active() => {
            let token = generate_random_code(RESET_TOKEN_LEN);
            insert_json(
                cache.as_ref(),
                reset_cache_key(&token),
                &profile.id,
                config.auth.password_reset_ttl,
            )
            .await;
            info!(
                "Password reset token issued for profile {}: {}",
                profile.id, token
            );
            reset_token = Some(token);
        }
        Ok(_) => info!("Password reset requested for unknown or inactive account"),
        // 出错时同样返回统一消息
        Err(e) => warn!("Password reset lookup failed: {}", e),
    }

    let response = ForgotPasswordResponse {
        reset_token: reset_token.filter(|_| config.is_development()),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, FORGOT_MESSAGE)))
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_password_simple(&reset_request.new_password) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfilePasswordInvalid,
            msg,
        ));
    }

    let cache = cache_from(request)?;
    let key = reset_cache_key(&reset_request.token);
    let CacheResult::Found(profile_id) = get_json::<i64>(cache.as_ref(), &key).await else {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PasswordResetTokenInvalid,
            "Reset token is invalid or expired",
        ));
    };
    cache.remove(&key).await;

    let password_hash = match hash_password(&reset_request.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    let storage = service.get_storage(request)?;
    let changes = ProfileChanges {
        password_hash: Some(password_hash),
        ..Default::default()
    };
    match storage.update_profile(profile_id, changes).await {
        Ok(Some(_)) => {
            info!("Password reset completed for profile {}", profile_id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Password updated")))
        }
        Ok(None) => Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PasswordResetTokenInvalid,
            "Reset token is invalid or expired",
        )),
        Err(e) => Ok(internal_error("Password reset failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ObjectCache;
    use crate::models::profiles::{
        entities::{ProfileStatus, UserType},
        requests::NewProfile,
    };
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
    use crate::utils::password::verify_password;
    use actix_web::{App, test, web};
    use std::sync::Arc;

    async fn forgot(
        req: HttpRequest,
        body: web::Json<ForgotPasswordRequest>,
    ) -> ActixResult<HttpResponse> {
        AuthService::new_lazy()
            .forgot_password(body.into_inner(), &req)
            .await
    }

    async fn reset(
        req: HttpRequest,
        body: web::Json<ResetPasswordRequest>,
    ) -> ActixResult<HttpResponse> {
        AuthService::new_lazy()
            .reset_password(body.into_inner(), &req)
            .await
    }

    #[actix_web::test]
    async fn test_reset_token_is_single_use() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());
        let profile = storage
            .create_profile(NewProfile {
                email: "reset@escola.test".to_string(),
                password_hash: hash_password("Antiga123").unwrap(),
                full_name: "Reset".to_string(),
                user_type: UserType::School,
                status: ProfileStatus::Active,
                school_id: None,
                avatar_url: None,
            })
            .await
            .unwrap();

        // 直接放入令牌，避免依赖运行环境
        insert_json(cache.as_ref(), reset_cache_key("tok"), &profile.id, 60).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .route("/forgot", web::post().to(forgot))
                .route("/reset", web::post().to(reset)),
        )
        .await;

        let body = serde_json::json!({"token": "tok", "new_password": "NovaSenha9"});
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/reset").set_json(&body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = storage.get_profile_by_id(profile.id).await.unwrap().unwrap();
        assert!(verify_password("NovaSenha9", &stored.password_hash));

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/reset").set_json(&body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 未知邮箱同样返回 200
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/forgot")
                .set_json(serde_json::json!({"email": "ninguem@escola.test"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
