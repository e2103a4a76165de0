/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>` 中的访问令牌，加载对应账户并放入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::scope("/api/v1/courses")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_courses));
 *
 * async fn list_courses(req: HttpRequest) -> HttpResponse {
 *     let profile = RequireJWT::extract_profile(&req);
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取并校验访问令牌（签名、过期、令牌类型）
 * 2. 优先从缓存 `profile:{id}` 读取账户，未命中时查库并回填；
 *    账户被修改或删除时由写入方调用 [`forget_cached_profile`] 清除
 * 3. 非 active 账户视为未认证
 * 4. 任一步失败返回 401 JSON 错误
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::profiles::entities::{Profile, UserType};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 账户缓存键，按账户而非令牌，同一账户的所有会话共享
pub fn profile_cache_key(profile_id: i64) -> String {
    format!("profile:{profile_id}")
}

/// 丢弃账户缓存，状态或类型的修改在下一个请求即生效
pub async fn forget_cached_profile(cache: &dyn ObjectCache, profile_id: i64) {
    cache.remove(&profile_cache_key(profile_id)).await;
}

/// 从请求头中取出 Bearer 令牌
pub fn bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::to_string)
}

async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<Profile, String> {
    let token = bearer_token(req.request())
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let profile_id = claims
        .profile_id()
        .ok_or_else(|| "Invalid profile ID in JWT".to_string())?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .ok_or_else(|| "Cache not configured".to_string())?
        .get_ref()
        .clone();

    let key = profile_cache_key(profile_id);
    match cache.get_raw(&key).await {
        CacheResult::Found(json) => match serde_json::from_str::<Profile>(&json) {
            Ok(profile) => return Ok(profile),
            Err(_) => {
                cache.remove(&key).await;
                debug!("Dropped undecodable cached profile {}", profile_id);
            }
        },
        _ => debug!("Profile {} not cached", profile_id),
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| "Storage not configured".to_string())?
        .get_ref()
        .clone();

    let profile = storage
        .get_profile_by_id(profile_id)
        .await
        .map_err(|_| "Failed to retrieve profile from storage".to_string())?
        .ok_or_else(|| "Profile not found".to_string())?;

    if !profile.is_active() {
        return Err("Profile is not active".to_string());
    }

    // 缓存中不含密码哈希（序列化时跳过）
    if let Ok(json) = serde_json::to_string(&profile) {
        cache
            .insert_raw(key, json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(profile)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(profile) => {
                    debug!("JWT authentication successful for ID: {}", profile.id);
                    req.extensions_mut().insert(profile);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中取出当前账户，须在 RequireJWT 之后调用
    pub fn extract_profile(req: &actix_web::HttpRequest) -> Option<Profile> {
        req.extensions().get::<Profile>().cloned()
    }

    pub fn extract_profile_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<Profile>().map(|p| p.id)
    }

    pub fn extract_user_type(req: &actix_web::HttpRequest) -> Option<UserType> {
        req.extensions().get::<Profile>().map(|p| p.user_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::extract_profile_id(&req) {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_unauthenticated_request_is_rejected() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .service(
                    web::scope("/private")
                        .wrap(RequireJWT)
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/private").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/private")
                .insert_header((AUTHORIZATION_HEADER, "Bearer garbage"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
