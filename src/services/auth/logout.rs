use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::require_jwt::{bearer_token, forget_cached_profile};
use crate::models::ApiResponse;
use crate::services::cache_from;
use crate::utils::jwt::JwtUtils;

/// 清除 refresh cookie，并丢弃当前访问令牌所属账户的缓存
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(profile_id) = bearer_token(request)
        .and_then(|token| JwtUtils::verify_access_token(&token).ok())
        .and_then(|claims| claims.profile_id())
    {
        forget_cached_profile(cache_from(request)?.as_ref(), profile_id).await;
    }

    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::<()>::success_empty("Logged out")))
}
