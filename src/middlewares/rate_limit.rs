/*!
 * 速率限制中间件
 *
 * 固定窗口计数：窗口编号 = 当前秒数 / 窗口长度，计数键包含窗口编号，
 * 窗口切换后自然从零开始，旧键由缓存过期清理。
 *
 * ```rust,ignore
 * web::resource("/login").route(web::post().to(login).wrap(RateLimit::login()))
 * ```
 *
 * 匿名端点按客户端 IP 计数；按账户计数的端点在 JWT 中间件之后挂载，
 * 取不到账户时退回 IP。超限返回 429 与 `Retry-After`。
 *
 * 客户端 IP 取 TCP 对端地址。只有对端在 `server.trusted_proxies` 中时才读取
 * `X-Forwarded-For` / `X-Real-IP`，否则伪造转发头即可绕过限制。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::config::AppConfig;
use crate::models::profiles::entities::Profile;
use crate::models::{ApiResponse, ErrorCode};

// 最长窗口之后键即失效
const MAX_WINDOW_SECS: u64 = 3600;

static WINDOW_COUNTERS: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

/// 计数主体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBy {
    Ip,
    Profile,
}

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
    key_by: KeyBy,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64, key_by: KeyBy) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.clamp(1, MAX_WINDOW_SECS),
            key_prefix,
            key_by,
        }
    }

    /// 5 次/分钟/IP
    pub fn login() -> Self {
        Self::new("login", 5, 60, KeyBy::Ip)
    }

    /// 3 次/分钟/IP
    pub fn password_recovery() -> Self {
        Self::new("password", 3, 60, KeyBy::Ip)
    }

    /// 10 次/分钟/IP
    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60, KeyBy::Ip)
    }

    /// 10 次/分钟/账户
    pub fn file_upload() -> Self {
        Self::new("upload", 10, 60, KeyBy::Profile)
    }

    /// 60 次/分钟/账户
    pub fn rpc() -> Self {
        Self::new("rpc", 60, 60, KeyBy::Profile)
    }

    fn identity(&self, req: &ServiceRequest, trusted_proxies: &[IpAddr]) -> String {
        let profile_id = match self.key_by {
            KeyBy::Profile => req.extensions().get::<Profile>().map(|p| p.id),
            KeyBy::Ip => None,
        };
        match profile_id {
            Some(id) => format!("profile:{id}"),
            None => format!("ip:{}", client_ip(req, trusted_proxies)),
        }
    }
}

/// 当前窗口编号与距窗口结束的秒数
fn current_window(window_secs: u64) -> (u64, u64) {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    (now / window_secs, window_secs - now % window_secs)
}

fn trusted_proxies() -> Vec<IpAddr> {
    AppConfig::get()
        .server
        .trusted_proxies
        .iter()
        .filter_map(|proxy| proxy.trim().parse().ok())
        .collect()
}

/// 客户端 IP
///
/// 对端不受信任时直接使用对端地址。对端是受信任代理时，从 `X-Forwarded-For`
/// 右侧向左取第一个非代理地址（左侧部分由客户端填写，不可信），
/// 没有转发链时退回 `X-Real-IP`。
fn client_ip(req: &ServiceRequest, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = req.peer_addr().map(|addr| addr.ip()) else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

    if let Some(forwarded) = header("X-Forwarded-For")
        && let Some(client) = forwarded
            .split(',')
            .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
            .rev()
            .find(|hop| !trusted_proxies.contains(hop))
    {
        return client.to_string();
    }

    if let Some(real_ip) = header("X-Real-IP").and_then(|v| v.trim().parse::<IpAddr>().ok()) {
        return real_ip.to_string();
    }

    peer.to_string()
}

/// 计数加一并返回加一后的值
async fn hit(key: String) -> u32 {
    WINDOW_COUNTERS
        .entry(key)
        .and_upsert_with(|entry| async move { entry.map_or(1, |e| e.into_value().saturating_add(1)) })
        .await
        .into_value()
}

fn too_many_requests(retry_after: u64, limit: u32) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Limit", limit.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let (window, retry_after) = current_window(limit.window_secs);
            let identity = limit.identity(&req, &trusted_proxies());
            let key = format!("{}:{}:{}", limit.key_prefix, identity, window);
            let count = hit(key.clone()).await;

            if count > limit.max_requests {
                warn!(
                    "Rate limit exceeded for {} ({}/{})",
                    key, count, limit.max_requests
                );
                return Ok(req.into_response(
                    too_many_requests(retry_after, limit.max_requests).map_into_right_body(),
                ));
            }

            let mut res = srv.call(req).await?;
            let remaining = limit.max_requests - count;
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(limit.max_requests),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    #[::core::prelude::v1::test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        assert_eq!(login.key_by, KeyBy::Ip);

        let rpc = RateLimit::rpc();
        assert_eq!(rpc.key_prefix, "rpc");
        assert_eq!(rpc.key_by, KeyBy::Profile);

        assert_eq!(RateLimit::new("x", 1, 0, KeyBy::Ip).window_secs, 1);
    }

    #[::core::prelude::v1::test]
    fn test_current_window_bounds() {
        let (_, retry_after) = current_window(60);
        assert!((1..=60).contains(&retry_after));
    }

    #[actix_web::test]
    async fn test_blocks_after_limit() {
        let app = test::init_service(
            App::new().service(
                web::resource("/ping")
                    .wrap(RateLimit::new("test-block", 2, 3600, KeyBy::Ip))
                    .to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        for expected_remaining in ["1", "0"] {
            let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(
                res.headers().get("x-ratelimit-remaining").and_then(|v| v.to_str().ok()),
                Some(expected_remaining)
            );
        }

        let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key("retry-after"));
    }

    #[actix_web::test]
    async fn test_forwarded_for_from_direct_client_is_ignored() {
        let app = test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new("test-spoof", 2, 3600, KeyBy::Ip))
                    .to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let peer: std::net::SocketAddr = "203.0.113.7:4000".parse().unwrap();
        let mut statuses = Vec::new();
        for i in 0..10 {
            let req = test::TestRequest::post()
                .uri("/login")
                .peer_addr(peer)
                .insert_header(("X-Forwarded-For", format!("10.0.0.{i}")))
                .insert_header(("X-Real-IP", format!("10.0.1.{i}")))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(&statuses[..2], &[StatusCode::OK, StatusCode::OK]);
        assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[::core::prelude::v1::test]
    fn test_client_ip_behind_trusted_proxy() {
        let proxy: IpAddr = "10.1.1.1".parse().unwrap();
        let trusted = [proxy, "10.1.1.2".parse().unwrap()];

        // 最左侧地址由客户端伪造，取右侧第一个非代理地址
        let req = test::TestRequest::get()
            .peer_addr("10.1.1.1:443".parse().unwrap())
            .insert_header(("X-Forwarded-For", "198.51.100.4, 192.0.2.9, 10.1.1.2"))
            .to_srv_request();
        assert_eq!(client_ip(&req, &trusted), "192.0.2.9");

        let req = test::TestRequest::get()
            .peer_addr("10.1.1.1:443".parse().unwrap())
            .insert_header(("X-Real-IP", "192.0.2.30"))
            .to_srv_request();
        assert_eq!(client_ip(&req, &trusted), "192.0.2.30");

        // 非代理对端的转发头不生效
        let req = test::TestRequest::get()
            .peer_addr("192.0.2.50:5555".parse().unwrap())
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_srv_request();
        assert_eq!(client_ip(&req, &trusted), "192.0.2.50");

        let req = test::TestRequest::get().to_srv_request();
        assert_eq!(client_ip(&req, &trusted), "unknown");
    }
}
