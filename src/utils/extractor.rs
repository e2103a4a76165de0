//! 路径参数安全提取器
//!
//! 在进入处理函数之前拒绝非法的路径参数，统一返回 400 JSON 错误。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(param: &str, detail: &str) -> actix_web::Error {
    let message = format!("Invalid path parameter '{param}': {detail}");
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

fn parse_positive_i64(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(param)
        .ok_or_else(|| bad_path_param(param, "missing"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(bad_path_param(param, "must be a positive integer")),
        Err(_) => Err(bad_path_param(param, "not an integer")),
    }
}

fn parse_token(
    req: &HttpRequest,
    param: &str,
    max_len: usize,
    allowed: fn(char) -> bool,
) -> Result<String, actix_web::Error> {
    let raw = req
        .match_info()
        .get(param)
        .ok_or_else(|| bad_path_param(param, "missing"))?;
    if raw.is_empty() || raw.len() > max_len || !raw.chars().all(allowed) {
        return Err(bad_path_param(param, "contains invalid characters"));
    }
    Ok(raw.to_string())
}

macro_rules! define_safe_i64_extractor {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_i64(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_i64_extractor! {
    SafeIDI64 => "id",
}

/// 文件令牌（UUID 形式）
#[derive(Debug, Clone)]
pub struct SafeFileToken(pub String);

impl FromRequest for SafeFileToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            parse_token(req, "token", 64, |c| c.is_ascii_hexdigit() || c == '-').map(SafeFileToken),
        )
    }
}

/// RPC 过程名（小写字母与下划线）
#[derive(Debug, Clone)]
pub struct SafeProcedureName(pub String);

impl FromRequest for SafeProcedureName {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            parse_token(req, "procedure", 64, |c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
            })
            .map(SafeProcedureName),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_positive_id() {
        let req = TestRequest::default().param("id", "15").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);
    }

    #[actix_web::test]
    async fn test_rejects_zero_and_text() {
        let req = TestRequest::default().param("id", "0").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_file_token() {
        let token = "3f1c9a52-8d7e-4b0a-9f61-2c5d8e7a1b90";
        let req = TestRequest::default().param("token", token).to_http_request();
        assert_eq!(SafeFileToken::extract(&req).await.unwrap().0, token);

        let req = TestRequest::default()
            .param("token", "../etc/passwd")
            .to_http_request();
        assert!(SafeFileToken::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_procedure_name() {
        let req = TestRequest::default()
            .param("procedure", "class_leaderboard")
            .to_http_request();
        assert_eq!(
            SafeProcedureName::extract(&req).await.unwrap().0,
            "class_leaderboard"
        );

        let req = TestRequest::default()
            .param("procedure", "Drop-Table")
            .to_http_request();
        assert!(SafeProcedureName::extract(&req).await.is_err());
    }
}
