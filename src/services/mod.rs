//! 业务服务层
//!
//! 路由处理函数只负责提取参数，具体逻辑由各服务完成。服务通过请求中的
//! `web::Data<Arc<dyn Storage>>` 取得存储，测试时可直接注入。

use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult, error::InternalError, http::StatusCode, web,
};
use std::fmt::Display;
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::EscolaError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, Rejection, profiles::entities::Profile};
use crate::storage::Storage;

/// 生成带可选注入存储的服务结构体
macro_rules! define_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            storage: Option<std::sync::Arc<dyn $crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            #[allow(dead_code)]
            pub fn with_storage(storage: std::sync::Arc<dyn $crate::storage::Storage>) -> Self {
                Self {
                    storage: Some(storage),
                }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> actix_web::Result<std::sync::Arc<dyn $crate::storage::Storage>> {
                match &self.storage {
                    Some(storage) => Ok(storage.clone()),
                    None => $crate::services::storage_from(request),
                }
            }
        }
    };
}

pub mod assignments;
pub mod auth;
pub mod avatars;
pub mod catalog;
pub mod dashboard;
pub mod files;
pub mod gamification;
pub mod people;
pub mod profiles;
pub mod rpc;
pub mod schools;
pub mod store;
pub mod system;
pub mod tenancy;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use avatars::AvatarService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use files::FileService;
pub use gamification::GamificationService;
pub use people::PeopleService;
pub use profiles::ProfileService;
pub use rpc::RpcService;
pub use schools::SchoolService;
pub use store::StoreService;
pub use system::SystemService;

/// 带 JSON 错误体的 actix 错误，可在服务内部用 `?` 直接返回
pub(crate) fn reject(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> actix_web::Error {
    let message = message.into();
    let response = HttpResponse::build(status).json(ApiResponse::error_empty(code, &message));
    InternalError::from_response(message, response).into()
}

pub(crate) fn error_response(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}

/// 记录内部错误，只向客户端返回通用消息
pub(crate) fn internal_error(context: &str, err: impl Display) -> HttpResponse {
    error!("{}: {}", context, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalServerError,
        "Internal server error",
    )
}

/// 写操作失败：唯一约束 409，外键约束 400，其余 500
pub(crate) fn write_failure(
    context: &str,
    err: EscolaError,
    conflict_code: ErrorCode,
    conflict_message: &str,
) -> HttpResponse {
    if err.is_unique_violation() {
        error_response(StatusCode::CONFLICT, conflict_code, conflict_message)
    } else if err.is_foreign_key_violation() {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Referenced record does not exist",
        )
    } else {
        internal_error(context, err)
    }
}

pub(crate) fn rejection_response(rejection: Rejection) -> HttpResponse {
    error_response(
        rejection.status(),
        rejection.error_code(),
        rejection.message(),
    )
}

pub(crate) fn storage_from(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Internal server error",
            )
        })
}

pub(crate) fn cache_from(request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Cache not found in app data");
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Internal server error",
            )
        })
}

/// 当前登录账户，路由未挂 RequireJWT 时视为未认证
pub(crate) fn current_profile(request: &HttpRequest) -> ActixResult<Profile> {
    RequireJWT::extract_profile(request).ok_or_else(|| {
        reject(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Authentication required",
        )
    })
}

/// 存储读失败时转为 500
pub(crate) fn or_internal<T>(
    context: &'static str,
    result: crate::errors::Result<T>,
) -> ActixResult<T> {
    result.map_err(|e| {
        error!("{}: {}", context, e);
        reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            "Internal server error",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_maps_constraint_errors() {
        let unique = EscolaError::database_operation("UNIQUE constraint failed: courses.name");
        let resp = write_failure("x", unique, ErrorCode::CourseAlreadyExists, "exists");
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let fk = EscolaError::database_operation("FOREIGN KEY constraint failed");
        let resp = write_failure("x", fk, ErrorCode::CourseAlreadyExists, "exists");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let other = EscolaError::database_operation("disk I/O error");
        let resp = write_failure("x", other, ErrorCode::CourseAlreadyExists, "exists");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejection_response_status() {
        let resp = rejection_response(Rejection::StoreDisabled);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
