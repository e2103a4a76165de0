//! 业务模型
//!
//! 与 `entity` 中的数据库实体分离，所有请求/响应模型导出 TypeScript 定义。

pub mod assignments;
pub mod auth;
pub mod avatars;
pub mod catalog;
pub mod common;
pub mod dashboard;
pub mod files;
pub mod gamification;
pub mod people;
pub mod profiles;
pub mod rpc;
pub mod schools;
pub mod store;
pub mod system;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, Rejection};

/// 应用启动时间，用于健康检查计算运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 定义以固定字符串在线上传输的枚举
///
/// 生成 `as_str`、`all`、`Display` 与 `FromStr`，序列化使用给定字符串。
#[macro_export]
macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal,)*
        }
    ) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, ts_rs::TS,
        )]
        $(#[$meta])*
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)*
                }
            }

            pub const fn all() -> &'static [$name] {
                &[$($name::$variant,)*]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)*
                    _ => Err(format!("Invalid {}: {s}", stringify!($name))),
                }
            }
        }
    };
}

/// 统一业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    NotFound = 1001,
    Conflict = 1002,
    RateLimitExceeded = 1003,
    Forbidden = 1004,
    ServiceUnavailable = 1005,
    InternalServerError = 1500,

    // 认证 / 租户
    Unauthorized = 2000,
    AuthFailed = 2001,
    AccountInactive = 2002,
    PasswordResetTokenInvalid = 2003,
    NoSchoolAssociated = 2004,
    SchoolScopeMismatch = 2005,
    SchoolIdRequired = 2006,

    // 账户
    ProfileNotFound = 3000,
    ProfileEmailInvalid = 3001,
    ProfileEmailAlreadyExists = 3002,
    ProfilePasswordInvalid = 3003,
    ProfileNameInvalid = 3004,
    CanNotDeleteCurrentUser = 3005,
    ProfileCreationFailed = 3006,
    ProfileUpdateFailed = 3007,

    // 学校 / 教学目录
    SchoolNotFound = 4000,
    SchoolAlreadyExists = 4001,
    CourseNotFound = 4002,
    CourseAlreadyExists = 4003,
    SubjectNotFound = 4004,
    SubjectAlreadyExists = 4005,
    ClassNotFound = 4006,
    ClassAlreadyExists = 4007,
    CrossSchoolReference = 4008,

    // 人员 / 任课关系
    TeacherNotFound = 5000,
    StudentNotFound = 5001,
    GuardianNotFound = 5002,
    RegistrationAlreadyExists = 5003,
    AssignmentNotFound = 5004,
    AssignmentAlreadyExists = 5005,

    // 游戏化
    XpRuleNotFound = 6000,
    XpRuleInactive = 6001,
    EconomyConfigInvalid = 6002,
    InsufficientAtoms = 6003,
    AvatarNotFound = 6004,
    AvatarLocked = 6005,
    AvatarAlreadyExists = 6006,

    // 商店
    ProductNotFound = 7000,
    ProductUnavailable = 7001,
    OutOfStock = 7002,
    StoreDisabled = 7003,
    OrderNotFound = 7004,
    OrderNotPending = 7005,
    OrderInvalid = 7006,
    ProductInUse = 7007,

    // 文件
    FileNotFound = 8000,
    FileUploadFailed = 8001,
    FileTypeNotAllowed = 8002,
    FileSizeExceeded = 8003,
    MultifileUploadNotAllowed = 8004,

    // RPC
    RpcProcedureNotFound = 9000,
    RpcArgumentsInvalid = 9001,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_groups() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::Unauthorized as i32 / 1000, 2);
        assert_eq!(ErrorCode::InsufficientAtoms as i32 / 1000, 6);
        assert_eq!(ErrorCode::OrderNotPending as i32 / 1000, 7);
        assert_eq!(ErrorCode::RpcArgumentsInvalid as i32 / 1000, 9);
    }
}
