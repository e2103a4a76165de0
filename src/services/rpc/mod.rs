//! 通用 RPC 转发
//!
//! 过程登记在静态表中，每个过程声明允许调用的角色。参数是 JSON 对象，
//! 按过程各自的参数类型严格解析（不接受未知字段）。

mod procedures;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode, profiles::entities::UserType};
use crate::services::{current_profile, error_response, reject};

define_service!(RpcService);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Procedure {
    ResolveSchoolId,
    StudentBalance,
    ClassLeaderboard,
    SchoolSummary,
}

struct Registration {
    name: &'static str,
    roles: &'static [UserType],
    procedure: Procedure,
}

static REGISTRY: &[Registration] = &[
    Registration {
        name: "resolve_school_id",
        roles: UserType::all(),
        procedure: Procedure::ResolveSchoolId,
    },
    Registration {
        name: "student_balance",
        roles: UserType::all(),
        procedure: Procedure::StudentBalance,
    },
    Registration {
        name: "class_leaderboard",
        roles: UserType::all(),
        procedure: Procedure::ClassLeaderboard,
    },
    Registration {
        name: "school_summary",
        roles: &[UserType::School],
        procedure: Procedure::SchoolSummary,
    },
];

fn lookup(name: &str) -> Option<&'static Registration> {
    REGISTRY.iter().find(|r| r.name == name)
}

/// 按过程的参数类型解析，失败为 400
pub(crate) fn decode_args<T: DeserializeOwned>(args: Value) -> ActixResult<T> {
    serde_json::from_value(args).map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            ErrorCode::RpcArgumentsInvalid,
            format!("Invalid arguments: {e}"),
        )
    })
}

impl RpcService {
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;

        let Some(registration) = lookup(name) else {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::RpcProcedureNotFound,
                format!("Procedure '{name}' not found"),
            ));
        };
        if !registration.roles.contains(&profile.user_type) {
            return Ok(error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "You are not allowed to call this procedure",
            ));
        }
        if !args.is_object() {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::RpcArgumentsInvalid,
                "Arguments must be a JSON object",
            ));
        }

        debug!("RPC {} called by profile {}", name, profile.id);
        let storage = self.get_storage(request)?;
        let result = match registration.procedure {
            Procedure::ResolveSchoolId => {
                procedures::resolve_school_id(&*storage, request, &profile, args).await?
            }
            Procedure::StudentBalance => {
                procedures::student_balance(&*storage, request, &profile, args).await?
            }
            Procedure::ClassLeaderboard => {
                procedures::class_leaderboard(&*storage, request, &profile, args).await?
            }
            Procedure::SchoolSummary => {
                procedures::school_summary(&*storage, request, &profile, args).await?
            }
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Procedure executed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rpc::requests::{ClassLeaderboardArgs, NoArgs, StudentBalanceArgs};
    use serde_json::json;

    #[test]
    fn test_registry_lookup() {
        assert_eq!(
            lookup("class_leaderboard").map(|r| r.procedure),
            Some(Procedure::ClassLeaderboard)
        );
        assert!(lookup("drop_tables").is_none());
        assert!(
            !lookup("school_summary")
                .unwrap()
                .roles
                .contains(&UserType::Student)
        );
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = REGISTRY.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), REGISTRY.len());
    }

    #[test]
    fn test_decode_args() {
        let args: ClassLeaderboardArgs = decode_args(json!({"class_id": 3})).unwrap();
        assert_eq!(args.effective_limit(), ClassLeaderboardArgs::DEFAULT_LIMIT);

        let args: ClassLeaderboardArgs =
            decode_args(json!({"class_id": 3, "limit": 500})).unwrap();
        assert_eq!(args.effective_limit(), ClassLeaderboardArgs::MAX_LIMIT);

        assert!(decode_args::<ClassLeaderboardArgs>(json!({})).is_err());
        assert!(decode_args::<NoArgs>(json!({"extra": 1})).is_err());
        assert!(decode_args::<StudentBalanceArgs>(json!({"student_id": "x"})).is_err());
    }
}
