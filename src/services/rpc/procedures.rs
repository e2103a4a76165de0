//! 已登记的 RPC 过程

use actix_web::{HttpRequest, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::decode_args;
use crate::errors::EscolaError;
use crate::models::{
    ErrorCode,
    profiles::entities::{Profile, UserType},
    rpc::{
        requests::{ClassLeaderboardArgs, NoArgs, StudentBalanceArgs},
        responses::{ClassLeaderboard, StudentBalance},
    },
};
use crate::services::{
    cache_from, or_internal,
    people::{own_student, student_visible_to},
    reject,
    tenancy::{Access, ScopeDenied, caller_school, request_scope, resolve_cached},
};
use crate::storage::Storage;

fn to_json<T: Serialize>(value: T) -> ActixResult<Value> {
    or_internal(
        "RPC result serialization failed",
        serde_json::to_value(value).map_err(|e| EscolaError::serialization(e.to_string())),
    )
}

pub(super) async fn resolve_school_id(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    args: Value,
) -> ActixResult<Value> {
    let NoArgs {} = decode_args(args)?;
    let cache = cache_from(request)?;
    let resolution = or_internal(
        "Failed to resolve school",
        resolve_cached(storage, cache.as_ref(), profile).await,
    )?;
    to_json(resolution)
}

pub(super) async fn student_balance(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    args: Value,
) -> ActixResult<Value> {
    let args: StudentBalanceArgs = decode_args(args)?;
    let student_id = match (args.student_id, profile.user_type) {
        (Some(id), _) => id,
        (None, UserType::Student) => own_student(storage, profile).await?.id,
        (None, _) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                ErrorCode::RpcArgumentsInvalid,
                "student_id is required",
            ));
        }
    };

    let student = student_visible_to(storage, request, profile, student_id)
        .await?
        .ok_or_else(|| {
            reject(
                StatusCode::NOT_FOUND,
                ErrorCode::StudentNotFound,
                "Student not found",
            )
        })?;
    to_json(StudentBalance {
        student_id: student.id,
        xp: student.xp,
        atoms: student.atoms,
    })
}

pub(super) async fn class_leaderboard(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    args: Value,
) -> ActixResult<Value> {
    let args: ClassLeaderboardArgs = decode_args(args)?;
    let scope = request_scope(request, profile, None, Access::Read).await?;

    let class = or_internal(
        "Failed to retrieve class",
        storage.get_class_by_id(args.class_id).await,
    )?
    .filter(|c| scope.permits(c.school_id))
    .ok_or_else(|| {
        reject(
            StatusCode::NOT_FOUND,
            ErrorCode::ClassNotFound,
            "Class not found",
        )
    })?;

    let entries = or_internal(
        "Failed to build leaderboard",
        storage
            .leaderboard(
                Some(class.school_id),
                Some(class.id),
                args.effective_limit(),
            )
            .await,
    )?;
    to_json(ClassLeaderboard {
        class_id: class.id,
        entries,
    })
}

pub(super) async fn school_summary(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    args: Value,
) -> ActixResult<Value> {
    let NoArgs {} = decode_args(args)?;
    let school_id = caller_school(request, profile)
        .await?
        .ok_or_else(|| ScopeDenied::NoSchool.into_error())?;
    let summary = or_internal(
        "Failed to build school summary",
        storage.school_overview(school_id).await,
    )?;
    to_json(summary)
}
