//! 教师、学生、监护人
//!
//! 创建人员时在同一事务内创建登录账户。未提供初始密码时随机生成，
//! 并且只在创建响应中返回一次。

pub mod guardians;
pub mod students;
pub mod teachers;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::middlewares::require_jwt::forget_cached_profile;
use crate::models::{
    ErrorCode,
    people::entities::{NewLogin, Student},
    profiles::entities::{Profile, UserType},
};
use crate::services::{
    cache_from, error_response, internal_error, or_internal, reject,
    tenancy::{self, Access, request_scope},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_password;
use crate::utils::validate::{validate_email, validate_name, validate_password_simple};

define_service!(PeopleService);

const INITIAL_PASSWORD_LEN: usize = 12;

/// 新人员的登录信息及需要回显的初始密码
pub(crate) struct LoginDraft {
    pub login: NewLogin,
    pub initial_password: Option<String>,
}

/// 校验邮箱、姓名与密码，生成登录账户；失败时返回可直接响应的错误
pub(crate) async fn draft_login(
    storage: &dyn Storage,
    school_id: i64,
    email: &str,
    full_name: &str,
    password: Option<String>,
) -> ActixResult<Result<LoginDraft, HttpResponse>> {
    let email = email.trim().to_lowercase();
    if let Err(msg) = validate_email(&email) {
        return Ok(Err(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileEmailInvalid,
            msg,
        )));
    }
    if let Err(msg) = validate_name(full_name) {
        return Ok(Err(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileNameInvalid,
            msg,
        )));
    }

    let (password, initial_password) = match password {
        Some(password) => {
            if let Err(msg) = validate_password_simple(&password) {
                return Ok(Err(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ProfilePasswordInvalid,
                    msg,
                )));
            }
            (password, None)
        }
        None => {
            let generated = generate_password(INITIAL_PASSWORD_LEN);
            (generated.clone(), Some(generated))
        }
    };

    let taken = or_internal(
        "Failed to check email",
        storage.get_profile_by_email(&email).await,
    )?;
    if taken.is_some() {
        return Ok(Err(email_taken()));
    }

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => return Ok(Err(internal_error("Password hashing failed", e))),
    };

    Ok(Ok(LoginDraft {
        login: NewLogin {
            email,
            password_hash,
            full_name: full_name.trim().to_string(),
            school_id,
        },
        initial_password,
    }))
}

/// 更新时的邮箱/姓名校验
pub(crate) fn check_identity_update(
    email: Option<&String>,
    full_name: Option<&String>,
) -> Option<HttpResponse> {
    if let Some(email) = email
        && let Err(msg) = validate_email(email)
    {
        return Some(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileEmailInvalid,
            msg,
        ));
    }
    if let Some(name) = full_name
        && let Err(msg) = validate_name(name)
    {
        return Some(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::ProfileNameInvalid,
            msg,
        ));
    }
    None
}

pub(crate) fn email_taken() -> HttpResponse {
    error_response(
        StatusCode::CONFLICT,
        ErrorCode::ProfileEmailAlreadyExists,
        "Email already exists",
    )
}

pub(crate) async fn forget_login(request: &HttpRequest, profile_id: i64) -> ActixResult<()> {
    let cache = cache_from(request)?;
    forget_cached_profile(cache.as_ref(), profile_id).await;
    tenancy::forget_school_of(cache.as_ref(), &[Some(profile_id)]).await;
    Ok(())
}

/// 学生账户对应的学生记录
pub(crate) async fn own_student(storage: &dyn Storage, profile: &Profile) -> ActixResult<Student> {
    or_internal(
        "Failed to retrieve student",
        storage.get_student_by_profile_id(profile.id).await,
    )?
    .ok_or_else(|| {
        reject(
            StatusCode::NOT_FOUND,
            ErrorCode::StudentNotFound,
            "Student not found",
        )
    })
}

/// 学生本人、其监护人、本校教职工可以查看学生数据
pub(crate) async fn student_visible_to(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    student_id: i64,
) -> ActixResult<Option<Student>> {
    let student = or_internal(
        "Failed to retrieve student",
        storage.get_student_by_id(student_id).await,
    )?;
    let Some(student) = student else {
        return Ok(None);
    };

    let visible = match profile.user_type {
        UserType::Student => student.profile_id == profile.id,
        UserType::Guardian => {
            let guardian = or_internal(
                "Failed to retrieve guardian",
                storage.get_guardian_by_profile_id(profile.id).await,
            )?;
            guardian.is_some_and(|g| student.guardian_id == Some(g.id))
        }
        _ => request_scope(request, profile, None, Access::Read)
            .await?
            .permits(student.school_id),
    };
    Ok(visible.then_some(student))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support;

    #[actix_web::test]
    async fn test_draft_login_generates_password_when_missing() {
        let storage = test_support::storage().await;
        let draft = draft_login(&storage, 1, " Prof@Escola.TEST ", "Maria Souza", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(draft.login.email, "prof@escola.test");
        let generated = draft.initial_password.expect("generated password");
        assert_eq!(generated.len(), INITIAL_PASSWORD_LEN);
        assert!(crate::utils::password::verify_password(
            &generated,
            &draft.login.password_hash
        ));
    }

    #[actix_web::test]
    async fn test_draft_login_rejects_bad_email() {
        let storage = test_support::storage().await;
        let resp = draft_login(&storage, 1, "not-an-email", "Maria", None)
            .await
            .unwrap()
            .err()
            .expect("error response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
