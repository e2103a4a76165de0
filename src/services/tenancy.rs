//! 学校归属解析与请求作用域
//!
//! 非管理员账户的学校按固定优先级解析：担任校长的学校、作为所有者的学校、
//! 账户自身的 `school_id`、最后是角色表。任一步存储出错即中止。

use actix_web::{HttpRequest, Result as ActixResult, http::StatusCode};
use tracing::{debug, error};

use crate::cache::{CacheResult, ObjectCache, get_json, insert_json};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ErrorCode,
    profiles::entities::{Profile, UserType},
    schools::entities::{ResolutionSource, SchoolResolution},
};
use crate::storage::{SchoolLookup, Storage};

use super::{cache_from, reject, storage_from};

/// 按优先级解析账户所属学校，管理员不属于任何学校
pub async fn resolve_school_id<L: SchoolLookup + ?Sized>(
    lookup: &L,
    profile: &Profile,
) -> Result<Option<SchoolResolution>> {
    if profile.user_type == UserType::Admin {
        return Ok(None);
    }

    let found = |school_id: i64, source: ResolutionSource| {
        Some(SchoolResolution { school_id, source })
    };

    if let Some(id) = lookup.school_id_by_director(profile.id).await? {
        return Ok(found(id, ResolutionSource::Director));
    }
    if let Some(id) = lookup.school_id_by_owner(profile.id).await? {
        return Ok(found(id, ResolutionSource::Owner));
    }
    if let Some(id) = lookup.direct_school_id(profile.id).await? {
        return Ok(found(id, ResolutionSource::Direct));
    }
    if let Some(id) = lookup
        .school_id_by_role(profile.user_type, profile.id)
        .await?
    {
        return Ok(found(id, ResolutionSource::RoleTable));
    }
    Ok(None)
}

pub fn school_cache_key(profile_id: i64) -> String {
    format!("school_of:{profile_id}")
}

/// 带缓存的解析，未命中时查库并缓存结果（包括"无归属"）
pub async fn resolve_cached(
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    profile: &Profile,
) -> Result<Option<SchoolResolution>> {
    let key = school_cache_key(profile.id);
    if let CacheResult::Found(resolution) =
        get_json::<Option<SchoolResolution>>(cache, &key).await
    {
        return Ok(resolution);
    }

    let resolution = resolve_school_id(storage, profile).await?;
    debug!("Resolved school for profile {}: {:?}", profile.id, resolution);
    insert_json(cache, key, &resolution, AppConfig::get().cache.default_ttl).await;
    Ok(resolution)
}

/// 写操作后清除受影响账户的解析缓存
pub async fn forget_school_of(cache: &dyn ObjectCache, profile_ids: &[Option<i64>]) {
    for profile_id in profile_ids.iter().flatten() {
        cache.remove(&school_cache_key(*profile_id)).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// 请求实际作用的学校范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolScope {
    /// 仅管理员读取时可用
    All,
    School(i64),
}

impl SchoolScope {
    pub fn school_id(&self) -> Option<i64> {
        match self {
            SchoolScope::All => None,
            SchoolScope::School(id) => Some(*id),
        }
    }

    /// 记录是否落在作用域内
    pub fn permits(&self, school_id: i64) -> bool {
        match self {
            SchoolScope::All => true,
            SchoolScope::School(id) => *id == school_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDenied {
    NoSchool,
    Mismatch,
    SchoolIdRequired,
}

impl ScopeDenied {
    pub fn into_error(self) -> actix_web::Error {
        match self {
            ScopeDenied::NoSchool => reject(
                StatusCode::FORBIDDEN,
                ErrorCode::NoSchoolAssociated,
                "No school associated with this account",
            ),
            ScopeDenied::Mismatch => reject(
                StatusCode::FORBIDDEN,
                ErrorCode::SchoolScopeMismatch,
                "Requested school does not match your school",
            ),
            ScopeDenied::SchoolIdRequired => reject(
                StatusCode::BAD_REQUEST,
                ErrorCode::SchoolIdRequired,
                "school_id is required",
            ),
        }
    }
}

/// 根据调用者与请求中的 school_id 决定作用域
pub fn decide_scope(
    user_type: UserType,
    resolved: Option<i64>,
    requested: Option<i64>,
    access: Access,
) -> std::result::Result<SchoolScope, ScopeDenied> {
    if user_type == UserType::Admin {
        return match (requested, access) {
            (Some(id), _) => Ok(SchoolScope::School(id)),
            (None, Access::Read) => Ok(SchoolScope::All),
            (None, Access::Write) => Err(ScopeDenied::SchoolIdRequired),
        };
    }

    let Some(school_id) = resolved else {
        return Err(ScopeDenied::NoSchool);
    };
    match requested {
        Some(requested) if requested != school_id => Err(ScopeDenied::Mismatch),
        _ => Ok(SchoolScope::School(school_id)),
    }
}

/// 调用者解析出的学校 id
pub(crate) async fn caller_school(
    request: &HttpRequest,
    profile: &Profile,
) -> ActixResult<Option<i64>> {
    if profile.user_type == UserType::Admin {
        return Ok(None);
    }
    let storage = storage_from(request)?;
    let cache = cache_from(request)?;
    resolve_cached(storage.as_ref(), cache.as_ref(), profile)
        .await
        .map(|r| r.map(|r| r.school_id))
        .map_err(|e| {
            error!("Failed to resolve school for profile {}: {}", profile.id, e);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Internal server error",
            )
        })
}

/// 解析调用者并决定本次请求的作用域
pub(crate) async fn request_scope(
    request: &HttpRequest,
    profile: &Profile,
    requested: Option<i64>,
    access: Access,
) -> ActixResult<SchoolScope> {
    let resolved = caller_school(request, profile).await?;
    decide_scope(profile.user_type, resolved, requested, access).map_err(ScopeDenied::into_error)
}

/// 写操作需要的单个学校
pub(crate) async fn write_school(
    request: &HttpRequest,
    profile: &Profile,
    requested: Option<i64>,
) -> ActixResult<i64> {
    match request_scope(request, profile, requested, Access::Write).await? {
        SchoolScope::School(id) => Ok(id),
        SchoolScope::All => Err(ScopeDenied::SchoolIdRequired.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EscolaError;
    use crate::models::profiles::entities::ProfileStatus;

    #[derive(Default)]
    struct FakeLookup {
        director: Option<i64>,
        owner: Option<i64>,
        direct: Option<i64>,
        role: Option<i64>,
        fail_owner: bool,
    }

    #[async_trait::async_trait]
    impl SchoolLookup for FakeLookup {
        async fn school_id_by_director(&self, _: i64) -> Result<Option<i64>> {
            Ok(self.director)
        }
        async fn school_id_by_owner(&self, _: i64) -> Result<Option<i64>> {
            if self.fail_owner {
                return Err(EscolaError::database_connection("gone"));
            }
            Ok(self.owner)
        }
        async fn direct_school_id(&self, _: i64) -> Result<Option<i64>> {
            Ok(self.direct)
        }
        async fn school_id_by_role(&self, user_type: UserType, _: i64) -> Result<Option<i64>> {
            Ok(match user_type {
                UserType::Teacher | UserType::Student | UserType::Guardian => self.role,
                _ => None,
            })
        }
    }

    fn profile(user_type: UserType) -> Profile {
        let now = chrono::Utc::now();
        Profile {
            id: 9,
            email: "p@escola.test".to_string(),
            password_hash: String::new(),
            full_name: "P".to_string(),
            user_type,
            status: ProfileStatus::Active,
            school_id: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn test_director_wins_over_everything() {
        let lookup = FakeLookup {
            director: Some(1),
            owner: Some(2),
            direct: Some(3),
            role: Some(4),
            ..Default::default()
        };
        let r = resolve_school_id(&lookup, &profile(UserType::School))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.school_id, 1);
        assert_eq!(r.source, ResolutionSource::Director);
    }

    #[actix_web::test]
    async fn test_falls_through_to_role_table() {
        let lookup = FakeLookup {
            role: Some(4),
            ..Default::default()
        };
        let r = resolve_school_id(&lookup, &profile(UserType::Teacher))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.source, ResolutionSource::RoleTable);

        // escola 没有角色表
        let none = resolve_school_id(&lookup, &profile(UserType::School))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[actix_web::test]
    async fn test_direct_before_role_table() {
        let lookup = FakeLookup {
            direct: Some(3),
            role: Some(4),
            ..Default::default()
        };
        let r = resolve_school_id(&lookup, &profile(UserType::Student))
            .await
            .unwrap()
            .unwrap();
        assert_eq!((r.school_id, r.source), (3, ResolutionSource::Direct));
    }

    #[actix_web::test]
    async fn test_admin_never_resolves() {
        let lookup = FakeLookup {
            director: Some(1),
            ..Default::default()
        };
        assert!(
            resolve_school_id(&lookup, &profile(UserType::Admin))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn test_storage_error_aborts_chain() {
        let lookup = FakeLookup {
            direct: Some(3),
            fail_owner: true,
            ..Default::default()
        };
        assert!(
            resolve_school_id(&lookup, &profile(UserType::School))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_decide_scope() {
        use Access::*;
        assert_eq!(
            decide_scope(UserType::Admin, None, None, Read),
            Ok(SchoolScope::All)
        );
        assert_eq!(
            decide_scope(UserType::Admin, None, None, Write),
            Err(ScopeDenied::SchoolIdRequired)
        );
        assert_eq!(
            decide_scope(UserType::Admin, None, Some(5), Write),
            Ok(SchoolScope::School(5))
        );
        assert_eq!(
            decide_scope(UserType::School, Some(5), None, Write),
            Ok(SchoolScope::School(5))
        );
        assert_eq!(
            decide_scope(UserType::School, Some(5), Some(6), Read),
            Err(ScopeDenied::Mismatch)
        );
        assert_eq!(
            decide_scope(UserType::Teacher, None, None, Read),
            Err(ScopeDenied::NoSchool)
        );
    }

    #[test]
    fn test_scope_permits() {
        assert!(SchoolScope::All.permits(3));
        assert!(SchoolScope::School(3).permits(3));
        assert!(!SchoolScope::School(3).permits(4));
    }
}
