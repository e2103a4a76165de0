use super::entities::{ProfileStatus, UserType};
use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

// 账户查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/profile.ts")]
pub struct ProfileListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub user_type: Option<UserType>,
    pub status: Option<ProfileStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    pub search: Option<String>,
}

// 账户创建请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/profile.ts")]
pub struct CreateProfileRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub user_type: UserType,
    pub school_id: Option<i64>,
    pub avatar_url: Option<String>,
}

// 账户更新请求（管理员）
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/profile.ts")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub user_type: Option<UserType>,
    pub status: Option<ProfileStatus>,
    pub school_id: Option<i64>,
    pub avatar_url: Option<String>,
}

// 账户列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct ProfileListQuery {
    pub page: u64,
    pub size: u64,
    pub user_type: Option<UserType>,
    pub status: Option<ProfileStatus>,
    pub school_id: Option<i64>,
    pub search: Option<String>,
}

impl From<ProfileListParams> for ProfileListQuery {
    fn from(params: ProfileListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            user_type: params.user_type,
            status: params.status,
            school_id: params.school_id,
            search: params.search,
        }
    }
}

// 存储层创建账户（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub user_type: UserType,
    pub status: ProfileStatus,
    pub school_id: Option<i64>,
    pub avatar_url: Option<String>,
}

// 存储层账户更新（密码已哈希）
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub user_type: Option<UserType>,
    pub status: Option<ProfileStatus>,
    pub school_id: Option<i64>,
    pub avatar_url: Option<String>,
}
