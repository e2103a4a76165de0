use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct PeopleListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    pub search: Option<String>,
    /// 仅学生列表使用
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
    /// 仅学生列表使用
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub guardian_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PeopleListQuery {
    pub page: u64,
    pub size: u64,
    pub school_id: Option<i64>,
    pub search: Option<String>,
    pub class_id: Option<i64>,
    pub guardian_id: Option<i64>,
}

impl PeopleListQuery {
    pub fn from_params(params: PeopleListParams, school_id: Option<i64>) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            school_id,
            search: params.search,
            class_id: params.class_id,
            guardian_id: params.guardian_id,
        }
    }
}

// 创建教师（同时创建登录账户）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct CreateTeacherRequest {
    pub school_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    /// 省略时生成随机初始密码
    pub password: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct UpdateTeacherRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct CreateStudentRequest {
    pub school_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub password: Option<String>,
    pub registration: String,
    pub birth_date: Option<String>,
    pub class_id: Option<i64>,
    pub guardian_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct UpdateStudentRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub registration: Option<String>,
    pub birth_date: Option<String>,
    pub class_id: Option<i64>,
    pub guardian_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct CreateGuardianRequest {
    pub school_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub password: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct UpdateGuardianRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
