use super::entities::ClassShift;
use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

/// 课程/学科/班级共用的列表参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct CatalogListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 仅管理员使用，省略时列出所有学校
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_year: Option<i64>,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct CatalogListQuery {
    pub page: u64,
    pub size: u64,
    pub school_id: Option<i64>,
    pub search: Option<String>,
    pub course_id: Option<i64>,
    pub school_year: Option<i64>,
}

impl CatalogListQuery {
    pub fn from_params(params: CatalogListParams, school_id: Option<i64>) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            school_id,
            search: params.search,
            course_id: params.course_id,
            school_year: params.school_year,
        }
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct CreateCourseRequest {
    /// 仅管理员需要指定
    pub school_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct CreateSubjectRequest {
    pub school_id: Option<i64>,
    pub course_id: Option<i64>,
    pub name: String,
    pub workload_hours: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct UpdateSubjectRequest {
    pub course_id: Option<i64>,
    pub name: Option<String>,
    pub workload_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct CreateClassRequest {
    pub school_id: Option<i64>,
    pub course_id: Option<i64>,
    pub name: String,
    pub school_year: i32,
    pub shift: ClassShift,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct UpdateClassRequest {
    pub course_id: Option<i64>,
    pub name: Option<String>,
    pub school_year: Option<i32>,
    pub shift: Option<ClassShift>,
}
