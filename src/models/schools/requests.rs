use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 学校查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct SchoolListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建学校请求（管理员）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct CreateSchoolRequest {
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub logo_url: Option<String>,
    pub director_id: Option<i64>,
    pub owner_id: Option<i64>,
}

// 更新学校请求
//
// `director_id`、`owner_id`、`active` 仅管理员可修改
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub logo_url: Option<String>,
    pub director_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub active: Option<bool>,
}

impl UpdateSchoolRequest {
    /// 是否修改了仅管理员可修改的字段
    pub fn touches_admin_fields(&self) -> bool {
        self.director_id.is_some() || self.owner_id.is_some() || self.active.is_some()
    }
}

// 存储层查询
#[derive(Debug, Clone)]
pub struct SchoolListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}

impl From<SchoolListParams> for SchoolListQuery {
    fn from(params: SchoolListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            search: params.search,
        }
    }
}
