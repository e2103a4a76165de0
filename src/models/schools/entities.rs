use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_wire_enum;

// 学校实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct School {
    pub id: i64,
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
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

define_wire_enum! {
    /// 学校归属的解析来源，按优先级排列
    #[ts(export, export_to = "portal/school.ts")]
    pub enum ResolutionSource {
        Director => "director",
        Owner => "owner",
        Direct => "direct",
        RoleTable => "role_table",
    }
}

/// 学校归属解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct SchoolResolution {
    pub school_id: i64,
    pub source: ResolutionSource,
}
