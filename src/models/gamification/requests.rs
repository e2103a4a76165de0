use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

/// 仅携带学校的查询参数（管理员指定学校）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct SchoolScopedParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct CreateXpRuleRequest {
    pub school_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub xp_amount: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct UpdateXpRuleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub xp_amount: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AwardXpRequest {
    pub student_ids: Vec<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct UpdateEconomyRequest {
    pub school_id: Option<i64>,
    pub xp_per_atom: Option<i64>,
    pub store_enabled: Option<bool>,
    pub max_order_items: Option<i32>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AtomTransactionParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AdjustAtomsRequest {
    pub student_id: i64,
    /// 正数入账，负数扣减
    pub amount: i64,
    pub description: String,
}
