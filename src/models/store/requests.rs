use super::entities::OrderStatus;
use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct ProductListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub page: u64,
    pub size: u64,
    pub school_id: Option<i64>,
    pub search: Option<String>,
    pub active_only: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct CreateProductRequest {
    pub school_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price_atoms: i64,
    #[serde(default)]
    pub stock: i64,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_atoms: Option<i64>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct OrderListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub page: u64,
    pub size: u64,
    pub school_id: Option<i64>,
    pub status: Option<OrderStatus>,
    /// 为空表示不限学生
    pub student_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct DeliverOrderRequest {
    pub notes: Option<String>,
}
