use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_wire_enum;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct Product {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_atoms: i64,
    pub stock: i64,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

define_wire_enum! {
    /// 订单状态，只有 pending 可以交付或取消
    #[ts(export, export_to = "portal/store.ts")]
    pub enum OrderStatus {
        Pending => "pending",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct Order {
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub total_atoms: i64,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_atoms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct Delivery {
    pub delivered_by: i64,
    pub notes: Option<String>,
    pub delivered_at: chrono::DateTime<chrono::Utc>,
}

/// 订单详情（含明细与交付信息）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct OrderDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub delivery: Option<Delivery>,
}
