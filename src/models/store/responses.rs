use super::entities::{Order, Product};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct ProductListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/store.ts")]
pub struct OrderListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Order>,
}
