use super::entities::School;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/school.ts")]
pub struct SchoolListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<School>,
}
