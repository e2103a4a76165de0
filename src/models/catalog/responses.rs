use super::entities::{Class, Course, Subject};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct CourseListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Course>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct SubjectListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Subject>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct ClassListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Class>,
}
