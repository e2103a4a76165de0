use super::entities::{Guardian, Student, Teacher};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct TeacherListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Teacher>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct StudentListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Student>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct GuardianListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Guardian>,
}

/// 创建人员的响应，未提供密码时返回生成的初始密码
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct CreatedPersonResponse<T: TS> {
    pub person: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}
