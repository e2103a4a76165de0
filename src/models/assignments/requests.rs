use crate::models::common::pagination::deserialize_optional_i64;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "portal/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "portal/assignment.ts")]
pub struct AssignmentListParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub school_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
}
