use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub school_id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 带名称的任课关系，用于列表与教师面板
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/assignment.ts")]
pub struct AssignmentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    pub teacher_name: String,
    pub class_name: String,
    pub subject_name: String,
}
