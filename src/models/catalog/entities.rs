use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_wire_enum;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct Course {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct Subject {
    pub id: i64,
    pub school_id: i64,
    pub course_id: Option<i64>,
    pub name: String,
    pub workload_hours: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

define_wire_enum! {
    /// 班级上课时段
    #[ts(export, export_to = "portal/catalog.ts")]
    pub enum ClassShift {
        Morning => "manha",
        Afternoon => "tarde",
        Evening => "noite",
        FullDay => "integral",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/catalog.ts")]
pub struct Class {
    pub id: i64,
    pub school_id: i64,
    pub course_id: Option<i64>,
    pub name: String,
    pub school_year: i32,
    pub shift: ClassShift,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
