use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct Teacher {
    pub id: i64,
    pub school_id: i64,
    pub profile_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct Student {
    pub id: i64,
    pub school_id: i64,
    pub profile_id: i64,
    pub class_id: Option<i64>,
    pub guardian_id: Option<i64>,
    pub full_name: String,
    pub registration: String,
    pub birth_date: Option<String>,
    pub xp: i64,
    pub atoms: i64,
    pub avatar_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/people.ts")]
pub struct Guardian {
    pub id: i64,
    pub school_id: i64,
    pub profile_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 创建人员时一并写入的登录账户
#[derive(Debug, Clone)]
pub struct NewLogin {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub school_id: i64,
}
