use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/avatar.ts")]
pub struct Avatar {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    /// 解锁所需经验值
    pub required_xp: i64,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
