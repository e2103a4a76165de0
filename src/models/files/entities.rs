use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/file.ts")]
pub struct File {
    /// 文件的唯一令牌，同时是磁盘文件名
    pub token: String,
    pub original_name: String,
    /// 字节数
    pub file_size: i64,
    /// 魔术字节推断出的 MIME 类型
    pub file_type: String,
    pub uploaded_by: i64,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
