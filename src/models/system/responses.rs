use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/system.ts")]
pub struct HealthResponse {
    /// "ok" 或 "degraded"
    pub status: String,
    /// "up" 或 "down"
    pub database: String,
    pub version: String,
    pub uptime_secs: i64,
}
