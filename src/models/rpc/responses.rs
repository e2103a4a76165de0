use serde::Serialize;
use ts_rs::TS;

use crate::models::dashboard::responses::LeaderboardEntry;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/rpc.ts")]
pub struct StudentBalance {
    pub student_id: i64,
    pub xp: i64,
    pub atoms: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/rpc.ts")]
pub struct ClassLeaderboard {
    pub class_id: i64,
    pub entries: Vec<LeaderboardEntry>,
}
