use super::entities::AtomTransaction;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

/// 单个学生的发放结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct XpAwardOutcome {
    pub student_id: i64,
    pub xp: i64,
    pub atoms: i64,
    pub atoms_credited: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct XpAwardResponse {
    pub rule_id: i64,
    pub xp_amount: i64,
    pub results: Vec<XpAwardOutcome>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AtomTransactionListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<AtomTransaction>,
}

/// 手动调整后的余额
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AtomBalanceResponse {
    pub student_id: i64,
    pub atoms: i64,
    pub transaction: AtomTransaction,
}
