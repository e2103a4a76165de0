use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_wire_enum;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct XpRule {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub xp_amount: i64,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 学校经济配置
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct EconomyConfig {
    pub school_id: i64,
    pub xp_per_atom: i64,
    pub store_enabled: bool,
    pub max_order_items: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl EconomyConfig {
    pub const DEFAULT_XP_PER_ATOM: i64 = 10;
    pub const DEFAULT_MAX_ORDER_ITEMS: i32 = 10;

    /// 经验值从 `old_xp` 增长到 `new_xp` 时应入账的原子币
    ///
    /// 按累计经验跨过的整 `xp_per_atom` 边界计数，零头留到下次。
    pub fn atoms_for_gain(&self, old_xp: i64, new_xp: i64) -> i64 {
        atoms_between(old_xp, new_xp, self.xp_per_atom)
    }
}

pub(crate) fn atoms_between(old_xp: i64, new_xp: i64, xp_per_atom: i64) -> i64 {
    if xp_per_atom <= 0 || new_xp <= old_xp {
        return 0;
    }
    new_xp.div_euclid(xp_per_atom) - old_xp.div_euclid(xp_per_atom)
}

define_wire_enum! {
    /// 原子币流水类型
    #[ts(export, export_to = "portal/gamification.ts")]
    pub enum AtomTransactionKind {
        XpReward => "xp_reward",
        Purchase => "purchase",
        Refund => "refund",
        Adjustment => "adjustment",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "portal/gamification.ts")]
pub struct AtomTransaction {
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    /// 正数入账，负数扣减
    pub amount: i64,
    pub kind: AtomTransactionKind,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy(xp_per_atom: i64) -> EconomyConfig {
        EconomyConfig {
            school_id: 1,
            xp_per_atom,
            store_enabled: true,
            max_order_items: 10,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_atoms_cross_boundaries() {
        let e = economy(10);
        assert_eq!(e.atoms_for_gain(0, 25), 2);
        // 零头累积
        assert_eq!(e.atoms_for_gain(25, 30), 1);
        assert_eq!(e.atoms_for_gain(30, 39), 0);
        assert_eq!(e.atoms_for_gain(39, 40), 1);
    }

    #[test]
    fn test_atoms_sum_matches_single_award() {
        let e = economy(7);
        let split = e.atoms_for_gain(0, 5) + e.atoms_for_gain(5, 12) + e.atoms_for_gain(12, 29);
        assert_eq!(split, e.atoms_for_gain(0, 29));
    }

    #[test]
    fn test_atoms_degenerate_inputs() {
        assert_eq!(atoms_between(10, 50, 0), 0);
        assert_eq!(atoms_between(50, 10, 10), 0);
        assert_eq!(economy(1).atoms_for_gain(3, 8), 5);
    }
}
