//! 经验值规则、发放、原子币与经济配置

pub mod atoms;
pub mod economy;
pub mod xp_rules;

define_service!(
    /// 游戏化：规则读对教职工开放，发放允许教师，其余写操作限学校管理者
    GamificationService
);
