//! 游戏化：经验值规则、发放、原子币与经济配置
pub mod entities;
pub mod requests;
pub mod responses;
