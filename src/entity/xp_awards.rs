//! 经验值发放记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "xp_awards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub rule_id: Option<i64>,
    pub awarded_by: i64,
    pub xp_amount: i64,
    pub atoms_credited: i64,
    pub note: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::xp_rules::Entity",
        from = "Column::RuleId",
        to = "super::xp_rules::Column::Id"
    )]
    Rule,
}

impl Related<super::xp_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
