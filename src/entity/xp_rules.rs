//! 经验值规则实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "xp_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub xp_amount: i64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::xp_awards::Entity")]
    Awards,
}

impl Related<super::xp_awards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Awards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_xp_rule(self) -> crate::models::gamification::entities::XpRule {
        use crate::models::gamification::entities::XpRule;
        use chrono::{DateTime, Utc};

        XpRule {
            id: self.id,
            school_id: self.school_id,
            name: self.name,
            description: self.description,
            xp_amount: self.xp_amount,
            active: self.active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
