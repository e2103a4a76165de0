//! 学校经济配置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "economia_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub school_id: i64,
    pub xp_per_atom: i64,
    pub store_enabled: bool,
    pub max_order_items: i32,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    School,
}

impl Related<super::schools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_economy_config(self) -> crate::models::gamification::entities::EconomyConfig {
        use crate::models::gamification::entities::EconomyConfig;
        use chrono::{DateTime, Utc};

        EconomyConfig {
            school_id: self.school_id,
            xp_per_atom: self.xp_per_atom,
            store_enabled: self.store_enabled,
            max_order_items: self.max_order_items,
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
