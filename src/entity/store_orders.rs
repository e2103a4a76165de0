//! 商店订单实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "store_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub total_atoms: i64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::store_order_items::Entity")]
    Items,
    #[sea_orm(has_one = "super::store_deliveries::Entity")]
    Delivery,
}

impl Related<super::store_order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::store_deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_order(self) -> crate::models::store::entities::Order {
        use crate::models::store::entities::{Order, OrderStatus};
        use chrono::{DateTime, Utc};

        Order {
            id: self.id,
            school_id: self.school_id,
            student_id: self.student_id,
            total_atoms: self.total_atoms,
            status: self.status.parse().unwrap_or(OrderStatus::Pending),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
