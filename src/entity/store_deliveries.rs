//! 订单交付实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "store_deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub order_id: i64,
    pub delivered_by: i64,
    pub notes: Option<String>,
    pub delivered_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store_orders::Entity",
        from = "Column::OrderId",
        to = "super::store_orders::Column::Id"
    )]
    Order,
}

impl Related<super::store_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_delivery(self) -> crate::models::store::entities::Delivery {
        use crate::models::store::entities::Delivery;
        use chrono::{DateTime, Utc};

        Delivery {
            delivered_by: self.delivered_by,
            notes: self.notes,
            delivered_at: DateTime::<Utc>::from_timestamp(self.delivered_at, 0).unwrap_or_default(),
        }
    }
}
