//! 订单明细实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "store_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_atoms: i64,
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
    pub fn into_order_item(self) -> crate::models::store::entities::OrderItem {
        crate::models::store::entities::OrderItem {
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price_atoms: self.unit_price_atoms,
        }
    }
}
