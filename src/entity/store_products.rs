//! 商店商品实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "store_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_atoms: i64,
    pub stock: i64,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_product(self) -> crate::models::store::entities::Product {
        use crate::models::store::entities::Product;
        use chrono::{DateTime, Utc};

        Product {
            id: self.id,
            school_id: self.school_id,
            name: self.name,
            description: self.description,
            price_atoms: self.price_atoms,
            stock: self.stock,
            image_url: self.image_url,
            active: self.active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
