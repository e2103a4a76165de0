//! 原子币流水实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "atom_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub amount: i64,
    pub kind: String,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_atom_transaction(self) -> crate::models::gamification::entities::AtomTransaction {
        use crate::models::gamification::entities::{AtomTransaction, AtomTransactionKind};
        use chrono::{DateTime, Utc};

        AtomTransaction {
            id: self.id,
            school_id: self.school_id,
            student_id: self.student_id,
            amount: self.amount,
            kind: self.kind.parse().unwrap_or(AtomTransactionKind::Adjustment),
            reference_id: self.reference_id,
            description: self.description,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
