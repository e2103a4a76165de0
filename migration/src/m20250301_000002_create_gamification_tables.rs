use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column<T: IntoIden>(iden: T) -> ColumnDef {
    ColumnDef::new(iden)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 经济配置表 ====================
        manager
            .create_table(
                Table::create()
                    .table(EconomiaConfig::Table)
                    .if_not_exists()
                    .col(id_column(EconomiaConfig::Id))
                    .col(
                        ColumnDef::new(EconomiaConfig::SchoolId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EconomiaConfig::XpPerAtom)
                            .big_integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(EconomiaConfig::StoreEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EconomiaConfig::MaxOrderItems)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(
                        ColumnDef::new(EconomiaConfig::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EconomiaConfig::Table, EconomiaConfig::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== XP 规则表 ====================
        manager
            .create_table(
                Table::create()
                    .table(XpRules::Table)
                    .if_not_exists()
                    .col(id_column(XpRules::Id))
                    .col(ColumnDef::new(XpRules::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(XpRules::Name).string().not_null())
                    .col(ColumnDef::new(XpRules::Description).text().null())
                    .col(ColumnDef::new(XpRules::XpAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(XpRules::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(XpRules::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(XpRules::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(XpRules::Table, XpRules::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== XP 发放记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(XpAwards::Table)
                    .if_not_exists()
                    .col(id_column(XpAwards::Id))
                    .col(ColumnDef::new(XpAwards::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(XpAwards::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(XpAwards::RuleId).big_integer().null())
                    .col(ColumnDef::new(XpAwards::AwardedBy).big_integer().not_null())
                    .col(ColumnDef::new(XpAwards::XpAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(XpAwards::AtomsCredited)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(XpAwards::Note).text().null())
                    .col(ColumnDef::new(XpAwards::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(XpAwards::Table, XpAwards::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(XpAwards::Table, XpAwards::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(XpAwards::Table, XpAwards::RuleId)
                            .to(XpRules::Table, XpRules::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 原子币流水表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AtomTransactions::Table)
                    .if_not_exists()
                    .col(id_column(AtomTransactions::Id))
                    .col(
                        ColumnDef::new(AtomTransactions::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AtomTransactions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AtomTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AtomTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(AtomTransactions::ReferenceId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(AtomTransactions::Description).text().null())
                    .col(
                        ColumnDef::new(AtomTransactions::CreatedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AtomTransactions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AtomTransactions::Table, AtomTransactions::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AtomTransactions::Table, AtomTransactions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 商店商品表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StoreProducts::Table)
                    .if_not_exists()
                    .col(id_column(StoreProducts::Id))
                    .col(
                        ColumnDef::new(StoreProducts::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StoreProducts::Name).string().not_null())
                    .col(ColumnDef::new(StoreProducts::Description).text().null())
                    .col(
                        ColumnDef::new(StoreProducts::PriceAtoms)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreProducts::Stock)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(StoreProducts::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(StoreProducts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(StoreProducts::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreProducts::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreProducts::Table, StoreProducts::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 商店订单表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StoreOrders::Table)
                    .if_not_exists()
                    .col(id_column(StoreOrders::Id))
                    .col(ColumnDef::new(StoreOrders::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(StoreOrders::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreOrders::TotalAtoms)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StoreOrders::Status).string().not_null())
                    .col(
                        ColumnDef::new(StoreOrders::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreOrders::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreOrders::Table, StoreOrders::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreOrders::Table, StoreOrders::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 订单明细表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StoreOrderItems::Table)
                    .if_not_exists()
                    .col(id_column(StoreOrderItems::Id))
                    .col(
                        ColumnDef::new(StoreOrderItems::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreOrderItems::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreOrderItems::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoreOrderItems::UnitPriceAtoms)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreOrderItems::Table, StoreOrderItems::OrderId)
                            .to(StoreOrders::Table, StoreOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreOrderItems::Table, StoreOrderItems::ProductId)
                            .to(StoreProducts::Table, StoreProducts::Id)
                            // 订单明细是历史记录，被引用的商品只能下架
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 订单交付表 ====================
        manager
            .create_table(
                Table::create()
                    .table(StoreDeliveries::Table)
                    .if_not_exists()
                    .col(id_column(StoreDeliveries::Id))
                    .col(
                        ColumnDef::new(StoreDeliveries::OrderId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StoreDeliveries::DeliveredBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StoreDeliveries::Notes).text().null())
                    .col(
                        ColumnDef::new(StoreDeliveries::DeliveredAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StoreDeliveries::Table, StoreDeliveries::OrderId)
                            .to(StoreOrders::Table, StoreOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_atom_transactions_student_id")
                    .table(AtomTransactions::Table)
                    .col(AtomTransactions::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_store_orders_school_status")
                    .table(StoreOrders::Table)
                    .col(StoreOrders::SchoolId)
                    .col(StoreOrders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_store_order_items_order_id")
                    .table(StoreOrderItems::Table)
                    .col(StoreOrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_xp_awards_student_id")
                    .table(XpAwards::Table)
                    .col(XpAwards::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StoreDeliveries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreOrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AtomTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(XpAwards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(XpRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EconomiaConfig::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum EconomiaConfig {
    #[sea_orm(iden = "economia_config")]
    Table,
    Id,
    SchoolId,
    XpPerAtom,
    StoreEnabled,
    MaxOrderItems,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum XpRules {
    #[sea_orm(iden = "xp_rules")]
    Table,
    Id,
    SchoolId,
    Name,
    Description,
    XpAmount,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum XpAwards {
    #[sea_orm(iden = "xp_awards")]
    Table,
    Id,
    SchoolId,
    StudentId,
    RuleId,
    AwardedBy,
    XpAmount,
    AtomsCredited,
    Note,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AtomTransactions {
    #[sea_orm(iden = "atom_transactions")]
    Table,
    Id,
    SchoolId,
    StudentId,
    Amount,
    Kind,
    ReferenceId,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StoreProducts {
    #[sea_orm(iden = "store_products")]
    Table,
    Id,
    SchoolId,
    Name,
    Description,
    PriceAtoms,
    Stock,
    ImageUrl,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StoreOrders {
    #[sea_orm(iden = "store_orders")]
    Table,
    Id,
    SchoolId,
    StudentId,
    TotalAtoms,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StoreOrderItems {
    #[sea_orm(iden = "store_order_items")]
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
    UnitPriceAtoms,
}

#[derive(DeriveIden)]
enum StoreDeliveries {
    #[sea_orm(iden = "store_deliveries")]
    Table,
    Id,
    OrderId,
    DeliveredBy,
    Notes,
    DeliveredAt,
}
