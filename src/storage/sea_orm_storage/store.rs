//! 商店存储操作：商品、订单与交付
//!
//! 下单、交付与取消都在单个事务内完成，规则不满足时整体回滚。

use super::gamification::load_economy;
use super::{SeaOrmStorage, db_err, student_for_update};
use crate::entity::prelude::{StoreDeliveries, StoreOrderItems, StoreOrders, StoreProducts};
use crate::entity::{
    atom_transactions, store_deliveries, store_order_items, store_orders, store_products,
};
use crate::errors::Result;
use crate::models::{
    PaginationInfo, Rejection,
    gamification::entities::AtomTransactionKind,
    store::{
        entities::{OrderDetail, OrderStatus, Product},
        pricing::quote_order,
        requests::{
            CreateProductRequest, OrderLine, OrderListQuery, ProductListQuery,
            UpdateProductRequest,
        },
        responses::{OrderListResponse, ProductListResponse},
    },
};
use crate::storage::StoreStorage;
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 组装订单详情（明细与交付记录）
async fn load_order_detail<C: ConnectionTrait>(
    db: &C,
    order: store_orders::Model,
) -> Result<OrderDetail> {
    let items = StoreOrderItems::find()
        .filter(store_order_items::Column::OrderId.eq(order.id))
        .order_by_asc(store_order_items::Column::Id)
        .all(db)
        .await
        .map_err(db_err("查询订单明细失败"))?;
    let delivery = StoreDeliveries::find()
        .filter(store_deliveries::Column::OrderId.eq(order.id))
        .one(db)
        .await
        .map_err(db_err("查询交付记录失败"))?;

    Ok(OrderDetail {
        order: order.into_order(),
        items: items.into_iter().map(|m| m.into_order_item()).collect(),
        delivery: delivery.map(|m| m.into_delivery()),
    })
}

/// 更新订单状态
async fn set_order_status<C: ConnectionTrait>(
    db: &C,
    order: store_orders::Model,
    status: OrderStatus,
    now: i64,
) -> Result<store_orders::Model> {
    let mut model = order.into_active_model();
    model.status = Set(status.to_string());
    model.updated_at = Set(now);
    model.update(db).await.map_err(db_err("更新订单状态失败"))
}

#[async_trait::async_trait]
impl StoreStorage for SeaOrmStorage {
    // ==================== 商品 ====================

    async fn create_product(&self, school_id: i64, req: CreateProductRequest) -> Result<Product> {
        let now = chrono::Utc::now().timestamp();
        let model = store_products::ActiveModel {
            school_id: Set(school_id),
            name: Set(req.name),
            description: Set(req.description),
            price_atoms: Set(req.price_atoms),
            stock: Set(req.stock),
            image_url: Set(req.image_url),
            active: Set(req.active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建商品失败"))?;

        Ok(model.into_product())
    }

    async fn get_product_by_id(&self, id: i64) -> Result<Option<Product>> {
        let result = StoreProducts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询商品失败"))?;
        Ok(result.map(|m| m.into_product()))
    }

    async fn list_products(&self, query: ProductListQuery) -> Result<ProductListResponse> {
        let mut select = StoreProducts::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(store_products::Column::SchoolId.eq(school_id));
        }
        if query.active_only {
            select = select.filter(store_products::Column::Active.eq(true));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(store_products::Column::Name.like(like_contains(search)));
        }

        let paginator = select
            .order_by_asc(store_products::Column::Name)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询商品总数失败"))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_err("查询商品列表失败"))?;

        Ok(ProductListResponse {
            items: items.into_iter().map(|m| m.into_product()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn update_product(
        &self,
        id: i64,
        update: UpdateProductRequest,
    ) -> Result<Option<Product>> {
        let Some(existing) = StoreProducts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询商品失败"))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(price_atoms) = update.price_atoms {
            model.price_atoms = Set(price_atoms);
        }
        if let Some(stock) = update.stock {
            model.stock = Set(stock);
        }
        if let Some(image_url) = update.image_url {
            model.image_url = Set(Some(image_url));
        }
        if let Some(active) = update.active {
            model.active = Set(active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_err("更新商品失败"))?;
        Ok(Some(updated.into_product()))
    }

    async fn delete_product(&self, id: i64) -> Result<std::result::Result<bool, Rejection>> {
        let referenced = StoreOrderItems::find()
            .filter(store_order_items::Column::ProductId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err("查询商品订单失败"))?;
        if referenced > 0 {
            return Ok(Err(Rejection::ProductInOrders(id)));
        }

        // 计数之后并发下单的情况由外键兜底
        match StoreProducts::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除商品失败"))
        {
            Ok(result) => Ok(Ok(result.rows_affected > 0)),
            Err(e) if e.is_foreign_key_violation() => Ok(Err(Rejection::ProductInOrders(id))),
            Err(e) => Err(e),
        }
    }

    // ==================== 订单 ====================

    async fn place_order(
        &self,
        student_id: i64,
        lines: &[OrderLine],
    ) -> Result<std::result::Result<OrderDetail, Rejection>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(student) = student_for_update(student_id)
            .one(&txn)
            .await
            .map_err(db_err("查询学生失败"))?
        else {
            return Ok(Err(Rejection::StudentNotFound(student_id)));
        };

        let economy = load_economy(&txn, student.school_id).await?;
        if !economy.store_enabled {
            return Ok(Err(Rejection::StoreDisabled));
        }

        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let product_models = StoreProducts::find()
            .filter(store_products::Column::Id.is_in(product_ids))
            .order_by_asc(store_products::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err("查询商品失败"))?;
        let products: Vec<Product> = product_models
            .iter()
            .cloned()
            .map(|m| m.into_product())
            .collect();

        let quote = match quote_order(lines, economy.max_order_items, student.school_id, |id| {
            products.iter().find(|p| p.id == id)
        }) {
            Ok(quote) => quote,
            Err(rejection) => return Ok(Err(rejection)),
        };
        if let Err(rejection) = quote.ensure_affordable(student.atoms) {
            return Ok(Err(rejection));
        }

        let school_id = student.school_id;
        let new_balance = student.atoms - quote.total_atoms;
        let mut student_model = student.into_active_model();
        student_model.atoms = Set(new_balance);
        student_model.updated_at = Set(now);
        student_model
            .update(&txn)
            .await
            .map_err(db_err("扣减原子币失败"))?;

        for item in &quote.items {
            if let Some(product) = product_models.iter().find(|p| p.id == item.product_id) {
                let mut model = product.clone().into_active_model();
                model.stock = Set(product.stock - item.quantity);
                model.updated_at = Set(now);
                model.update(&txn).await.map_err(db_err("扣减库存失败"))?;
            }
        }

        let order = store_orders::ActiveModel {
            school_id: Set(school_id),
            student_id: Set(student_id),
            total_atoms: Set(quote.total_atoms),
            status: Set(OrderStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("创建订单失败"))?;

        for item in &quote.items {
            store_order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price_atoms: Set(item.unit_price_atoms),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err("写入订单明细失败"))?;
        }

        atom_transactions::ActiveModel {
            school_id: Set(school_id),
            student_id: Set(student_id),
            amount: Set(-quote.total_atoms),
            kind: Set(AtomTransactionKind::Purchase.to_string()),
            reference_id: Set(Some(order.id)),
            description: Set(Some(format!("Pedido #{}", order.id))),
            created_by: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("写入原子币流水失败"))?;

        let detail = load_order_detail(&txn, order).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(detail))
    }

    async fn get_order_by_id(&self, id: i64) -> Result<Option<OrderDetail>> {
        let Some(order) = StoreOrders::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询订单失败"))?
        else {
            return Ok(None);
        };
        Ok(Some(load_order_detail(&self.db, order).await?))
    }

    async fn list_orders(&self, query: OrderListQuery) -> Result<OrderListResponse> {
        let mut select = StoreOrders::find();
        if let Some(school_id) = query.school_id {
            select = select.filter(store_orders::Column::SchoolId.eq(school_id));
        }
        if let Some(status) = query.status {
            select = select.filter(store_orders::Column::Status.eq(status.to_string()));
        }
        if let Some(student_ids) = query.student_ids {
            select = select.filter(store_orders::Column::StudentId.is_in(student_ids));
        }

        let paginator = select
            .order_by_desc(store_orders::Column::CreatedAt)
            .order_by_desc(store_orders::Column::Id)
            .paginate(&self.db, query.size);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(db_err("查询订单总数失败"))?;
        let items = paginator
            .fetch_page(query.page.saturating_sub(1))
            .await
            .map_err(db_err("查询订单列表失败"))?;

        Ok(OrderListResponse {
            items: items.into_iter().map(|m| m.into_order()).collect(),
            pagination: PaginationInfo::new(
                query.page,
                query.size,
                counts.number_of_items,
                counts.number_of_pages,
            ),
        })
    }

    async fn deliver_order(
        &self,
        order_id: i64,
        delivered_by: i64,
        notes: Option<String>,
    ) -> Result<std::result::Result<OrderDetail, Rejection>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(order) = StoreOrders::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err("查询订单失败"))?
        else {
            return Ok(Err(Rejection::OrderNotFound));
        };
        if order.status != OrderStatus::Pending.as_str() {
            return Ok(Err(Rejection::OrderNotPending));
        }

        store_deliveries::ActiveModel {
            order_id: Set(order.id),
            delivered_by: Set(delivered_by),
            notes: Set(notes),
            delivered_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("写入交付记录失败"))?;

        let order = set_order_status(&txn, order, OrderStatus::Delivered, now).await?;
        let detail = load_order_detail(&txn, order).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(detail))
    }

    async fn cancel_order(
        &self,
        order_id: i64,
        cancelled_by: i64,
    ) -> Result<std::result::Result<OrderDetail, Rejection>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let Some(order) = StoreOrders::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err("查询订单失败"))?
        else {
            return Ok(Err(Rejection::OrderNotFound));
        };
        if order.status != OrderStatus::Pending.as_str() {
            return Ok(Err(Rejection::OrderNotPending));
        }

        // 退回原子币
        if let Some(student) = student_for_update(order.student_id)
            .one(&txn)
            .await
            .map_err(db_err("查询学生失败"))?
        {
            let refunded = student.atoms.saturating_add(order.total_atoms);
            let mut model = student.into_active_model();
            model.atoms = Set(refunded);
            model.updated_at = Set(now);
            model.update(&txn).await.map_err(db_err("退回原子币失败"))?;

            atom_transactions::ActiveModel {
                school_id: Set(order.school_id),
                student_id: Set(order.student_id),
                amount: Set(order.total_atoms),
                kind: Set(AtomTransactionKind::Refund.to_string()),
                reference_id: Set(Some(order.id)),
                description: Set(Some(format!("Cancelamento do pedido #{}", order.id))),
                created_by: Set(Some(cancelled_by)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err("写入原子币流水失败"))?;
        }

        // 恢复库存
        let items = StoreOrderItems::find()
            .filter(store_order_items::Column::OrderId.eq(order.id))
            .order_by_asc(store_order_items::Column::ProductId)
            .all(&txn)
            .await
            .map_err(db_err("查询订单明细失败"))?;
        for item in items {
            if let Some(product) = StoreProducts::find_by_id(item.product_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(db_err("查询商品失败"))?
            {
                let stock = product.stock.saturating_add(item.quantity);
                let mut model = product.into_active_model();
                model.stock = Set(stock);
                model.updated_at = Set(now);
                model.update(&txn).await.map_err(db_err("恢复库存失败"))?;
            }
        }

        let order = set_order_status(&txn, order, OrderStatus::Cancelled, now).await?;
        let detail = load_order_detail(&txn, order).await?;
        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(Ok(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::models::gamification::requests::UpdateEconomyRequest;
    use crate::storage::{GamificationStorage, PeopleStorage};

    async fn product(storage: &SeaOrmStorage, school_id: i64, price: i64, stock: i64) -> Product {
        storage
            .create_product(
                school_id,
                CreateProductRequest {
                    school_id: None,
                    name: format!("Produto {price}"),
                    description: None,
                    price_atoms: price,
                    stock,
                    image_url: None,
                    active: true,
                },
            )
            .await
            .unwrap()
    }

    fn line(product_id: i64, quantity: i64) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
        }
    }

    #[actix_web::test]
    async fn test_place_order_debits_atoms_and_stock() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Loja").await;
        let student = test_support::student(&storage, school.id, "L-1").await;
        storage
            .adjust_atoms(student.id, 50, "carga".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        let pencil = product(&storage, school.id, 5, 10).await;
        let notebook = product(&storage, school.id, 12, 3).await;

        let detail = storage
            .place_order(student.id, &[line(pencil.id, 2), line(notebook.id, 1)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.order.total_atoms, 22);
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.items.len(), 2);
        assert!(detail.delivery.is_none());

        let student = storage.get_student_by_id(student.id).await.unwrap().unwrap();
        assert_eq!(student.atoms, 28);
        let pencil = storage.get_product_by_id(pencil.id).await.unwrap().unwrap();
        assert_eq!(pencil.stock, 8);

        let history = storage.list_atom_transactions(student.id, 1, 10).await.unwrap();
        assert_eq!(history.items[0].kind, AtomTransactionKind::Purchase);
        assert_eq!(history.items[0].amount, -22);
    }

    #[actix_web::test]
    async fn test_ordered_product_cannot_be_deleted() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Historico").await;
        let student = test_support::student(&storage, school.id, "H-1").await;
        storage
            .adjust_atoms(student.id, 20, "carga".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        let sticker = product(&storage, school.id, 4, 5).await;
        let unsold = product(&storage, school.id, 9, 5).await;

        let order = storage
            .place_order(student.id, &[line(sticker.id, 2)])
            .await
            .unwrap()
            .unwrap();
        storage
            .deliver_order(order.order.id, 1, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            storage.delete_product(sticker.id).await.unwrap(),
            Err(Rejection::ProductInOrders(sticker.id))
        );
        let after = storage
            .get_order_by_id(order.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.items.len(), 1);
        assert_eq!(after.items[0].product_id, sticker.id);

        assert_eq!(storage.delete_product(unsold.id).await.unwrap(), Ok(true));
        assert_eq!(storage.delete_product(unsold.id).await.unwrap(), Ok(false));
    }

    #[actix_web::test]
    async fn test_insufficient_atoms_rolls_back() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Pobre").await;
        let student = test_support::student(&storage, school.id, "P-1").await;
        let item = product(&storage, school.id, 30, 5).await;

        let rejection = storage
            .place_order(student.id, &[line(item.id, 1)])
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            rejection,
            Rejection::InsufficientAtoms {
                balance: 0,
                required: 30
            }
        );
        let item = storage.get_product_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(item.stock, 5);
        let orders = storage
            .list_orders(OrderListQuery {
                page: 1,
                size: 10,
                school_id: Some(school.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(orders.pagination.total, 0);
    }

    #[actix_web::test]
    async fn test_store_disabled_and_item_limit() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Regras").await;
        let student = test_support::student(&storage, school.id, "R-2").await;
        let a = product(&storage, school.id, 1, 10).await;
        let b = product(&storage, school.id, 2, 10).await;

        storage
            .update_economy_config(
                school.id,
                UpdateEconomyRequest {
                    max_order_items: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            storage
                .place_order(student.id, &[line(a.id, 1), line(b.id, 1)])
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::TooManyItems { max: 1 }
        );

        storage
            .update_economy_config(
                school.id,
                UpdateEconomyRequest {
                    store_enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            storage
                .place_order(student.id, &[line(a.id, 1)])
                .await
                .unwrap()
                .unwrap_err(),
            Rejection::StoreDisabled
        );
    }

    #[actix_web::test]
    async fn test_deliver_then_cancel_is_rejected() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Entrega").await;
        let student = test_support::student(&storage, school.id, "E-1").await;
        storage
            .adjust_atoms(student.id, 10, "carga".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        let item = product(&storage, school.id, 4, 2).await;

        let order = storage
            .place_order(student.id, &[line(item.id, 1)])
            .await
            .unwrap()
            .unwrap();
        let delivered = storage
            .deliver_order(order.order.id, 1, Some("retirado".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered.order.status, OrderStatus::Delivered);
        assert_eq!(
            delivered.delivery.and_then(|d| d.notes).as_deref(),
            Some("retirado")
        );

        assert_eq!(
            storage.cancel_order(order.order.id, 1).await.unwrap().unwrap_err(),
            Rejection::OrderNotPending
        );
        assert_eq!(
            storage.deliver_order(9999, 1, None).await.unwrap().unwrap_err(),
            Rejection::OrderNotFound
        );
    }

    #[actix_web::test]
    async fn test_cancel_refunds_and_restores_stock() {
        let storage = test_support::storage().await;
        let school = test_support::school(&storage, "Escola Cancelamento").await;
        let student = test_support::student(&storage, school.id, "C-1").await;
        storage
            .adjust_atoms(student.id, 10, "carga".to_string(), 1)
            .await
            .unwrap()
            .unwrap();
        let item = product(&storage, school.id, 3, 5).await;

        let order = storage
            .place_order(student.id, &[line(item.id, 3)])
            .await
            .unwrap()
            .unwrap();
        let cancelled = storage
            .cancel_order(order.order.id, student.profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

        let student = storage.get_student_by_id(student.id).await.unwrap().unwrap();
        assert_eq!(student.atoms, 10);
        let item = storage.get_product_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(item.stock, 5);

        let history = storage.list_atom_transactions(student.id, 1, 10).await.unwrap();
        assert_eq!(history.items[0].kind, AtomTransactionKind::Refund);
        assert_eq!(history.items[0].amount, 9);
    }
}
