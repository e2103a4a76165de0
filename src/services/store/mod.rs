//! 商店：商品与订单
//!
//! 订单的扣款、库存与状态变更都在存储层事务内完成，这里只负责权限与作用域。

pub mod orders;
pub mod products;

define_service!(StoreService);
