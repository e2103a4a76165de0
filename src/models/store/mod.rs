//! 商店：商品、订单与交付
pub mod entities;
pub mod pricing;
pub mod requests;
pub mod responses;
