//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod atom_transactions;
pub mod avatars;
pub mod classes;
pub mod courses;
pub mod economia_config;
pub mod files;
pub mod guardians;
pub mod profiles;
pub mod schools;
pub mod store_deliveries;
pub mod store_order_items;
pub mod store_orders;
pub mod store_products;
pub mod students;
pub mod subjects;
pub mod teacher_class_subjects;
pub mod teachers;
pub mod xp_awards;
pub mod xp_rules;
