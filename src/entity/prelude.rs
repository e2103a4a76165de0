//! 预导入模块，方便使用

pub use super::atom_transactions::Entity as AtomTransactions;
pub use super::avatars::Entity as Avatars;
pub use super::classes::Entity as Classes;
pub use super::courses::Entity as Courses;
pub use super::economia_config::Entity as EconomiaConfig;
pub use super::files::Entity as Files;
pub use super::guardians::Entity as Guardians;
pub use super::profiles::Entity as Profiles;
pub use super::schools::Entity as Schools;
pub use super::store_deliveries::Entity as StoreDeliveries;
pub use super::store_order_items::Entity as StoreOrderItems;
pub use super::store_orders::Entity as StoreOrders;
pub use super::store_products::Entity as StoreProducts;
pub use super::students::Entity as Students;
pub use super::subjects::Entity as Subjects;
pub use super::teacher_class_subjects::Entity as TeacherClassSubjects;
pub use super::teachers::Entity as Teachers;
pub use super::xp_awards::Entity as XpAwards;
pub use super::xp_rules::Entity as XpRules;
