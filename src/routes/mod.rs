pub mod assignments;

pub mod auth;

pub mod avatars;

pub mod catalog;

pub mod dashboard;

pub mod files;

pub mod gamification;

pub mod people;

pub mod profiles;

pub mod rpc;

pub mod schools;

pub mod store;

pub mod system;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use avatars::configure_avatar_routes;
pub use catalog::configure_catalog_routes;
pub use dashboard::configure_dashboard_routes;
pub use files::configure_file_routes;
pub use gamification::configure_gamification_routes;
pub use people::configure_people_routes;
pub use profiles::configure_profile_routes;
pub use rpc::configure_rpc_routes;
pub use schools::configure_school_routes;
pub use store::configure_store_routes;
pub use system::configure_system_routes;
