pub mod pagination;
pub mod rejection;
pub mod response;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use rejection::Rejection;
pub use response::ApiResponse;
