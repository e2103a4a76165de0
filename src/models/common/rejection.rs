//! 业务规则拒绝
//!
//! 事务内的存储操作在规则不满足时返回 `Rejection` 而不是错误，
//! 由服务层转换为对应的 HTTP 响应。

use actix_web::http::StatusCode;

use crate::models::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    StudentNotFound(i64),
    StudentOutsideSchool(i64),
    XpRuleNotFound,
    XpRuleInactive,
    InsufficientAtoms { balance: i64, required: i64 },
    StoreDisabled,
    EmptyOrder,
    TooManyItems { max: i32 },
    InvalidQuantity(i64),
    ProductUnavailable(i64),
    ProductInOrders(i64),
    OutOfStock { product_id: i64, available: i64 },
    OrderNotFound,
    OrderNotPending,
    AvatarUnavailable,
    AvatarLocked { required_xp: i64, xp: i64 },
}

impl Rejection {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Rejection::StudentNotFound(_) => ErrorCode::StudentNotFound,
            Rejection::StudentOutsideSchool(_) => ErrorCode::CrossSchoolReference,
            Rejection::XpRuleNotFound => ErrorCode::XpRuleNotFound,
            Rejection::XpRuleInactive => ErrorCode::XpRuleInactive,
            Rejection::InsufficientAtoms { .. } => ErrorCode::InsufficientAtoms,
            Rejection::StoreDisabled => ErrorCode::StoreDisabled,
            Rejection::EmptyOrder | Rejection::TooManyItems { .. } | Rejection::InvalidQuantity(_) => {
                ErrorCode::OrderInvalid
            }
            Rejection::ProductUnavailable(_) => ErrorCode::ProductUnavailable,
            Rejection::ProductInOrders(_) => ErrorCode::ProductInUse,
            Rejection::OutOfStock { .. } => ErrorCode::OutOfStock,
            Rejection::OrderNotFound => ErrorCode::OrderNotFound,
            Rejection::OrderNotPending => ErrorCode::OrderNotPending,
            Rejection::AvatarUnavailable => ErrorCode::AvatarNotFound,
            Rejection::AvatarLocked { .. } => ErrorCode::AvatarLocked,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::StudentNotFound(_)
            | Rejection::XpRuleNotFound
            | Rejection::OrderNotFound
            | Rejection::AvatarUnavailable => StatusCode::NOT_FOUND,
            Rejection::OrderNotPending | Rejection::ProductInOrders(_) => StatusCode::CONFLICT,
            Rejection::AvatarLocked { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rejection::StudentNotFound(id) => format!("Student {id} not found"),
            Rejection::StudentOutsideSchool(id) => {
                format!("Student {id} does not belong to this school")
            }
            Rejection::XpRuleNotFound => "XP rule not found".to_string(),
            Rejection::XpRuleInactive => "XP rule is inactive".to_string(),
            Rejection::InsufficientAtoms { balance, required } => {
                format!("Insufficient atoms: balance {balance}, required {required}")
            }
            Rejection::StoreDisabled => "Store is disabled for this school".to_string(),
            Rejection::EmptyOrder => "Order must contain at least one item".to_string(),
            Rejection::TooManyItems { max } => format!("Order may contain at most {max} items"),
            Rejection::InvalidQuantity(product_id) => {
                format!("Quantity for product {product_id} must be greater than 0")
            }
            Rejection::ProductUnavailable(product_id) => {
                format!("Product {product_id} is not available")
            }
            Rejection::OutOfStock {
                product_id,
                available,
            } => format!("Product {product_id} has only {available} in stock"),
            Rejection::ProductInOrders(product_id) => format!(
                "Product {product_id} appears in existing orders, deactivate it instead"
            ),
            Rejection::OrderNotFound => "Order not found".to_string(),
            Rejection::OrderNotPending => "Order is not pending".to_string(),
            Rejection::AvatarUnavailable => "Avatar not available".to_string(),
            Rejection::AvatarLocked { required_xp, xp } => {
                format!("Avatar requires {required_xp} XP, student has {xp}")
            }
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_atoms_maps_to_bad_request() {
        let r = Rejection::InsufficientAtoms {
            balance: 3,
            required: 10,
        };
        assert_eq!(r.status(), StatusCode::BAD_REQUEST);
        assert_eq!(r.error_code(), ErrorCode::InsufficientAtoms);
        assert!(r.message().contains("Insufficient atoms"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Rejection::OrderNotPending.status(), StatusCode::CONFLICT);
        assert_eq!(
            Rejection::AvatarLocked {
                required_xp: 100,
                xp: 5
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(Rejection::StudentNotFound(1).status(), StatusCode::NOT_FOUND);
    }
}
