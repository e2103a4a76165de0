//! 下单计价与校验

use std::collections::BTreeMap;

use super::entities::{OrderItem, Product};
use super::requests::OrderLine;
use crate::models::Rejection;

/// 校验通过的报价
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuote {
    pub items: Vec<OrderItem>,
    pub total_atoms: i64,
}

impl OrderQuote {
    pub fn ensure_affordable(&self, balance: i64) -> Result<(), Rejection> {
        if balance < self.total_atoms {
            return Err(Rejection::InsufficientAtoms {
                balance,
                required: self.total_atoms,
            });
        }
        Ok(())
    }
}

/// 对下单行计价
///
/// 同一商品的多行合并后再检查库存；`find_product` 返回该学校内的商品。
pub fn quote_order<'a, F>(
    lines: &[OrderLine],
    max_items: i32,
    school_id: i64,
    find_product: F,
) -> Result<OrderQuote, Rejection>
where
    F: Fn(i64) -> Option<&'a Product>,
{
    if lines.is_empty() {
        return Err(Rejection::EmptyOrder);
    }
    if lines.len() > max_items.max(0) as usize {
        return Err(Rejection::TooManyItems { max: max_items });
    }

    let mut quantities: BTreeMap<i64, i64> = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(Rejection::InvalidQuantity(line.product_id));
        }
        let entry = quantities.entry(line.product_id).or_insert(0);
        *entry = entry
            .checked_add(line.quantity)
            .ok_or(Rejection::InvalidQuantity(line.product_id))?;
    }

    let mut items = Vec::with_capacity(quantities.len());
    let mut total_atoms: i64 = 0;
    for (product_id, quantity) in quantities {
        let product = find_product(product_id)
            .filter(|p| p.active && p.school_id == school_id)
            .ok_or(Rejection::ProductUnavailable(product_id))?;

        if product.stock < quantity {
            return Err(Rejection::OutOfStock {
                product_id,
                available: product.stock,
            });
        }

        let line_total = product
            .price_atoms
            .checked_mul(quantity)
            .and_then(|v| total_atoms.checked_add(v))
            .ok_or(Rejection::InvalidQuantity(product_id))?;
        total_atoms = line_total;

        items.push(OrderItem {
            product_id,
            quantity,
            unit_price_atoms: product.price_atoms,
        });
    }

    Ok(OrderQuote { items, total_atoms })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: i64, stock: i64) -> Product {
        Product {
            id,
            school_id: 1,
            name: format!("p{id}"),
            description: None,
            price_atoms: price,
            stock,
            image_url: None,
            active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn line(product_id: i64, quantity: i64) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let catalog = [product(1, 5, 10), product(2, 12, 3)];
        let quote = quote_order(&[line(1, 2), line(2, 3)], 10, 1, |id| {
            catalog.iter().find(|p| p.id == id)
        })
        .unwrap();
        assert_eq!(quote.total_atoms, 5 * 2 + 12 * 3);
        assert_eq!(quote.items.len(), 2);
        assert!(quote.ensure_affordable(46).is_ok());
        assert_eq!(
            quote.ensure_affordable(45),
            Err(Rejection::InsufficientAtoms {
                balance: 45,
                required: 46
            })
        );
    }

    #[test]
    fn test_duplicate_lines_are_merged_before_stock_check() {
        let catalog = [product(1, 1, 3)];
        let result = quote_order(&[line(1, 2), line(1, 2)], 10, 1, |id| {
            catalog.iter().find(|p| p.id == id)
        });
        assert_eq!(
            result,
            Err(Rejection::OutOfStock {
                product_id: 1,
                available: 3
            })
        );
    }

    #[test]
    fn test_line_count_limits() {
        let catalog = [product(1, 1, 100)];
        let find = |id: i64| catalog.iter().find(|p| p.id == id);
        assert_eq!(quote_order(&[], 10, 1, find), Err(Rejection::EmptyOrder));
        assert_eq!(
            quote_order(&[line(1, 1), line(1, 1), line(1, 1)], 2, 1, find),
            Err(Rejection::TooManyItems { max: 2 })
        );
        assert_eq!(
            quote_order(&[line(1, 0)], 2, 1, find),
            Err(Rejection::InvalidQuantity(1))
        );
    }

    #[test]
    fn test_inactive_or_foreign_products_unavailable() {
        let mut inactive = product(1, 1, 5);
        inactive.active = false;
        let mut foreign = product(2, 1, 5);
        foreign.school_id = 9;
        let catalog = [inactive, foreign];
        let find = |id: i64| catalog.iter().find(|p| p.id == id);

        assert_eq!(
            quote_order(&[line(1, 1)], 10, 1, find),
            Err(Rejection::ProductUnavailable(1))
        );
        assert_eq!(
            quote_order(&[line(2, 1)], 10, 1, find),
            Err(Rejection::ProductUnavailable(2))
        );
        assert_eq!(
            quote_order(&[line(3, 1)], 10, 1, find),
            Err(Rejection::ProductUnavailable(3))
        );
    }
}
