//! # Order Types
//!
//! Cart items as submitted by the storefront, and server-side pricing of them.
//! The client never tells us what to charge; it only names products.

use crate::error::{PaymentError, PaymentResult};
use crate::product::{Currency, Price, Product, ProductCatalog};
use serde::{Deserialize, Serialize};

/// An item in the `items` array of a create-payment-intent request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID in the catalog
    #[serde(alias = "product_id")]
    pub id: String,

    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}

/// A priced line in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product ID
    pub product_id: String,

    /// Product name (denormalized for logging)
    pub name: String,

    /// Unit price
    pub unit_price: Price,

    /// Quantity
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item from a product
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price.clone(),
            quantity,
        }
    }

    /// Total for this line, `None` on overflow
    pub fn total(&self) -> Option<i64> {
        self.unit_price.amount.checked_mul(i64::from(self.quantity))
    }
}

/// An order priced against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Line items
    pub line_items: Vec<LineItem>,

    /// Currency (must be same for all items)
    pub currency: Currency,
}

impl Order {
    /// Create an empty order
    pub fn new(currency: Currency) -> Self {
        Self {
            line_items: Vec::new(),
            currency,
        }
    }

    /// Price a cart against the catalog.
    ///
    /// Every item must name an active product priced in `currency`, with a
    /// quantity of at least one.
    pub fn from_cart(
        items: &[CartItem],
        catalog: &ProductCatalog,
        currency: Currency,
    ) -> PaymentResult<Self> {
        let mut order = Self::new(currency);

        for item in items {
            let product = catalog
                .get(&item.id)
                .ok_or_else(|| PaymentError::ProductNotFound {
                    product_id: item.id.clone(),
                })?;

            if !product.active {
                return Err(PaymentError::InvalidRequest(format!(
                    "Product is not available: {}",
                    item.id
                )));
            }

            if item.quantity == 0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "Quantity must be at least 1 for {}",
                    item.id
                )));
            }

            if product.price.currency != currency {
                return Err(PaymentError::UnsupportedCurrency {
                    currency: product.price.currency.as_str().to_string(),
                });
            }

            order.add_item(LineItem::from_product(product, item.quantity));
        }

        Ok(order)
    }

    /// Add a line item
    pub fn add_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Calculate order total
    pub fn total(&self) -> PaymentResult<Price> {
        let amount = self
            .line_items
            .iter()
            .try_fold(0_i64, |acc, item| item.total().and_then(|t| acc.checked_add(t)))
            .ok_or_else(|| PaymentError::InvalidRequest("Order total overflows".to_string()))?;

        Ok(Price::from_cents(amount, self.currency))
    }
}

/// Work out what to charge for a cart.
///
/// With an empty catalog there is nothing to price against and the configured
/// `fallback` amount is charged for any cart.
pub fn price_cart(
    items: &[CartItem],
    catalog: &ProductCatalog,
    currency: Currency,
    fallback: &Price,
) -> PaymentResult<Price> {
    if catalog.is_empty() {
        return Ok(fallback.clone());
    }

    if items.is_empty() {
        return Err(PaymentError::InvalidRequest(
            "No items in payment request".to_string(),
        ));
    }

    let order = Order::from_cart(items, catalog, currency)?;
    let total = order.total()?;

    if total.amount <= 0 {
        return Err(PaymentError::InvalidRequest(
            "Order total must be positive".to_string(),
        ));
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProductCatalog {
        ProductCatalog::new()
            .with_product(Product::new(
                "photo-subscription",
                "Photo Subscription",
                Price::from_cents(1400, Currency::EUR),
            ))
            .with_product(Product::new(
                "print-pack",
                "Print Pack",
                Price::from_cents(550, Currency::EUR),
            ))
            .with_product(
                Product::new("old-plan", "Old Plan", Price::from_cents(100, Currency::EUR))
                    .inactive(),
            )
            .with_product(Product::new(
                "us-only",
                "US Only",
                Price::from_cents(100, Currency::USD),
            ))
    }

    #[test]
    fn test_cart_item_defaults() {
        let item: CartItem = serde_json::from_str(r#"{"id":"photo-subscription"}"#).unwrap();
        assert_eq!(item.quantity, 1);

        let item: CartItem =
            serde_json::from_str(r#"{"product_id":"print-pack","quantity":3}"#).unwrap();
        assert_eq!(item.id, "print-pack");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_order_total() {
        let items = vec![
            CartItem::new("photo-subscription", 1),
            CartItem::new("print-pack", 2),
        ];
        let order = Order::from_cart(&items, &catalog(), Currency::EUR).unwrap();

        assert_eq!(order.total().unwrap().amount, 2500);
        assert_eq!(order.line_items.len(), 2);
    }

    #[test]
    fn test_unknown_product_rejected() {
        let items = vec![CartItem::new("nope", 1)];
        let err = Order::from_cart(&items, &catalog(), Currency::EUR).unwrap_err();
        assert!(matches!(err, PaymentError::ProductNotFound { product_id } if product_id == "nope"));
    }

    #[test]
    fn test_inactive_and_zero_quantity_rejected() {
        let inactive = vec![CartItem::new("old-plan", 1)];
        assert!(matches!(
            Order::from_cart(&inactive, &catalog(), Currency::EUR),
            Err(PaymentError::InvalidRequest(_))
        ));

        let zero = vec![CartItem::new("print-pack", 0)];
        assert!(matches!(
            Order::from_cart(&zero, &catalog(), Currency::EUR),
            Err(PaymentError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let items = vec![CartItem::new("us-only", 1)];
        assert!(matches!(
            Order::from_cart(&items, &catalog(), Currency::EUR),
            Err(PaymentError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_overflow_rejected() {
        let catalog = ProductCatalog::new().with_product(Product::new(
            "huge",
            "Huge",
            Price::from_cents(i64::MAX, Currency::EUR),
        ));
        let items = vec![CartItem::new("huge", 2)];
        let order = Order::from_cart(&items, &catalog, Currency::EUR).unwrap();
        assert!(order.total().is_err());
    }

    #[test]
    fn test_price_cart_uses_fallback_without_catalog() {
        let fallback = Price::from_cents(1099, Currency::EUR);
        let items = vec![CartItem::new("whatever", 5)];

        let price = price_cart(&items, &ProductCatalog::new(), Currency::EUR, &fallback).unwrap();
        assert_eq!(price, fallback);
    }

    #[test]
    fn test_price_cart_ignores_fallback_with_catalog() {
        let fallback = Price::from_cents(1, Currency::EUR);
        let items = vec![CartItem::new("print-pack", 2)];

        let price = price_cart(&items, &catalog(), Currency::EUR, &fallback).unwrap();
        assert_eq!(price.amount, 1100);
    }

    #[test]
    fn test_price_cart_requires_items_with_catalog() {
        let fallback = Price::from_cents(1099, Currency::EUR);
        assert!(matches!(
            price_cart(&[], &catalog(), Currency::EUR, &fallback),
            Err(PaymentError::InvalidRequest(_))
        ));
    }
}
