//! In-memory POS cart
//!
//! The cart lives for one checkout session on a terminal. All money math is
//! `Decimal`; the invariant `total = subtotal - discount_total` holds for
//! every cart state, and the checkout endpoint re-verifies it server-side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product line in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub selling_price: Decimal,
    pub unit: String,
    pub quantity: u32,
    /// Per-line discount in percent, 0..=100
    pub discount_percent: Decimal,
}

impl CartItem {
    /// Line total before discount
    pub fn gross(&self) -> Decimal {
        self.selling_price * Decimal::from(self.quantity)
    }

    /// Discount amount for this line
    pub fn discount_amount(&self) -> Decimal {
        self.gross() * self.discount_percent / Decimal::from(100)
    }

    /// Line total after discount
    pub fn line_total(&self) -> Decimal {
        self.gross() - self.discount_amount()
    }
}

/// Snapshot of a product needed to put it in the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: Uuid,
    pub name: String,
    pub selling_price: Decimal,
    pub unit: String,
}

/// A POS cart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from already-priced lines, used by the checkout
    /// endpoint when it reprices a request server-side
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add one unit of a product. Adding a product already in the cart
    /// increments its quantity instead of creating a second line.
    pub fn add_item(&mut self, product: CartProduct) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.product_id)
        {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem {
                product_id: product.product_id,
                name: product.name,
                selling_price: product.selling_price,
                unit: product.unit,
                quantity: 1,
                discount_percent: Decimal::ZERO,
            });
        }
    }

    pub fn remove_item(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set the quantity for a line. Quantities below 1 are rejected and the
    /// cart is left unchanged.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Set the discount percent for a line. Values outside 0..=100 are
    /// rejected and the cart is left unchanged.
    pub fn update_discount(&mut self, product_id: Uuid, discount_percent: Decimal) {
        if discount_percent < Decimal::ZERO || discount_percent > Decimal::from(100) {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.discount_percent = discount_percent;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line gross amounts before discounts
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::gross).sum()
    }

    /// Sum of per-line discount amounts
    pub fn discount_total(&self) -> Decimal {
        self.items.iter().map(CartItem::discount_amount).sum()
    }

    /// Amount due: subtotal minus discounts
    pub fn total(&self) -> Decimal {
        self.subtotal() - self.discount_total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(name: &str, price: &str) -> CartProduct {
        CartProduct {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            selling_price: Decimal::from_str(price).unwrap(),
            unit: "pcs".to_string(),
        }
    }

    #[test]
    fn adding_same_product_twice_merges_lines() {
        let mut cart = Cart::new();
        let chai = product("Masala Chai", "25.00");
        cart.add_item(chai.clone());
        cart.add_item(chai);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn quantity_below_one_is_rejected() {
        let mut cart = Cart::new();
        let bun = product("Cream Bun", "40.00");
        let id = bun.product_id;
        cart.add_item(bun);
        cart.update_quantity(id, 0);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn discount_outside_range_is_rejected() {
        let mut cart = Cart::new();
        let cake = product("Plum Cake", "350.00");
        let id = cake.product_id;
        cart.add_item(cake);
        cart.update_discount(id, Decimal::from(101));
        assert_eq!(cart.items()[0].discount_percent, Decimal::ZERO);
        cart.update_discount(id, Decimal::from(-1));
        assert_eq!(cart.items()[0].discount_percent, Decimal::ZERO);
    }

    #[test]
    fn totals_follow_discount_formula() {
        let mut cart = Cart::new();
        let tea = product("Green Tea", "30.00");
        let id = tea.product_id;
        cart.add_item(tea);
        cart.update_quantity(id, 4);
        cart.update_discount(id, Decimal::from(10));

        // 4 x 30 = 120, discount 12, total 108
        assert_eq!(cart.subtotal(), Decimal::from(120));
        assert_eq!(cart.discount_total(), Decimal::from(12));
        assert_eq!(cart.total(), Decimal::from(108));
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(product("Rusk", "15.00"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
