//! WebAssembly module for the BakePOS terminal
//!
//! Provides client-side computation for:
//! - POS cart math (totals, discounts)
//! - Stock and expiry classification
//! - Offline input validation
//!
//! The cart lives on the Rust side; the POS screen manipulates it
//! through JSON snapshots so the numbers it shows always match what the
//! checkout endpoint will recompute.

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::models::cart::{Cart, CartProduct};
use shared::models::product::stock_status;
use shared::models::production::expiry_status;
use shared::validation;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"bakepos wasm initialized".into());
}

/// Batch number the production screen shows before the run is saved.
/// The server assigns the real one; this preview uses the terminal's
/// clock in the same BATCH+timestamp format.
#[wasm_bindgen]
pub fn batch_number_preview() -> String {
    let millis = js_sys::Date::now() as i64;
    let at = chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default();
    shared::models::production::batch_number_for(at)
}

fn parse_cart(cart_json: &str) -> Result<Cart, JsValue> {
    serde_json::from_str(cart_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid cart JSON: {}", e)))
}

fn cart_json(cart: &Cart) -> Result<String, JsValue> {
    serde_json::to_string(cart).map_err(|e| JsValue::from_str(&format!("Cart to JSON: {}", e)))
}

/// Add one unit of a product to the cart, merging duplicate lines
#[wasm_bindgen]
pub fn cart_add_item(cart_json_in: &str, product_json: &str) -> Result<String, JsValue> {
    let mut cart = parse_cart(cart_json_in)?;
    let product: CartProduct = serde_json::from_str(product_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid product JSON: {}", e)))?;
    cart.add_item(product);
    cart_json(&cart)
}

/// Remove a line from the cart
#[wasm_bindgen]
pub fn cart_remove_item(cart_json_in: &str, product_id: &str) -> Result<String, JsValue> {
    let mut cart = parse_cart(cart_json_in)?;
    let id = uuid::Uuid::parse_str(product_id)
        .map_err(|e| JsValue::from_str(&format!("Invalid product id: {}", e)))?;
    cart.remove_item(id);
    cart_json(&cart)
}

/// Set a line's quantity; values below 1 leave the cart unchanged
#[wasm_bindgen]
pub fn cart_update_quantity(
    cart_json_in: &str,
    product_id: &str,
    quantity: u32,
) -> Result<String, JsValue> {
    let mut cart = parse_cart(cart_json_in)?;
    let id = uuid::Uuid::parse_str(product_id)
        .map_err(|e| JsValue::from_str(&format!("Invalid product id: {}", e)))?;
    cart.update_quantity(id, quantity);
    cart_json(&cart)
}

/// Set a line's discount percent; values outside 0..=100 leave the cart
/// unchanged
#[wasm_bindgen]
pub fn cart_update_discount(
    cart_json_in: &str,
    product_id: &str,
    discount_percent: &str,
) -> Result<String, JsValue> {
    let mut cart = parse_cart(cart_json_in)?;
    let id = uuid::Uuid::parse_str(product_id)
        .map_err(|e| JsValue::from_str(&format!("Invalid product id: {}", e)))?;
    let discount: Decimal = discount_percent
        .parse()
        .map_err(|_| JsValue::from_str("Invalid discount"))?;
    cart.update_discount(id, discount);
    cart_json(&cart)
}

/// Cart totals as `{ subtotal, discount_total, total }` decimal strings
#[wasm_bindgen]
pub fn cart_totals(cart_json_in: &str) -> Result<String, JsValue> {
    let cart = parse_cart(cart_json_in)?;
    serde_json::to_string(&serde_json::json!({
        "subtotal": cart.subtotal().to_string(),
        "discount_total": cart.discount_total().to_string(),
        "total": cart.total().to_string(),
    }))
    .map_err(|e| JsValue::from_str(&format!("Totals to JSON: {}", e)))
}

/// Classify stock against the reorder level: "ok", "low", or "out"
#[wasm_bindgen]
pub fn classify_stock(current_stock: &str, reorder_level: &str) -> Result<String, JsValue> {
    let stock: Decimal = current_stock
        .parse()
        .map_err(|_| JsValue::from_str("Invalid stock"))?;
    let level: Decimal = reorder_level
        .parse()
        .map_err(|_| JsValue::from_str("Invalid reorder level"))?;
    let status = stock_status(stock, level);
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| JsValue::from_str("Status to JSON"))
}

/// Classify a batch by days until expiry: "expired", "critical",
/// "warning", or "good"
#[wasm_bindgen]
pub fn classify_expiry(days_until_expiry: i64) -> String {
    let status = expiry_status(days_until_expiry);
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "good".to_string())
}

/// Validate a discount percent entered on the POS screen
#[wasm_bindgen]
pub fn validate_discount(discount_percent: &str) -> Option<String> {
    let discount: Decimal = match discount_percent.parse() {
        Ok(d) => d,
        Err(_) => return Some("Invalid discount".to_string()),
    };
    validation::validate_discount_percent(discount)
        .err()
        .map(|e| e.to_string())
}

/// Validate a customer phone number; returns the error message or null
#[wasm_bindgen]
pub fn validate_customer_phone(phone: &str) -> Option<String> {
    validation::validate_phone(phone).err().map(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cart() -> String {
        serde_json::to_string(&Cart::new()).unwrap()
    }

    fn product_json(price: &str) -> String {
        serde_json::to_string(&CartProduct {
            product_id: uuid::Uuid::new_v4(),
            name: "Masala Chai".to_string(),
            selling_price: price.parse().unwrap(),
            unit: "cup".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn add_and_total() {
        let cart = cart_add_item(&empty_cart(), &product_json("25.00")).unwrap();
        let totals = cart_totals(&cart).unwrap();
        let totals: serde_json::Value = serde_json::from_str(&totals).unwrap();
        assert_eq!(totals["total"], "25.00");
    }

    #[test]
    fn expiry_classification() {
        assert_eq!(classify_expiry(-1), "expired");
        assert_eq!(classify_expiry(1), "critical");
        assert_eq!(classify_expiry(3), "warning");
        assert_eq!(classify_expiry(10), "good");
    }

    #[test]
    fn discount_validation_messages() {
        assert!(validate_discount("50").is_none());
        assert!(validate_discount("101").is_some());
        assert!(validate_discount("abc").is_some());
    }
}
