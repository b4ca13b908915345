//! Validation utilities shared between the backend and the POS screen

use rust_decimal::Decimal;
use thiserror::Error;

/// Input validation failures, shared so the POS screen and the server
/// reject the same values with the same messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Discount must be between 0 and 100 percent")]
    DiscountOutOfRange,
    #[error("Quantity must be at least 1")]
    QuantityTooSmall,
    #[error("Price cannot be negative")]
    NegativePrice,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Store code must be 2-10 uppercase alphanumeric characters")]
    InvalidStoreCode,
}

/// Validate a per-line discount percent (0..=100)
pub fn validate_discount_percent(discount: Decimal) -> Result<(), ValidationError> {
    if discount < Decimal::ZERO || discount > Decimal::from(100) {
        return Err(ValidationError::DiscountOutOfRange);
    }
    Ok(())
}

/// Validate a cart line quantity (at least 1)
pub fn validate_quantity(quantity: u32) -> Result<(), ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::QuantityTooSmall);
    }
    Ok(())
}

/// Validate a selling price or unit cost (non-negative)
pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice);
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Validate a customer phone number: digits with optional leading +,
/// 7 to 15 digits
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Validate a store code (2-10 uppercase alphanumeric)
pub fn validate_store_code(code: &str) -> Result<(), ValidationError> {
    if code.len() < 2
        || code.len() > 10
        || !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidStoreCode);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_bounds() {
        assert!(validate_discount_percent(Decimal::ZERO).is_ok());
        assert!(validate_discount_percent(Decimal::from(100)).is_ok());
        assert_eq!(
            validate_discount_percent(Decimal::from(101)),
            Err(ValidationError::DiscountOutOfRange)
        );
        assert_eq!(
            validate_discount_percent(Decimal::from(-1)),
            Err(ValidationError::DiscountOutOfRange)
        );
    }

    #[test]
    fn phone_accepts_plus_prefix() {
        assert!(validate_phone("+919876500000").is_ok());
        assert_eq!(validate_phone("98765"), Err(ValidationError::InvalidPhone));
        assert_eq!(validate_phone("98765abc00"), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn store_codes() {
        assert!(validate_store_code("MG1").is_ok());
        assert_eq!(validate_store_code("m1"), Err(ValidationError::InvalidStoreCode));
        assert_eq!(validate_store_code("A"), Err(ValidationError::InvalidStoreCode));
    }
}
