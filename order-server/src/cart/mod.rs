//! Cart Validator
//!
//! Pure validation and pricing: no side effects, no clock, no I/O. Takes the
//! submitted checkout request plus the catalog rows for the referenced dishes
//! and either produces a fully priced cart or a [`ValidationError`].
//!
//! The total is always recomputed here from catalog prices. The client's
//! `total_price` is only ever *compared against* the server figure - it is
//! never what gets charged.

pub mod money;

use rust_decimal::Decimal;
use shared::checkout::CheckoutRequest;
use shared::models::Dish;
use std::collections::HashMap;
use thiserror::Error;

use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, is_valid_email, is_valid_phone,
};
use money::{MAX_PRICE, MAX_QUANTITY, to_decimal};

/// Validation failures - all map to 422, none have side effects
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("{0}")]
    Field(String),

    #[error("Dish not found: {0}")]
    UnknownDish(i64),

    #[error("Dish is not available: {0}")]
    InactiveDish(i64),

    #[error("Invalid quantity {quantity} for dish {dish_id}")]
    InvalidQuantity { dish_id: i64, quantity: i32 },

    #[error("Catalog price out of bounds for dish {0}")]
    InvalidPrice(i64),

    #[error("All dishes in an order must belong to the same restaurant")]
    MixedRestaurants,

    #[error("Submitted total {submitted:.2} does not match the computed total {computed:.2}")]
    TotalMismatch { submitted: f64, computed: f64 },
}

/// One validated, priced cart line
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub dish_id: i64,
    pub quantity: i32,
    /// Catalog price at validation time
    pub unit_price: Decimal,
}

/// Outcome of validation: the authoritative total and the restaurant the
/// whole cart belongs to
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub restaurant_id: i64,
    pub total: Decimal,
    pub lines: Vec<PricedLine>,
    /// Dish ids in submission order (for the receipt)
    pub dish_ids: Vec<i64>,
}

/// Validate a checkout request against the catalog rows for its dishes.
pub fn validate(request: &CheckoutRequest, dishes: &[Dish]) -> Result<PricedCart, ValidationError> {
    // 1. Customer fields
    validate_customer(request)?;

    // 2. Cart shape
    if request.lines.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    let by_id: HashMap<i64, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();

    // 3. Price each line from the catalog
    let mut restaurant_id: Option<i64> = None;
    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(request.lines.len());
    let mut dish_ids = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        if line.quantity < 1 || line.quantity > MAX_QUANTITY {
            return Err(ValidationError::InvalidQuantity {
                dish_id: line.dish_id,
                quantity: line.quantity,
            });
        }

        let dish = by_id
            .get(&line.dish_id)
            .ok_or(ValidationError::UnknownDish(line.dish_id))?;
        if !dish.is_active {
            return Err(ValidationError::InactiveDish(dish.id));
        }

        // Catalog rows are trusted data, but a corrupt price must not make
        // it into a charge
        if !dish.price.is_finite() || dish.price < 0.0 || dish.price > MAX_PRICE {
            return Err(ValidationError::InvalidPrice(dish.id));
        }

        // 4. Single-restaurant invariant
        match restaurant_id {
            None => restaurant_id = Some(dish.restaurant_id),
            Some(expected) if expected != dish.restaurant_id => {
                return Err(ValidationError::MixedRestaurants);
            }
            Some(_) => {}
        }

        let unit_price = to_decimal(dish.price);
        total += unit_price * Decimal::from(line.quantity);

        lines.push(PricedLine {
            dish_id: dish.id,
            quantity: line.quantity,
            unit_price,
        });
        dish_ids.push(dish.id);
    }

    let total = total.round_dp_with_strategy(
        money::DECIMAL_PLACES,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    );

    // 5. Cross-check the client's figure - reject on disagreement instead of
    // silently charging either amount
    if !request.total_price.is_finite()
        || !money::money_eq(request.total_price, money::to_f64(total))
    {
        return Err(ValidationError::TotalMismatch {
            submitted: request.total_price,
            computed: money::to_f64(total),
        });
    }

    // restaurant_id is Some here: the cart is non-empty and every line resolved
    let restaurant_id = restaurant_id.ok_or(ValidationError::EmptyCart)?;

    Ok(PricedCart {
        restaurant_id,
        total,
        lines,
        dish_ids,
    })
}

fn validate_customer(request: &CheckoutRequest) -> Result<(), ValidationError> {
    required_text(&request.customer_name, "customer_name", MAX_NAME_LEN)?;
    required_text(
        &request.customer_last_name,
        "customer_last_name",
        MAX_NAME_LEN,
    )?;
    required_text(
        &request.customer_address,
        "customer_address",
        MAX_ADDRESS_LEN,
    )?;

    if !is_valid_email(&request.customer_email) {
        return Err(ValidationError::Field(
            "customer_email is not a valid email address".into(),
        ));
    }
    if !is_valid_phone(&request.customer_phone) {
        return Err(ValidationError::Field(
            "customer_phone is not a valid phone number".into(),
        ));
    }

    if let Some(note) = &request.customer_note
        && note.len() > MAX_NOTE_LEN
    {
        return Err(ValidationError::Field(format!(
            "customer_note is too long ({} chars, max {MAX_NOTE_LEN})",
            note.len()
        )));
    }

    if request.payment_method_nonce.trim().is_empty() {
        return Err(ValidationError::Field(
            "paymentMethodNonce must not be empty".into(),
        ));
    }

    Ok(())
}

fn required_text(value: &str, field: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Field(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(ValidationError::Field(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

impl From<ValidationError> for crate::utils::AppError {
    fn from(err: ValidationError) -> Self {
        crate::utils::AppError::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::checkout::CartLineInput;

    fn dish(id: i64, restaurant_id: i64, price: f64) -> Dish {
        Dish {
            id,
            restaurant_id,
            name: format!("Dish {id}"),
            price,
            is_active: true,
        }
    }

    fn request(total: f64, lines: Vec<CartLineInput>) -> CheckoutRequest {
        CheckoutRequest {
            total_price: total,
            customer_name: "Mario".to_string(),
            customer_last_name: "Rossi".to_string(),
            customer_address: "Via Roma 1, Milano".to_string(),
            customer_email: "mario.rossi@example.com".to_string(),
            customer_phone: "+39 02 1234567".to_string(),
            customer_note: None,
            payment_method_nonce: "fake-valid-nonce".to_string(),
            idempotency_key: None,
            lines,
        }
    }

    fn line(dish_id: i64, quantity: i32) -> CartLineInput {
        CartLineInput { dish_id, quantity }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let dishes = vec![dish(5, 1, 10.0)];
        let cart = validate(&request(20.0, vec![line(5, 2)]), &dishes).unwrap();

        assert_eq!(cart.restaurant_id, 1);
        assert_eq!(money::to_f64(cart.total), 20.0);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.dish_ids, vec![5]);
    }

    #[test]
    fn test_total_is_decimal_exact() {
        // 3 × 0.10 + 1 × 0.20 = 0.50, exactly - no float drift
        let dishes = vec![dish(1, 1, 0.10), dish(2, 1, 0.20)];
        let cart = validate(&request(0.50, vec![line(1, 3), line(2, 1)]), &dishes).unwrap();
        assert_eq!(money::to_f64(cart.total), 0.50);
    }

    #[test]
    fn test_mixed_restaurants_rejected() {
        let dishes = vec![dish(1, 1, 10.0), dish(2, 2, 5.0)];
        let result = validate(&request(15.0, vec![line(1, 1), line(2, 1)]), &dishes);
        assert_eq!(result.unwrap_err(), ValidationError::MixedRestaurants);
    }

    #[test]
    fn test_unknown_dish_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let result = validate(&request(10.0, vec![line(99, 1)]), &dishes);
        assert_eq!(result.unwrap_err(), ValidationError::UnknownDish(99));
    }

    #[test]
    fn test_inactive_dish_rejected() {
        let mut d = dish(1, 1, 10.0);
        d.is_active = false;
        let result = validate(&request(10.0, vec![line(1, 1)]), &[d]);
        assert_eq!(result.unwrap_err(), ValidationError::InactiveDish(1));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let result = validate(&request(0.0, vec![line(1, 0)]), &dishes);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::InvalidQuantity {
                dish_id: 1,
                quantity: 0
            }
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let result = validate(&request(-10.0, vec![line(1, -1)]), &dishes);
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::InvalidQuantity { .. }
        ));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = validate(&request(0.0, vec![]), &[]);
        assert_eq!(result.unwrap_err(), ValidationError::EmptyCart);
    }

    #[test]
    fn test_client_total_mismatch_rejected() {
        // Client claims 1.00 for a 20.00 cart - never charge either figure
        let dishes = vec![dish(5, 1, 10.0)];
        let result = validate(&request(1.0, vec![line(5, 2)]), &dishes);
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::TotalMismatch { .. }
        ));
    }

    #[test]
    fn test_nan_client_total_rejected() {
        let dishes = vec![dish(5, 1, 10.0)];
        let result = validate(&request(f64::NAN, vec![line(5, 2)]), &dishes);
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::TotalMismatch { .. }
        ));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let mut req = request(10.0, vec![line(1, 1)]);
        req.customer_email = "not-an-email".to_string();
        assert!(matches!(
            validate(&req, &dishes).unwrap_err(),
            ValidationError::Field(_)
        ));
    }

    #[test]
    fn test_invalid_phone_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let mut req = request(10.0, vec![line(1, 1)]);
        req.customer_phone = "ring ring".to_string();
        assert!(matches!(
            validate(&req, &dishes).unwrap_err(),
            ValidationError::Field(_)
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let mut req = request(10.0, vec![line(1, 1)]);
        req.customer_name = "   ".to_string();
        assert!(matches!(
            validate(&req, &dishes).unwrap_err(),
            ValidationError::Field(_)
        ));
    }

    #[test]
    fn test_note_too_long_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let mut req = request(10.0, vec![line(1, 1)]);
        req.customer_note = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(matches!(
            validate(&req, &dishes).unwrap_err(),
            ValidationError::Field(_)
        ));
    }

    #[test]
    fn test_empty_nonce_rejected() {
        let dishes = vec![dish(1, 1, 10.0)];
        let mut req = request(10.0, vec![line(1, 1)]);
        req.payment_method_nonce = "".to_string();
        assert!(matches!(
            validate(&req, &dishes).unwrap_err(),
            ValidationError::Field(_)
        ));
    }

    #[test]
    fn test_duplicate_dish_lines_are_allowed() {
        // Two lines for the same dish are legitimate (e.g. different requests)
        let dishes = vec![dish(1, 1, 7.50)];
        let cart = validate(&request(22.50, vec![line(1, 1), line(1, 2)]), &dishes).unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(money::to_f64(cart.total), 22.50);
    }

    #[test]
    fn test_corrupt_catalog_price_rejected() {
        let dishes = vec![dish(1, 1, f64::NAN)];
        let result = validate(&request(0.0, vec![line(1, 1)]), &dishes);
        assert_eq!(result.unwrap_err(), ValidationError::InvalidPrice(1));
    }
}
