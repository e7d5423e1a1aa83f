//! Field-by-field editing of product drafts from textual input.

use std::str::FromStr;

use shared::protocol::{quantity_from_number, NewProduct, Product};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Quantity,
}

#[derive(Debug, Error)]
#[error("unknown product field '{0}' (expected name, description, price or quantity)")]
pub struct UnknownField(String);

impl FromStr for ProductField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "description" | "desc" => Ok(Self::Description),
            "price" => Ok(Self::Price),
            "quantity" | "qty" => Ok(Self::Quantity),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// Unary-plus style coercion: blank is 0, unparseable is NaN. No bounds checks.
///
/// Accepts decimal literals, signed `Infinity`, and unsigned `0x`/`0o`/`0b`
/// integer literals. Rust-only spellings such as `inf` or `nan` are NaN.
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    let is_decimal = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn radix_literal(text: &str) -> Option<f64> {
    let mut chars = text.chars();
    if chars.next() != Some('0') {
        return None;
    }
    let radix = match chars.next()?.to_ascii_lowercase() {
        'x' => 16,
        'o' => 8,
        'b' => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

pub trait EditableDraft {
    fn set_field(&mut self, field: ProductField, text: &str);
}

impl EditableDraft for NewProduct {
    fn set_field(&mut self, field: ProductField, text: &str) {
        match field {
            ProductField::Name => self.name = text.to_string(),
            ProductField::Description => self.description = text.to_string(),
            ProductField::Price => self.price = coerce_number(text),
            ProductField::Quantity => self.quantity = quantity_from_number(coerce_number(text)),
        }
    }
}

impl EditableDraft for Product {
    fn set_field(&mut self, field: ProductField, text: &str) {
        match field {
            ProductField::Name => self.name = text.to_string(),
            ProductField::Description => self.description = text.to_string(),
            ProductField::Price => self.price = coerce_number(text),
            ProductField::Quantity => self.quantity = quantity_from_number(coerce_number(text)),
        }
    }
}
