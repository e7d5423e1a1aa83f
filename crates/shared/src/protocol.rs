use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::ProductId;

/// A product record as held by the remote store.
///
/// The store keys documents by `_id`; `id` is accepted on input as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "nullable_price")]
    pub price: f64,
    #[serde(deserialize_with = "nullable_quantity")]
    pub quantity: i64,
}

/// Body of a create request: a product without its store-assigned id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "nullable_price")]
    pub price: f64,
    #[serde(deserialize_with = "nullable_quantity")]
    pub quantity: i64,
}

impl Product {
    pub fn from_new(id: ProductId, draft: NewProduct) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity,
        }
    }

    pub fn to_new(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

impl NewProduct {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            quantity,
        }
    }
}

/// Truncates a JSON number to a whole quantity. Non-finite values have no
/// integer form and map to 0; finite values beyond the `i64` range clamp.
pub fn quantity_from_number(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc() as i64
}

// Non-finite prices are written as JSON `null`, so accept it on the way back in.
fn nullable_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn nullable_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(quantity_from_number)
        .unwrap_or(0))
}
