use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// One line of a recipe's ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Display name, e.g. "Rajčica"
    pub name: String,
    /// Normalized lookup key, e.g. "rajcica"
    pub key: String,
    /// Whole amounts are written as int32, like a mongosh `qty: 300` literal
    #[serde(rename = "qty", serialize_with = "serialize_quantity")]
    pub quantity: f64,
    pub unit: String,
}

fn serialize_quantity<S: Serializer>(quantity: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let whole = quantity.fract() == 0.0
        && *quantity >= i32::MIN as f64
        && *quantity <= i32::MAX as f64;
    if whole {
        serializer.serialize_i32(*quantity as i32)
    } else {
        serializer.serialize_f64(*quantity)
    }
}

/// Document stored in the `recipes` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub author_id: ObjectId,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    /// Copy of `ingredients[].key`, indexed for filtering
    pub ingredient_keys: Vec<String>,
    pub steps: Vec<String>,
    pub allergens: Vec<String>,
    pub created_at: BsonDateTime,
}

impl Recipe {
    /// True when `ingredient_keys` holds exactly the keys of `ingredients`
    pub fn keys_consistent(&self) -> bool {
        let declared: BTreeSet<&str> = self.ingredient_keys.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = self.ingredients.iter().map(|i| i.key.as_str()).collect();
        declared == actual
    }

    pub fn ingredient_names(&self) -> Vec<String> {
        self.ingredients.iter().map(|i| i.name.clone()).collect()
    }
}
