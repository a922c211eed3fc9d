use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeBrand {
    pub id: i64,
    pub name: String,
    pub country: String,
}

/// A coffee as nested inside a brewing, with its brand resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coffee {
    pub id: i64,
    pub name: String,
    /// Decimal price as the backend formats it, e.g. "12.50"
    pub price: String,
    #[serde(default)]
    pub brand: Option<CoffeeBrand>,
}

/// A coffee from the catalog endpoints, which reference the brand by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeDetail {
    pub id: i64,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub coffee_brand_id: Option<i64>,
}

impl CoffeeDetail {
    pub fn display_price(&self) -> String {
        format!("${}", self.price)
    }

    /// Name of this coffee's brand, if the brand is in `brands`.
    pub fn brand_name<'a>(&self, brands: &'a [CoffeeBrand]) -> Option<&'a str> {
        let id = self.coffee_brand_id?;
        brands.iter().find(|b| b.id == id).map(|b| b.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCoffee {
    pub name: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_brand_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCoffeeBrand {
    pub name: String,
    pub country: String,
}
