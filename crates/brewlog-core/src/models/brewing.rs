use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::coffee::Coffee;
use super::rating::{Rating, RatingScores};

/// One brewing session from the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brewing {
    pub id: i64,
    pub method: String,
    pub grams: i32,
    pub ml: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    /// ISO-8601 timestamp, without an offset
    pub created_at: String,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub coffee: Option<Coffee>,
}

impl Brewing {
    pub fn coffee_name(&self) -> &str {
        self.coffee
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown Coffee")
    }

    pub fn brand_name(&self) -> Option<&str> {
        self.coffee
            .as_ref()
            .and_then(|c| c.brand.as_ref())
            .map(|b| b.name.as_str())
    }

    /// Water per gram of coffee
    pub fn ratio(&self) -> Option<f64> {
        if self.grams <= 0 {
            return None;
        }
        Some(f64::from(self.ml) / f64::from(self.grams))
    }

    /// Ratio as brewers write it, e.g. `1:16.7`
    pub fn ratio_display(&self) -> String {
        match self.ratio() {
            Some(r) => format!("1:{:.1}", r),
            None => "-".to_string(),
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn overall(&self) -> Option<u8> {
        self.rating.as_ref().map(|r| r.overall)
    }

    pub fn belongs_to_coffee(&self, coffee_id: i64) -> bool {
        self.coffee.as_ref().is_some_and(|c| c.id == coffee_id)
    }
}

/// Body of `POST /brewings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBrewing {
    pub coffee_id: i64,
    pub method: String,
    pub grams: i32,
    pub ml: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub rating: RatingScores,
}

/// Body of `PUT /brewings/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrewingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grams: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Column the brewing list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewingSortColumn {
    Date,
    Coffee,
    Rating,
}

impl BrewingSortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            BrewingSortColumn::Date => "Date",
            BrewingSortColumn::Coffee => "Coffee",
            BrewingSortColumn::Rating => "Rating",
        }
    }

    pub fn compare(&self, a: &Brewing, b: &Brewing) -> Ordering {
        match self {
            // ISO timestamps sort lexically
            BrewingSortColumn::Date => a.created_at.cmp(&b.created_at),
            BrewingSortColumn::Coffee => a
                .coffee_name()
                .to_lowercase()
                .cmp(&b.coffee_name().to_lowercase()),
            BrewingSortColumn::Rating => a.overall().cmp(&b.overall()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brewing_json() -> serde_json::Value {
        serde_json::json!({
            "id": 3,
            "method": "V60",
            "grams": 15,
            "ml": 250,
            "notes": "Bright, citrus",
            "latitude": 40.7128,
            "longitude": -74.006,
            "location": "New York",
            "created_at": "2025-03-01T08:30:00.123456",
            "rating": {"id": 9, "flavor": 4, "acidic": 3, "aroma": 5, "appearance": 4, "bitter": 2, "overall": 4},
            "coffee": {"id": 2, "name": "Kenya AA", "price": "18.00",
                       "brand": {"id": 1, "name": "Onyx", "country": "USA"}}
        })
    }

    #[test]
    fn test_parse_full_brewing() {
        let b: Brewing = serde_json::from_value(brewing_json()).unwrap();
        assert_eq!(b.coffee_name(), "Kenya AA");
        assert_eq!(b.brand_name(), Some("Onyx"));
        assert_eq!(b.overall(), Some(4));
        assert_eq!(b.coordinates(), Some((40.7128, -74.006)));
        assert!(b.belongs_to_coffee(2));
        assert!(!b.belongs_to_coffee(3));
    }

    #[test]
    fn test_parse_minimal_brewing() {
        let b: Brewing = serde_json::from_value(serde_json::json!({
            "id": 1, "method": "AeroPress", "grams": 17, "ml": 220,
            "created_at": "2025-03-01T08:30:00", "rating": null, "coffee": null
        }))
        .unwrap();
        assert_eq!(b.coffee_name(), "Unknown Coffee");
        assert_eq!(b.overall(), None);
        assert_eq!(b.coordinates(), None);
    }

    #[test]
    fn test_ratio_display() {
        let mut b: Brewing = serde_json::from_value(brewing_json()).unwrap();
        assert_eq!(b.ratio_display(), "1:16.7");
        b.grams = 0;
        assert_eq!(b.ratio(), None);
        assert_eq!(b.ratio_display(), "-");
    }

    #[test]
    fn test_new_brewing_skips_empty_optionals() {
        let body = serde_json::to_value(NewBrewing {
            coffee_id: 2,
            method: "Chemex".to_string(),
            grams: 30,
            ml: 500,
            notes: None,
            latitude: None,
            longitude: None,
            location: None,
            rating: RatingScores::default(),
        })
        .unwrap();
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("notes"));
        assert!(!obj.contains_key("latitude"));
        assert_eq!(obj["rating"]["flavor"], 3);
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = BrewingUpdate {
            notes: Some("Too bitter".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({"notes": "Too bitter"})
        );
    }

    #[test]
    fn test_sort_by_rating_puts_unrated_first() {
        let rated: Brewing = serde_json::from_value(brewing_json()).unwrap();
        let unrated = Brewing { rating: None, ..rated.clone() };
        assert_eq!(BrewingSortColumn::Rating.compare(&unrated, &rated), Ordering::Less);
    }
}
