use serde::{Deserialize, Serialize};

/// Lowest score a rating dimension accepts
pub const MIN_SCORE: u8 = 1;

/// Highest score a rating dimension accepts
pub const MAX_SCORE: u8 = 5;

/// Score new brewings start with on every dimension
pub const DEFAULT_SCORE: u8 = 3;

/// A stored rating, as attached to a brewing by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub flavor: u8,
    pub acidic: u8,
    pub aroma: u8,
    pub appearance: u8,
    pub bitter: u8,
    pub overall: u8,
}

impl Rating {
    pub fn scores(&self) -> RatingScores {
        RatingScores {
            flavor: self.flavor,
            acidic: self.acidic,
            aroma: self.aroma,
            appearance: self.appearance,
            bitter: self.bitter,
        }
    }
}

/// The five scores a user gives a brewing. This is the shape the backend
/// takes on create; it computes `overall` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScores {
    pub flavor: u8,
    pub acidic: u8,
    pub aroma: u8,
    pub appearance: u8,
    pub bitter: u8,
}

impl Default for RatingScores {
    fn default() -> Self {
        Self {
            flavor: DEFAULT_SCORE,
            acidic: DEFAULT_SCORE,
            aroma: DEFAULT_SCORE,
            appearance: DEFAULT_SCORE,
            bitter: DEFAULT_SCORE,
        }
    }
}

impl RatingScores {
    pub fn get(&self, dimension: RatingDimension) -> u8 {
        match dimension {
            RatingDimension::Flavor => self.flavor,
            RatingDimension::Aroma => self.aroma,
            RatingDimension::Acidity => self.acidic,
            RatingDimension::Appearance => self.appearance,
            RatingDimension::Bitterness => self.bitter,
        }
    }

    /// Set a score, clamped to the accepted range.
    pub fn set(&mut self, dimension: RatingDimension, score: u8) {
        let score = score.clamp(MIN_SCORE, MAX_SCORE);
        match dimension {
            RatingDimension::Flavor => self.flavor = score,
            RatingDimension::Aroma => self.aroma = score,
            RatingDimension::Acidity => self.acidic = score,
            RatingDimension::Appearance => self.appearance = score,
            RatingDimension::Bitterness => self.bitter = score,
        }
    }

    pub fn is_valid(&self) -> bool {
        RatingDimension::ALL
            .iter()
            .all(|d| (MIN_SCORE..=MAX_SCORE).contains(&self.get(*d)))
    }

    /// Mean of the five scores rounded to the nearest whole score, the same
    /// figure the backend stores as `overall`.
    ///
    /// Five integer scores never average to an exact half, so rounding mode
    /// does not matter.
    pub fn overall(&self) -> u8 {
        let sum: u32 = RatingDimension::ALL
            .iter()
            .map(|d| u32::from(self.get(*d)))
            .sum();
        let count = RatingDimension::ALL.len() as u32;
        ((sum + count / 2) / count) as u8
    }
}

/// One axis of a rating, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingDimension {
    Flavor,
    Aroma,
    Acidity,
    Appearance,
    Bitterness,
}

impl RatingDimension {
    pub const ALL: [RatingDimension; 5] = [
        RatingDimension::Flavor,
        RatingDimension::Aroma,
        RatingDimension::Acidity,
        RatingDimension::Appearance,
        RatingDimension::Bitterness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RatingDimension::Flavor => "Flavor",
            RatingDimension::Aroma => "Aroma",
            RatingDimension::Acidity => "Acidity",
            RatingDimension::Appearance => "Appearance",
            RatingDimension::Bitterness => "Bitterness",
        }
    }
}

/// Render a score as filled and empty stars, e.g. `★★★☆☆`.
pub fn stars(score: u8) -> String {
    let filled = score.min(MAX_SCORE) as usize;
    let empty = MAX_SCORE as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(flavor: u8, acidic: u8, aroma: u8, appearance: u8, bitter: u8) -> RatingScores {
        RatingScores {
            flavor,
            acidic,
            aroma,
            appearance,
            bitter,
        }
    }

    #[test]
    fn test_overall_exact_mean() {
        assert_eq!(scores(3, 3, 3, 3, 3).overall(), 3);
        assert_eq!(scores(5, 5, 5, 5, 5).overall(), 5);
        assert_eq!(scores(1, 2, 3, 4, 5).overall(), 3);
    }

    #[test]
    fn test_overall_rounds_to_nearest() {
        // 7 / 5 = 1.4
        assert_eq!(scores(1, 1, 1, 2, 2).overall(), 1);
        // 8 / 5 = 1.6
        assert_eq!(scores(1, 1, 2, 2, 2).overall(), 2);
        // 22 / 5 = 4.4
        assert_eq!(scores(4, 4, 4, 5, 5).overall(), 4);
        // 23 / 5 = 4.6
        assert_eq!(scores(4, 4, 5, 5, 5).overall(), 5);
    }

    #[test]
    fn test_set_clamps() {
        let mut s = RatingScores::default();
        s.set(RatingDimension::Flavor, 9);
        s.set(RatingDimension::Bitterness, 0);
        assert_eq!(s.flavor, MAX_SCORE);
        assert_eq!(s.bitter, MIN_SCORE);
        assert!(s.is_valid());
    }

    #[test]
    fn test_acidity_maps_to_acidic_field() {
        let mut s = RatingScores::default();
        s.set(RatingDimension::Acidity, 5);
        assert_eq!(s.acidic, 5);
        assert_eq!(s.get(RatingDimension::Acidity), 5);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        assert!(!scores(0, 3, 3, 3, 3).is_valid());
        assert!(!scores(3, 3, 3, 3, 6).is_valid());
    }

    #[test]
    fn test_create_body_shape() {
        let json = serde_json::to_value(RatingScores::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"flavor": 3, "acidic": 3, "aroma": 3, "appearance": 3, "bitter": 3})
        );
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(7), "★★★★★");
    }
}
