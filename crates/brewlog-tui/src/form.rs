//! Form state for the login, register and new brewing screens.
//!
//! Forms only hold what the user typed and turn it into requests. Sending
//! them is the `App`'s job.

use brewlog_core::models::rating::{MAX_SCORE, MIN_SCORE};
use brewlog_core::models::{CoffeeDetail, NewBrewing, RatingDimension, RatingScores};

// ============================================================================
// Constants
// ============================================================================

/// Longest email address we accept (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Limit for free text such as notes and the location label
const MAX_TEXT_LENGTH: usize = 500;

/// Limit for numeric inputs
const MAX_NUMBER_LENGTH: usize = 12;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

fn push_limited(field: &mut String, c: char, max_len: usize) {
    if field.chars().count() < max_len && is_valid_input_char(c) {
        field.push(c);
    }
}

/// Trimmed text, or `None` when nothing but whitespace was typed
fn optional_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Login / register
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Focusable parts of the login and register forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    /// Register only
    Confirm,
    Submit,
    /// Jump to the other form
    Switch,
}

const LOGIN_FIELDS: [AuthField; 4] = [
    AuthField::Email,
    AuthField::Password,
    AuthField::Submit,
    AuthField::Switch,
];

const REGISTER_FIELDS: [AuthField; 5] = [
    AuthField::Email,
    AuthField::Password,
    AuthField::Confirm,
    AuthField::Submit,
    AuthField::Switch,
];

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: AuthField,
    pub error: Option<String>,
    /// A request from this form is in flight
    pub submitting: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode, email: String) -> Self {
        let focus = if email.is_empty() {
            AuthField::Email
        } else {
            AuthField::Password
        };
        Self {
            mode,
            email,
            password: String::new(),
            confirm: String::new(),
            focus,
            error: None,
            submitting: false,
        }
    }

    /// Switch between login and register. The email survives, passwords don't.
    pub fn switch_to(&mut self, mode: AuthMode) {
        let email = std::mem::take(&mut self.email);
        *self = Self::new(mode, email);
    }

    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &LOGIN_FIELDS,
            AuthMode::Register => &REGISTER_FIELDS,
        }
    }

    fn focus_index(&self) -> usize {
        self.fields()
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0)
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        self.focus = fields[(self.focus_index() + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        self.focus = fields[(self.focus_index() + fields.len() - 1) % fields.len()];
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            AuthField::Email => push_limited(&mut self.email, c, MAX_EMAIL_LENGTH),
            AuthField::Password => push_limited(&mut self.password, c, MAX_PASSWORD_LENGTH),
            AuthField::Confirm => push_limited(&mut self.confirm, c, MAX_PASSWORD_LENGTH),
            AuthField::Submit | AuthField::Switch => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            AuthField::Email => {
                self.email.pop();
            }
            AuthField::Password => {
                self.password.pop();
            }
            AuthField::Confirm => {
                self.confirm.pop();
            }
            AuthField::Submit | AuthField::Switch => {}
        }
    }

    /// Email and password ready to send, or the message to show instead.
    pub fn validate(&self) -> Result<(String, String), &'static str> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(FILL_ALL_FIELDS);
        }
        if self.mode == AuthMode::Register {
            if self.confirm.is_empty() {
                return Err(FILL_ALL_FIELDS);
            }
            if self.password != self.confirm {
                return Err(PASSWORDS_DIFFER);
            }
        }
        Ok((email.to_string(), self.password.clone()))
    }

    /// Forget typed passwords, e.g. after a successful submit.
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirm.clear();
    }
}

// ============================================================================
// New brewing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewingField {
    Coffee,
    Method,
    Grams,
    Ml,
    Notes,
    Location,
    Latitude,
    Longitude,
    Score(RatingDimension),
    Submit,
}

impl BrewingField {
    pub const ORDER: [BrewingField; 14] = [
        BrewingField::Coffee,
        BrewingField::Method,
        BrewingField::Grams,
        BrewingField::Ml,
        BrewingField::Notes,
        BrewingField::Location,
        BrewingField::Latitude,
        BrewingField::Longitude,
        BrewingField::Score(RatingDimension::Flavor),
        BrewingField::Score(RatingDimension::Aroma),
        BrewingField::Score(RatingDimension::Acidity),
        BrewingField::Score(RatingDimension::Appearance),
        BrewingField::Score(RatingDimension::Bitterness),
        BrewingField::Submit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BrewingField::Coffee => "Coffee",
            BrewingField::Method => "Method",
            BrewingField::Grams => "Grams",
            BrewingField::Ml => "Water (ml)",
            BrewingField::Notes => "Notes",
            BrewingField::Location => "Location",
            BrewingField::Latitude => "Latitude",
            BrewingField::Longitude => "Longitude",
            BrewingField::Score(d) => d.label(),
            BrewingField::Submit => "Save",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBrewingForm {
    /// Id of the picked coffee, stable across catalog reloads
    pub coffee_id: Option<i64>,
    pub method: String,
    pub grams: String,
    pub ml: String,
    pub notes: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
    pub scores: RatingScores,
    pub focus: BrewingField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl Default for NewBrewingForm {
    fn default() -> Self {
        Self {
            coffee_id: None,
            method: String::new(),
            grams: String::new(),
            ml: String::new(),
            notes: String::new(),
            location: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            scores: RatingScores::default(),
            focus: BrewingField::Coffee,
            error: None,
            submitting: false,
        }
    }
}

impl NewBrewingForm {
    fn focus_index(&self) -> usize {
        BrewingField::ORDER
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0)
    }

    pub fn next_field(&mut self) {
        let len = BrewingField::ORDER.len();
        self.focus = BrewingField::ORDER[(self.focus_index() + 1) % len];
    }

    pub fn prev_field(&mut self) {
        let len = BrewingField::ORDER.len();
        self.focus = BrewingField::ORDER[(self.focus_index() + len - 1) % len];
    }

    /// Text behind a typed field
    pub fn text(&self, field: BrewingField) -> Option<&str> {
        match field {
            BrewingField::Method => Some(&self.method),
            BrewingField::Grams => Some(&self.grams),
            BrewingField::Ml => Some(&self.ml),
            BrewingField::Notes => Some(&self.notes),
            BrewingField::Location => Some(&self.location),
            BrewingField::Latitude => Some(&self.latitude),
            BrewingField::Longitude => Some(&self.longitude),
            BrewingField::Coffee | BrewingField::Score(_) | BrewingField::Submit => None,
        }
    }

    fn text_mut(&mut self, field: BrewingField) -> Option<&mut String> {
        match field {
            BrewingField::Method => Some(&mut self.method),
            BrewingField::Grams => Some(&mut self.grams),
            BrewingField::Ml => Some(&mut self.ml),
            BrewingField::Notes => Some(&mut self.notes),
            BrewingField::Location => Some(&mut self.location),
            BrewingField::Latitude => Some(&mut self.latitude),
            BrewingField::Longitude => Some(&mut self.longitude),
            BrewingField::Coffee | BrewingField::Score(_) | BrewingField::Submit => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            BrewingField::Grams | BrewingField::Ml => {
                if c.is_ascii_digit() {
                    if let Some(field) = self.text_mut(self.focus) {
                        push_limited(field, c, MAX_NUMBER_LENGTH);
                    }
                }
            }
            BrewingField::Latitude | BrewingField::Longitude => {
                if c.is_ascii_digit() || c == '-' || c == '.' {
                    if let Some(field) = self.text_mut(self.focus) {
                        push_limited(field, c, MAX_NUMBER_LENGTH);
                    }
                }
            }
            BrewingField::Score(dimension) => {
                if let Some(score) = c.to_digit(10) {
                    let score = score as u8;
                    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
                        self.scores.set(dimension, score);
                    }
                }
            }
            BrewingField::Coffee | BrewingField::Submit => {}
            field => {
                if let Some(text) = self.text_mut(field) {
                    push_limited(text, c, MAX_TEXT_LENGTH);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.text_mut(self.focus) {
            field.pop();
        }
    }

    /// Left/right on the coffee picker or a score.
    pub fn adjust(&mut self, forward: bool, coffees: &[CoffeeDetail]) {
        match self.focus {
            BrewingField::Coffee if !coffees.is_empty() => {
                let count = coffees.len();
                let current = self
                    .coffee_id
                    .and_then(|id| coffees.iter().position(|c| c.id == id));
                let next = match (current, forward) {
                    (None, true) => 0,
                    (None, false) => count - 1,
                    (Some(i), true) => (i + 1) % count,
                    (Some(i), false) => (i + count - 1) % count,
                };
                self.coffee_id = Some(coffees[next].id);
            }
            BrewingField::Score(dimension) => {
                let current = self.scores.get(dimension);
                let next = if forward {
                    current.saturating_add(1)
                } else {
                    current.saturating_sub(1)
                };
                self.scores.set(dimension, next);
            }
            _ => {}
        }
    }

    /// Overall score the backend will store for the current scores
    pub fn overall_preview(&self) -> u8 {
        self.scores.overall()
    }

    /// The picked coffee, if it is still in the catalog
    pub fn selected_coffee<'a>(&self, coffees: &'a [CoffeeDetail]) -> Option<&'a CoffeeDetail> {
        let id = self.coffee_id?;
        coffees.iter().find(|c| c.id == id)
    }

    /// Build the request body, or the message to show instead.
    pub fn validate(&self, coffees: &[CoffeeDetail]) -> Result<NewBrewing, String> {
        let coffee = self
            .selected_coffee(coffees)
            .ok_or_else(|| "Please select a coffee".to_string())?;

        let method = self.method.trim();
        if method.is_empty() {
            return Err("Please enter a brewing method".to_string());
        }

        if self.grams.is_empty() || self.ml.is_empty() {
            return Err("Please enter grams and ml".to_string());
        }
        let grams = parse_positive(&self.grams)?;
        let ml = parse_positive(&self.ml)?;

        let (latitude, longitude) = self.coordinates()?;

        Ok(NewBrewing {
            coffee_id: coffee.id,
            method: method.to_string(),
            grams,
            ml,
            notes: optional_text(&self.notes),
            latitude,
            longitude,
            location: optional_text(&self.location),
            rating: self.scores,
        })
    }

    fn coordinates(&self) -> Result<(Option<f64>, Option<f64>), String> {
        let lat = self.latitude.trim();
        let lon = self.longitude.trim();
        match (lat.is_empty(), lon.is_empty()) {
            (true, true) => Ok((None, None)),
            (false, false) => {
                let lat: f64 = lat
                    .parse()
                    .map_err(|_| "Latitude must be a number".to_string())?;
                let lon: f64 = lon
                    .parse()
                    .map_err(|_| "Longitude must be a number".to_string())?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err("Latitude must be between -90 and 90".to_string());
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err("Longitude must be between -180 and 180".to_string());
                }
                Ok((Some(lat), Some(lon)))
            }
            _ => Err("Enter both latitude and longitude, or neither".to_string()),
        }
    }
}

fn parse_positive(s: &str) -> Result<i32, String> {
    match s.trim().parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("Grams and ml must be positive whole numbers".to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
