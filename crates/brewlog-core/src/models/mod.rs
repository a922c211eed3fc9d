//! Data models for the brewing journal.
//!
//! These mirror the backend's JSON:
//!
//! - `Brewing`, `NewBrewing`, `BrewingUpdate`: journal entries
//! - `Coffee`, `CoffeeDetail`, `CoffeeBrand`: the coffee catalog
//! - `Rating`, `RatingScores`: the five-dimension quality rating

pub mod brewing;
pub mod coffee;
pub mod rating;

pub use brewing::{Brewing, BrewingSortColumn, BrewingUpdate, NewBrewing};
pub use coffee::{Coffee, CoffeeBrand, CoffeeDetail, NewCoffee, NewCoffeeBrand};
pub use rating::{Rating, RatingDimension, RatingScores};
