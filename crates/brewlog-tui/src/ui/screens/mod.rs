pub mod auth;
pub mod brewings;
pub mod coffees;
pub mod new_brewing;
