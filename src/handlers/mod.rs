pub mod ai;
pub mod auth;
pub mod diagnosis;
pub mod health;
pub mod profiles;
pub mod reports;
