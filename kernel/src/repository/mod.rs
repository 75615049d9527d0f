pub mod auth;
pub mod health;
pub mod office;
pub mod reservation;
pub mod tag;
pub mod user;
