pub mod image;
pub mod office;
pub mod reservation;
pub mod tag;
pub mod user;
