pub mod image;
pub mod office;
pub mod pagination;
pub mod reservation;
pub mod tag;
pub mod user;
