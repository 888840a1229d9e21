//! Domain models for the point-of-sale backend

mod product;
mod purchase;
mod sales;
mod supplier;
mod user;

pub use product::*;
pub use purchase::*;
pub use sales::*;
pub use supplier::*;
pub use user::*;
