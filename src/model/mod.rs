pub mod basket;
pub mod course;
pub mod customer;
pub mod projections;
pub mod purchase;
pub mod student;

pub use basket::*;
pub use course::*;
pub use customer::*;
pub use projections::*;
pub use purchase::*;
pub use student::*;
