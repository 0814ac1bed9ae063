//! Entity declarations

pub mod macros;
pub mod school;

pub use school::{Event, Exam, Fee, Grade, Leave, Room, School, Staff, Tenant, Term};
