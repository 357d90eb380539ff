//! Database entities.

pub mod report;

pub use report::Entity as Report;
