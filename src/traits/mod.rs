//! Core traits for the service container.

mod injectable;

pub use injectable::Injectable;
