//! Statement execution against a session

pub mod executor;

pub use executor::Query;
