pub mod client;
pub mod model;
pub mod report;
pub mod table;
pub mod validate;

pub use client::{ClubClient, ClubError, LookupOutcome};
pub use model::Customer;
