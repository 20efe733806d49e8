//! Domain logic for the course marketplace.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db`,
//! `payments`, and `api` crates build on these types and rules.

pub mod affiliate;
pub mod branding;
pub mod course;
pub mod error;
pub mod landing;
pub mod money;
pub mod payment;
pub mod progress;
pub mod roles;
pub mod search;
pub mod signature;
pub mod types;
