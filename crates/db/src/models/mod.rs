//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod affiliate;
pub mod app_config;
pub mod branding;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod landing_page;
pub mod sale;
pub mod user;
pub mod webhook_event;
