pub mod admin;
pub mod affiliate;
pub mod app_config;
pub mod auth;
pub mod branding;
pub mod checkout;
pub mod courses;
pub mod dashboard;
pub mod landing_pages;
pub mod learning;
