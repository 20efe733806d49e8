//! Repository layer: one zero-sized struct per table (or flow), each method
//! taking `&PgPool`.

pub mod affiliate_repo;
pub mod app_config_repo;
pub mod branding_repo;
pub mod checkout_repo;
pub mod course_repo;
pub mod dashboard_repo;
pub mod enrollment_repo;
pub mod landing_page_repo;
pub mod sale_repo;
pub mod user_repo;
pub mod webhook_event_repo;

pub use affiliate_repo::AffiliateRepo;
pub use app_config_repo::AppConfigRepo;
pub use branding_repo::BrandingRepo;
pub use checkout_repo::{AccessGrant, CheckoutRepo, Reconciliation, RecordedSale};
pub use course_repo::{CourseRepo, NewCourse};
pub use dashboard_repo::DashboardRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use landing_page_repo::LandingPageRepo;
pub use sale_repo::SaleRepo;
pub use user_repo::UserRepo;
pub use webhook_event_repo::{NewWebhookEvent, WebhookEventRepo};
