pub mod admin;
pub mod affiliate;
pub mod auth;
pub mod branding;
pub mod checkout;
pub mod config;
pub mod courses;
pub mod dashboard;
pub mod health;
pub mod landing_pages;
pub mod learning;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user
/// /auth/profile                                    update profile (PUT)
///
/// /courses                                         catalog (public), create (creator)
/// /courses/mine                                    caller's courses (creator)
/// /courses/{id}                                    get (public), update, delete
///
/// /checkout/process                                synchronous checkout (POST)
/// /checkout/create-checkout-session                hosted checkout (POST)
/// /checkout/session-status                         hosted checkout status (GET)
/// /checkout/webhook                                provider callbacks (POST, public)
/// /checkout/sales                                  creator's sales
/// /checkout/purchases                              caller's purchases
///
/// /dashboard/my-courses                            enrollments with progress
/// /dashboard/stats                                 learning (and teaching) stats
/// /dashboard/recommendations                       course suggestions
///
/// /learning/courses/{course_id}                    outline with unlock state
/// /learning/courses/{course_id}/lessons/complete   complete a lesson (POST)
/// /learning/courses/{course_id}/progress           progress summary
///
/// /affiliate/register                              open an account (POST)
/// /affiliate/me                                    caller's account
/// /affiliate/sales                                 caller's commissions
/// /affiliate/validate/{code}                       public code check
///
/// /landing-pages                                   list, create (creator)
/// /landing-pages/{id}                              get, update, delete (owner)
/// /landing-pages/public/{slug}                     published page (public)
///
/// /branding/me                                     get, upsert (creator)
/// /branding/{creator_id}                           public branding
///
/// /config                                          list (admin), create (admin)
/// /config/{key}                                    get (public), update, delete (admin)
///
/// /admin/webhook-events                            webhook ledger (admin)
/// /admin/webhook-events/{id}/replay                replay an entry (POST, admin)
/// /admin/affiliates/{id}                           update rate/status (PUT, admin)
/// /admin/affiliates/{id}/payout                    pay out pending earnings (POST, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/checkout", checkout::router())
        .nest("/dashboard", dashboard::router())
        .nest("/learning", learning::router())
        .nest("/affiliate", affiliate::router())
        .nest("/landing-pages", landing_pages::router())
        .nest("/branding", branding::router())
        .nest("/config", config::router())
        .nest("/admin", admin::router())
}
