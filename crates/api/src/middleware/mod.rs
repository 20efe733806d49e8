//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user, resolved from a Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireCreator`] -- requires `creator` or `admin`.
//! - [`rbac::RequireAuth`] -- requires any authenticated user.

pub mod auth;
pub mod rbac;
