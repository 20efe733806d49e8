//! Payment gateway adapters.
//!
//! Every provider sits behind the [`PaymentGateway`] trait and speaks the
//! normalized vocabulary from [`coursemart_core::payment`]. The checkout flow
//! never sees provider-specific statuses or payloads.
//!
//! - [`stripe`] -- PaymentIntents and hosted Checkout Sessions.
//! - [`mercadopago`] -- `/v1/payments` for PIX, boleto and card.
//! - [`mock`] -- deterministic in-process gateway for development and tests.

pub mod config;
pub mod error;
pub mod gateway;
pub mod mercadopago;
pub mod mock;
pub mod status;
pub mod stripe;
mod webhook;

pub use config::{build_gateway, PaymentConfig, Provider};
pub use error::GatewayError;
pub use gateway::{
    Buyer, CardDetails, CheckoutSession, CheckoutSessionRequest, PaymentGateway, PaymentMetadata,
    PaymentRequest, PaymentResult, PixInstructions, SessionStatus, WebhookUpdate,
};
pub use webhook::WebhookPolicy;
