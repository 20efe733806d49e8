//! The gateway trait and the provider-neutral request/response types.

use async_trait::async_trait;
use coursemart_core::payment::{PaymentMethod, PaymentStatus};
use coursemart_core::types::{Cents, DbId};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::webhook::WebhookPolicy;

/// Data attached to every payment that must come back unchanged in webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub course_id: DbId,
    pub user_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub name: String,
    pub email: String,
    /// CPF/CNPJ. Required by some providers for boleto.
    pub document: Option<String>,
}

/// Tokenized card data. Raw card numbers never reach the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetails {
    pub token: String,
    #[serde(default = "default_installments")]
    pub installments: u32,
}

fn default_installments() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount_cents: Cents,
    pub method: PaymentMethod,
    pub description: String,
    pub buyer: Buyer,
    pub card: Option<CardDetails>,
    pub metadata: PaymentMetadata,
}

/// PIX payment instructions shown to the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixInstructions {
    /// Copy-and-paste PIX code.
    pub qr_code: String,
    /// PNG of the QR code, base64-encoded. Not every provider returns one.
    pub qr_code_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub transaction_id: String,
    pub status: PaymentStatus,
    /// Client secret for confirming a card payment on the frontend (Stripe).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixInstructions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boleto_url: Option<String>,
}

impl PaymentResult {
    pub fn new(transaction_id: impl Into<String>, status: PaymentStatus) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status,
            client_secret: None,
            pix: None,
            boleto_url: None,
        }
    }
}

/// A verified, normalized webhook notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookUpdate {
    pub transaction_id: String,
    /// Provider payment behind `transaction_id` when the two differ, e.g.
    /// the PaymentIntent of a Stripe Checkout Session. Later events for
    /// that payment (refunds) are keyed by this id.
    pub payment_reference: Option<String>,
    pub status: PaymentStatus,
    /// Raw provider status, kept for the ledger.
    pub provider_status: String,
    pub metadata: Option<PaymentMetadata>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub amount_cents: Cents,
    pub title: String,
    pub buyer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Hosted page the buyer is redirected to.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub status: PaymentStatus,
}

/// A payment provider.
///
/// Implementations must normalize every provider status into
/// [`PaymentStatus`]; anything unrecognized becomes `Pending`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short provider name, recorded in the webhook ledger.
    fn provider(&self) -> &'static str;

    /// Header carrying the webhook signature for this provider.
    fn signature_header(&self) -> &'static str;

    /// Whether webhook deliveries are verified, accepted blindly, or refused.
    fn webhook_policy(&self) -> WebhookPolicy;

    /// Charge the buyer. Card payments usually settle here; PIX and boleto
    /// come back `Pending` with instructions for the buyer.
    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentResult, GatewayError>;

    /// Verify and interpret a webhook delivery.
    ///
    /// Returns `Ok(None)` for verified events that carry no payment status
    /// change (other event types), and `Err(GatewayError::Signature)` when
    /// the signature does not check out.
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<WebhookUpdate>, GatewayError>;

    /// Start a hosted checkout.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Current status of a hosted checkout.
    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;
}
