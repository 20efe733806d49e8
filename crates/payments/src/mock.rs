//! Deterministic in-process gateway.
//!
//! - card payments are approved immediately;
//! - PIX and boleto come back pending with placeholder instructions;
//! - any amount whose cents end in `13` (e.g. `10.13`) is rejected, so
//!   declined-card paths can be exercised;
//! - webhooks are plain JSON `{transaction_id, status, payment_reference?, metadata?}`, signed
//!   with a `t=...,v1=...` header when a secret is configured.

use async_trait::async_trait;
use coursemart_core::payment::{PaymentMethod, PaymentStatus};
use coursemart_core::signature::{self, DEFAULT_TOLERANCE_SECS};
use serde::Deserialize;

use crate::error::GatewayError;
use crate::gateway::{
    CheckoutSession, CheckoutSessionRequest, PaymentGateway, PaymentMetadata, PaymentRequest,
    PaymentResult, PixInstructions, SessionStatus, WebhookUpdate,
};
use crate::status;
use crate::webhook::{WebhookPolicy, WebhookVerifier};

pub const SIGNATURE_HEADER: &str = "x-mock-signature";

/// Amounts ending in this many cents are declined.
pub const DECLINE_CENTS: i64 = 13;

/// Base64 of `mock-pix-qr-code`.
const MOCK_QR_PNG: &str = "bW9jay1waXgtcXItY29kZQ==";

const MOCK_HOST: &str = "https://payments.mock.local";

pub struct MockGateway {
    webhook: WebhookVerifier,
}

#[derive(Debug, Deserialize)]
struct MockWebhook {
    transaction_id: String,
    status: String,
    #[serde(default)]
    payment_reference: Option<String>,
    #[serde(default)]
    metadata: Option<PaymentMetadata>,
}

impl MockGateway {
    pub fn new(webhook_secret: Option<String>, allow_unsigned: bool) -> Self {
        Self {
            webhook: WebhookVerifier::new(webhook_secret, allow_unsigned),
        }
    }

    /// Signature header for `payload` as the mock provider would send it, or
    /// `None` without a secret.
    pub fn sign_webhook(&self, payload: &[u8]) -> Option<String> {
        let secret = self.webhook.secret()?;
        Some(signature::build_header(secret, payload, chrono::Utc::now().timestamp()))
    }

    fn new_id(prefix: &str) -> String {
        format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn provider(&self) -> &'static str {
        "mock"
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn webhook_policy(&self) -> WebhookPolicy {
        self.webhook.policy()
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentResult, GatewayError> {
        if request.amount_cents <= 0 {
            return Err(GatewayError::InvalidRequest("Amount must be positive".into()));
        }

        let transaction_id = Self::new_id("mock");
        if request.amount_cents % 100 == DECLINE_CENTS {
            return Ok(PaymentResult::new(transaction_id, PaymentStatus::Rejected));
        }

        let result = match request.method {
            PaymentMethod::Credit => PaymentResult::new(transaction_id, PaymentStatus::Approved),
            PaymentMethod::Pix => {
                let qr_code = format!("00020126580014br.gov.bcb.pix0136{transaction_id}5204000053039865802BR");
                PaymentResult {
                    pix: Some(PixInstructions {
                        qr_code,
                        qr_code_base64: Some(MOCK_QR_PNG.to_string()),
                    }),
                    ..PaymentResult::new(transaction_id, PaymentStatus::Pending)
                }
            }
            PaymentMethod::Boleto => PaymentResult {
                boleto_url: Some(format!("{MOCK_HOST}/boleto/{transaction_id}")),
                ..PaymentResult::new(transaction_id, PaymentStatus::Pending)
            },
        };

        tracing::debug!(
            transaction_id = %result.transaction_id,
            status = result.status.as_str(),
            "Mock payment processed"
        );
        Ok(result)
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<WebhookUpdate>, GatewayError> {
        let now = chrono::Utc::now().timestamp();
        self.webhook.verify_with(self.provider(), |secret| {
            signature::verify_timestamped(secret, signature, payload, DEFAULT_TOLERANCE_SECS, now)
        })?;

        let event: MockWebhook = serde_json::from_slice(payload)?;
        Ok(Some(WebhookUpdate {
            status: status::from_generic(&event.status),
            transaction_id: event.transaction_id,
            payment_reference: event.payment_reference,
            provider_status: event.status,
            metadata: event.metadata,
        }))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if request.amount_cents <= 0 {
            return Err(GatewayError::InvalidRequest("Amount must be positive".into()));
        }
        let session_id = Self::new_id("cs_mock");
        Ok(CheckoutSession {
            url: format!("{MOCK_HOST}/checkout/{session_id}"),
            session_id,
        })
    }

    /// The mock keeps no state: sessions stay pending until a webhook
    /// settles the sale.
    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        Ok(SessionStatus {
            session_id: session_id.to_string(),
            status: PaymentStatus::Pending,
        })
    }
}
