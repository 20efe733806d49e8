//! Mercado Pago adapter.
//!
//! Direct payments go through `POST /v1/payments` (PIX, boleto, card).
//! Hosted checkout uses Checkout Pro preferences; the preference carries an
//! `external_reference` that doubles as our session id, so the payments it
//! produces reconcile against the same sale.
//!
//! Webhook notifications only carry the payment id. After the signature
//! checks out, the payment is fetched to learn its status and metadata.

use async_trait::async_trait;
use coursemart_core::money::{self, major_from_cents};
use coursemart_core::payment::{PaymentMethod, PaymentStatus};
use coursemart_core::signature::{self, SignatureError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::gateway::{
    CheckoutSession, CheckoutSessionRequest, PaymentGateway, PaymentMetadata, PaymentRequest,
    PaymentResult, PixInstructions, SessionStatus, WebhookUpdate,
};
use crate::status;
use crate::webhook::{WebhookPolicy, WebhookVerifier};

pub const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";
pub const SIGNATURE_HEADER: &str = "x-signature";

const BOLETO_METHOD_ID: &str = "bolbradesco";

pub struct MercadoPagoGateway {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
    webhook: WebhookVerifier,
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct Payment {
    id: i64,
    status: String,
    external_reference: Option<String>,
    #[serde(default)]
    metadata: Value,
    point_of_interaction: Option<PointOfInteraction>,
    transaction_details: Option<TransactionDetails>,
}

#[derive(Debug, Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
    ticket_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionDetails {
    external_resource_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Preference {
    init_point: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    results: Vec<Payment>,
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<NotificationData>,
}

#[derive(Debug, Deserialize)]
struct NotificationData {
    id: Value,
}

impl NotificationData {
    /// Payment ids arrive as strings or numbers depending on the topic.
    fn id_string(&self) -> Option<String> {
        match &self.id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl MercadoPagoGateway {
    pub fn new(
        access_token: String,
        webhook_secret: Option<String>,
        allow_unsigned: bool,
        api_base: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            access_token,
            webhook: WebhookVerifier::new(webhook_secret, allow_unsigned),
        }
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_base))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        parse_response(response).await
    }
}

/// JSON body for `POST /v1/payments`.
fn payment_body(request: &PaymentRequest) -> Result<Value, GatewayError> {
    let mut payer = json!({
        "email": request.buyer.email,
        "first_name": request.buyer.name,
    });
    if let Some(document) = &request.buyer.document {
        let kind = if document.chars().filter(char::is_ascii_digit).count() > 11 {
            "CNPJ"
        } else {
            "CPF"
        };
        payer["identification"] = json!({ "type": kind, "number": document });
    }

    let mut body = json!({
        "transaction_amount": major_from_cents(request.amount_cents),
        "description": request.description,
        "payer": payer,
        "metadata": request.metadata,
    });

    match request.method {
        PaymentMethod::Pix => body["payment_method_id"] = json!("pix"),
        PaymentMethod::Boleto => {
            if request.buyer.document.is_none() {
                return Err(GatewayError::InvalidRequest(
                    "Buyer document (CPF/CNPJ) is required for boleto".into(),
                ));
            }
            body["payment_method_id"] = json!(BOLETO_METHOD_ID);
        }
        PaymentMethod::Credit => {
            let card = request
                .card
                .as_ref()
                .ok_or_else(|| GatewayError::InvalidRequest("Card token is required".into()))?;
            body["token"] = json!(card.token);
            body["installments"] = json!(card.installments.max(1));
        }
    }

    Ok(body)
}

/// Signed manifest for the `x-signature` header.
fn signature_manifest(data_id: &str, timestamp: i64) -> String {
    format!("id:{};ts:{timestamp};", data_id.to_ascii_lowercase())
}

fn verify_manifest(
    secret: &str,
    header: Option<&str>,
    data_id: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let header = signature::parse_header(header.ok_or(SignatureError::Missing)?)?;
    signature::check_timestamp(header.timestamp, now, signature::DEFAULT_TOLERANCE_SECS)?;
    let manifest = signature_manifest(data_id, header.timestamp);
    if header
        .signatures
        .iter()
        .any(|sig| signature::verify(secret, manifest.as_bytes(), sig))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn result_from_payment(payment: Payment) -> PaymentResult {
    let mut result = PaymentResult::new(payment.id.to_string(), status::from_mercadopago(&payment.status));
    let data = payment.point_of_interaction.and_then(|p| p.transaction_data);
    if let Some(data) = data {
        if let Some(qr_code) = data.qr_code {
            result.pix = Some(PixInstructions {
                qr_code,
                qr_code_base64: data.qr_code_base64,
            });
        }
        result.boleto_url = data.ticket_url;
    }
    if result.boleto_url.is_none() {
        result.boleto_url = payment.transaction_details.and_then(|d| d.external_resource_url);
    }
    result
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GatewayError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn provider(&self) -> &'static str {
        "mercadopago"
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn webhook_policy(&self) -> WebhookPolicy {
        self.webhook.policy()
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentResult, GatewayError> {
        let body = payment_body(request)?;
        let payment: Payment = self.post_json("/v1/payments", &body).await?;
        Ok(result_from_payment(payment))
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<Option<WebhookUpdate>, GatewayError> {
        let notification: Notification = serde_json::from_slice(payload)?;
        let data_id = notification
            .data
            .as_ref()
            .and_then(NotificationData::id_string)
            .ok_or_else(|| GatewayError::MalformedPayload("notification without data.id".into()))?;

        let now = chrono::Utc::now().timestamp();
        self.webhook.verify_with(self.provider(), |secret| {
            verify_manifest(secret, signature, &data_id, now)
        })?;

        if notification.kind.as_deref() != Some("payment") {
            return Ok(None);
        }

        let payment: Payment = self.get(&format!("/v1/payments/{data_id}")).await?;
        let metadata = serde_json::from_value::<PaymentMetadata>(payment.metadata.clone()).ok();
        Ok(Some(WebhookUpdate {
            transaction_id: payment
                .external_reference
                .clone()
                .unwrap_or_else(|| payment.id.to_string()),
            payment_reference: None,
            status: status::from_mercadopago(&payment.status),
            provider_status: payment.status,
            metadata,
        }))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let session_id = format!("mp_{}", uuid::Uuid::new_v4().simple());
        let body = json!({
            "items": [{
                "title": request.title,
                "quantity": 1,
                "unit_price": major_from_cents(request.amount_cents),
                "currency_id": money::CURRENCY,
            }],
            "payer": { "email": request.buyer_email },
            "back_urls": {
                "success": request.success_url,
                "failure": request.cancel_url,
                "pending": request.success_url,
            },
            "auto_return": "approved",
            "external_reference": session_id,
            "metadata": request.metadata,
        });
        let preference: Preference = self.post_json("/checkout/preferences", &body).await?;
        Ok(CheckoutSession {
            session_id,
            url: preference.init_point,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let search: SearchResults = self
            .get(&format!(
                "/v1/payments/search?external_reference={session_id}&sort=date_created&criteria=desc"
            ))
            .await?;
        let status = search
            .results
            .first()
            .map(|p| status::from_mercadopago(&p.status))
            .unwrap_or(PaymentStatus::Pending);
        Ok(SessionStatus {
            session_id: session_id.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Buyer;
    use assert_matches::assert_matches;

    fn request(method: PaymentMethod, document: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            amount_cents: 29_700,
            method,
            description: "Course".into(),
            buyer: Buyer {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                document: document.map(str::to_string),
            },
            card: None,
            metadata: PaymentMetadata {
                course_id: 7,
                user_id: 3,
                affiliate_code: None,
            },
        }
    }

    #[test]
    fn pix_body_uses_major_units_and_metadata() {
        let body = payment_body(&request(PaymentMethod::Pix, None)).unwrap();
        assert_eq!(body["payment_method_id"], "pix");
        assert_eq!(body["transaction_amount"], 297.0);
        assert_eq!(body["metadata"]["course_id"], 7);
    }

    #[test]
    fn boleto_body_requires_and_classifies_document() {
        assert_matches!(
            payment_body(&request(PaymentMethod::Boleto, None)),
            Err(GatewayError::InvalidRequest(_))
        );
        let body = payment_body(&request(PaymentMethod::Boleto, Some("123.456.789-09"))).unwrap();
        assert_eq!(body["payer"]["identification"]["type"], "CPF");
        let body = payment_body(&request(PaymentMethod::Boleto, Some("12.345.678/0001-95"))).unwrap();
        assert_eq!(body["payer"]["identification"]["type"], "CNPJ");
    }

    #[test]
    fn pix_payment_result_carries_qr() {
        let payment: Payment = serde_json::from_value(json!({
            "id": 42,
            "status": "pending",
            "point_of_interaction": {
                "transaction_data": {"qr_code": "000201...", "qr_code_base64": "iVBOR..."}
            }
        }))
        .unwrap();
        let result = result_from_payment(payment);
        assert_eq!(result.transaction_id, "42");
        assert_eq!(result.status, PaymentStatus::Pending);
        assert_eq!(result.pix.unwrap().qr_code_base64.as_deref(), Some("iVBOR..."));
    }

    #[test]
    fn manifest_signature() {
        let ts = 1_700_000_000;
        let digest = signature::sign("mp_secret", signature_manifest("ABC123", ts).as_bytes());
        let header = format!("ts={ts},v1={digest}");
        assert!(verify_manifest("mp_secret", Some(&header), "abc123", ts + 10).is_ok());
        assert_eq!(
            verify_manifest("mp_secret", Some(&header), "other", ts),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_manifest("mp_secret", None, "abc123", ts),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn replayed_manifest_outside_tolerance_is_expired() {
        let ts = 1_700_000_000;
        let digest = signature::sign("mp_secret", signature_manifest("abc123", ts).as_bytes());
        let header = format!("ts={ts},v1={digest}");
        assert_eq!(
            verify_manifest("mp_secret", Some(&header), "abc123", ts + 301),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            verify_manifest("mp_secret", Some(&header), "abc123", ts - 301),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            verify_manifest("mp_secret", Some("ts=-9223372036854775808,v1=00"), "abc123", ts),
            Err(SignatureError::Expired)
        );
    }

    #[tokio::test]
    async fn bad_signature_rejected_before_any_fetch() {
        let gw = MercadoPagoGateway::new(
            "token".into(),
            Some("mp_secret".into()),
            false,
            Some("http://127.0.0.1:9".into()),
        );
        let body = br#"{"type":"payment","data":{"id":"99"}}"#;
        let fresh = format!("ts={},v1=00", chrono::Utc::now().timestamp());
        assert_matches!(
            gw.handle_webhook(body, Some(&fresh)).await,
            Err(GatewayError::Signature(SignatureError::Mismatch))
        );
        assert_matches!(
            gw.handle_webhook(body, Some("ts=1,v1=00")).await,
            Err(GatewayError::Signature(SignatureError::Expired))
        );
    }

    #[tokio::test]
    async fn non_payment_topics_are_ignored() {
        let gw = MercadoPagoGateway::new("token".into(), None, true, Some("http://127.0.0.1:9".into()));
        let body = br#"{"type":"merchant_order","data":{"id":5}}"#;
        assert!(gw.handle_webhook(body, None).await.unwrap().is_none());
    }
}
