//! Stripe adapter: PaymentIntents for direct payments, Checkout Sessions for
//! hosted checkout.
//!
//! Requests are form-encoded as Stripe expects. Metadata is sent as
//! `metadata[key]=value` and comes back as a string map, so it is parsed
//! back into [`PaymentMetadata`] field by field.

use async_trait::async_trait;
use coursemart_core::money;
use coursemart_core::payment::{PaymentMethod, PaymentStatus};
use coursemart_core::signature::{self, DEFAULT_TOLERANCE_SECS};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::gateway::{
    CheckoutSession, CheckoutSessionRequest, PaymentGateway, PaymentMetadata, PaymentRequest,
    PaymentResult, PixInstructions, SessionStatus, WebhookUpdate,
};
use crate::status;
use crate::webhook::{WebhookPolicy, WebhookVerifier};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// HTTP client for the Stripe API.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
    webhook: WebhookVerifier,
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct Intent {
    id: String,
    status: String,
    client_secret: Option<String>,
    next_action: Option<NextAction>,
}

#[derive(Debug, Deserialize)]
struct NextAction {
    pix_display_qr_code: Option<PixQr>,
    boleto_display_details: Option<BoletoDetails>,
}

#[derive(Debug, Deserialize)]
struct PixQr {
    data: String,
}

#[derive(Debug, Deserialize)]
struct BoletoDetails {
    hosted_voucher_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Session {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

impl StripeGateway {
    pub fn new(
        secret_key: String,
        webhook_secret: Option<String>,
        allow_unsigned: bool,
        api_base: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            secret_key,
            webhook: WebhookVerifier::new(webhook_secret, allow_unsigned),
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_base))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        parse_response(response).await
    }
}

/// Form fields for a PaymentIntent.
fn intent_form(request: &PaymentRequest) -> Result<Vec<(String, String)>, GatewayError> {
    let mut form = vec![
        pair("amount", request.amount_cents.to_string()),
        pair("currency", currency()),
        pair("description", &request.description),
        pair("receipt_email", &request.buyer.email),
        pair("confirm", "true"),
    ];

    match request.method {
        PaymentMethod::Credit => {
            let card = request
                .card
                .as_ref()
                .ok_or_else(|| GatewayError::InvalidRequest("Card token is required".into()))?;
            form.push(pair("payment_method_types[]", "card"));
            form.push(pair("payment_method", &card.token));
            if card.installments > 1 {
                form.push(pair(
                    "payment_method_options[card][installments][enabled]",
                    "true",
                ));
            }
        }
        PaymentMethod::Pix => {
            form.push(pair("payment_method_types[]", "pix"));
            form.push(pair("payment_method_data[type]", "pix"));
        }
        PaymentMethod::Boleto => {
            let document = request.buyer.document.as_ref().ok_or_else(|| {
                GatewayError::InvalidRequest("Buyer document (CPF/CNPJ) is required for boleto".into())
            })?;
            form.push(pair("payment_method_types[]", "boleto"));
            form.push(pair("payment_method_data[type]", "boleto"));
            form.push(pair("payment_method_data[boleto][tax_id]", document));
            form.push(pair("payment_method_data[billing_details][name]", &request.buyer.name));
            form.push(pair("payment_method_data[billing_details][email]", &request.buyer.email));
        }
    }

    form.extend(metadata_form("metadata", &request.metadata));
    Ok(form)
}

/// Form fields for a Checkout Session.
fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let success_url = if request.success_url.contains('?') {
        format!("{}&session_id={{CHECKOUT_SESSION_ID}}", request.success_url)
    } else {
        format!("{}?session_id={{CHECKOUT_SESSION_ID}}", request.success_url)
    };

    let mut form = vec![
        pair("mode", "payment"),
        pair("success_url", success_url),
        pair("cancel_url", &request.cancel_url),
        pair("customer_email", &request.buyer_email),
        pair("line_items[0][quantity]", "1"),
        pair("line_items[0][price_data][currency]", currency()),
        pair("line_items[0][price_data][unit_amount]", request.amount_cents.to_string()),
        pair("line_items[0][price_data][product_data][name]", &request.title),
    ];
    form.extend(metadata_form("metadata", &request.metadata));
    form.extend(metadata_form("payment_intent_data[metadata]", &request.metadata));
    form
}

/// Stripe takes lowercase ISO currency codes.
fn currency() -> String {
    money::CURRENCY.to_ascii_lowercase()
}

fn pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

fn metadata_form(prefix: &str, metadata: &PaymentMetadata) -> Vec<(String, String)> {
    let mut fields = vec![
        pair(&format!("{prefix}[course_id]"), metadata.course_id.to_string()),
        pair(&format!("{prefix}[user_id]"), metadata.user_id.to_string()),
    ];
    if let Some(code) = &metadata.affiliate_code {
        fields.push(pair(&format!("{prefix}[affiliate_code]"), code));
    }
    fields
}

/// Rebuild [`PaymentMetadata`] from Stripe's string-valued metadata map.
fn metadata_from_object(object: &Value) -> Option<PaymentMetadata> {
    let map = object.get("metadata")?;
    let number = |key: &str| -> Option<i64> { map.get(key)?.as_str()?.parse().ok() };
    Some(PaymentMetadata {
        course_id: number("course_id")?,
        user_id: number("user_id")?,
        affiliate_code: map
            .get("affiliate_code")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// Map a verified Stripe event onto a status update. Event types that do
/// not move a payment yield `None`.
fn update_from_event(event: &Event) -> Result<Option<WebhookUpdate>, GatewayError> {
    let object = &event.data.object;
    let missing = |field: &str| GatewayError::MalformedPayload(format!("{} without {field}", event.kind));

    let (transaction_id, status) = match event.kind.as_str() {
        "payment_intent.succeeded" => (str_field(object, "id"), PaymentStatus::Approved),
        "payment_intent.payment_failed" | "payment_intent.canceled" => {
            (str_field(object, "id"), PaymentStatus::Rejected)
        }
        "payment_intent.processing" => (str_field(object, "id"), PaymentStatus::Pending),
        "charge.refunded" => (str_field(object, "payment_intent"), PaymentStatus::Refunded),
        "checkout.session.completed" => (
            str_field(object, "id"),
            status::from_stripe_session(
                str_field(object, "status").unwrap_or_default(),
                str_field(object, "payment_status").unwrap_or_default(),
            ),
        ),
        "checkout.session.async_payment_succeeded" => {
            (str_field(object, "id"), PaymentStatus::Approved)
        }
        "checkout.session.async_payment_failed" | "checkout.session.expired" => {
            (str_field(object, "id"), PaymentStatus::Rejected)
        }
        _ => return Ok(None),
    };

    let transaction_id = transaction_id.ok_or_else(|| missing("object id"))?;
    let payment_reference = if event.kind.starts_with("checkout.session.") {
        str_field(object, "payment_intent").map(str::to_string)
    } else {
        None
    };
    Ok(Some(WebhookUpdate {
        transaction_id: transaction_id.to_string(),
        payment_reference,
        status,
        provider_status: event.kind.clone(),
        metadata: metadata_from_object(object),
    }))
}

/// Deserialize a successful response or surface the provider error.
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
impl PaymentGateway for StripeGateway {
    fn provider(&self) -> &'static str {
        "stripe"
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    fn webhook_policy(&self) -> WebhookPolicy {
        self.webhook.policy()
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentResult, GatewayError> {
        let form = intent_form(request)?;
        let intent: Intent = self.post_form("/v1/payment_intents", &form).await?;

        let mut result = PaymentResult::new(intent.id, status::from_stripe_intent(&intent.status));
        result.client_secret = intent.client_secret;
        if let Some(action) = intent.next_action {
            result.pix = action.pix_display_qr_code.map(|qr| PixInstructions {
                qr_code: qr.data,
                qr_code_base64: None,
            });
            result.boleto_url = action.boleto_display_details.and_then(|b| b.hosted_voucher_url);
        }
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

        let event: Event = serde_json::from_slice(payload)?;
        update_from_event(&event)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let session: Session = self
            .post_form("/v1/checkout/sessions", &session_form(request))
            .await?;
        let url = session
            .url
            .ok_or_else(|| GatewayError::MalformedPayload("Checkout session without url".into()))?;
        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let session: Session = self.get(&format!("/v1/checkout/sessions/{session_id}")).await?;
        Ok(SessionStatus {
            status: status::from_stripe_session(
                session.status.as_deref().unwrap_or_default(),
                session.payment_status.as_deref().unwrap_or_default(),
            ),
            session_id: session.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Buyer, CardDetails};
    use assert_matches::assert_matches;
    use coursemart_core::signature::SignatureError;

    fn request(method: PaymentMethod) -> PaymentRequest {
        PaymentRequest {
            amount_cents: 29_700,
            method,
            description: "Course".into(),
            buyer: Buyer {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                document: None,
            },
            card: None,
            metadata: PaymentMetadata {
                course_id: 7,
                user_id: 3,
                affiliate_code: Some("PROMO123".into()),
            },
        }
    }

    fn has(form: &[(String, String)], key: &str, value: &str) -> bool {
        form.iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn card_intent_requires_token() {
        assert_matches!(
            intent_form(&request(PaymentMethod::Credit)),
            Err(GatewayError::InvalidRequest(_))
        );

        let mut req = request(PaymentMethod::Credit);
        req.card = Some(CardDetails {
            token: "pm_card_visa".into(),
            installments: 1,
        });
        let form = intent_form(&req).unwrap();
        assert!(has(&form, "amount", "29700"));
        assert!(has(&form, "currency", "brl"));
        assert!(has(&form, "payment_method", "pm_card_visa"));
        assert!(has(&form, "metadata[affiliate_code]", "PROMO123"));
        assert!(has(&form, "metadata[course_id]", "7"));
    }

    #[test]
    fn boleto_intent_requires_document() {
        assert_matches!(
            intent_form(&request(PaymentMethod::Boleto)),
            Err(GatewayError::InvalidRequest(_))
        );
    }

    #[test]
    fn session_success_url_carries_session_placeholder() {
        let form = session_form(&CheckoutSessionRequest {
            amount_cents: 1_000,
            title: "Course".into(),
            buyer_email: "ana@example.com".into(),
            success_url: "https://app.test/ok".into(),
            cancel_url: "https://app.test/cancel".into(),
            metadata: PaymentMetadata {
                course_id: 1,
                user_id: 2,
                affiliate_code: None,
            },
        });
        assert!(has(&form, "success_url", "https://app.test/ok?session_id={CHECKOUT_SESSION_ID}"));
        assert!(has(&form, "payment_intent_data[metadata][user_id]", "2"));
    }

    fn event(kind: &str, object: Value) -> Event {
        Event {
            kind: kind.into(),
            data: EventData { object },
        }
    }

    #[test]
    fn events_map_to_updates() {
        let succeeded = event(
            "payment_intent.succeeded",
            serde_json::json!({"id": "pi_1", "metadata": {"course_id": "7", "user_id": "3"}}),
        );
        let update = update_from_event(&succeeded).unwrap().unwrap();
        assert_eq!(update.transaction_id, "pi_1");
        assert_eq!(update.status, PaymentStatus::Approved);
        assert_eq!(
            update.metadata,
            Some(PaymentMetadata {
                course_id: 7,
                user_id: 3,
                affiliate_code: None
            })
        );

        let refund = event("charge.refunded", serde_json::json!({"id": "ch_1", "payment_intent": "pi_1"}));
        let update = update_from_event(&refund).unwrap().unwrap();
        assert_eq!(update.transaction_id, "pi_1");
        assert_eq!(update.status, PaymentStatus::Refunded);

        let session = event(
            "checkout.session.completed",
            serde_json::json!({"id": "cs_1", "status": "complete", "payment_status": "unpaid"}),
        );
        assert_eq!(update_from_event(&session).unwrap().unwrap().status, PaymentStatus::Pending);

        let other = event("customer.created", serde_json::json!({"id": "cus_1"}));
        assert!(update_from_event(&other).unwrap().is_none());
    }

    #[test]
    fn session_events_carry_the_payment_intent_refunds_use() {
        let completed = event(
            "checkout.session.completed",
            serde_json::json!({
                "id": "cs_live_1",
                "status": "complete",
                "payment_status": "paid",
                "payment_intent": "pi_live_1"
            }),
        );
        let update = update_from_event(&completed).unwrap().unwrap();
        assert_eq!(update.transaction_id, "cs_live_1");
        assert_eq!(update.payment_reference.as_deref(), Some("pi_live_1"));
        assert_eq!(update.status, PaymentStatus::Approved);

        let refund = event(
            "charge.refunded",
            serde_json::json!({"id": "ch_live_1", "payment_intent": "pi_live_1"}),
        );
        let update = update_from_event(&refund).unwrap().unwrap();
        assert_eq!(update.transaction_id, "pi_live_1");
        assert_eq!(update.payment_reference, None);
    }

    #[tokio::test]
    async fn webhook_signature_is_enforced() {
        let gw = StripeGateway::new("sk_test".into(), Some("whsec_1".into()), false, None);
        let body = serde_json::json!({
            "type": "payment_intent.succeeded",
            "data": {"object": {"id": "pi_9"}}
        })
        .to_string();

        let header = signature::build_header("whsec_1", body.as_bytes(), chrono::Utc::now().timestamp());
        let update = gw.handle_webhook(body.as_bytes(), Some(&header)).await.unwrap().unwrap();
        assert_eq!(update.transaction_id, "pi_9");

        let stale = signature::build_header("whsec_1", body.as_bytes(), chrono::Utc::now().timestamp() - 3_600);
        assert_matches!(
            gw.handle_webhook(body.as_bytes(), Some(&stale)).await,
            Err(GatewayError::Signature(SignatureError::Expired))
        );
    }
}
