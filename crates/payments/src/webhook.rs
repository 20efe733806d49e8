//! Webhook signature policy shared by the adapters.

use coursemart_core::signature::SignatureError;
use serde::Serialize;

use crate::error::GatewayError;

/// How a gateway treats incoming webhook deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookPolicy {
    /// Every delivery must carry a valid signature.
    Signed,
    /// No secret configured; deliveries are accepted unverified.
    Unsigned,
    /// No secret configured and unsigned deliveries refused: nothing gets in.
    Closed,
}

/// Decides whether a webhook delivery is trusted.
///
/// With a secret configured every delivery must verify. Without one,
/// deliveries are accepted only when `allow_unsigned` is set (non-production),
/// and each acceptance is logged.
#[derive(Debug, Clone)]
pub(crate) struct WebhookVerifier {
    secret: Option<String>,
    allow_unsigned: bool,
}

impl WebhookVerifier {
    pub(crate) fn new(secret: Option<String>, allow_unsigned: bool) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            allow_unsigned,
        }
    }

    pub(crate) fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub(crate) fn policy(&self) -> WebhookPolicy {
        match (&self.secret, self.allow_unsigned) {
            (Some(_), _) => WebhookPolicy::Signed,
            (None, true) => WebhookPolicy::Unsigned,
            (None, false) => WebhookPolicy::Closed,
        }
    }

    /// Run `check` against the configured secret, or apply the unsigned
    /// policy when there is none.
    pub(crate) fn verify_with<F>(&self, provider: &'static str, check: F) -> Result<(), GatewayError>
    where
        F: FnOnce(&str) -> Result<(), SignatureError>,
    {
        match &self.secret {
            Some(secret) => check(secret).map_err(|e| {
                tracing::warn!(provider, error = %e, "Webhook signature rejected");
                GatewayError::Signature(e)
            }),
            None if self.allow_unsigned => {
                tracing::warn!(provider, "Accepting unsigned webhook, no secret configured");
                Ok(())
            }
            None => Err(GatewayError::Signature(SignatureError::Missing)),
        }
    }
}
