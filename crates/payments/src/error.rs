use coursemart_core::signature::SignatureError;

/// Errors from a payment gateway adapter.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The request cannot be sent as built (e.g. card payment without a token).
    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    /// The webhook signature did not verify.
    #[error("Webhook signature rejected: {0}")]
    Signature(#[from] SignatureError),

    /// The provider answered with something we could not interpret.
    #[error("Malformed gateway payload: {0}")]
    MalformedPayload(String),

    /// The operation is not offered by this provider.
    #[error("Operation not supported by {provider}: {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}
