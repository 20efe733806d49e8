use std::sync::Arc;

use crate::gateway::PaymentGateway;
use crate::mercadopago::MercadoPagoGateway;
use crate::mock::MockGateway;
use crate::stripe::StripeGateway;

/// Which adapter backs the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Stripe,
    MercadoPago,
    Mock,
}

impl Provider {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "mercadopago" | "mercado_pago" => Ok(Self::MercadoPago),
            "mock" => Ok(Self::Mock),
            other => Err(format!(
                "Invalid payment provider '{other}'. Must be one of: stripe, mercadopago, mock"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::MercadoPago => "mercadopago",
            Self::Mock => "mock",
        }
    }
}

/// Payment provider configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub provider: Provider,
    /// Stripe secret key or Mercado Pago access token.
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    /// Override for the provider API base URL (tests, sandboxes).
    pub api_base_url: Option<String>,
    /// Accept webhooks without a signature when no secret is configured.
    pub allow_unsigned_webhooks: bool,
    pub success_url: String,
    pub cancel_url: String,
}

impl PaymentConfig {
    /// Load payment configuration from environment variables.
    ///
    /// | Env Var                      | Required           | Default                           |
    /// |------------------------------|--------------------|-----------------------------------|
    /// | `PAYMENT_PROVIDER`           | no                 | `mock`                            |
    /// | `STRIPE_SECRET_KEY`          | for `stripe`       | --                                |
    /// | `STRIPE_WEBHOOK_SECRET`      | in production      | --                                |
    /// | `MERCADOPAGO_ACCESS_TOKEN`   | for `mercadopago`  | --                                |
    /// | `MERCADOPAGO_WEBHOOK_SECRET` | in production      | --                                |
    /// | `MOCK_WEBHOOK_SECRET`        | no                 | --                                |
    /// | `PAYMENT_API_BASE_URL`       | no                 | provider default                  |
    /// | `CHECKOUT_SUCCESS_URL`       | no                 | `http://localhost:5173/checkout/success` |
    /// | `CHECKOUT_CANCEL_URL`        | no                 | `http://localhost:5173/checkout/cancel`  |
    ///
    /// # Panics
    ///
    /// Panics on an unknown provider, a missing provider key, or a missing
    /// webhook secret for a real provider when `production` is set.
    pub fn from_env(production: bool) -> Self {
        let provider = Provider::from_str_value(
            &std::env::var("PAYMENT_PROVIDER").unwrap_or_else(|_| "mock".into()),
        )
        .expect("PAYMENT_PROVIDER must be stripe, mercadopago, or mock");

        let (key_var, secret_var) = match provider {
            Provider::Stripe => (Some("STRIPE_SECRET_KEY"), "STRIPE_WEBHOOK_SECRET"),
            Provider::MercadoPago => (Some("MERCADOPAGO_ACCESS_TOKEN"), "MERCADOPAGO_WEBHOOK_SECRET"),
            Provider::Mock => (None, "MOCK_WEBHOOK_SECRET"),
        };

        let secret_key = key_var.map(|var| {
            let key = std::env::var(var)
                .unwrap_or_else(|_| panic!("{var} must be set for PAYMENT_PROVIDER={}", provider.as_str()));
            assert!(!key.is_empty(), "{var} must not be empty");
            key
        });

        let webhook_secret = non_empty_var(secret_var);
        assert!(
            !production || provider == Provider::Mock || webhook_secret.is_some(),
            "{secret_var} must be set in production"
        );

        Self {
            provider,
            secret_key,
            webhook_secret,
            api_base_url: non_empty_var("PAYMENT_API_BASE_URL"),
            allow_unsigned_webhooks: !production,
            success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:5173/checkout/success".into()),
            cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:5173/checkout/cancel".into()),
        }
    }

    /// Mock provider without a webhook secret, for local runs and tests.
    pub fn mock() -> Self {
        Self {
            provider: Provider::Mock,
            secret_key: None,
            webhook_secret: None,
            api_base_url: None,
            allow_unsigned_webhooks: true,
            success_url: "http://localhost:5173/checkout/success".into(),
            cancel_url: "http://localhost:5173/checkout/cancel".into(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Instantiate the configured adapter.
pub fn build_gateway(config: &PaymentConfig) -> Arc<dyn PaymentGateway> {
    let secret_key = config.secret_key.clone().unwrap_or_default();
    match config.provider {
        Provider::Stripe => Arc::new(StripeGateway::new(
            secret_key,
            config.webhook_secret.clone(),
            config.allow_unsigned_webhooks,
            config.api_base_url.clone(),
        )),
        Provider::MercadoPago => Arc::new(MercadoPagoGateway::new(
            secret_key,
            config.webhook_secret.clone(),
            config.allow_unsigned_webhooks,
            config.api_base_url.clone(),
        )),
        Provider::Mock => Arc::new(MockGateway::new(
            config.webhook_secret.clone(),
            config.allow_unsigned_webhooks,
        )),
    }
}
