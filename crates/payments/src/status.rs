//! Provider status vocabularies mapped onto [`PaymentStatus`].
//!
//! Unknown values map to `Pending` so an unrecognized status can never grant
//! access on its own.

use coursemart_core::payment::PaymentStatus;

/// Stripe PaymentIntent `status`.
pub fn from_stripe_intent(status: &str) -> PaymentStatus {
    match status {
        "succeeded" => PaymentStatus::Approved,
        "canceled" => PaymentStatus::Rejected,
        // processing, requires_payment_method, requires_confirmation,
        // requires_action, requires_capture
        _ => PaymentStatus::Pending,
    }
}

/// Stripe Checkout Session `status` + `payment_status`.
pub fn from_stripe_session(status: &str, payment_status: &str) -> PaymentStatus {
    match (status, payment_status) {
        (_, "paid") | (_, "no_payment_required") => PaymentStatus::Approved,
        ("expired", _) => PaymentStatus::Rejected,
        _ => PaymentStatus::Pending,
    }
}

/// Mercado Pago payment `status`.
pub fn from_mercadopago(status: &str) -> PaymentStatus {
    match status {
        "approved" => PaymentStatus::Approved,
        "rejected" | "cancelled" => PaymentStatus::Rejected,
        "refunded" | "charged_back" => PaymentStatus::Refunded,
        // pending, in_process, authorized, in_mediation
        _ => PaymentStatus::Pending,
    }
}

/// Generic vocabulary used by the mock gateway and admin tooling.
pub fn from_generic(status: &str) -> PaymentStatus {
    match status.trim().to_ascii_lowercase().as_str() {
        "approved" | "paid" | "succeeded" | "completed" => PaymentStatus::Approved,
        "rejected" | "failed" | "declined" | "canceled" | "cancelled" => PaymentStatus::Rejected,
        "refunded" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_intent_statuses() {
        assert_eq!(from_stripe_intent("succeeded"), PaymentStatus::Approved);
        assert_eq!(from_stripe_intent("canceled"), PaymentStatus::Rejected);
        assert_eq!(from_stripe_intent("requires_action"), PaymentStatus::Pending);
        assert_eq!(from_stripe_intent("processing"), PaymentStatus::Pending);
    }

    #[test]
    fn stripe_session_statuses() {
        assert_eq!(from_stripe_session("complete", "paid"), PaymentStatus::Approved);
        assert_eq!(from_stripe_session("complete", "unpaid"), PaymentStatus::Pending);
        assert_eq!(from_stripe_session("expired", "unpaid"), PaymentStatus::Rejected);
        assert_eq!(from_stripe_session("open", "unpaid"), PaymentStatus::Pending);
    }

    #[test]
    fn mercadopago_statuses() {
        assert_eq!(from_mercadopago("approved"), PaymentStatus::Approved);
        assert_eq!(from_mercadopago("in_process"), PaymentStatus::Pending);
        assert_eq!(from_mercadopago("cancelled"), PaymentStatus::Rejected);
        assert_eq!(from_mercadopago("charged_back"), PaymentStatus::Refunded);
    }

    #[test]
    fn unknown_values_stay_pending() {
        for raw in ["", "weird", "APPROVED_MAYBE", "authorized"] {
            assert_eq!(from_mercadopago(raw), PaymentStatus::Pending, "{raw}");
            assert_eq!(from_stripe_intent(raw), PaymentStatus::Pending, "{raw}");
        }
        assert_eq!(from_generic("something"), PaymentStatus::Pending);
    }

    #[test]
    fn generic_is_case_insensitive() {
        assert_eq!(from_generic(" Approved "), PaymentStatus::Approved);
        assert_eq!(from_generic("FAILED"), PaymentStatus::Rejected);
        assert_eq!(from_generic("refunded"), PaymentStatus::Refunded);
    }
}
