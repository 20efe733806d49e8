//! Payment vocabulary and the sale state machine.
//!
//! Gateways report one of four normalized [`PaymentStatus`] values. Sales
//! persist a [`SaleStatus`]. [`plan_transition`] decides what a status update
//! for an existing sale means, so the webhook path and the synchronous path
//! share one set of rules. All functions here are pure.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const METHOD_CREDIT: &str = "credit";
pub const METHOD_PIX: &str = "pix";
pub const METHOD_BOLETO: &str = "boleto";

pub const VALID_PAYMENT_METHODS: &[&str] = &[METHOD_CREDIT, METHOD_PIX, METHOD_BOLETO];

pub const SALE_PENDING: &str = "pending";
pub const SALE_COMPLETED: &str = "completed";
pub const SALE_FAILED: &str = "failed";
pub const SALE_REFUNDED: &str = "refunded";

pub const VALID_SALE_STATUSES: &[&str] = &[SALE_PENDING, SALE_COMPLETED, SALE_FAILED, SALE_REFUNDED];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Credit,
    Pix,
    Boleto,
}

impl PaymentMethod {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            METHOD_CREDIT => Ok(Self::Credit),
            METHOD_PIX => Ok(Self::Pix),
            METHOD_BOLETO => Ok(Self::Boleto),
            _ => Err(format!(
                "Invalid payment method '{s}'. Must be one of: {}",
                VALID_PAYMENT_METHODS.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => METHOD_CREDIT,
            Self::Pix => METHOD_PIX,
            Self::Boleto => METHOD_BOLETO,
        }
    }
}

/// Normalized gateway status. Every provider-specific value maps into this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    /// Parse a normalized status as stored in the webhook ledger.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("Invalid payment status '{s}'")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Refunded => "refunded",
        }
    }
}

/// Persisted status of a sale row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl SaleStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SALE_PENDING => Ok(Self::Pending),
            SALE_COMPLETED => Ok(Self::Completed),
            SALE_FAILED => Ok(Self::Failed),
            SALE_REFUNDED => Ok(Self::Refunded),
            _ => Err(format!(
                "Invalid sale status '{s}'. Must be one of: {}",
                VALID_SALE_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => SALE_PENDING,
            Self::Completed => SALE_COMPLETED,
            Self::Failed => SALE_FAILED,
            Self::Refunded => SALE_REFUNDED,
        }
    }

    /// Status written for a brand-new sale, from the gateway's first answer.
    ///
    /// `approved` completes the sale, `pending` keeps it open, and anything
    /// else (including an odd immediate `refunded`) records a failure.
    pub fn initial(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Approved => Self::Completed,
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Rejected | PaymentStatus::Refunded => Self::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// What applying a gateway status to an existing sale amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do: duplicate delivery, same status, or a backwards move.
    Unchanged,
    /// `pending -> completed`. Grants access and posts commission.
    Complete,
    /// `pending -> failed`.
    Fail,
    /// `pending|completed -> refunded`. `reverse_commission` is set when the
    /// sale had been completed, so an affiliate credit exists.
    Refund { reverse_commission: bool },
}

impl Transition {
    /// Status the sale ends up in, if it changes.
    pub fn target(&self) -> Option<SaleStatus> {
        match self {
            Self::Unchanged => None,
            Self::Complete => Some(SaleStatus::Completed),
            Self::Fail => Some(SaleStatus::Failed),
            Self::Refund { .. } => Some(SaleStatus::Refunded),
        }
    }
}

/// Decide the transition for `current` when the gateway reports `incoming`.
///
/// Sales only move forward: `pending -> completed|failed|refunded` and
/// `completed -> refunded`. `failed` and `refunded` are terminal. A pending
/// report never moves anything.
pub fn plan_transition(current: SaleStatus, incoming: PaymentStatus) -> Transition {
    match (current, incoming) {
        (SaleStatus::Pending, PaymentStatus::Approved) => Transition::Complete,
        (SaleStatus::Pending, PaymentStatus::Rejected) => Transition::Fail,
        (SaleStatus::Pending, PaymentStatus::Refunded) => Transition::Refund {
            reverse_commission: false,
        },
        (SaleStatus::Completed, PaymentStatus::Refunded) => Transition::Refund {
            reverse_commission: true,
        },
        _ => Transition::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_db_value() {
        for m in [PaymentMethod::Credit, PaymentMethod::Pix, PaymentMethod::Boleto] {
            assert_eq!(PaymentMethod::from_str_value(m.as_str()).unwrap(), m);
        }
        assert!(PaymentMethod::from_str_value("paypal").is_err());
    }

    #[test]
    fn payment_status_parses_ledger_values() {
        for s in [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::from_str_value(s.as_str()).unwrap(), s);
        }
        assert!(PaymentStatus::from_str_value("succeeded").is_err());
    }

    #[test]
    fn initial_status_mapping() {
        assert_eq!(SaleStatus::initial(PaymentStatus::Approved), SaleStatus::Completed);
        assert_eq!(SaleStatus::initial(PaymentStatus::Pending), SaleStatus::Pending);
        assert_eq!(SaleStatus::initial(PaymentStatus::Rejected), SaleStatus::Failed);
        assert_eq!(SaleStatus::initial(PaymentStatus::Refunded), SaleStatus::Failed);
    }

    #[test]
    fn pending_sale_transitions() {
        assert_eq!(
            plan_transition(SaleStatus::Pending, PaymentStatus::Approved),
            Transition::Complete
        );
        assert_eq!(
            plan_transition(SaleStatus::Pending, PaymentStatus::Rejected),
            Transition::Fail
        );
        assert_eq!(
            plan_transition(SaleStatus::Pending, PaymentStatus::Pending),
            Transition::Unchanged
        );
        assert_eq!(
            plan_transition(SaleStatus::Pending, PaymentStatus::Refunded),
            Transition::Refund {
                reverse_commission: false
            }
        );
    }

    #[test]
    fn repeated_approval_is_unchanged() {
        assert_eq!(
            plan_transition(SaleStatus::Completed, PaymentStatus::Approved),
            Transition::Unchanged
        );
    }

    #[test]
    fn completed_sale_can_only_be_refunded() {
        assert_eq!(
            plan_transition(SaleStatus::Completed, PaymentStatus::Refunded),
            Transition::Refund {
                reverse_commission: true
            }
        );
        assert_eq!(
            plan_transition(SaleStatus::Completed, PaymentStatus::Rejected),
            Transition::Unchanged
        );
        assert_eq!(
            plan_transition(SaleStatus::Completed, PaymentStatus::Pending),
            Transition::Unchanged
        );
    }

    #[test]
    fn terminal_statuses_never_move() {
        for incoming in [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Rejected,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(plan_transition(SaleStatus::Failed, incoming), Transition::Unchanged);
            assert_eq!(plan_transition(SaleStatus::Refunded, incoming), Transition::Unchanged);
        }
    }

    #[test]
    fn transition_targets() {
        assert_eq!(Transition::Unchanged.target(), None);
        assert_eq!(Transition::Complete.target(), Some(SaleStatus::Completed));
        assert_eq!(Transition::Fail.target(), Some(SaleStatus::Failed));
        assert_eq!(
            Transition::Refund {
                reverse_commission: true
            }
            .target(),
            Some(SaleStatus::Refunded)
        );
    }
}
