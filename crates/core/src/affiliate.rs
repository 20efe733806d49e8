//! Affiliate program vocabulary: account/sale statuses and referral codes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Commission rate (percent) given to newly registered affiliates.
pub const DEFAULT_COMMISSION_RATE: f64 = 10.0;

/// Length of a generated affiliate code.
pub const CODE_LENGTH: usize = 8;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const AFFILIATE_ACTIVE: &str = "active";
pub const AFFILIATE_INACTIVE: &str = "inactive";
pub const AFFILIATE_SUSPENDED: &str = "suspended";

pub const VALID_AFFILIATE_STATUSES: &[&str] =
    &[AFFILIATE_ACTIVE, AFFILIATE_INACTIVE, AFFILIATE_SUSPENDED];

pub const COMMISSION_PENDING: &str = "pending";
pub const COMMISSION_APPROVED: &str = "approved";
pub const COMMISSION_PAID: &str = "paid";
pub const COMMISSION_CANCELLED: &str = "cancelled";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of an affiliate account. Only `active` accounts earn commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliateStatus {
    Active,
    Inactive,
    Suspended,
}

impl AffiliateStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            AFFILIATE_ACTIVE => Ok(Self::Active),
            AFFILIATE_INACTIVE => Ok(Self::Inactive),
            AFFILIATE_SUSPENDED => Ok(Self::Suspended),
            _ => Err(format!(
                "Invalid affiliate status '{s}'. Must be one of: {}",
                VALID_AFFILIATE_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => AFFILIATE_ACTIVE,
            Self::Inactive => AFFILIATE_INACTIVE,
            Self::Suspended => AFFILIATE_SUSPENDED,
        }
    }
}

/// Status of a single commission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliateSaleStatus {
    Pending,
    Approved,
    Paid,
    Cancelled,
}

impl AffiliateSaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => COMMISSION_PENDING,
            Self::Approved => COMMISSION_APPROVED,
            Self::Paid => COMMISSION_PAID,
            Self::Cancelled => COMMISSION_CANCELLED,
        }
    }
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// Generate a random referral code (uppercase, no ambiguous `0/O/1/I`).
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-supplied code for lookup (trimmed, uppercase).
///
/// Returns `None` for an empty code so callers can skip the lookup.
pub fn normalize_code(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Validate an admin-supplied affiliate status string.
pub fn validate_status(status: &str) -> Result<AffiliateStatus, CoreError> {
    AffiliateStatus::from_str_value(status).map_err(CoreError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_alphabet() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  ab12cd34 ").as_deref(), Some("AB12CD34"));
        assert_eq!(normalize_code("   "), None);
    }

    #[test]
    fn status_values() {
        assert_eq!(validate_status("active").unwrap(), AffiliateStatus::Active);
        assert_eq!(AffiliateStatus::Suspended.as_str(), "suspended");
        assert!(validate_status("banned").is_err());
        assert_eq!(AffiliateSaleStatus::Approved.as_str(), "approved");
    }
}
