//! Creator branding model.

use coursemart_core::branding::{BrandColors, Typography};
use coursemart_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `brandings` table (one per creator).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Branding {
    pub id: DbId,
    pub creator_id: DbId,
    pub logo_url: Option<String>,
    pub colors: Json<BrandColors>,
    pub typography: Json<Typography>,
    pub custom_domain: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing a creator's branding.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBranding {
    pub logo_url: Option<String>,
    #[serde(default)]
    pub colors: BrandColors,
    #[serde(default)]
    pub typography: Typography,
    pub custom_domain: Option<String>,
}
