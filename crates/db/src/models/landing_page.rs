//! Landing page model and DTOs.

use coursemart_core::landing::{HeroBlock, Layout, Section};
use coursemart_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `landing_pages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LandingPage {
    pub id: DbId,
    pub creator_id: DbId,
    pub course_id: Option<DbId>,
    pub slug: String,
    pub title: String,
    pub hero: Json<HeroBlock>,
    pub sections: Json<Vec<Section>>,
    pub layout: Json<Layout>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLandingPage {
    pub course_id: Option<DbId>,
    pub slug: String,
    pub title: String,
    pub hero: HeroBlock,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLandingPage {
    pub course_id: Option<DbId>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub hero: Option<HeroBlock>,
    pub sections: Option<Vec<Section>>,
    pub layout: Option<Layout>,
    pub is_published: Option<bool>,
}
