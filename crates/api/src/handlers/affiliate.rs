//! Handlers for the `/affiliate` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursemart_core::affiliate::{generate_code, normalize_code, DEFAULT_COMMISSION_RATE};
use coursemart_core::error::CoreError;
use coursemart_core::types::DbId;
use coursemart_db::models::affiliate::Affiliate;
use coursemart_db::repositories::AffiliateRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fresh codes tried before giving up on a registration.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Response for the public code check. Says nothing about the affiliate
/// beyond whether the code earns commission and at what rate.
#[derive(Debug, Serialize)]
pub struct CodeValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
}

/// POST /api/affiliate/register
///
/// Open an affiliate account for the caller with a generated referral code.
pub async fn register(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    if AffiliateRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Already registered as an affiliate".into(),
        )));
    }

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code();
        match AffiliateRepo::create(&state.pool, auth.user_id, &code, DEFAULT_COMMISSION_RATE).await {
            Ok(affiliate) => {
                tracing::info!(
                    affiliate_id = affiliate.id,
                    user_id = auth.user_id,
                    code = %affiliate.affiliate_code,
                    "Affiliate registered",
                );
                return Ok((StatusCode::CREATED, Json(DataResponse { data: affiliate })));
            }
            Err(e) if is_code_collision(&e) => {
                tracing::debug!(code = %code, "Affiliate code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::InternalError(
        "Could not allocate a unique affiliate code".into(),
    ))
}

/// GET /api/affiliate/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Affiliate>>> {
    let affiliate = own_account(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: affiliate }))
}

/// GET /api/affiliate/sales
pub async fn sales(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let affiliate = own_account(&state, auth.user_id).await?;
    let sales = AffiliateRepo::list_sales(&state.pool, affiliate.id).await?;
    Ok(Json(DataResponse { data: sales }))
}

/// GET /api/affiliate/validate/{code}
///
/// Public. Only active affiliates' codes are valid.
pub async fn validate_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<CodeValidation>>> {
    let affiliate = match normalize_code(&code) {
        Some(code) => AffiliateRepo::find_active_by_code(&state.pool, &code).await?,
        None => None,
    };
    Ok(Json(DataResponse {
        data: CodeValidation {
            valid: affiliate.is_some(),
            commission_rate: affiliate.map(|a| a.commission_rate),
        },
    }))
}

async fn own_account(state: &AppState, user_id: DbId) -> AppResult<Affiliate> {
    AffiliateRepo::find_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No affiliate account for this user".into()))
}

fn is_code_collision(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some("uq_affiliates_code"))
}
