use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use barter_types::api::{
    AdForm, AdListQuery, AdListResponse, CatalogueResponse, ChoiceEntry, Claims, NoticeResponse,
};
use barter_types::models::{Ad, Category, Condition, ProposalStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{ADS_PATH, run_db};

/// GET /ads?category=&condition=&q=&page= — one page of ads, newest first.
pub async fn list_ads(
    State(state): State<AppState>,
    Query(query): Query<AdListQuery>,
) -> Result<Json<AdListResponse>, ApiError> {
    let filter = query.filter()?;

    let db_filter = filter.clone();
    let requested_page = query.page.clone();
    let page = run_db(&state, move |db| db.list_ads(&db_filter, requested_page.as_deref())).await?;

    Ok(Json(AdListResponse {
        page,
        category: filter.category,
        condition: filter.condition,
        search_query: filter.search.unwrap_or_default(),
    }))
}

pub async fn get_ad(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ad>, ApiError> {
    let ad = run_db(&state, move |db| db.get_ad(id)).await?;
    Ok(Json(ad))
}

pub async fn create_ad(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(form): Json<AdForm>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claims.user();
    let ad = run_db(&state, move |db| db.create_ad(&owner, &form)).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

/// PUT /ads/{id} — owner-only; anyone else gets 403 and a pointer back to
/// the listing.
pub async fn update_ad(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(form): Json<AdForm>,
) -> Result<Json<Ad>, ApiError> {
    let requester = claims.user();
    let ad = run_db(&state, move |db| db.update_ad(id, &requester, &form)).await?;
    Ok(Json(ad))
}

/// DELETE /ads/{id} — also removes every proposal involving the ad.
pub async fn delete_ad(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NoticeResponse>, ApiError> {
    let requester = claims.user();
    run_db(&state, move |db| db.delete_ad(id, &requester)).await?;

    Ok(Json(NoticeResponse {
        message: "Ad deleted".to_string(),
        redirect: ADS_PATH.to_string(),
    }))
}

/// GET /me/ads — the caller's own ads, i.e. what they can offer in a
/// proposal.
pub async fn my_ads(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Ad>>, ApiError> {
    let owner_id = claims.sub;
    let ads = run_db(&state, move |db| db.list_ads_by_owner(owner_id)).await?;
    Ok(Json(ads))
}

/// GET /catalogue — the choice lists for ad and proposal fields.
pub async fn catalogue() -> Json<CatalogueResponse> {
    Json(CatalogueResponse {
        categories: Category::ALL
            .into_iter()
            .map(|c| ChoiceEntry { code: c.code(), label: c.label() })
            .collect(),
        conditions: Condition::ALL
            .into_iter()
            .map(|c| ChoiceEntry { code: c.code(), label: c.label() })
            .collect(),
        statuses: [ProposalStatus::Pending, ProposalStatus::Accepted, ProposalStatus::Rejected]
            .into_iter()
            .map(|s| ChoiceEntry { code: s.code(), label: s.label() })
            .collect(),
    })
}
