use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};

use barter_types::api::{Claims, CreateProposalRequest, ProposalListQuery, ProposalListResponse};
use barter_types::models::ProposalStatus;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{PROPOSALS_PATH, run_db};

/// GET /proposals?status=&sender=&receiver=
pub async fn list_proposals(
    State(state): State<AppState>,
    Query(query): Query<ProposalListQuery>,
) -> Result<Json<ProposalListResponse>, ApiError> {
    let filter = query.filter()?;
    let proposals = run_db(&state, move |db| db.list_proposals(&filter)).await?;

    Ok(Json(ProposalListResponse {
        proposals,
        status: query.status.filter(|s| !s.is_empty()),
        sender_id: query.sender.unwrap_or_default(),
        receiver_id: query.receiver.unwrap_or_default(),
    }))
}

pub async fn create_proposal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposer = claims.user();
    let proposal = run_db(&state, move |db| {
        db.create_proposal(&proposer, req.ad_sender, req.ad_receiver, &req.comment)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

/// POST /proposals/{id}/status/{status}
///
/// Always redirects to the proposal list, whether the decision was applied
/// or absorbed. Only a missing proposal surfaces as an error.
pub async fn set_status(
    State(state): State<AppState>,
    Path((id, status)): Path<(i64, String)>,
    Extension(claims): Extension<Claims>,
) -> Result<Redirect, ApiError> {
    let requester = claims.user();
    let requested = status.parse::<ProposalStatus>().ok();

    run_db(&state, move |db| db.update_proposal_status(id, &requester, requested)).await?;

    Ok(Redirect::to(PROPOSALS_PATH))
}
