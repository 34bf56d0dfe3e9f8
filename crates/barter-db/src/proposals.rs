use barter_types::models::{ExchangeProposal, ProposalFilter, ProposalStatus, UserRef};
use barter_types::policy::can_decide_proposal;
use barter_types::status::{IgnoreReason, Transition, transition};
use barter_types::validation::{ValidationErrors, validate_comment};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use tracing::{debug, info};

use crate::ads::query_ad;
use crate::models::{AdRefRow, ProposalRow};
use crate::{Database, Error, Result};

const PROPOSAL_SELECT: &str = "SELECT p.id, p.proposer_id, pu.username, p.comment, p.status, p.created_at,
        s.id, s.title, s.owner_id, su.username,
        r.id, r.title, r.owner_id, ru.username
     FROM proposals p
     JOIN users pu ON pu.id = p.proposer_id
     JOIN ads s ON s.id = p.ad_sender_id
     JOIN users su ON su.id = s.owner_id
     JOIN ads r ON r.id = p.ad_receiver_id
     JOIN users ru ON ru.id = r.owner_id";

/// What happened to a status change request.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub proposal: ExchangeProposal,
    pub transition: Transition,
}

impl Database {
    /// Offer `ad_sender_id` (which the proposer must own) in exchange for
    /// `ad_receiver_id` (which they must not). New proposals are always
    /// pending.
    pub fn create_proposal(
        &self,
        proposer: &UserRef,
        ad_sender_id: i64,
        ad_receiver_id: i64,
        comment: &str,
    ) -> Result<ExchangeProposal> {
        let proposal = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut errors = ValidationErrors::default();

            match query_ad(&tx, ad_sender_id)? {
                None => errors.add("ad_sender", "ad does not exist"),
                Some(ad) if ad.owner.id != proposer.id => {
                    errors.add("ad_sender", "you can only offer your own ads")
                }
                Some(_) => {}
            }
            match query_ad(&tx, ad_receiver_id)? {
                None => errors.add("ad_receiver", "ad does not exist"),
                Some(ad) if ad.owner.id == proposer.id => {
                    errors.add("ad_receiver", "you cannot propose an exchange for your own ad")
                }
                Some(_) => {}
            }
            let comment = match validate_comment(comment) {
                Ok(comment) => comment,
                Err(e) => {
                    errors.errors.extend(e.errors);
                    String::new()
                }
            };
            errors.finish(())?;

            tx.execute(
                "INSERT INTO proposals (proposer_id, ad_sender_id, ad_receiver_id, comment, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    proposer.id.to_string(),
                    ad_sender_id,
                    ad_receiver_id,
                    comment,
                    ProposalStatus::Pending.code(),
                    Utc::now(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            let proposal = query_proposal(&tx, id)?.ok_or(Error::not_found("proposal", id))?;
            tx.commit()?;
            Ok(proposal)
        })?;

        info!(
            proposal_id = proposal.id,
            proposer = %proposer.username,
            ad_sender = ad_sender_id,
            ad_receiver = ad_receiver_id,
            "Proposal created"
        );
        Ok(proposal)
    }

    pub fn get_proposal(&self, id: i64) -> Result<ExchangeProposal> {
        self.with_conn(|conn| query_proposal(conn, id))?
            .ok_or(Error::not_found("proposal", id))
    }

    /// All proposals matching `filter`, newest first. Not paginated.
    pub fn list_proposals(&self, filter: &ProposalFilter) -> Result<Vec<ExchangeProposal>> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(status) = &filter.status {
            params.push(Value::Text(status.clone()));
            clauses.push(format!("p.status = ?{}", params.len()));
        }
        if let Some(sender) = filter.sender_user_id {
            params.push(Value::Text(sender.to_string()));
            clauses.push(format!("p.proposer_id = ?{}", params.len()));
        }
        if let Some(receiver) = filter.receiver_user_id {
            params.push(Value::Text(receiver.to_string()));
            clauses.push(format!("r.owner_id = ?{}", params.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!("{PROPOSAL_SELECT} {where_clause} ORDER BY p.created_at DESC, p.id DESC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), proposal_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(ExchangeProposal::try_from).collect()
        })
    }

    /// Ask for a decision on a proposal.
    ///
    /// Only a missing proposal is an error. Requests from anyone but the
    /// owner of the receiving ad, requests for anything but `Accepted` or
    /// `Rejected`, and requests against an already decided proposal are
    /// absorbed and reported back as [`Transition::Ignored`].
    pub fn update_proposal_status(
        &self,
        id: i64,
        requester: &UserRef,
        requested: Option<ProposalStatus>,
    ) -> Result<StatusUpdate> {
        let update = self.with_conn(|conn| {
            let mut proposal = query_proposal(conn, id)?.ok_or(Error::not_found("proposal", id))?;

            let mut outcome = transition(
                proposal.status,
                requested,
                can_decide_proposal(requester, &proposal),
            );

            if let Transition::Applied(status) = outcome {
                // Guarded so a concurrent decision cannot be overwritten.
                let changed = conn.execute(
                    "UPDATE proposals SET status = ?1 WHERE id = ?2 AND status = ?3",
                    rusqlite::params![status.code(), id, ProposalStatus::Pending.code()],
                )?;
                if changed == 1 {
                    proposal.status = status;
                } else {
                    outcome = Transition::Ignored(IgnoreReason::AlreadyDecided);
                }
            }

            Ok(StatusUpdate { proposal, transition: outcome })
        })?;

        match update.transition {
            Transition::Applied(status) => info!(
                proposal_id = id,
                decider = %requester.username,
                status = %status,
                "Proposal decided"
            ),
            Transition::Ignored(reason) => debug!(
                proposal_id = id,
                requester = %requester.username,
                ?requested,
                ?reason,
                "Proposal status request ignored"
            ),
        }
        Ok(update)
    }
}

fn query_proposal(conn: &Connection, id: i64) -> Result<Option<ExchangeProposal>> {
    conn.query_row(&format!("{PROPOSAL_SELECT} WHERE p.id = ?1"), [id], proposal_row)
        .optional()?
        .map(ExchangeProposal::try_from)
        .transpose()
}

fn proposal_row(row: &Row<'_>) -> rusqlite::Result<ProposalRow> {
    Ok(ProposalRow {
        id: row.get(0)?,
        proposer_id: row.get(1)?,
        proposer_username: row.get(2)?,
        comment: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        ad_sender: AdRefRow {
            id: row.get(6)?,
            title: row.get(7)?,
            owner_id: row.get(8)?,
            owner_username: row.get(9)?,
        },
        ad_receiver: AdRefRow {
            id: row.get(10)?,
            title: row.get(11)?,
            owner_id: row.get(12)?,
            owner_username: row.get(13)?,
        },
    })
}
