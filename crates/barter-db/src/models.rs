//! Database row types, mapped straight from SQLite columns.
//! Converted into the `barter-types` models at the repository boundary.

use barter_types::models::{Ad, AdRef, ExchangeProposal, UserRef};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Error;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

pub struct AdRow {
    pub id: i64,
    pub owner_id: String,
    pub owner_username: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub condition: String,
    pub created_at: DateTime<Utc>,
}

pub struct AdRefRow {
    pub id: i64,
    pub title: String,
    pub owner_id: String,
    pub owner_username: String,
}

pub struct ProposalRow {
    pub id: i64,
    pub proposer_id: String,
    pub proposer_username: String,
    pub ad_sender: AdRefRow,
    pub ad_receiver: AdRefRow,
    pub comment: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn parse_user_id(raw: &str) -> Result<Uuid, Error> {
    raw.parse()
        .map_err(|e| Error::Corrupt(format!("user id '{raw}': {e}")))
}

impl TryFrom<AdRow> for Ad {
    type Error = Error;

    fn try_from(row: AdRow) -> Result<Self, Error> {
        let corrupt = |e: barter_types::models::UnknownCode| {
            Error::Corrupt(format!("ad {}: {e}", row.id))
        };
        Ok(Ad {
            id: row.id,
            owner: UserRef {
                id: parse_user_id(&row.owner_id)?,
                username: row.owner_username,
            },
            category: row.category.parse().map_err(corrupt)?,
            condition: row.condition.parse().map_err(corrupt)?,
            title: row.title,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<AdRefRow> for AdRef {
    type Error = Error;

    fn try_from(row: AdRefRow) -> Result<Self, Error> {
        Ok(AdRef {
            id: row.id,
            title: row.title,
            owner: UserRef {
                id: parse_user_id(&row.owner_id)?,
                username: row.owner_username,
            },
        })
    }
}

impl TryFrom<ProposalRow> for ExchangeProposal {
    type Error = Error;

    fn try_from(row: ProposalRow) -> Result<Self, Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| Error::Corrupt(format!("proposal {}: {e}", row.id)))?;
        Ok(ExchangeProposal {
            id: row.id,
            proposer: UserRef {
                id: parse_user_id(&row.proposer_id)?,
                username: row.proposer_username,
            },
            ad_sender: row.ad_sender.try_into()?,
            ad_receiver: row.ad_receiver.try_into()?,
            comment: row.comment,
            status,
            created_at: row.created_at,
        })
    }
}
