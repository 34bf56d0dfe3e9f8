use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A registered account as seen by the marketplace. Only the identity
/// provider ever touches credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Reference to a user embedded in ads and proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Toys,
    Electronics,
    Sports,
    Home,
    Books,
    Clothes,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Toys,
        Category::Electronics,
        Category::Sports,
        Category::Home,
        Category::Books,
        Category::Clothes,
        Category::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Toys => "toys",
            Self::Electronics => "electronics",
            Self::Sports => "sports",
            Self::Home => "home",
            Self::Books => "books",
            Self::Clothes => "clothes",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Toys => "Игрушки",
            Self::Electronics => "Электроника",
            Self::Sports => "Товары для спорта",
            Self::Home => "Товары для дома",
            Self::Books => "Книги и журналы",
            Self::Clothes => "Одежда",
            Self::Other => "Другое",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| UnknownCode { kind: "category", value: s.to_string() })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::New, Condition::Used];

    pub fn code(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "Новый",
            Self::Used => "Б/у",
        }
    }
}

impl FromStr for Condition {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| UnknownCode { kind: "condition", value: s.to_string() })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A listed item available for trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: i64,
    pub owner: UserRef,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: Category,
    pub condition: Condition,
    pub created_at: DateTime<Utc>,
}

/// The slice of an ad embedded in a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRef {
    pub id: i64,
    pub title: String,
    pub owner: UserRef,
}

/// Lifecycle of an exchange proposal. Stored and exchanged as the
/// single-letter codes `W` (waiting), `Y` and `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    #[serde(rename = "W")]
    Pending,
    #[serde(rename = "Y")]
    Accepted,
    #[serde(rename = "N")]
    Rejected,
}

impl ProposalStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "W",
            Self::Accepted => "Y",
            Self::Rejected => "N",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Ожидает",
            Self::Accepted => "Принято",
            Self::Rejected => "Отклонено",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for ProposalStatus {
    type Err = UnknownCode;

    /// Accepts the storage codes as well as the spelled-out names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "pending" => Ok(Self::Pending),
            "y" | "accepted" => Ok(Self::Accepted),
            "n" | "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownCode { kind: "status", value: s.to_string() }),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An offer to trade `ad_sender` for `ad_receiver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeProposal {
    pub id: i64,
    pub proposer: UserRef,
    pub ad_sender: AdRef,
    pub ad_receiver: AdRef,
    pub comment: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

/// Ad listing filters; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    pub category: Option<Category>,
    pub condition: Option<Condition>,
    /// Case-insensitive substring of the title or the description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalFilter {
    /// Stored status code, matched exactly. A code that is not `W`, `Y` or
    /// `N` simply matches nothing.
    pub status: Option<String>,
    /// Matches the proposer.
    pub sender_user_id: Option<Uuid>,
    /// Matches the owner of the receiving ad.
    pub receiver_user_id: Option<Uuid>,
}
