use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Ad, AdFilter, Category, Condition, ExchangeProposal, ProposalFilter, ProposalStatus, UserRef,
};
use crate::pagination::Page;
use crate::validation::ValidationErrors;

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    /// The acting user for repository and policy calls.
    pub fn user(&self) -> UserRef {
        UserRef { id: self.sub, username: self.username.clone() }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Ads --

/// Raw ad submission, used for both create and edit. Missing fields come
/// through as empty strings so validation can name them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdListQuery {
    pub category: Option<String>,
    pub condition: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

impl AdListQuery {
    pub fn filter(&self) -> Result<AdFilter, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let category = non_empty(&self.category).and_then(|v| {
            v.parse::<Category>().map_err(|e| errors.add("category", e.to_string())).ok()
        });
        let condition = non_empty(&self.condition).and_then(|v| {
            v.parse::<Condition>().map_err(|e| errors.add("condition", e.to_string())).ok()
        });
        // Whitespace is part of the needle; only an empty `q` means no search.
        let search = self.q.clone().filter(|q| !q.is_empty());

        errors.finish(AdFilter { category, condition, search })
    }
}

#[derive(Debug, Serialize)]
pub struct AdListResponse {
    pub page: Page<Ad>,
    pub category: Option<Category>,
    pub condition: Option<Condition>,
    pub search_query: String,
}

#[derive(Debug, Serialize)]
pub struct ChoiceEntry {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogueResponse {
    pub categories: Vec<ChoiceEntry>,
    pub conditions: Vec<ChoiceEntry>,
    pub statuses: Vec<ChoiceEntry>,
}

/// Body returned alongside a redirect target, e.g. after deleting an ad
/// or being refused an edit.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub message: String,
    pub redirect: String,
}

// -- Proposals --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProposalRequest {
    pub ad_sender: i64,
    pub ad_receiver: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProposalListQuery {
    pub status: Option<String>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
}

impl ProposalListQuery {
    pub fn filter(&self) -> Result<ProposalFilter, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let status = non_empty(&self.status).map(|v| match v.parse::<ProposalStatus>() {
            Ok(status) => status.code().to_string(),
            Err(_) => v.to_string(),
        });
        let sender_user_id = non_empty(&self.sender).and_then(|v| {
            v.parse::<Uuid>().map_err(|_| errors.add("sender", "not a valid user id")).ok()
        });
        let receiver_user_id = non_empty(&self.receiver).and_then(|v| {
            v.parse::<Uuid>().map_err(|_| errors.add("receiver", "not a valid user id")).ok()
        });

        errors.finish(ProposalFilter { status, sender_user_id, receiver_user_id })
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ExchangeProposal>,
    pub status: Option<String>,
    pub sender_id: String,
    pub receiver_id: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
