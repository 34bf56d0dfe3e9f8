use barter_types::api::AdForm;
use barter_types::models::{Ad, AdFilter, UserRef};
use barter_types::pagination::{PAGE_SIZE, Page, PageWindow};
use barter_types::policy::can_mutate_ad;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use tracing::info;
use uuid::Uuid;

use crate::models::AdRow;
use crate::{Database, Error, Result};

const AD_SELECT: &str = "SELECT a.id, a.owner_id, u.username, a.title, a.description, a.image,
        a.category, a.item_condition, a.created_at
     FROM ads a
     JOIN users u ON u.id = a.owner_id";

const LISTING_ORDER: &str = "ORDER BY a.created_at DESC, a.id DESC";

/// Result of a cascading ad delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedAd {
    pub ad_id: i64,
    pub proposals_removed: usize,
}

impl Database {
    pub fn create_ad(&self, owner: &UserRef, form: &AdForm) -> Result<Ad> {
        let fields = form.validate()?;

        let ad = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ads (owner_id, title, description, image, category, item_condition, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    owner.id.to_string(),
                    fields.title,
                    fields.description,
                    fields.image,
                    fields.category.code(),
                    fields.condition.code(),
                    Utc::now(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_ad(conn, id)?.ok_or(Error::not_found("ad", id))
        })?;

        info!(ad_id = ad.id, owner = %owner.username, "Ad created");
        Ok(ad)
    }

    pub fn get_ad(&self, id: i64) -> Result<Ad> {
        self.with_conn(|conn| query_ad(conn, id))?
            .ok_or(Error::not_found("ad", id))
    }

    /// One page of ads matching `filter`, newest first.
    ///
    /// `page` is the raw requested page number; see [`PageWindow::resolve`]
    /// for how missing or out-of-range values are handled.
    pub fn list_ads(&self, filter: &AdFilter, page: Option<&str>) -> Result<Page<Ad>> {
        let (where_clause, mut params) = ad_conditions(filter);

        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM ads a {where_clause}"),
                params_from_iter(params.iter()),
                |r| r.get(0),
            )?;

            let window = PageWindow::resolve(page, total.max(0) as u64, PAGE_SIZE);

            params.push(Value::Integer(i64::from(window.limit())));
            params.push(Value::Integer(window.offset() as i64));
            let sql = format!(
                "{AD_SELECT} {where_clause} {LISTING_ORDER} LIMIT ?{} OFFSET ?{}",
                params.len() - 1,
                params.len()
            );

            let ads = query_ads(conn, &sql, &params)?;
            Ok(window.into_page(ads))
        })
    }

    /// Everything `owner` has listed, newest first.
    pub fn list_ads_by_owner(&self, owner_id: Uuid) -> Result<Vec<Ad>> {
        self.with_conn(|conn| {
            query_ads(
                conn,
                &format!("{AD_SELECT} WHERE a.owner_id = ?1 {LISTING_ORDER}"),
                &[Value::Text(owner_id.to_string())],
            )
        })
    }

    /// Overwrite the mutable fields of an ad. The owner and creation time
    /// never change.
    pub fn update_ad(&self, id: i64, requester: &UserRef, form: &AdForm) -> Result<Ad> {
        let ad = self.with_conn(|conn| {
            let ad = query_ad(conn, id)?.ok_or(Error::not_found("ad", id))?;
            if !can_mutate_ad(requester, &ad) {
                return Err(Error::Forbidden("you can only edit your own ads".into()));
            }

            let fields = form.validate()?;
            conn.execute(
                "UPDATE ads
                 SET title = ?1, description = ?2, image = ?3, category = ?4, item_condition = ?5
                 WHERE id = ?6",
                rusqlite::params![
                    fields.title,
                    fields.description,
                    fields.image,
                    fields.category.code(),
                    fields.condition.code(),
                    id,
                ],
            )?;

            query_ad(conn, id)?.ok_or(Error::not_found("ad", id))
        })?;

        info!(ad_id = id, owner = %requester.username, "Ad updated");
        Ok(ad)
    }

    /// Delete an ad together with every proposal that offers or asks for it.
    /// Both happen in one transaction.
    pub fn delete_ad(&self, id: i64, requester: &UserRef) -> Result<DeletedAd> {
        let deleted = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let ad = query_ad(&tx, id)?.ok_or(Error::not_found("ad", id))?;
            if !can_mutate_ad(requester, &ad) {
                return Err(Error::Forbidden("you can only delete your own ads".into()));
            }

            let proposals_removed = tx.execute(
                "DELETE FROM proposals WHERE ad_sender_id = ?1 OR ad_receiver_id = ?1",
                [id],
            )?;
            tx.execute("DELETE FROM ads WHERE id = ?1", [id])?;
            tx.commit()?;

            Ok(DeletedAd { ad_id: id, proposals_removed })
        })?;

        info!(
            ad_id = id,
            owner = %requester.username,
            proposals_removed = deleted.proposals_removed,
            "Ad deleted"
        );
        Ok(deleted)
    }
}

pub(crate) fn query_ad(conn: &Connection, id: i64) -> Result<Option<Ad>> {
    conn.query_row(&format!("{AD_SELECT} WHERE a.id = ?1"), [id], ad_row)
        .optional()?
        .map(Ad::try_from)
        .transpose()
}

fn query_ads(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Ad>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), ad_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(Ad::try_from).collect()
}

/// WHERE clause and positional parameters for a listing filter.
fn ad_conditions(filter: &AdFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(category) = filter.category {
        params.push(Value::Text(category.code().to_string()));
        clauses.push(format!("a.category = ?{}", params.len()));
    }
    if let Some(condition) = filter.condition {
        params.push(Value::Text(condition.code().to_string()));
        clauses.push(format!("a.item_condition = ?{}", params.len()));
    }
    if let Some(search) = &filter.search {
        params.push(Value::Text(search.clone()));
        let n = params.len();
        clauses.push(format!(
            "(contains_ci(a.title, ?{n}) OR contains_ci(a.description, ?{n}))"
        ));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (where_clause, params)
}

fn ad_row(row: &Row<'_>) -> rusqlite::Result<AdRow> {
    Ok(AdRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_username: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        image: row.get(5)?,
        category: row.get(6)?,
        condition: row.get(7)?,
        created_at: row.get(8)?,
    })
}
