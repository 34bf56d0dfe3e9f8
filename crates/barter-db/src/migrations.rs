use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, ads, proposals)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE ads (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id        TEXT NOT NULL REFERENCES users(id),
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                image           TEXT,
                category        TEXT NOT NULL,
                item_condition  TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_ads_listing ON ads(created_at DESC, id DESC);
            CREATE INDEX idx_ads_owner ON ads(owner_id);

            CREATE TABLE proposals (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                proposer_id     TEXT NOT NULL REFERENCES users(id),
                ad_sender_id    INTEGER NOT NULL REFERENCES ads(id),
                ad_receiver_id  INTEGER NOT NULL REFERENCES ads(id),
                comment         TEXT NOT NULL DEFAULT '',
                status          TEXT NOT NULL DEFAULT 'W' CHECK (status IN ('W', 'Y', 'N')),
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_proposals_sender ON proposals(ad_sender_id);
            CREATE INDEX idx_proposals_receiver ON proposals(ad_receiver_id);
            CREATE INDEX idx_proposals_proposer ON proposals(proposer_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
