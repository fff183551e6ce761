use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS timings_cache (
            date        TEXT NOT NULL,
            latitude    REAL NOT NULL,
            longitude   REAL NOT NULL,
            fajr        TEXT NOT NULL DEFAULT '--',
            sunrise     TEXT NOT NULL DEFAULT '--',
            dhuhr       TEXT NOT NULL DEFAULT '--',
            asr         TEXT NOT NULL DEFAULT '--',
            maghrib     TEXT NOT NULL DEFAULT '--',
            isha        TEXT NOT NULL DEFAULT '--',
            midnight    TEXT NOT NULL DEFAULT '--',
            hijri_day   INTEGER,
            hijri_month TEXT,
            hijri_year  INTEGER,
            fetched_at  TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (date, latitude, longitude)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('timings_cache', 'app_meta')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
