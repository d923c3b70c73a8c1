use anyhow::{Context, Result};
use rusqlite::{Connection, Row};
use std::path::Path;

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round   INTEGER PRIMARY KEY,
    date    TEXT NOT NULL,
    n1      INTEGER NOT NULL,
    n2      INTEGER NOT NULL,
    n3      INTEGER NOT NULL,
    n4      INTEGER NOT NULL,
    n5      INTEGER NOT NULL,
    n6      INTEGER NOT NULL,
    bonus   INTEGER NOT NULL
);
";

const SELECT_DRAW: &str = "SELECT round, date, n1, n2, n3, n4, n5, n6, bonus FROM draws";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto645.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn draw_from_row(row: &Row<'_>) -> rusqlite::Result<Draw> {
    Ok(Draw {
        round: row.get(0)?,
        date: row.get(1)?,
        numbers: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        bonus: row.get(8)?,
    })
}

/// Insère un tirage ; renvoie `false` si le tirage existait déjà.
pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (round, date, n1, n2, n3, n4, n5, n6, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            draw.round,
            draw.date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
            draw.bonus,
        ],
    ).with_context(|| format!("Échec de l'insertion du tirage {}", draw.round))?;
    if changed > 0 {
        tracing::debug!(round = draw.round, "tirage inséré");
    }
    Ok(changed > 0)
}

/// Tout l'historique, du plus ancien au plus récent.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!("{SELECT_DRAW} ORDER BY round ASC"))?;
    let draws = stmt
        .query_map([], draw_from_row)?
        .collect::<Result<Vec<_>, _>>()
        .context("Lecture de l'historique impossible")?;
    Ok(draws)
}

/// Les `limit` derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!("{SELECT_DRAW} ORDER BY round DESC LIMIT ?1"))?;
    let draws = stmt
        .query_map([limit], draw_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_round(conn: &Connection) -> Result<Option<u32>> {
    let round: Option<u32> = conn.query_row("SELECT MAX(round) FROM draws", [], |row| row.get(0))?;
    Ok(round)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(round: u32, date: &str) -> Draw {
        Draw {
            round,
            date: date.to_string(),
            numbers: [1, 2, 3, 4, 5, 6],
            bonus: 7,
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = memory_db();

        let inserted = insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = memory_db();

        insert_draw(&conn, &test_draw(1, "2002-12-07")).unwrap();
        insert_draw(&conn, &test_draw(3, "2002-12-21")).unwrap();
        insert_draw(&conn, &test_draw(2, "2002-12-14")).unwrap();

        let all = fetch_all_draws(&conn).unwrap();
        let rounds: Vec<u32> = all.iter().map(|d| d.round).collect();
        assert_eq!(rounds, vec![1, 2, 3]);

        let last = fetch_last_draws(&conn, 2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].date, "2002-12-21");
        assert_eq!(last[1].date, "2002-12-14");
    }

    #[test]
    fn test_round_trip_fields() {
        let conn = memory_db();
        let draw = Draw {
            round: 1000,
            date: "2022-01-29".to_string(),
            numbers: [2, 8, 19, 22, 32, 42],
            bonus: 39,
        };
        insert_draw(&conn, &draw).unwrap();
        assert_eq!(fetch_all_draws(&conn).unwrap(), vec![draw]);
    }

    #[test]
    fn test_latest_round() {
        let conn = memory_db();
        assert_eq!(latest_round(&conn).unwrap(), None);

        insert_draw(&conn, &test_draw(5, "2003-01-04")).unwrap();
        insert_draw(&conn, &test_draw(2, "2002-12-14")).unwrap();
        assert_eq!(latest_round(&conn).unwrap(), Some(5));
    }
}
