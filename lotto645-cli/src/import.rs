use anyhow::{Context, Result, bail};
use lotto645_db::rusqlite::Connection;
use serde::Deserialize;
use std::path::Path;

use lotto645_db::db::insert_draw;
use lotto645_db::models::{Draw, PICK_COUNT, validate_date, validate_draw};

/// Un tirage tel que publié dans `all.json` / `latest.json`. Les champs
/// supplémentaires (gains, nombre de gagnants...) sont ignorés.
#[derive(Debug, Deserialize)]
pub struct RawDraw {
    pub draw_no: u32,
    pub date: String,
    pub numbers: Vec<u8>,
    pub bonus_no: u8,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<RawDraw>),
    One(RawDraw),
}

pub fn parse_payload(content: &str) -> Result<Vec<RawDraw>> {
    let payload: Payload = serde_json::from_str(content)
        .context("JSON invalide (attendu un tirage ou une liste de tirages)")?;
    Ok(match payload {
        Payload::Many(draws) => draws,
        Payload::One(draw) => vec![draw],
    })
}

fn parse_record(raw: RawDraw) -> Result<Draw> {
    // "2002-12-07T00:00:00Z" → "2002-12-07"
    let date = raw.date.get(..10).unwrap_or(&raw.date).to_string();
    validate_date(&date)?;

    if raw.numbers.len() != PICK_COUNT {
        bail!(
            "Tirage {} : {} numéros au lieu de {}",
            raw.draw_no,
            raw.numbers.len(),
            PICK_COUNT
        );
    }
    let numbers = [
        raw.numbers[0],
        raw.numbers[1],
        raw.numbers[2],
        raw.numbers[3],
        raw.numbers[4],
        raw.numbers[5],
    ];
    validate_draw(&numbers, raw.bonus_no)
        .with_context(|| format!("Tirage {} invalide", raw.draw_no))?;

    Ok(Draw {
        round: raw.draw_no,
        date,
        numbers,
        bonus: raw.bonus_no,
    })
}

#[derive(Debug, Default, serde::Serialize)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_str(conn: &Connection, content: &str) -> Result<ImportResult> {
    let records = parse_payload(content)?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();

    for raw in records {
        result.total_records += 1;
        let round = raw.draw_no;
        match parse_record(raw) {
            Ok(draw) => {
                match insert_draw(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        tracing::warn!(round, error = %e, "échec d'insertion");
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(round, error = %format!("{:#}", e), "tirage rejeté");
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    tracing::info!(
        total = result.total_records,
        inserted = result.inserted,
        skipped = result.skipped,
        errors = result.errors,
        "import terminé"
    );
    Ok(result)
}

pub fn import_json(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    import_str(conn, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto645_db::db::{fetch_all_draws, migrate};

    const ALL_JSON: &str = r#"[
        {"draw_no": 2, "numbers": [9, 13, 21, 25, 32, 42], "bonus_no": 2,
         "date": "2002-12-14T00:00:00Z", "divisions": []},
        {"draw_no": 1, "numbers": [10, 23, 29, 33, 37, 40], "bonus_no": 16,
         "date": "2002-12-07T00:00:00Z"}
    ]"#;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_parse_payload_list_and_single() {
        assert_eq!(parse_payload(ALL_JSON).unwrap().len(), 2);

        let latest = r#"{"draw_no": 1100, "numbers": [17, 26, 29, 30, 31, 43],
                         "bonus_no": 12, "date": "2024-01-06T00:00:00Z"}"#;
        let single = parse_payload(latest).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].draw_no, 1100);
    }

    #[test]
    fn test_parse_payload_invalid() {
        assert!(parse_payload("{\"foo\": 1}").is_err());
        assert!(parse_payload("not json").is_err());
    }

    #[test]
    fn test_parse_record_truncates_date() {
        let raw = RawDraw {
            draw_no: 1,
            date: "2002-12-07T00:00:00Z".to_string(),
            numbers: vec![10, 23, 29, 33, 37, 40],
            bonus_no: 16,
        };
        let draw = parse_record(raw).unwrap();
        assert_eq!(draw.date, "2002-12-07");
        assert_eq!(draw.numbers, [10, 23, 29, 33, 37, 40]);
    }

    #[test]
    fn test_parse_record_rejects_bad_draws() {
        let short = RawDraw {
            draw_no: 1,
            date: "2002-12-07".to_string(),
            numbers: vec![1, 2, 3],
            bonus_no: 4,
        };
        assert!(parse_record(short).is_err());

        let out_of_range = RawDraw {
            draw_no: 1,
            date: "2002-12-07".to_string(),
            numbers: vec![1, 2, 3, 4, 5, 46],
            bonus_no: 7,
        };
        assert!(parse_record(out_of_range).is_err());
    }

    #[test]
    fn test_import_str() {
        let conn = memory_db();
        let result = import_str(&conn, ALL_JSON).unwrap();
        assert_eq!(result.total_records, 2);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.errors, 0);

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].round, 1);
        assert_eq!(draws[1].date, "2002-12-14");

        // réimport : tout est ignoré
        let again = import_str(&conn, ALL_JSON).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped, 2);
    }

    #[test]
    fn test_import_counts_errors() {
        let conn = memory_db();
        let content = r#"[
            {"draw_no": 1, "numbers": [10, 23, 29, 33, 37, 40], "bonus_no": 16, "date": "2002-12-07"},
            {"draw_no": 2, "numbers": [9, 9, 21, 25, 32, 42], "bonus_no": 2, "date": "2002-12-14"}
        ]"#;
        let result = import_str(&conn, content).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.errors, 1);
    }
}
