use std::ops::RangeInclusive;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Plus grand numéro tirable.
pub const MAX_NUMBER: u8 = 45;

/// Nombre de numéros principaux par tirage (hors bonus).
pub const PICK_COUNT: usize = 6;

pub const ALL_NUMBERS: RangeInclusive<u8> = 1..=MAX_NUMBER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub round: u32,
    pub date: String,
    pub numbers: [u8; PICK_COUNT],
    pub bonus: u8,
}

impl Draw {
    /// Préfixe `YYYY-MM` de la date.
    pub fn month_key(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }

    /// Préfixe `YYYY` de la date.
    pub fn year_key(&self) -> &str {
        self.date.get(..4).unwrap_or(&self.date)
    }

    pub fn sorted_numbers(&self) -> [u8; PICK_COUNT] {
        let mut sorted = self.numbers;
        sorted.sort_unstable();
        sorted
    }
}

/// Index 0-based d'un numéro dans une table de 45 cases, `None` si hors limites.
pub fn number_index(n: u8) -> Option<usize> {
    if ALL_NUMBERS.contains(&n) {
        Some((n - 1) as usize)
    } else {
        None
    }
}

pub fn validate_draw(numbers: &[u8; PICK_COUNT], bonus: u8) -> Result<()> {
    for &n in numbers {
        if !ALL_NUMBERS.contains(&n) {
            bail!("Numéro {} hors limites (1-{})", n, MAX_NUMBER);
        }
    }
    if !ALL_NUMBERS.contains(&bonus) {
        bail!("Bonus {} hors limites (1-{})", bonus, MAX_NUMBER);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Le bonus {} figure déjà parmi les numéros", bonus);
    }
    Ok(())
}

pub fn validate_date(date: &str) -> Result<()> {
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        bail!("Date invalide : '{}' (attendu AAAA-MM-JJ)", date);
    }
    Ok(())
}

/// Historique synthétique trié par tirage croissant, une semaine d'écart entre tirages.
#[cfg(any(test, feature = "test-fixtures"))]
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    let start = NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or_default();
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8 * 6;
            let date = start + chrono::Duration::weeks(i as i64);
            Draw {
                round: i as u32 + 1,
                date: date.format("%Y-%m-%d").to_string(),
                numbers: [base + 1, base + 2, base + 3, base + 4, base + 5, base + 6],
                bonus: (base + 7) % MAX_NUMBER + 1,
            }
        })
        .collect()
}
