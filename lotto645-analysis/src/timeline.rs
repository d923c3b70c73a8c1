use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use lotto645_db::models::{ALL_NUMBERS, Draw, MAX_NUMBER, number_index};

use crate::error::{AnalysisError, Result};
use crate::frequency::{FrequencyTable, NumberCount, calculate_frequency, hot_numbers};

/// Nombre de numéros chauds retenus par année.
pub const YEARLY_HOT_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbsenceRecord {
    pub number: u8,
    /// 0 si le numéro n'est jamais sorti sur la période.
    pub last_round: u32,
    pub absence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodFrequency {
    pub rounds: Vec<u32>,
    pub frequency: FrequencyTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "HAUSSE"),
            TrendDirection::Down => write!(f, "BAISSE"),
            TrendDirection::Stable => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberTrend {
    pub number: u8,
    pub all_freq: u32,
    pub recent_freq: u32,
    pub trend: TrendDirection,
    /// Taux récent moins taux global (apparitions par tirage).
    pub trend_value: f64,
}

/// Les `n` derniers tirages ; tout l'historique si `n` dépasse sa taille.
pub fn recent_draws(draws: &[Draw], n: usize) -> &[Draw] {
    &draws[draws.len().saturating_sub(n)..]
}

pub fn recent_hot_numbers(draws: &[Draw], weeks: usize, top_n: usize) -> Vec<NumberCount> {
    hot_numbers(recent_draws(draws, weeks), top_n)
}

/// Numéros sortis dans aucun des `weeks` derniers tirages, par ordre croissant.
pub fn recent_cold_numbers(draws: &[Draw], weeks: usize) -> Vec<u8> {
    let appeared: BTreeSet<u8> = recent_draws(draws, weeks)
        .iter()
        .flat_map(|d| d.numbers)
        .collect();
    ALL_NUMBERS.filter(|n| !appeared.contains(n)).collect()
}

/// Retard de chaque numéro, du plus long au plus court (à égalité, numéro croissant).
pub fn absence_period(draws: &[Draw]) -> Result<Vec<AbsenceRecord>> {
    let latest_round = draws.last().ok_or(AnalysisError::EmptyDataset)?.round;

    let mut last_seen = vec![0u32; MAX_NUMBER as usize];
    for draw in draws {
        for &n in &draw.numbers {
            if let Some(idx) = number_index(n) {
                last_seen[idx] = draw.round;
            }
        }
    }

    let mut records: Vec<AbsenceRecord> = ALL_NUMBERS
        .zip(last_seen)
        .map(|(number, last_round)| AbsenceRecord {
            number,
            last_round,
            absence: latest_round.saturating_sub(last_round),
        })
        .collect();
    records.sort_by(|a, b| b.absence.cmp(&a.absence).then(a.number.cmp(&b.number)));
    Ok(records)
}

fn group_by<'a>(draws: &'a [Draw], key: impl Fn(&'a Draw) -> &'a str) -> BTreeMap<String, Vec<Draw>> {
    let mut groups: BTreeMap<String, Vec<Draw>> = BTreeMap::new();
    for draw in draws {
        groups.entry(key(draw).to_string()).or_default().push(draw.clone());
    }
    groups
}

/// Fréquences par mois (`YYYY-MM`).
pub fn analyze_by_month(draws: &[Draw]) -> BTreeMap<String, PeriodFrequency> {
    group_by(draws, Draw::month_key)
        .into_iter()
        .map(|(month, group)| {
            let period = PeriodFrequency {
                rounds: group.iter().map(|d| d.round).collect(),
                frequency: calculate_frequency(&group),
            };
            (month, period)
        })
        .collect()
}

/// Les 6 numéros les plus fréquents de chaque année (`YYYY`).
pub fn yearly_hot_numbers(draws: &[Draw]) -> BTreeMap<String, Vec<NumberCount>> {
    group_by(draws, Draw::year_key)
        .into_iter()
        .map(|(year, group)| (year, hot_numbers(&group, YEARLY_HOT_COUNT)))
        .collect()
}

/// Compare le taux d'apparition récent au taux global, numéro par numéro.
pub fn analyze_trend(draws: &[Draw], recent_weeks: usize) -> Result<Vec<NumberTrend>> {
    if draws.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    if recent_weeks == 0 {
        return Err(AnalysisError::EmptyWindow);
    }

    let recent = recent_draws(draws, recent_weeks);
    let all_freq = calculate_frequency(draws);
    let recent_freq = calculate_frequency(recent);

    let total = draws.len() as f64;
    let recent_total = recent.len() as f64;

    let mut trends: Vec<NumberTrend> = all_freq
        .iter()
        .zip(recent_freq.iter())
        .map(|(all, recent)| {
            let diff = recent.count as f64 / recent_total - all.count as f64 / total;
            let trend = if diff > 0.0 {
                TrendDirection::Up
            } else if diff < 0.0 {
                TrendDirection::Down
            } else {
                TrendDirection::Stable
            };
            NumberTrend {
                number: all.number,
                all_freq: all.count,
                recent_freq: recent.count,
                trend,
                trend_value: diff,
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.trend_value
            .total_cmp(&a.trend_value)
            .then(a.number.cmp(&b.number))
    });
    tracing::debug!(recent = recent.len(), total = draws.len(), "tendances calculées");
    Ok(trends)
}
