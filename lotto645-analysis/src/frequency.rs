use serde::Serialize;

use lotto645_db::models::{Draw, MAX_NUMBER, number_index};

use crate::error::{AnalysisError, Result};

/// Nombre d'apparitions de chaque numéro 1..=45. Toujours 45 cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    counts: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyStats {
    pub min: u32,
    pub max: u32,
    pub avg: u32,
    pub median: u32,
}

impl FrequencyTable {
    fn zeroed() -> Self {
        Self { counts: vec![0; MAX_NUMBER as usize] }
    }

    fn increment(&mut self, n: u8) {
        // Les numéros hors limites sont ignorés.
        if let Some(idx) = number_index(n) {
            self.counts[idx] += 1;
        }
    }

    pub fn get(&self, number: u8) -> u32 {
        number_index(number).map_or(0, |idx| self.counts[idx])
    }

    /// Paires (numéro, occurrences) dans l'ordre des numéros.
    pub fn iter(&self) -> impl Iterator<Item = NumberCount> + '_ {
        self.counts.iter().enumerate().map(|(idx, &count)| NumberCount {
            number: idx as u8 + 1,
            count,
        })
    }

    /// Même ordre que [`sorted_by_frequency`], appliqué à une table déjà calculée.
    pub fn sorted(&self, ascending: bool) -> Vec<NumberCount> {
        let mut sorted: Vec<NumberCount> = self.iter().collect();
        sorted.sort_by(|a, b| {
            let by_count = if ascending {
                a.count.cmp(&b.count)
            } else {
                b.count.cmp(&a.count)
            };
            by_count.then(a.number.cmp(&b.number))
        });
        sorted
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

pub fn calculate_frequency(draws: &[Draw]) -> FrequencyTable {
    let mut table = FrequencyTable::zeroed();
    for draw in draws {
        for &n in &draw.numbers {
            table.increment(n);
        }
    }
    table
}

pub fn calculate_frequency_with_bonus(draws: &[Draw]) -> FrequencyTable {
    let mut table = calculate_frequency(draws);
    for draw in draws {
        table.increment(draw.bonus);
    }
    table
}

/// Numéros triés par fréquence. À fréquence égale, ordre croissant des numéros
/// quel que soit le sens du tri.
pub fn sorted_by_frequency(draws: &[Draw], ascending: bool) -> Vec<NumberCount> {
    calculate_frequency(draws).sorted(ascending)
}

pub fn hot_numbers(draws: &[Draw], n: usize) -> Vec<NumberCount> {
    let mut sorted = sorted_by_frequency(draws, false);
    sorted.truncate(n);
    sorted
}

pub fn cold_numbers(draws: &[Draw], n: usize) -> Vec<NumberCount> {
    let mut sorted = sorted_by_frequency(draws, true);
    sorted.truncate(n);
    sorted
}

pub fn average_frequency(draws: &[Draw]) -> Result<f64> {
    if draws.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    let table = calculate_frequency(draws);
    Ok(table.total() as f64 / MAX_NUMBER as f64)
}

pub fn frequency_stats(draws: &[Draw]) -> Result<FrequencyStats> {
    let avg = average_frequency(draws)?;

    let mut values: Vec<u32> = calculate_frequency(draws).counts;
    values.sort_unstable();

    Ok(FrequencyStats {
        min: values[0],
        max: values[values.len() - 1],
        avg: avg.round() as u32,
        // 45 valeurs : l'index 22 est la médiane exacte
        median: values[values.len() / 2],
    })
}
