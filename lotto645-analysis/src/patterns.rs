use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use lotto645_db::models::{Draw, PICK_COUNT};

use crate::error::{AnalysisError, Result};

/// Seuil bas/haut : 1-22 bas, 23-45 haut.
pub const LOW_MAX: u8 = 22;

/// Les cinq tranches fixes de la grille.
pub const RANGES: [(u8, u8); 5] = [(1, 10), (11, 20), (21, 30), (31, 40), (41, 45)];

/// Distribution d'un motif discret (clé `"a:b"`) sur les tirages.
pub type PatternDistribution = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OddEvenAnalysis {
    pub odd: u32,
    pub even: u32,
    pub odd_percent: u32,
    pub even_percent: u32,
    pub distribution: PatternDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighLowAnalysis {
    pub low: u32,
    pub high: u32,
    pub low_percent: u32,
    pub high_percent: u32,
    pub distribution: PatternDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeBucket {
    pub range: String,
    pub count: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsecutivePattern {
    None,
    Pair,
    TwoPairs,
    Triple,
    More,
}

impl ConsecutivePattern {
    pub const ALL: [ConsecutivePattern; 5] = [
        ConsecutivePattern::None,
        ConsecutivePattern::Pair,
        ConsecutivePattern::TwoPairs,
        ConsecutivePattern::Triple,
        ConsecutivePattern::More,
    ];
}

impl std::fmt::Display for ConsecutivePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsecutivePattern::None => write!(f, "aucune suite"),
            ConsecutivePattern::Pair => write!(f, "1 paire"),
            ConsecutivePattern::TwoPairs => write!(f, "2 paires"),
            ConsecutivePattern::Triple => write!(f, "triplet"),
            ConsecutivePattern::More => write!(f, "4+ consécutifs"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsecutiveDistribution {
    pub none: u32,
    pub pair: u32,
    pub two_pairs: u32,
    pub triple: u32,
    pub more: u32,
}

impl ConsecutiveDistribution {
    pub fn count(&self, pattern: ConsecutivePattern) -> u32 {
        match pattern {
            ConsecutivePattern::None => self.none,
            ConsecutivePattern::Pair => self.pair,
            ConsecutivePattern::TwoPairs => self.two_pairs,
            ConsecutivePattern::Triple => self.triple,
            ConsecutivePattern::More => self.more,
        }
    }

    pub fn total(&self) -> u32 {
        self.none + self.pair + self.two_pairs + self.triple + self.more
    }

    /// Part arrondie des tirages présentant `pattern`.
    pub fn percent(&self, pattern: ConsecutivePattern) -> Result<u32> {
        percent(self.count(pattern), self.total())
    }

    fn record(&mut self, pattern: ConsecutivePattern) {
        let slot = match pattern {
            ConsecutivePattern::None => &mut self.none,
            ConsecutivePattern::Pair => &mut self.pair,
            ConsecutivePattern::TwoPairs => &mut self.two_pairs,
            ConsecutivePattern::Triple => &mut self.triple,
            ConsecutivePattern::More => &mut self.more,
        };
        *slot += 1;
    }
}

/// Profil d'une combinaison isolée (grille suggérée ou saisie).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationProfile {
    pub numbers: Vec<u8>,
    pub odd: u32,
    pub even: u32,
    pub low: u32,
    pub high: u32,
    pub sum: u32,
    pub ac: u8,
    pub consecutive: ConsecutivePattern,
}

fn percent(part: u32, total: u32) -> Result<u32> {
    if total == 0 {
        return Err(AnalysisError::EmptyDataset);
    }
    Ok((part as f64 / total as f64 * 100.0).round() as u32)
}

/// Comptage binaire par tirage : (total gauche, total droite, distribution "g:d").
fn split_counts(draws: &[Draw], is_left: impl Fn(u8) -> bool) -> (u32, u32, PatternDistribution) {
    let mut left_total = 0;
    let mut right_total = 0;
    let mut distribution = PatternDistribution::new();

    for draw in draws {
        let left = draw.numbers.iter().filter(|&&n| is_left(n)).count() as u32;
        let right = draw.numbers.len() as u32 - left;
        left_total += left;
        right_total += right;
        *distribution.entry(format!("{}:{}", left, right)).or_insert(0) += 1;
    }

    (left_total, right_total, distribution)
}

pub fn analyze_odd_even(draws: &[Draw]) -> Result<OddEvenAnalysis> {
    let (odd, even, distribution) = split_counts(draws, |n| n % 2 == 1);
    let total = odd + even;
    Ok(OddEvenAnalysis {
        odd,
        even,
        odd_percent: percent(odd, total)?,
        even_percent: percent(even, total)?,
        distribution,
    })
}

pub fn analyze_high_low(draws: &[Draw]) -> Result<HighLowAnalysis> {
    let (low, high, distribution) = split_counts(draws, |n| n <= LOW_MAX);
    let total = low + high;
    Ok(HighLowAnalysis {
        low,
        high,
        low_percent: percent(low, total)?,
        high_percent: percent(high, total)?,
        distribution,
    })
}

fn range_index(n: u8) -> usize {
    RANGES
        .iter()
        .position(|&(_, max)| n <= max)
        .unwrap_or(RANGES.len() - 1)
}

pub fn analyze_range_distribution(draws: &[Draw]) -> Result<Vec<RangeBucket>> {
    let mut counts = [0u32; RANGES.len()];
    for draw in draws {
        for &n in &draw.numbers {
            counts[range_index(n)] += 1;
        }
    }

    let total = (draws.len() * PICK_COUNT) as u32;
    RANGES
        .iter()
        .zip(counts)
        .map(|(&(min, max), count)| {
            Ok(RangeBucket {
                range: format!("{}-{}", min, max),
                count,
                percent: percent(count, total)?,
            })
        })
        .collect()
}

/// Classe une combinaison selon ses suites de numéros consécutifs.
///
/// Priorité : suite de 4 ou plus, puis triplet, puis paires. Un tirage avec un
/// triplet et une paire compte comme triplet.
pub fn classify_consecutive(numbers: &[u8]) -> ConsecutivePattern {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let mut run = 1;
    let mut longest = 1;
    let mut pairs = 0;

    for w in sorted.windows(2) {
        if w[0].checked_add(1) == Some(w[1]) {
            run += 1;
            longest = longest.max(run);
        } else {
            if run == 2 {
                pairs += 1;
            }
            run = 1;
        }
    }
    if run == 2 {
        pairs += 1;
    }

    if longest >= 4 {
        ConsecutivePattern::More
    } else if longest == 3 {
        ConsecutivePattern::Triple
    } else if pairs >= 2 {
        ConsecutivePattern::TwoPairs
    } else if pairs == 1 {
        ConsecutivePattern::Pair
    } else {
        ConsecutivePattern::None
    }
}

pub fn analyze_consecutive(draws: &[Draw]) -> ConsecutiveDistribution {
    let mut distribution = ConsecutiveDistribution::default();
    for draw in draws {
        distribution.record(classify_consecutive(&draw.numbers));
    }
    distribution
}

/// Valeur AC : nombre de différences positives distinctes entre paires, moins 5.
pub fn calculate_ac(numbers: &[u8]) -> u8 {
    let mut differences = BTreeSet::new();
    for (i, &a) in numbers.iter().enumerate() {
        for &b in &numbers[i + 1..] {
            let diff = a.abs_diff(b);
            if diff > 0 {
                differences.insert(diff);
            }
        }
    }
    (differences.len() as u8).saturating_sub(5)
}

pub fn analyze_ac_distribution(draws: &[Draw]) -> BTreeMap<u8, u32> {
    let mut distribution = BTreeMap::new();
    for draw in draws {
        *distribution.entry(calculate_ac(&draw.numbers)).or_insert(0) += 1;
    }
    distribution
}

pub fn profile_combination(numbers: &[u8]) -> CombinationProfile {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let odd = sorted.iter().filter(|&&n| n % 2 == 1).count() as u32;
    let low = sorted.iter().filter(|&&n| n <= LOW_MAX).count() as u32;
    let len = sorted.len() as u32;

    CombinationProfile {
        odd,
        even: len - odd,
        low,
        high: len - low,
        sum: sorted.iter().map(|&n| n as u32).sum(),
        ac: calculate_ac(&sorted),
        consecutive: classify_consecutive(&sorted),
        numbers: sorted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(round: u32, numbers: [u8; 6]) -> Draw {
        Draw {
            round,
            date: "2002-12-07".to_string(),
            numbers,
            bonus: 45,
        }
    }

    fn two_draws() -> Vec<Draw> {
        vec![draw(1, [1, 2, 3, 4, 5, 6]), draw(2, [7, 8, 9, 10, 11, 40])]
    }

    #[test]
    fn test_odd_even_two_draws() {
        let result = analyze_odd_even(&two_draws()).unwrap();
        // [1..6] → 3:3 ; [7,8,9,10,11,40] → 7,9,11 impairs → 3:3
        assert_eq!(result.odd, 6);
        assert_eq!(result.even, 6);
        assert_eq!(result.odd_percent, 50);
        assert_eq!(result.distribution.get("3:3"), Some(&2));
        assert_eq!(result.distribution.len(), 1);
    }

    #[test]
    fn test_odd_even_excludes_bonus() {
        let draws = vec![draw(1, [1, 3, 5, 7, 9, 11])];
        let result = analyze_odd_even(&draws).unwrap();
        assert_eq!(result.odd, 6);
        assert_eq!(result.even, 0);
        assert_eq!(result.odd_percent, 100);
        assert_eq!(result.distribution.get("6:0"), Some(&1));
    }

    #[test]
    fn test_high_low_threshold() {
        let draws = vec![draw(1, [1, 22, 23, 30, 44, 45])];
        let result = analyze_high_low(&draws).unwrap();
        assert_eq!(result.low, 2);
        assert_eq!(result.high, 4);
        assert_eq!(result.low_percent, 33);
        assert_eq!(result.high_percent, 67);
        assert_eq!(result.distribution.get("2:4"), Some(&1));
    }

    #[test]
    fn test_split_empty_is_error() {
        assert!(matches!(analyze_odd_even(&[]), Err(AnalysisError::EmptyDataset)));
        assert!(matches!(analyze_high_low(&[]), Err(AnalysisError::EmptyDataset)));
        assert!(matches!(analyze_range_distribution(&[]), Err(AnalysisError::EmptyDataset)));
    }

    #[test]
    fn test_range_distribution_two_draws() {
        let buckets = analyze_range_distribution(&two_draws()).unwrap();
        let labels: Vec<&str> = buckets.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(labels, vec!["1-10", "11-20", "21-30", "31-40", "41-45"]);

        assert_eq!(buckets[0].count, 10);
        assert_eq!(buckets[0].percent, 83); // 10 / 12
        assert_eq!(buckets[1].count, 1);
        assert_eq!(buckets[1].percent, 8);
        assert_eq!(buckets[3].count, 1);
        assert_eq!(buckets[4].count, 0);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 12);
    }

    #[test]
    fn test_classify_consecutive() {
        assert_eq!(classify_consecutive(&[1, 3, 5, 7, 9, 11]), ConsecutivePattern::None);
        assert_eq!(classify_consecutive(&[1, 2, 5, 7, 9, 11]), ConsecutivePattern::Pair);
        assert_eq!(classify_consecutive(&[1, 2, 5, 6, 9, 11]), ConsecutivePattern::TwoPairs);
        assert_eq!(classify_consecutive(&[1, 2, 3, 7, 9, 11]), ConsecutivePattern::Triple);
        assert_eq!(classify_consecutive(&[1, 2, 3, 4, 9, 11]), ConsecutivePattern::More);
        assert_eq!(classify_consecutive(&[40, 41, 42, 43, 44, 45]), ConsecutivePattern::More);
    }

    #[test]
    fn test_triple_with_pair_is_triple() {
        assert_eq!(classify_consecutive(&[1, 2, 3, 10, 11, 30]), ConsecutivePattern::Triple);
    }

    #[test]
    fn test_classify_unsorted_input() {
        assert_eq!(classify_consecutive(&[44, 2, 45, 1, 20, 30]), ConsecutivePattern::TwoPairs);
        // paire en fin de grille
        assert_eq!(classify_consecutive(&[1, 10, 20, 30, 44, 45]), ConsecutivePattern::Pair);
    }

    #[test]
    fn test_analyze_consecutive() {
        let distribution = analyze_consecutive(&two_draws());
        assert_eq!(distribution.more, 2);
        assert_eq!(distribution.total(), 2);
        assert_eq!(distribution.percent(ConsecutivePattern::More).unwrap(), 100);
        assert_eq!(distribution.percent(ConsecutivePattern::None).unwrap(), 0);
        assert!(ConsecutiveDistribution::default().percent(ConsecutivePattern::Pair).is_err());
    }

    #[test]
    fn test_calculate_ac() {
        // suite arithmétique : différences 1..5 → 5 distinctes → AC 0
        assert_eq!(calculate_ac(&[1, 2, 3, 4, 5, 6]), 0);
        assert_eq!(calculate_ac(&[5, 10, 15, 20, 25, 30]), 0);
        // différences toutes distinctes (règle de Golomb) → 15 - 5
        assert_eq!(calculate_ac(&[1, 2, 5, 11, 13, 18]), 10);
        assert_eq!(calculate_ac(&[1, 2, 3, 4, 5, 7]), 1);
    }

    #[test]
    fn test_calculate_ac_order_independent() {
        assert_eq!(calculate_ac(&[13, 1, 18, 5, 2, 11]), calculate_ac(&[1, 2, 5, 11, 13, 18]));
    }

    #[test]
    fn test_calculate_ac_degenerate() {
        assert_eq!(calculate_ac(&[]), 0);
        assert_eq!(calculate_ac(&[1, 2, 3]), 0);
    }

    #[test]
    fn test_ac_distribution() {
        let draws = vec![
            draw(1, [1, 2, 3, 4, 5, 6]),
            draw(2, [1, 2, 5, 11, 13, 18]),
            draw(3, [5, 10, 15, 20, 25, 30]),
        ];
        let distribution = analyze_ac_distribution(&draws);
        assert_eq!(distribution.get(&0), Some(&2));
        assert_eq!(distribution.get(&10), Some(&1));
    }

    #[test]
    fn test_profile_combination() {
        let profile = profile_combination(&[45, 2, 3, 23, 11, 30]);
        assert_eq!(profile.numbers, vec![2, 3, 11, 23, 30, 45]);
        assert_eq!(profile.odd, 4);
        assert_eq!(profile.even, 2);
        assert_eq!(profile.low, 3);
        assert_eq!(profile.high, 3);
        assert_eq!(profile.sum, 114);
        assert_eq!(profile.consecutive, ConsecutivePattern::Pair);
    }
}
