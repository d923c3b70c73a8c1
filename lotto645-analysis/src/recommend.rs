use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::Serialize;

use lotto645_db::models::{Draw, MAX_NUMBER, PICK_COUNT};

use crate::error::{AnalysisError, Result};
use crate::frequency::hot_numbers;
use crate::patterns::RANGES;
use crate::timeline::absence_period;

/// Grille suggérée, triée par ordre croissant.
pub type Combination = [u8; PICK_COUNT];

/// Taille du pool de numéros chauds.
pub const HOT_POOL_SIZE: usize = 15;

/// Taille du pool des plus longs retards.
pub const COLD_POOL_SIZE: usize = 10;

/// Poids des tranches de `RANGES` ; la dernière (41-45) ne compte que 5 numéros.
pub const RANGE_WEIGHTS: [f64; 5] = [1.2, 1.2, 1.2, 1.2, 0.6];

/// Nombre maximal de tirages avant de retomber sur une grille aléatoire.
pub const MAX_BALANCED_ATTEMPTS: usize = 50;

/// Nombre maximal de numéros tirés (doublons compris) pour remplir une grille.
pub const MAX_PICKS_PER_ATTEMPT: usize = PICK_COUNT * 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Frequency,
    Balanced,
    Cold,
    #[default]
    Random,
}

impl Strategy {
    /// `frequency`, `balanced`, `cold` ou `random` ; toute autre valeur donne `Random`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("frequency") => Strategy::Frequency,
            Some("balanced") => Strategy::Balanced,
            Some("cold") => Strategy::Cold,
            Some("random") => Strategy::Random,
            other => {
                if let Some(unknown) = other {
                    tracing::debug!(tag = unknown, "stratégie inconnue, repli sur random");
                }
                Strategy::Random
            }
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::Frequency => "frequency",
            Strategy::Balanced => "balanced",
            Strategy::Cold => "cold",
            Strategy::Random => "random",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Générateur seedé si `seed` est fourni, sinon initialisé depuis le générateur du thread.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn to_combination(mut selected: Vec<u8>) -> Result<Combination> {
    selected.sort_unstable();
    let available = selected.len();
    selected.try_into().map_err(|_| AnalysisError::InsufficientPool {
        available,
        required: PICK_COUNT,
    })
}

/// 6 numéros tirés uniformément parmi les 15 plus fréquents.
pub fn recommend_by_frequency<R: Rng + ?Sized>(draws: &[Draw], rng: &mut R) -> Result<Combination> {
    let pool: Vec<u8> = hot_numbers(draws, HOT_POOL_SIZE)
        .into_iter()
        .map(|c| c.number)
        .collect();
    let selected: Vec<u8> = pool.choose_multiple(rng, PICK_COUNT).copied().collect();
    to_combination(selected)
}

/// Grille répartie sur les tranches, avec 2 à 4 numéros impairs.
pub fn recommend_balanced<R: Rng + ?Sized>(rng: &mut R) -> Result<Combination> {
    let buckets = WeightedIndex::new(&RANGE_WEIGHTS)?;

    for attempt in 1..=MAX_BALANCED_ATTEMPTS {
        let mut selected: Vec<u8> = Vec::with_capacity(PICK_COUNT);
        let mut picks = 0;
        while selected.len() < PICK_COUNT && picks < MAX_PICKS_PER_ATTEMPT {
            picks += 1;
            let (min, max) = RANGES[buckets.sample(rng)];
            let n = rng.random_range(min..=max);
            if !selected.contains(&n) {
                selected.push(n);
            }
        }
        if selected.len() < PICK_COUNT {
            tracing::debug!(attempt, picks, "trop de doublons, nouvel essai");
            continue;
        }

        let odd = selected.iter().filter(|&&n| n % 2 == 1).count();
        if (2..=4).contains(&odd) {
            tracing::debug!(attempt, "grille équilibrée trouvée");
            return to_combination(selected);
        }
    }

    tracing::warn!(
        attempts = MAX_BALANCED_ATTEMPTS,
        "aucune grille équilibrée, repli sur une grille aléatoire"
    );
    Ok(recommend_random(rng))
}

/// 2 ou 3 numéros parmi les 10 plus longs retards, complétés par des numéros chauds.
pub fn recommend_with_cold<R: Rng + ?Sized>(draws: &[Draw], rng: &mut R) -> Result<Combination> {
    let cold_pool: Vec<u8> = absence_period(draws)?
        .into_iter()
        .take(COLD_POOL_SIZE)
        .map(|r| r.number)
        .collect();

    let cold_count = rng.random_range(2..=3);
    let mut selected: Vec<u8> = cold_pool.choose_multiple(rng, cold_count).copied().collect();

    let mut hot_pool: Vec<u8> = hot_numbers(draws, HOT_POOL_SIZE)
        .into_iter()
        .map(|c| c.number)
        .collect();
    hot_pool.shuffle(rng);

    for n in hot_pool {
        if selected.len() >= PICK_COUNT {
            break;
        }
        if !selected.contains(&n) {
            selected.push(n);
        }
    }

    to_combination(selected)
}

/// 6 numéros distincts tirés uniformément dans 1..=45.
pub fn recommend_random<R: Rng + ?Sized>(rng: &mut R) -> Combination {
    let mut combination = [0u8; PICK_COUNT];
    let indices = rand::seq::index::sample(rng, MAX_NUMBER as usize, PICK_COUNT);
    for (slot, idx) in combination.iter_mut().zip(indices) {
        *slot = idx as u8 + 1;
    }
    combination.sort_unstable();
    combination
}

pub fn generate_recommendation<R: Rng + ?Sized>(
    draws: &[Draw],
    strategy: Strategy,
    rng: &mut R,
) -> Result<Combination> {
    match strategy {
        Strategy::Frequency => recommend_by_frequency(draws, rng),
        Strategy::Balanced => recommend_balanced(rng),
        Strategy::Cold => recommend_with_cold(draws, rng),
        Strategy::Random => Ok(recommend_random(rng)),
    }
}
