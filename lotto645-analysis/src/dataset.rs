use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;

use lotto645_db::models::Draw;

use crate::error::{AnalysisError, Result};

/// Instantané immuable de l'historique, trié par numéro de tirage croissant.
///
/// Le clonage est bon marché (`Arc`). `append` produit un nouvel instantané :
/// un lecteur qui tient l'ancien continue de voir des données cohérentes.
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    draws: Arc<[Draw]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub total_draws: usize,
    pub first_round: u32,
    pub latest_round: u32,
    pub first_month: String,
    pub latest_month: String,
}

impl DrawHistory {
    /// Trie par tirage et élimine les doublons (la première occurrence est conservée).
    pub fn new(mut draws: Vec<Draw>) -> Self {
        draws.sort_by_key(|d| d.round);
        let before = draws.len();
        draws.dedup_by_key(|d| d.round);
        if draws.len() < before {
            tracing::debug!(removed = before - draws.len(), "tirages en double ignorés");
        }
        Self { draws: draws.into() }
    }

    pub fn as_slice(&self) -> &[Draw] {
        &self.draws
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }

    pub fn latest_round(&self) -> Option<u32> {
        self.latest().map(|d| d.round)
    }

    /// Les `n` derniers tirages (tout l'historique si `n` dépasse sa taille).
    pub fn recent(&self, n: usize) -> &[Draw] {
        crate::timeline::recent_draws(&self.draws, n)
    }

    /// Nouvel instantané avec `draw` en queue. Refuse un tirage qui n'est pas
    /// strictement postérieur au dernier connu.
    pub fn append(&self, draw: Draw) -> Result<DrawHistory> {
        if let Some(latest) = self.latest_round() {
            if draw.round <= latest {
                return Err(AnalysisError::StaleRound { round: draw.round, latest });
            }
        }
        let mut draws = Vec::with_capacity(self.draws.len() + 1);
        draws.extend_from_slice(&self.draws);
        draws.push(draw);
        Ok(Self { draws: draws.into() })
    }

    pub fn overview(&self) -> Result<DatasetOverview> {
        let (first, last) = match (self.draws.first(), self.draws.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnalysisError::EmptyDataset),
        };
        Ok(DatasetOverview {
            total_draws: self.draws.len(),
            first_round: first.round,
            latest_round: last.round,
            first_month: first.month_key().to_string(),
            latest_month: last.month_key().to_string(),
        })
    }
}

impl Deref for DrawHistory {
    type Target = [Draw];

    fn deref(&self) -> &[Draw] {
        &self.draws
    }
}

impl AsRef<[Draw]> for DrawHistory {
    fn as_ref(&self) -> &[Draw] {
        &self.draws
    }
}

impl From<Vec<Draw>> for DrawHistory {
    fn from(draws: Vec<Draw>) -> Self {
        Self::new(draws)
    }
}
