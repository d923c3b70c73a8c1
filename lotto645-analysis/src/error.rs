use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("historique vide : aucune statistique calculable")]
    EmptyDataset,

    #[error("fenêtre d'analyse vide (0 tirage)")]
    EmptyWindow,

    #[error("tirage {round} déjà connu (dernier tirage : {latest})")]
    StaleRound { round: u32, latest: u32 },

    #[error("pool insuffisant : {available} numéros disponibles, {required} requis")]
    InsufficientPool { available: usize, required: usize },

    #[error("tirage pondéré impossible : {0}")]
    Sampling(#[from] rand::distr::weighted::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
