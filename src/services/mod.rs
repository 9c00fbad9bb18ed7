pub mod scoring;
pub mod season;

pub use scoring::TournamentScoringService;
pub use season::SeasonService;

/// Failure recorded for one entity of a batch; the batch itself carries on.
#[derive(Debug, Clone)]
pub struct EntityError {
    pub entity: String,
    pub message: String,
}

/// What a recompute did: counts, per-entity errors and non-fatal warnings.
/// The run only fails as a whole when the storage layer itself is gone.
#[derive(Debug, Default)]
pub struct RecomputeOutcome {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<EntityError>,
    pub warnings: Vec<String>,
}

impl RecomputeOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
