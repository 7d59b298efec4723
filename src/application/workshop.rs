//! WorkshopHandlers - Every command and query handler wired to one set of ports.

use std::sync::Arc;

use crate::config::{EngineConfig, ValidationError};
use crate::ports::{
    ComparisonSetRepository, ConsensusScoreRepository, RankingRepository, ScoreEntryRepository,
    WinTallyReader, WorkshopRegistry,
};

use super::handlers::pairwise::{
    GetComparisonProgressHandler, GetWinWeightsHandler, InvalidateItemComparisonsHandler,
    StartSessionHandler, SubmitVoteHandler,
};
use super::handlers::ranking::{CalculateRankingHandler, GetRankingHandler};
use super::handlers::scoring::{
    GetScoreSummaryHandler, LockConsensusHandler, SubmitScoreHandler, UnlockConsensusHandler,
};
use super::EventEmitter;

/// The persistence and registry ports the handlers run against.
#[derive(Clone)]
pub struct WorkshopPorts {
    pub sets: Arc<dyn ComparisonSetRepository>,
    pub tallies: Arc<dyn WinTallyReader>,
    pub entries: Arc<dyn ScoreEntryRepository>,
    pub consensus: Arc<dyn ConsensusScoreRepository>,
    pub rankings: Arc<dyn RankingRepository>,
    pub registry: Arc<dyn WorkshopRegistry>,
}

#[derive(Clone)]
pub struct WorkshopHandlers {
    pub start_session: Arc<StartSessionHandler>,
    pub submit_vote: Arc<SubmitVoteHandler>,
    pub invalidate_item: Arc<InvalidateItemComparisonsHandler>,
    pub win_weights: Arc<GetWinWeightsHandler>,
    pub progress: Arc<GetComparisonProgressHandler>,
    pub submit_score: Arc<SubmitScoreHandler>,
    pub lock_consensus: Arc<LockConsensusHandler>,
    pub unlock_consensus: Arc<UnlockConsensusHandler>,
    pub score_summary: Arc<GetScoreSummaryHandler>,
    pub calculate_ranking: Arc<CalculateRankingHandler>,
    pub get_ranking: Arc<GetRankingHandler>,
}

impl WorkshopHandlers {
    /// # Errors
    ///
    /// Returns `ValidationError` if `engine` is out of range.
    pub fn new(
        ports: WorkshopPorts,
        engine: &EngineConfig,
        emitter: EventEmitter,
    ) -> Result<Self, ValidationError> {
        engine.validate()?;
        let rule = engine.consensus_rule()?;

        Ok(Self {
            start_session: Arc::new(
                StartSessionHandler::new(
                    ports.sets.clone(),
                    ports.registry.clone(),
                    emitter.clone(),
                )
                .with_rule(rule),
            ),
            submit_vote: Arc::new(
                SubmitVoteHandler::new(ports.sets.clone(), emitter.clone())
                    .with_max_retries(engine.max_vote_retries),
            ),
            invalidate_item: Arc::new(
                InvalidateItemComparisonsHandler::new(ports.sets.clone(), emitter.clone())
                    .with_max_retries(engine.max_vote_retries),
            ),
            win_weights: Arc::new(GetWinWeightsHandler::new(
                ports.sets.clone(),
                ports.tallies.clone(),
            )),
            progress: Arc::new(GetComparisonProgressHandler::new(ports.sets.clone())),
            submit_score: Arc::new(SubmitScoreHandler::new(
                ports.entries.clone(),
                ports.registry.clone(),
                emitter.clone(),
            )),
            lock_consensus: Arc::new(LockConsensusHandler::new(
                ports.consensus.clone(),
                ports.registry.clone(),
                emitter.clone(),
            )),
            unlock_consensus: Arc::new(UnlockConsensusHandler::new(
                ports.consensus.clone(),
                emitter.clone(),
            )),
            score_summary: Arc::new(GetScoreSummaryHandler::new(ports.entries.clone())),
            calculate_ranking: Arc::new(CalculateRankingHandler::new(
                ports.sets,
                ports.tallies,
                ports.consensus,
                ports.rankings.clone(),
                ports.registry,
                emitter,
            )),
            get_ranking: Arc::new(GetRankingHandler::new(ports.rankings)),
        })
    }
}
