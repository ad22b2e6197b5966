//! Stage trait.
//!
//! RULE: Every generation step implements GenerationStage.
//! The engine runs each registered stage exactly once,
//! in registration order. Order is fixed and documented in engine.rs.

use crate::{dataset::Dataset, error::GenResult, event::GenEvent, rng::StageRng};

/// The contract every stage must fulfill.
pub trait GenerationStage: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Read the tables produced by earlier stages and fill this stage's own.
    ///
    /// - `data`: the run's tables; a stage writes only the ones it owns
    /// - `rng`:  this stage's deterministic RNG stream
    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>>;
}
