//! The generation engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Catalog        funds
//!   2. Constituent    individuals and organizations
//!   3. Segmentation   one donor segment per constituent
//!   4. Household      partition of individuals
//!   5. Campaign       campaigns and fund mappings
//!   6. Appeal         seasonal and regular appeals
//!   7. Transaction    gifts, plus constituent giving aggregates
//!   8. Pledge         pledges and pledge payments
//!   9. Metrics        per-donor summaries
//!
//! RULES:
//!   - Stages run once each, in registration order.
//!   - A stage reads only tables written by stages before it.
//!   - All randomness flows through the RngBank.
//!   - Every stage event is recorded in the event log.

use crate::{
    appeal_stage::AppealStage,
    campaign_stage::CampaignStage,
    catalog::CatalogStage,
    config::GeneratorConfig,
    constituent_stage::ConstituentStage,
    dataset::Dataset,
    error::{GenError, GenResult},
    event::{EventLogEntry, GenEvent},
    household_stage::HouseholdStage,
    metrics_stage::MetricsStage,
    pledge_stage::PledgeStage,
    rng::{RngBank, StageSlot},
    segmentation_stage::SegmentationStage,
    stage::GenerationStage,
    store::DatasetStore,
    transaction_stage::TransactionStage,
    types::RunId,
};

pub struct GeneratorEngine {
    pub run_id: RunId,
    pub rng_bank: RngBank,
    pub config: GeneratorConfig,
    pub store: DatasetStore,
    seed: u64,
    stages: Vec<(StageSlot, Box<dyn GenerationStage>)>,
    dataset: Dataset,
    next_seq: u64,
    completed: bool,
}

impl GeneratorEngine {
    pub fn new(run_id: RunId, seed: u64, config: GeneratorConfig, store: DatasetStore) -> Self {
        Self {
            rng_bank: RngBank::new(seed),
            config,
            store,
            seed,
            stages: Vec::new(),
            dataset: Dataset::default(),
            next_seq: 0,
            completed: false,
            run_id,
        }
    }

    /// Build a fully wired engine with every stage registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(run_id: RunId, seed: u64, config: GeneratorConfig, store: DatasetStore) -> Self {
        let mut engine = GeneratorEngine::new(run_id, seed, config.clone(), store);

        // Execution order is fixed. Never reorder.
        engine.register(StageSlot::Catalog, Box::new(CatalogStage));
        engine.register(
            StageSlot::Constituent,
            Box::new(ConstituentStage::new(config.clone())),
        );
        engine.register(StageSlot::Segmentation, Box::new(SegmentationStage));
        engine.register(StageSlot::Household, Box::new(HouseholdStage));
        engine.register(StageSlot::Campaign, Box::new(CampaignStage::new(config.clone())));
        engine.register(StageSlot::Appeal, Box::new(AppealStage));
        engine.register(
            StageSlot::Transaction,
            Box::new(TransactionStage::new(config.clone())),
        );
        engine.register(StageSlot::Pledge, Box::new(PledgeStage::new(config.clone())));
        engine.register(StageSlot::Metrics, Box::new(MetricsStage::new(config)));
        engine
    }

    /// Fully wired engine over a migrated in-memory store and the small
    /// test configuration.
    pub fn build_test(run_id: RunId, seed: u64) -> GenResult<Self> {
        Self::build_test_with(run_id, seed, GeneratorConfig::default_test())
    }

    /// Like `build_test`, with a caller-supplied configuration.
    pub fn build_test_with(run_id: RunId, seed: u64, config: GeneratorConfig) -> GenResult<Self> {
        let store = DatasetStore::in_memory()?;
        store.migrate()?;
        store.insert_run(&run_id, seed, "0.1.0-test", 0)?;
        Ok(Self::build(run_id, seed, config, store))
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, slot: StageSlot, stage: Box<dyn GenerationStage>) {
        self.stages.push((slot, stage));
    }

    /// Run every stage once, then write the finished tables to the store.
    pub fn run(&mut self) -> GenResult<&Dataset> {
        if self.completed {
            return Err(GenError::RunAlreadyCompleted {
                run_id: self.run_id.clone(),
            });
        }
        self.config.validate()?;

        let init = GenEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed: self.seed,
        };
        self.record("engine", &init)?;

        let mut stages = std::mem::take(&mut self.stages);
        for (slot, stage) in stages.iter_mut() {
            let mut rng = self.rng_bank.for_stage(*slot);
            let events = stage.run(&mut self.dataset, &mut rng)?;
            for event in &events {
                self.record(stage.name(), event)?;
            }
        }
        self.stages = stages;

        self.store.save_dataset(&self.run_id, &self.dataset)?;
        self.completed = true;
        log::info!(
            "run={} seed={}: {} constituents, {} gifts, {} pledges",
            self.run_id,
            self.seed,
            self.dataset.constituents.len(),
            self.dataset.transactions.len(),
            self.dataset.pledges.len()
        );
        Ok(&self.dataset)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Events persisted for this run, in emission order.
    pub fn store_events(&self) -> GenResult<Vec<EventLogEntry>> {
        self.store.events_for_run(&self.run_id)
    }

    fn record(&mut self, stage: &str, event: &GenEvent) -> GenResult<()> {
        let entry = EventLogEntry {
            id: None,
            run_id: self.run_id.clone(),
            seq: self.next_seq,
            stage: stage.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        };
        self.store.append_event(&entry)?;
        self.next_seq += 1;
        Ok(())
    }
}
