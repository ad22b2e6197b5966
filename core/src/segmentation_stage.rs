//! Donor segmentation: one immutable behavioral profile per constituent.

use crate::{
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{Constituent, DonorSegment, DonorType, FrequencyTier, GivingLevel, GivingTrend},
    rng::StageRng,
    stage::GenerationStage,
    types::FundId,
    weighted,
};

pub const FREQUENCY_WEIGHTS: [(FrequencyTier, f64); 4] = [
    (FrequencyTier::OneTime, 0.4),
    (FrequencyTier::Occasional, 0.3),
    (FrequencyTier::Regular, 0.2),
    (FrequencyTier::Loyal, 0.1),
];

pub const INDIVIDUAL_LEVEL_WEIGHTS: [(GivingLevel, f64); 4] = [
    (GivingLevel::Small, 0.70),
    (GivingLevel::Medium, 0.20),
    (GivingLevel::Major, 0.07),
    (GivingLevel::Principal, 0.03),
];

pub const ORGANIZATION_LEVEL_WEIGHTS: [(GivingLevel, f64); 4] = [
    (GivingLevel::Small, 0.3),
    (GivingLevel::Medium, 0.4),
    (GivingLevel::Major, 0.2),
    (GivingLevel::Principal, 0.1),
];

pub const TREND_WEIGHTS: [(GivingTrend, f64); 3] = [
    (GivingTrend::Decreasing, 0.2),
    (GivingTrend::Stable, 0.5),
    (GivingTrend::Increasing, 0.3),
];

/// Number of funds in a donor's cause affinity.
pub const AFFINITY_SIZE: usize = 2;

/// Draw a segment for one constituent.
pub fn assign_segment(
    constituent: &Constituent,
    fund_ids: &[FundId],
    rng: &mut StageRng,
) -> DonorSegment {
    let frequency = *weighted::pick(&FREQUENCY_WEIGHTS, rng).unwrap_or(&FrequencyTier::OneTime);
    let level_table = match constituent.donor_type() {
        DonorType::Organization => &ORGANIZATION_LEVEL_WEIGHTS,
        DonorType::Individual => &INDIVIDUAL_LEVEL_WEIGHTS,
    };
    let level = *weighted::pick(level_table, rng).unwrap_or(&GivingLevel::Small);
    let giving_trend = *weighted::pick(&TREND_WEIGHTS, rng).unwrap_or(&GivingTrend::Stable);
    let cause_affinity = weighted::sample_distinct(fund_ids.len(), AFFINITY_SIZE, rng)
        .into_iter()
        .map(|i| fund_ids[i])
        .collect();

    DonorSegment {
        constituent_id: constituent.constituent_id,
        frequency,
        level,
        giving_trend,
        cause_affinity,
    }
}

pub struct SegmentationStage;

impl GenerationStage for SegmentationStage {
    fn name(&self) -> &'static str {
        "segmentation"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        let fund_ids: Vec<FundId> = data.funds.iter().map(|f| f.fund_id).collect();
        data.segments = data
            .constituents
            .iter()
            .map(|c| (c.constituent_id, assign_segment(c, &fund_ids, rng)))
            .collect();

        let loyal = data
            .segments
            .values()
            .filter(|s| s.frequency == FrequencyTier::Loyal)
            .count();
        log::info!(
            "stage=segmentation: assigned {} segments ({loyal} loyal)",
            data.segments.len()
        );
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.segments.len(),
        }])
    }
}
