//! Campaigns and their weighted fund mappings.

use crate::{
    catalog,
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{Campaign, CampaignFund, CampaignType},
    rng::StageRng,
    stage::GenerationStage,
    types::{CampaignId, FundId, GENERAL_FUND_ID},
    weighted,
};
use chrono::Duration;

/// Normalized mapping weights for `n` funds, highest first.
pub fn rank_weights(n: usize) -> Vec<f64> {
    let n = n.min(catalog::FUND_RANK_WEIGHTS.len());
    let raw = &catalog::FUND_RANK_WEIGHTS[..n];
    let total: f64 = raw.iter().sum();
    raw.iter().map(|w| w / total).collect()
}

/// Map one campaign to 1–3 of its type's affinity funds.
pub fn map_campaign_funds(
    campaign_id: CampaignId,
    campaign_type: CampaignType,
    rng: &mut StageRng,
) -> Vec<CampaignFund> {
    let relevant = catalog::fund_affinities(campaign_type);
    let wanted = rng.int_inclusive(1, 3) as usize;
    let mut selected: Vec<FundId> = weighted::sample_distinct(relevant.len(), wanted, rng)
        .into_iter()
        .map(|i| relevant[i])
        .collect();
    if selected.is_empty() {
        selected.push(GENERAL_FUND_ID);
    }

    selected
        .iter()
        .zip(rank_weights(selected.len()))
        .enumerate()
        .map(|(rank, (fund_id, weight))| CampaignFund {
            campaign_id,
            fund_id: *fund_id,
            weight,
            is_primary: rank == 0,
        })
        .collect()
}

pub struct CampaignStage {
    config: GeneratorConfig,
}

impl CampaignStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn campaign(
        &self,
        campaign_id: CampaignId,
        campaign_type: CampaignType,
        name: &str,
        rng: &mut StageRng,
    ) -> Campaign {
        let duration = Duration::days(campaign_type.duration_days());
        // A dataset window shorter than the campaign pins it to the window start.
        let start_date = rng
            .date_between(self.config.start_date, self.config.end_date - duration)
            .unwrap_or(self.config.start_date);
        let goal_amount = *rng.choose(&catalog::CAMPAIGN_GOALS).unwrap_or(&50_000.0);
        Campaign {
            campaign_id,
            name: name.to_string(),
            campaign_type,
            start_date,
            end_date: start_date + duration,
            goal_amount,
            description: format!("Campaign for {name}"),
        }
    }
}

impl GenerationStage for CampaignStage {
    fn name(&self) -> &'static str {
        "campaign"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        let mut campaigns = Vec::with_capacity(catalog::CAMPAIGN_TEMPLATES.len());
        let mut mappings = Vec::new();

        for (idx, (campaign_type, name)) in catalog::CAMPAIGN_TEMPLATES.iter().enumerate() {
            let campaign_id = (idx + 1) as CampaignId;
            campaigns.push(self.campaign(campaign_id, *campaign_type, name, rng));
            mappings.extend(map_campaign_funds(campaign_id, *campaign_type, rng));
        }

        log::info!(
            "stage=campaign: {} campaigns, {} fund mappings",
            campaigns.len(),
            mappings.len()
        );
        data.campaigns = campaigns;
        data.campaign_funds = mappings;
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.campaigns.len(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    #[test]
    fn rank_weights_sum_to_one() {
        for n in 1..=3 {
            let w = rank_weights(n);
            assert_eq!(w.len(), n);
            assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(w.windows(2).all(|p| p[0] >= p[1]));
        }
        assert_eq!(rank_weights(1), vec![1.0]);
    }

    #[test]
    fn mappings_have_one_primary_and_stay_within_affinity() {
        let mut rng = RngBank::new(31).for_stage(StageSlot::Campaign);
        for (i, (campaign_type, _)) in catalog::CAMPAIGN_TEMPLATES.iter().enumerate() {
            for _ in 0..20 {
                let rows = map_campaign_funds(i as u32 + 1, *campaign_type, &mut rng);
                assert!((1..=3).contains(&rows.len()));
                assert_eq!(rows.iter().filter(|r| r.is_primary).count(), 1);
                let total: f64 = rows.iter().map(|r| r.weight).sum();
                assert!((total - 1.0).abs() < 1e-9);
                let allowed = catalog::fund_affinities(*campaign_type);
                assert!(rows.iter().all(|r| allowed.contains(&r.fund_id)));
            }
        }
    }

    #[test]
    fn campaigns_fit_inside_the_dataset_window() {
        let config = GeneratorConfig::default_test();
        let stage = CampaignStage::new(config.clone());
        let mut rng = RngBank::new(8).for_stage(StageSlot::Campaign);
        for (campaign_type, name) in catalog::CAMPAIGN_TEMPLATES {
            let c = stage.campaign(1, campaign_type, name, &mut rng);
            assert!(c.start_date >= config.start_date);
            assert!(c.end_date <= config.end_date);
            assert_eq!((c.end_date - c.start_date).num_days(), campaign_type.duration_days());
        }
    }
}
