//! Appeal scheduling.
//!
//! Per campaign: an optional December appeal, an optional Giving Tuesday
//! appeal, then 2–4 regular appeals spaced evenly across the campaign.
//! Giving Tuesday is anchored to November 30 every year.

use crate::{
    catalog,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{Appeal, AppealChannel, Campaign, CampaignType, Seasonality},
    rng::StageRng,
    stage::GenerationStage,
    types::AppealId,
};
use chrono::{Datelike, Duration, NaiveDate};

pub const GIVING_TUESDAY_MONTH: u32 = 11;
pub const GIVING_TUESDAY_DAY: u32 = 30;

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Latest campaign year whose December overlaps the campaign window.
pub fn december_year(campaign: &Campaign) -> Option<i32> {
    (campaign.start_date.year()..=campaign.end_date.year())
        .rev()
        .find(|y| match (ymd(*y, 12, 1), ymd(*y, 12, 31)) {
            (Some(first), Some(last)) => first <= campaign.end_date && last >= campaign.start_date,
            _ => false,
        })
}

/// Latest campaign year whose Giving Tuesday anchor falls inside the window.
pub fn giving_tuesday_year(campaign: &Campaign) -> Option<i32> {
    (campaign.start_date.year()..=campaign.end_date.year())
        .rev()
        .find(|y| {
            ymd(*y, GIVING_TUESDAY_MONTH, GIVING_TUESDAY_DAY)
                .is_some_and(|d| campaign.is_active_on(d))
        })
}

/// Appeal length in days for a regular appeal on this channel.
pub fn appeal_duration_days(channel: AppealChannel, rng: &mut StageRng) -> i64 {
    match channel {
        AppealChannel::Event => 1,
        AppealChannel::EmailCampaign
        | AppealChannel::GivingTuesday
        | AppealChannel::SocialMediaChallenge => i64::from(rng.int_inclusive(1, 14)),
        _ => i64::from(rng.int_inclusive(14, 45)),
    }
}

fn next_appeal_id(appeals: &[Appeal]) -> AppealId {
    appeals.len() as AppealId + 1
}

fn goal(choices: &[f64], rng: &mut StageRng) -> f64 {
    rng.choose(choices).copied().unwrap_or(5_000.0)
}

/// Generate the appeals for every campaign, ids sequential from 1.
pub fn generate_appeals(campaigns: &[Campaign], rng: &mut StageRng) -> Vec<Appeal> {
    let mut appeals: Vec<Appeal> = Vec::new();

    for campaign in campaigns {
        let pool = catalog::appeal_pool(campaign.campaign_type);
        let regular_count = rng.int_inclusive(2, 4);
        let campaign_days = (campaign.end_date - campaign.start_date).num_days();

        if pool.contains(&AppealChannel::DirectMail) {
            if let Some(year) = december_year(campaign) {
                if let (Some(start_date), Some(end_date)) = (ymd(year, 12, 1), ymd(year, 12, 31)) {
                    appeals.push(Appeal {
                        appeal_id: next_appeal_id(&appeals),
                        campaign_id: campaign.campaign_id,
                        name: format!("Year-End Appeal - {}", campaign.name),
                        channel: AppealChannel::DirectMail,
                        seasonal: Seasonality::December,
                        start_date,
                        end_date,
                        goal_amount: goal(&catalog::DECEMBER_APPEAL_GOALS, rng),
                        description: format!("Year-end appeal for {}", campaign.name),
                    });
                }
            }
        }

        let gt_eligible = matches!(
            campaign.campaign_type,
            CampaignType::Annual | CampaignType::Special | CampaignType::Program
        );
        if gt_eligible {
            if let Some(anchor) = giving_tuesday_year(campaign)
                .and_then(|y| ymd(y, GIVING_TUESDAY_MONTH, GIVING_TUESDAY_DAY))
            {
                appeals.push(Appeal {
                    appeal_id: next_appeal_id(&appeals),
                    campaign_id: campaign.campaign_id,
                    name: format!("Giving Tuesday - {}", campaign.name),
                    channel: AppealChannel::GivingTuesday,
                    seasonal: Seasonality::GivingTuesday,
                    start_date: anchor - Duration::days(7),
                    end_date: anchor + Duration::days(1),
                    goal_amount: goal(&catalog::GIVING_TUESDAY_APPEAL_GOALS, rng),
                    description: format!("Giving Tuesday appeal for {}", campaign.name),
                });
            }
        }

        for i in 0..regular_count {
            let channel = *rng.choose(pool).unwrap_or(&AppealChannel::DirectMail);
            let offset =
                (campaign_days as f64 / f64::from(regular_count + 1) * f64::from(i + 1)) as i64;
            let start_date = campaign.start_date + Duration::days(offset);
            let duration = appeal_duration_days(channel, rng);
            appeals.push(Appeal {
                appeal_id: next_appeal_id(&appeals),
                campaign_id: campaign.campaign_id,
                name: format!("{} - {}", channel.label(), campaign.name),
                channel,
                seasonal: Seasonality::Regular,
                start_date,
                end_date: start_date + Duration::days(duration),
                goal_amount: goal(&catalog::REGULAR_APPEAL_GOALS, rng),
                description: format!("{} appeal for {}", channel.label(), campaign.name),
            });
        }
    }

    appeals
}

pub struct AppealStage;

impl GenerationStage for AppealStage {
    fn name(&self) -> &'static str {
        "appeal"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        if data.campaigns.is_empty() {
            log::warn!("stage=appeal: no campaigns, appeal table left empty");
            data.appeals.clear();
            return Ok(vec![GenEvent::StageSkipped {
                stage: self.name().into(),
                reason: "no campaigns".into(),
            }]);
        }

        data.appeals = generate_appeals(&data.campaigns, rng);
        let seasonal = data
            .appeals
            .iter()
            .filter(|a| a.seasonal != Seasonality::Regular)
            .count();
        log::info!(
            "stage=appeal: {} appeals ({seasonal} seasonal)",
            data.appeals.len()
        );
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.appeals.len(),
        }])
    }
}
