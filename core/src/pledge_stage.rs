//! Pledges and their installment payments.
//!
//! Only repeat donors (two or more gifts) can pledge. A pledge's size is
//! anchored to the donor's average gift, its status is decided against
//! the run's `as_of` date, and its payments follow from that status.

use crate::{
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{
        Campaign, FrequencyTier, PaymentStatus, Pledge, PledgeFrequency, PledgePayment,
        PledgeStatus,
    },
    rng::StageRng,
    stage::GenerationStage,
    types::{round_currency, CampaignId, ConstituentId, PaymentId, PledgeId},
    weighted,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Latest pledge start, in days before the dataset end.
pub const START_CUTOFF_DAYS: i64 = 90;
pub const MIN_GIFTS_TO_PLEDGE: usize = 2;
/// Chance a cancelled pledge has no payment rows at all.
pub const CANCELLED_SKIP_PROBABILITY: f64 = 0.7;
pub const PENDING_LAST_PAYMENT_PROBABILITY: f64 = 0.2;

const OPEN_STATUS_WEIGHTS: [(PledgeStatus, f64); 2] =
    [(PledgeStatus::Active, 0.9), (PledgeStatus::Cancelled, 0.1)];
const ENDED_STATUS_WEIGHTS: [(PledgeStatus, f64); 2] =
    [(PledgeStatus::Completed, 0.85), (PledgeStatus::Cancelled, 0.15)];

pub fn allowed_frequencies(tier: FrequencyTier) -> &'static [PledgeFrequency] {
    match tier {
        FrequencyTier::OneTime => &[PledgeFrequency::Annual],
        FrequencyTier::Occasional => &[PledgeFrequency::Annual, PledgeFrequency::Quarterly],
        FrequencyTier::Regular => &[PledgeFrequency::Monthly, PledgeFrequency::Quarterly],
        FrequencyTier::Loyal => &[
            PledgeFrequency::Monthly,
            PledgeFrequency::Quarterly,
            PledgeFrequency::Annual,
        ],
    }
}

/// Date the last installment period closes.
pub fn pledge_end_date(start: NaiveDate, frequency: PledgeFrequency, installments: u32) -> NaiveDate {
    start + Duration::days(frequency.period_days() * i64::from(installments))
}

pub fn pledge_status(end_date: NaiveDate, as_of: NaiveDate, rng: &mut StageRng) -> PledgeStatus {
    let table = if end_date > as_of {
        &OPEN_STATUS_WEIGHTS
    } else {
        &ENDED_STATUS_WEIGHTS
    };
    weighted::pick(table, rng).copied().unwrap_or(PledgeStatus::Cancelled)
}

/// Uniform start in `[earliest, dataset_end - START_CUTOFF_DAYS]`, or
/// `earliest` itself when that range is empty.
pub fn pledge_start_date(
    earliest: NaiveDate,
    dataset_end: NaiveDate,
    rng: &mut StageRng,
) -> NaiveDate {
    let latest = dataset_end - Duration::days(START_CUTOFF_DAYS);
    rng.date_between(earliest, latest).unwrap_or(earliest)
}

/// Number of payment rows for a pledge. `None` means the pledge gets no
/// payment rows at all, which only happens to cancelled pledges.
pub fn plan_payments(pledge: &Pledge, as_of: NaiveDate, rng: &mut StageRng) -> Option<u32> {
    match pledge.status {
        PledgeStatus::Completed => Some(pledge.installments),
        PledgeStatus::Cancelled => {
            if rng.chance(CANCELLED_SKIP_PROBABILITY) {
                None
            } else {
                Some(rng.int_inclusive(0, pledge.installments.saturating_sub(1)))
            }
        }
        PledgeStatus::Active => {
            let elapsed = (as_of - pledge.start_date).num_days().max(0);
            let periods = elapsed / pledge.frequency.period_days();
            let due = (periods + 1).min(i64::from(pledge.installments));
            Some(due as u32)
        }
    }
}

/// Per-donor gift history needed to size a pledge.
#[derive(Debug, Clone, Copy)]
struct GiftHistory {
    count: usize,
    total: f64,
}

pub struct PledgeStage {
    config: GeneratorConfig,
}

impl PledgeStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    fn campaign_for(
        start: NaiveDate,
        campaigns: &[Campaign],
        rng: &mut StageRng,
    ) -> Option<CampaignId> {
        let active: Vec<&Campaign> = campaigns.iter().filter(|c| c.is_active_on(start)).collect();
        match rng.choose(&active) {
            Some(c) => Some(c.campaign_id),
            None => rng.choose(campaigns).map(|c| c.campaign_id),
        }
    }

    fn payments(
        pledge: &Pledge,
        due: u32,
        next_id: &mut PaymentId,
        rng: &mut StageRng,
    ) -> Vec<PledgePayment> {
        let period = pledge.frequency.period_days();
        (0..due)
            .map(|i| {
                let last = i + 1 == due;
                let status = if pledge.status == PledgeStatus::Active
                    && last
                    && rng.chance(PENDING_LAST_PAYMENT_PROBABILITY)
                {
                    PaymentStatus::Pending
                } else {
                    PaymentStatus::Completed
                };
                let payment = PledgePayment {
                    payment_id: *next_id,
                    pledge_id: pledge.pledge_id,
                    amount: pledge.installment_amount,
                    date: pledge.start_date + Duration::days(period * i64::from(i)),
                    status,
                };
                *next_id += 1;
                payment
            })
            .collect()
    }
}

impl GenerationStage for PledgeStage {
    fn name(&self) -> &'static str {
        "pledge"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        data.pledges.clear();
        data.pledge_payments.clear();
        if data.campaigns.is_empty() {
            log::warn!("stage=pledge: no campaigns, pledge tables left empty");
            return Ok(vec![GenEvent::StageSkipped {
                stage: self.name().into(),
                reason: "no campaigns".into(),
            }]);
        }

        // Donors in order of their first gift in the transaction stream.
        let mut order: Vec<ConstituentId> = Vec::new();
        let mut history: BTreeMap<ConstituentId, GiftHistory> = BTreeMap::new();
        for t in &data.transactions {
            let entry = history.entry(t.constituent_id).or_insert_with(|| {
                order.push(t.constituent_id);
                GiftHistory { count: 0, total: 0.0 }
            });
            entry.count += 1;
            entry.total += t.amount;
        }
        let eligible: Vec<ConstituentId> = order
            .into_iter()
            .filter(|id| history.get(id).is_some_and(|h| h.count >= MIN_GIFTS_TO_PLEDGE))
            .collect();

        let wanted = (eligible.len() as f64 * self.config.pledge_fraction).floor() as usize;
        let chosen = weighted::sample_distinct(eligible.len(), wanted, rng);

        let mut next_payment: PaymentId = 1;
        for pick in chosen {
            let donor_id = eligible[pick];
            let Some(donor) = data.constituent(donor_id) else {
                continue;
            };
            let Some(gifts) = history.get(&donor_id).copied() else {
                continue;
            };
            let segment = data.segment(donor_id);
            let average_gift = gifts.total / gifts.count as f64;

            let frequency = *rng
                .choose(allowed_frequencies(segment.frequency))
                .unwrap_or(&PledgeFrequency::Annual);
            let earliest = donor
                .giving
                .first_gift_date
                .map_or(donor.creation_date, |d| d.max(donor.creation_date));
            let start_date = pledge_start_date(earliest, self.config.end_date, rng);
            let installments = *rng.choose(frequency.installment_choices()).unwrap_or(&1);
            let installment_amount =
                round_currency(average_gift * frequency.average_gift_multiple());
            let total_amount = round_currency(installment_amount * f64::from(installments));
            let Some(campaign_id) = Self::campaign_for(start_date, &data.campaigns, rng) else {
                continue;
            };
            let end_date = pledge_end_date(start_date, frequency, installments);
            let status = pledge_status(end_date, self.config.as_of, rng);

            let pledge = Pledge {
                pledge_id: (data.pledges.len() + 1) as PledgeId,
                constituent_id: donor_id,
                campaign_id,
                total_amount,
                installment_amount,
                start_date,
                frequency,
                installments,
                status,
            };
            if let Some(due) = plan_payments(&pledge, self.config.as_of, rng) {
                let rows = Self::payments(&pledge, due, &mut next_payment, rng);
                data.pledge_payments.extend(rows);
            }
            data.pledges.push(pledge);
        }

        let active = data
            .pledges
            .iter()
            .filter(|p| p.status == PledgeStatus::Active)
            .count();
        log::info!(
            "stage=pledge: {} pledges ({active} active) from {} repeat donors, {} payments",
            data.pledges.len(),
            eligible.len(),
            data.pledge_payments.len()
        );
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.pledges.len(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pledge(status: PledgeStatus, frequency: PledgeFrequency, installments: u32) -> Pledge {
        Pledge {
            pledge_id: 1,
            constituent_id: 1,
            campaign_id: 1,
            total_amount: 120.0 * f64::from(installments),
            installment_amount: 120.0,
            start_date: date(2024, 1, 1),
            frequency,
            installments,
            status,
        }
    }

    #[test]
    fn one_time_donors_only_pledge_annually() {
        assert_eq!(allowed_frequencies(FrequencyTier::OneTime), &[PledgeFrequency::Annual]);
        assert_eq!(allowed_frequencies(FrequencyTier::Loyal).len(), 3);
    }

    #[test]
    fn active_pledge_pays_elapsed_periods_plus_one() {
        let mut rng = RngBank::new(3).for_stage(StageSlot::Pledge);
        let p = pledge(PledgeStatus::Active, PledgeFrequency::Monthly, 12);
        assert_eq!(plan_payments(&p, date(2024, 3, 15), &mut rng), Some(3));
        assert_eq!(plan_payments(&p, date(2027, 1, 1), &mut rng), Some(12));
        // A start after as_of never yields a negative count.
        assert_eq!(plan_payments(&p, date(2023, 6, 1), &mut rng), Some(1));
    }

    #[test]
    fn start_date_stays_inside_the_allowed_range() {
        let mut rng = RngBank::new(8).for_stage(StageSlot::Pledge);
        let end = date(2024, 12, 31);
        let latest = date(2024, 10, 2);
        for _ in 0..200 {
            let start = pledge_start_date(date(2024, 6, 1), end, &mut rng);
            assert!(date(2024, 6, 1) <= start && start <= latest, "start {start}");
        }
    }

    #[test]
    fn empty_start_range_falls_back_to_earliest() {
        let mut rng = RngBank::new(9).for_stage(StageSlot::Pledge);
        let end = date(2024, 12, 31);
        // First gift inside the final 90 days.
        let earliest = date(2024, 11, 15);
        assert_eq!(pledge_start_date(earliest, end, &mut rng), earliest);
        assert_eq!(pledge_start_date(date(2025, 2, 1), end, &mut rng), date(2025, 2, 1));
    }

    #[test]
    fn completed_pledge_pays_every_installment() {
        let mut rng = RngBank::new(3).for_stage(StageSlot::Pledge);
        let p = pledge(PledgeStatus::Completed, PledgeFrequency::Quarterly, 8);
        assert_eq!(plan_payments(&p, date(2030, 1, 1), &mut rng), Some(8));
    }

    #[test]
    fn cancelled_pledges_pay_fewer_than_all_installments() {
        let mut rng = RngBank::new(4).for_stage(StageSlot::Pledge);
        let p = pledge(PledgeStatus::Cancelled, PledgeFrequency::Annual, 3);
        for _ in 0..500 {
            if let Some(n) = plan_payments(&p, date(2030, 1, 1), &mut rng) {
                assert!(n < 3);
            }
        }
    }

    #[test]
    fn status_depends_on_end_relative_to_as_of() {
        let mut rng = RngBank::new(5).for_stage(StageSlot::Pledge);
        let as_of = date(2024, 6, 30);
        for _ in 0..200 {
            let open = pledge_status(date(2025, 1, 1), as_of, &mut rng);
            assert_ne!(open, PledgeStatus::Completed);
            let ended = pledge_status(date(2024, 6, 30), as_of, &mut rng);
            assert_ne!(ended, PledgeStatus::Active);
        }
    }

    #[test]
    fn payments_are_spaced_by_period_with_pending_only_last() {
        let mut rng = RngBank::new(6).for_stage(StageSlot::Pledge);
        let p = pledge(PledgeStatus::Active, PledgeFrequency::Quarterly, 8);
        let mut next = 1;
        for _ in 0..50 {
            let rows = PledgeStage::payments(&p, 4, &mut next, &mut rng);
            assert_eq!(rows.len(), 4);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!((row.date - p.start_date).num_days(), 90 * i as i64);
                if i < 3 {
                    assert_eq!(row.status, PaymentStatus::Completed);
                }
            }
        }
        assert_eq!(next, 201);
    }
}
