//! Gift generation.
//!
//! Appeals are processed in id order. For each one a weighted set of
//! eligible constituents responds; every response becomes one to three
//! gift transactions whose amount, date, fund and payment method derive
//! from the donor's segment and the appeal. The donor's running
//! aggregates are updated as each gift is appended, so they always
//! agree with the transaction table.

use crate::{
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{
        Appeal, AppealChannel, CampaignFund, Constituent, DonorSegment, DonorType, FrequencyTier,
        GivingLevel, PaymentMethod, Seasonality, Transaction, TransactionStatus, TransactionType,
    },
    rng::StageRng,
    stage::GenerationStage,
    types::{round_currency, FundId, TransactionId, GENERAL_FUND_ID},
    weighted,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Selection boost for donors whose affinity includes the campaign's primary fund.
pub const AFFINITY_BOOST: f64 = 3.0;
/// Share of a fresh amount given by the second and third gift to one appeal.
pub const REPEAT_GIFT_FACTOR: f64 = 0.7;
pub const REPEAT_GIFT_COUNT_WEIGHTS: [(u32, f64); 2] = [(2, 0.8), (3, 0.2)];
/// Position of the date peak inside the appeal window.
const DATE_MODE_FRACTION: f64 = 0.8;

/// Amount at or above which larger-gift payment mixes apply.
const ORGANIZATION_LARGE_GIFT: f64 = 5_000.0;
const INDIVIDUAL_LARGE_GIFT: f64 = 1_000.0;

const ORGANIZATION_LARGE_METHODS: [(PaymentMethod, f64); 3] = [
    (PaymentMethod::Check, 0.60),
    (PaymentMethod::Ach, 0.35),
    (PaymentMethod::Other, 0.05),
];
const ORGANIZATION_SMALL_METHODS: [(PaymentMethod, f64); 4] = [
    (PaymentMethod::CreditCard, 0.30),
    (PaymentMethod::Check, 0.50),
    (PaymentMethod::Ach, 0.18),
    (PaymentMethod::Other, 0.02),
];
const INDIVIDUAL_LARGE_METHODS: [(PaymentMethod, f64); 4] = [
    (PaymentMethod::CreditCard, 0.40),
    (PaymentMethod::Check, 0.45),
    (PaymentMethod::Ach, 0.12),
    (PaymentMethod::Other, 0.03),
];
const INDIVIDUAL_SMALL_METHODS: [(PaymentMethod, f64); 5] = [
    (PaymentMethod::CreditCard, 0.65),
    (PaymentMethod::Check, 0.20),
    (PaymentMethod::Ach, 0.08),
    (PaymentMethod::Cash, 0.05),
    (PaymentMethod::Other, 0.02),
];

/// Response rate for an appeal after the seasonal boost.
pub fn effective_response_rate(appeal: &Appeal, config: &GeneratorConfig) -> f64 {
    let base = config.response_rate(appeal.channel.label());
    match appeal.seasonal {
        Seasonality::December => base * (1.0 + config.seasonal.december_weight),
        Seasonality::GivingTuesday => base * (1.0 + config.seasonal.giving_tuesday_weight),
        Seasonality::Regular => base,
    }
}

pub fn frequency_weight(frequency: FrequencyTier) -> f64 {
    match frequency {
        FrequencyTier::OneTime => 0.7,
        FrequencyTier::Occasional => 1.0,
        FrequencyTier::Regular => 2.0,
        FrequencyTier::Loyal => 3.0,
    }
}

/// Relative chance a donor is drawn for an appeal.
pub fn selection_weight(segment: &DonorSegment, primary_fund: FundId) -> f64 {
    let affinity = if segment.cause_affinity.contains(&primary_fund) {
        AFFINITY_BOOST
    } else {
        1.0
    };
    affinity * frequency_weight(segment.frequency)
}

pub fn multi_gift_probability(frequency: FrequencyTier) -> f64 {
    match frequency {
        FrequencyTier::OneTime => 0.001,
        FrequencyTier::Occasional => 0.005,
        FrequencyTier::Regular => 0.01,
        FrequencyTier::Loyal => 0.05,
    }
}

/// Donors drawn for an appeal, capped at the eligible pool.
pub fn donor_count(eligible: usize, rate: f64, volume_multiplier: f64) -> usize {
    let wanted = (eligible as f64 * rate * volume_multiplier).round();
    if wanted <= 0.0 {
        0
    } else {
        (wanted as usize).min(eligible)
    }
}

/// Base amount range before multipliers.
pub fn amount_range(donor_type: DonorType, level: GivingLevel) -> (f64, f64) {
    match (donor_type, level) {
        (DonorType::Individual, GivingLevel::Small) => (5.0, 100.0),
        (DonorType::Individual, GivingLevel::Medium) => (101.0, 500.0),
        (DonorType::Individual, GivingLevel::Major) => (501.0, 2_500.0),
        (DonorType::Individual, GivingLevel::Principal) => (2_501.0, 25_000.0),
        (DonorType::Organization, GivingLevel::Small) => (100.0, 500.0),
        (DonorType::Organization, GivingLevel::Medium) => (501.0, 2_500.0),
        (DonorType::Organization, GivingLevel::Major) => (2_501.0, 10_000.0),
        (DonorType::Organization, GivingLevel::Principal) => (10_001.0, 100_000.0),
    }
}

pub fn gift_amount(
    donor_type: DonorType,
    segment: &DonorSegment,
    channel: AppealChannel,
    volume_multiplier: f64,
    rng: &mut StageRng,
) -> f64 {
    let (lo, hi) = amount_range(donor_type, segment.level);
    let base = rng.uniform(lo, hi);
    round_currency(
        base * channel.amount_multiplier()
            * segment.giving_trend.amount_multiplier()
            * volume_multiplier,
    )
}

pub fn payment_method(donor_type: DonorType, amount: f64, rng: &mut StageRng) -> PaymentMethod {
    let table: &[(PaymentMethod, f64)] = match donor_type {
        DonorType::Organization if amount >= ORGANIZATION_LARGE_GIFT => &ORGANIZATION_LARGE_METHODS,
        DonorType::Organization => &ORGANIZATION_SMALL_METHODS,
        DonorType::Individual if amount >= INDIVIDUAL_LARGE_GIFT => &INDIVIDUAL_LARGE_METHODS,
        DonorType::Individual => &INDIVIDUAL_SMALL_METHODS,
    };
    weighted::pick(table, rng).copied().unwrap_or(PaymentMethod::Other)
}

/// Gift date inside the appeal window, skewed toward its end.
pub fn gift_date(appeal: &Appeal, rng: &mut StageRng) -> NaiveDate {
    if appeal.channel == AppealChannel::Event {
        return appeal.end_date;
    }
    let span = (appeal.end_date - appeal.start_date).num_days();
    if span <= 0 {
        return appeal.start_date;
    }
    let span = span as f64;
    let offset = rng.triangular(0.0, span, span * DATE_MODE_FRACTION).floor() as i64;
    appeal.start_date + Duration::days(offset)
}

/// Weighted fund draw over a campaign's mapping rows.
pub fn select_fund(mapping: &[CampaignFund], rng: &mut StageRng) -> FundId {
    let weights: Vec<f64> = mapping.iter().map(|m| m.weight).collect();
    match weighted::WeightedTable::new(&weights) {
        Some(table) => mapping[table.draw(rng)].fund_id,
        None => GENERAL_FUND_ID,
    }
}

pub struct TransactionStage {
    config: GeneratorConfig,
}

impl TransactionStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Gifts for one selected donor. The first gift is at full size;
    /// later ones are scaled down.
    fn donor_gifts(
        &self,
        appeal: &Appeal,
        donor: &Constituent,
        segment: &DonorSegment,
        mapping: &[CampaignFund],
        rng: &mut StageRng,
    ) -> Vec<(NaiveDate, FundId, f64, PaymentMethod)> {
        let mut count = 1;
        if rng.chance(multi_gift_probability(segment.frequency)) {
            count = weighted::pick(&REPEAT_GIFT_COUNT_WEIGHTS, rng).copied().unwrap_or(2);
        }

        (0..count)
            .map(|n| {
                let date = gift_date(appeal, rng).max(donor.creation_date);
                let fund_id = select_fund(mapping, rng);
                let mut amount = gift_amount(
                    donor.donor_type(),
                    segment,
                    appeal.channel,
                    self.config.volume_multiplier,
                    rng,
                );
                if n > 0 {
                    amount = round_currency(amount * REPEAT_GIFT_FACTOR);
                }
                let method = payment_method(donor.donor_type(), amount, rng);
                (date, fund_id, amount, method)
            })
            .collect()
    }
}

impl GenerationStage for TransactionStage {
    fn name(&self) -> &'static str {
        "transaction"
    }

    fn run(&mut self, data: &mut Dataset, rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        let Dataset {
            constituents,
            segments,
            campaign_funds,
            appeals,
            transactions,
            ..
        } = data;

        let mut mappings: BTreeMap<_, Vec<CampaignFund>> = BTreeMap::new();
        for row in campaign_funds.iter() {
            mappings.entry(row.campaign_id).or_default().push(row.clone());
        }

        let mut events = Vec::new();
        let mut next_id: TransactionId = 1;
        transactions.clear();

        for appeal in appeals.iter() {
            let mapping = mappings
                .get(&appeal.campaign_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let primary_fund = mapping
                .iter()
                .find(|m| m.is_primary)
                .map_or(GENERAL_FUND_ID, |m| m.fund_id);

            let eligible: Vec<usize> = constituents
                .iter()
                .enumerate()
                .filter(|(_, c)| c.creation_date <= appeal.end_date)
                .map(|(i, _)| i)
                .collect();
            if eligible.is_empty() {
                log::warn!(
                    "stage=transaction: appeal {} skipped, no constituent existed by {}",
                    appeal.appeal_id,
                    appeal.end_date
                );
                events.push(GenEvent::AppealSkipped {
                    appeal_id: appeal.appeal_id,
                    reason: "no eligible constituents".into(),
                });
                continue;
            }

            let pool_segments: Vec<DonorSegment> = eligible
                .iter()
                .map(|i| {
                    let id = constituents[*i].constituent_id;
                    segments
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| DonorSegment::lowest_tier(id))
                })
                .collect();
            let weights: Vec<f64> = pool_segments
                .iter()
                .map(|s| selection_weight(s, primary_fund))
                .collect();

            let rate = effective_response_rate(appeal, &self.config);
            let k = donor_count(eligible.len(), rate, self.config.volume_multiplier);
            let drawn = weighted::sample_with_replacement(&weights, k, rng);
            let before = transactions.len();

            for pick in drawn {
                let idx = eligible[pick];
                let segment = &pool_segments[pick];
                let gifts = self.donor_gifts(appeal, &constituents[idx], segment, mapping, rng);
                let donor = &mut constituents[idx];
                for (date, fund_id, amount, payment_method) in gifts {
                    transactions.push(Transaction {
                        transaction_id: next_id,
                        constituent_id: donor.constituent_id,
                        appeal_id: appeal.appeal_id,
                        campaign_id: appeal.campaign_id,
                        fund_id,
                        date,
                        amount,
                        payment_method,
                        transaction_type: TransactionType::Gift,
                        status: TransactionStatus::Completed,
                    });
                    next_id += 1;
                    donor.giving.record_gift(amount, date);
                }
            }

            log::debug!(
                "stage=transaction: appeal {} ({}) rate={rate:.3} donors={k} gifts={}",
                appeal.appeal_id,
                appeal.channel.label(),
                transactions.len() - before
            );
        }

        let total: f64 = transactions.iter().map(|t| t.amount).sum();
        log::info!(
            "stage=transaction: {} gifts totalling {total:.2} across {} appeals",
            transactions.len(),
            appeals.len()
        );
        events.push(GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: transactions.len(),
        });
        Ok(events)
    }
}
