//! Per-donor summary metrics. Reads every earlier table, writes only
//! `donor_metrics`.

use crate::{
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{DonorLevel, DonorMetrics, PledgeStatus, RetentionStatus, Transaction},
    rng::StageRng,
    stage::GenerationStage,
    types::{ConstituentId, HouseholdId},
};
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

/// Retention relative to the reference year `as_of_year`.
pub fn retention_status(
    gift_years: &BTreeSet<i32>,
    last_gift_year: i32,
    as_of_year: i32,
) -> RetentionStatus {
    let current = gift_years.contains(&as_of_year);
    let previous = gift_years.contains(&(as_of_year - 1));
    match (current, previous) {
        (true, true) => RetentionStatus::Retained,
        (true, false) => RetentionStatus::Reactivated,
        (false, true) => RetentionStatus::Lapsed,
        (false, false) => match as_of_year - last_gift_year {
            years if years <= 1 => RetentionStatus::NewRecent,
            years if years <= 3 => RetentionStatus::Lapsed,
            _ => RetentionStatus::DeeplyLapsed,
        },
    }
}

/// Summarize one donor's gifts. `None` for a donor with no gifts.
/// `yearly_giving` gets one entry for every year in `years`.
pub fn summarize(
    constituent_id: ConstituentId,
    gifts: &[&Transaction],
    years: RangeInclusive<i32>,
    as_of_year: i32,
) -> Option<DonorMetrics> {
    let first_gift_date = gifts.iter().map(|t| t.date).min()?;
    let last_gift_date = gifts.iter().map(|t| t.date).max()?;
    let lifetime_giving: f64 = gifts.iter().map(|t| t.amount).sum();
    let largest_gift = gifts.iter().map(|t| t.amount).fold(f64::MIN, f64::max);

    let mut yearly_giving: BTreeMap<i32, f64> = years.map(|y| (y, 0.0)).collect();
    let mut gift_years = BTreeSet::new();
    for t in gifts {
        let year = t.date.year();
        gift_years.insert(year);
        if let Some(total) = yearly_giving.get_mut(&year) {
            *total += t.amount;
        }
    }

    Some(DonorMetrics {
        constituent_id,
        first_gift_date,
        last_gift_date,
        lifetime_gifts: gifts.len() as u32,
        lifetime_giving,
        average_gift: lifetime_giving / gifts.len() as f64,
        largest_gift,
        donor_level: DonorLevel::from_lifetime_giving(lifetime_giving),
        retention_status: retention_status(&gift_years, last_gift_date.year(), as_of_year),
        has_open_pledge: false,
        household_id: None,
        yearly_giving,
    })
}

pub struct MetricsStage {
    config: GeneratorConfig,
}

impl MetricsStage {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for MetricsStage {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn run(&mut self, data: &mut Dataset, _rng: &mut StageRng) -> GenResult<Vec<GenEvent>> {
        let first_year = self.config.start_date.year();
        let as_of_year = self.config.as_of.year();
        // Appeals can run past the window end, so gifts may too.
        let last_year = data
            .transactions
            .iter()
            .map(|t| t.date.year())
            .max()
            .map_or(as_of_year, |y| y.max(as_of_year));

        let mut gifts: BTreeMap<ConstituentId, Vec<&Transaction>> = BTreeMap::new();
        for t in &data.transactions {
            gifts.entry(t.constituent_id).or_default().push(t);
        }
        let open_pledges: BTreeSet<ConstituentId> = data
            .pledges
            .iter()
            .filter(|p| p.status == PledgeStatus::Active)
            .map(|p| p.constituent_id)
            .collect();
        let households: BTreeMap<ConstituentId, HouseholdId> = data
            .households
            .iter()
            .map(|h| (h.constituent_id, h.household_id))
            .collect();

        let metrics: Vec<DonorMetrics> = data
            .constituents
            .iter()
            .filter_map(|c| {
                let id = c.constituent_id;
                let mut m = summarize(id, gifts.get(&id)?, first_year..=last_year, as_of_year)?;
                m.has_open_pledge = open_pledges.contains(&id);
                m.household_id = households.get(&id).copied();
                Some(m)
            })
            .collect();

        let major = metrics
            .iter()
            .filter(|m| matches!(m.donor_level, DonorLevel::Major | DonorLevel::Principal))
            .count();
        log::info!(
            "stage=metrics: {} donors summarized ({major} major or principal)",
            metrics.len()
        );
        data.donor_metrics = metrics;
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.donor_metrics.len(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PaymentMethod, TransactionStatus, TransactionType};
    use chrono::NaiveDate;

    fn gift(y: i32, m: u32, amount: f64) -> Transaction {
        Transaction {
            transaction_id: 1,
            constituent_id: 7,
            appeal_id: 1,
            campaign_id: 1,
            fund_id: 1,
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            amount,
            payment_method: PaymentMethod::Check,
            transaction_type: TransactionType::Gift,
            status: TransactionStatus::Completed,
        }
    }

    fn years(ys: &[i32]) -> BTreeSet<i32> {
        ys.iter().copied().collect()
    }

    #[test]
    fn retention_table() {
        assert_eq!(retention_status(&years(&[2023, 2024]), 2024, 2024), RetentionStatus::Retained);
        assert_eq!(retention_status(&years(&[2021, 2024]), 2024, 2024), RetentionStatus::Reactivated);
        assert_eq!(retention_status(&years(&[2023]), 2023, 2024), RetentionStatus::Lapsed);
        assert_eq!(retention_status(&years(&[2022]), 2022, 2024), RetentionStatus::Lapsed);
        assert_eq!(retention_status(&years(&[2020]), 2020, 2024), RetentionStatus::DeeplyLapsed);
        // Gifts dated after the reference year.
        assert_eq!(retention_status(&years(&[2025]), 2025, 2024), RetentionStatus::NewRecent);
    }

    #[test]
    fn summary_totals_and_yearly_breakdown() {
        let rows = [gift(2022, 3, 100.0), gift(2024, 12, 4_950.0), gift(2024, 1, 25.5)];
        let refs: Vec<&Transaction> = rows.iter().collect();
        let m = summarize(7, &refs, 2021..=2024, 2024).unwrap();

        assert_eq!(m.lifetime_gifts, 3);
        assert!((m.lifetime_giving - 5_075.5).abs() < 1e-9);
        assert_eq!(m.largest_gift, 4_950.0);
        assert_eq!(m.donor_level, DonorLevel::Major);
        assert_eq!(m.retention_status, RetentionStatus::Reactivated);
        assert_eq!(m.first_gift_date, NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
        assert_eq!(m.yearly_giving.keys().copied().collect::<Vec<_>>(), vec![2021, 2022, 2023, 2024]);
        assert_eq!(m.yearly_giving[&2021], 0.0);
        assert!((m.yearly_giving[&2024] - 4_975.5).abs() < 1e-9);
    }

    #[test]
    fn no_gifts_means_no_row() {
        assert!(summarize(1, &[], 2021..=2024, 2024).is_none());
    }
}
