//! Pledge and pledge-payment tests.

use chrono::NaiveDate;
use donor_sim_core::{
    config::GeneratorConfig,
    dataset::Dataset,
    engine::GeneratorEngine,
    event::GenEvent,
    model::{PaymentStatus, Pledge, PledgeFrequency, PledgeStatus},
    pledge_stage::{allowed_frequencies, plan_payments, PledgeStage, START_CUTOFF_DAYS},
    rng::{RngBank, StageSlot},
    stage::GenerationStage,
};
use std::collections::{BTreeMap, BTreeSet};

fn pledge_heavy_config() -> GeneratorConfig {
    GeneratorConfig {
        constituent_count: 300,
        pledge_fraction: 0.5,
        volume_multiplier: 2.0,
        ..GeneratorConfig::default_test()
    }
}

#[test]
fn installments_multiply_out_to_the_total() {
    let mut engine =
        GeneratorEngine::build_test_with("pledge-total".into(), 31, pledge_heavy_config()).unwrap();
    let data = engine.run().unwrap();
    assert!(!data.pledges.is_empty(), "expected some pledges");

    for p in &data.pledges {
        let implied = p.installment_amount * f64::from(p.installments);
        assert!(
            (p.total_amount - implied).abs() < 0.01,
            "pledge {}: total {} vs {} x {}",
            p.pledge_id,
            p.total_amount,
            p.installment_amount,
            p.installments
        );
        assert!(p.frequency.installment_choices().contains(&p.installments));
    }
}

#[test]
fn only_repeat_donors_pledge_and_each_at_most_once() {
    let mut engine =
        GeneratorEngine::build_test_with("pledge-eligible".into(), 32, pledge_heavy_config()).unwrap();
    let data = engine.run().unwrap();

    let mut gifts: BTreeMap<u32, usize> = BTreeMap::new();
    for t in &data.transactions {
        *gifts.entry(t.constituent_id).or_default() += 1;
    }
    let eligible = gifts.values().filter(|n| **n >= 2).count();
    assert_eq!(data.pledges.len(), (eligible as f64 * 0.5).floor() as usize);

    let mut seen = BTreeSet::new();
    for p in &data.pledges {
        assert!(gifts.get(&p.constituent_id).copied().unwrap_or(0) >= 2);
        assert!(seen.insert(p.constituent_id), "donor {} pledged twice", p.constituent_id);
        let segment = data.segment(p.constituent_id);
        assert!(allowed_frequencies(segment.frequency).contains(&p.frequency));
        let donor = data.constituent(p.constituent_id).unwrap();
        assert!(p.start_date >= donor.creation_date);
    }
}

#[test]
fn pledge_starts_after_first_gift_and_inside_an_active_campaign() {
    let config = GeneratorConfig {
        constituent_count: 400,
        pledge_fraction: 0.6,
        ..pledge_heavy_config()
    };
    let latest = config.end_date - chrono::Duration::days(START_CUTOFF_DAYS);
    let mut engine =
        GeneratorEngine::build_test_with("pledge-start".into(), 77, config).unwrap();
    let data = engine.run().unwrap();
    assert!(!data.pledges.is_empty(), "expected some pledges");

    for p in &data.pledges {
        let donor = data.constituent(p.constituent_id).unwrap();
        let first_gift = donor.giving.first_gift_date.unwrap();
        assert!(p.start_date >= first_gift, "pledge {} starts before first gift", p.pledge_id);

        let earliest = first_gift.max(donor.creation_date);
        if earliest <= latest {
            assert!(p.start_date <= latest, "pledge {} starts after {latest}", p.pledge_id);
        } else {
            assert_eq!(p.start_date, earliest);
        }

        if data.campaigns.iter().any(|c| c.is_active_on(p.start_date)) {
            let campaign = data
                .campaigns
                .iter()
                .find(|c| c.campaign_id == p.campaign_id)
                .unwrap();
            assert!(
                campaign.is_active_on(p.start_date),
                "pledge {} tied to inactive campaign {}",
                p.pledge_id,
                p.campaign_id
            );
        }
    }
}

#[test]
fn payment_rows_follow_pledge_status() {
    let config = pledge_heavy_config();
    let mut engine = GeneratorEngine::build_test_with("pledge-payments".into(), 33, config.clone()).unwrap();
    let data = engine.run().unwrap();

    let mut payments: BTreeMap<u32, Vec<_>> = BTreeMap::new();
    for pay in &data.pledge_payments {
        payments.entry(pay.pledge_id).or_default().push(pay);
    }
    for p in &data.pledges {
        let rows = payments.get(&p.pledge_id).cloned().unwrap_or_default();
        match p.status {
            PledgeStatus::Completed => assert_eq!(rows.len() as u32, p.installments),
            PledgeStatus::Cancelled => assert!((rows.len() as u32) < p.installments.max(1)),
            PledgeStatus::Active => {
                assert!(!rows.is_empty());
                assert!(rows.len() as u32 <= p.installments);
            }
        }
        for (i, pay) in rows.iter().enumerate() {
            let offset = p.frequency.period_days() * i as i64;
            assert_eq!(pay.date, p.start_date + chrono::Duration::days(offset));
            assert_eq!(pay.amount, p.installment_amount);
            if pay.status == PaymentStatus::Pending {
                assert_eq!(p.status, PledgeStatus::Active);
                assert_eq!(i + 1, rows.len());
            }
        }
    }
}

#[test]
fn cancelled_pledges_skip_payments_seventy_percent_of_the_time() {
    let pledge = Pledge {
        pledge_id: 1,
        constituent_id: 1,
        campaign_id: 1,
        total_amount: 600.0,
        installment_amount: 50.0,
        start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        frequency: PledgeFrequency::Monthly,
        installments: 12,
        status: PledgeStatus::Cancelled,
    };
    let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let mut rng = RngBank::new(0x5EED).for_stage(StageSlot::Pledge);

    let trials = 5_000;
    let skipped = (0..trials)
        .filter(|_| plan_payments(&pledge, as_of, &mut rng).is_none())
        .count();
    let share = skipped as f64 / trials as f64;
    assert!((share - 0.7).abs() < 0.03, "skip share {share:.3}");
}

#[test]
fn no_campaigns_means_empty_pledge_tables() {
    let mut data = Dataset::default();
    let mut rng = RngBank::new(1).for_stage(StageSlot::Pledge);
    let events = PledgeStage::new(GeneratorConfig::default_test())
        .run(&mut data, &mut rng)
        .unwrap();
    assert!(data.pledges.is_empty());
    assert!(data.pledge_payments.is_empty());
    assert!(matches!(events[0], GenEvent::StageSkipped { .. }));
}
