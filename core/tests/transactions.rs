//! Gift generation: aggregates, fund validity and amount bounds.

use chrono::NaiveDate;
use donor_sim_core::{
    catalog::CatalogStage,
    config::GeneratorConfig,
    constituent_stage::ConstituentStage,
    dataset::Dataset,
    engine::GeneratorEngine,
    event::GenEvent,
    model::{Appeal, AppealChannel, Campaign, CampaignType, DonorType, FrequencyTier, GivingLevel, Seasonality},
    rng::{RngBank, StageSlot},
    stage::GenerationStage,
    transaction_stage::{amount_range, TransactionStage, REPEAT_GIFT_FACTOR},
    types::GENERAL_FUND_ID,
};
use std::collections::{BTreeMap, BTreeSet};

#[test]
fn running_aggregates_match_the_transaction_table() {
    let mut engine = GeneratorEngine::build_test("txn-aggregates".into(), 11).unwrap();
    let data = engine.run().unwrap();
    assert!(!data.transactions.is_empty());

    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for t in &data.transactions {
        *totals.entry(t.constituent_id).or_default() += t.amount;
    }

    for c in &data.constituents {
        let expected = totals.get(&c.constituent_id).copied().unwrap_or(0.0);
        assert!(
            (c.giving.lifetime_giving - expected).abs() < 0.01,
            "constituent {}: aggregate {} vs table {expected}",
            c.constituent_id,
            c.giving.lifetime_giving
        );
        if expected == 0.0 {
            assert!(c.giving.first_gift_date.is_none());
            assert!(c.giving.last_gift_date.is_none());
        }
    }

    for t in &data.transactions {
        let c = data.constituent(t.constituent_id).unwrap();
        let first = c.giving.first_gift_date.unwrap();
        let last = c.giving.last_gift_date.unwrap();
        assert!(first <= t.date && t.date <= last);
        assert!(t.date >= c.creation_date, "gift predates its donor");
    }
}

#[test]
fn transaction_ids_are_a_dense_sequence() {
    let mut engine = GeneratorEngine::build_test("txn-ids".into(), 12).unwrap();
    let data = engine.run().unwrap();
    for (i, t) in data.transactions.iter().enumerate() {
        assert_eq!(t.transaction_id as usize, i + 1);
    }
}

#[test]
fn every_gift_fund_belongs_to_its_campaign_mapping() {
    let mut engine = GeneratorEngine::build_test("txn-funds".into(), 13).unwrap();
    let data = engine.run().unwrap();

    let mut mapped: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for m in &data.campaign_funds {
        mapped.entry(m.campaign_id).or_default().insert(m.fund_id);
    }
    for t in &data.transactions {
        match mapped.get(&t.campaign_id) {
            Some(funds) => assert!(funds.contains(&t.fund_id), "gift {} off-mapping", t.transaction_id),
            None => assert_eq!(t.fund_id, GENERAL_FUND_ID),
        }
    }
}

#[test]
fn small_one_time_individuals_stay_inside_the_scaled_range() {
    let config = GeneratorConfig {
        constituent_count: 400,
        ..GeneratorConfig::default_test()
    };
    let mut engine = GeneratorEngine::build_test_with("txn-bounds".into(), 14, config.clone()).unwrap();
    let data = engine.run().unwrap();
    let appeals: BTreeMap<u32, &Appeal> = data.appeals.iter().map(|a| (a.appeal_id, a)).collect();
    let (lo, hi) = amount_range(DonorType::Individual, GivingLevel::Small);
    assert_eq!((lo, hi), (5.0, 100.0));

    let mut first_gifts = 0;
    for (i, t) in data.transactions.iter().enumerate() {
        // Repeat gifts directly follow their donor's first gift in the same appeal.
        let repeat = i > 0 && {
            let prev = &data.transactions[i - 1];
            prev.constituent_id == t.constituent_id && prev.appeal_id == t.appeal_id
        };
        let donor = data.constituent(t.constituent_id).unwrap();
        let segment = data.segment(t.constituent_id);
        if donor.donor_type() != DonorType::Individual
            || segment.level != GivingLevel::Small
            || segment.frequency != FrequencyTier::OneTime
        {
            continue;
        }
        let channel = appeals[&t.appeal_id].channel;
        let scale = channel.amount_multiplier()
            * segment.giving_trend.amount_multiplier()
            * config.volume_multiplier;
        assert!(t.amount <= hi * scale + 0.01, "gift {} above range: {}", t.transaction_id, t.amount);
        let floor = if repeat { lo * scale * REPEAT_GIFT_FACTOR } else { lo * scale };
        assert!(
            t.amount >= floor - 0.01,
            "gift {} below range: {} < {floor}",
            t.transaction_id,
            t.amount
        );
        if !repeat {
            first_gifts += 1;
        }
    }
    assert!(first_gifts > 0, "no Small One-time individual gifts to check");
}

#[test]
fn appeal_before_any_constituent_exists_is_skipped() {
    let config = GeneratorConfig {
        constituent_count: 30,
        ..GeneratorConfig::default_test()
    };
    let bank = RngBank::new(15);
    let mut data = Dataset::default();
    CatalogStage
        .run(&mut data, &mut bank.for_stage(StageSlot::Catalog))
        .unwrap();
    ConstituentStage::new(config.clone())
        .run(&mut data, &mut bank.for_stage(StageSlot::Constituent))
        .unwrap();

    let before = config.start_date - chrono::Duration::days(30);
    data.campaigns = vec![Campaign {
        campaign_id: 1,
        name: "Early Bird".into(),
        campaign_type: CampaignType::Special,
        start_date: before,
        end_date: before + chrono::Duration::days(10),
        goal_amount: 5_000.0,
        description: String::new(),
    }];
    data.appeals = vec![Appeal {
        appeal_id: 1,
        campaign_id: 1,
        name: "Early Email".into(),
        channel: AppealChannel::EmailCampaign,
        seasonal: Seasonality::Regular,
        start_date: before,
        end_date: NaiveDate::from_ymd_opt(2020, 12, 5).unwrap(),
        goal_amount: 5_000.0,
        description: String::new(),
    }];

    let events = TransactionStage::new(config)
        .run(&mut data, &mut bank.for_stage(StageSlot::Transaction))
        .unwrap();
    assert!(data.transactions.is_empty());
    assert!(events
        .iter()
        .any(|e| matches!(e, GenEvent::AppealSkipped { appeal_id: 1, .. })));
}

#[test]
fn zero_volume_produces_no_gifts() {
    let config = GeneratorConfig {
        volume_multiplier: 0.0,
        ..GeneratorConfig::default_test()
    };
    let mut engine = GeneratorEngine::build_test_with("txn-zero".into(), 16, config).unwrap();
    let data = engine.run().unwrap();
    assert!(data.transactions.is_empty());
    assert!(data.pledges.is_empty());
    assert!(data.donor_metrics.is_empty());
    assert!(data.constituents.iter().all(|c| c.giving.lifetime_giving == 0.0));
}
