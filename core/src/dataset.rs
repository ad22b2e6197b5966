//! The run's tables, owned in one place and threaded through every stage.
//!
//! Ownership per table is by stage (see engine.rs). The only table a
//! later stage mutates is `constituents`, whose `giving` aggregates are
//! written by the transaction stage alone.

use crate::model::{
    Appeal, Campaign, CampaignFund, Constituent, DonorMetrics, DonorSegment, Fund,
    HouseholdMember, Pledge, PledgePayment, Transaction,
};
use crate::types::ConstituentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub funds: Vec<Fund>,
    /// Indexed by `constituent_id - 1`.
    pub constituents: Vec<Constituent>,
    pub segments: BTreeMap<ConstituentId, DonorSegment>,
    pub households: Vec<HouseholdMember>,
    pub campaigns: Vec<Campaign>,
    pub campaign_funds: Vec<CampaignFund>,
    pub appeals: Vec<Appeal>,
    pub transactions: Vec<Transaction>,
    pub pledges: Vec<Pledge>,
    pub pledge_payments: Vec<PledgePayment>,
    pub donor_metrics: Vec<DonorMetrics>,
}

impl Dataset {
    pub fn constituent(&self, id: ConstituentId) -> Option<&Constituent> {
        let idx = (id as usize).checked_sub(1)?;
        self.constituents.get(idx).filter(|c| c.constituent_id == id)
    }

    pub fn segment(&self, id: ConstituentId) -> DonorSegment {
        self.segments
            .get(&id)
            .cloned()
            .unwrap_or_else(|| DonorSegment::lowest_tier(id))
    }

    /// (table name, row count) for every output table, in output order.
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("funds", self.funds.len()),
            ("constituents", self.constituents.len()),
            ("donor_segments", self.segments.len()),
            ("households", self.households.len()),
            ("campaigns", self.campaigns.len()),
            ("campaign_funds", self.campaign_funds.len()),
            ("appeals", self.appeals.len()),
            ("transactions", self.transactions.len()),
            ("pledges", self.pledges.len()),
            ("pledge_payments", self.pledge_payments.len()),
            ("donor_metrics", self.donor_metrics.len()),
        ]
    }
}
