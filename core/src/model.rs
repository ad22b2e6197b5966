//! Table records produced by the generator.
//!
//! Every record is a flat row once serialized. Constituents are the one
//! exception in memory: identity fields live in a tagged variant so an
//! individual can never carry an organization name and vice versa.

use crate::types::{
    AppealId, CampaignId, ConstituentId, FundId, HouseholdId, PaymentId, PledgeId,
    TransactionId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Funds ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fund {
    pub fund_id: FundId,
    pub name: String,
    pub description: String,
}

// ── Constituents ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "NB")]
    NonBinary,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
            Self::NonBinary => "NB",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrganizationType {
    Corporation,
    Foundation,
    #[serde(rename = "Small Business")]
    SmallBusiness,
    Government,
}

impl OrganizationType {
    pub const ALL: [OrganizationType; 4] = [
        Self::Corporation,
        Self::Foundation,
        Self::SmallBusiness,
        Self::Government,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Corporation => "Corporation",
            Self::Foundation => "Foundation",
            Self::SmallBusiness => "Small Business",
            Self::Government => "Government",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub organization_name: String,
    pub organization_type: OrganizationType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConstituentKind {
    Individual(Person),
    Organization(Organization),
}

/// Coarse donor type used by amount ranges and payment-method tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonorType {
    Individual,
    Organization,
}

impl DonorType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Organization => "Organization",
        }
    }
}

/// Running giving totals, written only by the transaction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GivingAggregates {
    pub lifetime_giving: f64,
    pub first_gift_date: Option<NaiveDate>,
    pub last_gift_date: Option<NaiveDate>,
}

impl GivingAggregates {
    pub fn record_gift(&mut self, amount: f64, date: NaiveDate) {
        self.lifetime_giving += amount;
        self.first_gift_date = Some(self.first_gift_date.map_or(date, |d| d.min(date)));
        self.last_gift_date = Some(self.last_gift_date.map_or(date, |d| d.max(date)));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constituent {
    pub constituent_id: ConstituentId,
    pub kind: ConstituentKind,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub creation_date: NaiveDate,
    pub giving: GivingAggregates,
}

impl Constituent {
    pub fn donor_type(&self) -> DonorType {
        match self.kind {
            ConstituentKind::Individual(_) => DonorType::Individual,
            ConstituentKind::Organization(_) => DonorType::Organization,
        }
    }

    pub fn person(&self) -> Option<&Person> {
        match &self.kind {
            ConstituentKind::Individual(p) => Some(p),
            ConstituentKind::Organization(_) => None,
        }
    }
}

// ── Segments ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrequencyTier {
    #[serde(rename = "One-time")]
    OneTime,
    Occasional,
    Regular,
    Loyal,
}

impl FrequencyTier {
    pub const ALL: [FrequencyTier; 4] = [Self::OneTime, Self::Occasional, Self::Regular, Self::Loyal];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneTime => "One-time",
            Self::Occasional => "Occasional",
            Self::Regular => "Regular",
            Self::Loyal => "Loyal",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum GivingLevel {
    Small,
    Medium,
    Major,
    Principal,
}

impl GivingLevel {
    pub const ALL: [GivingLevel; 4] = [Self::Small, Self::Medium, Self::Major, Self::Principal];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Major => "Major",
            Self::Principal => "Principal",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GivingTrend {
    Decreasing,
    Stable,
    Increasing,
}

impl GivingTrend {
    pub const ALL: [GivingTrend; 3] = [Self::Decreasing, Self::Stable, Self::Increasing];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Decreasing => "Decreasing",
            Self::Stable => "Stable",
            Self::Increasing => "Increasing",
        }
    }

    pub fn amount_multiplier(&self) -> f64 {
        match self {
            Self::Increasing => 1.2,
            Self::Stable => 1.0,
            Self::Decreasing => 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorSegment {
    pub constituent_id: ConstituentId,
    pub frequency: FrequencyTier,
    pub level: GivingLevel,
    pub giving_trend: GivingTrend,
    pub cause_affinity: Vec<FundId>,
}

impl DonorSegment {
    /// Profile assumed for a constituent with no stored segment.
    pub fn lowest_tier(constituent_id: ConstituentId) -> Self {
        Self {
            constituent_id,
            frequency: FrequencyTier::OneTime,
            level: GivingLevel::Small,
            giving_trend: GivingTrend::Stable,
            cause_affinity: Vec::new(),
        }
    }
}

// ── Households ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseholdMember {
    pub household_id: HouseholdId,
    pub name: String,
    pub constituent_id: ConstituentId,
    pub primary_constituent_id: ConstituentId,
    pub is_primary: bool,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub creation_date: NaiveDate,
}

// ── Campaigns and appeals ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum CampaignType {
    Annual,
    Capital,
    Special,
    Program,
    Event,
}

impl CampaignType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual",
            Self::Capital => "Capital",
            Self::Special => "Special",
            Self::Program => "Program",
            Self::Event => "Event",
        }
    }

    /// Campaign length in days.
    pub fn duration_days(&self) -> i64 {
        match self {
            Self::Annual => 365,
            Self::Capital => 730,
            _ => 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    pub name: String,
    pub campaign_type: CampaignType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goal_amount: f64,
    pub description: String,
}

impl Campaign {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignFund {
    pub campaign_id: CampaignId,
    pub fund_id: FundId,
    pub weight: f64,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AppealChannel {
    #[serde(rename = "Direct Mail")]
    DirectMail,
    #[serde(rename = "Email Campaign")]
    EmailCampaign,
    #[serde(rename = "Phone-a-thon")]
    PhoneAThon,
    #[serde(rename = "Giving Tuesday")]
    GivingTuesday,
    #[serde(rename = "Monthly Giving Program")]
    MonthlyGivingProgram,
    #[serde(rename = "Major Donor Cultivation")]
    MajorDonorCultivation,
    #[serde(rename = "Corporate Partnerships")]
    CorporatePartnerships,
    #[serde(rename = "Board Giving")]
    BoardGiving,
    #[serde(rename = "Grant Application")]
    GrantApplication,
    #[serde(rename = "Social Media Challenge")]
    SocialMediaChallenge,
    #[serde(rename = "Peer to Peer")]
    PeerToPeer,
    #[serde(rename = "Volunteer Fundraising")]
    VolunteerFundraising,
    Event,
}

impl AppealChannel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DirectMail => "Direct Mail",
            Self::EmailCampaign => "Email Campaign",
            Self::PhoneAThon => "Phone-a-thon",
            Self::GivingTuesday => "Giving Tuesday",
            Self::MonthlyGivingProgram => "Monthly Giving Program",
            Self::MajorDonorCultivation => "Major Donor Cultivation",
            Self::CorporatePartnerships => "Corporate Partnerships",
            Self::BoardGiving => "Board Giving",
            Self::GrantApplication => "Grant Application",
            Self::SocialMediaChallenge => "Social Media Challenge",
            Self::PeerToPeer => "Peer to Peer",
            Self::VolunteerFundraising => "Volunteer Fundraising",
            Self::Event => "Event",
        }
    }

    /// Gift amount multiplier for responses to this channel.
    pub fn amount_multiplier(&self) -> f64 {
        match self {
            Self::GivingTuesday => 1.3,
            Self::Event => 1.5,
            Self::BoardGiving => 2.0,
            Self::DirectMail => 0.8,
            Self::MajorDonorCultivation => 3.0,
            Self::CorporatePartnerships => 2.5,
            Self::PeerToPeer => 0.9,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Seasonality {
    Regular,
    December,
    #[serde(rename = "Giving Tuesday")]
    GivingTuesday,
}

impl Seasonality {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::December => "December",
            Self::GivingTuesday => "Giving Tuesday",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appeal {
    pub appeal_id: AppealId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub channel: AppealChannel,
    pub seasonal: Seasonality,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goal_amount: f64,
    pub description: String,
}

// ── Transactions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    Check,
    #[serde(rename = "ACH")]
    Ach,
    Cash,
    Other,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::Check => "Check",
            Self::Ach => "ACH",
            Self::Cash => "Cash",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionType {
    Gift,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gift => "Gift",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub constituent_id: ConstituentId,
    pub appeal_id: AppealId,
    pub campaign_id: CampaignId,
    pub fund_id: FundId,
    pub date: NaiveDate,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
}

// ── Pledges ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PledgeFrequency {
    Monthly,
    Quarterly,
    Annual,
}

impl PledgeFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }

    /// Days between installments.
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Annual => 365,
        }
    }

    /// Installment size as a multiple of the donor's average gift.
    pub fn average_gift_multiple(&self) -> f64 {
        match self {
            Self::Monthly => 1.5,
            Self::Quarterly => 3.0,
            Self::Annual => 5.0,
        }
    }

    pub fn installment_choices(&self) -> &'static [u32] {
        match self {
            Self::Monthly => &[12, 24, 36],
            Self::Quarterly => &[4, 8],
            Self::Annual => &[1, 2, 3],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PledgeStatus {
    Active,
    Completed,
    Cancelled,
}

impl PledgeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pledge {
    pub pledge_id: PledgeId,
    pub constituent_id: ConstituentId,
    pub campaign_id: CampaignId,
    pub total_amount: f64,
    pub installment_amount: f64,
    pub start_date: NaiveDate,
    pub frequency: PledgeFrequency,
    pub installments: u32,
    pub status: PledgeStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Completed,
    Pending,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PledgePayment {
    pub payment_id: PaymentId,
    pub pledge_id: PledgeId,
    pub amount: f64,
    pub date: NaiveDate,
    pub status: PaymentStatus,
}

// ── Donor metrics ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DonorLevel {
    General,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Major,
    Principal,
}

impl DonorLevel {
    pub fn from_lifetime_giving(total: f64) -> Self {
        if total >= 25_000.0 {
            Self::Principal
        } else if total >= 5_000.0 {
            Self::Major
        } else if total >= 1_000.0 {
            Self::MidLevel
        } else {
            Self::General
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::MidLevel => "Mid-level",
            Self::Major => "Major",
            Self::Principal => "Principal",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RetentionStatus {
    Retained,
    Reactivated,
    Lapsed,
    #[serde(rename = "New/Recent")]
    NewRecent,
    #[serde(rename = "Deeply Lapsed")]
    DeeplyLapsed,
}

impl RetentionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retained => "Retained",
            Self::Reactivated => "Reactivated",
            Self::Lapsed => "Lapsed",
            Self::NewRecent => "New/Recent",
            Self::DeeplyLapsed => "Deeply Lapsed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorMetrics {
    pub constituent_id: ConstituentId,
    pub first_gift_date: NaiveDate,
    pub last_gift_date: NaiveDate,
    pub lifetime_gifts: u32,
    pub lifetime_giving: f64,
    pub average_gift: f64,
    pub largest_gift: f64,
    pub donor_level: DonorLevel,
    pub retention_status: RetentionStatus,
    pub has_open_pledge: bool,
    pub household_id: Option<HouseholdId>,
    /// Calendar year → total given that year.
    pub yearly_giving: BTreeMap<i32, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn aggregates_track_min_and_max_regardless_of_order() {
        let mut agg = GivingAggregates::default();
        agg.record_gift(50.0, date(2023, 6, 1));
        agg.record_gift(25.0, date(2022, 1, 15));
        agg.record_gift(10.0, date(2024, 2, 2));

        assert_eq!(agg.lifetime_giving, 85.0);
        assert_eq!(agg.first_gift_date, Some(date(2022, 1, 15)));
        assert_eq!(agg.last_gift_date, Some(date(2024, 2, 2)));
    }

    #[test]
    fn donor_level_thresholds() {
        assert_eq!(DonorLevel::from_lifetime_giving(999.99), DonorLevel::General);
        assert_eq!(DonorLevel::from_lifetime_giving(1_000.0), DonorLevel::MidLevel);
        assert_eq!(DonorLevel::from_lifetime_giving(5_000.0), DonorLevel::Major);
        assert_eq!(DonorLevel::from_lifetime_giving(25_000.0), DonorLevel::Principal);
    }

    #[test]
    fn labels_match_serialized_names() {
        let json = serde_json::to_string(&AppealChannel::PhoneAThon).unwrap();
        assert_eq!(json, format!("\"{}\"", AppealChannel::PhoneAThon.label()));
        let json = serde_json::to_string(&FrequencyTier::OneTime).unwrap();
        assert_eq!(json, format!("\"{}\"", FrequencyTier::OneTime.label()));
        let json = serde_json::to_string(&RetentionStatus::NewRecent).unwrap();
        assert_eq!(json, format!("\"{}\"", RetentionStatus::NewRecent.label()));
    }
}
