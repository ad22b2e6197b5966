//! Static reference data: funds, campaign templates, and the
//! campaign-type affinities for funds and appeal channels.
//!
//! Pure data. Nothing here touches an RNG.

use crate::{
    dataset::Dataset,
    error::GenResult,
    event::GenEvent,
    model::{AppealChannel, CampaignType, Fund},
    rng::StageRng,
    stage::GenerationStage,
    types::FundId,
};

const FUNDS: [(FundId, &str, &str); 8] = [
    (1, "General Operations", "Supports daily operations and administrative needs"),
    (2, "Land Acquisition", "Purchase of critical habitats and conservation lands"),
    (3, "Wildlife Protection", "Species conservation and habitat restoration"),
    (4, "Climate Action", "Initiatives addressing climate change impacts"),
    (5, "Environmental Education", "Public awareness and educational programs"),
    (6, "Research & Science", "Scientific research and field studies"),
    (7, "Policy & Advocacy", "Environmental policy reform efforts"),
    (8, "Endowment Fund", "Long-term sustainability and financial security"),
];

pub fn funds() -> Vec<Fund> {
    FUNDS
        .iter()
        .map(|(id, name, description)| Fund {
            fund_id: *id,
            name: (*name).into(),
            description: (*description).into(),
        })
        .collect()
}

pub const CAMPAIGN_TEMPLATES: [(CampaignType, &str); 24] = [
    (CampaignType::Annual, "Earth Protectors Annual Fund"),
    (CampaignType::Capital, "Wildlands Corridor Acquisition"),
    (CampaignType::Special, "Forest Fire Recovery"),
    (CampaignType::Program, "Ocean Plastics Initiative"),
    (CampaignType::Special, "Endangered Species Protection"),
    (CampaignType::Program, "Youth Environmental Leadership"),
    (CampaignType::Program, "Native Plant Restoration"),
    (CampaignType::Special, "Clean Water Action"),
    (CampaignType::Capital, "Conservation Science Center"),
    (CampaignType::Annual, "Year-End Sustainability Drive"),
    (CampaignType::Program, "Community Garden Network"),
    (CampaignType::Special, "Renewable Energy Transition"),
    (CampaignType::Event, "Green Gala Annual Dinner"),
    (CampaignType::Event, "Trail Blazer 5K Run/Walk"),
    (CampaignType::Event, "Hike-a-Thon: Miles for Wildlife"),
    (CampaignType::Event, "Eco Film Festival"),
    (CampaignType::Event, "River Cleanup Day"),
    (CampaignType::Event, "Sustainable Living Expo"),
    (CampaignType::Event, "Polar Plunge for Climate Action"),
    (CampaignType::Event, "Cycling for Conservation"),
    (CampaignType::Event, "Moonlight Paddle Fundraiser"),
    (CampaignType::Event, "Bird-a-Thon Counting Challenge"),
    (CampaignType::Event, "Tree Planting Day"),
    (CampaignType::Event, "Nature Photography Auction"),
];

pub const CAMPAIGN_GOALS: [f64; 5] = [50_000.0, 100_000.0, 250_000.0, 500_000.0, 1_000_000.0];

/// Funds a campaign of this type may draw on.
pub fn fund_affinities(campaign_type: CampaignType) -> &'static [FundId] {
    match campaign_type {
        CampaignType::Annual => &[1, 8],
        CampaignType::Capital => &[2, 8],
        CampaignType::Special => &[3, 4, 7],
        CampaignType::Program => &[5, 6],
        CampaignType::Event => &[1, 3, 4, 5],
    }
}

/// Mapping weights by rank before normalization; the first is primary.
pub const FUND_RANK_WEIGHTS: [f64; 3] = [0.7, 0.2, 0.1];

/// Appeal channels that make sense for a campaign of this type.
pub fn appeal_pool(campaign_type: CampaignType) -> &'static [AppealChannel] {
    use AppealChannel::*;
    match campaign_type {
        CampaignType::Annual => &[
            DirectMail,
            EmailCampaign,
            PhoneAThon,
            GivingTuesday,
            MonthlyGivingProgram,
        ],
        CampaignType::Capital => &[
            MajorDonorCultivation,
            CorporatePartnerships,
            BoardGiving,
            GrantApplication,
        ],
        CampaignType::Special => &[
            SocialMediaChallenge,
            PeerToPeer,
            EmailCampaign,
            VolunteerFundraising,
        ],
        CampaignType::Program => &[
            GrantApplication,
            EmailCampaign,
            DirectMail,
            MonthlyGivingProgram,
        ],
        CampaignType::Event => &[
            Event,
            PeerToPeer,
            SocialMediaChallenge,
            CorporatePartnerships,
        ],
    }
}

pub const DECEMBER_APPEAL_GOALS: [f64; 4] = [10_000.0, 25_000.0, 50_000.0, 100_000.0];
pub const GIVING_TUESDAY_APPEAL_GOALS: [f64; 3] = [5_000.0, 10_000.0, 25_000.0];
pub const REGULAR_APPEAL_GOALS: [f64; 4] = [5_000.0, 10_000.0, 25_000.0, 50_000.0];

/// Seeds the fund table. Runs first so every later stage sees the funds.
pub struct CatalogStage;

impl GenerationStage for CatalogStage {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn run(
        &mut self,
        data: &mut Dataset,
        _rng: &mut StageRng,
    ) -> GenResult<Vec<GenEvent>> {
        data.funds = funds();
        log::info!("stage=catalog: loaded {} funds", data.funds.len());
        Ok(vec![GenEvent::StageCompleted {
            stage: self.name().into(),
            rows: data.funds.len(),
        }])
    }
}
