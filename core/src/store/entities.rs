use super::DatasetStore;
use crate::{
    error::GenResult,
    model::{
        Appeal, Campaign, CampaignFund, Constituent, ConstituentKind, DonorSegment, Fund,
        HouseholdMember,
    },
};
use rusqlite::params;

impl DatasetStore {
    // ── Funds ─────────────────────────────────────────────────────

    pub fn insert_fund(&self, run_id: &str, f: &Fund) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO fund (run_id, fund_id, name, description) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, f.fund_id, &f.name, &f.description],
        )?;
        Ok(())
    }

    // ── Constituents ──────────────────────────────────────────────

    pub fn insert_constituent(&self, run_id: &str, c: &Constituent) -> GenResult<()> {
        let (first_name, last_name, gender, organization_name, organization_type) = match &c.kind {
            ConstituentKind::Individual(p) => (
                Some(p.first_name.as_str()),
                Some(p.last_name.as_str()),
                Some(p.gender.code()),
                None,
                None,
            ),
            ConstituentKind::Organization(o) => (
                None,
                None,
                None,
                Some(o.organization_name.as_str()),
                Some(o.organization_type.label()),
            ),
        };
        self.conn.execute(
            "INSERT INTO constituent (
                run_id, constituent_id, type, first_name, last_name, gender,
                organization_name, organization_type, email, phone, address, city,
                state, postal_code, creation_date, lifetime_giving, first_gift_date,
                last_gift_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                run_id,
                c.constituent_id,
                c.donor_type().label(),
                first_name,
                last_name,
                gender,
                organization_name,
                organization_type,
                &c.email,
                &c.phone,
                &c.address,
                &c.city,
                &c.state,
                &c.postal_code,
                c.creation_date.to_string(),
                c.giving.lifetime_giving,
                c.giving.first_gift_date.map(|d| d.to_string()),
                c.giving.last_gift_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn insert_segment(&self, run_id: &str, s: &DonorSegment) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO donor_segment (
                run_id, constituent_id, frequency, level, giving_trend, cause_affinity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                s.constituent_id,
                s.frequency.label(),
                s.level.label(),
                s.giving_trend.label(),
                serde_json::to_string(&s.cause_affinity)?,
            ],
        )?;
        Ok(())
    }

    pub fn insert_household_member(&self, run_id: &str, h: &HouseholdMember) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO household_member (
                run_id, household_id, name, constituent_id, primary_constituent_id,
                is_primary, address, city, state, postal_code, creation_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                run_id,
                h.household_id,
                &h.name,
                h.constituent_id,
                h.primary_constituent_id,
                h.is_primary,
                &h.address,
                &h.city,
                &h.state,
                &h.postal_code,
                h.creation_date.to_string(),
            ],
        )?;
        Ok(())
    }

    // ── Campaigns ─────────────────────────────────────────────────

    pub fn insert_campaign(&self, run_id: &str, c: &Campaign) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO campaign (
                run_id, campaign_id, name, type, start_date, end_date, goal_amount, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                c.campaign_id,
                &c.name,
                c.campaign_type.label(),
                c.start_date.to_string(),
                c.end_date.to_string(),
                c.goal_amount,
                &c.description,
            ],
        )?;
        Ok(())
    }

    pub fn insert_campaign_fund(&self, run_id: &str, m: &CampaignFund) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO campaign_fund (run_id, campaign_id, fund_id, weight, is_primary)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, m.campaign_id, m.fund_id, m.weight, m.is_primary],
        )?;
        Ok(())
    }

    pub fn insert_appeal(&self, run_id: &str, a: &Appeal) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO appeal (
                run_id, appeal_id, campaign_id, name, type, seasonal, start_date,
                end_date, goal_amount, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                a.appeal_id,
                a.campaign_id,
                &a.name,
                a.channel.label(),
                a.seasonal.label(),
                a.start_date.to_string(),
                a.end_date.to_string(),
                a.goal_amount,
                &a.description,
            ],
        )?;
        Ok(())
    }
}
