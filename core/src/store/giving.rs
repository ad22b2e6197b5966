use super::DatasetStore;
use crate::{
    dataset::Dataset,
    error::GenResult,
    model::{DonorMetrics, Pledge, PledgePayment, Transaction},
};
use rusqlite::params;

impl DatasetStore {
    // ── Gifts ─────────────────────────────────────────────────────

    pub fn insert_transaction(&self, run_id: &str, t: &Transaction) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO gift_transaction (
                run_id, transaction_id, constituent_id, appeal_id, campaign_id, fund_id,
                date, amount, payment_method, type, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                run_id,
                t.transaction_id,
                t.constituent_id,
                t.appeal_id,
                t.campaign_id,
                t.fund_id,
                t.date.to_string(),
                t.amount,
                t.payment_method.label(),
                t.transaction_type.label(),
                t.status.label(),
            ],
        )?;
        Ok(())
    }

    // ── Pledges ───────────────────────────────────────────────────

    pub fn insert_pledge(&self, run_id: &str, p: &Pledge) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO pledge (
                run_id, pledge_id, constituent_id, campaign_id, total_amount,
                installment_amount, start_date, frequency, installments, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                p.pledge_id,
                p.constituent_id,
                p.campaign_id,
                p.total_amount,
                p.installment_amount,
                p.start_date.to_string(),
                p.frequency.label(),
                p.installments,
                p.status.label(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_pledge_payment(&self, run_id: &str, p: &PledgePayment) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO pledge_payment (run_id, payment_id, pledge_id, amount, date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                p.payment_id,
                p.pledge_id,
                p.amount,
                p.date.to_string(),
                p.status.label(),
            ],
        )?;
        Ok(())
    }

    // ── Metrics ───────────────────────────────────────────────────

    pub fn insert_donor_metrics(&self, run_id: &str, m: &DonorMetrics) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO donor_metrics (
                run_id, constituent_id, first_gift_date, last_gift_date, lifetime_gifts,
                lifetime_giving, average_gift, largest_gift, donor_level, retention_status,
                has_open_pledge, household_id, yearly_giving
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run_id,
                m.constituent_id,
                m.first_gift_date.to_string(),
                m.last_gift_date.to_string(),
                m.lifetime_gifts,
                m.lifetime_giving,
                m.average_gift,
                m.largest_gift,
                m.donor_level.label(),
                m.retention_status.label(),
                m.has_open_pledge,
                m.household_id,
                serde_json::to_string(&m.yearly_giving)?,
            ],
        )?;
        Ok(())
    }

    // ── Whole run ─────────────────────────────────────────────────

    /// Write every table of `data` for `run_id` in one transaction.
    pub fn save_dataset(&self, run_id: &str, data: &Dataset) -> GenResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for f in &data.funds {
            self.insert_fund(run_id, f)?;
        }
        for c in &data.constituents {
            self.insert_constituent(run_id, c)?;
        }
        for s in data.segments.values() {
            self.insert_segment(run_id, s)?;
        }
        for h in &data.households {
            self.insert_household_member(run_id, h)?;
        }
        for c in &data.campaigns {
            self.insert_campaign(run_id, c)?;
        }
        for m in &data.campaign_funds {
            self.insert_campaign_fund(run_id, m)?;
        }
        for a in &data.appeals {
            self.insert_appeal(run_id, a)?;
        }
        for t in &data.transactions {
            self.insert_transaction(run_id, t)?;
        }
        for p in &data.pledges {
            self.insert_pledge(run_id, p)?;
        }
        for p in &data.pledge_payments {
            self.insert_pledge_payment(run_id, p)?;
        }
        for m in &data.donor_metrics {
            self.insert_donor_metrics(run_id, m)?;
        }
        tx.commit()?;
        log::debug!("store: run {run_id} written");
        Ok(())
    }
}
