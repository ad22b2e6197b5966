//! Shared primitive types used across the entire generator.

/// Sequential identifiers, starting at 1 within each table.
pub type ConstituentId = u32;
pub type HouseholdId = u32;
pub type FundId = u32;
pub type CampaignId = u32;
pub type AppealId = u32;
pub type TransactionId = u32;
pub type PledgeId = u32;
pub type PaymentId = u32;

/// The canonical run identifier.
pub type RunId = String;

/// Fund every gift falls back to when its campaign has no fund mapping.
pub const GENERAL_FUND_ID: FundId = 1;

/// Round a currency amount to cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_currency(12.345_6), 12.35);
        assert_eq!(round_currency(0.004), 0.0);
        assert_eq!(round_currency(99.999), 100.0);
    }
}
