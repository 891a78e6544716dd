use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trading fee percentages keyed by currency code.
///
/// Lookups are case-insensitive and fall back to the default percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    default_percent: Decimal,
    by_currency: HashMap<String, Decimal>,
}

impl FeeSchedule {
    pub fn flat(default_percent: Decimal) -> Self {
        Self {
            default_percent,
            by_currency: HashMap::new(),
        }
    }

    /// Override the fee for one currency
    #[must_use]
    pub fn with_currency(mut self, currency: &str, percent: Decimal) -> Self {
        self.by_currency.insert(currency.to_uppercase(), percent);
        self
    }

    pub fn default_percent(&self) -> Decimal {
        self.default_percent
    }

    /// Fee percentage charged when trading `currency`
    pub fn percent_for(&self, currency: &str) -> Decimal {
        self.by_currency
            .get(&currency.to_uppercase())
            .copied()
            .unwrap_or(self.default_percent)
    }

    /// Fee amount for a notional value traded in `currency`
    pub fn fee_for(&self, currency: &str, notional: Decimal) -> Decimal {
        notional * self.percent_for(currency) / Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_currency_override_beats_default() {
        let fees = FeeSchedule::flat(d("0.2")).with_currency("ltc", d("0.1"));

        assert_eq!(fees.percent_for("LTC"), d("0.1"));
        assert_eq!(fees.percent_for("btc"), d("0.2"));
        assert_eq!(fees.fee_for("BTC", d("1000")), d("2"));
    }
}
