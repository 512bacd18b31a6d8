//! Wallet balance state and display formatting.
//!
//! The backend reports the remaining prepaid balance after every request,
//! along with the amount the request cost. Only the latest values are kept;
//! each update replaces the whole state.

/// Latest server-reported wallet figures.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceState {
    pub amount: f64,
    pub currency: String,
    /// Amount deducted by the most recently completed request.
    pub last_cost: f64,
}

impl BalanceState {
    /// `Wallet Balance: 1250 sats`
    pub fn headline(&self) -> String {
        format!(
            "Wallet Balance: {} {}",
            format_amount(self.amount, &self.currency),
            self.currency
        )
    }

    /// `(-21 sats)` suffix, only when the last request actually cost something.
    pub fn cost_suffix(&self) -> Option<String> {
        if self.last_cost > 0.0 {
            Some(format!(
                "(-{} {})",
                format_amount(self.last_cost, &self.currency),
                self.currency
            ))
        } else {
            None
        }
    }
}

/// What the header shows for the wallet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BalanceDisplay {
    /// Initial fetch still in flight.
    #[default]
    Pending,
    /// Initial fetch failed. Chat still works.
    Unavailable,
    Known(BalanceState),
}

impl BalanceDisplay {
    pub fn headline(&self) -> String {
        match self {
            BalanceDisplay::Pending => "Wallet Balance: ...".to_string(),
            BalanceDisplay::Unavailable => "Wallet Balance: Error fetching balance".to_string(),
            BalanceDisplay::Known(state) => state.headline(),
        }
    }

    pub fn cost_suffix(&self) -> Option<String> {
        match self {
            BalanceDisplay::Known(state) => state.cost_suffix(),
            _ => None,
        }
    }
}

/// Sat-denominated wallets deal in whole units; everything else gets two
/// decimals.
fn integer_denominated(currency: &str) -> bool {
    matches!(
        currency.to_ascii_lowercase().as_str(),
        "sat" | "sats" | "msat" | "msats"
    )
}

fn format_amount(value: f64, currency: &str) -> String {
    if integer_denominated(currency) {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sats(amount: f64, last_cost: f64) -> BalanceState {
        BalanceState {
            amount,
            currency: "sats".to_string(),
            last_cost,
        }
    }

    #[test]
    fn test_headline_sats_is_integer() {
        assert_eq!(sats(1250.0, 0.0).headline(), "Wallet Balance: 1250 sats");
    }

    #[test]
    fn test_headline_named_currency_two_decimals() {
        let state = BalanceState {
            amount: 12.5,
            currency: "USD".to_string(),
            last_cost: 0.0,
        };
        assert_eq!(state.headline(), "Wallet Balance: 12.50 USD");
    }

    #[test]
    fn test_no_cost_suffix_for_zero_delta() {
        assert_eq!(sats(100.0, 0.0).cost_suffix(), None);
    }

    #[test]
    fn test_cost_suffix_for_positive_delta() {
        assert_eq!(sats(100.0, 21.0).cost_suffix(), Some("(-21 sats)".to_string()));
    }

    #[test]
    fn test_display_fallback_strings() {
        assert_eq!(BalanceDisplay::Pending.headline(), "Wallet Balance: ...");
        assert_eq!(
            BalanceDisplay::Unavailable.headline(),
            "Wallet Balance: Error fetching balance"
        );
        assert_eq!(BalanceDisplay::Unavailable.cost_suffix(), None);
    }
}
