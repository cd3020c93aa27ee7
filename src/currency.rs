use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of currencies that appear in the expense sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Uyu,
    Eur,
}

impl Currency {
    /// Detection priority order: on equal positions in free text, USD wins
    /// over UYU, which wins over EUR.
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Uyu, Currency::Eur];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Uyu => "UYU",
            Currency::Eur => "EUR",
        }
    }
}

impl Default for Currency {
    /// The baseline currency for hand-entered expenses with no recognizable
    /// label.
    fn default() -> Self {
        Currency::Uyu
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Determines the currency of an expense row.
///
/// The explicit currency label wins when it exactly matches a known code
/// (after trimming). Otherwise the free-text amount field is scanned for the
/// leftmost embedded code ("Pago 150 EUR" detects EUR). A miss is not an
/// error; the default currency is returned.
pub fn detect_currency(label: Option<&str>, amount_text: Option<&str>) -> Currency {
    if let Some(label) = label {
        let trimmed = label.trim();
        for currency in Currency::ALL {
            if trimmed == currency.code() {
                return currency;
            }
        }
    }

    if let Some(text) = amount_text {
        let mut best: Option<(usize, Currency)> = None;
        for currency in Currency::ALL {
            if let Some(pos) = text.find(currency.code()) {
                if best.map_or(true, |(best_pos, _)| pos < best_pos) {
                    best = Some((pos, currency));
                }
            }
        }
        if let Some((_, currency)) = best {
            return currency;
        }
    }

    Currency::default()
}
