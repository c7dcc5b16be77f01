use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
}

impl Signal {
    /// `[Buy]` above the average, `[Sell]` below, nothing on an exact tie.
    /// No tolerance is applied: equal means bit-for-bit equal as `f64`.
    pub fn from_price_vs_avg(price: f64, avg: f64) -> Vec<Signal> {
        if price > avg {
            vec![Signal::Buy]
        } else if price < avg {
            vec![Signal::Sell]
        } else {
            Vec::new()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
