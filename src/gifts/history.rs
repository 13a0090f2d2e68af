use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Timeframe {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    All,
}

impl Timeframe {
    pub const ALL: [Self; 5] = [Self::Hour, Self::Day, Self::Week, Self::Month, Self::All];

    pub fn label(self) -> &'static str {
        match self {
            Self::Hour => "1H",
            Self::Day => "1D",
            Self::Week => "1W",
            Self::Month => "1M",
            Self::All => "ALL",
        }
    }

    /// Number of samples and seconds between them.
    pub fn resolution(self) -> (usize, f64) {
        const MINUTE: f64 = 60.0;
        const HOUR: f64 = 60.0 * MINUTE;
        const DAY: f64 = 24.0 * HOUR;
        match self {
            Self::Hour => (60, MINUTE),
            Self::Day => (24, HOUR),
            Self::Week => (7, DAY),
            Self::Month => (30, DAY),
            Self::All => (100, 30.0 * DAY),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricePoint {
    /// Seconds relative to now, always <= 0.
    pub offset_secs: f64,
    pub price: f64,
}

/// Synthesizes a price history around `current_price`.
///
/// The pricing API has no history endpoint; every point lands within ±10% of
/// the current price and the last point is the current price itself.
pub fn simulated_history(current_price: f64, timeframe: Timeframe) -> Vec<PricePoint> {
    let (count, step) = timeframe.resolution();
    if !current_price.is_finite() || current_price <= 0.0 {
        return Vec::new();
    }

    let mut rng = rand::rng();
    (0..count)
        .map(|index| {
            let steps_back = (count - 1 - index) as f64;
            let price = if steps_back == 0.0 {
                current_price
            } else {
                current_price * rng.random_range(0.9..=1.1)
            };
            PricePoint {
                offset_secs: -steps_back * step,
                price,
            }
        })
        .collect()
}

/// Market sentiment in `0.0..=1.0` derived from a percent change; 0.5 is neutral.
pub fn sentiment(change_percent: f64) -> f32 {
    if !change_percent.is_finite() {
        return 0.5;
    }
    (0.5 + change_percent / 40.0).clamp(0.0, 1.0) as f32
}
