use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::common::types::{Side, TradeSignal};

/// Risk inputs for position sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskParameters {
    /// Fraction of the balance risked per trade (0.01 = 1%)
    pub risk_fraction: Decimal,
    /// Unsigned unit count used when a signal cannot be sized
    pub default_units: i64,
}

impl RiskParameters {
    pub fn new(risk_fraction: Decimal, default_units: i64) -> Self {
        Self {
            risk_fraction,
            default_units,
        }
    }
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self::new(dec!(0.01), 100)
    }
}

/// Signal paired with its unit count, ready for the sink
#[derive(Debug, Clone, PartialEq)]
pub struct SizedSignal {
    pub signal: TradeSignal,
    /// Positive = buy, negative = sell
    pub units: i64,
}

impl SizedSignal {
    /// Zero units is legal but places nothing
    pub fn is_degenerate(&self) -> bool {
        self.units == 0
    }
}

/// SizeCalculator trait
///
/// Turns one signal and the current balance into a signed unit count. The
/// sign carries the order direction to the execution sink.
pub trait SizeCalculator: Send + Sync {
    /// Signed units for `signal` given `balance`
    fn units(&self, balance: Decimal, signal: &TradeSignal) -> i64;

    /// Pair a signal with its computed units
    fn size_signal(&self, balance: Decimal, signal: TradeSignal) -> SizedSignal {
        let units = self.units(balance, &signal);
        SizedSignal { signal, units }
    }
}

/// Fixed-fraction risk sizing
///
/// ```text
/// units = trunc(balance × risk_fraction / |entry_min − sl|)
/// ```
///
/// Buys are positive, sells negative. Signals without an entry or stop, or
/// with a zero stop distance, get `default_units` unsigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSizeCalculator {
    params: RiskParameters,
}

impl RiskSizeCalculator {
    pub fn new(params: RiskParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiskParameters {
        &self.params
    }
}

impl SizeCalculator for RiskSizeCalculator {
    fn units(&self, balance: Decimal, signal: &TradeSignal) -> i64 {
        let (Some(entry), Some(sl)) = (signal.entry_min, signal.sl) else {
            return self.params.default_units;
        };

        let distance = (entry - sl).abs();
        if distance.is_zero() {
            return self.params.default_units;
        }

        let magnitude = balance
            .checked_mul(self.params.risk_fraction)
            .and_then(|risk_amount| risk_amount.checked_div(distance))
            .and_then(|units| units.trunc().to_i64());

        let Some(magnitude) = magnitude else {
            warn!(
                instrument = %signal.instrument,
                %balance,
                %distance,
                "Unit count out of range, using default"
            );
            return self.params.default_units;
        };

        match signal.side {
            Side::Buy => magnitude,
            Side::Sell => -magnitude,
        }
    }
}

/// Boxed size calculator for dynamic dispatch
pub type BoxedSizeCalculator = Box<dyn SizeCalculator>;
