//! Position sizing
//!
//! Sizing is a pure function of the signal and the account balance read
//! from the execution sink just before the order goes out:
//!
//! ```text
//! balance ──┐
//!           ├─► SizeCalculator::units ─► signed units ─► ExecutionSink
//! signal  ──┘
//! ```

mod size_calculator;

pub use size_calculator::{
    BoxedSizeCalculator, RiskParameters, RiskSizeCalculator, SizeCalculator, SizedSignal,
};
