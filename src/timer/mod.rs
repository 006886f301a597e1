//! Timer module for the Pomodoro timer.
//!
//! - `engine`: Timer state machine with mode transitions and events
//! - `driver`: Cancellable one-second tick source

pub mod driver;
pub mod engine;

pub use driver::{Tick, TickDriver, TICK_PERIOD};
pub use engine::{Completion, TimerEngine, TimerEvent};
