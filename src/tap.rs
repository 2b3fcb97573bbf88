//! The TAP protocol core: clock-edge gate and state machine.

mod edge;
mod engine;

pub use edge::EdgeDetector;
pub use engine::{DEVICE_ID, DataRegister, IR_LEN, TapEngine, TapState};
