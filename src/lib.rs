//! Simulated IEEE 1149.1 JTAG Test Access Port behind a parallel-port
//! programmer.
//!
//! This crate stands in for the debug interface of a real chip, so that
//! software written to drive a parallel-port JTAG cable can be exercised
//! without any hardware attached. The host writes the port's data and
//! control registers, the simulated device clocks its TAP state machine on
//! every rising TCK edge and answers on the status register.
//!
//! **Note:**
//! This is strictly a development tool. A single TAP is simulated; there is
//! no multi-drop chain and no IEEE 1284 negotiation.
//!
//! # Quickstart
//!
//! ```
//! use tap_sim::{port::SimPort, probe::TapProbe};
//!
//! let port = SimPort::open("minimal").unwrap();
//! let probe = TapProbe::new(&port);
//! assert_eq!(probe.read_idcode().unwrap(), 0x89BE_EF01);
//! ```
//!
//! # Limitations
//!
//! * Limited cable support: `minimal`, `wiggler`, `dlc5`.
//! * TDO keeps its last-driven level outside the shift states, matching the
//!   device this simulation was written against rather than a high-impedance
//!   pin.

#![forbid(unsafe_code)]

pub mod cable;
pub mod port;
pub mod probe;
pub mod tap;

/// One sample of the four JTAG signal lines.
///
/// `tms`, `tck` and `tdi` are driven by the host, `tdo` by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinSample {
    pub tms: bool,
    pub tck: bool,
    pub tdi: bool,
    pub tdo: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Port is disabled")]
    /// Register access was rejected by the device gate; nothing was stepped.
    Disabled,

    #[error("Unknown cable profile: {0}")]
    UnknownCable(String),

    #[error("Discovery gave up after {probed} probes")]
    /// A host-side discovery loop exhausted its probe budget. Reported by
    /// the harness, never by the protocol engine itself.
    Discovery { probed: usize },
}
