//! Host-side stimulus harness.
//!
//! Drives standard JTAG idioms against a simulated port the way a user-space
//! programmer would: one full TCK pulse per bit through the port registers,
//! TMS sequences for navigation, bulk shifts for discovery. This is a client
//! of the TAP core, not part of it; discovery failures are reported here
//! with the partial probe count.

use crate::cable::CableProfile;
use crate::port::SimPort;
use crate::SimError;

/// Probe budget used for the instruction-register flush, well past any
/// plausible IR width.
const MAX_IR_PROBE: usize = 100;

pub struct TapProbe<'a> {
    port: &'a SimPort,
    cable: &'static CableProfile,
}

impl<'a> TapProbe<'a> {
    pub fn new(port: &'a SimPort) -> Self {
        Self { port, cable: port.cable() }
    }

    /// Clock `n` full TCK pulses with the given TMS/TDI levels and return
    /// the TDO sampled after the last rising edge.
    ///
    /// Each pulse presents low, high, low. The trailing low phase is
    /// redundant with the next pulse's leading one; the device's edge gate
    /// tolerates that, and real programmers do the same.
    pub fn clock(&self, tms: bool, tdi: bool, n: usize) -> Result<bool, SimError> {
        let mut tdo = false;
        for _ in 0..n {
            let (data, control) = self.cable.encode(tms, false, tdi);
            self.port.write_control(control)?;
            self.port.write_data(data)?;
            let (data, _) = self.cable.encode(tms, true, tdi);
            self.port.write_data(data)?;
            tdo = self.cable.sense_tdo(self.port.read_status()?);
            let (data, _) = self.cable.encode(tms, false, tdi);
            self.port.write_data(data)?;
        }
        Ok(tdo)
    }

    /// Force the TAP into `Reset`: five cycles with TMS high.
    pub fn reset(&self) -> Result<(), SimError> {
        self.clock(true, false, 5)?;
        Ok(())
    }

    /// Discover the instruction register length.
    ///
    /// Flush the IR with ones, then shift zeros until a zero re-emerges on
    /// TDO; the number of probes it took is the register length. Leaves the
    /// TAP in `IrShift`.
    pub fn ir_length(&self, max: usize) -> Result<usize, SimError> {
        self.reset()?;
        self.clock(false, false, 1)?; // Idle
        self.clock(true, false, 2)?; // DrScan, IrScan
        self.clock(false, false, 2)?; // IrCapture, IrShift

        self.clock(false, true, max)?;
        for n in 0..max {
            if !self.clock(false, false, 1)? {
                if n == 0 {
                    // TDO low before anything wrapped: nothing is shifting
                    return Err(SimError::Discovery { probed: 0 });
                }
                log::info!("IR length {n}");
                return Ok(n);
            }
        }
        Err(SimError::Discovery { probed: max })
    }

    /// Count devices on the chain by flushing ones through BYPASS.
    ///
    /// Every bypassed device delays the stream by one cycle, so the number
    /// of ones swallowed before the first re-emerges is the device count.
    pub fn count_devices(&self, max: usize) -> Result<usize, SimError> {
        let irlen = self.ir_length(MAX_IR_PROBE)?;

        // fill the IR with the all-ones BYPASS opcode and commit it
        self.clock(false, true, irlen - 1)?;
        self.clock(true, true, 1)?; // last bit, into IrExit1
        self.clock(true, false, 2)?; // IrUpdate, DrScan
        self.clock(false, false, 2)?; // DrCapture, DrShift

        self.clock(false, false, 32)?;
        for n in 0..max {
            if self.clock(false, true, 1)? {
                log::info!("Found {n} devices");
                return Ok(n);
            }
        }
        Err(SimError::Discovery { probed: max })
    }

    /// Read the 32-bit identity the device loads by default on leaving
    /// reset, LSB first.
    pub fn read_idcode(&self) -> Result<u32, SimError> {
        self.reset()?;
        self.clock(false, false, 1)?; // Idle, IDCODE preloaded
        self.clock(true, false, 1)?; // DrScan
        self.clock(false, false, 2)?; // DrCapture, DrShift

        let mut id = 0u32;
        for i in 0..32 {
            if self.clock(false, true, 1)? {
                id |= 1 << i;
            }
        }
        log::info!("IDCODE {id:#010x}");
        Ok(id)
    }
}
