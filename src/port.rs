//! Host-facing register shim around one simulated TAP.
//!
//! Mirrors the lifecycle of a parallel-port peripheral as a driver sees it:
//! the host writes the data and control registers, the device answers on the
//! status register. Every register write runs at most one TAP step; the
//! engine's edge gate makes redundant writes harmless. All mutable state of
//! a device sits behind a single mutex so a step is observable only as a
//! whole.

use crate::cable::{CableProfile, ControlByte, StatusByte};
use crate::tap::TapEngine;
use crate::SimError;
use std::sync::Mutex;

struct Shared {
    enabled: bool,
    tap: TapEngine,
    data: u8,
    control: u8,
    status: u8,
}

/// One simulated port with a TAP behind it.
pub struct SimPort {
    cable: &'static CableProfile,
    shared: Mutex<Shared>,
}

impl SimPort {
    pub fn new(cable: &'static CableProfile) -> Self {
        Self::with_idcode(cable, crate::tap::DEVICE_ID)
    }

    /// Port whose device reports a caller-chosen identity.
    pub fn with_idcode(cable: &'static CableProfile, idcode: u32) -> Self {
        // open-collector status lines idle high; TDO starts undriven-low
        let idle = StatusByte::new()
            .with_error(true)
            .with_select(true)
            .with_ack(true)
            .into_bits();
        Self {
            cable,
            shared: Mutex::new(Shared {
                enabled: true,
                tap: TapEngine::with_idcode(idcode),
                data: 0,
                control: ControlByte::new().with_init(true).into_bits(),
                status: cable.fold_tdo(false, idle),
            }),
        }
    }

    /// Look the cable up by name and create the port.
    pub fn open(cable_name: &str) -> Result<Self, SimError> {
        Ok(Self::new(CableProfile::by_name(cable_name)?))
    }

    pub fn cable(&self) -> &'static CableProfile {
        self.cable
    }

    /// Gate register access off. In-flight state is kept, not reset.
    pub fn disable(&self) {
        self.shared.lock().unwrap().enabled = false;
    }

    pub fn enable(&self) {
        self.shared.lock().unwrap().enabled = true;
    }

    /// Latch a data register write and clock the TAP with the new lines.
    pub fn write_data(&self, byte: u8) -> Result<(), SimError> {
        let mut lock = self.shared.lock().unwrap();
        if !lock.enabled {
            return Err(SimError::Disabled);
        }
        lock.data = byte;
        self.step(&mut lock);
        Ok(())
    }

    /// Latch a control register write and clock the TAP with the new lines.
    pub fn write_control(&self, byte: u8) -> Result<(), SimError> {
        let mut lock = self.shared.lock().unwrap();
        if !lock.enabled {
            return Err(SimError::Disabled);
        }
        lock.control = byte;
        self.step(&mut lock);
        Ok(())
    }

    /// Current status register, TDO already folded in.
    pub fn read_status(&self) -> Result<u8, SimError> {
        let lock = self.shared.lock().unwrap();
        if !lock.enabled {
            return Err(SimError::Disabled);
        }
        Ok(lock.status)
    }

    fn step(&self, shared: &mut Shared) {
        let pins = self.cable.decode(shared.data, shared.control);
        let tdo = shared.tap.step(pins.tms, pins.tck, pins.tdi);
        shared.status = self.cable.fold_tdo(tdo, shared.status);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tap::DEVICE_ID;

    fn pulse(port: &SimPort, tms: bool, tdi: bool) -> u8 {
        let cable = port.cable();
        let (data, control) = cable.encode(tms, false, tdi);
        port.write_control(control).unwrap();
        port.write_data(data).unwrap();
        let (data, _) = cable.encode(tms, true, tdi);
        port.write_data(data).unwrap();
        port.read_status().unwrap()
    }

    #[test]
    fn disabled_port_rejects_register_access() {
        let port = SimPort::open("minimal").unwrap();
        port.disable();
        assert!(matches!(port.write_data(0), Err(SimError::Disabled)));
        assert!(matches!(port.write_control(0), Err(SimError::Disabled)));
        assert!(matches!(port.read_status(), Err(SimError::Disabled)));

        // re-enabled, the device still behaves from its initial state
        port.enable();
        for _ in 0..5 {
            pulse(&port, true, false);
        }
        pulse(&port, false, false);
        assert!(port.read_status().is_ok());
    }

    #[test]
    fn idcode_bit_appears_on_busy_inverted() {
        let port = SimPort::open("minimal").unwrap();
        let cable = port.cable();
        for _ in 0..5 {
            pulse(&port, true, false);
        }
        pulse(&port, false, false); // Idle, identity preloaded
        pulse(&port, true, false); // DrScan
        pulse(&port, false, false); // DrCapture
        pulse(&port, false, false); // DrShift

        // TDO idles low: BUSY bit reads as 1 on the wire
        let status = port.read_status().unwrap();
        assert_eq!(status & 0x80, 0x80);
        assert!(!cable.sense_tdo(status));

        // first IDCODE bit (LSB of 0x89BEEF01) is 1, BUSY drops
        let status = pulse(&port, false, true);
        assert_eq!(status & 0x80, 0);
        assert!(cable.sense_tdo(status));
    }

    #[test]
    fn per_port_identity() {
        let cable = CableProfile::by_name("minimal").unwrap();
        let port = SimPort::with_idcode(cable, DEVICE_ID ^ 0xffff);
        for _ in 0..5 {
            pulse(&port, true, false);
        }
        pulse(&port, false, false); // Idle
        pulse(&port, true, false); // DrScan
        pulse(&port, false, false); // DrCapture
        pulse(&port, false, false); // DrShift

        // bit 0 of the flipped identity is 0, unlike the default device
        let status = pulse(&port, false, true);
        assert!(!port.cable().sense_tdo(status));
    }
}
