//! Parallel-port cable profiles.
//!
//! A cable wires the four JTAG lines to particular bits of the parallel
//! port's data, control and status registers, sometimes through an inverting
//! buffer (the port's BUSY line is the classic case). Nothing here is
//! protocol logic: a profile is a static lookup table, consumed on the
//! device side by [`crate::port::SimPort`] and on the host side by
//! [`crate::probe::TapProbe`].

use crate::{PinSample, SimError};

/// Control register layout of a PC parallel port, connector bit order.
#[bitfield_struct::bitfield(u8, order = Lsb)]
pub struct ControlByte {
    pub strobe: bool,
    pub auto_feed: bool,
    pub init: bool,
    pub select_in: bool,
    pub irq_enable: bool,
    #[bits(3)]
    _reserved: u8,
}

/// Status register layout of a PC parallel port, connector bit order.
#[bitfield_struct::bitfield(u8, order = Lsb)]
pub struct StatusByte {
    #[bits(3)]
    _reserved: u8,
    pub error: bool,
    pub select: bool,
    pub paper_out: bool,
    pub ack: bool,
    pub busy: bool,
}

/// Parallel-port register a JTAG line is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortReg {
    Data,
    Control,
    Status,
}

/// Wiring of one JTAG line: which register, which bit, and whether the
/// cable or the port hardware inverts it on the way.
#[derive(Debug, Clone, Copy)]
pub struct LineMap {
    pub reg: PortReg,
    pub bit: u8,
    pub invert: bool,
}

impl LineMap {
    const fn data(bit: u8) -> Self {
        Self { reg: PortReg::Data, bit, invert: false }
    }

    const fn status(bit: u8, invert: bool) -> Self {
        Self { reg: PortReg::Status, bit, invert }
    }

    /// Logic level of this line given the latched input registers.
    fn level(&self, data: u8, control: u8) -> bool {
        let byte = match self.reg {
            PortReg::Data => data,
            PortReg::Control => control,
            // output line, never sampled from the inputs
            PortReg::Status => 0,
        };
        ((byte >> self.bit) & 1 == 1) != self.invert
    }

    /// Fold a logic level into `byte` at this line's position.
    fn apply(&self, level: bool, byte: u8) -> u8 {
        if level != self.invert {
            byte | 1 << self.bit
        } else {
            byte & !(1 << self.bit)
        }
    }
}

/// Bit assignment of one cable model.
///
/// `tms`, `tck` and `tdi` live in the data or control register; `tdo` always
/// reports through the status register.
#[derive(Debug, Clone, Copy)]
pub struct CableProfile {
    pub name: &'static str,
    pub tms: LineMap,
    pub tck: LineMap,
    pub tdi: LineMap,
    pub tdo: LineMap,
}

/// Known cable wirings.
pub static PROFILES: &[CableProfile] = &[
    // UrJTAG "minimal" parallel-port programmer.
    CableProfile {
        name: "minimal",
        tdi: LineMap::data(0),
        tck: LineMap::data(1),
        tms: LineMap::data(2),
        tdo: LineMap::status(7, true), // BUSY, inverted by the port
    },
    // Macraigor Wiggler.
    CableProfile {
        name: "wiggler",
        tms: LineMap::data(1),
        tck: LineMap::data(2),
        tdi: LineMap::data(3),
        tdo: LineMap::status(7, true),
    },
    // Xilinx Parallel Cable III.
    CableProfile {
        name: "dlc5",
        tdi: LineMap::data(0),
        tck: LineMap::data(1),
        tms: LineMap::data(2),
        tdo: LineMap::status(4, false), // SELECT, not inverted
    },
];

impl CableProfile {
    pub fn by_name(name: &str) -> Result<&'static CableProfile, SimError> {
        PROFILES
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SimError::UnknownCable(name.to_string()))
    }

    /// Device side: recover the input lines from the latched registers.
    pub fn decode(&self, data: u8, control: u8) -> PinSample {
        PinSample {
            tms: self.tms.level(data, control),
            tck: self.tck.level(data, control),
            tdi: self.tdi.level(data, control),
            tdo: false,
        }
    }

    /// Device side: place TDO into the status byte the host will read.
    pub fn fold_tdo(&self, tdo: bool, status: u8) -> u8 {
        self.tdo.apply(tdo, status)
    }

    /// Host side: build the register bytes that drive the given levels.
    pub fn encode(&self, tms: bool, tck: bool, tdi: bool) -> (u8, u8) {
        let mut data = 0;
        let mut control = ControlByte::new().with_init(true).into_bits();
        for (map, level) in [(self.tms, tms), (self.tck, tck), (self.tdi, tdi)] {
            match map.reg {
                PortReg::Data => data = map.apply(level, data),
                PortReg::Control => control = map.apply(level, control),
                PortReg::Status => {}
            }
        }
        (data, control)
    }

    /// Host side: read TDO back out of a status byte.
    pub fn sense_tdo(&self, status: u8) -> bool {
        ((status >> self.tdo.bit) & 1 == 1) != self.tdo.invert
    }
}
