//! Bench test of the simulated TAP, following the classic fpga4fun JTAG
//! exercises: discover the IR length, count the devices on the chain, then
//! read the IDCODE loaded by default after reset.
//!
//! Run with:
//! ```bash
//! RUST_LOG=info cargo run --example benchtest
//! ```

use tap_sim::{port::SimPort, probe::TapProbe};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let port = SimPort::open("minimal")?;
    let probe = TapProbe::new(&port);

    let irlen = probe.ir_length(100)?;
    println!("IR length {irlen}");

    let ndev = probe.count_devices(64)?;
    println!("Found {ndev} devices");

    let id = probe.read_idcode()?;
    println!("IDCODE {id:#010x}");
    Ok(())
}
