//! Two independent simulated devices side by side, each on its own port
//! with its own identity and cable wiring.
//!
//! Run with:
//! ```bash
//! RUST_LOG=info cargo run --example two_taps
//! ```

use tap_sim::{cable::CableProfile, port::SimPort, probe::TapProbe};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let minimal = CableProfile::by_name("minimal")?;
    let dlc5 = CableProfile::by_name("dlc5")?;

    let first = SimPort::new(minimal);
    let second = SimPort::with_idcode(dlc5, 0x1093_4041);

    for (name, port) in [("minimal", &first), ("dlc5", &second)] {
        let probe = TapProbe::new(port);
        let id = probe.read_idcode()?;
        println!("{name}: IDCODE {id:#010x}");
    }
    Ok(())
}
