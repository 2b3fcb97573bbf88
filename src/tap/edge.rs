/// Rising-edge gate for the TCK line.
///
/// The TAP advances only on a low-to-high clock transition. A sample with
/// TCK low, or unchanged from the previous call, must not clock the machine,
/// so the previous level is kept across calls. This lets a caller present
/// the same clock phase several times (user-space programmers commonly pulse
/// low-high-low per bit) without double-clocking the TAP.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    prev_tck: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Default::default()
    }

    /// Record `tck` and report whether this sample completed a rising edge.
    pub fn rising(&mut self, tck: bool) -> bool {
        let edge = tck && !self.prev_tck;
        self.prev_tck = tck;
        edge
    }
}

#[cfg(test)]
mod test {
    use super::EdgeDetector;

    #[test]
    fn reports_low_to_high_only() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.rising(false));
        assert!(edge.rising(true));
        assert!(!edge.rising(false));
        assert!(edge.rising(true));
    }

    #[test]
    fn held_high_clocks_once() {
        let mut edge = EdgeDetector::new();
        assert!(edge.rising(true));
        for _ in 0..10 {
            assert!(!edge.rising(true));
        }
    }

    #[test]
    fn held_low_never_clocks() {
        let mut edge = EdgeDetector::new();
        for _ in 0..10 {
            assert!(!edge.rising(false));
        }
    }
}
