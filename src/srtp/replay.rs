//! Replay database: index estimation and a sliding acceptance window.

use std::collections::BTreeSet;

use super::error::SrtpError;

/// Tracks the highest packet index seen and which indices inside the
/// trailing window have already been used.
#[derive(Debug, Clone)]
pub struct ReplayWindow {
    window_size: u64,
    highest: Option<u64>,
    seen: BTreeSet<u64>,
}

impl ReplayWindow {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size as u64,
            highest: None,
            seen: BTreeSet::new(),
        }
    }

    /// Rollover counter of the highest index seen so far.
    #[cfg(test)]
    pub fn roc(&self) -> u32 {
        self.highest.map_or(0, |h| (h >> 16) as u32)
    }

    /// Estimate the 48-bit packet index for a 16-bit sequence number
    /// (RFC 3711, Appendix A).
    pub fn estimate_index(&self, seq: u16) -> u64 {
        let Some(highest) = self.highest else {
            return u64::from(seq);
        };
        let roc = highest >> 16;
        let s_l = (highest & 0xFFFF) as u16;

        let v = if s_l < 0x8000 {
            if seq > s_l && seq - s_l > 0x8000 {
                roc.saturating_sub(1)
            } else {
                roc
            }
        } else if s_l - 0x8000 > seq {
            roc + 1
        } else {
            roc
        };

        (v << 16) | u64::from(seq)
    }

    /// Check whether `index` may be accepted without recording it.
    pub fn check(&self, index: u64) -> Result<(), SrtpError> {
        match self.highest {
            None => Ok(()),
            Some(h) if index > h => Ok(()),
            Some(h) if h - index >= self.window_size => Err(SrtpError::ReplayOld),
            Some(_) if self.seen.contains(&index) => Err(SrtpError::ReplayFail),
            Some(_) => Ok(()),
        }
    }

    /// Record `index` as used and slide the window forward if needed.
    pub fn add(&mut self, index: u64) {
        self.seen.insert(index);
        let highest = match self.highest {
            Some(h) if h >= index => h,
            _ => index,
        };
        self.highest = Some(highest);

        if let Some(floor) = (highest + 1).checked_sub(self.window_size) {
            self.seen = self.seen.split_off(&floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_packet_uses_roc_zero() {
        let w = ReplayWindow::new(128);
        assert_eq!(w.estimate_index(0x1234), 0x1234);
        assert_eq!(w.roc(), 0);
        assert!(w.check(0x1234).is_ok());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut w = ReplayWindow::new(128);
        w.add(100);
        assert_eq!(w.check(100), Err(SrtpError::ReplayFail));
        assert!(w.check(99).is_ok());
        assert!(w.check(101).is_ok());
    }

    #[test]
    fn test_too_old_rejected() {
        let mut w = ReplayWindow::new(128);
        w.add(1000);
        assert!(w.check(1000 - 127).is_ok());
        assert_eq!(w.check(1000 - 128), Err(SrtpError::ReplayOld));
    }

    #[test]
    fn test_window_slides() {
        let mut w = ReplayWindow::new(64);
        for i in 0..200 {
            w.add(i);
        }
        assert_eq!(w.seen.len(), 64);
        assert_eq!(w.check(199), Err(SrtpError::ReplayFail));
        assert_eq!(w.check(100), Err(SrtpError::ReplayOld));
    }

    #[test]
    fn test_rollover_estimation() {
        let mut w = ReplayWindow::new(128);
        w.add(0xFFF0);
        // Wrapped forward into the next rollover period
        assert_eq!(w.estimate_index(0x0005), 0x1_0005);

        w.add(0x1_0005);
        assert_eq!(w.roc(), 1);
        // Late packet from the previous period
        assert_eq!(w.estimate_index(0xFFF8), 0xFFF8);
    }
}
