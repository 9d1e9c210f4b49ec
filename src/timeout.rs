/// Motion quiet-period monitor.
///
/// The radar only reports while it sees something; it never says "nothing
/// there any more". Presence is therefore cleared by the absence of reports
/// for a configured period.

pub struct MotionTimeout {
    timeout_ms: u32,
    /// Uptime of the last motion report not yet followed by a clear
    pending: Option<u64>,
}

impl MotionTimeout {
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            pending: None,
        }
    }

    /// A motion report was accepted at `now_ms`.
    pub fn on_motion_event(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    /// Returns true once when the quiet period expires. Stays false until
    /// the next motion report re-arms it.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.pending {
            Some(last) if now_ms.saturating_sub(last) >= self.timeout_ms as u64 => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
    }

    /// Uptime of the last motion report, until its quiet period expires
    pub fn pending_since(&self) -> Option<u64> {
        self.pending
    }
}
