/// Configuration command sequencer.
///
/// The radar silently drops a command that arrives before it has finished
/// with the previous one. Every command it accepts is answered with a
/// `received message: ...` line, so the sequencer releases one command at a
/// time and waits for that acknowledgment before releasing the next.
use heapless::{String, Vec};

use crate::defaults::{GET_ALL_QUERY, VERSION_QUERY};

/// Longest rendered command, including the trailing `\r\n`
pub const MAX_COMMAND_LEN: usize = 20;

/// Number of configuration commands the radar takes
pub const MAX_COMMANDS: usize = 11;

/// One rendered command line
pub type Command = String<MAX_COMMAND_LEN>;

/// The ordered configuration command list
pub type CommandList = Vec<Command, MAX_COMMANDS>;

/// Which one-shot diagnostic queries to send once configuration is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    /// Send `VER` (firmware version)
    pub version: bool,
    /// Send `get_all` (full parameter dump)
    pub get_all: bool,
    /// Neither query is sent before this much uptime has passed
    pub delay_ms: u32,
}

/// What the last `poll` handed out, so a failed transmission can be undone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Released {
    Command,
    Version,
    GetAll,
}

pub struct ConfigSequencer {
    commands: CommandList,
    cursor: usize,
    ready: bool,
    configured: bool,
    diagnostics: Diagnostics,
    pending_version: bool,
    pending_get_all: bool,
    /// Uptime at which the last command went out, while unacknowledged
    sent_at: Option<u64>,
    released: Option<Released>,
}

impl ConfigSequencer {
    pub fn new(commands: CommandList, diagnostics: Diagnostics) -> Self {
        Self {
            commands,
            cursor: 0,
            ready: true,
            configured: false,
            diagnostics,
            pending_version: diagnostics.version,
            pending_get_all: diagnostics.get_all,
            sent_at: None,
            released: None,
        }
    }

    /// The radar acknowledged the last command.
    pub fn on_ack(&mut self) {
        self.ready = true;
        self.sent_at = None;
        self.released = None;
    }

    /// Release the next command, if the radar is ready for one.
    ///
    /// `now_ms` is the uptime; it stamps the transmission and gates the
    /// diagnostic queries.
    pub fn poll(&mut self, now_ms: u64) -> Option<&str> {
        if !self.ready {
            return None;
        }

        if self.cursor < self.commands.len() {
            let index = self.cursor;
            self.cursor += 1;
            self.mark_sent(now_ms, Released::Command);
            log::info!(
                "Sending config {}/{}: {}",
                index + 1,
                self.commands.len(),
                self.commands[index].trim_end()
            );
            return Some(self.commands[index].as_str());
        }

        if !self.configured {
            self.configured = true;
            log::info!("Radar configured ({} commands)", self.commands.len());
        }

        let booted = now_ms > self.diagnostics.delay_ms as u64;
        if self.pending_version && booted {
            self.pending_version = false;
            self.mark_sent(now_ms, Released::Version);
            log::info!("Requesting radar firmware version");
            Some(VERSION_QUERY)
        } else if self.pending_get_all && booted {
            self.pending_get_all = false;
            self.mark_sent(now_ms, Released::GetAll);
            log::info!("Requesting radar parameter dump");
            Some(GET_ALL_QUERY)
        } else {
            None
        }
    }

    fn mark_sent(&mut self, now_ms: u64, released: Released) {
        self.ready = false;
        self.sent_at = Some(now_ms);
        self.released = Some(released);
    }

    /// The command returned by the last `poll` never reached the radar.
    ///
    /// Puts it back at the head of the queue; the next `poll` releases it
    /// again. No-op once the command has been acknowledged.
    pub fn rollback(&mut self) {
        match self.released.take() {
            Some(Released::Command) => self.cursor -= 1,
            Some(Released::Version) => self.pending_version = true,
            Some(Released::GetAll) => self.pending_get_all = true,
            None => return,
        }
        self.ready = true;
        self.sent_at = None;
    }

    /// Start the whole sequence again (e.g. after the radar lost power).
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.ready = true;
        self.configured = false;
        self.pending_version = self.diagnostics.version;
        self.pending_get_all = self.diagnostics.get_all;
        self.sent_at = None;
        self.released = None;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Every configuration command was sent and the last one acknowledged.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// How long the last transmission has gone unacknowledged.
    pub fn awaiting_ack_for(&self, now_ms: u64) -> Option<u64> {
        self.sent_at.map(|t| now_ms.saturating_sub(t))
    }

    /// Configuration commands sent so far
    pub fn sent(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> CommandList {
        items
            .iter()
            .map(|s| Command::try_from(*s).unwrap())
            .collect()
    }

    fn abc() -> ConfigSequencer {
        ConfigSequencer::new(list(&["A\r\n", "B\r\n", "C\r\n"]), Diagnostics::default())
    }

    // ── Pacing ──────────────────────────────────────────────────────

    #[test]
    fn first_command_goes_out_immediately() {
        let mut seq = abc();
        assert!(seq.is_ready());
        assert_eq!(seq.poll(0), Some("A\r\n"));
        assert!(!seq.is_ready());
    }

    #[test]
    fn waits_for_ack_between_commands() {
        let mut seq = abc();
        assert_eq!(seq.poll(0), Some("A\r\n"));
        assert_eq!(seq.poll(10), None);
        assert_eq!(seq.poll(20), None);
        seq.on_ack();
        assert_eq!(seq.poll(30), Some("B\r\n"));
        assert_eq!(seq.poll(40), None);
    }

    #[test]
    fn delivers_in_order() {
        let mut seq = abc();
        let mut sent: heapless::Vec<Command, 4> = heapless::Vec::new();
        for t in 0..10 {
            if let Some(cmd) = seq.poll(t) {
                sent.push(Command::try_from(cmd).unwrap()).unwrap();
            }
            seq.on_ack();
        }
        assert_eq!(sent.as_slice(), list(&["A\r\n", "B\r\n", "C\r\n"]).as_slice());
    }

    #[test]
    fn configured_after_last_ack() {
        let mut seq = abc();
        for _ in 0..3 {
            assert!(seq.poll(0).is_some());
            assert!(!seq.is_configured());
            seq.on_ack();
        }
        assert_eq!(seq.sent(), 3);
        assert!(!seq.is_configured());
        assert_eq!(seq.poll(0), None);
        assert!(seq.is_configured());
    }

    #[test]
    fn lost_ack_stalls() {
        let mut seq = abc();
        assert!(seq.poll(100).is_some());
        for t in 0..1000 {
            assert_eq!(seq.poll(100 + t), None);
        }
        assert_eq!(seq.sent(), 1);
        assert_eq!(seq.awaiting_ack_for(1100), Some(1000));
    }

    #[test]
    fn ack_clears_wait() {
        let mut seq = abc();
        assert_eq!(seq.awaiting_ack_for(0), None);
        seq.poll(5);
        seq.on_ack();
        assert_eq!(seq.awaiting_ack_for(500), None);
    }

    #[test]
    fn empty_list_is_configured_on_first_poll() {
        let mut seq = ConfigSequencer::new(CommandList::new(), Diagnostics::default());
        assert_eq!(seq.poll(0), None);
        assert!(seq.is_configured());
        assert_eq!(seq.total(), 0);
    }

    // ── Diagnostic queries ──────────────────────────────────────────

    fn with_diagnostics() -> ConfigSequencer {
        ConfigSequencer::new(
            list(&["A\r\n"]),
            Diagnostics {
                version: true,
                get_all: true,
                delay_ms: 15_000,
            },
        )
    }

    #[test]
    fn diagnostics_wait_for_boot() {
        let mut seq = with_diagnostics();
        assert_eq!(seq.poll(0), Some("A\r\n"));
        seq.on_ack();
        assert_eq!(seq.poll(1_000), None);
        assert_eq!(seq.poll(15_000), None);
        assert_eq!(seq.poll(15_001), Some("VER\r\n"));
    }

    #[test]
    fn diagnostics_follow_config_and_need_acks() {
        let mut seq = with_diagnostics();
        assert_eq!(seq.poll(20_000), Some("A\r\n"));
        assert_eq!(seq.poll(20_000), None);
        seq.on_ack();
        assert_eq!(seq.poll(20_000), Some("VER\r\n"));
        assert_eq!(seq.poll(20_000), None);
        seq.on_ack();
        assert_eq!(seq.poll(20_000), Some("get_all\r\n"));
        seq.on_ack();
        assert_eq!(seq.poll(20_000), None);
        seq.on_ack();
        assert_eq!(seq.poll(90_000), None);
    }

    #[test]
    fn diagnostics_off_by_default() {
        let mut seq = abc();
        for _ in 0..3 {
            seq.poll(0);
            seq.on_ack();
        }
        assert_eq!(seq.poll(60_000), None);
    }

    // ── Restart ─────────────────────────────────────────────────────

    #[test]
    fn restart_rewinds_and_rearms() {
        let mut seq = with_diagnostics();
        seq.poll(20_000);
        seq.on_ack();
        seq.poll(20_000);
        seq.on_ack();
        assert!(seq.is_configured());

        seq.restart();
        assert!(!seq.is_configured());
        assert_eq!(seq.sent(), 0);
        assert_eq!(seq.poll(30_000), Some("A\r\n"));
        seq.on_ack();
        assert_eq!(seq.poll(30_000), Some("VER\r\n"));
    }

    // ── Rollback ────────────────────────────────────────────────────

    #[test]
    fn rollback_releases_same_command_again() {
        let mut seq = abc();
        assert_eq!(seq.poll(0), Some("A\r\n"));
        seq.rollback();
        assert!(seq.is_ready());
        assert_eq!(seq.sent(), 0);
        assert_eq!(seq.awaiting_ack_for(100), None);
        assert_eq!(seq.poll(10), Some("A\r\n"));
        seq.on_ack();
        assert_eq!(seq.poll(20), Some("B\r\n"));
    }

    #[test]
    fn rollback_restores_diagnostic_query() {
        let mut seq = with_diagnostics();
        seq.poll(20_000);
        seq.on_ack();
        assert_eq!(seq.poll(20_000), Some("VER\r\n"));
        seq.rollback();
        assert_eq!(seq.poll(20_010), Some("VER\r\n"));
        seq.on_ack();
        assert_eq!(seq.poll(20_020), Some("get_all\r\n"));
    }

    #[test]
    fn rollback_after_ack_is_noop() {
        let mut seq = abc();
        seq.poll(0);
        seq.on_ack();
        seq.rollback();
        seq.rollback();
        assert_eq!(seq.sent(), 1);
        assert_eq!(seq.poll(10), Some("B\r\n"));
    }

    #[test]
    fn restart_while_waiting_sends_immediately() {
        let mut seq = abc();
        seq.poll(0);
        seq.restart();
        assert_eq!(seq.poll(1), Some("A\r\n"));
    }
}
