/// Host communication layer — serial NDJSON transport.
///
/// The relay streams presence changes as newline-delimited JSON over the
/// console serial port and accepts commands on the same port.
use crate::board;
use crate::driver::{DriverStatus, Ld1125h, Presence};
use crate::protocol::{DeviceMessage, HostCommand, RawCommand, MAX_MSG_LEN, VERSION};

/// Interval between driver poll cycles
pub const POLL_INTERVAL_MS: u64 = 10;

/// Interval between unsolicited status messages
pub const STATUS_INTERVAL_SECS: u64 = 30;

// ── Serialization helpers ──────────────────────────────────────────────

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

/// Deserialize a HostCommand from a JSON byte slice.
pub fn parse_command(data: &[u8]) -> Option<HostCommand> {
    let trimmed = trim_trailing_whitespace(data);
    if trimmed.is_empty() {
        return None;
    }
    let (raw, _) = serde_json_core::from_slice::<RawCommand>(trimmed).ok()?;
    match raw.cmd.as_str() {
        "status" => Some(HostCommand::GetStatus),
        "reconfigure" => Some(HostCommand::Reconfigure),
        "set_timeout" => raw
            .timeout_ms
            .map(|timeout_ms| HostCommand::SetTimeout { timeout_ms }),
        _ => None,
    }
}

/// Apply a host command to the driver. Returns a reply for the host, if the
/// command asks for one.
pub fn handle_command<IO>(
    cmd: &HostCommand,
    driver: &mut Ld1125h<IO>,
    uptime_secs: u32,
) -> Option<DeviceMessage> {
    match *cmd {
        HostCommand::GetStatus => Some(status_message(&driver.status(), uptime_secs)),
        HostCommand::Reconfigure => {
            driver.reconfigure();
            None
        }
        HostCommand::SetTimeout { timeout_ms } => {
            driver.set_motion_timeout(timeout_ms);
            None
        }
    }
}

pub fn status_message(status: &DriverStatus, uptime_secs: u32) -> DeviceMessage {
    DeviceMessage::Status {
        configured: status.configured,
        sent: status.sent as u8,
        total: status.total as u8,
        discarded: status.lines.discarded,
        timeout_ms: status.timeout_ms,
        uptime: uptime_secs,
        board: board::BOARD_NAME,
        version: VERSION,
    }
}

pub fn presence_message(presence: &Presence, now_ms: u64) -> DeviceMessage {
    DeviceMessage::Presence {
        motion: presence.motion,
        movement: presence.movement,
        occupancy: presence.occupancy,
        distance: presence.distance,
        ts: (now_ms & 0xFFFF_FFFF) as u32,
    }
}

pub fn cleared_message(now_ms: u64) -> DeviceMessage {
    DeviceMessage::Cleared {
        ts: (now_ms & 0xFFFF_FFFF) as u32,
    }
}

// ── Serial NDJSON reader ───────────────────────────────────────────────

/// Serial NDJSON reader state machine.
/// Accumulates bytes until a newline is found, then yields the line.
pub struct LineReader {
    buf: [u8; MAX_MSG_LEN],
    pos: usize,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_MSG_LEN],
            pos: 0,
            overflowed: false,
        }
    }

    /// Feed a byte into the reader. Returns a complete line (without newline)
    /// when one is detected.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if byte == b'\n' || byte == b'\r' {
            let overflowed = core::mem::replace(&mut self.overflowed, false);
            let len = core::mem::replace(&mut self.pos, 0);
            if len > 0 && !overflowed {
                Some(&self.buf[..len])
            } else {
                None
            }
        } else if self.overflowed {
            None
        } else if self.pos < self.buf.len() {
            self.buf[self.pos] = byte;
            self.pos += 1;
            None
        } else {
            // Overflow — drop the rest of this line
            self.pos = 0;
            self.overflowed = true;
            None
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_trailing_whitespace(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && (data[end - 1] == b' ' || data[end - 1] == b'\n' || data[end - 1] == b'\r' || data[end - 1] == b'\t') {
        end -= 1;
    }
    &data[..end]
}
