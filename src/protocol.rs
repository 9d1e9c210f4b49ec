/// JSON message protocol between the relay firmware and a host.
///
/// All messages are newline-delimited JSON (NDJSON).
/// Uses `heapless` types for no_std/no-alloc operation.
use serde::{Deserialize, Serialize};

/// Messages sent from the device to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage {
    /// An accepted radar motion report
    #[serde(rename = "presence")]
    Presence {
        motion: bool,
        movement: bool,
        occupancy: bool,
        /// Metres
        distance: f32,
        /// Uptime in milliseconds when decoded
        ts: u32,
    },
    /// Quiet period expired; all presence indicators are false
    #[serde(rename = "cleared")]
    Cleared { ts: u32 },
    /// Device status report
    #[serde(rename = "status")]
    Status {
        /// Radar has acknowledged the whole configuration
        configured: bool,
        /// Configuration commands sent so far
        sent: u8,
        total: u8,
        /// Lines dropped for framing errors
        discarded: u32,
        timeout_ms: u32,
        /// Uptime in seconds
        uptime: u32,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

/// Commands sent from the host to the device.
///
/// Deserialized via [`RawCommand`] in `comm::parse_command()` because
/// `serde_json_core` does not support internally tagged enums (`deserialize_any`).
#[derive(Debug, PartialEq)]
pub enum HostCommand {
    /// Request current status
    GetStatus,
    /// Send the whole radar configuration again
    Reconfigure,
    /// Change the motion quiet period
    SetTimeout { timeout_ms: u32 },
}

/// Wire format for host commands — flat struct that `serde_json_core` can
/// deserialize without `deserialize_any`. Converted to [`HostCommand`] in
/// `comm::parse_command()`.
#[derive(Deserialize)]
pub(crate) struct RawCommand {
    pub cmd: heapless::String<16>,
    #[serde(default)]
    pub timeout_ms: Option<u32>,
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json<'a>(msg: &DeviceMessage, buf: &'a mut [u8]) -> &'a str {
        let len = serde_json_core::to_slice(msg, buf).unwrap();
        core::str::from_utf8(&buf[..len]).unwrap()
    }

    #[test]
    fn serialize_presence_message() {
        let msg = DeviceMessage::Presence {
            motion: true,
            movement: false,
            occupancy: true,
            distance: 4.39,
            ts: 1500,
        };
        let mut buf = [0u8; 256];
        let json = to_json(&msg, &mut buf);
        assert!(json.contains(r#""type":"presence""#));
        assert!(json.contains(r#""motion":true"#));
        assert!(json.contains(r#""movement":false"#));
        assert!(json.contains(r#""occupancy":true"#));
        assert!(json.contains(r#""distance":4.39"#));
        assert!(json.contains(r#""ts":1500"#));
    }

    #[test]
    fn serialize_cleared_message() {
        let mut buf = [0u8; 64];
        let json = to_json(&DeviceMessage::Cleared { ts: 42 }, &mut buf);
        assert_eq!(json, r#"{"type":"cleared","ts":42}"#);
    }

    #[test]
    fn serialize_status_message() {
        let msg = DeviceMessage::Status {
            configured: false,
            sent: 3,
            total: 11,
            discarded: 7,
            timeout_ms: 1000,
            uptime: 120,
            board: "test_board",
            version: "0.1.0",
        };
        let mut buf = [0u8; 256];
        let json = to_json(&msg, &mut buf);
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""configured":false"#));
        assert!(json.contains(r#""sent":3"#));
        assert!(json.contains(r#""total":11"#));
        assert!(json.contains(r#""board":"test_board""#));
    }

    #[test]
    fn status_fits_buffer() {
        let msg = DeviceMessage::Status {
            configured: true,
            sent: u8::MAX,
            total: u8::MAX,
            discarded: u32::MAX,
            timeout_ms: u32::MAX,
            uptime: u32::MAX,
            board: "m5stickc_plus2",
            version: VERSION,
        };
        let mut buf = [0u8; MAX_MSG_LEN];
        assert!(serde_json_core::to_slice(&msg, &mut buf).is_ok());
    }
}
