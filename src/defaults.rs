/// Compiled-in defaults and wire literals for the HLK-LD1125H radar.
///
/// Parameter defaults match the values the module ships with; the wire
/// literals are the fixed tokens of its ASCII report lines.

// === Device parameters ===

/// Maximum detection range in metres
pub const RMAX: f32 = 6.0;
/// Movement sensitivity, 0-2.8 m segment
pub const MTH1_MOV: u8 = 80;
/// Movement sensitivity, 2.8-8 m segment
pub const MTH2_MOV: u8 = 50;
/// Movement sensitivity, beyond 8 m
pub const MTH3_MOV: u8 = 20;
/// Occupancy sensitivity, 0-2.8 m segment
pub const MTH1_OCC: u8 = 60;
/// Occupancy sensitivity, 2.8-8 m segment
pub const MTH2_OCC: u8 = 55;
/// Occupancy sensitivity, beyond 8 m
pub const MTH3_OCC: u8 = 20;
pub const TS_ON: u32 = 60;
pub const TS_OFF: u32 = 15;
/// 0 = report over serial, 1 = report on the GPIO header
pub const OUTPUT_MODE: u8 = 0;
/// 1 = append signal strength to each report (`occ, dis=3.62, str=61.93`)
pub const TEST_MODE: u8 = 0;

/// Upper bound accepted for `rmax`
pub const RMAX_LIMIT: f32 = 10.0;
/// Upper bound accepted for the six segment thresholds
pub const THRESHOLD_LIMIT: u8 = 100;

// === Driver behaviour ===

/// Quiet period after which presence is forced false
pub const MOTION_TIMEOUT_MS: u32 = 1000;
/// The radar's own diagnostic output is unreliable while it is still booting
pub const DIAGNOSTICS_DELAY_MS: u32 = 15_000;
/// Warn once when a command has waited this long for its acknowledgment
pub const ACK_WARN_MS: u32 = 5_000;

// === Wire literals ===

pub const MOVEMENT_TOKEN: [u8; 3] = *b"mov";
pub const OCCUPANCY_TOKEN: [u8; 3] = *b"occ";
/// Leading bytes of the radar's `received message: ...` line
pub const ACK_TOKEN: [u8; 3] = *b"rec";
pub const SEPARATOR: [u8; 6] = *b", dis=";

/// Firmware version query
pub const VERSION_QUERY: &str = "VER\r\n";
/// Full parameter dump query
pub const GET_ALL_QUERY: &str = "get_all\r\n";
