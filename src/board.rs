/// Hardware abstraction for supported boards.
///
/// Each board module defines the radar UART wiring, selected at compile
/// time via feature flags.

/// The LD1125H talks 8N1 at this rate out of the box
pub const RADAR_BAUD: u32 = 115200;

#[cfg(feature = "board-xiao")]
mod hw {
    // D7 / D6 on the XIAO header
    pub const RADAR_RX_PIN: u8 = 44;
    pub const RADAR_TX_PIN: u8 = 43;
    pub const BOARD_NAME: &str = "xiao_esp32s3";
}

#[cfg(feature = "board-m5stickc")]
mod hw {
    // Grove port
    pub const RADAR_RX_PIN: u8 = 33;
    pub const RADAR_TX_PIN: u8 = 32;
    pub const BOARD_NAME: &str = "m5stickc_plus2";
}

#[cfg(not(any(feature = "board-xiao", feature = "board-m5stickc")))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
