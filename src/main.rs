//! LD1125H relay — bare-metal ESP32 firmware
//!
//! Configures an HLK-LD1125H radar on a spare UART and relays what it
//! reports as NDJSON over the console serial port.

#![no_std]
#![no_main]

#[cfg(not(any(feature = "board-xiao", feature = "board-m5stickc")))]
compile_error!("select a board: --features xiao or --features m5stickc");

use esp_backtrace as _;

esp_bootloader_esp_idf::esp_app_desc!();

use embassy_time::{Duration, Instant, Timer};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};

use ld1125h::comm::{self, POLL_INTERVAL_MS, STATUS_INTERVAL_SECS};
use ld1125h::protocol::{DeviceMessage, MAX_MSG_LEN, VERSION};
use ld1125h::{board, DriverConfig, EventSink, Ld1125h, Presence};

/// Radar configuration baked in at build time
static CONFIG_JSON: &[u8] = include_bytes!("../ld1125h.json");

/// Prints every published event as one NDJSON line.
struct SerialSink;

impl EventSink for SerialSink {
    fn on_presence(&mut self, presence: Presence, now_ms: u64) {
        emit(&comm::presence_message(&presence, now_ms));
    }

    fn on_cleared(&mut self, now_ms: u64) {
        emit(&comm::cleared_message(now_ms));
    }
}

fn emit(msg: &DeviceMessage) {
    let mut buf = [0u8; MAX_MSG_LEN];
    if let Some(len) = comm::serialize_message(msg, &mut buf) {
        if let Ok(s) = core::str::from_utf8(&buf[..len]) {
            esp_println::print!("{}", s);
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────

#[esp_rtos::main]
async fn main(_spawner: embassy_executor::Spawner) {
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Start the RTOS — requires timer + software interrupt
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    log::info!("LD1125H relay v{} starting on {}", VERSION, board::BOARD_NAME);

    #[cfg(feature = "board-xiao")]
    let (rx_pin, tx_pin) = (peripherals.GPIO44, peripherals.GPIO43);
    #[cfg(feature = "board-m5stickc")]
    let (rx_pin, tx_pin) = (peripherals.GPIO33, peripherals.GPIO32);

    let uart = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(board::RADAR_BAUD),
    )
    .unwrap()
    .with_rx(rx_pin)
    .with_tx(tx_pin);
    log::info!(
        "Radar UART on RX={} TX={} at {} baud",
        board::RADAR_RX_PIN,
        board::RADAR_TX_PIN,
        board::RADAR_BAUD
    );

    let config = DriverConfig::from_json(CONFIG_JSON).unwrap_or_else(|e| {
        log::warn!("Invalid {:?} in ld1125h.json, using defaults", e);
        DriverConfig::default()
    });

    let mut driver = match Ld1125h::new(uart, config) {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("Invalid radar configuration: {:?}", e);
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };
    driver.log_config();

    let mut sink = SerialSink;
    let mut last_status = Instant::now();

    loop {
        let now = Instant::now().as_millis();
        if let Err(e) = driver.poll(now, &mut sink) {
            log::error!("Radar UART error: {:?}", e);
        }

        if last_status.elapsed() >= Duration::from_secs(STATUS_INTERVAL_SECS) {
            last_status = Instant::now();
            let uptime = Instant::now().as_secs() as u32;
            emit(&comm::status_message(&driver.status(), uptime));
        }

        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
