//! LD1125H relay — ESP-IDF std firmware
//!
//! Thread-based counterpart of the bare-metal firmware. The main thread owns
//! the radar UART and runs the driver poll cycle; a command thread reads
//! NDJSON host commands from the console and hands them over a channel.

use std::io::Read as _;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_svc::hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use ld1125h::comm::{self, LineReader, POLL_INTERVAL_MS, STATUS_INTERVAL_SECS};
use ld1125h::protocol::{DeviceMessage, HostCommand, MAX_MSG_LEN, VERSION};
use ld1125h::{board, DriverConfig, EventSink, Ld1125h, Presence};

/// Radar configuration baked in at build time
static CONFIG_JSON: &[u8] = include_bytes!("../../ld1125h.json");

// ── Radar UART adapter ───────────────────────────────────────────────

/// `UartDriver` behind the `embedded_io` traits the driver expects.
struct RadarUart<'d>(UartDriver<'d>);

#[derive(Debug)]
struct UartError(EspError);

impl embedded_io::Error for UartError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

impl embedded_io::ErrorType for RadarUart<'_> {
    type Error = UartError;
}

impl embedded_io::Read for RadarUart<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.0.read(buf, NON_BLOCK).map_err(UartError)
    }
}

impl embedded_io::ReadReady for RadarUart<'_> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        self.0.remaining_read().map(|n| n > 0).map_err(UartError)
    }
}

impl embedded_io::Write for RadarUart<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).map_err(UartError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.wait_tx_done(BLOCK).map_err(UartError)
    }
}

// ── Output ───────────────────────────────────────────────────────────

/// Prints every published event as one NDJSON line on stdout.
struct StdoutSink;

impl EventSink for StdoutSink {
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
        if let Ok(s) = std::str::from_utf8(&buf[..len]) {
            print!("{}", s);
        }
    }
}

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    let boot = Instant::now();
    log::info!("LD1125H relay v{} starting on {} (std)", VERSION, board::BOARD_NAME);

    let config = DriverConfig::from_json(CONFIG_JSON)
        .map_err(|e| anyhow::anyhow!("invalid radar configuration: {:?}", e))?;

    // ── Peripherals ──────────────────────────────────────────────────

    let peripherals = Peripherals::take()?;

    #[cfg(feature = "xiao")]
    let (tx_pin, rx_pin) = (peripherals.pins.gpio43, peripherals.pins.gpio44);
    #[cfg(feature = "m5stickc")]
    let (tx_pin, rx_pin) = (peripherals.pins.gpio32, peripherals.pins.gpio33);

    let uart = UartDriver::new(
        peripherals.uart1,
        tx_pin,
        rx_pin,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(board::RADAR_BAUD)),
    )?;
    log::info!(
        "Radar UART on RX={} TX={} at {} baud",
        board::RADAR_RX_PIN,
        board::RADAR_TX_PIN,
        board::RADAR_BAUD
    );

    let mut driver = Ld1125h::new(RadarUart(uart), config)
        .map_err(|e| anyhow::anyhow!("invalid radar configuration: {:?}", e))?;
    driver.log_config();

    // ── Command thread ───────────────────────────────────────────────

    let (cmd_tx, cmd_rx) = mpsc::sync_channel::<HostCommand>(4);
    thread::Builder::new()
        .name("command".into())
        .stack_size(4096)
        .spawn(move || command_thread(cmd_tx))?;
    log::info!("Command thread spawned");

    // ── Poll loop ────────────────────────────────────────────────────

    poll_loop(&mut driver, &cmd_rx, boot)
}

fn poll_loop(
    driver: &mut Ld1125h<RadarUart<'_>>,
    cmd_rx: &Receiver<HostCommand>,
    boot: Instant,
) -> ! {
    let mut sink = StdoutSink;
    let mut last_status = Instant::now();

    loop {
        let uptime_secs = boot.elapsed().as_secs() as u32;
        while let Ok(cmd) = cmd_rx.try_recv() {
            if let Some(reply) = comm::handle_command(&cmd, driver, uptime_secs) {
                emit(&reply);
            }
        }

        let now = boot.elapsed().as_millis() as u64;
        if let Err(e) = driver.poll(now, &mut sink) {
            log::error!("Radar UART error: {:?}", e);
        }

        if last_status.elapsed() >= Duration::from_secs(STATUS_INTERVAL_SECS) {
            last_status = Instant::now();
            emit(&comm::status_message(&driver.status(), uptime_secs));
        }

        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}

// ── Command thread ───────────────────────────────────────────────────

fn command_thread(cmd_tx: SyncSender<HostCommand>) {
    let mut reader = LineReader::new();
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 64];

    loop {
        match stdin.read(&mut buf) {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    if let Some(line) = reader.feed(byte) {
                        if let Some(cmd) = comm::parse_command(line) {
                            let _ = cmd_tx.try_send(cmd);
                        }
                    }
                }
            }
            // console has nothing yet
            _ => thread::sleep(Duration::from_millis(50)),
        }
    }
}
