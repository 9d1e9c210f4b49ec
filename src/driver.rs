/// LD1125H driver: one cooperative poll cycle over the radar UART.
///
/// Each [`Ld1125h::poll`] call, in order:
/// 1. releases at most one configuration command,
/// 2. checks the motion quiet period,
/// 3. drains every byte the UART has ready through the frame decoder.
///
/// Nothing blocks; an empty UART simply ends the cycle. Decoded presence is
/// handed to an [`EventSink`], which decides where it goes.
use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

use crate::config::{ConfigError, DriverConfig};
use crate::decoder::{FrameDecoder, MotionRecord, Outcome};
use crate::sequencer::ConfigSequencer;
use crate::timeout::MotionTimeout;

/// Raw line echo capacity (`log_sensor_output`)
const ECHO_LEN: usize = 64;

/// UART bytes pulled per read call
const READ_CHUNK: usize = 32;

/// Transport failure during a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// UART read (or readiness check) failed
    Read(E),
    /// UART write failed
    Write(E),
}

/// Presence derived from one accepted motion report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presence {
    /// Either kind of target
    pub motion: bool,
    pub movement: bool,
    pub occupancy: bool,
    /// Metres
    pub distance: f32,
}

impl From<MotionRecord> for Presence {
    fn from(record: MotionRecord) -> Self {
        Self {
            motion: record.is_movement() || record.is_occupancy(),
            movement: record.is_movement(),
            occupancy: record.is_occupancy(),
            distance: record.distance(),
        }
    }
}

/// Receives what the driver publishes.
pub trait EventSink {
    /// A motion report was accepted
    fn on_presence(&mut self, presence: Presence, now_ms: u64);

    /// The quiet period expired: motion, movement and occupancy are all false
    fn on_cleared(&mut self, now_ms: u64);
}

/// Line counters since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineStats {
    /// Lines with intact framing (any leading token)
    pub complete: u32,
    /// Lines dropped for a framing error; acknowledgment lines excluded
    pub discarded: u32,
}

/// Snapshot for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverStatus {
    pub configured: bool,
    pub sent: usize,
    pub total: usize,
    pub timeout_ms: u32,
    pub lines: LineStats,
}

pub struct Ld1125h<IO> {
    io: IO,
    config: DriverConfig,
    decoder: FrameDecoder,
    sequencer: ConfigSequencer,
    timeout: MotionTimeout,
    stats: LineStats,
    echo: Vec<u8, ECHO_LEN>,
    /// Current line opened with the acknowledgment token
    ack_line: bool,
    stall_warned: bool,
}

impl<IO> Ld1125h<IO> {
    /// Validate the configuration and render the command list.
    pub fn new(io: IO, config: DriverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let commands = config.radar.render_commands()?;
        Ok(Self {
            io,
            config,
            decoder: FrameDecoder::new(),
            sequencer: ConfigSequencer::new(commands, config.diagnostics()),
            timeout: MotionTimeout::new(config.motion_timeout_ms),
            stats: LineStats::default(),
            echo: Vec::new(),
            ack_line: false,
            stall_warned: false,
        })
    }

    /// Release the UART
    pub fn free(self) -> IO {
        self.io
    }

    /// Feed one radar byte received at `now_ms`.
    ///
    /// [`Ld1125h::poll`] calls this for every byte it reads; hosts that own
    /// the UART themselves can call it directly.
    pub fn feed<S: EventSink>(&mut self, byte: u8, now_ms: u64, sink: &mut S) {
        if self.config.log_sensor_output && byte != b'\n' && byte != b'\r' {
            // overflow only truncates the echo
            let _ = self.echo.push(byte);
        }

        match self.decoder.consume(byte) {
            Outcome::InProgress => {}
            Outcome::AckDetected => {
                self.ack_line = true;
                log::debug!("Radar acknowledged command {}", self.sequencer.sent());
                self.sequencer.on_ack();
                self.stall_warned = false;
            }
            Outcome::LineComplete(record) => {
                self.stats.complete = self.stats.complete.wrapping_add(1);
                // the radar only reports once it is fully configured
                if record.is_motion_event() && self.sequencer.is_configured() {
                    self.timeout.on_motion_event(now_ms);
                    sink.on_presence(Presence::from(record), now_ms);
                }
            }
            // `received message: ...` never fits the report layout
            Outcome::Discarded if self.ack_line => {}
            Outcome::Discarded => {
                self.stats.discarded = self.stats.discarded.wrapping_add(1);
                log::debug!("Discarded malformed radar line");
            }
        }

        if byte == b'\n' {
            self.ack_line = false;
            if self.config.log_sensor_output {
                let line = core::str::from_utf8(&self.echo).unwrap_or("<non-utf8>");
                log::debug!("radar: {}", line);
                self.echo.clear();
            }
        }
    }

    /// Restart the configuration sequence from the first command.
    pub fn reconfigure(&mut self) {
        log::info!("Reconfiguring radar");
        self.sequencer.restart();
        self.stall_warned = false;
    }

    pub fn set_motion_timeout(&mut self, timeout_ms: u32) {
        log::info!("Motion timeout set to {} ms", timeout_ms);
        self.timeout.set_timeout(timeout_ms);
        self.config.motion_timeout_ms = timeout_ms;
    }

    pub fn is_configured(&self) -> bool {
        self.sequencer.is_configured()
    }

    /// How long the last command has waited for its acknowledgment
    pub fn awaiting_ack_for(&self, now_ms: u64) -> Option<u64> {
        self.sequencer.awaiting_ack_for(now_ms)
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn status(&self) -> DriverStatus {
        DriverStatus {
            configured: self.sequencer.is_configured(),
            sent: self.sequencer.sent(),
            total: self.sequencer.total(),
            timeout_ms: self.timeout.timeout_ms(),
            lines: self.stats,
        }
    }

    /// Log the effective configuration.
    pub fn log_config(&self) {
        let c = &self.config;
        log::info!("LD1125H:");
        log::info!("  Motion timeout: {} ms", c.motion_timeout_ms);
        log::info!("  Log sensor output: {}", c.log_sensor_output);
        log::info!(
            "  Diagnostics: version={} get_all={} after {} ms",
            c.log_version,
            c.log_get_all,
            c.diagnostics_delay_ms
        );
        for cmd in self.sequencer.commands() {
            log::info!("  {}", cmd.trim_end());
        }
    }
}

impl<IO> Ld1125h<IO>
where
    IO: Read + ReadReady + Write,
{
    /// Run one poll cycle at uptime `now_ms`.
    pub fn poll<S: EventSink>(&mut self, now_ms: u64, sink: &mut S) -> Result<(), Error<IO::Error>> {
        self.send_next(now_ms)?;

        if self.timeout.poll(now_ms) {
            log::debug!("No motion for {} ms, clearing presence", self.timeout.timeout_ms());
            sink.on_cleared(now_ms);
        }

        let mut buf = [0u8; READ_CHUNK];
        while self.io.read_ready().map_err(Error::Read)? {
            let n = self.io.read(&mut buf).map_err(Error::Read)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                self.feed(byte, now_ms, sink);
            }
        }
        Ok(())
    }

    fn send_next(&mut self, now_ms: u64) -> Result<(), Error<IO::Error>> {
        if let Some(cmd) = self.sequencer.poll(now_ms) {
            if let Err(e) = self.io.write_all(cmd.as_bytes()) {
                // nothing reached the radar, so no acknowledgment will come
                self.sequencer.rollback();
                return Err(Error::Write(e));
            }
            return Ok(());
        }

        if let Some(waited) = self.sequencer.awaiting_ack_for(now_ms) {
            if waited >= self.config.ack_warn_ms as u64 && !self.stall_warned {
                log::warn!(
                    "Radar has not acknowledged command {}/{} after {} ms",
                    self.sequencer.sent(),
                    self.sequencer.total(),
                    waited
                );
                self.stall_warned = true;
            }
        }
        Ok(())
    }
}
