/// Radar parameters and driver settings.
///
/// Both structs deserialize from JSON with `serde-json-core`; any key left
/// out takes its compiled-in default from [`crate::defaults`].
use core::fmt::Write;

use serde::Deserialize;

use crate::defaults;
use crate::sequencer::{Command, CommandList, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `rmax` outside 0.0..=10.0
    RmaxOutOfRange,
    /// A segment threshold above 100
    ThresholdOutOfRange { key: &'static str },
    OutputModeOutOfRange,
    TestModeOutOfRange,
    /// Input was not valid JSON for this schema
    Json,
    /// A rendered command did not fit its buffer
    CommandTooLong,
}

/// Parameters written into the radar at startup.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Maximum detection range (metres)
    pub rmax: f32,
    pub mth1_mov: u8,
    pub mth2_mov: u8,
    pub mth3_mov: u8,
    pub mth1_occ: u8,
    pub mth2_occ: u8,
    pub mth3_occ: u8,
    pub ts_on: u32,
    pub ts_off: u32,
    pub output_mode: u8,
    pub test_mode: u8,
}

impl RadarConfig {
    pub const fn new() -> Self {
        Self {
            rmax: defaults::RMAX,
            mth1_mov: defaults::MTH1_MOV,
            mth2_mov: defaults::MTH2_MOV,
            mth3_mov: defaults::MTH3_MOV,
            mth1_occ: defaults::MTH1_OCC,
            mth2_occ: defaults::MTH2_OCC,
            mth3_occ: defaults::MTH3_OCC,
            ts_on: defaults::TS_ON,
            ts_off: defaults::TS_OFF,
            output_mode: defaults::OUTPUT_MODE,
            test_mode: defaults::TEST_MODE,
        }
    }

    fn thresholds(&self) -> [(&'static str, u8); 6] {
        [
            ("mth1_mov", self.mth1_mov),
            ("mth2_mov", self.mth2_mov),
            ("mth3_mov", self.mth3_mov),
            ("mth1_occ", self.mth1_occ),
            ("mth2_occ", self.mth2_occ),
            ("mth3_occ", self.mth3_occ),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=defaults::RMAX_LIMIT).contains(&self.rmax) {
            return Err(ConfigError::RmaxOutOfRange);
        }
        for (key, value) in self.thresholds() {
            if value > defaults::THRESHOLD_LIMIT {
                return Err(ConfigError::ThresholdOutOfRange { key });
            }
        }
        if self.output_mode > 1 {
            return Err(ConfigError::OutputModeOutOfRange);
        }
        if self.test_mode > 1 {
            return Err(ConfigError::TestModeOutOfRange);
        }
        Ok(())
    }

    /// Render the configuration command list, in the order the radar
    /// expects them.
    pub fn render_commands(&self) -> Result<CommandList, ConfigError> {
        let mut list = CommandList::new();

        let mut rmax = Command::new();
        write!(rmax, "rmax={:.2}\r\n", self.rmax).map_err(|_| ConfigError::CommandTooLong)?;
        push(&mut list, rmax)?;

        for (key, value) in self.thresholds() {
            push(&mut list, render(key, value as u32)?)?;
        }
        push(&mut list, render("ts_on", self.ts_on)?)?;
        push(&mut list, render("ts_off", self.ts_off)?)?;
        push(&mut list, render("output_mode", self.output_mode as u32)?)?;
        push(&mut list, render("test_mode", self.test_mode as u32)?)?;

        Ok(list)
    }
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn render(key: &str, value: u32) -> Result<Command, ConfigError> {
    let mut cmd = Command::new();
    write!(cmd, "{}={}\r\n", key, value).map_err(|_| ConfigError::CommandTooLong)?;
    Ok(cmd)
}

fn push(list: &mut CommandList, cmd: Command) -> Result<(), ConfigError> {
    list.push(cmd).map_err(|_| ConfigError::CommandTooLong)
}

/// Everything the driver needs at construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Quiet period after which presence is forced false
    pub motion_timeout_ms: u32,
    /// Echo every raw radar line at debug level
    pub log_sensor_output: bool,
    /// Query the radar firmware version once configured
    pub log_version: bool,
    /// Query the full parameter dump once configured
    pub log_get_all: bool,
    pub diagnostics_delay_ms: u32,
    pub ack_warn_ms: u32,
    pub radar: RadarConfig,
}

impl DriverConfig {
    pub const fn new() -> Self {
        Self {
            motion_timeout_ms: defaults::MOTION_TIMEOUT_MS,
            log_sensor_output: false,
            log_version: false,
            log_get_all: false,
            diagnostics_delay_ms: defaults::DIAGNOSTICS_DELAY_MS,
            ack_warn_ms: defaults::ACK_WARN_MS,
            radar: RadarConfig::new(),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let (config, _) =
            serde_json_core::from_slice::<DriverConfig>(data).map_err(|_| ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radar.validate()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            version: self.log_version,
            get_all: self.log_get_all,
            delay_ms: self.diagnostics_delay_ms,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Command rendering ───────────────────────────────────────────

    #[test]
    fn default_commands() {
        let list = RadarConfig::default().render_commands().unwrap();
        let expected = [
            "rmax=6.00\r\n",
            "mth1_mov=80\r\n",
            "mth2_mov=50\r\n",
            "mth3_mov=20\r\n",
            "mth1_occ=60\r\n",
            "mth2_occ=55\r\n",
            "mth3_occ=20\r\n",
            "ts_on=60\r\n",
            "ts_off=15\r\n",
            "output_mode=0\r\n",
            "test_mode=0\r\n",
        ];
        assert_eq!(list.len(), expected.len());
        for (cmd, want) in list.iter().zip(expected) {
            assert_eq!(cmd.as_str(), want);
        }
    }

    #[test]
    fn rmax_two_decimals() {
        let config = RadarConfig {
            rmax: 2.5,
            ..RadarConfig::default()
        };
        let list = config.render_commands().unwrap();
        assert_eq!(list[0].as_str(), "rmax=2.50\r\n");
    }

    #[test]
    fn largest_values_fit() {
        let config = RadarConfig {
            rmax: 10.0,
            mth1_mov: 100,
            ts_on: u32::MAX,
            ts_off: u32::MAX,
            output_mode: 1,
            test_mode: 1,
            ..RadarConfig::default()
        };
        let list = config.render_commands().unwrap();
        assert_eq!(list[0].as_str(), "rmax=10.00\r\n");
        assert_eq!(list[1].as_str(), "mth1_mov=100\r\n");
        assert_eq!(list[8].as_str(), "ts_off=4294967295\r\n");
        assert_eq!(list[10].as_str(), "test_mode=1\r\n");
    }

    // ── Validation ──────────────────────────────────────────────────

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DriverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range() {
        let base = RadarConfig::default();
        assert_eq!(
            RadarConfig { rmax: 10.5, ..base }.validate(),
            Err(ConfigError::RmaxOutOfRange)
        );
        assert_eq!(
            RadarConfig { rmax: -1.0, ..base }.validate(),
            Err(ConfigError::RmaxOutOfRange)
        );
        assert_eq!(
            RadarConfig { rmax: f32::NAN, ..base }.validate(),
            Err(ConfigError::RmaxOutOfRange)
        );
        assert_eq!(
            RadarConfig { mth2_occ: 101, ..base }.validate(),
            Err(ConfigError::ThresholdOutOfRange { key: "mth2_occ" })
        );
        assert_eq!(
            RadarConfig { output_mode: 2, ..base }.validate(),
            Err(ConfigError::OutputModeOutOfRange)
        );
        assert_eq!(
            RadarConfig { test_mode: 2, ..base }.validate(),
            Err(ConfigError::TestModeOutOfRange)
        );
    }

    // ── JSON ────────────────────────────────────────────────────────

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(DriverConfig::from_json(b"{}").unwrap(), DriverConfig::default());
    }

    #[test]
    fn partial_json_overrides() {
        let config = DriverConfig::from_json(
            br#"{"motion_timeout_ms":2500,"log_version":true,"radar":{"rmax":4.5,"mth1_mov":70}}"#,
        )
        .unwrap();
        assert_eq!(config.motion_timeout_ms, 2500);
        assert!(config.log_version);
        assert!(!config.log_get_all);
        assert_eq!(config.radar.rmax, 4.5);
        assert_eq!(config.radar.mth1_mov, 70);
        assert_eq!(config.radar.mth2_mov, defaults::MTH2_MOV);
        assert_eq!(config.diagnostics_delay_ms, defaults::DIAGNOSTICS_DELAY_MS);
    }

    #[test]
    fn shipped_config_file_parses() {
        let config = DriverConfig::from_json(include_bytes!("../ld1125h.json")).unwrap();
        assert!(config.log_version);
        assert_eq!(config.radar, RadarConfig::default());
        assert_eq!(config.radar.render_commands().unwrap().len(), 11);
    }

    #[test]
    fn json_validation_applies() {
        assert_eq!(
            DriverConfig::from_json(br#"{"radar":{"mth3_mov":150}}"#),
            Err(ConfigError::ThresholdOutOfRange { key: "mth3_mov" })
        );
    }

    #[test]
    fn malformed_json_rejected() {
        assert_eq!(DriverConfig::from_json(b"{\"radar\":"), Err(ConfigError::Json));
        assert_eq!(
            DriverConfig::from_json(br#"{"motion_timeout_ms":"soon"}"#),
            Err(ConfigError::Json)
        );
    }

    #[test]
    fn diagnostics_follow_flags() {
        let config = DriverConfig {
            log_get_all: true,
            diagnostics_delay_ms: 100,
            ..DriverConfig::default()
        };
        assert_eq!(
            config.diagnostics(),
            Diagnostics {
                version: false,
                get_all: true,
                delay_ms: 100,
            }
        );
    }
}
