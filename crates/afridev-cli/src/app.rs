//! Command-line interface definition and command handlers.
//!
//! Handlers return the text to print rather than printing it, so they can
//! be driven from tests.

use std::path::PathBuf;

use afridev_protocol::{
    decode_message, storage_local_time, ClockOffset, Command, Renderer, SensorRequest,
};
use chrono::{NaiveDateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CliError, CliResult};

#[derive(Debug, Parser)]
#[command(name = "afridev")]
#[command(about = "Decode Afridev2 telemetry messages and build OTA commands")]
#[command(version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a hex message (spaces allowed, may be split across arguments)
    Decode {
        #[arg(required = true)]
        hex: Vec<String>,
        /// Print JSON instead of a field listing
        #[arg(long)]
        json: bool,
        /// Timezone hours for local time (overrides config)
        #[arg(long, allow_negative_numbers = true)]
        timezone: Option<i32>,
    },
    /// Build an OTA command
    #[command(subcommand)]
    Encode(EncodeCommand),
}

#[derive(Debug, Subcommand)]
pub enum EncodeCommand {
    /// GMT clock set (0x01)
    ClockSet(ClockSetArgs),
    /// Storage clock align (0x02)
    StorageAlign {
        #[arg(long, allow_negative_numbers = true)]
        hours: Option<i32>,
        #[arg(long, allow_negative_numbers = true)]
        minutes: Option<i32>,
    },
    /// Daily log transmission rate in days (0x07)
    TransmissionRate {
        #[arg(allow_negative_numbers = true)]
        days: i32,
    },
    /// GPS request (0x0D)
    GpsRequest {
        /// Report the last fix instead of taking a new one
        #[arg(long)]
        existing: bool,
    },
    /// GPS measurement criteria (0x0E)
    GpsCriteria {
        #[arg(long, allow_negative_numbers = true)]
        satellites: Option<i32>,
        #[arg(long, allow_negative_numbers = true)]
        hdop: Option<i32>,
        /// Measurement time in seconds
        #[arg(long, allow_negative_numbers = true)]
        time: Option<i32>,
    },
    /// Sensor request (0x0F), type 0-6
    SensorRequest {
        request_type: u8,
        #[arg(long)]
        unknown_limit: Option<u32>,
        #[arg(long)]
        water_limit: Option<u32>,
    },
}

#[derive(Debug, Args)]
pub struct ClockSetArgs {
    /// Message from the device; the offset brings its clock to now (UTC)
    #[arg(long, conflicts_with_all = ["seconds", "minutes", "hours", "days"])]
    pub message: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub seconds: u8,
    #[arg(long, default_value_t = 0)]
    pub minutes: u8,
    #[arg(long, default_value_t = 0)]
    pub hours: u8,
    #[arg(long, default_value_t = 0)]
    pub days: u16,
}

/// Run a parsed command line and return the text to print.
pub fn run(cli: &Cli) -> CliResult<String> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    run_with_config(cli, &config, Utc::now().naive_utc())
}

/// Run with an explicit config and clock.
pub fn run_with_config(cli: &Cli, config: &Config, now: NaiveDateTime) -> CliResult<String> {
    match &cli.command {
        Commands::Decode {
            hex,
            json,
            timezone,
        } => {
            let timezone = timezone.unwrap_or(config.timezone.hours);
            decode(&hex.join(" "), *json, timezone)
        }
        Commands::Encode(cmd) => encode(cmd, config, now),
    }
}

fn decode(text: &str, json: bool, timezone_hours: i32) -> CliResult<String> {
    let decoded = decode_message(text);
    if !decoded.valid {
        warn!(input = %text, "input is not valid hex");
        return Err(CliError::InvalidArgument(format!(
            "not a hex message: {:?}",
            text
        )));
    }
    info!(
        message_type = decoded.header.message_type,
        len = decoded.len(),
        "decoded message"
    );

    if json {
        return Ok(serde_json::to_string_pretty(&decoded)?);
    }
    let lines: Vec<String> = Renderer::new(timezone_hours)
        .render(&decoded)
        .iter()
        .map(|f| f.to_string())
        .collect();
    Ok(lines.join("\n"))
}

fn encode(cmd: &EncodeCommand, config: &Config, now: NaiveDateTime) -> CliResult<String> {
    let command = match cmd {
        EncodeCommand::ClockSet(args) => Command::GmtClockSet(clock_offset(args, now)?),
        EncodeCommand::StorageAlign { hours, minutes } => {
            let tz_hours = hours.unwrap_or(config.timezone.hours);
            let tz_minutes = minutes.unwrap_or(config.timezone.minutes);
            let command = Command::StorageClockAlign {
                tz_hours,
                tz_minutes,
            };
            let local = storage_local_time(now, tz_hours, tz_minutes);
            return Ok(format!("{}\nLocal Time: {}", command.encode(), local));
        }
        EncodeCommand::TransmissionRate { days } => Command::TransmissionRate { days: *days },
        EncodeCommand::GpsRequest { existing } => Command::GpsRequest {
            new_measurement: !existing,
        },
        EncodeCommand::GpsCriteria {
            satellites,
            hdop,
            time,
        } => Command::GpsCriteria {
            satellites: satellites.unwrap_or(config.gps_criteria.satellites),
            hdop: hdop.unwrap_or(config.gps_criteria.hdop),
            measurement_time: time.unwrap_or(config.gps_criteria.measurement_time),
        },
        EncodeCommand::SensorRequest {
            request_type,
            unknown_limit,
            water_limit,
        } => {
            let request = SensorRequest::from_index(
                *request_type,
                unknown_limit.unwrap_or(config.sensor_limits.unknown_limit),
                water_limit.unwrap_or(config.sensor_limits.water_limit),
            )
            .ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "sensor request type must be 0-6, got {}",
                    request_type
                ))
            })?;
            Command::SensorRequest(request)
        }
    };
    debug!(?command, "building command");
    Ok(command.encode().to_string())
}

fn clock_offset(args: &ClockSetArgs, now: NaiveDateTime) -> CliResult<ClockOffset> {
    let Some(message) = &args.message else {
        return Ok(ClockOffset {
            seconds: args.seconds,
            minutes: args.minutes,
            hours: args.hours,
            days: args.days,
        });
    };
    let device_time = decode_message(message)
        .header
        .device_time
        .ok_or_else(|| CliError::InvalidArgument("message carries no device time".to_string()))?;
    debug!(%device_time, %now, "computing clock offset");
    Ok(ClockOffset::between(device_time, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ACTIVATED: &str = "0007033B1E0A0F031802070123050300 01F4";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn run_args(args: &[&str]) -> CliResult<String> {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        run_with_config(&cli, &Config::default(), now())
    }

    #[test]
    fn test_decode_listing() {
        let out = run_args(&["afridev", "decode", ACTIVATED]).unwrap();
        assert!(out.contains("Message Type: 0x07 Activated"));
        assert!(out.contains("Total Water Volume: 500 liters"));
        assert!(out.contains("Local Time: 2024-03-15 10:30:59"));
    }

    #[test]
    fn test_decode_split_arguments() {
        let out = run_args(&["afridev", "decode", "00", "07", "03"]).unwrap();
        assert!(out.contains("Protocol: Afridev2"));
    }

    #[test]
    fn test_decode_json() {
        let out = run_args(&["afridev", "decode", "--json", ACTIVATED]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["body"]["fields"]["total_volume"], 500);
    }

    #[test]
    fn test_decode_timezone() {
        let out = run_args(&["afridev", "decode", "--timezone", "-2", ACTIVATED]).unwrap();
        assert!(out.contains("Local Time: 2024-03-15 08:30:59"));
    }

    #[test]
    fn test_decode_invalid() {
        let err = run_args(&["afridev", "decode", "hello"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_encode_commands() {
        assert_eq!(
            run_args(&["afridev", "encode", "transmission-rate", "50"]).unwrap(),
            "07 5A A5 2A"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "gps-request"]).unwrap(),
            "0D 5A A5 01"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "gps-request", "--existing"]).unwrap(),
            "0D 5A A5 00"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "gps-criteria"]).unwrap(),
            "0E 5A A5 04 1E 00 3C"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "sensor-request", "6"]).unwrap(),
            "0F 5A A5 06 84 03"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "sensor-request", "3", "--unknown-limit", "120"])
                .unwrap(),
            "0F 5A A5 03 78 00"
        );
    }

    #[test]
    fn test_encode_negative_values_clamp() {
        assert_eq!(
            run_args(&["afridev", "encode", "transmission-rate", "-5"]).unwrap(),
            "07 5A A5 00"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "transmission-rate", "100"]).unwrap(),
            "07 5A A5 2A"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "gps-criteria", "--time", "-10"]).unwrap(),
            "0E 5A A5 04 1E 00 00"
        );
        assert_eq!(
            run_args(&["afridev", "encode", "gps-criteria", "--time", "900"]).unwrap(),
            "0E 5A A5 04 1E 02 58"
        );
    }

    #[test]
    fn test_encode_sensor_request_out_of_range() {
        let err = run_args(&["afridev", "encode", "sensor-request", "9"]).unwrap_err();
        assert!(err.to_string().contains("0-6"));
    }

    #[test]
    fn test_encode_storage_align() {
        let out = run_args(&["afridev", "encode", "storage-align", "--hours", "-5", "--minutes", "30"])
            .unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("02 5A A5 00 1E 13"));
        assert_eq!(lines.next(), Some("Local Time: 2024-03-15 07:30:00"));
    }

    #[test]
    fn test_encode_clock_set_from_message() {
        let out = run_args(&["afridev", "encode", "clock-set", "--message", ACTIVATED]).unwrap();
        // 10:30:59 -> 12:00:00 is 1:29:01
        assert_eq!(out, "01 5A A5 01 1D 01 00 00");
    }

    #[test]
    fn test_encode_clock_set_explicit() {
        let out = run_args(&["afridev", "encode", "clock-set", "--hours", "2", "--days", "3"]).unwrap();
        assert_eq!(out, "01 5A A5 00 00 02 00 03");
    }

    #[test]
    fn test_encode_clock_set_without_time() {
        let err = run_args(&["afridev", "encode", "clock-set", "--message", "0006"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_config_values_are_used() {
        let config = Config::from_yaml_str("gps_criteria:\n  satellites: 6\n").unwrap();
        let cli = Cli::try_parse_from(["afridev", "encode", "gps-criteria", "--hdop", "40"]).unwrap();
        let out = run_with_config(&cli, &config, now()).unwrap();
        assert_eq!(out, "0E 5A A5 06 28 00 3C");
    }

    #[test]
    fn test_verbosity_flag() {
        let cli = Cli::try_parse_from(["afridev", "-vv", "encode", "gps-request"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
