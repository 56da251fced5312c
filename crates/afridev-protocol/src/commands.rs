//! Outbound OTA commands.
//!
//! Every command is `<opcode> 5A A5 <payload>`. Out-of-range parameters are
//! clamped into range, never rejected.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::constants::*;
use crate::hex_codec::space_bytes;

/// Offset the device should add to its GMT clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClockOffset {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub days: u16,
}

impl ClockOffset {
    /// Offset that moves `device_time` forward to `now`.
    ///
    /// The span is split into days, hours, minutes and seconds, each
    /// truncated toward zero. The device clock only moves forward, so
    /// negative time components wrap into the next unit and a negative day
    /// count becomes zero.
    pub fn between(device_time: NaiveDateTime, now: NaiveDateTime) -> Self {
        let span = now.signed_duration_since(device_time);
        let total = span.num_seconds();

        let days = total / 86_400;
        let mut hours = total / 3600 % 24;
        let mut minutes = total / 60 % 60;
        let mut seconds = total % 60;

        if seconds < 0 {
            seconds += 60;
        }
        if minutes < 0 {
            minutes += 60;
        }
        if hours < 0 {
            hours += 24;
        }

        ClockOffset {
            seconds: seconds as u8,
            minutes: minutes as u8,
            hours: hours as u8,
            days: days.clamp(0, i64::from(u16::MAX)) as u16,
        }
    }
}

/// Sensor sub-request carried by [`Command::SensorRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorRequest {
    RequestData,
    OverwriteFactory,
    ResetWaterDetect,
    SetUnknownLimit(u32),
    ReportNow,
    DownspoutRate,
    SetWaterLimit(u32),
}

impl SensorRequest {
    /// Build a request from its type number. Only types 3 and 6 use a
    /// limit; the others ignore both.
    pub fn from_index(index: u8, unknown_limit: u32, water_limit: u32) -> Option<Self> {
        let request = match index {
            SENSOR_REQ_DATA => SensorRequest::RequestData,
            SENSOR_REQ_OVERWRITE_FACTORY => SensorRequest::OverwriteFactory,
            SENSOR_REQ_RESET_WATER_DETECT => SensorRequest::ResetWaterDetect,
            SENSOR_REQ_SET_UNKNOWN_LIMIT => SensorRequest::SetUnknownLimit(unknown_limit),
            SENSOR_REQ_REPORT_NOW => SensorRequest::ReportNow,
            SENSOR_REQ_DOWNSPOUT_RATE => SensorRequest::DownspoutRate,
            SENSOR_REQ_SET_WATER_LIMIT => SensorRequest::SetWaterLimit(water_limit),
            _ => return None,
        };
        Some(request)
    }

    pub fn request_type(&self) -> u8 {
        match self {
            SensorRequest::RequestData => SENSOR_REQ_DATA,
            SensorRequest::OverwriteFactory => SENSOR_REQ_OVERWRITE_FACTORY,
            SensorRequest::ResetWaterDetect => SENSOR_REQ_RESET_WATER_DETECT,
            SensorRequest::SetUnknownLimit(_) => SENSOR_REQ_SET_UNKNOWN_LIMIT,
            SensorRequest::ReportNow => SENSOR_REQ_REPORT_NOW,
            SensorRequest::DownspoutRate => SENSOR_REQ_DOWNSPOUT_RATE,
            SensorRequest::SetWaterLimit(_) => SENSOR_REQ_SET_WATER_LIMIT,
        }
    }

    fn value(&self) -> u16 {
        match self {
            SensorRequest::SetUnknownLimit(v) | SensorRequest::SetWaterLimit(v) => {
                (*v).min(u32::from(u16::MAX)) as u16
            }
            _ => 0,
        }
    }
}

/// A command to send to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Command {
    /// 0x01: advance the GMT clock.
    GmtClockSet(ClockOffset),
    /// 0x02: align the storage clock to a timezone.
    StorageClockAlign { tz_hours: i32, tz_minutes: i32 },
    /// 0x07: days between daily log transmissions.
    TransmissionRate { days: i32 },
    /// 0x0D: report a GPS fix, taking a new one if asked.
    GpsRequest { new_measurement: bool },
    /// 0x0E
    GpsCriteria {
        satellites: i32,
        hdop: i32,
        measurement_time: i32,
    },
    /// 0x0F
    SensorRequest(SensorRequest),
}

/// Encoded command bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMessage {
    pub bytes: Vec<u8>,
}

impl CommandMessage {
    /// Uppercase hex without separators.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes)
    }
}

impl fmt::Display for CommandMessage {
    /// Space-separated byte pairs, e.g. `07 5A A5 2A`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&space_bytes(&self.to_hex()))
    }
}

impl Command {
    pub fn opcode(&self) -> u8 {
        match self {
            Command::GmtClockSet(_) => OTA_OP_GMT_CLOCK_SET,
            Command::StorageClockAlign { .. } => OTA_OP_LOCAL_OFFSET,
            Command::TransmissionRate { .. } => OTA_OP_SET_TRANSMISSION_RATE,
            Command::GpsRequest { .. } => OTA_OP_GPS_REQUEST,
            Command::GpsCriteria { .. } => OTA_OP_SET_GPS_CRITERIA,
            Command::SensorRequest(_) => OTA_OP_SENSOR_REQUEST,
        }
    }

    /// Encode with all parameters clamped into range.
    pub fn encode(&self) -> CommandMessage {
        let mut bytes = vec![self.opcode()];
        bytes.extend_from_slice(&COMMAND_MESSAGE_ID);

        match *self {
            Command::GmtClockSet(offset) => {
                bytes.extend_from_slice(&[offset.seconds, offset.minutes, offset.hours]);
                bytes.extend_from_slice(&offset.days.to_be_bytes());
            }
            Command::StorageClockAlign {
                tz_hours,
                tz_minutes,
            } => {
                let (hours, minutes) = normalize_timezone(tz_hours, tz_minutes);
                bytes.extend_from_slice(&[0, minutes, hours]);
            }
            Command::TransmissionRate { days } => {
                bytes.push(days.clamp(0, i32::from(MAX_TRANSMISSION_DAYS)) as u8);
            }
            Command::GpsRequest { new_measurement } => {
                bytes.push(u8::from(new_measurement));
            }
            Command::GpsCriteria {
                satellites,
                hdop,
                measurement_time,
            } => {
                let satellites = satellites.clamp(
                    i32::from(MIN_GPS_SATELLITES),
                    i32::from(MAX_GPS_SATELLITES),
                ) as u8;
                let hdop = hdop.clamp(i32::from(MIN_GPS_HDOP), i32::from(MAX_GPS_HDOP)) as u8;
                let time = measurement_time.clamp(0, i32::from(MAX_GPS_MEASUREMENT_TIME)) as u16;
                bytes.extend_from_slice(&[satellites, hdop]);
                bytes.extend_from_slice(&time.to_be_bytes());
            }
            Command::SensorRequest(request) => {
                bytes.push(request.request_type());
                bytes.extend_from_slice(&request.value().to_le_bytes());
            }
        }

        let message = CommandMessage { bytes };
        debug!(opcode = self.opcode(), command = %message, "encoded command");
        message
    }
}

/// Clamp a timezone to the form the storage align command sends: hours in
/// `0..24` (negative offsets wrap to `24 + h`) and minutes either 0 or 30.
pub fn normalize_timezone(tz_hours: i32, tz_minutes: i32) -> (u8, u8) {
    let mut hours = tz_hours.clamp(-MAX_TIMEZONE_HOURS, MAX_TIMEZONE_HOURS);
    if hours < 0 {
        hours += 24;
    }
    let minutes = if tz_minutes != 0 { 30 } else { 0 };
    (hours as u8, minutes)
}

/// Local time the storage clock align command aims for, given GMT `now`.
pub fn storage_local_time(now: NaiveDateTime, tz_hours: i32, tz_minutes: i32) -> NaiveDateTime {
    let hours = tz_hours.clamp(-MAX_TIMEZONE_HOURS, MAX_TIMEZONE_HOURS);
    let minutes = if tz_minutes != 0 { 30 } else { 0 };
    now + chrono::Duration::hours(i64::from(hours)) + chrono::Duration::minutes(minutes)
}
