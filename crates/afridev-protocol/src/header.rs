//! Common message header.
//!
//! ```text
//! chars  0..2    (unused)
//!        2..4    message type
//!        4..6    protocol id
//!        6..18   device time: sec min hour day month year (one byte each)
//!        18..22  firmware version major, minor
//!        22..26  days active (16-bit, MSB first)
//!        26..28  week
//!        28..30  day
//! ```
//!
//! Boot messages (type 6) are sent by the bootloader before the clock is set,
//! so they carry no device time, days active, week or day.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::constants::MSG_TYPE_BOOT;
use crate::error::{FormatError, Result};
use crate::format::{message_id_name, protocol_name};
use crate::hex_codec::{parse_field, FieldReader};

/// Firmware version reported in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Header fields common to every message. Each is present only if the
/// message is long enough to hold it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageHeader {
    /// Message type; 0 when the message is too short to carry one.
    pub message_type: u8,
    pub protocol_id: Option<u8>,
    /// Device GMT clock at the time of sending.
    pub device_time: Option<NaiveDateTime>,
    pub firmware_version: Option<FirmwareVersion>,
    pub days_active: Option<u16>,
    pub week: Option<u8>,
    pub day: Option<u8>,
}

impl MessageHeader {
    /// Parse the header out of a validated, space-stripped message.
    pub fn parse(message: &str) -> Self {
        let reader = FieldReader::new(message);
        let message_type = match reader.u8_at(2) {
            Some(t) => t,
            None => return MessageHeader::default(),
        };
        let timed = message_type != MSG_TYPE_BOOT;

        let device_time = if timed {
            reader
                .hex_at(6, 12)
                .and_then(|raw| decode_device_time(raw).ok())
        } else {
            None
        };

        let firmware_version = match (reader.u8_at(18), reader.u8_at(20)) {
            (Some(major), Some(minor)) => Some(FirmwareVersion { major, minor }),
            _ => None,
        };

        let (week, day) = match (reader.u8_at(26), reader.u8_at(28)) {
            (Some(week), Some(day)) if timed => (Some(week), Some(day)),
            _ => (None, None),
        };

        MessageHeader {
            message_type,
            protocol_id: reader.u8_at(4),
            device_time,
            firmware_version,
            days_active: reader.u16_at(22).filter(|_| timed),
            week,
            day,
        }
    }

    pub fn message_name(&self) -> &'static str {
        message_id_name(self.message_type)
    }

    pub fn protocol_name(&self) -> Option<&'static str> {
        self.protocol_id.map(protocol_name)
    }

    /// Device time shifted by a timezone offset in hours.
    pub fn local_time(&self, timezone_hours: i32) -> Option<NaiveDateTime> {
        self.device_time
            .map(|t| t + Duration::hours(i64::from(timezone_hours)))
    }
}

/// Decode the six packed RTC bytes (second, minute, hour, day, month, year).
///
/// Each byte is checked on its own and replaced by a default when out of
/// range: `00` for time fields, `01` for day and month, and 2018 for the
/// year. A day that does not exist in the month (31 February) becomes the
/// first of that month.
pub fn decode_device_time(raw: &str) -> Result<NaiveDateTime> {
    if raw.len() < 12 {
        return Err(FormatError::absent(0, 12));
    }
    let byte = |i: usize| parse_field(raw, i * 2, 2);

    let second = byte(0)?;
    let minute = byte(1)?;
    let hour = byte(2)?;
    let day = byte(3)?;
    let month = byte(4)?;
    let year = byte(5)?;

    let second = if second < 60 { second } else { 0 };
    let minute = if minute < 60 { minute } else { 0 };
    let hour = if hour < 24 { hour } else { 0 };
    let day = if (1..=31).contains(&day) { day } else { 1 };
    let month = if (1..=12).contains(&month) { month } else { 1 };
    let year = if (1..30).contains(&year) {
        2000 + year as i32
    } else {
        2018
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
        .ok_or_else(|| FormatError::invalid_digits(raw))?;
    date.and_hms_opt(hour, minute, second)
        .ok_or_else(|| FormatError::invalid_digits(raw))
}
