//! Body decoders for the fixed-layout message types.
//!
//! Sensor data and OTA replies have their own modules. Every field here is
//! independently optional: a short message yields a record with only the
//! leading fields set.

use serde::Serialize;
use std::fmt;

use crate::constants::{BODY_START, HOURS_PER_DAY, MILLILITERS_PER_COUNT, PAD_COUNT};
use crate::format::{format_coordinate, format_hdop, fw_copy_result, hour_label, reboot_reason};
use crate::hex_codec::{is_all_ff, FieldReader};

// ============================================================================
// SOS / Boot
// ============================================================================

/// Boot report sent by the bootloader (type 6) or application (type 35).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SosMessage {
    /// IFG1 reset flags.
    pub reboot_flags: Option<u8>,
    pub good_app: Option<bool>,
    pub backup_write_count: Option<u16>,
    pub copy_result: Option<u8>,
    pub invalid_reset: Option<bool>,
    /// Application CRC as hex text, most significant byte first.
    pub crc: Option<String>,
}

impl SosMessage {
    pub fn decode(reader: &FieldReader<'_>) -> Self {
        let b = BODY_START;
        SosMessage {
            reboot_flags: reader.u8_at(b),
            good_app: reader.flag_at(b + 2),
            backup_write_count: reader.u16_swapped_at(b + 4),
            copy_result: reader.u8_at(b + 8),
            invalid_reset: reader.flag_at(b + 10),
            crc: reader.swapped_hex_at(b + 12),
        }
    }

    pub fn reboot_reason(&self) -> Option<String> {
        self.reboot_flags.map(reboot_reason)
    }

    pub fn copy_result_name(&self) -> Option<&'static str> {
        self.copy_result.map(fw_copy_result)
    }
}

// ============================================================================
// Activated
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivatedMessage {
    /// Total water volume in liters.
    pub total_volume: Option<u16>,
}

impl ActivatedMessage {
    pub fn decode(reader: &FieldReader<'_>) -> Self {
        ActivatedMessage {
            total_volume: reader.u16_at(BODY_START),
        }
    }
}

// ============================================================================
// GPS Location
// ============================================================================

/// A GPS fix. The same layout appears in a location message at the body
/// start and in an OTA GPS request reply at the payload start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GpsLocation {
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    /// Signed fixed point, see [`crate::format::format_coordinate`].
    pub latitude: Option<i32>,
    pub longitude: Option<i32>,
    pub fix_quality: Option<bool>,
    pub satellites: Option<u8>,
    pub hdop: Option<u8>,
    /// Seconds taken to get the fix.
    pub measurement_time: Option<u16>,
}

impl GpsLocation {
    /// Decode a fix whose first field is at `base`.
    pub fn decode_at(reader: &FieldReader<'_>, base: usize) -> Self {
        GpsLocation {
            hour: reader.u8_at(base),
            minute: reader.u8_at(base + 2),
            latitude: reader.i32_at(base + 4),
            longitude: reader.i32_at(base + 12),
            fix_quality: reader.flag_at(base + 20),
            satellites: reader.u8_at(base + 22),
            hdop: reader.u8_at(base + 24),
            // base + 26 is a reserved byte
            measurement_time: reader.u16_at(base + 28),
        }
    }

    pub fn decode(reader: &FieldReader<'_>) -> Self {
        Self::decode_at(reader, BODY_START)
    }

    pub fn latitude_text(&self) -> Option<String> {
        self.latitude.map(|v| format_coordinate(v, 'N', 'S'))
    }

    pub fn longitude_text(&self) -> Option<String> {
        self.longitude.map(|v| format_coordinate(v, 'E', 'W'))
    }

    pub fn hdop_text(&self) -> Option<String> {
        self.hdop.map(format_hdop)
    }
}

// ============================================================================
// Daily Water Log
// ============================================================================

/// One hour of the daily log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyFlow {
    /// Hour of day, 0..24.
    pub hour: usize,
    /// `12 am` .. `11 pm`.
    pub label: String,
    /// Raw pour count (32 mL units).
    pub raw: u16,
    pub liters: f32,
}

impl HourlyFlow {
    pub fn new(hour: usize, raw: u16) -> Self {
        HourlyFlow {
            hour,
            label: hour_label(hour),
            raw,
            liters: pour_count_liters(raw),
        }
    }
}

/// Convert a raw pour count to liters.
pub fn pour_count_liters(raw: u16) -> f32 {
    raw as f32 * MILLILITERS_PER_COUNT / 1000.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyWaterLog {
    /// Only hours whose field is present.
    pub hourly: Vec<HourlyFlow>,
    pub total: Option<u16>,
    pub average: Option<u16>,
    pub red_flag: Option<bool>,
    pub unknown: Option<u16>,
    pub pads: [Option<u16>; PAD_COUNT],
    /// Whether the trailing reserved span reads as all `FF`.
    pub reserved_ok: Option<bool>,
}

impl DailyWaterLog {
    pub fn decode(reader: &FieldReader<'_>) -> Self {
        let b = BODY_START;
        let hourly = (0..HOURS_PER_DAY)
            .map_while(|hour| reader.u16_at(b + hour * 4).map(|raw| HourlyFlow::new(hour, raw)))
            .collect();

        let mut pads = [None; PAD_COUNT];
        for (k, pad) in pads.iter_mut().enumerate() {
            *pad = reader.u16_at(144 + k * 4);
        }

        DailyWaterLog {
            hourly,
            total: reader.u16_at(128),
            average: reader.u16_at(132),
            red_flag: reader.flag_at(136),
            unknown: reader.u16_at(140),
            pads,
            reserved_ok: reader.hex_at(168, 88).map(is_all_ff),
        }
    }

    /// Sum of the hourly readings in liters.
    pub fn hourly_total_liters(&self) -> f32 {
        self.hourly.iter().map(|h| h.liters).sum()
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// System uptime split into calendar units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Uptime {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Uptime {
    pub fn from_seconds(total: u32) -> Self {
        Uptime {
            days: total / 86_400,
            hours: total % 86_400 / 3600,
            minutes: total % 3600 / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Raw RTC registers as sent, without range checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RtcFields {
    pub second: Option<u8>,
    pub minute: Option<u8>,
    pub hour: Option<u8>,
    pub day: Option<u8>,
    pub month: Option<u8>,
    pub year: Option<u8>,
}

/// Time of day the storage clock is aligned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClockTriple {
    pub second: Option<u8>,
    pub minute: Option<u8>,
    pub hour: Option<u8>,
}

impl ClockTriple {
    pub fn decode_at(reader: &FieldReader<'_>, base: usize) -> Self {
        ClockTriple {
            second: reader.u8_at(base),
            minute: reader.u8_at(base + 2),
            hour: reader.u8_at(base + 4),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimestampMessage {
    pub rtc: RtcFields,
    pub storage_alignment: ClockTriple,
    pub uptime_seconds: Option<u32>,
}

impl TimestampMessage {
    pub fn decode(reader: &FieldReader<'_>) -> Self {
        let b = BODY_START;
        TimestampMessage {
            rtc: RtcFields {
                second: reader.u8_at(b),
                minute: reader.u8_at(b + 2),
                hour: reader.u8_at(b + 4),
                day: reader.u8_at(b + 6),
                month: reader.u8_at(b + 8),
                year: reader.u8_at(b + 10),
            },
            storage_alignment: ClockTriple::decode_at(reader, b + 12),
            uptime_seconds: reader.u32_swapped_at(b + 18),
        }
    }

    pub fn uptime(&self) -> Option<Uptime> {
        self.uptime_seconds.map(Uptime::from_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADER: &str = "0023033B1E0A0F031802070123050300";

    fn message(body: &str) -> (String, usize) {
        let msg = format!("{}{}", HEADER, body);
        let len = msg.len();
        (msg, len)
    }

    #[test]
    fn test_decode_sos() {
        let (msg, _) = message("05011200FD00CDAB");
        let sos = SosMessage::decode(&FieldReader::new(&msg));
        assert_eq!(sos.reboot_reason().as_deref(), Some("WDT Overflow,Power On Reset,"));
        assert_eq!(sos.good_app, Some(true));
        assert_eq!(sos.backup_write_count, Some(0x0012));
        assert_eq!(sos.copy_result_name(), Some("Err Copy Failed"));
        assert_eq!(sos.invalid_reset, Some(false));
        assert_eq!(sos.crc.as_deref(), Some("ABCD"));
    }

    #[test]
    fn test_decode_sos_truncated() {
        let (msg, _) = message("0501");
        let sos = SosMessage::decode(&FieldReader::new(&msg));
        assert_eq!(sos.reboot_flags, Some(0x05));
        assert_eq!(sos.good_app, Some(true));
        assert_eq!(sos.backup_write_count, None);
        assert_eq!(sos.crc, None);
    }

    #[test]
    fn test_decode_activated() {
        let (msg, _) = message("01F4");
        let act = ActivatedMessage::decode(&FieldReader::new(&msg));
        assert_eq!(act.total_volume, Some(500));
        assert_eq!(ActivatedMessage::decode(&FieldReader::new(HEADER)).total_volume, None);
    }

    #[test]
    fn test_decode_gps() {
        let lat = format!("{:08X}", 45_301_234);
        let lon = format!("{:08X}", -122_123_456i32);
        let body = format!("0C1E{}{}010705000078", lat, lon);
        let (msg, _) = message(&body);
        let gps = GpsLocation::decode(&FieldReader::new(&msg));
        assert_eq!(gps.hour, Some(12));
        assert_eq!(gps.minute, Some(30));
        assert_eq!(gps.latitude_text().as_deref(), Some("45 30.1234N"));
        assert_eq!(gps.longitude_text().as_deref(), Some("122 12.3456W"));
        assert_eq!(gps.fix_quality, Some(true));
        assert_eq!(gps.satellites, Some(7));
        assert_eq!(gps.hdop_text().as_deref(), Some("0.5 m"));
        assert_eq!(gps.measurement_time, Some(120));
    }

    #[test]
    fn test_decode_daily_water_log() {
        let mut body = String::new();
        for hour in 0..24u16 {
            body.push_str(&format!("{:04X}", hour * 0x20));
        }
        body.push_str("03E8"); // total
        body.push_str("0064"); // average
        body.push_str("0100"); // red flag + spare
        body.push_str("0007"); // unknown
        for pad in 0..6u16 {
            body.push_str(&format!("{:04X}", 1000 + pad));
        }
        body.push_str(&"FF".repeat(44));
        let (msg, len) = message(&body);
        assert_eq!(len, 256);

        let log = DailyWaterLog::decode(&FieldReader::new(&msg));
        assert_eq!(log.hourly.len(), 24);
        assert_eq!(log.hourly[0].label, "12 am");
        assert_eq!(log.hourly[13].label, "1 pm");
        assert_eq!(log.hourly[1].raw, 0x20);
        assert_relative_eq!(log.hourly[1].liters, 1.024);
        assert_eq!(log.total, Some(1000));
        assert_eq!(log.average, Some(100));
        assert_eq!(log.red_flag, Some(true));
        assert_eq!(log.unknown, Some(7));
        assert_eq!(log.pads[5], Some(1005));
        assert_eq!(log.reserved_ok, Some(true));
    }

    #[test]
    fn test_daily_water_log_partial() {
        let (msg, _) = message("00200040004");
        let log = DailyWaterLog::decode(&FieldReader::new(&msg));
        assert_eq!(log.hourly.len(), 2);
        assert_eq!(log.total, None);
        assert_eq!(log.pads, [None; PAD_COUNT]);
        assert_eq!(log.reserved_ok, None);
    }

    #[test]
    fn test_pour_count_liters() {
        assert_relative_eq!(pour_count_liters(0x0020), 1.024);
        assert_relative_eq!(pour_count_liters(0), 0.0);
    }

    #[test]
    fn test_decode_timestamp() {
        // 93784 s = 1 day 2:03:04, little endian
        let body = "3B1E0A0F0318 000000 586E0100";
        let (msg, _) = message(&body.replace(' ', ""));
        let ts = TimestampMessage::decode(&FieldReader::new(&msg));
        assert_eq!(ts.rtc.second, Some(59));
        assert_eq!(ts.rtc.year, Some(0x18));
        assert_eq!(ts.storage_alignment.hour, Some(0));
        assert_eq!(ts.uptime_seconds, Some(93_784));
        assert_eq!(ts.uptime().map(|u| u.to_string()).as_deref(), Some("1:02:03:04"));
    }

    #[test]
    fn test_uptime_display() {
        assert_eq!(Uptime::from_seconds(0).to_string(), "0:00:00:00");
        assert_eq!(Uptime::from_seconds(86_399).to_string(), "0:23:59:59");
    }
}
