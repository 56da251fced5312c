//! Display conventions for raw field values.
//!
//! These functions turn numbers into the strings shown to an operator. They
//! reproduce the field device tooling's conventions exactly, including a few
//! odd ones (HDOP scaling, the proportion modulo).

use crate::constants::*;
use crate::error::Result;
use crate::hex_codec::parse_hex_u32;

// ============================================================================
// Code Lookups
// ============================================================================

/// Name of a message type tag.
pub fn message_id_name(code: u8) -> &'static str {
    match code {
        MSG_TYPE_FINAL_ASSEMBLY => "Final Assembly",
        MSG_TYPE_OTA_REPLY => "OTA Reply",
        MSG_TYPE_MONTHLY_CHECK_IN => "Monthly Check-In",
        MSG_TYPE_BOOT | MSG_TYPE_SOS => "SOS (Boot Message)",
        MSG_TYPE_ACTIVATED => "Activated",
        MSG_TYPE_GPS_LOCATION => "GPS Location",
        MSG_TYPE_DAILY_WATER_LOG => "Daily Water Log",
        MSG_TYPE_SENSOR_DATA => "Sensor Data",
        MSG_TYPE_TIMESTAMP => "Timestamp",
        _ => "?",
    }
}

/// Result of the bootloader's firmware copy.
pub fn fw_copy_result(code: u8) -> &'static str {
    match code {
        FW_COPY_SUCCESS => "Success",
        FW_COPY_ERR_NO_BACKUP_IMAGE => "Err No Backup Image",
        FW_COPY_ERR_BAD_BACKUP_CRC => "Err Bad Backup CRC",
        FW_COPY_ERR_COPY_FAILED => "Err Copy Failed",
        FW_COPY_ERR_BAD_MAIN_CRC => "Err Bad Main CRC",
        _ => "Unknown",
    }
}

/// Name of a protocol id.
pub fn protocol_name(code: u8) -> &'static str {
    if code == PROTOCOL_AFRIDEV2 {
        "Afridev2"
    } else {
        "Unsupported"
    }
}

/// Name of an OTA opcode.
pub fn ota_opcode_name(code: u8) -> &'static str {
    match code {
        OTA_OP_GMT_CLOCK_SET => "GMT Clock Set",
        OTA_OP_LOCAL_OFFSET => "Local Offset",
        OTA_OP_RESET_DATA => "Reset Data",
        OTA_OP_RESET_RED_FLAG => "Reset Red Flag",
        OTA_OP_ACTIVATE_DEVICE => "Activate Device",
        OTA_OP_SILENCE_DEVICE => "Silence Device",
        OTA_OP_SET_TRANSMISSION_RATE => "Set Transmission Rate",
        OTA_OP_RESET_DEVICE => "Reset Device",
        OTA_OP_CLOCK_REQUEST => "Clock Request",
        OTA_OP_GPS_REQUEST => "GPS Request",
        OTA_OP_SET_GPS_CRITERIA => "Set GPS Criteria",
        OTA_OP_SENSOR_REQUEST => "Sensor Request",
        OTA_OP_FIRMWARE_UPGRADE => "Firmware Upgrade",
        OTA_OP_MEMORY_READ => "Memory Read",
        _ => "Unknown",
    }
}

/// Status byte of an OTA reply.
pub fn ota_status_name(code: u8) -> &'static str {
    match code {
        OTA_STATUS_SUCCESS => "Success",
        OTA_STATUS_FAILURE => "Failure",
        OTA_STATUS_UNKNOWN_REQUEST => "Unknown Request",
        _ => "?",
    }
}

/// Error reported in a firmware upgrade reply.
pub fn ota_error_name(code: u8) -> &'static str {
    match code {
        FW_UPGRADE_ERR_NONE => "None",
        FW_UPGRADE_ERR_MODEM => "Modem Error",
        FW_UPGRADE_ERR_SECTION_HEADER => "Section Header Error",
        FW_UPGRADE_ERR_PARAMETER => "Parameter Error",
        FW_UPGRADE_ERR_CRC => "CRC Error",
        FW_UPGRADE_ERR_TIMEOUT => "Timeout",
        _ => "Unknown",
    }
}

/// Name of a sensor request type.
pub fn sensor_request_name(code: u8) -> &'static str {
    match code {
        SENSOR_REQ_DATA => "Request Sensor Data",
        SENSOR_REQ_OVERWRITE_FACTORY => "Overwrite Factory",
        SENSOR_REQ_RESET_WATER_DETECT => "Reset Water Detect",
        SENSOR_REQ_SET_UNKNOWN_LIMIT => "Set Unknown Limit",
        SENSOR_REQ_REPORT_NOW => "Report Now",
        SENSOR_REQ_DOWNSPOUT_RATE => "Downspout Rate",
        SENSOR_REQ_SET_WATER_LIMIT => "Set Water Limit",
        SENSOR_REQ_SET_WAKE_TIME => "Set Wake Time",
        SENSOR_REQ_NOP_RESPONSE => "NOP Response",
        _ => "?",
    }
}

/// Decode the MSP430 IFG1 reset flags into a comma-terminated list.
pub fn reboot_reason(code: u8) -> String {
    const REASONS: [&str; 5] = [
        "WDT Overflow,",
        "Oscillator Fault,",
        "Power On Reset,",
        "External Reset,",
        "RST/NMI,",
    ];

    REASONS
        .iter()
        .enumerate()
        .filter(|(bit, _)| code & (1 << bit) != 0)
        .map(|(_, reason)| *reason)
        .collect()
}

// ============================================================================
// Position
// ============================================================================

/// Render a latitude field (8 hex chars, degrees·1e6 style fixed point).
pub fn format_latitude(raw: &str) -> Result<String> {
    Ok(format_coordinate(parse_hex_u32(raw)? as i32, 'N', 'S'))
}

/// Render a longitude field. Same layout as [`format_latitude`].
pub fn format_longitude(raw: &str) -> Result<String> {
    Ok(format_coordinate(parse_hex_u32(raw)? as i32, 'E', 'W'))
}

/// Split the decimal digits of `value` into `"<deg> <min>.<frac><dir>"`.
///
/// The last four digits are fractional minutes, the two before them whole
/// minutes and everything else degrees.
pub fn format_coordinate(value: i32, positive: char, negative: char) -> String {
    let direction = if value < 0 { negative } else { positive };
    let digits = value.unsigned_abs().to_string();

    let (degrees, rest) = if digits.len() > 6 {
        digits.split_at(digits.len() - 6)
    } else {
        ("0", digits.as_str())
    };
    let (minutes, fraction) = if rest.len() > 4 {
        rest.split_at(rest.len() - 4)
    } else {
        ("0", rest)
    };

    format!("{} {}.{:0>4}{}", degrees, minutes, fraction, direction)
}

/// Render an HDOP byte.
///
/// One digit goes after the point for two- and three-digit values; a single
/// digit is shown as `0.d`.
pub fn format_hdop(value: u8) -> String {
    let digits = value.to_string();
    match digits.len() {
        1 => format!("0.{} m", digits),
        2 => format!("{}.{} m", &digits[..1], &digits[1..]),
        _ => format!("{}.{} m", &digits[..2], &digits[2..3]),
    }
}

// ============================================================================
// Water Level Pads
// ============================================================================

/// Proportion of the top pad covered by water, in percent.
///
/// The result is taken modulo 100, so a fully covered pad that is not
/// exactly at its water target reads low. Callers rely on this value
/// matching the device tooling.
pub fn prop_percent(target_air: i32, target_water: i32, mean: i32) -> i32 {
    let pad_diff = target_air - target_water - PAD_DETECT_THRESHOLD;
    let mean_diff = target_air - mean;

    if mean_diff <= PAD_DETECT_THRESHOLD {
        return 0;
    }
    if mean == target_water {
        return 100;
    }
    if pad_diff == 0 {
        return 0;
    }
    ((mean_diff - PAD_DETECT_THRESHOLD) * 100 / pad_diff) % 100
}

/// Reclassify a pad against the midpoint of its air and water targets.
///
/// Returns `fallback_state` unchanged when the targets are unset or too
/// close together.
pub fn midpoint_state(target_air: i32, target_water: i32, mean: i32, fallback_state: u8) -> u8 {
    if target_air <= 0 || target_water <= 0 {
        return fallback_state;
    }
    let width = target_air - target_water;
    if width <= PAD_DETECT_THRESHOLD {
        return fallback_state;
    }

    let midpoint = target_water + width / 2;
    if mean >= midpoint {
        if mean == target_air {
            3
        } else {
            4
        }
    } else if mean == target_water {
        1
    } else {
        2
    }
}

/// Single-letter label for a pad state: `W`/`w` water, `A`/`a` air.
pub fn pad_state_label(state: u8) -> &'static str {
    match state {
        1 => "W",
        2 => "w",
        3 => "A",
        4 => "a",
        _ => "?",
    }
}

/// Format a 24-hour clock hour as `12 am`, `1 am`, ..., `11 pm`.
pub fn hour_label(hour: usize) -> String {
    let suffix = if hour % 24 < 12 { "am" } else { "pm" };
    let h = hour % 12;
    format!("{} {}", if h == 0 { 12 } else { h }, suffix)
}
