//! Protocol constants
//!
//! Message type tags, OTA opcodes, status and result codes, and the fixed
//! layout positions shared by every Afridev2 message. Offsets are counted in
//! hex characters from the start of the message text.

// ============================================================================
// Message Types (device → host)
// ============================================================================

/// Final assembly test message.
pub const MSG_TYPE_FINAL_ASSEMBLY: u8 = 0x00;
/// Reply to an OTA command.
pub const MSG_TYPE_OTA_REPLY: u8 = 0x03;
/// Monthly check-in.
pub const MSG_TYPE_MONTHLY_CHECK_IN: u8 = 0x05;
/// Boot message sent by the bootloader. Carries no device time.
pub const MSG_TYPE_BOOT: u8 = 0x06;
/// Device activated.
pub const MSG_TYPE_ACTIVATED: u8 = 0x07;
/// GPS location fix.
pub const MSG_TYPE_GPS_LOCATION: u8 = 0x08;
/// Daily water log.
pub const MSG_TYPE_DAILY_WATER_LOG: u8 = 0x21;
/// Sensor data dump (two layouts, selected by length).
pub const MSG_TYPE_SENSOR_DATA: u8 = 0x22;
/// Boot message sent by the application.
pub const MSG_TYPE_SOS: u8 = 0x23;
/// Timestamp / uptime report.
pub const MSG_TYPE_TIMESTAMP: u8 = 0x24;

// ============================================================================
// Protocol
// ============================================================================

/// Protocol id carried by every Afridev2 message.
pub const PROTOCOL_AFRIDEV2: u8 = 3;

// ============================================================================
// OTA Opcodes (host → device, echoed in OTA replies)
// ============================================================================

/// Set the GMT clock by offset.
pub const OTA_OP_GMT_CLOCK_SET: u8 = 0x01;
/// Align the storage clock to local midnight.
pub const OTA_OP_LOCAL_OFFSET: u8 = 0x02;
/// Reset stored water data.
pub const OTA_OP_RESET_DATA: u8 = 0x03;
/// Clear the red flag.
pub const OTA_OP_RESET_RED_FLAG: u8 = 0x04;
/// Activate the device.
pub const OTA_OP_ACTIVATE_DEVICE: u8 = 0x05;
/// Silence the device.
pub const OTA_OP_SILENCE_DEVICE: u8 = 0x06;
/// Set the daily log transmission rate.
pub const OTA_OP_SET_TRANSMISSION_RATE: u8 = 0x07;
/// Reboot the device.
pub const OTA_OP_RESET_DEVICE: u8 = 0x08;
/// Report the storage clock.
pub const OTA_OP_CLOCK_REQUEST: u8 = 0x0C;
/// Request a GPS fix.
pub const OTA_OP_GPS_REQUEST: u8 = 0x0D;
/// Set GPS measurement criteria.
pub const OTA_OP_SET_GPS_CRITERIA: u8 = 0x0E;
/// Sensor request (see `SENSOR_REQ_*`).
pub const OTA_OP_SENSOR_REQUEST: u8 = 0x0F;
/// Firmware upgrade.
pub const OTA_OP_FIRMWARE_UPGRADE: u8 = 0x10;
/// Memory read.
pub const OTA_OP_MEMORY_READ: u8 = 0x1F;

// ============================================================================
// OTA Reply Status
// ============================================================================

/// Command applied.
pub const OTA_STATUS_SUCCESS: u8 = 0x01;
/// Command rejected or failed.
pub const OTA_STATUS_FAILURE: u8 = 0xFF;
/// Opcode not recognised by the device.
pub const OTA_STATUS_UNKNOWN_REQUEST: u8 = 0xFE;

// ============================================================================
// Firmware Copy Results (boot message)
// ============================================================================

/// Backup image copied to main flash.
pub const FW_COPY_SUCCESS: u8 = 0x00;
/// No backup image present.
pub const FW_COPY_ERR_NO_BACKUP_IMAGE: u8 = 0xFF;
/// Backup image failed its CRC check.
pub const FW_COPY_ERR_BAD_BACKUP_CRC: u8 = 0xFE;
/// Flash copy did not complete.
pub const FW_COPY_ERR_COPY_FAILED: u8 = 0xFD;
/// Main image failed its CRC check after the copy.
pub const FW_COPY_ERR_BAD_MAIN_CRC: u8 = 0xFC;

// ============================================================================
// Firmware Upgrade Errors (OTA reply 0x10)
// ============================================================================

/// Upgrade accepted.
pub const FW_UPGRADE_ERR_NONE: u8 = 0x00;
/// Modem error while receiving the image.
pub const FW_UPGRADE_ERR_MODEM: u8 = 0xFF;
/// Malformed section header.
pub const FW_UPGRADE_ERR_SECTION_HEADER: u8 = 0xFE;
/// Bad upgrade parameter.
pub const FW_UPGRADE_ERR_PARAMETER: u8 = 0xFD;
/// Image CRC mismatch.
pub const FW_UPGRADE_ERR_CRC: u8 = 0xFC;
/// Image transfer timed out.
pub const FW_UPGRADE_ERR_TIMEOUT: u8 = 0xFB;

// ============================================================================
// Sensor Request Types (OTA 0x0F payload)
// ============================================================================

/// Send a sensor data message.
pub const SENSOR_REQ_DATA: u8 = 0;
/// Overwrite the factory pad calibration.
pub const SENSOR_REQ_OVERWRITE_FACTORY: u8 = 1;
/// Restart water detection.
pub const SENSOR_REQ_RESET_WATER_DETECT: u8 = 2;
/// Set the unknown-state limit (16-bit value).
pub const SENSOR_REQ_SET_UNKNOWN_LIMIT: u8 = 3;
/// Report sensor data immediately.
pub const SENSOR_REQ_REPORT_NOW: u8 = 4;
/// Report the downspout rate.
pub const SENSOR_REQ_DOWNSPOUT_RATE: u8 = 5;
/// Set the water limit (16-bit value).
pub const SENSOR_REQ_SET_WATER_LIMIT: u8 = 6;
/// Set the wake time. Reply only.
pub const SENSOR_REQ_SET_WAKE_TIME: u8 = 7;
/// No-op acknowledgement. Reply only.
pub const SENSOR_REQ_NOP_RESPONSE: u8 = 8;

// ============================================================================
// Layout
// ============================================================================

/// Offset of the first body field (byte 16).
pub const BODY_START: usize = 32;
/// Offset of the opcode-specific payload in an OTA reply.
pub const OTA_PAYLOAD_START: usize = 40;
/// Sensor data messages at least this long use the extended layout.
pub const SENSOR_DATA_EXTENDED_MIN_LEN: usize = 312;
/// Number of water level pads.
pub const PAD_COUNT: usize = 6;
/// Hourly readings in a daily water log.
pub const HOURS_PER_DAY: usize = 24;

// ============================================================================
// Water Detection
// ============================================================================

/// Minimum air/water separation (in sensor counts) before a pad reading
/// is treated as meaningful.
pub const PAD_DETECT_THRESHOLD: i32 = 450;
/// Milliliters of flow per raw pour count in the daily log.
pub const MILLILITERS_PER_COUNT: f32 = 32.0;

// ============================================================================
// Outbound Commands
// ============================================================================

/// Message id bytes that follow the opcode in every command.
pub const COMMAND_MESSAGE_ID: [u8; 2] = [0x5A, 0xA5];

/// Upper bound for the transmission rate in days.
pub const MAX_TRANSMISSION_DAYS: u16 = 42;
/// Fewest satellites a GPS fix may require.
pub const MIN_GPS_SATELLITES: u8 = 4;
/// Most satellites a GPS fix may require.
pub const MAX_GPS_SATELLITES: u8 = 8;
/// Lowest HDOP limit, in tenths.
pub const MIN_GPS_HDOP: u8 = 10;
/// Highest HDOP limit, in tenths.
pub const MAX_GPS_HDOP: u8 = 200;
/// Longest GPS measurement time in seconds.
pub const MAX_GPS_MEASUREMENT_TIME: u16 = 600;
/// Largest timezone offset magnitude in hours.
pub const MAX_TIMEZONE_HOURS: i32 = 23;
