//! Message dispatch.
//!
//! [`decode_message`] is the entry point for raw text from the device. It
//! never fails: invalid input yields an empty result and short input yields
//! whatever fields fit.

use serde::Serialize;
use tracing::{debug, trace};

use crate::constants::*;
use crate::header::MessageHeader;
use crate::hex_codec::{is_valid_hex, strip_spaces, FieldReader};
use crate::messages::{ActivatedMessage, DailyWaterLog, GpsLocation, SosMessage, TimestampMessage};
use crate::ota::OtaReply;
use crate::sensor::{decode_sensor_data_extended, decode_sensor_data_legacy, SensorData};

/// Body of a decoded message, one variant per message layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "fields", rename_all = "snake_case")]
pub enum MessageBody {
    Sos(SosMessage),
    Activated(ActivatedMessage),
    GpsLocation(GpsLocation),
    DailyWaterLog(DailyWaterLog),
    SensorDataLegacy(SensorData),
    SensorDataExtended(SensorData),
    OtaReply(OtaReply),
    Timestamp(TimestampMessage),
}

/// Result of decoding one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedMessage {
    /// The input with spaces removed.
    pub hex: String,
    /// Whether the input was valid hex.
    pub valid: bool,
    pub header: MessageHeader,
    /// `None` for unknown types, and for messages too short to carry a type.
    pub body: Option<MessageBody>,
}

impl DecodedMessage {
    /// An empty result for input that could not be read at all.
    pub fn empty(hex: String) -> Self {
        DecodedMessage {
            hex,
            ..Default::default()
        }
    }

    /// Length of the message in hex characters.
    pub fn len(&self) -> usize {
        self.hex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hex.is_empty()
    }
}

/// Decode a message from caller-supplied text. Spaces are ignored.
pub fn decode_message(input: &str) -> DecodedMessage {
    let hex = strip_spaces(input);
    if !is_valid_hex(&hex) {
        debug!(len = hex.len(), "input is not valid hex, nothing decoded");
        return DecodedMessage::empty(hex);
    }

    let reader = FieldReader::new(&hex);
    if !reader.has(2, 2) {
        trace!(len = hex.len(), "message too short for a type");
        return DecodedMessage {
            valid: true,
            ..DecodedMessage::empty(hex)
        };
    }

    let header = MessageHeader::parse(&hex);
    debug!(
        message_type = header.message_type,
        name = header.message_name(),
        len = hex.len(),
        "decoding message"
    );
    let body = decode_body(&reader, header.message_type);
    if body.is_none() {
        trace!(message_type = header.message_type, "no body decoder for type");
    }

    DecodedMessage {
        hex,
        valid: true,
        header,
        body,
    }
}

/// Pick the body decoder for a message type.
pub fn decode_body(reader: &FieldReader<'_>, message_type: u8) -> Option<MessageBody> {
    let body = match message_type {
        MSG_TYPE_OTA_REPLY => MessageBody::OtaReply(OtaReply::decode(reader)),
        MSG_TYPE_BOOT | MSG_TYPE_SOS => MessageBody::Sos(SosMessage::decode(reader)),
        MSG_TYPE_TIMESTAMP => MessageBody::Timestamp(TimestampMessage::decode(reader)),
        MSG_TYPE_ACTIVATED => MessageBody::Activated(ActivatedMessage::decode(reader)),
        MSG_TYPE_GPS_LOCATION => MessageBody::GpsLocation(GpsLocation::decode(reader)),
        MSG_TYPE_DAILY_WATER_LOG => MessageBody::DailyWaterLog(DailyWaterLog::decode(reader)),
        MSG_TYPE_SENSOR_DATA => {
            if reader.len() >= SENSOR_DATA_EXTENDED_MIN_LEN {
                trace!(len = reader.len(), "extended sensor layout");
                MessageBody::SensorDataExtended(decode_sensor_data_extended(reader))
            } else {
                trace!(len = reader.len(), "legacy sensor layout");
                MessageBody::SensorDataLegacy(decode_sensor_data_legacy(reader))
            }
        }
        _ => return None,
    };
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_empty() {
        let decoded = decode_message("00 2G 03");
        assert!(!decoded.valid);
        assert_eq!(decoded.hex, "002G03");
        assert_eq!(decoded.header, MessageHeader::default());
        assert_eq!(decoded.body, None);

        let decoded = decode_message("   ");
        assert!(!decoded.valid);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_short_input_has_type_zero() {
        for input in ["0", "00", "002"] {
            let decoded = decode_message(input);
            assert!(decoded.valid);
            assert_eq!(decoded.header.message_type, 0);
            assert_eq!(decoded.header, MessageHeader::default());
            assert_eq!(decoded.body, None);
        }
    }

    #[test]
    fn test_routes_by_type() {
        let route = |t: &str| decode_message(&format!("00{}03", t)).body;
        assert!(matches!(route("03"), Some(MessageBody::OtaReply(_))));
        assert!(matches!(route("06"), Some(MessageBody::Sos(_))));
        assert!(matches!(route("23"), Some(MessageBody::Sos(_))));
        assert!(matches!(route("24"), Some(MessageBody::Timestamp(_))));
        assert!(matches!(route("07"), Some(MessageBody::Activated(_))));
        assert!(matches!(route("08"), Some(MessageBody::GpsLocation(_))));
        assert!(matches!(route("21"), Some(MessageBody::DailyWaterLog(_))));
        assert!(matches!(route("22"), Some(MessageBody::SensorDataLegacy(_))));
        assert_eq!(route("05"), None);
        assert_eq!(route("00"), None);
    }

    #[test]
    fn test_sensor_layout_selected_by_length() {
        let short = format!("0022{}", "0".repeat(307));
        assert_eq!(short.len(), 311);
        assert!(matches!(
            decode_message(&short).body,
            Some(MessageBody::SensorDataLegacy(_))
        ));

        let long = format!("0022{}", "0".repeat(308));
        assert_eq!(long.len(), 312);
        assert!(matches!(
            decode_message(&long).body,
            Some(MessageBody::SensorDataExtended(_))
        ));
    }

    #[test]
    fn test_spaces_are_stripped() {
        let decoded = decode_message("00 07 03");
        assert!(decoded.valid);
        assert_eq!(decoded.hex, "000703");
        assert_eq!(decoded.header.protocol_id, Some(3));
    }
}
