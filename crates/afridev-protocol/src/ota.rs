//! OTA reply messages (type 3).
//!
//! Every reply echoes the opcode of the command it answers, a message
//! number and a status byte. The rest of the message depends on the opcode.
//!
//! ```text
//! chars  32..34  opcode
//!        34..38  message number (raw)
//!        38..40  status
//!        40..    opcode payload
//! ```

use serde::Serialize;

use crate::constants::*;
use crate::format::{ota_error_name, ota_opcode_name, ota_status_name, sensor_request_name};
use crate::hex_codec::FieldReader;
use crate::messages::{ClockTriple, GpsLocation};

/// Payload of an OTA reply, by opcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OtaPayload {
    /// 0x01: the clock offset the device applied.
    ClockSet {
        accepted: Option<bool>,
        seconds: Option<u8>,
        minutes: Option<u8>,
        hours: Option<u8>,
        days: Option<u16>,
    },
    /// 0x02: local offset applied and the new storage time.
    LocalOffset {
        offset: ClockTriple,
        storage: ClockTriple,
    },
    /// 0x03, 0x04, 0x05, 0x06, 0x08: no payload.
    Acknowledged,
    /// 0x07
    TransmissionRate { days: Option<u8> },
    /// 0x0C: current storage clock and alignment.
    ClockRequest {
        storage: ClockTriple,
        day_of_week: Option<u8>,
        week: Option<u8>,
        aligned: Option<bool>,
        alignment: ClockTriple,
    },
    /// 0x0D: a GPS fix at the payload start.
    GpsRequest(GpsLocation),
    /// 0x0E
    GpsCriteria {
        satellites: Option<u8>,
        hdop: Option<u8>,
        measurement_time: Option<u16>,
    },
    /// 0x0F
    SensorRequest {
        request_type: Option<u8>,
        data: Option<u16>,
    },
    /// 0x10
    FirmwareUpgrade {
        error: Option<u8>,
        message_crc: Option<String>,
        calculated_crc: Option<String>,
    },
    /// 0x1F: a block of device memory.
    MemoryRead {
        address: Option<u16>,
        length: Option<u8>,
        width: Option<u8>,
        /// Whatever follows the read header, as hex text.
        data: Option<String>,
    },
    /// Any other opcode.
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OtaReply {
    pub opcode: Option<u8>,
    /// Message number as sent, not interpreted.
    pub message_number: Option<String>,
    pub status: Option<u8>,
    /// Present whenever the opcode is.
    pub payload: Option<OtaPayload>,
}

impl OtaReply {
    pub fn decode(reader: &FieldReader<'_>) -> Self {
        let opcode = reader.u8_at(BODY_START);
        OtaReply {
            opcode,
            message_number: reader.hex_at(BODY_START + 2, 4).map(str::to_string),
            status: reader.u8_at(BODY_START + 6),
            payload: opcode.map(|op| decode_payload(reader, op)),
        }
    }

    pub fn opcode_name(&self) -> Option<&'static str> {
        self.opcode.map(ota_opcode_name)
    }

    pub fn status_name(&self) -> Option<&'static str> {
        self.status.map(ota_status_name)
    }
}

impl OtaPayload {
    /// Label of the firmware upgrade error, if this is an upgrade reply.
    pub fn error_name(&self) -> Option<&'static str> {
        match self {
            OtaPayload::FirmwareUpgrade { error, .. } => error.map(ota_error_name),
            _ => None,
        }
    }

    /// Label of the sensor request type, if this is a sensor request reply.
    pub fn request_name(&self) -> Option<&'static str> {
        match self {
            OtaPayload::SensorRequest { request_type, .. } => request_type.map(sensor_request_name),
            _ => None,
        }
    }
}

fn decode_payload(reader: &FieldReader<'_>, opcode: u8) -> OtaPayload {
    let p = OTA_PAYLOAD_START;
    match opcode {
        OTA_OP_GMT_CLOCK_SET => OtaPayload::ClockSet {
            accepted: reader.flag_at(p),
            seconds: reader.u8_at(p + 2),
            minutes: reader.u8_at(p + 4),
            hours: reader.u8_at(p + 6),
            days: reader.u16_at(p + 8),
        },
        OTA_OP_LOCAL_OFFSET => OtaPayload::LocalOffset {
            offset: ClockTriple::decode_at(reader, p),
            storage: ClockTriple::decode_at(reader, p + 6),
        },
        OTA_OP_RESET_DATA
        | OTA_OP_RESET_RED_FLAG
        | OTA_OP_ACTIVATE_DEVICE
        | OTA_OP_SILENCE_DEVICE
        | OTA_OP_RESET_DEVICE => OtaPayload::Acknowledged,
        OTA_OP_SET_TRANSMISSION_RATE => OtaPayload::TransmissionRate {
            days: reader.u8_at(p),
        },
        OTA_OP_CLOCK_REQUEST => OtaPayload::ClockRequest {
            storage: ClockTriple::decode_at(reader, p),
            day_of_week: reader.u8_at(p + 6),
            week: reader.u8_at(p + 8),
            aligned: reader.flag_at(p + 10),
            alignment: ClockTriple::decode_at(reader, p + 12),
        },
        OTA_OP_GPS_REQUEST => OtaPayload::GpsRequest(GpsLocation::decode_at(reader, p)),
        OTA_OP_SET_GPS_CRITERIA => OtaPayload::GpsCriteria {
            satellites: reader.u8_at(p),
            hdop: reader.u8_at(p + 2),
            measurement_time: reader.u16_at(p + 4),
        },
        OTA_OP_SENSOR_REQUEST => OtaPayload::SensorRequest {
            request_type: reader.u8_at(p),
            data: reader.u16_swapped_at(p + 2),
        },
        OTA_OP_FIRMWARE_UPGRADE => OtaPayload::FirmwareUpgrade {
            error: reader.u8_at(p),
            message_crc: reader.hex_at(p + 2, 4).map(str::to_string),
            calculated_crc: reader.hex_at(p + 6, 4).map(str::to_string),
        },
        OTA_OP_MEMORY_READ => OtaPayload::MemoryRead {
            address: reader.u16_at(p),
            length: reader.u8_at(p + 4),
            width: reader.u8_at(p + 6),
            data: reader
                .as_str()
                .get(p + 8..)
                .filter(|rest| !rest.is_empty())
                .map(str::to_string),
        },
        _ => OtaPayload::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "0003033B1E0A0F031802070123050300";

    fn decode(body: &str) -> OtaReply {
        let msg = format!("{}{}", HEADER, body);
        OtaReply::decode(&FieldReader::new(&msg))
    }

    #[test]
    fn test_common_fields() {
        let reply = decode("07001201");
        assert_eq!(reply.opcode_name(), Some("Set Transmission Rate"));
        assert_eq!(reply.message_number.as_deref(), Some("0012"));
        assert_eq!(reply.status_name(), Some("Success"));
        assert_eq!(reply.payload, Some(OtaPayload::TransmissionRate { days: None }));
    }

    #[test]
    fn test_clock_set() {
        let reply = decode("0100010101050A03002A");
        assert_eq!(
            reply.payload,
            Some(OtaPayload::ClockSet {
                accepted: Some(true),
                seconds: Some(5),
                minutes: Some(10),
                hours: Some(3),
                days: Some(42),
            })
        );
    }

    #[test]
    fn test_local_offset() {
        let reply = decode("02000201001E050000");
        match reply.payload {
            Some(OtaPayload::LocalOffset { offset, storage }) => {
                assert_eq!(offset.minute, Some(0x1E));
                assert_eq!(offset.hour, Some(5));
                assert_eq!(storage.second, Some(0));
                assert_eq!(storage.hour, None);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_acknowledged() {
        for op in ["03", "04", "05", "06", "08"] {
            let reply = decode(&format!("{}000101", op));
            assert_eq!(reply.payload, Some(OtaPayload::Acknowledged));
        }
    }

    #[test]
    fn test_clock_request() {
        let reply = decode("0C00040100000C0302010000");
        match reply.payload {
            Some(OtaPayload::ClockRequest { storage, day_of_week, week, aligned, alignment }) => {
                assert_eq!(storage.hour, Some(12));
                assert_eq!(day_of_week, Some(3));
                assert_eq!(week, Some(2));
                assert_eq!(aligned, Some(true));
                assert_eq!(alignment.second, Some(0));
                assert_eq!(alignment.hour, None);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_gps_request_uses_payload_offset() {
        let lat = format!("{:08X}", 45_301_234);
        let lon = format!("{:08X}", 36_500_000);
        let reply = decode(&format!("0D000501 0C1E{}{}0107190000 3C", lat, lon).replace(' ', ""));
        match reply.payload {
            Some(OtaPayload::GpsRequest(gps)) => {
                assert_eq!(gps.hour, Some(12));
                assert_eq!(gps.latitude_text().as_deref(), Some("45 30.1234N"));
                assert_eq!(gps.longitude_text().as_deref(), Some("36 50.0000E"));
                assert_eq!(gps.hdop_text().as_deref(), Some("2.5 m"));
                assert_eq!(gps.measurement_time, Some(60));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_gps_criteria() {
        let reply = decode("0E000601061E003C");
        assert_eq!(
            reply.payload,
            Some(OtaPayload::GpsCriteria {
                satellites: Some(6),
                hdop: Some(30),
                measurement_time: Some(60),
            })
        );
    }

    #[test]
    fn test_sensor_request() {
        let reply = decode("0F000701068403");
        let payload = reply.payload.unwrap();
        assert_eq!(payload.request_name(), Some("Set Water Limit"));
        assert_eq!(
            payload,
            OtaPayload::SensorRequest {
                request_type: Some(6),
                data: Some(900),
            }
        );
    }

    #[test]
    fn test_firmware_upgrade() {
        let reply = decode("100008FFFC12341235");
        assert_eq!(reply.status_name(), Some("Failure"));
        let payload = reply.payload.unwrap();
        assert_eq!(payload.error_name(), Some("CRC Error"));
        assert_eq!(
            payload,
            OtaPayload::FirmwareUpgrade {
                error: Some(0xFC),
                message_crc: Some("1234".to_string()),
                calculated_crc: Some("1235".to_string()),
            }
        );
    }

    #[test]
    fn test_memory_read() {
        let reply = decode("1F0009011000040101020304");
        assert_eq!(
            reply.payload,
            Some(OtaPayload::MemoryRead {
                address: Some(0x1000),
                length: Some(4),
                width: Some(1),
                data: Some("01020304".to_string()),
            })
        );
    }

    #[test]
    fn test_unrecognized_and_missing() {
        let reply = decode("2A000AFE");
        assert_eq!(reply.opcode_name(), Some("Unknown"));
        assert_eq!(reply.status_name(), Some("Unknown Request"));
        assert_eq!(reply.payload, Some(OtaPayload::Unrecognized));

        let reply = OtaReply::decode(&FieldReader::new(HEADER));
        assert_eq!(reply, OtaReply::default());
    }
}
