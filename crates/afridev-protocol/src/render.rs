//! Turning decoded records into labelled display strings.
//!
//! Decoding and display are separate steps: the decoders produce numbers,
//! this module applies the display conventions from [`crate::format`].
//! Absent fields are left out of the listing.

use serde::Serialize;
use std::fmt;

use crate::decode::{DecodedMessage, MessageBody};
use crate::format::{format_coordinate, fw_copy_result, reboot_reason};
use crate::header::MessageHeader;
use crate::messages::{
    ActivatedMessage, ClockTriple, DailyWaterLog, GpsLocation, SosMessage, TimestampMessage,
};
use crate::ota::{OtaPayload, OtaReply};
use crate::sensor::SensorData;

/// One labelled value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Display settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    /// Hours added to the device GMT time to show local time.
    pub timezone_hours: i32,
}

#[derive(Default)]
struct Fields(Vec<Field>);

impl Fields {
    fn push(&mut self, label: impl Into<String>, value: impl fmt::Display) {
        self.0.push(Field {
            label: label.into(),
            value: value.to_string(),
        });
    }

    fn opt<T: fmt::Display>(&mut self, label: impl Into<String>, value: Option<T>) {
        if let Some(v) = value {
            self.push(label, v);
        }
    }

    fn flag(&mut self, label: impl Into<String>, value: Option<bool>) {
        self.opt(label, value.map(|b| if b { "yes" } else { "no" }));
    }

    fn clock(&mut self, prefix: &str, clock: &ClockTriple) {
        self.opt(format!("{} Hour", prefix), clock.hour);
        self.opt(format!("{} Minute", prefix), clock.minute);
        self.opt(format!("{} Second", prefix), clock.second);
    }
}

impl Renderer {
    pub fn new(timezone_hours: i32) -> Self {
        Renderer { timezone_hours }
    }

    /// Render a whole decoded message.
    pub fn render(&self, message: &DecodedMessage) -> Vec<Field> {
        let mut out = Fields::default();
        if !message.valid {
            return out.0;
        }
        self.header(&mut out, &message.header);
        match &message.body {
            Some(MessageBody::Sos(sos)) => sos_fields(&mut out, sos),
            Some(MessageBody::Activated(act)) => activated_fields(&mut out, act),
            Some(MessageBody::GpsLocation(gps)) => gps_fields(&mut out, gps),
            Some(MessageBody::DailyWaterLog(log)) => daily_log_fields(&mut out, log),
            Some(MessageBody::SensorDataLegacy(data)) => {
                out.push("Sensor Layout", "legacy");
                sensor_fields(&mut out, data);
            }
            Some(MessageBody::SensorDataExtended(data)) => {
                out.push("Sensor Layout", "extended");
                sensor_fields(&mut out, data);
            }
            Some(MessageBody::OtaReply(reply)) => ota_fields(&mut out, reply),
            Some(MessageBody::Timestamp(ts)) => timestamp_fields(&mut out, ts),
            None => {}
        }
        out.0
    }

    fn header(&self, out: &mut Fields, header: &MessageHeader) {
        out.push(
            "Message Type",
            format!("0x{:02X} {}", header.message_type, header.message_name()),
        );
        out.opt("Protocol", header.protocol_name());
        out.opt("GMT Time", header.device_time);
        out.opt("Local Time", header.local_time(self.timezone_hours));
        out.opt("Firmware Version", header.firmware_version);
        out.opt("Days Active", header.days_active);
        out.opt("Week", header.week);
        out.opt("Day", header.day);
    }
}

/// Render with default settings.
pub fn render(message: &DecodedMessage) -> Vec<Field> {
    Renderer::default().render(message)
}

fn sos_fields(out: &mut Fields, sos: &SosMessage) {
    out.opt("Reboot Reason", sos.reboot_flags.map(reboot_reason));
    out.flag("Good App", sos.good_app);
    out.opt("Firmware Backup Count", sos.backup_write_count);
    out.opt("Firmware Copy Result", sos.copy_result.map(fw_copy_result));
    out.flag("Firmware Invalid Reset", sos.invalid_reset);
    out.opt("CRC", sos.crc.as_deref());
}

fn activated_fields(out: &mut Fields, act: &ActivatedMessage) {
    out.opt(
        "Total Water Volume",
        act.total_volume.map(|v| format!("{} liters", v)),
    );
}

fn gps_fields(out: &mut Fields, gps: &GpsLocation) {
    out.opt("GPS Hour", gps.hour);
    out.opt("GPS Minute", gps.minute);
    out.opt("Latitude", gps.latitude.map(|v| format_coordinate(v, 'N', 'S')));
    out.opt("Longitude", gps.longitude.map(|v| format_coordinate(v, 'E', 'W')));
    out.flag("Fix Quality", gps.fix_quality);
    out.opt("Satellites", gps.satellites);
    out.opt("HDOP", gps.hdop_text());
    out.opt(
        "Measurement Time",
        gps.measurement_time.map(|t| format!("{} sec", t)),
    );
}

fn daily_log_fields(out: &mut Fields, log: &DailyWaterLog) {
    for hour in &log.hourly {
        out.push(format!("Liters {}", hour.label), hour.liters);
    }
    out.opt("Total", log.total);
    out.opt("Average", log.average);
    out.flag("Red Flag", log.red_flag);
    out.opt("Unknown", log.unknown);
    for (k, pad) in log.pads.iter().enumerate() {
        out.opt(format!("Pad {}", k), *pad);
    }
    out.flag("Reserved OK", log.reserved_ok);
}

fn sensor_fields(out: &mut Fields, data: &SensorData) {
    for (k, v) in data.baselines.iter().enumerate() {
        out.opt(format!("Pad {} Baseline", k), *v);
    }
    for (k, v) in data.air_deviations.iter().enumerate() {
        out.opt(format!("Pad {} Air Deviation", k), *v);
    }
    out.opt("Baseline Temperature", data.baseline_temperature);
    out.opt("Current Temperature", data.current_temperature);
    out.opt("Sequential Unknowns", data.sequential_unknowns);

    for (k, pad) in data.pads.iter().enumerate() {
        let Some(pad) = pad else { continue };
        out.push(format!("Pad {} Last Mean", k), pad.last_mean);
        out.push(format!("Pad {} Target Air", k), pad.target_air);
        out.push(format!("Pad {} Air Temp", k), pad.podtemp_air);
        out.push(format!("Pad {} Target Water", k), pad.target_water);
        out.push(format!("Pad {} Water Temp", k), pad.podtemp_water);
        out.push(format!("Pad {} State", k), pad.state_label());
        out.push(format!("Pad {} Samples", k), pad.num_samples);
        out.opt(format!("Pad {} Min Margin", k), pad.min_margin);
        out.opt(format!("Pad {} Max Margin", k), pad.max_margin);
        out.push(format!("Pad {} Percent", k), pad.proportion_percent());
        out.push(format!("Pad {} Midpoint", k), pad.midpoint_label());
    }

    out.opt("Unknown Limit", data.unknown_limit);
    out.opt("Total Flow", data.total_flow);
    out.opt("Downspout Rate", data.downspout_rate);
    out.opt("Water Limit", data.water_limit);
    out.opt("Water Resets", data.water_resets);
    out.opt("Trickle Volume", data.trickle_volume);
    out.opt("Margin Score", data.margin_score);
}

fn ota_fields(out: &mut Fields, reply: &OtaReply) {
    out.opt("OTA Opcode", reply.opcode_name());
    out.opt("Message Number", reply.message_number.as_deref());
    out.opt("Status", reply.status_name());

    let Some(payload) = &reply.payload else {
        return;
    };
    match payload {
        OtaPayload::ClockSet {
            accepted,
            seconds,
            minutes,
            hours,
            days,
        } => {
            out.flag("Accepted", *accepted);
            out.opt("Seconds", *seconds);
            out.opt("Minutes", *minutes);
            out.opt("Hours", *hours);
            out.opt("Days", *days);
        }
        OtaPayload::LocalOffset { offset, storage } => {
            out.clock("Offset", offset);
            out.clock("Storage", storage);
        }
        OtaPayload::Acknowledged | OtaPayload::Unrecognized => {}
        OtaPayload::TransmissionRate { days } => out.opt("Transmission Days", *days),
        OtaPayload::ClockRequest {
            storage,
            day_of_week,
            week,
            aligned,
            alignment,
        } => {
            out.clock("Storage", storage);
            out.opt("Day of Week", *day_of_week);
            out.opt("Week", *week);
            out.flag("Aligned", *aligned);
            out.clock("Alignment", alignment);
        }
        OtaPayload::GpsRequest(gps) => gps_fields(out, gps),
        OtaPayload::GpsCriteria {
            satellites,
            hdop,
            measurement_time,
        } => {
            out.opt("Satellites", *satellites);
            out.opt("HDOP Limit", *hdop);
            out.opt("Measurement Time", measurement_time.map(|t| format!("{} sec", t)));
        }
        OtaPayload::SensorRequest { data, .. } => {
            out.opt("Request Type", payload.request_name());
            out.opt("Request Data", *data);
        }
        OtaPayload::FirmwareUpgrade {
            message_crc,
            calculated_crc,
            ..
        } => {
            out.opt("Error", payload.error_name());
            out.opt("Message CRC", message_crc.as_deref());
            out.opt("Calculated CRC", calculated_crc.as_deref());
        }
        OtaPayload::MemoryRead {
            address,
            length,
            width,
            data,
        } => {
            out.opt("Address", address.map(|a| format!("0x{:04X}", a)));
            out.opt("Length", *length);
            out.opt("Width", *width);
            out.opt("Data", data.as_deref());
        }
    }
}

fn timestamp_fields(out: &mut Fields, ts: &TimestampMessage) {
    out.opt("RTC Second", ts.rtc.second);
    out.opt("RTC Minute", ts.rtc.minute);
    out.opt("RTC Hour", ts.rtc.hour);
    out.opt("RTC Day", ts.rtc.day);
    out.opt("RTC Month", ts.rtc.month);
    out.opt("RTC Year", ts.rtc.year);
    out.clock("Storage", &ts.storage_alignment);
    out.opt("Uptime", ts.uptime());
}
