//! Sensor data messages (type 34).
//!
//! Two firmware generations send this message type with different layouts.
//! The extended layout adds a min/max margin byte pair to every pad record,
//! which shifts every later field. Which one applies is decided from the
//! message length by the dispatcher; the decoders here never guess.
//!
//! All multi-byte values in a sensor dump are sent least significant byte
//! first.

use serde::Serialize;

use crate::constants::PAD_COUNT;
use crate::format::{midpoint_state, pad_state_label, prop_percent};
use crate::hex_codec::FieldReader;

/// Offsets that differ between the two layouts.
#[derive(Debug, Clone, Copy)]
pub struct SensorLayout {
    /// Width of one pad record in hex chars.
    pub pad_stride: usize,
    /// Whether pad records carry min/max margin bytes.
    pub has_margins: bool,
    pub unknown_limit: usize,
    pub total_flow: usize,
    pub downspout_rate: usize,
    pub water_limit: usize,
    pub water_resets: usize,
    pub trickle_volume: usize,
    pub margin_score: Option<usize>,
}

/// Layout sent by older firmware (messages shorter than 312 chars).
pub const LEGACY_LAYOUT: SensorLayout = SensorLayout {
    pad_stride: 24,
    has_margins: false,
    unknown_limit: 236,
    total_flow: 240,
    downspout_rate: 244,
    water_limit: 248,
    water_resets: 252,
    trickle_volume: 256,
    margin_score: None,
};

/// Layout with per-pad margins (messages of 312 chars or more).
pub const EXTENDED_LAYOUT: SensorLayout = SensorLayout {
    pad_stride: 28,
    has_margins: true,
    unknown_limit: 260,
    total_flow: 264,
    downspout_rate: 268,
    water_limit: 272,
    water_resets: 276,
    trickle_volume: 280,
    margin_score: Some(284),
};

const BASELINE_START: usize = 32;
const AIR_DEVIATION_START: usize = 56;
const BASELINE_TEMP: usize = 80;
const CURRENT_TEMP: usize = 84;
const SEQUENTIAL_UNKNOWNS: usize = 88;
const PAD_RECORD_START: usize = 92;

/// Live state of one water level pad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PadReading {
    pub last_mean: u16,
    pub target_air: u16,
    pub podtemp_air: u16,
    pub target_water: u16,
    pub podtemp_water: u16,
    /// State as classified by the device.
    pub state: u8,
    pub num_samples: u8,
    pub min_margin: Option<u8>,
    pub max_margin: Option<u8>,
}

impl PadReading {
    fn decode_at(reader: &FieldReader<'_>, offset: usize, layout: &SensorLayout) -> Option<Self> {
        if !reader.has(offset, layout.pad_stride) {
            return None;
        }
        let (min_margin, max_margin) = if layout.has_margins {
            (reader.u8_at(offset + 24), reader.u8_at(offset + 26))
        } else {
            (None, None)
        };
        Some(PadReading {
            last_mean: reader.u16_swapped_at(offset)?,
            target_air: reader.u16_swapped_at(offset + 4)?,
            podtemp_air: reader.u16_swapped_at(offset + 8)?,
            target_water: reader.u16_swapped_at(offset + 12)?,
            podtemp_water: reader.u16_swapped_at(offset + 16)?,
            state: reader.u8_at(offset + 20)?,
            num_samples: reader.u8_at(offset + 22)?,
            min_margin,
            max_margin,
        })
    }

    pub fn proportion_percent(&self) -> i32 {
        prop_percent(
            i32::from(self.target_air),
            i32::from(self.target_water),
            i32::from(self.last_mean),
        )
    }

    /// State recomputed from the air/water midpoint, falling back to the
    /// device's own state.
    pub fn midpoint_state(&self) -> u8 {
        midpoint_state(
            i32::from(self.target_air),
            i32::from(self.target_water),
            i32::from(self.last_mean),
            self.state,
        )
    }

    pub fn midpoint_label(&self) -> &'static str {
        pad_state_label(self.midpoint_state())
    }

    pub fn state_label(&self) -> &'static str {
        pad_state_label(self.state)
    }
}

/// Decoded sensor dump. Identical shape for both layouts; margins and the
/// margin score are only ever present in the extended one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorData {
    pub baselines: [Option<u16>; PAD_COUNT],
    pub air_deviations: [Option<u16>; PAD_COUNT],
    pub baseline_temperature: Option<u16>,
    pub current_temperature: Option<u16>,
    pub sequential_unknowns: Option<u16>,
    pub pads: [Option<PadReading>; PAD_COUNT],
    pub unknown_limit: Option<u16>,
    pub total_flow: Option<u16>,
    pub downspout_rate: Option<u16>,
    pub water_limit: Option<u16>,
    pub water_resets: Option<u16>,
    pub trickle_volume: Option<u16>,
    pub margin_score: Option<u16>,
}

fn decode_with_layout(reader: &FieldReader<'_>, layout: &SensorLayout) -> SensorData {
    let mut baselines = [None; PAD_COUNT];
    let mut air_deviations = [None; PAD_COUNT];
    for k in 0..PAD_COUNT {
        baselines[k] = reader.u16_swapped_at(BASELINE_START + k * 4);
        air_deviations[k] = reader.u16_swapped_at(AIR_DEVIATION_START + k * 4);
    }

    let pads = std::array::from_fn(|k| {
        PadReading::decode_at(reader, PAD_RECORD_START + k * layout.pad_stride, layout)
    });

    SensorData {
        baselines,
        air_deviations,
        baseline_temperature: reader.u16_swapped_at(BASELINE_TEMP),
        current_temperature: reader.u16_swapped_at(CURRENT_TEMP),
        sequential_unknowns: reader.u16_swapped_at(SEQUENTIAL_UNKNOWNS),
        pads,
        unknown_limit: reader.u16_swapped_at(layout.unknown_limit),
        total_flow: reader.u16_swapped_at(layout.total_flow),
        downspout_rate: reader.u16_swapped_at(layout.downspout_rate),
        water_limit: reader.u16_swapped_at(layout.water_limit),
        water_resets: reader.u16_swapped_at(layout.water_resets),
        trickle_volume: reader.u16_swapped_at(layout.trickle_volume),
        margin_score: layout
            .margin_score
            .and_then(|offset| reader.u16_swapped_at(offset)),
    }
}

/// Decode a sensor dump using the legacy offsets.
pub fn decode_sensor_data_legacy(reader: &FieldReader<'_>) -> SensorData {
    decode_with_layout(reader, &LEGACY_LAYOUT)
}

/// Decode a sensor dump using the extended offsets.
pub fn decode_sensor_data_extended(reader: &FieldReader<'_>) -> SensorData {
    decode_with_layout(reader, &EXTENDED_LAYOUT)
}
