//! Afridev2 Telemetry Protocol
//!
//! This crate decodes the fixed-layout hex messages sent by the Afridev2
//! well and pump water monitor, and encodes the short OTA commands sent back
//! to it.
//!
//! # Protocol Overview
//!
//! Every message is a run of hex text, two characters per byte. The first
//! sixteen bytes are a common header (message type, protocol id, device
//! clock, firmware version, days active); the body layout depends on the
//! message type:
//!
//! - **SOS / boot** (0x06, 0x23): reset flags and firmware copy status
//! - **Activated** (0x07): total water volume
//! - **GPS location** (0x08): position fix
//! - **Daily water log** (0x21): hourly flow and pad summary
//! - **Sensor data** (0x22): raw pad readings, in one of two layouts
//! - **OTA reply** (0x03): acknowledgement of a command, keyed by opcode
//! - **Timestamp** (0x24): RTC registers and uptime
//!
//! Fields are read by position only. A message that is too short simply
//! lacks its trailing fields.
//!
//! # Example
//!
//! ```rust
//! use afridev_protocol::{decode_message, render, Command, MessageBody};
//!
//! let decoded = decode_message("00 07 03 3B 1E 0A 0F 03 18 02 07 01 23 05 03 00 01 F4");
//! assert!(matches!(decoded.body, Some(MessageBody::Activated(_))));
//! for field in render(&decoded) {
//!     println!("{}", field);
//! }
//!
//! let cmd = Command::TransmissionRate { days: 50 };
//! assert_eq!(cmd.encode().to_string(), "07 5A A5 2A");
//! ```

mod commands;
mod constants;
mod decode;
mod error;
mod format;
mod header;
mod hex_codec;
mod messages;
mod ota;
mod render;
mod sensor;

pub use commands::*;
pub use constants::*;
pub use decode::*;
pub use error::*;
pub use format::*;
pub use header::*;
pub use hex_codec::*;
pub use messages::*;
pub use ota::*;
pub use render::*;
pub use sensor::*;
