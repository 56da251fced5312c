//! Hex text helpers.
//!
//! Messages arrive as text: every byte is two hex characters and every field
//! offset in this crate is a *hex-character* offset, not a byte offset. A
//! field that runs past the end of the text is absent, never an error.
//!
//! Some 16- and 32-bit values are sent least significant byte first. Those are
//! read by reversing the byte groups of the field text before parsing.

use crate::error::{FormatError, Result};

/// Returns true iff `text` is non-empty and contains only `[0-9a-fA-F]`.
///
/// Spaces are not accepted here; strip them first with [`strip_spaces`].
pub fn is_valid_hex(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Remove every space character from caller-supplied text.
pub fn strip_spaces(text: &str) -> String {
    text.chars().filter(|c| *c != ' ').collect()
}

/// Parse a hex substring (case-insensitive) as an unsigned integer.
pub fn parse_hex_u32(text: &str) -> Result<u32> {
    if !is_valid_hex(text) {
        return Err(FormatError::invalid_digits(text));
    }
    u32::from_str_radix(text, 16).map_err(|_| FormatError::invalid_digits(text))
}

/// Reverse the order of the two-character byte groups in `text`.
fn reverse_byte_groups(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(2).rev().flatten().collect()
}

/// Swap the two byte groups of a 4-character field (`"3412"` → `"1234"`).
pub fn swap_byte_pair(text: &str) -> String {
    reverse_byte_groups(text)
}

/// Reverse the four byte groups of an 8-character field
/// (`"78563412"` → `"12345678"`).
pub fn swap_byte_quad(text: &str) -> String {
    reverse_byte_groups(text)
}

/// Return the `length` characters starting at `start`, or `None` when the
/// message is too short to contain them.
pub fn slice_field(message: &str, start: usize, length: usize) -> Option<&str> {
    field(message, start, length).ok()
}

/// Like [`slice_field`] but reports why the field could not be taken.
pub fn field(message: &str, start: usize, length: usize) -> Result<&str> {
    let end = start
        .checked_add(length)
        .ok_or_else(|| FormatError::absent(start, length))?;
    if end > message.len() {
        return Err(FormatError::absent(start, length));
    }
    message
        .get(start..end)
        .ok_or_else(|| FormatError::invalid_digits(message))
}

/// Read and parse a field in one step.
pub fn parse_field(message: &str, start: usize, length: usize) -> Result<u32> {
    parse_hex_u32(field(message, start, length)?)
}

/// Group hex text into space-separated byte pairs (`"075AA52A"` →
/// `"07 5A A5 2A"`). An odd trailing character forms its own group.
pub fn space_bytes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True iff `text` is non-empty and every character is `f` or `F`.
pub fn is_all_ff(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == 'f' || c == 'F')
}

/// Typed, position-based access to the fields of a validated message.
///
/// Every accessor returns `None` when the field lies (partly) past the end of
/// the message.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    message: &'a str,
}

impl<'a> FieldReader<'a> {
    /// Wrap message text. The text should already be space-stripped.
    pub fn new(message: &'a str) -> Self {
        FieldReader { message }
    }

    /// Length of the message in hex characters.
    pub fn len(&self) -> usize {
        self.message.len()
    }

    /// Whether the message is empty.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// The raw message text.
    pub fn as_str(&self) -> &'a str {
        self.message
    }

    /// Raw field text.
    pub fn hex_at(&self, offset: usize, length: usize) -> Option<&'a str> {
        slice_field(self.message, offset, length)
    }

    /// Whether `length` characters at `offset` are all present.
    pub fn has(&self, offset: usize, length: usize) -> bool {
        self.hex_at(offset, length).is_some()
    }

    /// Field of any width parsed in wire order.
    pub fn value_at(&self, offset: usize, length: usize) -> Option<u32> {
        parse_field(self.message, offset, length).ok()
    }

    /// One byte.
    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.value_at(offset, 2).map(|v| v as u8)
    }

    /// One byte interpreted as a flag (nonzero → true).
    pub fn flag_at(&self, offset: usize) -> Option<bool> {
        self.u8_at(offset).map(|v| v != 0)
    }

    /// 16-bit value, most significant byte first.
    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        self.value_at(offset, 4).map(|v| v as u16)
    }

    /// 16-bit value, least significant byte first.
    pub fn u16_swapped_at(&self, offset: usize) -> Option<u16> {
        let swapped = swap_byte_pair(self.hex_at(offset, 4)?);
        parse_hex_u32(&swapped).ok().map(|v| v as u16)
    }

    /// 16-bit field with its bytes swapped, kept as text.
    pub fn swapped_hex_at(&self, offset: usize) -> Option<String> {
        self.hex_at(offset, 4).map(swap_byte_pair)
    }

    /// 32-bit value, least significant byte first.
    pub fn u32_swapped_at(&self, offset: usize) -> Option<u32> {
        let swapped = swap_byte_quad(self.hex_at(offset, 8)?);
        parse_hex_u32(&swapped).ok()
    }

    /// Signed 32-bit value (two's complement), most significant byte first.
    pub fn i32_at(&self, offset: usize) -> Option<i32> {
        self.value_at(offset, 8).map(|v| v as i32)
    }
}
