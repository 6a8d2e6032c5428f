//! Scene stream writer, the counterpart of [`Input`](crate::Input).

use byteorder::{BigEndian, WriteBytesExt};
use coin_common::Diagnostics;

const COMPONENT: &str = "Output";
const INDENT: &str = "  ";

/// Header line written in front of text scene files.
pub const ASCII_HEADER: &str = "#Inventor V2.1 ascii";
/// Header line written in front of binary scene files.
pub const BINARY_HEADER: &str = "#Inventor V2.1 binary";
/// Header line written in front of VRML 2.0 files.
pub const VRML2_HEADER: &str = "#VRML V2.0 utf8";

/// Scene stream writer.
#[derive(Debug, Default)]
pub struct Output {
    binary: bool,
    vrml2: bool,
    buffer: Vec<u8>,
    indent_level: usize,
    diagnostics: Diagnostics,
}

impl Output {
    /// Text writer.
    pub fn text() -> Self {
        Self::default()
    }

    /// Binary writer.
    pub fn binary() -> Self {
        Self {
            binary: true,
            ..Self::default()
        }
    }

    /// Mark a text writer as producing VRML 2.0.
    #[must_use]
    pub fn with_vrml2(mut self, vrml2: bool) -> Self {
        self.vrml2 = vrml2;
        self
    }

    /// True for binary writers.
    pub const fn is_binary(&self) -> bool {
        self.binary
    }

    /// True if the text header names VRML 2.0.
    pub const fn is_vrml2(&self) -> bool {
        self.vrml2
    }

    /// Write the file header.
    ///
    /// The binary header line is padded with spaces so the data after it
    /// starts on a four byte boundary. Binary files are always Inventor.
    pub fn write_header(&mut self) {
        if self.binary {
            let mut header = BINARY_HEADER.to_string();
            while (header.len() + 1) % 4 != 0 {
                header.push(' ');
            }
            header.push('\n');
            self.buffer.extend_from_slice(header.as_bytes());
        } else {
            let header = if self.vrml2 { VRML2_HEADER } else { ASCII_HEADER };
            self.buffer.extend_from_slice(header.as_bytes());
            self.buffer.extend_from_slice(b"\n\n");
        }
    }

    fn emit(&mut self, write: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) {
        if let Err(err) = write(&mut self.buffer) {
            self.diagnostics.warning(COMPONENT, None, format!("write failed: {err}"));
        }
    }

    /// Write text verbatim. Text streams only.
    pub fn write_raw(&mut self, text: &str) {
        debug_assert!(!self.binary, "raw text written to a binary stream");
        self.buffer.extend_from_slice(text.as_bytes());
    }

    /// Write a single character. Text streams only.
    pub fn write_char(&mut self, c: char) {
        let mut utf8 = [0; 4];
        self.write_raw(c.encode_utf8(&mut utf8));
    }

    /// Write a name: verbatim in text mode, as a string in binary mode.
    pub fn write_name(&mut self, name: &str) {
        if self.binary {
            self.write_binary_string(name);
        } else {
            self.write_raw(name);
        }
    }

    /// Write a string: quoted in text mode, length-prefixed in binary mode.
    pub fn write_string(&mut self, value: &str) {
        if self.binary {
            self.write_binary_string(value);
        } else {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            self.write_raw(&format!("\"{escaped}\""));
        }
    }

    fn write_binary_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_padded_bytes(value.as_bytes());
    }

    /// Write raw bytes padded with zeros to a multiple of four. Binary
    /// streams only.
    pub fn write_padded_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        let padding = bytes.len().div_ceil(4) * 4 - bytes.len();
        self.buffer.extend(std::iter::repeat_n(0, padding));
    }

    /// Write a signed 32-bit integer.
    pub fn write_i32(&mut self, value: i32) {
        if self.binary {
            self.emit(|buf| buf.write_i32::<BigEndian>(value));
        } else {
            self.write_raw(&value.to_string());
        }
    }

    /// Write an unsigned 32-bit integer; text mode uses `0x` hex.
    pub fn write_u32(&mut self, value: u32) {
        if self.binary {
            self.emit(|buf| buf.write_u32::<BigEndian>(value));
        } else {
            self.write_raw(&format!("{value:#x}"));
        }
    }

    /// Write a signed 16-bit integer (32 bits in binary mode).
    pub fn write_i16(&mut self, value: i16) {
        self.write_i32(i32::from(value));
    }

    /// Write an unsigned 16-bit integer (32 bits in binary mode).
    pub fn write_u16(&mut self, value: u16) {
        if self.binary {
            self.write_u32(u32::from(value));
        } else {
            self.write_raw(&value.to_string());
        }
    }

    /// Write a single precision float.
    pub fn write_f32(&mut self, value: f32) {
        if self.binary {
            self.emit(|buf| buf.write_f32::<BigEndian>(value));
        } else {
            self.write_raw(&value.to_string());
        }
    }

    /// Write a double precision float.
    pub fn write_f64(&mut self, value: f64) {
        if self.binary {
            self.emit(|buf| buf.write_f64::<BigEndian>(value));
        } else {
            self.write_raw(&value.to_string());
        }
    }

    /// Write floats separated by single spaces.
    pub fn write_f32_slice(&mut self, values: &[f32]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 && !self.binary {
                self.write_char(' ');
            }
            self.write_f32(*value);
        }
    }

    // ========== Indentation ==========

    /// Write the current indentation. No-op for binary streams.
    pub fn indent(&mut self) {
        if !self.binary {
            for _ in 0..self.indent_level {
                self.buffer.extend_from_slice(INDENT.as_bytes());
            }
        }
    }

    /// Increase the indentation level by one step.
    pub const fn increment_indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease the indentation level by one step.
    pub const fn decrement_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    // ========== Results ==========

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Text written so far.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Diagnostics posted while writing.
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Post a warning about a value that could not be written faithfully.
    pub fn post_warning(&mut self, component: &str, message: impl Into<String>) {
        self.diagnostics.warning(component, None, message);
    }
}
