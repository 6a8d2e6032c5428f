//! Scene stream reader.
//!
//! An [`Input`] wraps an in-memory buffer in either text or binary mode.
//! Text mode is a whitespace-separated token stream with `#` comments and
//! line tracking; binary mode is big-endian with strings stored as a `u32`
//! length followed by the bytes padded to a multiple of four.
//!
//! Every primitive read returns `None` on failure without consuming
//! anything, so callers can try one interpretation and fall back to another.
//! Callers post diagnostics through [`Input::post_error`] and friends.

use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use coin_common::{Diagnostics, ReadError};

const COMPONENT: &str = "Input";

/// Characters that terminate a non-identifier name.
const NAME_TERMINATORS: &[u8] = b"{}[],.\"'#\\";

/// Options that change how lenient the readers are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Register unknown enumeration names on the fly when the field has no
    /// legal value set, instead of failing the read.
    pub lenient_enums: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { lenient_enums: true }
    }
}

/// A saved stream position that can be restored with [`Input::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    line: usize,
}

/// Scene stream reader.
#[derive(Debug)]
pub struct Input {
    data: Vec<u8>,
    pos: usize,
    line: usize,
    binary: bool,
    vrml2: bool,
    version: f32,
    options: ReadOptions,
    diagnostics: Diagnostics,
}

impl Input {
    fn with_mode(data: Vec<u8>, binary: bool) -> Self {
        Self {
            data,
            pos: 0,
            line: 1,
            binary,
            vrml2: false,
            version: 2.1,
            options: ReadOptions::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Headerless text stream.
    pub fn from_text(text: &str) -> Self {
        Self::with_mode(text.as_bytes().to_vec(), false)
    }

    /// Headerless binary stream.
    pub fn from_binary(bytes: Vec<u8>) -> Self {
        Self::with_mode(bytes, true)
    }

    /// Stream whose mode is chosen by its header line.
    ///
    /// `#Inventor V2.1 ascii`, `#Inventor V2.1 binary` and `#VRML V2.0 utf8`
    /// are recognized. Without a header the stream is read as text.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        if !(bytes.starts_with(b"#Inventor") || bytes.starts_with(b"#VRML")) {
            let mut input = Self::with_mode(bytes, false);
            input.diagnostics.info(COMPONENT, "No file header found, reading as ASCII");
            return input;
        }

        let end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());
        let header = String::from_utf8_lossy(&bytes[..end]).into_owned();
        let mut input = Self::with_mode(bytes, header.contains("binary"));
        input.vrml2 = header.starts_with("#VRML V2.0");
        input.version = header
            .split_whitespace()
            .nth(1)
            .and_then(|v| v.trim_start_matches('V').parse().ok())
            .unwrap_or(2.1);
        input.pos = (end + 1).min(input.data.len());
        input.line = 2;
        input.diagnostics.info(COMPONENT, format!("header: {}", header.trim_end()));
        input
    }

    /// Load a file and pick the mode from its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    /// Replace the read options.
    #[must_use]
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Current read options.
    pub const fn options(&self) -> ReadOptions {
        self.options
    }

    /// True for binary streams.
    pub const fn is_binary(&self) -> bool {
        self.binary
    }

    /// True when the header announced VRML 2.0.
    pub const fn is_vrml2(&self) -> bool {
        self.vrml2
    }

    /// File format version from the header.
    pub const fn version(&self) -> f32 {
        self.version
    }

    /// Current line number (text streams).
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Diagnostics posted while reading.
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access to the diagnostics sink.
    pub const fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    // ========== Positioning ==========

    /// Remember the current position.
    pub const fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
        }
    }

    /// Put back everything read since `mark` was taken.
    pub const fn rewind(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    /// True if only whitespace and comments remain.
    pub fn at_end(&mut self) -> bool {
        if !self.binary {
            self.skip_whitespace();
        }
        self.pos >= self.data.len()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    /// Skip whitespace and `#` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek_byte() {
            if byte == b'#' {
                while let Some(b) = self.bump() {
                    if b == b'\n' {
                        break;
                    }
                }
            } else if byte.is_ascii_whitespace() {
                let _ = self.bump();
            } else {
                break;
            }
        }
    }

    // ========== Text tokens ==========

    /// Next non-whitespace character.
    pub fn read_char(&mut self) -> Option<char> {
        if !self.binary {
            self.skip_whitespace();
        }
        self.bump().map(char::from)
    }

    /// Look at the next non-whitespace character without consuming it.
    pub fn peek_char(&mut self) -> Option<char> {
        let mark = self.mark();
        let c = self.read_char();
        self.rewind(mark);
        c
    }

    /// Read a name.
    ///
    /// With `valid_ident` the name must start with a letter or underscore and
    /// continue with letters, digits or underscores. Otherwise it runs up to
    /// whitespace or a punctuation character. Binary streams store names as
    /// strings.
    pub fn read_name(&mut self, valid_ident: bool) -> Option<String> {
        if self.binary {
            return self.read_string();
        }

        let mark = self.mark();
        self.skip_whitespace();
        let start = self.pos;
        let mut end = start;
        if valid_ident {
            if self.data.get(end).is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_') {
                end += 1;
                while self.data.get(end).is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_') {
                    end += 1;
                }
            }
        } else {
            while self
                .data
                .get(end)
                .is_some_and(|&b| !b.is_ascii_whitespace() && !NAME_TERMINATORS.contains(&b))
            {
                end += 1;
            }
        }

        if end == start {
            self.rewind(mark);
            return None;
        }
        self.pos = end;
        Some(String::from_utf8_lossy(&self.data[start..end]).into_owned())
    }

    /// Read a string: quoted or a bare token in text mode, length-prefixed in
    /// binary mode.
    pub fn read_string(&mut self) -> Option<String> {
        self.read_string_until(|b| b.is_ascii_whitespace())
    }

    /// Read a name value: like [`read_string`](Self::read_string), but a
    /// bare token also ends at `,`, `]` and `}` so it can sit in a list.
    pub fn read_name_value(&mut self) -> Option<String> {
        self.read_string_until(|b| b.is_ascii_whitespace() || matches!(b, b',' | b']' | b'}'))
    }

    fn read_string_until(&mut self, stop: impl Fn(u8) -> bool) -> Option<String> {
        let mark = self.mark();
        let result = if self.binary {
            self.read_binary_string()
        } else {
            self.read_text_string(stop)
        };
        if result.is_none() {
            self.rewind(mark);
        }
        result
    }

    fn read_text_string(&mut self, stop: impl Fn(u8) -> bool) -> Option<String> {
        self.skip_whitespace();
        let mut bytes = Vec::new();
        if self.peek_byte() == Some(b'"') {
            let _ = self.bump();
            loop {
                match self.bump()? {
                    b'"' => break,
                    b'\\' => match self.bump()? {
                        escaped @ (b'"' | b'\\') => bytes.push(escaped),
                        other => bytes.extend_from_slice(&[b'\\', other]),
                    },
                    other => bytes.push(other),
                }
            }
        } else {
            while let Some(b) = self.peek_byte() {
                if stop(b) {
                    break;
                }
                bytes.push(b);
                let _ = self.bump();
            }
            if bytes.is_empty() {
                return None;
            }
        }
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_binary_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_padded_bytes(len)?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read `len` raw bytes followed by padding to a multiple of four.
    pub fn read_padded_bytes(&mut self, len: usize) -> Option<Vec<u8>> {
        let padded = len.checked_next_multiple_of(4)?;
        let end = self.pos.checked_add(padded)?;
        if end > self.data.len() {
            return None;
        }
        let bytes = self.data[self.pos..self.pos + len].to_vec();
        self.pos = end;
        Some(bytes)
    }

    /// `IS <name>` reference check (text streams only).
    ///
    /// Returns the referenced interface name and consumes both tokens, or
    /// consumes nothing.
    pub fn check_is_reference(&mut self) -> Option<String> {
        if self.binary {
            return None;
        }
        let mark = self.mark();
        if self.read_name(true).as_deref() == Some("IS") {
            if let Some(name) = self.read_name(true) {
                return Some(name);
            }
        }
        self.rewind(mark);
        None
    }

    // ========== Numbers ==========

    fn binary_read<T>(&mut self, size: usize, read: impl FnOnce(&mut Cursor<&[u8]>) -> std::io::Result<T>) -> Option<T> {
        let bytes = self.data.get(self.pos..self.pos + size)?;
        let value = read(&mut Cursor::new(bytes)).ok()?;
        self.pos += size;
        Some(value)
    }

    fn scan_integer(&mut self) -> Option<i64> {
        let mark = self.mark();
        self.skip_whitespace();
        let data = &self.data;
        let mut end = self.pos;
        let negative = match data.get(end) {
            Some(b'-') => {
                end += 1;
                true
            }
            Some(b'+') => {
                end += 1;
                false
            }
            _ => false,
        };

        let (radix, digits_start) = match (data.get(end), data.get(end + 1)) {
            (Some(b'0'), Some(b'x' | b'X')) => (16, end + 2),
            (Some(b'0'), Some(d)) if d.is_ascii_digit() => (8, end + 1),
            _ => (10, end),
        };
        let mut digits_end = digits_start;
        while data.get(digits_end).is_some_and(|&b| char::from(b).is_digit(radix)) {
            digits_end += 1;
        }

        let parsed = std::str::from_utf8(&data[digits_start..digits_end])
            .ok()
            .filter(|digits| !digits.is_empty())
            .and_then(|digits| i64::from_str_radix(digits, radix).ok());
        match parsed {
            Some(value) => {
                self.pos = digits_end;
                Some(if negative { -value } else { value })
            }
            None => {
                self.rewind(mark);
                None
            }
        }
    }

    fn scan_float(&mut self) -> Option<f64> {
        let mark = self.mark();
        self.skip_whitespace();
        let data = &self.data;
        let start = self.pos;
        let mut end = start;
        if matches!(data.get(end), Some(b'+' | b'-')) {
            end += 1;
        }

        let lower: Vec<u8> = data[end..data.len().min(end + 8)].to_ascii_lowercase();
        let special = if lower.starts_with(b"infinity") {
            Some(8)
        } else if lower.starts_with(b"inf") || lower.starts_with(b"nan") {
            Some(3)
        } else {
            None
        };

        if let Some(len) = special {
            end += len;
        } else {
            let mut digits = 0;
            while data.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
                digits += 1;
            }
            if data.get(end) == Some(&b'.') {
                end += 1;
                while data.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                    digits += 1;
                }
            }
            if digits == 0 {
                self.rewind(mark);
                return None;
            }
            if matches!(data.get(end), Some(b'e' | b'E')) {
                let mut exp_end = end + 1;
                if matches!(data.get(exp_end), Some(b'+' | b'-')) {
                    exp_end += 1;
                }
                if data.get(exp_end).is_some_and(u8::is_ascii_digit) {
                    while data.get(exp_end).is_some_and(u8::is_ascii_digit) {
                        exp_end += 1;
                    }
                    end = exp_end;
                }
            }
        }

        let parsed = std::str::from_utf8(&data[start..end])
            .ok()
            .and_then(|text| text.parse::<f64>().ok());
        match parsed {
            Some(value) => {
                self.pos = end;
                Some(value)
            }
            None => {
                self.rewind(mark);
                None
            }
        }
    }

    /// Read a signed 32-bit integer (decimal, `0x` hex or leading-zero octal).
    pub fn read_i32(&mut self) -> Option<i32> {
        if self.binary {
            return self.binary_read(4, |c| c.read_i32::<BigEndian>());
        }
        let mark = self.mark();
        let value = self.scan_integer()?;
        i32::try_from(value).ok().or_else(|| {
            self.rewind(mark);
            None
        })
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> Option<u32> {
        if self.binary {
            return self.binary_read(4, |c| c.read_u32::<BigEndian>());
        }
        let mark = self.mark();
        let value = self.scan_integer()?;
        u32::try_from(value).ok().or_else(|| {
            self.rewind(mark);
            None
        })
    }

    /// Read a signed 16-bit integer. Binary streams store it as 32 bits.
    pub fn read_i16(&mut self) -> Option<i16> {
        let mark = self.mark();
        let value = self.read_i32()?;
        i16::try_from(value).ok().or_else(|| {
            self.rewind(mark);
            None
        })
    }

    /// Read an unsigned 16-bit integer. Binary streams store it as 32 bits.
    pub fn read_u16(&mut self) -> Option<u16> {
        let mark = self.mark();
        let value = if self.binary {
            i64::from(self.read_u32()?)
        } else {
            self.scan_integer()?
        };
        u16::try_from(value).ok().or_else(|| {
            self.rewind(mark);
            None
        })
    }

    /// Read a single precision float.
    pub fn read_f32(&mut self) -> Option<f32> {
        if self.binary {
            return self.binary_read(4, |c| c.read_f32::<BigEndian>());
        }
        self.scan_float().map(|v| v as f32)
    }

    /// Read a double precision float.
    pub fn read_f64(&mut self) -> Option<f64> {
        if self.binary {
            return self.binary_read(8, |c| c.read_f64::<BigEndian>());
        }
        self.scan_float()
    }

    // ========== Diagnostics ==========

    /// Post a read error at the current line and return it for propagation.
    pub fn post_error(&mut self, component: &str, message: impl Into<String>) -> ReadError {
        let line = self.line;
        self.diagnostics.read_error(component, line, message)
    }

    /// Post a warning at the current line.
    pub fn post_warning(&mut self, component: &str, message: impl Into<String>) {
        let line = self.line;
        self.diagnostics.warning(component, Some(line), message);
    }

    /// Post the canonical end-of-stream error.
    pub fn premature_eof(&mut self, component: &str) -> ReadError {
        self.post_error(component, "Premature end of file")
    }

    /// Turn a failed primitive read into a posted error.
    ///
    /// Posts "Premature end of file" when the stream is exhausted and
    /// "Couldn't read {what}" otherwise.
    pub fn require<T>(&mut self, value: Option<T>, component: &str, what: &str) -> Result<T, ReadError> {
        match value {
            Some(value) => Ok(value),
            None if self.at_end() => Err(self.premature_eof(component)),
            None => Err(self.post_error(component, format!("Couldn't read {what}"))),
        }
    }

    /// Read the next character and fail with "Premature end of file" if there
    /// is none.
    pub fn expect_char(&mut self, component: &str) -> Result<char, ReadError> {
        match self.read_char() {
            Some(c) => Ok(c),
            None => Err(self.premature_eof(component)),
        }
    }
}
