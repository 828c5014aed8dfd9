//! GZIP header record, incremental parser and writer (RFC 1952).
//!
//! The header is parsed strictly byte-by-byte so the Inflater can suspend at
//! any point inside it: every optional field keeps its own progress state and
//! the same parser serves input arriving in any granularity. After parsing
//! completes the finalized [`GzipHeader`] is available from the engine for
//! informational retrieval and never changes again.
//!
//! The optional header CRC16 is the low 16 bits of a CRC-32 over every
//! header byte that precedes it.

use oxiflate_core::bitstream::{BitReader, InputCursor};
use oxiflate_core::crc::Crc32;
use oxiflate_core::error::{OxiflateError, Result};

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// GZIP header flag bits.
pub mod flags {
    /// Probably-text hint.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC16 present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Mask of bits RFC 1952 reserves as zero.
    pub const RESERVED: u8 = 0xE0;
}

/// A GZIP member header.
///
/// Used in both directions: the Deflater renders one in front of the
/// compressed body, and the Inflater exposes the parsed one once the header
/// is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Probably-text hint (FTEXT).
    pub text: bool,
    /// Modification time (Unix seconds, 0 = unavailable).
    pub mtime: u32,
    /// Extra flags byte (set from the compression level on write).
    pub xfl: u8,
    /// Operating system code (255 = unknown).
    pub os: u8,
    /// Raw extra-field bytes (FEXTRA), without the XLEN prefix.
    pub extra: Option<Vec<u8>>,
    /// Original filename (FNAME).
    pub filename: Option<String>,
    /// Comment (FCOMMENT).
    pub comment: Option<String>,
    /// Whether a header CRC16 is present (FHCRC).
    pub header_crc: bool,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            text: false,
            mtime: 0,
            xfl: 0,
            os: 255,
            extra: None,
            filename: None,
            comment: None,
            header_crc: false,
        }
    }
}

impl GzipHeader {
    /// A header with all-default fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// A header carrying the original filename.
    pub fn with_filename(filename: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }

    /// Set the modification time.
    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Attach a comment.
    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Attach an extra field (at most 65535 bytes are representable).
    pub fn extra(mut self, extra: Vec<u8>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Request a header CRC16 on write.
    pub fn header_crc(mut self) -> Self {
        self.header_crc = true;
        self
    }

    /// Mark the payload as probably text.
    pub fn text(mut self) -> Self {
        self.text = true;
        self
    }

    /// The flag byte this header serializes with.
    fn flag_byte(&self) -> u8 {
        let mut flg = 0;
        if self.text {
            flg |= flags::FTEXT;
        }
        if self.header_crc {
            flg |= flags::FHCRC;
        }
        if self.extra.is_some() {
            flg |= flags::FEXTRA;
        }
        if self.filename.is_some() {
            flg |= flags::FNAME;
        }
        if self.comment.is_some() {
            flg |= flags::FCOMMENT;
        }
        flg
    }

    /// Serialize the header. `level` drives the XFL hint byte.
    pub fn encode(&self, level: u8) -> Vec<u8> {
        let xfl = match level {
            9 => 2,
            0..=1 => 4,
            _ => 0,
        };

        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(&GZIP_MAGIC);
        bytes.push(CM_DEFLATE);
        bytes.push(self.flag_byte());
        bytes.extend_from_slice(&self.mtime.to_le_bytes());
        bytes.push(xfl);
        bytes.push(self.os);

        if let Some(ref extra) = self.extra {
            let xlen = extra.len().min(u16::MAX as usize) as u16;
            bytes.extend_from_slice(&xlen.to_le_bytes());
            bytes.extend_from_slice(&extra[..xlen as usize]);
        }
        if let Some(ref filename) = self.filename {
            bytes.extend_from_slice(filename.as_bytes());
            bytes.push(0);
        }
        if let Some(ref comment) = self.comment {
            bytes.extend_from_slice(comment.as_bytes());
            bytes.push(0);
        }
        if self.header_crc {
            let crc16 = (Crc32::compute(&bytes) & 0xFFFF) as u16;
            bytes.extend_from_slice(&crc16.to_le_bytes());
        }

        bytes
    }
}

/// Which header field the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Magic,
    Method,
    Flags,
    Mtime,
    Xfl,
    Os,
    ExtraLen,
    ExtraData,
    Name,
    Comment,
    Crc,
    Done,
}

/// Incremental GZIP header parser.
///
/// Feeds on whole bytes from the inflate bit accumulator; returns after
/// every call with its exact sub-field position preserved, so headers may
/// arrive one byte at a time.
#[derive(Debug, Clone)]
pub struct GzipHeaderParser {
    field: Field,
    header: GzipHeader,
    flags: u8,
    /// Bytes consumed within the current fixed-size field.
    got: u8,
    /// Little-endian accumulator for multi-byte fields.
    acc: u32,
    /// Remaining extra-field bytes.
    extra_remaining: u16,
    name_bytes: Vec<u8>,
    comment_bytes: Vec<u8>,
    /// Running CRC-32 over header bytes, for the optional CRC16.
    crc: Crc32,
    /// CRC value snapshotted when the CRC16 field begins.
    crc_at_field: u32,
}

impl Default for GzipHeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipHeaderParser {
    /// Create a parser positioned before the magic bytes.
    pub fn new() -> Self {
        Self {
            field: Field::Magic,
            header: GzipHeader::default(),
            flags: 0,
            got: 0,
            acc: 0,
            extra_remaining: 0,
            name_bytes: Vec::new(),
            comment_bytes: Vec::new(),
            crc: Crc32::new(),
            crc_at_field: 0,
        }
    }

    /// Whether the whole header has been parsed.
    pub fn is_done(&self) -> bool {
        self.field == Field::Done
    }

    /// The finalized header. Only meaningful after [`Self::is_done`].
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    fn next_crc_byte(&mut self, bits: &mut BitReader, src: &mut InputCursor<'_>) -> Option<u8> {
        let byte = bits.try_take_byte(src)?;
        self.crc.update(&[byte]);
        Some(byte)
    }

    /// Consume as many header bytes as are available.
    ///
    /// Returns `Ok(true)` once the header is complete and `Ok(false)` when
    /// input ran out mid-field.
    pub fn advance(&mut self, bits: &mut BitReader, src: &mut InputCursor<'_>) -> Result<bool> {
        loop {
            match self.field {
                Field::Magic => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if byte != GZIP_MAGIC[self.got as usize] {
                        return Err(OxiflateError::invalid_magic(
                            GZIP_MAGIC.to_vec(),
                            vec![byte],
                        ));
                    }
                    self.got += 1;
                    if self.got == 2 {
                        self.got = 0;
                        self.field = Field::Method;
                    }
                }
                Field::Method => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if byte != CM_DEFLATE {
                        return Err(OxiflateError::invalid_header(format!(
                            "unknown gzip compression method {}",
                            byte
                        )));
                    }
                    self.field = Field::Flags;
                }
                Field::Flags => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if byte & flags::RESERVED != 0 {
                        return Err(OxiflateError::invalid_header(
                            "reserved gzip flag bits set",
                        ));
                    }
                    self.flags = byte;
                    self.header.text = byte & flags::FTEXT != 0;
                    self.header.header_crc = byte & flags::FHCRC != 0;
                    self.field = Field::Mtime;
                }
                Field::Mtime => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    self.acc |= u32::from(byte) << (8 * self.got);
                    self.got += 1;
                    if self.got == 4 {
                        self.header.mtime = self.acc;
                        self.acc = 0;
                        self.got = 0;
                        self.field = Field::Xfl;
                    }
                }
                Field::Xfl => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    self.header.xfl = byte;
                    self.field = Field::Os;
                }
                Field::Os => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    self.header.os = byte;
                    self.field = if self.flags & flags::FEXTRA != 0 {
                        Field::ExtraLen
                    } else {
                        self.after_extra()
                    };
                }
                Field::ExtraLen => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    self.acc |= u32::from(byte) << (8 * self.got);
                    self.got += 1;
                    if self.got == 2 {
                        self.extra_remaining = self.acc as u16;
                        self.header.extra = Some(Vec::with_capacity(self.extra_remaining as usize));
                        self.acc = 0;
                        self.got = 0;
                        self.field = if self.extra_remaining > 0 {
                            Field::ExtraData
                        } else {
                            self.after_extra()
                        };
                    }
                }
                Field::ExtraData => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if let Some(ref mut extra) = self.header.extra {
                        extra.push(byte);
                    }
                    self.extra_remaining -= 1;
                    if self.extra_remaining == 0 {
                        self.field = self.after_extra();
                    }
                }
                Field::Name => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if byte == 0 {
                        self.header.filename =
                            Some(String::from_utf8_lossy(&self.name_bytes).into_owned());
                        self.field = self.after_name();
                    } else {
                        self.name_bytes.push(byte);
                    }
                }
                Field::Comment => {
                    let Some(byte) = self.next_crc_byte(bits, src) else {
                        return Ok(false);
                    };
                    if byte == 0 {
                        self.header.comment =
                            Some(String::from_utf8_lossy(&self.comment_bytes).into_owned());
                        self.field = self.after_comment();
                    } else {
                        self.comment_bytes.push(byte);
                    }
                }
                Field::Crc => {
                    if self.got == 0 {
                        self.crc_at_field = self.crc.value();
                    }
                    // The CRC16 bytes are not part of their own checksum.
                    let Some(byte) = bits.try_take_byte(src) else {
                        return Ok(false);
                    };
                    self.acc |= u32::from(byte) << (8 * self.got);
                    self.got += 1;
                    if self.got == 2 {
                        let received = self.acc as u16;
                        let computed = (self.crc_at_field & 0xFFFF) as u16;
                        if received != computed {
                            return Err(OxiflateError::crc_mismatch(
                                u32::from(received),
                                u32::from(computed),
                            ));
                        }
                        self.acc = 0;
                        self.got = 0;
                        self.field = Field::Done;
                    }
                }
                Field::Done => return Ok(true),
            }
        }
    }

    fn after_extra(&self) -> Field {
        if self.flags & flags::FNAME != 0 {
            Field::Name
        } else {
            self.after_name()
        }
    }

    fn after_name(&self) -> Field {
        if self.flags & flags::FCOMMENT != 0 {
            Field::Comment
        } else {
            self.after_comment()
        }
    }

    fn after_comment(&self) -> Field {
        if self.flags & flags::FHCRC != 0 {
            Field::Crc
        } else {
            Field::Done
        }
    }
}
