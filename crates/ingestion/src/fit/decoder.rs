//! FIT record section decoding: definition and data messages.
//!
//! Produces generic `FitMessage`s (global number + decoded field values);
//! mapping to device events happens in the adapters.

use bytes::Buf;
use tracing::trace;

use super::header::{verify_file_crc, FitHeader, CRC_SIZE};
use super::profile::{base, FIELD_TIMESTAMP};
use crate::error::{ensure, IngestionError, Result};

/// Decoded scalar field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Unsigned(v) => Some(v as f64),
            Self::Signed(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Unsigned(v) => Some(v),
            Self::Signed(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One decoded data message. Fields holding the invalid sentinel of their
/// base type are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FitMessage {
    pub global: u16,
    /// Raw FIT seconds, from field 253 or a compressed-timestamp header
    pub timestamp: Option<u32>,
    fields: Vec<(u8, FieldValue)>,
}

impl FitMessage {
    pub fn field(&self, num: u8) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == num).map(|(_, v)| v)
    }

    pub fn number(&self, num: u8) -> Option<f64> {
        self.field(num)?.as_f64()
    }

    pub fn unsigned(&self, num: u8) -> Option<u64> {
        self.field(num)?.as_u64()
    }

    pub fn text(&self, num: u8) -> Option<&str> {
        self.field(num)?.as_str()
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldDef {
    num: u8,
    size: u8,
    base_type: u8,
}

#[derive(Debug, Clone)]
struct Definition {
    global: u16,
    big_endian: bool,
    fields: Vec<FieldDef>,
    /// Total size of developer fields, skipped
    developer_size: usize,
}

impl Definition {
    fn data_size(&self) -> usize {
        self.fields.iter().map(|f| f.size as usize).sum::<usize>() + self.developer_size
    }
}

/// Decode every FIT segment in `data`.
///
/// Segments are chained back to back, each with its own header and trailing
/// CRC. Bytes after the last segment that do not form a FIT header are
/// ignored.
pub fn decode_file(data: &[u8], verify_crc: bool) -> Result<Vec<FitMessage>> {
    let mut messages = Vec::new();
    let mut offset = 0;

    loop {
        let rest = &data[offset..];
        let header = FitHeader::parse(rest, verify_crc)?;
        let segment_len = header.segment_len();
        ensure(rest, segment_len + CRC_SIZE, offset)?;

        if verify_crc {
            let mut stored = &rest[segment_len..segment_len + CRC_SIZE];
            verify_file_crc(&rest[..segment_len], stored.get_u16_le())?;
        }

        let records = &rest[header.header_size as usize..segment_len];
        let before = messages.len();
        SegmentDecoder::default().decode(
            records,
            offset + header.header_size as usize,
            &mut messages,
        )?;
        trace!(
            offset,
            data_size = header.data_size,
            messages = messages.len() - before,
            "Decoded FIT segment"
        );

        offset += segment_len + CRC_SIZE;
        if !FitHeader::looks_like_header(&data[offset..]) {
            break;
        }
    }

    Ok(messages)
}

/// Decoder state for one segment: local definitions and the last full
/// timestamp seen (for compressed-timestamp headers).
#[derive(Debug, Default)]
struct SegmentDecoder {
    definitions: [Option<Definition>; 16],
    last_timestamp: Option<u32>,
}

impl SegmentDecoder {
    fn decode(&mut self, records: &[u8], base: usize, out: &mut Vec<FitMessage>) -> Result<()> {
        let mut buf = records;

        while buf.has_remaining() {
            let offset = base + records.len() - buf.remaining();
            let header = buf.get_u8();

            if header & 0x80 != 0 {
                let local = (header >> 5) & 0x03;
                let time_offset = u32::from(header & 0x1F);
                let last = self.last_timestamp.ok_or_else(|| {
                    IngestionError::malformed(format!(
                        "compressed timestamp at offset {offset} before any full timestamp"
                    ))
                })?;
                let mut timestamp = (last & !0x1F) | time_offset;
                if time_offset < (last & 0x1F) {
                    timestamp = timestamp.checked_add(0x20).ok_or_else(|| {
                        IngestionError::malformed(format!(
                            "compressed timestamp at offset {offset} overflows"
                        ))
                    })?;
                }
                self.last_timestamp = Some(timestamp);

                let mut message = self.read_data(local, &mut buf, offset)?;
                message.timestamp.get_or_insert(timestamp);
                out.push(message);
            } else if header & 0x40 != 0 {
                let developer = header & 0x20 != 0;
                self.read_definition(header & 0x0F, developer, &mut buf, offset)?;
            } else {
                let message = self.read_data(header & 0x0F, &mut buf, offset)?;
                if message.timestamp.is_some() {
                    self.last_timestamp = message.timestamp;
                }
                out.push(message);
            }
        }

        Ok(())
    }

    fn read_definition(
        &mut self,
        local: u8,
        developer: bool,
        buf: &mut &[u8],
        offset: usize,
    ) -> Result<()> {
        ensure(buf, 5, offset)?;
        let _reserved = buf.get_u8();
        let big_endian = match buf.get_u8() {
            0 => false,
            1 => true,
            other => {
                return Err(IngestionError::malformed(format!(
                    "definition at offset {offset} has unknown architecture {other}"
                )))
            }
        };
        let global = if big_endian {
            buf.get_u16()
        } else {
            buf.get_u16_le()
        };
        let count = buf.get_u8() as usize;

        ensure(buf, count * 3, offset)?;
        let fields = (0..count)
            .map(|_| FieldDef {
                num: buf.get_u8(),
                size: buf.get_u8(),
                base_type: buf.get_u8(),
            })
            .collect();

        let mut developer_size = 0;
        if developer {
            ensure(buf, 1, offset)?;
            let count = buf.get_u8() as usize;
            ensure(buf, count * 3, offset)?;
            for _ in 0..count {
                let _num = buf.get_u8();
                developer_size += buf.get_u8() as usize;
                let _index = buf.get_u8();
            }
        }

        self.definitions[local as usize] = Some(Definition {
            global,
            big_endian,
            fields,
            developer_size,
        });
        Ok(())
    }

    fn read_data(&self, local: u8, buf: &mut &[u8], offset: usize) -> Result<FitMessage> {
        let definition = self.definitions[local as usize].as_ref().ok_or(
            IngestionError::UndefinedLocalType {
                offset,
                local_type: local,
            },
        )?;
        ensure(buf, definition.data_size(), offset)?;

        let mut fields = Vec::with_capacity(definition.fields.len());
        let mut timestamp = None;
        for def in &definition.fields {
            let current: &[u8] = *buf;
            let (raw, rest) = current.split_at(def.size as usize);
            *buf = rest;

            let Some(value) = decode_value(raw, def.base_type, definition.big_endian) else {
                continue;
            };
            if def.num == FIELD_TIMESTAMP {
                timestamp = value.as_u64().and_then(|v| u32::try_from(v).ok());
            }
            fields.push((def.num, value));
        }
        buf.advance(definition.developer_size);

        Ok(FitMessage {
            global: definition.global,
            timestamp,
            fields,
        })
    }
}

fn base_size(base_type: u8) -> usize {
    match base_type {
        base::ENUM | base::SINT8 | base::UINT8 | base::UINT8Z | base::BYTE | base::STRING => 1,
        base::SINT16 | base::UINT16 | base::UINT16Z => 2,
        base::SINT32 | base::UINT32 | base::UINT32Z | base::FLOAT32 => 4,
        base::SINT64 | base::UINT64 | base::UINT64Z | base::FLOAT64 => 8,
        _ => 0,
    }
}

/// Decode a single scalar or string. Arrays, byte blobs, unknown base types
/// and invalid sentinels yield `None`.
fn decode_value(raw: &[u8], base_type: u8, big_endian: bool) -> Option<FieldValue> {
    let base_type = base_type & 0x1F;

    if base_type == base::STRING {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text = String::from_utf8_lossy(&raw[..end]).into_owned();
        return (!text.is_empty()).then_some(FieldValue::Text(text));
    }
    if base_size(base_type) != raw.len() {
        return None;
    }

    let mut b = raw;
    macro_rules! read {
        ($be:ident, $le:ident) => {
            if big_endian {
                b.$be()
            } else {
                b.$le()
            }
        };
    }

    let value = match base_type {
        base::ENUM | base::UINT8 | base::UINT8Z => FieldValue::Unsigned(u64::from(b.get_u8())),
        base::SINT8 => FieldValue::Signed(i64::from(b.get_i8())),
        base::UINT16 | base::UINT16Z => FieldValue::Unsigned(u64::from(read!(get_u16, get_u16_le))),
        base::SINT16 => FieldValue::Signed(i64::from(read!(get_i16, get_i16_le))),
        base::UINT32 | base::UINT32Z => FieldValue::Unsigned(u64::from(read!(get_u32, get_u32_le))),
        base::SINT32 => FieldValue::Signed(i64::from(read!(get_i32, get_i32_le))),
        base::UINT64 | base::UINT64Z => FieldValue::Unsigned(read!(get_u64, get_u64_le)),
        base::SINT64 => FieldValue::Signed(read!(get_i64, get_i64_le)),
        base::FLOAT32 => FieldValue::Float(f64::from(read!(get_f32, get_f32_le))),
        base::FLOAT64 => FieldValue::Float(read!(get_f64, get_f64_le)),
        _ => return None,
    };

    (!is_invalid(&value, raw, base_type)).then_some(value)
}

fn is_invalid(value: &FieldValue, raw: &[u8], base_type: u8) -> bool {
    match (base_type, value) {
        (base::UINT8Z | base::UINT16Z | base::UINT32Z | base::UINT64Z, FieldValue::Unsigned(v)) => {
            *v == 0
        }
        (base::ENUM | base::UINT8, FieldValue::Unsigned(v)) => *v == 0xFF,
        (base::UINT16, FieldValue::Unsigned(v)) => *v == 0xFFFF,
        (base::UINT32, FieldValue::Unsigned(v)) => *v == 0xFFFF_FFFF,
        (base::UINT64, FieldValue::Unsigned(v)) => *v == u64::MAX,
        (base::SINT8, FieldValue::Signed(v)) => *v == 0x7F,
        (base::SINT16, FieldValue::Signed(v)) => *v == 0x7FFF,
        (base::SINT32, FieldValue::Signed(v)) => *v == 0x7FFF_FFFF,
        (base::SINT64, FieldValue::Signed(v)) => *v == i64::MAX,
        // float sentinels are all-ones bit patterns
        (base::FLOAT32 | base::FLOAT64, _) => raw.iter().all(|&b| b == 0xFF),
        _ => false,
    }
}
