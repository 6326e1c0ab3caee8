//! FIT file header and CRC-16.

use bytes::Buf;

use crate::error::{ensure, IngestionError, Result};

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Length of the trailing file CRC
pub const CRC_SIZE: usize = 2;

fn crc_step(crc: u16, byte: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    let crc = ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize]
}

/// FIT CRC-16 of `data`
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0, |crc, &byte| crc_step(crc, byte))
}

/// File header of one FIT segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Length of the record section following the header
    pub data_size: u32,
    /// Header CRC; absent in 12-byte headers, zero when not computed
    pub crc: Option<u16>,
}

impl FitHeader {
    /// Parse the header at the start of `data`.
    pub fn parse(data: &[u8], verify_crc: bool) -> Result<Self> {
        ensure(data, 12, 0)?;
        let mut buf = data;

        let header_size = buf.get_u8();
        if header_size != 12 && header_size != 14 {
            return Err(IngestionError::HeaderSize(header_size));
        }
        ensure(data, header_size as usize, 0)?;

        let protocol_version = buf.get_u8();
        let profile_version = buf.get_u16_le();
        let data_size = buf.get_u32_le();
        let mut signature = [0u8; 4];
        buf.copy_to_slice(&mut signature);
        if &signature != b".FIT" {
            return Err(IngestionError::BadSignature);
        }

        let crc = (header_size == 14).then(|| buf.get_u16_le());
        if let Some(stored) = crc.filter(|&c| verify_crc && c != 0) {
            let computed = crc16(&data[..12]);
            if stored != computed {
                return Err(IngestionError::CrcMismatch {
                    scope: "header",
                    stored,
                    computed,
                });
            }
        }

        Ok(Self {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            crc,
        })
    }

    /// Header plus record section, excluding the trailing CRC
    pub fn segment_len(&self) -> usize {
        self.header_size as usize + self.data_size as usize
    }

    /// Whether `data` starts with something that looks like a FIT header
    pub fn looks_like_header(data: &[u8]) -> bool {
        data.len() >= 12 && matches!(data[0], 12 | 14) && &data[8..12] == b".FIT"
    }
}

/// Check the CRC stored after `segment` (header plus records).
pub fn verify_file_crc(segment: &[u8], stored: u16) -> Result<()> {
    let computed = crc16(segment);
    if stored != computed {
        return Err(IngestionError::CrcMismatch {
            scope: "file",
            stored,
            computed,
        });
    }
    Ok(())
}
