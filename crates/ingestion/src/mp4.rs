//! MP4 / ISO-BMFF video metadata reader
//!
//! Only the top-level `moov` atom is loaded; `mdat` is skipped by seeking.
//! Capture window: `mvhd` creation time (seconds since 1904-01-01 UTC) plus
//! `duration / timescale`. Camera file UUID: payload of `moov/udta/uuid`.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::{Buf, Bytes};
use chrono::TimeDelta;
use contracts::{timestamp_from_secs, ContractError, TimeRange, VideoMetadataReader, VideoTarget};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};

/// Seconds between 1904-01-01 and the Unix epoch
pub const MP4_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Movie header fields used for the capture window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieHeader {
    pub creation_time: u64,
    pub timescale: u32,
    pub duration: u64,
}

impl MovieHeader {
    pub fn parse(mut body: Bytes) -> Result<Self> {
        if body.remaining() < 4 {
            return Err(IngestionError::malformed("mvhd too short"));
        }
        let version = body.get_u8();
        body.advance(3); // flags

        let needed = if version == 1 { 28 } else { 16 };
        if body.remaining() < needed {
            return Err(IngestionError::malformed(format!(
                "mvhd v{version} too short: {} bytes",
                body.remaining()
            )));
        }

        let header = if version == 1 {
            let creation_time = body.get_u64();
            let _modification_time = body.get_u64();
            Self {
                creation_time,
                timescale: body.get_u32(),
                duration: body.get_u64(),
            }
        } else {
            let creation_time = u64::from(body.get_u32());
            let _modification_time = body.get_u32();
            Self {
                creation_time,
                timescale: body.get_u32(),
                duration: u64::from(body.get_u32()),
            }
        };
        Ok(header)
    }

    /// Absolute capture window
    pub fn capture_range(&self) -> Result<TimeRange> {
        if self.timescale == 0 {
            return Err(IngestionError::malformed("mvhd timescale is zero"));
        }
        if self.creation_time == 0 {
            return Err(IngestionError::malformed("mvhd creation time is not set"));
        }

        let start = i64::try_from(self.creation_time)
            .ok()
            .and_then(|secs| timestamp_from_secs(secs - MP4_EPOCH_OFFSET))
            .ok_or_else(|| IngestionError::malformed("mvhd creation time out of range"))?;
        let millis = u128::from(self.duration) * 1000 / u128::from(self.timescale);
        let length = i64::try_from(millis)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .ok_or_else(|| IngestionError::malformed("mvhd duration out of range"))?;

        TimeRange::from_start(start, length)
            .map_err(|e| IngestionError::malformed(e.to_string()))
    }
}

/// `VideoMetadataReader` for MP4/MOV containers
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp4MetadataReader;

impl Mp4MetadataReader {
    /// Parse a loaded `moov` payload
    pub fn parse_moov(moov: &Bytes) -> Result<(MovieHeader, Option<String>)> {
        let mvhd = child(moov, b"mvhd")?
            .ok_or_else(|| IngestionError::malformed("moov has no mvhd atom"))?;
        let header = MovieHeader::parse(mvhd)?;

        let uuid = match child(moov, b"udta")? {
            Some(udta) => child(&udta, b"uuid")?.and_then(|payload| camera_uuid(&payload)),
            None => None,
        };
        Ok((header, uuid))
    }

    fn read_target(path: &Path) -> Result<VideoTarget> {
        let mut reader = BufReader::new(File::open(path)?);
        let moov = find_top_level(&mut reader, b"moov")?
            .ok_or_else(|| IngestionError::malformed("no moov atom"))?;
        let (header, uuid) = Self::parse_moov(&moov)?;

        let range = header.capture_range()?;
        debug!(
            range = %range,
            timescale = header.timescale,
            uuid = uuid.as_deref().unwrap_or("-"),
            "Read movie header"
        );

        let target = VideoTarget::new(path.display().to_string(), range);
        Ok(match uuid {
            Some(uuid) => target.with_camera_file_uuid(uuid),
            None => target,
        })
    }
}

impl VideoMetadataReader for Mp4MetadataReader {
    #[instrument(level = "debug", name = "mp4_read", skip(self), fields(path = %path.display()))]
    fn read(&self, path: &Path) -> std::result::Result<VideoTarget, ContractError> {
        Self::read_target(path).map_err(|e| e.into_unreadable_video(path))
    }
}

/// Atom header: total size and header length.
///
/// `declared` is the 32-bit size field; 1 means a 64-bit `largesize`
/// follows, 0 means the atom runs to the end of its container.
fn atom_size(declared: u32, largesize: Option<u64>, remaining: u64) -> Result<(u64, u64)> {
    let (size, header_len) = match declared {
        0 => (remaining, 8),
        1 => (
            largesize.ok_or_else(|| IngestionError::malformed("missing 64-bit atom size"))?,
            16,
        ),
        n => (u64::from(n), 8),
    };
    if size < header_len || size > remaining {
        return Err(IngestionError::malformed(format!(
            "atom size {size} out of bounds (remaining {remaining})"
        )));
    }
    Ok((size, header_len))
}

/// Walk top-level atoms by seeking and load the payload of the first `name`.
pub fn find_top_level<R: Read + Seek>(reader: &mut R, name: &[u8; 4]) -> Result<Option<Bytes>> {
    let end = reader.seek(SeekFrom::End(0))?;
    let mut pos = 0u64;

    while end.saturating_sub(pos) >= 8 {
        reader.seek(SeekFrom::Start(pos))?;
        let mut head = [0u8; 8];
        reader.read_exact(&mut head)?;
        let declared = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);

        let largesize = if declared == 1 {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large)?;
            Some(u64::from_be_bytes(large))
        } else {
            None
        };
        let (size, header_len) = atom_size(declared, largesize, end - pos)?;

        if &head[4..8] == name {
            let len = usize::try_from(size - header_len)
                .map_err(|_| IngestionError::malformed("atom too large"))?;
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body)?;
            return Ok(Some(Bytes::from(body)));
        }
        pos += size;
    }

    Ok(None)
}

/// First child atom `name` inside a loaded container payload.
pub fn child(parent: &Bytes, name: &[u8; 4]) -> Result<Option<Bytes>> {
    let mut pos = 0usize;

    while parent.len() - pos >= 8 {
        let mut head = parent.slice(pos..);
        let declared = head.get_u32();
        let mut kind = [0u8; 4];
        head.copy_to_slice(&mut kind);
        let largesize = (declared == 1 && head.remaining() >= 8).then(|| head.get_u64());

        let (size, header_len) = atom_size(declared, largesize, (parent.len() - pos) as u64)?;
        // bounded by parent.len() above
        let (size, header_len) = (size as usize, header_len as usize);

        if &kind == name {
            return Ok(Some(parent.slice(pos + header_len..pos + size)));
        }
        pos += size;
    }

    Ok(None)
}

/// Camera file UUID stored as text, NUL padded
fn camera_uuid(payload: &[u8]) -> Option<String> {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    let text = std::str::from_utf8(&payload[..end]).ok()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mp4_file;
    use contracts::Timestamp;
    use std::io::Cursor;

    fn ts(secs: i64) -> Timestamp {
        timestamp_from_secs(secs).unwrap()
    }

    #[test]
    fn test_mvhd_v0() {
        let bytes = mp4_file(ts(1_700_000_000), 90_000, 1000, 0, Some("VIRBactioncamera-abc"));
        let moov = find_top_level(&mut Cursor::new(bytes), b"moov")
            .unwrap()
            .unwrap();
        let (header, uuid) = Mp4MetadataReader::parse_moov(&moov).unwrap();

        let range = header.capture_range().unwrap();
        assert_eq!(range.start(), ts(1_700_000_000));
        assert_eq!(range.duration(), TimeDelta::seconds(90));
        assert_eq!(uuid.as_deref(), Some("VIRBactioncamera-abc"));
    }

    #[test]
    fn test_mvhd_v1_without_uuid() {
        let bytes = mp4_file(ts(1_700_000_000), 2_500, 1000, 1, None);
        let moov = find_top_level(&mut Cursor::new(bytes), b"moov")
            .unwrap()
            .unwrap();
        let (header, uuid) = Mp4MetadataReader::parse_moov(&moov).unwrap();

        assert_eq!(header.timescale, 1000);
        assert_eq!(
            header.capture_range().unwrap().duration(),
            TimeDelta::milliseconds(2_500)
        );
        assert!(uuid.is_none());
    }

    #[test]
    fn test_zero_timescale_rejected() {
        let header = MovieHeader {
            creation_time: 3_000_000_000,
            timescale: 0,
            duration: 10,
        };
        assert!(header.capture_range().is_err());
    }

    #[test]
    fn test_missing_moov() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(b"isom\0\0\0\0");
        assert!(find_top_level(&mut Cursor::new(bytes), b"moov")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_largesize_atom_skipped() {
        // 64-bit sized free atom ahead of moov
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(b"free");
        bytes.extend_from_slice(&24u64.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend(mp4_file(ts(1_700_000_000), 1000, 1000, 0, None));

        let moov = find_top_level(&mut Cursor::new(bytes), b"moov").unwrap();
        assert!(moov.is_some());
    }

    #[test]
    fn test_oversized_atom_is_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1000u32.to_be_bytes());
        bytes.extend_from_slice(b"mdat");
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(find_top_level(&mut Cursor::new(bytes), b"moov").is_err());
    }

    #[test]
    fn test_reader_maps_errors_to_unreadable_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp4");
        std::fs::write(&path, b"not an mp4 at all").unwrap();

        let err = Mp4MetadataReader.read(&path).unwrap_err();
        assert!(matches!(err, ContractError::UnreadableVideo { .. }));
    }

    #[test]
    fn test_reader_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GX010001.MP4");
        std::fs::write(
            &path,
            mp4_file(ts(1_700_000_000), 30_000, 1000, 0, Some("uuid-1")),
        )
        .unwrap();

        let target = Mp4MetadataReader.read(&path).unwrap();
        assert_eq!(target.range.start(), ts(1_700_000_000));
        assert_eq!(target.range.end(), ts(1_700_000_030));
        assert_eq!(target.camera_file_uuid.as_deref(), Some("uuid-1"));
        assert!(target.identifier.ends_with("GX010001.MP4"));
    }
}
