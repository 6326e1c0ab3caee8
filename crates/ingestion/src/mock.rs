//! Test doubles and fixture builders
//!
//! In-memory readers for pipeline tests, and byte builders producing small
//! but valid FIT and MP4 files for end-to-end tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use contracts::{
    has_extension, CameraEventKind, ContractError, DeviceEvent, LogRecordReader, Timestamp,
    VideoMetadataReader, VideoTarget,
};

use crate::fit::crc16;
use crate::fit::profile::{base, camera_event, event, mesg, record, FIT_EPOCH_OFFSET, FIELD_TIMESTAMP};
use crate::mp4::MP4_EPOCH_OFFSET;

#[derive(Debug, Clone)]
enum MockLog {
    Events(Vec<DeviceEvent>),
    Corrupt(String),
    Panic(String),
}

/// `LogRecordReader` serving canned event streams by path
#[derive(Debug, Clone)]
pub struct MockLogReader {
    extension: String,
    logs: HashMap<PathBuf, MockLog>,
}

impl MockLogReader {
    /// Reader accepting files with `extension`
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            logs: HashMap::new(),
        }
    }

    pub fn with_log(mut self, path: impl Into<PathBuf>, events: Vec<DeviceEvent>) -> Self {
        self.logs.insert(path.into(), MockLog::Events(events));
        self
    }

    /// Path that fails to decode with `CorruptLog`
    pub fn with_corrupt(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.logs
            .insert(path.into(), MockLog::Corrupt(message.to_string()));
        self
    }

    /// Path whose decode panics, like a reader bug on hostile input
    pub fn with_panic(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.logs.insert(path.into(), MockLog::Panic(message.to_string()));
        self
    }
}

impl LogRecordReader for MockLogReader {
    fn format(&self) -> &str {
        &self.extension
    }

    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extension)
    }

    fn read(&self, path: &Path) -> Result<Vec<DeviceEvent>, ContractError> {
        match self.logs.get(path) {
            Some(MockLog::Events(events)) => Ok(events.clone()),
            Some(MockLog::Corrupt(message)) => Err(ContractError::corrupt_log(path, message.as_str())),
            Some(MockLog::Panic(message)) => panic!("{message}"),
            None => Err(ContractError::LogRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such mock log"),
            }),
        }
    }
}

/// `VideoMetadataReader` serving canned targets by path
#[derive(Debug, Clone, Default)]
pub struct MockVideoReader {
    videos: HashMap<PathBuf, VideoTarget>,
}

impl MockVideoReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, path: impl Into<PathBuf>, target: VideoTarget) -> Self {
        self.videos.insert(path.into(), target);
        self
    }
}

impl VideoMetadataReader for MockVideoReader {
    fn read(&self, path: &Path) -> Result<VideoTarget, ContractError> {
        self.videos
            .get(path)
            .cloned()
            .ok_or_else(|| ContractError::unreadable_video(path, "no such mock video"))
    }
}

/// One `record` message worth of values, in SI units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitSample {
    /// Latitude, longitude in degrees
    pub position: Option<(f64, f64)>,
    pub altitude_m: Option<f64>,
    pub speed_mps: Option<f64>,
    pub heart_rate: Option<u8>,
    pub power: Option<u16>,
}

impl FitSample {
    pub fn heart_rate(bpm: u8) -> Self {
        Self {
            heart_rate: Some(bpm),
            ..Self::default()
        }
    }
}

const LOCAL_RECORD: u8 = 0;
const LOCAL_EVENT: u8 = 1;
const LOCAL_CAMERA: u8 = 2;

/// Builds a single-segment FIT activity file.
///
/// Messages are written in call order. Local types are fixed: 0 for
/// `record`, 1 for `event`, 2 for `camera_event` (redefined for each camera
/// event since the UUID string length varies).
#[derive(Debug, Clone, Default)]
pub struct FitFileBuilder {
    records: Vec<u8>,
    record_defined: bool,
    event_defined: bool,
}

impl FitFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer_start(self, at: Timestamp) -> Self {
        self.timer(at, event::TYPE_START as u8)
    }

    pub fn timer_stop(self, at: Timestamp) -> Self {
        self.timer(at, event::TYPE_STOP_ALL as u8)
    }

    fn timer(mut self, at: Timestamp, event_type: u8) -> Self {
        if !self.event_defined {
            self.define(
                LOCAL_EVENT,
                mesg::EVENT,
                &[
                    (FIELD_TIMESTAMP, 4, base::UINT32),
                    (event::EVENT, 1, base::ENUM),
                    (event::EVENT_TYPE, 1, base::ENUM),
                ],
            );
            self.event_defined = true;
        }
        self.records.push(LOCAL_EVENT);
        self.records.extend_from_slice(&fit_seconds(at).to_le_bytes());
        self.records.push(event::TIMER as u8);
        self.records.push(event_type);
        self
    }

    pub fn record(mut self, at: Timestamp, sample: FitSample) -> Self {
        if !self.record_defined {
            self.define(
                LOCAL_RECORD,
                mesg::RECORD,
                &[
                    (FIELD_TIMESTAMP, 4, base::UINT32),
                    (record::POSITION_LAT, 4, base::SINT32),
                    (record::POSITION_LONG, 4, base::SINT32),
                    (record::ALTITUDE, 2, base::UINT16),
                    (record::SPEED, 2, base::UINT16),
                    (record::HEART_RATE, 1, base::UINT8),
                    (record::POWER, 2, base::UINT16),
                ],
            );
            self.record_defined = true;
        }

        let (lat, long) = sample
            .position
            .map(|(lat, long)| (degrees_to_semicircles(lat), degrees_to_semicircles(long)))
            .unwrap_or((i32::MAX, i32::MAX));
        let altitude = sample
            .altitude_m
            .map(|m| ((m + 500.0) * 5.0).round() as u16)
            .unwrap_or(u16::MAX);
        let speed = sample
            .speed_mps
            .map(|v| (v * 1000.0).round() as u16)
            .unwrap_or(u16::MAX);

        let out = &mut self.records;
        out.push(LOCAL_RECORD);
        out.extend_from_slice(&fit_seconds(at).to_le_bytes());
        out.extend_from_slice(&lat.to_le_bytes());
        out.extend_from_slice(&long.to_le_bytes());
        out.extend_from_slice(&altitude.to_le_bytes());
        out.extend_from_slice(&speed.to_le_bytes());
        out.push(sample.heart_rate.unwrap_or(u8::MAX));
        out.extend_from_slice(&sample.power.unwrap_or(u16::MAX).to_le_bytes());
        self
    }

    pub fn camera_event(mut self, at: Timestamp, kind: CameraEventKind, uuid: Option<&str>) -> Self {
        let text = uuid.map(|u| {
            let mut bytes = u.as_bytes().to_vec();
            bytes.push(0);
            bytes
        });

        let mut fields = vec![
            (FIELD_TIMESTAMP, 4, base::UINT32),
            (camera_event::TIMESTAMP_MS, 2, base::UINT16),
            (camera_event::CAMERA_EVENT_TYPE, 1, base::ENUM),
        ];
        if let Some(text) = &text {
            fields.push((camera_event::CAMERA_FILE_UUID, text.len() as u8, base::STRING));
        }
        self.define(LOCAL_CAMERA, mesg::CAMERA_EVENT, &fields);

        let out = &mut self.records;
        out.push(LOCAL_CAMERA);
        out.extend_from_slice(&fit_seconds(at).to_le_bytes());
        out.extend_from_slice(&(at.timestamp_subsec_millis() as u16).to_le_bytes());
        out.push(camera_event_code(kind));
        if let Some(text) = text {
            out.extend_from_slice(&text);
        }
        self
    }

    fn define(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) {
        let out = &mut self.records;
        out.push(0x40 | local);
        out.push(0); // reserved
        out.push(0); // little endian
        out.extend_from_slice(&global.to_le_bytes());
        out.push(fields.len() as u8);
        for &(num, size, base_type) in fields {
            out.extend_from_slice(&[num, size, base_type]);
        }
    }

    /// 14-byte header, records, file CRC
    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![14, 0x20];
        out.extend_from_slice(&2132u16.to_le_bytes());
        out.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        out.extend_from_slice(b".FIT");
        let header_crc = crc16(&out);
        out.extend_from_slice(&header_crc.to_le_bytes());
        out.extend_from_slice(&self.records);
        let crc = crc16(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }
}

fn fit_seconds(at: Timestamp) -> u32 {
    (at.timestamp() - FIT_EPOCH_OFFSET) as u32
}

fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * (2_147_483_648.0 / 180.0)).round() as i32
}

fn camera_event_code(kind: CameraEventKind) -> u8 {
    match kind {
        CameraEventKind::VideoStart => 0,
        CameraEventKind::VideoSplit => 1,
        CameraEventKind::VideoEnd => 2,
        CameraEventKind::PhotoTaken => 3,
        CameraEventKind::VideoSplitStart => 7,
        CameraEventKind::Other(code) => code,
    }
}

fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// Minimal MP4: `ftyp`, `moov { mvhd [, udta { uuid }] }`, empty `mdat`.
///
/// `version` selects the 32-bit (0) or 64-bit (1) `mvhd` layout.
pub fn mp4_file(
    created: Timestamp,
    duration: u64,
    timescale: u32,
    version: u8,
    uuid: Option<&str>,
) -> Vec<u8> {
    let creation = (created.timestamp() + MP4_EPOCH_OFFSET) as u64;

    let mut mvhd = vec![version, 0, 0, 0];
    if version == 1 {
        mvhd.extend_from_slice(&creation.to_be_bytes());
        mvhd.extend_from_slice(&creation.to_be_bytes());
        mvhd.extend_from_slice(&timescale.to_be_bytes());
        mvhd.extend_from_slice(&duration.to_be_bytes());
    } else {
        mvhd.extend_from_slice(&(creation as u32).to_be_bytes());
        mvhd.extend_from_slice(&(creation as u32).to_be_bytes());
        mvhd.extend_from_slice(&timescale.to_be_bytes());
        mvhd.extend_from_slice(&(duration as u32).to_be_bytes());
    }
    // rate, volume, reserved, matrix, pre_defined, next_track_ID
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut moov = atom(b"mvhd", &mvhd);
    if let Some(uuid) = uuid {
        let mut text = uuid.as_bytes().to_vec();
        text.resize(text.len().max(95), 0);
        moov.extend(atom(b"udta", &atom(b"uuid", &text)));
    }

    let mut out = atom(b"ftyp", b"isom\0\0\x02\0isomiso2mp41");
    out.extend(atom(b"moov", &moov));
    out.extend(atom(b"mdat", &[]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FitReader;
    use contracts::{timestamp_from_secs, SensorKind};

    fn ts(secs: i64) -> Timestamp {
        timestamp_from_secs(secs).unwrap()
    }

    #[test]
    fn test_fit_builder_round_trips_through_reader() {
        let bytes = FitFileBuilder::new()
            .timer_start(ts(1_700_000_000))
            .record(
                ts(1_700_000_001),
                FitSample {
                    position: Some((45.5, 7.25)),
                    speed_mps: Some(4.2),
                    ..FitSample::heart_rate(130)
                },
            )
            .camera_event(ts(1_700_000_002), CameraEventKind::VideoStart, Some("cam-1"))
            .timer_stop(ts(1_700_000_010))
            .build();

        let events = FitReader::new(true).decode(&bytes).unwrap();
        assert!(matches!(events.first(), Some(DeviceEvent::Start { .. })));
        assert!(matches!(events.last(), Some(DeviceEvent::Stop { .. })));

        let gps = events
            .iter()
            .find_map(|e| match e {
                DeviceEvent::Data(r) if r.sensor_kind == SensorKind::Gps => Some(r),
                _ => None,
            })
            .unwrap();
        assert!((gps.field("latitude").unwrap() - 45.5).abs() < 1e-6);

        let camera = events
            .iter()
            .find_map(|e| match e {
                DeviceEvent::Camera(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(camera.file_uuid.as_deref(), Some("cam-1"));
    }

    #[test]
    fn test_mock_log_reader() {
        let reader = MockLogReader::new("mock")
            .with_log("a.mock", vec![DeviceEvent::Start { timestamp: ts(1) }])
            .with_corrupt("b.mock", "bad bytes");

        assert_eq!(reader.read(Path::new("a.mock")).unwrap().len(), 1);
        assert!(matches!(
            reader.read(Path::new("b.mock")),
            Err(ContractError::CorruptLog { .. })
        ));
        assert!(matches!(
            reader.read(Path::new("c.mock")),
            Err(ContractError::LogRead { .. })
        ));
    }
}
