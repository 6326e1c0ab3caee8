//! Matching pipeline: partition decoded logs, pick the log recorded during
//! a video, and cut that log's data down to the video window.

use contracts::{
    delta_secs, ContractError, DeviceEvent, ExtractionConfig, LogFile, LogId, MatchResult, MatcherConfig,
    MatchingConfig, RawLog, SensorRecord, SensorTable, TimeRange, VideoTarget,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::matcher::find_best_match;
use crate::session::SessionExtractor;
use crate::window::{extract, reshape};

/// How the matching log was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// The log's camera events reference the video's camera file UUID
    CameraUuid,
    /// Largest overlap with the video's capture window
    TimeWindow,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CameraUuid => "camera_uuid",
            Self::TimeWindow => "time_window",
        }
    }
}

/// Resolved match for one video
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// Window the match was made against: the camera window recorded by the
    /// log when the UUID strategy won, the video's own range otherwise
    pub target: TimeRange,
    /// Window the data is cut to, always the video's capture range
    pub window: TimeRange,
    pub matched: MatchResult<'a>,
    pub strategy: MatchStrategy,
}

impl Resolution<'_> {
    pub fn log_id(&self) -> &LogId {
        &self.matched.log.identifier
    }

    /// Records of the matched session inside the video window
    pub fn records(&self) -> &[SensorRecord] {
        extract(self.matched.session, &self.window)
    }
}

/// Session extraction, matching and windowed extraction in one place
#[derive(Debug, Clone, Default)]
pub struct MatchingPipeline {
    sessions: SessionExtractor,
    matching: MatchingConfig,
    extraction: ExtractionConfig,
}

impl MatchingPipeline {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            sessions: SessionExtractor::new(config.session.clone()),
            matching: config.matching.clone(),
            extraction: config.extraction,
        }
    }

    /// Partition a decoded log into sessions, keeping its camera events.
    ///
    /// # Errors
    /// `UnsortedInput` if the event stream is not time-ordered.
    #[instrument(level = "debug", skip(self, raw), fields(log = %raw.id))]
    pub fn partition(&self, raw: RawLog) -> Result<LogFile, ContractError> {
        let RawLog { id, events } = raw;
        let camera_events = events
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::Camera(camera) => Some(camera.clone()),
                _ => None,
            })
            .collect();

        let sessions = self.sessions.extract(events)?;
        let log = LogFile::new(id, sessions).with_camera_events(camera_events);
        observability::record_sessions_extracted(&log);
        Ok(log)
    }

    /// Pick the matching log and session for `video`.
    ///
    /// By default the session with the largest overlap with the video range
    /// wins. With `matching.use_camera_uuid`, logs whose camera events name
    /// the video's camera file are tried first, against the window those
    /// events recorded; without such a log, or when it yields no overlap, the
    /// plain time-window match decides.
    ///
    /// # Errors
    /// `NoMatch` if no session overlaps the video.
    #[instrument(
        level = "debug",
        skip(self, video, logs),
        fields(video = %video.identifier, candidates = logs.len())
    )]
    pub fn resolve<'a>(
        &self,
        video: &VideoTarget,
        logs: &'a [LogFile],
    ) -> Result<Resolution<'a>, ContractError> {
        if self.matching.use_camera_uuid {
            if let Some(uuid) = video.camera_file_uuid.as_deref() {
                if let Some(resolution) = resolve_by_camera_file(video, uuid, logs) {
                    info!(
                        video = %video.identifier,
                        log = %resolution.log_id(),
                        uuid,
                        "Matched by camera file UUID"
                    );
                    observability::record_match(
                        resolution.strategy.as_str(),
                        delta_secs(resolution.matched.overlap.duration()),
                    );
                    return Ok(resolution);
                }
                debug!(uuid, "No log references camera file, using time window");
            }
        }

        match find_best_match(&video.range, logs) {
            Some(matched) => {
                info!(
                    video = %video.identifier,
                    log = %matched.log.identifier,
                    overlap = %matched.overlap,
                    "Matched by time window"
                );
                observability::record_match(
                    MatchStrategy::TimeWindow.as_str(),
                    delta_secs(matched.overlap.duration()),
                );
                Ok(Resolution {
                    target: video.range,
                    window: video.range,
                    matched,
                    strategy: MatchStrategy::TimeWindow,
                })
            }
            None => {
                warn!(
                    video = %video.identifier,
                    range = %video.range,
                    candidates = logs.len(),
                    "No session overlaps video"
                );
                observability::record_no_match();
                Err(ContractError::no_match(&video.identifier))
            }
        }
    }

    /// Identifier of the log recorded during `video`
    pub fn resolve_matching_log(
        &self,
        video: &VideoTarget,
        logs: &[LogFile],
    ) -> Result<LogId, ContractError> {
        self.resolve(video, logs).map(|r| r.log_id().clone())
    }

    /// Sensor data recorded during `video`, as a table.
    ///
    /// An empty table means the matched session has no record inside the
    /// window (e.g. a sparse log); the caller decides whether that is fatal.
    pub fn extract_video_data(
        &self,
        video: &VideoTarget,
        logs: &[LogFile],
    ) -> Result<SensorTable, ContractError> {
        let resolution = self.resolve(video, logs)?;
        Ok(self.tabulate(&resolution))
    }

    /// Reshape a resolution's windowed records with the configured fill
    pub fn tabulate(&self, resolution: &Resolution<'_>) -> SensorTable {
        let records = resolution.records();
        let table = reshape(records, self.extraction.fill);
        if table.is_empty() {
            warn!(
                log = %resolution.log_id(),
                window = %resolution.window,
                "Matched session has no records inside the window"
            );
        } else {
            debug!(
                records = records.len(),
                rows = table.row_count(),
                columns = table.columns.len(),
                "Extracted window"
            );
        }
        table
    }
}

/// First log (by identifier) that references `uuid` and overlaps the window
/// it recorded for that file.
fn resolve_by_camera_file<'a>(
    video: &VideoTarget,
    uuid: &str,
    logs: &'a [LogFile],
) -> Option<Resolution<'a>> {
    let mut tagged: Vec<&'a LogFile> = logs
        .iter()
        .filter(|log| log.references_camera_file(uuid))
        .collect();
    tagged.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    tagged.into_iter().find_map(|log| {
        let target = log.camera_window(uuid).unwrap_or(video.range);
        let matched = find_best_match(&target, std::slice::from_ref(log))?;
        Some(Resolution {
            target,
            window: video.range,
            matched,
            strategy: MatchStrategy::CameraUuid,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        timestamp_from_secs, CameraEvent, CameraEventKind, FillPolicy, SensorKind, Timestamp,
    };

    fn ts(secs: i64) -> Timestamp {
        timestamp_from_secs(secs).unwrap()
    }

    fn range(a: i64, b: i64) -> TimeRange {
        TimeRange::new(ts(a), ts(b)).unwrap()
    }

    fn speed(secs: i64) -> DeviceEvent {
        DeviceEvent::Data(
            SensorRecord::new(ts(secs), SensorKind::Speed).with_field("speed", secs as f64),
        )
    }

    fn camera(secs: i64, kind: CameraEventKind, uuid: &str) -> DeviceEvent {
        DeviceEvent::Camera(CameraEvent {
            timestamp: ts(secs),
            kind,
            file_uuid: Some(uuid.to_string()),
        })
    }

    fn ride(id: &str, start: i64, end: i64) -> RawLog {
        let mut events = vec![DeviceEvent::Start { timestamp: ts(start) }];
        events.extend((start..=end).step_by(10).map(speed));
        events.push(DeviceEvent::Stop { timestamp: ts(end) });
        RawLog {
            id: LogId::new(id),
            events,
        }
    }

    fn with_camera(mut raw: RawLog, extra: Vec<DeviceEvent>) -> RawLog {
        raw.events.extend(extra);
        raw.events.sort_by_key(DeviceEvent::timestamp);
        raw
    }

    fn partition_all(pipeline: &MatchingPipeline, raws: Vec<RawLog>) -> Vec<LogFile> {
        raws.into_iter()
            .map(|raw| pipeline.partition(raw).unwrap())
            .collect()
    }

    #[test]
    fn test_partition_keeps_camera_events() {
        let pipeline = MatchingPipeline::default();
        let raw = RawLog {
            id: LogId::new("cam.fit"),
            events: vec![
                speed(0),
                camera(5, CameraEventKind::VideoStart, "clip-1"),
                speed(10),
                camera(15, CameraEventKind::VideoEnd, "clip-1"),
            ],
        };
        let log = pipeline.partition(raw).unwrap();
        assert_eq!(log.sessions.len(), 1);
        assert_eq!(log.camera_events.len(), 2);
        assert_eq!(log.camera_window("clip-1"), Some(range(5, 15)));
    }

    #[test]
    fn test_resolve_by_time_window() {
        let pipeline = MatchingPipeline::default();
        let logs = partition_all(
            &pipeline,
            vec![ride("morning.fit", 0, 600), ride("evening.fit", 5000, 8000)],
        );
        let video = VideoTarget::new("GX010001.MP4", range(6000, 6300));

        let resolution = pipeline.resolve(&video, &logs).unwrap();
        assert_eq!(resolution.strategy, MatchStrategy::TimeWindow);
        assert_eq!(resolution.log_id(), "evening.fit");
        assert_eq!(resolution.target, video.range);
        assert_eq!(
            pipeline.resolve_matching_log(&video, &logs).unwrap(),
            "evening.fit"
        );
    }

    #[test]
    fn test_no_overlap_is_no_match() {
        let pipeline = MatchingPipeline::default();
        let logs = partition_all(&pipeline, vec![ride("morning.fit", 0, 600)]);
        let video = VideoTarget::new("late.mp4", range(9000, 9100));

        let err = pipeline.extract_video_data(&video, &logs).unwrap_err();
        assert!(matches!(err, ContractError::NoMatch { .. }));
    }

    fn uuid_pipeline() -> MatchingPipeline {
        let mut config = MatcherConfig::default();
        config.matching.use_camera_uuid = true;
        MatchingPipeline::new(&config)
    }

    #[test]
    fn test_default_picks_largest_overlap_over_uuid() {
        let pipeline = MatchingPipeline::default();
        let tagged = with_camera(
            ride("helmet.fit", 100, 150),
            vec![camera(100, CameraEventKind::VideoStart, "abc")],
        );
        let logs = partition_all(&pipeline, vec![tagged, ride("bike.fit", 0, 1000)]);
        let video = VideoTarget::new("clip.mp4", range(100, 400)).with_camera_file_uuid("abc");

        let resolution = pipeline.resolve(&video, &logs).unwrap();
        assert_eq!(resolution.strategy, MatchStrategy::TimeWindow);
        assert_eq!(resolution.log_id(), "bike.fit");
        assert_eq!(resolution.matched.overlap, video.range);
    }

    #[test]
    fn test_camera_uuid_preferred_when_enabled() {
        let pipeline = uuid_pipeline();
        let tagged = with_camera(
            ride("helmet.fit", 100, 400),
            vec![
                camera(100, CameraEventKind::VideoStart, "abc"),
                camera(200, CameraEventKind::VideoEnd, "abc"),
            ],
        );
        let logs = partition_all(&pipeline, vec![tagged, ride("bike.fit", 0, 1000)]);
        let video = VideoTarget::new("clip.mp4", range(100, 400)).with_camera_file_uuid("abc");

        let resolution = pipeline.resolve(&video, &logs).unwrap();
        assert_eq!(resolution.strategy, MatchStrategy::CameraUuid);
        assert_eq!(resolution.log_id(), "helmet.fit");
        assert_eq!(resolution.target, range(100, 200));
        // extraction still covers the whole video
        assert_eq!(resolution.window, video.range);
        let records = resolution.records();
        assert_eq!(records.first().unwrap().timestamp, ts(100));
        assert_eq!(records.last().unwrap().timestamp, ts(400));
    }

    #[test]
    fn test_unknown_uuid_falls_back_to_time_window() {
        let pipeline = uuid_pipeline();
        let logs = partition_all(&pipeline, vec![ride("bike.fit", 0, 1000)]);
        let video = VideoTarget::new("clip.mp4", range(100, 400)).with_camera_file_uuid("zzz");

        let resolution = pipeline.resolve(&video, &logs).unwrap();
        assert_eq!(resolution.strategy, MatchStrategy::TimeWindow);
        assert_eq!(resolution.log_id(), "bike.fit");
    }

    #[test]
    fn test_extract_video_data_window() {
        let pipeline = MatchingPipeline::default();
        let logs = partition_all(&pipeline, vec![ride("ride.fit", 500, 700)]);
        let video = VideoTarget::new("clip.mp4", range(550, 650));

        let table = pipeline.extract_video_data(&video, &logs).unwrap();
        assert_eq!(table.row_count(), 11);
        assert_eq!(table.rows.first().unwrap().timestamp, ts(550));
        assert_eq!(table.rows.last().unwrap().timestamp, ts(650));
        assert_eq!(table.value(0, SensorKind::Speed, "speed"), Some(550.0));
    }

    #[test]
    fn test_sparse_window_is_empty_table() {
        let pipeline = MatchingPipeline::default();
        let logs = partition_all(&pipeline, vec![ride("ride.fit", 0, 100)]);
        // overlaps the session but falls between samples
        let video = VideoTarget::new("clip.mp4", range(41, 49));

        let table = pipeline.extract_video_data(&video, &logs).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_forward_fill_applied() {
        let mut config = MatcherConfig::default();
        config.extraction.fill = FillPolicy::Forward;
        let pipeline = MatchingPipeline::new(&config);

        let raw = RawLog {
            id: LogId::new("mixed.fit"),
            events: vec![
                DeviceEvent::Data(
                    SensorRecord::new(ts(0), SensorKind::HeartRate).with_field("heart_rate", 90.0),
                ),
                speed(1),
                speed(2),
            ],
        };
        let logs = partition_all(&pipeline, vec![raw]);
        let video = VideoTarget::new("clip.mp4", range(0, 2));

        let table = pipeline.extract_video_data(&video, &logs).unwrap();
        assert_eq!(table.value(2, SensorKind::HeartRate, "heart_rate"), Some(90.0));
    }

    #[test]
    fn test_partition_rejects_unsorted() {
        let pipeline = MatchingPipeline::default();
        let raw = RawLog {
            id: LogId::new("bad.fit"),
            events: vec![speed(10), speed(5)],
        };
        assert!(matches!(
            pipeline.partition(raw),
            Err(ContractError::UnsortedInput { .. })
        ));
    }
}
