//! # Integration Tests
//!
//! End-to-end tests over real file formats.
//!
//! Covers:
//! - Config snapshot tests
//! - FIT / JSONL logs and MP4 videos on disk -> match -> export
//! - Skip-on-corrupt ingestion and the no-match outcome

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, MatcherConfig};

    #[test]
    fn test_default_config_round_trips_through_loader() {
        let toml = config_loader::ConfigLoader::to_toml(&MatcherConfig::default()).unwrap();
        let parsed = config_loader::ConfigLoader::load_from_str(
            &toml,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(parsed.version, ConfigVersion::V1);
        assert_eq!(parsed.ingestion.extensions, vec!["fit", "jsonl"]);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use contracts::{
        timestamp_from_secs, CameraEventKind, ContractError, FillPolicy, LogFile, MatcherConfig,
        SensorKind, Timestamp, VideoMetadataReader,
    };
    use export::{create_sink, export_table, sink_config_for_output};
    use ingestion::{
        collect_candidates, mp4_file, FitFileBuilder, FitSample, IngestionPipeline,
        Mp4MetadataReader,
    };
    use timeline_engine::{MatchStrategy, MatchingPipeline};

    const T0: i64 = 1_700_000_000;

    fn ts(offset: i64) -> Timestamp {
        timestamp_from_secs(T0 + offset).unwrap()
    }

    /// Activity with one timer session covering `[start, end]`, a record
    /// every second
    fn activity(start: i64, end: i64) -> FitFileBuilder {
        let mut builder = FitFileBuilder::new().timer_start(ts(start));
        for s in start..=end {
            builder = builder.record(
                ts(s),
                FitSample {
                    position: Some((45.0 + s as f64 * 1e-5, 7.0)),
                    speed_mps: Some(5.0),
                    ..FitSample::heart_rate(120 + (s % 20) as u8)
                },
            );
        }
        builder.timer_stop(ts(end))
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    async fn load(dir: &Path, config: &MatcherConfig) -> (Vec<LogFile>, usize) {
        let engine = Arc::new(MatchingPipeline::new(config));
        let paths = collect_candidates(&[dir.to_path_buf()], &config.ingestion).unwrap();
        let report = IngestionPipeline::with_default_readers(config.ingestion.clone())
            .load(paths, move |raw| engine.partition(raw))
            .await
            .unwrap();
        (report.loaded, report.skipped.len())
    }

    #[tokio::test]
    async fn test_find_and_extract_by_time_window() {
        let logs = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();

        write(logs.path(), "morning.fit", &activity(100, 200).build());
        write(logs.path(), "afternoon.fit", &activity(500, 700).build());
        let video = write(
            media.path(),
            "GX010001.MP4",
            &mp4_file(ts(550), 100_000, 1000, 0, None),
        );

        let config = MatcherConfig::default();
        let target = Mp4MetadataReader.read(&video).unwrap();
        let (loaded, skipped) = load(logs.path(), &config).await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(skipped, 0);

        let engine = MatchingPipeline::new(&config);
        let resolution = engine.resolve(&target, &loaded).unwrap();
        assert!(resolution.log_id().ends_with("afternoon.fit"));
        assert_eq!(resolution.strategy, MatchStrategy::TimeWindow);
        assert_eq!(resolution.matched.overlap, target.range);

        let table = engine.tabulate(&resolution);
        assert_eq!(table.row_count(), 101);
        assert_eq!(table.rows[0].timestamp, ts(550));
        assert_eq!(table.rows[100].timestamp, ts(650));
        assert!(table.column_index(SensorKind::Gps, "latitude").is_some());
        assert_eq!(table.value(0, SensorKind::Speed, "speed"), Some(5.0));

        let out = media.path().join("clip.csv");
        let mut sink = create_sink(&sink_config_for_output(&out, None).unwrap()).unwrap();
        assert_eq!(export_table(&mut sink, &table).await.unwrap(), 101);

        let csv = std::fs::read_to_string(&out).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("timestamp,"));
        assert!(header.contains("heart_rate.heart_rate"));
        assert_eq!(csv.lines().count(), 102);
    }

    #[tokio::test]
    async fn test_corrupt_log_is_skipped() {
        let logs = tempfile::tempdir().unwrap();

        write(logs.path(), "good.fit", &activity(500, 700).build());
        let mut damaged = activity(500, 700).build();
        let mid = damaged.len() / 2;
        damaged[mid] ^= 0xFF;
        write(logs.path(), "damaged.fit", &damaged);
        write(logs.path(), "notes.jsonl", b"{\"type\":\"start\"\n");

        let (loaded, skipped) = load(logs.path(), &MatcherConfig::default()).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(skipped, 2);
        assert!(loaded[0].identifier.ends_with("good.fit"));
    }

    #[tokio::test]
    async fn test_no_overlap_is_no_match() {
        let logs = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();

        write(logs.path(), "ride.fit", &activity(100, 200).build());
        let video = write(
            media.path(),
            "late.mp4",
            &mp4_file(ts(5_000), 10_000, 1000, 1, None),
        );

        let config = MatcherConfig::default();
        let target = Mp4MetadataReader.read(&video).unwrap();
        let (loaded, _) = load(logs.path(), &config).await;

        let err = MatchingPipeline::new(&config)
            .resolve_matching_log(&target, &loaded)
            .unwrap_err();
        assert!(matches!(err, ContractError::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_camera_uuid_opt_in_wins_over_larger_overlap() {
        let logs = tempfile::tempdir().unwrap();
        let media = tempfile::tempdir().unwrap();

        // long ride covering the whole clip, no camera events; it overlaps
        // the clip by 150s against 102s for the tagged ride
        write(logs.path(), "a-long.fit", &activity(0, 1000).build());
        // short ride whose camera events name the clip
        let tagged = activity(590, 700)
            .camera_event(ts(600), CameraEventKind::VideoStart, Some("VIRB-0042"))
            .camera_event(ts(640), CameraEventKind::VideoEnd, Some("VIRB-0042"));
        write(logs.path(), "b-tagged.fit", &tagged.build());

        let video = write(
            media.path(),
            "VIRB0042.MP4",
            &mp4_file(ts(598), 150_000, 1000, 0, Some("VIRB-0042")),
        );

        let config = MatcherConfig::default();
        let target = Mp4MetadataReader.read(&video).unwrap();
        assert_eq!(target.camera_file_uuid.as_deref(), Some("VIRB-0042"));
        let (loaded, _) = load(logs.path(), &config).await;

        // by default the larger overlap wins
        let resolution = MatchingPipeline::new(&config)
            .resolve(&target, &loaded)
            .unwrap();
        assert!(resolution.log_id().ends_with("a-long.fit"));
        assert_eq!(resolution.strategy, MatchStrategy::TimeWindow);

        let mut by_uuid = config.clone();
        by_uuid.matching.use_camera_uuid = true;
        let engine = MatchingPipeline::new(&by_uuid);
        let resolution = engine.resolve(&target, &loaded).unwrap();
        assert!(resolution.log_id().ends_with("b-tagged.fit"));
        assert_eq!(resolution.strategy, MatchStrategy::CameraUuid);
        assert_eq!(
            resolution.target,
            contracts::TimeRange::new(ts(600), ts(640)).unwrap()
        );

        // data is still cut to the clip's own range, clipped to the session
        let table = engine.tabulate(&resolution);
        assert_eq!(table.rows.first().unwrap().timestamp, ts(598));
        assert_eq!(table.rows.last().unwrap().timestamp, ts(700));
    }

    #[tokio::test]
    async fn test_jsonl_log_with_forward_fill() {
        let logs = tempfile::tempdir().unwrap();
        let lines = [
            r#"{"type":"start","timestamp":"2023-11-14T22:13:20Z"}"#,
            r#"{"type":"data","timestamp":"2023-11-14T22:13:21Z","sensor_kind":"heart_rate","fields":{"heart_rate":110.0}}"#,
            r#"{"type":"data","timestamp":"2023-11-14T22:13:22Z","sensor_kind":"power","fields":{"power":250.0}}"#,
            r#"{"type":"data","timestamp":"2023-11-14T22:13:23Z","sensor_kind":"heart_rate","fields":{"heart_rate":112.0}}"#,
            r#"{"type":"stop","timestamp":"2023-11-14T22:13:30Z"}"#,
        ];
        write(logs.path(), "trainer.jsonl", lines.join("\n").as_bytes());

        let mut config = MatcherConfig::default();
        config.extraction.fill = FillPolicy::Forward;
        let (loaded, _) = load(logs.path(), &config).await;

        let video = contracts::VideoTarget::new(
            "clip",
            contracts::TimeRange::new(ts(0), ts(5)).unwrap(),
        );
        let table = MatchingPipeline::new(&config)
            .extract_video_data(&video, &loaded)
            .unwrap();

        assert_eq!(table.row_count(), 3);
        // heart rate carried into the power-only row
        assert_eq!(table.value(1, SensorKind::HeartRate, "heart_rate"), Some(110.0));
        assert_eq!(table.value(2, SensorKind::Power, "power"), Some(250.0));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let logs = tempfile::tempdir().unwrap();
        for (name, start) in [("x.fit", 0), ("y.fit", 0), ("z.fit", 50)] {
            write(logs.path(), name, &activity(start, start + 100).build());
        }
        let video = contracts::VideoTarget::new(
            "clip",
            contracts::TimeRange::new(ts(20), ts(60)).unwrap(),
        );

        let config = MatcherConfig {
            ingestion: contracts::IngestionConfig {
                workers: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut picks = Vec::new();
        for _ in 0..3 {
            let (loaded, _) = load(logs.path(), &config).await;
            let engine = MatchingPipeline::new(&config);
            picks.push(engine.resolve_matching_log(&video, &loaded).unwrap());
        }
        assert!(picks.windows(2).all(|w| w[0] == w[1]));
        // x and y tie on overlap and start; x sorts first
        assert!(picks[0].ends_with("x.fit"));
    }
}
