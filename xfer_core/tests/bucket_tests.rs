use std::sync::Arc;

use tempfile::TempDir;

use xfer_core::config::TransferConfig;
use xfer_core::fixture::{create_sample_file, SAMPLE_FILE_LEN};
use xfer_core::progress::{MemorySink, Outcome, Stage};
use xfer_core::transfer::Transfer;
use xfer_core::transport::{validate_key, LocalBucket};
use xfer_core::types::{Direction, TransferError};

// ---------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------

#[test]
fn test_sample_file_has_expected_content() {
    let sample = create_sample_file().unwrap();
    let content = std::fs::read_to_string(sample.path()).unwrap();

    assert_eq!(content.len() as u64, SAMPLE_FILE_LEN);
    assert_eq!(SAMPLE_FILE_LEN, 50_000);
    assert!(content.starts_with("abcdefghijklmnopqrstuvwxyz\n0123456789011234567890\n"));
}

// ---------------------------------------------------------------
// Keys
// ---------------------------------------------------------------

#[test]
fn test_validate_key() {
    assert!(validate_key("object").is_ok());
    assert!(validate_key("nested/dir/object.txt").is_ok());

    for bad in ["", "/abs", "a//b", "../escape", "a/./b", "a/..", "win\\path"] {
        assert!(
            matches!(validate_key(bad), Err(TransferError::InvalidKey { .. })),
            "key {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_object_path_stays_under_root() {
    let dir = TempDir::new().unwrap();
    let bucket = LocalBucket::new(dir.path());
    let path = bucket.object_path("a/b/c").unwrap();
    assert_eq!(path, dir.path().join("a").join("b").join("c"));
}

// ---------------------------------------------------------------
// Put / get round trip
// ---------------------------------------------------------------

#[tokio::test]
async fn test_put_then_get_with_progress() {
    let dir = TempDir::new().unwrap();
    let bucket = LocalBucket::new(dir.path().join("bucket"));
    let sample = create_sample_file().unwrap();

    let put_sink = MemorySink::new();
    let put = bucket
        .put("samples/progress.txt", sample.path())
        .unwrap()
        .with_chunk_size(4096);
    let summary = Transfer::new(Arc::new(put), TransferConfig::default())
        .with_sink(put_sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.direction, Direction::Upload);
    assert_eq!(summary.state.bytes_so_far, SAMPLE_FILE_LEN);
    assert_eq!(summary.state.total_bytes, Some(SAMPLE_FILE_LEN));
    assert!(bucket.exists("samples/progress.txt").await);

    let reports = put_sink.reports();
    assert_eq!(reports.first().unwrap().stage, Stage::Started);
    assert_eq!(reports[1].stage, Stage::TotalKnown);
    assert_eq!(reports.last().unwrap().stage, Stage::Succeeded);
    // 50_000 / 4096 rounds up to 13 chunks
    let chunks = reports.iter().filter(|r| r.stage == Stage::Progress).count();
    assert_eq!(chunks, 13);
    assert!(reports.iter().all(|r| r.anomaly.is_none()));

    let out = dir.path().join("downloaded.txt");
    let get_sink = MemorySink::new();
    let get = bucket.get("samples/progress.txt", &out).unwrap();
    let summary = Transfer::new(Arc::new(get), TransferConfig::default())
        .with_sink(get_sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.direction, Direction::Download);
    assert_eq!(summary.state.outcome, Outcome::Succeeded);
    assert_eq!(
        std::fs::read(&out).unwrap(),
        std::fs::read(sample.path()).unwrap()
    );
    assert!(get_sink
        .reports()
        .iter()
        .any(|r| r.message.contains("download progress: 100%")));
}

#[tokio::test]
async fn test_get_missing_object_fails() {
    let dir = TempDir::new().unwrap();
    let bucket = LocalBucket::new(dir.path());
    let sink = MemorySink::new();

    let get = bucket.get("missing", dir.path().join("out")).unwrap();
    let err = Transfer::new(Arc::new(get), TransferConfig::default())
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::ObjectNotFound(ref k) if k == "missing"), "got {:?}", err);

    let reports = sink.reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].stage, Stage::Started);
    assert_eq!(reports[1].stage, Stage::Failed);
    assert_eq!(reports[1].outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_put_empty_file() {
    let dir = TempDir::new().unwrap();
    let bucket = LocalBucket::new(dir.path().join("bucket"));
    let src = dir.path().join("empty");
    std::fs::write(&src, b"").unwrap();

    let sink = MemorySink::new();
    let put = bucket.put("empty", &src).unwrap();
    let summary = Transfer::new(Arc::new(put), TransferConfig::default())
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.state.bytes_so_far, 0);
    assert_eq!(summary.state.percent(), Some(100));
    let stages: Vec<Stage> = sink.reports().iter().map(|r| r.stage).collect();
    assert_eq!(stages, vec![Stage::Started, Stage::TotalKnown, Stage::Succeeded]);
}

#[test]
fn test_invalid_key_rejected_before_transfer() {
    let bucket = LocalBucket::new("unused");
    assert!(matches!(
        bucket.put("../etc/passwd", "whatever"),
        Err(TransferError::InvalidKey { .. })
    ));
}

// ---------------------------------------------------------------
// Failed copies and configured chunk size
// ---------------------------------------------------------------

#[tokio::test]
async fn test_failed_put_leaves_no_object_behind() {
    let dir = TempDir::new().unwrap();
    let bucket_root = dir.path().join("bucket");
    let bucket = LocalBucket::new(&bucket_root);

    // Opening a directory succeeds on unix but reading it fails mid-copy.
    let not_a_file = dir.path().join("a-directory");
    std::fs::create_dir(&not_a_file).unwrap();

    let put = bucket.put("obj", &not_a_file).unwrap();
    let err = Transfer::new(Arc::new(put), TransferConfig::default())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Io(_)), "got {:?}", err);

    assert!(!bucket.exists("obj").await);
    let leftovers: Vec<_> = std::fs::read_dir(&bucket_root)
        .map(|rd| rd.filter_map(Result::ok).map(|e| e.file_name()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "staging files left: {:?}", leftovers);

    let get = bucket.get("obj", dir.path().join("out")).unwrap();
    let err = Transfer::new(Arc::new(get), TransferConfig::default())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::ObjectNotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_failed_put_keeps_previous_object() {
    let dir = TempDir::new().unwrap();
    let bucket = LocalBucket::new(dir.path().join("bucket"));

    let good = dir.path().join("good.txt");
    std::fs::write(&good, b"first version").unwrap();
    Transfer::new(Arc::new(bucket.put("obj", &good).unwrap()), TransferConfig::default())
        .run()
        .await
        .unwrap();

    let not_a_file = dir.path().join("a-directory");
    std::fs::create_dir(&not_a_file).unwrap();
    let result = Transfer::new(Arc::new(bucket.put("obj", &not_a_file).unwrap()), TransferConfig::default())
        .run()
        .await;
    assert!(result.is_err());

    let stored = std::fs::read(bucket.object_path("obj").unwrap()).unwrap();
    assert_eq!(stored, b"first version");
}

#[tokio::test]
async fn test_bucket_uses_configured_chunk_size() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("hundred.bin");
    std::fs::write(&src, vec![7u8; 100]).unwrap();

    let config = TransferConfig::builder().with_chunk_size(10).build();
    let bucket = LocalBucket::new(dir.path().join("bucket")).with_config(&config);

    let sink = MemorySink::new();
    let summary = Transfer::new(Arc::new(bucket.put("hundred", &src).unwrap()), config)
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.state.bytes_so_far, 100);
    let deltas: Vec<u64> = sink
        .reports()
        .iter()
        .filter(|r| r.stage == Stage::Progress)
        .map(|r| r.delta)
        .collect();
    assert_eq!(deltas, vec![10; 10]);
}
