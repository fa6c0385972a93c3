//! End-to-end sweep scenarios against real directories with backdated mtimes

use anyhow::Result;
use disk_sweeper::testing::{create_aged_dir, days};
use disk_sweeper::{
    CancelSignal, Command, HostResource, RunMode, SweepConfig, SweepError, Worker,
};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Three camera directories: `a` is fresh, `b` and `c` are past a 30 day threshold
struct Fixture {
    _temp_dir: TempDir,
    root: PathBuf,
    a: PathBuf,
    b: PathBuf,
    c: PathBuf,
}

fn fixture() -> Result<Fixture> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_path_buf();
    let a = create_aged_dir(&root, "camera-a", 10_000, days(1))?;
    let b = create_aged_dir(&root, "camera-b", 50_000, days(45))?;
    let c = create_aged_dir(&root, "camera-c", 20_000, days(60))?;
    Ok(Fixture {
        _temp_dir: temp_dir,
        root,
        a,
        b,
        c,
    })
}

fn orphan_paths(result: &disk_sweeper::SweepResult) -> Vec<PathBuf> {
    result.orphans_found.iter().map(|o| o.path.clone()).collect()
}

fn child_names(root: &Path) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(root)? {
        names.insert(entry?.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

#[tokio::test]
async fn test_live_sweep_deletes_only_orphans() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    let response = worker.dispatch(Command::Sweep).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert_eq!(result.mode, RunMode::Sweep);
    assert!(!result.dry_run);
    assert_eq!(result.candidates_scanned, 3);
    assert_eq!(orphan_paths(result), vec![f.b.clone(), f.c.clone()]);
    assert_eq!(result.bytes_reclaimed_or_estimated, 70_000);
    assert!(result.errors.is_empty());
    assert!(!result.cancelled);

    assert!(f.a.exists());
    assert!(!f.b.exists());
    assert!(!f.c.exists());

    let stats = worker.stats();
    assert_eq!(stats.total_runs, 1);
    assert_eq!(stats.total_orphans_found, 2);
    assert_eq!(stats.total_bytes_reclaimed, 70_000);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_sweep_deletes_nothing() -> Result<()> {
    let f = fixture()?;
    let before = child_names(&f.root)?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30).with_dry_run(true));

    let response = worker.dispatch(Command::Sweep).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert!(result.dry_run);
    assert_eq!(result.orphan_count(), 2);
    assert_eq!(result.bytes_reclaimed_or_estimated, 70_000);
    assert_eq!(result.bytes_reclaimed(), 0);
    assert_eq!(child_names(&f.root)?, before);

    let stats = worker.stats();
    assert_eq!(stats.total_runs, 1);
    assert_eq!(stats.total_orphans_found, 2);
    assert_eq!(stats.total_bytes_reclaimed, 0);
    Ok(())
}

#[tokio::test]
async fn test_analyze_never_deletes() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    let response = worker.dispatch(Command::Analyze).await?;
    let result = response.as_run().expect("analyze returns a run result");

    assert_eq!(result.mode, RunMode::Analyze);
    assert!(result.dry_run);
    assert_eq!(orphan_paths(result), vec![f.b.clone(), f.c.clone()]);
    assert_eq!(result.bytes_reclaimed_or_estimated, 70_000);
    assert!(f.b.exists());
    assert!(f.c.exists());
    assert_eq!(worker.stats().total_bytes_reclaimed, 0);
    Ok(())
}

#[tokio::test]
async fn test_second_sweep_finds_nothing() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    worker.dispatch(Command::Sweep).await?;
    let second = worker.dispatch(Command::Sweep).await?;
    let result = second.as_run().expect("sweep returns a run result");

    assert_eq!(result.candidates_scanned, 1);
    assert_eq!(result.orphan_count(), 0);
    assert_eq!(result.bytes_reclaimed_or_estimated, 0);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].path, f.a);

    let stats = worker.stats();
    assert_eq!(stats.total_runs, 2);
    assert_eq!(stats.total_orphans_found, 2);
    assert_eq!(stats.total_bytes_reclaimed, 70_000);
    Ok(())
}

#[tokio::test]
async fn test_status_accumulates_over_runs() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    worker.dispatch(Command::Analyze).await?;
    worker.dispatch(Command::Analyze).await?;
    worker.dispatch(Command::Sweep).await?;

    let response = worker.dispatch(Command::Status).await?;
    let status = response.as_status().expect("status returns a report");

    assert_eq!(status.stats.total_runs, 3);
    assert_eq!(status.stats.total_orphans_found, 6);
    assert_eq!(status.stats.total_bytes_reclaimed, 70_000);
    assert_eq!(status.stats.last_error_count, 0);

    let last = status
        .stats
        .last_run_result
        .as_ref()
        .expect("last run is recorded");
    assert_eq!(last.mode, RunMode::Sweep);
    assert_eq!(last.bytes_reclaimed_or_estimated, 70_000);
    Ok(())
}

#[tokio::test]
async fn test_young_directories_are_skipped_with_reason() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    let response = worker.dispatch(Command::Analyze).await?;
    let result = response.as_run().expect("analyze returns a run result");

    assert_eq!(result.skipped.len(), 1);
    let skipped = &result.skipped[0];
    assert_eq!(skipped.path, f.a);
    assert_eq!(skipped.age_days, 1);
    assert!(skipped.reason.contains("threshold: 30"));
    Ok(())
}

#[tokio::test]
async fn test_without_threshold_nothing_is_orphaned() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root));

    let response = worker.dispatch(Command::Sweep).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert_eq!(result.candidates_scanned, 3);
    assert_eq!(result.orphan_count(), 0);
    assert_eq!(result.skipped.len(), 3);
    assert!(f.a.exists() && f.b.exists() && f.c.exists());
    Ok(())
}

#[tokio::test]
async fn test_zero_threshold_orphans_everything() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(0));

    let response = worker.dispatch(Command::Analyze).await?;
    let result = response.as_run().expect("analyze returns a run result");

    assert_eq!(result.orphan_count(), 3);
    assert_eq!(result.bytes_reclaimed_or_estimated, 80_000);
    assert_eq!(
        orphan_paths(result),
        vec![f.b.clone(), f.c.clone(), f.a.clone()]
    );
    Ok(())
}

#[tokio::test]
async fn test_top_level_files_are_ignored() -> Result<()> {
    let f = fixture()?;
    let loose = f.root.join("old-export.mp4");
    fs::write(&loose, vec![0u8; 4096])?;
    disk_sweeper::testing::set_modified(
        &loose,
        std::time::SystemTime::now() - days(400),
    )?;

    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));
    let response = worker.dispatch(Command::Sweep).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert_eq!(result.candidates_scanned, 3);
    assert_eq!(result.bytes_reclaimed_or_estimated, 70_000);
    assert!(loose.exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_target_fails_without_touching_stats() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("unmounted");
    let worker = Worker::new(SweepConfig::new(&missing).with_days_old(30));

    for command in [Command::Analyze, Command::Sweep] {
        let err = worker.dispatch(command).await.unwrap_err();
        assert!(matches!(err, SweepError::PathNotFound { ref path, .. } if *path == missing));
    }

    let response = worker.dispatch(Command::Status).await?;
    let status = response.as_status().expect("status returns a report");
    assert!(!status.target_exists);
    assert_eq!(status.stats.total_runs, 0);
    assert!(status.stats.last_run_result.is_none());
    Ok(())
}

#[tokio::test]
async fn test_excluded_directory_survives() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(
        SweepConfig::new(&f.root)
            .with_days_old(30)
            .with_exclude(["camera-b"]),
    );

    let response = worker.dispatch(Command::Sweep).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert_eq!(result.candidates_scanned, 2);
    assert_eq!(orphan_paths(result), vec![f.c.clone()]);
    assert_eq!(result.bytes_reclaimed_or_estimated, 20_000);
    assert!(f.b.exists());
    assert!(!f.c.exists());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_before_start_deletes_nothing() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    let cancel = CancelSignal::new();
    cancel.cancel();
    let response = worker.dispatch_with_cancel(Command::Sweep, &cancel).await?;
    let result = response.as_run().expect("sweep returns a run result");

    assert!(result.cancelled);
    assert_eq!(result.bytes_reclaimed_or_estimated, 0);
    assert!(f.b.exists());
    assert!(f.c.exists());
    assert_eq!(worker.stats().total_runs, 1);
    assert!(!worker.sweeper().is_running());
    Ok(())
}

#[tokio::test]
async fn test_reconfigure_through_host_seam() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(90));

    let first = worker.dispatch(Command::Analyze).await?;
    assert_eq!(first.as_run().map(|r| r.orphan_count()), Some(0));

    HostResource::reconfigure(
        &worker,
        &json!({
            "json": json!({
                "target_path": f.root.to_string_lossy(),
                "days_old": 50.0
            })
            .to_string()
        }),
    )?;
    assert_eq!(worker.config().days_old, Some(50));

    let second = worker.dispatch(Command::Analyze).await?;
    let result = second.as_run().expect("analyze returns a run result");
    assert_eq!(orphan_paths(result), vec![f.c.clone()]);
    Ok(())
}

#[tokio::test]
async fn test_do_command_result_shape() -> Result<()> {
    let f = fixture()?;
    let worker = Worker::new(SweepConfig::new(&f.root).with_days_old(30));

    let value = worker.do_command(&json!({ "command": "sweep" })).await?;
    for key in [
        "run_id",
        "mode",
        "dry_run",
        "candidates_scanned",
        "orphans",
        "skipped",
        "bytes_reclaimed_or_estimated",
        "errors",
        "cancelled",
        "started_at",
        "finished_at",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(value["mode"], "sweep");
    assert_eq!(value["orphans"][0]["size_bytes"], 50_000);
    assert_eq!(value["orphans"][0]["age_days"], 45);

    let status = worker.do_command(&json!({ "command": "status" })).await?;
    assert_eq!(status["total_runs"], 1);
    assert_eq!(status["total_bytes_reclaimed"], 70_000);
    assert_eq!(status["days_old"], 30);
    assert_eq!(status["run_in_progress"], false);

    let err = worker
        .do_command(&json!({ "command": "purge" }))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown command: 'purge'"));
    Ok(())
}
