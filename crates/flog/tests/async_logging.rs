//! Emitting from async tasks

use flog::{LogManager, LogManagerConfig, Logger, LoggerOptions, MemorySink};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_keep_their_own_order() {
    let dir = TempDir::new().unwrap();
    let manager = LogManager::file(dir.path(), 1 << 30).unwrap();
    let logger = manager.new_logger("tasks").unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            tokio::spawn(async move {
                for i in 0..250 {
                    logger.info_async(format!("task{t} {i}")).await;
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    logger.flush_async().await;

    let content = fs::read_to_string(dir.path().join("log/tasks.log")).unwrap();
    assert_eq!(content.lines().count(), 1000);
    for t in 0..4 {
        let prefix = format!("-task{t} ");
        let own: Vec<usize> = content
            .lines()
            .filter_map(|line| line.split_once(&prefix).map(|(_, n)| n.parse().unwrap()))
            .collect();
        assert_eq!(own, (0..250).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_backpressure_waits_instead_of_dropping() {
    let sink = MemorySink::new();
    let options = LoggerOptions {
        queue_capacity: 2,
        ..LoggerOptions::default()
    };
    let logger: Arc<Logger> = Logger::spawn("tight", sink.clone(), options).unwrap();

    for i in 0..200 {
        logger.debug_async(format!("{i}")).await;
    }
    logger.flush_async().await;

    assert_eq!(sink.len(), 200);
}

#[tokio::test]
async fn test_async_call_site_is_captured_at_call() {
    let config = LogManagerConfig::console();
    let manager = LogManager::new(config).unwrap();
    let sink = MemorySink::new();
    let options = LoggerOptions::from(manager.config());
    let logger = Logger::spawn("site", sink.clone(), options).unwrap();

    let pending = logger.error_async("later");
    let line = line!() - 1;
    pending.await;
    logger.flush_async().await;

    assert!(sink.lines()[0].ends_with(&format!(" async_logging.rs:{line}-later\n")));
}
