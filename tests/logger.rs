use log::Log;
use portal::config::LoggingConfig;
use portal::logger::{build_dispatch, get_log_file_path, Logger};

#[test]
fn test_buffer_returns_newest_first() {
    let logger = Logger::new();
    assert!(logger.is_empty());

    logger.log("first".to_string());
    logger.log("second".to_string());

    let logs = logger.get_logs();
    assert_eq!(logs, vec!["second".to_string(), "first".to_string()]);
    assert_eq!(logger.len(), 2);

    logger.clear();
    assert!(logger.is_empty());
}

#[test]
fn test_buffer_is_bounded() {
    let logger = Logger::new();
    for i in 0..1500 {
        logger.log(format!("message {}", i));
    }

    let logs = logger.get_logs();
    assert_eq!(logs.len(), 1000);
    assert_eq!(logs[0], "message 1499");
    assert_eq!(logs[999], "message 500");
}

#[test]
fn test_dispatch_feeds_buffer() {
    let sink = Logger::new();
    let config = LoggingConfig::default();
    let (level, logger) = build_dispatch(&config, &sink).unwrap().into_log();
    assert_eq!(level, log::LevelFilter::Info);

    logger.log(
        &log::Record::builder()
            .args(format_args!("Fetched 3 jobs"))
            .level(log::Level::Info)
            .target("portal::orchestrator")
            .build(),
    );
    logger.log(
        &log::Record::builder()
            .args(format_args!("ignored"))
            .level(log::Level::Debug)
            .target("portal::orchestrator")
            .build(),
    );

    let logs = sink.get_logs();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("Fetched 3 jobs"));
    assert!(logs[0].contains("INFO"));
}

#[test]
fn test_dispatch_writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("portal.log");
    let config = LoggingConfig {
        enabled: true,
        level: "debug".to_string(),
        file: Some(path.clone()),
    };

    let sink = Logger::new();
    let (_, logger) = build_dispatch(&config, &sink).unwrap().into_log();
    logger.log(
        &log::Record::builder()
            .args(format_args!("Submitting job"))
            .level(log::Level::Debug)
            .target("portal")
            .build(),
    );
    logger.flush();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Submitting job"));
}

#[test]
fn test_invalid_level_is_rejected() {
    let config = LoggingConfig {
        level: "loud".to_string(),
        ..LoggingConfig::default()
    };
    assert!(build_dispatch(&config, &Logger::new()).is_err());
}

#[test]
fn test_log_file_path() {
    let path = get_log_file_path().unwrap();
    assert!(path.ends_with("portal/portal.log"));
}
