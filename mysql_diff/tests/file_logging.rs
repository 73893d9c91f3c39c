//! File logging installs a global subscriber, so it lives in its own test binary.

use mysql_diff::config::LoggingConfig;
use mysql_diff::utils::logging::init_logging;
use mysql_diff::Error;

#[test]
fn test_logs_are_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("mysql_diff.log");

    let config = LoggingConfig {
        level: "info".to_string(),
        file: Some(log_path.to_str().unwrap().to_string()),
        ..LoggingConfig::default()
    };
    init_logging(&config).unwrap();

    tracing::info!(target: "mysql_diff::run", tables = 3, "Parsed schema");
    tracing::debug!(target: "mysql_diff::run", "Below the configured level");

    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains("INFO"), "{}", logged);
    assert!(logged.contains("Parsed schema"), "{}", logged);
    assert!(logged.contains("tables=3"), "{}", logged);
    assert!(!logged.contains("Below the configured level"), "{}", logged);
    assert!(!logged.contains('\u{1b}'), "file logs must not carry ANSI colours");

    // A second subscriber cannot be installed in the same process
    let again = LoggingConfig {
        file: Some(dir.path().join("second.log").to_str().unwrap().to_string()),
        ..config
    };
    assert!(matches!(init_logging(&again), Err(Error::ConfigError(_))));
}
