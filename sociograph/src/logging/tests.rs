use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{LogError, create_non_blocking_file, level_to_log_level, parse_log_level};
use tempfile::tempdir;

#[test]
fn test_init_console_logging_is_repeatable() {
    let config = LoggingConfig {
        level: LogLevel::Debug,
        format: LogFormat::Pretty,
        file: None,
        stdout: true,
    };

    // A second call finds the subscriber installed and leaves it alone
    assert!(crate::logging::init(&config).is_ok());
    assert!(crate::logging::init(&config).is_ok());
}

#[test]
fn test_file_writer_creates_directories() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("nested").join("sociograph.log");

    assert!(create_non_blocking_file(&log_path).is_ok());

    assert!(log_path.parent().unwrap().exists());
}

#[test]
fn test_file_writer_rejects_paths_without_file_name() {
    assert!(matches!(create_non_blocking_file("/"), Err(LogError::Other(_))));
}

#[test]
fn test_level_conversion() {
    assert_eq!(parse_log_level("trace").unwrap(), LogLevel::Trace);
    assert_eq!(parse_log_level("DEBUG").unwrap(), LogLevel::Debug);
    assert!(parse_log_level("info").is_ok());
    assert!(parse_log_level("warn").is_ok());
    assert!(parse_log_level("error").is_ok());
    assert!(matches!(
        parse_log_level("invalid"),
        Err(LogError::InvalidLogLevel(_))
    ));

    assert_eq!(level_to_log_level(tracing::Level::TRACE), LogLevel::Trace);
    assert_eq!(level_to_log_level(tracing::Level::DEBUG), LogLevel::Debug);
    assert_eq!(level_to_log_level(tracing::Level::INFO), LogLevel::Info);
    assert_eq!(level_to_log_level(tracing::Level::WARN), LogLevel::Warn);
    assert_eq!(level_to_log_level(tracing::Level::ERROR), LogLevel::Error);
}
