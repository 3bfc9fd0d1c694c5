//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, redact_signed_url, LogFormat, LoggingConfig};

#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).expect("first initialization succeeds");
    tracing::info!(album_id = "my-beats", "logging initialized");

    let second = init_logging(config);
    assert!(second.is_err());
}

#[test]
fn test_signed_urls_never_keep_credentials() {
    let signed = "https://media.example.com/albums/my-beats/01-intro.mp3\
                  ?X-Amz-Credential=AKIA%2F20250101&X-Amz-Signature=deadbeef";
    let redacted = redact_signed_url(signed);

    assert!(redacted.starts_with("https://media.example.com/albums/my-beats/01-intro.mp3"));
    assert!(!redacted.contains("deadbeef"));
    assert!(!redacted.contains("AKIA"));
}

#[test]
fn test_unsigned_urls_pass_through() {
    assert_eq!(
        redact_signed_url("https://media.example.com/latest/cover.jpg"),
        "https://media.example.com/latest/cover.jpg"
    );
    assert_eq!(redact_signed_url(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LogFormat::default(), LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LogFormat::default(), LogFormat::Json);
}
