//! Tests for launch argument parsing and transport selection

use mcpfs_domain::{Error, TransportKind};
use mcpfs_infrastructure::config::AppConfig;
use mcpfs_server::LaunchArgs;

#[test]
fn test_no_arguments_shows_usage() {
    let args = LaunchArgs::parse(Vec::<String>::new());

    assert!(args.show_usage);
    assert_eq!(args.transport, None);
    assert!(args.directories.is_empty());
}

#[test]
fn test_transport_keyword_then_directories() {
    let args = LaunchArgs::parse(["sse", "/a", "/b"]);

    assert!(!args.show_usage);
    assert_eq!(args.transport, Some(TransportKind::Sse));
    assert_eq!(args.directories, vec!["/a".to_string(), "/b".to_string()]);
}

#[test]
fn test_streamable_http_keyword_alone() {
    let args = LaunchArgs::parse(["streamableHttp"]);

    assert_eq!(args.transport, Some(TransportKind::StreamableHttp));
    assert!(args.directories.is_empty());
}

#[test]
fn test_directories_only() {
    let args = LaunchArgs::parse(["/data", "sse"]);

    assert_eq!(args.transport, None);
    assert_eq!(args.directories, vec!["/data".to_string(), "sse".to_string()]);
}

#[test]
fn test_keyword_match_is_exact() {
    let args = LaunchArgs::parse(["SSE", "/data"]);

    assert_eq!(args.transport, None);
    assert_eq!(args.directories.len(), 2);
}

#[test]
fn test_select_transport_defaults_to_config() {
    let config = AppConfig::default();

    let selected = LaunchArgs::parse(["/data"]).select_transport(&config).unwrap();

    assert_eq!(selected, TransportKind::StreamableHttp);
}

#[test]
fn test_cli_keyword_overrides_config() {
    let mut config = AppConfig::default();
    config.server.transport = "streamableHttp".to_string();

    let selected = LaunchArgs::parse(["sse"]).select_transport(&config).unwrap();

    assert_eq!(selected, TransportKind::Sse);
}

#[test]
fn test_unknown_configured_transport_is_rejected() {
    let mut config = AppConfig::default();
    config.server.transport = "websocket".to_string();

    let err = LaunchArgs::parse(["/data"])
        .select_transport(&config)
        .unwrap_err();

    assert!(matches!(err, Error::UnknownTransport { .. }));
    let message = err.to_string();
    assert!(message.contains("websocket"));
    assert!(message.contains("sse"));
    assert!(message.contains("streamableHttp (default)"));
}

#[test]
fn test_directory_inputs_prefer_command_line() {
    let args = LaunchArgs::parse(["sse", "/cli"]);

    let inputs = args.directory_inputs(Some("/env/a:/env/b".to_string()));

    assert_eq!(inputs, vec!["/cli".to_string()]);
}

#[test]
fn test_directory_inputs_fall_back_to_environment() {
    let args = LaunchArgs::parse(["sse"]);

    let inputs = args.directory_inputs(Some("/env/a:/env/b".to_string()));

    assert_eq!(inputs, vec!["/env/a".to_string(), "/env/b".to_string()]);
}

#[test]
fn test_directory_inputs_empty_without_sources() {
    let args = LaunchArgs::parse(Vec::<String>::new());

    assert!(args.directory_inputs(None).is_empty());
}
