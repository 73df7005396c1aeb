//! Tests for transport selection

use mcpfs_domain::{Error, TransportKind};

#[test]
fn test_default_is_streamable_http() {
    assert_eq!(TransportKind::default(), TransportKind::StreamableHttp);
}

#[test]
fn test_parse_known_names() {
    assert_eq!("sse".parse::<TransportKind>().unwrap(), TransportKind::Sse);
    assert_eq!(
        "streamableHttp".parse::<TransportKind>().unwrap(),
        TransportKind::StreamableHttp
    );
}

#[test]
fn test_parse_is_case_sensitive() {
    assert!("SSE".parse::<TransportKind>().is_err());
    assert!("streamablehttp".parse::<TransportKind>().is_err());
}

#[test]
fn test_unknown_transport_lists_choices() {
    let err = "websocket".parse::<TransportKind>().unwrap_err();
    match &err {
        Error::UnknownTransport { name, available } => {
            assert_eq!(name, "websocket");
            assert!(available.contains("sse"));
            assert!(available.contains("streamableHttp (default)"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_serde_uses_wire_names() {
    let json = serde_json::to_string(&TransportKind::StreamableHttp).unwrap();
    assert_eq!(json, "\"streamableHttp\"");

    let kind: TransportKind = serde_json::from_str("\"sse\"").unwrap();
    assert_eq!(kind, TransportKind::Sse);
}

#[test]
fn test_is_keyword() {
    assert!(TransportKind::is_keyword("sse"));
    assert!(TransportKind::is_keyword("streamableHttp"));
    assert!(!TransportKind::is_keyword("/tmp/sse"));
}
