//! Configuration loader tests
//!
//! Environment-dependent cases run inside `figment::Jail`, which serialises
//! them and restores the environment afterwards.

use figment::Jail;
use mcpfs_domain::TransportKind;
use mcpfs_infrastructure::config::{AppConfig, ConfigLoader};

#[test]
fn test_defaults() {
    let config = AppConfig::default();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3002);
    assert_eq!(
        config.server.transport_kind().unwrap(),
        TransportKind::StreamableHttp
    );
    assert_eq!(config.session.event_store_capacity, 1000);
    assert!(!config.session.json_response);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_keep_alive_zero_disables() {
    let mut config = AppConfig::default();
    assert!(config.session.keep_alive().is_some());

    config.session.keep_alive_secs = 0;
    assert!(config.session.keep_alive().is_none());
}

#[test]
fn test_port_env_overrides_default() {
    Jail::expect_with(|jail| {
        jail.set_env("PORT", "4100");

        let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
        assert_eq!(config.server.port, 4100);
        Ok(())
    });
}

#[test]
fn test_config_file_then_env_precedence() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "mcpfs.toml",
            r#"
            [server]
            host = "0.0.0.0"
            port = 5000
            transport = "sse"

            [session]
            json_response = true
            "#,
        )?;
        jail.set_env("MCPFS_SERVER__PORT", "5001");

        let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert_eq!(
            config.server.transport_kind().map_err(|e| e.to_string())?,
            TransportKind::Sse
        );
        assert!(config.session.json_response);
        Ok(())
    });
}

#[test]
fn test_explicit_config_path() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[logging]\nlevel = \"debug\"\n")?;

        let loader = ConfigLoader::new().with_config_path("custom.toml");
        assert!(loader.config_path().is_some());

        let config = loader.load().map_err(|e| e.to_string())?;
        assert_eq!(config.logging.level, "debug");
        Ok(())
    });
}

#[test]
fn test_custom_env_prefix() {
    Jail::expect_with(|jail| {
        jail.set_env("FSTEST_SESSION__EVENT_STORE_CAPACITY", "7");

        let config = ConfigLoader::new()
            .with_env_prefix("FSTEST")
            .load()
            .map_err(|e| e.to_string())?;
        assert_eq!(config.session.event_store_capacity, 7);
        Ok(())
    });
}

#[test]
fn test_zero_port_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PORT", "0");

        let result = ConfigLoader::new().load();
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_zero_event_store_capacity_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("mcpfs.toml", "[session]\nevent_store_capacity = 0\n")?;

        assert!(ConfigLoader::new().load().is_err());
        Ok(())
    });
}

#[test]
fn test_invalid_log_level_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("mcpfs.toml", "[logging]\nlevel = \"loud\"\n")?;

        assert!(ConfigLoader::new().load().is_err());
        Ok(())
    });
}

#[test]
fn test_unknown_transport_survives_loading() {
    // Rejected later by the transport selector, not by the loader
    Jail::expect_with(|jail| {
        jail.create_file("mcpfs.toml", "[server]\ntransport = \"carrier-pigeon\"\n")?;

        let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
        assert!(config.server.transport_kind().is_err());
        Ok(())
    });
}
