use super::settings::{Settings, SubscribePolicy};
use super::load_config_from;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.broker.subscribe_policy, SubscribePolicy::AutoCreate);
    assert_eq!(settings.broker.address_schemes, vec!["http://", "https://"]);
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("nothing-here");

    let cfg = load_config_from(missing.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.broker.subscribe_policy, SubscribePolicy::AutoCreate);
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("pullsub.toml");
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [broker]
        subscribe_policy = "strict"
        address_schemes = ["https://"]
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.broker.subscribe_policy, SubscribePolicy::Strict);
    assert_eq!(cfg.broker.address_schemes, vec!["https://"]);
    // untouched section keeps its default
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn load_config_from_env_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("nothing-here");

    temp_env::with_vars(
        [
            ("PULLSUB_SERVER__PORT", Some("9100")),
            ("PULLSUB_BROKER__SUBSCRIBE_POLICY", Some("strict")),
            ("PULLSUB_BROKER__ADDRESS_SCHEMES", Some("http://,grpc://")),
            ("PULLSUB_LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config_from(missing.to_str().unwrap()).expect("load_config failed");
            assert_eq!(cfg.server.port, 9100);
            assert_eq!(cfg.server.host, "127.0.0.1");
            assert_eq!(cfg.broker.subscribe_policy, SubscribePolicy::Strict);
            assert_eq!(cfg.broker.address_schemes, vec!["http://", "grpc://"]);
            assert_eq!(cfg.logging.level, "debug");
        },
    );
}

#[test]
#[serial]
fn load_config_rejects_unknown_policy() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("pullsub.toml");
    fs::write(&path, "[broker]\nsubscribe_policy = \"sometimes\"\n").expect("write config file");

    assert!(load_config_from(path.to_str().unwrap()).is_err());
}

#[test]
#[serial]
fn load_config_rejects_empty_scheme_list() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("pullsub.toml");
    fs::write(&path, "[broker]\naddress_schemes = []\n").expect("write config file");

    let err = load_config_from(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("broker.address_schemes"));
}

#[test]
#[serial]
fn load_config_rejects_blank_scheme_entry() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("nothing-here");

    temp_env::with_var("PULLSUB_BROKER__ADDRESS_SCHEMES", Some(""), || {
        assert!(load_config_from(missing.to_str().unwrap()).is_err());
    });

    let path = tmp.path().join("pullsub.toml");
    fs::write(&path, "[broker]\naddress_schemes = [\"http://\", \" \"]\n")
        .expect("write config file");
    let err = load_config_from(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("address_schemes[1]"));
}
