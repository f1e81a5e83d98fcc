use super::*;

use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn reads_partial_toml_over_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat.toml");
    fs::write(&path, "server_url = \"http://campus.local:8080\"\n").expect("write");

    let settings = read_settings_file(&path).expect("read");

    assert_eq!(settings.server_url, "http://campus.local:8080");
    assert!(settings.send_history);
    assert_eq!(settings.data_dir, None);
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_settings(Some(&dir.path().join("absent.toml"))).expect_err("missing file");
    assert!(err.to_string().contains("absent.toml"), "{err}");
}

#[test]
fn malformed_toml_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "server_url = [").expect("write");

    let err = read_settings_file(&path).expect_err("invalid toml");
    assert!(err.to_string().contains("broken.toml"), "{err}");
}

#[test]
fn app_prefixed_env_wins_and_blank_values_are_ignored() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        lookup_from(&[
            ("CHAT_SERVER_URL", "http://first:1"),
            ("APP__SERVER_URL", "http://second:2"),
            ("APP__DATA_DIR", "   "),
            ("APP__SEND_HISTORY", "off"),
        ]),
    );

    assert_eq!(settings.server_url, "http://second:2");
    assert_eq!(settings.data_dir, None);
    assert!(!settings.send_history);
    assert_eq!(settings.history_mode(), HistoryMode::Disabled);
}

#[test]
fn unparseable_history_flag_keeps_previous_value() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, lookup_from(&[("APP__SEND_HISTORY", "maybe")]));
    assert!(settings.send_history);
}

#[test]
fn preferences_live_under_configured_data_dir() {
    let settings = ClientSettings {
        data_dir: Some(PathBuf::from("/tmp/ask-chat-profile")),
        ..ClientSettings::default()
    };
    assert_eq!(
        settings.preferences_path().expect("path"),
        PathBuf::from("/tmp/ask-chat-profile/settings.json")
    );
}
