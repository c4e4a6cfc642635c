mod support;

use basic_bridge::{Bridge, BridgeConfig, Settings, SettingsStore};
use pretty_assertions::assert_eq;
use support::{test_config, HarnessHost, RecordingScreen};

fn bridge_with_settings(config: BridgeConfig) -> Bridge<HarnessHost> {
    bridge_with_screen(config, RecordingScreen::default())
}

fn bridge_with_screen(config: BridgeConfig, screen: RecordingScreen) -> Bridge<HarnessHost> {
    Bridge::new(HarnessHost::new(), Box::new(screen), config)
}

#[test]
fn persisted_settings_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("settings.txt");
    let config = BridgeConfig {
        settings_file: Some(file.clone()),
        ..test_config()
    };

    let mut first = bridge_with_settings(config.clone());
    first.settings_mut().font_scale = Some(120);
    first.settings_mut().mute_audio = true;
    first.settings_mut().set_passthrough("serverToken", "abc123");
    first.persist_settings().expect("persist settings");
    let saved = first.settings().clone();
    assert!(saved.path.is_some());

    let screen = RecordingScreen::default();
    let mut second = bridge_with_screen(config, screen.clone());
    second.restore_settings().expect("restore settings");
    assert_eq!(second.settings(), &saved);
    assert_eq!(screen.log().font_scales, vec![120]);

    let on_disk = SettingsStore::new(file).load().expect("load settings");
    assert_eq!(on_disk, Some(saved));
}

#[test]
fn missing_settings_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = BridgeConfig {
        settings_file: Some(dir.path().join("absent.txt")),
        ..test_config()
    };

    let mut bridge = bridge_with_settings(config);
    bridge.restore_settings().expect("restore settings");

    assert_eq!(bridge.settings(), &Settings::default());
}

#[test]
fn settings_without_a_file_are_not_persisted() {
    let mut bridge = bridge_with_settings(test_config());
    bridge.settings_mut().set_passthrough("fontId", "2");

    bridge.persist_settings().expect("persist is a no-op");
    bridge.restore_settings().expect("restore is a no-op");

    assert_eq!(bridge.settings().passthrough("fontId"), Some("2"));
}

#[test]
fn malformed_settings_line_still_restores_the_rest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("settings.txt");
    std::fs::write(
        &file,
        "fontScale2=abc\nmuteAudio=1\nfontId=7\nserverSocket=9000\nserverToken='t0k'\n",
    )
    .expect("write settings");
    let config = BridgeConfig {
        settings_file: Some(file),
        ..test_config()
    };
    let screen = RecordingScreen::default();

    let mut bridge = bridge_with_screen(config, screen.clone());
    bridge.restore_settings().expect("malformed value is not fatal");

    let settings = bridge.settings();
    assert_eq!(settings.font_scale, None);
    assert!(settings.mute_audio);
    assert_eq!(settings.passthrough("fontId"), Some("7"));
    assert_eq!(settings.passthrough("serverSocket"), Some("9000"));
    assert_eq!(settings.passthrough("serverToken"), Some("t0k"));
    assert!(screen.log().font_scales.is_empty());
}
