use std::fs;
use std::path::PathBuf;
use tessera_project::{load_screen, load_settings, save_screen, save_settings, ProjectError, SETTINGS_FILE};
use tessera_runtime::{RuntimeSettings, WorkMode};
use tessera_widgets::{Registry, Screen, WidgetOptions};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn loads_the_control_room_fixture() {
    let definition = load_screen(fixture("control_room.json")).unwrap();

    assert_eq!(definition.name, "control-room");
    assert_eq!(definition.work_mode, WorkMode::Display);
    let codes: Vec<_> = definition.components.iter().filter_map(WidgetOptions::code).collect();
    assert_eq!(codes, ["speed", "lamp", "wall"]);
}

#[test]
fn fixture_builds_a_live_screen() {
    let definition = load_screen(fixture("control_room.json")).unwrap();
    let (ctx, handles) = tessera_runtime::ScreenContext::in_memory(RuntimeSettings::default());
    let mut screen = Screen::new(ctx, Registry::with_builtins());

    assert_eq!(screen.load(&definition), 3);

    assert!(screen.take_diagnostics().is_empty());
    assert_eq!(screen.find("wall").unwrap().children().len(), 2);
    assert!(screen.find_by_code("right-lamp").is_some());
    assert_eq!(handles.transport.subscribe_count("speed"), 1);
}

#[test]
fn save_then_load_keeps_the_definition() {
    let dir = tempfile::tempdir().unwrap();
    let original = load_screen(fixture("control_room.json")).unwrap();
    let path = dir.path().join("screens/copy.json");

    save_screen(&original, &path).unwrap();
    let reloaded = load_screen(&path).unwrap();

    assert_eq!(reloaded, original);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"workMode\": 1"));
    assert!(text.contains("\"compDataBind\""));
}

#[test]
fn other_extensions_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screen.xml");
    fs::write(&path, "<screen/>").unwrap();

    assert!(matches!(load_screen(&path), Err(ProjectError::UnsupportedFormat(_))));
}

#[test]
fn missing_screen_files_report_the_path() {
    let err = load_screen("/nonexistent/lobby.json").unwrap_err();
    assert!(matches!(err, ProjectError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/lobby.json"));
}

#[test]
fn missing_settings_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings(dir.path().join(SETTINGS_FILE)).unwrap();
    assert_eq!(settings, RuntimeSettings::default());
}

#[test]
fn partial_settings_keep_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "subscribe_retry_ms = 2500\n").unwrap();

    let settings = load_settings(&path).unwrap();

    assert_eq!(settings.subscribe_retry_ms, 2500);
    assert_eq!(settings.sync_heartbeat_ms, 30_000);
    assert_eq!(settings.asset_root, "components");
}

#[test]
fn settings_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    let settings = RuntimeSettings {
        asset_root: "assets/widgets".to_string(),
        ..RuntimeSettings::default()
    };

    save_settings(&settings, &path).unwrap();

    assert_eq!(load_settings(&path).unwrap(), settings);
}

#[test]
fn malformed_settings_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "subscribe_retry_ms = \"soon\"\n").unwrap();

    assert!(matches!(load_settings(&path), Err(ProjectError::TomlRead(_))));
}
