//! Session lifecycle against the mock backend.
//!
//! These tests exercise the process-global session registry, so they are
//! serialized.

use serial_test::serial;
use std::sync::{Arc, Mutex};

use plotlink::{
    AutomationApi, BridgeConfig, BridgeError, MockAutomation, ProjectObject, Session, SharedApi,
    XyTemplate,
};

fn mock() -> Arc<Mutex<MockAutomation>> {
    Arc::new(Mutex::new(MockAutomation::new()))
}

fn shared(mock: &Arc<Mutex<MockAutomation>>) -> SharedApi {
    mock.clone()
}

#[test]
#[serial]
fn open_creates_a_new_project_and_sets_visibility() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.opju");
    let vendor = mock();

    let session = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap();
    {
        let mut api = vendor.lock().unwrap();
        assert!(api
            .call_log()
            .iter()
            .any(|entry| entry.starts_with("save") && entry.contains("run.opju")));
        assert_eq!(api.numeric_var("@VIS").unwrap(), 100.0);
    }
    session.close(false).unwrap();
}

#[test]
#[serial]
fn hidden_session_sets_visibility_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hidden.opju");
    let vendor = mock();
    let mut config = BridgeConfig::default();
    config.session.visible = false;

    let session = Session::open(shared(&vendor), &path, config).unwrap();
    assert_eq!(vendor.lock().unwrap().numeric_var("@VIS").unwrap(), 0.0);
    session.close(false).unwrap();
}

#[test]
#[serial]
fn second_session_on_the_same_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.opju");

    let first = Session::open(shared(&mock()), &path, BridgeConfig::default()).unwrap();
    let err = Session::open(shared(&mock()), &path, BridgeConfig::default()).unwrap_err();
    assert!(matches!(err, BridgeError::SessionConflict(_)));

    // Closing the first session frees the path.
    first.close(false).unwrap();
    let reopened = Session::open(shared(&mock()), &path, BridgeConfig::default()).unwrap();
    reopened.close(false).unwrap();
}

#[test]
#[serial]
fn session_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BridgeConfig::default();
    config.session.max_sessions = 1;

    let first = Session::open(
        shared(&mock()),
        dir.path().join("a.opju"),
        config.clone(),
    )
    .unwrap();
    let err = Session::open(shared(&mock()), dir.path().join("b.opju"), config.clone())
        .unwrap_err();
    assert!(matches!(err, BridgeError::TooManySessions(1)));
    first.close(false).unwrap();
}

#[test]
#[serial]
fn missing_directory_is_rejected_before_the_vendor_is_touched() {
    let vendor = mock();
    let err = Session::open(
        shared(&vendor),
        "/definitely/not/a/real/dir/run.opju",
        BridgeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BridgeError::ProjectDirNotFound(_)));
    assert_eq!(vendor.lock().unwrap().vendor_calls(), 0);
}

#[test]
#[serial]
fn missing_project_without_create_missing_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BridgeConfig::default();
    config.session.create_missing = false;

    let err = Session::open(shared(&mock()), dir.path().join("absent.opju"), config)
        .unwrap_err();
    assert!(matches!(err, BridgeError::ProjectNotFound(_)));
}

#[test]
#[serial]
fn failed_load_reports_and_frees_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.opju");
    std::fs::File::create(&path).unwrap();

    let vendor = mock();
    vendor.lock().unwrap().fail_loads(true);
    let err = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap_err();
    assert!(matches!(err, BridgeError::ProjectLoad { .. }));

    vendor.lock().unwrap().fail_loads(false);
    let session = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap();
    session.close(false).unwrap();
}

#[test]
#[serial]
fn dropping_a_session_saves_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autosave.opju");
    let vendor = mock();

    {
        let session = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap();
        vendor.lock().unwrap().reset_call_log();
        drop(session);
    }
    let api = vendor.lock().unwrap();
    assert!(api.call_log().iter().any(|entry| entry.starts_with("save")));
    assert!(api.call_log().iter().any(|entry| entry == "shutdown"));
}

#[test]
#[serial]
fn exit_command_closes_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exit.opju");
    let vendor = mock();

    let mut session = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap();
    session.execute("exit").unwrap();
    assert!(vendor
        .lock()
        .unwrap()
        .call_log()
        .iter()
        .any(|entry| entry == "shutdown"));

    // The registry slot is free again.
    let reopened = Session::open(shared(&vendor), &path, BridgeConfig::default()).unwrap();
    reopened.close(false).unwrap();
}

#[test]
#[serial]
fn duplicate_page_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = mock();
    let session = Session::open(
        shared(&vendor),
        dir.path().join("pages.opju"),
        BridgeConfig::default(),
    )
    .unwrap();

    session.new_workbook("Data", None).unwrap();
    let err = session.new_workbook("Data", None).unwrap_err();
    assert!(matches!(err, BridgeError::NameConflict(_)));

    // Conflicts apply across page kinds within the folder.
    let err = session.new_graph("Data", XyTemplate::Line).unwrap_err();
    assert!(matches!(err, BridgeError::NameConflict(_)));

    session.close(false).unwrap();
}

#[test]
#[serial]
fn pages_are_found_by_short_and_long_name() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = mock();
    let session = Session::open(
        shared(&vendor),
        dir.path().join("find.opju"),
        BridgeConfig::default(),
    )
    .unwrap();

    let book = session.new_workbook("Raw", None).unwrap();
    book.set_long_name("October run").unwrap();
    session.new_workbook("Processed", None).unwrap();
    session.new_graph("Spectrum", XyTemplate::Scatter).unwrap();

    assert_eq!(session.workbooks().unwrap().len(), 2);
    assert_eq!(session.graphs().unwrap().len(), 1);
    assert_eq!(session.pages().unwrap().len(), 3);

    assert!(session.find_book("Raw").unwrap().is_some());
    assert!(session.find_book("October run").unwrap().is_some());
    assert!(session.find_book("Nope").unwrap().is_none());
    assert!(session.find_graph("Spectrum").unwrap().is_some());

    session.close(false).unwrap();
}

#[test]
#[serial]
fn display_mode_is_written_to_the_visibility_variable() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = mock();
    let session = Session::open(
        shared(&vendor),
        dir.path().join("vis.opju"),
        BridgeConfig::default(),
    )
    .unwrap();

    session.set_display(plotlink::DisplayMode::Normal).unwrap();
    assert_eq!(vendor.lock().unwrap().numeric_var("@VIS").unwrap(), 2.0);
    session.set_visible(false).unwrap();
    assert_eq!(vendor.lock().unwrap().numeric_var("@VIS").unwrap(), 0.0);

    session.close(false).unwrap();
}

#[test]
#[serial]
fn wait_and_flush_use_the_vendor_command_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = mock();
    let session = Session::open(
        shared(&vendor),
        dir.path().join("wait.opju"),
        BridgeConfig::default(),
    )
    .unwrap();

    session.wait().unwrap();
    session.wait_recalculate().unwrap();
    session.flush().unwrap();

    let api = vendor.lock().unwrap();
    assert!(api.call_log().iter().any(|e| e.contains("sec -poc")));
    assert!(api.call_log().iter().any(|e| e.contains("run -p au")));
    assert!(api.call_log().iter().any(|e| e.contains("doc -uw")));
    drop(api);

    session.close(false).unwrap();
}

#[test]
#[serial]
fn save_as_rekeys_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = mock();
    let mut session = Session::open(
        shared(&vendor),
        dir.path().join("old.opju"),
        BridgeConfig::default(),
    )
    .unwrap();

    let new_path = dir.path().join("new.opju");
    session.save_as(&new_path).unwrap();
    assert_eq!(session.path(), new_path.as_path());

    // The old path is free for a fresh session.
    let other = Session::open(
        shared(&mock()),
        dir.path().join("old.opju"),
        BridgeConfig::default(),
    )
    .unwrap();
    other.close(false).unwrap();
    session.close(false).unwrap();
}
