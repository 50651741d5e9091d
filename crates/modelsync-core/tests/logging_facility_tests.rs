#![allow(clippy::unwrap_used, clippy::expect_used)]

use modelsync_core::errors::{ExError, ExErrorKind, SyncError};
use modelsync_core::logging_facility::test_capture::init_test_capture;
use modelsync_core::{log_op_end, log_op_error, log_op_start};
use modelsync_core::{Iri, MemoryRepository, ReconcilerConfig, SemanticReconciler, Statement, Term};
use modelsync_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_ERR_KIND,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    assert!(
        capture.last(op_name, EVENT_START).is_some(),
        "Should have captured a start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events = capture.count_events(|e| e.op() == Some(op_name) && e.event() == Some(EVENT_END));
    assert_eq!(end_events, 1, "Should have exactly one end event");
    let end = capture.last(op_name, EVENT_END).unwrap();
    assert_eq!(end.field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = SyncError::ChangeNotFound { change_id: 7 };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_event = capture.last(op_name, EVENT_END_ERROR).unwrap();
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field(FIELD_ERR_KIND), Some("NotFound"));
}

#[test]
fn test_log_op_error_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = ExError::new(ExErrorKind::Repository).with_message("down");
    log_op_error!(op_name, err, duration_ms = 1);

    assert_eq!(
        capture.count_events(
            |e| e.op() == Some(op_name) && e.field(FIELD_ERR_CODE) == Some("ERR_REPOSITORY")
        ),
        1
    );
}

#[test]
fn test_save_changes_emits_start_and_end() {
    let capture = init_test_capture();

    // GIVEN a reconciler writing into a uniquely named graph
    let graph = Iri::new("http://example.com/graph/logging-test");
    let reconciler = SemanticReconciler::new(ReconcilerConfig::new(graph.clone()));
    let mut repo = MemoryRepository::new();

    // WHEN saving one statement
    reconciler
        .save_changes(
            &mut repo,
            &[Statement::new("urn:log:s", "urn:log:p", Term::string("v"))],
            &[],
        )
        .unwrap();

    // THEN both boundaries were logged by the reconciler module
    capture.assert_event_exists("save_changes", EVENT_START);
    let end = capture.last("save_changes", EVENT_END).unwrap();
    assert!(end.component().is_some_and(|c| c.contains("reconcile")));
    assert!(end.field(FIELD_DURATION_MS).is_some());
}
