// Integration tests for the SQLite change ledger

use modelsync_core::core_types::RequestId;
use modelsync_core::ledger::queries;
use modelsync_core::model::now_utc;
use modelsync_core::{ChangeId, ChangeLedger, ChangeStatus, ExErrorKind, InMemoryLedger};
use modelsync_store::SqliteLedger;
use tempfile::TempDir;

fn append(ledger: &mut dyn ChangeLedger, request: &str, path: &str) -> ChangeId {
    ledger
        .append_change(&RequestId::from(request), path, 1, "tester", "{\"add\":[]}")
        .expect("append should succeed")
        .id
}

fn ids(changes: Vec<modelsync_core::ModelChange>) -> Vec<ChangeId> {
    changes.into_iter().map(|c| c.id).collect()
}

#[test]
fn test_append_and_read_back() {
    // Given: An empty ledger
    let mut ledger = SqliteLedger::open_in_memory().unwrap();

    // When: A change is appended
    let created = ledger
        .append_change(&RequestId::from("batch-1"), "class=emf:Case", 3, "admin", "{}")
        .unwrap();

    // Then: Reading it back yields the same pending change
    let read = ledger.get_change(created.id).unwrap().unwrap();
    assert_eq!(read, created);
    assert_eq!(read.status(), ChangeStatus::Pending);
    assert_eq!(read.initial_version, 3);
    assert!(ledger.get_change(ChangeId(999)).unwrap().is_none());
}

#[test]
fn test_lifecycle_round_trips_through_columns() {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let id = append(&mut ledger, "r1", "class=a");

    let applied = ledger.mark_applied(id, 4).unwrap();
    assert_eq!(ledger.get_change(id).unwrap().unwrap(), applied);

    assert!(ledger.mark_failed(id, now_utc(), "store unreachable").unwrap());
    let failed = ledger.get_change(id).unwrap().unwrap();
    assert_eq!(failed.status(), ChangeStatus::Failed);
    assert_eq!(failed.status_message(), Some("store unreachable"));

    let deployed_on = now_utc();
    assert_eq!(ledger.mark_deployed(&[id], deployed_on).unwrap(), 1);
    let deployed = ledger.get_change(id).unwrap().unwrap();
    assert_eq!(deployed.status(), ChangeStatus::Deployed);
    assert_eq!(deployed.deployed_on(), Some(deployed_on));
    assert_eq!(deployed.failed_on(), None);
    assert_eq!(deployed.status_message(), None);
}

#[test]
fn test_mark_applied_errors() {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let id = append(&mut ledger, "r1", "class=a");

    assert_eq!(
        ledger.mark_applied(ChangeId(42), 1).unwrap_err().kind(),
        ExErrorKind::NotFound
    );

    ledger.mark_applied(id, 5).unwrap();
    assert_eq!(
        ledger.mark_applied(id, 4).unwrap_err().kind(),
        ExErrorKind::VersionRegression
    );
    // failed transition leaves the row untouched
    assert_eq!(
        ledger.get_change(id).unwrap().unwrap().applied_version(),
        Some(5)
    );

    ledger.mark_deployed(&[id], now_utc()).unwrap();
    assert_eq!(
        ledger.mark_applied(id, 6).unwrap_err().kind(),
        ExErrorKind::IllegalState
    );
}

#[test]
fn test_mark_deployed_is_idempotent() {
    // Given: Two applied changes and one pending change
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let a = append(&mut ledger, "r1", "class=a");
    let b = append(&mut ledger, "r1", "class=b");
    let pending = append(&mut ledger, "r1", "class=c");
    ledger.mark_applied(a, 1).unwrap();
    ledger.mark_applied(b, 1).unwrap();

    // When: The same batch is marked deployed twice
    let first = ledger.mark_deployed(&[a, b, pending], now_utc()).unwrap();
    let second = ledger.mark_deployed(&[a, b, pending], now_utc()).unwrap();

    // Then: Only the applied rows transition, and only once
    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(
        ledger.get_change(pending).unwrap().unwrap().status(),
        ChangeStatus::Pending
    );
}

#[test]
fn test_path_prefix_is_literal_and_case_sensitive() {
    let mut ledger = SqliteLedger::open_in_memory().unwrap();
    let under = append(&mut ledger, "r1", "class=emf:Case_1/attribute=title");
    let other_case = append(&mut ledger, "r1", "class=EMF:Case_1/attribute=title");
    let wildcard_lookalike = append(&mut ledger, "r1", "class=emf:CaseX1/attribute=title");
    for id in [under, other_case, wildcard_lookalike] {
        ledger.mark_applied(id, 1).unwrap();
    }

    let got = ids(
        ledger
            .not_deployed_changes_for_path("class=emf:Case_1", 1)
            .unwrap(),
    );
    assert_eq!(got, vec![under]);
}

#[test]
fn test_changes_survive_reopen() {
    // Given: A ledger file with applied changes
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ledger.db");
    let (a, b) = {
        let mut ledger = SqliteLedger::open(&db_path).unwrap();
        let a = append(&mut ledger, "r1", "class=a");
        let b = append(&mut ledger, "r1", "class=b");
        ledger.mark_applied(a, 2).unwrap();
        ledger.mark_applied(b, 7).unwrap();
        ledger.mark_deployed(&[a], now_utc()).unwrap();
        (a, b)
    };

    // When: The file is reopened
    let mut ledger = SqliteLedger::open(&db_path).unwrap();

    // Then: State and id sequence are preserved
    assert_eq!(ledger.last_known_model_version().unwrap(), Some(7));
    assert_eq!(ids(ledger.changes_since(2).unwrap()), vec![b]);
    assert!(ledger.get_change(a).unwrap().unwrap().is_deployed());
    let c = append(&mut ledger, "r2", "class=c");
    assert!(c > b);
}

/// Runs the same history against both backends and checks every query agrees
#[test]
fn test_queries_match_in_memory_backend() {
    let mut sqlite = SqliteLedger::open_in_memory().unwrap();
    let mut memory = InMemoryLedger::new();

    let paths = [
        "class=emf:Case/attribute=title",
        "class=emf:Case/attribute=owner",
        "class=emf:Project",
        "class=emf:Case",
        "class=emf:Document/attribute=title",
        "class=emf:Case/relation=hasChild",
    ];
    let requests = ["r1", "r1", "r2", "r2", "r3", "r3"];

    let backends: [&mut dyn ChangeLedger; 2] = [&mut sqlite, &mut memory];
    for backend in backends {
        let ids: Vec<ChangeId> = paths
            .iter()
            .zip(requests)
            .map(|(p, r)| append(backend, r, p))
            .collect();
        backend.mark_applied(ids[0], 1).unwrap();
        backend.mark_applied(ids[1], 2).unwrap();
        backend.mark_applied(ids[2], 3).unwrap();
        backend.mark_applied(ids[3], 5).unwrap();
        backend.mark_applied(ids[4], 2).unwrap();
        backend.mark_deployed(&[ids[1]], now_utc()).unwrap();
        backend.mark_failed(ids[4], now_utc(), "boom").unwrap();
    }

    let all_statuses = [ChangeStatus::Applied, ChangeStatus::Failed];
    for v in 0..6 {
        assert_eq!(
            ids(sqlite.changes_since(v).unwrap()),
            ids(memory.changes_since(v).unwrap()),
            "changes_since({})",
            v
        );
        for statuses in [&all_statuses[..], &all_statuses[..1], &all_statuses[1..]] {
            assert_eq!(
                ids(sqlite.not_deployed_changes(v, statuses).unwrap()),
                ids(memory.not_deployed_changes(v, statuses).unwrap()),
                "not_deployed_changes({}, {:?})",
                v,
                statuses
            );
        }
        for prefix in ["class=emf:Case", "class=emf:", "class=emf:Project", ""] {
            assert_eq!(
                ids(sqlite.not_deployed_changes_for_path(prefix, v).unwrap()),
                ids(memory.not_deployed_changes_for_path(prefix, v).unwrap()),
                "not_deployed_changes_for_path({:?}, {})",
                prefix,
                v
            );
        }
    }
    for r in ["r1", "r2", "r3", "none"] {
        let rid = RequestId::from(r);
        assert_eq!(
            ids(sqlite.changes_by_request_id(&rid).unwrap()),
            ids(memory.changes_by_request_id(&rid).unwrap())
        );
    }
    assert_eq!(
        sqlite.last_known_model_version().unwrap(),
        memory.last_known_model_version().unwrap()
    );

    // every returned change also satisfies the shared predicate
    for c in sqlite.not_deployed_changes(3, &all_statuses).unwrap() {
        assert!(queries::is_deployable(&c, 3, &all_statuses));
    }
}
