//! Integration tests for `DieselServiceRequestRepository` against embedded
//! PostgreSQL.
//!
//! The conditional writes are the point of this suite: self-assignment and
//! the guarded admin replace must hold up under real row locking, and the
//! table's CHECK constraints must refuse states the adapters never write.

use dispatch::domain::ports::{
    AssignOutcome, AssignmentGuard, ServiceRequestRepository, ServiceRequestRepositoryError,
};
use dispatch::domain::{CategoryId, ServiceRequestPatch, ServiceRequestStatus};
use futures::future::join_all;
use rstest::{fixture, rstest};

mod support;

use support::embedded_postgres::{execute_sql, sqlstate};
use support::{DieselWorld, new_request};

const CHECK_VIOLATION: &str = "23514";

#[fixture]
fn world() -> Option<DieselWorld> {
    support::diesel_world()
}

#[rstest]
fn concurrent_self_assignment_has_exactly_one_winner(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_self_assignment_has_exactly_one_winner skipped");
        return;
    };
    let owner = world.customer("owner@example.com");
    let request = world.pending_request(owner.id);
    let technicians: Vec<_> = (0..6)
        .map(|n| world.technician(&format!("tech{n}@example.com")))
        .collect();

    let request_id = request.id;
    let outcomes = world.runtime.block_on(async {
        let attempts = technicians.iter().map(|technician| {
            let repo = world.service_requests();
            let technician_id = technician.id;
            async move { repo.assign_if_unassigned(request_id, technician_id).await }
        });
        join_all(attempts).await
    });

    let mut winners = Vec::new();
    for outcome in outcomes {
        match outcome.expect("assignment query succeeds") {
            AssignOutcome::Assigned(row) => winners.push(row),
            AssignOutcome::AlreadyAssigned(row) => {
                assert_eq!(row.status, ServiceRequestStatus::Assigned);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(winners.len(), 1, "exactly one technician wins");

    let stored = world
        .runtime
        .block_on(world.service_requests().find(request.id))
        .expect("find")
        .expect("row exists");
    assert_eq!(stored.technician_id, winners[0].technician_id);
    assert_eq!(stored.status, ServiceRequestStatus::Assigned);
}

#[rstest]
fn admin_replace_does_not_clobber_a_concurrent_assignment(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: admin_replace_does_not_clobber_a_concurrent_assignment skipped"
        );
        return;
    };
    let owner = world.customer("owner@example.com");
    let technician = world.technician("tech@example.com");
    let snapshot = world.pending_request(owner.id);
    let repo = world.service_requests();

    world
        .runtime
        .block_on(repo.assign_if_unassigned(snapshot.id, technician.id))
        .expect("assign");

    let edited = ServiceRequestPatch {
        subject: Some("Boiler replaced".into()),
        ..ServiceRequestPatch::default()
    }
    .apply_to(&snapshot)
    .expect("valid patch");
    let written = world
        .runtime
        .block_on(repo.replace(&edited, AssignmentGuard::from(&snapshot)))
        .expect("replace query succeeds");
    assert_eq!(written, None, "stale guard must not write");

    let stored = world
        .runtime
        .block_on(repo.find(snapshot.id))
        .expect("find")
        .expect("row exists");
    assert_eq!(stored.technician_id, Some(technician.id));
    assert_eq!(stored.status, ServiceRequestStatus::Assigned);
    assert_eq!(stored.subject, snapshot.subject);
}

#[rstest]
fn admin_replace_writes_when_the_guard_still_holds(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: admin_replace_writes_when_the_guard_still_holds skipped");
        return;
    };
    let owner = world.customer("owner@example.com");
    let technician = world.technician("tech@example.com");
    let snapshot = world.pending_request(owner.id);
    let repo = world.service_requests();

    let edited = ServiceRequestPatch {
        technician_id: Some(Some(technician.id)),
        status: Some(ServiceRequestStatus::Assigned),
        ..ServiceRequestPatch::default()
    }
    .apply_to(&snapshot)
    .expect("valid patch");
    let written = world
        .runtime
        .block_on(repo.replace(&edited, AssignmentGuard::from(&snapshot)))
        .expect("replace query succeeds")
        .expect("guard matched");

    assert_eq!(written.technician_id, Some(technician.id));
    assert_eq!(written.status, ServiceRequestStatus::Assigned);
    assert!(written.updated_at >= snapshot.updated_at);
}

#[rstest]
fn unknown_category_is_a_missing_reference(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: unknown_category_is_a_missing_reference skipped");
        return;
    };
    let owner = world.customer("owner@example.com");
    let mut request = new_request(owner.id);
    request.category_id = CategoryId::new(9_999);

    let err = world
        .runtime
        .block_on(world.service_requests().insert(&request))
        .expect_err("foreign key violation");

    assert!(
        matches!(err, ServiceRequestRepositoryError::MissingReference { .. }),
        "{err:?}"
    );
}

#[rstest]
fn assigned_status_without_technician_violates_the_check(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: assigned_status_without_technician_violates_the_check skipped"
        );
        return;
    };
    let owner = world.customer("owner@example.com");
    let snapshot = world.pending_request(owner.id);

    let mut incoherent = snapshot.clone();
    incoherent.status = ServiceRequestStatus::Assigned;
    let err = world
        .runtime
        .block_on(
            world
                .service_requests()
                .replace(&incoherent, AssignmentGuard::from(&snapshot)),
        )
        .expect_err("CHECK constraint refuses the row");
    assert!(
        matches!(err, ServiceRequestRepositoryError::Query { .. }),
        "{err:?}"
    );

    let raw = execute_sql(
        &world.database_url,
        &format!(
            "UPDATE service_requests SET status = 'completed' WHERE id = {}",
            snapshot.id.get()
        ),
    )
    .expect_err("completed without technician");
    assert_eq!(sqlstate(&raw).as_deref(), Some(CHECK_VIOLATION));
}

#[rstest]
fn inverted_wanted_window_violates_the_check(world: Option<DieselWorld>) {
    let Some(world) = world else {
        eprintln!("SKIP-TEST-CLUSTER: inverted_wanted_window_violates_the_check skipped");
        return;
    };
    let owner = world.customer("owner@example.com");
    let mut request = new_request(owner.id);
    request.wanted_date_end = request
        .wanted_date_start
        .pred_opt()
        .expect("previous day");

    let err = world
        .runtime
        .block_on(world.service_requests().insert(&request))
        .expect_err("window CHECK refuses the row");

    assert!(
        matches!(err, ServiceRequestRepositoryError::Query { .. }),
        "{err:?}"
    );
}
