//! 文件型 SQLite + 多连接池下的并发写入

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tempfile::TempDir;
use uuid::Uuid;

use rust_hwsystem_attendance::config::{DatabaseConfig, EventConfig};
use rust_hwsystem_attendance::errors::AttendanceError;
use rust_hwsystem_attendance::models::attendance_records::entities::{
    AttendanceStatus, RecordProvenance,
};
use rust_hwsystem_attendance::models::attendance_records::requests::{
    ClassRecordQuery, CollectEntry, MarkAttendanceRequest,
};
use rust_hwsystem_attendance::models::attendance_sessions::entities::SessionStatus;
use rust_hwsystem_attendance::models::attendance_sessions::requests::CreateSessionRequest;
use rust_hwsystem_attendance::runtime::lifetime::startup::{StartupContext, build_context};
use rust_hwsystem_attendance::storage::sea_orm_storage::SeaOrmStorage;
use rust_hwsystem_attendance::utils::today;

const ROUNDS: usize = 20;

/// 返回的 TempDir 需在测试期间保持存活
async fn setup_file_backed() -> (TempDir, StartupContext) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: dir
            .path()
            .join("attendance.db")
            .to_string_lossy()
            .into_owned(),
        pool_size: 8,
        timeout: 10,
    };
    let storage = SeaOrmStorage::new_with_config(&config)
        .await
        .expect("Failed to set up file-backed storage");

    let ctx = build_context(
        Arc::new(storage),
        &EventConfig {
            channel_capacity: 16,
        },
    );
    (dir, ctx)
}

fn yesterday() -> NaiveDate {
    today() - Duration::days(1)
}

fn entry(student_id: Uuid, status: AttendanceStatus) -> CollectEntry {
    CollectEntry {
        student_id,
        status,
        notes: None,
    }
}

/// 创建并委派会话，返回会话 ID
async fn delegated_session(ctx: &StartupContext, class_id: Uuid, leader_id: Uuid) -> i64 {
    let session = ctx
        .service
        .create_session(CreateSessionRequest {
            class_id,
            date: yesterday(),
            created_by: Uuid::new_v4(),
        })
        .await
        .unwrap();
    ctx.service
        .delegate_session(session.id, class_id, leader_id)
        .await
        .unwrap();
    session.id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_approve_and_reject_have_one_winner() {
    let (_dir, ctx) = setup_file_backed().await;

    for _ in 0..ROUNDS {
        let (class, leader, teacher) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let session_id = delegated_session(&ctx, class, leader).await;
        ctx.service
            .collect_attendance(
                session_id,
                leader,
                vec![entry(Uuid::new_v4(), AttendanceStatus::Present)],
            )
            .await
            .unwrap();

        let approve = {
            let service = ctx.service.clone();
            tokio::spawn(async move { service.approve_session(session_id, teacher).await })
        };
        let reject = {
            let service = ctx.service.clone();
            tokio::spawn(async move { service.reject_session(session_id, teacher, "recount").await })
        };
        let approved = approve.await.unwrap();
        let rejected = reject.await.unwrap();

        let (winner_status, loser) = match (approved, rejected) {
            (Ok(session), Err(e)) | (Err(e), Ok(session)) => (session.status, e),
            (a, r) => panic!("expected exactly one winner, got {a:?} / {r:?}"),
        };
        assert!(
            matches!(loser, AttendanceError::InvalidSessionTransition(_)),
            "loser failed with {loser:?}"
        );

        let session = ctx.service.get_session(session_id).await.unwrap();
        assert_eq!(session.status, winner_status);
        // create=0, delegate=1, collect=2, 仅一次审核生效
        assert_eq!(session.version, 3);

        let records = ctx.service.get_records_by_session(session_id).await.unwrap();
        let expected_approver = (winner_status == SessionStatus::Approved).then_some(teacher);
        assert!(records.iter().all(|r| r.approved_by() == expected_approver));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn direct_mark_and_collect_on_same_key_both_succeed() {
    let (_dir, ctx) = setup_file_backed().await;

    for _ in 0..ROUNDS {
        let (class, leader, teacher, student) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let session_id = delegated_session(&ctx, class, leader).await;

        let collect = {
            let service = ctx.service.clone();
            tokio::spawn(async move {
                service
                    .collect_attendance(
                        session_id,
                        leader,
                        vec![entry(student, AttendanceStatus::Present)],
                    )
                    .await
            })
        };
        let mark = {
            let service = ctx.service.clone();
            tokio::spawn(async move {
                service
                    .mark_attendance(MarkAttendanceRequest {
                        student_id: student,
                        class_id: class,
                        date: yesterday(),
                        status: AttendanceStatus::Absent,
                        marked_by: teacher,
                        notes: None,
                    })
                    .await
            })
        };

        let collected = collect.await.unwrap().unwrap();
        mark.await.unwrap().unwrap();
        assert_eq!(collected.status, SessionStatus::Collected);

        // 后写者生效，且记录只属于一条写入路径
        let records = ctx
            .service
            .get_records_by_class(class, ClassRecordQuery { date: Some(yesterday()) })
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        match &records[0].provenance {
            RecordProvenance::Marked { marked_by } => {
                assert_eq!(*marked_by, teacher);
                assert_eq!(records[0].status, AttendanceStatus::Absent);
            }
            RecordProvenance::Collected {
                collected_by,
                session_id: linked,
                approved_by,
            } => {
                assert_eq!(*collected_by, leader);
                assert_eq!(*linked, session_id);
                assert_eq!(*approved_by, None);
                assert_eq!(records[0].status, AttendanceStatus::Present);
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_marks_on_one_key_leave_a_single_record() {
    let (_dir, ctx) = setup_file_backed().await;
    let (class, student) = (Uuid::new_v4(), Uuid::new_v4());
    let statuses = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = ctx.service.clone();
            let status = statuses[i % statuses.len()];
            tokio::spawn(async move {
                service
                    .mark_attendance(MarkAttendanceRequest {
                        student_id: student,
                        class_id: class,
                        date: yesterday(),
                        status,
                        marked_by: Uuid::new_v4(),
                        notes: None,
                    })
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let records = ctx
        .service
        .get_records_by_class(class, ClassRecordQuery { date: Some(yesterday()) })
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_class_and_date() {
    let (_dir, ctx) = setup_file_backed().await;
    let class = Uuid::new_v4();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = ctx.service.clone();
            tokio::spawn(async move {
                service
                    .create_session(CreateSessionRequest {
                        class_id: class,
                        date: yesterday(),
                        created_by: Uuid::new_v4(),
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(
                matches!(e, AttendanceError::DuplicateSession(_)),
                "unexpected error {e:?}"
            ),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn collect_reenters_from_rejected() {
    let (_dir, ctx) = setup_file_backed().await;
    let (class, leader, teacher) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let session_id = delegated_session(&ctx, class, leader).await;

    ctx.service
        .collect_attendance(session_id, leader, vec![entry(alice, AttendanceStatus::Absent)])
        .await
        .unwrap();
    ctx.service
        .reject_session(session_id, teacher, "bob is missing")
        .await
        .unwrap();

    // 非委派的课代表不能借驳回重新收集
    let err = ctx
        .service
        .collect_attendance(
            session_id,
            Uuid::new_v4(),
            vec![entry(bob, AttendanceStatus::Present)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::UnauthorizedCollector(_)));

    let recollected = ctx
        .service
        .collect_attendance(
            session_id,
            leader,
            vec![
                entry(alice, AttendanceStatus::Present),
                entry(bob, AttendanceStatus::Present),
            ],
        )
        .await
        .unwrap();
    assert_eq!(recollected.status, SessionStatus::Collected);
    assert!(recollected.collected_at.is_some());
    // create=0, delegate=1, collect=2, reject=3, collect=4
    assert_eq!(recollected.version, 4);

    let records = ctx.service.get_records_by_session(session_id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(
        records
            .iter()
            .all(|r| r.status == AttendanceStatus::Present && r.collected_by() == Some(leader))
    );

    let approved = ctx.service.approve_session(session_id, teacher).await.unwrap();
    assert_eq!(approved.status, SessionStatus::Approved);
    assert_eq!(approved.rejection_reason, None);
}
