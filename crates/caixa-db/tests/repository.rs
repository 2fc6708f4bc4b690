//! Repository integration tests against in-memory SQLite.

use chrono::Utc;
use uuid::Uuid;

use caixa_core::{Movement, MovementKind, RegisterSession, SessionStatus, Terminal};
use caixa_db::{Database, DbConfig, DbError, NewMovement};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_terminal(db: &Database) -> String {
    let terminal = Terminal {
        id: Uuid::new_v4().to_string(),
        name: "Front Counter".to_string(),
        created_at: Utc::now(),
    };
    db.terminals().insert(&terminal).await.unwrap();
    terminal.id
}

fn open_session(terminal_id: &str, opening_cents: i64) -> (RegisterSession, Movement) {
    let now = Utc::now();
    let session_id = Uuid::new_v4().to_string();
    let session = RegisterSession {
        id: session_id.clone(),
        terminal_id: terminal_id.to_string(),
        operator_id: "op-1".to_string(),
        status: SessionStatus::Open,
        opening_balance_cents: opening_cents,
        closing_balance_cents: None,
        expected_balance_cents: None,
        notes: None,
        opened_at: now,
        closed_at: None,
    };
    let opening = Movement {
        id: Uuid::new_v4().to_string(),
        session_id,
        kind: MovementKind::Opening,
        amount_cents: opening_cents,
        reason: None,
        sub_method: None,
        created_by: "op-1".to_string(),
        created_at: now,
        sequence: 1,
    };
    (session, opening)
}

#[tokio::test]
async fn open_persists_session_and_opening_movement_together() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;

    let (session, opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&session, &opening).await.unwrap();

    let found = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
    assert_eq!(found.status, SessionStatus::Open);
    assert_eq!(found.opening_balance_cents, 10000);
    assert_eq!(found.closing_balance_cents, None);

    let movements = db.movements().list_by_session(&session.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].kind, MovementKind::Opening);
    assert_eq!(movements[0].sequence, 1);
}

#[tokio::test]
async fn second_open_on_same_terminal_hits_unique_index() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;

    let (first, first_opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&first, &first_opening).await.unwrap();

    let (second, second_opening) = open_session(&terminal_id, 5000);
    let err = db
        .sessions()
        .insert_open(&second, &second_opening)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    // the losing transaction left nothing behind
    assert!(db.sessions().get_by_id(&second.id).await.unwrap().is_none());
    assert!(db
        .movements()
        .list_by_session(&second.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn open_again_after_close_is_allowed() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;

    let (first, first_opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&first, &first_opening).await.unwrap();
    close_simple(&db, &first.id, 10000, 10000).await.unwrap();

    let (second, second_opening) = open_session(&terminal_id, 5000);
    db.sessions()
        .insert_open(&second, &second_opening)
        .await
        .unwrap();
}

#[tokio::test]
async fn append_allocates_increasing_sequence() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;
    let (session, opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&session, &opening).await.unwrap();

    for amount in [5000, 3000] {
        db.movements()
            .append(NewMovement {
                session_id: session.id.clone(),
                kind: MovementKind::Suprimento,
                amount_cents: amount,
                reason: None,
                sub_method: None,
                created_by: "op-1".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    let movements = db.movements().list_by_session(&session.id).await.unwrap();
    let sequences: Vec<i64> = movements.iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[tokio::test]
async fn close_freezes_balances_and_appends_closing_movement() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;
    let (session, opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&session, &opening).await.unwrap();

    close_simple(&db, &session.id, 10000, 9950).await.unwrap();

    let closed = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
    assert_eq!(closed.status, SessionStatus::Closed);
    assert_eq!(closed.expected_balance_cents, Some(10000));
    assert_eq!(closed.closing_balance_cents, Some(9950));
    assert!(closed.closed_at.is_some());

    let movements = db.movements().list_by_session(&session.id).await.unwrap();
    assert_eq!(movements.last().unwrap().kind, MovementKind::Closing);
    assert_eq!(movements.last().unwrap().amount_cents, 9950);
}

#[tokio::test]
async fn close_is_single_exit_from_open() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;
    let (session, opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&session, &opening).await.unwrap();

    close_simple(&db, &session.id, 10000, 10000).await.unwrap();

    let err = close_simple(&db, &session.id, 10000, 10000)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn snapshot_returns_session_with_ordered_movements() {
    let db = test_db().await;
    let terminal_id = seed_terminal(&db).await;
    let (session, opening) = open_session(&terminal_id, 10000);
    db.sessions().insert_open(&session, &opening).await.unwrap();

    db.movements()
        .append(NewMovement {
            session_id: session.id.clone(),
            kind: MovementKind::SaleCash,
            amount_cents: 3000,
            reason: None,
            sub_method: Some("cash".to_string()),
            created_by: "checkout".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let (found, movements) = db.sessions().snapshot(&session.id).await.unwrap().unwrap();
    assert_eq!(found.id, session.id);
    assert_eq!(movements.len(), 2);
    assert!(movements.windows(2).all(|w| w[0].sequence < w[1].sequence));

    assert!(db.sessions().snapshot("missing").await.unwrap().is_none());
}

async fn close_simple(
    db: &Database,
    session_id: &str,
    expected: i64,
    counted: i64,
) -> Result<(), DbError> {
    let sequence = db
        .movements()
        .list_by_session(session_id)
        .await?
        .last()
        .map(|m| m.sequence + 1)
        .unwrap_or(1);
    let closing = Movement {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        kind: MovementKind::Closing,
        amount_cents: counted,
        reason: None,
        sub_method: None,
        created_by: "op-1".to_string(),
        created_at: Utc::now(),
        sequence,
    };
    db.sessions()
        .close(session_id, expected, counted, None, Utc::now(), &closing)
        .await
}
