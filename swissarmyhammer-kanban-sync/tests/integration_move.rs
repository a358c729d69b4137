//! Integration tests for optimistic card moves, freezing and rollback

use rstest::rstest;
use serde_json::json;
use std::sync::{Arc, Mutex};
use swissarmyhammer_kanban_sync::remote::method;
use swissarmyhammer_kanban_sync::test_support::{sample_board, ScriptedGateway, StaticCapabilities};
use swissarmyhammer_kanban_sync::{
    AddCard, AddColumn, ArchiveColumn, BoardSession, BoardSyncConfig, DropEvent, Execute,
    LoadMore, MoveCard, Operation, PlaceCard, RemoteError, SetIndicator, SyncError,
    UpdateColumnOrder, UpdateOrder,
};

fn open_board(gateway: &Arc<ScriptedGateway>) -> BoardSession {
    let session = BoardSession::new(
        gateway.clone(),
        Arc::new(StaticCapabilities::allow_all()),
        BoardSyncConfig::default(),
    );
    session.init(sample_board()).unwrap();
    session
}

fn reconciled_board() -> serde_json::Value {
    json!([
        {"name": "Workshop", "field_name": "status", "columns": [
            {"column_name": "In queue", "order": "[\"Y\"]"},
            {"column_name": "In repair", "order": "[\"R1\", \"X\"]"},
            {"column_name": "Quoted"},
            {"column_name": "In parking"},
            {"column_name": "Completed"}
        ]},
        []
    ])
}

#[test_log::test(tokio::test)]
async fn test_move_is_visible_before_confirmation() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(method::UPDATE_ORDER_FOR_SINGLE_CARD, json!({"column": "In repair"}));
    gateway.reply(method::UPDATE_ORDER, reconciled_board());
    let gate = gateway.hold(method::UPDATE_ORDER_FOR_SINGLE_CARD);
    let session = open_board(&gateway);

    let first_move = MoveCard::new(DropEvent::new("X", "In queue", "In repair", 0, 1));
    let second_move = MoveCard::new(DropEvent::new("Y", "In queue", "Quoted", 0, 0));
    let observer = async {
        tokio::task::yield_now().await;

        let state = session.state();
        assert!(state.frozen);
        assert_eq!(state.find_card(&"X".into()).unwrap().column, "In repair");
        assert_eq!(session.pending_move().unwrap().card().as_str(), "X");

        let second = session.dispatch(&second_move).await;
        gate.add_permits(1);
        second
    };

    let (first, second) = tokio::join!(session.dispatch(&first_move), observer);

    assert_eq!(first.unwrap()["column"], "In repair");
    assert!(matches!(second, Err(SyncError::Frozen)));

    let state = session.state();
    assert!(!state.frozen);
    assert!(session.pending_move().is_none());
    assert_eq!(state.find_card(&"Y".into()).unwrap().column, "In queue");
    assert_eq!(gateway.calls_to(method::UPDATE_ORDER_FOR_SINGLE_CARD).len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_freeze_observed_by_subscriber() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(method::UPDATE_ORDER_FOR_SINGLE_CARD, json!({"column": "In repair"}));
    gateway.reply(method::UPDATE_ORDER, reconciled_board());
    let session = open_board(&gateway);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.store().subscribe(
        |s| s.frozen,
        move |frozen: &bool| sink.lock().unwrap().push(*frozen),
    );

    session
        .dispatch(&MoveCard::new(DropEvent::new("X", "In queue", "In repair", 0, 0)))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[test_log::test(tokio::test)]
async fn test_rejected_move_reverts_exact_snapshot() {
    let gateway = Arc::new(ScriptedGateway::new());
    let session = open_board(&gateway);
    let before = session.state();

    let err = session
        .dispatch(&MoveCard::new(DropEvent::new("X", "In queue", "In repair", 0, 0)))
        .await
        .unwrap_err();

    assert!(err.is_rollback());
    assert_eq!(err.user_message(), "Something went wrong");
    let after = session.state();
    assert!(Arc::ptr_eq(&before.cards, &after.cards));
    assert!(Arc::ptr_eq(&before.columns, &after.columns));
    assert!(!after.frozen);

    let entry = &session.activity()[0];
    assert_eq!(entry.op, "move card");
    assert!(entry.rolled_back);
}

#[test_log::test(tokio::test)]
async fn test_move_after_failure_is_accepted() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.fail_once(
        method::UPDATE_ORDER_FOR_SINGLE_CARD,
        RemoteError::transport(method::UPDATE_ORDER_FOR_SINGLE_CARD, "timeout"),
    );
    gateway.reply(method::UPDATE_ORDER_FOR_SINGLE_CARD, json!({"column": "In repair"}));
    gateway.reply(method::UPDATE_ORDER, reconciled_board());
    let session = open_board(&gateway);
    let drop = DropEvent::new("X", "In queue", "In repair", 0, 0);

    assert!(session.dispatch(&MoveCard::new(drop.clone())).await.is_err());
    session.dispatch(&MoveCard::new(drop)).await.unwrap();

    assert_eq!(session.find_card(&"X".into()).unwrap().column, "In repair");
    let flags: Vec<_> = session.activity().into_iter().map(|e| e.rolled_back).collect();
    assert_eq!(flags, vec![false, false, true]);
}

#[test_log::test(tokio::test)]
async fn test_move_during_card_insert_is_refused() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(
        method::INSERT,
        json!({"name": "PRJ-0100", "project_name": "Octavia DQ200", "status": "In queue"}),
    );
    gateway.reply(method::ADD_CARD, json!({"column": "In queue"}));
    gateway.reply(
        method::UPDATE_ORDER,
        json!([
            {"name": "Workshop", "field_name": "status", "columns": [
                {"column_name": "In queue", "order": "[\"PRJ-0100\", \"X\", \"Y\"]"}
            ]},
            []
        ]),
    );
    let gate = gateway.hold(method::INSERT);
    let session = open_board(&gateway);

    let add = AddCard::new("Octavia DQ200", "In queue");
    let interleaved = MoveCard::new(DropEvent::new("X", "In queue", "In repair", 0, 0));
    let during_insert = async {
        tokio::task::yield_now().await;

        assert!(session.is_frozen());
        assert!(session.pending_move().unwrap().card().is_placeholder());

        let moved = session.dispatch(&interleaved).await;
        gate.add_permits(1);
        moved
    };

    let (added, moved) = tokio::join!(session.dispatch(&add), during_insert);

    assert_eq!(added.unwrap()["outcome"], "inserted");
    assert!(matches!(moved, Err(SyncError::Frozen)));
    assert!(gateway.calls_to(method::UPDATE_ORDER_FOR_SINGLE_CARD).is_empty());
    assert_eq!(gateway.calls_to(method::ADD_CARD)[0]["docname"], "PRJ-0100");

    let state = session.state();
    assert!(!state.frozen);
    assert!(session.pending_move().is_none());
    assert!(state.cards.iter().all(|c| !c.name.is_placeholder()));
    assert_eq!(state.find_card(&"PRJ-0100".into()).unwrap().column, "In queue");
    assert_eq!(state.find_card(&"X".into()).unwrap().column, "In queue");
}

#[rstest]
#[case::move_card(Box::new(MoveCard::new(DropEvent::new("X", "In queue", "Quoted", 0, 0))))]
#[case::place_card(Box::new(PlaceCard::new("R1", "In repair")))]
#[case::add_card(Box::new(AddCard::new("Golf VIII", "In queue")))]
#[case::update_order(Box::new(UpdateOrder::rendered()))]
#[case::load_more(Box::new(LoadMore::new("Completed")))]
#[case::set_indicator(Box::new(SetIndicator::new("Quoted", "orange")))]
#[case::update_column_order(Box::new(UpdateColumnOrder::new(["Quoted", "In queue"])))]
#[case::add_column(Box::new(AddColumn::new("Diagnosed")))]
#[case::archive_column(Box::new(ArchiveColumn::new("Quoted")))]
fn test_failed_mutation_leaves_state_untouched(
    #[case] op: Box<dyn Execute<BoardSession, SyncError>>,
) {
    // Every remote method fails on an unscripted gateway.
    let gateway = Arc::new(ScriptedGateway::new());
    let session = open_board(&gateway);
    let before = session.state();

    let result = tokio_test::block_on(session.dispatch(&*op));

    let err = result.unwrap_err();
    assert!(err.is_rollback(), "{} should roll back, got {err}", op.op_string());
    let after = session.state();
    assert_eq!(*after.cards, *before.cards);
    assert_eq!(*after.columns, *before.columns);
    assert!(!after.frozen);
    assert!(gateway.call_count() >= 1);
}
