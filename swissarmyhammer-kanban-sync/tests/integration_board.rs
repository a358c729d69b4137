//! Integration tests for the board lifecycle: open, create, paginate, refresh

use chrono::NaiveDateTime;
use serde_json::{json, Value};
use std::sync::Arc;
use swissarmyhammer_kanban_sync::annotation::PARKING_MESSAGE;
use swissarmyhammer_kanban_sync::remote::method;
use swissarmyhammer_kanban_sync::test_support::{
    doc, sample_board, ScriptedGateway, StaticCapabilities,
};
use swissarmyhammer_kanban_sync::{
    AddCard, AddColumn, ArchiveColumn, BoardSession, BoardSyncConfig, ColumnStatus, FixedClock,
    LoadMore, SyncError,
};

fn session(gateway: &Arc<ScriptedGateway>) -> BoardSession {
    BoardSession::new(
        gateway.clone(),
        Arc::new(StaticCapabilities::allow_all()),
        BoardSyncConfig::default(),
    )
}

fn workshop(columns: Value) -> Value {
    json!({"name": "Workshop", "field_name": "status", "columns": columns})
}

fn completed_page(rows: Value) -> Value {
    json!({"keys": ["name", "project_name", "status"], "values": rows})
}

#[test_log::test(tokio::test)]
async fn test_open_reconciles_order_once() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(
        method::UPDATE_ORDER,
        json!([
            workshop(json!([
                {"column_name": "In queue", "order": "[\"Y\", \"X\"]"},
                {"column_name": "In repair"}, {"column_name": "Quoted"},
                {"column_name": "In parking"}, {"column_name": "Completed"}
            ])),
            []
        ]),
    );
    let session = session(&gateway);

    session.open(sample_board()).await.unwrap();

    assert_eq!(gateway.calls_to(method::UPDATE_ORDER).len(), 1);
    let state = session.state();
    assert!(!state.empty_state);
    let queue = state.find_column(&"In queue".into()).unwrap();
    assert_eq!(queue.order.as_ref().unwrap()[0], "Y");
    assert_eq!(session.activity()[0].op, "update order");
}

#[test_log::test(tokio::test)]
async fn test_open_survives_failed_reconciliation() {
    let gateway = Arc::new(ScriptedGateway::new());
    let session = session(&gateway);

    session.open(sample_board()).await.unwrap();

    let state = session.state();
    assert!(!state.empty_state);
    assert_eq!(state.cards.len(), sample_board().cards.len());
    assert!(session.activity()[0].rolled_back);
}

#[test_log::test(tokio::test)]
async fn test_add_card_end_to_end() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(
        method::INSERT,
        json!({"name": "PRJ-0100", "project_name": "Octavia DQ200", "status": "In queue"}),
    );
    gateway.reply(method::ADD_CARD, json!({"column": "In queue"}));
    gateway.reply(
        method::UPDATE_ORDER,
        json!([
            workshop(json!([{"column_name": "In queue", "order": "[\"PRJ-0100\", \"X\", \"Y\"]"}])),
            []
        ]),
    );
    let session = session(&gateway);
    session.init(sample_board()).unwrap();

    let result = session
        .dispatch(&AddCard::new("Octavia DQ200", "In queue"))
        .await
        .unwrap();

    assert_eq!(result["card"]["title"], "Octavia DQ200");
    let sequence: Vec<String> = gateway.calls().into_iter().map(|(m, _)| m).collect();
    assert_eq!(sequence, vec![method::INSERT, method::ADD_CARD, method::UPDATE_ORDER]);

    let state = session.state();
    assert!(state.cards.iter().all(|c| !c.name.is_placeholder()));
    assert_eq!(
        state.cards.iter().filter(|c| c.name.as_str() == "PRJ-0100").count(),
        1
    );
    assert!(!state.frozen);
}

#[test_log::test(tokio::test)]
async fn test_paging_through_done_column() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply_once(
        method::REPORTVIEW_GET,
        completed_page(json!([["C2", "Arteon", "Completed"], ["C3", "Caddy", "Completed"]])),
    );
    gateway.reply_once(
        method::REPORTVIEW_GET,
        completed_page(json!([["C3", "Caddy", "Completed"], ["C4", "Up!", "Completed"]])),
    );
    let session = session(&gateway);
    session.init(sample_board()).unwrap();

    session.dispatch(&LoadMore::new("Completed")).await.unwrap();
    let second = session.dispatch(&LoadMore::new("Completed")).await.unwrap();

    assert_eq!(second["total"], 4);
    let starts: Vec<_> = gateway
        .calls_to(method::REPORTVIEW_GET)
        .iter()
        .map(|args| args["start"].clone())
        .collect();
    assert_eq!(starts, vec![json!(1), json!(3)]);
    assert_eq!(session.counts_by_column()["Completed"], 4);
}

#[test_log::test(tokio::test)]
async fn test_change_notification_refreshes_done_columns() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(
        method::REPORTVIEW_GET,
        completed_page(json!([["C1", "Tiguan R", "Completed"], ["C9", "Touran", "Completed"]])),
    );
    let session = session(&gateway);
    session.init(sample_board()).unwrap();

    let merged = session.handle_change_notification().await.unwrap();

    assert_eq!(merged, 2);
    let calls = gateway.calls_to(method::REPORTVIEW_GET);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["start"], 0);
    assert_eq!(session.find_card(&"C1".into()).unwrap().title, "Tiguan R");
    assert!(session.find_card(&"C9".into()).is_some());
}

#[test_log::test(tokio::test)]
async fn test_change_notification_before_init() {
    let gateway = Arc::new(ScriptedGateway::new());
    let session = session(&gateway);
    assert!(matches!(
        session.handle_change_notification().await,
        Err(SyncError::NotInitialized)
    ));
}

#[test_log::test(tokio::test)]
async fn test_column_lifecycle() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.reply(
        method::FETCH_TO_CUSTOMIZE,
        json!({"docs": [{
            "doc_type": "Project",
            "fields": [{"fieldname": "status", "fieldtype": "Select", "options": "In queue\nQuoted"}]
        }]}),
    );
    gateway.reply(method::SAVE_CUSTOMIZATION, json!(null));
    gateway.reply(
        method::ADD_COLUMN,
        json!([{"column_name": "In queue"}, {"column_name": "Quoted"}, {"column_name": "Diagnosed"}]),
    );
    gateway.reply(
        method::ARCHIVE_RESTORE_COLUMN,
        json!([
            {"column_name": "In queue"}, {"column_name": "Quoted"},
            {"column_name": "Diagnosed", "status": "Archived"}
        ]),
    );
    let session = session(&gateway);
    session.init(sample_board()).unwrap();

    session.dispatch(&AddColumn::new("Diagnosed")).await.unwrap();
    session.dispatch(&ArchiveColumn::new("Diagnosed")).await.unwrap();

    let state = session.state();
    let diagnosed = state.find_column(&"Diagnosed".into()).unwrap();
    assert_eq!(diagnosed.status, ColumnStatus::Archived);
    let ops: Vec<_> = session.activity().into_iter().map(|e| e.op).collect();
    assert_eq!(ops, vec!["archive column", "add column"]);
}

#[test_log::test(tokio::test)]
async fn test_parking_annotation_follows_clock() {
    let gateway = Arc::new(ScriptedGateway::new());
    let now = NaiveDateTime::parse_from_str("2024-08-21 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let clock = Arc::new(FixedClock::new(now));
    let session = session(&gateway).with_clock(clock);
    let mut opts = sample_board();
    opts.cards.push(doc(json!({
        "name": "P1",
        "project_name": "Golf R",
        "status": "In parking",
        "parking_date": "2024-08-16",
        "queue_position": 3
    })));
    session.init(opts).unwrap();

    let p1 = session.find_card(&"P1".into()).unwrap();
    assert!(p1.annotation.is_flagged());
    assert_eq!(
        p1.annotation.message.as_deref(),
        Some(PARKING_MESSAGE)
    );
}
