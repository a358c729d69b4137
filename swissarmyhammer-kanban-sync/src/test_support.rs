//! Test helpers: a scripted gateway, static capabilities and a sample board.
//!
//! Compiled for this crate's tests and for dependents that enable the
//! `test-support` feature.

use crate::capability::Capabilities;
use crate::error::RemoteError;
use crate::remote::RemoteGateway;
use crate::session::InitOptions;
use crate::types::{BoardRecord, CardMeta, Filter, FilterContext, RawColumn, RawDocument, TitleField};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

type Reply = Result<Value, RemoteError>;

/// Gateway that answers from a script and records every call.
///
/// A method answers with its queued one-shot replies first, then with its
/// standing reply. Methods without a script fail with a transport error.
#[derive(Default)]
pub struct ScriptedGateway {
    once: Mutex<HashMap<String, VecDeque<Reply>>>,
    standing: Mutex<HashMap<String, Reply>>,
    holds: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `method` with `value`
    pub fn reply(&self, method: &str, value: Value) {
        lock(&self.standing).insert(method.to_string(), Ok(value));
    }

    /// Fail every call to `method`
    pub fn fail(&self, method: &str, error: RemoteError) {
        lock(&self.standing).insert(method.to_string(), Err(error));
    }

    /// Answer the next call to `method` with `value`
    pub fn reply_once(&self, method: &str, value: Value) {
        lock(&self.once)
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(value));
    }

    /// Fail the next call to `method`
    pub fn fail_once(&self, method: &str, error: RemoteError) {
        lock(&self.once)
            .entry(method.to_string())
            .or_default()
            .push_back(Err(error));
    }

    /// Make calls to `method` wait until the returned semaphore gets a permit
    pub fn hold(&self, method: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        lock(&self.holds).insert(method.to_string(), Arc::clone(&gate));
        gate
    }

    /// Every call so far as `(method, args)`
    pub fn calls(&self) -> Vec<(String, Value)> {
        lock(&self.calls).clone()
    }

    /// Arguments of every call to `method`
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        lock(&self.calls)
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn next_reply(&self, method: &str) -> Reply {
        if let Some(reply) = lock(&self.once).get_mut(method).and_then(VecDeque::pop_front) {
            return reply;
        }
        lock(&self.standing)
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(RemoteError::transport(method, "no scripted reply")))
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn call(&self, method: &str, args: Value) -> Result<Value, RemoteError> {
        lock(&self.calls).push((method.to_string(), args));
        let gate = lock(&self.holds).get(method).cloned();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| RemoteError::transport(method, e.to_string()))?;
            permit.forget();
        }
        self.next_reply(method)
    }
}

/// Capabilities from fixed allow-lists
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    everything: bool,
    create: HashSet<String>,
    write: HashSet<String>,
}

impl StaticCapabilities {
    pub fn allow_all() -> Self {
        Self {
            everything: true,
            ..Self::default()
        }
    }

    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn allow_create(mut self, entity: &str) -> Self {
        self.create.insert(entity.to_string());
        self
    }

    pub fn allow_write(mut self, entity: &str) -> Self {
        self.write.insert(entity.to_string());
        self
    }
}

impl Capabilities for StaticCapabilities {
    fn can_create(&self, entity: &str) -> bool {
        self.everything || self.create.contains(entity)
    }

    fn can_write(&self, entity: &str) -> bool {
        self.everything || self.write.contains(entity)
    }
}

/// A repair-shop board on `Project` with five columns.
///
/// | column   | cards  |
/// |----------|--------|
/// | In queue | X, Y   |
/// | In repair| R1     |
/// | Quoted   | Q1     |
/// | In parking | -    |
/// | Completed (done) | C1 |
pub fn sample_board() -> InitOptions {
    let columns = ["In queue", "In repair", "Quoted", "In parking", "Completed"]
        .into_iter()
        .map(RawColumn::new)
        .collect::<Vec<_>>();

    InitOptions {
        doctype: "Project".to_string(),
        board: BoardRecord {
            name: "Workshop".to_string(),
            reference_doctype: Some("Project".to_string()),
            field_name: "status".to_string(),
            columns,
        },
        card_meta: CardMeta {
            title_field: Some(TitleField {
                fieldname: "project_name".to_string(),
                label: Some("Project Name".to_string()),
            }),
            quick_entry: false,
            image_field: None,
        },
        cards: vec![
            doc(json!({"name": "X", "project_name": "Golf gearbox", "status": "In queue"})),
            doc(json!({
                "name": "Y", "project_name": "Passat ECU", "status": "In queue",
                "custom_customers_phone_number": "+4712345678"
            })),
            doc(json!({"name": "R1", "project_name": "Polo DSG", "status": "In repair"})),
            doc(json!({"name": "Q1", "project_name": "Audi A4 TCU", "status": "Quoted"})),
            doc(json!({"name": "C1", "project_name": "Tiguan", "status": "Completed"})),
        ],
        filter_context: FilterContext::new(vec![Filter::new(
            "Project",
            "company",
            "=",
            json!("Workshop AS"),
        )]),
    }
}

/// Raw document from a JSON object literal
pub fn doc(value: Value) -> RawDocument {
    match value {
        Value::Object(map) => map,
        _ => RawDocument::new(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
