//! In-memory status store
//!
//! Replays a scripted sequence of poll answers per request id. Used to
//! exercise the wait loop without a database.

use async_trait::async_trait;
use billrun_core::{JobId, StatusRow};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::StatusStore;
use crate::error::{Result, StoreError};

type Answer = std::result::Result<Vec<StatusRow>, String>;

/// Status store answering from a per-id script
///
/// Each query pops the next scripted answer for the id. The last answer is
/// sticky and repeats for every later query. Ids without a script have no
/// rows.
#[derive(Debug, Default)]
pub struct ScriptedStatusStore {
    scripts: Mutex<HashMap<JobId, VecDeque<Answer>>>,
    queries: Mutex<Vec<JobId>>,
}

impl ScriptedStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows returned by the next poll of `id`
    pub fn push_rows(&self, id: &JobId, rows: Vec<StatusRow>) {
        self.push(id, Ok(rows));
    }

    /// Queues a query failure for the next poll of `id`
    pub fn push_failure(&self, id: &JobId, message: impl Into<String>) {
        self.push(id, Err(message.into()));
    }

    /// Ids queried so far, in call order
    pub fn queries(&self) -> Vec<JobId> {
        self.queries.lock().unwrap().clone()
    }

    /// Number of queries issued for `id`
    pub fn query_count(&self, id: &JobId) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|queried| *queried == id)
            .count()
    }

    fn push(&self, id: &JobId, answer: Answer) {
        self.scripts
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .push_back(answer);
    }

    fn next_answer(&self, id: &JobId) -> Answer {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(id) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap_or(Ok(Vec::new())),
            Some(script) => script.front().cloned().unwrap_or(Ok(Vec::new())),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl StatusStore for ScriptedStatusStore {
    async fn fetch_status(&self, id: &JobId) -> Result<Vec<StatusRow>> {
        self.queries.lock().unwrap().push(id.clone());
        self.next_answer(id).map_err(StoreError::unavailable)
    }
}
