//! Scripted test doubles shared by the use case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::reasoning_agent::{AgentError, AgentReply, ReasoningAgent, TurnRequest};
use crate::ports::session_store::{SessionStore, StoreError};
use async_trait::async_trait;
use boardroom_domain::{Phase, SessionResult};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A scripted outcome for one reasoning call
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Reply(AgentReply),
    Fail(String),
    /// Never answers within any sensible timeout
    Hang,
}

impl Scripted {
    pub(crate) fn text(content: impl Into<String>) -> Self {
        Scripted::Reply(AgentReply::text(content))
    }
}

type Behavior = dyn Fn(&TurnRequest<'_>) -> Scripted + Send + Sync;

/// Agent driven by a behavior function, with per-speaker one-shot overrides
pub(crate) struct ScriptedAgent {
    behavior: Box<Behavior>,
    overrides: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Phase)>>,
}

impl ScriptedAgent {
    pub(crate) fn new(behavior: impl Fn(&TurnRequest<'_>) -> Scripted + Send + Sync + 'static) -> Self {
        Self {
            behavior: Box::new(behavior),
            overrides: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome for the next call made for `speaker`.
    pub(crate) fn push(&self, speaker: &str, scripted: Scripted) {
        self.overrides
            .lock()
            .unwrap()
            .entry(speaker.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Phase)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningAgent for ScriptedAgent {
    async fn respond(&self, request: TurnRequest<'_>) -> Result<AgentReply, AgentError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.speaker.name().to_string(), request.phase));
        let queued = self
            .overrides
            .lock()
            .unwrap()
            .get_mut(request.speaker.name())
            .and_then(|q| q.pop_front());
        let scripted = queued.unwrap_or_else(|| (self.behavior)(&request));

        match scripted {
            Scripted::Reply(reply) => Ok(reply),
            Scripted::Fail(message) => Err(AgentError::RequestFailed(message)),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(AgentError::RequestFailed("hung".to_string()))
            }
        }
    }
}

/// In-memory store for assertions
#[derive(Default)]
pub(crate) struct MemoryStore {
    results: Mutex<BTreeMap<String, SessionResult>>,
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, result: &SessionResult) -> Result<(), StoreError> {
        self.results
            .lock()
            .unwrap()
            .insert(result.session_id.clone(), result.clone());
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<SessionResult>, StoreError> {
        Ok(self.results.lock().unwrap().get(session_id).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.results.lock().unwrap().keys().cloned().collect())
    }
}

/// Logger that keeps every event type it saw
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingLogger {
    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == event_type)
            .count()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}
