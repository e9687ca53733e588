//! In-memory test doubles for the core port traits.
//!
//! `MockAssistantApi` simulates the remote service: it keeps per-session
//! message lists, plays back a scripted sequence of run statuses, and counts
//! every call so tests can assert exact round-trip counts.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use wabridge_types::assistant::{
    Assistant, AssistantDefinition, AssistantError, MessageRole, Run, RunError, RunId, RunStatus,
    SessionMessage, UploadedFile,
};
use wabridge_types::error::RepositoryError;
use wabridge_types::session::{SessionId, SessionRecord, UserId};

use crate::assistant::api::{AssistantAdmin, AssistantApi};
use crate::storage::session_store::SessionStore;

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MemorySessionStore {
    records: Mutex<HashMap<UserId, SessionRecord>>,
    saves: Mutex<u32>,
}

impl MemorySessionStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_record(user_id: &str, session_id: &str) -> Self {
        let store = Self::new();
        let now = Utc::now();
        store.records.lock().unwrap().insert(
            UserId::from(user_id),
            SessionRecord {
                user_id: UserId::from(user_id),
                session_id: SessionId::from(session_id),
                created_at: now,
                updated_at: now,
            },
        );
        store
    }

    pub(crate) fn saves(&self) -> u32 {
        *self.saves.lock().unwrap()
    }

    pub(crate) fn mapped(&self, user_id: &str) -> Option<SessionId> {
        self.records
            .lock()
            .unwrap()
            .get(&UserId::from(user_id))
            .map(|r| r.session_id.clone())
    }
}

impl SessionStore for MemorySessionStore {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<SessionId>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(user_id)
            .map(|r| r.session_id.clone()))
    }

    async fn save(&self, user_id: &UserId, session_id: &SessionId) -> Result<(), RepositoryError> {
        *self.saves.lock().unwrap() += 1;
        let now = Utc::now();
        let mut records = self.records.lock().unwrap();
        let created_at = records.get(user_id).map(|r| r.created_at).unwrap_or(now);
        records.insert(
            user_id.clone(),
            SessionRecord {
                user_id: user_id.clone(),
                session_id: session_id.clone(),
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn get_record(&self, user_id: &UserId) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn list(&self, _limit: Option<i64>) -> Result<Vec<SessionRecord>, RepositoryError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }
}

/// A store whose every operation fails, standing in for a corrupt database.
pub(crate) struct BrokenSessionStore;

impl SessionStore for BrokenSessionStore {
    async fn lookup(&self, _user_id: &UserId) -> Result<Option<SessionId>, RepositoryError> {
        Err(RepositoryError::Query("file is not a database".to_string()))
    }

    async fn save(&self, _user_id: &UserId, _session_id: &SessionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Query("file is not a database".to_string()))
    }

    async fn get_record(&self, _user_id: &UserId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Query("file is not a database".to_string()))
    }

    async fn list(&self, _limit: Option<i64>) -> Result<Vec<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Query("file is not a database".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Assistant service
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub create_session: u32,
    pub post_message: u32,
    pub start_run: u32,
    pub retrieve_run: u32,
    pub list_messages: u32,
    pub upload_file: u32,
    pub create_assistant: u32,
    pub retrieve_assistant: u32,
}

impl CallCounts {
    pub(crate) fn total(&self) -> u32 {
        self.create_session
            + self.post_message
            + self.start_run
            + self.retrieve_run
            + self.list_messages
            + self.upload_file
            + self.create_assistant
            + self.retrieve_assistant
    }
}

struct MockState {
    next_id: u32,
    sessions: HashMap<SessionId, Vec<SessionMessage>>,
    /// Status reported by `start_run`.
    initial_status: RunStatus,
    /// Statuses reported by successive `retrieve_run` calls; `Completed` once drained.
    script: VecDeque<RunStatus>,
    reply_text: String,
    last_error: Option<RunError>,
    answered_runs: HashSet<RunId>,
    run_sessions: Vec<SessionId>,
    definitions: Vec<AssistantDefinition>,
    calls: CallCounts,
}

pub(crate) struct MockAssistantApi {
    state: Mutex<MockState>,
}

impl MockAssistantApi {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                sessions: HashMap::new(),
                initial_status: RunStatus::Queued,
                script: VecDeque::new(),
                reply_text: "Hello from the assistant".to_string(),
                last_error: None,
                answered_runs: HashSet::new(),
                run_sessions: Vec::new(),
                definitions: Vec::new(),
                calls: CallCounts::default(),
            }),
        }
    }

    /// Runs start as `initial` and then report `polls` in order.
    pub(crate) fn with_script(self, initial: RunStatus, polls: Vec<RunStatus>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.initial_status = initial;
            state.script = polls.into();
        }
        self
    }

    pub(crate) fn with_reply(self, text: &str) -> Self {
        self.state.lock().unwrap().reply_text = text.to_string();
        self
    }

    pub(crate) fn with_last_error(self, code: &str, message: &str) -> Self {
        self.state.lock().unwrap().last_error = Some(RunError {
            code: code.to_string(),
            message: message.to_string(),
        });
        self
    }

    /// Register a session that already exists remotely.
    pub(crate) fn with_session(self, session_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(SessionId::from(session_id), Vec::new());
        self
    }

    /// Register a session holding an answer written by an earlier run.
    pub(crate) fn with_prior_reply(self, session_id: &str, run_id: &str, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .sessions
            .entry(SessionId::from(session_id))
            .or_default()
            .push(SessionMessage {
                id: "msg_prior".to_string(),
                role: MessageRole::Assistant,
                text: text.to_string(),
                created_at: Utc::now(),
                run_id: Some(RunId(run_id.to_string())),
            });
        self
    }

    pub(crate) fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }

    pub(crate) fn session_count(&self) -> usize {
        self.state.lock().unwrap().sessions.len()
    }

    pub(crate) fn user_messages(&self, session_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .get(&SessionId::from(session_id))
            .map(|msgs| {
                msgs.iter()
                    .filter(|m| m.role == MessageRole::User)
                    .map(|m| m.text.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn run_sessions(&self) -> Vec<SessionId> {
        self.state.lock().unwrap().run_sessions.clone()
    }

    pub(crate) fn definitions(&self) -> Vec<AssistantDefinition> {
        self.state.lock().unwrap().definitions.clone()
    }

    fn answer(state: &mut MockState, session_id: &SessionId, run_id: &RunId) {
        if !state.answered_runs.insert(run_id.clone()) {
            return;
        }
        let id = format!("msg_{}", state.next_id);
        state.next_id += 1;
        let text = state.reply_text.clone();
        if let Some(messages) = state.sessions.get_mut(session_id) {
            messages.push(SessionMessage {
                id,
                role: MessageRole::Assistant,
                text,
                created_at: Utc::now(),
                run_id: Some(run_id.clone()),
            });
        }
    }

    fn run(state: &MockState, session_id: &SessionId, run_id: RunId, status: RunStatus) -> Run {
        let last_error = if status == RunStatus::Failed {
            state.last_error.clone()
        } else {
            None
        };
        Run {
            id: run_id,
            session_id: session_id.clone(),
            status,
            last_error,
        }
    }
}

fn session_not_found(session_id: &SessionId) -> AssistantError {
    AssistantError::NotFound {
        resource: format!("thread {session_id}"),
    }
}

impl AssistantApi for MockAssistantApi {
    async fn create_session(&self) -> Result<SessionId, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_session += 1;
        let id = SessionId::new(format!("thread_{}", state.next_id));
        state.next_id += 1;
        state.sessions.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn post_message(&self, session_id: &SessionId, text: &str) -> Result<(), AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.post_message += 1;
        let id = format!("msg_{}", state.next_id);
        state.next_id += 1;
        let messages = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        messages.push(SessionMessage {
            id,
            role: MessageRole::User,
            text: text.to_string(),
            created_at: Utc::now(),
            run_id: None,
        });
        Ok(())
    }

    async fn start_run(&self, session_id: &SessionId, _assistant_id: &str) -> Result<Run, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.start_run += 1;
        if !state.sessions.contains_key(session_id) {
            return Err(session_not_found(session_id));
        }
        let run_id = RunId(format!("run_{}", state.next_id));
        state.next_id += 1;
        state.run_sessions.push(session_id.clone());
        let status = state.initial_status;
        if status == RunStatus::Completed {
            Self::answer(&mut state, session_id, &run_id);
        }
        Ok(Self::run(&state, session_id, run_id, status))
    }

    async fn retrieve_run(&self, session_id: &SessionId, run_id: &RunId) -> Result<Run, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.retrieve_run += 1;
        let status = state.script.pop_front().unwrap_or(RunStatus::Completed);
        if status == RunStatus::Completed {
            Self::answer(&mut state, session_id, run_id);
        }
        Ok(Self::run(&state, session_id, run_id.clone(), status))
    }

    async fn list_messages(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<SessionMessage>, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_messages += 1;
        let messages = state
            .sessions
            .get(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok(messages.iter().rev().take(limit as usize).cloned().collect())
    }
}

impl AssistantAdmin for MockAssistantApi {
    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upload_file += 1;
        let id = format!("file-{}", state.next_id);
        state.next_id += 1;
        Ok(UploadedFile {
            id,
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: 0,
        })
    }

    async fn create_assistant(&self, definition: &AssistantDefinition) -> Result<Assistant, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_assistant += 1;
        state.definitions.push(definition.clone());
        let id = format!("asst_{}", state.next_id);
        state.next_id += 1;
        let tools = if definition.knowledge_file_ids.is_empty() {
            Vec::new()
        } else {
            vec!["file_search".to_string()]
        };
        Ok(Assistant {
            id,
            name: Some(definition.name.clone()),
            model: definition.model.clone(),
            instructions: Some(definition.instructions.clone()),
            tools,
        })
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.retrieve_assistant += 1;
        if !assistant_id.starts_with("asst_") {
            return Err(AssistantError::NotFound {
                resource: format!("assistant {assistant_id}"),
            });
        }
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("WhatsApp AI Assistant".to_string()),
            model: "gpt-4-1106-preview".to_string(),
            instructions: None,
            tools: Vec::new(),
        })
    }
}
