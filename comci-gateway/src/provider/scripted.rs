//! In-memory provider with canned replies, for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ProviderError;
use super::{ProviderSession, TimetableProvider};

/// Canned reply: data, or an API error carrying this message.
pub type Reply<T> = Result<T, String>;

#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    pub search: Reply<Vec<Value>>,
    pub timetable: Reply<Value>,
    pub class_times: Reply<Value>,
    /// Added before every data call.
    pub delay: Duration,
    sessions: Arc<AtomicUsize>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            search: Ok(Vec::new()),
            timetable: Ok(Value::Null),
            class_times: Ok(Value::Null),
            delay: Duration::ZERO,
            sessions: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ScriptedProvider {
    pub fn with_search(mut self, reply: Reply<Vec<Value>>) -> Self {
        self.search = reply;
        self
    }

    pub fn with_timetable(mut self, reply: Reply<Value>) -> Self {
        self.timetable = reply;
        self
    }

    pub fn with_class_times(mut self, reply: Reply<Value>) -> Self {
        self.class_times = reply;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

/// The error a scripted failure produces.
pub fn scripted_error(message: &str) -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl TimetableProvider for ScriptedProvider {
    async fn open_session(&self) -> Result<Box<dyn ProviderSession>, ProviderError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.clone(),
            school: None,
        }))
    }
}

struct ScriptedSession {
    script: ScriptedProvider,
    school: Option<u32>,
}

impl ScriptedSession {
    async fn reply<T: Clone>(&self, reply: &Reply<T>) -> Result<T, ProviderError> {
        if !self.script.delay.is_zero() {
            tokio::time::sleep(self.script.delay).await;
        }
        reply.clone().map_err(|message| scripted_error(&message))
    }
}

#[async_trait]
impl ProviderSession for ScriptedSession {
    fn set_school(&mut self, code: u32) -> Result<(), ProviderError> {
        self.school = Some(code);
        Ok(())
    }

    async fn search(&mut self, _keyword: &str) -> Result<Vec<Value>, ProviderError> {
        self.reply(&self.script.search).await
    }

    async fn timetable(&mut self) -> Result<Value, ProviderError> {
        self.school.ok_or(ProviderError::SchoolNotSet)?;
        self.reply(&self.script.timetable).await
    }

    async fn class_times(&mut self) -> Result<Value, ProviderError> {
        self.school.ok_or(ProviderError::SchoolNotSet)?;
        self.reply(&self.script.class_times).await
    }
}
