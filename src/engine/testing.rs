use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use super::Engine;
use crate::{
    auth::User,
    config::RouteGrounding,
    db::{DocumentChange, DocumentStore, MemoryStore},
    error::{database_error, generation_error, Error},
    external::{
        generation::{GenerationRequest, TextGenerator},
        google_maps::GoogleMaps,
    },
};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub name: &'static str,
    pub prompt: String,
    pub tools: Vec<&'static str>,
}

/// Answers from a script, in order, and counts every call.
#[derive(Default)]
pub struct ScriptedGenerator {
    answers: Mutex<VecDeque<Result<Value, Error>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    calls: AtomicUsize,
    tool_args: Option<Value>,
}

impl ScriptedGenerator {
    pub fn new(answers: Vec<Result<Value, Error>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    /// Calls every offered tool with `args` before answering.
    pub fn calling_tools(mut self, args: Value) -> Self {
        self.tool_args = Some(args);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Value, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            name: request.name,
            prompt: request.prompt.clone(),
            tools: request.tools.iter().map(|tool| tool.name()).collect(),
        });

        if let Some(args) = &self.tool_args {
            for tool in &request.tools {
                tool.call(args.clone()).await?;
            }
        }

        let answer = self.answers.lock().unwrap().pop_front();
        answer.unwrap_or_else(|| Err(generation_error("script exhausted")))
    }
}

/// Reads go through, every write fails.
#[derive(Default)]
pub struct ReadOnlyStore(pub MemoryStore);

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, Error> {
        self.0.get(collection, key).await
    }

    async fn set(&self, _collection: &str, _key: &str, _data: Value) -> Result<(), Error> {
        Err(database_error("read-only store"))
    }

    async fn create(&self, _collection: &str, _key: &str, _data: Value) -> Result<bool, Error> {
        Err(database_error("read-only store"))
    }

    async fn merge(
        &self,
        _collection: &str,
        _key: &str,
        _patch: Value,
    ) -> Result<Option<Value>, Error> {
        Err(database_error("read-only store"))
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, Error> {
        self.0.list(collection).await
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.0.subscribe()
    }
}

pub fn admin() -> User {
    User {
        id: "ADM-001".into(),
        roles: vec!["admin".into()],
    }
}

pub fn driver_user(id: &str) -> User {
    User {
        id: id.into(),
        roles: vec!["driver".into()],
    }
}

/// Engine whose directions provider has no API key.
pub fn engine(
    store: Arc<dyn DocumentStore>,
    generator: Arc<ScriptedGenerator>,
    grounding: RouteGrounding,
) -> Engine {
    let directions = Arc::new(GoogleMaps::new("https://maps.googleapis.com".into(), None));

    Engine::new(store, generator, directions, grounding).unwrap()
}
