use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::entities::Validate;
use crate::error::{schema_validation_error, Error};

/// A function the generator may call before it answers.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Schema of the arguments object.
    fn parameters(&self) -> Value;
    async fn call(&self, args: Value) -> Result<Value, Error>;
}

pub struct GenerationRequest {
    /// Short label for logs.
    pub name: &'static str,
    pub prompt: String,
    /// Schema the answer must follow.
    pub output_schema: Value,
    pub tools: Vec<Arc<dyn Tool>>,
}

impl GenerationRequest {
    pub fn new(name: &'static str, prompt: String, output_schema: Value) -> Self {
        Self {
            name,
            prompt,
            output_schema,
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }
}

/// Structured prompt in, JSON object out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Value, Error>;
}

/// Runs `request` and parses the answer into `T`. Any shape or range
/// mismatch is a schema validation error, logged with the payload.
pub async fn generate_validated<T>(
    generator: &dyn TextGenerator,
    request: GenerationRequest,
) -> Result<T, Error>
where
    T: DeserializeOwned + Validate,
{
    let name = request.name;
    let payload = generator.generate(request).await?;

    parse_validated(name, payload)
}

pub fn parse_validated<T>(name: &str, payload: Value) -> Result<T, Error>
where
    T: DeserializeOwned + Validate,
{
    let parsed: Result<T, Error> = serde_json::from_value::<T>(payload.clone())
        .map_err(|err| schema_validation_error(err))
        .and_then(|value| value.validate().map(|_| value));

    if let Err(err) = &parsed {
        tracing::error!(
            request = name,
            cause = ?err.cause,
            payload = %payload,
            "payload failed schema validation"
        );
    }

    parsed
}
