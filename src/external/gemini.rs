use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{generation_error, schema_validation_error, upstream_unavailable_error, Error},
    external::generation::{GenerationRequest, TextGenerator, Tool},
};

/// Model turns allowed to end in a tool call before giving up.
const MAX_TOOL_ROUNDS: usize = 4;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    // echoed back untouched on the next turn
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".into(),
            parts,
        }
    }

    fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    fn function_calls(&self) -> Vec<FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| part.function_call.clone())
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionDeclaration {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolSet],
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
}

/// Gemini `generateContent` with JSON output and function calling.
#[derive(Clone, Debug)]
pub struct Gemini {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl Gemini {
    pub fn new(api_base: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
            model,
        }
    }

    async fn send(&self, body: &GenerateContentRequest<'_>) -> Result<Content, Error> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        let res = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status_code = res.status().as_u16();
        let text = res.text().await?;

        match status_code {
            200 => {}
            401 | 403 | 503 => {
                return Err(upstream_unavailable_error("text generation unavailable")
                    .with_cause(format!("HTTP {}: {}", status_code, text)))
            }
            _ => return Err(generation_error(format!("HTTP {}: {}", status_code, text))),
        }

        let data: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|err| generation_error(format!("unreadable response: {}", err)))?;

        let candidate = data.candidates.into_iter().next().ok_or_else(|| {
            generation_error(format!("no candidates, feedback: {:?}", data.prompt_feedback))
        })?;

        candidate.content.ok_or_else(|| {
            generation_error(format!(
                "empty candidate, finish reason: {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })
    }
}

#[async_trait]
impl TextGenerator for Gemini {
    #[tracing::instrument(skip_all, fields(request = request.name, tools = request.tools.len()))]
    async fn generate(&self, request: GenerationRequest) -> Result<Value, Error> {
        let use_tools = !request.tools.is_empty();

        // JSON mode cannot be combined with function calling; the schema
        // goes into the prompt instead.
        let (prompt, generation_config) = if use_tools {
            (
                format!(
                    "{}\n\nRespond with only a JSON object matching this schema:\n{}",
                    request.prompt, request.output_schema
                ),
                GenerationConfig {
                    response_mime_type: None,
                    response_schema: None,
                },
            )
        } else {
            (
                request.prompt.clone(),
                GenerationConfig {
                    response_mime_type: Some("application/json"),
                    response_schema: Some(request.output_schema.clone()),
                },
            )
        };

        let mut contents = vec![Content::user(vec![Part {
            text: Some(prompt),
            ..Default::default()
        }])];

        let tools = if use_tools {
            vec![ToolSet {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|tool| FunctionDeclaration {
                        name: tool.name(),
                        description: tool.description(),
                        parameters: tool.parameters(),
                    })
                    .collect(),
            }]
        } else {
            Vec::new()
        };

        for _ in 0..=MAX_TOOL_ROUNDS {
            let body = GenerateContentRequest {
                contents: &contents,
                tools: &tools,
                generation_config: &generation_config,
            };

            let content = self.send(&body).await?;
            let calls = content.function_calls();

            if calls.is_empty() {
                return parse_json_text(&content.text());
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                tracing::info!(tool = %call.name, "model requested tool call");

                let output = call_tool(&request.tools, &call).await?;
                responses.push(Part {
                    function_response: Some(FunctionResponse {
                        name: call.name,
                        response: output,
                    }),
                    ..Default::default()
                });
            }

            contents.push(content);
            contents.push(Content::user(responses));
        }

        Err(generation_error(format!(
            "model kept calling tools after {} rounds",
            MAX_TOOL_ROUNDS
        )))
    }
}

async fn call_tool(tools: &[Arc<dyn Tool>], call: &FunctionCall) -> Result<Value, Error> {
    let tool = tools
        .iter()
        .find(|tool| tool.name() == call.name)
        .ok_or_else(|| generation_error(format!("model called unknown tool `{}`", call.name)))?;

    tool.call(call.args.clone()).await
}

/// Pulls the JSON object out of a text answer, tolerating code fences.
fn parse_json_text(text: &str) -> Result<Value, Error> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced)
        .map_err(|err| schema_validation_error(format!("answer is not JSON ({}): {}", err, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

    #[derive(Default)]
    struct RecordingTool {
        calls: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &'static str {
            "getDirections"
        }

        fn description(&self) -> &'static str {
            "Driving directions between two places"
        }

        fn parameters(&self) -> Value {
            json!({ "type": "OBJECT" })
        }

        async fn call(&self, args: Value) -> Result<Value, Error> {
            self.calls.lock().unwrap().push(args);
            Ok(json!({ "distance": 120.0, "duration": 150.0 }))
        }
    }

    fn gemini(server: &MockServer) -> Gemini {
        Gemini::new(server.uri(), "test-key".into(), "gemini-test".into())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "estimate_route",
            "Estimate a bus trip from Patiala to Moga.".into(),
            json!({ "type": "OBJECT" }),
        )
    }

    fn text_answer(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP",
            }],
        }))
    }

    fn tool_call(name: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": name,
                            "args": { "origin": "Patiala", "destination": "Moga" },
                        },
                    }],
                },
            }],
        }))
    }

    #[tokio::test]
    async fn json_mode_is_requested_without_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" },
            })))
            .respond_with(text_answer("{\"distance\": 120}"))
            .expect(1)
            .mount(&server)
            .await;

        let answer = gemini(&server).generate(request()).await.unwrap();
        assert_eq!(answer, json!({ "distance": 120 }));
    }

    #[tokio::test]
    async fn tool_result_is_sent_back_before_the_answer() {
        let server = MockServer::start().await;
        // registered first so it wins once the tool output is in the body
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("functionResponse"))
            .respond_with(text_answer("```json\n{\"distance\": 120}\n```"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(tool_call("getDirections"))
            .expect(1)
            .mount(&server)
            .await;

        let tool = Arc::new(RecordingTool::default());
        let answer = gemini(&server)
            .generate(request().with_tool(tool.clone()))
            .await
            .unwrap();

        assert_eq!(answer, json!({ "distance": 120 }));
        assert_eq!(
            *tool.calls.lock().unwrap(),
            vec![json!({ "origin": "Patiala", "destination": "Moga" })]
        );

        let requests = server.received_requests().await.unwrap();
        let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            first["tools"][0]["functionDeclarations"][0]["name"],
            "getDirections"
        );
        assert!(first["generationConfig"].get("responseMimeType").is_none());

        let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
        let contents = second["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["distance"],
            120.0
        );
    }

    #[tokio::test]
    async fn endless_tool_calls_give_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(tool_call("getDirections"))
            .expect(MAX_TOOL_ROUNDS as u64 + 1)
            .mount(&server)
            .await;

        let tool = Arc::new(RecordingTool::default());
        let err = gemini(&server)
            .generate(request().with_tool(tool.clone()))
            .await
            .unwrap_err();

        assert!(err.is_generation_error());
        assert_eq!(tool.calls.lock().unwrap().len(), MAX_TOOL_ROUNDS + 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(tool_call("getWeather"))
            .expect(1)
            .mount(&server)
            .await;

        let tool = Arc::new(RecordingTool::default());
        let err = gemini(&server)
            .generate(request().with_tool(tool.clone()))
            .await
            .unwrap_err();

        assert!(err.is_generation_error());
        assert!(tool.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn auth_and_overload_statuses_are_upstream_unavailable() {
        for status in [401u16, 403, 503] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let err = gemini(&server).generate(request()).await.unwrap_err();
            assert!(err.is_upstream_unavailable_error(), "HTTP {}", status);
        }
    }

    #[tokio::test]
    async fn other_failures_are_generation_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = gemini(&server).generate(request()).await.unwrap_err();
        assert!(err.is_generation_error());
        assert_eq!(err.cause.as_deref(), Some("HTTP 500: boom"));
    }

    #[test]
    fn plain_and_fenced_answers_parse() {
        assert_eq!(parse_json_text(" {\"a\": 1} ").unwrap(), json!({ "a": 1 }));
        assert_eq!(
            parse_json_text("```json\n{\"a\": 1}\n```").unwrap(),
            json!({ "a": 1 })
        );
        assert_eq!(parse_json_text("```\n[1]\n```").unwrap(), json!([1]));
    }

    #[test]
    fn prose_answer_is_a_schema_error() {
        let err = parse_json_text("The trip takes two hours.").unwrap_err();
        assert!(err.is_schema_validation_error());
    }

    #[test]
    fn function_calls_are_read_from_parts() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                { "functionCall": { "name": "getDirections", "args": { "origin": "Patiala", "destination": "Moga" } } },
                { "thoughtSignature": "abc" },
            ],
        }))
        .unwrap();

        let calls = content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args["origin"], "Patiala");

        // unknown fields survive the echo back to the model
        let echoed = serde_json::to_value(&content).unwrap();
        assert_eq!(echoed["parts"][1]["thoughtSignature"], "abc");
    }

    #[test]
    fn request_body_uses_json_mode_without_tools() {
        let contents = vec![Content::user(vec![Part {
            text: Some("hi".into()),
            ..Default::default()
        }])];

        let config = GenerationConfig {
            response_mime_type: Some("application/json"),
            response_schema: Some(json!({ "type": "OBJECT" })),
        };
        let body = GenerateContentRequest {
            contents: &contents,
            tools: &[],
            generation_config: &config,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("tools").is_none());
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["contents"][0]["parts"][0], json!({ "text": "hi" }));
    }
}
