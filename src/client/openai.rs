use super::{
    build_client, json_id, send_json, AssistantApi, AssistantData, MessageRole, Run,
    CODE_INTERPRETER,
};
use crate::config::Config;

use anyhow::{anyhow, Context, Result};
use reqwest::{multipart, Client as ReqwestClient, Method, RequestBuilder};
use serde_json::{json, Value};

const API_BASE: &str = "https://api.openai.com/v1";
const ASSISTANTS_BETA: &str = "assistants=v2";
const FILE_PURPOSE: &str = "assistants";

#[derive(Debug)]
pub struct OpenAIClient {
    client: ReqwestClient,
    api_key: Option<String>,
    api_base: String,
    organization_id: Option<String>,
}

impl OpenAIClient {
    pub fn init(config: &Config) -> Result<Self> {
        let client = build_client(config.proxy.as_ref(), config.connect_timeout)?;
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| API_BASE.to_string());
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
            organization_id: config.organization_id.clone(),
        })
    }

    fn get_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Miss api_key, please set OPENAI_API_KEY"))
    }

    fn request_builder(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let api_key = self.get_api_key()?;
        let url = format!("{}/{path}", self.api_base);

        debug!("OpenAI Request: {method} {url}");

        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA);

        if let Some(organization_id) = &self.organization_id {
            builder = builder.header("OpenAI-Organization", organization_id);
        }

        Ok(builder)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        debug!("OpenAI Request Body: {body}");
        let builder = self.request_builder(Method::POST, path)?.json(&body);
        send_json(builder).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let builder = self.request_builder(Method::GET, path)?;
        send_json(builder).await
    }
}

#[async_trait::async_trait]
impl AssistantApi for OpenAIClient {
    async fn create_assistant(&self, data: &AssistantData) -> Result<String> {
        let body = build_assistant_body(data);
        let res = self
            .post("assistants", body)
            .await
            .with_context(|| "Failed to create assistant")?;
        json_id(&res)
    }

    async fn create_thread(&self, role: MessageRole, content: &str) -> Result<String> {
        let body = json!({
            "messages": [{ "role": role, "content": content }],
        });
        let res = self
            .post("threads", body)
            .await
            .with_context(|| "Failed to create thread")?;
        json_id(&res)
    }

    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<String> {
        let part = multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("purpose", FILE_PURPOSE)
            .part("file", part);
        let builder = self.request_builder(Method::POST, "files")?.multipart(form);
        let res = send_json(builder)
            .await
            .with_context(|| format!("Failed to upload '{file_name}'"))?;
        json_id(&res)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        content: &str,
        file_id: Option<&str>,
    ) -> Result<()> {
        let body = build_message_body(content, file_id);
        self.post(&format!("threads/{thread_id}/messages"), body)
            .await
            .with_context(|| "Failed to create message")?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let body = json!({ "assistant_id": assistant_id });
        let res = self
            .post(&format!("threads/{thread_id}/runs"), body)
            .await
            .with_context(|| "Failed to create run")?;
        parse_run(res)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let res = self
            .get(&format!("threads/{thread_id}/runs/{run_id}"))
            .await
            .with_context(|| "Failed to retrieve run")?;
        parse_run(res)
    }

    async fn list_messages(&self, thread_id: &str, run_id: &str) -> Result<Value> {
        self.get(&format!("threads/{thread_id}/messages?run_id={run_id}"))
            .await
            .with_context(|| "Failed to list messages")
    }
}

fn build_assistant_body(data: &AssistantData) -> Value {
    json!({
        "instructions": data.instructions,
        "name": data.name,
        "tools": [{ "type": CODE_INTERPRETER }],
        "model": data.model,
    })
}

fn build_message_body(content: &str, file_id: Option<&str>) -> Value {
    let mut body = json!({
        "role": MessageRole::User,
        "content": content,
    });
    if let Some(file_id) = file_id {
        body["attachments"] = json!([{
            "file_id": file_id,
            "tools": [{ "type": CODE_INTERPRETER }],
        }]);
    }
    body
}

fn parse_run(data: Value) -> Result<Run> {
    serde_json::from_value(data.clone()).with_context(|| format!("Invalid run data: {data}"))
}
