use super::{AssistantData, MessageRole, Run};

use anyhow::{bail, Context, Result};
use reqwest::{Client as ReqwestClient, Proxy, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// The remote assistant service.
///
/// Every call is a single request; nothing here retries.
#[async_trait::async_trait]
pub trait AssistantApi: Sync + Send {
    async fn create_assistant(&self, data: &AssistantData) -> Result<String>;

    async fn create_thread(&self, role: MessageRole, content: &str) -> Result<String>;

    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<String>;

    async fn create_message(
        &self,
        thread_id: &str,
        content: &str,
        file_id: Option<&str>,
    ) -> Result<()>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    async fn list_messages(&self, thread_id: &str, run_id: &str) -> Result<Value>;
}

pub fn build_client(proxy: Option<&String>, connect_timeout: u64) -> Result<ReqwestClient> {
    let mut builder = ReqwestClient::builder();
    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy).with_context(|| "Invalid config.proxy")?);
    }
    let client = builder
        .connect_timeout(Duration::from_secs(connect_timeout))
        .build()
        .with_context(|| "Failed to build client")?;
    Ok(client)
}

pub async fn send_json(builder: RequestBuilder) -> Result<Value> {
    let res = builder.send().await?;
    let status = res.status();
    let data: Value = res.json().await?;
    catch_error(&data, status.as_u16())?;
    debug!("response: {data}");
    Ok(data)
}

pub fn catch_error(data: &Value, status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    debug!("Invalid response, status: {status}, data: {data}");
    if let Some(error) = data["error"].as_object() {
        if let (Some(typ), Some(message)) = (
            json_str_from_map(error, "type"),
            json_str_from_map(error, "message"),
        ) {
            bail!("{message} (type: {typ})");
        } else if let (Some(code), Some(message)) = (
            json_str_from_map(error, "code"),
            json_str_from_map(error, "message"),
        ) {
            bail!("{message} (code: {code})");
        } else if let Some(message) = json_str_from_map(error, "message") {
            bail!("{message} (status: {status})");
        }
    } else if let Some(error) = data["error"].as_str() {
        bail!("{error}");
    } else if let Some(message) = data["message"].as_str() {
        bail!("{message}");
    }
    bail!("Invalid response data: {data} (status: {status})");
}

pub fn json_str_from_map<'a>(
    map: &'a serde_json::Map<String, Value>,
    field_name: &str,
) -> Option<&'a str> {
    map.get(field_name).and_then(|v| v.as_str())
}

pub fn json_id(data: &Value) -> Result<String> {
    data["id"]
        .as_str()
        .map(|v| v.to_string())
        .with_context(|| format!("Invalid response data: {data}"))
}
