use crate::client::{extract_reply, AssistantApi, AssistantData, MessageRole, Run, RunStatus};
use crate::config::PollOptions;
use crate::store::SessionStore;
use crate::utils::{watch_abort_signal, AbortSignal};

use anyhow::{bail, Context, Result};
use std::{path::Path, sync::Arc, time::Instant};

pub const LAST_FILE_SENTINEL: &str = "last";

const THREAD_SEED_MESSAGE: &str = "You are a helpful assistant.";

/// Talks to the assistant service on behalf of one session.
pub struct Relay {
    api: Arc<dyn AssistantApi>,
    store: SessionStore,
    assistant: AssistantData,
    poll: PollOptions,
    abort_signal: AbortSignal,
}

impl Relay {
    pub fn new(
        api: Arc<dyn AssistantApi>,
        store: SessionStore,
        assistant: AssistantData,
        poll: PollOptions,
        abort_signal: AbortSignal,
    ) -> Self {
        Self {
            api,
            store,
            assistant,
            poll,
            abort_signal,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub async fn ensure_assistant(&self, force_new: bool) -> Result<String> {
        if !force_new {
            if let Some(id) = self.store.assistant_id()? {
                return Ok(id);
            }
        }
        println!("Creating a new assistant...");
        let id = self.api.create_assistant(&self.assistant).await?;
        self.store.save_assistant_id(&id)?;
        debug!("assistant created: {id}");
        Ok(id)
    }

    pub async fn ensure_thread(&self, force_new: bool) -> Result<String> {
        if !force_new {
            if let Some(id) = self.store.thread_id()? {
                return Ok(id);
            }
        }
        let id = self
            .api
            .create_thread(MessageRole::Assistant, THREAD_SEED_MESSAGE)
            .await?;
        self.store.save_thread_id(&id)?;
        debug!("thread created for session {}: {id}", self.store.key());
        Ok(id)
    }

    /// Resolves `--file`: the `last` sentinel recalls the cached id, anything else is uploaded.
    pub async fn resolve_attachment(&self, file: &str) -> Result<Option<String>> {
        if file.eq_ignore_ascii_case(LAST_FILE_SENTINEL) {
            let file_id = self.store.last_file()?;
            if file_id.is_none() {
                println!("No previous file to attach");
            }
            return Ok(file_id);
        }
        self.attach(file).await
    }

    pub async fn attach(&self, file_path: &str) -> Result<Option<String>> {
        let path = Path::new(file_path);
        if !path.exists() {
            println!("File not found: {file_path}");
            return Ok(None);
        }
        let contents = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read '{file_path}'"))?;
        let file_name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string());
        let file_id = self.api.upload_file(&file_name, contents).await?;
        self.store.save_last_file(&file_id)?;
        println!("File attached as {file_id}");
        Ok(Some(file_id))
    }

    /// Posts `message` on the thread, runs the assistant and returns the reply text.
    ///
    /// Posting is not idempotent, so a failure after the first step must not be retried
    /// blindly.
    pub async fn relay(
        &self,
        assistant_id: &str,
        thread_id: &str,
        file_id: Option<&str>,
        message: &str,
        debug: bool,
    ) -> Result<String> {
        self.api
            .create_message(thread_id, message, file_id)
            .await?;
        let run = self.api.create_run(thread_id, assistant_id).await?;
        let run = self.wait_for_run(thread_id, run).await?;
        let messages = self.api.list_messages(thread_id, &run.id).await?;
        if debug {
            println!("{}", serde_json::to_string_pretty(&messages)?);
            println!();
        }
        extract_reply(&messages)
    }

    async fn wait_for_run(&self, thread_id: &str, mut run: Run) -> Result<Run> {
        let started = Instant::now();
        loop {
            debug!("run {} status: {}", run.id, run.status.name());
            if run.status == RunStatus::Completed {
                return Ok(run);
            }
            if run.status.is_dead_end() {
                match &run.last_error {
                    Some(err) => bail!(
                        "Run {} {}: {} (code: {})",
                        run.id,
                        run.status.name(),
                        err.message,
                        err.code.as_deref().unwrap_or("unknown")
                    ),
                    None => bail!("Run {} {}", run.id, run.status.name()),
                }
            }
            let mut delay = self.poll.interval;
            if let Some(timeout) = self.poll.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    bail!(
                        "Run {} did not complete within {}s (status: {})",
                        run.id,
                        timeout.as_secs(),
                        run.status.name()
                    );
                }
                delay = delay.min(timeout - elapsed);
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = watch_abort_signal(self.abort_signal.clone()) => {
                    bail!("Aborted while waiting for run {}", run.id);
                }
            }
            run = self.api.retrieve_run(thread_id, &run.id).await?;
        }
    }
}
