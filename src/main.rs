mod cli;
mod client;
mod config;
mod logger;
mod relay;
mod store;
mod utils;

#[macro_use]
extern crate log;

use crate::cli::Cli;
use crate::client::OpenAIClient;
use crate::config::Config;
use crate::logger::setup_logger;
use crate::relay::Relay;
use crate::store::{SessionKey, SessionStore};
use crate::utils::{create_abort_signal, extract_code, watch_abort_signal, AbortSignal};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use std::{env, process::exit, sync::Arc};

const NO_LAST_RESPONSE: &str = "No last response found.";

#[tokio::main]
async fn main() -> Result<()> {
    if env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(());
    }
    let cli = Cli::parse();
    let config = Config::init()?;
    setup_logger()?;

    let key = match cli.session.as_deref().or(config.session.as_deref()) {
        Some(v) => SessionKey::new(v)?,
        None => SessionKey::from_parent_process(),
    };
    let store = SessionStore::open(key)?;

    let abort_signal = create_abort_signal();
    watch_ctrlc(abort_signal.clone());

    let api = Arc::new(OpenAIClient::init(&config)?);
    let relay = Relay::new(
        api,
        store,
        config.assistant_data(),
        config.poll_options(),
        abort_signal.clone(),
    );

    let ret = tokio::select! {
        ret = run(&cli, &relay) => ret,
        _ = watch_abort_signal(abort_signal) => Err(anyhow!("Interrupted")),
    };
    match ret {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit(1);
        }
    }
    Ok(())
}

fn watch_ctrlc(abort_signal: AbortSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort_signal.set_ctrlc();
        }
    });
}

/// Returns the text to print, persisting it as the last response when it is a non-empty reply.
async fn run(cli: &Cli, relay: &Relay) -> Result<Option<String>> {
    let response = if cli.last {
        match relay.store().last_response()? {
            Some(v) => v,
            None => return Ok(Some(NO_LAST_RESPONSE.to_string())),
        }
    } else {
        let message = cli.message();
        if message.is_empty() {
            return Ok(None);
        }
        let file_id = match &cli.file {
            Some(file) => relay.resolve_attachment(file).await?,
            None => None,
        };
        let assistant_id = relay.ensure_assistant(cli.new).await?;
        let thread_id = relay.ensure_thread(cli.new).await?;

        if cli.debug {
            println!("Assistant ID: {assistant_id}");
            println!("Thread ID: {thread_id}");
            println!("Message To Send: {message}");
            println!("Attached File: {}", file_id.as_deref().unwrap_or("None"));
            println!();
        }

        relay
            .relay(
                &assistant_id,
                &thread_id,
                file_id.as_deref(),
                &message,
                cli.debug,
            )
            .await
            .with_context(|| "Error communicating with the assistant")?
    };

    let response = if cli.code {
        extract_code(&response)
    } else {
        response
    };
    if response.is_empty() {
        return Ok(None);
    }
    relay.store().save_last_response(&response)?;
    Ok(Some(response))
}
