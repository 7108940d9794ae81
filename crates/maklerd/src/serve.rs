// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `maklerd serve` command implementation.
//!
//! Provisions the hosted assistant (tools, instructions, optional knowledge
//! base), prepares the intent router, and starts the HTTP gateway. Shuts
//! down on Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use maklerd_agent::reference_intents;
use maklerd_assistant::AssistantClient;
use maklerd_config::model::MaklerdConfig;
use maklerd_core::MaklerError;
use maklerd_gateway::GatewayState;
use maklerd_intent::IntentRouter;
use maklerd_tools::ToolDispatcher;
use tracing::{info, warn};

/// Runs the `maklerd serve` command.
pub async fn run_serve(config: MaklerdConfig) -> Result<(), MaklerError> {
    init_tracing(&config.agent.log_level);

    info!("starting maklerd serve");

    let client = Arc::new(AssistantClient::from_config(&config.provider).map_err(|e| {
        eprintln!(
            "maklerd: the assistant platform is not reachable without credentials.\n\
             Set provider.api_key in maklerd.toml or export MAKLERD_PROVIDER_API_KEY."
        );
        e
    })?);

    let assistant = client
        .create_assistant(
            &config.agent.name,
            &config.agent.instructions,
            maklerd_tools::assistant_tools(),
        )
        .await?;
    info!(assistant = %assistant.id, model = client.model(), "assistant provisioned");

    provision_knowledge_base(&client, &assistant.id, &config).await;

    let mut router = IntentRouter::new(
        client.clone(),
        reference_intents(),
        config.intent.threshold,
    );
    router.prepare().await?;
    info!("intent router prepared");

    let dispatcher = Arc::new(ToolDispatcher::new(
        config.data.performance_csv.clone().into(),
        config.data.productivity_csv.clone().into(),
    ));

    let state = GatewayState::new(
        client,
        Arc::new(router),
        dispatcher,
        assistant.id,
        config.uploads.clone(),
    );

    tokio::select! {
        result = maklerd_gateway::start_server(&config.server.host, config.server.port, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping gateway");
            Ok(())
        }
    }
}

/// Uploads configured knowledge-base files into a vector store and attaches
/// it to the assistant. Best-effort: a missing or failing file is skipped
/// with a warning, since the assistant works without file search.
async fn provision_knowledge_base(
    client: &AssistantClient,
    assistant_id: &str,
    config: &MaklerdConfig,
) {
    if config.data.knowledge_files.is_empty() {
        return;
    }

    let store = match client
        .create_vector_store(&format!("{}-knowledge", config.agent.name))
        .await
    {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "failed to create vector store, continuing without file search");
            return;
        }
    };

    let mut attached = 0usize;
    for file in &config.data.knowledge_files {
        let path = Path::new(&config.uploads.dir).join(file);
        if !path.exists() {
            warn!(file = %path.display(), "knowledge file missing, skipping");
            continue;
        }
        let uploaded = match client.upload_file(&path).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "knowledge file upload failed, skipping");
                continue;
            }
        };
        match client.add_file_to_vector_store(&store.id, &uploaded.id).await {
            Ok(()) => attached += 1,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to attach knowledge file")
            }
        }
    }

    if attached == 0 {
        warn!("no knowledge files attached, continuing without file search");
        return;
    }
    match client.attach_vector_store(assistant_id, &store.id).await {
        Ok(_) => info!(store = %store.id, files = attached, "knowledge base attached"),
        Err(e) => warn!(error = %e, "failed to attach vector store to assistant"),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("maklerd={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
