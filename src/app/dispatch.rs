use crate::app::components;
use crate::cli::commands::{ChannelCommands, Cli, Commands};
use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Password};
use nanobanana::Config;
use nanobanana::core::images::Aspect;
use nanobanana::core::prompt::PromptComposer;
use nanobanana::pipeline::{RunOptions, WorkerSettings, job_queue, run_worker};
use nanobanana::transport::channels::ChannelConnection;
use nanobanana::transport::channels::telegram::session::remove_session;
use nanobanana::transport::gateway::{AppState, run_gateway};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Smoke {
            n,
            aspect,
            no_send,
            delay_secs,
        } => smoke(&config, n, aspect, no_send, delay_secs).await,
        Commands::Prompt { offline } => prompt(&config, offline).await,
        Commands::Channel { channel_command } => channel(&config, channel_command).await,
    }
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);

    let connection = components::telegram_connection(&config);
    let pipeline = Arc::new(components::pipeline(&config, &connection));
    if pipeline.delivery().is_none() {
        tracing::warn!("telegram.target_chat_id is not set; queued jobs will fail");
    }

    let (queue, jobs) = job_queue(config.gateway.queue_capacity);
    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(run_worker(
        Arc::clone(&pipeline),
        jobs,
        WorkerSettings::from_config(&config),
        shutdown.clone(),
    ));

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                signal_token.cancel();
            }
            Err(err) => tracing::warn!(error = %err, "cannot listen for Ctrl-C"),
        }
    });

    let state = AppState {
        queue,
        env: config.app.env.clone(),
        tz: config.app.tz.clone(),
    };
    let result = run_gateway(
        &host,
        port,
        config.gateway.allow_public_bind,
        state,
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    if let Err(err) = worker.await {
        tracing::warn!(error = %err, "job worker task failed");
    }
    connection.release().await;
    result
}

async fn smoke(
    config: &Config,
    n: usize,
    aspect: Option<Aspect>,
    no_send: bool,
    delay_secs: Option<u64>,
) -> Result<()> {
    let aspect = aspect.unwrap_or(config.generation.image_aspect);
    let header = format!(
        "Nano Banana — smoke | {} | count={n} | aspect={aspect} | format={}",
        config.gemini.model, config.generation.image_format
    );

    let connection = components::telegram_connection(config);
    let pipeline = components::pipeline(config, &connection);
    let outcome = pipeline
        .run(&RunOptions {
            count: Some(n),
            aspect: Some(aspect),
            delay: delay_secs.map(Duration::from_secs),
            header: Some(header),
            no_send,
        })
        .await;
    connection.release().await;
    let outcome = outcome.context("smoke run failed")?;

    println!("prompt: {} chars", outcome.prompt.chars().count());
    for (idx, image) in outcome.images.iter().enumerate() {
        println!("image {}: {} bytes", idx + 1, image.len());
    }
    if let Some(report) = outcome.delivery {
        println!(
            "delivered {} image(s) and {} message(s)",
            report.image_count, report.chunk_count
        );
    }
    Ok(())
}

async fn prompt(config: &Config, offline: bool) -> Result<()> {
    if offline {
        println!("{}", PromptComposer::default().compose_random());
        return Ok(());
    }
    let text = components::synthesizer(config)
        .synthesize()
        .await
        .context("prompt synthesis failed")?;
    println!("{text}");
    Ok(())
}

async fn channel(config: &Config, command: ChannelCommands) -> Result<()> {
    match command {
        ChannelCommands::Login => login(config).await,
        ChannelCommands::Logout {
            remove_session,
            yes,
        } => logout(config, remove_session, yes).await,
        ChannelCommands::SendText { message } => {
            let connection = components::telegram_connection(config);
            let delivery = components::delivery(config, &connection)
                .context("telegram.target_chat_id is not set")?;
            let sent = delivery.send_text(&message).await;
            connection.release().await;
            let sent = sent.context("send-text failed")?;
            println!("sent {sent} message(s)");
            Ok(())
        }
    }
}

async fn login(config: &Config) -> Result<()> {
    let token = if let Some(token) = config
        .telegram
        .bot_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        token.to_string()
    } else {
        if !std::io::stdin().is_terminal() {
            bail!("set TELEGRAM_BOT_TOKEN to log in non-interactively");
        }
        Password::new()
            .with_prompt("Telegram bot token (input hidden)")
            .allow_empty_password(false)
            .interact()
            .context("Failed to read bot token from terminal")?
    };

    let client = Arc::new(components::telegram_client(config));
    let connection = ChannelConnection::with_client(client.clone());
    connection.login(&token).await.context("login failed")?;
    let me = client.whoami().await;
    connection.release().await;
    let me = me.context("bot identity check failed")?;

    println!(
        "Signed in as @{} (session saved to {})",
        me.username.as_deref().unwrap_or("unknown"),
        config.telegram_session_path().display()
    );
    Ok(())
}

async fn logout(config: &Config, remove: bool, yes: bool) -> Result<()> {
    let connection = components::telegram_connection(config);
    connection.release().await;

    let path = config.telegram_session_path();
    if !remove {
        println!("Disconnected. Session kept at {}", path.display());
        return Ok(());
    }

    if !yes {
        if !std::io::stdin().is_terminal() {
            bail!("pass --yes to remove the session non-interactively");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", path.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Session kept.");
            return Ok(());
        }
    }

    if remove_session(&path).await? {
        println!("Session removed: {}", path.display());
    } else {
        println!("No session file at {}", path.display());
    }
    Ok(())
}
