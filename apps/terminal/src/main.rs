mod config;
mod events;
mod input;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    link::{resume_link, token_from_input},
    spawn_controller, spawn_headline_refresh, ControllerEvent, GameCommand, HttpGameApi, Screen,
    Session, ViewState, DEFAULT_QUEUE_CAPACITY,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{apply_cli, load_settings, CliOverrides, DEFAULT_CONFIG_FILE},
    events::UiError,
    render::{hint, render_error, render_headline, render_view},
};

#[derive(Parser, Debug)]
#[command(name = "yolo_terminal", about = "Terminal client for the YOLO stock trading game")]
struct Args {
    /// Base url of the game server.
    #[arg(long)]
    server_url: Option<String>,
    /// Player name used for new games.
    #[arg(long)]
    name: Option<String>,
    /// Session token or resume link to continue a game.
    #[arg(long)]
    resume: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    headline_secs: Option<u64>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            server_url: self.server_url.clone(),
            player_name: self.name.clone(),
            request_timeout_secs: self.timeout_secs,
            headline_refresh_secs: self.headline_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    apply_cli(&mut settings, args.overrides());
    info!(server_url = %settings.server_url, "starting yolo terminal");

    let api = HttpGameApi::new(&settings.server_url, settings.request_timeout())
        .context("failed to set up game server client")?;
    let server_url = api.server_url().clone();
    let (handle, controller_task) = spawn_controller(Arc::new(api), DEFAULT_QUEUE_CAPACITY);
    let mut events = handle.subscribe_events();
    let refresh_task = spawn_headline_refresh(handle.clone(), settings.headline_period());

    let mut view = ViewState {
        screen: Screen::Welcome,
        session: Session::default(),
    };
    print!("{}", render_view(&view));

    if let Some(raw) = args.resume.as_deref() {
        match token_from_input(raw) {
            Some(token) => {
                if let Err(err) = handle.submit(GameCommand::Resume { token }) {
                    println!("{}", render_error(&UiError::from_client_error(&err)));
                }
            }
            None => warn!(input = raw, "ignoring unrecognized resume token"),
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    let _ = handle.submit(GameCommand::Shutdown);
                    break;
                };
                let Some(commands) = input::parse_line(&view.screen, &line, &settings.player_name) else {
                    println!("> {}", hint(&view.screen));
                    continue;
                };
                for command in commands {
                    if let Err(err) = handle.submit(command) {
                        println!("{}", render_error(&UiError::from_client_error(&err)));
                        break;
                    }
                }
            }
            event = events.recv() => match event {
                Ok(ControllerEvent::View(next)) => {
                    print!("{}", render_view(&next));
                    view = next;
                }
                Ok(ControllerEvent::Notice(text)) => println!("{text}"),
                Ok(ControllerEvent::SessionStarted { token }) => {
                    println!("Resume this game later with: {}", resume_link(&server_url, &token));
                }
                Ok(ControllerEvent::HeadlineUpdated(Some(headline))) => {
                    println!("{}", render_headline(&headline));
                }
                Ok(ControllerEvent::HeadlineUpdated(None)) => {}
                Ok(ControllerEvent::Failed(err)) => {
                    println!("{}", render_error(&UiError::from_client_error(&err)));
                }
                Ok(ControllerEvent::Stopped) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "terminal fell behind controller events");
                }
            }
        }
    }

    refresh_task.abort();
    controller_task
        .await
        .context("game controller task failed")?;
    info!("bye");
    Ok(())
}
