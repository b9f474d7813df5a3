//! Command implementations

use crate::app::{build_workflow, initialize_app, AppConfig};
use crate::cli::args::PositionArgs;
use crate::cli::display::{render_json, render_session};
use crate::config::{Config, PermissionPolicy};
use crate::error::{CepDistError, ErrorCode};
use crate::geo::Coordinate;
use crate::postal::{self, PostalCode};
use crate::providers::LineInput;
use crate::session::{ChannelObserver, Notification, Session, WorkflowEvent};
use crate::workflow::DistanceWorkflow;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Apply `--lat/--lon` and `--deny-location` on top of loaded configuration
fn apply_overrides(
    config: &mut Config,
    position: PositionArgs,
    deny_location: bool,
) -> crate::error::Result<()> {
    if deny_location {
        config.location.permission = PermissionPolicy::Denied;
    }
    if let (Some(lat), Some(lon)) = (position.lat, position.lon) {
        config.location.pin(Coordinate::new(lat, lon)?);
        config.location.permission = PermissionPolicy::Granted;
    }
    Ok(())
}

/// Build the workflow with a channel for collecting notifications
fn observed_workflow(
    config: &Config,
    input: LineInput,
) -> Result<(DistanceWorkflow, UnboundedReceiver<WorkflowEvent>)> {
    let (observer, events) = ChannelObserver::new();
    let workflow = build_workflow(config, input)?.with_observer(Arc::new(observer));
    Ok((workflow, events))
}

/// Notifications received so far, transitions are dropped
fn drain_notifications(events: &mut UnboundedReceiver<WorkflowEvent>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let WorkflowEvent::Notification(notification) = event {
            notifications.push(notification);
        }
    }
    notifications
}

fn print_outcome(session: &Session, notifications: &[Notification], json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(session, notifications)?);
    } else {
        for notification in notifications {
            eprintln!("warning: {}", notification.message);
        }
        print!("{}", render_session(session));
    }
    Ok(())
}

/// `cepdist distance`
pub async fn run_distance(
    app: AppConfig,
    cep: String,
    position: PositionArgs,
    deny_location: bool,
    json: bool,
) -> Result<()> {
    // Reject malformed input before touching configuration or the network
    let code = PostalCode::parse(&cep)?;

    let (_, mut config) = initialize_app(app).await?;
    apply_overrides(&mut config, position, deny_location)?;
    let (workflow, mut events) = observed_workflow(&config, LineInput::stdin())?;

    workflow.start().await;
    workflow.submit_postal_code(code.as_str()).await;

    let session = workflow.snapshot().await;
    let notifications = drain_notifications(&mut events);
    print_outcome(&session, &notifications, json)
}

/// `cepdist locate`
pub async fn run_locate(app: AppConfig, position: PositionArgs, json: bool) -> Result<()> {
    let (_, mut config) = initialize_app(app).await?;
    apply_overrides(&mut config, position, false)?;
    let (workflow, mut events) = observed_workflow(&config, LineInput::stdin())?;

    workflow.locate().await;

    let session = workflow.snapshot().await;
    let notifications = drain_notifications(&mut events);
    print_outcome(&session, &notifications, json)
}

/// `cepdist validate`
pub fn run_validate(cep: &str) -> Result<()> {
    if postal::is_valid(cep) {
        println!("valid");
        Ok(())
    } else {
        println!("invalid");
        Err(CepDistError::validation_with_code(
            ErrorCode::VALIDATION_POSTAL_CODE_FORMAT,
            format!("'{cep}' is not an 8-digit postal code"),
            Some("cep".to_string()),
        )
        .into())
    }
}

/// One line of interactive input
#[derive(Debug, PartialEq, Eq)]
enum InteractiveInput<'a> {
    Locate,
    Reset,
    Show,
    Quit,
    Empty,
    PostalCode(&'a str),
}

fn parse_interactive(line: &str) -> InteractiveInput<'_> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => InteractiveInput::Empty,
        "locate" => InteractiveInput::Locate,
        "clear" | "reset" => InteractiveInput::Reset,
        "show" => InteractiveInput::Show,
        "quit" | "exit" => InteractiveInput::Quit,
        _ => InteractiveInput::PostalCode(line),
    }
}

/// `cepdist interactive`
pub async fn run_interactive(app: AppConfig) -> Result<()> {
    let (_, config) = initialize_app(app).await?;
    let input = LineInput::stdin();
    let (workflow, mut events) = observed_workflow(&config, input.clone())?;

    eprintln!("Enter a CEP, or one of: locate, clear, show, quit");
    workflow.start().await;
    for notification in drain_notifications(&mut events) {
        eprintln!("warning: {}", notification.message);
    }
    print!("{}", render_session(&workflow.snapshot().await));

    while let Some(line) = input.next_line().await? {
        let input = parse_interactive(&line);
        debug!(?input, "Interactive input");
        match input {
            InteractiveInput::Empty => continue,
            InteractiveInput::Quit => break,
            InteractiveInput::Show => {}
            InteractiveInput::Locate => {
                workflow.locate().await;
            }
            InteractiveInput::Reset => {
                workflow.reset().await;
            }
            InteractiveInput::PostalCode(code) => {
                workflow.submit_postal_code(code).await;
            }
        }
        for notification in drain_notifications(&mut events) {
            eprintln!("warning: {}", notification.message);
        }
        print!("{}", render_session(&workflow.snapshot().await));
    }
    Ok(())
}
