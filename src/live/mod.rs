pub mod client;
pub mod commands;
pub mod protocol;
pub mod reconnect;
pub mod room;
pub mod view;

use crate::api::Role;
use crate::config::AppConfig;
use crate::error::Result;
use crate::session::SessionContext;
use crate::ui::{self, MessageSeverity};
use client::{CloseReason, Endpoint, LiveEvent, LiveHandle};
use commands::RoomCommand;
use reconnect::ReconnectPolicy;
use room::{RoomMode, RoomState};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Join a live room as the signed-in student and drive it from stdin until the
/// student quits or the room closes.
pub async fn run_room(config: &AppConfig, ctx: &SessionContext, room_id: &str) -> Result<()> {
    let user = ctx.require_role(&[Role::Student])?;
    let endpoint = Endpoint {
        ws_base: config.ws_url.clone(),
        room_id: room_id.to_string(),
        participant_id: user.id.clone(),
        token: ctx.token()?.to_string(),
    };

    ui::heading(&format!("Live room {}", room_id));
    println!("{}\n", view::help());

    let (handle, mut events) =
        client::spawn(endpoint, ReconnectPolicy::from_config(config.reconnect))?;
    let mut room = RoomState::new(user.id.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if !apply_event(&mut room, event) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match RoomCommand::parse(&line) {
                    Some(RoomCommand::Quit) => break,
                    Some(command) => handle_command(&mut room, &handle, command).await,
                    None if line.trim().is_empty() => {}
                    None => ui::toast(
                        MessageSeverity::Info,
                        format!("Unknown command '{}'. Type ? for help.", line.trim()),
                    ),
                }
            }
        }
    }

    handle.shutdown().await;
    tracing::debug!(room = %room_id, "Left live room");
    Ok(())
}

/// Returns `false` once the room reached its terminal state.
fn apply_event(room: &mut RoomState, event: LiveEvent) -> bool {
    if let Some(line) = view::status_line(&event) {
        eprintln!("{}", line);
    }

    match event {
        LiveEvent::Connecting { .. } | LiveEvent::Disconnected { .. } => {
            if room.mode() != RoomMode::Connecting {
                room.on_connecting();
                redraw(room);
            }
        }
        LiveEvent::Connected => {
            room.on_open();
            redraw(room);
        }
        LiveEvent::Activity(activity) => {
            room.on_push(activity);
            redraw(room);
        }
        LiveEvent::Reconnecting { .. } => {}
        LiveEvent::Closed(reason) => {
            room.on_closed();
            if reason == CloseReason::Clean {
                redraw(room);
            }
            return false;
        }
    }
    true
}

async fn handle_command(room: &mut RoomState, handle: &LiveHandle, command: RoomCommand) {
    let outbound = match command {
        RoomCommand::Answer(index) => {
            let already = room.submitted();
            let outbound = room.submit(index);
            if outbound.is_none() {
                let reason = if !room.mode().is_connected() {
                    "Not connected to the room.".to_string()
                } else if already {
                    "You already answered this one.".to_string()
                } else if room.activity().map_or(true, |a| a.options().is_empty()) {
                    "Nothing to answer right now.".to_string()
                } else {
                    format!("There is no option {}.", index + 1)
                };
                ui::toast(MessageSeverity::Warning, reason);
            }
            outbound
        }
        RoomCommand::RaiseHand => {
            let outbound = room.raise_hand();
            if outbound.is_none() {
                ui::toast(MessageSeverity::Warning, "Not connected to the room.");
            }
            outbound
        }
        RoomCommand::Help => {
            println!("{}", view::help());
            None
        }
        RoomCommand::Quit => None,
    };

    if let Some(outbound) = outbound {
        match handle.send(outbound).await {
            Ok(()) => redraw(room),
            Err(e) => ui::toast(MessageSeverity::Error, e.to_string()),
        }
    }
}

fn redraw(room: &RoomState) {
    println!("\n{}", view::render(room));
}
