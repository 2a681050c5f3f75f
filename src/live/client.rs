//! Live classroom socket client: one spawned task owns the connection and
//! applies the reconnect policy; the owner talks to it through channels.

use super::protocol::{parse_inbound, Activity, Outbound, ParseOutcome};
use super::reconnect::ReconnectPolicy;
use crate::error::{LiveroomError, Result};
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Where to connect: room and participant identity plus the bearer credential.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub ws_base: String,
    pub room_id: String,
    pub participant_id: String,
    pub token: String,
}

impl Endpoint {
    /// `{ws_base}/ws/{room}/{participant}?token=...`, each part percent-encoded.
    pub fn url(&self) -> Result<Url> {
        self.build(&self.token)
    }

    /// Same as [`Endpoint::url`] with the credential masked, for logs.
    fn redacted_url(&self) -> String {
        self.build("***")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.ws_base.clone())
    }

    fn build(&self, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.ws_base).map_err(|e| {
            LiveroomError::Config(format!("Invalid socket URL '{}': {}", self.ws_base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                LiveroomError::Config(format!("Socket URL '{}' cannot carry a path", self.ws_base))
            })?
            .pop_if_empty()
            .extend(["ws", self.room_id.as_str(), self.participant_id.as_str()]);
        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The server closed the room on purpose
    Clean,
    RetriesExhausted { attempts: u32 },
}

/// Notifications delivered to the owner of a [`LiveHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Connecting { attempt: u32 },
    Connected,
    Activity(Activity),
    Disconnected { reason: String },
    Reconnecting { attempt: u32, max_attempts: u32, delay: Duration },
    Closed(CloseReason),
}

/// How one connected session ended.
enum Disconnect {
    Clean,
    Unclean(String),
    Cancelled,
}

/// Owner-side handle. Dropping it cancels the connection task.
pub struct LiveHandle {
    commands: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveHandle {
    pub async fn send(&self, outbound: Outbound) -> Result<()> {
        self.commands
            .send(outbound)
            .await
            .map_err(|_| LiveroomError::NetworkError("Live connection is closed".to_string()))
    }

    /// Cancel any pending reconnect, detach the event channel, close the socket
    /// and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Live connection task ended abnormally");
            }
        }
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Open the live connection in a background task. Fails only if the endpoint
/// does not form a valid URL.
pub fn spawn(
    endpoint: Endpoint,
    policy: ReconnectPolicy,
) -> Result<(LiveHandle, mpsc::Receiver<LiveEvent>)> {
    let url = endpoint.url()?.to_string();
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = policy.token();

    let task = tokio::spawn(run(endpoint, url, policy, command_rx, event_tx));

    Ok((
        LiveHandle {
            commands: command_tx,
            cancel,
            task: Some(task),
        },
        event_rx,
    ))
}

async fn run(
    endpoint: Endpoint,
    url: String,
    mut policy: ReconnectPolicy,
    mut commands: mpsc::Receiver<Outbound>,
    event_tx: mpsc::Sender<LiveEvent>,
) {
    let cancel = policy.token();
    let mut events = Some(event_tx);

    loop {
        emit(
            &events,
            LiveEvent::Connecting {
                attempt: policy.attempts(),
            },
        )
        .await;
        tracing::debug!(url = %endpoint.redacted_url(), attempt = policy.attempts(), "Connecting");

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(url.as_str()) => result,
        };

        let reason = match connected {
            Ok((ws, _)) => {
                policy.reset();
                discard_stale(&mut commands);
                tracing::info!(room = %endpoint.room_id, "Live connection open");
                emit(&events, LiveEvent::Connected).await;

                match pump(ws, &mut commands, &mut events, &cancel).await {
                    Disconnect::Clean => {
                        tracing::info!(room = %endpoint.room_id, "Room closed by server");
                        emit(&events, LiveEvent::Closed(CloseReason::Clean)).await;
                        return;
                    }
                    Disconnect::Cancelled => break,
                    Disconnect::Unclean(reason) => reason,
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(room = %endpoint.room_id, reason = %reason, "Live connection lost");
        emit(&events, LiveEvent::Disconnected { reason }).await;

        let Some(attempt) = policy.next_attempt() else {
            if policy.is_cancelled() {
                break;
            }
            tracing::warn!(attempts = policy.attempts(), "Giving up on live connection");
            emit(
                &events,
                LiveEvent::Closed(CloseReason::RetriesExhausted {
                    attempts: policy.attempts(),
                }),
            )
            .await;
            return;
        };

        emit(
            &events,
            LiveEvent::Reconnecting {
                attempt,
                max_attempts: policy.max_attempts(),
                delay: policy.delay(),
            },
        )
        .await;
        if !policy.wait().await {
            break;
        }
    }

    tracing::debug!(room = %endpoint.room_id, "Live connection cancelled");
}

/// Relay frames in both directions until the connection ends.
async fn pump(
    ws: WsStream,
    commands: &mut mpsc::Receiver<Outbound>,
    events: &mut Option<mpsc::Sender<LiveEvent>>,
    cancel: &CancellationToken,
) -> Disconnect {
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // Detach before closing so nothing reaches an owner that let go.
                events.take();
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "client left".into(),
                };
                if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                    tracing::debug!(error = %e, "Close frame not delivered");
                }
                return Disconnect::Cancelled;
            }
            outbound = commands.recv() => {
                let Some(outbound) = outbound else {
                    cancel.cancel();
                    continue;
                };
                let json = match outbound.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize outbound frame");
                        continue;
                    }
                };
                tracing::debug!(frame = %json, "Sending");
                if let Err(e) = sink.send(Message::text(json)).await {
                    return Disconnect::Unclean(format!("send failed: {}", e));
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => match parse_inbound(text.as_str()) {
                    Ok(ParseOutcome::Activity(activity)) => {
                        emit(events, LiveEvent::Activity(activity)).await;
                    }
                    Ok(ParseOutcome::Ignored(kind)) => {
                        tracing::debug!(kind = %kind, "Ignoring unhandled frame type");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, frame = %text.as_str(), "Malformed frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    return if is_clean_close(frame.as_ref()) {
                        Disconnect::Clean
                    } else {
                        Disconnect::Unclean(match frame {
                            Some(f) => format!("closed with code {}: {}", u16::from(f.code), f.reason.as_str()),
                            None => "closed".to_string(),
                        })
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Disconnect::Unclean(e.to_string()),
                None => return Disconnect::Unclean("connection dropped".to_string()),
            },
        }
    }
}

/// Drop responses queued while no connection was open. They answered an
/// activity the new connection never pushed.
fn discard_stale(commands: &mut mpsc::Receiver<Outbound>) {
    let mut dropped = 0usize;
    while commands.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        tracing::warn!(dropped, "Discarded responses queued while disconnected");
    }
}

/// Normal and going-away codes, or a close without a status, are intentional.
fn is_clean_close(frame: Option<&CloseFrame>) -> bool {
    match frame {
        None => true,
        Some(f) => matches!(f.code, CloseCode::Normal | CloseCode::Away),
    }
}

async fn emit(events: &Option<mpsc::Sender<LiveEvent>>, event: LiveEvent) {
    if let Some(tx) = events {
        if tx.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}
