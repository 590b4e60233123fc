//! Streaming transport
//!
//! Holds one WebSocket open to `/ws?deploymentId={id}` and decodes the status
//! frames the server pushes. Any received frame rearms the inactivity deadline,
//! and pongs answering our liveness pings count as received frames.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use backend_im_openapi::DeploymentUpdate;
use futures::{SinkExt, StreamExt};
use http::header::{HeaderValue, AUTHORIZATION, USER_AGENT};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::authn::token::Token;
use crate::deploy::observation::StatusObservation;
use crate::errors::WatchError;
use crate::transport::{Cancellation, ObservationSource};
use crate::utils::user_agent;

/// Streaming options
#[derive(Debug, Clone)]
pub struct Options {
    /// Longest silence tolerated between frames
    pub idle_timeout: Duration,

    /// Interval between liveness pings. Zero disables pings.
    pub ping_interval: Duration,

    /// Limit on the opening handshake
    pub handshake_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

/// Build the stream endpoint from the API base URL.
///
/// `http` becomes `ws`, `https` becomes `wss`; a base without a scheme is
/// treated as `ws://`.
pub fn build_stream_url(api_base_url: &str, deployment_id: &str) -> Result<Url, WatchError> {
    let base = api_base_url.trim_end_matches('/');
    let base = if base.contains("://") {
        base.to_string()
    } else {
        format!("ws://{}", base)
    };

    let mut url = Url::parse(&base)
        .map_err(|e| WatchError::Transport(format!("Invalid API URL {}: {}", api_base_url, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(WatchError::Transport(format!(
                "Unsupported API URL scheme: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| WatchError::Transport("Failed to set WebSocket scheme".to_string()))?;

    url.set_path(&format!("{}/ws", url.path().trim_end_matches('/')));
    url.query_pairs_mut()
        .clear()
        .append_pair("deploymentId", deployment_id);

    Ok(url)
}

/// Open the deployment stream
pub async fn connect(
    url: &Url,
    token: &Token,
    deployment_id: &str,
    options: Options,
    cancel: Cancellation,
) -> Result<StreamingSource<MaybeTlsStream<TcpStream>>, WatchError> {
    let mut request = url.as_str().into_client_request()?;
    let authorization = HeaderValue::from_str(&token.authorization())
        .map_err(|e| WatchError::Transport(format!("Invalid access token: {}", e)))?;
    request.headers_mut().insert(AUTHORIZATION, authorization);
    if let Ok(agent) = HeaderValue::from_str(&user_agent()) {
        request.headers_mut().insert(USER_AGENT, agent);
    }

    info!("Connecting to {}", url);
    let handshake = tokio::time::timeout(options.handshake_timeout, connect_async(request));
    let Some(handshake) = cancel.guard(handshake).await else {
        info!("Deployment stream cancelled before the handshake finished");
        return Err(WatchError::Cancelled);
    };
    let (ws, _response) = handshake
        .map_err(|_| WatchError::Timeout {
            elapsed: options.handshake_timeout,
            context: format!("the WebSocket handshake with {}", url),
        })?
        .map_err(|e| WatchError::Transport(format!("Failed to connect to {}: {}", url, e)))?;

    Ok(StreamingSource::new(ws, deployment_id, options, cancel))
}

enum Wakeup {
    Cancelled,
    IdleTimeout,
    Ping,
    Frame(Option<Result<Message, WsError>>),
}

/// Observation source backed by a WebSocket session
pub struct StreamingSource<S> {
    ws: WebSocketStream<S>,
    deployment_id: String,
    options: Options,
    cancel: Cancellation,
    deadline: Instant,
    ping: Option<Interval>,
    pending: VecDeque<StatusObservation>,
    closed: bool,
    finished: bool,
}

impl<S> StreamingSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established WebSocket session
    pub fn new(
        ws: WebSocketStream<S>,
        deployment_id: impl Into<String>,
        options: Options,
        cancel: Cancellation,
    ) -> Self {
        let ping = (!options.ping_interval.is_zero()).then(|| {
            let mut interval = tokio::time::interval_at(
                Instant::now() + options.ping_interval,
                options.ping_interval,
            );
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        Self {
            ws,
            deployment_id: deployment_id.into(),
            deadline: Instant::now() + options.idle_timeout,
            options,
            cancel,
            ping,
            pending: VecDeque::new(),
            closed: false,
            finished: false,
        }
    }

    /// Decode one text payload. A payload may carry several newline-separated
    /// frames.
    fn decode_frames(&mut self, payload: &str) -> Result<(), WatchError> {
        for line in payload.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let update: DeploymentUpdate = serde_json::from_str(line)?;
            if update.deployment_id != self.deployment_id {
                warn!(
                    "Ignoring update for deployment {} on stream for {}",
                    update.deployment_id, self.deployment_id
                );
                continue;
            }
            self.pending.push_back(update.into());
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.finished = true;
        self.pending.clear();
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.ws.close(None).await {
                debug!("WebSocket close failed: {}", e);
            }
        }
    }

    /// Flush the close reply to a server-initiated close
    async fn acknowledge_close(&mut self) {
        self.finished = true;
        self.closed = true;
        match self.ws.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => {}
            Err(e) => debug!("Failed to acknowledge close: {}", e),
        }
    }

    async fn fail(&mut self, error: WatchError) -> Option<Result<StatusObservation, WatchError>> {
        self.shutdown().await;
        Some(Err(error))
    }
}

async fn next_ping(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => futures::future::pending::<()>().await,
    }
}

fn is_graceful_close(code: CloseCode) -> bool {
    matches!(code, CloseCode::Normal | CloseCode::Away)
}

#[async_trait]
impl<S> ObservationSource for StreamingSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next(&mut self) -> Option<Result<StatusObservation, WatchError>> {
        loop {
            if let Some(observation) = self.pending.pop_front() {
                if observation.stage.is_terminal() {
                    self.shutdown().await;
                }
                return Some(Ok(observation));
            }
            if self.finished {
                return None;
            }
            if self.cancel.is_cancelled() {
                info!("Deployment stream cancelled");
                self.shutdown().await;
                return None;
            }

            let wakeup = tokio::select! {
                _ = self.cancel.cancelled() => Wakeup::Cancelled,
                _ = tokio::time::sleep_until(self.deadline) => Wakeup::IdleTimeout,
                _ = next_ping(&mut self.ping) => Wakeup::Ping,
                frame = self.ws.next() => Wakeup::Frame(frame),
            };

            match wakeup {
                Wakeup::Cancelled => {
                    info!("Deployment stream cancelled");
                    self.shutdown().await;
                    return None;
                }
                Wakeup::IdleTimeout => {
                    warn!("No deployment updates for {:?}", self.options.idle_timeout);
                    return self
                        .fail(WatchError::Timeout {
                            elapsed: self.options.idle_timeout,
                            context: "deployment updates - connection may be stale".to_string(),
                        })
                        .await;
                }
                Wakeup::Ping => {
                    debug!("Sending liveness ping");
                    if let Err(e) = self.ws.send(Message::Ping(Default::default())).await {
                        return self.fail(e.into()).await;
                    }
                }
                Wakeup::Frame(None) => {
                    debug!("Deployment stream ended");
                    self.acknowledge_close().await;
                    return None;
                }
                Wakeup::Frame(Some(Ok(message))) => {
                    self.deadline = Instant::now() + self.options.idle_timeout;
                    match message {
                        Message::Text(text) => {
                            if let Err(e) = self.decode_frames(text.as_str()) {
                                return self.fail(e).await;
                            }
                        }
                        Message::Binary(data) => {
                            let decoded = std::str::from_utf8(&data)
                                .map_err(|e| WatchError::Decode(e.to_string()))
                                .and_then(|text| self.decode_frames(text));
                            if let Err(e) = decoded {
                                return self.fail(e).await;
                            }
                        }
                        Message::Close(frame) => {
                            self.acknowledge_close().await;
                            match frame {
                                Some(frame) if !is_graceful_close(frame.code) => {
                                    return Some(Err(WatchError::Closed {
                                        code: u16::from(frame.code),
                                        reason: frame.reason.as_str().to_string(),
                                    }));
                                }
                                _ => {
                                    debug!("Server closed the deployment stream");
                                    return None;
                                }
                            }
                        }
                        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                    }
                }
                Wakeup::Frame(Some(Err(e))) => {
                    self.closed = true;
                    self.finished = true;
                    return match e {
                        WsError::ConnectionClosed
                        | WsError::AlreadyClosed
                        | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
                            debug!("Deployment stream ended without a close frame");
                            None
                        }
                        other => Some(Err(other.into())),
                    };
                }
            }
        }
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}
