//! Async TCP transport between the controller and its agents (C2).
//!
//! One `TcpListener` accepts connections; each accepted socket gets its
//! own long-lived task that owns the receive accumulator and a bounded
//! outbound queue. Inbound events (`Connected`, `Received`,
//! `Disconnected`) flow back to [`NetworkInterface::poll`] over an
//! internal channel -- the scheduler thread calls `poll` once per tick
//! and never touches a socket directly.
//!
//! Connection disposal is eager: a zero-length read, a read error, or a
//! write error all end the connection's task immediately and emit
//! `Disconnected`. Anything left in the outbound queue at that point is
//! simply dropped with the channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ranctl_codec::{decode, encode, DecodeOutcome};
use ranctl_types::{AgentId, ControlMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Failure modes surfaced by the transport.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Failed to bind the listening socket.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
    /// The named agent's outbound queue is full; the message was dropped.
    #[error("send queue full for agent {0}")]
    Backpressure(AgentId),
    /// No connection is registered for the named agent (already closed,
    /// or never existed).
    #[error("no connection for agent {0}")]
    UnknownAgent(AgentId),
}

/// One event surfaced to the scheduler thread by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    /// A new agent connection was accepted.
    Connected(AgentId),
    /// A complete, well-formed message arrived from an agent.
    Received(AgentId, ControlMessage),
    /// An agent's connection ended; `reason` is a human-readable cause.
    Disconnected(AgentId, String),
}

enum InternalEvent {
    Connected { agent_id: AgentId, outbound: mpsc::Sender<ControlMessage> },
    Received(AgentId, ControlMessage),
    Disconnected(AgentId, String),
}

/// Owns the listening socket and the per-agent connection tasks.
///
/// Dropping the interface aborts the accept loop and every connection
/// task, closing all sockets.
pub struct NetworkInterface {
    accept_task: JoinHandle<()>,
    local_addr: std::net::SocketAddr,
    events_rx: mpsc::UnboundedReceiver<InternalEvent>,
    agents: HashMap<AgentId, mpsc::Sender<ControlMessage>>,
    send_queue_capacity: usize,
}

impl NetworkInterface {
    /// Bind a listener on `addr` and start accepting agent connections.
    /// Each accepted connection's outbound queue holds up to
    /// `send_queue_capacity` messages before `send` reports backpressure.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: &str, send_queue_capacity: usize) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr).await.map_err(NetworkError::Bind)?;
        let local_addr = listener.local_addr().map_err(NetworkError::Bind)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let next_agent_id = Arc::new(AtomicU32::new(1));
        let accept_task =
            tokio::spawn(accept_loop(listener, events_tx, next_agent_id, send_queue_capacity));
        Ok(Self { accept_task, local_addr, events_rx, agents: HashMap::new(), send_queue_capacity })
    }

    /// The address actually bound (useful when `addr` requested an
    /// ephemeral port).
    pub const fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Drain events that arrived since the last call, waiting up to
    /// `timeout` for at least one if none are immediately available.
    pub async fn poll(&mut self, timeout: Duration) -> Vec<NetworkEvent> {
        let mut out = Vec::new();
        match tokio::time::timeout(timeout, self.events_rx.recv()).await {
            Ok(Some(event)) => out.push(self.absorb(event)),
            Ok(None) | Err(_) => return out,
        }
        while let Ok(event) = self.events_rx.try_recv() {
            out.push(self.absorb(event));
        }
        out
    }

    fn absorb(&mut self, event: InternalEvent) -> NetworkEvent {
        match event {
            InternalEvent::Connected { agent_id, outbound } => {
                self.agents.insert(agent_id, outbound);
                NetworkEvent::Connected(agent_id)
            }
            InternalEvent::Received(agent_id, msg) => NetworkEvent::Received(agent_id, msg),
            InternalEvent::Disconnected(agent_id, reason) => {
                self.agents.remove(&agent_id);
                NetworkEvent::Disconnected(agent_id, reason)
            }
        }
    }

    /// Enqueue `msg` for delivery to `agent_id`. Non-blocking: fails
    /// immediately rather than waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownAgent`] if no connection is
    /// registered for `agent_id`, or [`NetworkError::Backpressure`] if
    /// its outbound queue is full.
    pub fn send(&self, agent_id: AgentId, msg: ControlMessage) -> Result<(), NetworkError> {
        let sender = self.agents.get(&agent_id).ok_or(NetworkError::UnknownAgent(agent_id))?;
        sender.try_send(msg).map_err(|_| NetworkError::Backpressure(agent_id))
    }

    /// Whether any connection is currently registered for `agent_id`.
    pub fn is_connected(&self, agent_id: AgentId) -> bool {
        self.agents.contains_key(&agent_id)
    }

    /// Drop the outbound sender for `agent_id`, if any. The connection
    /// task notices on its next `outbound_rx.recv()` and winds itself
    /// down, eventually surfacing a `Disconnected` event; this does not
    /// force the socket closed immediately.
    pub fn disconnect(&mut self, agent_id: AgentId) {
        self.agents.remove(&agent_id);
    }

    /// Configured outbound queue capacity per connection.
    pub const fn send_queue_capacity(&self) -> usize {
        self.send_queue_capacity
    }
}

impl Drop for NetworkInterface {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    events_tx: mpsc::UnboundedSender<InternalEvent>,
    next_agent_id: Arc<AtomicU32>,
    send_queue_capacity: usize,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed, retrying");
                continue;
            }
        };
        let agent_id = AgentId(next_agent_id.fetch_add(1, Ordering::Relaxed));
        let (outbound_tx, outbound_rx) = mpsc::channel(send_queue_capacity);
        if events_tx
            .send(InternalEvent::Connected { agent_id, outbound: outbound_tx })
            .is_err()
        {
            // Interface was dropped; stop accepting new work.
            return;
        }
        tracing::info!(%agent_id, %peer, "agent connected");
        tokio::spawn(connection_task(agent_id, socket, outbound_rx, events_tx.clone()));
    }
}

async fn connection_task(
    agent_id: AgentId,
    mut socket: TcpStream,
    mut outbound_rx: mpsc::Receiver<ControlMessage>,
    events_tx: mpsc::UnboundedSender<InternalEvent>,
) {
    let mut recv_buf: Vec<u8> = Vec::new();
    let mut read_chunk = [0u8; 4096];
    let reason = loop {
        tokio::select! {
            read_result = socket.read(&mut read_chunk) => {
                match read_result {
                    Ok(0) => break "connection closed by peer".to_owned(),
                    Ok(n) => {
                        recv_buf.extend_from_slice(read_chunk.get(..n).unwrap_or(&[]));
                        if let Some(reason) = drain_frames(agent_id, &mut recv_buf, &events_tx) {
                            break reason;
                        }
                    }
                    Err(e) => break format!("read error: {e}"),
                }
            }
            outbound = outbound_rx.recv() => {
                let Some(msg) = outbound else {
                    break "outbound queue closed".to_owned();
                };
                let frame = match encode(&msg) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(%agent_id, error = %e, "dropping message that failed to encode");
                        continue;
                    }
                };
                if let Err(e) = socket.write_all(&frame).await {
                    break format!("write error: {e}");
                }
            }
        }
    };
    let _ = events_tx.send(InternalEvent::Disconnected(agent_id, reason));
}

/// Decode as many complete frames as `buf` holds, forwarding each as a
/// `Received` event and draining it from `buf`. Returns `Some(reason)`
/// if a malformed frame was found (the caller must end the connection).
fn drain_frames(
    agent_id: AgentId,
    buf: &mut Vec<u8>,
    events_tx: &mpsc::UnboundedSender<InternalEvent>,
) -> Option<String> {
    loop {
        match decode(buf) {
            DecodeOutcome::Message { message, consumed } => {
                buf.drain(..consumed);
                if events_tx.send(InternalEvent::Received(agent_id, message)).is_err() {
                    return Some("interface dropped".to_owned());
                }
            }
            DecodeOutcome::NeedMore => return None,
            DecodeOutcome::Malformed(reason) => {
                return Some(format!("malformed frame: {reason}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ranctl_types::ControlMessage;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::{NetworkEvent, NetworkInterface};

    #[tokio::test]
    async fn connect_send_and_receive_roundtrip() {
        let Ok(mut iface) = NetworkInterface::bind("127.0.0.1:0", 8).await else {
            return assert!(false, "bind failed");
        };
        let addr = iface.local_addr();
        let mut client = match TcpStream::connect(addr).await {
            Ok(c) => c,
            Err(e) => return assert!(false, "client connect failed: {e}"),
        };

        let events = iface.poll(Duration::from_millis(200)).await;
        let Some(NetworkEvent::Connected(agent_id)) = events.first().cloned() else {
            return assert!(false, "expected Connected event, got {events:?}");
        };

        let outbound = ranctl_codec::encode(&ControlMessage::HelloRequest).unwrap_or_default();
        if client.write_all(&outbound).await.is_err() {
            return assert!(false, "client write failed");
        }

        let events = iface.poll(Duration::from_millis(200)).await;
        let Some(NetworkEvent::Received(got_agent, ControlMessage::HelloRequest)) =
            events.into_iter().next()
        else {
            return assert!(false, "expected Received(HelloRequest)");
        };
        assert_eq!(got_agent, agent_id);

        let reply = iface.send(agent_id, ControlMessage::EchoReply { token: 9 });
        assert!(reply.is_ok());
        let mut header = [0u8; 4];
        if client.read_exact(&mut header).await.is_err() {
            return assert!(false, "client failed to read length prefix");
        }
        let len = u32::from_be_bytes(header) as usize;
        let mut body = vec![0u8; len];
        if client.read_exact(&mut body).await.is_err() {
            return assert!(false, "client failed to read payload");
        }
        let decoded: Result<ControlMessage, _> = serde_json::from_slice(&body);
        assert_eq!(decoded.unwrap_or(ControlMessage::HelloRequest), ControlMessage::EchoReply { token: 9 });
    }
}
