//! Network service: one TCP/TLS connection shared by many in-flight
//! requests.
//!
//! Two tasks own the socket. The writer task drains a bounded channel
//! of pre-encoded frames and writes them whole, so submissions never
//! interleave bytes on the wire and a stalled socket backpressures
//! submitters through the channel. The reader task is the only owner of
//! the read side: it decodes frames, completes the handshake, and
//! correlates responses to pending entries by `ack_sequence`.
//!
//! Sequence assignment and pending insertion happen under one mutex
//! before the frame reaches the channel, so the reader can never
//! observe a response without a matching pending entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use bytes::Bytes;
use prost::Message as _;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use crate::auth::{compute_hmac, verify_hmac};
use crate::callback::{MessageHandler, ResponseKind};
use crate::error::{KineticError, Result};
use crate::frame::{read_frame, Frame, FrameHeader, FrameLimits, FRAME_HEADER_SIZE};
use crate::options::ClientOptions;
use crate::proto;
use crate::transport;
use crate::types::{Status, StatusCode};

/// Outbound frames queued toward the writer task. Small on purpose:
/// once the socket stalls, submitters should feel it.
const WRITE_QUEUE_DEPTH: usize = 64;

/// Frames coalesced into one flush when the queue is busy.
const MAX_WRITE_BATCH: usize = 16;

/// Envelope authentication selected at submit time.
pub(crate) enum AuthKind {
    Hmac,
    Pin(Vec<u8>),
}

/// One command on its way to the device.
pub(crate) struct SubmitRequest {
    pub auth: AuthKind,
    pub command: proto::Command,
    pub value: Bytes,
    pub kind: ResponseKind,
    pub handler: MessageHandler,
}

struct PendingEntry {
    kind: ResponseKind,
    handler: MessageHandler,
    submitted_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Connected, waiting for the device's unsolicited status.
    Handshaking,
    Ready,
    Closed,
}

struct Session {
    state: SessionState,
    sequence: u64,
    connection_id: i64,
    cluster_version: i64,
    pending: HashMap<u64, PendingEntry>,
    /// Submissions accepted before the handshake completed.
    backlog: Vec<SubmitRequest>,
}

/// A staged frame: header plus the two byte regions following it.
struct OutboundFrame {
    header: [u8; FRAME_HEADER_SIZE],
    message: Bytes,
    value: Bytes,
}

/// Handle to one connection's shared state and tasks. Clones share the
/// same connection.
#[derive(Clone)]
pub(crate) struct NetworkService {
    shared: Arc<Shared>,
}

struct Shared {
    identity: i64,
    hmac_key: Vec<u8>,
    limits: FrameLimits,
    session: Mutex<Session>,
    frames: mpsc::Sender<OutboundFrame>,
    shutdown: watch::Sender<bool>,
}

impl NetworkService {
    /// Open the socket and start the writer and reader tasks. The
    /// session starts in `Handshaking`; submissions are accepted
    /// immediately and flushed once the device introduces itself.
    pub(crate) async fn connect(options: &ClientOptions) -> Result<Self> {
        let stream = transport::connect(options).await?;
        Ok(Self::spawn(stream, options))
    }

    /// Start the service over an already-established stream.
    pub(crate) fn spawn<S>(stream: S, options: &ClientOptions) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (frames_tx, frames_rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            identity: options.user,
            hmac_key: options.hmac_key.clone(),
            limits: FrameLimits::default(),
            session: Mutex::new(Session {
                state: SessionState::Handshaking,
                sequence: 0,
                connection_id: 0,
                cluster_version: options.cluster_version,
                pending: HashMap::new(),
                backlog: Vec::new(),
            }),
            frames: frames_tx,
            shutdown: shutdown_tx,
        });

        tokio::spawn(write_loop(
            writer,
            frames_rx,
            shutdown_rx.clone(),
            shared.clone(),
        ));
        tokio::spawn(read_loop(reader, shutdown_rx, shared.clone()));

        NetworkService { shared }
    }

    /// Submit one command. In `Ready` the sequence is assigned, the
    /// command signed and framed, and the pending entry installed
    /// before the frame is handed to the writer. In `Handshaking` the
    /// request joins the backlog. In `Closed` the handler fails with
    /// `ClientShutdown` and the same error is returned.
    pub(crate) async fn submit(&self, request: SubmitRequest) -> Result<()> {
        let frame = {
            let mut session = self.shared.lock_session();
            match session.state {
                SessionState::Closed => {
                    drop(session);
                    request.handler.invoke(Err(Status::new(
                        StatusCode::ClientShutdown,
                        "connection closed",
                    )));
                    return Err(KineticError::ClientShutdown);
                }
                SessionState::Handshaking => {
                    debug!("handshake in progress, queueing submission");
                    session.backlog.push(request);
                    return Ok(());
                }
                SessionState::Ready => self.shared.stage(&mut session, request),
            }
        };
        self.shared.send_frame(frame).await
    }

    /// Overwrite the cluster version used on subsequent submissions.
    /// Local only; the device is not contacted.
    pub(crate) fn set_client_cluster_version(&self, version: i64) {
        self.shared.lock_session().cluster_version = version;
    }

    /// Shut the connection down, failing every pending entry and
    /// queued submission with `ClientShutdown`.
    pub(crate) fn close(&self) {
        self.shared
            .fail_all(StatusCode::ClientShutdown, "connection closed");
    }
}

impl Shared {
    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("session mutex poisoned")
    }

    /// Assign the next sequence, stamp the header, sign, frame, and
    /// install the pending entry. Caller holds the session lock.
    fn stage(&self, session: &mut Session, request: SubmitRequest) -> OutboundFrame {
        session.sequence += 1;
        let seq = session.sequence;

        let mut command = request.command;
        let header = command.header.get_or_insert_with(Default::default);
        header.sequence = Some(seq);
        header.cluster_version = Some(session.cluster_version);
        header.connection_id = Some(session.connection_id);
        let command_bytes = command.encode_to_vec();

        let message = match request.auth {
            AuthKind::Hmac => proto::Message {
                auth_type: Some(proto::AuthType::HmacAuth as i32),
                hmac_auth: Some(proto::HmacAuth {
                    identity: Some(self.identity),
                    hmac: Some(compute_hmac(&self.hmac_key, &command_bytes).to_vec()),
                }),
                pin_auth: None,
                command_bytes: Some(command_bytes),
            },
            AuthKind::Pin(pin) => proto::Message {
                auth_type: Some(proto::AuthType::PinAuth as i32),
                hmac_auth: None,
                pin_auth: Some(proto::PinAuth { pin: Some(pin) }),
                command_bytes: Some(command_bytes),
            },
        };
        let message_bytes = message.encode_to_vec();

        session.pending.insert(
            seq,
            PendingEntry {
                kind: request.kind,
                handler: request.handler,
                submitted_at: Instant::now(),
            },
        );

        OutboundFrame {
            header: FrameHeader::new(message_bytes.len() as u32, request.value.len() as u32)
                .encode(),
            message: Bytes::from(message_bytes),
            value: request.value,
        }
    }

    async fn send_frame(&self, frame: OutboundFrame) -> Result<()> {
        // A dead writer means the connection is gone; the pending entry
        // has been (or is being) drained by fail_all.
        self.frames
            .send(frame)
            .await
            .map_err(|_| KineticError::ClientShutdown)
    }

    /// Transition to `Closed` and fail everything outstanding. Safe to
    /// call repeatedly; later calls find nothing to drain.
    fn fail_all(&self, code: StatusCode, reason: &str) {
        let (pending, backlog) = {
            let mut session = self.lock_session();
            session.state = SessionState::Closed;
            (
                std::mem::take(&mut session.pending),
                std::mem::take(&mut session.backlog),
            )
        };
        let _ = self.shutdown.send(true);

        if !pending.is_empty() || !backlog.is_empty() {
            warn!(
                pending = pending.len(),
                queued = backlog.len(),
                code = ?code,
                "failing outstanding requests"
            );
        }
        let status = Status::new(code, reason);
        for (_, entry) in pending {
            entry.handler.invoke(Err(status.clone()));
        }
        for request in backlog {
            request.handler.invoke(Err(status.clone()));
        }
    }

    /// Handle one inbound frame. Returns staged backlog frames when the
    /// handshake just completed. A returned error is fatal to the
    /// connection.
    fn process_frame(&self, frame: Frame) -> Result<Vec<OutboundFrame>> {
        let message = proto::Message::decode(frame.message.as_ref())?;
        match message.auth_type() {
            proto::AuthType::UnsolicitedStatus => {
                let command_bytes = message.command_bytes.unwrap_or_default();
                let command = proto::Command::decode(command_bytes.as_slice())?;
                Ok(self.complete_handshake(&command))
            }
            proto::AuthType::HmacAuth | proto::AuthType::PinAuth => {
                self.dispatch_response(&message, frame.value)?;
                Ok(Vec::new())
            }
            proto::AuthType::Invalid => Err(KineticError::Protocol(
                "envelope carries no auth type".to_string(),
            )),
        }
    }

    fn complete_handshake(&self, command: &proto::Command) -> Vec<OutboundFrame> {
        let mut session = self.lock_session();
        if session.state != SessionState::Handshaking {
            warn!("unsolicited status outside handshake, dropping");
            return Vec::new();
        }
        if let Some(header) = command.header.as_ref() {
            session.connection_id = header.connection_id.unwrap_or_default();
            if let Some(cluster_version) = header.cluster_version {
                session.cluster_version = cluster_version;
            }
        }
        session.state = SessionState::Ready;
        debug!(
            connection_id = session.connection_id,
            cluster_version = session.cluster_version,
            "handshake complete"
        );

        let backlog = std::mem::take(&mut session.backlog);
        let mut staged = Vec::with_capacity(backlog.len());
        for request in backlog {
            staged.push(self.stage(&mut session, request));
        }
        staged
    }

    fn dispatch_response(&self, message: &proto::Message, value: Bytes) -> Result<()> {
        let command_bytes = message.command_bytes.as_deref().unwrap_or_default();
        let command = proto::Command::decode(command_bytes)?;

        let Some(ack) = command.header.as_ref().and_then(|h| h.ack_sequence) else {
            warn!("response without ack sequence, dropping");
            return Ok(());
        };
        let Some(entry) = self.lock_session().pending.remove(&ack) else {
            // Either never submitted or already timed out and the
            // caller stopped listening. Not fatal.
            warn!(ack_sequence = ack, "response for unknown sequence, dropping");
            return Ok(());
        };

        if message.auth_type() == proto::AuthType::HmacAuth {
            let tag = message
                .hmac_auth
                .as_ref()
                .and_then(|h| h.hmac.as_deref())
                .unwrap_or_default();
            if !verify_hmac(&self.hmac_key, command_bytes, tag) {
                entry.handler.invoke(Err(Status::new(
                    StatusCode::HmacFailure,
                    "response HMAC verification failed",
                )));
                return Err(KineticError::HmacMismatch);
            }
        }

        let status = Status::from_proto(command.status.as_ref());
        debug!(
            ack_sequence = ack,
            elapsed = ?entry.submitted_at.elapsed(),
            code = ?status.code,
            "completing request"
        );
        if status.is_ok() {
            entry.handler.invoke(Ok(entry.kind.decode(&command, value)));
        } else {
            entry.handler.invoke(Err(status));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.lock_session().state == SessionState::Closed
    }
}

fn failure_code(err: &KineticError) -> StatusCode {
    match err {
        KineticError::Io(_) => StatusCode::RemoteConnectionError,
        KineticError::HmacMismatch => StatusCode::HmacFailure,
        KineticError::ClientShutdown => StatusCode::ClientShutdown,
        _ => StatusCode::InternalError,
    }
}

async fn write_loop<W>(
    mut writer: W,
    mut frames: mpsc::Receiver<OutboundFrame>,
    mut shutdown: watch::Receiver<bool>,
    shared: Arc<Shared>,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let first = tokio::select! {
            _ = shutdown.changed() => break,
            frame = frames.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        let mut batch = Vec::with_capacity(MAX_WRITE_BATCH);
        batch.push(first);
        while batch.len() < MAX_WRITE_BATCH {
            match frames.try_recv() {
                Ok(frame) => batch.push(frame),
                Err(_) => break,
            }
        }

        if let Err(err) = write_batch(&mut writer, &batch).await {
            error!(error = %err, "socket write failed");
            shared.fail_all(StatusCode::RemoteConnectionError, "socket write failed");
            break;
        }
    }
}

/// Write every frame whole, one flush per batch.
async fn write_batch<W>(writer: &mut W, batch: &[OutboundFrame]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for frame in batch {
        writer.write_all(&frame.header).await?;
        writer.write_all(&frame.message).await?;
        if !frame.value.is_empty() {
            writer.write_all(&frame.value).await?;
        }
    }
    writer.flush().await
}

async fn read_loop<R>(mut reader: R, mut shutdown: watch::Receiver<bool>, shared: Arc<Shared>)
where
    R: AsyncRead + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = shutdown.changed() => break,
            frame = read_frame(&mut reader, &shared.limits) => frame,
        };

        let result = frame.and_then(|frame| shared.process_frame(frame));
        match result {
            Ok(staged) => {
                for frame in staged {
                    if shared.send_frame(frame).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                if !shared.is_closed() {
                    error!(error = %err, "receive failed, closing connection");
                    shared.fail_all(failure_code(&err), &err.to_string());
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command;
    use crate::frame::encode_frame;
    use std::sync::mpsc as std_mpsc;

    fn options() -> ClientOptions {
        ClientOptions {
            hmac_key: b"asdfasdf".to_vec(),
            ..Default::default()
        }
    }

    fn handshake_frame(connection_id: i64, cluster_version: i64) -> Vec<u8> {
        let command = proto::Command {
            header: Some(proto::Header {
                connection_id: Some(connection_id),
                cluster_version: Some(cluster_version),
                ..Default::default()
            }),
            status: Some(proto::Status {
                code: Some(proto::StatusCode::Success as i32),
                ..Default::default()
            }),
            ..Default::default()
        };
        let message = proto::Message {
            auth_type: Some(proto::AuthType::UnsolicitedStatus as i32),
            command_bytes: Some(command.encode_to_vec()),
            ..Default::default()
        };
        encode_frame(&message.encode_to_vec(), &[])
    }

    fn noop_request(tx: std_mpsc::Sender<std::result::Result<(), StatusCode>>) -> SubmitRequest {
        SubmitRequest {
            auth: AuthKind::Hmac,
            command: command::noop(),
            value: Bytes::new(),
            kind: ResponseKind::NoOp,
            handler: MessageHandler::new(move |result| {
                let _ = tx.send(result.map(|_| ()).map_err(|status| status.code));
            }),
        }
    }

    #[tokio::test]
    async fn submit_after_close_fails_with_client_shutdown() {
        let (client, _device) = tokio::io::duplex(4096);
        let service = NetworkService::spawn(client, &options());
        service.close();

        let (tx, rx) = std_mpsc::channel();
        let err = service.submit(noop_request(tx)).await.unwrap_err();
        assert!(matches!(err, KineticError::ClientShutdown));
        // The completion observed the failure as well.
        assert_eq!(rx.recv().unwrap(), Err(StatusCode::ClientShutdown));
    }

    #[tokio::test]
    async fn close_drains_queued_submissions() {
        let (client, _device) = tokio::io::duplex(4096);
        let service = NetworkService::spawn(client, &options());

        // No handshake yet, so this lands in the backlog.
        let (tx, rx) = std_mpsc::channel();
        service.submit(noop_request(tx)).await.unwrap();
        assert!(rx.try_recv().is_err());

        service.close();
        assert_eq!(rx.recv().unwrap(), Err(StatusCode::ClientShutdown));
    }

    #[tokio::test]
    async fn backlog_is_flushed_after_handshake() {
        let (client, device) = tokio::io::duplex(64 * 1024);
        let service = NetworkService::spawn(client, &options());

        let (tx, _rx) = std_mpsc::channel();
        service.submit(noop_request(tx)).await.unwrap();

        let (mut device_read, mut device_write) = tokio::io::split(device);
        device_write
            .write_all(&handshake_frame(777, 0))
            .await
            .unwrap();
        device_write.flush().await.unwrap();

        // The queued noop must now appear on the wire, stamped with the
        // handshake's connection id and sequence 1.
        let frame = read_frame(&mut device_read, &FrameLimits::default())
            .await
            .unwrap();
        let message = proto::Message::decode(frame.message.as_ref()).unwrap();
        assert_eq!(message.auth_type(), proto::AuthType::HmacAuth);
        let cmd =
            proto::Command::decode(message.command_bytes.as_deref().unwrap_or_default()).unwrap();
        let header = cmd.header.unwrap();
        assert_eq!(header.sequence, Some(1));
        assert_eq!(header.connection_id, Some(777));
    }

    #[tokio::test]
    async fn peer_disconnect_fails_pending_with_connection_error() {
        let (client, device) = tokio::io::duplex(64 * 1024);
        let service = NetworkService::spawn(client, &options());

        let (mut device_read, mut device_write) = tokio::io::split(device);
        device_write
            .write_all(&handshake_frame(1, 0))
            .await
            .unwrap();

        let (tx, rx) = std_mpsc::channel();
        service.submit(noop_request(tx)).await.unwrap();
        // Consume the request, then hang up without answering.
        let _ = read_frame(&mut device_read, &FrameLimits::default())
            .await
            .unwrap();
        drop(device_read);
        drop(device_write);

        let result = tokio::task::spawn_blocking(move || rx.recv().unwrap())
            .await
            .unwrap();
        assert_eq!(result, Err(StatusCode::RemoteConnectionError));
    }
}
