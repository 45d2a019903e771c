//! Synchronous facade: every call is a non-blocking submission plus a
//! single-shot latch.
//!
//! Nothing here touches the wire directly; the facade builds a handler
//! backed by a `oneshot` channel, delegates to [`NonBlockConnection`],
//! and awaits the completion. A configured timeout bounds the wait and
//! yields `RemoteServiceBusy`; the pending entry stays installed, so a
//! late response is still correlated by the receiver and then discarded
//! against the dropped latch.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::callback::{MessageHandler, Outcome};
use crate::error::{KineticError, Result};
use crate::getlog::{Log, LogType};
use crate::nonblocking::NonBlockConnection;
use crate::options::ClientOptions;
use crate::types::{
    KeyRange, MediaOperation, P2PPushRequest, PowerLevel, Priority, Record, Status, StatusCode,
};

type CompletionResult = std::result::Result<Outcome, Status>;

/// Blocking connection to one device.
///
/// # Example
///
/// ```ignore
/// use kinetic_client::{BlockConnection, ClientOptions};
///
/// let conn = BlockConnection::connect(&ClientOptions {
///     hmac_key: b"asdfasdf".to_vec(),
///     ..Default::default()
/// })
/// .await?;
///
/// let status = conn.noop().await?;
/// assert!(status.is_ok());
/// conn.close();
/// ```
pub struct BlockConnection {
    connection: NonBlockConnection,
    timeout: Option<Duration>,
}

fn latch() -> (MessageHandler, oneshot::Receiver<CompletionResult>) {
    let (tx, rx) = oneshot::channel();
    let handler = MessageHandler::new(move |result| {
        // A dropped receiver means the caller timed out; the late
        // response is discarded here.
        let _ = tx.send(result);
    });
    (handler, rx)
}

fn unexpected_outcome() -> KineticError {
    KineticError::Protocol("response decoder produced a mismatched outcome".to_string())
}

impl BlockConnection {
    /// Establish the connection; see [`NonBlockConnection::connect`].
    /// The per-call timeout comes from `options.timeout`.
    pub async fn connect(options: &ClientOptions) -> Result<Self> {
        Ok(BlockConnection {
            connection: NonBlockConnection::connect(options).await?,
            timeout: options.timeout,
        })
    }

    /// The wrapped non-blocking connection, for mixing the two styles
    /// on one session.
    pub fn non_blocking(&self) -> &NonBlockConnection {
        &self.connection
    }

    async fn wait(&self, rx: oneshot::Receiver<CompletionResult>) -> Result<CompletionResult> {
        let dropped =
            || KineticError::Protocol("completion dropped without being invoked".to_string());
        match self.timeout {
            Some(duration) => match tokio::time::timeout(duration, rx).await {
                Ok(result) => result.map_err(|_| dropped()),
                Err(_) => Ok(Err(Status::new(
                    StatusCode::RemoteServiceBusy,
                    "timed out waiting for device response",
                ))),
            },
            None => rx.await.map_err(|_| dropped()),
        }
    }

    async fn wait_status(&self, rx: oneshot::Receiver<CompletionResult>) -> Result<Status> {
        match self.wait(rx).await? {
            Ok(_) => Ok(Status::ok()),
            Err(status) => Ok(status),
        }
    }

    pub async fn noop(&self) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.no_op(handler).await?;
        self.wait_status(rx).await
    }

    async fn wait_record(
        &self,
        rx: oneshot::Receiver<CompletionResult>,
    ) -> Result<(Option<Record>, Status)> {
        match self.wait(rx).await? {
            Ok(Outcome::Record(record)) => Ok((Some(record), Status::ok())),
            Ok(_) => Err(unexpected_outcome()),
            Err(status) => Ok((None, status)),
        }
    }

    pub async fn get(&self, key: &[u8]) -> Result<(Option<Record>, Status)> {
        let (handler, rx) = latch();
        self.connection.get(key, handler).await?;
        self.wait_record(rx).await
    }

    pub async fn get_next(&self, key: &[u8]) -> Result<(Option<Record>, Status)> {
        let (handler, rx) = latch();
        self.connection.get_next(key, handler).await?;
        self.wait_record(rx).await
    }

    pub async fn get_previous(&self, key: &[u8]) -> Result<(Option<Record>, Status)> {
        let (handler, rx) = latch();
        self.connection.get_previous(key, handler).await?;
        self.wait_record(rx).await
    }

    pub async fn get_version(&self, key: &[u8]) -> Result<(Option<Vec<u8>>, Status)> {
        let (handler, rx) = latch();
        self.connection.get_version(key, handler).await?;
        match self.wait(rx).await? {
            Ok(Outcome::Version(version)) => Ok((Some(version), Status::ok())),
            Ok(_) => Err(unexpected_outcome()),
            Err(status) => Ok((None, status)),
        }
    }

    /// Keys within `range` in server order; empty on failure.
    pub async fn get_key_range(&self, range: &KeyRange) -> Result<(Vec<Vec<u8>>, Status)> {
        let (handler, rx) = latch();
        self.connection.get_key_range(range, handler).await?;
        match self.wait(rx).await? {
            Ok(Outcome::Keys(keys)) => Ok((keys, Status::ok())),
            Ok(_) => Err(unexpected_outcome()),
            Err(status) => Ok((Vec::new(), status)),
        }
    }

    pub async fn put(&self, entry: &Record) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.put(entry, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn delete(&self, entry: &Record) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.delete(entry, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn flush(&self) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.flush(handler).await?;
        self.wait_status(rx).await
    }

    pub async fn get_log(&self, types: &[LogType]) -> Result<(Option<Log>, Status)> {
        let (handler, rx) = latch();
        self.connection.get_log(types, handler).await?;
        match self.wait(rx).await? {
            Ok(Outcome::Log(log)) => Ok((Some(log), Status::ok())),
            Ok(_) => Err(unexpected_outcome()),
            Err(status) => Ok((None, status)),
        }
    }

    pub async fn media_scan(&self, op: &MediaOperation, priority: Priority) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.media_scan(op, priority, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn media_optimize(&self, op: &MediaOperation, priority: Priority) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.media_optimize(op, priority, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn set_cluster_version(&self, version: i64) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.set_cluster_version(version, handler).await?;
        self.wait_status(rx).await
    }

    /// Overwrite the cluster version this client stamps into commands.
    /// Local only; the device is not contacted.
    pub fn set_client_cluster_version(&self, version: i64) {
        self.connection.set_client_cluster_version(version);
    }

    pub async fn update_firmware(&self, code: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.update_firmware(code, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn secure_erase(&self, pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.secure_erase(pin, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn instant_erase(&self, pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.instant_erase(pin, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn lock_device(&self, pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.lock_device(pin, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn unlock_device(&self, pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.unlock_device(pin, handler).await?;
        self.wait_status(rx).await
    }

    pub async fn set_erase_pin(&self, current_pin: &[u8], new_pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection
            .set_erase_pin(current_pin, new_pin, handler)
            .await?;
        self.wait_status(rx).await
    }

    pub async fn set_lock_pin(&self, current_pin: &[u8], new_pin: &[u8]) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection
            .set_lock_pin(current_pin, new_pin, handler)
            .await?;
        self.wait_status(rx).await
    }

    pub async fn set_power_level(&self, level: PowerLevel) -> Result<Status> {
        let (handler, rx) = latch();
        self.connection.set_power_level(level, handler).await?;
        self.wait_status(rx).await
    }

    /// Per-operation statuses in request order, plus the overall
    /// status. The list is empty when the push failed outright.
    pub async fn p2p_push(&self, request: &P2PPushRequest) -> Result<(Vec<Status>, Status)> {
        let (handler, rx) = latch();
        self.connection.p2p_push(request, handler).await?;
        match self.wait(rx).await? {
            Ok(Outcome::PushStatuses(statuses)) => Ok((statuses, Status::ok())),
            Ok(_) => Err(unexpected_outcome()),
            Err(status) => Ok((Vec::new(), status)),
        }
    }

    /// Shut the connection down; see [`NonBlockConnection::close`].
    pub fn close(&self) {
        self.connection.close();
    }
}
