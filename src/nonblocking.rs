//! Fire-and-forget connection: submit a command plus a completion
//! handler, return immediately.
//!
//! Each method builds the operation's command tree, picks the matching
//! result adapter, and hands everything to the network service. The
//! handler is invoked exactly once from the receiver task with either
//! the decoded result or a failure status.
//!
//! # Example
//!
//! ```ignore
//! use kinetic_client::{ClientOptions, MessageHandler, NonBlockConnection};
//!
//! let conn = NonBlockConnection::connect(&ClientOptions {
//!     hmac_key: b"asdfasdf".to_vec(),
//!     ..Default::default()
//! })
//! .await?;
//!
//! conn.no_op(MessageHandler::new(|result| {
//!     println!("device answered: {:?}", result);
//! }))
//! .await?;
//! ```

use bytes::Bytes;

use crate::callback::{MessageHandler, Outcome, ResponseKind};
use crate::command;
use crate::error::{KineticError, Result};
use crate::getlog::LogType;
use crate::options::ClientOptions;
use crate::proto;
use crate::service::{AuthKind, NetworkService, SubmitRequest};
use crate::types::{KeyRange, MediaOperation, P2PPushRequest, PowerLevel, Priority, Record};

/// Non-blocking connection to one device.
pub struct NonBlockConnection {
    service: NetworkService,
}

impl NonBlockConnection {
    /// Establish the TCP/TLS connection and start the service tasks.
    ///
    /// Returns as soon as the socket is up; the device's handshake
    /// completes in the background and any operations submitted before
    /// it are queued and flushed in order.
    pub async fn connect(options: &ClientOptions) -> Result<Self> {
        if options.hmac_key.is_empty() {
            return Err(KineticError::Protocol(
                "an HMAC key is required to open a connection".to_string(),
            ));
        }
        let service = NetworkService::connect(options).await?;
        Ok(NonBlockConnection { service })
    }

    async fn submit_hmac(
        &self,
        cmd: proto::Command,
        value: Bytes,
        kind: ResponseKind,
        handler: MessageHandler,
    ) -> Result<()> {
        self.service
            .submit(SubmitRequest {
                auth: AuthKind::Hmac,
                command: cmd,
                value,
                kind,
                handler,
            })
            .await
    }

    async fn submit_pin(
        &self,
        pin: &[u8],
        op: proto::PinOpType,
        handler: MessageHandler,
    ) -> Result<()> {
        self.service
            .submit(SubmitRequest {
                auth: AuthKind::Pin(pin.to_vec()),
                command: command::pin_operation(op),
                value: Bytes::new(),
                kind: ResponseKind::Generic,
                handler,
            })
            .await
    }

    pub async fn no_op(&self, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(command::noop(), Bytes::new(), ResponseKind::NoOp, handler)
            .await
    }

    pub async fn get(&self, key: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get(key, proto::MessageType::Get),
            Bytes::new(),
            ResponseKind::Get,
            handler,
        )
        .await
    }

    /// Fetch the record stored under the key immediately after `key`.
    pub async fn get_next(&self, key: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get(key, proto::MessageType::GetNext),
            Bytes::new(),
            ResponseKind::Get,
            handler,
        )
        .await
    }

    /// Fetch the record stored under the key immediately before `key`.
    pub async fn get_previous(&self, key: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get(key, proto::MessageType::GetPrevious),
            Bytes::new(),
            ResponseKind::Get,
            handler,
        )
        .await
    }

    pub async fn get_version(&self, key: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get_version(key),
            Bytes::new(),
            ResponseKind::GetVersion,
            handler,
        )
        .await
    }

    pub async fn get_key_range(&self, range: &KeyRange, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get_key_range(range),
            Bytes::new(),
            ResponseKind::GetKeyRange,
            handler,
        )
        .await
    }

    /// Store `entry.value` under `entry.key`. The value travels as the
    /// frame's trailing payload, not inside the command.
    pub async fn put(&self, entry: &Record, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::put(entry),
            entry.value.clone(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    pub async fn delete(&self, entry: &Record, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::delete(entry),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    /// Persist all cached writes.
    pub async fn flush(&self, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(command::flush(), Bytes::new(), ResponseKind::Generic, handler)
            .await
    }

    pub async fn get_log(&self, types: &[LogType], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::get_log(types),
            Bytes::new(),
            ResponseKind::GetLog,
            handler,
        )
        .await
    }

    pub async fn media_scan(
        &self,
        op: &MediaOperation,
        priority: Priority,
        handler: MessageHandler,
    ) -> Result<()> {
        self.submit_hmac(
            command::media_operation(op, priority, proto::MessageType::MediaScan),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    pub async fn media_optimize(
        &self,
        op: &MediaOperation,
        priority: Priority,
        handler: MessageHandler,
    ) -> Result<()> {
        self.submit_hmac(
            command::media_operation(op, priority, proto::MessageType::MediaOptimize),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    /// Ask the device to adopt a new cluster version. On success the
    /// client's own cluster version follows, so subsequent commands
    /// stay accepted.
    pub async fn set_cluster_version(&self, version: i64, handler: MessageHandler) -> Result<()> {
        let service = self.service.clone();
        let wrapped = MessageHandler::new(move |result: std::result::Result<Outcome, _>| {
            if result.is_ok() {
                service.set_client_cluster_version(version);
            }
            handler.invoke(result);
        });
        self.submit_hmac(
            command::set_cluster_version(version),
            Bytes::new(),
            ResponseKind::Generic,
            wrapped,
        )
        .await
    }

    /// Overwrite the cluster version this client stamps into commands.
    /// Local only; the device is not contacted.
    pub fn set_client_cluster_version(&self, version: i64) {
        self.service.set_client_cluster_version(version);
    }

    /// Upload a firmware image; the device flashes it after validation.
    pub async fn update_firmware(&self, code: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::firmware_download(),
            Bytes::copy_from_slice(code),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    /// Cryptographically erase all data, keyed by the erase PIN.
    pub async fn secure_erase(&self, pin: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_pin(pin, proto::PinOpType::SecureErase, handler)
            .await
    }

    /// Erase all data without the cryptographic guarantees of
    /// [`secure_erase`](Self::secure_erase).
    pub async fn instant_erase(&self, pin: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_pin(pin, proto::PinOpType::Erase, handler).await
    }

    pub async fn lock_device(&self, pin: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_pin(pin, proto::PinOpType::Lock, handler).await
    }

    pub async fn unlock_device(&self, pin: &[u8], handler: MessageHandler) -> Result<()> {
        self.submit_pin(pin, proto::PinOpType::Unlock, handler).await
    }

    pub async fn set_erase_pin(
        &self,
        current_pin: &[u8],
        new_pin: &[u8],
        handler: MessageHandler,
    ) -> Result<()> {
        self.submit_hmac(
            command::set_erase_pin(current_pin, new_pin),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    pub async fn set_lock_pin(
        &self,
        current_pin: &[u8],
        new_pin: &[u8],
        handler: MessageHandler,
    ) -> Result<()> {
        self.submit_hmac(
            command::set_lock_pin(current_pin, new_pin),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    pub async fn set_power_level(
        &self,
        level: PowerLevel,
        handler: MessageHandler,
    ) -> Result<()> {
        self.submit_hmac(
            command::set_power_level(level),
            Bytes::new(),
            ResponseKind::Generic,
            handler,
        )
        .await
    }

    /// Push objects to a peer device; the completion carries one status
    /// per operation plus the overall status.
    pub async fn p2p_push(&self, request: &P2PPushRequest, handler: MessageHandler) -> Result<()> {
        self.submit_hmac(
            command::p2p_push(request),
            Bytes::new(),
            ResponseKind::P2PPush,
            handler,
        )
        .await
    }

    /// Shut the connection down. Every in-flight and queued operation
    /// fails with `ClientShutdown`; no operation survives.
    pub fn close(&self) {
        self.service.close();
    }
}

impl Drop for NonBlockConnection {
    fn drop(&mut self) {
        self.service.close();
    }
}
