//! Result adapters: decoding a response command into a typed outcome.
//!
//! Each operation registers a [`ResponseKind`] when it is submitted;
//! the receiver uses it to turn the response body plus value payload
//! into an [`Outcome`] before invoking the caller's handler. Modeled as
//! one enum with a decode function per message type rather than a
//! family of trait objects.

use bytes::Bytes;

use crate::getlog::Log;
use crate::proto;
use crate::types::{Algorithm, Record, Status};

/// Typed result of a completed operation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The operation's only observable is its status.
    Status,
    /// Get / GetNext / GetPrevious.
    Record(Record),
    /// GetKeyRange: keys in server order.
    Keys(Vec<Vec<u8>>),
    /// GetVersion.
    Version(Vec<u8>),
    /// GetLog, with only the requested variants populated.
    Log(Log),
    /// P2PPush: per-operation statuses in request order.
    PushStatuses(Vec<Status>),
}

/// Which decoder runs when the response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseKind {
    NoOp,
    Get,
    GetKeyRange,
    GetVersion,
    GetLog,
    P2PPush,
    /// Every operation whose only observable is a status.
    Generic,
}

impl ResponseKind {
    pub(crate) fn decode(self, resp: &proto::Command, value: Bytes) -> Outcome {
        let body = resp.body.as_ref();
        match self {
            ResponseKind::NoOp | ResponseKind::Generic => Outcome::Status,
            ResponseKind::Get => {
                let kv = body.and_then(|b| b.key_value.as_ref());
                Outcome::Record(Record {
                    key: kv
                        .and_then(|kv| kv.key.clone())
                        .unwrap_or_default(),
                    tag: kv.and_then(|kv| kv.tag.clone()).unwrap_or_default(),
                    version: kv
                        .and_then(|kv| kv.db_version.clone())
                        .unwrap_or_default(),
                    algorithm: kv
                        .map(|kv| Algorithm::from_proto(kv.algorithm()))
                        .unwrap_or_default(),
                    value,
                    ..Default::default()
                })
            }
            ResponseKind::GetKeyRange => Outcome::Keys(
                body.and_then(|b| b.range.as_ref())
                    .map(|r| r.keys.clone())
                    .unwrap_or_default(),
            ),
            ResponseKind::GetVersion => Outcome::Version(
                body.and_then(|b| b.key_value.as_ref())
                    .and_then(|kv| kv.db_version.clone())
                    .unwrap_or_default(),
            ),
            ResponseKind::GetLog => Outcome::Log(
                body.and_then(|b| b.get_log.as_ref())
                    .map(Log::from_proto)
                    .unwrap_or_default(),
            ),
            ResponseKind::P2PPush => Outcome::PushStatuses(
                body.and_then(|b| b.p2p_operation.as_ref())
                    .map(|p2p| {
                        p2p.operation
                            .iter()
                            .map(|op| Status::from_proto(op.status.as_ref()))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        }
    }
}

/// Completion handler for one submitted command.
///
/// Invoked exactly once from the receiver task: `Ok(outcome)` when the
/// device reported success, `Err(status)` otherwise (including local
/// failures such as shutdown or transport loss).
pub struct MessageHandler {
    complete: Box<dyn FnOnce(Result<Outcome, Status>) + Send + 'static>,
}

impl MessageHandler {
    pub fn new(complete: impl FnOnce(Result<Outcome, Status>) + Send + 'static) -> Self {
        Self {
            complete: Box::new(complete),
        }
    }

    pub(crate) fn invoke(self, result: Result<Outcome, Status>) {
        (self.complete)(result);
    }
}

impl std::fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MessageHandler")
    }
}
