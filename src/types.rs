//! Public data model: records, ranges, statuses and their enums.
//!
//! These are the types applications touch. Conversions to and from the
//! wire representation in [`crate::proto`] live here so the rest of the
//! crate never reasons about raw enum integers.

use bytes::Bytes;

use crate::proto;

/// One object stored on a device.
///
/// `version` is the version the client believes is stored (checked on
/// update unless `force` is set); `new_version` becomes the stored
/// version on a successful write. Empty byte strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Bytes,
    pub version: Vec<u8>,
    pub new_version: Vec<u8>,
    /// Integrity tag over the value, computed with `algorithm`.
    pub tag: Vec<u8>,
    pub algorithm: Algorithm,
    pub sync: SyncMode,
    /// Skip the stored-version check on put/delete.
    pub force: bool,
}

/// Key interval for range queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRange {
    pub start_key: Vec<u8>,
    pub end_key: Vec<u8>,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
    /// Upper bound on returned keys; must not exceed the device's
    /// `MaxKeyRangeCount`.
    pub max: u32,
    pub reverse: bool,
}

/// Key interval for media scan / optimize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOperation {
    pub start_key: Vec<u8>,
    pub end_key: Vec<u8>,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
}

/// Target peer for a peer-to-peer push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peer {
    pub hostname: String,
    pub port: u16,
    pub tls: bool,
}

/// One object transferred by a peer-to-peer push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct P2PPushOperation {
    pub key: Vec<u8>,
    pub version: Vec<u8>,
    /// Key under which the object lands on the peer; empty keeps `key`.
    pub new_key: Vec<u8>,
    pub force: bool,
}

/// A full peer-to-peer push request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct P2PPushRequest {
    pub peer: Peer,
    pub operations: Vec<P2PPushOperation>,
}

/// Operation outcome as reported by the device or the client itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn ok() -> Self {
        Status {
            code: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub(crate) fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Status {
            code,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    pub(crate) fn from_proto(status: Option<&proto::Status>) -> Self {
        match status {
            Some(s) => Status {
                code: StatusCode::from_proto(s.code()),
                message: s.status_message.clone().unwrap_or_default(),
            },
            None => Status::new(StatusCode::InternalError, "response carried no status"),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{:?}", self.code)
        } else {
            write!(f, "{:?}: {}", self.code, self.message)
        }
    }
}

/// Status code taxonomy, preserved verbatim from the protocol.
///
/// Codes prefixed `Client` never appear on the wire; they are produced
/// locally. `RemoteClusterVersionMismatch` is how the device's
/// `VERSION_FAILURE` wire code surfaces to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    HmacFailure,
    NotAuthorized,
    /// Reserved wire alias; cluster mismatch surfaces as
    /// [`StatusCode::RemoteClusterVersionMismatch`].
    VersionFailure,
    VersionMismatch,
    NotFound,
    InvalidRequest,
    HeaderRequired,
    NoSpace,
    NoSuchHmacAlgorithm,
    NestedOperationErrors,
    DeviceLocked,
    DeviceAlreadyUnlocked,
    ConnectionTerminated,
    InvalidBatch,
    Hibernate,
    Shutdown,
    RemoteClusterVersionMismatch,
    RemoteConnectionError,
    /// A blocking call timed out waiting for its completion.
    RemoteServiceBusy,
    Expired,
    DataError,
    PermDataError,
    ServiceBusy,
    ClientInternalError,
    /// The connection was closed while the request was in flight.
    ClientShutdown,
    ClientIoError,
    #[default]
    InternalError,
}

impl StatusCode {
    pub(crate) fn from_proto(code: proto::StatusCode) -> Self {
        use proto::StatusCode as P;
        match code {
            P::Success => StatusCode::Ok,
            P::HmacFailure => StatusCode::HmacFailure,
            P::NotAuthorized => StatusCode::NotAuthorized,
            // The device reports a cluster version mismatch as
            // VERSION_FAILURE and the correct version in its header.
            P::VersionFailure => StatusCode::RemoteClusterVersionMismatch,
            P::VersionMismatch => StatusCode::VersionMismatch,
            P::NotFound => StatusCode::NotFound,
            P::InvalidRequest => StatusCode::InvalidRequest,
            P::HeaderRequired => StatusCode::HeaderRequired,
            P::NoSpace => StatusCode::NoSpace,
            P::NoSuchHmacAlgorithm => StatusCode::NoSuchHmacAlgorithm,
            P::NestedOperationErrors => StatusCode::NestedOperationErrors,
            P::DeviceLocked => StatusCode::DeviceLocked,
            P::DeviceAlreadyUnlocked => StatusCode::DeviceAlreadyUnlocked,
            P::ConnectionTerminated => StatusCode::ConnectionTerminated,
            P::InvalidBatch => StatusCode::InvalidBatch,
            P::Hibernate => StatusCode::Hibernate,
            P::Shutdown => StatusCode::Shutdown,
            P::RemoteConnectionError => StatusCode::RemoteConnectionError,
            P::ServiceBusy => StatusCode::ServiceBusy,
            P::Expired => StatusCode::Expired,
            P::DataError => StatusCode::DataError,
            P::PermDataError => StatusCode::PermDataError,
            P::InternalError => StatusCode::InternalError,
            P::Invalid | P::NotAttempted => StatusCode::InternalError,
        }
    }
}

/// Integrity tag algorithm for stored values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    Invalid,
    Sha1,
    Sha2,
    Sha3,
    Crc32,
    Crc64,
}

impl Algorithm {
    pub(crate) fn to_proto(self) -> proto::Algorithm {
        match self {
            Algorithm::Invalid => proto::Algorithm::Invalid,
            Algorithm::Sha1 => proto::Algorithm::Sha1,
            Algorithm::Sha2 => proto::Algorithm::Sha2,
            Algorithm::Sha3 => proto::Algorithm::Sha3,
            Algorithm::Crc32 => proto::Algorithm::Crc32,
            Algorithm::Crc64 => proto::Algorithm::Crc64,
        }
    }

    pub(crate) fn from_proto(a: proto::Algorithm) -> Self {
        match a {
            proto::Algorithm::Invalid => Algorithm::Invalid,
            proto::Algorithm::Sha1 => Algorithm::Sha1,
            proto::Algorithm::Sha2 => Algorithm::Sha2,
            proto::Algorithm::Sha3 => Algorithm::Sha3,
            proto::Algorithm::Crc32 => Algorithm::Crc32,
            proto::Algorithm::Crc64 => Algorithm::Crc64,
        }
    }
}

/// Durability of a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Persisted before the response is sent.
    #[default]
    WriteThrough,
    /// Acknowledged from cache; persisted later.
    WriteBack,
    /// Flush all cached writes along with this one.
    Flush,
}

impl SyncMode {
    pub(crate) fn to_proto(self) -> proto::Synchronization {
        match self {
            SyncMode::WriteThrough => proto::Synchronization::WriteThrough,
            SyncMode::WriteBack => proto::Synchronization::WriteBack,
            SyncMode::Flush => proto::Synchronization::Flush,
        }
    }
}

/// Scheduling priority for background media operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Lowest,
    Lower,
    Low,
    #[default]
    Normal,
    High,
    Higher,
    Highest,
}

impl Priority {
    pub(crate) fn to_proto(self) -> proto::Priority {
        match self {
            Priority::Lowest => proto::Priority::Lowest,
            Priority::Lower => proto::Priority::Lower,
            Priority::Low => proto::Priority::Low,
            Priority::Normal => proto::Priority::Normal,
            Priority::High => proto::Priority::High,
            Priority::Higher => proto::Priority::Higher,
            Priority::Highest => proto::Priority::Highest,
        }
    }
}

/// Device power state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerLevel {
    #[default]
    Operational,
    Hibernate,
    Shutdown,
    Fail,
}

impl PowerLevel {
    pub(crate) fn to_proto(self) -> proto::PowerLevel {
        match self {
            PowerLevel::Operational => proto::PowerLevel::Operational,
            PowerLevel::Hibernate => proto::PowerLevel::Hibernate,
            PowerLevel::Shutdown => proto::PowerLevel::Shutdown,
            PowerLevel::Fail => proto::PowerLevel::Fail,
        }
    }

    pub(crate) fn from_proto(p: proto::PowerLevel) -> Self {
        match p {
            proto::PowerLevel::Operational | proto::PowerLevel::Invalid => PowerLevel::Operational,
            proto::PowerLevel::Hibernate => PowerLevel::Hibernate,
            proto::PowerLevel::Shutdown => PowerLevel::Shutdown,
            proto::PowerLevel::Fail => PowerLevel::Fail,
        }
    }
}

/// Operation discriminator, mirrored from the wire for statistics
/// reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MessageType {
    #[default]
    Invalid,
    Get,
    Put,
    Delete,
    GetNext,
    GetPrevious,
    GetKeyRange,
    GetVersion,
    Setup,
    GetLog,
    Security,
    PeerToPeerPush,
    Noop,
    FlushAllData,
    PinOp,
    MediaScan,
    MediaOptimize,
    StartBatch,
    EndBatch,
    AbortBatch,
    SetPowerLevel,
}

impl MessageType {
    pub(crate) fn from_proto(t: proto::MessageType) -> Self {
        use proto::MessageType as P;
        match t {
            P::Get | P::GetResponse => MessageType::Get,
            P::Put | P::PutResponse => MessageType::Put,
            P::Delete | P::DeleteResponse => MessageType::Delete,
            P::GetNext | P::GetNextResponse => MessageType::GetNext,
            P::GetPrevious | P::GetPreviousResponse => MessageType::GetPrevious,
            P::GetKeyRange | P::GetKeyRangeResponse => MessageType::GetKeyRange,
            P::GetVersion | P::GetVersionResponse => MessageType::GetVersion,
            P::Setup | P::SetupResponse => MessageType::Setup,
            P::GetLog | P::GetLogResponse => MessageType::GetLog,
            P::Security | P::SecurityResponse => MessageType::Security,
            P::PeerToPeerPush | P::PeerToPeerPushResponse => MessageType::PeerToPeerPush,
            P::Noop | P::NoopResponse => MessageType::Noop,
            P::FlushAllData | P::FlushAllDataResponse => MessageType::FlushAllData,
            P::PinOp | P::PinOpResponse => MessageType::PinOp,
            P::MediaScan | P::MediaScanResponse => MessageType::MediaScan,
            P::MediaOptimize | P::MediaOptimizeResponse => MessageType::MediaOptimize,
            P::StartBatch | P::StartBatchResponse => MessageType::StartBatch,
            P::EndBatch | P::EndBatchResponse => MessageType::EndBatch,
            P::AbortBatch | P::AbortBatchResponse => MessageType::AbortBatch,
            P::SetPowerLevel | P::SetPowerLevelResponse => MessageType::SetPowerLevel,
            P::Invalid => MessageType::Invalid,
        }
    }
}
