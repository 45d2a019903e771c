//! Wire message definitions for the Kinetic protocol.
//!
//! Hand-maintained prost structs mirroring the protocol-buffer schema the
//! drives speak (protocol version 3.x). Only the subset of messages and
//! fields this client populates or reads is carried here; field numbers
//! match the published schema, so frames produced from these types are
//! byte-compatible with other implementations.
//!
//! The outer [`Message`] is the authenticated envelope; the inner
//! [`Command`] travels pre-serialized in `Message.command_bytes` so the
//! HMAC can be computed over its exact bytes.

/// Outer authenticated envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(enumeration = "AuthType", optional, tag = "1")]
    pub auth_type: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub hmac_auth: ::core::option::Option<HmacAuth>,
    #[prost(message, optional, tag = "3")]
    pub pin_auth: ::core::option::Option<PinAuth>,
    /// Serialized [`Command`] bytes; the HMAC is computed over these.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub command_bytes: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

/// HMAC identity block: who is talking and the tag over the command.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HmacAuth {
    #[prost(int64, optional, tag = "1")]
    pub identity: ::core::option::Option<i64>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub hmac: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

/// PIN block used for lifecycle operations (erase, lock, unlock).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PinAuth {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub pin: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AuthType {
    Invalid = -1,
    HmacAuth = 1,
    PinAuth = 2,
    UnsolicitedStatus = 3,
}

/// Inner structured message describing one operation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<Header>,
    #[prost(message, optional, tag = "2")]
    pub body: ::core::option::Option<Body>,
    #[prost(message, optional, tag = "3")]
    pub status: ::core::option::Option<Status>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(int64, optional, tag = "1")]
    pub cluster_version: ::core::option::Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub connection_id: ::core::option::Option<i64>,
    #[prost(uint64, optional, tag = "4")]
    pub sequence: ::core::option::Option<u64>,
    /// Response correlation: echoes the request's `sequence`.
    #[prost(uint64, optional, tag = "6")]
    pub ack_sequence: ::core::option::Option<u64>,
    #[prost(enumeration = "MessageType", optional, tag = "7")]
    pub message_type: ::core::option::Option<i32>,
    #[prost(uint64, optional, tag = "9")]
    pub timeout: ::core::option::Option<u64>,
    #[prost(bool, optional, tag = "10")]
    pub early_exit: ::core::option::Option<bool>,
    #[prost(enumeration = "Priority", optional, tag = "12")]
    pub priority: ::core::option::Option<i32>,
    #[prost(uint32, optional, tag = "14")]
    pub batch_id: ::core::option::Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Body {
    #[prost(message, optional, tag = "1")]
    pub key_value: ::core::option::Option<KeyValue>,
    #[prost(message, optional, tag = "2")]
    pub range: ::core::option::Option<Range>,
    #[prost(message, optional, tag = "3")]
    pub setup: ::core::option::Option<Setup>,
    #[prost(message, optional, tag = "4")]
    pub p2p_operation: ::core::option::Option<P2pOperation>,
    #[prost(message, optional, tag = "6")]
    pub get_log: ::core::option::Option<GetLog>,
    #[prost(message, optional, tag = "7")]
    pub security: ::core::option::Option<Security>,
    #[prost(message, optional, tag = "8")]
    pub pin_op: ::core::option::Option<PinOperation>,
    #[prost(message, optional, tag = "10")]
    pub power: ::core::option::Option<Power>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(enumeration = "StatusCode", optional, tag = "1")]
    pub code: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub status_message: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub detailed_message: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValue {
    /// Becomes the stored version on a successful write.
    #[prost(bytes = "vec", optional, tag = "2")]
    pub new_version: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    /// Version currently stored on the device.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub db_version: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub tag: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "Algorithm", optional, tag = "6")]
    pub algorithm: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "7")]
    pub metadata_only: ::core::option::Option<bool>,
    /// Skip the version check on write/delete.
    #[prost(bool, optional, tag = "8")]
    pub force: ::core::option::Option<bool>,
    #[prost(enumeration = "Synchronization", optional, tag = "9")]
    pub synchronization: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Range {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub start_key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub end_key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bool, optional, tag = "3")]
    pub start_key_inclusive: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub end_key_inclusive: ::core::option::Option<bool>,
    #[prost(int32, optional, tag = "5")]
    pub max_returned: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "6")]
    pub reverse: ::core::option::Option<bool>,
    /// Response only: matching keys in server order.
    #[prost(bytes = "vec", repeated, tag = "8")]
    pub keys: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Setup {
    #[prost(int64, optional, tag = "1")]
    pub new_cluster_version: ::core::option::Option<i64>,
    /// The value payload of this command is a firmware image.
    #[prost(bool, optional, tag = "3")]
    pub firmware_download: ::core::option::Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Security {
    #[prost(bytes = "vec", optional, tag = "6")]
    pub old_lock_pin: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub new_lock_pin: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub old_erase_pin: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub new_erase_pin: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PinOperation {
    #[prost(enumeration = "PinOpType", optional, tag = "1")]
    pub pin_op_type: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct P2pOperation {
    #[prost(message, optional, tag = "1")]
    pub peer: ::core::option::Option<Peer>,
    #[prost(message, repeated, tag = "2")]
    pub operation: ::prost::alloc::vec::Vec<P2pOperationEntry>,
    #[prost(bool, optional, tag = "3")]
    pub all_child_operations_succeeded: ::core::option::Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Peer {
    #[prost(string, optional, tag = "1")]
    pub hostname: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int32, optional, tag = "2")]
    pub port: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "3")]
    pub tls: ::core::option::Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct P2pOperationEntry {
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub version: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub new_key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bool, optional, tag = "6")]
    pub force: ::core::option::Option<bool>,
    /// Response only: per-operation outcome.
    #[prost(message, optional, tag = "7")]
    pub status: ::core::option::Option<Status>,
    #[prost(message, optional, tag = "8")]
    pub p2pop: ::core::option::Option<P2pOperation>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Power {
    #[prost(enumeration = "PowerLevel", optional, tag = "1")]
    pub level: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetLog {
    #[prost(enumeration = "LogType", repeated, packed = "false", tag = "1")]
    pub types: ::prost::alloc::vec::Vec<i32>,
    #[prost(message, repeated, tag = "2")]
    pub utilizations: ::prost::alloc::vec::Vec<Utilization>,
    #[prost(message, repeated, tag = "3")]
    pub temperatures: ::prost::alloc::vec::Vec<Temperature>,
    #[prost(message, optional, tag = "4")]
    pub capacity: ::core::option::Option<Capacity>,
    #[prost(message, optional, tag = "5")]
    pub configuration: ::core::option::Option<Configuration>,
    #[prost(message, repeated, tag = "6")]
    pub statistics: ::prost::alloc::vec::Vec<Statistics>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub messages: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, optional, tag = "8")]
    pub limits: ::core::option::Option<Limits>,
    #[prost(message, optional, tag = "9")]
    pub device: ::core::option::Option<DeviceLog>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Utilization {
    #[prost(string, optional, tag = "1")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(float, optional, tag = "2")]
    pub value: ::core::option::Option<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Temperature {
    #[prost(string, optional, tag = "1")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(float, optional, tag = "2")]
    pub current: ::core::option::Option<f32>,
    #[prost(float, optional, tag = "3")]
    pub minimum: ::core::option::Option<f32>,
    #[prost(float, optional, tag = "4")]
    pub maximum: ::core::option::Option<f32>,
    #[prost(float, optional, tag = "5")]
    pub target: ::core::option::Option<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Capacity {
    #[prost(uint64, optional, tag = "4")]
    pub nominal_capacity_in_bytes: ::core::option::Option<u64>,
    #[prost(float, optional, tag = "5")]
    pub portion_full: ::core::option::Option<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Configuration {
    #[prost(string, optional, tag = "5")]
    pub vendor: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub model: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub serial_number: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(string, optional, tag = "8")]
    pub version: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "9")]
    pub compilation_date: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "10")]
    pub source_hash: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "11")]
    pub protocol_version: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "12")]
    pub protocol_compilation_date: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "13")]
    pub protocol_source_hash: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "14")]
    pub world_wide_name: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, repeated, tag = "15")]
    pub interface: ::prost::alloc::vec::Vec<ConfigurationInterface>,
    #[prost(int32, optional, tag = "16")]
    pub port: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "17")]
    pub tls_port: ::core::option::Option<i32>,
    #[prost(enumeration = "PowerLevel", optional, tag = "18")]
    pub current_power_level: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigurationInterface {
    #[prost(string, optional, tag = "1")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub mac: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub ipv4_address: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub ipv6_address: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Statistics {
    #[prost(enumeration = "MessageType", optional, tag = "1")]
    pub message_type: ::core::option::Option<i32>,
    #[prost(uint64, optional, tag = "2")]
    pub count: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub bytes: ::core::option::Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Limits {
    #[prost(uint32, optional, tag = "1")]
    pub max_key_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub max_value_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub max_version_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub max_tag_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub max_connections: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub max_outstanding_read_requests: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub max_outstanding_write_requests: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub max_message_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub max_key_range_count: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub max_identity_count: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub max_pin_size: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub max_operation_count_per_batch: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "13")]
    pub max_batch_count_per_device: ::core::option::Option<u32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceLog {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub name: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Invalid = -1,
    GetResponse = 1,
    Get = 2,
    PutResponse = 3,
    Put = 4,
    DeleteResponse = 5,
    Delete = 6,
    GetNextResponse = 7,
    GetNext = 8,
    GetPreviousResponse = 9,
    GetPrevious = 10,
    GetKeyRangeResponse = 11,
    GetKeyRange = 12,
    GetVersionResponse = 15,
    GetVersion = 16,
    SetupResponse = 21,
    Setup = 22,
    GetLogResponse = 23,
    GetLog = 24,
    SecurityResponse = 25,
    Security = 26,
    PeerToPeerPushResponse = 27,
    PeerToPeerPush = 28,
    NoopResponse = 29,
    Noop = 30,
    FlushAllDataResponse = 31,
    FlushAllData = 32,
    PinOpResponse = 35,
    PinOp = 36,
    MediaScanResponse = 37,
    MediaScan = 38,
    MediaOptimizeResponse = 39,
    MediaOptimize = 40,
    StartBatchResponse = 41,
    StartBatch = 42,
    EndBatchResponse = 43,
    EndBatch = 44,
    AbortBatchResponse = 45,
    AbortBatch = 46,
    SetPowerLevelResponse = 47,
    SetPowerLevel = 48,
}

impl MessageType {
    /// Response discriminator paired with this request type.
    pub fn response(self) -> MessageType {
        MessageType::try_from(self as i32 - 1).unwrap_or(MessageType::Invalid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    Invalid = -1,
    NotAttempted = 0,
    Success = 1,
    HmacFailure = 2,
    NotAuthorized = 3,
    /// Cluster version mismatch between client and device.
    VersionFailure = 4,
    InternalError = 5,
    HeaderRequired = 6,
    NotFound = 7,
    /// Stored object version did not match the supplied one.
    VersionMismatch = 8,
    ServiceBusy = 9,
    Expired = 10,
    DataError = 11,
    PermDataError = 12,
    RemoteConnectionError = 13,
    NoSpace = 14,
    NoSuchHmacAlgorithm = 15,
    InvalidRequest = 16,
    NestedOperationErrors = 17,
    DeviceLocked = 18,
    DeviceAlreadyUnlocked = 19,
    ConnectionTerminated = 20,
    InvalidBatch = 21,
    Hibernate = 22,
    Shutdown = 23,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Synchronization {
    Invalid = -1,
    WriteThrough = 1,
    WriteBack = 2,
    Flush = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Algorithm {
    Invalid = -1,
    Sha1 = 1,
    Sha2 = 2,
    Sha3 = 3,
    Crc32 = 4,
    Crc64 = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Priority {
    Lowest = 1,
    Lower = 3,
    Low = 4,
    Normal = 5,
    High = 6,
    Higher = 7,
    Highest = 9,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PowerLevel {
    Invalid = -1,
    Operational = 1,
    Hibernate = 2,
    Shutdown = 3,
    Fail = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PinOpType {
    Invalid = -1,
    Unlock = 1,
    Lock = 2,
    Erase = 3,
    SecureErase = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LogType {
    Invalid = -1,
    Utilizations = 0,
    Temperatures = 1,
    Capacities = 2,
    Configuration = 3,
    Statistics = 4,
    Messages = 5,
    Limits = 6,
    Device = 7,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    #[test]
    fn minimal_status_command_encoding() {
        // Command with only Status.code = SUCCESS must encode to the
        // canonical four bytes other implementations produce.
        let cmd = Command {
            status: Some(Status {
                code: Some(StatusCode::Success as i32),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(cmd.encode_to_vec(), vec![0x1a, 0x02, 0x08, 0x01]);
    }

    #[test]
    fn empty_command_encodes_empty() {
        assert!(Command::default().encode_to_vec().is_empty());
    }

    #[test]
    fn request_response_type_pairing() {
        assert_eq!(MessageType::Get.response(), MessageType::GetResponse);
        assert_eq!(MessageType::Put.response(), MessageType::PutResponse);
        assert_eq!(MessageType::GetLog.response(), MessageType::GetLogResponse);
        assert_eq!(MessageType::Noop.response(), MessageType::NoopResponse);
        assert_eq!(
            MessageType::SetPowerLevel.response(),
            MessageType::SetPowerLevelResponse
        );
    }

    #[test]
    fn header_roundtrip() {
        let hdr = Header {
            cluster_version: Some(7),
            connection_id: Some(1234),
            sequence: Some(42),
            message_type: Some(MessageType::Get as i32),
            ..Default::default()
        };
        let bytes = hdr.encode_to_vec();
        let back = Header::decode(bytes.as_slice()).unwrap();
        assert_eq!(back, hdr);
        assert_eq!(back.message_type(), MessageType::Get);
    }
}
