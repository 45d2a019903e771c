//! Command builder: deterministic mapping from typed inputs to
//! protocol-buffer command trees.
//!
//! Every builder returns an *unsigned* [`proto::Command`] carrying only
//! the message type and body; the network service stamps the session
//! fields (`cluster_version`, `connection_id`, `sequence`) into the
//! header at submit time and the identity travels in the envelope.

use crate::getlog::LogType;
use crate::proto;
use crate::types::{KeyRange, MediaOperation, P2PPushRequest, PowerLevel, Priority, Record};

/// Shell with the message type set and an empty header to stamp later.
fn new_command(message_type: proto::MessageType) -> proto::Command {
    proto::Command {
        header: Some(proto::Header {
            message_type: Some(message_type as i32),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn noop() -> proto::Command {
    new_command(proto::MessageType::Noop)
}

pub(crate) fn flush() -> proto::Command {
    new_command(proto::MessageType::FlushAllData)
}

/// Shared by Get, GetNext and GetPrevious: only the key travels.
pub(crate) fn get(key: &[u8], message_type: proto::MessageType) -> proto::Command {
    let mut cmd = new_command(message_type);
    cmd.body = Some(proto::Body {
        key_value: Some(proto::KeyValue {
            key: Some(key.to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn get_version(key: &[u8]) -> proto::Command {
    get(key, proto::MessageType::GetVersion)
}

pub(crate) fn put(entry: &Record) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Put);
    cmd.body = Some(proto::Body {
        key_value: Some(proto::KeyValue {
            key: Some(entry.key.clone()),
            db_version: non_empty(&entry.version),
            new_version: non_empty(&entry.new_version),
            tag: Some(entry.tag.clone()),
            algorithm: Some(entry.algorithm.to_proto() as i32),
            synchronization: Some(entry.sync.to_proto() as i32),
            force: Some(entry.force),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn delete(entry: &Record) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Delete);
    cmd.body = Some(proto::Body {
        key_value: Some(proto::KeyValue {
            key: Some(entry.key.clone()),
            db_version: non_empty(&entry.version),
            synchronization: Some(entry.sync.to_proto() as i32),
            force: Some(entry.force),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn get_key_range(range: &KeyRange) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::GetKeyRange);
    cmd.body = Some(proto::Body {
        range: Some(proto::Range {
            start_key: Some(range.start_key.clone()),
            end_key: Some(range.end_key.clone()),
            start_key_inclusive: Some(range.start_inclusive),
            end_key_inclusive: Some(range.end_inclusive),
            max_returned: Some(range.max as i32),
            reverse: Some(range.reverse),
            keys: Vec::new(),
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn get_log(types: &[LogType]) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::GetLog);
    cmd.body = Some(proto::Body {
        get_log: Some(proto::GetLog {
            types: types.iter().map(|t| t.to_proto() as i32).collect(),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

/// Media scan and optimize share the range body; the priority rides in
/// the header so the device can schedule the work.
pub(crate) fn media_operation(
    op: &MediaOperation,
    priority: Priority,
    message_type: proto::MessageType,
) -> proto::Command {
    let mut cmd = new_command(message_type);
    if let Some(header) = cmd.header.as_mut() {
        header.priority = Some(priority.to_proto() as i32);
    }
    cmd.body = Some(proto::Body {
        range: Some(proto::Range {
            start_key: Some(op.start_key.clone()),
            end_key: Some(op.end_key.clone()),
            start_key_inclusive: Some(op.start_inclusive),
            end_key_inclusive: Some(op.end_inclusive),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn set_cluster_version(version: i64) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Setup);
    cmd.body = Some(proto::Body {
        setup: Some(proto::Setup {
            new_cluster_version: Some(version),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

/// The firmware image itself travels as the frame's value payload.
pub(crate) fn firmware_download() -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Setup);
    cmd.body = Some(proto::Body {
        setup: Some(proto::Setup {
            firmware_download: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn pin_operation(op: proto::PinOpType) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::PinOp);
    cmd.body = Some(proto::Body {
        pin_op: Some(proto::PinOperation {
            pin_op_type: Some(op as i32),
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn set_lock_pin(current: &[u8], new: &[u8]) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Security);
    cmd.body = Some(proto::Body {
        security: Some(proto::Security {
            old_lock_pin: Some(current.to_vec()),
            new_lock_pin: Some(new.to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn set_erase_pin(current: &[u8], new: &[u8]) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::Security);
    cmd.body = Some(proto::Body {
        security: Some(proto::Security {
            old_erase_pin: Some(current.to_vec()),
            new_erase_pin: Some(new.to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn p2p_push(request: &P2PPushRequest) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::PeerToPeerPush);
    cmd.body = Some(proto::Body {
        p2p_operation: Some(proto::P2pOperation {
            peer: Some(proto::Peer {
                hostname: Some(request.peer.hostname.clone()),
                port: Some(request.peer.port as i32),
                tls: Some(request.peer.tls),
            }),
            operation: request
                .operations
                .iter()
                .map(|op| proto::P2pOperationEntry {
                    key: Some(op.key.clone()),
                    version: non_empty(&op.version),
                    new_key: non_empty(&op.new_key),
                    force: Some(op.force),
                    ..Default::default()
                })
                .collect(),
            all_child_operations_succeeded: None,
        }),
        ..Default::default()
    });
    cmd
}

pub(crate) fn set_power_level(level: PowerLevel) -> proto::Command {
    let mut cmd = new_command(proto::MessageType::SetPowerLevel);
    cmd.body = Some(proto::Body {
        power: Some(proto::Power {
            level: Some(level.to_proto() as i32),
        }),
        ..Default::default()
    });
    cmd
}

fn non_empty(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.is_empty() {
        None
    } else {
        Some(bytes.to_vec())
    }
}
