//! In-process mock Kinetic device for integration tests.
//!
//! Speaks the real wire protocol over TCP: unsolicited-status
//! handshake, HMAC-authenticated envelopes, and a small in-memory
//! key-value store with version checking. Enough device behavior to
//! exercise every client operation end to end.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use prost::Message as _;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex as AsyncMutex;

use kinetic_client::auth::compute_hmac;
use kinetic_client::frame::{encode_frame, read_frame, FrameLimits};
use kinetic_client::proto;

pub const HMAC_KEY: &[u8] = b"asdfasdf";

pub const MAX_KEY_SIZE: u32 = 4096;
pub const MAX_VALUE_SIZE: u32 = 1024 * 1024;

#[derive(Clone, Default)]
struct StoredObject {
    value: Vec<u8>,
    version: Vec<u8>,
    tag: Vec<u8>,
    algorithm: Option<i32>,
}

#[derive(Default)]
struct DeviceState {
    cluster_version: i64,
    store: BTreeMap<Vec<u8>, StoredObject>,
    /// Responses to GETs of this key are delayed by the duration.
    slow_key: Option<(Vec<u8>, Duration)>,
}

pub struct MockDevice {
    addr: SocketAddr,
    state: Arc<Mutex<DeviceState>>,
}

impl MockDevice {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(DeviceState::default()));
        let connection_ids = Arc::new(AtomicI64::new(1000));

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let state = accept_state.clone();
                let connection_id = connection_ids.fetch_add(1, Ordering::Relaxed);
                tokio::spawn(serve_connection(socket, state, connection_id));
            }
        });

        MockDevice { addr, state }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Delay responses to GETs of `key`, so completions arrive out of
    /// order and blocking timeouts can be provoked.
    pub fn set_slow_key(&self, key: &[u8], delay: Duration) {
        self.state.lock().unwrap().slow_key = Some((key.to_vec(), delay));
    }
}

async fn serve_connection(socket: TcpStream, state: Arc<Mutex<DeviceState>>, connection_id: i64) {
    let (mut reader, writer) = socket.into_split();
    let writer = Arc::new(AsyncMutex::new(writer));

    // Handshake: one unsolicited status carrying the session identity.
    let cluster_version = state.lock().unwrap().cluster_version;
    let handshake = proto::Command {
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
    let envelope = proto::Message {
        auth_type: Some(proto::AuthType::UnsolicitedStatus as i32),
        command_bytes: Some(handshake.encode_to_vec()),
        ..Default::default()
    };
    if write_frame(&writer, &encode_frame(&envelope.encode_to_vec(), &[]))
        .await
        .is_err()
    {
        return;
    }

    let limits = FrameLimits::default();
    loop {
        let Ok(frame) = read_frame(&mut reader, &limits).await else {
            return;
        };
        let Ok(message) = proto::Message::decode(frame.message.as_ref()) else {
            return;
        };
        let command_bytes = message.command_bytes.clone().unwrap_or_default();
        let Ok(command) = proto::Command::decode(command_bytes.as_slice()) else {
            return;
        };

        if message.auth_type() == proto::AuthType::HmacAuth {
            let tag = message
                .hmac_auth
                .as_ref()
                .and_then(|h| h.hmac.clone())
                .unwrap_or_default();
            if tag != compute_hmac(HMAC_KEY, &command_bytes) {
                respond(
                    &writer,
                    &command,
                    failure(proto::StatusCode::HmacFailure, "HMAC did not verify"),
                    None,
                    Vec::new(),
                )
                .await;
                continue;
            }
        }

        let delay = response_delay(&state, &command);
        let (status, body, value) = handle_command(&state, &command, frame.value.to_vec());
        if let Some(delay) = delay {
            let writer = writer.clone();
            let command = command.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                respond(&writer, &command, status, body, value).await;
            });
        } else {
            respond(&writer, &command, status, body, value).await;
        }
    }
}

fn response_delay(state: &Mutex<DeviceState>, command: &proto::Command) -> Option<Duration> {
    let message_type = command.header.as_ref()?.message_type();
    if message_type != proto::MessageType::Get {
        return None;
    }
    let key = command
        .body
        .as_ref()?
        .key_value
        .as_ref()?
        .key
        .as_deref()?
        .to_vec();
    let state = state.lock().unwrap();
    let (slow_key, delay) = state.slow_key.as_ref()?;
    (*slow_key == key).then_some(*delay)
}

fn success() -> proto::Status {
    proto::Status {
        code: Some(proto::StatusCode::Success as i32),
        ..Default::default()
    }
}

fn failure(code: proto::StatusCode, message: &str) -> proto::Status {
    proto::Status {
        code: Some(code as i32),
        status_message: Some(message.to_string()),
        ..Default::default()
    }
}

/// Dispatch one command against the store. Returns status, optional
/// response body, and the value payload to append.
fn handle_command(
    state: &Mutex<DeviceState>,
    command: &proto::Command,
    value: Vec<u8>,
) -> (proto::Status, Option<proto::Body>, Vec<u8>) {
    use proto::MessageType as M;

    let header = command.header.clone().unwrap_or_default();
    let mut state = state.lock().unwrap();

    if header.cluster_version.unwrap_or_default() != state.cluster_version {
        return (
            failure(proto::StatusCode::VersionFailure, "CLUSTER_VERSION_FAILURE"),
            None,
            Vec::new(),
        );
    }

    let kv = command.body.as_ref().and_then(|b| b.key_value.as_ref());
    let key = kv
        .and_then(|kv| kv.key.clone())
        .unwrap_or_default();

    match header.message_type() {
        M::Noop | M::FlushAllData | M::MediaScan | M::MediaOptimize | M::Security | M::PinOp
        | M::SetPowerLevel | M::StartBatch | M::EndBatch | M::AbortBatch => {
            (success(), None, Vec::new())
        }

        M::Put => {
            let kv = kv.cloned().unwrap_or_default();
            let force = kv.force.unwrap_or_default();
            if !force {
                if let Some(stored) = state.store.get(&key) {
                    if stored.version != kv.db_version.clone().unwrap_or_default() {
                        return (
                            failure(proto::StatusCode::VersionMismatch, "version mismatch"),
                            None,
                            Vec::new(),
                        );
                    }
                }
            }
            state.store.insert(
                key,
                StoredObject {
                    value,
                    version: kv.new_version.clone().unwrap_or_default(),
                    tag: kv.tag.clone().unwrap_or_default(),
                    algorithm: kv.algorithm,
                },
            );
            (success(), None, Vec::new())
        }

        M::Delete => {
            let kv = kv.cloned().unwrap_or_default();
            let force = kv.force.unwrap_or_default();
            match state.store.get(&key).map(|stored| stored.version.clone()) {
                None => (
                    failure(proto::StatusCode::NotFound, "no such key"),
                    None,
                    Vec::new(),
                ),
                Some(stored_version) => {
                    if !force && stored_version != kv.db_version.clone().unwrap_or_default() {
                        return (
                            failure(proto::StatusCode::VersionMismatch, "version mismatch"),
                            None,
                            Vec::new(),
                        );
                    }
                    state.store.remove(&key);
                    (success(), None, Vec::new())
                }
            }
        }

        M::Get => match state.store.get(&key) {
            None => (
                failure(proto::StatusCode::NotFound, "no such key"),
                None,
                Vec::new(),
            ),
            Some(stored) => record_response(&key, stored),
        },

        M::GetNext => {
            let next = state
                .store
                .range::<Vec<u8>, _>((Bound::Excluded(&key), Bound::Unbounded))
                .next();
            match next {
                None => (
                    failure(proto::StatusCode::NotFound, "no next key"),
                    None,
                    Vec::new(),
                ),
                Some((next_key, stored)) => record_response(next_key, stored),
            }
        }

        M::GetPrevious => {
            let previous = state
                .store
                .range::<Vec<u8>, _>((Bound::Unbounded, Bound::Excluded(&key)))
                .next_back();
            match previous {
                None => (
                    failure(proto::StatusCode::NotFound, "no previous key"),
                    None,
                    Vec::new(),
                ),
                Some((prev_key, stored)) => record_response(prev_key, stored),
            }
        }

        M::GetVersion => match state.store.get(&key) {
            None => (
                failure(proto::StatusCode::NotFound, "no such key"),
                None,
                Vec::new(),
            ),
            Some(stored) => (
                success(),
                Some(proto::Body {
                    key_value: Some(proto::KeyValue {
                        db_version: Some(stored.version.clone()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                Vec::new(),
            ),
        },

        M::GetKeyRange => {
            let range = command
                .body
                .as_ref()
                .and_then(|b| b.range.clone())
                .unwrap_or_default();
            let keys = select_range(&state.store, &range);
            (
                success(),
                Some(proto::Body {
                    range: Some(proto::Range {
                        keys,
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                Vec::new(),
            )
        }

        M::GetLog => {
            let requested = command
                .body
                .as_ref()
                .and_then(|b| b.get_log.as_ref())
                .map(|gl| gl.types.clone())
                .unwrap_or_default();
            (
                success(),
                Some(proto::Body {
                    get_log: Some(build_log(&requested)),
                    ..Default::default()
                }),
                Vec::new(),
            )
        }

        M::Setup => {
            let setup = command
                .body
                .as_ref()
                .and_then(|b| b.setup.clone())
                .unwrap_or_default();
            if let Some(new_cluster_version) = setup.new_cluster_version {
                state.cluster_version = new_cluster_version;
            }
            (success(), None, Vec::new())
        }

        M::PeerToPeerPush => {
            let operations = command
                .body
                .as_ref()
                .and_then(|b| b.p2p_operation.as_ref())
                .map(|p2p| p2p.operation.len())
                .unwrap_or_default();
            let entries = (0..operations)
                .map(|_| proto::P2pOperationEntry {
                    status: Some(success()),
                    ..Default::default()
                })
                .collect();
            (
                success(),
                Some(proto::Body {
                    p2p_operation: Some(proto::P2pOperation {
                        operation: entries,
                        all_child_operations_succeeded: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                Vec::new(),
            )
        }

        _ => (
            failure(proto::StatusCode::InvalidRequest, "unsupported operation"),
            None,
            Vec::new(),
        ),
    }
}

fn record_response(
    key: &[u8],
    stored: &StoredObject,
) -> (proto::Status, Option<proto::Body>, Vec<u8>) {
    (
        success(),
        Some(proto::Body {
            key_value: Some(proto::KeyValue {
                key: Some(key.to_vec()),
                db_version: Some(stored.version.clone()),
                tag: Some(stored.tag.clone()),
                algorithm: stored.algorithm,
                ..Default::default()
            }),
            ..Default::default()
        }),
        stored.value.clone(),
    )
}

fn select_range(store: &BTreeMap<Vec<u8>, StoredObject>, range: &proto::Range) -> Vec<Vec<u8>> {
    let start = range.start_key.clone().unwrap_or_default();
    let end = range.end_key.clone().unwrap_or_default();
    let start_bound = if range.start_key_inclusive.unwrap_or_default() {
        Bound::Included(&start)
    } else {
        Bound::Excluded(&start)
    };
    let end_bound = if range.end_key_inclusive.unwrap_or_default() {
        Bound::Included(&end)
    } else {
        Bound::Excluded(&end)
    };
    let max = range.max_returned.unwrap_or_default().max(0) as usize;
    let selected = store.range::<Vec<u8>, _>((start_bound, end_bound));
    if range.reverse.unwrap_or_default() {
        selected.rev().take(max).map(|(k, _)| k.clone()).collect()
    } else {
        selected.take(max).map(|(k, _)| k.clone()).collect()
    }
}

fn build_log(requested: &[i32]) -> proto::GetLog {
    let mut log = proto::GetLog::default();
    for raw in requested {
        match proto::LogType::try_from(*raw) {
            Ok(proto::LogType::Limits) => {
                log.limits = Some(proto::Limits {
                    max_key_size: Some(MAX_KEY_SIZE),
                    max_value_size: Some(MAX_VALUE_SIZE),
                    max_version_size: Some(2048),
                    max_tag_size: Some(128),
                    max_connections: Some(200),
                    max_outstanding_read_requests: Some(32),
                    max_outstanding_write_requests: Some(32),
                    max_message_size: Some(1024 * 1024),
                    max_key_range_count: Some(200),
                    max_identity_count: Some(16),
                    max_pin_size: Some(32),
                    max_operation_count_per_batch: Some(15),
                    max_batch_count_per_device: Some(5),
                });
            }
            Ok(proto::LogType::Capacities) => {
                log.capacity = Some(proto::Capacity {
                    nominal_capacity_in_bytes: Some(4_000_000_000_000),
                    portion_full: Some(0.5),
                });
            }
            Ok(proto::LogType::Utilizations) => {
                log.utilizations = vec![proto::Utilization {
                    name: Some("HDA".into()),
                    value: Some(0.4),
                }];
            }
            Ok(proto::LogType::Temperatures) => {
                log.temperatures = vec![proto::Temperature {
                    name: Some("HDA".into()),
                    current: Some(35.0),
                    minimum: Some(5.0),
                    maximum: Some(60.0),
                    target: Some(25.0),
                }];
            }
            Ok(proto::LogType::Configuration) => {
                log.configuration = Some(proto::Configuration {
                    vendor: Some("MockVendor".into()),
                    model: Some("MockDrive".into()),
                    version: Some("0.1".into()),
                    port: Some(8123),
                    tls_port: Some(8443),
                    ..Default::default()
                });
            }
            Ok(proto::LogType::Statistics) => {
                log.statistics = vec![proto::Statistics {
                    message_type: Some(proto::MessageType::Put as i32),
                    count: Some(1),
                    bytes: Some(7),
                }];
            }
            Ok(proto::LogType::Messages) => {
                log.messages = Some(b"mock device log".to_vec());
            }
            Ok(proto::LogType::Device) => {
                log.device = Some(proto::DeviceLog {
                    name: Some(b"com.mock.device".to_vec()),
                });
            }
            _ => {}
        }
    }
    log
}

async fn respond(
    writer: &Arc<AsyncMutex<tokio::net::tcp::OwnedWriteHalf>>,
    request: &proto::Command,
    status: proto::Status,
    body: Option<proto::Body>,
    value: Vec<u8>,
) {
    let request_header = request.header.clone().unwrap_or_default();
    let response = proto::Command {
        header: Some(proto::Header {
            ack_sequence: request_header.sequence,
            connection_id: request_header.connection_id,
            message_type: Some(request_header.message_type().response() as i32),
            ..Default::default()
        }),
        body,
        status: Some(status),
    };
    let command_bytes = response.encode_to_vec();
    let envelope = proto::Message {
        auth_type: Some(proto::AuthType::HmacAuth as i32),
        hmac_auth: Some(proto::HmacAuth {
            identity: Some(1),
            hmac: Some(compute_hmac(HMAC_KEY, &command_bytes).to_vec()),
        }),
        command_bytes: Some(command_bytes),
        ..Default::default()
    };
    let _ = write_frame(writer, &encode_frame(&envelope.encode_to_vec(), &value)).await;
}

async fn write_frame(
    writer: &Arc<AsyncMutex<tokio::net::tcp::OwnedWriteHalf>>,
    bytes: &[u8],
) -> std::io::Result<()> {
    let mut writer = writer.lock().await;
    writer.write_all(bytes).await?;
    writer.flush().await
}
