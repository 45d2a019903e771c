//! Client connection options.

use std::time::Duration;

/// Default port for plain TCP connections.
pub const DEFAULT_PORT: u16 = 8123;

/// Default port for TLS connections.
pub const DEFAULT_TLS_PORT: u16 = 8443;

/// Everything needed to open a connection to one device.
///
/// ```
/// use kinetic_client::ClientOptions;
///
/// let options = ClientOptions {
///     host: "127.0.0.1".into(),
///     user: 1,
///     hmac_key: b"asdfasdf".to_vec(),
///     ..Default::default()
/// };
/// assert_eq!(options.port, 8123);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub host: String,
    pub port: u16,
    /// Identity the device knows the HMAC key under.
    pub user: i64,
    pub hmac_key: Vec<u8>,
    pub use_tls: bool,
    /// Cluster version the client assumes; a disagreeing device fails
    /// requests with `RemoteClusterVersionMismatch`.
    pub cluster_version: i64,
    /// Per-call wait bound for the blocking connection. `None` waits
    /// indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            user: 1,
            hmac_key: Vec::new(),
            use_tls: false,
            cluster_version: 0,
            timeout: None,
        }
    }
}
