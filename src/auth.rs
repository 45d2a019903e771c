//! HMAC-SHA1 authentication of command bytes.
//!
//! Every HMAC-authenticated envelope carries a 20-byte tag binding the
//! serialized command to the session key. The tag is computed over a
//! 4-byte big-endian length prefix followed by the command bytes, so an
//! empty command still produces a defined tag (prefix `0x00000000`).

use hmac::{Hmac, Mac};
use sha1::Sha1;

/// Tag length in bytes (SHA1 output).
pub const HMAC_SIZE: usize = 20;

type HmacSha1 = Hmac<Sha1>;

fn keyed(key: &[u8]) -> HmacSha1 {
    HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// Compute the tag for `command_bytes` under `key`.
pub fn compute_hmac(key: &[u8], command_bytes: &[u8]) -> [u8; HMAC_SIZE] {
    let mut mac = keyed(key);
    mac.update(&(command_bytes.len() as u32).to_be_bytes());
    mac.update(command_bytes);
    mac.finalize().into_bytes().into()
}

/// Verify an inbound tag in constant time.
pub fn verify_hmac(key: &[u8], command_bytes: &[u8], tag: &[u8]) -> bool {
    let mut mac = keyed(key);
    mac.update(&(command_bytes.len() as u32).to_be_bytes());
    mac.update(command_bytes);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto;
    use prost::Message as _;

    const KEY: &[u8] = b"asdfasdf";

    #[test]
    fn empty_command_vector() {
        let expected = [
            0xa7, 0x7a, 0x6a, 0xda, 0x5c, 0xe6, 0x7c, 0xf7, 0xae, 0xe4, 0x8a, 0x79, 0xd4, 0x86,
            0x6b, 0xb2, 0x71, 0x24, 0x18, 0x15,
        ];
        assert_eq!(compute_hmac(KEY, &[]), expected);
    }

    #[test]
    fn minimal_status_command_vector() {
        let expected = [
            0x40, 0x5f, 0x94, 0x9f, 0xc3, 0x50, 0xdc, 0x0b, 0x6a, 0x5a, 0x9d, 0x27, 0xa3, 0xca,
            0x44, 0x58, 0x9d, 0xb3, 0x4a, 0xcd,
        ];
        let cmd = proto::Command {
            status: Some(proto::Status {
                code: Some(proto::StatusCode::Success as i32),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(compute_hmac(KEY, &cmd.encode_to_vec()), expected);
    }

    #[test]
    fn deterministic() {
        let a = compute_hmac(KEY, b"same input");
        let b = compute_hmac(KEY, b"same input");
        assert_eq!(a, b);
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let tag = compute_hmac(KEY, b"payload");
        assert!(verify_hmac(KEY, b"payload", &tag));
        assert!(!verify_hmac(KEY, b"tampered", &tag));
        assert!(!verify_hmac(b"other key", b"payload", &tag));
        assert!(!verify_hmac(KEY, b"payload", &tag[..19]));
    }
}
