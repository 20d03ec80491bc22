//! # 指纹模块
//!
//! 对带结束标记的消息计算 SHA-256 摘要 ("key trace")，供调用方留档或独立比对。
//! 核心流程本身从不校验指纹。

use crate::constants::TERMINATOR;
use crate::error::StegoError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA-256 摘要的字节长度。
pub const FINGERPRINT_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// 对给定字节 (应已包含结束标记) 原样计算摘要。
    pub fn of(terminated: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(terminated);
        Self(hasher.finalize().into())
    }

    /// 先为 `message` 追加结束标记再计算摘要，用于解码后重新生成指纹。
    pub fn of_message(message: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(message);
        hasher.update([TERMINATOR]);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digest = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(s.trim(), &mut digest)
            .map_err(|e| StegoError::InvalidFingerprint(e.to_string()))?;
        Ok(Self(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_of_empty_terminated_message() {
        // sha256(0x00)
        assert_eq!(
            Fingerprint::of(b"\0").to_hex(),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn deterministic_and_distinct() {
        assert_eq!(Fingerprint::of(b"HI\0"), Fingerprint::of(b"HI\0"));
        assert_ne!(Fingerprint::of(b"HI\0"), Fingerprint::of(b"Hi\0"));
        assert_eq!(Fingerprint::of_message(b"HI"), Fingerprint::of(b"HI\0"));
    }

    #[test]
    fn hex_round_trip_and_rejects_garbage() {
        let print = Fingerprint::of(b"HI\0");
        let parsed: Fingerprint = format!("  {print}\n").parse().unwrap();
        assert_eq!(parsed, print);

        assert!(matches!(
            "abcd".parse::<Fingerprint>(),
            Err(StegoError::InvalidFingerprint(_))
        ));
        assert!("zz".repeat(32).parse::<Fingerprint>().is_err());
    }
}
