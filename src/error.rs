//! # 错误类型模块
//!
//! 定义隐写核心 (编解码、嵌入、指纹、异或变换) 可能返回的全部错误。
//! 命令行层通过 `anyhow` 为这些错误附加上下文。

use thiserror::Error;

/// 隐写核心的错误类型。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StegoError {
    /// 消息 (含结束标记) 的位数超过了图像的承载容量。
    #[error("message needs {required} bits but the image only holds {capacity} bits")]
    CapacityExceeded { required: u64, capacity: u64 },

    /// 位索引超出了字节序列的范围。
    #[error("bit index {index} is out of range for {len} bytes")]
    BitIndexOutOfRange { index: usize, len: usize },

    /// 消息内部包含结束标记字节，提取时会在此处提前截断。
    #[error("message contains a 0x00 byte at position {position}, which is reserved as the terminator")]
    EmbeddedTerminator { position: usize },

    /// 异或密钥为空。
    #[error("XOR key must not be empty")]
    EmptyKey,

    /// 指纹字符串不是合法的 64 位十六进制 SHA-256 摘要。
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}
