//! # lsb_trace 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：以 `0x00` 结束标记界定消息的位流编解码、
//! 按固定顺序逐通道改写最低有效位的嵌入与提取，以及消息指纹 (key trace) 的生成。
//!
//! 核心函数均为纯函数，不做任何文件 I/O 或打印；诊断信息通过 `log` 门面输出，
//! 调用方安装日志器后才可见。

// 声明库包含的所有模块。

pub mod cipher;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod handler;
pub mod steganography;

pub use codec::{BitStream, Decoded};
pub use error::StegoError;
pub use fingerprint::Fingerprint;
pub use steganography::{EmbedOutcome, Embedding, Traversal, extract, hide, reveal};
