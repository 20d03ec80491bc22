//! # 位流编解码模块
//!
//! 消息与位序列之间的确定性映射：
//!
//! * 编码时在消息末尾追加一个 `0x00` 结束标记，然后按字节顺序、
//!   每字节高位在前 (MSB-first) 逐位输出。
//! * 解码时每 8 位拼成一个字节，遇到 `0x00` 立即结束；
//!   位源耗尽仍未遇到结束标记时，返回 [`Decoded::Incomplete`]。

use crate::constants::{BITS_PER_BYTE, LSB_MASK, TERMINATOR};
use crate::error::StegoError;

/// 取出字节序列中第 `index` 位 (从 0 开始，每字节高位在前)。
///
/// # Errors
///
/// 当 `index >= 8 * bytes.len()` 时返回 [`StegoError::BitIndexOutOfRange`]。
pub fn bit_at(bytes: &[u8], index: usize) -> Result<u8, StegoError> {
    let byte = bytes
        .get(index / BITS_PER_BYTE)
        .ok_or(StegoError::BitIndexOutOfRange {
            index,
            len: bytes.len(),
        })?;
    let offset = index % BITS_PER_BYTE;

    Ok((byte >> (BITS_PER_BYTE - 1 - offset)) & LSB_MASK)
}

/// 带结束标记的消息的只读位视图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    terminated: Vec<u8>,
}

impl BitStream {
    /// 复制 `message` 并追加结束标记。空消息对应 8 个 0 位。
    pub fn new(message: &[u8]) -> Self {
        let mut terminated = Vec::with_capacity(message.len() + 1);
        terminated.extend_from_slice(message);
        terminated.push(TERMINATOR);

        Self { terminated }
    }

    /// 带结束标记的原始字节，也是指纹的计算对象。
    pub fn as_bytes(&self) -> &[u8] {
        &self.terminated
    }

    /// 总位数，即 `8 * (消息长度 + 1)`。
    pub fn len(&self) -> usize {
        self.terminated.len() * BITS_PER_BYTE
    }

    /// 结束标记总是存在，因此位流永远不为空。
    pub fn is_empty(&self) -> bool {
        self.terminated.is_empty()
    }

    pub fn bit_at(&self, index: usize) -> Result<u8, StegoError> {
        bit_at(&self.terminated, index)
    }

    /// 按顺序惰性产生每一位。
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        (0..self.len()).map(move |i| {
            let byte = self.terminated[i / BITS_PER_BYTE];
            (byte >> (BITS_PER_BYTE - 1 - i % BITS_PER_BYTE)) & LSB_MASK
        })
    }
}

/// 位流解码的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// 找到了结束标记；内容为标记之前的全部字节。
    Complete(Vec<u8>),
    /// 位源耗尽但没有遇到结束标记。
    /// `bytes` 是已拼好的完整字节，`dropped_bits` 是末尾被丢弃的不足一字节的位数。
    Incomplete { bytes: Vec<u8>, dropped_bits: u8 },
}

impl Decoded {
    pub fn is_complete(&self) -> bool {
        matches!(self, Decoded::Complete(_))
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Decoded::Complete(bytes) | Decoded::Incomplete { bytes, .. } => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Decoded::Complete(bytes) | Decoded::Incomplete { bytes, .. } => bytes,
        }
    }
}

/// 逐位拼装字节的状态机。
///
/// 每次 [`push`](Self::push) 一位；拼满一个字节且该字节为结束标记时返回
/// `Some(Decoded::Complete)`，此后调用方不应再继续推入。
#[derive(Debug, Default, Clone)]
pub struct ByteAssembler {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl ByteAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: u8) -> Option<Decoded> {
        self.current = (self.current << 1) | (bit & LSB_MASK);
        self.filled += 1;

        if usize::from(self.filled) < BITS_PER_BYTE {
            return None;
        }

        let byte = std::mem::take(&mut self.current);
        self.filled = 0;

        if byte == TERMINATOR {
            return Some(Decoded::Complete(std::mem::take(&mut self.bytes)));
        }

        self.bytes.push(byte);
        None
    }

    /// 位源已耗尽：以 [`Decoded::Incomplete`] 结束。
    pub fn finish(self) -> Decoded {
        Decoded::Incomplete {
            bytes: self.bytes,
            dropped_bits: self.filled,
        }
    }
}

/// 从位源中重建消息。遇到结束标记后不再读取后续的位。
pub fn deserialize<I>(bits: I) -> Decoded
where
    I: IntoIterator<Item = u8>,
{
    let mut assembler = ByteAssembler::new();

    for bit in bits {
        if let Some(decoded) = assembler.push(bit) {
            return decoded;
        }
    }

    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_eight_zero_bits() {
        let stream = BitStream::new(b"");
        assert_eq!(stream.len(), 8);
        assert!(stream.iter().all(|bit| bit == 0));
    }

    #[test]
    fn bits_are_msb_first() {
        // 'H' = 0x48 = 0100_1000
        let stream = BitStream::new(b"H");
        let bits: Vec<u8> = stream.iter().take(8).collect();
        assert_eq!(bits, [0, 1, 0, 0, 1, 0, 0, 0]);
        assert_eq!(stream.as_bytes(), b"H\0");
    }

    #[test]
    fn bit_at_matches_iter_and_rejects_out_of_range() {
        let stream = BitStream::new(b"\xA5z");
        for (i, bit) in stream.iter().enumerate() {
            assert_eq!(stream.bit_at(i), Ok(bit));
        }
        assert_eq!(
            bit_at(b"ab", 16),
            Err(StegoError::BitIndexOutOfRange { index: 16, len: 2 })
        );
    }

    #[test]
    fn deserialize_stops_at_terminator() {
        let stream = BitStream::new(b"HI");
        let mut consumed = 0;
        let bits = stream.iter().chain(std::iter::repeat(1)).inspect(|_| consumed += 1);

        assert_eq!(deserialize(bits), Decoded::Complete(b"HI".to_vec()));
        assert_eq!(consumed, 24);
    }

    #[test]
    fn exhausted_source_is_incomplete() {
        // 两个 0xFF 字节加 3 个多余的位
        let bits = std::iter::repeat(1).take(19);
        assert_eq!(
            deserialize(bits),
            Decoded::Incomplete {
                bytes: vec![0xFF, 0xFF],
                dropped_bits: 3,
            }
        );
    }

    #[test]
    fn partial_zero_bits_do_not_terminate() {
        let decoded = deserialize([0u8; 7]);
        assert!(!decoded.is_complete());
        assert!(decoded.bytes().is_empty());
    }
}
