//! # 异或变换模块
//!
//! 可选的、可逆的字节变换：隐写前对消息异或，恢复后再异或一次即可还原。
//! 它只能起到混淆作用，不提供任何密码学意义上的保密性。

use crate::error::StegoError;

#[derive(Debug, Clone)]
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    pub fn new(key: &[u8]) -> Result<Self, StegoError> {
        if key.is_empty() {
            return Err(StegoError::EmptyKey);
        }

        Ok(Self { key: key.to_vec() })
    }

    /// 逐字节与循环密钥异或。该操作是自逆的。
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}
