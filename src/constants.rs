/// 消息结束标记。
/// 隐写时追加在消息末尾，提取时遇到它即停止，因此无需额外存储消息长度。
pub const TERMINATOR: u8 = 0x00;

/// 每个字节包含的位数。
pub const BITS_PER_BYTE: usize = 8;

/// 每个像素中用于承载数据的通道数 (R, G, B)。
/// Alpha 通道始终原样保留，不参与隐写。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// RGBA8 像素在原始缓冲区中占用的字节数。
pub const RGBA_STRIDE: usize = 4;

/// 通道值的最低有效位掩码。
pub const LSB_MASK: u8 = 0x01;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_PREFIX: &str = "recovered_";

/// 未指定输出路径时，隐写结果图像使用的扩展名 (PNG 为无损格式)。
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// 恢复文本文件的扩展名。
pub const TEXT_EXTENSION: &str = "txt";
