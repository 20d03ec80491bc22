use crate::codec::{self, BitStream, Decoded};
use crate::constants::{BITS_PER_BYTE, CHANNELS_PER_PIXEL, LSB_MASK, RGBA_STRIDE, TERMINATOR};
use crate::error::StegoError;
use crate::fingerprint::Fingerprint;
use image::RgbaImage;

/// 遍历通道槽位的顺序。隐写与提取必须使用同一种顺序。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    /// 自上而下逐行，行内自左向右；每个像素内按 R, G, B。
    #[default]
    RowMajor,
    /// 自左向右逐列，列内自上而下；每个像素内按 R, G, B。
    ColumnMajor,
}

/// 消息超出图像容量时被截断的记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub required: u64,
    pub capacity: u64,
}

impl From<CapacityExceeded> for StegoError {
    fn from(c: CapacityExceeded) -> Self {
        StegoError::CapacityExceeded {
            required: c.required,
            capacity: c.capacity,
        }
    }
}

/// 一次隐写产生的图像及其附带信息。
#[derive(Debug, Clone)]
pub struct Embedding {
    pub image: RgbaImage,
    pub bits_written: u64,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone)]
pub enum EmbedOutcome {
    Complete(Embedding),
    /// 只写入了前 `capacity` 位，结束标记丢失，提取时将得到 `Incomplete`。
    Truncated {
        embedding: Embedding,
        overflow: CapacityExceeded,
    },
}

impl EmbedOutcome {
    pub fn embedding(&self) -> &Embedding {
        match self {
            EmbedOutcome::Complete(embedding) | EmbedOutcome::Truncated { embedding, .. } => {
                embedding
            }
        }
    }

    pub fn into_embedding(self) -> Embedding {
        match self {
            EmbedOutcome::Complete(embedding) | EmbedOutcome::Truncated { embedding, .. } => {
                embedding
            }
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, EmbedOutcome::Truncated { .. })
    }

    pub fn into_result(self) -> Result<Embedding, StegoError> {
        match self {
            EmbedOutcome::Complete(embedding) => Ok(embedding),
            EmbedOutcome::Truncated { overflow, .. } => Err(overflow.into()),
        }
    }
}

/// 图像可承载的位数：`宽 * 高 * 3`。
pub fn capacity(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) * CHANNELS_PER_PIXEL as u64
}

/// 给定容量 (位) 下可隐藏的最大消息字节数，需为结束标记预留一个字节。
pub fn usable_bytes(capacity_bits: u64) -> u64 {
    (capacity_bits / BITS_PER_BYTE as u64).saturating_sub(1)
}

fn channel_offsets(width: u32, height: u32, traversal: Traversal) -> impl Iterator<Item = usize> {
    let (w, h) = (width as usize, height as usize);

    let pixels: Box<dyn Iterator<Item = usize>> = match traversal {
        Traversal::RowMajor => Box::new(0..w * h),
        Traversal::ColumnMajor => {
            Box::new((0..w).flat_map(move |x| (0..h).map(move |y| y * w + x)))
        }
    };

    pixels.flat_map(|pixel| {
        (0..CHANNELS_PER_PIXEL).map(move |channel| pixel * RGBA_STRIDE + channel)
    })
}

pub fn embed(
    grid: &RgbaImage,
    bits: &BitStream,
    traversal: Traversal,
) -> (RgbaImage, u64, Option<CapacityExceeded>) {
    let mut out = grid.clone();
    let (width, height) = out.dimensions();
    let capacity = capacity(width, height);
    let required = bits.len() as u64;

    let raw: &mut [u8] = &mut out;
    let mut written = 0u64;

    for (offset, bit) in channel_offsets(width, height, traversal).zip(bits.iter()) {
        raw[offset] = (raw[offset] & !LSB_MASK) | bit;
        written += 1;
    }

    log::debug!("embedded {written}/{required} bits into {width}x{height} image ({traversal:?})");

    let overflow = (required > capacity).then(|| {
        log::warn!("message truncated: {required} bits required, capacity is {capacity}");
        CapacityExceeded { required, capacity }
    });

    (out, written, overflow)
}

pub fn extract(grid: &RgbaImage, traversal: Traversal) -> Decoded {
    let (width, height) = grid.dimensions();
    let raw: &[u8] = grid;

    let decoded = codec::deserialize(
        channel_offsets(width, height, traversal).map(|offset| raw[offset] & LSB_MASK),
    );

    match &decoded {
        Decoded::Complete(bytes) => log::debug!("recovered {} bytes", bytes.len()),
        Decoded::Incomplete { bytes, dropped_bits } => log::debug!(
            "no terminator in {width}x{height} image: {} bytes assembled, {dropped_bits} bits dropped",
            bytes.len()
        ),
    }

    decoded
}

pub fn hide(
    grid: &RgbaImage,
    message: &[u8],
    traversal: Traversal,
) -> Result<EmbedOutcome, StegoError> {
    if let Some(position) = message.iter().position(|&b| b == TERMINATOR) {
        return Err(StegoError::EmbeddedTerminator { position });
    }

    let bits = BitStream::new(message);
    let fingerprint = Fingerprint::of(bits.as_bytes());
    let (image, bits_written, overflow) = embed(grid, &bits, traversal);

    let embedding = Embedding {
        image,
        bits_written,
        fingerprint,
    };

    Ok(match overflow {
        None => EmbedOutcome::Complete(embedding),
        Some(overflow) => EmbedOutcome::Truncated { embedding, overflow },
    })
}

pub fn reveal(grid: &RgbaImage, traversal: Traversal) -> Decoded {
    extract(grid, traversal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn patterned(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) as u8;
            Rgba([v, v.wrapping_add(85), v.wrapping_add(170), 200 + (x % 50) as u8])
        })
    }

    #[test]
    fn hi_on_ten_by_ten() {
        let grid = patterned(10, 10);
        assert_eq!(capacity(10, 10), 300);

        let outcome = hide(&grid, b"HI", Traversal::RowMajor).unwrap();
        assert!(!outcome.is_truncated());

        let embedding = outcome.into_result().unwrap();
        assert_eq!(embedding.bits_written, 24);
        assert_eq!(embedding.fingerprint, Fingerprint::of(b"HI\0"));

        // 24 位恰好占满前 8 个像素
        let raw: &[u8] = &embedding.image;
        let original: &[u8] = &grid;
        assert_eq!(&raw[8 * RGBA_STRIDE..], &original[8 * RGBA_STRIDE..]);

        assert_eq!(
            reveal(&embedding.image, Traversal::RowMajor),
            Decoded::Complete(b"HI".to_vec())
        );
    }

    #[test]
    fn source_grid_and_alpha_are_untouched() {
        let grid = patterned(9, 7);
        let before = grid.clone();

        let embedding = hide(&grid, b"odd-sized payload", Traversal::RowMajor)
            .unwrap()
            .into_embedding();

        assert_eq!(grid, before);
        for (new, old) in embedding.image.pixels().zip(grid.pixels()) {
            assert_eq!(new[3], old[3]);
            for c in 0..3 {
                assert!(new[c] ^ old[c] <= 1);
            }
        }
    }

    #[test]
    fn bits_are_not_pixel_aligned() {
        // 8 位：第 3 个像素只写入 R, G
        let grid = RgbaImage::from_pixel(4, 1, Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
        let (out, written, overflow) = embed(&grid, &BitStream::new(b""), Traversal::RowMajor);

        assert_eq!(written, 8);
        assert!(overflow.is_none());
        assert_eq!(out.get_pixel(2, 0).0, [0xFE, 0xFE, 0xFF, 0xFF]);
        assert_eq!(out.get_pixel(3, 0).0, [0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn exact_fit_round_trips_and_one_more_byte_truncates() {
        // 容量 24 位，恰好容纳 2 字节消息 + 结束标记
        let grid = patterned(4, 2);

        let fit = hide(&grid, b"ok", Traversal::RowMajor).unwrap();
        assert!(!fit.is_truncated());
        assert_eq!(
            reveal(&fit.embedding().image, Traversal::RowMajor),
            Decoded::Complete(b"ok".to_vec())
        );

        let over = hide(&grid, b"ok!", Traversal::RowMajor).unwrap();
        assert!(over.is_truncated());
        assert_eq!(over.embedding().bits_written, 24);
        assert!(!reveal(&over.embedding().image, Traversal::RowMajor).is_complete());
        assert_eq!(
            over.into_result().unwrap_err(),
            StegoError::CapacityExceeded {
                required: 32,
                capacity: 24,
            }
        );
    }

    #[test]
    fn usable_bytes_reserves_the_terminator() {
        assert_eq!(usable_bytes(capacity(10, 10)), 36);
        assert_eq!(usable_bytes(capacity(4, 2)), 2);
        assert_eq!(usable_bytes(capacity(1, 1)), 0);
        assert_eq!(usable_bytes(0), 0);
    }

    #[test]
    fn column_major_round_trip_differs_from_row_major() {
        let grid = patterned(6, 9);
        let message = b"column order";

        let embedding = hide(&grid, message, Traversal::ColumnMajor)
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(
            reveal(&embedding.image, Traversal::ColumnMajor),
            Decoded::Complete(message.to_vec())
        );
        assert_ne!(
            reveal(&embedding.image, Traversal::RowMajor),
            Decoded::Complete(message.to_vec())
        );
    }

    #[test]
    fn empty_message_round_trips() {
        let grid = patterned(3, 3);
        let embedding = hide(&grid, b"", Traversal::RowMajor)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(
            reveal(&embedding.image, Traversal::RowMajor),
            Decoded::Complete(Vec::new())
        );
    }

    #[test]
    fn embedded_zero_byte_is_rejected() {
        let grid = patterned(10, 10);
        assert_eq!(
            hide(&grid, b"a\0b", Traversal::RowMajor).unwrap_err(),
            StegoError::EmbeddedTerminator { position: 1 }
        );
    }

    #[test]
    fn grid_without_terminator_is_incomplete() {
        let grid = RgbaImage::from_pixel(3, 1, Rgba([1, 1, 1, 0]));
        assert_eq!(
            extract(&grid, Traversal::RowMajor),
            Decoded::Incomplete {
                bytes: vec![0xFF],
                dropped_bits: 1,
            }
        );
    }
}
