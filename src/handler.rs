//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cipher::XorCipher;
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::codec::Decoded;
use crate::constants::{DEFAULT_IMAGE_EXTENSION, DOCTORED_PREFIX, RECOVERED_PREFIX, TEXT_EXTENSION};
use crate::fingerprint::Fingerprint;
use crate::steganography::{EmbedOutcome, capacity, hide, reveal, usable_bytes};
use anyhow::{Context, Result};
use colored::Colorize;
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// 在输入文件所在目录下生成 `<前缀><文件名>.<扩展名>` 形式的默认输出路径。
fn default_output(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 除非指定了 `--force`，否则拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}\nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );

    Ok(())
}

/// 根据扩展名确定输出格式，只接受无损格式。
///
/// 有损格式会破坏每一个被改写的最低有效位，因此必须在写出前拒绝。
fn lossless_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported output format: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    match format {
        ImageFormat::Png
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP
        | ImageFormat::Qoi => Ok(format),
        other => anyhow::bail!(
            "Unsupported output format: {:?} is not a lossless format supported for output ({})",
            other,
            path.to_string_lossy().red().bold()
        ),
    }
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

fn cipher_for(key: Option<&str>) -> Result<Option<XorCipher>> {
    key.map(|key| XorCipher::new(key.as_bytes()))
        .transpose()
        .context("Invalid XOR key.")
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和消息、调用隐写核心函数、检查容量，
/// 最后将结果图像与消息指纹写出。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径及选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 目标扩展名不是无损图像格式。
/// * 无法读取输入的图像或文本文件。
/// * 消息中包含保留的 `0x00` 字节。
/// * 图像没有足够的空间且未指定 `--allow-truncation`。
/// * 无法写入目标图像或指纹文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| default_output(&args.image, DOCTORED_PREFIX, DEFAULT_IMAGE_EXTENSION));

    ensure_writable(&dest, args.force)?;
    if let Some(trace) = &args.trace {
        ensure_writable(trace, args.force)?;
    }
    let format = lossless_format(&dest)?;

    let message = match (&args.text, args.message) {
        (Some(path), _) => fs::read(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message.into_bytes(),
        (None, None) => anyhow::bail!("No message given. Use --text or --message."),
    };

    let message = match cipher_for(args.key.as_deref())? {
        Some(cipher) => cipher.apply(&message),
        None => message,
    };

    let source = load_image(&args.image)?;
    let keep_alpha = source.color().has_alpha();
    let grid = source.to_rgba8();

    log::info!(
        "hiding {} bytes in {}x{} image ({:?})",
        message.len(),
        grid.width(),
        grid.height(),
        args.order
    );

    let outcome = hide(&grid, &message, args.order.into()).with_context(|| {
        if args.key.is_some() {
            "The message cannot be hidden. \nXOR with this key produced a 0x00 byte; choose a different key."
        } else {
            "The message cannot be hidden. \nIt contains a 0x00 byte, which marks the end of a message."
        }
    })?;

    if let EmbedOutcome::Truncated { overflow, .. } = &outcome {
        anyhow::ensure!(
            args.allow_truncation,
            "Not enough space in the image to hide the text. \nRequired: {} bits, Available: {} bits",
            overflow.required.to_string().red().bold(),
            overflow.capacity.to_string().green().bold()
        );

        println!(
            "{} only {} of {} bits were written; the hidden message will not be recoverable in full.",
            "Warning:".yellow().bold(),
            overflow.capacity.to_string().yellow(),
            overflow.required.to_string().yellow()
        );
    }

    let embedding = outcome.into_embedding();
    let output = if keep_alpha {
        DynamicImage::ImageRgba8(embedding.image)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(embedding.image).to_rgb8())
    };

    output.save_with_format(&dest, format).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    if let Some(trace) = &args.trace {
        // 指纹写入失败时删除已写出的图像，避免留下不完整的结果
        if let Err(e) = fs::write(trace, embedding.fingerprint.to_hex()) {
            if let Err(cleanup) = fs::remove_file(&dest) {
                log::warn!("unable to remove {}: {cleanup}", dest.display());
            }
            return Err(e).with_context(|| {
                format!(
                    "Unable to write key trace file: {}",
                    trace.to_string_lossy().red().bold()
                )
            });
        }
        log::info!("key trace written to {}", trace.display());
    }

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!(
        "Key trace (SHA-256): {}",
        embedding.fingerprint.to_string().cyan()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、提取消息、可选地校验指纹并还原异或混淆，
/// 最后将恢复的内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径及选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中没有结束标记且未指定 `--allow-incomplete`。
/// * 给出的期望指纹无效或与恢复内容不一致。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let text_path = args
        .text
        .unwrap_or_else(|| default_output(&args.image, RECOVERED_PREFIX, TEXT_EXTENSION));

    ensure_writable(&text_path, args.force)?;
    let cipher = cipher_for(args.key.as_deref())?;

    let expected = args
        .expect
        .as_deref()
        .map(str::parse::<Fingerprint>)
        .transpose()
        .context("The expected key trace is not a valid SHA-256 hex digest.")?;

    let grid = load_image(&args.image)?.to_rgba8();

    let embedded = match reveal(&grid, args.order.into()) {
        Decoded::Complete(bytes) => bytes,
        Decoded::Incomplete {
            bytes,
            dropped_bits,
        } => {
            anyhow::ensure!(
                args.allow_incomplete,
                "No terminator found in '{}'. \nThe image may not contain a hidden message, or the message was truncated.",
                args.image.to_string_lossy().red().bold()
            );

            println!(
                "{} no terminator found; saving {} best-effort bytes ({} trailing bits dropped).",
                "Warning:".yellow().bold(),
                bytes.len().to_string().yellow(),
                dropped_bits
            );
            bytes
        }
    };

    let fingerprint = Fingerprint::of_message(&embedded);
    if let Some(expected) = expected {
        anyhow::ensure!(
            expected == fingerprint,
            "Fingerprint mismatch. \nExpected: {}, Recovered: {}",
            expected.to_string().green().bold(),
            fingerprint.to_string().red().bold()
        );
        log::info!("key trace verified");
    }

    let text = match cipher {
        Some(cipher) => cipher.apply(&embedded),
        None => embedded,
    };

    fs::write(&text_path, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            text_path.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        text_path.to_string_lossy().green().bold()
    );
    println!("Key trace (SHA-256): {}", fingerprint.to_string().cyan());

    Ok(())
}

/// 处理 'Capacity' 命令：报告图像可承载的位数和最大消息长度。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let source = load_image(&args.image)?;
    let bits = capacity(source.width(), source.height());
    let usable = usable_bytes(bits);

    println!(
        "{}: {} bits, up to {} message bytes",
        args.image.to_string_lossy().bold(),
        bits.to_string().green().bold(),
        usable.to_string().green().bold()
    );

    Ok(())
}
