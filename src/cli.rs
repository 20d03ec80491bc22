//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::steganography::Traversal;
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，以结束标记界定消息，并为每条消息生成 SHA-256 指纹。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 的 R、G、B 通道中隐藏或恢复消息，并为每条消息生成 SHA-256 指纹 (key trace)。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量查询)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损格式图像中隐藏一条消息。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的消息。
    Recover(RecoverArgs),

    /// 显示图像可承载的位数与可隐藏的最大消息字节数。
    Capacity(CapacityArgs),
}

/// 通道槽位的遍历顺序。
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// 逐行扫描 (默认)。
    #[default]
    RowMajor,
    /// 逐列扫描。
    ColumnMajor,
}

impl From<Order> for Traversal {
    fn from(order: Order) -> Self {
        match order {
            Order::RowMajor => Traversal::RowMajor,
            Order::ColumnMajor => Traversal::ColumnMajor,
        }
    }
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["text", "message"])))]
pub struct HideArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的内容所在的文件路径。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 直接在命令行上给出要隐藏的消息。
    #[arg(short, long)]
    pub message: Option<String>,

    /// 结果图像的输出路径。默认为输入图像同目录下的 `doctored_<文件名>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 隐写前对消息进行异或混淆所用的密钥。
    #[arg(short, long)]
    pub key: Option<String>,

    /// 将消息指纹 (十六进制) 写入此文件。
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// 通道槽位的遍历顺序。
    #[arg(long, value_enum, default_value_t = Order::RowMajor)]
    pub order: Order,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,

    /// 容量不足时仍写出被截断的图像，而不是报错。
    #[arg(long)]
    pub allow_truncation: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏消息的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复消息后的保存路径。默认为输入图像同目录下的 `recovered_<文件名>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 隐写时使用的异或密钥。
    #[arg(short, long)]
    pub key: Option<String>,

    /// 期望的消息指纹 (十六进制)，不一致时报错。
    #[arg(short, long)]
    pub expect: Option<String>,

    /// 通道槽位的遍历顺序，必须与隐写时一致。
    #[arg(long, value_enum, default_value_t = Order::RowMajor)]
    pub order: Order,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,

    /// 未找到结束标记时仍保存已恢复的字节，而不是报错。
    #[arg(long)]
    pub allow_incomplete: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要查询容量的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
