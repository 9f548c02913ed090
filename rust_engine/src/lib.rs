//! PMD Engine - PMD 模型 / VMD 动作的 Rust 运行时核心
//!
//! 提供：
//! - PMD 模型二进制解析（顶点、骨骼、IK、表情、刚体、关节）
//! - VMD 动作解析（骨骼、表情、相机、光照、阴影关键帧）
//! - 贝塞尔关键帧插值与动作管理
//! - 骨骼层级合成、IK 求解、Morph 累加
//! - 双骨骼线性混合蒙皮输入

pub mod animation;
pub mod config;
pub mod io;
pub mod model;
pub mod morph;
pub mod physics;
pub mod skeleton;
pub mod skinning;

#[cfg(test)]
pub(crate) mod test_support;

pub use animation::{Motion, MotionManager, ModelId, ModelPose};
pub use config::EngineConfig;
pub use model::{Model, ModelRuntime};
pub use morph::MorphAccumulator;
pub use skeleton::{Bone, BoneSolver, IkChain};
pub use skinning::{SkinningBuffers, SkinningVertex};

use std::fmt;

use thiserror::Error;

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pmd,
    Vmd,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Pmd => f.write_str("PMD"),
            FileFormat::Vmd => f.write_str("VMD"),
        }
    }
}

/// 格式错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatErrorKind {
    #[error("bad magic header")]
    BadMagic,

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("declared length exceeds remaining bytes: {count} records of {record_size} bytes, {remaining} remaining")]
    DeclaredLengthExceedsData {
        count: usize,
        record_size: usize,
        remaining: usize,
    },

    #[error("invalid {what} index {index} (limit {limit})")]
    InvalidReference {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: i64 },

    #[error("bone {bone} is part of a parent cycle")]
    BoneCycle { bone: usize },
}

/// 结构化格式错误（类型 + 偏移）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{format} format error at offset {offset}: {kind}")]
pub struct FormatError {
    pub format: FileFormat,
    pub kind: FormatErrorKind,
    pub offset: usize,
}

impl FormatError {
    pub fn new(format: FileFormat, kind: FormatErrorKind, offset: usize) -> Self {
        Self { format, kind, offset }
    }
}

#[derive(Error, Debug)]
pub enum MmdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Text decode error: unmapped byte sequence at offset {offset}")]
    Text { offset: usize },
}

impl MmdError {
    /// 如果是格式错误，返回其结构化信息
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            MmdError::Format(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MmdError>;
