//! Morph 变形系统

mod manager;
mod morph;

pub use manager::MorphAccumulator;
pub use morph::Morph;

use glam::Vec3;

/// PMD 表情分类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphKind {
    Base,
    Eyebrow,
    Eye,
    Lip,
    Other,
    Unknown(u8),
}

impl From<u8> for MorphKind {
    fn from(value: u8) -> Self {
        match value {
            0 => MorphKind::Base,
            1 => MorphKind::Eyebrow,
            2 => MorphKind::Eye,
            3 => MorphKind::Lip,
            4 => MorphKind::Other,
            other => MorphKind::Unknown(other),
        }
    }
}

/// 顶点 Morph 偏移
#[derive(Clone, Debug)]
pub struct VertexMorphOffset {
    pub vertex_index: u32,
    pub offset: Vec3,
}
