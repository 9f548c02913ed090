//! Morph 定义

use super::{MorphKind, VertexMorphOffset};

/// Morph 变形（加载后不可变）
///
/// 索引 0 是 base morph：其 `vertex_index` 为真实顶点索引；
/// 其余 morph 的 `vertex_index` 指向 base morph 的偏移列表。
#[derive(Clone, Debug)]
pub struct Morph {
    pub name: String,
    pub kind: MorphKind,
    pub vertex_offsets: Vec<VertexMorphOffset>,
}

impl Morph {
    pub fn new(name: String, kind: MorphKind) -> Self {
        Self {
            name,
            kind,
            vertex_offsets: Vec::new(),
        }
    }

    pub fn is_base(&self) -> bool {
        self.kind == MorphKind::Base
    }
}

impl Default for Morph {
    fn default() -> Self {
        Self::new(String::new(), MorphKind::Other)
    }
}
