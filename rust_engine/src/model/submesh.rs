//! 子网格定义

use super::Material;

/// 子网格（按材质划分的索引区间）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub begin_index: u32,
    pub index_count: u32,
    pub material_id: i32,
}

impl SubMesh {
    pub fn new(begin_index: u32, index_count: u32, material_id: i32) -> Self {
        Self { begin_index, index_count, material_id }
    }

    /// 根据材质的索引数量依次切分
    pub fn from_materials(materials: &[Material]) -> Vec<SubMesh> {
        let mut begin = 0u32;
        materials
            .iter()
            .enumerate()
            .map(|(i, mat)| {
                let submesh = SubMesh::new(begin, mat.face_vertex_count, i as i32);
                begin = begin.saturating_add(mat.face_vertex_count);
                submesh
            })
            .collect()
    }
}
