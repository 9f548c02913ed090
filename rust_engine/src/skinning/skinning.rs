//! 双骨骼线性混合蒙皮

use glam::{Quat, Vec3};

use super::{SkinningOutput, SkinningVertex};
use crate::config::EngineConfig;
use crate::model::Model;
use crate::skeleton::BoneSolver;

/// 每顶点的蒙皮缓冲区
///
/// 骨骼头部到顶点的向量在创建时计算一次，
/// 骨骼的世界旋转和位置每帧由 `update` 刷新。
#[derive(Debug, Clone, Default)]
pub struct SkinningBuffers {
    vectors1: Vec<Vec3>,
    vectors2: Vec<Vec3>,
    weights: Vec<f32>,
    rotations1: Vec<Quat>,
    positions1: Vec<Vec3>,
    rotations2: Vec<Quat>,
    positions2: Vec<Vec3>,
}

impl SkinningBuffers {
    pub fn new(model: &Model) -> Self {
        let head = |index: u16| {
            model
                .bones
                .get(index as usize)
                .map(|b| b.head_position)
                .unwrap_or(Vec3::ZERO)
        };

        let vertex_count = model.vertices.len();
        let mut buffers = Self {
            vectors1: Vec::with_capacity(vertex_count),
            vectors2: Vec::with_capacity(vertex_count),
            weights: Vec::with_capacity(vertex_count),
            rotations1: vec![Quat::IDENTITY; vertex_count],
            positions1: vec![Vec3::ZERO; vertex_count],
            rotations2: vec![Quat::IDENTITY; vertex_count],
            positions2: vec![Vec3::ZERO; vertex_count],
        };

        for vertex in &model.vertices {
            buffers.vectors1.push(vertex.position - head(vertex.bone_indices[0]));
            buffers.vectors2.push(vertex.position - head(vertex.bone_indices[1]));
            buffers.weights.push(vertex.weight());
        }

        buffers
    }

    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }

    /// 从求解器读取每个顶点两根骨骼的世界变换
    pub fn update(&mut self, model: &Model, solver: &mut BoneSolver) {
        for (i, vertex) in model.vertices.iter().enumerate().take(self.weights.len()) {
            let bone1 = solver.resolve(model, vertex.bone_indices[0] as usize);
            let bone2 = solver.resolve(model, vertex.bone_indices[1] as usize);
            self.rotations1[i] = bone1.rotation;
            self.positions1[i] = bone1.translation;
            self.rotations2[i] = bone2.rotation;
            self.positions2[i] = bone2.translation;
        }
    }

    /// 骨骼头部到顶点的静态向量
    pub fn static_vectors(&self, index: usize) -> Option<(Vec3, Vec3)> {
        Some((*self.vectors1.get(index)?, *self.vectors2.get(index)?))
    }

    pub fn vertex(&self, index: usize, morph_offset: Vec3) -> Option<SkinningVertex> {
        Some(SkinningVertex {
            weight: *self.weights.get(index)?,
            bone1_rotation: self.rotations1[index],
            bone1_position: self.positions1[index],
            bone2_rotation: self.rotations2[index],
            bone2_position: self.positions2[index],
            morph_offset,
        })
    }
}

/// 计算蒙皮
///
/// p_k = rot_k × (vec_k + morph) + pos_k，结果为 mix(p2, p1, weight)；
/// 权重达到阈值时只使用骨骼1。法线按相同方式混合旋转后的结果。
pub fn compute_skinning(
    model: &Model,
    buffers: &SkinningBuffers,
    morph_offsets: &[Vec3],
    config: &EngineConfig,
) -> SkinningOutput {
    let vertex_count = buffers.vertex_count().min(model.vertices.len());
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);

    for (i, vertex) in model.vertices.iter().enumerate().take(vertex_count) {
        let morph = morph_offsets.get(i).copied().unwrap_or(Vec3::ZERO);
        let (Some(input), Some((vec1, vec2))) = (buffers.vertex(i, morph), buffers.static_vectors(i))
        else {
            continue;
        };

        let p1 = input.bone1_rotation * (vec1 + morph) + input.bone1_position;
        let n1 = input.bone1_rotation * vertex.normal;

        if input.weight >= config.single_bone_weight_threshold {
            positions.push(p1);
            normals.push(n1.normalize_or_zero());
            continue;
        }

        let p2 = input.bone2_rotation * (vec2 + morph) + input.bone2_position;
        let n2 = input.bone2_rotation * vertex.normal;
        positions.push(p2.lerp(p1, input.weight));
        normals.push(n2.lerp(n1, input.weight).normalize_or_zero());
    }

    SkinningOutput { positions, normals }
}
