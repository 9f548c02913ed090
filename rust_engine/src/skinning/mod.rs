//! 顶点蒙皮计算
//!
//! 每个顶点最多受两根骨骼影响，输入为骨骼的世界旋转与头部位置，
//! 以及骨骼头部到顶点的静态向量。

mod skinning;

pub use skinning::{compute_skinning, SkinningBuffers};

use glam::{Quat, Vec3};

/// 单个顶点的蒙皮输入
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinningVertex {
    /// 骨骼1 的权重（0.0 - 1.0）
    pub weight: f32,
    pub bone1_rotation: Quat,
    pub bone1_position: Vec3,
    pub bone2_rotation: Quat,
    pub bone2_position: Vec3,
    /// 本帧累加的 Morph 偏移
    pub morph_offset: Vec3,
}

/// 蒙皮输出数据
#[derive(Debug, Clone, Default)]
pub struct SkinningOutput {
    /// 变换后的顶点位置
    pub positions: Vec<Vec3>,
    /// 变换后的顶点法线
    pub normals: Vec<Vec3>,
}

impl SkinningOutput {
    /// 渲染用平铺缓冲区（每个顶点 3 个 f32）
    pub fn positions_raw(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    pub fn normals_raw(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.to_array()).collect()
    }
}
