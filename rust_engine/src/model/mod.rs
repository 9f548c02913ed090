//! PMD 模型数据

mod loader;
mod material;
mod runtime;
mod submesh;

pub use material::Material;
pub use runtime::{FrameOutput, ModelRuntime};
pub use submesh::SubMesh;

use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::config::EngineConfig;
use crate::morph::Morph;
use crate::physics::{Joint, RigidBody};
use crate::skeleton::{Bone, IkChain};
use crate::Result;

/// 模型顶点
#[derive(Clone, Debug)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub bone_indices: [u16; 2],
    /// 骨骼1 的影响百分比（0..=100），骨骼2 取补数
    pub bone_weight: u8,
    pub edge_flag: u8,
}

impl Vertex {
    /// 骨骼1 的权重（0.0..=1.0）
    pub fn weight(&self) -> f32 {
        self.bone_weight as f32 / 100.0
    }
}

/// 骨骼显示枠条目
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneDisplay {
    pub bone_index: u16,
    pub group_index: u8,
}

/// 英文名称扩展
#[derive(Clone, Debug, Default)]
pub struct EnglishNames {
    pub name: String,
    pub comment: String,
    pub bone_names: Vec<String>,
    /// 每个非 base 表情一个
    pub morph_names: Vec<String>,
    pub bone_group_names: Vec<String>,
}

/// PMD 模型（加载后不可变）
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub name: String,
    pub comment: String,
    pub vertices: Vec<Vertex>,
    /// 三角形索引（已转换为右手系绕序）
    pub indices: Vec<u32>,
    pub materials: Vec<Material>,
    pub submeshes: Vec<SubMesh>,
    pub bones: Vec<Bone>,
    pub iks: Vec<IkChain>,
    /// 索引 0 为 base morph
    pub morphs: Vec<Morph>,
    pub morph_display_order: Vec<u16>,
    pub bone_group_names: Vec<String>,
    pub bone_display_table: Vec<BoneDisplay>,
    pub english: Option<EnglishNames>,
    pub toon_file_names: Vec<String>,
    pub rigid_bodies: Vec<RigidBody>,
    pub joints: Vec<Joint>,
    bone_name_to_index: HashMap<String, usize>,
    morph_name_to_index: HashMap<String, usize>,
}

impl Model {
    /// 从内存解析 PMD
    pub fn decode(bytes: &[u8]) -> Result<Model> {
        Self::decode_with_config(bytes, &EngineConfig::default())
    }

    pub fn decode_with_config(bytes: &[u8], config: &EngineConfig) -> Result<Model> {
        loader::decode_pmd(bytes, config)
    }

    /// 从文件加载 PMD
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Model> {
        Self::load_with_config(path, &EngineConfig::default())
    }

    pub fn load_with_config<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<Model> {
        let bytes = std::fs::read(path.as_ref())?;
        log::debug!("读取 PMD 文件 {}（{} 字节）", path.as_ref().display(), bytes.len());
        Self::decode_with_config(&bytes, config)
    }

    /// 建立名称索引（解析结束后调用一次）
    fn build_name_index(&mut self) {
        self.bone_name_to_index = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        self.morph_name_to_index = self
            .morphs
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.bone_name_to_index.get(name).copied()
    }

    /// 通过名称查找表情
    pub fn find_morph_by_name(&self, name: &str) -> Option<usize> {
        self.morph_name_to_index.get(name).copied()
    }

    pub fn base_morph(&self) -> Option<&Morph> {
        self.morphs.first()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }
}
