//! Motion 核心数据结构
//!
//! 存储一个 VMD 文件解析出的全部关键帧（按名称分组、按帧号稳定排序），
//! 加载后不再修改。

use std::collections::HashMap;
use std::path::Path;

use super::keyframe::{
    BoneKeyframe, CameraKeyframe, Keyframe, LightKeyframe, MorphKeyframe, SelfShadowKeyframe,
};
use super::vmd_loader;
use crate::Result;

/// 动画数据
#[derive(Debug, Clone, Default)]
pub struct Motion {
    pub model_name: String,
    /// 骨骼动画轨道（骨骼名称 -> 关键帧）
    pub bone_tracks: HashMap<String, Vec<BoneKeyframe>>,
    /// Morph 动画轨道（Morph 名称 -> 关键帧）
    pub morph_tracks: HashMap<String, Vec<MorphKeyframe>>,
    pub camera_track: Vec<CameraKeyframe>,
    pub light_track: Vec<LightKeyframe>,
    pub self_shadow_track: Vec<SelfShadowKeyframe>,
}

impl Motion {
    /// 创建空的 Motion
    pub fn new() -> Self {
        Self::default()
    }

    /// 从内存解析 VMD
    pub fn decode(bytes: &[u8]) -> Result<Motion> {
        vmd_loader::decode_vmd(bytes)
    }

    /// 从文件加载 VMD
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Motion> {
        let bytes = std::fs::read(path.as_ref())?;
        log::debug!("读取 VMD 文件 {}（{} 字节）", path.as_ref().display(), bytes.len());
        Self::decode(&bytes)
    }

    /// 获取动画持续时间（所有轨道的最大帧号）
    pub fn duration(&self) -> u32 {
        fn last<K: Keyframe>(track: &[K]) -> u32 {
            track.iter().map(Keyframe::frame).max().unwrap_or(0)
        }

        let bone_max = self.bone_tracks.values().map(|t| last(t)).max().unwrap_or(0);
        let morph_max = self.morph_tracks.values().map(|t| last(t)).max().unwrap_or(0);

        bone_max
            .max(morph_max)
            .max(last(&self.camera_track))
            .max(last(&self.light_track))
            .max(last(&self.self_shadow_track))
    }

    /// 按帧号稳定排序所有轨道
    pub(super) fn sort_tracks(&mut self) {
        for track in self.bone_tracks.values_mut() {
            track.sort_by_key(Keyframe::frame);
        }
        for track in self.morph_tracks.values_mut() {
            track.sort_by_key(Keyframe::frame);
        }
        self.camera_track.sort_by_key(Keyframe::frame);
        self.light_track.sort_by_key(Keyframe::frame);
        self.self_shadow_track.sort_by_key(Keyframe::frame);
    }

    /// 骨骼轨道名称（排序后）
    pub fn bone_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bone_tracks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Morph 轨道名称（排序后）
    pub fn morph_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.morph_tracks.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn bone_keyframe_count(&self) -> usize {
        self.bone_tracks.values().map(Vec::len).sum()
    }

    pub fn morph_keyframe_count(&self) -> usize {
        self.morph_tracks.values().map(Vec::len).sum()
    }

    /// 是否包含相机 / 光照 / 阴影数据
    pub fn has_scene_tracks(&self) -> bool {
        !self.camera_track.is_empty() || !self.light_track.is_empty() || !self.self_shadow_track.is_empty()
    }
}
