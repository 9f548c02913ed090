//! 动作管理器
//!
//! 按模型保存骨骼 / 表情轨道，另有全局的相机、光照和阴影时间线。
//! 由调用方持有（每个播放会话一个），不使用全局状态。

use std::collections::HashMap;

use super::bezier::BezierCache;
use super::keyframe::{BoneKeyframe, Keyframe, MorphKeyframe};
use super::motion::Motion;
use super::motion_track::{
    BoneMotionTrack, CameraFrame, CameraMotionTrack, LightFrame, LightMotionTrack,
    MorphMotionTrack, MotionTrack, SelfShadowFrame, SelfShadowMotionTrack,
};
use crate::config::EngineConfig;
use crate::skeleton::BoneTransform;

/// 由调用方指定的模型标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

/// 单个模型在某一帧的姿态快照
#[derive(Debug, Clone, Default)]
pub struct ModelPose {
    /// 骨骼名称 -> 局部位移 / 旋转
    pub bones: HashMap<String, BoneTransform>,
    /// 表情名称 -> 权重
    pub morphs: HashMap<String, f32>,
}

#[derive(Debug, Default)]
struct ModelTracks {
    bones: HashMap<String, BoneMotionTrack>,
    morphs: HashMap<String, MorphMotionTrack>,
}

impl ModelTracks {
    fn last_frame(&self) -> u32 {
        let bone_max = self.bones.values().map(MotionTrack::max_frame_index).max();
        let morph_max = self.morphs.values().map(MotionTrack::max_frame_index).max();
        bone_max.unwrap_or(0).max(morph_max.unwrap_or(0))
    }
}

/// 动作管理器
#[derive(Debug, Default)]
pub struct MotionManager {
    config: EngineConfig,
    models: HashMap<ModelId, ModelTracks>,
    camera_track: CameraMotionTrack,
    light_track: LightMotionTrack,
    self_shadow_track: SelfShadowMotionTrack,
}

/// 把关键帧平移 frame_offset 后插入轨道
fn insert_shifted<K: Keyframe>(track: &mut MotionTrack<K>, keyframe: &K, frame_offset: u32) {
    let mut keyframe = keyframe.clone();
    keyframe.set_frame(keyframe.frame().saturating_add(frame_offset));
    track.insert_keyframe(keyframe);
}

/// 合并全局时间线；动作中没有该类数据时保持原样
fn merge_timeline<K: Keyframe>(
    track: &mut MotionTrack<K>,
    keyframes: &[K],
    merge: bool,
    frame_offset: u32,
) {
    if keyframes.is_empty() {
        return;
    }
    if !merge {
        track.clear();
    }
    for keyframe in keyframes {
        insert_shifted(track, keyframe, frame_offset);
    }
}

impl MotionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 添加模型动作
    ///
    /// `merge` 为 false 时先清空该模型的全部骨骼和表情轨道。
    /// 新建的骨骼轨道以第 0 帧的静止关键帧开头，新建的表情轨道以第 0 帧权重 0 开头。
    pub fn add_model_motion(&mut self, id: ModelId, motion: &Motion, merge: bool, frame_offset: u32) {
        let tracks = self.models.entry(id).or_default();
        if !merge {
            tracks.bones.clear();
            tracks.morphs.clear();
        }

        for (name, keyframes) in &motion.bone_tracks {
            let track = tracks.bones.entry(name.clone()).or_insert_with(|| {
                let mut track = BoneMotionTrack::new();
                track.insert_keyframe(BoneKeyframe::rest(0));
                track
            });
            for keyframe in keyframes {
                insert_shifted(track, keyframe, frame_offset);
            }
        }

        for (name, keyframes) in &motion.morph_tracks {
            if *name == self.config.ignored_morph_track {
                continue;
            }
            let track = tracks.morphs.entry(name.clone()).or_insert_with(|| {
                let mut track = MorphMotionTrack::new();
                track.insert_keyframe(MorphKeyframe::new(0, 0.0));
                track
            });
            for keyframe in keyframes {
                insert_shifted(track, keyframe, frame_offset);
            }
        }

        log::debug!(
            "模型 {:?} 添加动作: 骨骼轨道={}, 表情轨道={}, 偏移={}, 合并={}",
            id,
            tracks.bones.len(),
            tracks.morphs.len(),
            frame_offset,
            merge
        );
    }

    /// 添加相机 / 光照 / 阴影动作
    pub fn add_camera_light_motion(&mut self, motion: &Motion, merge: bool, frame_offset: u32) {
        merge_timeline(&mut self.camera_track, &motion.camera_track, merge, frame_offset);
        merge_timeline(&mut self.light_track, &motion.light_track, merge, frame_offset);
        merge_timeline(&mut self.self_shadow_track, &motion.self_shadow_track, merge, frame_offset);
    }

    /// 求值模型在指定帧的姿态；未注册的模型返回 None
    pub fn get_model_pose(&self, id: ModelId, frame: u32) -> Option<ModelPose> {
        let tracks = self.models.get(&id)?;
        let mut cache = BezierCache::new();

        let bones = tracks
            .bones
            .iter()
            .filter_map(|(name, track)| Some((name.clone(), track.seek(frame, &mut cache)?)))
            .collect();
        let morphs = tracks
            .morphs
            .iter()
            .filter_map(|(name, track)| Some((name.clone(), track.seek(frame, &mut cache)?)))
            .collect();

        Some(ModelPose { bones, morphs })
    }

    pub fn get_camera_frame(&self, frame: u32) -> Option<CameraFrame> {
        self.camera_track.seek(frame, &mut BezierCache::new())
    }

    pub fn get_light_frame(&self, frame: u32) -> Option<LightFrame> {
        self.light_track.seek(frame, &mut BezierCache::new())
    }

    pub fn get_self_shadow_frame(&self, frame: u32) -> Option<SelfShadowFrame> {
        self.self_shadow_track.seek(frame, &mut BezierCache::new())
    }

    /// 所有已注册关键帧中的最大帧号
    pub fn last_frame(&self) -> u32 {
        let model_max = self.models.values().map(ModelTracks::last_frame).max().unwrap_or(0);
        model_max
            .max(self.camera_track.max_frame_index())
            .max(self.light_track.max_frame_index())
            .max(self.self_shadow_track.max_frame_index())
    }

    pub fn remove_model(&mut self, id: ModelId) -> bool {
        self.models.remove(&id).is_some()
    }

    pub fn contains_model(&self, id: ModelId) -> bool {
        self.models.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframe::{CameraKeyframe, LightKeyframe, SelfShadowKeyframe};
    use glam::{Quat, Vec3};

    const MODEL: ModelId = ModelId(1);

    fn bone_motion(name: &str, keyframes: &[(u32, f32)]) -> Motion {
        let mut motion = Motion::new();
        let track = keyframes
            .iter()
            .map(|&(frame, x)| BoneKeyframe {
                location: Vec3::new(x, 0.0, 0.0),
                ..BoneKeyframe::rest(frame)
            })
            .collect();
        motion.bone_tracks.insert(name.to_string(), track);
        motion
    }

    fn morph_motion(name: &str, keyframes: &[(u32, f32)]) -> Motion {
        let mut motion = Motion::new();
        let track = keyframes
            .iter()
            .map(|&(frame, weight)| MorphKeyframe::new(frame, weight))
            .collect();
        motion.morph_tracks.insert(name.to_string(), track);
        motion
    }

    #[test]
    fn test_new_bone_track_starts_at_rest() {
        let mut manager = MotionManager::new();
        manager.add_model_motion(MODEL, &bone_motion("センター", &[(10, 4.0)]), false, 0);

        let pose = manager.get_model_pose(MODEL, 5).unwrap();
        let center = pose.bones["センター"];
        assert!((center.translation.x - 2.0).abs() < 1e-5);
        assert_eq!(center.rotation, Quat::IDENTITY);

        // 最后一帧之后保持
        let held = manager.get_model_pose(MODEL, 500).unwrap();
        assert_eq!(held.bones["センター"].translation, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(manager.last_frame(), 10);
    }

    #[test]
    fn test_merge_with_offset_and_replace() {
        let mut manager = MotionManager::new();
        manager.add_model_motion(MODEL, &bone_motion("頭", &[(10, 1.0)]), false, 0);
        manager.add_model_motion(MODEL, &bone_motion("首", &[(0, 2.0)]), true, 20);

        let pose = manager.get_model_pose(MODEL, 20).unwrap();
        assert_eq!(pose.bones.len(), 2);
        assert_eq!(pose.bones["首"].translation.x, 2.0);
        assert_eq!(manager.last_frame(), 20);

        // 同一帧的关键帧被覆盖
        manager.add_model_motion(MODEL, &bone_motion("頭", &[(10, 3.0)]), true, 0);
        let pose = manager.get_model_pose(MODEL, 10).unwrap();
        assert_eq!(pose.bones["頭"].translation.x, 3.0);

        manager.add_model_motion(MODEL, &bone_motion("腕", &[(5, 1.0)]), false, 0);
        let pose = manager.get_model_pose(MODEL, 10).unwrap();
        assert_eq!(pose.bones.len(), 1);
        assert!(pose.bones.contains_key("腕"));
    }

    #[test]
    fn test_morph_tracks_skip_base() {
        let mut manager = MotionManager::new();
        let mut motion = morph_motion("あ", &[(10, 1.0)]);
        motion
            .morph_tracks
            .insert("base".to_string(), vec![MorphKeyframe::new(0, 1.0)]);
        manager.add_model_motion(MODEL, &motion, false, 0);

        let pose = manager.get_model_pose(MODEL, 5).unwrap();
        assert_eq!(pose.morphs.len(), 1);
        assert!((pose.morphs["あ"] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_model() {
        let mut manager = MotionManager::new();
        assert!(manager.get_model_pose(MODEL, 0).is_none());
        manager.add_model_motion(MODEL, &Motion::new(), false, 0);
        assert!(manager.contains_model(MODEL));
        assert!(manager.remove_model(MODEL));
        assert!(!manager.contains_model(MODEL));
    }

    #[test]
    fn test_camera_light_timelines() {
        let mut manager = MotionManager::new();
        let mut interpolation = [0u8; 24];
        for channel in 0..6 {
            interpolation[channel * 4..channel * 4 + 4].copy_from_slice(&[20, 107, 20, 107]);
        }
        let camera = |frame: u32, distance: f32| CameraKeyframe {
            frame,
            distance,
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            interpolation,
            view_angle: 30,
            perspective: true,
        };

        let mut motion = Motion::new();
        motion.camera_track = vec![camera(0, -10.0), camera(10, -20.0)];
        motion.light_track = vec![LightKeyframe {
            frame: 0,
            color: Vec3::splat(0.6),
            location: Vec3::new(-0.5, -1.0, 0.5),
        }];
        manager.add_camera_light_motion(&motion, false, 0);

        let frame = manager.get_camera_frame(5).unwrap();
        assert!((frame.distance + 15.0).abs() < 1e-5);
        assert_eq!(frame.view_angle, 30.0);
        assert_eq!(manager.get_light_frame(100).unwrap().color, Vec3::splat(0.6));
        assert!(manager.get_self_shadow_frame(0).is_none());

        // 只有阴影数据的动作不影响相机和光照
        let mut shadow_only = Motion::new();
        shadow_only.self_shadow_track = vec![SelfShadowKeyframe {
            frame: 30,
            mode: 2,
            distance: 0.1,
        }];
        manager.add_camera_light_motion(&shadow_only, false, 0);
        assert!(manager.get_camera_frame(5).is_some());
        assert_eq!(manager.get_self_shadow_frame(0).map(|f| f.mode), Some(2));
        assert_eq!(manager.last_frame(), 30);
    }
}
