//! 动画轨道
//!
//! 存储单个骨骼 / Morph / 相机 / 光照的关键帧（按帧号升序、帧号唯一），
//! 并提供查找和插值功能。

use glam::Vec3;

use super::bezier::BezierCache;
use super::interpolation::{
    fraction, lerp_element_wise, lerp_f32, normalize_rotation, previous_bracket, slerp_shortest,
};
use super::keyframe::{
    BoneChannel, BoneKeyframe, CameraChannel, CameraKeyframe, Keyframe, LightKeyframe,
    MorphKeyframe, SelfShadowKeyframe,
};
use crate::skeleton::BoneTransform;

/// 可插值的关键帧
pub trait Interpolate: Keyframe {
    type Value;

    /// 关键帧自身的值
    fn value(&self) -> Self::Value;

    /// 在 prev 与 next 之间插值，曲线取自 next
    fn interpolate(prev: &Self, next: &Self, t: f32, cache: &mut BezierCache) -> Self::Value;
}

/// 动画轨道
#[derive(Debug, Clone)]
pub struct MotionTrack<K> {
    frames: Vec<u32>,
    keyframes: Vec<K>,
}

impl<K> Default for MotionTrack<K> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            keyframes: Vec::new(),
        }
    }
}

impl<K: Keyframe> MotionTrack<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入关键帧，同一帧号已存在时覆盖
    pub fn insert_keyframe(&mut self, keyframe: K) -> Option<K> {
        let frame = keyframe.frame();
        match self.frames.binary_search(&frame) {
            Ok(i) => Some(std::mem::replace(&mut self.keyframes[i], keyframe)),
            Err(i) => {
                self.frames.insert(i, frame);
                self.keyframes.insert(i, keyframe);
                None
            }
        }
    }

    /// 查找精确帧
    pub fn find(&self, frame: u32) -> Option<&K> {
        self.frames
            .binary_search(&frame)
            .ok()
            .map(|i| &self.keyframes[i])
    }

    pub fn frames(&self) -> &[u32] {
        &self.frames
    }

    pub fn keyframes(&self) -> &[K] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// 获取最大帧索引
    pub fn max_frame_index(&self) -> u32 {
        self.frames.last().copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.keyframes.clear();
    }
}

impl<K: Interpolate> MotionTrack<K> {
    /// 求值指定帧；最后一帧之后保持最后的值，第一帧之前保持第一帧的值
    pub fn seek(&self, frame: u32, cache: &mut BezierCache) -> Option<K::Value> {
        let last = self.keyframes.last()?;
        if frame >= last.frame() {
            return Some(last.value());
        }

        let i = previous_bracket(&self.frames, frame);
        let prev = &self.keyframes[i];
        if frame < prev.frame() {
            return Some(prev.value());
        }
        let next = &self.keyframes[i + 1];

        let t = fraction(frame as f32, prev.frame() as f32, next.frame() as f32);
        cache.reset();
        Some(K::interpolate(prev, next, t, cache))
    }
}

pub type BoneMotionTrack = MotionTrack<BoneKeyframe>;
pub type MorphMotionTrack = MotionTrack<MorphKeyframe>;
pub type CameraMotionTrack = MotionTrack<CameraKeyframe>;
pub type LightMotionTrack = MotionTrack<LightKeyframe>;
pub type SelfShadowMotionTrack = MotionTrack<SelfShadowKeyframe>;

impl Interpolate for BoneKeyframe {
    type Value = BoneTransform;

    fn value(&self) -> BoneTransform {
        BoneTransform::new(self.location, normalize_rotation(self.rotation))
    }

    fn interpolate(prev: &Self, next: &Self, t: f32, cache: &mut BezierCache) -> BoneTransform {
        let amounts = Vec3::new(
            cache.ease(next.curve(BoneChannel::X), t),
            cache.ease(next.curve(BoneChannel::Y), t),
            cache.ease(next.curve(BoneChannel::Z), t),
        );
        let rotation_amount = cache.ease(next.curve(BoneChannel::Rotation), t);

        BoneTransform::new(
            lerp_element_wise(prev.location, next.location, amounts),
            slerp_shortest(prev.rotation, next.rotation, rotation_amount),
        )
    }
}

impl Interpolate for MorphKeyframe {
    type Value = f32;

    fn value(&self) -> f32 {
        self.weight
    }

    fn interpolate(prev: &Self, next: &Self, t: f32, _cache: &mut BezierCache) -> f32 {
        lerp_f32(prev.weight, next.weight, t)
    }
}

/// 相机帧变换结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub distance: f32,
    pub location: Vec3,
    pub rotation: Vec3,
    /// 视角（度）
    pub view_angle: f32,
    pub perspective: bool,
}

impl Interpolate for CameraKeyframe {
    type Value = CameraFrame;

    fn value(&self) -> CameraFrame {
        CameraFrame {
            distance: self.distance,
            location: self.location,
            rotation: self.rotation,
            view_angle: self.view_angle as f32,
            perspective: self.perspective,
        }
    }

    fn interpolate(prev: &Self, next: &Self, t: f32, cache: &mut BezierCache) -> CameraFrame {
        let amounts = Vec3::new(
            cache.ease(next.curve(CameraChannel::X), t),
            cache.ease(next.curve(CameraChannel::Y), t),
            cache.ease(next.curve(CameraChannel::Z), t),
        );
        let rotation_amount = cache.ease(next.curve(CameraChannel::Rotation), t);
        let distance_amount = cache.ease(next.curve(CameraChannel::Distance), t);
        let view_angle_amount = cache.ease(next.curve(CameraChannel::ViewAngle), t);

        CameraFrame {
            distance: lerp_f32(prev.distance, next.distance, distance_amount),
            location: lerp_element_wise(prev.location, next.location, amounts),
            rotation: prev.rotation.lerp(next.rotation, rotation_amount),
            view_angle: lerp_f32(prev.view_angle as f32, next.view_angle as f32, view_angle_amount),
            perspective: prev.perspective,
        }
    }
}

/// 光照帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFrame {
    pub color: Vec3,
    pub location: Vec3,
}

impl Interpolate for LightKeyframe {
    type Value = LightFrame;

    fn value(&self) -> LightFrame {
        LightFrame {
            color: self.color,
            location: self.location,
        }
    }

    fn interpolate(prev: &Self, next: &Self, t: f32, _cache: &mut BezierCache) -> LightFrame {
        LightFrame {
            color: prev.color.lerp(next.color, t),
            location: prev.location.lerp(next.location, t),
        }
    }
}

/// 阴影帧（不插值，保持前一关键帧）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfShadowFrame {
    pub mode: u8,
    pub distance: f32,
}

impl Interpolate for SelfShadowKeyframe {
    type Value = SelfShadowFrame;

    fn value(&self) -> SelfShadowFrame {
        SelfShadowFrame {
            mode: self.mode,
            distance: self.distance,
        }
    }

    fn interpolate(prev: &Self, _next: &Self, _t: f32, _cache: &mut BezierCache) -> SelfShadowFrame {
        prev.value()
    }
}
