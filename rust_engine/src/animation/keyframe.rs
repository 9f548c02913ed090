//! 动画关键帧

use glam::{Quat, Vec3};

use super::InterpolationCurve;

/// 关键帧公共接口
pub trait Keyframe: Clone {
    fn frame(&self) -> u32;
    fn set_frame(&mut self, frame: u32);
}

/// 骨骼插值通道
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneChannel {
    X = 0,
    Y = 1,
    Z = 2,
    Rotation = 3,
}

/// 骨骼关键帧
#[derive(Clone, Debug)]
pub struct BoneKeyframe {
    pub frame: u32,
    pub location: Vec3,
    pub rotation: Quat,
    /// 原始 64 字节插值数据
    pub interpolation: [u8; 64],
}

impl BoneKeyframe {
    /// 静止关键帧（零位移、单位旋转、线性插值）
    pub fn rest(frame: u32) -> Self {
        let mut interpolation = [0u8; 64];
        for channel in 0..4 {
            interpolation[channel] = 20;
            interpolation[4 + channel] = 20;
            interpolation[8 + channel] = 107;
            interpolation[12 + channel] = 107;
        }
        Self {
            frame,
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            interpolation,
        }
    }

    /// 前 16 字节的布局：x1[X,Y,Z,R] y1[X,Y,Z,R] x2[X,Y,Z,R] y2[X,Y,Z,R]
    pub fn curve(&self, channel: BoneChannel) -> InterpolationCurve {
        let c = channel as usize;
        let b = &self.interpolation;
        InterpolationCurve::new(b[c], b[8 + c], b[4 + c], b[12 + c])
    }
}

impl Keyframe for BoneKeyframe {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }
}

/// Morph 关键帧
#[derive(Clone, Debug, PartialEq)]
pub struct MorphKeyframe {
    pub frame: u32,
    pub weight: f32,
}

impl MorphKeyframe {
    pub fn new(frame: u32, weight: f32) -> Self {
        Self { frame, weight }
    }
}

impl Keyframe for MorphKeyframe {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }
}

/// 相机插值通道
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraChannel {
    X = 0,
    Y = 1,
    Z = 2,
    Rotation = 3,
    Distance = 4,
    ViewAngle = 5,
}

/// 相机关键帧
#[derive(Clone, Debug)]
pub struct CameraKeyframe {
    pub frame: u32,
    pub distance: f32,
    pub location: Vec3,
    /// 欧拉角（弧度）
    pub rotation: Vec3,
    /// 每通道 4 字节：x1 x2 y1 y2
    pub interpolation: [u8; 24],
    /// 视角（度）
    pub view_angle: u32,
    pub perspective: bool,
}

impl CameraKeyframe {
    pub fn curve(&self, channel: CameraChannel) -> InterpolationCurve {
        let i = channel as usize * 4;
        let b = &self.interpolation;
        InterpolationCurve::new(b[i], b[i + 1], b[i + 2], b[i + 3])
    }
}

impl Keyframe for CameraKeyframe {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }
}

/// 光照关键帧
#[derive(Clone, Debug, PartialEq)]
pub struct LightKeyframe {
    pub frame: u32,
    pub color: Vec3,
    pub location: Vec3,
}

impl Keyframe for LightKeyframe {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }
}

/// 阴影关键帧
#[derive(Clone, Debug, PartialEq)]
pub struct SelfShadowKeyframe {
    pub frame: u32,
    /// 0 = 关闭，1 = 模式1，2 = 模式2
    pub mode: u8,
    pub distance: f32,
}

impl Keyframe for SelfShadowKeyframe {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }
}
