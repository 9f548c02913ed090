//! 动画系统
//!
//! 提供 VMD 动作解析、贝塞尔关键帧插值和动作管理。

mod bezier;
mod interpolation;
mod keyframe;
mod manager;
mod motion;
mod motion_track;
mod vmd_loader;

pub use bezier::{bezier_ease, BezierCache, InterpolationCurve};
pub use interpolation::{
    fraction, lerp_element_wise, normalize_rotation, previous_bracket, slerp_shortest,
};
pub use keyframe::{
    BoneChannel, BoneKeyframe, CameraChannel, CameraKeyframe, Keyframe, LightKeyframe,
    MorphKeyframe, SelfShadowKeyframe,
};
pub use manager::{ModelId, ModelPose, MotionManager};
pub use motion::Motion;
pub use motion_track::{
    BoneMotionTrack, CameraFrame, CameraMotionTrack, Interpolate, LightFrame, LightMotionTrack,
    MorphMotionTrack, MotionTrack, SelfShadowFrame, SelfShadowMotionTrack,
};
