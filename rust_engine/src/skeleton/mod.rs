//! 骨骼系统和 IK 求解器

mod bone;
mod ik_solver;
mod solver;

pub use bone::{Bone, BoneKind, NO_PARENT};
pub use ik_solver::IkChain;
pub use solver::BoneSolver;

use glam::{Quat, Vec3};

/// 骨骼变换数据
///
/// 作为本地动作时 `translation` 是相对绑定姿态的位移；
/// 作为合成结果时是骨骼头部的世界坐标。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl BoneTransform {
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }
}
