//! 骨骼节点

use glam::Vec3;

/// 无父骨骼的哨兵值
pub const NO_PARENT: u16 = 0xFFFF;

/// PMD 骨骼类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneKind {
    Rotate,
    RotateMove,
    Ik,
    Unknown,
    IkInfluenced,
    RotationInfluenced,
    IkTarget,
    Invisible,
    Twist,
    RotationFollow,
    Other(u8),
}

impl From<u8> for BoneKind {
    fn from(value: u8) -> Self {
        match value {
            0 => BoneKind::Rotate,
            1 => BoneKind::RotateMove,
            2 => BoneKind::Ik,
            3 => BoneKind::Unknown,
            4 => BoneKind::IkInfluenced,
            5 => BoneKind::RotationInfluenced,
            6 => BoneKind::IkTarget,
            7 => BoneKind::Invisible,
            8 => BoneKind::Twist,
            9 => BoneKind::RotationFollow,
            other => BoneKind::Other(other),
        }
    }
}

/// 骨骼节点（加载后不可变）
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    /// 父骨骼索引，`NO_PARENT` 表示根骨骼
    pub parent_index: u16,
    pub tail_index: u16,
    pub kind: BoneKind,
    pub ik_parent_index: u16,
    /// 绑定姿态下的头部位置（世界空间，已转换为右手系）
    pub head_position: Vec3,
    /// 膝盖类单轴约束骨骼（加载时根据名称确定一次）
    pub planar_constraint: bool,
}

impl Bone {
    pub fn new(name: String) -> Self {
        Self {
            name,
            parent_index: NO_PARENT,
            tail_index: NO_PARENT,
            kind: BoneKind::Rotate,
            ik_parent_index: 0,
            head_position: Vec3::ZERO,
            planar_constraint: false,
        }
    }

    /// 父骨骼索引（根骨骼返回 None）
    pub fn parent(&self) -> Option<usize> {
        if self.parent_index == NO_PARENT {
            None
        } else {
            Some(self.parent_index as usize)
        }
    }
}
