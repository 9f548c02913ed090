//! 刚体记录

use glam::Vec3;

use crate::io::{Axis, BinaryCursor};
use crate::Result;

/// 刚体形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyShape {
    Sphere,
    Box,
    Capsule,
    Unknown(u8),
}

impl From<u8> for RigidBodyShape {
    fn from(value: u8) -> Self {
        match value {
            0 => RigidBodyShape::Sphere,
            1 => RigidBodyShape::Box,
            2 => RigidBodyShape::Capsule,
            other => RigidBodyShape::Unknown(other),
        }
    }
}

/// 刚体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// 静态/运动学刚体，跟随骨骼
    Kinematic,
    /// 动态刚体，完全由物理驱动
    Dynamic,
    /// 动态刚体，但位置跟随骨骼（只有旋转由物理驱动）
    DynamicWithBonePosition,
    Unknown(u8),
}

impl From<u8> for RigidBodyType {
    fn from(value: u8) -> Self {
        match value {
            0 => RigidBodyType::Kinematic,
            1 => RigidBodyType::Dynamic,
            2 => RigidBodyType::DynamicWithBonePosition,
            other => RigidBodyType::Unknown(other),
        }
    }
}

/// PMD 刚体
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub name: String,
    /// 关联的骨骼索引（0xFFFF 表示不关联）
    pub bone_index: u16,
    /// 碰撞组
    pub group: u8,
    /// 不碰撞的组掩码
    pub group_mask: u16,
    pub shape: RigidBodyShape,
    /// 形状尺寸（宽、高、深）
    pub size: Vec3,
    /// 相对关联骨骼的位置
    pub position: Vec3,
    pub rotation: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub body_type: RigidBodyType,
}

impl RigidBody {
    /// 读取一条 83 字节的刚体记录
    pub fn read(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        Ok(Self {
            name: cursor.read_text(20)?,
            bone_index: cursor.read_u16()?,
            group: cursor.read_u8()?,
            group_mask: cursor.read_u16()?,
            shape: RigidBodyShape::from(cursor.read_u8()?),
            size: cursor.read_vec3(Axis::Raw)?,
            position: cursor.read_vec3(Axis::Position)?,
            rotation: cursor.read_vec3(Axis::Rotation)?,
            mass: cursor.read_f32()?,
            linear_damping: cursor.read_f32()?,
            angular_damping: cursor.read_f32()?,
            restitution: cursor.read_f32()?,
            friction: cursor.read_f32()?,
            body_type: RigidBodyType::from(cursor.read_u8()?),
        })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(
            self.body_type,
            RigidBodyType::Dynamic | RigidBodyType::DynamicWithBonePosition
        )
    }
}
