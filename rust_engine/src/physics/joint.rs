//! 关节记录

use glam::Vec3;

use crate::io::{Axis, BinaryCursor};
use crate::Result;

/// PMD 关节（6 自由度弹簧约束）
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub rigid_body_a_index: u32,
    pub rigid_body_b_index: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    /// 线性下限
    pub linear_lower: Vec3,
    /// 线性上限
    pub linear_upper: Vec3,
    /// 角度下限
    pub angular_lower: Vec3,
    /// 角度上限
    pub angular_upper: Vec3,
    /// 线性弹簧刚度
    pub linear_spring: Vec3,
    /// 角度弹簧刚度
    pub angular_spring: Vec3,
}

impl Joint {
    /// 读取一条 124 字节的关节记录
    pub fn read(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        Ok(Self {
            name: cursor.read_text(20)?,
            rigid_body_a_index: cursor.read_u32()?,
            rigid_body_b_index: cursor.read_u32()?,
            position: cursor.read_vec3(Axis::Position)?,
            rotation: cursor.read_vec3(Axis::Rotation)?,
            linear_lower: cursor.read_vec3(Axis::Position)?,
            linear_upper: cursor.read_vec3(Axis::Position)?,
            angular_lower: cursor.read_vec3(Axis::Rotation)?,
            angular_upper: cursor.read_vec3(Axis::Rotation)?,
            linear_spring: cursor.read_vec3(Axis::Position)?,
            angular_spring: cursor.read_vec3(Axis::Rotation)?,
        })
    }
}
