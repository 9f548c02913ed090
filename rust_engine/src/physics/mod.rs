//! 物理元数据
//!
//! 只解析刚体与关节记录，供外部物理模块使用；本 crate 不做物理模拟。

mod joint;
mod rigid_body;

pub use joint::Joint;
pub use rigid_body::{RigidBody, RigidBodyShape, RigidBodyType};

/// 刚体记录长度
pub const RIGID_BODY_RECORD_SIZE: usize = 83;
/// 关节记录长度
pub const JOINT_RECORD_SIZE: usize = 124;
