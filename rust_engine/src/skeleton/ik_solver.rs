//! IK 求解器（CCD）

use std::f32::consts::PI;

use glam::{Quat, Vec3, Vec4};

use super::BoneSolver;
use crate::model::Model;

/// IK 定义
#[derive(Clone, Debug)]
pub struct IkChain {
    /// IK 骨骼（目标位置）
    pub bone_index: u16,
    /// 效果器骨骼
    pub target_bone_index: u16,
    /// 链接骨骼，靠近效果器的在前
    pub child_bones: Vec<u16>,
    pub iterations: u16,
    /// 单次迭代的角度限制系数
    pub control_weight: f32,
}

/// 四元数的逆（不要求单位长度）
fn inverse(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq == 0.0 {
        return Quat::IDENTITY;
    }
    Quat::from_vec4(Vec4::from(q.conjugate()) / len_sq)
}

impl IkChain {
    /// 求解一个 IK，结果写回求解器的本地旋转
    pub fn solve(&self, model: &Model, solver: &mut BoneSolver) {
        let bone_count = solver.bone_count().min(model.bones.len());
        let goal_index = self.bone_index as usize;
        let target_index = self.target_bone_index as usize;
        if goal_index >= bone_count || target_index >= bone_count {
            return;
        }

        let goal = solver.resolve(model, goal_index).translation;

        let target_bone = &model.bones[target_index];
        let parent_head = target_bone
            .parent()
            .and_then(|p| model.bones.get(p))
            .map_or(Vec3::ZERO, |b| b.head_position);
        let min_length =
            solver.config.ik_convergence_ratio * (target_bone.head_position - parent_head).length();
        let min_sin_theta = solver.config.ik_min_sin_theta;
        let angle_step = solver.config.ik_angle_step_scale;

        for _ in 0..self.iterations {
            let mut target_pos = solver.resolve(model, target_index).translation;
            if min_length > (target_pos - goal).length() {
                return;
            }

            for (i, &link) in self.child_bones.iter().enumerate() {
                let link = link as usize;
                if link >= bone_count {
                    continue;
                }
                let motion = solver.resolve(model, link);
                if i > 0 {
                    target_pos = solver.resolve(model, target_index).translation;
                }

                let target_vec = target_pos - motion.translation;
                let target_len = target_vec.length();
                if target_len < min_length {
                    continue;
                }
                let ik_vec = goal - motion.translation;
                let ik_len = ik_vec.length();
                if ik_len < min_length {
                    continue;
                }

                let axis = target_vec.cross(ik_vec);
                let axis_len = axis.length();
                let sin_theta = axis_len / ik_len / target_len;
                if sin_theta < min_sin_theta {
                    continue;
                }

                let max_angle = (i + 1) as f32 * self.control_weight * angle_step;
                let mut theta = sin_theta.min(1.0).asin();
                if target_vec.dot(ik_vec) < 0.0 {
                    theta = PI - theta;
                }
                theta = theta.min(max_angle);

                let half = theta / 2.0;
                let v = axis * (half.sin() / axis_len);
                let mut q = Quat::from_xyzw(v.x, v.y, v.z, half.cos());

                let parent_rotation = solver.parent_rotation(model, link);
                let mut r = inverse(parent_rotation) * q * motion.rotation;
                if model.bones[link].planar_constraint {
                    // 只保留绕 X 轴的旋转
                    let c = r.w.clamp(-1.0, 1.0);
                    r = Quat::from_xyzw((1.0 - c * c).max(0.0).sqrt(), 0.0, 0.0, c);
                    q = parent_rotation * r * inverse(motion.rotation);
                }

                solver.local[link].rotation = r.normalize();
                solver.world[link].rotation = q * motion.rotation;
                for &j in &self.child_bones[..i] {
                    solver.taint(j as usize);
                }
                solver.taint(target_index);
            }
        }

        log::debug!(
            "IK 骨骼 {} 在 {} 次迭代内未收敛",
            goal_index, self.iterations
        );
    }
}
