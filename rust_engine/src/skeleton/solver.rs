//! 骨骼层级合成
//!
//! 每帧从动作快照载入本地变换，按需（带脏标记缓存）沿父链合成世界变换，
//! 再依次执行模型中的全部 IK。

use glam::Quat;

use super::BoneTransform;
use crate::animation::ModelPose;
use crate::config::EngineConfig;
use crate::model::Model;

/// 骨骼求解器
pub struct BoneSolver {
    pub(super) config: EngineConfig,
    /// 本地动作（IK 会改写其中的旋转）
    pub(super) local: Vec<BoneTransform>,
    /// 已合成的世界变换
    pub(super) world: Vec<BoneTransform>,
    /// 为 true 表示 `world` 需要重新合成
    pub(super) tainted: Vec<bool>,
    stack: Vec<usize>,
}

impl BoneSolver {
    pub fn new(model: &Model) -> Self {
        Self::with_config(model, EngineConfig::default())
    }

    pub fn with_config(model: &Model, config: EngineConfig) -> Self {
        let bone_count = model.bones.len();
        Self {
            config,
            local: vec![BoneTransform::default(); bone_count],
            world: vec![BoneTransform::default(); bone_count],
            tainted: vec![true; bone_count],
            stack: Vec::with_capacity(bone_count),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bone_count(&self) -> usize {
        self.local.len()
    }

    /// 载入一帧的本地动作，没有轨道的骨骼使用单位变换
    pub fn begin_frame(&mut self, model: &Model, pose: &ModelPose) {
        for (i, bone) in model.bones.iter().enumerate().take(self.local.len()) {
            self.local[i] = pose.bones.get(&bone.name).copied().unwrap_or_default();
        }
        self.tainted.fill(true);
    }

    pub fn local(&self, index: usize) -> BoneTransform {
        self.local.get(index).copied().unwrap_or_default()
    }

    /// 标记需要重新合成
    pub fn taint(&mut self, index: usize) {
        if let Some(flag) = self.tainted.get_mut(index) {
            *flag = true;
        }
    }

    /// 上一次合成的世界变换（不触发合成）
    pub fn world(&self, index: usize) -> BoneTransform {
        self.world.get(index).copied().unwrap_or_default()
    }

    /// 合成骨骼的世界变换（缓存有效时直接返回）
    pub fn resolve(&mut self, model: &Model, index: usize) -> BoneTransform {
        let bone_count = self.world.len().min(model.bones.len());
        if index >= bone_count {
            return BoneTransform::default();
        }
        if !self.tainted[index] {
            return self.world[index];
        }

        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();

        // 沿父链收集所有脏骨骼，超过骨骼数量说明存在环
        let mut forced_root = None;
        let mut current = index;
        loop {
            stack.push(current);
            match model.bones[current].parent() {
                Some(parent) if parent < bone_count && self.tainted[parent] => {
                    if stack.len() > bone_count {
                        log::warn!(
                            "骨骼 {} 的父链超过骨骼数量 {}，按根骨骼处理",
                            current, bone_count
                        );
                        forced_root = Some(current);
                        break;
                    }
                    current = parent;
                }
                _ => break,
            }
        }

        while let Some(i) = stack.pop() {
            let world = self.compose(model, i, forced_root == Some(i));
            self.world[i] = world;
            self.tainted[i] = false;
        }
        self.stack = stack;

        self.world[index]
    }

    fn compose(&self, model: &Model, index: usize, as_root: bool) -> BoneTransform {
        let bone = &model.bones[index];
        let local = self.local[index];
        let parent = bone
            .parent()
            .filter(|&p| !as_root && p < self.world.len() && p < model.bones.len());

        match parent {
            None => BoneTransform {
                translation: bone.head_position + local.translation,
                rotation: local.rotation,
            },
            Some(p) => {
                let parent_world = self.world[p];
                let offset = bone.head_position - model.bones[p].head_position + local.translation;
                BoneTransform {
                    translation: parent_world.rotation * offset + parent_world.translation,
                    rotation: parent_world.rotation * local.rotation,
                }
            }
        }
    }

    /// 父骨骼的世界旋转，根骨骼返回单位旋转
    pub(super) fn parent_rotation(&mut self, model: &Model, index: usize) -> Quat {
        match model.bones.get(index).and_then(|b| b.parent()) {
            Some(parent) => self.resolve(model, parent).rotation,
            None => Quat::IDENTITY,
        }
    }

    /// 按顺序执行模型中的全部 IK
    pub fn solve_iks(&mut self, model: &Model) {
        for ik in &model.iks {
            ik.solve(model, self);
        }
    }

    /// 合成全部骨骼
    pub fn resolve_all(&mut self, model: &Model) {
        for i in 0..self.world.len() {
            self.resolve(model, i);
        }
    }

    /// 一帧的完整骨骼求解：载入动作、IK、合成全部骨骼
    pub fn solve(&mut self, model: &Model, pose: &ModelPose) {
        self.begin_frame(model, pose);
        self.solve_iks(model);
        self.resolve_all(model);
    }
}
