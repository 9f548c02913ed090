//! PMD 运行时模型
//!
//! 持有单个模型每帧求值所需的可变状态：骨骼求解器、Morph 累加器和蒙皮缓冲区。
//! 模型本身保持只读。

use glam::Vec3;

use super::Model;
use crate::animation::{ModelId, ModelPose, MotionManager};
use crate::config::EngineConfig;
use crate::morph::MorphAccumulator;
use crate::skeleton::BoneSolver;
use crate::skinning::{compute_skinning, SkinningBuffers, SkinningOutput, SkinningVertex};

/// 一帧的求值结果（借用运行时内部缓冲区）
pub struct FrameOutput<'a> {
    pub pose: &'a ModelPose,
    pub buffers: &'a SkinningBuffers,
    pub morph_offsets: &'a [Vec3],
    pub solver: &'a BoneSolver,
}

impl FrameOutput<'_> {
    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    /// 单个顶点的蒙皮输入
    pub fn vertex(&self, index: usize) -> Option<SkinningVertex> {
        let morph = self.morph_offsets.get(index).copied().unwrap_or(Vec3::ZERO);
        self.buffers.vertex(index, morph)
    }

    /// 参考 CPU 蒙皮
    pub fn skin(&self, model: &Model) -> SkinningOutput {
        compute_skinning(model, self.buffers, self.morph_offsets, self.solver.config())
    }
}

/// 运行时模型
pub struct ModelRuntime {
    solver: BoneSolver,
    morphs: MorphAccumulator,
    buffers: SkinningBuffers,
    pose: ModelPose,
}

impl ModelRuntime {
    pub fn new(model: &Model) -> Self {
        Self::with_config(model, EngineConfig::default())
    }

    pub fn with_config(model: &Model, config: EngineConfig) -> Self {
        Self {
            solver: BoneSolver::with_config(model, config),
            morphs: MorphAccumulator::for_model(model),
            buffers: SkinningBuffers::new(model),
            pose: ModelPose::default(),
        }
    }

    pub fn solver(&self) -> &BoneSolver {
        &self.solver
    }

    /// 最近一次求值的姿态快照
    pub fn pose(&self) -> &ModelPose {
        &self.pose
    }

    /// 求值指定帧并交给 `consume`；之后清零 Morph 累加器
    ///
    /// 模型未在管理器中注册时返回 None。
    pub fn evaluate<R>(
        &mut self,
        model: &Model,
        manager: &MotionManager,
        id: ModelId,
        frame: u32,
        consume: impl FnOnce(&FrameOutput<'_>) -> R,
    ) -> Option<R> {
        self.pose = manager.get_model_pose(id, frame)?;
        Some(self.evaluate_pose(model, consume))
    }

    fn evaluate_pose<R>(
        &mut self,
        model: &Model,
        consume: impl FnOnce(&FrameOutput<'_>) -> R,
    ) -> R {
        self.solver.solve(model, &self.pose);
        self.buffers.update(model, &mut self.solver);
        self.morphs.apply_weights(model, &self.pose.morphs);

        let solver = &self.solver;
        let buffers = &self.buffers;
        let pose = &self.pose;
        self.morphs.consume(|morph_offsets| {
            consume(&FrameOutput {
                pose,
                buffers,
                morph_offsets,
                solver,
            })
        })
    }
}
