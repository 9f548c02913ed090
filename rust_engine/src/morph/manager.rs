//! Morph 累加缓冲区
//!
//! 每帧把激活表情的顶点偏移按权重累加到临时缓冲区，
//! 蒙皮消费之后原地清零；缓冲区不属于模型的持久状态。

use std::collections::HashMap;

use glam::Vec3;

use crate::model::Model;

/// Morph 累加器
pub struct MorphAccumulator {
    offsets: Vec<Vec3>,
    dirty: bool,
}

impl MorphAccumulator {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            offsets: vec![Vec3::ZERO; vertex_count],
            dirty: false,
        }
    }

    /// 按模型顶点数创建
    pub fn for_model(model: &Model) -> Self {
        Self::new(model.vertices.len())
    }

    /// 应用单个 Morph（索引 0 为 base，忽略）
    pub fn apply_morph(&mut self, model: &Model, morph_index: usize, weight: f32) {
        if morph_index == 0 || weight == 0.0 {
            return;
        }
        let (Some(base), Some(morph)) = (model.base_morph(), model.morphs.get(morph_index)) else {
            return;
        };

        for offset in &morph.vertex_offsets {
            let Some(base_entry) = base.vertex_offsets.get(offset.vertex_index as usize) else {
                continue;
            };
            let idx = base_entry.vertex_index as usize;
            if idx < self.offsets.len() {
                self.offsets[idx] += offset.offset * weight;
                self.dirty = true;
            }
        }
    }

    /// 按名称 -> 权重表应用所有非 base 表情
    pub fn apply_weights(&mut self, model: &Model, weights: &HashMap<String, f32>) {
        for (index, morph) in model.morphs.iter().enumerate().skip(1) {
            if let Some(&weight) = weights.get(&morph.name) {
                self.apply_morph(model, index, weight);
            }
        }
    }

    /// 当前累加结果
    pub fn offsets(&self) -> &[Vec3] {
        &self.offsets
    }

    /// 单个顶点的累加偏移
    pub fn offset(&self, vertex_index: usize) -> Vec3 {
        self.offsets.get(vertex_index).copied().unwrap_or(Vec3::ZERO)
    }

    /// 交给调用方消费，之后清零
    pub fn consume<R>(&mut self, f: impl FnOnce(&[Vec3]) -> R) -> R {
        let result = f(&self.offsets);
        self.reset();
        result
    }

    /// 清零缓冲区
    pub fn reset(&mut self) {
        if self.dirty {
            self.offsets.fill(Vec3::ZERO);
            self.dirty = false;
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PmdBuilder;

    fn model_with_morph() -> Model {
        let mut builder = PmdBuilder::new();
        for i in 0..8 {
            builder.vertex([i as f32, 0.0, 0.0], 0, 0, 100);
        }
        builder.bone("center", 0xFFFF, [0.0, 0.0, 0.0]);
        // base morph 覆盖顶点 3..8，base 索引 2 对应顶点 5
        builder.morph(
            "base",
            0,
            &[(3, [0.0; 3]), (4, [0.0; 3]), (5, [0.0; 3]), (6, [0.0; 3]), (7, [0.0; 3])],
        );
        builder.morph("smile", 3, &[(2, [1.0, 0.0, 0.0])]);
        builder.morph("blink", 2, &[(0, [0.0, -1.0, 0.0]), (2, [0.0, 0.5, 0.0])]);
        Model::decode(&builder.build()).unwrap()
    }

    #[test]
    fn test_single_morph_then_reset() {
        let model = model_with_morph();
        let mut acc = MorphAccumulator::for_model(&model);
        acc.apply_morph(&model, 1, 1.0);

        for (i, offset) in acc.offsets().iter().enumerate() {
            if i == 5 {
                assert_eq!(*offset, Vec3::new(1.0, 0.0, 0.0));
            } else {
                assert_eq!(*offset, Vec3::ZERO);
            }
        }

        let seen = acc.consume(|offsets| offsets[5]);
        assert_eq!(seen, Vec3::new(1.0, 0.0, 0.0));
        assert!(acc.offsets().iter().all(|o| *o == Vec3::ZERO));
    }

    #[test]
    fn test_weights_are_additive() {
        let model = model_with_morph();
        let mut acc = MorphAccumulator::for_model(&model);
        let mut weights = HashMap::new();
        weights.insert("smile".to_string(), 0.5);
        weights.insert("blink".to_string(), 1.0);
        weights.insert("base".to_string(), 1.0);
        acc.apply_weights(&model, &weights);

        assert_eq!(acc.offset(5), Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(acc.offset(3), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(acc.offset(4), Vec3::ZERO);
    }

    #[test]
    fn test_zero_weight_and_base_are_skipped() {
        let model = model_with_morph();
        let mut acc = MorphAccumulator::for_model(&model);
        acc.apply_morph(&model, 0, 1.0);
        acc.apply_morph(&model, 1, 0.0);
        assert!(acc.offsets().iter().all(|o| *o == Vec3::ZERO));
    }
}
