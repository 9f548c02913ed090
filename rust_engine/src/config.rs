//! 引擎配置
//!
//! 参数扁平化，由调用方持有并传入解析器 / 求解器，不使用全局状态。

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ========== 模型加载 ==========
    /// 单轴约束骨骼（膝盖类）的名称标记，默认 "ひざ"
    /// 名称中出现在首字符之后即视为约束骨骼，例如 "左ひざ"
    pub planar_constraint_marker: String,

    // ========== IK ==========
    /// 收敛阈值比例，默认 0.1
    /// 阈值 = 比例 × 效果器骨骼到其父骨骼的绑定姿态长度
    pub ik_convergence_ratio: f32,
    /// 旋转角正弦的最小值，低于此值跳过该链接，默认 0.001
    pub ik_min_sin_theta: f32,
    /// 每次迭代的角度步长系数，默认 4.0
    /// 最大角度 = (链接序号 + 1) × control_weight × 此值
    pub ik_angle_step_scale: f32,

    // ========== 动作 ==========
    /// 被忽略的表情轨道名，默认 "base"
    pub ignored_morph_track: String,

    // ========== 蒙皮 ==========
    /// 骨骼1 权重达到此值时只使用骨骼1，默认 0.99
    pub single_bone_weight_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            planar_constraint_marker: "\u{3072}\u{3056}".to_string(),
            ik_convergence_ratio: 0.1,
            ik_min_sin_theta: 0.001,
            ik_angle_step_scale: 4.0,
            ignored_morph_track: "base".to_string(),
            single_bone_weight_threshold: 0.99,
        }
    }
}

impl EngineConfig {
    /// 骨骼名是否带有单轴约束标记
    pub fn is_planar_constrained(&self, bone_name: &str) -> bool {
        if self.planar_constraint_marker.is_empty() {
            return false;
        }
        matches!(bone_name.find(&self.planar_constraint_marker), Some(pos) if pos > 0)
    }
}
