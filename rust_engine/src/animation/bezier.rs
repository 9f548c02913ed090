//! 贝塞尔曲线插值
//!
//! 端点固定为 (0,0) 与 (1,1)，两个控制点各 1 字节（0..=127）。

use std::collections::HashMap;

const NEWTON_TOLERANCE: f64 = 1e-7;
const NEWTON_MAX_ITERATIONS: usize = 32;

/// 贝塞尔曲线（用于 VMD 动画插值），保存原始控制字节
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterpolationCurve {
    pub x1: u8,
    pub x2: u8,
    pub y1: u8,
    pub y2: u8,
}

impl InterpolationCurve {
    pub fn new(x1: u8, x2: u8, y1: u8, y2: u8) -> Self {
        Self { x1, x2, y1, y2 }
    }

    /// 线性插值
    pub fn linear() -> Self {
        Self::new(20, 107, 20, 107)
    }

    /// 缓存键：x1 | x2 << 8 | y1 << 16 | y2 << 24
    pub fn id(&self) -> u32 {
        self.x1 as u32 | (self.x2 as u32) << 8 | (self.y1 as u32) << 16 | (self.y2 as u32) << 24
    }

    pub fn is_linear(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    /// 评估贝塞尔曲线
    pub fn evaluate(&self, x: f32) -> f32 {
        if self.is_linear() {
            return x;
        }
        bezier_ease(
            self.x1 as f32 / 127.0,
            self.x2 as f32 / 127.0,
            self.y1 as f32 / 127.0,
            self.y2 as f32 / 127.0,
            x,
        )
    }
}

/// 给定线性比例 x，求曲线上对应的 y
///
/// 从 t = x 开始做牛顿迭代求 x(t) = x，再用同一个 t 计算 y(t)。
pub fn bezier_ease(x1: f32, x2: f32, y1: f32, y2: f32, x: f32) -> f32 {
    if x1 == y1 && x2 == y2 {
        return x;
    }

    let (x1, x2, y1, y2, x) = (x1 as f64, x2 as f64, y1 as f64, y2 as f64, x as f64);
    let mut t = x;
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let v = cubic(t, x1, x2) - x;
        if v.abs() < NEWTON_TOLERANCE {
            break;
        }
        let d = cubic_derivative(t, x1, x2);
        if d == 0.0 {
            break;
        }
        t -= v / d;
    }
    cubic(t, y1, y2) as f32
}

/// (1 + 3p1 - 3p2)t³ + (3p2 - 6p1)t² + 3p1·t
fn cubic(t: f64, p1: f64, p2: f64) -> f64 {
    ((1.0 + 3.0 * p1 - 3.0 * p2) * t + (3.0 * p2 - 6.0 * p1)) * t * t + 3.0 * p1 * t
}

fn cubic_derivative(t: f64, p1: f64, p2: f64) -> f64 {
    (3.0 + 9.0 * p1 - 9.0 * p2) * t * t + (6.0 * p2 - 12.0 * p1) * t + 3.0 * p1
}

/// 单次插值内的曲线缓存，共享控制字节的通道只求解一次
///
/// 键为 (曲线 id, x 的位模式)，不同 x 不会取到旧值。
#[derive(Debug, Default)]
pub struct BezierCache {
    values: HashMap<(u32, u32), f32>,
}

impl BezierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始新一次插值
    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn ease(&mut self, curve: InterpolationCurve, x: f32) -> f32 {
        if curve.is_linear() {
            return x;
        }
        *self
            .values
            .entry((curve.id(), x.to_bits()))
            .or_insert_with(|| curve.evaluate(x))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fast_path() {
        for i in 0..=10 {
            let f = i as f32 / 10.0;
            assert_eq!(bezier_ease(0.2, 0.2, 0.2, 0.2, f), f);
            assert_eq!(bezier_ease(0.0, 0.0, 0.0, 0.0, f), f);
            assert_eq!(bezier_ease(1.0, 1.0, 1.0, 1.0, f), f);
            assert_eq!(InterpolationCurve::new(127, 127, 127, 127).evaluate(f), f);
            assert_eq!(InterpolationCurve::new(0, 0, 0, 0).evaluate(f), f);
        }
    }

    #[test]
    fn test_eased_curve_is_monotonic() {
        // ease-in-out
        let curve = InterpolationCurve::new(64, 64, 0, 127);
        let mut last = 0.0;
        for i in 1..=20 {
            let y = curve.evaluate(i as f32 / 20.0);
            assert!(y >= last - 1e-6, "{} < {}", y, last);
            last = y;
        }
        assert!((curve.evaluate(0.5) - 0.5).abs() < 0.01);
        assert!(curve.evaluate(0.1) < 0.1);
        assert!(curve.evaluate(0.9) > 0.9);
    }

    #[test]
    fn test_endpoints() {
        let curve = InterpolationCurve::new(10, 90, 100, 30);
        assert!(curve.evaluate(0.0).abs() < 1e-6);
        assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_curve_id() {
        let curve = InterpolationCurve::new(1, 2, 3, 4);
        assert_eq!(curve.id(), 0x04030201);
    }

    #[test]
    fn test_cache_solves_shared_curve_once() {
        let mut cache = BezierCache::new();
        let curve = InterpolationCurve::new(64, 64, 0, 127);
        let a = cache.ease(curve, 0.3);
        let b = cache.ease(curve, 0.3);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert!(cache.ease(InterpolationCurve::linear(), 0.3) == 0.3);
        assert_eq!(cache.len(), 1);
        cache.reset();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_distinguishes_fractions() {
        let mut cache = BezierCache::new();
        let curve = InterpolationCurve::new(64, 64, 0, 127);
        let early = cache.ease(curve, 0.2);
        let late = cache.ease(curve, 0.8);
        assert_eq!(late, curve.evaluate(0.8));
        assert!(late > early);
        assert_eq!(cache.len(), 2);
    }
}
