//! 关键帧查找与基础插值

use glam::{Quat, Vec3};

/// 在升序帧号数组中二分查找最后一个 <= query 的位置
///
/// query 在最后一帧之后返回最后一个索引；在第一帧之前返回 0。
pub fn previous_bracket(frames: &[u32], query: u32) -> usize {
    frames.partition_point(|&f| f <= query).saturating_sub(1)
}

/// (x - x0) / (x1 - x0)
pub fn fraction(x: f32, x0: f32, x1: f32) -> f32 {
    if x1 == x0 {
        return 0.0;
    }
    (x - x0) / (x1 - x0)
}

pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 逐分量插值
pub fn lerp_element_wise(a: Vec3, b: Vec3, t: Vec3) -> Vec3 {
    Vec3::new(
        lerp_f32(a.x, b.x, t.x),
        lerp_f32(a.y, b.y, t.y),
        lerp_f32(a.z, b.z, t.z),
    )
}

/// 归一化旋转，零长度时返回单位旋转
pub fn normalize_rotation(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq == 0.0 || !len_sq.is_finite() {
        return Quat::IDENTITY;
    }
    q.normalize()
}

/// 最短路径球面插值，点积为负时先取反 q1
///
/// 输入不要求单位长度，两端先归一化。
pub fn slerp_shortest(q1: Quat, q2: Quat, t: f32) -> Quat {
    let q1 = normalize_rotation(q1);
    let q2 = normalize_rotation(q2);
    let q1 = if q1.dot(q2) < 0.0 { -q1 } else { q1 };
    let dot = q1.dot(q2).clamp(-1.0, 1.0);

    let (s1, s2) = if dot > 0.9995 {
        (1.0 - t, t)
    } else {
        let theta = dot.acos();
        let sin_theta = theta.sin();
        (
            ((1.0 - t) * theta).sin() / sin_theta,
            (t * theta).sin() / sin_theta,
        )
    };

    let q = q1 * s1 + q2 * s2;
    if q.length_squared() == 0.0 {
        return Quat::IDENTITY;
    }
    q.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_same_rotation(a: Quat, b: Quat) {
        assert!(a.dot(b).abs() > 1.0 - 1e-5, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_previous_bracket() {
        let frames = [0, 10, 20, 30];
        assert_eq!(previous_bracket(&frames, 0), 0);
        assert_eq!(previous_bracket(&frames, 9), 0);
        assert_eq!(previous_bracket(&frames, 10), 1);
        assert_eq!(previous_bracket(&frames, 15), 1);
        assert_eq!(previous_bracket(&frames, 30), 3);
        assert_eq!(previous_bracket(&frames, 35), 3);
        assert_eq!(previous_bracket(&[5, 10], 2), 0);
        assert_eq!(previous_bracket(&[], 2), 0);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(fraction(15.0, 10.0, 20.0), 0.5);
        assert_eq!(fraction(10.0, 10.0, 20.0), 0.0);
        assert_eq!(fraction(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_slerp_negated_input_is_equivalent() {
        let a = Quat::from_rotation_y(0.2);
        let b = Quat::from_rotation_y(1.4);
        for i in 0..=4 {
            let t = i as f32 / 4.0;
            let direct = slerp_shortest(a, b, t);
            let negated = slerp_shortest(-a, b, t);
            assert_same_rotation(direct, negated);
            assert_same_rotation(direct, Quat::from_rotation_y(0.2 + 1.2 * t));
        }
    }

    #[test]
    fn test_slerp_antipodal_inputs_stay_put() {
        let q = Quat::from_rotation_x(0.7);
        for i in 0..=4 {
            let t = i as f32 / 4.0;
            assert_same_rotation(slerp_shortest(q, -q, t), q);
        }
    }

    #[test]
    fn test_slerp_scaled_inputs_use_true_angle() {
        let a = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
        let b = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2) * 3.0;
        let q = slerp_shortest(a, b, 0.5);
        assert_same_rotation(q, Quat::from_rotation_z(std::f32::consts::FRAC_PI_4));
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 2.0)), Quat::IDENTITY);
        assert_eq!(normalize_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)), Quat::IDENTITY);
    }

    #[test]
    fn test_slerp_is_normalized() {
        let a = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
        let b = Quat::from_rotation_x(0.5);
        let q = slerp_shortest(a, b, 0.5);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }
}
