//! VMD 文件加载器
//!
//! 解析 VMD 动作文件并转换为 Motion 数据。
//! 坐标从左手系转换为右手系：位置 Z 取反，旋转 X、Y 取反。

use glam::Quat;

use crate::io::{Axis, BinaryCursor};
use crate::{FileFormat, FormatErrorKind, Result};

use super::keyframe::{
    BoneKeyframe, CameraKeyframe, LightKeyframe, MorphKeyframe, SelfShadowKeyframe,
};
use super::motion::Motion;

/// VMD 文件头（30 字节）
const VMD_HEADER_V2: &[u8; 30] = b"Vocaloid Motion Data 0002\0\0\0\0\0";
const MODEL_NAME_SIZE: usize = 20;
const TRACK_NAME_SIZE: usize = 15;

const BONE_RECORD_SIZE: usize = 111;
const MORPH_RECORD_SIZE: usize = 23;
const CAMERA_RECORD_SIZE: usize = 61;
const LIGHT_RECORD_SIZE: usize = 28;
const SELF_SHADOW_RECORD_SIZE: usize = 9;

/// 解析 VMD 字节
pub(super) fn decode_vmd(bytes: &[u8]) -> Result<Motion> {
    let mut cursor = BinaryCursor::new(bytes, FileFormat::Vmd);

    if bytes.get(..VMD_HEADER_V2.len()) != Some(&VMD_HEADER_V2[..]) {
        return Err(cursor.error_at(FormatErrorKind::BadMagic, 0));
    }
    cursor.skip(VMD_HEADER_V2.len())?;

    let mut motion = Motion::new();
    motion.model_name = cursor.read_text(MODEL_NAME_SIZE)?;

    let bone_count = cursor.read_count_u32(BONE_RECORD_SIZE)?;
    for _ in 0..bone_count {
        let (name, keyframe) = read_bone_keyframe(&mut cursor)?;
        motion.bone_tracks.entry(name).or_default().push(keyframe);
    }

    let morph_count = cursor.read_count_u32(MORPH_RECORD_SIZE)?;
    for _ in 0..morph_count {
        let name = cursor.read_text(TRACK_NAME_SIZE)?;
        let frame = cursor.read_u32()?;
        let weight = cursor.read_f32()?;
        motion
            .morph_tracks
            .entry(name)
            .or_default()
            .push(MorphKeyframe::new(frame, weight));
    }

    // 旧版导出器在表情段之后直接结束
    if !cursor.is_at_end() {
        read_scene_sections(&mut cursor, &mut motion)?;
    } else {
        log::debug!("VMD 文件在表情段之后结束，没有相机 / 光照 / 阴影数据");
    }

    motion.sort_tracks();

    log::info!(
        "VMD 解析完成: 模型={}, 骨骼轨道={}（{} 帧）, 表情轨道={}（{} 帧）, 相机={}, 光照={}, 阴影={}",
        motion.model_name,
        motion.bone_tracks.len(),
        motion.bone_keyframe_count(),
        motion.morph_tracks.len(),
        motion.morph_keyframe_count(),
        motion.camera_track.len(),
        motion.light_track.len(),
        motion.self_shadow_track.len()
    );

    Ok(motion)
}

fn read_scene_sections(cursor: &mut BinaryCursor<'_>, motion: &mut Motion) -> Result<()> {
    let camera_count = cursor.read_count_u32(CAMERA_RECORD_SIZE)?;
    for _ in 0..camera_count {
        motion.camera_track.push(read_camera_keyframe(cursor)?);
    }
    if cursor.is_at_end() {
        return Ok(());
    }

    let light_count = cursor.read_count_u32(LIGHT_RECORD_SIZE)?;
    for _ in 0..light_count {
        let frame = cursor.read_u32()?;
        let color = cursor.read_vec3(Axis::Raw)?;
        let location = cursor.read_vec3(Axis::Rotation)?;
        motion.light_track.push(LightKeyframe {
            frame,
            color,
            location,
        });
    }
    if cursor.is_at_end() {
        return Ok(());
    }

    let shadow_count = cursor.read_count_u32(SELF_SHADOW_RECORD_SIZE)?;
    for _ in 0..shadow_count {
        let frame = cursor.read_u32()?;
        let mode = cursor.read_u8()?;
        let distance = cursor.read_f32()?;
        motion.self_shadow_track.push(SelfShadowKeyframe {
            frame,
            mode,
            distance,
        });
    }

    if !cursor.is_at_end() {
        log::debug!("VMD 文件末尾有 {} 字节未解析的数据", cursor.remaining());
    }
    Ok(())
}

/// 读取骨骼关键帧（111 字节）
fn read_bone_keyframe(cursor: &mut BinaryCursor<'_>) -> Result<(String, BoneKeyframe)> {
    let name = cursor.read_text(TRACK_NAME_SIZE)?;
    let frame = cursor.read_u32()?;
    let location = cursor.read_vec3(Axis::Position)?;

    let rx = cursor.read_f32()?;
    let ry = cursor.read_f32()?;
    let rz = cursor.read_f32()?;
    let rw = cursor.read_f32()?;
    let rotation = Quat::from_xyzw(-rx, -ry, rz, rw);

    // 前 16 字节按 x1[X,Y,Z,R] y1[X,Y,Z,R] x2[X,Y,Z,R] y2[X,Y,Z,R] 解释，见 BoneKeyframe::curve
    let mut interpolation = [0u8; 64];
    interpolation.copy_from_slice(cursor.read_bytes(64)?);

    Ok((
        name,
        BoneKeyframe {
            frame,
            location,
            rotation,
            interpolation,
        },
    ))
}

/// 读取相机关键帧（61 字节）
fn read_camera_keyframe(cursor: &mut BinaryCursor<'_>) -> Result<CameraKeyframe> {
    let frame = cursor.read_u32()?;
    let distance = -cursor.read_f32()?;
    let location = cursor.read_vec3(Axis::Position)?;
    let rotation = cursor.read_vec3(Axis::Rotation)?;

    let mut interpolation = [0u8; 24];
    interpolation.copy_from_slice(cursor.read_bytes(24)?);

    let view_angle = cursor.read_u32()?;
    let perspective = cursor.read_u8()? == 0;

    Ok(CameraKeyframe {
        frame,
        distance,
        location,
        rotation,
        interpolation,
        view_angle,
        perspective,
    })
}
