//! PMD 模型加载器
//!
//! 按固定顺序解析各段；末尾的英文名、toon 纹理、刚体、关节为可选段，
//! 数据在段边界结束时直接返回。

use glam::Vec2;

use crate::config::EngineConfig;
use crate::io::{Axis, BinaryCursor};
use crate::morph::{Morph, MorphKind, VertexMorphOffset};
use crate::physics::{Joint, RigidBody, JOINT_RECORD_SIZE, RIGID_BODY_RECORD_SIZE};
use crate::skeleton::{Bone, BoneKind, IkChain};
use crate::{FileFormat, FormatErrorKind, Result};

use super::{BoneDisplay, EnglishNames, Material, Model, SubMesh, Vertex};

/// "Pmd" + f32 版本号 1.0
const PMD_MAGIC: [u8; 7] = [0x50, 0x6D, 0x64, 0x00, 0x00, 0x80, 0x3F];

const VERTEX_RECORD_SIZE: usize = 38;
const MATERIAL_RECORD_SIZE: usize = 70;
const BONE_RECORD_SIZE: usize = 39;
const IK_MIN_RECORD_SIZE: usize = 11;
const MORPH_MIN_RECORD_SIZE: usize = 25;
const MORPH_OFFSET_SIZE: usize = 16;
const BONE_GROUP_NAME_SIZE: usize = 50;
const BONE_DISPLAY_RECORD_SIZE: usize = 3;
const TOON_TEXTURE_COUNT: usize = 10;
const TOON_NAME_SIZE: usize = 100;

/// 解析 PMD 字节流
pub(super) fn decode_pmd(bytes: &[u8], config: &EngineConfig) -> Result<Model> {
    let mut cursor = BinaryCursor::new(bytes, FileFormat::Pmd);

    if bytes.get(..PMD_MAGIC.len()) != Some(&PMD_MAGIC[..]) {
        return Err(cursor.error(FormatErrorKind::BadMagic));
    }
    cursor.skip(PMD_MAGIC.len())?;

    let mut model = Model {
        name: cursor.read_text(20)?,
        comment: cursor.read_text(256)?,
        ..Model::default()
    };

    let vertices_start = read_vertices(&mut cursor, &mut model)?;
    read_indices(&mut cursor, &mut model)?;
    read_materials(&mut cursor, &mut model)?;
    let bones_start = read_bones(&mut cursor, &mut model, config)?;
    validate_bones(&cursor, &model, bones_start)?;
    validate_vertex_bones(&cursor, &model, vertices_start)?;
    read_iks(&mut cursor, &mut model)?;
    read_morphs(&mut cursor, &mut model)?;
    read_display_metadata(&mut cursor, &mut model)?;
    read_optional_sections(&mut cursor, &mut model)?;

    model.submeshes = SubMesh::from_materials(&model.materials);
    model.build_name_index();

    log::info!(
        "PMD 模型 '{}' 加载完成: {} 顶点, {} 索引, {} 材质, {} 骨骼, {} IK, {} 表情, {} 刚体, {} 关节",
        model.name,
        model.vertices.len(),
        model.indices.len(),
        model.materials.len(),
        model.bones.len(),
        model.iks.len(),
        model.morphs.len(),
        model.rigid_bodies.len(),
        model.joints.len()
    );

    Ok(model)
}

/// 读取顶点段，返回首条记录的偏移（骨骼读完后再校验骨骼索引）
fn read_vertices(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<usize> {
    let count = cursor.read_count_u32(VERTEX_RECORD_SIZE)?;
    let start = cursor.offset();
    model.vertices.reserve(count);

    for _ in 0..count {
        let record_offset = cursor.offset();
        let position = cursor.read_vec3(Axis::Position)?;
        let normal = cursor.read_vec3(Axis::Position)?;
        let uv = Vec2::new(cursor.read_f32()?, cursor.read_f32()?);
        let bone_indices = [cursor.read_u16()?, cursor.read_u16()?];
        let bone_weight = cursor.read_u8()?;
        let edge_flag = cursor.read_u8()?;

        if bone_weight > 100 {
            return Err(cursor.error_at(
                FormatErrorKind::InvalidValue {
                    what: "bone weight",
                    value: bone_weight as i64,
                },
                record_offset,
            ));
        }

        model.vertices.push(Vertex {
            position,
            normal,
            uv,
            bone_indices,
            bone_weight,
            edge_flag,
        });
    }

    Ok(start)
}

fn read_indices(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    let count_offset = cursor.offset();
    let count = cursor.read_count_u32(2)?;
    if count % 3 != 0 {
        return Err(cursor.error_at(
            FormatErrorKind::InvalidValue {
                what: "triangle index count",
                value: count as i64,
            },
            count_offset,
        ));
    }

    let vertex_count = model.vertices.len();
    model.indices.reserve(count);
    for _ in 0..count / 3 {
        let record_offset = cursor.offset();
        let triangle = [cursor.read_u16()?, cursor.read_u16()?, cursor.read_u16()?];
        if let Some(&bad) = triangle.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(cursor.error_at(
                FormatErrorKind::InvalidReference {
                    what: "vertex",
                    index: bad as usize,
                    limit: vertex_count,
                },
                record_offset,
            ));
        }
        // Z 轴翻转后交换前两个索引以保持面朝向
        model.indices.push(triangle[1] as u32);
        model.indices.push(triangle[0] as u32);
        model.indices.push(triangle[2] as u32);
    }
    Ok(())
}

fn read_materials(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    let count = cursor.read_count_u32(MATERIAL_RECORD_SIZE)?;
    model.materials.reserve(count);

    for _ in 0..count {
        let diffuse = cursor.read_vec3(Axis::Raw)?;
        let alpha = cursor.read_f32()?;
        let shininess = cursor.read_f32()?;
        let specular = cursor.read_vec3(Axis::Raw)?;
        let ambient = cursor.read_vec3(Axis::Raw)?;
        let toon_index = cursor.read_i8()?;
        let edge_flag = cursor.read_u8()?;
        let face_vertex_count = cursor.read_u32()?;
        let raw_texture = cursor.read_text(20)?;
        let (texture_file_name, sphere_map_file_name) = Material::split_texture_names(&raw_texture);

        model.materials.push(Material {
            diffuse,
            alpha,
            shininess,
            specular,
            ambient,
            toon_index,
            edge_flag,
            face_vertex_count,
            texture_file_name,
            sphere_map_file_name,
        });
    }
    Ok(())
}

fn read_bones(cursor: &mut BinaryCursor<'_>, model: &mut Model, config: &EngineConfig) -> Result<usize> {
    let count = cursor.read_count_u16(BONE_RECORD_SIZE)?;
    let start = cursor.offset();
    model.bones.reserve(count);

    for _ in 0..count {
        let mut bone = Bone::new(cursor.read_text(20)?);
        bone.parent_index = cursor.read_u16()?;
        bone.tail_index = cursor.read_u16()?;
        bone.kind = BoneKind::from(cursor.read_u8()?);
        bone.ik_parent_index = cursor.read_u16()?;
        bone.head_position = cursor.read_vec3(Axis::Position)?;
        bone.planar_constraint = config.is_planar_constrained(&bone.name);
        model.bones.push(bone);
    }
    Ok(start)
}

/// 父骨骼必须有效，且沿父链能到达根骨骼
fn validate_bones(cursor: &BinaryCursor<'_>, model: &Model, bones_start: usize) -> Result<()> {
    let bone_count = model.bones.len();
    let record_offset = |i: usize| bones_start + i * BONE_RECORD_SIZE;

    for (i, bone) in model.bones.iter().enumerate() {
        if let Some(parent) = bone.parent() {
            if parent >= bone_count {
                return Err(cursor.error_at(
                    FormatErrorKind::InvalidReference {
                        what: "parent bone",
                        index: parent,
                        limit: bone_count,
                    },
                    record_offset(i),
                ));
            }
        }
    }

    // 0 = 未访问, 1 = 当前链上, 2 = 已确认到达根
    let mut state = vec![0u8; bone_count];
    let mut chain = Vec::new();
    for start in 0..bone_count {
        let mut current = Some(start);
        while let Some(i) = current {
            match state[i] {
                2 => break,
                1 => {
                    return Err(cursor.error_at(FormatErrorKind::BoneCycle { bone: i }, record_offset(i)));
                }
                _ => {
                    state[i] = 1;
                    chain.push(i);
                    current = model.bones[i].parent();
                }
            }
        }
        for i in chain.drain(..) {
            state[i] = 2;
        }
    }
    Ok(())
}

fn validate_vertex_bones(cursor: &BinaryCursor<'_>, model: &Model, vertices_start: usize) -> Result<()> {
    let bone_count = model.bones.len();
    for (i, vertex) in model.vertices.iter().enumerate() {
        if let Some(&bad) = vertex.bone_indices.iter().find(|&&b| b as usize >= bone_count) {
            return Err(cursor.error_at(
                FormatErrorKind::InvalidReference {
                    what: "vertex bone",
                    index: bad as usize,
                    limit: bone_count,
                },
                vertices_start + i * VERTEX_RECORD_SIZE,
            ));
        }
    }
    Ok(())
}

fn read_iks(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    let count = cursor.read_count_u16(IK_MIN_RECORD_SIZE)?;
    let bone_count = model.bones.len();
    let check_bone = |cursor: &BinaryCursor<'_>, index: u16, offset: usize| -> Result<()> {
        if index as usize >= bone_count {
            return Err(cursor.error_at(
                FormatErrorKind::InvalidReference {
                    what: "IK bone",
                    index: index as usize,
                    limit: bone_count,
                },
                offset,
            ));
        }
        Ok(())
    };

    model.iks.reserve(count);
    for _ in 0..count {
        let record_offset = cursor.offset();
        let bone_index = cursor.read_u16()?;
        let target_bone_index = cursor.read_u16()?;
        let chain_length = cursor.read_u8()? as usize;
        let iterations = cursor.read_u16()?;
        let control_weight = cursor.read_f32()?;
        cursor.ensure_records(chain_length, 2)?;
        let child_bones = (0..chain_length)
            .map(|_| cursor.read_u16())
            .collect::<Result<Vec<u16>>>()?;

        check_bone(cursor, bone_index, record_offset)?;
        check_bone(cursor, target_bone_index, record_offset)?;
        for &link in &child_bones {
            check_bone(cursor, link, record_offset)?;
        }

        model.iks.push(IkChain {
            bone_index,
            target_bone_index,
            child_bones,
            iterations,
            control_weight,
        });
    }
    Ok(())
}

fn read_morphs(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    let count = cursor.read_count_u16(MORPH_MIN_RECORD_SIZE)?;
    let vertex_count = model.vertices.len();
    model.morphs.reserve(count);

    for morph_index in 0..count {
        let record_offset = cursor.offset();
        let name = cursor.read_text(20)?;
        let offset_count = cursor.read_u32()? as usize;
        let kind_byte = cursor.read_u8()?;
        let kind = MorphKind::from(kind_byte);
        cursor.ensure_records(offset_count, MORPH_OFFSET_SIZE)?;

        if morph_index == 0 && kind != MorphKind::Base {
            return Err(cursor.error_at(
                FormatErrorKind::InvalidValue {
                    what: "first morph type",
                    value: kind_byte as i64,
                },
                record_offset,
            ));
        }

        // base 的索引指向顶点，其余表情的索引指向 base 的偏移列表
        let limit = match model.morphs.first() {
            Some(base) if morph_index > 0 => base.vertex_offsets.len(),
            _ => vertex_count,
        };
        let what = if morph_index == 0 { "base morph vertex" } else { "base morph entry" };

        let mut morph = Morph::new(name, kind);
        morph.vertex_offsets.reserve(offset_count);
        for _ in 0..offset_count {
            let entry_offset = cursor.offset();
            let vertex_index = cursor.read_u32()?;
            let offset = cursor.read_vec3(Axis::Position)?;
            if vertex_index as usize >= limit {
                return Err(cursor.error_at(
                    FormatErrorKind::InvalidReference {
                        what,
                        index: vertex_index as usize,
                        limit,
                    },
                    entry_offset,
                ));
            }
            morph.vertex_offsets.push(VertexMorphOffset { vertex_index, offset });
        }
        model.morphs.push(morph);
    }
    Ok(())
}

fn read_display_metadata(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    let order_count = cursor.read_count_u8(2)?;
    model.morph_display_order = (0..order_count)
        .map(|_| cursor.read_u16())
        .collect::<Result<_>>()?;

    let group_count = cursor.read_count_u8(BONE_GROUP_NAME_SIZE)?;
    model.bone_group_names = (0..group_count)
        .map(|_| cursor.read_text(BONE_GROUP_NAME_SIZE))
        .collect::<Result<_>>()?;

    let table_count = cursor.read_count_u32(BONE_DISPLAY_RECORD_SIZE)?;
    model.bone_display_table = (0..table_count)
        .map(|_| {
            Ok(BoneDisplay {
                bone_index: cursor.read_u16()?,
                group_index: cursor.read_u8()?,
            })
        })
        .collect::<Result<_>>()?;
    Ok(())
}

/// 可选段：每段之前检查是否还有数据
fn read_optional_sections(cursor: &mut BinaryCursor<'_>, model: &mut Model) -> Result<()> {
    if cursor.is_at_end() {
        log::debug!("PMD 没有扩展段");
        return Ok(());
    }

    let has_english = cursor.read_u8()? != 0;
    if has_english {
        let mut english = EnglishNames {
            name: cursor.read_text(20)?,
            comment: cursor.read_text(256)?,
            ..EnglishNames::default()
        };
        english.bone_names = read_text_list(cursor, model.bones.len(), 20)?;
        english.morph_names = read_text_list(cursor, model.morphs.len().saturating_sub(1), 20)?;
        english.bone_group_names = read_text_list(cursor, model.bone_group_names.len(), BONE_GROUP_NAME_SIZE)?;
        model.english = Some(english);
    }

    if cursor.is_at_end() {
        log::debug!("PMD 没有 toon 纹理段");
        return Ok(());
    }
    model.toon_file_names = read_text_list(cursor, TOON_TEXTURE_COUNT, TOON_NAME_SIZE)?;

    if cursor.is_at_end() {
        log::debug!("PMD 没有刚体段");
        return Ok(());
    }
    let body_count = cursor.read_count_u32(RIGID_BODY_RECORD_SIZE)?;
    model.rigid_bodies = (0..body_count)
        .map(|_| RigidBody::read(cursor))
        .collect::<Result<_>>()?;

    if cursor.is_at_end() {
        log::debug!("PMD 没有关节段");
        return Ok(());
    }
    let joint_count = cursor.read_count_u32(JOINT_RECORD_SIZE)?;
    model.joints = (0..joint_count)
        .map(|_| Joint::read(cursor))
        .collect::<Result<_>>()?;

    if !cursor.is_at_end() {
        log::debug!("PMD 末尾有 {} 字节未解析", cursor.remaining());
    }
    Ok(())
}

fn read_text_list(cursor: &mut BinaryCursor<'_>, count: usize, len: usize) -> Result<Vec<String>> {
    cursor.ensure_records(count, len)?;
    (0..count).map(|_| cursor.read_text(len)).collect()
}
