//! 测试用的 PMD / VMD 字节构造器
//!
//! 坐标按文件内的左手系写入，解析时再做坐标转换。

use encoding_rs::SHIFT_JIS;

fn put_text(out: &mut Vec<u8>, text: &str, len: usize) {
    let (encoded, _, _) = SHIFT_JIS.encode(text);
    let mut block = encoded.into_owned();
    block.resize(len, 0);
    out.extend_from_slice(&block);
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_vec3(out: &mut Vec<u8>, v: [f32; 3]) {
    for c in v {
        put_f32(out, c);
    }
}

/// PMD 构造器
#[derive(Default)]
pub struct PmdBuilder {
    pub name: String,
    vertices: Vec<u8>,
    vertex_count: u32,
    indices: Vec<u16>,
    materials: Vec<u8>,
    material_count: u32,
    bones: Vec<u8>,
    bone_count: u16,
    iks: Vec<u8>,
    ik_count: u16,
    morphs: Vec<u8>,
    morph_count: u16,
    group_names: Vec<String>,
    /// 写入到显示元数据之后的原始字节（可选段）
    pub trailer: Vec<u8>,
}

impl PmdBuilder {
    pub fn new() -> Self {
        Self {
            name: "test".to_string(),
            ..Self::default()
        }
    }

    pub fn vertex(&mut self, position: [f32; 3], bone1: u16, bone2: u16, weight: u8) -> &mut Self {
        let out = &mut self.vertices;
        put_vec3(out, position);
        put_vec3(out, [0.0, 0.0, 1.0]);
        put_f32(out, 0.25);
        put_f32(out, 0.75);
        put_u16(out, bone1);
        put_u16(out, bone2);
        out.push(weight);
        out.push(1);
        self.vertex_count += 1;
        self
    }

    pub fn triangle(&mut self, a: u16, b: u16, c: u16) -> &mut Self {
        self.indices.extend_from_slice(&[a, b, c]);
        self
    }

    pub fn material(&mut self, face_vertex_count: u32, texture: &str) -> &mut Self {
        let out = &mut self.materials;
        put_vec3(out, [0.8, 0.7, 0.6]);
        put_f32(out, 1.0);
        put_f32(out, 5.0);
        put_vec3(out, [0.1, 0.1, 0.1]);
        put_vec3(out, [0.4, 0.4, 0.4]);
        out.push(0xFF);
        out.push(1);
        put_u32(out, face_vertex_count);
        put_text(out, texture, 20);
        self.material_count += 1;
        self
    }

    pub fn bone(&mut self, name: &str, parent: u16, head: [f32; 3]) -> &mut Self {
        let out = &mut self.bones;
        put_text(out, name, 20);
        put_u16(out, parent);
        put_u16(out, 0xFFFF);
        out.push(1);
        put_u16(out, 0);
        put_vec3(out, head);
        self.bone_count += 1;
        self
    }

    pub fn ik(&mut self, bone: u16, target: u16, chain: &[u16], iterations: u16, control_weight: f32) -> &mut Self {
        let out = &mut self.iks;
        put_u16(out, bone);
        put_u16(out, target);
        out.push(chain.len() as u8);
        put_u16(out, iterations);
        put_f32(out, control_weight);
        for &link in chain {
            put_u16(out, link);
        }
        self.ik_count += 1;
        self
    }

    pub fn morph(&mut self, name: &str, kind: u8, offsets: &[(u32, [f32; 3])]) -> &mut Self {
        let out = &mut self.morphs;
        put_text(out, name, 20);
        put_u32(out, offsets.len() as u32);
        out.push(kind);
        for &(index, offset) in offsets {
            put_u32(out, index);
            put_vec3(out, offset);
        }
        self.morph_count += 1;
        self
    }

    pub fn bone_group(&mut self, name: &str) -> &mut Self {
        self.group_names.push(name.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0x50, 0x6D, 0x64, 0x00, 0x00, 0x80, 0x3F];
        put_text(&mut out, &self.name, 20);
        put_text(&mut out, "comment", 256);

        put_u32(&mut out, self.vertex_count);
        out.extend_from_slice(&self.vertices);

        put_u32(&mut out, self.indices.len() as u32);
        for &i in &self.indices {
            put_u16(&mut out, i);
        }

        put_u32(&mut out, self.material_count);
        out.extend_from_slice(&self.materials);

        put_u16(&mut out, self.bone_count);
        out.extend_from_slice(&self.bones);

        put_u16(&mut out, self.ik_count);
        out.extend_from_slice(&self.iks);

        put_u16(&mut out, self.morph_count);
        out.extend_from_slice(&self.morphs);

        // 表情显示顺序
        let shown = self.morph_count.saturating_sub(1);
        out.push(shown as u8);
        for i in 0..shown {
            put_u16(&mut out, i + 1);
        }

        out.push(self.group_names.len() as u8);
        for name in &self.group_names {
            put_text(&mut out, name, 50);
        }

        // 骨骼显示表
        put_u32(&mut out, 0);

        out.extend_from_slice(&self.trailer);
        out
    }
}

/// 可选段构造
pub mod pmd_trailer {
    use super::*;

    pub fn english(out: &mut Vec<u8>, name: &str, bone_names: &[&str], morph_names: &[&str], group_names: &[&str]) {
        out.push(1);
        put_text(out, name, 20);
        put_text(out, "english comment", 256);
        for n in bone_names {
            put_text(out, n, 20);
        }
        for n in morph_names {
            put_text(out, n, 20);
        }
        for n in group_names {
            put_text(out, n, 50);
        }
    }

    pub fn toon_names(out: &mut Vec<u8>) {
        for i in 1..=10 {
            put_text(out, &format!("toon{:02}.bmp", i), 100);
        }
    }

    pub fn rigid_body(out: &mut Vec<u8>, name: &str, bone: u16, mask: u16, position: [f32; 3], rotation: [f32; 3]) {
        put_text(out, name, 20);
        put_u16(out, bone);
        out.push(2);
        put_u16(out, mask);
        out.push(1);
        put_vec3(out, [1.0, 2.0, 3.0]);
        put_vec3(out, position);
        put_vec3(out, rotation);
        for v in [1.0, 0.5, 0.5, 0.0, 0.5] {
            put_f32(out, v);
        }
        out.push(1);
    }

    pub fn joint(out: &mut Vec<u8>, name: &str, a: u32, b: u32, position: [f32; 3], rotation: [f32; 3]) {
        put_text(out, name, 20);
        put_u32(out, a);
        put_u32(out, b);
        put_vec3(out, position);
        put_vec3(out, rotation);
        for _ in 0..6 {
            put_vec3(out, [1.0, 2.0, 3.0]);
        }
    }

    pub fn count(out: &mut Vec<u8>, n: u32) {
        put_u32(out, n);
    }
}

/// VMD 构造器
pub struct VmdBuilder {
    model_name: String,
    bones: Vec<Vec<u8>>,
    morphs: Vec<Vec<u8>>,
    cameras: Vec<Vec<u8>>,
    lights: Vec<Vec<u8>>,
    shadows: Vec<Vec<u8>>,
    /// 为 false 时在表情段之后结束（旧版导出器）
    pub write_scene_sections: bool,
}

impl VmdBuilder {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            bones: Vec::new(),
            morphs: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            shadows: Vec::new(),
            write_scene_sections: true,
        }
    }

    /// 位置与旋转按文件坐标写入；`curves` 为各通道 (x1, y1, x2, y2)，顺序 X/Y/Z/R
    pub fn bone(
        &mut self,
        name: &str,
        frame: u32,
        location: [f32; 3],
        rotation: [f32; 4],
        curves: [[u8; 4]; 4],
    ) -> &mut Self {
        let mut out = Vec::new();
        put_text(&mut out, name, 15);
        put_u32(&mut out, frame);
        put_vec3(&mut out, location);
        for c in rotation {
            put_f32(&mut out, c);
        }
        let mut interpolation = [0u8; 64];
        for (channel, curve) in curves.iter().enumerate() {
            interpolation[channel] = curve[0];
            interpolation[4 + channel] = curve[1];
            interpolation[8 + channel] = curve[2];
            interpolation[12 + channel] = curve[3];
        }
        out.extend_from_slice(&interpolation);
        self.bones.push(out);
        self
    }

    pub fn morph(&mut self, name: &str, frame: u32, weight: f32) -> &mut Self {
        let mut out = Vec::new();
        put_text(&mut out, name, 15);
        put_u32(&mut out, frame);
        put_f32(&mut out, weight);
        self.morphs.push(out);
        self
    }

    /// `curves` 为各通道 (x1, x2, y1, y2)，顺序 X/Y/Z/R/距离/视角
    pub fn camera(
        &mut self,
        frame: u32,
        distance: f32,
        location: [f32; 3],
        rotation: [f32; 3],
        curves: [[u8; 4]; 6],
        view_angle: u32,
    ) -> &mut Self {
        let mut out = Vec::new();
        put_u32(&mut out, frame);
        put_f32(&mut out, distance);
        put_vec3(&mut out, location);
        put_vec3(&mut out, rotation);
        for curve in curves {
            out.extend_from_slice(&curve);
        }
        put_u32(&mut out, view_angle);
        out.push(0);
        self.cameras.push(out);
        self
    }

    pub fn light(&mut self, frame: u32, color: [f32; 3], location: [f32; 3]) -> &mut Self {
        let mut out = Vec::new();
        put_u32(&mut out, frame);
        put_vec3(&mut out, color);
        put_vec3(&mut out, location);
        self.lights.push(out);
        self
    }

    pub fn self_shadow(&mut self, frame: u32, mode: u8, distance: f32) -> &mut Self {
        let mut out = Vec::new();
        put_u32(&mut out, frame);
        out.push(mode);
        put_f32(&mut out, distance);
        self.shadows.push(out);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"Vocaloid Motion Data 0002\0\0\0\0\0".to_vec();
        put_text(&mut out, &self.model_name, 20);

        let mut sections = vec![&self.bones, &self.morphs];
        if self.write_scene_sections {
            sections.extend([&self.cameras, &self.lights, &self.shadows]);
        }
        for records in sections {
            put_u32(&mut out, records.len() as u32);
            for record in records {
                out.extend_from_slice(record);
            }
        }
        out
    }
}

/// 骨骼通道的线性曲线 (x1, y1, x2, y2)
pub const BONE_LINEAR: [u8; 4] = [20, 20, 107, 107];
/// 相机通道的线性曲线 (x1, x2, y1, y2)
pub const CAMERA_LINEAR: [u8; 4] = [20, 107, 20, 107];
