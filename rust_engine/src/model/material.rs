//! PMD 材质定义

use glam::Vec3;

/// PMD 材质
#[derive(Clone, Debug)]
pub struct Material {
    pub diffuse: Vec3,
    pub alpha: f32,
    pub shininess: f32,
    pub specular: Vec3,
    pub ambient: Vec3,
    /// toon 纹理索引，-1 表示不使用
    pub toon_index: i8,
    pub edge_flag: u8,
    /// 该材质使用的索引数量
    pub face_vertex_count: u32,
    pub texture_file_name: String,
    /// `*` 之后的球面贴图文件名
    pub sphere_map_file_name: Option<String>,
}

impl Material {
    /// 球面贴图是否为加算模式（.spa）
    pub fn is_sphere_map_additive(&self) -> bool {
        self.sphere_map_file_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".spa"))
    }

    /// 拆分 `texture*sphere` 形式的文件名
    pub fn split_texture_names(raw: &str) -> (String, Option<String>) {
        match raw.split_once('*') {
            Some((texture, sphere)) => (texture.to_string(), Some(sphere.to_string())),
            None => {
                let lower = raw.to_ascii_lowercase();
                if lower.ends_with(".sph") || lower.ends_with(".spa") {
                    (String::new(), Some(raw.to_string()))
                } else {
                    (raw.to_string(), None)
                }
            }
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            alpha: 1.0,
            shininess: 0.0,
            specular: Vec3::ZERO,
            ambient: Vec3::splat(0.5),
            toon_index: -1,
            edge_flag: 0,
            face_vertex_count: 0,
            texture_file_name: String::new(),
            sphere_map_file_name: None,
        }
    }
}
