//! Vertex types for 3D mesh buffers

use bytemuck::{Pod, Zeroable};

/// Vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Byte stride between consecutive vertices
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes, ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes, ready for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Axis-aligned bounds of all vertex positions
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(Vertex::STRIDE, 24);
    }

    #[test]
    fn test_vertex_bytes_len() {
        let mesh = MeshData {
            vertices: vec![Vertex::new([0.0; 3], [0.0, 1.0, 0.0]); 3],
            indices: vec![0, 1, 2],
        };
        assert_eq!(mesh.vertex_bytes().len(), 3 * Vertex::STRIDE);
        assert_eq!(mesh.index_bytes().len(), 12);
    }
}
