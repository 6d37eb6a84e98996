use std::ops::Range;

use glam::Vec3;
use thiserror::Error;

/// A run of indices drawn with one material slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Group {
    /// First index (not triangle) of the run.
    pub start: u32,
    /// Number of indices in the run.
    pub count: u32,
    /// Material slot used for the run.
    pub material_index: usize,
}

impl Group {
    #[inline]
    pub const fn new(start: u32, count: u32, material_index: usize) -> Self {
        Self {
            start,
            count,
            material_index,
        }
    }

    #[inline]
    pub fn range(self) -> Range<u32> {
        self.start..self.start + self.count
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("geometry has {positions} positions but {uvs} uvs")]
    UvCountMismatch { positions: usize, uvs: usize },

    #[error("geometry has {positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },

    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("group {start}..{end} exceeds {index_count} indices")]
    GroupOutOfRange { start: u32, end: u64, index_count: usize },
}

/// Indexed triangle geometry with a UV channel.
///
/// Owned CPU-side by the host scene and uploaded per render call. UVs are in
/// glTF convention: origin top-left, V grows downward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Option<Vec<[f32; 3]>>,
    indices: Vec<u32>,
    groups: Vec<Group>,
}

impl Geometry {
    pub fn new(
        positions: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Result<Self, GeometryError> {
        if positions.len() != uvs.len() {
            return Err(GeometryError::UvCountMismatch {
                positions: positions.len(),
                uvs: uvs.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(GeometryError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        Ok(Self {
            positions,
            uvs,
            normals: None,
            indices,
            groups: Vec::new(),
        })
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Result<Self, GeometryError> {
        if normals.len() != self.positions.len() {
            return Err(GeometryError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: normals.len(),
            });
        }
        self.normals = Some(normals);
        Ok(self)
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Result<Self, GeometryError> {
        let index_count = self.indices.len();
        if let Some(g) = groups
            .iter()
            .find(|g| u64::from(g.start) + u64::from(g.count) > index_count as u64)
        {
            return Err(GeometryError::GroupOutOfRange {
                start: g.start,
                end: u64::from(g.start) + u64::from(g.count),
                index_count,
            });
        }
        self.groups = groups;
        Ok(self)
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[inline]
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    #[inline]
    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Index range drawn for a material slot.
    ///
    /// Without groups the whole index buffer belongs to slot 0. With groups,
    /// the first group bound to `slot` is used.
    pub fn slot_range(&self, slot: usize) -> Option<Range<u32>> {
        if self.groups.is_empty() {
            return (slot == 0).then(|| 0..self.index_count());
        }
        self.groups
            .iter()
            .find(|g| g.material_index == slot)
            .map(|g| g.range())
    }

    /// Smooth per-vertex normals, area-weighted over adjacent triangles.
    ///
    /// Vertices not referenced by any triangle get +Z.
    pub fn compute_vertex_normals(&self) -> Vec<[f32; 3]> {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            // Unnormalized cross product: magnitude is twice the triangle area.
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }

        acc.into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
            .collect()
    }

    /// Returns a copy with normals filled in when they are missing.
    pub fn with_computed_normals(&self) -> Self {
        let mut out = self.clone();
        if out.normals.is_none() {
            out.normals = Some(self.compute_vertex_normals());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_uvs() {
        let err = Geometry::new(vec![[0.0; 3]; 3], vec![[0.0; 2]; 2], vec![0, 1, 2]).unwrap_err();
        assert_eq!(err, GeometryError::UvCountMismatch { positions: 3, uvs: 2 });
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let err = Geometry::new(vec![[0.0; 3]; 3], vec![[0.0; 2]; 3], vec![0, 1, 3]).unwrap_err();
        assert!(matches!(err, GeometryError::IndexOutOfRange { index: 3, .. }));
    }

    #[test]
    fn rejects_groups_past_the_index_buffer() {
        let err = quad().with_groups(vec![Group::new(3, 6, 0)]).unwrap_err();
        assert!(matches!(err, GeometryError::GroupOutOfRange { .. }));
    }

    #[test]
    fn group_end_past_u32_is_reported_not_wrapped() {
        let err = quad().with_groups(vec![Group::new(u32::MAX, 1, 0)]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::GroupOutOfRange {
                start: u32::MAX,
                end: u64::from(u32::MAX) + 1,
                index_count: 6,
            }
        );
    }

    #[test]
    fn ccw_quad_normals_face_plus_z() {
        for n in quad().compute_vertex_normals() {
            assert!((Vec3::from(n) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn with_computed_normals_keeps_existing_normals() {
        let g = quad().with_normals(vec![[0.0, 1.0, 0.0]; 4]).unwrap();
        assert_eq!(g.with_computed_normals().normals().unwrap()[0], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn slot_range_without_groups_covers_everything() {
        let g = quad();
        assert_eq!(g.slot_range(0), Some(0..6));
        assert_eq!(g.slot_range(1), None);
    }

    #[test]
    fn slot_range_uses_first_matching_group() {
        let g = quad()
            .with_groups(vec![Group::new(0, 3, 1), Group::new(3, 3, 0)])
            .unwrap();
        assert_eq!(g.slot_range(0), Some(3..6));
        assert_eq!(g.slot_range(1), Some(0..3));
        assert_eq!(g.slot_range(2), None);
    }
}
