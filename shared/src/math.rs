//! Math types stored inside blobs.
//!
//! POD types that can be cast straight out of a loaded byte buffer with
//! `bytemuck`, without pulling a math library into the format crates.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 4x4 transform matrix (column-major, POD type)
///
/// Memory layout (64 bytes): four columns of four `f32`, matching the
/// vector unit's native layout. The translation lives in `cols[3]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix {
    pub cols: [[f32; 4]; 4],
}

impl Matrix {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create from column arrays
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Pure translation
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [x, y, z, 1.0];
        m
    }

    /// Translation component
    pub fn translation(&self) -> [f32; 3] {
        let [x, y, z, _] = self.cols[3];
        [x, y, z]
    }

    /// Convert to flat f32 array (column-major)
    pub fn to_array(&self) -> [f32; 16] {
        bytemuck::cast(self.cols)
    }

    /// Create from flat f32 array (column-major)
    pub fn from_array(arr: [f32; 16]) -> Self {
        Self {
            cols: bytemuck::cast(arr),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_default() {
        assert_eq!(Matrix::default(), Matrix::IDENTITY);
        assert_eq!(Matrix::IDENTITY.translation(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_translation() {
        let m = Matrix::from_translation(1.0, 2.0, 3.0);
        assert_eq!(m.translation(), [1.0, 2.0, 3.0]);
        assert_eq!(m.cols[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_array_layout_is_column_major() {
        let m = Matrix::from_translation(4.0, 5.0, 6.0);
        let arr = m.to_array();
        assert_eq!(&arr[12..16], &[4.0, 5.0, 6.0, 1.0]);
        assert_eq!(Matrix::from_array(arr), m);
    }

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Matrix>(), 64);
        assert_eq!(std::mem::align_of::<Matrix>(), 4);
    }
}
