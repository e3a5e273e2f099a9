//! Blob file formats shared by the runtime and the offline tools.
//!
//! - [`asset`] - [`AssetReference`], the path-independent asset name
//! - [`asset_table`] - reference-to-path table
//! - [`level`] - placed meshes

pub mod asset;
pub mod asset_table;
pub mod level;

pub use asset::AssetReference;
pub use asset_table::{AssetTableBuilder, AssetTableEntry, AssetTableHeader, AssetTableView};
pub use level::{LevelBuilder, LevelFileHeader, LevelMesh, LevelMeshes, LevelView};
