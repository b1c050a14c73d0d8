//! Windowed tiling and inventory engine.
//!
//! This crate turns large gridded weather fields and per-layer
//! transformer attention tensors into a tree of small raw binary
//! tiles, plus a JSON inventory of what exists for which date/time:
//!
//! ```text
//! input_surface.npy / input_upper.npy        {layer}.npy
//!        │                                       │
//!        ▼                                       ▼
//!  map tiling driver                   attention tiling driver
//!  (shift + partition per                (window/head slicing)
//!   window config)                               │
//!        │                                       │
//!        └──────────────► TileStore ◄────────────┘
//!                 root/date/time/.../*.bin
//!                            │
//!                            ▼
//!                    inventory builder
//!                   available_data.json
//! ```
//!
//! Tile files are raw native-endian f32, row-major, no header; the
//! visualization client reconstructs shapes from the window config and
//! the channel count.

pub mod attention;
pub mod field;
pub mod inventory;
pub mod map_tiling;
pub mod npy;
pub mod partition;
pub mod shift;
pub mod store;

// Re-export commonly used types at crate root
pub use attention::tile_attention;
pub use field::{AttentionTensor, GridField};
pub use inventory::{build_inventory, write_inventory, Inventory};
pub use map_tiling::tile_map;
pub use npy::{load_attention_tensor, load_grid_field};
pub use partition::{partition, tile_count, Tile, TilePartition};
pub use shift::shift;
pub use store::TileStore;
pub use tiles_common::{TilesError, TilesResult};
