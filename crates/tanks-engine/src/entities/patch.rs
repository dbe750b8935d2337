//! Patch: purely cosmetic decorative ground decal, spec.md §3/§4.9. No
//! collision — carried in snapshots for renderer continuity only.

use serde::{Deserialize, Serialize};
use tanks_core::{Id, Vector2};

pub struct Patch;
pub type PatchId = Id<Patch>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub id: PatchId,
    pub position: Vector2,
    pub size: f32,
    pub type_id: String,
    pub rotation: f32,
}
