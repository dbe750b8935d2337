pub mod patch;
pub mod player;
pub mod shell;
pub mod state;
pub mod tank;
pub mod tree;
pub mod upgrade;

pub use patch::{Patch, PatchId};
pub use player::{AiMetadata, Player, PlayerId};
pub use shell::{Shell, ShellId};
pub use state::GameState;
pub use tank::{Tank, TankAttributes, TankId};
pub use tree::{Tree, TreeId};
pub use upgrade::{Upgrade, UpgradeId};
