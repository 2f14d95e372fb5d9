mod error;
mod manager;
mod render;
mod viewer_scope;

pub use error::{SpawnError, SyncError};
pub use manager::{CarrierHandle, EntitySyncManager};
pub use render::RenderState;
