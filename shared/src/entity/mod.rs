mod carrier;
mod error;
mod store;

pub use carrier::{
    CarrierEntity, CarrierKind, CarrierState, DamageSource, HostEntityHooks, TouchEvent,
};
pub use error::CarrierError;
pub use store::CarrierStore;
