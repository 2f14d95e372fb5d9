use std::fmt;

use log::trace;

use crate::{
    item::ItemStack,
    text::TextComponent,
    types::{EntityId, LineId, Position, ViewerId, WorldId},
};

use super::error::CarrierError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CarrierKind {
    /// Hosts a custom name
    Text,
    /// Hosts a dropped item stack
    Item,
    /// Invisible vehicle other carriers ride on
    Mount,
}

impl CarrierKind {
    pub fn name(self) -> &'static str {
        match self {
            CarrierKind::Text => "text",
            CarrierKind::Item => "item",
            CarrierKind::Mount => "mount",
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of a carrier: `Spawning -> Active -> Despawning -> Dead`.
///
/// A spawn that never registers goes straight from `Spawning` to `Dead`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CarrierState {
    Spawning,
    Active,
    Despawning,
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DamageSource {
    Player(ViewerId),
    Entity(EntityId),
    Environment(String),
}

/// A player hit a carrier. Reported instead of applying damage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TouchEvent {
    pub viewer: ViewerId,
    pub entity: EntityId,
    pub line: Option<LineId>,
}

/// The entity behaviour a host would normally drive from its own tick loop.
///
/// Carriers implement every hook as a no-op (or a lock), so nothing the host
/// does can kill, move, rename or persist them.
pub trait HostEntityHooks {
    fn tick(&mut self);
    fn inactive_tick(&mut self);
    /// Returns a touch event for player hits; damage itself is never applied
    fn damage(&mut self, source: &DamageSource, amount: f32) -> Option<TouchEvent>;
    fn is_invulnerable(&self, source: &DamageSource) -> bool;
    fn apply_physics(&mut self, gravity: f64);
    fn set_custom_name(&mut self, name: Option<TextComponent>);
    fn set_custom_name_visible(&mut self, visible: bool);
    fn play_sound(&mut self, sound: &str, volume: f32, pitch: f32);
    fn die(&mut self);
    fn is_collidable(&self) -> bool;
    /// Serialized form for chunk saving. Carriers are never persisted.
    fn save(&self) -> Option<Vec<u8>>;
    fn load(&mut self, data: &[u8]);
}

/// An inert entity that only exists to anchor rendered content at a position
#[derive(Clone, Debug)]
pub struct CarrierEntity {
    id: EntityId,
    kind: CarrierKind,
    world: WorldId,
    position: Position,
    line: Option<LineId>,
    custom_name: Option<TextComponent>,
    custom_name_visible: bool,
    invisible: bool,
    item: Option<ItemStack>,
    vehicle: Option<EntityId>,
    passenger: Option<EntityId>,
    state: CarrierState,
    dead: bool,
    ticks_lived: u32,
}

impl CarrierEntity {
    pub fn new(id: EntityId, kind: CarrierKind, world: WorldId, position: Position) -> Self {
        Self {
            id,
            kind,
            world,
            position,
            line: None,
            custom_name: None,
            custom_name_visible: false,
            // items stay visible, everything else is only a name anchor
            invisible: kind != CarrierKind::Item,
            item: None,
            vehicle: None,
            passenger: None,
            state: CarrierState::Spawning,
            dead: false,
            ticks_lived: 0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    pub fn custom_name(&self) -> Option<&TextComponent> {
        self.custom_name.as_ref()
    }

    pub fn is_custom_name_visible(&self) -> bool {
        self.custom_name_visible
    }

    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    pub fn item(&self) -> Option<&ItemStack> {
        self.item.as_ref()
    }

    pub fn vehicle(&self) -> Option<EntityId> {
        self.vehicle
    }

    pub fn passenger(&self) -> Option<EntityId> {
        self.passenger
    }

    pub fn state(&self) -> CarrierState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_active(&self) -> bool {
        self.state == CarrierState::Active
    }

    pub fn ticks_lived(&self) -> u32 {
        self.ticks_lived
    }

    // Owner controls. Only the sync manager holds carriers mutably outside
    // the hook trait.

    pub fn set_line(&mut self, line: LineId) {
        self.line = Some(line);
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_name(&mut self, name: Option<TextComponent>) {
        self.custom_name_visible = name.is_some();
        self.custom_name = name;
    }

    pub fn set_item(&mut self, item: Option<ItemStack>) {
        self.item = item;
    }

    pub(crate) fn set_vehicle(&mut self, vehicle: Option<EntityId>) {
        self.vehicle = vehicle;
    }

    pub(crate) fn set_passenger(&mut self, passenger: Option<EntityId>) {
        self.passenger = passenger;
    }

    /// Host registration succeeded
    pub fn activate(&mut self) -> Result<(), CarrierError> {
        self.transition(CarrierState::Spawning, CarrierState::Active)
    }

    /// Registration failed; the carrier never becomes visible
    pub fn fail_spawn(&mut self) -> Result<(), CarrierError> {
        self.transition(CarrierState::Spawning, CarrierState::Dead)?;
        self.dead = true;
        Ok(())
    }

    /// Explicit despawn or host chunk unload
    pub fn begin_despawn(&mut self) -> Result<(), CarrierError> {
        self.transition(CarrierState::Active, CarrierState::Despawning)
    }

    /// Host unregistration finished or was unnecessary
    pub fn finish_despawn(&mut self) -> Result<(), CarrierError> {
        self.transition(CarrierState::Despawning, CarrierState::Dead)?;
        self.dead = true;
        Ok(())
    }

    fn transition(&mut self, from: CarrierState, to: CarrierState) -> Result<(), CarrierError> {
        if self.state != from {
            return Err(CarrierError::InvalidTransition {
                entity_id: self.id.to_string(),
                from: self.state,
                to,
            });
        }
        trace!("Carrier {} {:?} -> {:?}", self.id, from, to);
        self.state = to;
        Ok(())
    }
}

impl HostEntityHooks for CarrierEntity {
    fn tick(&mut self) {
        // keep natural expiry from ever triggering
        self.ticks_lived = 0;
    }

    fn inactive_tick(&mut self) {
        self.ticks_lived = 0;
    }

    fn damage(&mut self, source: &DamageSource, _amount: f32) -> Option<TouchEvent> {
        match source {
            DamageSource::Player(viewer) => Some(TouchEvent {
                viewer: *viewer,
                entity: self.id,
                line: self.line,
            }),
            _ => None,
        }
    }

    fn is_invulnerable(&self, _source: &DamageSource) -> bool {
        true
    }

    fn apply_physics(&mut self, _gravity: f64) {}

    fn set_custom_name(&mut self, _name: Option<TextComponent>) {}

    fn set_custom_name_visible(&mut self, _visible: bool) {}

    fn play_sound(&mut self, _sound: &str, _volume: f32, _pitch: f32) {}

    fn die(&mut self) {}

    fn is_collidable(&self) -> bool {
        false
    }

    fn save(&self) -> Option<Vec<u8>> {
        None
    }

    fn load(&mut self, _data: &[u8]) {}
}
