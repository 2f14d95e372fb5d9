//! Holograms: ordered lines laid out top-down, each rendered by carriers the
//! [`EntitySyncManager`] owns.

mod error;
mod line;

pub use error::HologramError;
pub use line::{HologramLine, LineContent, ITEM_LINE_HEIGHT, TEXT_LINE_HEIGHT};

use log::{debug, warn};

use holosync_shared::{CarrierKind, ChunkPos, LineId, Position, WorldId};

use crate::sync::{CarrierHandle, EntitySyncManager, RenderState, SpawnError};

use line::LineCarriers;

/// A stack of lines at one position.
///
/// Editing a hologram only changes its layout. [`Hologram::sync`] then makes
/// the carriers match: new lines are spawned, moved lines are moved, changed
/// content is pushed and removed lines are despawned.
pub struct Hologram {
    world: WorldId,
    position: Position,
    space_between_lines: f64,
    lines: Vec<HologramLine>,
    next_line_id: u64,
    // carriers of removed lines, despawned on the next sync
    retired: Vec<LineCarriers>,
    deleted: bool,
}

impl Hologram {
    pub fn new(world: WorldId, position: Position, space_between_lines: f64) -> Self {
        Self {
            world,
            position,
            space_between_lines,
            lines: Vec::new(),
            next_line_id: 0,
            retired: Vec::new(),
            deleted: false,
        }
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn lines(&self) -> &[HologramLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&HologramLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Total height from the top of the first line to the bottom of the last
    pub fn height(&self) -> f64 {
        let lines: f64 = self.lines.iter().map(HologramLine::height).sum();
        let gaps = self.lines.len().saturating_sub(1) as f64;
        lines + gaps * self.space_between_lines
    }

    // Editing

    pub fn add_line(&mut self, content: LineContent) -> Result<LineId, HologramError> {
        self.check_not_deleted()?;
        let line = self.new_line(content);
        let id = line.id();
        self.lines.push(line);
        self.update_line_positions();
        Ok(id)
    }

    /// Inserts a line so that it ends up at `index`
    pub fn insert_line(&mut self, index: usize, content: LineContent) -> Result<LineId, HologramError> {
        self.check_not_deleted()?;
        if index > self.lines.len() {
            return Err(HologramError::IndexOutOfBounds {
                index,
                len: self.lines.len(),
            });
        }
        let line = self.new_line(content);
        let id = line.id();
        self.lines.insert(index, line);
        self.update_line_positions();
        Ok(id)
    }

    pub fn set_line(&mut self, index: usize, content: LineContent) -> Result<(), HologramError> {
        self.check_not_deleted()?;
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(HologramError::IndexOutOfBounds { index, len })?;
        line.set_content(content);
        self.update_line_positions();
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineId, HologramError> {
        self.check_not_deleted()?;
        if index >= self.lines.len() {
            return Err(HologramError::IndexOutOfBounds {
                index,
                len: self.lines.len(),
            });
        }
        let mut line = self.lines.remove(index);
        self.retired.extend(line.carriers.take());
        self.update_line_positions();
        Ok(line.id())
    }

    pub fn clear_lines(&mut self) -> Result<(), HologramError> {
        self.check_not_deleted()?;
        for mut line in self.lines.drain(..) {
            self.retired.extend(line.carriers.take());
        }
        Ok(())
    }

    pub fn teleport(&mut self, position: Position) -> Result<(), HologramError> {
        self.check_not_deleted()?;
        self.position = position;
        self.update_line_positions();
        Ok(())
    }

    /// The top of the first line sits exactly at the hologram's Y; every
    /// following line is below the previous one.
    fn update_line_positions(&mut self) {
        let mut current_y = self.position.y;
        for (index, line) in self.lines.iter_mut().enumerate() {
            current_y -= line.height();
            if index > 0 {
                current_y -= self.space_between_lines;
            }
            line.set_position(Position::new(self.position.x, current_y, self.position.z));
        }
    }

    fn new_line(&mut self, content: LineContent) -> HologramLine {
        let id = LineId::new(self.next_line_id);
        self.next_line_id += 1;
        HologramLine::new(id, content)
    }

    fn check_not_deleted(&self) -> Result<(), HologramError> {
        if self.deleted {
            return Err(HologramError::Deleted);
        }
        Ok(())
    }

    // Carriers

    /// Brings the carriers in line with the current layout.
    ///
    /// Lines that could not be spawned are returned with the reason and stay
    /// unspawned until a later sync, usually triggered by
    /// [`Hologram::on_chunk_load`].
    pub fn sync(&mut self, manager: &mut EntitySyncManager) -> Vec<(LineId, SpawnError)> {
        for carriers in std::mem::take(&mut self.retired) {
            despawn_carriers(manager, &carriers);
        }
        if self.deleted {
            return Vec::new();
        }

        let mut failures = Vec::new();
        for line in &mut self.lines {
            if let Some(carriers) = line.carriers.take() {
                line.carriers = refresh_carriers(manager, line, carriers);
            }
            if line.carriers.is_some() {
                continue;
            }
            match spawn_carriers(manager, &self.world, line) {
                Ok(carriers) => line.carriers = Some(carriers),
                Err(error) => failures.push((line.id(), error)),
            }
        }
        failures
    }

    /// Lines without carriers, waiting for their chunk to load
    pub fn unspawned_lines(&self) -> Vec<LineId> {
        self.lines
            .iter()
            .filter(|line| !line.is_spawned())
            .map(HologramLine::id)
            .collect()
    }

    /// Retries lines that failed to spawn if `chunk` is where they belong.
    /// Returns the lines that are still unspawned.
    pub fn on_chunk_load(
        &mut self,
        manager: &mut EntitySyncManager,
        world: &WorldId,
        chunk: ChunkPos,
    ) -> Vec<(LineId, SpawnError)> {
        if self.deleted || &self.world != world {
            return Vec::new();
        }
        let waiting = self
            .lines
            .iter()
            .any(|line| !line.is_spawned() && line.position().chunk() == chunk);
        if !waiting {
            return Vec::new();
        }
        self.sync(manager)
    }

    /// Forgets carriers the manager tore down on a chunk unload, so the
    /// lines respawn when the chunk loads again. A surviving partner carrier
    /// is despawned on the next sync.
    pub fn on_carriers_removed(&mut self, removed: &[CarrierHandle]) {
        for line in &mut self.lines {
            let gone = line
                .carriers
                .as_ref()
                .is_some_and(|carriers| removed.iter().any(|handle| carriers.uses(handle)));
            if gone {
                debug!("Hologram: line {} lost its carriers", line.id().get());
                self.retired.extend(line.carriers.take());
            }
        }
    }

    /// Despawns every line. The hologram cannot be edited afterwards.
    pub fn delete(&mut self, manager: &mut EntitySyncManager) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        for mut line in self.lines.drain(..) {
            self.retired.extend(line.carriers.take());
        }
        for carriers in std::mem::take(&mut self.retired) {
            despawn_carriers(manager, &carriers);
        }
    }
}

fn spawn_carriers(
    manager: &mut EntitySyncManager,
    world: &WorldId,
    line: &HologramLine,
) -> Result<LineCarriers, SpawnError> {
    let position = line.position();
    let content = line.content().clone();
    let carriers = match &content {
        LineContent::Text(_) => {
            let state = content.render_state(manager.settings());
            let main = manager.spawn(CarrierKind::Text, world, position, state)?;
            LineCarriers {
                main,
                mount: None,
                position,
                content,
            }
        }
        LineContent::Item(_) => {
            let mount = manager.spawn(CarrierKind::Mount, world, position, RenderState::Mount)?;
            let state = content.render_state(manager.settings());
            let main = match manager.spawn(CarrierKind::Item, world, position, state) {
                Ok(main) => main,
                Err(error) => {
                    if let Err(despawn_error) = manager.despawn(&mount) {
                        warn!("Hologram: {}", despawn_error);
                    }
                    return Err(error);
                }
            };
            if let Err(error) = manager.set_passenger(&mount, &main) {
                warn!("Hologram: could not seat item on its mount: {}", error);
            }
            LineCarriers {
                main,
                mount: Some(mount),
                position,
                content,
            }
        }
    };
    for handle in carriers.handles() {
        if let Err(error) = manager.set_line(&handle, line.id()) {
            warn!("Hologram: {}", error);
        }
    }
    Ok(carriers)
}

/// Moves or updates existing carriers. Returns None if they have to be
/// spawned again.
fn refresh_carriers(
    manager: &mut EntitySyncManager,
    line: &HologramLine,
    mut carriers: LineCarriers,
) -> Option<LineCarriers> {
    if !carriers.content.same_kind(line.content()) {
        despawn_carriers(manager, &carriers);
        return None;
    }

    if carriers.position != line.position() {
        for handle in carriers.handles() {
            if let Err(error) = manager.move_carrier(&handle, line.position()) {
                warn!("Hologram: {}", error);
                despawn_carriers(manager, &carriers);
                return None;
            }
        }
        carriers.position = line.position();
    }

    if &carriers.content != line.content() {
        let state = line.content().render_state(manager.settings());
        if let Err(error) = manager.update_render_state(&carriers.main, state) {
            warn!("Hologram: {}", error);
            despawn_carriers(manager, &carriers);
            return None;
        }
        carriers.content = line.content().clone();
    }
    Some(carriers)
}

fn despawn_carriers(manager: &mut EntitySyncManager, carriers: &LineCarriers) {
    for handle in carriers.handles() {
        if manager.contains(&handle) {
            if let Err(error) = manager.despawn(&handle) {
                debug!("Hologram: {}", error);
            }
        }
    }
}
