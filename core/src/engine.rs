use alloc::collections::VecDeque;
use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Setup -> Playing
/// - Playing -> Won
/// - Playing -> Lost
/// - any -> Setup, when a new session starts
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No grid yet, or a grid still being built
    #[default]
    Setup,
    Playing,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Opening steps on which a mine is moved away instead of ending the game.
const PROTECTED_STEPS: u32 = 2;

/// Owns one game session at a time and publishes every state change on its bus.
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    state: EngineState,
    mine_count: CellCount,
    step_count: u32,
    rng: SmallRng,
    events: EventBus<GameEvent>,
}

impl GameEngine {
    /// Creates an engine in the [`EngineState::Setup`] state. Call
    /// [`GameEngine::setup`] once subscribers are registered on `events`.
    pub fn new(config: GameConfig, seed: u64, events: EventBus<GameEvent>) -> Self {
        Self {
            config,
            grid: Grid::new(config.size),
            state: EngineState::Setup,
            mine_count: config.mines,
            step_count: 0,
            rng: SmallRng::seed_from_u64(seed),
            events,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_finished()
    }

    /// Non-losing steps taken this session.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tile(&self, coords: Coord2) -> Result<&Tile> {
        self.grid.tile(coords)
    }

    /// Mines actually planted this session.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.grid.tiles().filter(|tile| tile.is_flagged()).count() as CellCount
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count() as isize)
    }

    pub fn events(&self) -> &EventBus<GameEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus<GameEvent> {
        &mut self.events
    }

    /// Starts a new session with randomly planted mines, discarding the previous grid.
    pub fn setup(&mut self) {
        self.begin_session(self.config.mines);
        self.plant_random_mines();
        self.set_number_tiles();
        self.state = EngineState::Playing;
    }

    /// Starts a new session with mines at exactly `mines`, duplicates ignored.
    ///
    /// Nothing is published when a coordinate lies outside the grid.
    pub fn setup_with_mines(&mut self, mines: &[Coord2]) -> Result<()> {
        let mut layout = Vec::with_capacity(mines.len());
        for &coords in mines {
            if !self.config.contains(coords) {
                return Err(GameError::OutOfBounds(coords));
            }
            if !layout.contains(&coords) {
                layout.push(coords);
            }
        }

        self.begin_session(layout.len() as CellCount);
        for coords in layout {
            self.plant_mine(coords)?;
        }
        self.set_number_tiles();
        self.state = EngineState::Playing;
        Ok(())
    }

    /// Applies a gesture coming from a presentation adapter.
    pub fn dispatch(&mut self, gesture: Gesture) -> Result<()> {
        match gesture {
            Gesture::Start => self.setup(),
            Gesture::TileStep { x, y } => {
                self.step((x, y));
            }
            Gesture::TileFlag { x, y } => {
                self.toggle_flag((x, y))?;
            }
        }
        Ok(())
    }

    /// Reveals the tile at `coords`. Out of bounds coordinates, flagged or
    /// already revealed tiles, and finished games are ignored.
    pub fn step(&mut self, coords: Coord2) -> StepOutcome {
        if !self.state.is_playing() {
            return StepOutcome::NoChange;
        }

        let Ok(&tile) = self.grid.tile(coords) else {
            log::debug!("Ignoring step outside the grid at {:?}", coords);
            return StepOutcome::NoChange;
        };

        if tile.is_flagged() {
            StepOutcome::NoChange
        } else if tile.is_mine() {
            self.step_count += 1;
            self.lose_or_relocate(coords)
        } else if !tile.is_covered() {
            StepOutcome::NoChange
        } else {
            self.step_count += 1;
            self.flood_clear(coords);
            self.reveal_outcome(StepOutcome::Cleared)
        }
    }

    /// Reveals the tile at `coords` and, when it is blank, every contiguous
    /// blank region around it. Returns how many tiles were cleared.
    ///
    /// Already cleared tiles and mines are left untouched.
    pub fn clear_tile(&mut self, coords: Coord2) -> Result<CellCount> {
        self.grid.tile(coords)?;
        Ok(self.flood_clear(coords))
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.mark(coords, true)
    }

    pub fn unflag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.mark(coords, false)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        if !self.state.is_playing() {
            return Ok(MarkOutcome::NoChange);
        }

        let flagged = self.grid.tile(coords)?.is_flagged();
        self.mark(coords, !flagged)
    }

    fn mark(&mut self, coords: Coord2, flagged: bool) -> Result<MarkOutcome> {
        if !self.state.is_playing() {
            return Ok(MarkOutcome::NoChange);
        }

        let tile = self.grid.tile_mut(coords)?;
        if tile.is_flagged() == flagged || (flagged && tile.is_cleared()) {
            return Ok(MarkOutcome::NoChange);
        }

        tile.set_flagged(flagged);
        let tile = *tile;
        let (x, y) = coords;
        self.events.publish(if flagged {
            GameEvent::FlagTile { x, y, tile }
        } else {
            GameEvent::UnflagTile { x, y, tile }
        });
        Ok(MarkOutcome::Changed)
    }

    fn begin_session(&mut self, mines: CellCount) {
        let (width, height) = self.config.size;

        self.state = EngineState::Setup;
        self.step_count = 0;
        self.mine_count = mines;
        self.grid = Grid::new(self.config.size);
        log::debug!("New {}x{} grid with {} mines", width, height, mines);

        self.events.publish(GameEvent::NewGrid {
            width,
            height,
            mines,
        });

        for y in 0..height {
            for x in 0..width {
                match self.grid.insert_tile(Tile::new((x, y))) {
                    Ok(_) => self.events.publish(GameEvent::InsertTile { x, y }),
                    Err(err) => log::error!("Could not insert tile: {}", err),
                }
            }
        }
    }

    fn plant_random_mines(&mut self) {
        let total = self.grid.total_cells();
        if self.mine_count >= total {
            if self.mine_count > total {
                log::warn!(
                    "Grid already full, planted {} mines but {} were requested",
                    total,
                    self.mine_count
                );
            }
            for coords in self.grid.coords() {
                if let Err(err) = self.plant_mine(coords) {
                    log::error!("Could not plant mine: {}", err);
                }
            }
            self.mine_count = total;
            return;
        }

        let mut available = self.grid.available_cells();
        let mut planted: CellCount = 0;
        while planted < self.mine_count && !available.is_empty() {
            let coords = available.swap_remove(self.rng.random_range(0..available.len()));
            if let Err(err) = self.plant_mine(coords) {
                log::error!("Could not plant mine: {}", err);
                break;
            }
            planted += 1;
        }
        self.mine_count = planted;
    }

    fn plant_mine(&mut self, coords: Coord2) -> Result<()> {
        let tile = self.grid.tile_mut(coords)?;
        if tile.is_mine() {
            return Ok(());
        }

        tile.plant_mine();
        let tile = *tile;
        self.events.publish(GameEvent::PlantMine {
            x: coords.0,
            y: coords.1,
            tile,
        });
        Ok(())
    }

    fn set_number_tiles(&mut self) {
        let candidates: Vec<Coord2> = self
            .grid
            .tiles_without_mines_or_numbers()
            .map(Tile::coords)
            .collect();

        for coords in candidates {
            let count = self.grid.adjacent_mine_count(coords);
            if count == 0 {
                continue;
            }
            let Ok(tile) = self.grid.tile_mut(coords) else {
                continue;
            };

            tile.set_number(count);
            let tile = *tile;
            self.events.publish(GameEvent::SetNumberTile {
                x: coords.0,
                y: coords.1,
                tile,
            });
        }
    }

    /// Rebuilds every number after a mine moved. Cleared tiles whose number
    /// changed are cleared again so their new face is published.
    fn reset_number_tiles(&mut self) {
        let shown: Vec<(Coord2, Option<u8>)> = self
            .grid
            .tiles()
            .filter(|tile| tile.is_cleared())
            .map(|tile| (tile.coords(), tile.number()))
            .collect();

        for tile in self.grid.tiles_mut() {
            tile.clear_number();
        }
        self.set_number_tiles();

        for (coords, number) in shown {
            let Ok(&tile) = self.grid.tile(coords) else {
                continue;
            };
            if tile.number() != number {
                self.events.publish(GameEvent::ClearTile {
                    x: coords.0,
                    y: coords.1,
                    tile,
                });
            }
        }
    }

    fn lose_or_relocate(&mut self, coords: Coord2) -> StepOutcome {
        if self.step_count <= PROTECTED_STEPS && self.relocate_mine(coords) {
            self.reset_number_tiles();
            self.flood_clear(coords);
            return self.reveal_outcome(StepOutcome::Relocated);
        }

        self.lose(coords);
        StepOutcome::HitMine
    }

    /// Moves the mine at `from` to a random safe tile, if there is one.
    fn relocate_mine(&mut self, from: Coord2) -> bool {
        // revealed tiles never receive the mine
        let candidates: Vec<Coord2> = self
            .grid
            .tiles()
            .filter(|tile| !tile.is_mine() && tile.is_covered())
            .map(Tile::coords)
            .collect();
        let Some(&to) = candidates.choose(&mut self.rng) else {
            return false;
        };

        match self.grid.tile_mut(from) {
            Ok(tile) => tile.unplant_mine(),
            Err(err) => {
                log::error!("Could not relocate mine: {}", err);
                return false;
            }
        }
        if let Ok(tile) = self.grid.tile_mut(to) {
            tile.plant_mine();
        }
        log::debug!("Relocated mine from {:?} to {:?}", from, to);
        true
    }

    fn lose(&mut self, (x, y): Coord2) {
        self.state = EngineState::Lost;
        log::debug!("Stepped on a mine at {:?} after {} steps", (x, y), self.step_count);

        self.events.publish(GameEvent::StepOnMine { x, y });
        for &mine in self.grid.tiles_with_mines() {
            self.events.publish(GameEvent::ExposeMine { mine });
        }
        for &mine in self.grid.tiles_with_flags_and_no_mines() {
            self.events.publish(GameEvent::BadFlag { mine });
        }
    }

    fn flood_clear(&mut self, start: Coord2) -> CellCount {
        let mut cleared: CellCount = 0;
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            let Ok(tile) = self.grid.tile_mut(coords) else {
                continue;
            };
            // the cleared flag doubles as the visited set
            if tile.is_cleared() || tile.is_mine() {
                continue;
            }

            tile.reveal();
            let tile = *tile;
            cleared += 1;
            log::trace!("Cleared tile at {:?}", coords);
            self.events.publish(GameEvent::ClearTile {
                x: coords.0,
                y: coords.1,
                tile,
            });

            if !tile.is_numbered() && !tile.is_flagged() {
                to_visit.extend(self.grid.neighbors(coords).filter(|&pos| {
                    self.grid.tile(pos).is_ok_and(|neighbor| {
                        !neighbor.is_mine() && !neighbor.is_flagged() && !neighbor.is_cleared()
                    })
                }));
            }
        }

        if cleared > 0 {
            self.finish_if_won();
        }
        cleared
    }

    fn finish_if_won(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        if self
            .grid
            .tiles()
            .any(|tile| !tile.is_mine() && !tile.is_cleared())
        {
            return;
        }

        self.state = EngineState::Won;
        log::debug!("Won after {} steps", self.step_count);
        self.events.publish(GameEvent::Won {
            steps: self.step_count,
        });
    }

    fn reveal_outcome(&self, outcome: StepOutcome) -> StepOutcome {
        if matches!(self.state, EngineState::Won) {
            StepOutcome::Won
        } else {
            outcome
        }
    }
}
