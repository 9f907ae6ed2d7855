use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Names of the events the engine publishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    NewGrid,
    InsertTile,
    PlantMine,
    SetNumberTile,
    ClearTile,
    FlagTile,
    UnflagTile,
    StepOnMine,
    ExposeMine,
    BadFlag,
    Won,
}

impl EventName {
    pub const ALL: [EventName; 11] = [
        Self::NewGrid,
        Self::InsertTile,
        Self::PlantMine,
        Self::SetNumberTile,
        Self::ClearTile,
        Self::FlagTile,
        Self::UnflagTile,
        Self::StepOnMine,
        Self::ExposeMine,
        Self::BadFlag,
        Self::Won,
    ];

    pub const fn as_str(self) -> &'static str {
        use EventName::*;
        match self {
            NewGrid => "new_grid",
            InsertTile => "insert_tile",
            PlantMine => "plant_mine",
            SetNumberTile => "set_number_tile",
            ClearTile => "clear_tile",
            FlagTile => "flag_tile",
            UnflagTile => "unflag_tile",
            StepOnMine => "step_on_mine",
            ExposeMine => "expose_mine",
            BadFlag => "bad_flag",
            Won => "won",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State changes published by [`GameEngine`] for presentation adapters.
///
/// Tiles are carried by value, so a payload is a snapshot taken at publish time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A session (re)started.
    NewGrid {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    InsertTile {
        x: Coord,
        y: Coord,
    },
    PlantMine {
        x: Coord,
        y: Coord,
        tile: Tile,
    },
    SetNumberTile {
        x: Coord,
        y: Coord,
        tile: Tile,
    },
    ClearTile {
        x: Coord,
        y: Coord,
        tile: Tile,
    },
    FlagTile {
        x: Coord,
        y: Coord,
        tile: Tile,
    },
    UnflagTile {
        x: Coord,
        y: Coord,
        tile: Tile,
    },
    /// The player revealed a mine and lost.
    StepOnMine {
        x: Coord,
        y: Coord,
    },
    /// A mine revealed once the game is lost.
    ExposeMine {
        mine: Tile,
    },
    /// A flag placed on a safe tile, revealed once the game is lost.
    BadFlag {
        mine: Tile,
    },
    /// Every safe tile has been cleared.
    Won {
        steps: u32,
    },
}

impl GameEvent {
    pub const fn coords(&self) -> Option<Coord2> {
        use GameEvent::*;
        match *self {
            InsertTile { x, y }
            | PlantMine { x, y, .. }
            | SetNumberTile { x, y, .. }
            | ClearTile { x, y, .. }
            | FlagTile { x, y, .. }
            | UnflagTile { x, y, .. }
            | StepOnMine { x, y } => Some((x, y)),
            ExposeMine { mine } | BadFlag { mine } => Some(mine.coords()),
            NewGrid { .. } | Won { .. } => None,
        }
    }

    pub const fn tile(&self) -> Option<&Tile> {
        use GameEvent::*;
        match self {
            PlantMine { tile, .. }
            | SetNumberTile { tile, .. }
            | ClearTile { tile, .. }
            | FlagTile { tile, .. }
            | UnflagTile { tile, .. } => Some(tile),
            ExposeMine { mine } | BadFlag { mine } => Some(mine),
            NewGrid { .. } | InsertTile { .. } | StepOnMine { .. } | Won { .. } => None,
        }
    }
}

impl Event for GameEvent {
    type Name = EventName;

    fn name(&self) -> EventName {
        use GameEvent::*;
        match self {
            NewGrid { .. } => EventName::NewGrid,
            InsertTile { .. } => EventName::InsertTile,
            PlantMine { .. } => EventName::PlantMine,
            SetNumberTile { .. } => EventName::SetNumberTile,
            ClearTile { .. } => EventName::ClearTile,
            FlagTile { .. } => EventName::FlagTile,
            UnflagTile { .. } => EventName::UnflagTile,
            StepOnMine { .. } => EventName::StepOnMine,
            ExposeMine { .. } => EventName::ExposeMine,
            BadFlag { .. } => EventName::BadFlag,
            Won { .. } => EventName::Won,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureName {
    Start,
    TileStep,
    TileFlag,
}

impl GestureName {
    pub const ALL: [GestureName; 3] = [Self::Start, Self::TileStep, Self::TileFlag];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::TileStep => "tile_step",
            Self::TileFlag => "tile_flag",
        }
    }
}

impl fmt::Display for GestureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User input forwarded into the engine by a presentation adapter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Gesture {
    /// Start a new session.
    Start,
    /// Reveal the tile at `(x, y)`.
    TileStep { x: Coord, y: Coord },
    /// Toggle the flag at `(x, y)`.
    TileFlag { x: Coord, y: Coord },
}

impl Event for Gesture {
    type Name = GestureName;

    fn name(&self) -> GestureName {
        match self {
            Gesture::Start => GestureName::Start,
            Gesture::TileStep { .. } => GestureName::TileStep,
            Gesture::TileFlag { .. } => GestureName::TileFlag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn serialized_names_match_display() {
        for name in EventName::ALL {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, alloc::format!("\"{}\"", name));
        }
        for name in GestureName::ALL {
            assert_eq!(serde_json::to_value(name).unwrap(), name.to_string());
        }
    }

    #[test]
    fn events_are_tagged_with_their_name() {
        let event = GameEvent::ClearTile {
            x: 1,
            y: 2,
            tile: Tile::new((1, 2)),
        };

        let value = serde_json::to_value(event).unwrap();

        assert_eq!(value["event"], event.name().as_str());
        assert_eq!(value["x"], 1);
        assert_eq!(value["tile"]["covered"], true);
        assert_eq!(event.coords(), Some((1, 2)));
    }

    #[test]
    fn expose_mine_carries_the_tile() {
        let mut mine = Tile::new((3, 0));
        mine.plant_mine();
        let event = GameEvent::ExposeMine { mine };

        assert_eq!(event.name(), EventName::ExposeMine);
        assert_eq!(event.coords(), Some((3, 0)));
        assert_eq!(event.tile(), Some(&mine));
    }

    #[test]
    fn gestures_decode_from_tagged_objects() {
        let step: Gesture = serde_json::from_str(r#"{"event":"tile_step","x":4,"y":1}"#).unwrap();
        let start: Gesture = serde_json::from_str(r#"{"event":"start"}"#).unwrap();

        assert_eq!(step, Gesture::TileStep { x: 4, y: 1 });
        assert_eq!(step.name(), GestureName::TileStep);
        assert_eq!(start, Gesture::Start);
    }
}
