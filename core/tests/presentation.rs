//! Drives the engine the way a presentation adapter does: gestures go in over
//! an inbound bus, repaint state comes back over the engine's outbound bus.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use sweeper_core::*;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Painted {
    Covered,
    Flag,
    Open(Option<u8>),
    Mine,
    WrongFlag,
}

#[derive(Default)]
struct View {
    cells: BTreeMap<Coord2, Painted>,
    exploded: Option<Coord2>,
    won: bool,
}

impl View {
    fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::NewGrid { .. } => *self = View::default(),
            GameEvent::InsertTile { x, y } => {
                self.cells.insert((x, y), Painted::Covered);
            }
            GameEvent::ClearTile { x, y, tile } => {
                self.cells.insert((x, y), Painted::Open(tile.number()));
            }
            GameEvent::FlagTile { x, y, .. } => {
                self.cells.insert((x, y), Painted::Flag);
            }
            GameEvent::UnflagTile { x, y, .. } => {
                self.cells.insert((x, y), Painted::Covered);
            }
            GameEvent::StepOnMine { x, y } => self.exploded = Some((x, y)),
            GameEvent::ExposeMine { mine } => {
                self.cells.insert(mine.coords(), Painted::Mine);
            }
            GameEvent::BadFlag { mine } => {
                self.cells.insert(mine.coords(), Painted::WrongFlag);
            }
            GameEvent::Won { .. } => self.won = true,
            GameEvent::PlantMine { .. } | GameEvent::SetNumberTile { .. } => {}
        }
    }
}

struct Adapter {
    gestures: EventBus<Gesture>,
    engine: Rc<RefCell<GameEngine>>,
    view: Rc<RefCell<View>>,
}

impl Adapter {
    fn new(config: GameConfig, seed: u64) -> Self {
        let view = Rc::new(RefCell::new(View::default()));
        let mut events = EventBus::new();
        for name in EventName::ALL {
            let view = Rc::clone(&view);
            events.subscribe(name, move |event: &GameEvent| view.borrow_mut().apply(event));
        }

        let engine = Rc::new(RefCell::new(GameEngine::new(config, seed, events)));
        let mut gestures = EventBus::new();
        for name in GestureName::ALL {
            let engine = Rc::clone(&engine);
            gestures.subscribe(name, move |gesture: &Gesture| {
                engine
                    .borrow_mut()
                    .dispatch(*gesture)
                    .expect("adapter sent an invalid coordinate");
            });
        }

        Self {
            gestures,
            engine,
            view,
        }
    }

    fn send(&mut self, gesture: Gesture) {
        self.gestures.publish(gesture);
    }

    fn painted(&self, coords: Coord2) -> Painted {
        self.view.borrow().cells[&coords]
    }
}

#[test]
fn start_gesture_paints_a_covered_board() {
    let mut adapter = Adapter::new(GameConfig::BEGINNER, 11);

    adapter.send(Gesture::Start);

    let view = adapter.view.borrow();
    assert_eq!(view.cells.len(), 81);
    assert!(view.cells.values().all(|&cell| cell == Painted::Covered));
    assert_eq!(adapter.engine.borrow().state(), EngineState::Playing);
}

#[test]
fn first_step_never_loses() {
    for seed in 0..32 {
        let mut adapter = Adapter::new(GameConfig::new((4, 4), 8), seed);
        adapter.send(Gesture::Start);

        adapter.send(Gesture::TileStep { x: 1, y: 1 });

        assert_eq!(adapter.view.borrow().exploded, None, "seed {seed}");
        assert!(matches!(adapter.painted((1, 1)), Painted::Open(_)), "seed {seed}");
        assert_eq!(adapter.engine.borrow().step_count(), 1);
    }
}

#[test]
fn flag_gestures_toggle_the_painted_cell() {
    let mut adapter = Adapter::new(GameConfig::new((3, 3), 1), 5);
    adapter.send(Gesture::Start);

    adapter.send(Gesture::TileFlag { x: 2, y: 0 });
    assert_eq!(adapter.painted((2, 0)), Painted::Flag);

    adapter.send(Gesture::TileFlag { x: 2, y: 0 });
    assert_eq!(adapter.painted((2, 0)), Painted::Covered);
}

#[test]
fn losing_paints_mines_and_wrong_flags() {
    let mut adapter = Adapter::new(GameConfig::new_unchecked((3, 3), 0), 0);
    adapter
        .engine
        .borrow_mut()
        .setup_with_mines(&[(0, 0), (2, 2)])
        .unwrap();
    adapter.send(Gesture::TileFlag { x: 2, y: 0 });
    adapter.send(Gesture::TileStep { x: 1, y: 0 });
    adapter.send(Gesture::TileStep { x: 0, y: 1 });

    adapter.send(Gesture::TileStep { x: 0, y: 0 });

    assert_eq!(adapter.view.borrow().exploded, Some((0, 0)));
    assert_eq!(adapter.painted((0, 0)), Painted::Mine);
    assert_eq!(adapter.painted((2, 2)), Painted::Mine);
    assert_eq!(adapter.painted((2, 0)), Painted::WrongFlag);
    assert_eq!(adapter.painted((1, 0)), Painted::Open(Some(1)));

    adapter.send(Gesture::TileStep { x: 1, y: 1 });
    assert_eq!(adapter.painted((1, 1)), Painted::Covered);
}

#[test]
fn clearing_every_safe_tile_wins() {
    let mut adapter = Adapter::new(GameConfig::new_unchecked((4, 4), 0), 0);
    adapter.engine.borrow_mut().setup_with_mines(&[(3, 3)]).unwrap();

    adapter.send(Gesture::TileStep { x: 0, y: 0 });

    let view = adapter.view.borrow();
    assert!(view.won);
    assert_eq!(view.cells[&(3, 3)], Painted::Covered);
    assert_eq!(view.cells[&(2, 2)], Painted::Open(Some(1)));
    assert_eq!(view.cells[&(0, 0)], Painted::Open(None));
    assert!(adapter.engine.borrow().is_ended());
}
