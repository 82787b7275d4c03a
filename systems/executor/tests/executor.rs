use std::time::Duration;

use bunny_hop_core::{Action, Command, Event, GameState, Instruction, Outcome};
use bunny_hop_system_executor::{Config, Executor};
use bunny_hop_system_expansion::Expander;
use bunny_hop_world::{self as world, query, LevelCatalog, World};

struct Harness {
    world: World,
    expander: Expander,
    executor: Executor,
}

impl Harness {
    fn new() -> Self {
        let catalog = LevelCatalog::builtin().expect("builtin catalog parses");
        let interval = catalog.settings().tick_interval();
        Self {
            world: World::new(catalog),
            expander: Expander::default(),
            executor: Executor::new(Config::new(interval)),
        }
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            log.extend(events.iter().cloned());
            let mut commands = Vec::new();
            self.expander.handle(&events, &mut commands);
            self.executor.handle(&events, &mut commands);
            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }

        log
    }

    fn tick(&mut self, millis: u64) -> Vec<Event> {
        self.submit(Command::Tick {
            dt: Duration::from_millis(millis),
        })
    }
}

fn dispatched(events: &[Event]) -> Vec<Action> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ActionDispatched { action, .. } => Some(*action),
            _ => None,
        })
        .collect()
}

#[test]
fn actions_follow_tick_interval_then_run_finishes() {
    let mut harness = Harness::new();
    for instruction in [Instruction::Left, Instruction::Right] {
        let _ = harness.submit(Command::AppendInstruction { instruction });
    }

    let started = harness.submit(Command::RequestRun);
    assert_eq!(dispatched(&started), vec![Action::Left]);
    assert_eq!(query::game_state(&harness.world), GameState::Running);

    let mut later = Vec::new();
    for _ in 0..63 {
        later.extend(harness.tick(16));
    }
    assert_eq!(dispatched(&later), vec![Action::Right]);
    assert_eq!(query::game_state(&harness.world), GameState::Running);

    let mut tail = Vec::new();
    for _ in 0..63 {
        tail.extend(harness.tick(16));
    }
    assert!(tail.contains(&Event::RunConcluded {
        outcome: Outcome::Uncomplete,
        position: query::player_position(&harness.world),
    }));
    assert_eq!(query::game_state(&harness.world), GameState::Uncomplete);
    assert!(!harness.executor.is_active());
}

#[test]
fn reset_mid_run_stops_dispatching() {
    let mut harness = Harness::new();
    for _ in 0..3 {
        let _ = harness.submit(Command::AppendInstruction {
            instruction: Instruction::Left,
        });
    }
    let _ = harness.submit(Command::RequestRun);
    let _ = harness.submit(Command::ResetLevel);
    assert!(!harness.executor.is_active());

    let mut events = Vec::new();
    for _ in 0..5 {
        events.extend(harness.tick(1000));
    }
    assert!(dispatched(&events).is_empty());
    assert_eq!(query::game_state(&harness.world), GameState::Editing);
}
