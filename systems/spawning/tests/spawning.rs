use std::time::Duration;

use path_defence_core::{Command, Event};
use path_defence_system_spawning::{Config, WaveClock};
use path_defence_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(10);

fn simulate(clock: &mut WaveClock, ticks: u32) -> Vec<(u64, Command)> {
    let mut emitted = Vec::new();
    for index in 0..ticks {
        let now = FRAME * index;
        let mut out = Vec::new();
        let _ = clock.handle(now, &mut out);
        emitted.extend(out.into_iter().map(|command| (now.as_secs(), command)));
    }
    emitted
}

#[test]
fn forty_seconds_yield_one_level_up_and_ten_spawns() {
    let mut clock = WaveClock::new(Config::default());
    let emitted = simulate(&mut clock, 4_000);

    let level_ups: Vec<u64> = emitted
        .iter()
        .filter(|(_, command)| *command == Command::AdvanceLevel)
        .map(|(second, _)| *second)
        .collect();
    let spawns: Vec<u64> = emitted
        .iter()
        .filter(|(_, command)| matches!(command, Command::SpawnMonster { .. }))
        .map(|(second, _)| *second)
        .collect();

    assert_eq!(level_ups, vec![10]);
    assert_eq!(spawns, (11..=20).collect::<Vec<u64>>());
    assert_eq!(clock.countdown(), 1);
}

#[test]
fn wave_pattern_repeats_every_thirty_seconds() {
    let mut clock = WaveClock::new(Config::default());
    let emitted = simulate(&mut clock, 7_100);

    let level_ups = emitted
        .iter()
        .filter(|(_, command)| *command == Command::AdvanceLevel)
        .count();
    let second_wave_spawns = emitted
        .iter()
        .filter(|(second, command)| {
            (41..=50).contains(second) && matches!(command, Command::SpawnMonster { .. })
        })
        .count();

    assert_eq!(level_ups, 3, "level-ups at seconds 10, 40 and 70");
    assert_eq!(second_wave_spawns, 10);
}

#[test]
fn commands_drive_world_counters() {
    let mut clock = WaveClock::new(Config::default());
    let mut world = World::default();
    let mut events = Vec::new();

    for (_, command) in simulate(&mut clock, 2_500) {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(query::level(&world), 2);
    assert_eq!(query::monster_view(&world).len(), 10);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::MonsterSpawned { health: 3, .. }))
            .count(),
        10
    );
}
