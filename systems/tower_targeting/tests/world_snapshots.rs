use glam::Vec2;
use path_defence_core::{Command, MonsterId, TowerId};
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, World};

fn targets(world: &World) -> Vec<(TowerId, MonsterId)> {
    let mut system = TowerTargeting::new();
    let mut out = Vec::new();
    system.handle(
        &query::tower_view(world),
        &query::monster_view(world),
        &mut out,
    );
    out.iter().map(|target| (target.tower, target.monster)).collect()
}

#[test]
fn tower_near_path_start_targets_fresh_spawn() {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnMonster { health: 3 }, &mut events);
    world::apply(
        &mut world,
        Command::PurchaseTower {
            position: Vec2::new(96.0, 160.0),
        },
        &mut events,
    );

    assert_eq!(targets(&world), vec![(TowerId::new(0), MonsterId::new(0))]);
}

#[test]
fn monster_walking_out_of_range_is_dropped() {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnMonster { health: 3 }, &mut events);
    world::apply(
        &mut world,
        Command::PurchaseTower {
            position: Vec2::new(96.0, 160.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::AdvanceMonsters { step: 400.0 },
        &mut events,
    );

    assert!(targets(&world).is_empty());
}

#[test]
fn older_monster_stays_targeted_while_in_range() {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnMonster { health: 3 }, &mut events);
    world::apply(
        &mut world,
        Command::AdvanceMonsters { step: 100.0 },
        &mut events,
    );
    world::apply(&mut world, Command::SpawnMonster { health: 3 }, &mut events);
    world::apply(
        &mut world,
        Command::PurchaseTower {
            position: Vec2::new(96.0, 160.0),
        },
        &mut events,
    );

    assert_eq!(targets(&world), vec![(TowerId::new(0), MonsterId::new(0))]);
}
