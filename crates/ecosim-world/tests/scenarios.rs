use ecosim_core::{EffectKind, SimConfig, Vec2};
use ecosim_world::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A world with nothing in it and a food timer that never fires during a test
fn quiet_world() -> World {
    let mut config = SimConfig::default();
    config.world.initial_creatures = 0;
    config.world.initial_food = 0;
    config.food.spawn_interval = 1.0e6;
    World::with_rng(config, ChaCha8Rng::seed_from_u64(7)).unwrap()
}

#[test]
fn test_creature_eats_adjacent_food() {
    let mut world = quiet_world();
    world.spawn_creature_at(Vec2::new(100.0, 100.0), 100.0).unwrap();
    let food = world.spawn_food_at(Vec2::new(102.0, 100.0)).unwrap();

    world.update(1.0);

    assert!(!world.food_store().contains(food));
    assert_eq!(world.stats().foods, 0);
    assert_eq!(world.stats().total_food_eaten, 1);

    let creatures = world.creatures();
    assert_eq!(creatures.len(), 1);
    assert_eq!(creatures[0].energy, 145.0);
    assert_eq!(creatures[0].position, Vec2::new(102.0, 100.0));
    assert_eq!(world.stats().total_births, 0);
}

#[test]
fn test_feeding_past_threshold_reproduces() {
    let mut world = quiet_world();
    let parent = world.spawn_creature_at(Vec2::new(100.0, 100.0), 140.0).unwrap();
    world.spawn_food_at(Vec2::new(102.0, 100.0)).unwrap();

    world.update(1.0);

    let creatures = world.creatures();
    assert_eq!(creatures.len(), 2);
    assert_eq!(creatures[0].id, parent);
    assert_eq!(creatures[0].energy, 92.5);
    assert_eq!(creatures[1].energy, 92.5);
    assert_eq!(creatures[1].generation, 1);

    assert_eq!(world.stats().total_births, 1);
    assert_eq!(world.effects().len(), 1);
    assert_eq!(world.effects()[0].kind, EffectKind::Birth);
    assert_eq!(world.effects()[0].position, creatures[0].position);
    assert_eq!(world.creature_grid().len(), 2);
}

#[test]
fn test_starving_creature_is_removed() {
    let mut world = quiet_world();
    world.spawn_creature_at(Vec2::new(100.0, 100.0), 4.0).unwrap();

    world.update(1.0);

    assert!(world.creatures().is_empty());
    assert!(world.creature_grid().is_empty());
    assert_eq!(world.stats().creatures, 0);
    assert_eq!(world.stats().total_deaths, 1);
    assert_eq!(world.effects().len(), 1);
    assert_eq!(world.effects()[0].kind, EffectKind::Death);
}

#[test]
fn test_contested_food_has_one_winner() {
    let mut world = quiet_world();
    let first = world.spawn_creature_at(Vec2::new(100.0, 100.0), 100.0).unwrap();
    let second = world.spawn_creature_at(Vec2::new(103.0, 100.0), 100.0).unwrap();
    world.spawn_food_at(Vec2::new(101.0, 100.0)).unwrap();

    world.update(1.0);

    assert_eq!(world.stats().total_food_eaten, 1);
    let creatures = world.creatures();
    let winner = creatures.iter().find(|c| c.id == first).unwrap();
    let loser = creatures.iter().find(|c| c.id == second).unwrap();
    assert_eq!(winner.energy, 145.0);
    assert_eq!(winner.food_eaten, 1);
    assert_eq!(loser.energy, 95.0);
    assert_eq!(loser.food_eaten, 0);
}

#[test]
fn test_population_counters_match_sets() {
    let mut config = SimConfig::default();
    config.world.initial_creatures = 30;
    config.world.initial_food = 100;
    let mut world = World::with_rng(config, ChaCha8Rng::seed_from_u64(99)).unwrap();

    for _ in 0..200 {
        world.update(1.0 / 30.0);
        let stats = world.stats();
        assert_eq!(stats.creatures, world.creatures().len());
        assert_eq!(stats.foods, world.foods().count());
        assert_eq!(stats.effects, world.effects().len());
        assert!(world.creature_grid().len() <= world.creatures().len());
    }

    assert_eq!(world.stats().tick, 200);
    assert_eq!(world.history().len(), 200);
}

#[test]
fn test_creature_ids_stay_unique() {
    let mut config = SimConfig::default();
    config.world.initial_creatures = 20;
    config.world.initial_food = 400;
    config.creature.initial_energy = 140.0;
    let mut world = World::with_rng(config, ChaCha8Rng::seed_from_u64(5)).unwrap();

    for _ in 0..300 {
        world.update(0.1);
    }

    let mut ids: Vec<_> = world.creatures().iter().map(|c| c.id).collect();
    let total = ids.len();
    ids.sort_by_key(|id| id.0);
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_creatures_stay_in_bounds() {
    let mut config = SimConfig::default();
    config.world.width = 200.0;
    config.world.height = 150.0;
    config.world.initial_creatures = 40;
    config.world.initial_food = 50;
    let mut world = World::with_rng(config, ChaCha8Rng::seed_from_u64(11)).unwrap();

    for _ in 0..500 {
        world.update(0.2);
        for creature in world.creatures() {
            assert!((0.0..=200.0).contains(&creature.position.x));
            assert!((0.0..=150.0).contains(&creature.position.y));
        }
    }
}
