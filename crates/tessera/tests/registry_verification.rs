//! # Registry and Scheduler Verification
//!
//! 1. **Registry**: ids stay sorted and resolvable under random churn
//! 2. **Deferred deletion**: kills wait for the end of the frame
//! 3. **Chunking**: plans partition the work exactly
//! 4. **Waypoints**: arrival takes `ceil(D / (S * dt))` ticks
//!
//! Run with: cargo test -p tessera --test registry_verification -- --nocapture

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera::core::{
    ChunkPlan, CoreError, EntityId, RigidBody, SchedulerConfig, Transform, Waypoint, WorkerPool,
    World,
};
use tessera::shared::Vec2;
use tessera::systems::{Scheduler, WaypointSystem};

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
#[allow(clippy::cast_precision_loss)]
fn verify_registry_sorted_under_churn() {
    let mut rng = StdRng::seed_from_u64(0x7E55_E8A);
    let mut world = World::new();
    let mut live = BTreeSet::new();
    let mut dead = Vec::new();

    for _frame in 0..200 {
        for _ in 0..rng.gen_range(0..40) {
            let id = world.create_entity(0.0, 0.0);
            world
                .add_component(id, RigidBody::with_velocity(Vec2::new(id.raw() as f32, 0.0)))
                .unwrap();
            live.insert(id);
        }

        let victims: Vec<EntityId> = live
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.2))
            .collect();
        for id in &victims {
            assert!(world.kill_entity(*id));
        }
        world.update();
        for id in victims {
            live.remove(&id);
            dead.push(id);
        }

        let ids: Vec<EntityId> = world.entities().iter().map(|e| e.id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "registry out of order");
        assert_eq!(ids, live.iter().copied().collect::<Vec<_>>());
    }

    // Recycled slots must never leak another entity's data.
    for &id in &live {
        let body = world.get_component::<RigidBody>(id).unwrap();
        assert_eq!(body.velocity.x, id.raw() as f32);
    }
    for &id in &dead {
        assert!(!world.contains(id));
        assert!(world.get_component::<Transform>(id).is_none());
    }

    println!("\n╔══════════════════════════════════════════════════════════╗");
    println!("║                REGISTRY CHURN VERIFICATION               ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║ Live:          {:>12}                              ║", live.len());
    println!("║ Removed:       {:>12}                              ║", dead.len());
    println!("╚══════════════════════════════════════════════════════════╝");
}

#[test]
fn verify_double_kill_removes_once() {
    let mut world = World::new();
    let a = world.create_entity(1.0, 2.0);
    let b = world.create_entity(3.0, 4.0);

    assert!(world.kill_entity(a));
    assert!(!world.kill_entity(a));
    assert!(world.is_pending_kill(a));

    // Still fully usable until the flush.
    assert_eq!(
        world.get_component::<Transform>(a).unwrap().position,
        Vec2::new(1.0, 2.0)
    );

    assert_eq!(world.update(), 1);
    assert_eq!(world.update(), 0);
    assert!(!world.contains(a));
    assert!(world.contains(b));
    assert!(!world.kill_entity(a));
}

#[test]
fn verify_unknown_entity_rejected() {
    let mut world = World::new();
    let ghost = EntityId::new(99);
    assert!(matches!(
        world.add_component(ghost, RigidBody::default()),
        Err(CoreError::UnknownEntity(id)) if id == ghost
    ));
}

#[test]
fn verify_clear_keeps_counting() {
    let mut world = World::new();
    let first = world.create_entity(0.0, 0.0);
    world.clear();
    assert!(world.is_empty());
    let second = world.create_entity(0.0, 0.0);
    assert!(second > first);
}

// ============================================================================
// CHUNKING
// ============================================================================

#[test]
fn verify_chunk_plans_partition_exactly() {
    for len in [0, 1, 2, 7, 100, 999, 1000, 1001, 12_345] {
        for workers in 1..=9 {
            let plan = ChunkPlan::new(len, workers);
            let ranges = plan.ranges();

            assert_eq!(plan.item_count(), len);
            assert_eq!(ranges.len(), workers.min(len));

            let mut next = 0;
            for range in ranges {
                assert_eq!(range.start, next, "gap or overlap at {next}");
                assert!(!range.is_empty());
                next = range.end;
            }
            assert_eq!(next, len);

            let sizes: Vec<usize> = ranges.iter().map(ExactSizeIterator::len).collect();
            if let (Some(min), Some(max)) = (sizes.iter().min(), sizes.iter().max()) {
                assert!(max - min <= 1, "uneven plan {sizes:?}");
            }
        }
    }
}

#[test]
fn verify_pool_preserves_chunk_order() {
    let pool = WorkerPool::new(4).unwrap();
    let plan = ChunkPlan::new(10_000, 7);
    let chunks = plan.split((0..10_000u64).collect());
    let sums = pool
        .map_chunks(chunks, |chunk: Vec<u64>| (chunk[0], chunk.iter().sum::<u64>()))
        .unwrap();

    let starts: Vec<u64> = sums.iter().map(|&(start, _)| start).collect();
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(sums.iter().map(|&(_, s)| s).sum::<u64>(), (0..10_000u64).sum());
}

// ============================================================================
// WAYPOINTS
// ============================================================================

#[test]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn verify_waypoint_arrival_tick_count() {
    let pool = WorkerPool::new(2).unwrap();
    let config = SchedulerConfig::new();
    let system = WaypointSystem::default();

    let distance = 100.0_f32;
    let speed = 10.0_f32;
    let dt = 0.1_f32;

    let mut world = World::new();
    let walker = world.create_entity(0.0, 0.0);
    world
        .add_component(walker, RigidBody::with_velocity(Vec2::new(speed, speed)))
        .unwrap();
    world
        .add_component(walker, Waypoint::to(Vec2::new(distance, 0.0)))
        .unwrap();

    let expected = (distance / (speed * dt)).ceil() as u32;
    let mut ticks = 0;
    while !world.get_component::<Waypoint>(walker).unwrap().is_finished() {
        system
            .update(&mut world, Scheduler::new(&pool, &config), dt)
            .unwrap();
        ticks += 1;
        assert!(ticks <= expected, "overshot the expected tick count");
    }

    assert_eq!(ticks, expected);
    let arrived = world.get_component::<Transform>(walker).unwrap().position;
    assert_eq!(arrived, Vec2::new(distance, 0.0));
    assert!(world.get_component::<RigidBody>(walker).unwrap().is_moving);

    // A finished path leaves the body where it landed.
    for _ in 0..5 {
        system
            .update(&mut world, Scheduler::new(&pool, &config), dt)
            .unwrap();
        assert_eq!(
            world.get_component::<Transform>(walker).unwrap().position,
            arrived
        );
        assert!(world.get_component::<RigidBody>(walker).unwrap().is_moving);
        assert!(world.get_component::<Waypoint>(walker).unwrap().is_finished());
    }
}

#[test]
fn verify_waypoint_paths_survive_parallel_chunks() {
    let pool = WorkerPool::new(3).unwrap();
    let config = SchedulerConfig {
        small_set_threshold: 0,
        entities_per_worker: 16,
        ..SchedulerConfig::new()
    };
    let system = WaypointSystem::default();

    let mut world = World::new();
    let walkers: Vec<EntityId> = (0..200)
        .map(|_| {
            let id = world.create_entity(0.0, 0.0);
            world
                .add_component(id, RigidBody::with_velocity(Vec2::new(5.0, 5.0)))
                .unwrap();
            world
                .add_component(
                    id,
                    Waypoint::through([Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]),
                )
                .unwrap();
            id
        })
        .collect();

    for _ in 0..4 {
        system
            .update(&mut world, Scheduler::new(&pool, &config), 1.0)
            .unwrap();
    }

    for id in walkers {
        let path = world.get_component::<Waypoint>(id).unwrap();
        assert!(path.is_finished());
        assert_eq!(
            world.get_component::<Transform>(id).unwrap().position,
            Vec2::new(10.0, 10.0)
        );
    }
}
