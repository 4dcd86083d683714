//! Property-based invariant tests for the simulation.
use eco_core::Species;
use eco_simulation::{Ecosysteme, SavedState, SimConfig, Simulation};
use proptest::prelude::*;

fn config(seed: u64, plants: usize, prey: usize, predators: usize, cap: usize) -> SimConfig {
    SimConfig::default()
        .with_seed(seed)
        .with_timestep(0.25)
        .with_population_cap(cap)
        .with_initial(plants, prey, predators)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn commit_preserves_invariants(
        seed in any::<u64>(),
        plants in 0usize..30,
        prey in 0usize..15,
        predators in 0usize..5,
        extra_cap in 0usize..20,
    ) {
        let cap = plants + prey + predators + extra_cap + 1;
        let mut eco = Ecosysteme::new(config(seed, plants, prey, predators, cap)).unwrap();
        for _ in 0..80 {
            eco.tick();
            prop_assert!(eco.population() <= cap);
            prop_assert_eq!(eco.index_ids(), eco.live_ids());
            for entity in eco.entities() {
                prop_assert!(entity.energy >= 0.0, "{} has energy {}", entity.id, entity.energy);
                prop_assert!(eco.config().world.contains(entity.position));
            }
        }
    }

    #[test]
    fn identical_seeds_give_identical_runs(seed in any::<u64>()) {
        let run = || {
            let mut eco = Ecosysteme::new(config(seed, 20, 10, 3, 200)).unwrap();
            eco.run(60);
            eco
        };
        let (a, b) = (run(), run());
        for species in Species::ALL {
            prop_assert_eq!(a.count(species), b.count(species));
        }
        let latest_a = a.stats().latest().unwrap();
        let latest_b = b.stats().latest().unwrap();
        prop_assert_eq!(latest_a.plant_energy, latest_b.plant_energy);
        prop_assert_eq!(latest_a.prey_energy, latest_b.prey_energy);
        prop_assert_eq!(latest_a.predator_energy, latest_b.predator_energy);
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}

#[test]
fn default_world_runs_deterministically() {
    let run = || {
        let mut sim = Simulation::new(SimConfig::default().with_seed(2024)).unwrap();
        sim.run(900);
        sim.snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn different_seeds_scatter_differently() {
    let a = Ecosysteme::new(SimConfig::default().with_seed(1)).unwrap();
    let b = Ecosysteme::new(SimConfig::default().with_seed(2)).unwrap();
    assert_ne!(a.snapshot(), b.snapshot());
}

#[test]
fn restored_run_matches_uninterrupted_run() {
    let config = SimConfig::default().with_seed(77).with_timestep(0.2);

    let mut straight = Ecosysteme::new(config.clone()).unwrap();
    straight.run(400);

    let mut first_half = Ecosysteme::new(config).unwrap();
    first_half.run(200);
    let json = SavedState::capture(&first_half).to_json().unwrap();
    drop(first_half);
    let mut resumed = SavedState::from_json(&json).unwrap().restore().unwrap();
    resumed.run(200);

    assert_eq!(resumed.current_tick(), straight.current_tick());
    assert_eq!(resumed.next_id(), straight.next_id());
    assert_eq!(resumed.regrowth_timer(), straight.regrowth_timer());
    assert_eq!(resumed.snapshot(), straight.snapshot());
}

#[test]
fn restored_simulation_resumes_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");

    let mut sim = Simulation::new(SimConfig::default().with_seed(5)).unwrap();
    sim.run(50);
    sim.save(&path).unwrap();

    let mut loaded = Simulation::load(&path).unwrap();
    assert_eq!(loaded.current_tick(), 50);
    loaded.run(50);
    sim.run(50);
    assert_eq!(loaded.snapshot().entities, sim.snapshot().entities);
}
