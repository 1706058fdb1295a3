mod common;

use common::{league_snapshot, run_config, Calendar};
use league_scheduler::engines::constraints::ConstraintSet;
use league_scheduler::engines::generation::operators::{crossover, mutate};
use league_scheduler::engines::generation::{
    EvaluationContext, FitnessFunction, NoopProgressCallback, ScheduleCodec,
};
use league_scheduler::{
    ConstraintsConfig, CrossoverMethod, EvolutionEngine, League, RoundRobin, SchedulerError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

fn double_league(teams: u32) -> Arc<League> {
    let rounds = 2 * (teams - 1);
    let snapshot = league_snapshot(teams, 3, &Calendar::weekly(rounds, 2));
    Arc::new(League::new(snapshot, RoundRobin::Double).unwrap())
}

#[test]
fn double_round_robin_has_balanced_fixtures() {
    let league = double_league(6);
    let config = run_config(RoundRobin::Double, ConstraintsConfig::clashes_only(), 31);
    let outcome = EvolutionEngine::new(league.clone(), &config)
        .unwrap()
        .run(NoopProgressCallback)
        .unwrap();

    let schedule = outcome.result.schedule();
    assert_eq!(schedule.len(), 30);
    for team in league.team_ids() {
        assert_eq!(schedule.home_count(team), 5);
        assert_eq!(schedule.away_count(team), 5);
    }

    assert!(outcome.result.is_feasible());
    let mut seen = HashSet::new();
    for m in schedule {
        assert!(seen.insert((m.home, m.slot)), "team {} plays twice in slot {}", m.home, m.slot);
        assert!(seen.insert((m.away, m.slot)), "team {} plays twice in slot {}", m.away, m.slot);
    }
}

#[test]
fn decode_of_encode_is_identity() {
    let codec = ScheduleCodec::new(double_league(4));
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..20 {
        let schedule = codec.decode(&codec.space().random_genome(&mut rng)).unwrap();
        let genome = codec.encode(&schedule).unwrap();
        assert_eq!(codec.decode(&genome).unwrap(), schedule);
    }
}

#[test]
fn evaluation_is_repeatable() {
    let context = EvaluationContext::new(
        ScheduleCodec::new(double_league(4)),
        ConstraintSet::from_config(&ConstraintsConfig::default()).unwrap(),
        FitnessFunction::new(1_000_000.0),
    );
    let mut rng = StdRng::seed_from_u64(5);
    let genome = context.codec().space().random_genome(&mut rng);
    let first = context.evaluate(&genome).unwrap();
    let second = context.evaluate(&genome).unwrap();
    assert_eq!(first.report, second.report);
    assert_eq!(first.fitness, second.fitness);
}

#[test]
fn operator_output_always_decodes() {
    let codec = ScheduleCodec::new(double_league(5));
    let space = codec.space();
    let mut rng = StdRng::seed_from_u64(77);
    let methods = [
        CrossoverMethod::SinglePoint,
        CrossoverMethod::TwoPoint,
        CrossoverMethod::Uniform,
    ];
    for method in methods {
        for _ in 0..30 {
            let a = space.random_genome(&mut rng);
            let b = space.random_genome(&mut rng);
            let (mut c1, mut c2) = crossover(method, &a, &b, &mut rng);
            mutate(&mut c1, 0.5, 0.5, space, &mut rng);
            mutate(&mut c2, 0.5, 0.0, space, &mut rng);
            assert!(codec.decode(&c1).is_ok());
            assert!(codec.decode(&c2).is_ok());
        }
    }
}

#[test]
fn best_so_far_is_non_increasing() {
    let league = double_league(4);
    let mut config = run_config(RoundRobin::Double, ConstraintsConfig::default(), 4);
    config.evolution.max_generations = 30;
    let outcome = EvolutionEngine::new(league, &config)
        .unwrap()
        .run(NoopProgressCallback)
        .unwrap();
    for pair in outcome.history.windows(2) {
        assert!(pair[1].best_so_far <= pair[0].best_so_far);
    }
}

#[test]
fn bad_input_fails_before_the_run() {
    let mut snapshot = league_snapshot(4, 2, &Calendar::weekly(6, 2));
    snapshot.teams[0].home_stadium = 42;
    let err = League::new(snapshot, RoundRobin::Single).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidDomainData(_)));

    let too_few_slots = league_snapshot(4, 2, &Calendar::weekly(2, 1));
    let err = League::new(too_few_slots, RoundRobin::Double).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidDomainData(_)));

    let mut config = run_config(RoundRobin::Double, ConstraintsConfig::default(), 1);
    config.evolution.population_size = 1;
    let err = EvolutionEngine::new(double_league(4), &config).err().unwrap();
    assert!(matches!(err, SchedulerError::Configuration(_)));
}
