#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use league_scheduler::data::{Stadium, Team, TimeSlot};
use league_scheduler::{
    ConstraintsConfig, EvolutionConfig, LeagueSnapshot, RoundRobin, SchedulerConfig,
    TournamentConfig,
};
use std::collections::{BTreeMap, BTreeSet};

/// Calendar shape for a generated league
pub struct Calendar {
    pub rounds: u32,
    pub slots_per_round: u32,
    pub days_between_rounds: i64,
}

impl Calendar {
    pub fn weekly(rounds: u32, slots_per_round: u32) -> Self {
        Self {
            rounds,
            slots_per_round,
            days_between_rounds: 7,
        }
    }

    pub fn daily(rounds: u32) -> Self {
        Self {
            rounds,
            slots_per_round: 1,
            days_between_rounds: 1,
        }
    }
}

/// `teams` teams spread over `stadiums` grounds (team i plays at stadium
/// `(i - 1) % stadiums + 1`). Every stadium is lit and open in every slot.
pub fn league_snapshot(teams: u32, stadiums: u32, calendar: &Calendar) -> LeagueSnapshot {
    let first_day = NaiveDate::from_ymd_opt(2025, 9, 6).unwrap();
    let mut slots = Vec::new();
    for round in 1..=calendar.rounds {
        let day = first_day + Duration::days(calendar.days_between_rounds * (round as i64 - 1));
        for k in 0..calendar.slots_per_round {
            slots.push(TimeSlot {
                id: round * 10 + k,
                starts_at: day.and_hms_opt(13 + 3 * k, 0, 0).unwrap(),
                round,
            });
        }
    }
    let all_slots: BTreeSet<u32> = slots.iter().map(|s| s.id).collect();

    let stadium_list = (1..=stadiums)
        .map(|id| Stadium {
            id,
            name: format!("Ground {}", id),
            capacity: 10_000 + id * 1_000,
            has_lighting: true,
            available_slots: all_slots.clone(),
        })
        .collect();

    let team_list = (1..=teams)
        .map(|id| {
            let home = (id - 1) % stadiums + 1;
            Team {
                id,
                name: format!("Club {}", id),
                home_stadium: home,
                alternate_stadiums: Vec::new(),
                region: format!("Region {}", home),
                rest_days: 0,
                travel_km: (1..=stadiums)
                    .map(|s| (s, if s == home { 10.0 } else { 150.0 }))
                    .collect::<BTreeMap<_, _>>(),
            }
        })
        .collect();

    LeagueSnapshot {
        teams: team_list,
        stadiums: stadium_list,
        slots,
    }
}

pub fn run_config(
    format: RoundRobin,
    constraints: ConstraintsConfig,
    seed: u64,
) -> SchedulerConfig {
    SchedulerConfig {
        evolution: EvolutionConfig {
            population_size: 40,
            max_generations: 100,
            seed: Some(seed),
            workers: Some(2),
            save_history: true,
            ..EvolutionConfig::default()
        },
        tournament: TournamentConfig { format },
        constraints,
    }
}
