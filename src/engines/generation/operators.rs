use crate::config::evolution::CrossoverMethod;
use crate::engines::generation::genome::{GeneSpace, Genome};
use crate::engines::generation::population::Individual;
use rand::Rng;

/// Tournament selection: best of K random candidates (with replacement).
/// Returns the winner's index.
pub fn tournament_selection<R: Rng>(
    population: &[Individual],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..population.len());

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        if population[idx].rank_cmp(&population[best_idx]).is_lt() {
            best_idx = idx;
        }
    }

    best_idx
}

/// Roulette wheel selection for a minimised fitness: weight `1 / (1 + f - f_min)`
pub fn roulette_selection<R: Rng>(population: &[Individual], rng: &mut R) -> usize {
    let values: Vec<f64> = population
        .iter()
        .map(|i| i.fitness().map(|f| f.value).unwrap_or(f64::INFINITY))
        .collect();
    let best = values.iter().copied().fold(f64::INFINITY, f64::min);

    if !best.is_finite() {
        // Nothing evaluated, pick uniformly
        return rng.gen_range(0..population.len());
    }

    let weights: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { 1.0 / (1.0 + v - best) } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();

    let mut spin = rng.gen::<f64>() * total;
    for (idx, weight) in weights.iter().enumerate() {
        spin -= weight;
        if spin <= 0.0 && *weight > 0.0 {
            return idx;
        }
    }

    // Fallback: last individual with a weight
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

/// Crossover dispatch; genes stay aligned by position so bounds are preserved
pub fn crossover<R: Rng>(
    method: CrossoverMethod,
    parent1: &Genome,
    parent2: &Genome,
    rng: &mut R,
) -> (Genome, Genome) {
    match method {
        CrossoverMethod::SinglePoint => single_point_crossover(parent1, parent2, rng),
        CrossoverMethod::TwoPoint => two_point_crossover(parent1, parent2, rng),
        CrossoverMethod::Uniform => uniform_crossover(parent1, parent2, rng),
    }
}

/// Single-point crossover: swap genome tails
pub fn single_point_crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    rng: &mut R,
) -> (Genome, Genome) {
    let len = parent1.len().min(parent2.len());
    if len <= 1 {
        return (parent1.clone(), parent2.clone());
    }

    let point = rng.gen_range(1..len);

    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();

    child1[point..len].copy_from_slice(&parent2[point..len]);
    child2[point..len].copy_from_slice(&parent1[point..len]);

    (child1, child2)
}

/// Two-point crossover: swap a contiguous segment
pub fn two_point_crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    rng: &mut R,
) -> (Genome, Genome) {
    let len = parent1.len().min(parent2.len());
    if len <= 2 {
        return single_point_crossover(parent1, parent2, rng);
    }

    let a = rng.gen_range(0..len);
    let b = rng.gen_range(0..len);
    let (start, end) = if a <= b { (a, b + 1) } else { (b, a + 1) };

    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();

    child1[start..end].copy_from_slice(&parent2[start..end]);
    child2[start..end].copy_from_slice(&parent1[start..end]);

    (child1, child2)
}

/// Uniform crossover: each position from either parent with equal odds
pub fn uniform_crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    rng: &mut R,
) -> (Genome, Genome) {
    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();

    for i in 0..parent1.len().min(parent2.len()) {
        if rng.gen_bool(0.5) {
            child1[i] = parent2[i];
            child2[i] = parent1[i];
        }
    }

    (child1, child2)
}

/// Move one gene to a different eligible option. Returns false when the
/// position has a single option.
pub fn reassign_gene<R: Rng>(
    genome: &mut Genome,
    position: usize,
    space: &GeneSpace,
    rng: &mut R,
) -> bool {
    let count = space.option_count(position);
    if count <= 1 {
        return false;
    }
    let current = genome[position];
    let mut pick = rng.gen_range(0..count - 1);
    if pick >= current {
        pick += 1;
    }
    genome[position] = pick;
    true
}

/// Exchange the venue and slot of two matches, keeping each pairing's
/// orientation. Falls back to exchanging slots only. Returns false when
/// neither exchange is eligible.
pub fn swap_assignments(genome: &mut Genome, i: usize, j: usize, space: &GeneSpace) -> bool {
    if i == j {
        return false;
    }
    let (Some(a), Some(b)) = (
        space.option(i, genome[i]).copied(),
        space.option(j, genome[j]).copied(),
    ) else {
        return false;
    };

    let full = (
        space.find(i, |o| o.home == a.home && o.stadium == b.stadium && o.slot == b.slot),
        space.find(j, |o| o.home == b.home && o.stadium == a.stadium && o.slot == a.slot),
    );
    let slots_only = || {
        (
            space.find(i, |o| o.home == a.home && o.stadium == a.stadium && o.slot == b.slot),
            space.find(j, |o| o.home == b.home && o.stadium == b.stadium && o.slot == a.slot),
        )
    };

    let (gi, gj) = match full {
        (Some(gi), Some(gj)) => (gi, gj),
        _ => match slots_only() {
            (Some(gi), Some(gj)) => (gi, gj),
            _ => return false,
        },
    };
    genome[i] = gi;
    genome[j] = gj;
    true
}

/// Per-gene mutation: with probability `mutation_rate` a gene either swaps
/// assignments with another random match (`swap_share` of the time) or is
/// reassigned. Returns the number of genes touched.
pub fn mutate<R: Rng>(
    genome: &mut Genome,
    mutation_rate: f64,
    swap_share: f64,
    space: &GeneSpace,
    rng: &mut R,
) -> usize {
    let len = genome.len();
    let mut touched = 0;

    for position in 0..len {
        if rng.gen::<f64>() >= mutation_rate {
            continue;
        }
        if len > 1 && rng.gen::<f64>() < swap_share {
            let other = rng.gen_range(0..len);
            if swap_assignments(genome, position, other, space) {
                touched += 2;
                continue;
            }
        }
        if reassign_gene(genome, position, space, rng) {
            touched += 1;
        }
    }

    touched
}
