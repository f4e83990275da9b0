//! Pareto-dominance selection over trial objectives.
//!
//! Each trial is judged on three objectives: distance, time elapsed
//! (lower is better) and collisions (lower is better). A result
//! dominates another when it is at least as good in all three and
//! strictly better in at least one.
use super::offspring_factory::OffspringFactory;
use crate::genomics::{GeneticConfig, Genome};
use crate::trials::TrialResult;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which distance measure counts as the distance objective.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceObjective {
    /// More total path length is better.
    #[default]
    MaximizeTraveled,
    /// Less remaining distance to the goal is better.
    MinimizeRemaining,
}

impl DistanceObjective {
    /// The distance objective as a cost, lower being better.
    fn cost(self, result: &TrialResult) -> f32 {
        match self {
            DistanceObjective::MaximizeTraveled => -result.distance_traveled,
            DistanceObjective::MinimizeRemaining => result.final_distance_to_goal,
        }
    }
}

fn costs(result: &TrialResult, distance: DistanceObjective) -> [f32; 3] {
    [
        distance.cost(result),
        result.time_elapsed,
        result.collisions as f32,
    ]
}

/// Whether `a` Pareto-dominates `b`.
///
/// # Examples
/// ```
/// use roamer::{dominates, DistanceObjective, TrialResult};
///
/// let slow = TrialResult {
///     agent_id: 0,
///     goal_reached: false,
///     time_elapsed: 10.0,
///     distance_traveled: 4.0,
///     collisions: 1,
///     final_distance_to_goal: 6.0,
/// };
/// let fast = TrialResult { agent_id: 1, time_elapsed: 8.0, ..slow };
///
/// assert!(dominates(&fast, &slow, DistanceObjective::MaximizeTraveled));
/// assert!(!dominates(&slow, &fast, DistanceObjective::MaximizeTraveled));
/// assert!(!dominates(&slow, &slow, DistanceObjective::MaximizeTraveled));
/// ```
pub fn dominates(a: &TrialResult, b: &TrialResult, distance: DistanceObjective) -> bool {
    let (a, b) = (costs(a, distance), costs(b, distance));
    a.iter().zip(&b).all(|(x, y)| x <= y) && a.iter().zip(&b).any(|(x, y)| x < y)
}

/// Indices of the results no other result dominates, in order.
pub fn non_dominated(results: &[TrialResult], distance: DistanceObjective) -> Vec<usize> {
    (0..results.len())
        .filter(|&i| {
            !results
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &results[i], distance))
        })
        .collect()
}

/// Keeps the non-dominated genomes and fills the remaining slots with
/// children of two random non-dominated parents.
///
/// Returns `None` when the front is empty, in which case the
/// caller keeps the current population.
pub(crate) fn next_generation<R: Rng + ?Sized>(
    genomes: &[Genome],
    results: &[TrialResult],
    distance: DistanceObjective,
    genetic_config: &GeneticConfig,
    rng: &mut R,
) -> Option<Vec<Genome>> {
    let front: Vec<&Genome> = non_dominated(results, distance)
        .into_iter()
        .filter_map(|i| genomes.get(i))
        .collect();
    if front.is_empty() {
        return None;
    }

    let size = genomes.len();
    let mut next: Vec<Genome> = front.iter().take(size).map(|g| (*g).clone()).collect();
    let mut factory = OffspringFactory::new(genetic_config, rng);
    while next.len() < size {
        match factory.breed_from(&front) {
            Some(child) => next.push(child),
            None => break,
        }
    }
    Some(next)
}
