use roamer::tables::Delimiter;
use roamer::{FitnessConfig, TrialResult};

use std::io::{self, Write};

pub const TRIAL_HEADER: [&str; 7] = [
    "AgentId",
    "GoalReached",
    "TimeElapsed",
    "TotalDistance",
    "Collisions",
    "FinalDistanceToGoal",
    "Fitness",
];

/// Writes one row per trial result, header first, with each row's
/// fitness scored by `fitness`.
///
/// # Examples
/// ```
/// use roamer::tables::Delimiter;
/// use roamer::{FitnessConfig, TrialResult};
/// use roamer_trials::reports::write_trial_results;
///
/// let result = TrialResult {
///     agent_id: 2,
///     goal_reached: false,
///     time_elapsed: 10.0,
///     distance_traveled: 4.5,
///     collisions: 0,
///     final_distance_to_goal: 5.0,
/// };
/// let mut table = Vec::new();
/// write_trial_results(&mut table, &[result], &FitnessConfig::default(), Delimiter::Comma).unwrap();
/// let table = String::from_utf8(table).unwrap();
/// assert_eq!(table.lines().nth(1), Some("2,false,10,4.5,0,5,0.5"));
/// ```
pub fn write_trial_results<W: Write>(
    mut writer: W,
    results: &[TrialResult],
    fitness: &FitnessConfig,
    delimiter: Delimiter,
) -> io::Result<()> {
    let d = delimiter.as_char().to_string();
    writeln!(writer, "{}", TRIAL_HEADER.join(&d))?;
    for result in results {
        writeln!(
            writer,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            result.agent_id,
            result.goal_reached,
            result.time_elapsed,
            result.distance_traveled,
            result.collisions,
            result.final_distance_to_goal,
            fitness.score(result),
            d = d
        )?;
    }
    writer.flush()
}
