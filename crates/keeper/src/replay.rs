//! Deterministic replay of an oracle schedule on a manual clock: one period
//! per entry, with a gated request, a delivery and a rebase each round.

use nextcopper_core::{
    Clock, ElasticState, Fixed12, GenesisParams, ManualClock, RebaseEngine, RebaseOutcome, RecordingFeed,
};
use num_traits::ToPrimitive;

use crate::error::{KeeperError, KeeperResult};

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub outcomes: Vec<RebaseOutcome>,
    pub final_state: ElasticState,
    pub feed: RecordingFeed,
}

pub fn replay(
    params: GenesisParams,
    engine: &RebaseEngine,
    schedule: &[(Fixed12, Fixed12)],
) -> KeeperResult<ReplayReport> {
    let period_length = params.period_length;
    let request_period_limit = params.request_period_limit;
    let mut state = ElasticState::genesis(params)?;
    let clock = ManualClock::default();
    let mut feed = RecordingFeed::new();
    let mut outcomes = Vec::with_capacity(schedule.len());

    for (round, (quantity, price)) in schedule.iter().enumerate() {
        let height = clock.advance_blocks(period_length);
        let time = clock.advance_time(request_period_limit);

        if !state.need_request_oracle(height, time) {
            return Err(KeeperError::StateError(format!(
                "round {}: oracle request gate closed at block {}",
                round + 1,
                height
            )));
        }
        let request = state.request_oracle_data(height, time, &mut feed)?;
        state.deliver_observation(request.period_index, *quantity, *price);

        let outcome = engine.rebase(&mut state, clock.current_block_height())?;
        log::info!("{}", format_row(round + 1, &outcome));
        outcomes.push(outcome);
    }

    Ok(ReplayReport {
        outcomes,
        final_state: state,
        feed,
    })
}

pub fn table_header() -> String {
    format!(
        "{:>5} {:>14} {:>14} {:>7} {:>7} {:>10} {:>10} {:>10} {:>14} {:>14} {:>10} {:>16}",
        "Round", "Q1", "Q2", "P1", "P2", "DELTA_P", "DELTA_Q", "PES", "PRE_REBASE", "REBASE", "DIFF %", "REWARD_RATE"
    )
}

/// One line of the replay table; floats are for display only
pub fn format_row(round: usize, outcome: &RebaseOutcome) -> String {
    let reading = &outcome.reading;
    let display = |value: Fixed12| value.to_f64().unwrap_or(f64::NAN);

    format!(
        "{:>5} {:>14} {:>14} {:>7} {:>7} {:>10.6} {:>10.6} {:>10.6} {:>14} {:>14} {:>+10.6} {:>16}",
        round,
        reading.q1.trunc(),
        reading.q2.trunc(),
        reading.p1.to_string(),
        reading.p2.to_string(),
        display(reading.delta_p),
        display(reading.delta_q),
        display(reading.pes),
        outcome.supply_before.trunc(),
        outcome.supply_after.trunc(),
        outcome.supply_change_percent().unwrap_or(0.0),
        outcome.adjustment.block_reward_rate.to_string()
    )
}
