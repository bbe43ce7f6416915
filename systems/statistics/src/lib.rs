#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory tally of resolved spins.

use std::collections::BTreeMap;

use fortune_wheel_core::{Event, PrizeId, PrizeSet};
use serde::Serialize;

/// Pure statistics system that counts wins from resolved spin events.
#[derive(Debug, Default)]
pub struct Statistics {
    total_spins: u64,
    wins: BTreeMap<PrizeId, u64>,
}

impl Statistics {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tally that lists every prize of `prizes`, starting at zero wins.
    #[must_use]
    pub fn with_prizes(prizes: &PrizeSet) -> Self {
        Self {
            total_spins: 0,
            wins: prizes.iter().map(|prize| (prize.id, 0)).collect(),
        }
    }

    /// Consumes wheel events, counting every [`Event::SpinResolved`].
    ///
    /// Cancelled and rejected spins never reach the tally.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::SpinResolved { result } = event {
                self.record(result.prize_id());
            }
        }
    }

    /// Counts one win for `prize_id`.
    pub fn record(&mut self, prize_id: PrizeId) {
        self.total_spins = self.total_spins.saturating_add(1);
        let wins = self.wins.entry(prize_id).or_default();
        *wins = wins.saturating_add(1);
    }

    /// Number of resolved spins observed.
    #[must_use]
    pub const fn total_spins(&self) -> u64 {
        self.total_spins
    }

    /// Wins recorded for `prize_id`.
    #[must_use]
    pub fn wins(&self, prize_id: PrizeId) -> u64 {
        self.wins.get(&prize_id).copied().unwrap_or(0)
    }

    /// Share of resolved spins won by `prize_id`, in percent.
    #[must_use]
    pub fn win_percentage(&self, prize_id: PrizeId) -> f64 {
        percentage(self.wins(prize_id), self.total_spins)
    }

    /// Forgets every recorded spin, keeping seeded prizes at zero wins.
    pub fn reset(&mut self) {
        self.total_spins = 0;
        self.wins.values_mut().for_each(|wins| *wins = 0);
    }

    /// Snapshot of the tally ordered by prize identifier.
    #[must_use]
    pub fn report(&self) -> StatisticsReport {
        StatisticsReport {
            total_spins: self.total_spins,
            prizes: self
                .wins
                .iter()
                .map(|(&prize_id, &wins)| PrizeTally {
                    prize_id,
                    wins,
                    percentage: percentage(wins, self.total_spins),
                })
                .collect(),
        }
    }
}

/// Serializable snapshot of a [`Statistics`] tally.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsReport {
    /// Number of resolved spins observed.
    pub total_spins: u64,
    /// Per-prize tallies for every seeded prize and every prize that won.
    pub prizes: Vec<PrizeTally>,
}

/// Wins recorded for a single prize.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PrizeTally {
    /// Prize the tally belongs to.
    pub prize_id: PrizeId,
    /// Number of spins the prize won.
    pub wins: u64,
    /// Share of all resolved spins, in percent rounded to two decimals.
    pub percentage: f64,
}

/// Expresses `part` as a percentage of `total`, rounded to two decimals.
///
/// Returns zero when nothing was counted yet.
#[must_use]
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{percentage, Statistics};
    use fortune_wheel_core::{Prize, PrizeId, PrizeSet};

    #[test]
    fn percentages_round_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn record_accumulates_per_prize() {
        let mut statistics = Statistics::new();
        statistics.record(PrizeId::new(2));
        statistics.record(PrizeId::new(1));
        statistics.record(PrizeId::new(2));

        assert_eq!(statistics.total_spins(), 3);
        assert_eq!(statistics.wins(PrizeId::new(2)), 2);
        assert_eq!(statistics.wins(PrizeId::new(7)), 0);
        assert_eq!(statistics.win_percentage(PrizeId::new(1)), 33.33);

        let report = statistics.report();
        let ids: Vec<_> = report.prizes.iter().map(|tally| tally.prize_id).collect();
        assert_eq!(ids, vec![PrizeId::new(1), PrizeId::new(2)]);

        statistics.reset();
        assert_eq!(statistics.total_spins(), 0);
        assert!(statistics.report().prizes.iter().all(|tally| tally.wins == 0));
    }

    #[test]
    fn seeded_prizes_are_reported_before_they_win() {
        let prizes = PrizeSet::new(vec![
            Prize::new(PrizeId::new(3), "a").with_probability(100.0),
            Prize::new(PrizeId::new(8), "b").with_probability(0.0),
        ]);
        let mut statistics = Statistics::with_prizes(&prizes);
        statistics.record(PrizeId::new(3));

        let report = statistics.report();
        assert_eq!(report.prizes.len(), 2);
        assert_eq!(report.prizes[0].percentage, 100.0);
        assert_eq!(report.prizes[1].prize_id, PrizeId::new(8));
        assert_eq!(report.prizes[1].wins, 0);
        assert_eq!(report.prizes[1].percentage, 0.0);

        statistics.reset();
        assert_eq!(statistics.report().prizes.len(), 2);
    }
}
