//! Decides when a search has to stop.

use std::time::Instant;

use kestrel::Player;

use super::time_management::TimeManager;
use super::uci_timer::PreLimits;

/// Everything the iterative deepening loop knows about how the last iterations went, used
/// to stretch or shrink the ideal time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SoftStopFactors {
    /// Above 1.0 when the score is dropping compared to previous iterations.
    pub falling_eval: f64,
    /// Below 1.0 when the best move has not changed for several iterations.
    pub time_reduction: f64,
    /// Grows with the number of best move changes.
    pub instability: f64,
    /// Fraction of the nodes of the last iteration spent on the best move.
    pub node_share: f64,
}

impl Default for SoftStopFactors {
    fn default() -> Self {
        SoftStopFactors {
            falling_eval: 1.0,
            time_reduction: 1.0,
            instability: 1.0,
            node_share: 0.5,
        }
    }
}

/// Limits of one search, resolved against the side to move.
#[derive(Clone, Debug)]
pub struct SearchLimiter {
    start: Instant,
    time: Option<TimeManager>,
    move_time: Option<i64>,
    hard_nodes: Option<u64>,
    soft_nodes: Option<u64>,
    pub depth: Option<i32>,
    pub mate: Option<i32>,
    pub infinite: bool,
    pub ponder: bool,
}

impl SearchLimiter {
    pub fn new(limits: &PreLimits, turn: Player, ply: u16, move_overhead: i64) -> Self {
        let time = limits
            .time
            .as_ref()
            .filter(|t| !t.is_blank())
            .map(|t| TimeManager::new(t, turn, ply, move_overhead));
        SearchLimiter {
            start: Instant::now(),
            time,
            move_time: limits
                .move_time
                .map(|t| (t as i64 - move_overhead).max(1)),
            hard_nodes: limits.nodes,
            soft_nodes: limits.soft_nodes,
            depth: limits.depth.map(|d| d as i32),
            mate: limits.mate.map(|m| m as i32),
            infinite: limits.infinite,
            ponder: limits.ponder,
        }
    }

    /// A search that only ends when told to.
    pub fn infinite() -> Self {
        SearchLimiter::new(
            &PreLimits {
                infinite: true,
                ..PreLimits::default()
            },
            Player::White,
            0,
            0,
        )
    }

    /// Milliseconds since the search started.
    pub fn elapsed(&self) -> i64 {
        chrono::Duration::from_std(self.start.elapsed())
            .map(|d| d.num_milliseconds())
            .unwrap_or(i64::MAX)
    }

    /// Returns if the search is limited by a clock.
    #[inline]
    pub fn use_time_management(&self) -> bool {
        self.time.is_some()
    }

    /// Returns if the search has to stop right away. Only limits which bound the search
    /// from the outside apply here, pondering is handled by the caller.
    pub fn should_stop_hard(&self, nodes: u64) -> bool {
        if self.infinite {
            return false;
        }
        if let Some(limit) = self.hard_nodes {
            if nodes >= limit {
                return true;
            }
        }
        if self.move_time.is_none() && self.time.is_none() {
            return false;
        }
        let elapsed = self.elapsed();
        if let Some(mt) = self.move_time {
            if elapsed >= mt {
                return true;
            }
        }
        match self.time {
            Some(ref tm) => elapsed >= tm.maximum_time(),
            None => false,
        }
    }

    /// Returns if another iteration is not worth starting.
    pub fn should_stop_soft(&self, nodes: u64, factors: &SoftStopFactors) -> bool {
        if self.infinite {
            return false;
        }
        if let Some(limit) = self.soft_nodes {
            if nodes >= limit {
                return true;
            }
        }
        let tm = match self.time {
            Some(ref tm) => tm,
            None => return false,
        };
        let node_scale = (1.5 - factors.node_share).clamp(0.5, 1.5);
        let total = tm.ideal_time() as f64
            * factors.falling_eval
            * factors.time_reduction
            * factors.instability
            * node_scale;
        self.elapsed() as f64 > total.min(tm.maximum_time() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::uci_timer::UCITimer;

    #[test]
    fn node_limits() {
        let limits = PreLimits {
            nodes: Some(1000),
            ..PreLimits::default()
        };
        let limiter = SearchLimiter::new(&limits, Player::White, 0, 10);
        assert!(!limiter.should_stop_hard(999));
        assert!(limiter.should_stop_hard(1000));
        assert!(!limiter.use_time_management());

        let soft_limits = PreLimits {
            soft_nodes: Some(10),
            ..PreLimits::default()
        };
        let soft = SearchLimiter::new(&soft_limits, Player::White, 0, 0);
        assert!(soft.should_stop_soft(10, &SoftStopFactors::default()));
        assert!(!soft.should_stop_soft(9, &SoftStopFactors::default()));
        assert!(!soft.should_stop_hard(1_000_000));

        let infinite = PreLimits {
            infinite: true,
            ..soft_limits
        };
        let soft = SearchLimiter::new(&infinite, Player::White, 0, 0);
        assert!(!soft.should_stop_soft(1_000_000, &SoftStopFactors::default()));
    }

    #[test]
    fn clock_limits() {
        let limits = PreLimits {
            time: Some(UCITimer {
                time_msec: [60_000, 60_000],
                inc_msec: [0, 0],
                moves_to_go: 0,
            }),
            ..PreLimits::default()
        };
        let limiter = SearchLimiter::new(&limits, Player::White, 0, 10);
        assert!(limiter.use_time_management());
        assert!(!limiter.should_stop_hard(0));
        assert!(!limiter.should_stop_soft(0, &SoftStopFactors::default()));

        let blank = PreLimits {
            time: Some(UCITimer::blank()),
            ..PreLimits::default()
        };
        assert!(!SearchLimiter::new(&blank, Player::White, 0, 10).use_time_management());
    }

    #[test]
    fn depth_never_stops_on_time() {
        let limiter = SearchLimiter::new(&PreLimits::depth(3), Player::Black, 0, 0);
        assert!(!limiter.should_stop_hard(u64::MAX));
        assert_eq!(limiter.depth, Some(3));
    }
}
