use kestrel::core::masks::PLAYER_CNT;

/// The clock as sent with `go wtime .. btime .. winc .. binc .. movestogo ..`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UCITimer {
    pub time_msec: [i64; PLAYER_CNT], // time each player has remaining
    pub inc_msec: [i64; PLAYER_CNT],  // increments for each palyer after each turn
    pub moves_to_go: u32,             // Moves to go until next time control sent
}

impl UCITimer {
    pub fn blank() -> Self {
        UCITimer::default()
    }

    pub fn is_blank(&self) -> bool {
        self.time_msec[0] == 0
            && self.time_msec[1] == 0
            && self.inc_msec[0] == 0
            && self.inc_msec[1] == 0
    }
}

/// The limits of a `go` command, before they are resolved against a position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreLimits {
    pub time: Option<UCITimer>,
    pub move_time: Option<u64>,
    pub nodes: Option<u64>,
    /// Node count after which no new iteration is started.
    pub soft_nodes: Option<u64>,
    pub depth: Option<u16>,
    pub mate: Option<u16>,
    pub infinite: bool,
    pub ponder: bool,
    pub search_moves: Vec<String>,
}

impl PreLimits {
    pub fn blank() -> Self {
        PreLimits::default()
    }

    /// Limits for a fixed depth search.
    pub fn depth(depth: u16) -> Self {
        PreLimits {
            depth: Some(depth),
            ..PreLimits::default()
        }
    }
}
