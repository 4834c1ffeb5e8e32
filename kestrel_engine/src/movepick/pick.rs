/// Stages of a `MovePicker`. Each constructor starts at the TT-move stage of its kind and
/// `incr` walks through the stages that follow.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pick {
    MainSearch = 0,
    CapturesInit = 1,
    GoodCaptures = 2,
    KillerOne = 3,
    KillerTwo = 4,
    CounterMove = 5,
    QuietInit = 6,
    QuietMoves = 7,
    BadCaptures = 8,
    EvasionSearch = 9,
    EvasionsInit = 10,
    AllEvasions = 11,
    ProbCutSearch = 12,
    ProbCutCapturesInit = 13,
    ProbCutCaptures = 14,
    QSearch = 15,
    QSearchInit = 16,
    QCaptures = 17,
}

impl Pick {
    /// Advances to the following stage. The last stage of each kind stays put.
    #[inline]
    pub fn incr(&mut self) {
        *self = match *self {
            Pick::MainSearch => Pick::CapturesInit,
            Pick::CapturesInit => Pick::GoodCaptures,
            Pick::GoodCaptures => Pick::KillerOne,
            Pick::KillerOne => Pick::KillerTwo,
            Pick::KillerTwo => Pick::CounterMove,
            Pick::CounterMove => Pick::QuietInit,
            Pick::QuietInit => Pick::QuietMoves,
            Pick::QuietMoves => Pick::BadCaptures,
            Pick::BadCaptures => Pick::BadCaptures,
            Pick::EvasionSearch => Pick::EvasionsInit,
            Pick::EvasionsInit => Pick::AllEvasions,
            Pick::AllEvasions => Pick::AllEvasions,
            Pick::ProbCutSearch => Pick::ProbCutCapturesInit,
            Pick::ProbCutCapturesInit => Pick::ProbCutCaptures,
            Pick::ProbCutCaptures => Pick::ProbCutCaptures,
            Pick::QSearch => Pick::QSearchInit,
            Pick::QSearchInit => Pick::QCaptures,
            Pick::QCaptures => Pick::QCaptures,
        };
    }
}

// Strategy
//
// MainSearch: TT move, captures with a good exchange, the two killers, the counter move,
//      quiets sorted by history, then the captures losing material.
// Evasions: TT move, then every evasion, captures first.
// ProbCut: TT move, then captures whose exchange clears the threshold.
// QSearch: TT move, then captures sorted by victim and history.
