//! Houses any UCI compatible options, as well as the framework for parsing and applying them.

use std::collections::VecDeque;

use crate::consts::{DEFAULT_MOVE_OVERHEAD, DEFAULT_TT_SIZE, MAX_THREADS};
use crate::nnue::network::INTERNAL_NAME;
use crate::search::params::PARAM_SPECS;

use super::UciError;

/// A List of work for the engine to do following the application of options
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionWork {
    ClearTT,
    ResizeTT(usize),
    Threads(usize),
    MoveOverhead(i64),
    MultiPV(usize),
    Ponder(bool),
    Chess960(bool),
    EvalFile(String),
    SyzygyPath(String),
    Tune(&'static str, i32),
}

impl OptionWork {
    pub fn usable_while_searching(&self) -> bool {
        match *self {
            OptionWork::ClearTT
            | OptionWork::ResizeTT(_)
            | OptionWork::Threads(_)
            | OptionWork::EvalFile(_)
            | OptionWork::Tune(..) => false,
            OptionWork::MoveOverhead(_)
            | OptionWork::MultiPV(_)
            | OptionWork::Ponder(_)
            | OptionWork::Chess960(_)
            | OptionWork::SyzygyPath(_) => true,
        }
    }
}

/// A sorted map of options available
pub struct OptionsMap {
    pub map: Vec<Box<dyn UCIOption>>,
    pub work: VecDeque<OptionWork>,
}

impl Default for OptionsMap {
    fn default() -> Self {
        OptionsMap::new()
    }
}

impl OptionsMap {
    /// Creates a new `OptionsMap`.
    pub fn new() -> Self {
        let mut map = vec![
            OptionsMap::clear_hash(),
            OptionsMap::resize_hash(),
            OptionsMap::threads(),
            OptionsMap::move_overhead(),
            OptionsMap::multi_pv(),
            OptionsMap::ponder(),
            OptionsMap::chess960(),
            OptionsMap::eval_file(),
            OptionsMap::syzygy_path(),
        ];
        map.sort_by(|a, b| a.option_name().cmp(b.option_name()));

        // Tunables go last, in declaration order.
        for spec in PARAM_SPECS {
            let name = spec.name;
            map.push(Box::new(UCISpin {
                option_name: name,
                default: spec.default,
                min: spec.min,
                max: spec.max,
                mutator: Box::new(move |x| Some(OptionWork::Tune(name, x))),
            }));
        }

        OptionsMap {
            map,
            work: VecDeque::new(),
        }
    }

    /// Applies an option, queueing the resulting work. Option names are case insensitive.
    pub fn apply_option(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        let op = self
            .map
            .iter()
            .find(|op| op.option_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UciError::UnknownOption(name.to_string()))?;
        match op.mutate(value) {
            Some(work) => {
                self.work.push_back(work);
                Ok(())
            }
            None => Err(UciError::BadOptionValue {
                name: op.option_name().to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Displays all available options
    pub fn display_all(&self) {
        for op in self.map.iter() {
            println!("{}", op.display());
        }
    }

    /// Returns if there is any work available from the `OptionsMap`.
    pub fn work(&mut self) -> Option<OptionWork> {
        self.work.pop_front()
    }

    fn clear_hash() -> Box<dyn UCIOption> {
        Box::new(UCIButton {
            option_name: "Clear Hash",
            mutator: Box::new(|| Some(OptionWork::ClearTT)),
        })
    }

    fn resize_hash() -> Box<dyn UCIOption> {
        Box::new(UCISpin {
            option_name: "Hash",
            default: DEFAULT_TT_SIZE as i32,
            min: 1,
            max: 65536,
            mutator: Box::new(|x| Some(OptionWork::ResizeTT(x as usize))),
        })
    }

    fn threads() -> Box<dyn UCIOption> {
        Box::new(UCISpin {
            option_name: "Threads",
            default: default_threads() as i32,
            min: 1,
            max: MAX_THREADS as i32,
            mutator: Box::new(|x| Some(OptionWork::Threads(x as usize))),
        })
    }

    fn move_overhead() -> Box<dyn UCIOption> {
        Box::new(UCISpin {
            option_name: "MoveOverhead",
            default: DEFAULT_MOVE_OVERHEAD as i32,
            min: 0,
            max: 50_000,
            mutator: Box::new(|x| Some(OptionWork::MoveOverhead(x as i64))),
        })
    }

    fn multi_pv() -> Box<dyn UCIOption> {
        Box::new(UCISpin {
            option_name: "MultiPV",
            default: 1,
            min: 1,
            max: 256,
            mutator: Box::new(|x| Some(OptionWork::MultiPV(x as usize))),
        })
    }

    fn ponder() -> Box<dyn UCIOption> {
        Box::new(UCICheck {
            option_name: "Ponder",
            default: false,
            mutator: Box::new(|x| Some(OptionWork::Ponder(x))),
        })
    }

    fn chess960() -> Box<dyn UCIOption> {
        Box::new(UCICheck {
            option_name: "UCI_Chess960",
            default: false,
            mutator: Box::new(|x| Some(OptionWork::Chess960(x))),
        })
    }

    fn eval_file() -> Box<dyn UCIOption> {
        Box::new(UCIText {
            option_name: "EvalFile",
            default: INTERNAL_NAME,
            mutator: Box::new(|x| Some(OptionWork::EvalFile(x.to_string()))),
        })
    }

    fn syzygy_path() -> Box<dyn UCIOption> {
        Box::new(UCIText {
            option_name: "SyzygyPath",
            default: "<empty>",
            mutator: Box::new(|x| Some(OptionWork::SyzygyPath(x.to_string()))),
        })
    }
}

/// Number of search threads used until told otherwise.
pub fn default_threads() -> usize {
    num_cpus::get().clamp(1, MAX_THREADS)
}

// "option name Nullmove type check default true\n"
// "option name Clear Hash type button\n"

/// UCI compliant options for a searcher.
pub trait UCIOption: Send {
    // Returns the type of option. This can be one of the following: button, check, spin or text.
    fn option_type(&self) -> &'static str;

    // Returns the exact name of the option.
    fn option_name(&self) -> &'static str;

    // Returns the remaining display text of the `UCIOption`.
    fn partial_display(&self) -> Option<String>;

    /// Displays the options
    fn display(&self) -> String {
        let mut display =
            String::from("option name ") + self.option_name() + " type " + self.option_type();

        if let Some(part_dis) = self.partial_display() {
            display += " ";
            display += &part_dis;
        }
        display
    }

    /// Possibly mutates a value with an option. If the value is accepted, the work the
    /// engine has to do is returned back.
    fn mutate(&self, val: &str) -> Option<OptionWork>;
}

type Mutator<T> = Box<dyn Fn(T) -> Option<OptionWork> + Send>;

pub struct UCIButton {
    option_name: &'static str,
    mutator: Box<dyn Fn() -> Option<OptionWork> + Send>,
}

pub struct UCICheck {
    option_name: &'static str,
    default: bool,
    mutator: Mutator<bool>,
}

pub struct UCISpin {
    option_name: &'static str,
    default: i32,
    max: i32,
    min: i32,
    mutator: Mutator<i32>,
}

pub struct UCIText {
    option_name: &'static str,
    default: &'static str,
    mutator: Box<dyn Fn(&str) -> Option<OptionWork> + Send>,
}

impl UCIOption for UCIButton {
    fn option_type(&self) -> &'static str {
        "button"
    }

    fn option_name(&self) -> &'static str {
        self.option_name
    }

    fn partial_display(&self) -> Option<String> {
        None
    }

    fn mutate(&self, _val: &str) -> Option<OptionWork> {
        (self.mutator)()
    }
}

impl UCIOption for UCICheck {
    fn option_type(&self) -> &'static str {
        "check"
    }

    fn option_name(&self) -> &'static str {
        self.option_name
    }

    fn partial_display(&self) -> Option<String> {
        Some(String::from("default ") + &self.default.to_string())
    }

    fn mutate(&self, val: &str) -> Option<OptionWork> {
        match val.trim() {
            v if v.eq_ignore_ascii_case("true") => (self.mutator)(true),
            v if v.eq_ignore_ascii_case("false") => (self.mutator)(false),
            _ => None,
        }
    }
}

impl UCIOption for UCISpin {
    fn option_type(&self) -> &'static str {
        "spin"
    }

    fn option_name(&self) -> &'static str {
        self.option_name
    }

    fn partial_display(&self) -> Option<String> {
        Some(
            String::from("default ")
                + &self.default.to_string()
                + " min "
                + &self.min.to_string()
                + " max "
                + &self.max.to_string(),
        )
    }

    fn mutate(&self, val: &str) -> Option<OptionWork> {
        if let Ok(integer) = val.trim().parse::<i32>() {
            if integer >= self.min && integer <= self.max {
                return (self.mutator)(integer);
            }
        }
        None
    }
}

impl UCIOption for UCIText {
    fn option_type(&self) -> &'static str {
        "string"
    }

    fn option_name(&self) -> &'static str {
        self.option_name
    }

    fn partial_display(&self) -> Option<String> {
        Some(String::from("default ") + self.default)
    }

    fn mutate(&self, val: &str) -> Option<OptionWork> {
        if val.is_empty() {
            return None;
        }
        (self.mutator)(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn spin_ranges() {
        let mut opts = OptionsMap::new();
        assert!(opts.apply_option("Hash", "64").is_ok());
        assert_eq!(opts.work(), Some(OptionWork::ResizeTT(64)));
        assert_eq!(
            opts.apply_option("Hash", "0"),
            Err(UciError::BadOptionValue {
                name: "Hash".to_string(),
                value: "0".to_string()
            })
        );
        assert!(opts.apply_option("Hash", "lots").is_err());
        assert_eq!(opts.work(), None);
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut opts = OptionsMap::new();
        assert!(opts.apply_option("multipv", "3").is_ok());
        assert!(opts.apply_option("clear hash", "").is_ok());
        assert!(opts.apply_option("Ponder", "true").is_ok());
        assert_eq!(
            opts.work.drain(..).collect::<Vec<_>>(),
            vec![OptionWork::MultiPV(3), OptionWork::ClearTT, OptionWork::Ponder(true)]
        );
        assert_eq!(
            opts.apply_option("Contempt", "10"),
            Err(UciError::UnknownOption("Contempt".to_string()))
        );
    }

    #[test]
    fn tunables_are_spins() {
        let mut opts = OptionsMap::new();
        let spec = PARAM_SPECS[0];
        let line = opts
            .map
            .iter()
            .find(|o| o.option_name() == spec.name)
            .map(|o| o.display())
            .unwrap();
        assert_eq!(
            line,
            format!(
                "option name {} type spin default {} min {} max {}",
                spec.name, spec.default, spec.min, spec.max
            )
        );
        assert!(opts.apply_option(spec.name, &spec.max.to_string()).is_ok());
        assert_eq!(opts.work(), Some(OptionWork::Tune(spec.name, spec.max)));
        assert!(opts.apply_option(spec.name, &(spec.max + 1).to_string()).is_err());
    }

    #[test]
    fn text_options() {
        let mut opts = OptionsMap::new();
        assert!(opts.apply_option("EvalFile", "nets/kestrel.bin").is_ok());
        assert_eq!(opts.work(), Some(OptionWork::EvalFile("nets/kestrel.bin".to_string())));
        assert!(opts.apply_option("EvalFile", "").is_err());
        assert!(!OptionWork::EvalFile(String::new()).usable_while_searching());
        assert!(OptionWork::MultiPV(2).usable_while_searching());
    }
}
