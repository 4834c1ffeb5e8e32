//! Tunable search parameters.
//!
//! Every parameter is an integer exposed as a UCI `spin` option under its name, so that the
//! search can be tuned from the outside without rebuilding.

/// Bounds and default of one tunable parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: i32,
    pub min: i32,
    pub max: i32,
}

macro_rules! search_params {
    ($($field:ident : $name:literal = $default:literal, $min:literal ..= $max:literal;)*) => {
        /// The tunable constants of the search.
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub struct SearchParams {
            $(pub $field: i32,)*
        }

        impl Default for SearchParams {
            fn default() -> Self {
                SearchParams { $($field: $default,)* }
            }
        }

        /// Every tunable parameter, in declaration order.
        pub const PARAM_SPECS: &[ParamSpec] = &[
            $(ParamSpec { name: $name, default: $default, min: $min, max: $max },)*
        ];

        impl SearchParams {
            /// Sets a parameter by its option name. Returns false for unknown names and
            /// out of range values.
            pub fn set(&mut self, name: &str, value: i32) -> bool {
                match name {
                    $($name if ($min..=$max).contains(&value) => {
                        self.$field = value;
                        true
                    })*
                    _ => false,
                }
            }

            /// Reads a parameter by its option name.
            pub fn get(&self, name: &str) -> Option<i32> {
                match name {
                    $($name => Some(self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

search_params! {
    aspiration_delta: "AspirationDelta" = 10, 1..=100;
    aspiration_thread_perturb: "AspirationThreadPerturb" = 3, 0..=20;
    rfp_margin: "RfpMargin" = 75, 20..=200;
    rfp_max_depth: "RfpMaxDepth" = 9, 1..=20;
    razor_base: "RazorBase" = 400, 0..=1000;
    razor_depth_sq: "RazorDepthSq" = 250, 0..=1000;
    nmp_base: "NmpBase" = 3, 1..=6;
    nmp_depth_div: "NmpDepthDiv" = 3, 1..=8;
    nmp_eval_div: "NmpEvalDiv" = 200, 50..=500;
    nmp_verify_depth: "NmpVerifyDepth" = 14, 4..=40;
    probcut_margin: "ProbCutMargin" = 190, 50..=500;
    singular_min_depth: "SingularMinDepth" = 6, 2..=12;
    singular_double_margin: "SingularDoubleMargin" = 16, 0..=100;
    lmr_base: "LmrBase" = 100, 0..=300;
    lmr_divisor: "LmrDivisor" = 200, 100..=500;
    lmr_history_div: "LmrHistoryDiv" = 8192, 1024..=32768;
    see_capture_margin: "SeeCaptureMargin" = 20, 0..=100;
    see_quiet_margin: "SeeQuietMargin" = 70, 0..=200;
    futility_base: "FutilityBase" = 140, 0..=400;
    futility_depth: "FutilityDepth" = 120, 0..=400;
    qs_futility_margin: "QsFutilityMargin" = 200, 0..=500;
    history_bonus_mul: "HistoryBonusMul" = 300, 50..=800;
    history_bonus_sub: "HistoryBonusSub" = 250, 0..=800;
    history_bonus_max: "HistoryBonusMax" = 2500, 500..=5000;
    corr_pawn_weight: "CorrPawnWeight" = 96, 0..=512;
    corr_material_weight: "CorrMaterialWeight" = 64, 0..=512;
    corr_non_pawn_weight: "CorrNonPawnWeight" = 48, 0..=512;
}

impl SearchParams {
    /// Bonus given to the history of a move that caused a cutoff at `depth`.
    #[inline]
    pub fn stat_bonus(&self, depth: i32) -> i32 {
        (self.history_bonus_mul * depth - self.history_bonus_sub).clamp(0, self.history_bonus_max)
    }

    #[inline]
    pub fn rfp_margin(&self, depth: i32, improving: bool) -> i32 {
        self.rfp_margin * (depth - improving as i32)
    }

    #[inline]
    pub fn razor_margin(&self, depth: i32) -> i32 {
        self.razor_base + self.razor_depth_sq * depth * depth
    }

    /// Number of quiet moves tried before the rest are pruned.
    #[inline]
    pub fn lmp_count(&self, depth: i32, improving: bool) -> usize {
        ((3 + depth * depth) / (2 - improving as i32)) as usize
    }

    #[inline]
    pub fn correction_weights(&self) -> crate::tables::prelude::CorrectionWeights {
        crate::tables::prelude::CorrectionWeights {
            pawn: self.corr_pawn_weight,
            material: self.corr_material_weight,
            non_pawn: self.corr_non_pawn_weight,
        }
    }
}

pub const LMR_TABLE_SIZE: usize = 64;

/// Late move reductions indexed by `[depth][move count]`, in 1/1024ths of a ply.
pub struct LmrTable {
    table: [[i32; LMR_TABLE_SIZE]; LMR_TABLE_SIZE],
}

impl LmrTable {
    /// Fills the table with `base + ln(depth) * ln(moves) / divisor`.
    pub fn new(params: &SearchParams) -> Self {
        let base = params.lmr_base as f64 / 100.0;
        let divisor = params.lmr_divisor as f64 / 100.0;
        let mut table = [[0; LMR_TABLE_SIZE]; LMR_TABLE_SIZE];
        for (d, row) in table.iter_mut().enumerate().skip(1) {
            for (m, r) in row.iter_mut().enumerate().skip(1) {
                let red = base + (d as f64).ln() * (m as f64).ln() / divisor;
                *r = (red * 1024.0) as i32;
            }
        }
        LmrTable { table }
    }

    /// Reduction in 1/1024ths of a ply.
    #[inline]
    pub fn reduction(&self, depth: i32, move_count: usize) -> i32 {
        let d = (depth.max(0) as usize).min(LMR_TABLE_SIZE - 1);
        let m = move_count.min(LMR_TABLE_SIZE - 1);
        self.table[d][m]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_by_name() {
        let mut p = SearchParams::default();
        assert!(p.set("RfpMargin", 90));
        assert_eq!(p.rfp_margin, 90);
        assert_eq!(p.get("RfpMargin"), Some(90));
        assert!(!p.set("RfpMargin", 10_000));
        assert!(!p.set("NoSuchParam", 1));
        assert_eq!(p.get("NoSuchParam"), None);
    }

    #[test]
    fn specs_match_defaults() {
        let p = SearchParams::default();
        for spec in PARAM_SPECS {
            assert_eq!(p.get(spec.name), Some(spec.default), "{}", spec.name);
            assert!(spec.min <= spec.default && spec.default <= spec.max);
        }
    }

    #[test]
    fn formulas() {
        let p = SearchParams::default();
        assert_eq!(p.stat_bonus(1), 50);
        assert_eq!(p.stat_bonus(20), 2500);
        assert_eq!(p.rfp_margin(4, true), 225);
        assert_eq!(p.lmp_count(2, false), 3);
        assert_eq!(p.lmp_count(2, true), 7);
    }

    #[test]
    fn lmr_grows_with_depth_and_moves() {
        let t = LmrTable::new(&SearchParams::default());
        assert_eq!(t.reduction(1, 1), 1024);
        assert!(t.reduction(10, 20) > t.reduction(5, 20));
        assert!(t.reduction(10, 40) > t.reduction(10, 10));
        assert_eq!(t.reduction(500, 500), t.reduction(63, 63));
    }
}
