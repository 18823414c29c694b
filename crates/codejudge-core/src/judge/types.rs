//! Typed judgments produced by validating judge responses

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Lowest score a rubric level plus modifier can reach
pub const MIN_SCORE: f64 = 0.75;
/// Highest score a rubric level plus modifier can reach
pub const MAX_SCORE: f64 = 5.25;
/// Per-dimension maximum used for `rubric_max`
pub const DIMENSION_MAX: f64 = MAX_SCORE;

/// Categories the baseline-relative judge reports on
pub const BASELINE_CATEGORIES: &[&str] = &[
    "correctness",
    "code_quality",
    "test_coverage",
    "error_handling",
    "documentation",
];

/// Defines a closed string enumeration with serde, `FromStr` and `Display`
macro_rules! string_enum {
    (
        $(#[$meta:meta])* $name:ident, $context:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Comma-separated list of accepted values
            pub fn expected() -> String {
                [$($text),+].join(", ")
            }
        }

        impl FromStr for $name {
            type Err = crate::error::JudgeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::error::JudgeError::invalid_score(
                        $context,
                        format!("{:?} is not one of: {}", other, $name::expected()),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Adjustment applied on top of the 1-5 rubric level
    #[derive(Default)]
    Modifier, "modifier" {
        Weak => "weak",
        #[default]
        Solid => "solid",
        Strong => "strong",
    }
);

impl Modifier {
    pub fn delta(&self) -> f64 {
        match self {
            Modifier::Weak => -0.25,
            Modifier::Solid => 0.0,
            Modifier::Strong => 0.25,
        }
    }

    /// Score for a base level with this modifier applied
    pub fn apply(&self, base: u8) -> f64 {
        f64::from(base) + self.delta()
    }
}

string_enum!(
    /// Outcome of a pairwise judgment
    Verdict, "verdict" {
        Equivalent => "equivalent",
        ABetter => "a_better",
        BBetter => "b_better",
    }
);

string_enum!(
    /// Strength of a pairwise verdict
    Margin, "margin" {
        Slight => "slight",
        Moderate => "moderate",
        Significant => "significant",
    }
);

string_enum!(
    /// Outcome of a baseline-relative judgment
    BaselineVerdict, "verdict" {
        FrameworkBetter => "framework_better",
        Equivalent => "equivalent",
        BaselineBetter => "baseline_better",
    }
);

string_enum!(
    /// Per-category change of the framework result relative to the baseline
    CategoryChange, "category" {
        SignificantlyImproved => "significantly_improved",
        Improved => "improved",
        Equivalent => "equivalent",
        Degraded => "degraded",
    }
);

string_enum!(
    /// Judge's estimate of development time saved
    #[derive(Default)]
    TimeSaved, "time_saved_estimate" {
        #[default]
        None => "none",
        Minimal => "minimal",
        Moderate => "moderate",
        Significant => "significant",
    }
);

/// One scored dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<u8>,
    #[serde(default)]
    pub modifier: Modifier,
    pub score: f64,
}

/// Result of judging one session against one rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub base_score: u8,
    pub modifier: Modifier,
    pub overall: f64,
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionScore>,
    pub rubric_total: f64,
    pub rubric_max: f64,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub metrics: serde_json::Value,
}

/// Result of a pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub verdict: Verdict,
    pub margin: Margin,
    pub score_a: f64,
    pub score_b: f64,
    #[serde(default)]
    pub dimension_comparison: BTreeMap<String, Verdict>,
    #[serde(default)]
    pub justification: String,
}

/// Result of a baseline-relative comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub verdict: BaselineVerdict,
    pub quality_delta: f64,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryChange>,
    #[serde(default)]
    pub time_saved_estimate: TimeSaved,
    pub score_baseline: f64,
    pub score_framework: f64,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub regressions: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Which prompt and validator a judging call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeMode {
    Single,
    Comparative,
    Baseline,
}

/// A validated judge response
#[derive(Debug, Clone, PartialEq)]
pub enum Judgment {
    Score(Score),
    Comparison(Comparison),
    Baseline(BaselineComparison),
}

impl Judgment {
    pub fn mode(&self) -> JudgeMode {
        match self {
            Judgment::Score(_) => JudgeMode::Single,
            Judgment::Comparison(_) => JudgeMode::Comparative,
            Judgment::Baseline(_) => JudgeMode::Baseline,
        }
    }
}
