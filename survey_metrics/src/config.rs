// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Inclusive bounds of a rating scale.
///
/// Answers outside the bounds are considered unusable and are skipped by the
/// aggregation.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl RatingScale {
    /// The 1-5 scale used by the satisfaction and expectation items.
    pub const ONE_TO_FIVE: RatingScale = RatingScale { min: 1.0, max: 5.0 };
    /// The 0-10 scale used by the recommendation question.
    pub const ZERO_TO_TEN: RatingScale = RatingScale { min: 0.0, max: 10.0 };

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One respondent's ratings for a single survey category, on both axes.
///
/// A missing answer stays `None` and does not contribute to the means.
#[derive(PartialEq, Debug, Clone)]
pub struct CategoryRating {
    pub category: String,
    pub expectation: Option<f64>,
    pub satisfaction: Option<f64>,
}

/// One survey response. Immutable once built.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SurveyResponse {
    pub respondent_id: Option<String>,
    pub department: Option<String>,
    /// Answer to the recommendation question, on the recommendation scale.
    pub recommend_score: Option<f64>,
    pub overall_satisfaction: Option<f64>,
    pub contribution: Option<f64>,
    pub retention_intent: Option<f64>,
    pub annual_salary: Option<f64>,
    pub monthly_overtime: Option<f64>,
    pub paid_leave_rate: Option<f64>,
    pub ratings: Vec<CategoryRating>,
}

// ******** Output data structures *********

/// Promoter/passive/detractor counts and the derived eNPS score.
#[derive(PartialEq, Debug, Clone)]
pub struct EnpsStats {
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
    /// (promoters - detractors) / scored respondents, times 100.
    /// Always within [-100, 100]. `None` when no respondent had a usable
    /// recommendation score.
    pub score: Option<f64>,
}

impl EnpsStats {
    pub fn scored(&self) -> u64 {
        self.promoters + self.passives + self.detractors
    }
}

/// Aggregates for one survey category.
#[derive(PartialEq, Debug, Clone)]
pub struct CategoryStats {
    pub category: String,
    pub satisfaction: Option<f64>,
    pub expectation: Option<f64>,
    /// expectation - satisfaction. Positive when the respondents expect more
    /// than they report getting.
    pub gap: Option<f64>,
}

/// The scalar KPIs shared by the overall summary and the per-department
/// breakdowns. A `None` value means the backing group had no usable answers.
#[derive(PartialEq, Debug, Clone)]
pub struct KpiBlock {
    pub respondents: u64,
    pub enps: EnpsStats,
    pub avg_recommend: Option<f64>,
    pub overall_satisfaction: Option<f64>,
    pub contribution: Option<f64>,
    pub retention_intent: Option<f64>,
    pub annual_salary: Option<f64>,
    pub monthly_overtime: Option<f64>,
    pub paid_leave_rate: Option<f64>,
}

/// KPIs and category aggregates for one respondent group.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupStats {
    pub group: String,
    pub kpis: KpiBlock,
    pub categories: Vec<CategoryStats>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SurveySummary {
    pub kpis: KpiBlock,
    /// Categories in order of first appearance in the responses.
    pub categories: Vec<CategoryStats>,
    /// One entry per department, in sorted name order. Empty when no
    /// response carries department information.
    pub departments: Vec<GroupStats>,
}

/// Errors that prevent the aggregation from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MetricsErrors {
    /// Scale bounds are inverted or not finite.
    InvalidScale,
    /// Promoter/detractor thresholds fall outside the recommendation scale
    /// or cross each other.
    InvalidThresholds,
}

impl Error for MetricsErrors {}

impl Display for MetricsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsErrors::InvalidScale => write!(f, "invalid rating scale bounds"),
            MetricsErrors::InvalidThresholds => write!(f, "invalid promoter/detractor thresholds"),
        }
    }
}

// ********* Configuration **********

/// The rules that govern the aggregation.
#[derive(PartialEq, Debug, Clone)]
pub struct SummaryRules {
    /// Scale of the satisfaction, expectation, contribution and retention
    /// items.
    pub rating_scale: RatingScale,
    /// Scale of the recommendation question.
    pub recommend_scale: RatingScale,
    /// A respondent is a promoter when recommend_score >= this threshold.
    pub promoter_threshold: f64,
    /// A respondent is a detractor when recommend_score <= this threshold.
    pub detractor_threshold: f64,
}

impl SummaryRules {
    pub const DEFAULT_RULES: SummaryRules = SummaryRules {
        rating_scale: RatingScale::ONE_TO_FIVE,
        recommend_scale: RatingScale::ZERO_TO_TEN,
        promoter_threshold: 9.0,
        detractor_threshold: 6.0,
    };
}
