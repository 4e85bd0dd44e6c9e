pub use crate::config::*;
use crate::run_survey_stats;

/// A builder for assembling survey responses by hand.
///
/// It is mostly useful for tests and for callers that do not go through a
/// spreadsheet reader.
///
/// ```
/// pub use survey_metrics::Builder;
/// pub use survey_metrics::SummaryRules;
/// # use survey_metrics::MetricsErrors;
///
/// let mut builder = Builder::new(&SummaryRules::DEFAULT_RULES)?
///     .categories(&["pay".to_string(), "growth".to_string()])?;
///
/// builder.add_response_simple(Some("Sales"), Some(9.0), Some(4.0))?;
/// builder.add_response_simple(Some("Sales"), Some(3.0), Some(2.0))?;
///
/// let summary = builder.summarize()?;
/// assert_eq!(summary.kpis.respondents, 2);
///
/// # Ok::<(), MetricsErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: SummaryRules,
    pub(crate) _categories: Vec<String>,
    pub(crate) _responses: Vec<SurveyResponse>,
}

impl Builder {
    pub fn new(rules: &SummaryRules) -> Result<Builder, MetricsErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _categories: Vec::new(),
            _responses: Vec::new(),
        })
    }

    /// Registers the survey categories. Responses added through
    /// [`Builder::add_response_simple`] carry one (empty) rating slot per
    /// registered category.
    pub fn categories(self, cats: &[String]) -> Result<Builder, MetricsErrors> {
        Ok(Builder {
            _rules: self._rules,
            _categories: cats.to_vec(),
            _responses: Vec::new(),
        })
    }

    /// Adds a response with only the headline answers filled in.
    ///
    /// It is the simplest use case for most callers.
    pub fn add_response_simple(
        &mut self,
        department: Option<&str>,
        recommend_score: Option<f64>,
        overall_satisfaction: Option<f64>,
    ) -> Result<(), MetricsErrors> {
        let ratings = self
            ._categories
            .iter()
            .map(|name| CategoryRating {
                category: name.clone(),
                expectation: None,
                satisfaction: None,
            })
            .collect();
        self.add_response(&SurveyResponse {
            department: department.map(|s| s.to_string()),
            recommend_score,
            overall_satisfaction,
            ratings,
            ..SurveyResponse::default()
        })
    }

    pub fn add_response(&mut self, response: &SurveyResponse) -> Result<(), MetricsErrors> {
        self._responses.push(response.clone());
        Ok(())
    }

    pub fn summarize(&self) -> Result<SurveySummary, MetricsErrors> {
        run_survey_stats(&self._responses, &self._rules)
    }
}
