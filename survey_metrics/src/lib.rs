mod builder;
mod config;
pub mod quick_start;

use log::{debug, info, warn};

use std::collections::{BTreeMap, HashMap};

pub use crate::builder::Builder;
pub use crate::config::*;

/// Group name used for responses without department information.
pub const UNSPECIFIED_GROUP: &str = "(unspecified)";

// **** Private structures ****

/// Streaming mean accumulator.
#[derive(PartialEq, Debug, Clone, Copy)]
struct Accum {
    sum: f64,
    count: u64,
}

impl Accum {
    const EMPTY: Accum = Accum { sum: 0.0, count: 0 };

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// None when nothing was accumulated. This is the division-by-zero guard
    /// for empty groups.
    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Computes the KPI summary for the given responses under the given rules.
///
/// The computation is a pure function of its inputs: running it twice over
/// the same slice produces an identical summary. An empty slice is not an
/// error, it yields a summary with zero respondents and no-data KPIs.
///
/// Arguments:
/// * `responses` the survey responses to aggregate
/// * `rules` the scales and thresholds that govern the aggregation
pub fn run_survey_stats(
    responses: &[SurveyResponse],
    rules: &SummaryRules,
) -> Result<SurveySummary, MetricsErrors> {
    check_rules(rules)?;
    info!("run_survey_stats: processing {:?} responses", responses.len());

    let all: Vec<&SurveyResponse> = responses.iter().collect();
    let kpis = compute_kpis(&all, rules);
    let categories = compute_categories(&all, rules);

    // Group the responses by department. The groups are kept in sorted name
    // order so that repeated runs emit identical summaries.
    let mut groups: BTreeMap<String, Vec<&SurveyResponse>> = BTreeMap::new();
    let mut has_department = false;
    for r in all.iter() {
        let key = match &r.department {
            Some(d) if !d.is_empty() => {
                has_department = true;
                d.clone()
            }
            _ => UNSPECIFIED_GROUP.to_string(),
        };
        groups.entry(key).or_default().push(r);
    }

    let departments: Vec<GroupStats> = if has_department {
        groups
            .iter()
            .map(|(name, rs)| GroupStats {
                group: name.clone(),
                kpis: compute_kpis(rs, rules),
                categories: compute_categories(rs, rules),
            })
            .collect()
    } else {
        // No response carries a department, a breakdown would be a single
        // unspecified group repeating the overall numbers.
        Vec::new()
    };

    Ok(SurveySummary {
        kpis,
        categories,
        departments,
    })
}

fn check_rules(rules: &SummaryRules) -> Result<(), MetricsErrors> {
    for scale in [&rules.rating_scale, &rules.recommend_scale] {
        if !scale.min.is_finite() || !scale.max.is_finite() || scale.min >= scale.max {
            return Err(MetricsErrors::InvalidScale);
        }
    }
    if !rules.recommend_scale.contains(rules.promoter_threshold)
        || !rules.recommend_scale.contains(rules.detractor_threshold)
        || rules.detractor_threshold >= rules.promoter_threshold
    {
        return Err(MetricsErrors::InvalidThresholds);
    }
    Ok(())
}

/// Accumulates an answer that lives on a declared scale. Out-of-scale answers
/// are skipped so that the resulting mean stays within the scale bounds.
fn push_scaled(acc: &mut Accum, answer: Option<f64>, scale: &RatingScale) {
    match answer {
        Some(v) if scale.contains(v) => acc.push(v),
        Some(v) => warn!("push_scaled: skipping out-of-scale answer {:?}", v),
        None => {}
    }
}

/// Accumulates an unscaled numeric answer (salary, overtime, leave rate).
fn push_number(acc: &mut Accum, answer: Option<f64>) {
    match answer {
        Some(v) if v.is_finite() => acc.push(v),
        Some(v) => warn!("push_number: skipping non-finite answer {:?}", v),
        None => {}
    }
}

fn compute_kpis(responses: &[&SurveyResponse], rules: &SummaryRules) -> KpiBlock {
    let mut recommend = Accum::EMPTY;
    let mut overall = Accum::EMPTY;
    let mut contribution = Accum::EMPTY;
    let mut retention = Accum::EMPTY;
    let mut salary = Accum::EMPTY;
    let mut overtime = Accum::EMPTY;
    let mut paid_leave = Accum::EMPTY;

    let mut promoters: u64 = 0;
    let mut passives: u64 = 0;
    let mut detractors: u64 = 0;

    for r in responses.iter() {
        if let Some(score) = r.recommend_score {
            if rules.recommend_scale.contains(score) {
                recommend.push(score);
                if score >= rules.promoter_threshold {
                    promoters += 1;
                } else if score <= rules.detractor_threshold {
                    detractors += 1;
                } else {
                    passives += 1;
                }
            } else {
                warn!(
                    "compute_kpis: skipping out-of-scale recommendation score {:?} for {:?}",
                    score, r.respondent_id
                );
            }
        }
        push_scaled(&mut overall, r.overall_satisfaction, &rules.rating_scale);
        push_scaled(&mut contribution, r.contribution, &rules.rating_scale);
        push_scaled(&mut retention, r.retention_intent, &rules.rating_scale);
        push_number(&mut salary, r.annual_salary);
        push_number(&mut overtime, r.monthly_overtime);
        push_number(&mut paid_leave, r.paid_leave_rate);
    }

    let scored = promoters + passives + detractors;
    let enps_score = if scored == 0 {
        None
    } else {
        Some((promoters as f64 - detractors as f64) * 100.0 / scored as f64)
    };
    debug!(
        "compute_kpis: promoters: {:?} passives: {:?} detractors: {:?} enps: {:?}",
        promoters, passives, detractors, enps_score
    );

    KpiBlock {
        respondents: responses.len() as u64,
        enps: EnpsStats {
            promoters,
            passives,
            detractors,
            score: enps_score,
        },
        avg_recommend: recommend.mean(),
        overall_satisfaction: overall.mean(),
        contribution: contribution.mean(),
        retention_intent: retention.mean(),
        annual_salary: salary.mean(),
        monthly_overtime: overtime.mean(),
        paid_leave_rate: paid_leave.mean(),
    }
}

// Categories are returned in order of first appearance in the responses.
fn compute_categories(responses: &[&SurveyResponse], rules: &SummaryRules) -> Vec<CategoryStats> {
    let mut order: Vec<String> = Vec::new();
    let mut accs: HashMap<String, (Accum, Accum)> = HashMap::new();

    for r in responses.iter() {
        for rating in r.ratings.iter() {
            if !accs.contains_key(&rating.category) {
                order.push(rating.category.clone());
                accs.insert(rating.category.clone(), (Accum::EMPTY, Accum::EMPTY));
            }
            if let Some(entry) = accs.get_mut(&rating.category) {
                push_scaled(&mut entry.0, rating.satisfaction, &rules.rating_scale);
                push_scaled(&mut entry.1, rating.expectation, &rules.rating_scale);
            }
        }
    }

    order
        .iter()
        .map(|name| {
            let (sat, exp) = accs[name];
            let satisfaction = sat.mean();
            let expectation = exp.mean();
            // The gap is defined from the two independently computed means.
            let gap = match (expectation, satisfaction) {
                (Some(e), Some(s)) => Some(e - s),
                _ => None,
            };
            CategoryStats {
                category: name.clone(),
                satisfaction,
                expectation,
                gap,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(
        department: Option<&str>,
        recommend: Option<f64>,
        overall: Option<f64>,
        pay_expectation: Option<f64>,
        pay_satisfaction: Option<f64>,
    ) -> SurveyResponse {
        SurveyResponse {
            department: department.map(|s| s.to_string()),
            recommend_score: recommend,
            overall_satisfaction: overall,
            ratings: vec![CategoryRating {
                category: "pay".to_string(),
                expectation: pay_expectation,
                satisfaction: pay_satisfaction,
            }],
            ..SurveyResponse::default()
        }
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let responses = vec![
            response(Some("Sales"), Some(9.0), Some(4.0), Some(5.0), Some(3.0)),
            response(Some("Engineering"), Some(3.0), Some(2.0), Some(4.0), Some(4.0)),
            response(None, Some(8.0), Some(5.0), None, Some(2.0)),
        ];
        let first = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        let second = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn enps_bounds_at_extremes() {
        let all_promoters = vec![
            response(None, Some(10.0), None, None, None),
            response(None, Some(9.0), None, None, None),
        ];
        let res = run_survey_stats(&all_promoters, &SummaryRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.kpis.enps.score, Some(100.0));

        let all_detractors = vec![
            response(None, Some(0.0), None, None, None),
            response(None, Some(6.0), None, None, None),
        ];
        let res = run_survey_stats(&all_detractors, &SummaryRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.kpis.enps.score, Some(-100.0));
    }

    #[test]
    fn enps_mixed_distribution() {
        // 2 promoters, 1 passive, 1 detractor -> (2 - 1) / 4 * 100 = 25
        let responses = vec![
            response(None, Some(9.0), None, None, None),
            response(None, Some(10.0), None, None, None),
            response(None, Some(7.0), None, None, None),
            response(None, Some(2.0), None, None, None),
        ];
        let res = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.kpis.enps.score, Some(25.0));
        assert_eq!(res.kpis.enps.scored(), 4);
    }

    #[test]
    fn means_stay_within_scale_bounds() {
        // The 99.0 answers are outside the 1-5 scale and must be skipped.
        let responses = vec![
            response(None, None, Some(99.0), Some(99.0), Some(4.0)),
            response(None, None, Some(3.0), Some(5.0), Some(2.0)),
        ];
        let rules = SummaryRules::DEFAULT_RULES;
        let res = run_survey_stats(&responses, &rules).unwrap();
        assert_eq!(res.kpis.overall_satisfaction, Some(3.0));
        let pay = &res.categories[0];
        for v in [pay.satisfaction, pay.expectation].iter().flatten() {
            assert!(rules.rating_scale.contains(*v), "mean {} out of scale", v);
        }
    }

    #[test]
    fn gap_is_difference_of_means() {
        let responses = vec![
            response(None, None, None, Some(5.0), Some(2.0)),
            response(None, None, None, Some(4.0), Some(3.0)),
        ];
        let res = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        let pay = &res.categories[0];
        assert_eq!(pay.expectation, Some(4.5));
        assert_eq!(pay.satisfaction, Some(2.5));
        assert_eq!(pay.gap, Some(4.5 - 2.5));
    }

    #[test]
    fn empty_input_yields_no_data() {
        let res = run_survey_stats(&[], &SummaryRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.kpis.respondents, 0);
        assert_eq!(res.kpis.enps.score, None);
        assert_eq!(res.kpis.overall_satisfaction, None);
        assert!(res.categories.is_empty());
        assert!(res.departments.is_empty());
    }

    #[test]
    fn category_with_no_answers_yields_no_data() {
        let responses = vec![response(None, Some(8.0), Some(4.0), None, None)];
        let res = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        let pay = &res.categories[0];
        assert_eq!(pay.satisfaction, None);
        assert_eq!(pay.expectation, None);
        assert_eq!(pay.gap, None);
    }

    #[test]
    fn departments_are_sorted_and_bucket_unspecified() {
        let responses = vec![
            response(Some("Sales"), Some(9.0), Some(4.0), None, None),
            response(Some("Engineering"), Some(2.0), Some(2.0), None, None),
            response(None, Some(7.0), Some(3.0), None, None),
        ];
        let res = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        let names: Vec<&str> = res.departments.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec![UNSPECIFIED_GROUP, "Engineering", "Sales"]);
        let sales = res.departments.iter().find(|g| g.group == "Sales").unwrap();
        assert_eq!(sales.kpis.respondents, 1);
        assert_eq!(sales.kpis.enps.score, Some(100.0));
    }

    #[test]
    fn no_departments_when_none_specified() {
        let responses = vec![response(None, Some(9.0), Some(4.0), None, None)];
        let res = run_survey_stats(&responses, &SummaryRules::DEFAULT_RULES).unwrap();
        assert!(res.departments.is_empty());
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let mut rules = SummaryRules::DEFAULT_RULES;
        rules.rating_scale = RatingScale { min: 5.0, max: 1.0 };
        assert_eq!(
            run_survey_stats(&[], &rules),
            Err(MetricsErrors::InvalidScale)
        );

        let mut rules = SummaryRules::DEFAULT_RULES;
        rules.promoter_threshold = 2.0;
        rules.detractor_threshold = 6.0;
        assert_eq!(
            run_survey_stats(&[], &rules),
            Err(MetricsErrors::InvalidThresholds)
        );
    }
}
