// Turning a survey summary into the text report and the JSON summary.

use std::fmt::Write;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use survey_metrics::{CategoryStats, KpiBlock, RatingScale, SummaryRules, SurveySummary};

use crate::dashboard::config_reader::SurveyConfig;

const BAR_WIDTH: usize = 20;

/// Threshold below which a gap is reported as balanced. Half a tenth of a
/// point on a 1-5 scale is noise.
const GAP_TOLERANCE: f64 = 0.2;

pub fn fmt_score(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{:.2}", v),
        None => "no data".to_string(),
    }
}

fn fmt_enps(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{:.1}", v),
        None => "no data".to_string(),
    }
}

/// A text bar proportional to the position of the value within the scale.
pub fn format_bar(value: f64, scale: &RatingScale) -> String {
    let frac = ((value - scale.min) / (scale.max - scale.min)).clamp(0.0, 1.0);
    let filled = (frac * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn gap_verdict(gap: f64) -> &'static str {
    if gap > GAP_TOLERANCE {
        "under-delivering"
    } else if gap < -GAP_TOLERANCE {
        "over-delivering"
    } else {
        "balanced"
    }
}

pub fn build_report(
    config: &SurveyConfig,
    summary: &SurveySummary,
    rules: &SummaryRules,
    department_filter: Option<&str>,
) -> String {
    let mut out = String::new();
    let w = &mut out;
    let _ = writeln!(w, "# {} - KPI report", config.output_settings.survey_name);
    if let Some(date) = &config.output_settings.survey_date {
        let _ = writeln!(w, "Date: {}", date);
    }
    match department_filter {
        Some(d) => {
            let _ = writeln!(w, "Scope: department {}", d);
        }
        None => {
            let _ = writeln!(w, "Scope: all departments");
        }
    }
    let _ = writeln!(w, "Respondents: {}", summary.kpis.respondents);

    if summary.kpis.respondents == 0 {
        let _ = writeln!(w);
        let _ = writeln!(w, "No responses in this scope.");
        return out;
    }

    let _ = writeln!(w);
    let _ = writeln!(w, "## KPI overview");
    let kpis = &summary.kpis;
    let _ = writeln!(
        w,
        "- eNPS: {} (promoters {}, passives {}, detractors {})",
        fmt_enps(kpis.enps.score),
        kpis.enps.promoters,
        kpis.enps.passives,
        kpis.enps.detractors
    );
    let _ = writeln!(w, "- Average recommendation: {}", fmt_score(kpis.avg_recommend));
    let _ = writeln!(
        w,
        "- Overall satisfaction: {}",
        fmt_score(kpis.overall_satisfaction)
    );
    let _ = writeln!(w, "- Contribution: {}", fmt_score(kpis.contribution));
    let _ = writeln!(w, "- Retention intent: {}", fmt_score(kpis.retention_intent));
    if let Some(salary) = kpis.annual_salary {
        let _ = writeln!(w, "- Average annual salary: {:.0}", salary);
    }
    if let Some(overtime) = kpis.monthly_overtime {
        let _ = writeln!(w, "- Average monthly overtime: {:.1} hours", overtime);
    }
    if let Some(leave) = kpis.paid_leave_rate {
        let _ = writeln!(w, "- Average paid leave taken: {:.1}", leave);
    }

    let _ = writeln!(w);
    let _ = writeln!(w, "## Category satisfaction ranking");
    let mut ranked: Vec<&CategoryStats> = summary
        .categories
        .iter()
        .filter(|c| c.satisfaction.is_some())
        .collect();
    ranked.sort_by(|a, b| a.satisfaction.partial_cmp(&b.satisfaction).unwrap());
    let name_width = ranked
        .iter()
        .map(|c| c.category.chars().count())
        .max()
        .unwrap_or(0);
    for cat in ranked.iter() {
        let score = cat.satisfaction.unwrap();
        let _ = writeln!(
            w,
            "{:<width$}  {} {:.2}",
            cat.category,
            format_bar(score, &rules.rating_scale),
            score,
            width = name_width
        );
    }
    for cat in summary.categories.iter().filter(|c| c.satisfaction.is_none()) {
        let _ = writeln!(w, "{:<width$}  no data", cat.category, width = name_width);
    }

    let _ = writeln!(w);
    let _ = writeln!(w, "## Expectation gap analysis");
    let mut gaps: Vec<&CategoryStats> = summary
        .categories
        .iter()
        .filter(|c| c.gap.is_some())
        .collect();
    gaps.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap());
    for cat in gaps.iter() {
        let gap = cat.gap.unwrap();
        let _ = writeln!(
            w,
            "- {}: expectation {} satisfaction {} gap {:+.2} ({})",
            cat.category,
            fmt_score(cat.expectation),
            fmt_score(cat.satisfaction),
            gap,
            gap_verdict(gap)
        );
    }
    if gaps.is_empty() {
        let _ = writeln!(w, "No category has answers on both axes.");
    }

    if department_filter.is_none() {
        let _ = writeln!(w);
        let _ = writeln!(w, "## Departments");
        if summary.departments.is_empty() {
            let _ = writeln!(w, "No department information in the responses.");
        }
        for group in summary.departments.iter() {
            let _ = writeln!(
                w,
                "- {}: {} respondents, eNPS {}, satisfaction {}",
                group.group,
                group.kpis.respondents,
                fmt_enps(group.kpis.enps.score),
                fmt_score(group.kpis.overall_satisfaction)
            );
        }
    }
    out
}

/// A score in the JSON summary. Scores are rendered as fixed-precision
/// strings so that reference comparisons are stable across platforms.
pub fn js_score(x: Option<f64>) -> JSValue {
    match x {
        Some(v) => json!(format!("{:.2}", v)),
        None => JSValue::Null,
    }
}

fn kpis_to_json(kpis: &KpiBlock) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert("respondents".to_string(), json!(kpis.respondents.to_string()));
    m.insert(
        "enps".to_string(),
        json!({
            "score": js_score(kpis.enps.score),
            "promoters": kpis.enps.promoters.to_string(),
            "passives": kpis.enps.passives.to_string(),
            "detractors": kpis.enps.detractors.to_string(),
        }),
    );
    m.insert("avgRecommend".to_string(), js_score(kpis.avg_recommend));
    m.insert(
        "overallSatisfaction".to_string(),
        js_score(kpis.overall_satisfaction),
    );
    m.insert("contribution".to_string(), js_score(kpis.contribution));
    m.insert("retentionIntent".to_string(), js_score(kpis.retention_intent));
    m.insert("annualSalary".to_string(), js_score(kpis.annual_salary));
    m.insert("monthlyOvertime".to_string(), js_score(kpis.monthly_overtime));
    m.insert("paidLeaveRate".to_string(), js_score(kpis.paid_leave_rate));
    JSValue::Object(m)
}

fn categories_to_json(categories: &[CategoryStats]) -> Vec<JSValue> {
    categories
        .iter()
        .map(|cat| {
            json!({
                "name": cat.category,
                "satisfaction": js_score(cat.satisfaction),
                "expectation": js_score(cat.expectation),
                "gap": js_score(cat.gap),
            })
        })
        .collect()
}

pub fn build_summary_js(config: &SurveyConfig, summary: &SurveySummary) -> JSValue {
    let departments: Vec<JSValue> = summary
        .departments
        .iter()
        .map(|group| {
            json!({
                "name": group.group,
                "kpis": kpis_to_json(&group.kpis),
                "categories": categories_to_json(&group.categories),
            })
        })
        .collect();
    json!({
        "config": {
            "surveyName": config.output_settings.survey_name,
            "surveyDate": config.output_settings.survey_date,
            "organization": config.output_settings.organization,
        },
        "kpis": kpis_to_json(&summary.kpis),
        "categories": categories_to_json(&summary.categories),
        "departments": departments,
    })
}
