// Matching the configured column keywords against the header row and turning
// sheet rows into survey responses.

use log::debug;
use snafu::prelude::*;

use survey_metrics::{CategoryRating, SurveyResponse};

use crate::dashboard::{
    config_reader::SurveyConfig,
    io_common::{make_default_id, CellValue, SheetData},
    *,
};

/// Finds the first header containing the keyword. Form exports embed the full
/// question text in the header, so substring matching is what keeps the
/// configuration short.
pub fn find_column(headers: &[String], keyword: &str) -> Option<usize> {
    headers.iter().position(|h| h.contains(keyword))
}

struct CategoryIndexes {
    name: String,
    expectation: Option<usize>,
    satisfaction: Option<usize>,
}

struct FieldIndexes {
    department: Option<usize>,
    recommend: Option<usize>,
    overall_satisfaction: Option<usize>,
    contribution: Option<usize>,
    retention: Option<usize>,
    salary: Option<usize>,
    overtime: Option<usize>,
    paid_leave: Option<usize>,
    categories: Vec<CategoryIndexes>,
}

/// The outcome of matching a configuration against a header row.
#[derive(Debug, Clone)]
pub struct ColumnResolution {
    /// Matched keywords with their 0-based column index.
    pub matched: Vec<(String, usize)>,
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
}

fn field_indexes(headers: &[String], config: &SurveyConfig) -> FieldIndexes {
    let fields = &config.fields;
    let opt = |kw: &Option<String>| kw.as_deref().and_then(|k| find_column(headers, k));
    FieldIndexes {
        department: opt(&fields.department_column),
        recommend: find_column(headers, &fields.recommend_column),
        overall_satisfaction: find_column(headers, &fields.overall_satisfaction_column),
        contribution: opt(&fields.contribution_column),
        retention: opt(&fields.retention_column),
        salary: opt(&fields.salary_column),
        overtime: opt(&fields.overtime_column),
        paid_leave: opt(&fields.paid_leave_column),
        categories: config
            .categories
            .iter()
            .map(|cat| CategoryIndexes {
                name: cat.name.clone(),
                expectation: find_column(headers, &cat.expectation_column),
                satisfaction: find_column(headers, &cat.satisfaction_column),
            })
            .collect(),
    }
}

pub fn resolve_columns(headers: &[String], config: &SurveyConfig) -> ColumnResolution {
    let indexes = field_indexes(headers, config);
    let fields = &config.fields;

    let mut matched: Vec<(String, usize)> = Vec::new();
    let mut missing_required: Vec<String> = Vec::new();
    let mut missing_optional: Vec<String> = Vec::new();

    let mut required = |keyword: &str, idx: Option<usize>| match idx {
        Some(i) => matched.push((keyword.to_string(), i)),
        None => missing_required.push(keyword.to_string()),
    };
    required(&fields.recommend_column, indexes.recommend);
    required(
        &fields.overall_satisfaction_column,
        indexes.overall_satisfaction,
    );
    for (cat, cat_idx) in config.categories.iter().zip(indexes.categories.iter()) {
        required(&cat.expectation_column, cat_idx.expectation);
        required(&cat.satisfaction_column, cat_idx.satisfaction);
    }

    let mut optional = |keyword: &Option<String>, idx: Option<usize>| {
        if let Some(k) = keyword {
            match idx {
                Some(i) => matched.push((k.clone(), i)),
                None => missing_optional.push(k.clone()),
            }
        }
    };
    optional(&fields.department_column, indexes.department);
    optional(&fields.contribution_column, indexes.contribution);
    optional(&fields.retention_column, indexes.retention);
    optional(&fields.salary_column, indexes.salary);
    optional(&fields.overtime_column, indexes.overtime);
    optional(&fields.paid_leave_column, indexes.paid_leave);

    ColumnResolution {
        matched,
        missing_required,
        missing_optional,
    }
}

pub fn map_responses(
    sheet: &SheetData,
    config: &SurveyConfig,
    path: &str,
) -> DashResult<Vec<SurveyResponse>> {
    let resolution = resolve_columns(&sheet.headers, config);
    ensure!(
        resolution.missing_required.is_empty(),
        MissingColumnsSnafu {
            fields: resolution.missing_required
        }
    );
    let indexes = field_indexes(&sheet.headers, config);
    let default_id = make_default_id(path);

    let mut res: Vec<SurveyResponse> = Vec::new();
    for (idx, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let lineno = idx + 1;
        let cell = |col: Option<usize>| col.and_then(|i| row.get(i));
        let num = |col: Option<usize>| cell(col).and_then(CellValue::as_number);

        let response = SurveyResponse {
            respondent_id: Some(default_id(lineno)),
            department: cell(indexes.department)
                .and_then(CellValue::as_text)
                .map(|s| s.to_string()),
            recommend_score: cell(indexes.recommend).and_then(recommend_score),
            overall_satisfaction: num(indexes.overall_satisfaction),
            contribution: num(indexes.contribution),
            retention_intent: num(indexes.retention),
            annual_salary: num(indexes.salary),
            monthly_overtime: num(indexes.overtime),
            paid_leave_rate: num(indexes.paid_leave),
            ratings: indexes
                .categories
                .iter()
                .map(|cat| CategoryRating {
                    category: cat.name.clone(),
                    expectation: num(cat.expectation),
                    satisfaction: num(cat.satisfaction),
                })
                .collect(),
        };
        debug!("map_responses: lineno: {:?} response: {:?}", lineno, &response);
        res.push(response);
    }
    Ok(res)
}

/// The recommendation answer, either as a number or as one of the labels some
/// form tools export instead of the 0-10 score.
pub fn recommend_score(cell: &CellValue) -> Option<f64> {
    if let Some(text) = cell.as_text() {
        if text.contains("Promoter") {
            return Some(9.0);
        }
        if text.contains("Passive") {
            return Some(7.0);
        }
        if text.contains("Detractor") {
            return Some(4.0);
        }
    }
    cell.as_number()
}
