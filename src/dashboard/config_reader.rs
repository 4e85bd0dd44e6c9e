use crate::dashboard::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "surveyDate")]
    pub survey_date: Option<String>,
    #[serde(rename = "organization")]
    pub organization: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "headerRowIndex")]
    _header_row_index: Option<JSValue>,
}

impl SourceSettings {
    /// 1-based index of the header row in the sheet. Form exports often carry
    /// banner rows above the real header.
    pub fn header_row_index(&self) -> DashResult<usize> {
        if self._header_row_index.is_none() {
            return Ok(1);
        }
        read_js_int(&self._header_row_index)
    }

    pub fn with_header_row(provider: &str, header_row_index: usize) -> SourceSettings {
        SourceSettings {
            provider: provider.to_string(),
            file_path: None,
            excel_worksheet_name: None,
            _header_row_index: Some(JSValue::from(header_row_index)),
        }
    }
}

/// The column keywords for the headline questions. Each keyword is matched as
/// a substring of the header texts.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FieldSettings {
    #[serde(rename = "departmentColumn")]
    pub department_column: Option<String>,
    #[serde(rename = "recommendColumn")]
    pub recommend_column: String,
    #[serde(rename = "overallSatisfactionColumn")]
    pub overall_satisfaction_column: String,
    #[serde(rename = "contributionColumn")]
    pub contribution_column: Option<String>,
    #[serde(rename = "retentionColumn")]
    pub retention_column: Option<String>,
    #[serde(rename = "salaryColumn")]
    pub salary_column: Option<String>,
    #[serde(rename = "overtimeColumn")]
    pub overtime_column: Option<String>,
    #[serde(rename = "paidLeaveColumn")]
    pub paid_leave_column: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryColumns {
    pub name: String,
    #[serde(rename = "expectationColumn")]
    pub expectation_column: String,
    #[serde(rename = "satisfactionColumn")]
    pub satisfaction_column: String,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "scaleMin")]
    pub scale_min: Option<f64>,
    #[serde(rename = "scaleMax")]
    pub scale_max: Option<f64>,
    #[serde(rename = "promoterThreshold")]
    pub promoter_threshold: Option<f64>,
    #[serde(rename = "detractorThreshold")]
    pub detractor_threshold: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub source: SourceSettings,
    pub fields: FieldSettings,
    pub categories: Vec<CategoryColumns>,
    #[serde(default)]
    pub rules: RulesSettings,
}

impl SurveyConfig {
    /// The built-in template, matching the common engagement survey export:
    /// one recommendation question, one overall satisfaction question and an
    /// expectation / satisfaction question pair per category.
    pub fn default_template() -> SurveyConfig {
        let category_names = [
            "working hours",
            "time off",
            "paid leave",
            "flexible work",
            "promotion",
            "relationships",
            "workplace",
            "growth",
            "career path",
            "benefits",
            "evaluation",
        ];
        let categories = category_names
            .iter()
            .map(|name| CategoryColumns {
                name: name.to_string(),
                expectation_column: format!("Expectations: {}", name),
                satisfaction_column: format!("Satisfaction: {}", name),
            })
            .collect();
        SurveyConfig {
            output_settings: OutputSettings {
                survey_name: "Employee engagement survey".to_string(),
                survey_date: None,
                organization: None,
            },
            source: SourceSettings {
                provider: "xlsx".to_string(),
                file_path: None,
                excel_worksheet_name: Some("Responses".to_string()),
                _header_row_index: None,
            },
            fields: FieldSettings {
                department_column: Some("Department".to_string()),
                recommend_column: "recommend".to_string(),
                overall_satisfaction_column: "Overall satisfaction".to_string(),
                contribution_column: Some("contribution".to_string()),
                retention_column: Some("continue working".to_string()),
                salary_column: Some("Annual salary".to_string()),
                overtime_column: Some("overtime".to_string()),
                paid_leave_column: Some("leave taken".to_string()),
            },
            categories,
            rules: RulesSettings::default(),
        }
    }
}

pub fn read_config(path: String) -> DashResult<SurveyConfig> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> DashResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_categories_have_distinct_keywords() {
        let config = SurveyConfig::default_template();
        assert_eq!(config.categories.len(), 11);
        for cat in config.categories.iter() {
            assert_ne!(cat.expectation_column, cat.satisfaction_column);
            assert!(cat.expectation_column.contains(&cat.name));
        }
    }

    #[test]
    fn header_row_defaults_to_first() {
        let config = SurveyConfig::default_template();
        assert_eq!(config.source.header_row_index().unwrap(), 1);
        let source = SourceSettings::with_header_row("xlsx", 2);
        assert_eq!(source.header_row_index().unwrap(), 2);
    }

    #[test]
    fn config_roundtrip_with_defaulted_rules() {
        let raw = r#"{
            "outputSettings": {"surveyName": "Pulse 2024"},
            "source": {"provider": "csv", "filePath": "responses.csv"},
            "fields": {
                "recommendColumn": "Recommend",
                "overallSatisfactionColumn": "Overall"
            },
            "categories": [
                {"name": "pay",
                 "expectationColumn": "Expectations: pay",
                 "satisfactionColumn": "Satisfaction: pay"}
            ]
        }"#;
        let config: SurveyConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.output_settings.survey_name, "Pulse 2024");
        assert_eq!(config.rules, RulesSettings::default());
        assert_eq!(config.source.header_row_index().unwrap(), 1);
        assert!(config.fields.department_column.is_none());
    }
}
