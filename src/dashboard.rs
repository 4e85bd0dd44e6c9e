use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use survey_metrics::{run_survey_stats, SummaryRules, SurveyResponse, SurveySummary};

use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod mapping;
pub mod render;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("No usable rows found in {path}"))]
    EmptySheet { path: String },
    #[snafu(display("Cell with unexpected content at line {lineno}: {content}"))]
    WrongCellType { lineno: u64, content: String },
    #[snafu(display("The sheet is missing required columns: {}", fields.join(", ")))]
    MissingColumns { fields: Vec<String> },
    #[snafu(display("Error opening csv file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing csv line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Error parsing a number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let mut config = match &args.config {
        Some(path) => read_config(path.clone())?,
        None => SurveyConfig::default_template(),
    };
    // Command line overrides for the source settings.
    if let Some(p) = &args.input {
        config.source.file_path = Some(p.clone());
    }
    if let Some(t) = &args.input_type {
        config.source.provider = t.clone();
    }
    if let Some(w) = &args.excel_worksheet_name {
        config.source.excel_worksheet_name = Some(w.clone());
    }
    debug!("run_dashboard: config: {:?}", config);

    let input_path = match &config.source.file_path {
        Some(p) => p.clone(),
        None => {
            whatever!("No input file provided. Use --input or the filePath entry of the configuration.")
        }
    };

    if args.inspect {
        return inspect_input(&input_path, &config);
    }

    let sheet = read_sheet(&input_path, &config)?;
    let responses = mapping::map_responses(&sheet, &config, &input_path)?;
    info!(
        "run_dashboard: mapped {} responses from {}",
        responses.len(),
        input_path
    );

    let filtered = filter_department(responses, args.department.as_deref());
    if let Some(d) = &args.department {
        info!(
            "run_dashboard: department filter {:?} kept {} responses",
            d,
            filtered.len()
        );
    }

    let rules = validate_rules(&config.rules)?;
    let summary: SurveySummary = match run_survey_stats(&filtered, &rules) {
        Ok(x) => x,
        Err(e) => whatever!("Aggregation error: {:?}", e),
    };

    let report = render::build_report(&config, &summary, &rules, args.department.as_deref());
    println!("{}", report);

    let summary_js = render::build_summary_js(&config, &summary);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(SerializingSummarySnafu {})?;
    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_summary),
        Some(path) => fs::write(path, &pretty_js_summary).context(WritingSummarySnafu { path })?,
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingSummarySnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

fn read_sheet(path: &str, config: &SurveyConfig) -> DashResult<io_common::SheetData> {
    match config.source.provider.as_str() {
        "xlsx" => io_xlsx::read_xlsx_sheet(path, &config.source),
        "csv" => io_csv::read_csv_sheet(path, &config.source),
        x => whatever!("Input type not implemented {:?}", x),
    }
}

/// Narrows the in-memory table before aggregation. Zero matching rows is not
/// an error, the aggregation reports it as no data.
fn filter_department(
    responses: Vec<SurveyResponse>,
    department: Option<&str>,
) -> Vec<SurveyResponse> {
    match department {
        Some(d) => responses
            .into_iter()
            .filter(|r| r.department.as_deref() == Some(d))
            .collect(),
        None => responses,
    }
}

/// Prints the structure of the input and the column mapping, to help writing
/// a configuration for a new export.
fn inspect_input(path: &str, config: &SurveyConfig) -> DashResult<()> {
    if config.source.provider == "xlsx" {
        let names = io_xlsx::list_worksheets(path)?;
        println!("Worksheets in {}: {}", path, names.join(", "));
    }
    let sheet = read_sheet(path, config)?;
    println!(
        "Header row {} with {} columns:",
        config.source.header_row_index()?,
        sheet.headers.len()
    );
    for (idx, header) in sheet.headers.iter().enumerate() {
        println!("  {:3}. {}", idx + 1, header);
    }
    let resolution = mapping::resolve_columns(&sheet.headers, config);
    println!();
    for (field, col) in resolution.matched.iter() {
        println!("  matched {} -> column {}", field, col + 1);
    }
    for field in resolution.missing_required.iter() {
        println!("  MISSING (required) {}", field);
    }
    for field in resolution.missing_optional.iter() {
        println!("  missing (optional) {}", field);
    }
    println!();
    println!("{} data rows", sheet.rows.len());
    Ok(())
}

fn validate_rules(settings: &RulesSettings) -> DashResult<SummaryRules> {
    let defaults = SummaryRules::DEFAULT_RULES;
    let res = SummaryRules {
        rating_scale: survey_metrics::RatingScale {
            min: settings.scale_min.unwrap_or(defaults.rating_scale.min),
            max: settings.scale_max.unwrap_or(defaults.rating_scale.max),
        },
        recommend_scale: defaults.recommend_scale,
        promoter_threshold: settings
            .promoter_threshold
            .unwrap_or(defaults.promoter_threshold),
        detractor_threshold: settings
            .detractor_threshold
            .unwrap_or(defaults.detractor_threshold),
    };
    if res.rating_scale.min >= res.rating_scale.max {
        whatever!("Invalid rating scale bounds: {:?}", res.rating_scale);
    }
    if res.detractor_threshold >= res.promoter_threshold {
        whatever!(
            "Detractor threshold {} crosses promoter threshold {}",
            res.detractor_threshold,
            res.promoter_threshold
        );
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::config_reader::CategoryColumns;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.display().to_string()
    }

    fn csv_config() -> SurveyConfig {
        let mut config = SurveyConfig::default_template();
        config.source.provider = "csv".to_string();
        config.source.excel_worksheet_name = None;
        config.fields.department_column = Some("Department".to_string());
        config.fields.recommend_column = "Recommend".to_string();
        config.fields.overall_satisfaction_column = "Overall".to_string();
        config.fields.contribution_column = None;
        config.fields.retention_column = None;
        config.fields.salary_column = None;
        config.fields.overtime_column = None;
        config.fields.paid_leave_column = None;
        config.categories = vec![CategoryColumns {
            name: "pay".to_string(),
            expectation_column: "Expectations: pay".to_string(),
            satisfaction_column: "Satisfaction: pay".to_string(),
        }];
        config
    }

    const FIXTURE: &str = "\
Department,Recommend,Overall,Expectations: pay,Satisfaction: pay
Sales,9,4,5,3
Sales,2,2,4,4
Engineering,7,3,3,3
";

    #[test]
    fn csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "responses.csv", FIXTURE);
        let config = csv_config();

        let sheet = read_sheet(&path, &config).unwrap();
        let responses = mapping::map_responses(&sheet, &config, &path).unwrap();
        assert_eq!(responses.len(), 3);

        let rules = validate_rules(&config.rules).unwrap();
        let summary = run_survey_stats(&responses, &rules).unwrap();
        assert_eq!(summary.kpis.respondents, 3);
        // One promoter, one passive, one detractor.
        assert_eq!(summary.kpis.enps.score, Some(0.0));
        assert_eq!(summary.kpis.overall_satisfaction, Some(3.0));

        let pay = &summary.categories[0];
        assert_eq!(pay.expectation, Some(4.0));
        let gap = pay.gap.unwrap();
        assert!((gap - 2.0 / 3.0).abs() < 1e-9, "gap was {}", gap);

        let names: Vec<&str> = summary.departments.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["Engineering", "Sales"]);
    }

    #[test]
    fn missing_required_columns_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "responses.csv",
            "Department,Overall,Expectations: pay\nSales,4,5\n",
        );
        let config = csv_config();

        let sheet = read_sheet(&path, &config).unwrap();
        let err = mapping::map_responses(&sheet, &config, &path).unwrap_err();
        match err {
            DashboardError::MissingColumns { fields } => {
                assert_eq!(
                    fields,
                    vec![
                        "Recommend".to_string(),
                        "Satisfaction: pay".to_string()
                    ]
                );
            }
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn department_filter_with_no_rows_yields_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "responses.csv", FIXTURE);
        let config = csv_config();

        let sheet = read_sheet(&path, &config).unwrap();
        let responses = mapping::map_responses(&sheet, &config, &path).unwrap();
        let filtered = filter_department(responses, Some("Marketing"));
        assert!(filtered.is_empty());

        let rules = validate_rules(&config.rules).unwrap();
        let summary = run_survey_stats(&filtered, &rules).unwrap();
        assert_eq!(summary.kpis.respondents, 0);
        assert_eq!(summary.kpis.enps.score, None);

        let report = render::build_report(&config, &summary, &rules, Some("Marketing"));
        assert!(report.contains("No responses in this scope"));
    }

    #[test]
    fn unknown_input_type_is_rejected() {
        let mut config = csv_config();
        config.source.provider = "parquet".to_string();
        let res = read_sheet("whatever.parquet", &config);
        assert!(res.is_err());
    }

    #[test]
    fn summary_serialization_errors_name_the_operation() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = DashboardError::SerializingSummary { source };
        assert_eq!(format!("{}", err), "Error serializing the summary");
    }

    #[test]
    fn rules_validation_rejects_crossed_thresholds() {
        let settings = RulesSettings {
            scale_min: None,
            scale_max: None,
            promoter_threshold: Some(4.0),
            detractor_threshold: Some(6.0),
        };
        assert!(validate_rules(&settings).is_err());
    }
}
