use clap::Parser;

/// This is an employee survey tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON description of the survey: source file, column
    /// keywords, categories and scales. When not provided, the built-in survey
    /// template is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The workbook with one row per respondent. Setting this option
    /// overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default xlsx) The type of the input: xlsx or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default Responses) When using an Excel file, indicates the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// If specified, narrows the responses to this department before aggregation.
    #[clap(short, long, value_parser)]
    pub department: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the KPI summary will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, pulsedash will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Prints the worksheets of the input and the column mapping that would be
    /// used, then exits.
    #[clap(long, takes_value = false)]
    pub inspect: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
