// Primitives shared by the sheet readers.

use std::path::Path;

/// A cell from the input, reduced to the shapes the survey mapping cares
/// about.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// The cell as non-empty text, if it holds any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// The cell as a number. Text cells are parsed, with thousands separators
    /// stripped, so that salary columns formatted as text still count.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(x) => Some(*x),
            CellValue::Text(s) => parse_number(s.trim()),
            CellValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// Commas are accepted only as digit-grouping separators, in groups of
/// three. Anything else stays a missing answer.
fn parse_number(s: &str) -> Option<f64> {
    if let Ok(x) = s.parse::<f64>() {
        return Some(x);
    }
    if !s.contains(',') {
        return None;
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let digits = int_part
        .strip_prefix(|c| c == '-' || c == '+')
        .unwrap_or(int_part);
    let all_digits = |g: &str| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit());
    let groups: Vec<&str> = digits.split(',').collect();
    if groups.len() < 2 || groups[0].len() > 3 || !all_digits(groups[0]) {
        return None;
    }
    if !groups[1..].iter().all(|g| g.len() == 3 && all_digits(g)) {
        return None;
    }
    if let Some(f) = frac_part {
        if !all_digits(f) {
            return None;
        }
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// An input table in memory: the header row and the data rows below it.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
