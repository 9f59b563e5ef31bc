//! Destination templating - dated folder structures

use chrono::{Datelike, Month, NaiveDate};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

use super::Rule;
use super::matcher::compile;
use crate::error::ProcessError;
use crate::store::join_path;

static MONTH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("M{1,4}").expect("invalid month token regex"));

/// Where a matched file ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Folder that must exist before the move
    pub folder: String,
    /// Full destination path of the file
    pub file_path: String,
}

/// Resolve the destination of `file_name` under `rule`
pub fn resolve_destination(file_name: &str, rule: &Rule) -> Result<Destination, ProcessError> {
    let folder = if rule.is_dated() {
        let date = extract_date(file_name, &rule.regex)?;
        let expanded = expand_template(&rule.folder_structure, date);
        join_path([rule.root_folder.as_str(), expanded.as_str()])
    } else {
        join_path([rule.root_folder.as_str()])
    };

    let file_path = join_path([folder.as_str(), file_name]);
    Ok(Destination { folder, file_path })
}

/// Locate a `YYYYMMDD` date in `file_name` using `pattern`.
///
/// The matched text is cut at its first space and its first eight characters
/// are read as year, month and day.
pub fn extract_date(file_name: &str, pattern: &str) -> Result<NaiveDate, ProcessError> {
    let regex = compile(pattern, false)?;
    let failed = || ProcessError::DateExtraction {
        file_name: file_name.to_string(),
    };

    let found = regex.find(file_name).ok_or_else(failed)?;
    let head = found.as_str().split(' ').next().unwrap_or_default();
    let digits: String = head.chars().take(8).collect();
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(failed());
    }

    let year = digits[0..4].parse().map_err(|_| failed())?;
    let month = digits[4..6].parse().map_err(|_| failed())?;
    let day = digits[6..8].parse().map_err(|_| failed())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(failed)
}

/// Expand the date tokens of a folder structure template.
///
/// `YYYY` and `YY` are replaced everywhere; only the first run of `M`s is
/// replaced by the month.
pub fn expand_template(template: &str, date: NaiveDate) -> String {
    let full_year = format!("{:04}", date.year());
    let short_year = format!("{:02}", date.year().rem_euclid(100));

    let month_number = date.month();
    let month_name = u8::try_from(month_number)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or_default();

    let month = if template.contains("MMMM") {
        month_name.to_string()
    } else if template.contains("MMM") {
        month_name.chars().take(3).collect()
    } else if template.contains("MM") {
        format!("{month_number:02}")
    } else {
        month_number.to_string()
    };

    let year = if template.contains("YYYY") {
        full_year
    } else {
        short_year.clone()
    };

    let expanded = template.replace("YYYY", &year).replace("YY", &short_year);
    MONTH_RUN
        .replace(&expanded, NoExpand(&month))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dated_destination() {
        let rule = Rule::new("pdf", "Archive")
            .with_regex(r"\d{8}")
            .with_folder_structure("YYYY/YYYY-MM");

        let dest = resolve_destination("20240307 notes.pdf", &rule).unwrap();
        assert_eq!(dest.folder, "Archive/2024/2024-03");
        assert_eq!(dest.file_path, "Archive/2024/2024-03/20240307 notes.pdf");
    }

    #[test]
    fn test_flat_destination() {
        let rule = Rule::new("pdf", "Archive/Docs");

        let dest = resolve_destination("report.pdf", &rule).unwrap();
        assert_eq!(dest.folder, "Archive/Docs");
        assert_eq!(dest.file_path, "Archive/Docs/report.pdf");
    }

    #[test]
    fn test_empty_root_has_no_leading_slash() {
        let rule = Rule::new("pdf", "")
            .with_regex(r"\d{8}")
            .with_folder_structure("YYYY");

        let dest = resolve_destination("20240307.pdf", &rule).unwrap();
        assert_eq!(dest.file_path, "2024/20240307.pdf");
    }

    #[test]
    fn test_only_first_month_run_replaced() {
        assert_eq!(
            expand_template("YYYY-MM-Misc", date(2024, 3, 7)),
            "2024-03-Misc"
        );
        assert_eq!(expand_template("MM/MM", date(2024, 3, 7)), "03/MM");
    }

    #[test]
    fn test_month_tokens() {
        let d = date(2023, 9, 1);

        assert_eq!(expand_template("YYYY/MMMM", d), "2023/September");
        assert_eq!(expand_template("YYYY/MMM", d), "2023/Sep");
        assert_eq!(expand_template("YYYY/MM", d), "2023/09");
        assert_eq!(expand_template("YYYY/M", d), "2023/9");
    }

    #[test]
    fn test_month_token_checked_across_template() {
        // `MMM` elsewhere in the template selects the abbreviation for the first run
        assert_eq!(expand_template("M/MMM", date(2023, 5, 1)), "May/MMM");
    }

    #[test]
    fn test_short_year() {
        assert_eq!(expand_template("YY-MM", date(2007, 12, 31)), "07-12");
        assert_eq!(expand_template("YYYY/YY", date(2024, 1, 2)), "2024/24");
    }

    #[test]
    fn test_extract_date_cuts_at_space() {
        let d = extract_date("20240307 notes.md", r"\d{8} notes").unwrap();
        assert_eq!(d, date(2024, 3, 7));

        let d = extract_date("Scan 20231231-0930.pdf", r"\d{8}-\d{4}").unwrap();
        assert_eq!(d, date(2023, 12, 31));
    }

    #[test]
    fn test_extract_date_failures() {
        assert!(matches!(
            extract_date("notes.md", r"\d{8}"),
            Err(ProcessError::DateExtraction { .. })
        ));
        assert!(matches!(
            extract_date("20241340.md", r"\d{8}"),
            Err(ProcessError::DateExtraction { .. })
        ));
        assert!(matches!(
            extract_date("2024-03-07.md", r"\d{4}-\d{2}-\d{2}"),
            Err(ProcessError::DateExtraction { .. })
        ));
        assert!(matches!(
            extract_date("20240307.md", "("),
            Err(ProcessError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_dated_rule_without_pattern_fails() {
        let rule = Rule::new("pdf", "Archive").with_folder_structure("YYYY");

        assert!(matches!(
            resolve_destination("20240307.pdf", &rule),
            Err(ProcessError::DateExtraction { .. })
        ));
    }
}
