//! Conversion of a raw `name,video` exercise list into a CSV ready for bulk
//! import into the `exercises` table.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static VIDEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("valid video url pattern"));

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Category written on every row
    pub category: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub written: usize,
    pub skipped_blank: usize,
    pub skipped_duplicate: usize,
    pub dropped_urls: usize,
}

#[derive(Debug, Serialize)]
struct ImportRow<'a> {
    id: String,
    name: &'a str,
    video_url: Option<&'a str>,
    category: Option<&'a str>,
    instructions: Option<&'a str>,
}

pub fn convert_exercises<R: Read, W: Write>(
    input: R,
    output: W,
    options: &ConversionOptions,
) -> Result<ConversionReport, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(output);
    let mut report = ConversionReport::default();
    let mut seen = HashSet::new();

    // Header is written even for an empty input.
    writer.write_record(["id", "name", "video_url", "category", "instructions"])?;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let name = record.get(0).unwrap_or("");
        let video = record.get(1).unwrap_or("");

        if line == 0 && name.eq_ignore_ascii_case("name") {
            continue;
        }
        if name.is_empty() {
            report.skipped_blank += 1;
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            report.skipped_duplicate += 1;
            continue;
        }

        let video_url = if VIDEO_URL.is_match(video) {
            Some(video)
        } else {
            if !video.is_empty() {
                report.dropped_urls += 1;
            }
            None
        };

        report.written += 1;
        writer.serialize(ImportRow {
            id: report.written.to_string(),
            name,
            video_url,
            category: options.category.as_deref(),
            instructions: None,
        })?;
    }

    writer.flush()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(input: &str, options: &ConversionOptions) -> (String, ConversionReport) {
        let mut out = Vec::new();
        let report = convert_exercises(input.as_bytes(), &mut out, options).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn test_converts_with_header_and_sequential_ids() {
        let input = "Name,Video\nBack Squat,https://cdn.example.com/squat.mp4\nPlank,\n";
        let (csv, report) = convert(input, &ConversionOptions::default());

        assert_eq!(
            csv,
            "id,name,video_url,category,instructions\n\
             1,Back Squat,https://cdn.example.com/squat.mp4,,\n\
             2,Plank,,,\n"
        );
        assert_eq!(report.written, 2);
    }

    #[test]
    fn test_headerless_input_keeps_first_row() {
        let (csv, report) = convert("Lunge,https://x.io/l.mp4\n", &ConversionOptions::default());
        assert_eq!(report.written, 1);
        assert!(csv.contains("1,Lunge,https://x.io/l.mp4"));
    }

    #[test]
    fn test_skips_blank_duplicate_and_bad_urls() {
        let input = "name,video\n  Push-up , not a url\n,https://x.io/a.mp4\npush-up,https://x.io/b.mp4\nDip\n";
        let options = ConversionOptions {
            category: Some("Bodyweight".to_string()),
        };
        let (csv, report) = convert(input, &options);

        assert_eq!(
            report,
            ConversionReport {
                written: 2,
                skipped_blank: 1,
                skipped_duplicate: 1,
                dropped_urls: 1,
            }
        );
        assert!(csv.contains("1,Push-up,,Bodyweight,\n"));
        assert!(csv.contains("2,Dip,,Bodyweight,\n"));
    }

    #[test]
    fn test_empty_input_writes_header_only() {
        let (csv, report) = convert("", &ConversionOptions::default());
        assert_eq!(csv, "id,name,video_url,category,instructions\n");
        assert_eq!(report, ConversionReport::default());
    }
}
