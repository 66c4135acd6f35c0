use airq_cli::{date_window, run, select_locations, summary_lines, Args};
use airq_config::AppConfig;
use airq_sinks::read_records;
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;

fn sample_config() -> AppConfig {
    AppConfig::from_toml_str(
        r#"
        [sample]
        seed = 42
        days = 5

        [dashboard]
        locations = ["Tokyo, Japan"]
        "#,
    )
    .unwrap()
}

#[test]
fn parses_arguments() {
    let args = Args::parse_from([
        "airq",
        "--sample",
        "--from",
        "2024-07-01",
        "--output",
        "out.csv",
        "London, UK",
        "Reykjavik",
    ]);
    assert!(args.sample);
    assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 7, 1));
    assert!(args.to.is_none());
    assert_eq!(args.locations, vec!["London, UK", "Reykjavik"]);
}

#[test]
fn rejects_bad_dates() {
    assert!(Args::try_parse_from(["airq", "--from", "yesterday"]).is_err());
}

#[test]
fn location_precedence() {
    let cfg = sample_config();
    assert_eq!(
        select_locations(&["Lima".to_string()], &cfg),
        vec!["Lima".to_string()]
    );
    assert_eq!(select_locations(&[], &cfg), vec!["Tokyo, Japan".to_string()]);
    assert_eq!(
        select_locations(&["  ".to_string()], &AppConfig::default()),
        vec!["New York, US", "Los Angeles, US", "London, UK"]
    );
}

#[test]
fn empty_table_window_is_today() {
    let today = Utc::now().date_naive();
    assert_eq!(date_window(&[], None, None), (today, today));
    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(date_window(&[], Some(from), None), (from, today));
}

#[tokio::test]
async fn sample_run_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("export.csv");
    let args = Args::parse_from([
        "airq",
        "--sample",
        "--output",
        output.to_str().unwrap(),
        "London, UK",
        "Mumbai, India",
    ]);

    let written = run(args, sample_config()).await.unwrap();
    assert_eq!(written, output);

    let records = read_records(std::fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0].location_name, "London, UK");
    assert_eq!(records[1].location_name, "Mumbai, India");

    let today = Utc::now().date_naive();
    assert_eq!(records[9].date(), today);
    assert_eq!(records[0].date(), today - Duration::days(4));

    let lines = summary_lines(&records);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("London, UK: AQI"));
}

#[tokio::test]
async fn date_filter_limits_rows() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("filtered.csv");
    let today = Utc::now().date_naive().to_string();
    let args = Args::parse_from([
        "airq",
        "--sample",
        "--from",
        today.as_str(),
        "--output",
        output.to_str().unwrap(),
        "London, UK",
    ]);

    run(args, sample_config()).await.unwrap();

    let records = read_records(std::fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn empty_selection_still_exports_header() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("none.csv");
    let args = Args::parse_from([
        "airq",
        "--sample",
        "--from",
        "2030-01-02",
        "--to",
        "2030-01-01",
        "--output",
        output.to_str().unwrap(),
        "London, UK",
    ]);

    run(args, sample_config()).await.unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.trim_end(), airq_core::RECORD_FIELDS.join(","));
}
