mod common;

use std::fs;

use common::{FakeProvider, RecordingRenderer, aapl_history, console, date, transcript};
use price_visualizer::{
    errors::Error,
    io::csv_sink::CsvSink,
    pipeline::{Pipeline, PipelineOutcome, RunReport, Variant},
    prompt::{dates::INVALID_DATE_MESSAGE, symbol::RETRY_PROMPT},
    providers::csv_file::CsvFileProvider,
    render::{CandlestickRenderer, RenderOutcome},
};
use tempfile::tempdir;

const AAPL_CSV: &str = "Date,Open,High,Low,Close,Volume\n\
    2024-03-11,172.94,174.38,172.05,172.75,60139500.00\n\
    2024-03-12,173.15,174.03,171.01,0.00,59825400.00\n\
    2024-03-13,172.77,173.19,170.76,171.13,52488700.00\n";

fn completed(outcome: PipelineOutcome) -> RunReport {
    match outcome {
        PipelineOutcome::Completed(report) => report,
        PipelineOutcome::Aborted => panic!("expected the run to complete"),
    }
}

#[test]
fn candlestick_happy_path_writes_csv_and_reports_missing_cells() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::saving(dir.path().join("candlestick_plot.png")),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("aapl\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert_eq!(report.symbol.as_str(), "AAPL");
    assert_eq!(report.rows, 3);
    assert_eq!(fs::read_to_string(&report.csv_path).unwrap(), AAPL_CSV);
    assert!(!out.contains(RETRY_PROMPT));
    assert!(!out.contains("Fetching data for symbol"));
    assert!(out.contains("NaN or missing values: 1\n"));
    assert!(out.contains("Plotting successful! The plot has been saved as 'candlestick_plot.png'."));
    assert_eq!(pipeline.renderer().call_count(), 1);
}

#[test]
fn line_happy_path_announces_and_echoes() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::line(),
    )
    .unwrap();

    let mut io = console("AAPL\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert_eq!(report.rendered, Some(RenderOutcome::Displayed));
    assert!(out.contains("Fetching data for symbol: AAPL\nSymbol found.\nLoop exited.\n"));
    assert!(out.contains("[3 rows x 5 columns]"));
    assert!(!out.contains("NaN or missing values"));
    assert_eq!(fs::read_to_string(&report.csv_path).unwrap(), AAPL_CSV);
}

#[test]
fn candlestick_decline_aborts_without_output() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("zzzzinvalid\nno\n");
    let outcome = pipeline.run(&mut io, date(2024, 3, 15)).unwrap();
    let out = transcript(io);

    assert_eq!(outcome, PipelineOutcome::Aborted);
    assert!(out.contains("ZZZZINVALID: No data found, symbol may be delisted.\n"));
    assert!(out.ends_with("Exiting program.\n"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(pipeline.renderer().call_count(), 0);
}

#[test]
fn line_decline_continues_with_the_declined_symbol() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::line(),
    )
    .unwrap();

    let mut io = console("zzzzinvalid\nno\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert!(out.contains("Exiting program.\nLoop exited.\n"));
    assert_eq!(report.symbol.as_str(), "ZZZZINVALID");
    assert_eq!(report.rows, 0);
    assert_eq!(fs::read_to_string(&report.csv_path).unwrap(), "Date\n");
    let calls = pipeline.renderer().calls.borrow();
    assert!(calls[0].0.is_empty());
}

#[test]
fn line_with_closed_stdin_has_nothing_to_continue_with() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::line(),
    )
    .unwrap();

    let mut io = console("");
    assert_eq!(pipeline.run(&mut io, date(2024, 3, 15)).unwrap(), PipelineOutcome::Aborted);
    assert!(transcript(io).ends_with("Loop exited.\n"));
}

#[test]
fn retry_then_valid_symbol() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("zzzz\nYES\naapl\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert_eq!(report.symbol.as_str(), "AAPL");
    assert_eq!(out.matches(RETRY_PROMPT).count(), 1);
}

#[test]
fn fetch_failure_is_reported_and_run_continues_empty() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::failing_history()),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("aapl\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert!(out.contains(
        "Error: API error (500): upstream unavailable. Please make sure the entered symbol 'AAPL' is valid.\n"
    ));
    assert!(out.contains("NaN or missing values: 0\n"));
    assert_eq!(report.rows, 0);
    assert_eq!(fs::read_to_string(&report.csv_path).unwrap(), "Date\n");
    assert_eq!(pipeline.renderer().call_count(), 1);
}

#[test]
fn inverted_dates_produce_an_empty_run() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("aapl\n03/14/24\n03/01/24\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());

    assert!(report.range.is_inverted());
    assert_eq!(report.rows, 0);
    assert_eq!(pipeline.renderer().call_count(), 1);
    assert!(transcript(io).contains(
        "Error: API error (400): Invalid input - start date cannot be after end date. \
         Please make sure the entered symbol 'AAPL' is valid."
    ));
}

#[test]
fn malformed_date_is_reprompted() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("aapl\n2024-03-01\n03/01/24\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());
    let out = transcript(io);

    assert_eq!(out.matches(INVALID_DATE_MESSAGE).count(), 1);
    assert_eq!(report.range.start, date(2024, 3, 1));
    assert_eq!(report.range.end, date(2024, 3, 14));
}

#[test]
fn blank_dates_use_each_variants_defaults() {
    let dir = tempdir().unwrap();
    let line = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::line(),
    )
    .unwrap();
    let report = completed(line.run(&mut console("aapl\n\n\n"), date(2024, 2, 29)).unwrap());
    assert_eq!(report.range.start, date(2023, 2, 28));
    assert_eq!(report.range.end, date(2024, 2, 28));

    let candle = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();
    let report = completed(candle.run(&mut console("aapl\n\n\n"), date(2024, 5, 31)).unwrap());
    assert_eq!(report.range.start, date(2024, 2, 29));
    assert_eq!(report.range.end, date(2024, 5, 30));
}

#[test]
fn candlestick_recovers_from_render_failure() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::failing(),
        Variant::candlestick(),
    )
    .unwrap();

    let mut io = console("aapl\n\n\n");
    let report = completed(pipeline.run(&mut io, date(2024, 3, 15)).unwrap());

    assert_eq!(report.rendered, None);
    assert!(transcript(io).contains("Error during plotting: Failed to draw chart: canvas exploded\n"));
    assert!(report.csv_path.exists());
}

#[test]
fn line_propagates_render_failure() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(dir.path()),
        RecordingRenderer::failing(),
        Variant::line(),
    )
    .unwrap();

    let err = pipeline.run(&mut console("aapl\n\n\n"), date(2024, 3, 15)).unwrap_err();
    assert!(matches!(err, Error::Render(_)));
}

#[test]
fn saved_csv_replays_to_identical_output_and_png() {
    let first_dir = tempdir().unwrap();
    let first = Pipeline::new(
        Box::new(FakeProvider::with_history(aapl_history())),
        CsvSink::new(first_dir.path()),
        RecordingRenderer::default(),
        Variant::candlestick(),
    )
    .unwrap();
    let first_report = completed(first.run(&mut console("aapl\n\n\n"), date(2024, 3, 15)).unwrap());

    let second_dir = tempdir().unwrap();
    let replay = Pipeline::new(
        Box::new(CsvFileProvider::new(first_dir.path())),
        CsvSink::new(second_dir.path()),
        CandlestickRenderer::new(second_dir.path(), "candlestick_plot.png", (640, 400)),
        Variant::candlestick(),
    )
    .unwrap();
    let mut io = console("aapl\n\n\n");
    let second_report = completed(replay.run(&mut io, date(2024, 3, 15)).unwrap());

    assert_eq!(
        fs::read_to_string(&second_report.csv_path).unwrap(),
        fs::read_to_string(&first_report.csv_path).unwrap()
    );
    let png = second_dir.path().join("candlestick_plot.png");
    assert_eq!(second_report.rendered, Some(RenderOutcome::Saved(png.clone())));
    assert!(fs::read(png).unwrap().starts_with(b"\x89PNG"));
    assert!(transcript(io).contains("NaN or missing values: 0\n"));
}
