use anyhow::Context;
use chrono::Local;
use clap::Parser;
use price_visualizer::{
    cli::Cli,
    io::csv_sink::CsvSink,
    logging,
    pipeline::{Pipeline, PipelineOutcome, Variant},
    prompt::Console,
    providers::build_provider,
    render::LineRenderer,
};
use tracing::{Level, info};

fn main() -> anyhow::Result<()> {
    logging::init(Level::WARN);
    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;

    let provider = build_provider(&config.provider).context("building data provider")?;
    let sink = CsvSink::new(config.output_dir.clone());
    let renderer = LineRenderer::new(config.line.padding);
    let pipeline = Pipeline::new(provider, sink, renderer, Variant::line())?;

    let mut console = Console::stdio();
    let today = Local::now().date_naive();
    match pipeline.run(&mut console, today)? {
        PipelineOutcome::Completed(report) => {
            info!(symbol = %report.symbol, rows = report.rows, csv = %report.csv_path.display(), "done");
        }
        PipelineOutcome::Aborted => info!("no symbol to chart"),
    }
    Ok(())
}
