//! Validate → Collect Dates → Fetch → Normalize → Persist → Render.
//!
//! Both programs share this pipeline. Everything that differs between
//! them lives in [`Variant`], so the divergent behavior is a visible
//! choice rather than an accident of two copies drifting apart.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use chrono::NaiveDate;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

use crate::{
    errors::Error,
    io::sink::DataSink,
    models::{
        date_range::{DateRange, StartDefault},
        raw_table::RawTable,
        symbol::Symbol,
    },
    normalize::{NormalizeOptions, count_missing, normalize},
    prompt::{
        Console,
        dates::collect_range,
        symbol::{SymbolOutcome, ValidatorMessages, validate_symbol},
    },
    providers::DataProvider,
    render::{RenderOutcome, Renderer},
};

pub const LOOP_EXITED_MESSAGE: &str = "Loop exited.";

/// What to do when the user declines to retry an unknown symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclinePolicy {
    /// Stop the run.
    Exit,
    /// Leave the validator loop, print `Loop exited.` and carry on with the
    /// last symbol entered even though it has no data.
    Continue,
}

/// Per-program policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub start_default: StartDefault,
    pub on_decline: DeclinePolicy,
    pub promote_date_column: bool,
    /// Print `NaN or missing values: N` before cleaning.
    pub report_missing: bool,
    /// Print `Fetching data for symbol: X` and `Symbol found.` while validating.
    pub announce_lookup: bool,
    /// Print a preview of the fetched table.
    pub echo_fetched: bool,
    /// Print render failures instead of returning them.
    pub recover_render_errors: bool,
}

impl Variant {
    /// The Open vs. Close line chart program.
    pub fn line() -> Self {
        Self {
            start_default: StartDefault::OneYearBack,
            on_decline: DeclinePolicy::Continue,
            promote_date_column: false,
            report_missing: false,
            announce_lookup: true,
            echo_fetched: true,
            recover_render_errors: false,
        }
    }

    /// The candlestick + volume PNG program.
    pub fn candlestick() -> Self {
        Self {
            start_default: StartDefault::ThreeMonthsBack,
            on_decline: DeclinePolicy::Exit,
            promote_date_column: true,
            report_missing: true,
            announce_lookup: false,
            echo_fetched: false,
            recover_render_errors: true,
        }
    }
}

/// Summary of a run that reached the end of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub symbol: Symbol,
    pub range: DateRange,
    pub rows: usize,
    pub csv_path: PathBuf,
    /// `None` when rendering failed and the failure was recovered.
    pub rendered: Option<RenderOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed(RunReport),
    /// The user declined to retry and the variant stops there.
    Aborted,
}

pub struct Pipeline<S, R> {
    provider: Box<dyn DataProvider + Send + Sync>,
    sink: S,
    renderer: R,
    variant: Variant,
    runtime: Runtime,
}

impl<S, R> Pipeline<S, R>
where
    S: DataSink<Output = PathBuf>,
    R: Renderer,
{
    /// Provider calls are driven to completion one at a time on a
    /// current-thread runtime owned by the pipeline.
    pub fn new(
        provider: Box<dyn DataProvider + Send + Sync>,
        sink: S,
        renderer: R,
        variant: Variant,
    ) -> Result<Self, Error> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            provider,
            sink,
            renderer,
            variant,
            runtime,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn run<In, Out>(&self, console: &mut Console<In, Out>, today: NaiveDate) -> Result<PipelineOutcome, Error>
    where
        In: BufRead,
        Out: Write,
    {
        let variant = self.variant;

        let Some(symbol) = self.resolve_symbol(console)? else {
            info!("run aborted at symbol validation");
            return Ok(PipelineOutcome::Aborted);
        };

        let range = collect_range(console, variant.start_default, today)?;
        if range.is_inverted() {
            warn!(start = %range.start, end = %range.end, "start date is after end date");
        }

        let table = self.fetch(console, &symbol, &range)?;
        if variant.echo_fetched {
            console.say(&table)?;
        }
        if variant.report_missing {
            console.say(format!("NaN or missing values: {}", count_missing(&table)))?;
        }

        let options = NormalizeOptions {
            promote_date_column: variant.promote_date_column,
        };
        let series = normalize(symbol.clone(), table, &options);
        let csv_path = self.sink.write(&series)?;

        let rendered = match self.renderer.render(&series, &range) {
            Ok(outcome) => {
                if let RenderOutcome::Saved(path) = &outcome {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    console.say(format!("Plotting successful! The plot has been saved as '{name}'."))?;
                }
                Some(outcome)
            }
            Err(e) if variant.recover_render_errors => {
                error!(symbol = %symbol, error = %e, "rendering failed");
                console.say(format!("Error during plotting: {e}"))?;
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(PipelineOutcome::Completed(RunReport {
            symbol,
            range,
            rows: series.len(),
            csv_path,
            rendered,
        }))
    }

    /// Runs the validator and applies the decline policy. `None` ends the run.
    fn resolve_symbol<In, Out>(&self, console: &mut Console<In, Out>) -> Result<Option<Symbol>, Error>
    where
        In: BufRead,
        Out: Write,
    {
        let messages = ValidatorMessages {
            announce_lookup: self.variant.announce_lookup,
        };
        let outcome = validate_symbol(console, messages, |symbol| {
            self.runtime.block_on(self.provider.lookup_recent(symbol))
        })?;

        let symbol = match (self.variant.on_decline, outcome) {
            (_, SymbolOutcome::Validated(symbol)) => Some(symbol),
            (DeclinePolicy::Exit, SymbolOutcome::Declined(_)) => None,
            (DeclinePolicy::Continue, SymbolOutcome::Declined(last)) => {
                if let Some(symbol) = &last {
                    warn!(symbol = %symbol, "continuing with a symbol that has no data");
                }
                last
            }
        };
        if self.variant.on_decline == DeclinePolicy::Continue {
            console.say(LOOP_EXITED_MESSAGE)?;
        }
        Ok(symbol)
    }

    /// One bulk request. A failure is reported and replaced by an empty table.
    fn fetch<In, Out>(
        &self,
        console: &mut Console<In, Out>,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<RawTable, Error>
    where
        In: BufRead,
        Out: Write,
    {
        match self.runtime.block_on(self.provider.fetch_history(symbol, range)) {
            Ok(table) => {
                info!(symbol = %symbol, rows = table.len(), "history fetched");
                Ok(table)
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "history fetch failed");
                console.say(format!(
                    "Error: {e}. Please make sure the entered symbol '{symbol}' is valid."
                ))?;
                Ok(RawTable::new())
            }
        }
    }
}
