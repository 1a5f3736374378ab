//! Symbol Validator: ask until the provider knows the symbol or the user gives up.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::{
    models::{raw_table::RawTable, symbol::Symbol},
    prompt::Console,
    providers::ProviderError,
};

pub const SYMBOL_PROMPT: &str = "Please enter the stock symbol: ";
pub const RETRY_PROMPT: &str = "Do you want to try again? (yes/no): ";

/// How the validator loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// The lookup returned at least one row.
    Validated(Symbol),
    /// The user declined to retry. Carries the last symbol tried, if any.
    Declined(Option<Symbol>),
}

/// Messages that differ between program variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorMessages {
    /// Print `Fetching data for symbol: X` before each lookup and
    /// `Symbol found.` on success.
    pub announce_lookup: bool,
}

/// Runs the validator loop.
///
/// `lookup` performs the single-day existence check. An empty table and a
/// provider error are treated alike: the symbol is reported as having no
/// data and the user is asked whether to retry. Only an exact `yes`
/// (case-insensitive) retries. There is no bound on the number of retries.
pub fn validate_symbol<R, W, F>(
    console: &mut Console<R, W>,
    messages: ValidatorMessages,
    mut lookup: F,
) -> io::Result<SymbolOutcome>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Symbol) -> Result<RawTable, ProviderError>,
{
    let mut last: Option<Symbol> = None;
    loop {
        let Some(line) = console.ask(SYMBOL_PROMPT)? else {
            return Ok(SymbolOutcome::Declined(last));
        };

        match Symbol::parse(&line) {
            Ok(symbol) => {
                if messages.announce_lookup {
                    console.say(format!("Fetching data for symbol: {symbol}"))?;
                }
                match lookup(&symbol) {
                    Ok(table) if !table.is_empty() => {
                        debug!(symbol = %symbol, rows = table.len(), "symbol validated");
                        if messages.announce_lookup {
                            console.say("Symbol found.")?;
                        }
                        return Ok(SymbolOutcome::Validated(symbol));
                    }
                    Ok(_) => debug!(symbol = %symbol, "lookup returned no rows"),
                    Err(e) => warn!(symbol = %symbol, error = %e, "lookup failed"),
                }
                console.say(format!("{symbol}: No data found, symbol may be delisted."))?;
                last = Some(symbol);
            }
            Err(e) => console.say(e)?,
        }

        let answer = console.ask(RETRY_PROMPT)?.unwrap_or_default();
        if answer.trim().to_lowercase() != "yes" {
            console.say("Exiting program.")?;
            return Ok(SymbolOutcome::Declined(last));
        }
    }
}
