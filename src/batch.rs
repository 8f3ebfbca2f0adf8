use thiserror::Error;

use crate::accounts::AccountDatabase;
use crate::directory::DirectoryLookup;
use crate::error::ProvisionError;
use crate::provision::{ProvisionOutcome, Provisioner};
use crate::request::{UserRequest, is_ignorable, parse_line};

/// The first fatal failure of a run, with the line it happened on.
#[derive(Error, Debug)]
#[error("line {line} ({entry:?}): {source}")]
pub struct BatchError {
    /// 1-based line number in the input
    pub line: usize,
    pub entry: String,
    #[source]
    pub source: ProvisionError,
}

/// Receives progress as entries are processed.
pub trait Reporter {
    fn entry_started(&mut self, line: usize, request: &UserRequest);
    fn entry_finished(&mut self, line: usize, outcome: &ProvisionOutcome);
}

/// Process every entry of `input` in order, stopping at the first failure.
///
/// Outcomes go to `reporter` as soon as they are known; nothing is kept once
/// an entry is done.
pub fn run<D, A>(
    input: &str,
    provisioner: &mut Provisioner<'_, D, A>,
    reporter: &mut dyn Reporter,
) -> Result<(), BatchError>
where
    D: DirectoryLookup,
    A: AccountDatabase,
{
    input
        .lines()
        .enumerate()
        .filter(|(_, raw)| !is_ignorable(raw))
        .try_for_each(|(index, raw)| -> Result<(), BatchError> {
            let line = index + 1;
            let fail = |source| BatchError {
                line,
                entry: raw.trim().to_string(),
                source,
            };

            let request = parse_line(raw).map_err(fail)?;
            reporter.entry_started(line, &request);
            let outcome = provisioner.provision(&request).map_err(fail)?;
            reporter.entry_finished(line, &outcome);
            Ok(())
        })
}
