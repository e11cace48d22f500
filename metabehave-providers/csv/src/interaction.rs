//! Parsing interaction logs.
//!
//! Each iteration occupies one line: the `ig:` prefix, the iteration number,
//! then `n × n` whitespace-separated counts in row-major order. The population
//! size `n` is inferred from the first iteration line. Lines without the
//! prefix are ignored.
use std::{
    io::{BufRead, BufReader, Read},
    path::Path,
};

use metabehave_core::InteractionLog;
use tracing::debug;

use crate::errors::{ProviderError, open};

const LINE_PREFIX: &str = "ig:";

/// Reads an interaction log.
///
/// # Errors
/// Returns [`ProviderError::EmptyInteractionLog`] when no iteration line is
/// present, [`ProviderError::NonSquareMatrix`] when the first line cannot be
/// arranged as a square matrix, [`ProviderError::Interaction`] when a later
/// line disagrees with the inferred population, and token errors for
/// malformed numbers.
///
/// # Examples
/// ```
/// use metabehave_providers_csv::read_interaction_log;
///
/// let raw = "ig:0 0 1 0 0\nig:1 0 0 2 0\n";
/// let log = read_interaction_log(raw.as_bytes())?;
/// assert_eq!(log.population(), 2);
/// assert_eq!(log.iterations()[1].count(1, 0), 2);
/// # Ok::<(), metabehave_providers_csv::ProviderError>(())
/// ```
pub fn read_interaction_log<R: Read>(reader: R) -> Result<InteractionLog, ProviderError> {
    let mut log: Option<InteractionLog> = None;
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let Some(body) = line.trim().strip_prefix(LINE_PREFIX) else {
            continue;
        };
        let (iteration, counts) = parse_line(body, number)?;
        let mut target = match log.take() {
            Some(existing) => existing,
            None => InteractionLog::new(population(counts.len(), number)?),
        };
        target.push_iteration(iteration, counts)?;
        log = Some(target);
    }

    let log = log.ok_or(ProviderError::EmptyInteractionLog)?;
    debug!(
        population = log.population(),
        iterations = log.len(),
        "interaction log read"
    );
    Ok(log)
}

/// Opens `path` and reads its interaction log.
///
/// # Errors
/// Returns [`ProviderError::Open`] when the file cannot be opened, otherwise
/// see [`read_interaction_log`].
pub fn load_interaction_log(path: impl AsRef<Path>) -> Result<InteractionLog, ProviderError> {
    read_interaction_log(open(path.as_ref())?)
}

fn parse_line(body: &str, line: usize) -> Result<(u64, Vec<u32>), ProviderError> {
    let mut tokens = body.split_whitespace();
    let iteration = tokens
        .next()
        .ok_or(ProviderError::MissingIteration { line })
        .and_then(|token| parse_token::<u64>(token, line))?;
    let counts = tokens
        .map(|token| parse_token::<u32>(token, line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((iteration, counts))
}

fn parse_token<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, ProviderError> {
    token
        .parse()
        .map_err(|_| ProviderError::InvalidInteractionToken {
            line,
            token: token.to_owned(),
        })
}

fn population(values: usize, line: usize) -> Result<usize, ProviderError> {
    let root = (0..=values)
        .find(|n| n * n >= values)
        .unwrap_or(values);
    if values == 0 || root * root != values {
        return Err(ProviderError::NonSquareMatrix { line, values });
    }
    Ok(root)
}
