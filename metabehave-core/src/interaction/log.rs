//! Per-iteration interaction counts between population members.

use super::InteractionError;

/// Interaction counts observed during one iteration.
///
/// Counts are stored row-major: `count(i, j)` is the number of times member
/// `i` influenced member `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationMatrix {
    iteration: u64,
    population: usize,
    counts: Vec<u32>,
}

impl IterationMatrix {
    /// Returns the iteration the counts were recorded at.
    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Returns how often `from` influenced `to`.
    #[must_use]
    pub fn count(&self, from: usize, to: usize) -> u32 {
        if from >= self.population || to >= self.population {
            return 0;
        }
        self.counts[from * self.population + to]
    }

    /// Iterates over ordered pairs `(from, to)` with `from != to` that
    /// interacted at least once.
    pub fn interacting_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.population;
        self.counts
            .iter()
            .enumerate()
            .filter(move |&(cell, &count)| count > 0 && cell / n != cell % n)
            .map(move |(cell, _)| (cell / n, cell % n))
    }
}

/// Interaction counts for a whole run, one square matrix per iteration.
///
/// # Examples
/// ```
/// use metabehave_core::InteractionLog;
///
/// let mut log = InteractionLog::new(3);
/// log.push_pairs(0, &[(0, 1), (2, 1)])?;
/// log.push_iteration(1, vec![0, 0, 0, 0, 0, 0, 1, 0, 0])?;
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.iterations()[1].count(2, 0), 1);
/// # Ok::<(), metabehave_core::InteractionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionLog {
    population: usize,
    iterations: Vec<IterationMatrix>,
}

impl InteractionLog {
    /// Creates an empty log for `population` members.
    #[must_use]
    pub const fn new(population: usize) -> Self {
        Self {
            population,
            iterations: Vec::new(),
        }
    }

    /// Returns the population size.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Returns the recorded iterations in insertion order.
    #[must_use]
    pub fn iterations(&self) -> &[IterationMatrix] {
        &self.iterations
    }

    /// Returns the number of recorded iterations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    /// Returns whether no iteration was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Appends a row-major `population × population` count matrix.
    ///
    /// # Errors
    /// Returns [`InteractionError::RaggedMatrix`] when `counts` does not hold
    /// exactly `population²` values.
    pub fn push_iteration(&mut self, iteration: u64, counts: Vec<u32>) -> Result<(), InteractionError> {
        let expected = self.population * self.population;
        if counts.len() != expected {
            return Err(InteractionError::RaggedMatrix {
                iteration,
                expected,
                actual: counts.len(),
            });
        }
        self.iterations.push(IterationMatrix {
            iteration,
            population: self.population,
            counts,
        });
        Ok(())
    }

    /// Appends an iteration described by its `(from, to)` interactions.
    ///
    /// # Errors
    /// Returns [`InteractionError::MemberOutOfRange`] when a pair names a
    /// member outside the population.
    pub fn push_pairs(&mut self, iteration: u64, pairs: &[(usize, usize)]) -> Result<(), InteractionError> {
        let n = self.population;
        let mut counts = vec![0_u32; n * n];
        for &(from, to) in pairs {
            let member = from.max(to);
            if member >= n {
                return Err(InteractionError::MemberOutOfRange {
                    member,
                    population: n,
                });
            }
            let cell = &mut counts[from * n + to];
            *cell = cell.saturating_add(1);
        }
        self.push_iteration(iteration, counts)
    }
}
