//! Cartesian-product enumeration of a [`SearchSpace`]

use crate::error::{CurveError, Result};
use super::search_space::{Configuration, SearchSpace};

/// Lazy iterator over every configuration of a search space.
///
/// Odometer order: the last declared parameter varies fastest. Cloning the
/// iterator (or calling [`SearchSpace::combinations`] again) restarts the
/// enumeration from the same first configuration.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    space: &'a SearchSpace,
    cursor: Vec<usize>,
    remaining: usize,
}

impl<'a> Combinations<'a> {
    pub(crate) fn new(space: &'a SearchSpace) -> Result<Self> {
        let total = space
            .params()
            .iter()
            .try_fold(1usize, |acc, (_, values)| acc.checked_mul(values.len()))
            .ok_or_else(|| CurveError::ConfigError("search space is too large to enumerate".to_string()))?;

        Ok(Self {
            space,
            cursor: vec![0; space.len()],
            remaining: total,
        })
    }

    fn current(&self) -> Configuration {
        let values = self
            .space
            .params()
            .iter()
            .zip(&self.cursor)
            .map(|((name, candidates), &i)| (name.clone(), candidates[i].clone()))
            .collect();
        Configuration::new(values)
    }

    fn advance(&mut self) {
        let params = self.space.params();
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < params[pos].1.len() {
                return;
            }
            self.cursor[pos] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        if self.remaining == 0 {
            return None;
        }
        let config = self.current();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(config)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}
