//! Append-only result records

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One scored metric for one (repetition, fraction) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub rep: usize,
    pub fraction: f64,
    pub method: String,
    pub metric: String,
    pub value: f64,
}

/// Collects records in the order the protocol produces them
#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    records: Vec<EvaluationRecord>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: EvaluationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot the records collected so far
    pub fn finalize(&self) -> ResultTable {
        ResultTable {
            records: self.records.clone(),
        }
    }
}

/// Mean and spread of one metric at one fraction across repetitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub fraction: f64,
    pub metric: String,
    pub mean: f64,
    pub std: f64,
    pub n: usize,
}

/// Finalized, ordered evaluation records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultTable {
    records: Vec<EvaluationRecord>,
}

impl ResultTable {
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of a single metric, in table order
    pub fn for_metric<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a EvaluationRecord> + 'a {
        self.records.iter().filter(move |r| r.metric == metric)
    }

    /// Columns `rep, fraction, method, metric, value`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rep: Vec<u64> = self.records.iter().map(|r| r.rep as u64).collect();
        let fraction: Vec<f64> = self.records.iter().map(|r| r.fraction).collect();
        let method: Vec<&str> = self.records.iter().map(|r| r.method.as_str()).collect();
        let metric: Vec<&str> = self.records.iter().map(|r| r.metric.as_str()).collect();
        let value: Vec<f64> = self.records.iter().map(|r| r.value).collect();

        Ok(DataFrame::new(vec![
            Series::new("rep".into(), rep).into(),
            Series::new("fraction".into(), fraction).into(),
            Series::new("method".into(), method).into(),
            Series::new("metric".into(), metric).into(),
            Series::new("value".into(), value).into(),
        ])?)
    }

    /// Mean and population std per (fraction, metric), in first-seen order
    pub fn summary(&self) -> Vec<SummaryRow> {
        let mut groups: Vec<(f64, &str, Vec<f64>)> = Vec::new();
        for record in &self.records {
            match groups
                .iter_mut()
                .find(|(f, m, _)| *f == record.fraction && *m == record.metric)
            {
                Some((_, _, values)) => values.push(record.value),
                None => groups.push((record.fraction, record.metric.as_str(), vec![record.value])),
            }
        }

        groups
            .into_iter()
            .map(|(fraction, metric, values)| {
                let n = values.len();
                let mean = values.iter().sum::<f64>() / n as f64;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
                SummaryRow {
                    fraction,
                    metric: metric.to_string(),
                    mean,
                    std: var.sqrt(),
                    n,
                }
            })
            .collect()
    }
}
