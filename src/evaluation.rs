//! Accuracy evaluation against labelled samples

use crate::types::Sentiment;
use serde::Serialize;

/// Counts of (actual, predicted) label pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// `counts[actual][predicted]`, indexed by [`Sentiment::index`]
    counts: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Sentiment, predicted: Sentiment) {
        self.counts[actual.index()][predicted.index()] += 1;
    }

    pub fn count(&self, actual: Sentiment, predicted: Sentiment) -> usize {
        self.counts[actual.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..3).map(|i| self.counts[i][i]).sum()
    }

    fn predicted_as(&self, label: Sentiment) -> usize {
        self.counts.iter().map(|row| row[label.index()]).sum()
    }

    fn actually(&self, label: Sentiment) -> usize {
        self.counts[label.index()].iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetric {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub sentiment: Sentiment,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub matrix: ConfusionMatrix,
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
}

impl AccuracyReport {
    /// Flattened metrics: overall accuracy, then macro averages
    pub fn metrics(&self) -> Vec<AccuracyMetric> {
        let n = self.per_class.len() as f64;
        let macro_avg = |f: fn(&ClassMetrics) -> f64| self.per_class.iter().map(f).sum::<f64>() / n;
        vec![
            AccuracyMetric { label: "Accuracy".to_string(), value: self.accuracy },
            AccuracyMetric { label: "Precision".to_string(), value: macro_avg(|c| c.precision) },
            AccuracyMetric { label: "Recall".to_string(), value: macro_avg(|c| c.recall) },
            AccuracyMetric { label: "F1 Score".to_string(), value: macro_avg(|c| c.f1) },
        ]
    }
}

/// Score predictions against expected labels
pub fn evaluate<I>(pairs: I) -> AccuracyReport
where
    I: IntoIterator<Item = (Sentiment, Sentiment)>,
{
    let mut matrix = ConfusionMatrix::default();
    for (actual, predicted) in pairs {
        matrix.record(actual, predicted);
    }

    let accuracy = ratio(matrix.correct(), matrix.total());
    let per_class = Sentiment::ALL
        .iter()
        .map(|&sentiment| {
            let tp = matrix.count(sentiment, sentiment);
            let precision = ratio(tp, matrix.predicted_as(sentiment));
            let recall = ratio(tp, matrix.actually(sentiment));
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                sentiment,
                precision,
                recall,
                f1,
                support: matrix.actually(sentiment),
            }
        })
        .collect();

    AccuracyReport {
        matrix,
        accuracy,
        per_class,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
