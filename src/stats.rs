use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;

use super::journeys::{Journey, JourneyOutcome};


// each canceled journey counts as much as doubling the length of one delayed journey
static CANCELED_WEIGHT: f64 = 100.;

#[derive(PartialEq, Debug, Clone)]
pub struct Distribution {
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

impl Distribution {
    pub fn from_values(values: &[f64]) -> Option<Distribution> {
        if values.is_empty() {
            return None;
        }
        let sorted: Vec<f64> = values.iter().cloned()
            .sorted_by(|aa, bb| aa.partial_cmp(bb).unwrap_or(Ordering::Equal))
            .collect();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.
        } else {
            sorted[mid]
        };
        Some(Distribution {
            min: sorted[0],
            median,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            max: sorted[sorted.len() - 1],
        })
    }
}

/// How a population of journeys fared under a disruption.  Delay distributions cover only the
/// journeys that got faster or slower.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DisruptionStats {
    pub total: usize,
    pub canceled: usize,
    pub faster: usize,
    pub delayed: usize,
    pub unaffected: usize,
    pub absolute_delay: Option<Distribution>,
    pub percent_delay: Option<Distribution>,
    pub score: f64,
}

impl DisruptionStats {
    pub fn from_journeys(journeys: &[Journey]) -> DisruptionStats {
        let mut stats = DisruptionStats {
            total: journeys.len(),
            ..DisruptionStats::default()
        };
        let mut abs_delays = vec![];
        let mut pct_delays = vec![];

        for journey in journeys {
            match journey.outcome() {
                JourneyOutcome::Canceled => stats.canceled += 1,
                JourneyOutcome::Completed(route) => {
                    if route.time < journey.time() {
                        stats.faster += 1;
                    } else if route.time > journey.time() {
                        stats.delayed += 1;
                    } else {
                        stats.unaffected += 1;
                        continue;
                    }
                    if let (Some(abs), Some(pct)) = (journey.delay(), journey.percent_delay()) {
                        abs_delays.push(abs);
                        pct_delays.push(pct);
                    }
                }
                JourneyOutcome::Pending => {
                    log::warn!("journey {} -> {} was never replayed", journey.origin,
                               journey.target);
                }
            }
        }

        stats.absolute_delay = Distribution::from_values(&abs_delays);
        stats.percent_delay = Distribution::from_values(&pct_delays);
        let mean_pct_delay = match &stats.percent_delay {
            Some(dist) => dist.mean,
            None => 0.,
        };
        stats.score = stats.canceled as f64 * CANCELED_WEIGHT +
                      stats.delayed as f64 * mean_pct_delay;
        stats
    }

    pub fn counts(&self) -> HashMap<String, usize> {
        [
            ("canceled", self.canceled),
            ("faster", self.faster),
            ("delayed", self.delayed),
            ("unaffected", self.unaffected),
        ].iter().map(|(key, count)| (String::from(*key), *count)).collect()
    }
}
