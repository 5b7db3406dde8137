//! Magnitude distribution chart

use async_trait::async_trait;

use seismo_core::domain::range::DateRange;
use seismo_store::RecordStore;

use super::{ChartHandler, HandlerError, HandlerOutput};
use crate::render;

/// Width of one histogram bin, in magnitude units
pub const BIN_WIDTH: f64 = 0.5;

/// Histogram of magnitudes in the range, as a bar chart PNG
pub struct MagnitudeDistributionHandler {
    records: RecordStore,
}

impl MagnitudeDistributionHandler {
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }
}

/// Upper bound on histogram bins, one per pixel column of the plot area
pub const MAX_BINS: usize = render::PLOT_WIDTH as usize;

/// Counts per `BIN_WIDTH` bin, from the bin of the smallest magnitude to the
/// bin of the largest. Returns the lower edge of the first bin and the counts,
/// or `None` when there is nothing to bin.
///
/// Fails when the magnitudes span more than `MAX_BINS` bins.
pub fn bin_magnitudes(magnitudes: &[f64]) -> Result<Option<(f64, Vec<usize>)>, HandlerError> {
    let finite: Vec<f64> = magnitudes.iter().copied().filter(|m| m.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Ok(None);
    };

    let first = (min / BIN_WIDTH).floor();
    let last = (max / BIN_WIDTH).floor();
    let span = last - first;
    if !span.is_finite() || span >= MAX_BINS as f64 {
        return Err(HandlerError::Unplottable(format!(
            "magnitudes from {} to {} need more than {} bins",
            min, max, MAX_BINS
        )));
    }

    let mut counts = vec![0; span as usize + 1];
    let top = counts.len() - 1;
    for mag in finite {
        let bin = ((mag / BIN_WIDTH).floor() - first) as usize;
        counts[bin.min(top)] += 1;
    }

    Ok(Some((first * BIN_WIDTH, counts)))
}

#[async_trait]
impl ChartHandler for MagnitudeDistributionHandler {
    async fn run(&self, start: &str, end: &str) -> Result<HandlerOutput, HandlerError> {
        let range = DateRange::parse(start, end)?;
        let quakes = self.records.quakes_in_range(range).await?;

        let magnitudes: Vec<f64> = quakes.iter().map(|quake| quake.mag).collect();
        let png = match bin_magnitudes(&magnitudes)? {
            Some((lower, counts)) => {
                tracing::debug!(
                    "Binned {} magnitudes into {} bins from {}",
                    magnitudes.len(),
                    counts.len(),
                    lower
                );
                render::bar_chart(&counts)?
            }
            None => render::placeholder()?,
        };

        Ok(HandlerOutput::Image(png))
    }
}
