use crate::config::Interval;
use crate::quality::Metrics;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterOpts {
    pub len: Interval<i64>,
    pub quality: Interval<f64>,
}

/// A read is kept when both its length and its average quality fall inside the (inclusive)
/// bounds. The same decision applies to every output.
pub fn filter(metrics: &Metrics, opts: &FilterOpts) -> bool {
    opts.len.contains(metrics.len as i64) && opts.quality.contains(metrics.avg_qual)
}
