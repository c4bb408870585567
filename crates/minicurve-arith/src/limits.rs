//! Caller-imposed caps on the two unbounded searches.

#![forbid(unsafe_code)]

/// Upper bounds for the randomized non-residue search and the order scan.
///
/// `None` leaves a search uncapped. The order scan is always bounded by the
/// Hasse interval; `max_order_scan` can only tighten it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of random candidates drawn while looking for a
    /// quadratic non-residue.
    pub max_nonresidue_draws: Option<u32>,
    /// Maximum number of multiples examined while looking for a point's order.
    pub max_order_scan: Option<u64>,
}

impl SearchLimits {
    pub fn with_max_draws(mut self, draws: u32) -> Self {
        self.max_nonresidue_draws = Some(draws);
        self
    }

    pub fn with_max_order_scan(mut self, scan: u64) -> Self {
        self.max_order_scan = Some(scan);
        self
    }
}
