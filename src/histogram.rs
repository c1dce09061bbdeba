//! Minimal 1D histogram storage, with booking and weighted filling

use crate::numeric::Float;

use prefix_num_ops::real::*;

use std::collections::HashMap;

/// Handle to a histogram owned by a `HistogramManager`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HistId(usize);

/// Fixed-width 1D histogram with weighted entries
#[derive(Clone, Debug)]
pub struct Hist1D {
    /// Histogram name, relative to its manager
    name: String,

    /// Axis label
    title: String,

    /// Number of bins (excluding under/overflow)
    n_bins: usize,

    /// Lower edge of the first bin
    x_min: Float,

    /// Upper edge of the last bin
    x_max: Float,

    /// Sum of weights per bin
    bin_content: Vec<Float>,

    /// Sum of squared weights per bin
    bin_sumw2: Vec<Float>,

    /// Sum of weights below x_min
    underflow: Float,

    /// Sum of weights at or above x_max
    overflow: Float,

    /// Number of fill calls, including under/overflow
    entries: u64,

    // Running sums over in-range entries
    sumw: Float,
    sumw2: Float,
    sumwx: Float,
    sumwx2: Float,
}
//
impl Hist1D {
    /// Create an empty histogram
    pub fn new(name: String, title: String, n_bins: usize, x_min: Float, x_max: Float) -> Self {
        assert!(n_bins > 0, "Histogram {} must have at least one bin", name);
        assert!(x_min < x_max, "Histogram {} has an empty range", name);
        Self {
            name,
            title,
            n_bins,
            x_min,
            x_max,
            bin_content: vec![0.; n_bins],
            bin_sumw2: vec![0.; n_bins],
            underflow: 0.,
            overflow: 0.,
            entries: 0,
            sumw: 0.,
            sumw2: 0.,
            sumwx: 0.,
            sumwx2: 0.,
        }
    }

    /// Deposit a weighted value
    pub fn fill(&mut self, x: Float, weight: Float) {
        self.entries += 1;
        match self.find_bin(x) {
            Some(bin) => {
                self.bin_content[bin] += weight;
                self.bin_sumw2[bin] += weight * weight;
                self.sumw += weight;
                self.sumw2 += weight * weight;
                self.sumwx += weight * x;
                self.sumwx2 += weight * x * x;
            }
            None if x < self.x_min => self.underflow += weight,
            // NaN lands here, as it does in ROOT
            None => self.overflow += weight,
        }
    }

    /// Index of the bin which contains x, if it is in range
    pub fn find_bin(&self, x: Float) -> Option<usize> {
        if !(x >= self.x_min && x < self.x_max) {
            return None;
        }
        let bin = ((x - self.x_min) / self.bin_width()) as usize;
        // Rounding can push values right below x_max into a phantom bin
        Some(bin.min(self.n_bins - 1))
    }

    /// Width of every bin
    pub fn bin_width(&self) -> Float {
        (self.x_max - self.x_min) / self.n_bins as Float
    }

    /// Lower edge of a bin
    pub fn bin_low_edge(&self, bin: usize) -> Float {
        self.x_min + bin as Float * self.bin_width()
    }

    /// Sum of weights in a bin
    pub fn bin_content(&self, bin: usize) -> Float {
        self.bin_content[bin]
    }

    /// Statistical uncertainty on a bin's content
    pub fn bin_error(&self, bin: usize) -> Float {
        sqrt(self.bin_sumw2[bin])
    }

    /// Iterate over (bin, content) pairs of non-empty bins
    pub fn filled_bins(&self) -> impl Iterator<Item = (usize, Float)> + '_ {
        self.bin_content
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, content)| content != 0.)
    }

    /// Weighted mean of in-range entries, if any
    pub fn mean(&self) -> Option<Float> {
        (self.sumw != 0.).then(|| self.sumwx / self.sumw)
    }

    /// Weighted standard deviation of in-range entries, if any
    pub fn rms(&self) -> Option<Float> {
        let mean = self.mean()?;
        let var = self.sumwx2 / self.sumw - mean * mean;
        Some(sqrt(var.max(0.)))
    }

    // ### ACCESSORS ###

    /// Histogram name, relative to its manager
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Axis label
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of bins (excluding under/overflow)
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Axis range
    pub fn range(&self) -> (Float, Float) {
        (self.x_min, self.x_max)
    }

    /// Number of fill calls, including under/overflow
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of in-range weights
    pub fn sum_of_weights(&self) -> Float {
        self.sumw
    }

    /// Sum of squared in-range weights
    pub fn sum_of_squared_weights(&self) -> Float {
        self.sumw2
    }

    /// Sum of weights below the axis range
    pub fn underflow(&self) -> Float {
        self.underflow
    }

    /// Sum of weights above the axis range
    pub fn overflow(&self) -> Float {
        self.overflow
    }
}

/// Owner of every histogram booked under a common name
///
/// Histograms are looked up through the `HistId` returned at booking time.
/// The full name of a histogram is the manager name followed by the
/// histogram name, so that several managers may share an output.
///
#[derive(Debug, Default)]
pub struct HistogramManager {
    /// Common prefix of all full histogram names
    name: String,

    /// Histograms, in booking order
    hists: Vec<Hist1D>,

    /// Histogram names to handles
    index: HashMap<String, HistId>,
}
//
impl HistogramManager {
    /// Create an empty manager
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Allocate a new histogram
    ///
    /// Booking the same name twice is a programming error and panics.
    ///
    pub fn book(
        &mut self,
        name: impl Into<String>,
        title: impl Into<String>,
        n_bins: usize,
        x_min: Float,
        x_max: Float,
    ) -> HistId {
        let name = name.into();
        let id = HistId(self.hists.len());
        let previous = self.index.insert(name.clone(), id);
        assert!(previous.is_none(), "Histogram {} was booked twice", name);
        self.hists
            .push(Hist1D::new(name, title.into(), n_bins, x_min, x_max));
        id
    }

    /// Deposit a weighted value into a histogram
    pub fn fill(&mut self, id: HistId, x: Float, weight: Float) {
        self.hists[id.0].fill(x, weight)
    }

    /// Access a histogram by handle
    pub fn get(&self, id: HistId) -> &Hist1D {
        &self.hists[id.0]
    }

    /// Look up a histogram by its name (without the manager name)
    pub fn find(&self, name: &str) -> Option<&Hist1D> {
        self.index.get(name).map(|&id| self.get(id))
    }

    /// Full name of a histogram, as written to outputs
    pub fn full_name(&self, id: HistId) -> String {
        format!("{}{}", self.name, self.get(id).name())
    }

    /// Common prefix of all full histogram names
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of booked histograms
    pub fn len(&self) -> usize {
        self.hists.len()
    }

    /// Truth that no histogram was booked
    pub fn is_empty(&self) -> bool {
        self.hists.is_empty()
    }

    /// Iterate over handles and histograms, in booking order
    pub fn iter(&self) -> impl Iterator<Item = (HistId, &Hist1D)> + '_ {
        self.hists
            .iter()
            .enumerate()
            .map(|(idx, hist)| (HistId(idx), hist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_bins_and_flows() {
        let mut hist = Hist1D::new("h".into(), "x".into(), 10, 0., 10.);
        hist.fill(2.5, 1.);
        hist.fill(2.7, 2.);
        hist.fill(-1., 0.5);
        hist.fill(10., 0.25);
        assert_eq!(hist.entries(), 4);
        assert_eq!(hist.bin_content(2), 3.);
        assert_eq!(hist.bin_error(2), sqrt(5.));
        assert_eq!(hist.underflow(), 0.5);
        assert_eq!(hist.overflow(), 0.25);
        assert_eq!(hist.sum_of_weights(), 3.);
        assert_eq!(hist.filled_bins().collect::<Vec<_>>(), vec![(2, 3.)]);
    }

    #[test]
    fn mean_and_rms() {
        let mut hist = Hist1D::new("h".into(), "x".into(), 100, -5., 5.);
        assert_eq!(hist.mean(), None);
        hist.fill(1., 1.);
        hist.fill(3., 1.);
        assert_eq!(hist.mean(), Some(2.));
        assert_eq!(hist.rms(), Some(1.));
    }

    #[test]
    fn last_bin_edge_rounding() {
        let hist = Hist1D::new("h".into(), "x".into(), 3, 0., 0.3);
        let below_max = Float::from_bits((0.3 as Float).to_bits() - 1);
        assert_eq!(hist.find_bin(below_max), Some(2));
        assert_eq!(hist.find_bin(0.3), None);
    }

    #[test]
    fn manager_lookup() {
        let mut mgr = HistogramManager::new("jets/");
        let a = mgr.book("Pt", "p_{T}", 10, 0., 100.);
        let b = mgr.book("Eta", "#eta", 10, -5., 5.);
        mgr.fill(a, 50., 2.);
        assert_eq!(mgr.len(), 2);
        assert_eq!(mgr.full_name(b), "jets/Eta");
        assert_eq!(mgr.find("Pt").unwrap().sum_of_weights(), 2.);
        assert!(mgr.find("Phi").is_none());
    }

    #[test]
    #[should_panic(expected = "booked twice")]
    fn double_booking_panics() {
        let mut mgr = HistogramManager::new("");
        mgr.book("Pt", "", 1, 0., 1.);
        mgr.book("Pt", "", 1, 0., 1.);
    }
}
