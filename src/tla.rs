//! Trigger-level analysis (TLA) dijet histograms
//!
//! The TLA selection looks at the two leading particles of a collection,
//! interpreted as jets. Besides two inclusive histograms, a grid of regions
//! is booked: one per combination of cuts on the leading pT, the subleading
//! pT, the dijet invariant mass, and either an upper ("yStar") or a lower
//! ("yStarAnti") cut on |y*|, where y* is half the rapidity difference of the
//! two jets.

use crate::{
    config::TlaThresholds,
    histogram::{HistId, HistogramManager},
    momentum::{Kinematics, Momentum},
    numeric::Float,
    particle::EventInfo,
};

use prefix_num_ops::real::*;

/// Directory of the histograms which only require two jets
pub(crate) const INCLUSIVE_DIR: &str = "TLA_noExtraSel";

/// Render a threshold the way it appears in region names
///
/// The value is printed with six decimals, then trailing zeros are removed,
/// along with the decimal point if nothing is left after it.
///
pub fn format_threshold(threshold: Float) -> String {
    let with_zeros = format!("{:.6}", threshold);
    with_zeros
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

/// Cut on |y*| of a TLA region
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RapidityCut {
    /// Keep events with |y*| strictly below the threshold
    Below(Float),

    /// Keep events with |y*| strictly above the threshold
    Above(Float),
}
//
impl RapidityCut {
    /// Truth that a value of y* passes this cut
    pub fn passes(&self, y_star: Float) -> bool {
        match *self {
            RapidityCut::Below(cut) => abs(y_star) < cut,
            RapidityCut::Above(cut) => abs(y_star) > cut,
        }
    }

    /// Name fragment of this cut, as used in region names
    fn name_fragment(&self) -> String {
        match *self {
            RapidityCut::Below(cut) => format!("yStar{}", format_threshold(cut)),
            RapidityCut::Above(cut) => format!("yStarAnti{}", format_threshold(cut)),
        }
    }
}

/// Set of cuts which identifies a TLA region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionKey {
    /// Leading jet pT must be above this (GeV)
    pub lead_pt: Float,

    /// Subleading jet pT must be above this (GeV)
    pub sublead_pt: Float,

    /// Dijet invariant mass must be above this (GeV)
    pub mjj: Float,

    /// Cut on |y*|
    pub y_star: RapidityCut,
}
//
impl RegionKey {
    /// Truth that a dijet system passes every cut of this region
    pub fn passes(&self, dijet: &Dijet) -> bool {
        dijet.lead_pt() > self.lead_pt
            && dijet.sublead_pt() > self.sublead_pt
            && dijet.mjj() > self.mjj
            && self.y_star.passes(dijet.y_star())
    }

    /// Directory name of the region histograms
    pub fn name(&self) -> String {
        format!(
            "TLA_pTlead{}_pTsublead{}_mjj{}_{}",
            format_threshold(self.lead_pt),
            format_threshold(self.sublead_pt),
            format_threshold(self.mjj),
            self.y_star.name_fragment()
        )
    }
}

/// Histograms of one TLA region
#[derive(Clone, Debug)]
pub struct TlaRegion {
    key: RegionKey,
    name: String,
    mjj: HistId,
    pt_lead: HistId,
    pt_sublead: HistId,
    y_star: HistId,
}
//
impl TlaRegion {
    fn book(store: &mut HistogramManager, key: RegionKey) -> Self {
        let name = key.name();
        Self {
            mjj: store.book(format!("{}/mjj", name), "m_{jj} [GeV]", 5000, 0., 5000.),
            pt_lead: store.book(
                format!("{}/pTlead", name),
                "1^{st} jet p_{T} [GeV]",
                3000,
                0.,
                3000.,
            ),
            pt_sublead: store.book(
                format!("{}/pTsublead", name),
                "2^{nd} jet p_{T} [GeV]",
                3000,
                0.,
                3000.,
            ),
            y_star: store.book(format!("{}/yStar", name), "yStar", 120, -3., 3.),
            key,
            name,
        }
    }

    /// Cuts defining this region
    pub fn key(&self) -> &RegionKey {
        &self.key
    }

    /// Directory name of the region histograms
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handles of the mjj, leading pT, subleading pT and y* histograms
    pub fn hists(&self) -> [HistId; 4] {
        [self.mjj, self.pt_lead, self.pt_sublead, self.y_star]
    }
}

/// Dijet system built from the two leading jets of an event (GeV)
#[derive(Clone, Copy, Debug)]
pub struct Dijet {
    lead: Momentum,
    sublead: Momentum,
    mjj: Float,
    y_star: Float,
}
//
impl Dijet {
    /// Compute the dijet observables from the two leading jet momenta
    pub fn new(lead: Momentum, sublead: Momentum) -> Self {
        Self {
            lead,
            sublead,
            mjj: (lead + sublead).mass(),
            y_star: (lead.rapidity() - sublead.rapidity()) * 0.5,
        }
    }

    /// Leading jet pT
    pub fn lead_pt(&self) -> Float {
        self.lead.pt()
    }

    /// Subleading jet pT
    pub fn sublead_pt(&self) -> Float {
        self.sublead.pt()
    }

    /// Dijet invariant mass
    pub fn mjj(&self) -> Float {
        self.mjj
    }

    /// Half the rapidity difference of the two jets (signed)
    pub fn y_star(&self) -> Float {
        self.y_star
    }
}

/// Every TLA histogram which is not tied to a leading-particle rank
#[derive(Clone, Debug)]
pub struct TlaHists {
    mjj: HistId,
    y_star: HistId,
    regions: Vec<TlaRegion>,
}
//
impl TlaHists {
    /// Book the inclusive histograms, then the region grid
    ///
    /// Regions are booked by increasing lead pT, sublead pT and mjj threshold
    /// index, with the yStar cuts of each (lead, sublead, mjj) combination
    /// coming before its yStarAnti cuts.
    ///
    pub fn book(store: &mut HistogramManager, thresholds: &TlaThresholds) -> Self {
        let mjj = store.book(
            format!("{}/mjj", INCLUSIVE_DIR),
            "m_{jj} [GeV]",
            5000,
            0.,
            5000.,
        );
        let y_star = store.book(format!("{}/yStar", INCLUSIVE_DIR), "yStar", 120, -3., 3.);

        let mut regions = Vec::with_capacity(thresholds.num_regions());
        for &lead_pt in &thresholds.lead_pts {
            for &sublead_pt in &thresholds.sublead_pts {
                for &mjj in &thresholds.mjjs {
                    let y_star_cuts = thresholds
                        .y_stars
                        .iter()
                        .map(|&cut| RapidityCut::Below(cut))
                        .chain(
                            thresholds
                                .y_star_antis
                                .iter()
                                .map(|&cut| RapidityCut::Above(cut)),
                        );
                    for y_star in y_star_cuts {
                        let key = RegionKey {
                            lead_pt,
                            sublead_pt,
                            mjj,
                            y_star,
                        };
                        regions.push(TlaRegion::book(store, key));
                    }
                }
            }
        }

        Self {
            mjj,
            y_star,
            regions,
        }
    }

    /// Fill the inclusive histograms, then every region that the dijet
    /// system passes
    pub fn fill(
        &self,
        store: &mut HistogramManager,
        dijet: &Dijet,
        weight: Float,
        info: Option<&EventInfo>,
    ) {
        store.fill(self.mjj, dijet.mjj(), weight);
        store.fill(self.y_star, dijet.y_star(), weight);

        for region in self.regions.iter().filter(|region| region.key.passes(dijet)) {
            store.fill(region.mjj, dijet.mjj(), weight);
            store.fill(region.y_star, dijet.y_star(), weight);
            store.fill(region.pt_lead, dijet.lead_pt(), weight);
            store.fill(region.pt_sublead, dijet.sublead_pt(), weight);
            tracing::trace!(
                event_number = ?info.map(|info| info.event_number),
                region = %region.name,
                lead_pt = dijet.lead_pt(),
                sublead_pt = dijet.sublead_pt(),
                mjj = dijet.mjj(),
                y_star = dijet.y_star(),
                "event passes TLA region"
            );
        }
    }

    /// Regions, in booking order
    pub fn regions(&self) -> &[TlaRegion] {
        &self.regions
    }

    /// Look up a region by its cuts
    pub fn region(&self, key: &RegionKey) -> Option<&TlaRegion> {
        self.regions.iter().find(|region| region.key == *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{momentum::from_pt_eta_phi_e, numeric::reals::EPSILON};

    #[test]
    fn threshold_trimming() {
        assert_eq!(format_threshold(200.), "200");
        assert_eq!(format_threshold(195.5), "195.5");
        assert_eq!(format_threshold(0.10), "0.1");
        assert_eq!(format_threshold(0.), "0");
        assert_eq!(format_threshold(1e-7), "0");
        assert_eq!(format_threshold(2500.25), "2500.25");
    }

    #[test]
    fn rapidity_cuts_are_strict() {
        assert!(RapidityCut::Below(0.6).passes(-0.5));
        assert!(!RapidityCut::Below(0.6).passes(0.6));
        assert!(RapidityCut::Above(0.6).passes(-0.7));
        assert!(!RapidityCut::Above(0.6).passes(0.6));
    }

    fn thresholds() -> TlaThresholds {
        TlaThresholds {
            lead_pts: vec![200., 250.],
            sublead_pts: vec![150.],
            mjjs: vec![500.],
            y_stars: vec![0.3, 2.],
            y_star_antis: vec![0.6],
        }
    }

    #[test]
    fn region_booking_order() {
        let mut store = HistogramManager::new("");
        let hists = TlaHists::book(&mut store, &thresholds());
        assert_eq!(store.len(), 2 + 4 * 6);
        let names = hists
            .regions()
            .iter()
            .map(TlaRegion::name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "TLA_pTlead200_pTsublead150_mjj500_yStar0.3",
                "TLA_pTlead200_pTsublead150_mjj500_yStar2",
                "TLA_pTlead200_pTsublead150_mjj500_yStarAnti0.6",
                "TLA_pTlead250_pTsublead150_mjj500_yStar0.3",
                "TLA_pTlead250_pTsublead150_mjj500_yStar2",
                "TLA_pTlead250_pTsublead150_mjj500_yStarAnti0.6",
            ]
        );
        assert!(store.find("TLA_noExtraSel/mjj").is_some());
        assert!(store
            .find("TLA_pTlead250_pTsublead150_mjj500_yStarAnti0.6/pTsublead")
            .is_some());
    }

    #[test]
    fn region_fill_follows_cuts() {
        let mut store = HistogramManager::new("");
        let hists = TlaHists::book(&mut store, &thresholds());

        // Back-to-back massless jets at y = ±0.5
        let lead = from_pt_eta_phi_e(230., 0.5, 0., 230. * (0.5 as Float).cosh());
        let sublead = from_pt_eta_phi_e(220., -0.5, 3.1, 220. * (0.5 as Float).cosh());
        let dijet = Dijet::new(lead, sublead);
        assert!(dijet.mjj() > 500.);
        assert!(abs(dijet.y_star() - 0.5) <= 1e3 * EPSILON);
        hists.fill(&mut store, &dijet, 2., None);

        let passing = hists
            .regions()
            .iter()
            .filter(|region| store.get(region.hists()[0]).entries() > 0)
            .map(TlaRegion::name)
            .collect::<Vec<_>>();
        assert_eq!(passing, vec!["TLA_pTlead200_pTsublead150_mjj500_yStar2"]);

        let key = RegionKey {
            lead_pt: 200.,
            sublead_pt: 150.,
            mjj: 500.,
            y_star: RapidityCut::Below(2.),
        };
        let region = hists.region(&key).unwrap();
        assert_eq!(region.key(), &key);
        for id in region.hists() {
            assert_eq!(store.get(id).entries(), 1);
            assert_eq!(store.get(id).sum_of_weights(), 2.);
        }
        assert_eq!(store.find("TLA_noExtraSel/yStar").unwrap().entries(), 1);
    }
}
