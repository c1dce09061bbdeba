//! Kinematic histograms of a particle collection
//!
//! A `ParticleHists` is constructed from a detail string, books its
//! histograms once through `initialize()`, and is then filled event by event.
//! The detail string decides which optional histogram groups exist, see
//! `InfoSwitch` for its syntax.

use crate::{
    config::InfoSwitch,
    histogram::{HistId, HistogramManager},
    momentum::{from_pt_eta_phi_e, Kinematics, E, X, Y, Z},
    numeric::{reals::consts::PI, Float, MEV_PER_GEV},
    particle::{EventInfo, IParticle, Particle},
    tla::{Dijet, RegionKey, TlaHists, TlaRegion, INCLUSIVE_DIR},
    Result,
};

use eyre::{ensure, format_err};

/// Kinematic histograms of a particle collection
pub struct ParticleHists {
    /// Selection of the optional histogram groups
    switch: InfoSwitch,

    /// Prefix of the basic histogram names
    prefix: String,

    /// Human-readable particle name, used in axis labels
    title: String,

    /// Storage for every histogram
    store: HistogramManager,

    /// Handles of the booked histograms, once initialized
    booked: Option<BookedHists>,
}
//
impl ParticleHists {
    /// Set up histogramming, without booking anything yet
    ///
    /// `name` is prepended to every full histogram name, `detail_str` selects
    /// the optional histogram groups, `prefix` starts the basic histogram
    /// names and `title` is the particle name used in axis labels.
    ///
    pub fn new(name: &str, detail_str: &str, prefix: &str, title: &str) -> Result<Self> {
        Ok(Self {
            switch: InfoSwitch::parse(detail_str)?,
            prefix: prefix.to_owned(),
            title: title.to_owned(),
            store: HistogramManager::new(name),
            booked: None,
        })
    }

    /// Book every histogram. Must be called exactly once, before filling.
    pub fn initialize(&mut self) -> Result<()> {
        ensure!(
            self.booked.is_none(),
            "Histograms of {} were already initialized",
            self.store.name()
        );

        let store = &mut self.store;
        let switch = &self.switch;
        let label = |rank_title: &str, quantity: &str| -> String {
            if rank_title.is_empty() {
                format!("{} {}", self.title, quantity)
            } else {
                format!("{} {} {}", rank_title, self.title, quantity)
            }
        };

        // These plots are always made
        let basic = BasicHists::book(store, &self.prefix, "", &|q: &str| label("", q));

        // Details of the particle kinematics
        let kinematic = switch.kinematic().then(|| KinematicHists {
            px: store.book(self.prefix.clone() + "Px", label("", "Px [GeV]"), 120, 0., 1000.),
            py: store.book(self.prefix.clone() + "Py", label("", "Py [GeV]"), 120, 0., 1000.),
            pz: store.book(self.prefix.clone() + "Pz", label("", "Pz [GeV]"), 120, 0., 4000.),
            et: EtHists::book(store, &self.prefix, "", &|q: &str| label("", q)),
        });

        // N leading particles
        let leading = (0..switch.num_leading())
            .map(|rank| {
                let suffix = format!("_{}", rank);
                let rank_title = ordinal_title(rank);
                let rank_label = |quantity: &str| label(&rank_title, quantity);
                RankHists {
                    basic: BasicHists::book(store, &self.prefix, &suffix, &rank_label),
                    et: switch
                        .kinematic()
                        .then(|| EtHists::book(store, &self.prefix, &suffix, &rank_label)),
                    pt_fine: switch.tla().then(|| {
                        store.book(
                            format!("{}/Pt_f{}", INCLUSIVE_DIR, suffix),
                            rank_label("p_{T} [GeV]"),
                            3000,
                            0.,
                            3000.,
                        )
                    }),
                }
            })
            .collect();

        // Trigger-level analysis
        let tla = switch
            .tla()
            .then(|| TlaHists::book(store, switch.tla_thresholds()));

        tracing::debug!(
            name = self.store.name(),
            num_hists = self.store.len(),
            "booked particle histograms"
        );
        self.booked = Some(BookedHists {
            basic,
            kinematic,
            leading,
            tla,
        });
        Ok(())
    }

    /// Fill histograms from a collection of framework-native particles
    ///
    /// The collection is expected to be sorted by decreasing rank, index 0
    /// being the leading particle. Trigger-level analysis histograms need at
    /// least two particles: with fewer, they are skipped with a warning and
    /// the call still succeeds.
    ///
    pub fn fill_collection<P: IParticle>(
        &mut self,
        particles: &[P],
        weight: Float,
        info: Option<&EventInfo>,
    ) -> Result<()> {
        for particle in particles {
            self.fill_particle(particle, weight, info)?;
        }

        let booked = self.booked.as_ref().ok_or_else(|| self.not_initialized())?;
        let store = &mut self.store;

        for (rank, particle) in booked.leading.iter().zip(particles) {
            let kin = Snapshot::from_native(particle);
            rank.basic.fill(store, &kin, weight);
            if let Some(et) = &rank.et {
                let et_value = particle.e() / particle.eta().cosh() / MEV_PER_GEV;
                et.fill(store, et_value, weight);
            }
            if let Some(pt_fine) = rank.pt_fine {
                store.fill(pt_fine, kin.pt, weight);
            }
        }

        if let Some(tla) = &booked.tla {
            if particles.len() < 2 {
                tracing::warn!(
                    name = store.name(),
                    num_particles = particles.len(),
                    "need at least two jets for TLA"
                );
                return Ok(());
            }
            let jet = |particle: &P| {
                from_pt_eta_phi_e(
                    particle.pt() / MEV_PER_GEV,
                    particle.eta(),
                    particle.phi(),
                    particle.e() / MEV_PER_GEV,
                )
            };
            let dijet = Dijet::new(jet(&particles[0]), jet(&particles[1]));
            tla.fill(store, &dijet, weight, info);
        }
        Ok(())
    }

    /// Fill the basic and kinematic histograms from one framework-native
    /// particle, whose momenta are in MeV
    pub fn fill_particle<P: IParticle>(
        &mut self,
        particle: &P,
        weight: Float,
        _info: Option<&EventInfo>,
    ) -> Result<()> {
        let booked = self.booked.as_ref().ok_or_else(|| self.not_initialized())?;
        booked
            .basic
            .fill(&mut self.store, &Snapshot::from_native(particle), weight);
        if let Some(kinematic) = &booked.kinematic {
            let p4 = particle.p4() / MEV_PER_GEV;
            kinematic.fill(&mut self.store, [p4[X], p4[Y], p4[Z]], p4.et(), weight);
        }
        Ok(())
    }

    /// Fill the basic and kinematic histograms from one particle of the
    /// alternate format, whose momenta are already in GeV
    pub fn fill_gev_particle(
        &mut self,
        particle: &Particle,
        weight: Float,
        _info: Option<&EventInfo>,
    ) -> Result<()> {
        let booked = self.booked.as_ref().ok_or_else(|| self.not_initialized())?;
        let p4 = &particle.p4;
        let kin = Snapshot {
            pt: p4.pt(),
            eta: p4.eta(),
            phi: p4.phi(),
            mass: p4.mass(),
            energy: p4[E],
            rapidity: p4.rapidity(),
        };
        booked.basic.fill(&mut self.store, &kin, weight);
        if let Some(kinematic) = &booked.kinematic {
            kinematic.fill(&mut self.store, particle.pxyz(), p4.et(), weight);
        }
        Ok(())
    }

    // ### ACCESSORS ###

    /// Selection of the optional histogram groups
    pub fn info_switch(&self) -> &InfoSwitch {
        &self.switch
    }

    /// Storage of every booked histogram
    pub fn histograms(&self) -> &HistogramManager {
        &self.store
    }

    /// TLA regions, in booking order (empty if TLA is disabled)
    pub fn tla_regions(&self) -> &[TlaRegion] {
        self.booked
            .as_ref()
            .and_then(|booked| booked.tla.as_ref())
            .map_or(&[] as &[TlaRegion], TlaHists::regions)
    }

    /// Look up a TLA region by its cuts
    pub fn region(&self, key: &RegionKey) -> Option<&TlaRegion> {
        self.booked.as_ref()?.tla.as_ref()?.region(key)
    }

    /// Error reported when filling before initialization
    fn not_initialized(&self) -> eyre::Report {
        format_err!(
            "Histograms of {} must be initialized before filling",
            self.store.name()
        )
    }
}

/// Ordinal rank prefix of leading-particle axis labels (rank 0 is "1^{st}")
fn ordinal_title(rank: usize) -> String {
    let suffix = match rank {
        0 => "st",
        1 => "nd",
        2 => "rd",
        _ => "th",
    };
    format!("{}^{{{}}}", rank + 1, suffix)
}

/// Quantities deposited into the basic histograms (GeV)
struct Snapshot {
    pt: Float,
    eta: Float,
    phi: Float,
    mass: Float,
    energy: Float,
    rapidity: Float,
}
//
impl Snapshot {
    /// Read a framework-native particle, converting MeV to GeV
    fn from_native(particle: &impl IParticle) -> Self {
        Self {
            pt: particle.pt() / MEV_PER_GEV,
            eta: particle.eta(),
            phi: particle.phi(),
            mass: particle.m() / MEV_PER_GEV,
            energy: particle.e() / MEV_PER_GEV,
            rapidity: particle.rapidity(),
        }
    }
}

/// Handles of every booked histogram
struct BookedHists {
    basic: BasicHists,
    kinematic: Option<KinematicHists>,
    leading: Vec<RankHists>,
    tla: Option<TlaHists>,
}

/// The nine histograms which are always made, inclusively and per rank
struct BasicHists {
    pt_l: HistId,
    pt: HistId,
    pt_m: HistId,
    pt_s: HistId,
    eta: HistId,
    phi: HistId,
    mass: HistId,
    energy: HistId,
    rapidity: HistId,
}
//
impl BasicHists {
    fn book(
        store: &mut HistogramManager,
        prefix: &str,
        suffix: &str,
        label: &dyn Fn(&str) -> String,
    ) -> Self {
        let name = |var: &str| format!("{}{}{}", prefix, var, suffix);
        Self {
            pt_l: store.book(name("Pt_l"), label("p_{T} [GeV]"), 120, 0., 3000.),
            pt: store.book(name("Pt"), label("p_{T} [GeV]"), 100, 0., 1000.),
            pt_m: store.book(name("Pt_m"), label("p_{T} [GeV]"), 100, 0., 500.),
            pt_s: store.book(name("Pt_s"), label("p_{T} [GeV]"), 100, 0., 100.),
            eta: store.book(name("Eta"), label("#eta"), 80, -4., 4.),
            phi: store.book(name("Phi"), label("Phi"), 120, -PI, PI),
            mass: store.book(name("Mass"), label("Mass [GeV]"), 120, 0., 400.),
            energy: store.book(name("Energy"), label("Energy [GeV]"), 120, 0., 4000.),
            rapidity: store.book(name("Rapidity"), label("Rapidity"), 120, -10., 10.),
        }
    }

    fn fill(&self, store: &mut HistogramManager, kin: &Snapshot, weight: Float) {
        store.fill(self.pt_l, kin.pt, weight);
        store.fill(self.pt, kin.pt, weight);
        store.fill(self.pt_m, kin.pt, weight);
        store.fill(self.pt_s, kin.pt, weight);
        store.fill(self.eta, kin.eta, weight);
        store.fill(self.phi, kin.phi, weight);
        store.fill(self.mass, kin.mass, weight);
        store.fill(self.energy, kin.energy, weight);
        store.fill(self.rapidity, kin.rapidity, weight);
    }
}

/// Transverse energy histograms, in three ranges
struct EtHists {
    et: HistId,
    et_m: HistId,
    et_s: HistId,
}
//
impl EtHists {
    fn book(
        store: &mut HistogramManager,
        prefix: &str,
        suffix: &str,
        label: &dyn Fn(&str) -> String,
    ) -> Self {
        let name = |var: &str| format!("{}{}{}", prefix, var, suffix);
        Self {
            et: store.book(name("Et"), label("E_{T} [GeV]"), 100, 0., 1000.),
            et_m: store.book(name("Et_m"), label("E_{T} [GeV]"), 100, 0., 500.),
            et_s: store.book(name("Et_s"), label("E_{T} [GeV]"), 100, 0., 100.),
        }
    }

    fn fill(&self, store: &mut HistogramManager, et: Float, weight: Float) {
        store.fill(self.et, et, weight);
        store.fill(self.et_m, et, weight);
        store.fill(self.et_s, et, weight);
    }
}

/// Momentum component and transverse energy histograms
struct KinematicHists {
    px: HistId,
    py: HistId,
    pz: HistId,
    et: EtHists,
}
//
impl KinematicHists {
    fn fill(&self, store: &mut HistogramManager, pxyz: [Float; 3], et: Float, weight: Float) {
        store.fill(self.px, pxyz[0], weight);
        store.fill(self.py, pxyz[1], weight);
        store.fill(self.pz, pxyz[2], weight);
        self.et.fill(store, et, weight);
    }
}

/// Histograms of the particle with a given rank
struct RankHists {
    basic: BasicHists,
    et: Option<EtHists>,
    pt_fine: Option<HistId>,
}
