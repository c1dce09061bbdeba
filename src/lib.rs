//! Kinematic histograms of reconstructed particle collections
//!
//!
//! # Introduction (for the physicist)
//!
//! In an event-processing pipeline, each collision event yields collections
//! of reconstructed objects (jets, electrons, muons...). The histograms
//! booked here describe their kinematics: transverse momentum,
//! pseudorapidity, azimuthal angle, mass, energy, rapidity, and optionally
//! the momentum components, the transverse energy, and per-rank copies for
//! the N leading objects.
//!
//! On top of that, the trigger-level analysis (TLA) mode looks at the dijet
//! system formed by the two leading objects and fills its invariant mass and
//! y* (half the rapidity difference) inclusively and in a grid of regions
//! defined by pT, mass and y* cuts.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Everything goes through `ParticleHists`:
//!
//! * construct it from a detail string which selects optional histograms
//! * call `initialize()` once to book every histogram
//! * feed it collections or single particles, event by event
//! * read the results back from its `HistogramManager`
//!
//! Framework-native particles use MeV and are converted to GeV before
//! filling. Particles of the alternate `Particle` format are already in GeV.

#![warn(missing_docs)]

pub mod config;
pub mod events;
pub mod histogram;
pub mod hists;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod particle;
pub mod tla;

pub use crate::{
    config::{InfoSwitch, RunConfiguration, TlaThresholds},
    histogram::{Hist1D, HistId, HistogramManager},
    hists::ParticleHists,
    particle::{EventInfo, IParticle, Particle, RecoParticle},
    tla::{RapidityCut, RegionKey, TlaRegion},
};

/// We'll use eyre's type-erased result type throughout the crate
pub type Result<T> = eyre::Result<T>;
