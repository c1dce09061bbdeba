//! This module defines the particle records which histograms are filled from

use crate::{
    momentum::{Kinematics, Momentum, E, X, Y, Z},
    numeric::Float,
};

/// Framework-native reconstructed particle
///
/// Momentum-like quantities are expressed in MeV. Only `p4()` is mandatory,
/// the other accessors derive from it but may be overriden by records which
/// store those quantities directly.
///
pub trait IParticle {
    /// 4-momentum (MeV)
    fn p4(&self) -> Momentum;

    /// Transverse momentum (MeV)
    fn pt(&self) -> Float {
        self.p4().pt()
    }

    /// Pseudorapidity
    fn eta(&self) -> Float {
        self.p4().eta()
    }

    /// Azimuthal angle
    fn phi(&self) -> Float {
        self.p4().phi()
    }

    /// Invariant mass (MeV)
    fn m(&self) -> Float {
        self.p4().mass()
    }

    /// Energy (MeV)
    fn e(&self) -> Float {
        self.p4()[E]
    }

    /// Rapidity
    fn rapidity(&self) -> Float {
        self.p4().rapidity()
    }
}

/// Reconstructed particle stored in collider coordinates (MeV)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoParticle {
    pt: Float,
    eta: Float,
    phi: Float,
    e: Float,
}
//
impl RecoParticle {
    /// Build a particle from its transverse momentum, pseudorapidity,
    /// azimuthal angle and energy
    pub fn new(pt: Float, eta: Float, phi: Float, e: Float) -> Self {
        Self { pt, eta, phi, e }
    }
}

impl IParticle for RecoParticle {
    fn p4(&self) -> Momentum {
        crate::momentum::from_pt_eta_phi_e(self.pt, self.eta, self.phi, self.e)
    }

    fn pt(&self) -> Float {
        self.pt
    }

    fn eta(&self) -> Float {
        self.eta
    }

    fn phi(&self) -> Float {
        self.phi
    }

    fn e(&self) -> Float {
        self.e
    }
}

/// Particle of the alternate (ntuple-level) format, with an embedded
/// 4-momentum that is already expressed in GeV
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// 4-momentum (GeV)
    pub p4: Momentum,
}
//
impl Particle {
    /// Wrap a GeV 4-momentum
    pub fn new(p4: Momentum) -> Self {
        Self { p4 }
    }

    /// Momentum components along X, Y and Z (GeV)
    pub fn pxyz(&self) -> [Float; 3] {
        [self.p4[X], self.p4[Y], self.p4[Z]]
    }
}

/// Event-level metadata which accompanies particle collections
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventInfo {
    /// Event number, as assigned by the data acquisition
    pub event_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_coordinates_are_reported_verbatim() {
        let part = RecoParticle::new(40e3, 0.3, 1.1, 45e3);
        assert_eq!(part.pt(), 40e3);
        assert_eq!(part.eta(), 0.3);
        assert_eq!(part.phi(), 1.1);
        assert_eq!(part.e(), 45e3);
        assert!((part.p4().pt() - 40e3).abs() < 1e-6);
        assert!(part.m() > 0.);
    }
}
