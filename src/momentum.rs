//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::Float;
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Pseudorapidity reported for momenta that are exactly parallel to the beam
const BEAM_ETA: Float = 1e11;

/// Build a 4-momentum from the usual collider coordinates
pub fn from_pt_eta_phi_e(pt: Float, eta: Float, phi: Float, e: Float) -> Momentum {
    Momentum::new(pt * cos(phi), pt * sin(phi), pt * eta.sinh(), e)
}

/// Kinematic quantities derived from a 4-momentum
///
/// Conventions are those of high-energy physics collider experiments: the
/// beam runs along Z, angles are in radians, and every quantity shares the
/// unit of the underlying 4-momentum.
///
pub trait Kinematics {
    /// Square of the transverse momentum
    fn pt2(&self) -> Float;

    /// Transverse momentum
    fn pt(&self) -> Float {
        sqrt(self.pt2())
    }

    /// Norm of the spatial part of the 4-momentum
    fn p(&self) -> Float;

    /// Azimuthal angle, in [-π, π]
    fn phi(&self) -> Float;

    /// Pseudorapidity
    fn eta(&self) -> Float;

    /// Invariant mass, negative for space-like 4-momenta
    fn mass(&self) -> Float;

    /// Rapidity along the beam axis
    fn rapidity(&self) -> Float;

    /// Transverse energy
    fn et(&self) -> Float;
}

impl Kinematics for Momentum {
    fn pt2(&self) -> Float {
        self[X] * self[X] + self[Y] * self[Y]
    }

    fn p(&self) -> Float {
        sqrt(self.pt2() + self[Z] * self[Z])
    }

    fn phi(&self) -> Float {
        if self[X] == 0. && self[Y] == 0. {
            0.
        } else {
            self[Y].atan2(self[X])
        }
    }

    fn eta(&self) -> Float {
        let p = self.p();
        let cos_theta = if p == 0. { 1. } else { self[Z] / p };
        if cos_theta * cos_theta < 1. {
            -0.5 * ln((1. - cos_theta) / (1. + cos_theta))
        } else if self[Z] == 0. {
            0.
        } else if self[Z] > 0. {
            BEAM_ETA
        } else {
            -BEAM_ETA
        }
    }

    fn mass(&self) -> Float {
        let m2 = self[E] * self[E] - self.p().powi(2);
        if m2 < 0. {
            -sqrt(-m2)
        } else {
            sqrt(m2)
        }
    }

    fn rapidity(&self) -> Float {
        0.5 * ln((self[E] + self[Z]) / (self[E] - self[Z]))
    }

    fn et(&self) -> Float {
        let pt2 = self.pt2();
        let et2 = if pt2 == 0. {
            0.
        } else {
            self[E] * self[E] * pt2 / (pt2 + self[Z] * self[Z])
        };
        if self[E] < 0. {
            -sqrt(et2)
        } else {
            sqrt(et2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::reals::{consts::FRAC_PI_2, EPSILON};

    fn assert_close(actual: Float, expected: Float) {
        assert!(
            abs(actual - expected) <= 1e3 * EPSILON * expected.abs().max(1.),
            "{actual} != {expected}"
        );
    }

    #[test]
    fn collider_coordinates_round_trip() {
        let p = from_pt_eta_phi_e(50., 1.2, -0.7, 200.);
        assert_close(p.pt(), 50.);
        assert_close(p.eta(), 1.2);
        assert_close(p.phi(), -0.7);
        assert_close(p[E], 200.);
    }

    #[test]
    fn massless_momentum() {
        let pt: Float = 30.;
        let eta: Float = -0.4;
        let p = from_pt_eta_phi_e(pt, eta, FRAC_PI_2, pt * eta.cosh());
        // E² - p² cancels, so the mass only keeps half of the digits
        assert!(abs(p.mass()) <= 10. * sqrt(EPSILON) * p[E]);
        assert_close(p.rapidity(), eta);
        assert_close(p.et(), pt);
    }

    #[test]
    fn space_like_mass_is_negative() {
        let p = Momentum::new(3., 0., 4., 3.);
        assert_close(p.mass(), -4.);
    }

    #[test]
    fn beam_parallel_momentum() {
        let forward = Momentum::new(0., 0., 10., 10.);
        assert_eq!(forward.eta(), BEAM_ETA);
        assert_eq!((-forward).eta(), -BEAM_ETA);
        assert_eq!(forward.phi(), 0.);
        assert_eq!(forward.et(), 0.);
        assert_eq!(Momentum::new(0., 0., 0., 1.).eta(), 0.);
    }
}
