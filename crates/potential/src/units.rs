//! Physical constants for converting code-unit potentials.
//!
//! Positions are in kpc and masses in solar masses. Multiplying a
//! code-unit potential (M_sun / kpc) by [`G_CODE`] yields a specific
//! potential energy in (km/s)^2.

use crate::real::Real;

/// Gravitational constant [km^3 / kg / s^2].
pub const G_KM3_PER_KG_S2: f64 = 6.67300e-20;

/// Solar mass [kg].
pub const SOLAR_MASS_KG: f64 = 1.9891e30;

/// Kiloparsec [km].
pub const KPC_KM: f64 = 3.08568025e16;

/// G in (km/s)^2 kpc / M_sun.
pub const G_CODE: f64 = G_KM3_PER_KG_S2 * SOLAR_MASS_KG / KPC_KM;

/// Scale every value by `factor` in place.
pub fn to_physical<F: Real>(values: &mut [F], factor: f64) {
    let f = F::lit(factor);
    for v in values.iter_mut() {
        *v = *v * f;
    }
}
