//! Quantum channel simulator.
//!
//! Stateless draws over the environment's random source plus the collapse
//! rule. This is a pedagogical model: there are no amplitudes, only the four
//! polarization symbols and the rule that measuring in the wrong basis
//! destroys the prepared information.
//!
//! # Entropy consumption
//!
//! Each draw reads exactly one accepted byte from the environment:
//!
//! - [`draw_basis`] and [`draw_value`] read one fair coin each
//! - [`measure`] reads nothing when the bases agree and one uniform
//!   four-way draw when they differ

use crate::{
    env::Environment,
    error::EntropyError,
    qubit::{Basis, QubitValue},
};

/// Draws a basis uniformly.
pub fn draw_basis<E: Environment>(env: &E) -> Result<Basis, EntropyError> {
    let index = env.random_below(2)?;
    Ok(Basis::ALL[usize::from(index)])
}

/// Draws one of the two symbols valid in `basis`, uniformly.
pub fn draw_value<E: Environment>(env: &E, basis: Basis) -> Result<QubitValue, EntropyError> {
    let index = env.random_below(2)?;
    Ok(basis.values()[usize::from(index)])
}

/// Measures `value`, prepared in `prepared`, using `measuring`.
///
/// Compatible bases reproduce the prepared value exactly and consume no
/// entropy. Incompatible bases return a symbol drawn uniformly over all four
/// symbols, not just the two valid in `measuring`.
pub fn measure<E: Environment>(
    env: &E,
    value: QubitValue,
    prepared: Basis,
    measuring: Basis,
) -> Result<QubitValue, EntropyError> {
    if prepared == measuring {
        return Ok(value);
    }

    let index = env.random_below(4)?;
    Ok(QubitValue::ALL[usize::from(index)])
}
