//! Transmission records.
//!
//! A record is one photon's trip from sender to receiver, optionally through
//! an eavesdropper. The sender's preparation and both parties' bases are
//! fixed when the record is created; only the receiver's measured value and
//! the interception can change, and only through an eavesdropper toggle.

use crate::{
    channel,
    env::Environment,
    error::EntropyError,
    qubit::{Basis, QubitValue},
};

/// Eavesdropper measurement inserted between sender and receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interception {
    /// Basis the eavesdropper measured in.
    pub basis: Basis,
    /// Value the eavesdropper observed, and re-sent to the receiver.
    pub value: QubitValue,
}

/// One simulated qubit transit.
///
/// # Invariants
///
/// - `receiver_value` is the collapse rule applied to the state immediately
///   before the receiver: the sender's preparation, or the interception when
///   present.
/// - Eavesdropper basis and value are present together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionRecord {
    sender_basis: Basis,
    sender_value: QubitValue,
    receiver_basis: Basis,
    receiver_value: QubitValue,
    interception: Option<Interception>,
}

impl TransmissionRecord {
    /// Simulates a fresh transmission.
    ///
    /// Draw order: sender basis, sender value, receiver basis, then (when
    /// `eavesdropper` is set) the eavesdropper basis and measurement, then the
    /// receiver measurement.
    pub fn transmit<E: Environment>(env: &E, eavesdropper: bool) -> Result<Self, EntropyError> {
        let sender_basis = channel::draw_basis(env)?;
        let sender_value = channel::draw_value(env, sender_basis)?;
        let receiver_basis = channel::draw_basis(env)?;

        let mut record = Self {
            sender_basis,
            sender_value,
            receiver_basis,
            // Placeholder until the causal chain below is resolved
            receiver_value: sender_value,
            interception: None,
        };

        if eavesdropper {
            record.intercept(env)?;
        } else {
            record.receiver_value =
                channel::measure(env, sender_value, sender_basis, receiver_basis)?;
        }

        Ok(record)
    }

    /// Builds a record from explicit parts, recomputing nothing.
    ///
    /// Intended for presentation fixtures and tests. The caller is responsible
    /// for the causal-chain invariant.
    pub fn from_parts(
        sender_basis: Basis,
        sender_value: QubitValue,
        receiver_basis: Basis,
        receiver_value: QubitValue,
        interception: Option<Interception>,
    ) -> Self {
        Self { sender_basis, sender_value, receiver_basis, receiver_value, interception }
    }

    /// Inserts a freshly drawn eavesdropper measurement and re-measures the
    /// receiver's value from it. The receiver's basis is kept.
    ///
    /// Any previous interception is replaced.
    pub(crate) fn intercept<E: Environment>(&mut self, env: &E) -> Result<(), EntropyError> {
        let basis = channel::draw_basis(env)?;
        let value = channel::measure(env, self.sender_value, self.sender_basis, basis)?;
        let receiver_value = channel::measure(env, value, basis, self.receiver_basis)?;

        self.interception = Some(Interception { basis, value });
        self.receiver_value = receiver_value;
        Ok(())
    }

    /// Removes the eavesdropper and re-measures the receiver's value directly
    /// from the sender's preparation.
    pub(crate) fn clear_interception<E: Environment>(
        &mut self,
        env: &E,
    ) -> Result<(), EntropyError> {
        let receiver_value =
            channel::measure(env, self.sender_value, self.sender_basis, self.receiver_basis)?;

        self.interception = None;
        self.receiver_value = receiver_value;
        Ok(())
    }

    /// Basis the sender prepared in.
    pub fn sender_basis(&self) -> Basis {
        self.sender_basis
    }

    /// Value the sender prepared.
    pub fn sender_value(&self) -> QubitValue {
        self.sender_value
    }

    /// Basis the receiver measured in.
    pub fn receiver_basis(&self) -> Basis {
        self.receiver_basis
    }

    /// Value the receiver observed.
    pub fn receiver_value(&self) -> QubitValue {
        self.receiver_value
    }

    /// Eavesdropper measurement, if one sits in the causal chain.
    pub fn interception(&self) -> Option<Interception> {
        self.interception
    }

    /// Eavesdropper basis, present iff intercepted.
    pub fn eavesdropper_basis(&self) -> Option<Basis> {
        self.interception.map(|i| i.basis)
    }

    /// Eavesdropper value, present iff intercepted.
    pub fn eavesdropper_value(&self) -> Option<QubitValue> {
        self.interception.map(|i| i.value)
    }

    /// Whether an eavesdropper measured this photon.
    pub fn intercepted(&self) -> bool {
        self.interception.is_some()
    }

    /// Whether sender and receiver chose the same basis.
    pub fn bases_match(&self) -> bool {
        self.sender_basis == self.receiver_basis
    }

    /// Key bit this record contributes after sifting.
    pub fn key_bit(&self) -> Option<bool> {
        self.bases_match().then(|| self.sender_value.key_bit())
    }

    /// Whether the receiver's value disagrees with the sender's on a sifted
    /// position.
    pub fn is_sifted_error(&self) -> bool {
        self.bases_match() && self.receiver_value != self.sender_value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedEnv;

    #[test]
    fn matching_bases_without_eavesdropper_correlate_perfectly() {
        // sender Rectilinear/Zero, receiver Rectilinear
        let env = ScriptedEnv::new([0, 0, 0]);

        let record = TransmissionRecord::transmit(&env, false).unwrap();

        assert!(record.bases_match());
        assert!(!record.intercepted());
        assert_eq!(record.receiver_value(), QubitValue::Zero);
        assert_eq!(record.key_bit(), Some(false));
        assert_eq!(env.remaining(), 0);
    }

    #[test]
    fn mismatched_bases_draw_receiver_value() {
        // sender Diagonal/Minus, receiver Rectilinear, collapse to Plus
        let env = ScriptedEnv::new([1, 1, 0, 2]);

        let record = TransmissionRecord::transmit(&env, false).unwrap();

        assert_eq!(record.sender_basis(), Basis::Diagonal);
        assert_eq!(record.sender_value(), QubitValue::Minus);
        assert!(!record.bases_match());
        assert_eq!(record.receiver_value(), QubitValue::Plus);
        assert_eq!(record.key_bit(), None);
    }

    #[test]
    fn eavesdropper_in_wrong_basis_can_corrupt_sifted_bit() {
        // sender Rectilinear/Zero, receiver Rectilinear, eve Diagonal,
        // eve collapses to Minus, receiver collapses to One
        let env = ScriptedEnv::new([0, 0, 0, 1, 3, 1]);

        let record = TransmissionRecord::transmit(&env, true).unwrap();

        assert!(record.intercepted());
        assert_eq!(record.eavesdropper_basis(), Some(Basis::Diagonal));
        assert_eq!(record.eavesdropper_value(), Some(QubitValue::Minus));
        assert_eq!(record.receiver_value(), QubitValue::One);
        assert!(record.is_sifted_error());
        assert_eq!(record.key_bit(), Some(false));
    }

    #[test]
    fn eavesdropper_in_right_basis_is_invisible() {
        // sender Diagonal/Plus, receiver Diagonal, eve Diagonal
        let env = ScriptedEnv::new([1, 0, 1, 1]);

        let record = TransmissionRecord::transmit(&env, true).unwrap();

        assert_eq!(record.eavesdropper_value(), Some(QubitValue::Plus));
        assert_eq!(record.receiver_value(), QubitValue::Plus);
        assert!(!record.is_sifted_error());
    }

    #[test]
    fn clearing_interception_restores_direct_chain() {
        let env = ScriptedEnv::new([0, 1, 0, 1, 0, 0]);
        let mut record = TransmissionRecord::transmit(&env, true).unwrap();
        assert!(record.intercepted());

        record.clear_interception(&env).unwrap();

        assert!(!record.intercepted());
        assert_eq!(record.eavesdropper_basis(), None);
        assert_eq!(record.eavesdropper_value(), None);
        assert_eq!(record.receiver_value(), QubitValue::One);
    }

    #[test]
    fn intercept_keeps_receiver_basis() {
        let env = ScriptedEnv::new([1, 0, 0, 3]);
        let mut record = TransmissionRecord::transmit(&env, false).unwrap();
        let receiver_basis = record.receiver_basis();

        env.push([0, 0]);
        record.intercept(&env).unwrap();

        assert_eq!(record.receiver_basis(), receiver_basis);
        assert!(record.intercepted());
    }
}
