//! Read-only views for the presentation layer.

use crate::{
    record::TransmissionRecord,
    session::{Session, SessionState, SiftedKey, TRANSMISSIONS_PER_SESSION},
};

/// Aggregate counters over a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// Records transmitted so far.
    pub transmitted: usize,
    /// Records in a complete session.
    pub total: usize,
    /// Records whose bases agree.
    pub matched: usize,
    /// Records with an eavesdropper measurement.
    pub intercepted: usize,
    /// Sifted positions where the receiver's value differs from the sender's.
    pub disagreements: usize,
    /// `disagreements / matched`, or 0.0 when nothing is sifted.
    pub qber: f64,
}

impl SessionStats {
    /// Compute the counters for `session`.
    #[allow(clippy::cast_precision_loss)]
    pub fn of(session: &Session) -> Self {
        let records = session.records();
        let matched = session.matched_count();
        let intercepted = records.iter().filter(|r| r.intercepted()).count();
        let disagreements = records.iter().filter(|r| r.is_sifted_error()).count();
        let qber = if matched > 0 { disagreements as f64 / matched as f64 } else { 0.0 };

        Self {
            transmitted: records.len(),
            total: TRANSMISSIONS_PER_SESSION,
            matched,
            intercepted,
            disagreements,
            qber,
        }
    }
}

/// Owned copy of everything the presentation layer displays.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Records in transmission order.
    pub records: Vec<TransmissionRecord>,
    /// Lifecycle state.
    pub state: SessionState,
    /// Eavesdropper flag.
    pub eavesdropper_enabled: bool,
    /// Fraction transmitted, in `[0, 1]`.
    pub progress_fraction: f64,
    /// Records whose bases agree.
    pub matched_count: usize,
    /// Key bits kept after sifting.
    pub sifted_key: SiftedKey,
    /// Aggregate counters.
    pub stats: SessionStats,
}

impl SessionSnapshot {
    /// Copy the observable state of `session`.
    pub fn of(session: &Session) -> Self {
        Self {
            records: session.records().to_vec(),
            state: session.state(),
            eavesdropper_enabled: session.eavesdropper_enabled(),
            progress_fraction: session.progress_fraction(),
            matched_count: session.matched_count(),
            sifted_key: session.sifted_key().clone(),
            stats: SessionStats::of(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        qubit::{Basis, QubitValue},
        record::Interception,
    };

    fn session_with(records: Vec<TransmissionRecord>) -> Session {
        let mut session = Session::new(false);
        for record in records {
            session.push_for_test(record);
        }
        session
    }

    #[test]
    fn empty_session_has_zero_error_rate() {
        let stats = SessionStats::of(&Session::new(true));

        assert_eq!(stats.transmitted, 0);
        assert_eq!(stats.total, 8);
        assert!(stats.qber.abs() < f64::EPSILON);
    }

    #[test]
    fn error_rate_counts_sifted_disagreements_only() {
        let eve = Some(Interception { basis: Basis::Diagonal, value: QubitValue::Plus });
        let session = session_with(vec![
            // sifted, corrupted by eve
            TransmissionRecord::from_parts(
                Basis::Rectilinear,
                QubitValue::Zero,
                Basis::Rectilinear,
                QubitValue::One,
                eve,
            ),
            // sifted, clean
            TransmissionRecord::from_parts(
                Basis::Diagonal,
                QubitValue::Minus,
                Basis::Diagonal,
                QubitValue::Minus,
                None,
            ),
            // not sifted, disagreement does not count
            TransmissionRecord::from_parts(
                Basis::Diagonal,
                QubitValue::Minus,
                Basis::Rectilinear,
                QubitValue::Zero,
                None,
            ),
        ]);

        let stats = SessionStats::of(&session);

        assert_eq!(stats.matched, 2);
        assert_eq!(stats.intercepted, 1);
        assert_eq!(stats.disagreements, 1);
        assert!((stats.qber - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_copies_key_and_progress() {
        let session = session_with(vec![TransmissionRecord::from_parts(
            Basis::Diagonal,
            QubitValue::Minus,
            Basis::Diagonal,
            QubitValue::Minus,
            None,
        )]);

        let snapshot = SessionSnapshot::of(&session);

        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.sifted_key.to_string(), "1");
        assert_eq!(snapshot.matched_count, 1);
        assert!((snapshot.progress_fraction - 0.125).abs() < f64::EPSILON);
    }
}
