//! Text rendering of sessions and controller actions.
//!
//! Everything writes to a caller-supplied `Write` so the binary can target
//! stdout and tests can target a buffer.

use std::io::{self, Write};

use bb84_core::{ControllerAction, SessionSnapshot, TRANSMISSIONS_PER_SESSION, TransmissionRecord};

const COLUMN: usize = 10;

/// Record table: one row per transmission, eavesdropper columns only while
/// the eavesdropper is enabled.
pub fn write_table<W: Write>(out: &mut W, snapshot: &SessionSnapshot) -> io::Result<()> {
    if snapshot.records.is_empty() {
        return writeln!(out, "(no transmissions yet)");
    }

    let eve = snapshot.eavesdropper_enabled;
    let mut header = vec!["Bit #", "Alice", "A basis"];
    if eve {
        header.extend(["Eve basis", "Eve meas"]);
    }
    header.extend(["B basis", "Bob meas", "Match", "Key bit"]);

    for title in &header {
        write!(out, "{title:<COLUMN$}")?;
    }
    writeln!(out)?;

    for (index, record) in snapshot.records.iter().enumerate() {
        write_row(out, index, record, eve)?;
    }
    Ok(())
}

fn write_row<W: Write>(
    out: &mut W,
    index: usize,
    record: &TransmissionRecord,
    eve: bool,
) -> io::Result<()> {
    write!(out, "{:<COLUMN$}", index + 1)?;
    write!(out, "{:<COLUMN$}", record.sender_value().to_string())?;
    write!(out, "{:<COLUMN$}", record.sender_basis().to_string())?;
    if eve {
        let basis = record.eavesdropper_basis().map_or_else(|| "-".to_string(), |b| b.to_string());
        let value = record.eavesdropper_value().map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(out, "{basis:<COLUMN$}{value:<COLUMN$}")?;
    }
    write!(out, "{:<COLUMN$}", record.receiver_basis().to_string())?;
    write!(out, "{:<COLUMN$}", record.receiver_value().to_string())?;
    write!(out, "{:<COLUMN$}", if record.bases_match() { "yes" } else { "no" })?;
    writeln!(out, "{}", key_bit(record.key_bit()))
}

/// Progress bar, key, and error statistics.
pub fn write_summary<W: Write>(out: &mut W, snapshot: &SessionSnapshot) -> io::Result<()> {
    let stats = &snapshot.stats;
    let done = stats.transmitted;
    let bar: String =
        (0..TRANSMISSIONS_PER_SESSION).map(|i| if i < done { '#' } else { '.' }).collect();

    writeln!(
        out,
        "[{bar}] {done}/{} ({:.1}%) {}",
        stats.total,
        snapshot.progress_fraction * 100.0,
        snapshot.state
    )?;
    writeln!(
        out,
        "eavesdropper: {}",
        if snapshot.eavesdropper_enabled { "on" } else { "off" }
    )?;
    writeln!(out, "matched bases: {}", snapshot.matched_count)?;
    if snapshot.sifted_key.is_empty() {
        writeln!(out, "key: (none yet)")?;
    } else {
        writeln!(out, "key: {} ({} bits)", snapshot.sifted_key, snapshot.sifted_key.len())?;
    }
    writeln!(
        out,
        "intercepted: {}  disagreements: {}  error rate: {:.1}%",
        stats.intercepted,
        stats.disagreements,
        stats.qber * 100.0
    )
}

/// One line describing an action, as it happens.
pub fn write_action<W: Write>(out: &mut W, action: &ControllerAction) -> io::Result<()> {
    match action {
        ControllerAction::Transmitted { index, record } => writeln!(
            out,
            "bit {}: alice {} in {}, bob measures {} in {}{}",
            index + 1,
            record.sender_value(),
            record.sender_basis(),
            record.receiver_value(),
            record.receiver_basis(),
            if record.bases_match() { " (match)" } else { "" }
        ),
        ControllerAction::StateChanged { from, to } => {
            writeln!(out, "{from} -> {to}")
        },
        ControllerAction::Reset { discarded } => {
            writeln!(out, "reset, {discarded} transmissions discarded")
        },
        ControllerAction::Recomputed { enabled, records } => writeln!(
            out,
            "eavesdropper {}, {records} transmissions recomputed",
            if *enabled { "on" } else { "off" }
        ),
        ControllerAction::Ignored { reason } => writeln!(out, "ignored: {reason}"),
    }
}

fn key_bit(bit: Option<bool>) -> char {
    match bit {
        Some(true) => '1',
        Some(false) => '0',
        None => '-',
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bb84_core::{Basis, Interception, QubitValue, Session, SessionState};

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn matched_record() -> TransmissionRecord {
        TransmissionRecord::from_parts(
            Basis::Diagonal,
            QubitValue::Minus,
            Basis::Diagonal,
            QubitValue::Minus,
            None,
        )
    }

    #[test]
    fn empty_session_has_placeholder() {
        let snapshot = SessionSnapshot::of(&Session::new(false));

        let text = render(|out| write_table(out, &snapshot));

        assert_eq!(text, "(no transmissions yet)\n");
    }

    #[test]
    fn table_rows_show_glyphs_and_key_bit() {
        let mut snapshot = SessionSnapshot::of(&Session::new(false));
        snapshot.records.push(matched_record());

        let text = render(|out| write_table(out, &snapshot));
        let row = text.lines().nth(1).unwrap();

        assert!(!text.contains("Eve"));
        assert!(row.starts_with('1'));
        assert!(row.contains('↖'));
        assert!(row.contains('×'));
        assert!(row.contains("yes"));
        assert!(row.trim_end().ends_with('1'));
    }

    #[test]
    fn eavesdropper_columns_appear_when_enabled() {
        let mut snapshot = SessionSnapshot::of(&Session::new(true));
        snapshot.records.push(TransmissionRecord::from_parts(
            Basis::Rectilinear,
            QubitValue::Zero,
            Basis::Diagonal,
            QubitValue::One,
            Some(Interception { basis: Basis::Rectilinear, value: QubitValue::Zero }),
        ));

        let text = render(|out| write_table(out, &snapshot));

        assert!(text.lines().next().unwrap().contains("Eve basis"));
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("no"));
        assert!(row.trim_end().ends_with('-'));
    }

    #[test]
    fn summary_reports_progress_and_key() {
        let snapshot = SessionSnapshot::of(&Session::new(false));

        let text = render(|out| write_summary(out, &snapshot));

        assert!(text.starts_with("[........] 0/8 (0.0%) idle"));
        assert!(text.contains("key: (none yet)"));
        assert!(text.contains("error rate: 0.0%"));
    }

    #[test]
    fn actions_render_one_line_each() {
        let action = ControllerAction::StateChanged {
            from: SessionState::Idle,
            to: SessionState::Running,
        };

        assert_eq!(render(|out| write_action(out, &action)), "idle -> running\n");
        assert_eq!(
            render(|out| write_action(out, &ControllerAction::Reset { discarded: 3 })),
            "reset, 3 transmissions discarded\n"
        );
    }
}
