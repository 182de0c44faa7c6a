//! Measurement bases and polarization symbols.

use std::fmt;

/// Measurement frame used to prepare or measure a photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    /// Horizontal/vertical polarization (`+`).
    Rectilinear,
    /// 45°/135° polarization (`×`).
    Diagonal,
}

impl Basis {
    /// Both bases, in draw order.
    pub const ALL: [Self; 2] = [Self::Rectilinear, Self::Diagonal];

    /// The two symbols that can be prepared in this basis, logical 0 first.
    pub const fn values(self) -> [QubitValue; 2] {
        match self {
            Self::Rectilinear => [QubitValue::Zero, QubitValue::One],
            Self::Diagonal => [QubitValue::Plus, QubitValue::Minus],
        }
    }

    /// Glyph used when displaying the basis.
    pub const fn glyph(self) -> char {
        match self {
            Self::Rectilinear => '+',
            Self::Diagonal => '×',
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Simulated polarization state of a single photon.
///
/// `Zero`/`One` belong to the rectilinear basis and `Plus`/`Minus` to the
/// diagonal one. The type does not enforce that pairing; values are always
/// produced together with the basis they were prepared or measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QubitValue {
    /// Horizontal, 0°.
    Zero,
    /// Vertical, 90°.
    One,
    /// Diagonal, 45°.
    Plus,
    /// Anti-diagonal, 135°.
    Minus,
}

impl QubitValue {
    /// All four symbols. An incompatible measurement draws uniformly from this
    /// table.
    pub const ALL: [Self; 4] = [Self::Zero, Self::One, Self::Plus, Self::Minus];

    /// Logical key bit carried by this symbol, independent of basis.
    ///
    /// `Zero` and `Plus` encode 0, `One` and `Minus` encode 1.
    pub const fn key_bit(self) -> bool {
        matches!(self, Self::One | Self::Minus)
    }

    /// Basis this symbol belongs to.
    pub const fn basis(self) -> Basis {
        match self {
            Self::Zero | Self::One => Basis::Rectilinear,
            Self::Plus | Self::Minus => Basis::Diagonal,
        }
    }

    /// Polarization angle in degrees.
    pub const fn angle_degrees(self) -> u16 {
        match self {
            Self::Zero => 0,
            Self::One => 90,
            Self::Plus => 45,
            Self::Minus => 135,
        }
    }

    /// Arrow glyph for the polarization direction.
    pub const fn arrow(self) -> char {
        match self {
            Self::Zero => '→',
            Self::One => '↑',
            Self::Plus => '↗',
            Self::Minus => '↖',
        }
    }
}

impl fmt::Display for QubitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arrow())
    }
}
