use crate::value::Value;

impl Value {
    /// Canonical cross-variant rank.
    ///
    /// Mixed-variant comparisons order by rank alone; same-rank pairs fall
    /// through to variant-specific comparison. The numbering is part of the
    /// canonical set/map ordering and must stay stable.
    #[must_use]
    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Uint(_) => 3,
            Self::Float32(_) => 4,
            Self::Float64(_) => 5,
            Self::Text(_) => 6,
            Self::Timestamp(_) => 7,
            Self::Date(_) => 8,
            Self::Time(_) => 9,
            Self::Ulid(_) => 10,
            Self::Geo(_) => 11,
            Self::Enum(_) => 12,
            Self::List(_) => 13,
            Self::Set(_) => 14,
            Self::Map(_) => 15,
            Self::Record(_) => 16,
        }
    }
}
