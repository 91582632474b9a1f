/// Incident priority.
///
/// The wire encoding is an integer in 1..=5. Servers may send any value in
/// that range; 1-2 map to high, 3 to normal, 4-5 to low. Outgoing values are
/// always the canonical 1/3/5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncidentPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl IncidentPriority {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Canonical integer used on the wire.
    pub fn as_wire(&self) -> i64 {
        match self {
            Self::High => 1,
            Self::Normal => 3,
            Self::Low => 5,
        }
    }

    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            1 | 2 => Some(Self::High),
            3 => Some(Self::Normal),
            4 | 5 => Some(Self::Low),
            _ => None,
        }
    }

    pub const ALL: [IncidentPriority; 3] = [Self::High, Self::Normal, Self::Low];
}

impl std::fmt::Display for IncidentPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
