/// Lifecycle state of an incident, ordered by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncidentState {
    New,
    OnHold,
    Dispatched,
    OnScene,
    Closed,
}

impl IncidentState {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::OnHold => "on hold",
            Self::Dispatched => "dispatched",
            Self::OnScene => "on scene",
            Self::Closed => "closed",
        }
    }

    /// String used on the wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::OnHold => "on_hold",
            Self::Dispatched => "dispatched",
            Self::OnScene => "on_scene",
            Self::Closed => "closed",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "on_hold" => Some(Self::OnHold),
            "dispatched" => Some(Self::Dispatched),
            "on_scene" => Some(Self::OnScene),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub const ALL: [IncidentState; 5] = [
        Self::New,
        Self::OnHold,
        Self::Dispatched,
        Self::OnScene,
        Self::Closed,
    ];
}

impl std::fmt::Display for IncidentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(IncidentState::New.label(), "new");
        assert_eq!(IncidentState::OnHold.label(), "on hold");
        assert_eq!(IncidentState::Dispatched.label(), "dispatched");
        assert_eq!(IncidentState::OnScene.label(), "on scene");
        assert_eq!(IncidentState::Closed.label(), "closed");
    }

    #[test]
    fn wire_strings_round_trip() {
        for state in IncidentState::ALL {
            assert_eq!(IncidentState::from_wire(state.as_wire()), Some(state));
        }
    }

    #[test]
    fn unknown_wire_string_rejected() {
        assert_eq!(IncidentState::from_wire("resolved"), None);
    }

    #[test]
    fn ordered_by_progression() {
        assert!(IncidentState::New < IncidentState::OnHold);
        assert!(IncidentState::OnScene < IncidentState::Closed);
    }
}
