/// A person known to the incident management system.
///
/// The handle is the unique, session-stable identifier. The display name is
/// `None` for placeholder entries constructed when the server references a
/// handle that is not yet present in local reference data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ranger {
    pub handle: String,
    pub name: Option<String>,
}

impl Ranger {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: Some(name.into()),
        }
    }

    /// A ranger known only by handle.
    pub fn placeholder(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: None,
        }
    }

    /// The display name, falling back to the handle.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handle)
    }
}

impl std::fmt::Display for Ranger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.handle),
            None => f.write_str(&self.handle),
        }
    }
}
