pub mod incident;
pub mod location;
pub mod priority;
pub mod ranger;
pub mod report_entry;
pub mod state;

pub use incident::Incident;
pub use location::Location;
pub use priority::IncidentPriority;
pub use ranger::Ranger;
pub use report_entry::ReportEntry;
pub use state::IncidentState;
