use std::fmt;

/// Startup state of the local mirror. Moves forward only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncState {
    #[default]
    Unsynchronized,
    Synchronizing,
    Synchronized,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsynchronized => "Unsynchronized",
            Self::Synchronizing => "Synchronizing",
            Self::Synchronized => "Synchronized",
        };
        write!(f, "{}", name)
    }
}
