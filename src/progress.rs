use std::fmt;

/// Named stage of an analysis run, reported alongside progress counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Indexing,
    Analyzing,
    DetectingCycles,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Indexing => "indexing",
            Phase::Analyzing => "analyzing",
            Phase::DetectingCycles => "detecting cycles",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback: `(completed, total, phase)`.
pub type ProgressFn<'a> = dyn Fn(usize, usize, Phase) + Send + Sync + 'a;
