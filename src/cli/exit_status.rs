use std::process::ExitCode;

/// How a CLI invocation ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// The command ran and had something to report (0).
    Success,
    /// The command ran but the vault had nothing to report, e.g. a note without headings (1).
    Failure,
    /// Configuration, API or connection error (2).
    Error,
}

impl ExitStatus {
    /// `Success` when a lookup found anything, `Failure` otherwise.
    pub fn found(found: bool) -> Self {
        if found { Self::Success } else { Self::Failure }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Error => 2,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
