use std::fmt;

/// Machine-readable error codes shared by every forge crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidEnumValue,
    DuplicateNode,
    DanglingEdge,
    InvalidViewport,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidEnumValue => "E1002",
            Self::DuplicateNode => "E2002",
            Self::DanglingEdge => "E2003",
            Self::InvalidViewport => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidEnumValue => "Invalid kind/status/direction value",
            Self::DuplicateNode => "Duplicate node id in layout request",
            Self::DanglingEdge => "Edge references a node outside the layout",
            Self::InvalidViewport => "Viewport dimensions are not finite",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for the host application.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .forge/config.toml and retry."),
            Self::InvalidEnumValue => Some("Use one of the documented lowercase values."),
            Self::DuplicateNode => Some("Each node id may appear once in a layout request."),
            Self::DanglingEdge => {
                Some("Run the graph through `filter` with the visible ids before layout.")
            }
            Self::InvalidViewport => Some("Pass finite, non-negative viewport dimensions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
