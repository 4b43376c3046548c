use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedRule,
    ConfigParseError,
    InputUnreadable,
    CyclicContainment,
    TotalOverflow,
}

impl ErrorCode {
    /// Every code, in catalogue order.
    pub const ALL: [Self; 5] = [
        Self::MalformedRule,
        Self::ConfigParseError,
        Self::InputUnreadable,
        Self::CyclicContainment,
        Self::TotalOverflow,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedRule => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InputUnreadable => "E1003",
            Self::CyclicContainment => "E2001",
            Self::TotalOverflow => "E2002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedRule => "Malformed containment rule",
            Self::ConfigParseError => "Config file parse error",
            Self::InputUnreadable => "Rules input could not be read",
            Self::CyclicContainment => "Cyclic containment",
            Self::TotalOverflow => "Contained total overflowed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedRule => Some(
                "Each line must read `<color> bags contain <n> <color> bag(s), ...` or `... contain no other bags.`",
            ),
            Self::ConfigParseError => Some("Fix syntax in haversack.toml and retry."),
            Self::InputUnreadable => Some("Check the rules file path and read permissions."),
            Self::CyclicContainment => {
                Some("Remove one rule on the reported path so no bag can contain itself.")
            }
            Self::TotalOverflow => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
