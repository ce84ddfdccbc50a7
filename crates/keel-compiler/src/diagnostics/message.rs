use rowan::TextRange;

/// User-facing compile errors raised while locating the entry point.
///
/// Codegen reports at most one of these per run, then stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    NoMainClass,
    MainNotAClass,
    MainClassIsGeneric,
    NoMainMethod,
    InvalidMainSignature,
    MainWithoutBody,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::NoMainClass => "no main class",
            Self::MainNotAClass => "main not a class",
            Self::MainClassIsGeneric => "main class is generic",
            Self::NoMainMethod => "no main method",
            Self::InvalidMainSignature => "invalid main signature",
            Self::MainWithoutBody => "main method has no body",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::NoMainClass => "no main class: {}".to_string(),
            _ => format!("{}; {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Declaration the diagnostic is anchored at. `None` when there is
    /// nothing to point at (e.g. a missing class).
    pub(crate) range: Option<TextRange>,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, range: Option<TextRange>) -> Self {
        Self {
            kind,
            range,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.range {
            Some(range) => write!(
                f,
                "{} at {}..{}: {}",
                self.severity(),
                u32::from(range.start()),
                u32::from(range.end()),
                self.message
            )?,
            None => write!(f, "{}: {}", self.severity(), self.message)?,
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}
