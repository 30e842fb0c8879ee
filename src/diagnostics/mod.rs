use crate::span::Span;
use thiserror::Error;

/// Why a module failed validation. Validation is fail-fast, so a failed
/// pass produces exactly one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Module shape: directive, section order, parameter count, export clause.
    #[error("structural error: {msg}")]
    Structural { msg: String, span: Option<Span> },

    /// Duplicate, illegal or unbound names.
    #[error("binding error: {msg}")]
    Binding { msg: String, span: Option<Span> },

    #[error("type error: {msg}")]
    Type { msg: String, span: Option<Span> },

    /// Out-of-range literals, table lengths and bounds masks.
    #[error("range error: {msg}")]
    Range { msg: String, span: Option<Span> },

    /// A node kind or operator outside the asm.js grammar.
    #[error("unsupported construct: {msg}")]
    Unsupported { msg: String, span: Option<Span> },

    /// The syntax tree handed to the validator could not be decoded.
    #[error("malformed syntax tree: {msg}")]
    Input { msg: String },

    /// Validator settings could not be loaded.
    #[error("invalid validator configuration: {msg}")]
    Config { msg: String },

    /// A defect in the validator itself rather than in the module.
    #[error("internal validator error: {msg}")]
    Internal { msg: String },
}

impl ValidationError {
    pub fn structural(msg: impl Into<String>, span: Span) -> Self {
        Self::Structural { msg: msg.into(), span: Some(span) }
    }

    pub fn binding(msg: impl Into<String>, span: Span) -> Self {
        Self::Binding { msg: msg.into(), span: Some(span) }
    }

    pub fn type_err(msg: impl Into<String>, span: Span) -> Self {
        Self::Type { msg: msg.into(), span: Some(span) }
    }

    pub fn range(msg: impl Into<String>, span: Span) -> Self {
        Self::Range { msg: msg.into(), span: Some(span) }
    }

    pub fn unsupported(msg: impl Into<String>, span: Span) -> Self {
        Self::Unsupported { msg: msg.into(), span: Some(span) }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input { msg: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config { msg: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal { msg: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural { .. } => ErrorKind::Structural,
            Self::Binding { .. } => ErrorKind::Binding,
            Self::Type { .. } => ErrorKind::Type,
            Self::Range { .. } => ErrorKind::Range,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Input { .. } => ErrorKind::Input,
            Self::Config { .. } => ErrorKind::Config,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Structural { msg, .. }
            | Self::Binding { msg, .. }
            | Self::Type { msg, .. }
            | Self::Range { msg, .. }
            | Self::Unsupported { msg, .. }
            | Self::Input { msg }
            | Self::Config { msg }
            | Self::Internal { msg } => msg,
        }
    }

    /// Location of the offending node. `None` for errors that are not tied
    /// to a node, and for nodes that were built without location data.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Structural { span, .. }
            | Self::Binding { span, .. }
            | Self::Type { span, .. }
            | Self::Range { span, .. }
            | Self::Unsupported { span, .. } => span.filter(|s| !s.is_dummy()),
            Self::Input { .. } | Self::Config { .. } | Self::Internal { .. } => None,
        }
    }

    /// The offending source line followed by a caret under the start column.
    pub fn excerpt(&self, source: &str) -> Option<String> {
        let span = self.span()?;
        let line = source.split('\n').nth(span.start.line as usize - 1)?;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let pad = " ".repeat((span.start.column as usize).min(line.chars().count()));
        Some(format!("{line}\n{pad}^"))
    }

    /// Full terminal report for `source` (no colors).
    pub fn render(&self, source: &str, filename: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let range = self.span().and_then(|s| s.char_range(source));
        let Some(range) = range else {
            return format!("error: {self}\n  --> {filename}\n");
        };

        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (), range.start)
            .with_config(Config::default().with_color(false))
            .with_message(format!("{} error in {filename}", self.kind()))
            .with_label(Label::new(range).with_message(self.message()))
            .finish()
            .write(Source::from(source), &mut out);
        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("error: {self}\n  --> {filename}\n"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Structural,
    Binding,
    Type,
    Range,
    Unsupported,
    Input,
    Config,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Binding => "binding",
            ErrorKind::Type => "type",
            ErrorKind::Range => "range",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Input => "input",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}
