use crate::span::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("Unbound name '{name}'")]
    UnboundName { name: String, span: Span },

    #[error("Unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("Type mismatch: {msg}")]
    TypeMismatch { msg: String, span: Span },

    #[error("Backend error: {msg}")]
    Backend { msg: String },

    #[error("Link error: {msg}")]
    Link { msg: String },
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn unbound_name(name: impl Into<String>, span: Span) -> Self {
        Self::UnboundName { name: name.into(), span }
    }

    pub fn unknown_type(name: impl Into<String>, span: Span) -> Self {
        Self::UnknownType { name: name.into(), span }
    }

    pub fn type_mismatch(msg: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch { msg: msg.into(), span }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend { msg: msg.into() }
    }

    pub fn link(msg: impl Into<String>) -> Self {
        Self::Link { msg: msg.into() }
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(source: &str, _filename: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    let spanned = match err {
        CompileError::Syntax { msg, span } => Some(("syntax error", msg.clone(), *span)),
        CompileError::UnboundName { name, span } => Some((
            "unbound name",
            format!("'{name}' is not defined in this scope or any enclosing scope"),
            *span,
        )),
        CompileError::UnknownType { name, span } => Some((
            "unknown type",
            format!("'{name}' is not a sized integer type"),
            *span,
        )),
        CompileError::TypeMismatch { msg, span } => Some(("type mismatch", msg.clone(), *span)),
        CompileError::Backend { msg } | CompileError::Link { msg } => {
            eprintln!("error: {msg}");
            None
        }
    };

    if let Some((kind, msg, span)) = spanned {
        Report::build(ReportKind::Error, (), span.start)
            .with_message(kind)
            .with_label(Label::new(span.start..span.end).with_message(msg))
            .finish()
            .eprint(Source::from(source))
            .unwrap();
    }
}
