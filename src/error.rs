use thiserror::Error;

/// A position-annotated error from any of the three pipeline stages.
///
/// `Display` renders `parse_name:line:column: message`, matching the
/// position-reporting contract spec'd for lexical and parse errors;
/// `Exec` additionally embeds the executing template name and node
/// context per spec.md §4.5.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{parse_name}:{line}:{column}: {message}")]
    Lexical {
        parse_name: String,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("{parse_name}:{line}:{column}: {message}")]
    Parse {
        parse_name: String,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("{parse_name}:{line}:{column}: executing {template} at {context}: {message}")]
    Exec {
        parse_name: String,
        line: u32,
        column: u32,
        template: String,
        context: String,
        message: String,
    },

    /// Signals a bug in the engine itself, never a user-triggered condition.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn lexical(parse_name: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Error::Lexical {
            parse_name: parse_name.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn parse(parse_name: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Error::Parse {
            parse_name: parse_name.into(),
            line,
            column,
            message: message.into(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn exec(
        parse_name: impl Into<String>,
        line: u32,
        column: u32,
        template: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Exec {
            parse_name: parse_name.into(),
            line,
            column,
            template: template.into(),
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// Wrap an output-sink failure. The sink contract (spec.md §6)
    /// surfaces write errors to the caller without attempting
    /// recovery; there is no dedicated `Sink` variant since a failed
    /// write is not a template-semantic error, just an I/O failure
    /// the engine can't interpret further.
    pub fn sink(message: impl std::fmt::Display) -> Self {
        Error::Internal(format!("sink error: {message}"))
    }

    /// Clip `s` to 20 characters plus an ellipsis, per spec.md §4.5's
    /// context-rendering rule for executor errors.
    pub fn clip_context(s: &str) -> String {
        const MAX: usize = 20;
        let count = s.chars().count();
        if count <= MAX {
            s.to_string()
        } else {
            let clipped: String = s.chars().take(MAX).collect();
            format!("{clipped}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_parse_position() {
        let e = Error::parse("foo", 3, 7, "unexpected token");
        assert_eq!(e.to_string(), "foo:3:7: unexpected token");
    }

    #[test]
    fn clips_long_context() {
        let s = "this is a very long piece of context text";
        let clipped = Error::clip_context(s);
        assert_eq!(clipped, "this is a very long ...");
    }

    #[test]
    fn keeps_short_context_unclipped() {
        assert_eq!(Error::clip_context("short"), "short");
    }
}
