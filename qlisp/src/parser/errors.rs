use pest::iterators::Pair;
use std::fmt;

/// Line/column range of a piece of source text (1-based, as pest reports it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub source_text: Option<String>,
}

impl SourceSpan {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            source_text: None,
        }
    }

    pub fn with_source_text(mut self, source_text: String) -> Self {
        self.source_text = Some(source_text);
        self
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

// Helper function to convert pest span to our SourceSpan
pub fn pest_span_to_source_span(span: pest::Span) -> SourceSpan {
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    SourceSpan::new(start_line, start_column, end_line, end_column)
        .with_source_text(span.as_str().to_string())
}

// Helper function to create SourceSpan from a Pair
pub fn pair_to_source_span(pair: &Pair<super::Rule>) -> SourceSpan {
    pest_span_to_source_span(pair.as_span())
}

#[derive(Debug)]
pub enum PestParseError {
    UnexpectedRule {
        expected: String,
        found: String,
        span: Option<SourceSpan>,
    },
    MissingToken {
        token: String,
        span: Option<SourceSpan>,
    },
    PestError(pest::error::Error<super::Rule>),
}

impl From<pest::error::Error<super::Rule>> for PestParseError {
    fn from(err: pest::error::Error<super::Rule>) -> Self {
        PestParseError::PestError(err)
    }
}

impl PestParseError {
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            PestParseError::UnexpectedRule { span, .. } => span.clone(),
            PestParseError::MissingToken { span, .. } => span.clone(),
            PestParseError::PestError(err) => pest_error_location_to_source_span(err),
        }
    }
}

impl fmt::Display for PestParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PestParseError::UnexpectedRule {
                expected, found, ..
            } => write!(f, "Expected {}, found {}", expected, found),
            PestParseError::MissingToken { token, .. } => {
                write!(f, "Missing required token: {}", token)
            }
            // pest already renders the offending line with a caret
            PestParseError::PestError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PestParseError {}

// Helper function to convert pest::error::Error location to SourceSpan
pub fn pest_error_location_to_source_span(
    error: &pest::error::Error<super::Rule>,
) -> Option<SourceSpan> {
    match error.line_col {
        pest::error::LineColLocation::Pos((line, col)) => {
            let text = error.variant.message().to_string();
            Some(SourceSpan::new(line, col, line, col).with_source_text(text))
        }
        pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
            let text = error.variant.message().to_string();
            Some(SourceSpan::new(start_line, start_col, end_line, end_col).with_source_text(text))
        }
    }
}
