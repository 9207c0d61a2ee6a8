use crate::ast::{Expression, Symbol};
use pest::iterators::{Pair, Pairs};
use pest::Parser;

// Declare submodules
pub mod errors;
pub mod utils;

pub use errors::PestParseError;
use errors::pair_to_source_span;

// Define the parser struct using the grammar file
#[derive(pest_derive::Parser)]
#[grammar = "qlisp.pest"] // Path relative to src/
pub struct QlispParser;

// --- Builders ---

fn build_expression(pair: Pair<Rule>) -> Result<Expression, PestParseError> {
    match pair.as_rule() {
        Rule::number => Ok(Expression::Number(pair.as_str().to_string())),
        Rule::symbol => Ok(Expression::Symbol(Symbol::new(pair.as_str()))),
        Rule::string => Ok(Expression::String(pair.as_str().to_string())),
        Rule::comment => Ok(Expression::Comment(pair.as_str().to_string())),
        Rule::sexpr => Ok(Expression::SExpr(build_children(pair.into_inner())?)),
        Rule::qexpr => Ok(Expression::QExpr(build_children(pair.into_inner())?)),
        rule => Err(PestParseError::UnexpectedRule {
            expected: "expression".to_string(),
            found: format!("{:?}", rule),
            span: Some(pair_to_source_span(&pair)),
        }),
    }
}

fn build_children(pairs: Pairs<Rule>) -> Result<Vec<Expression>, PestParseError> {
    pairs
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(build_expression)
        .collect()
}

// --- Main Parsing Functions ---

/// Parse a full qlisp program into its top-level forms, comments included.
pub fn parse(input: &str) -> Result<Vec<Expression>, PestParseError> {
    let mut pairs = QlispParser::parse(Rule::program, input)?;
    let program = pairs.next().ok_or_else(|| PestParseError::MissingToken {
        token: "program".to_string(),
        span: None,
    })?;
    build_children(program.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(s: &str) -> Expression {
        Expression::Symbol(Symbol::new(s))
    }

    #[test]
    fn test_parse_nested_lists() {
        let forms = parse("(def {add} (\\ {x y} {+ x y}))").expect("should parse");
        assert_eq!(
            forms,
            vec![Expression::SExpr(vec![
                sym("def"),
                Expression::QExpr(vec![sym("add")]),
                Expression::SExpr(vec![
                    sym("\\"),
                    Expression::QExpr(vec![sym("x"), sym("y")]),
                    Expression::QExpr(vec![sym("+"), sym("x"), sym("y")]),
                ]),
            ])]
        );
    }

    #[test]
    fn test_negative_number_versus_minus_symbol() {
        let forms = parse("- -5").unwrap();
        assert_eq!(forms, vec![sym("-"), Expression::Number("-5".to_string())]);
    }

    #[test]
    fn test_strings_and_comments_are_kept_raw() {
        let forms = parse("; a comment\n\"a \\\"quoted\\\" word\"").unwrap();
        assert_eq!(
            forms,
            vec![
                Expression::Comment("; a comment".to_string()),
                Expression::String("\"a \\\"quoted\\\" word\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiple_top_level_forms() {
        let forms = parse("(+ 1 2)\n{3 4}\nx").unwrap();
        assert_eq!(forms.len(), 3);
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        let err = parse("(+ 1 2").unwrap_err();
        assert!(matches!(err, PestParseError::PestError(_)));
        let span = err.span().expect("pest errors carry a location");
        assert_eq!(span.start_line, 1);
        assert!(parse("}").is_err());
    }

    #[test]
    fn test_empty_input_has_no_forms() {
        assert_eq!(parse("   \n").unwrap(), vec![]);
    }
}
