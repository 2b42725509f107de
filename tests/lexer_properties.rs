//! Property tests for the lexer front end.

use proptest::prelude::*;

use htmy::lexer::expression::tokenize_expression;
use htmy::{parse, tokenize, Error, SyntaxNode, TokenKind};

const EXPRESSION_KEYWORDS: [&str; 4] = ["if", "null", "true", "false"];

proptest! {
    #[test]
    fn identifier_runs_lex_to_a_single_token(name in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
        prop_assume!(!EXPRESSION_KEYWORDS.contains(&name.as_str()));

        let tokens = tokenize_expression(&name);

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::ExprIdentifier);
        prop_assert_eq!(&tokens[0].text, &name);
    }

    #[test]
    fn digit_runs_lex_to_a_single_token(digits in "[0-9]{1,9}") {
        let tokens = tokenize_expression(&digits);

        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::ExprNumber);
        prop_assert_eq!(&tokens[0].text, &digits);
    }

    #[test]
    fn tokenizing_arbitrary_input_never_panics(source in ".{0,200}") {
        // any outcome is fine, the scanner just must not blow up
        let _ = tokenize(&source);
    }

    #[test]
    fn plain_text_survives_an_element_round_trip(text in "[a-zA-Z0-9 .,!?']{1,40}") {
        let source = format!("<p>{text}</p>");

        let tokens = tokenize(&source).unwrap();
        let tree = parse(&tokens).unwrap();

        let SyntaxNode::Children(children) = tree else {
            panic!("expected children root");
        };
        let SyntaxNode::Element(element) = &children.nodes[0] else {
            panic!("expected element");
        };
        let child = &element.children.as_ref().unwrap().nodes[0];

        prop_assert!(matches!(child, SyntaxNode::Text(t) if t.text == text));
    }

    #[test]
    fn straddling_open_brace_is_a_hard_error(filler in "[a-z ]{0,20}") {
        let source = format!("{{{filler}");
        prop_assert!(matches!(tokenize(&source), Err(Error::UnclosedBraces)));
    }

    #[test]
    fn keyword_parens_without_close_are_a_hard_error(filler in "[a-z ]{0,20}") {
        let source = format!("@if ({filler}");
        prop_assert!(matches!(tokenize(&source), Err(Error::UnclosedParens)));
    }
}
