//! Edge case tests for pn-par

#[cfg(test)]
mod tests {
    use crate::value::{parse, Value};
    use pn_util::{Error, ErrorCode};

    fn ok(input: &str) -> Value {
        match parse(input.as_bytes()) {
            Ok(value) => value,
            Err(error) => panic!("{input:?} failed to parse: {error}"),
        }
    }

    fn fails(input: &str, code: ErrorCode, lineno: usize, column: usize) {
        assert_eq!(
            parse(input.as_bytes()),
            Err(Error::new(code, lineno, column)),
            "{input:?}"
        );
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_deep_short_nesting_hits_limit() {
        // Bracketed nesting consumes the same bounded stack.
        let deep = format!("{}0{}", "[".repeat(80), "]".repeat(80));
        match parse(deep.as_bytes()) {
            Err(error) => assert_eq!(error.code, ErrorCode::Recursion),
            Ok(value) => panic!("unexpectedly parsed: {value:?}"),
        }

        let shallow = format!("{}0{}", "[".repeat(20), "]".repeat(20));
        assert!(parse(shallow.as_bytes()).is_ok());
    }

    #[test]
    fn test_edge_unknown_word_is_lexical() {
        // A bare word inside a short map fails in the lexer, before the
        // parser can object about the missing colon.
        fails("{key}", ErrorCode::BadWord, 1, 2);
    }

    #[test]
    fn test_edge_blank_lines_between_siblings() {
        assert_eq!(
            ok("* 1\n\n* 2\n\n\n* 3\n"),
            Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            ok("a: 1\n   \nb: 2\n"),
            Value::map(vec![("a", Value::Int(1)), ("b", Value::Int(2))])
        );
    }

    #[test]
    fn test_edge_wide_indent_steps() {
        // Indent width is free; only consistency matters.
        assert_eq!(
            ok("a:\n        b:\n                c: 1\n"),
            Value::map(vec![(
                "a",
                Value::map(vec![("b", Value::map(vec![("c", Value::Int(1))]))]),
            )])
        );
    }

    #[test]
    fn test_edge_star_block_with_indented_values() {
        assert_eq!(
            ok("* > line one\n  > line two\n* 2\n"),
            Value::array(vec![Value::from("line one line two\n"), Value::Int(2)])
        );
    }

    #[test]
    fn test_edge_empty_string_forms() {
        assert_eq!(ok("\"\""), Value::from(""));
        assert_eq!(ok("!"), Value::from(""));
        assert_eq!(ok("[\"\"]"), Value::array(vec![Value::from("")]));
    }

    #[test]
    fn test_edge_nan_compares_equal() {
        assert_eq!(ok("nan"), Value::Float(f64::NAN));
        assert_eq!(
            ok("[nan, inf, -inf]"),
            Value::array(vec![
                Value::Float(f64::NAN),
                Value::Float(f64::INFINITY),
                Value::Float(f64::NEG_INFINITY),
            ])
        );
    }

    #[test]
    fn test_edge_signed_zero_floats() {
        match ok("-0.0") {
            Value::Float(f) => assert!(f == 0.0 && f.is_sign_negative()),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_edge_quoted_keys_with_escapes() {
        assert_eq!(
            ok("\"a\\tb\": 1\n"),
            Value::map(vec![("a\tb", Value::Int(1))])
        );
        assert_eq!(
            ok("{\"\\u0041\": 1}"),
            Value::map(vec![("A", Value::Int(1))])
        );
    }

    #[test]
    fn test_edge_error_positions_after_blank_lines() {
        // The layout-token error rule points into the last non-blank line.
        fails("one:\n1", ErrorCode::Long, 1, 5);
    }

    #[test]
    fn test_edge_tab_indented_blocks() {
        assert_eq!(
            ok("a:\n\tb: 1\n"),
            Value::map(vec![("a", Value::map(vec![("b", Value::Int(1))]))])
        );
    }
}
