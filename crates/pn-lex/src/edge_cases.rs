//! Edge case tests for pn-lex

#[cfg(test)]
mod tests {
    use crate::{Lexer, TokenKind};
    use pn_util::ErrorCode;

    fn lex_all(source: &[u8]) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        let mut level = 0usize;
        loop {
            let kind = lexer.next_token();
            kinds.push(kind);
            match kind {
                TokenKind::LineIn => level += 1,
                TokenKind::LineOut => {
                    level -= 1;
                    if level == 0 {
                        return kinds;
                    }
                }
                _ => {}
            }
        }
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_source() {
        assert_eq!(lex_all(b""), vec![TokenKind::LineIn, TokenKind::LineOut]);
    }

    #[test]
    fn test_edge_blank_lines_only() {
        assert_eq!(lex_all(b"\n\n\n"), vec![TokenKind::LineIn, TokenKind::LineOut]);
        assert_eq!(lex_all(b"   \n\t\n"), vec![TokenKind::LineIn, TokenKind::LineOut]);
    }

    #[test]
    fn test_edge_no_trailing_newline() {
        assert_eq!(
            lex_all(b"true"),
            vec![TokenKind::LineIn, TokenKind::True, TokenKind::LineOut]
        );
    }

    #[test]
    fn test_edge_eof_keeps_reporting_line_out() {
        let mut lexer = Lexer::new(&b"1\n"[..]);
        assert_eq!(lexer.next_token(), TokenKind::LineIn);
        assert_eq!(lexer.next_token(), TokenKind::Int);
        for _ in 0..8 {
            assert_eq!(lexer.next_token(), TokenKind::LineOut);
        }
    }

    #[test]
    fn test_edge_long_tokens() {
        let digits = "1".repeat(10_000);
        assert_eq!(
            lex_all(digits.as_bytes()),
            vec![TokenKind::LineIn, TokenKind::Int, TokenKind::LineOut]
        );
        let key = format!("{}:", "k".repeat(10_000));
        assert_eq!(
            lex_all(key.as_bytes()),
            vec![TokenKind::LineIn, TokenKind::Key, TokenKind::LineOut]
        );
    }

    #[test]
    fn test_edge_deep_star_nesting() {
        let stars = "*".repeat(500);
        let kinds = lex_all(stars.as_bytes());
        let ins = kinds.iter().filter(|&&k| k == TokenKind::LineIn).count();
        let outs = kinds.iter().filter(|&&k| k == TokenKind::LineOut).count();
        assert_eq!(ins, 500);
        assert_eq!(ins, outs);
    }

    #[test]
    fn test_edge_tab_column_rounding() {
        // A tab always lands on an even column of at least two; one space
        // before a tab reaches the same level as a bare tab.
        assert_eq!(
            lex_all(b"1\n\t2\n \t3\n"),
            vec![
                TokenKind::LineIn,
                TokenKind::Int,
                TokenKind::LineIn,
                TokenKind::Int,
                TokenKind::LineEq,
                TokenKind::Int,
                TokenKind::LineOut,
                TokenKind::LineOut,
            ]
        );
    }

    #[test]
    fn test_edge_error_column_past_line_end() {
        // EOF inside a quoted string points one past the last byte.
        let mut lexer = Lexer::new(&b"\"abc"[..]);
        assert_eq!(lexer.next_token(), TokenKind::LineIn);
        assert_eq!(lexer.next_token(), TokenKind::Error);
        let error = lexer.error();
        assert_eq!(error.code, ErrorCode::StrEol);
        assert_eq!((error.lineno, error.column), (1, 5));
    }

    #[test]
    fn test_edge_crlf_is_a_control_error() {
        let mut lexer = Lexer::new(&b"1\r\n"[..]);
        assert_eq!(lexer.next_token(), TokenKind::LineIn);
        assert_eq!(lexer.next_token(), TokenKind::Int);
        assert_eq!(lexer.next_token(), TokenKind::Error);
        assert_eq!(lexer.error().code, ErrorCode::Ctrl);
    }

    #[test]
    fn test_edge_multibyte_content() {
        let mut lexer = Lexer::new("\"日本語 text\"\n".as_bytes());
        assert_eq!(lexer.next_token(), TokenKind::LineIn);
        assert_eq!(lexer.next_token(), TokenKind::Str);
        assert_eq!(lexer.token_bytes(), "\"日本語 text\"".as_bytes());
    }
}
