#[cfg(test)]
mod scanner_tests {
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_keywords_and_operators() {
        assert_token_sequence(
            "fun f(a) { return a >= 1 and !nil; }",
            &[
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "f"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::RETURN, "return"),
                (TokenType::IDENTIFIER, "a"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::NUMBER(0.0), "1"),
                (TokenType::AND, "and"),
                (TokenType::BANG, "!"),
                (TokenType::NIL, "nil"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_comments_and_lines() {
        let (tokens, errors) = scan_tokens("// first\nvar x = 1; // trailing\n\"a\nb\"");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].token_type, TokenType::VAR);
        assert_eq!(tokens[0].line, 2);

        let string = &tokens[5];
        assert_eq!(string.token_type, TokenType::STRING(String::new()));
        assert_eq!(string.line, 4);
        if let TokenType::STRING(s) = &string.token_type {
            assert_eq!(s, "a\nb");
        }
    }

    #[test]
    fn test_number_literals() {
        let (tokens, _) = scan_tokens("12.5 7 3.");

        let values: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            values,
            vec![
                "NUMBER 12.5 12.5",
                "NUMBER 7 7.0",
                "NUMBER 3 3.0",
                "DOT . null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = scan_tokens("\"abc");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unterminated string.");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }

        fn assert_token_matches(
            result: &rox::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_non_ascii_character_is_skipped_whole() {
        let (tokens, errors) = scan_tokens("é;");

        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::SEMICOLON);
    }
}
