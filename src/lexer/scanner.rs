//! Scanner: turns source text into a token stream

use std::str::Chars;

use thiserror::Error;

use crate::lexer::token::{LoxLiteral, Token, TokenKind};

mod hidden {
    //! Hides fields of the char reader

    use itertools::{multipeek, MultiPeek};
    use std::str::Chars;

    /// `char` reader that tracks the current lexeme and source line
    pub struct CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        src: MultiPeek<I>,
        line: usize,
        lexeme: String,
    }

    impl<'a> CharReader<Chars<'a>> {
        pub fn new(s: &'a str) -> Self {
            CharReader {
                src: multipeek(s.chars()),
                line: 1,
                lexeme: String::new(),
            }
        }
    }

    impl<I> Iterator for CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        type Item = char;
        fn next(&mut self) -> Option<char> {
            let next = self.src.next();
            if let Some(c) = next {
                self.lexeme.push(c);
                if c == '\n' {
                    self.line += 1;
                }
            }
            next
        }
    }

    impl<I> CharReader<I>
    where
        I: Iterator<Item = char>,
    {
        pub fn line(&self) -> usize {
            self.line
        }

        pub fn lexeme(&self) -> &str {
            &self.lexeme
        }

        pub fn clear_lexeme(&mut self) {
            self.lexeme.clear();
        }

        pub fn peek(&mut self) -> Option<&char> {
            self.src.reset_peek();
            self.src.peek()
        }

        /// Second lookahead; only meaningful right after `peek`
        pub fn peek_next(&mut self) -> Option<&char> {
            self.src.peek()
        }

        /// Advances if the next character is `c`
        pub fn consume_char(&mut self, c: char) -> bool {
            if Some(&c) == self.peek() {
                self.next();
                true
            } else {
                false
            }
        }

        /// Advances while the peeked character matches `predicate`
        pub fn advance_while<P>(&mut self, predicate: P)
        where
            P: Fn(char) -> bool,
        {
            while let Some(&c) = self.peek() {
                if !predicate(c) {
                    return;
                }
                self.next();
            }
        }
    }
}

mod char_ext {
    pub fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }

    pub fn is_alpha(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }

    pub fn is_alphanumeric(c: char) -> bool {
        is_digit(c) || is_alpha(c)
    }
}

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    #[error("Unexpected character, {0}.")]
    UnexpectedCharacter(char, usize),
    #[error("Unterminated string.")]
    UnterminatedString(usize),
}

impl ScanError {
    pub fn line(&self) -> usize {
        match self {
            ScanError::UnexpectedCharacter(_, line) | ScanError::UnterminatedString(line) => *line,
        }
    }
}

pub struct Scanner<'a> {
    chars: self::hidden::CharReader<Chars<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: self::hidden::CharReader::new(src),
        }
    }

    /// Tokenizes the whole source. Always reaches the end and terminates the
    /// stream with exactly one `Eof` token; errors are collected on the side.
    pub fn scan(mut self) -> (Vec<Token>, Vec<ScanError>) {
        let mut tks = Vec::new();
        let mut errs = Vec::new();
        loop {
            match self.next_token() {
                Ok(Some(tk)) => tks.push(tk),
                Ok(None) => break,
                Err(why) => errs.push(why),
            }
        }
        tks.push(Token::new(TokenKind::Eof, "", None, self.chars.line()));

        (tks, errs)
    }

    fn add_context(&self, kind: TokenKind, line: usize) -> Token {
        Token::new(kind, self.chars.lexeme(), None, line)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            self.chars.clear_lexeme();

            let c = match self.chars.next() {
                None => return Ok(None),
                Some(x) => x,
            };
            let line = self.chars.line();

            use TokenKind::*;
            let kind = match c {
                // single character tokens
                '(' => LeftParen,
                ')' => RightParen,
                '{' => LeftBrace,
                '}' => RightBrace,
                ',' => Comma,
                '.' => Dot,
                '-' => Minus,
                '+' => Plus,
                ';' => Semicolon,
                ':' => Colon,
                '?' => Question,
                '*' => Star,

                // one or two character tokens
                '!' => self.scan_cmp('=', BangEq, Bang),
                '=' => self.scan_cmp('=', EqEq, Eq),
                '<' => self.scan_cmp('=', LessEq, Less),
                '>' => self.scan_cmp('=', GreaterEq, Greater),

                // commenting or division
                '/' => match self.scan_slash() {
                    Some(kind) => kind,
                    None => continue,
                },

                // whitespace
                ' ' | '\r' | '\t' | '\n' => continue,

                // literals
                '"' => return self.scan_string(line).map(Some),
                c if char_ext::is_digit(c) => return self.scan_number(line).map(Some),
                c if char_ext::is_alpha(c) => return Ok(Some(self.scan_kwd_or_ident(line))),

                _ => return Err(ScanError::UnexpectedCharacter(c, line)),
            };
            return Ok(Some(self.add_context(kind, line)));
        }
    }

    /// One-character lookahead for `!=`-like operators
    fn scan_cmp(&mut self, expected: char, if_match: TokenKind, if_not: TokenKind) -> TokenKind {
        if self.chars.consume_char(expected) {
            if_match
        } else {
            if_not
        }
    }

    /// Division slash (`Some`) or a line comment consumed up to the next newline (`None`)
    fn scan_slash(&mut self) -> Option<TokenKind> {
        if self.chars.consume_char('/') {
            self.chars.advance_while(|c| c != '\n');
            None
        } else {
            Some(TokenKind::Slash)
        }
    }

    /// No escape sequences; embedded newlines are kept as-is. An unterminated
    /// string reports at the line of the opening quote.
    fn scan_string(&mut self, line: usize) -> Result<Token> {
        loop {
            match self.chars.next() {
                None => return Err(ScanError::UnterminatedString(line)),
                Some('"') => break,
                Some(_) => {}
            }
        }
        let lexeme = self.chars.lexeme().to_string();
        // strip the quotes
        let content = lexeme[1..lexeme.len() - 1].to_string();
        Ok(Token::new(
            TokenKind::Str,
            lexeme,
            Some(LoxLiteral::Str(content)),
            line,
        ))
    }

    // a leading or trailing decimal point is not part of a number
    fn scan_number(&mut self, line: usize) -> Result<Token> {
        self.chars.advance_while(char_ext::is_digit);
        if self.chars.peek() == Some(&'.') {
            match self.chars.peek_next() {
                Some(&c) if char_ext::is_digit(c) => {
                    self.chars.next();
                    self.chars.advance_while(char_ext::is_digit);
                }
                _ => {}
            }
        }

        let lexeme = self.chars.lexeme().to_string();
        let n = lexeme.parse().expect("number lexeme");
        Ok(Token::new(
            TokenKind::Num,
            lexeme,
            Some(LoxLiteral::Num(n)),
            line,
        ))
    }

    fn scan_kwd_or_ident(&mut self, line: usize) -> Token {
        self.chars.advance_while(char_ext::is_alphanumeric);
        use TokenKind::*;
        let kind = match self.chars.lexeme() {
            "and" => And,
            "break" => Break,
            "class" => Class,
            "continue" => Continue,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => Ident,
        };
        self.add_context(kind, line)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{
        scanner::{ScanError, Scanner},
        token::{LoxLiteral, Token, TokenKind},
    };

    fn scan(src: &str) -> (Vec<Token>, Vec<ScanError>) {
        Scanner::new(src).scan()
    }

    fn match_kinds(src: &str, expected: &[TokenKind]) {
        let (tks, errs) = self::scan(src);
        assert!(errs.is_empty(), "unexpected scan errors: {:?}", errs);
        let kinds = tks.iter().map(|tk| tk.kind).collect::<Vec<_>>();
        assert_eq!(kinds, expected, "\nsrc: {}", src);
    }

    #[test]
    fn punctuation_and_operators() {
        use TokenKind::*;
        self::match_kinds(
            "(){},.-+;:?*/ ! != = == > >= < <=",
            &[
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Colon, Question, Star, Slash, Bang, BangEq, Eq, EqEq, Greater, GreaterEq, Less,
                LessEq, Eof,
            ],
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        self::match_kinds(
            "var x = nil; fun _f() { return this; }",
            &[
                Var, Ident, Eq, Nil, Semicolon, Fun, Ident, LeftParen, RightParen, LeftBrace,
                Return, This, Semicolon, RightBrace, Eof,
            ],
        );
        self::match_kinds("break continue super class", &[Break, Continue, Super, Class, Eof]);
    }

    #[test]
    fn numbers() {
        let (tks, errs) = self::scan("12 12.5");
        assert!(errs.is_empty());
        assert_eq!(tks[0].literal, Some(LoxLiteral::Num(12.0)));
        assert_eq!(tks[1].literal, Some(LoxLiteral::Num(12.5)));

        // a trailing dot is not part of the number
        use TokenKind::*;
        self::match_kinds("12.", &[Num, Dot, Eof]);
    }

    #[test]
    fn strings_keep_newlines_and_count_lines() {
        let (tks, errs) = self::scan("\"hi\nthere\" x");
        assert!(errs.is_empty());
        assert_eq!(tks[0].literal, Some(LoxLiteral::Str("hi\nthere".to_string())));
        assert_eq!(tks[0].line, 1);
        assert_eq!(tks[1].line, 2);
    }

    #[test]
    fn line_comments_are_skipped() {
        use TokenKind::*;
        self::match_kinds("1 // the rest is gone / * =\n2", &[Num, Num, Eof]);
    }

    #[test]
    fn unterminated_string_reports_opening_line() {
        let (tks, errs) = self::scan("\n\"abc");
        assert_eq!(tks.len(), 1);
        assert!(tks[0].is_eof());
        assert!(matches!(errs[0], ScanError::UnterminatedString(2)));
    }

    #[test]
    fn scanning_continues_after_unexpected_character() {
        let (tks, errs) = self::scan("#1");
        assert!(matches!(errs[0], ScanError::UnexpectedCharacter('#', 1)));
        assert_eq!(tks[0].kind, TokenKind::Num);
    }

    #[test]
    fn single_trailing_eof() {
        for src in ["", "x", "// comment"] {
            let (tks, _) = self::scan(src);
            assert_eq!(
                tks.iter().filter(|tk| tk.is_eof()).count(),
                1,
                "src: {:?}",
                src
            );
            assert!(tks.last().map(|tk| tk.is_eof()).unwrap_or(false));
        }
    }
}
