use std::iter::FusedIterator;

use tracing::trace;

use crate::error::LexError;
use crate::token::{Keyword, LiteralKind, Misc, Operator, Punctuation, Token, TokenKind};

// Detector convention: a detector looks at the whole remaining input and either declines, or
// reports what it recognised together with the tail left after the *matched* text. The captured
// `text` may be shorter than the match (string literals drop their quotes).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub tail: &'a str,
}

impl<'a> Detection<'a> {
    fn new(kind: TokenKind, text: &'a str, tail: &'a str) -> Self {
        Self { kind, text, tail }
    }

    /// A match whose captured text is exactly the first `len` bytes of `input`.
    fn prefix(kind: TokenKind, input: &'a str, len: usize) -> Self {
        let (text, tail) = input.split_at(len);
        Self::new(kind, text, tail)
    }
}

pub type Detector = for<'a> fn(&'a str) -> Option<Detection<'a>>;

/// Tried in this order; the first detector to match wins.
pub const DETECTORS: [Detector; 5] = [
    detect_operator,
    detect_keyword,
    detect_literal,
    detect_misc,
    detect_punctuation,
];

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

// `letter` must not lex as `let` + `ter`.
fn at_word_boundary(tail: &str) -> bool {
    !tail.starts_with(is_identifier_char)
}

fn word<'a>(kind: TokenKind, word: &str, input: &'a str) -> Option<Detection<'a>> {
    (input.starts_with(word) && at_word_boundary(&input[word.len()..]))
        .then(|| Detection::prefix(kind, input, word.len()))
}

pub fn detect_operator(input: &str) -> Option<Detection<'_>> {
    if detect_comment(input).is_some() {
        return None;
    }
    Operator::ALL
        .iter()
        .find(|op| input.starts_with(op.text()))
        .map(|&op| Detection::prefix(TokenKind::Operator(op), input, op.text().len()))
}

pub fn detect_punctuation(input: &str) -> Option<Detection<'_>> {
    Punctuation::ALL
        .iter()
        .find(|punct| input.starts_with(punct.text()))
        .map(|&punct| Detection::prefix(TokenKind::Punctuation(punct), input, punct.text().len()))
}

pub fn detect_keyword(input: &str) -> Option<Detection<'_>> {
    Keyword::ALL
        .iter()
        .find_map(|&keyword| word(TokenKind::Keyword(keyword), keyword.text(), input))
}

pub fn detect_literal(input: &str) -> Option<Detection<'_>> {
    LiteralKind::ALL.iter().find_map(|&literal| {
        let kind = TokenKind::Literal(literal);
        match literal {
            LiteralKind::Boolean => word(kind, "true", input).or_else(|| word(kind, "false", input)),
            LiteralKind::Number => number(input),
            LiteralKind::StringSingle => quoted(kind, '\'', false, input),
            LiteralKind::StringDouble => quoted(kind, '"', false, input),
            LiteralKind::StringTemplate => quoted(kind, '`', true, input),
            LiteralKind::Null => word(kind, "null", input),
        }
    })
}

pub fn detect_misc(input: &str) -> Option<Detection<'_>> {
    Misc::ALL.iter().find_map(|&misc| {
        let kind = TokenKind::Misc(misc);
        match misc {
            Misc::Space => input
                .chars()
                .next()
                .filter(|ch| ch.is_whitespace())
                .map(|ch| Detection::prefix(kind, input, ch.len_utf8())),
            Misc::Tab => input
                .starts_with('\t')
                .then(|| Detection::prefix(kind, input, 1)),
            Misc::EndOfLine => ["\n", "\r\n"]
                .into_iter()
                .find(|eol| input.starts_with(eol))
                .map(|eol| Detection::prefix(kind, input, eol.len())),
            Misc::EndOfFile => input.is_empty().then(|| Detection::new(kind, "", "")),
            Misc::Comment => detect_comment(input),
            Misc::Identifier => {
                let len = input
                    .find(|ch: char| !is_identifier_char(ch))
                    .unwrap_or(input.len());
                (len > 0).then(|| Detection::prefix(kind, input, len))
            }
        }
    })
}

// `/* ... */`, ending at the first `*/`, possibly spanning lines.
fn detect_comment(input: &str) -> Option<Detection<'_>> {
    let body = input.strip_prefix("/*")?;
    let end = body.find("*/")?;
    Some(Detection::prefix(
        TokenKind::Misc(Misc::Comment),
        input,
        2 + end + 2,
    ))
}

// `-?\d+(\.\d+)?`
fn number(input: &str) -> Option<Detection<'_>> {
    let digits_from = |from: usize| {
        input[from..]
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(input.len() - from)
    };

    let sign = usize::from(input.starts_with('-'));
    let integer = digits_from(sign);
    if integer == 0 {
        return None;
    }
    let mut len = sign + integer;
    if input[len..].starts_with('.') {
        let fraction = digits_from(len + 1);
        if fraction > 0 {
            len += 1 + fraction;
        }
    }
    Some(Detection::prefix(
        TokenKind::Literal(LiteralKind::Number),
        input,
        len,
    ))
}

// The widest run between two `quote`s: up to the last quote on the current line, or anywhere in
// the rest of the input for multi-line literals.
fn quoted(kind: TokenKind, quote: char, multiline: bool, input: &str) -> Option<Detection<'_>> {
    let rest = input.strip_prefix(quote)?;
    let searchable = if multiline {
        rest
    } else {
        let line_end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        &rest[..line_end]
    };
    let close = searchable.rfind(quote)?;
    Some(Detection::new(
        kind,
        &rest[..close],
        &rest[close + quote.len_utf8()..],
    ))
}

/// Lazily turns source text into tokens.
///
/// Whitespace is consumed silently; everything else, comments included, is yielded. The
/// sequence ends with exactly one `END_OF_FILE` token, or with a single [`LexError`] when the
/// remaining input starts with something no detector recognises.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    rest: &'a str,
    position: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            position: 0,
            finished: false,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let Some(detection) = DETECTORS.iter().find_map(|detect| detect(self.rest)) else {
                // Only non-empty input gets here: END_OF_FILE matches the empty string.
                self.finished = true;
                let character = self.rest.chars().next()?;
                return Some(Err(LexError::UnrecognizedCharacter {
                    character,
                    position: self.position,
                }));
            };

            let position = self.position;
            self.position += self.rest.len() - detection.tail.len();
            self.rest = detection.tail;

            match detection.kind {
                TokenKind::Misc(Misc::Space | Misc::Tab) => continue,
                TokenKind::Misc(Misc::EndOfFile) => self.finished = true,
                _ => {}
            }

            let token = Token::new(detection.kind, detection.text, position);
            trace!(%token, "scanned");
            return Some(Ok(token));
        }
        None
    }
}

impl FusedIterator for Scanner<'_> {}

pub fn scan(source: &str) -> Scanner<'_> {
    Scanner::new(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Category;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        scan(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("{source:?} failed to scan: {e}"))
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokens(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn sanity() {
        assert_eq!(
            tokens("const a = 1;"),
            vec![
                Token::new(TokenKind::Keyword(Keyword::Const), "const", 0),
                Token::new(TokenKind::Misc(Misc::Identifier), "a", 6),
                Token::new(TokenKind::Operator(Operator::Eq), "=", 8),
                Token::new(TokenKind::Literal(LiteralKind::Number), "1", 10),
                Token::new(TokenKind::Punctuation(Punctuation::Semicolon), ";", 11),
                Token::end_of_file(12),
            ]
        );
    }

    #[test]
    fn string_positions_count_the_quotes() {
        assert_eq!(
            tokens("let abc = 'qwerty';"),
            vec![
                Token::new(TokenKind::Keyword(Keyword::Let), "let", 0),
                Token::new(TokenKind::Misc(Misc::Identifier), "abc", 4),
                Token::new(TokenKind::Operator(Operator::Eq), "=", 8),
                Token::new(TokenKind::Literal(LiteralKind::StringSingle), "qwerty", 10),
                Token::new(TokenKind::Punctuation(Punctuation::Semicolon), ";", 18),
                Token::end_of_file(19),
            ]
        );
    }

    #[test]
    fn empty_input_is_just_end_of_file() {
        assert_eq!(tokens(""), vec![Token::end_of_file(0)]);
        assert_eq!(tokens(" \t\n"), vec![Token::end_of_file(3)]);
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(
            kinds("!= == >= <= && || ! ="),
            vec![
                TokenKind::Operator(Operator::NotEq),
                TokenKind::Operator(Operator::EqEq),
                TokenKind::Operator(Operator::Gte),
                TokenKind::Operator(Operator::Lte),
                TokenKind::Operator(Operator::And),
                TokenKind::Operator(Operator::Or),
                TokenKind::Operator(Operator::Not),
                TokenKind::Operator(Operator::Eq),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
    }

    #[test]
    fn lone_ampersand_and_pipe_are_punctuation() {
        assert_eq!(
            kinds("& |"),
            vec![
                TokenKind::Punctuation(Punctuation::Ampersand),
                TokenKind::Punctuation(Punctuation::Pipe),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
    }

    #[test]
    fn keywords_need_a_word_boundary() {
        assert_eq!(
            kinds("letter let nullable null trueish true"),
            vec![
                TokenKind::Misc(Misc::Identifier),
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Misc(Misc::Identifier),
                TokenKind::Literal(LiteralKind::Null),
                TokenKind::Misc(Misc::Identifier),
                TokenKind::Literal(LiteralKind::Boolean),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
    }

    #[test]
    fn detectors_report_the_tail() {
        assert_eq!(
            detect_punctuation(","),
            Some(Detection::new(
                TokenKind::Punctuation(Punctuation::Comma),
                ",",
                ""
            ))
        );
        assert_eq!(
            detect_literal("null"),
            Some(Detection::new(TokenKind::Literal(LiteralKind::Null), "null", ""))
        );
        assert_eq!(
            detect_literal("'asdf' 123"),
            Some(Detection::new(
                TokenKind::Literal(LiteralKind::StringSingle),
                "asdf",
                " 123"
            ))
        );
        assert_eq!(
            detect_literal("\"asdf\" "),
            Some(Detection::new(
                TokenKind::Literal(LiteralKind::StringDouble),
                "asdf",
                " "
            ))
        );
        assert_eq!(detect_keyword("x"), None);
    }

    #[test]
    fn numbers() {
        let detect = |input| detect_literal(input).map(|d| (d.text, d.tail));
        assert_eq!(detect("42;"), Some(("42", ";")));
        assert_eq!(detect("3.14)"), Some(("3.14", ")")));
        assert_eq!(detect("-7"), Some(("-7", "")));
        assert_eq!(detect("1."), Some(("1", ".")));
        // The operator detector runs first, so a leading `-` in source is always `SUB`.
        assert_eq!(
            kinds("-7"),
            vec![
                TokenKind::Operator(Operator::Sub),
                TokenKind::Literal(LiteralKind::Number),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
    }

    #[test]
    fn strings_take_the_widest_match() {
        let scanned = tokens(r#"'a' + 'b';"#);
        assert_eq!(scanned[0].text, "a' + 'b");
        assert_eq!(scanned[1].kind, TokenKind::Punctuation(Punctuation::Semicolon));

        let scanned = tokens("'a'\n'b'");
        assert_eq!(scanned[0].text, "a");
        assert_eq!(scanned[1].text, "b");
        assert_eq!(scanned[1].position, 4);

        let scanned = tokens("`one\ntwo`");
        assert_eq!(
            scanned[0],
            Token::new(TokenKind::Literal(LiteralKind::StringTemplate), "one\ntwo", 0)
        );
        assert_eq!(scanned[1], Token::end_of_file(9));
    }

    #[test]
    fn empty_strings() {
        let scanned = tokens("''");
        assert_eq!(
            scanned[0],
            Token::new(TokenKind::Literal(LiteralKind::StringSingle), "", 0)
        );
    }

    #[test]
    fn unterminated_quote_is_punctuation() {
        assert_eq!(
            kinds("'abc"),
            vec![
                TokenKind::Punctuation(Punctuation::QuoteSingle),
                TokenKind::Misc(Misc::Identifier),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
    }

    #[test]
    fn comments_are_yielded_and_division_still_works() {
        let scanned = tokens("a /* half\n */ / 2");
        assert_eq!(
            scanned.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Misc(Misc::Identifier),
                TokenKind::Misc(Misc::Comment),
                TokenKind::Operator(Operator::Div),
                TokenKind::Literal(LiteralKind::Number),
                TokenKind::Misc(Misc::EndOfFile),
            ]
        );
        assert_eq!(scanned[1].text, "/* half\n */");
        assert_eq!(scanned[2].position, 14);
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        let mut scanner = scan("a @ b");
        assert_eq!(
            scanner.next().map(|t| t.map(|t| t.kind)),
            Some(Ok(TokenKind::Misc(Misc::Identifier)))
        );
        assert_eq!(
            scanner.next(),
            Some(Err(LexError::UnrecognizedCharacter {
                character: '@',
                position: 2
            }))
        );
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn positions_cover_the_whole_input() {
        let source = "let x = 'hi' + 2.5 * (y - 1);\n{ print x; }";
        let scanned = tokens(source);
        let mut rebuilt = String::new();
        for token in &scanned {
            while rebuilt.len() < token.position {
                rebuilt.push(' ');
            }
            let matched = match token.kind {
                TokenKind::Literal(LiteralKind::StringSingle) => format!("'{}'", token.text),
                _ => token.text.clone(),
            };
            rebuilt.push_str(&matched);
        }
        assert_eq!(rebuilt, source.replace('\n', " "));
        assert_eq!(scanned.last().map(|t| t.position), Some(source.len()));
        assert!(
            scanned
                .iter()
                .all(|t| t.category() != Category::Misc || t.kind != TokenKind::Misc(Misc::Space))
        );
    }
}
