// The token catalog: every operator, punctuation mark, keyword and pattern the scanner knows.
//
// Fixed-text groups are listed in detection order; the first entry whose text prefixes the input
// wins, so longer operators sharing a first character (`!=` vs `!`) must come first.

use std::fmt;

macro_rules! fixed_tokens {
    (
        $(#[$meta:meta])*
        pub enum $ty:ident {
            $($variant:ident => ($name:literal, $text:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant),+
        }

        impl $ty {
            /// Every entry of the group, in detection order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }

            pub fn text(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }
    };
}

fixed_tokens! {
    pub enum Operator {
        NotEq => ("NOTEQ", "!="),
        EqEq => ("EQEQ", "=="),
        Not => ("NOT", "!"),
        Eq => ("EQ", "="),
        Gte => ("GTE", ">="),
        Lte => ("LTE", "<="),
        Gt => ("GT", ">"),
        Lt => ("LT", "<"),
        Add => ("ADD", "+"),
        Sub => ("SUB", "-"),
        Mul => ("MUL", "*"),
        Div => ("DIV", "/"),
        And => ("AND", "&&"),
        Or => ("OR", "||"),
    }
}

fixed_tokens! {
    pub enum Punctuation {
        BracketOpen => ("BRACKET_OPEN", "("),
        BracketClose => ("BRACKET_CLOSE", ")"),
        BracketCurlyOpen => ("BRACKET_CURLY_OPEN", "{"),
        BracketCurlyClose => ("BRACKET_CURLY_CLOSE", "}"),
        QuoteSingle => ("QUOTE_SINGLE", "'"),
        QuoteDouble => ("QUOTE_DOUBLE", "\""),
        Colon => ("COLON", ":"),
        Semicolon => ("SEMICOLON", ";"),
        Pipe => ("PIPE", "|"),
        Ampersand => ("AMPERSAND", "&"),
        Dot => ("DOT", "."),
        Comma => ("COMMA", ","),
    }
}

fixed_tokens! {
    /// Reserved words. `class`, `fn`, `return`, `super` and `this` are reserved but have no
    /// grammar of their own; they only act as synchronization points for the parser.
    pub enum Keyword {
        Let => ("LET", "let"),
        Const => ("CONST", "const"),
        Class => ("CLASS", "class"),
        If => ("IF", "if"),
        Else => ("ELSE", "else"),
        Function => ("FUNCTION", "fn"),
        For => ("FOR", "for"),
        While => ("WHILE", "while"),
        Print => ("PRINT", "print"),
        Return => ("RETURN", "return"),
        Super => ("SUPER", "super"),
        This => ("THIS", "this"),
    }
}

/// Pattern-matched literal tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Boolean,
    Number,
    StringSingle,
    StringDouble,
    StringTemplate,
    Null,
}

impl LiteralKind {
    pub const ALL: &'static [LiteralKind] = &[
        LiteralKind::Boolean,
        LiteralKind::Number,
        LiteralKind::StringSingle,
        LiteralKind::StringDouble,
        LiteralKind::StringTemplate,
        LiteralKind::Null,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LiteralKind::Boolean => "BOOLEAN",
            LiteralKind::Number => "NUMBER",
            LiteralKind::StringSingle => "STRING_SINGLE",
            LiteralKind::StringDouble => "STRING_DOUBLE",
            LiteralKind::StringTemplate => "STRING_TEMPLATE",
            LiteralKind::Null => "NULL",
        }
    }
}

/// Everything else: layout, comments, identifiers and the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Misc {
    Space,
    Tab,
    EndOfLine,
    EndOfFile,
    Comment,
    Identifier,
}

impl Misc {
    pub const ALL: &'static [Misc] = &[
        Misc::Space,
        Misc::Tab,
        Misc::EndOfLine,
        Misc::EndOfFile,
        Misc::Comment,
        Misc::Identifier,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Misc::Space => "SPACE",
            Misc::Tab => "TAB",
            Misc::EndOfLine => "END_OF_LINE",
            Misc::EndOfFile => "END_OF_FILE",
            Misc::Comment => "COMMENT",
            Misc::Identifier => "IDENTIFIER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Operator,
    Punctuation,
    Keyword,
    Literal,
    Misc,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Operator => "OPERATOR",
            Category::Punctuation => "PUNCTUATION",
            Category::Keyword => "KEYWORD",
            Category::Literal => "LITERAL",
            Category::Misc => "MISC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Operator(Operator),
    Punctuation(Punctuation),
    Keyword(Keyword),
    Literal(LiteralKind),
    Misc(Misc),
}

impl TokenKind {
    pub fn category(self) -> Category {
        match self {
            TokenKind::Operator(_) => Category::Operator,
            TokenKind::Punctuation(_) => Category::Punctuation,
            TokenKind::Keyword(_) => Category::Keyword,
            TokenKind::Literal(_) => Category::Literal,
            TokenKind::Misc(_) => Category::Misc,
        }
    }

    /// Symbolic name within the category, e.g. `SEMICOLON`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Operator(op) => op.name(),
            TokenKind::Punctuation(punct) => punct.name(),
            TokenKind::Keyword(keyword) => keyword.name(),
            TokenKind::Literal(literal) => literal.name(),
            TokenKind::Misc(misc) => misc.name(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category().name(), self.name())
    }
}

/// A classified piece of source text.
///
/// `text` is the captured value: string literals drop their quotes, everything else keeps the
/// matched text verbatim. `position` is the byte offset where the match started.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn end_of_file(position: usize) -> Self {
        Self::new(TokenKind::Misc(Misc::EndOfFile), "", position)
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_end_of_file(&self) -> bool {
        self.kind == TokenKind::Misc(Misc::EndOfFile)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}@{}", self.kind, self.text, self.position)
    }
}
