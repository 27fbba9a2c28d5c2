// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

/// Span into the shared expression source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // every token of one expression points at the same source
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    /// Empty span just past the last character.
    #[inline]
    pub fn eof(src: Arc<String>) -> Self {
        let start = src.len();
        Self::new(src, start, 0)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }

    fn grow(&mut self, by: usize) {
        self.len += by;
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,

    // unsupported tokens
    XGreater,
    XLess,
    XEqual,
    XPipe,
    XOpenSquareBracket,
    XCloseSquareBracket,
    XOpenCurly,
    XCloseCurly,
}

impl TokTyp {
    pub const fn is_unsupported(&self) -> bool {
        match self {
            Self::Ident
            | Self::Number
            | Self::Op(_)
            | Self::Comma
            | Self::OpenParen
            | Self::CloseParen => false,

            // unsupported tokens
            Self::XGreater
            | Self::XLess
            | Self::XEqual
            | Self::XPipe
            | Self::XOpenSquareBracket
            | Self::XCloseSquareBracket
            | Self::XOpenCurly
            | Self::XCloseCurly => true,
        }
    }

    /// Whether a token of this type may be directly followed by an operand.
    /// Decides if a `-` after it negates or subtracts.
    const fn expects_operand(prev: Option<Self>) -> bool {
        match prev {
            None | Some(Self::Op(_) | Self::Comma | Self::OpenParen) => true,
            Some(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(TokTyp),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    cur: Peekable<CharIndices<'src>>,
    prev: Option<TokTyp>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            prev: None,
            has_errored: false,
        }
    }

    /// The source this lexer reads from.
    pub fn src(&self) -> &'src Arc<String> {
        self.src
    }

    fn trim_whitespace(&mut self) {
        while self.cur.next_if(|(_, chr)| chr.is_ascii_whitespace()).is_some() {}
    }

    fn single_char(&self, chr: char) -> Option<TokTyp> {
        let typ = match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            '-' if TokTyp::expects_operand(self.prev) => TokTyp::Op(OperatorTyp::Neg),
            '-' => TokTyp::Op(OperatorTyp::Sub),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,

            '>' => TokTyp::XGreater,
            '<' => TokTyp::XLess,
            '=' => TokTyp::XEqual,
            '|' => TokTyp::XPipe,
            '[' => TokTyp::XOpenSquareBracket,
            ']' => TokTyp::XCloseSquareBracket,
            '{' => TokTyp::XOpenCurly,
            '}' => TokTyp::XCloseCurly,
            _ => return None,
        };
        Some(typ)
    }

    fn consume_by<P>(&mut self, start: usize, typ: TokTyp, predicate: P) -> Option<Tok>
    where
        P: Fn(char) -> bool,
    {
        let mut tok = Tok {
            typ,
            loc: SubStr::new(Arc::clone(self.src), start, 0),
        };
        while let Some((_, chr)) = self.cur.next_if(|(_, chr)| predicate(*chr)) {
            tok.loc.grow(chr.len_utf8());
        }
        if tok.loc.is_empty() {
            None
        } else {
            Some(tok)
        }
    }

    fn fail(&mut self, typ: LexErrTyp, start: usize, len: usize) -> LexErr {
        self.has_errored = true;
        LexErr {
            typ,
            loc: SubStr::new(Arc::clone(self.src), start, len),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (idx, chr) = self.cur.peek().copied()?;
        let tok = if let Some(typ) = self.single_char(chr) {
            self.cur.next();
            if typ.is_unsupported() {
                return Some(Err(self.fail(LexErrTyp::Unsupported(typ), idx, 1)));
            }
            Tok {
                typ,
                loc: SubStr::new(Arc::clone(self.src), idx, 1),
            }
        } else if let Some(tok) = self.consume_by(idx, TokTyp::Ident, |c| c.is_ascii_alphabetic())
        {
            tok
        } else if let Some(tok) = self.consume_by(idx, TokTyp::Number, |c| {
            c.is_ascii_digit() || c == '.'
        }) {
            tok
        } else {
            return Some(Err(self.fail(LexErrTyp::InvalidChar, idx, chr.len_utf8())));
        };

        self.prev = Some(tok.typ);
        Some(Ok(tok))
    }
}
