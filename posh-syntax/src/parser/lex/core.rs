// This file is part of posh, a POSIX command language interpreter.
// Copyright (C) 2024 the posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fundamental building blocks for the lexical analyzer
//!
//! A [`Lexer`] reads lines through an input function and parses the
//! characters into [`Token`]s on demand. It keeps an internal buffer of
//! the characters read so far and the index of the character to be parsed
//! next, which allows rewinding after a failed sub-parse and splicing in
//! alias replacement text.

use super::keyword::Keyword;
pub use super::op::Operator;
use crate::alias::Alias;
use crate::input::{Context, Input, Memory};
use crate::parser::core::{Error, ErrorCause, Result};
use crate::source::Location;
use crate::syntax::Word;
use std::fmt;
use std::num::NonZeroU64;
#[cfg(unix)]
use std::os::unix::io::RawFd;
use std::rc::Rc;

#[cfg(not(unix))]
type RawFd = i32;

/// Returns true if the character is a blank character.
#[must_use]
pub fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

/// Link in a chain of alias substitutions a character resulted from
///
/// The chain is consulted to prevent an alias from being substituted
/// recursively inside its own replacement text.
#[derive(Clone, Debug)]
pub(crate) struct AliasFrame {
    pub alias: Rc<Alias>,
    pub parent: Option<Rc<AliasFrame>>,
}

impl AliasFrame {
    fn is_for(mut frame: &AliasFrame, name: &str) -> bool {
        loop {
            if frame.alias.name == name {
                return true;
            }
            match &frame.parent {
                Some(parent) => frame = parent,
                None => return false,
            }
        }
    }
}

/// Character with source information
#[derive(Clone, Debug)]
pub struct SourceChar {
    /// Character value
    pub value: char,
    /// Position of the character in the source code
    pub location: Location,
    /// Alias substitution this character resulted from, if any
    pub(crate) alias: Option<Rc<AliasFrame>>,
}

/// Token identifier, or classification of tokens
///
/// This enum classifies a token as defined in POSIX XCU 2.10.1 Shell
/// Grammar Lexical Conventions. For convenience, the special token
/// identifier `EndOfInput` is included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenId {
    /// `TOKEN`
    ///
    /// If this token _looks like_ a reserved word, this variant has an
    /// associated `Keyword`. It depends on context whether the token is
    /// actually regarded as a reserved word or an ordinary word; the
    /// parser makes that decision.
    Token(Option<Keyword>),
    /// Operator
    Operator(Operator),
    /// `IO_NUMBER`
    ///
    /// The associated value is the file descriptor the token denotes.
    IoNumber(RawFd),
    /// Imaginary token identifier for the end of input
    EndOfInput,
}

/// Result of lexical analysis produced by the [`Lexer`]
#[derive(Clone, Debug)]
pub struct Token {
    /// Content of the token
    ///
    /// The word is empty if and only if the token is `EndOfInput`.
    pub word: Word,
    /// Token identifier
    pub id: TokenId,
    /// Index of the first character of the token in the lexer buffer
    pub index: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.word.fmt(f)
    }
}

/// State of the input function in a lexer
#[derive(Clone, Debug)]
enum InputState {
    Alive,
    EndOfInput(Location),
    Error(Error),
}

/// Lexical analyzer
pub struct Lexer<'a> {
    input: Box<dyn Input + 'a>,
    state: InputState,
    source: Vec<SourceChar>,
    index: usize,
    next_line: NonZeroU64,
    fresh_line: bool,
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("index", &self.index)
            .field("next_line", &self.next_line)
            .finish_non_exhaustive()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer that reads using the given input function.
    #[must_use]
    pub fn new(input: Box<dyn Input + 'a>) -> Lexer<'a> {
        Lexer {
            input,
            state: InputState::Alive,
            source: Vec::new(),
            index: 0,
            next_line: NonZeroU64::new(1).unwrap(),
            fresh_line: true,
        }
    }

    /// Creates a new lexer with a fixed source code.
    #[must_use]
    pub fn with_code(code: &'a str) -> Lexer<'a> {
        Lexer::new(Box::new(Memory::new(code)))
    }

    /// Discards consumed characters and marks the start of a new command.
    ///
    /// The interactive driver calls this between top-level commands so
    /// the input function shows the primary prompt for the next line.
    pub fn flush(&mut self) {
        self.source.drain(..self.index);
        self.index = 0;
        self.fresh_line = true;
    }

    /// Reads more input if the buffer is exhausted.
    fn fill(&mut self) -> Result<()> {
        while self.index >= self.source.len() {
            match &self.state {
                InputState::Alive => {}
                InputState::EndOfInput(_) => return Ok(()),
                InputState::Error(error) => return Err(error.clone()),
            }

            let context = Context {
                is_first_line: self.fresh_line,
            };
            match self.input.next_line(&context) {
                Ok(line) if line.is_empty() => {
                    let location = Location {
                        line: self.next_line,
                        column: NonZeroU64::new(1).unwrap(),
                    };
                    self.state = InputState::EndOfInput(location);
                }
                Ok(line) => {
                    self.fresh_line = false;
                    let line_number = self.next_line;
                    let mut column = NonZeroU64::new(1).unwrap();
                    for value in line.chars() {
                        self.source.push(SourceChar {
                            value,
                            location: Location {
                                line: line_number,
                                column,
                            },
                            alias: None,
                        });
                        column = column.checked_add(1).unwrap();
                        if value == '\n' {
                            self.next_line = self.next_line.checked_add(1).unwrap();
                        }
                    }
                }
                Err(io_error) => {
                    let location = Location {
                        line: self.next_line,
                        column: NonZeroU64::new(1).unwrap(),
                    };
                    self.state = InputState::Error(Error {
                        cause: ErrorCause::Io(io_error),
                        location,
                    });
                }
            }
        }
        Ok(())
    }

    /// Peeks the next character.
    ///
    /// Returns `Ok(None)` if the end of input is reached.
    pub fn peek_char(&mut self) -> Result<Option<char>> {
        self.fill()?;
        Ok(self.source.get(self.index).map(|sc| sc.value))
    }

    /// Returns the location of the next character.
    ///
    /// If there is no next character, an imaginary location is returned
    /// that a character would have if it existed.
    pub fn location(&mut self) -> Result<Location> {
        self.fill()?;
        match self.source.get(self.index) {
            Some(sc) => Ok(sc.location),
            None => match &self.state {
                InputState::EndOfInput(location) => Ok(*location),
                _ => unreachable!("fill left the lexer in an inconsistent state"),
            },
        }
    }

    /// Consumes the next character.
    ///
    /// This function must be called after [`peek_char`](Self::peek_char)
    /// has successfully returned the character. Consuming a character
    /// that has not yet been peeked is a bug.
    pub fn consume_char(&mut self) {
        assert!(
            self.index < self.source.len(),
            "A character must have been peeked before being consumed: index={}",
            self.index
        );
        self.index += 1;
    }

    /// Returns the position of the next character, counted from zero.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the current position back to the given index so that
    /// characters that have been consumed can be read again.
    pub fn rewind(&mut self, index: usize) {
        assert!(
            index <= self.index,
            "The new index {} must not be larger than the current index {}",
            index,
            self.index
        );
        self.index = index;
    }

    /// Peeks the next character and, if the given decider function
    /// returns true for it, advances the position.
    ///
    /// Returns the consumed character if the function returned true.
    pub fn consume_char_if<F>(&mut self, f: F) -> Result<Option<SourceChar>>
    where
        F: FnOnce(char) -> bool,
    {
        match self.peek_char()? {
            Some(c) if f(c) => {
                let sc = self.source[self.index].clone();
                self.consume_char();
                Ok(Some(sc))
            }
            _ => Ok(None),
        }
    }

    /// Consumes a backslash-newline pair at the current position.
    ///
    /// Returns true if a line continuation was removed.
    pub fn line_continuation(&mut self) -> Result<bool> {
        let index = self.index;
        if self.consume_char_if(|c| c == '\\')?.is_some() {
            if self.consume_char_if(|c| c == '\n')?.is_some() {
                return Ok(true);
            }
            self.rewind(index);
        }
        Ok(false)
    }

    /// Skips blank characters and line continuations.
    pub fn skip_blanks(&mut self) -> Result<()> {
        loop {
            if self.line_continuation()? {
                continue;
            }
            if self.consume_char_if(is_blank)?.is_none() {
                return Ok(());
            }
        }
    }

    /// Skips a comment, if any, up to (but not including) the newline.
    pub fn skip_comment(&mut self) -> Result<()> {
        if self.consume_char_if(|c| c == '#')?.is_some() {
            while self.consume_char_if(|c| c != '\n')?.is_some() {}
        }
        Ok(())
    }

    /// Skips blank characters and a comment.
    pub fn skip_blanks_and_comment(&mut self) -> Result<()> {
        self.skip_blanks()?;
        self.skip_comment()
    }

    /// Performs alias substitution right before the current position.
    ///
    /// This function must be called just after a word has been consumed
    /// that matches the name of the argument alias. The characters
    /// starting from the `begin` index up to the current position are
    /// replaced with the alias replacement text, and the position is set
    /// back to `begin`.
    ///
    /// The replacement characters record the substituted alias so that
    /// [`is_alias_active`](Self::is_alias_active) can prevent recursion.
    ///
    /// # Panics
    ///
    /// If the replaced part is empty, i.e., `begin >= self.index()`.
    pub fn substitute_alias(&mut self, begin: usize, alias: &Rc<Alias>) {
        let end = self.index;
        assert!(
            begin < end,
            "Lexer::substitute_alias: begin={begin}, end={end}"
        );

        let location = self.source[begin].location;
        let parent = self.source[begin].alias.clone();
        let frame = Rc::new(AliasFrame {
            alias: alias.clone(),
            parent,
        });

        let repl: Vec<SourceChar> = alias
            .replacement
            .chars()
            .map(|value| SourceChar {
                value,
                location,
                alias: Some(frame.clone()),
            })
            .collect();

        self.source.splice(begin..end, repl);
        self.index = begin;
    }

    /// Tests whether the character at the given index resulted from
    /// substitution of the named alias.
    #[must_use]
    pub fn is_alias_active(&self, index: usize, name: &str) -> bool {
        match self.source.get(index).and_then(|sc| sc.alias.as_ref()) {
            Some(frame) => AliasFrame::is_for(frame, name),
            None => false,
        }
    }

    /// Tests if the given index is just after the replacement text of an
    /// alias substitution that ends with a blank.
    ///
    /// A blank-ending replacement makes the next word eligible for alias
    /// substitution as well. The check walks back over the run of blanks
    /// preceding the index, looking for one that terminates such a
    /// replacement.
    #[must_use]
    pub fn is_after_blank_ending_alias(&self, index: usize) -> bool {
        for i in (0..index.min(self.source.len())).rev() {
            let sc = &self.source[i];
            if !is_blank(sc.value) {
                return false;
            }
            let Some(frame) = &sc.alias else {
                continue;
            };
            if !frame.alias.replacement.ends_with(is_blank) {
                continue;
            }
            // The blank must end the replacement: the next character
            // must not belong to the same substitution.
            let same_next = self
                .source
                .get(i + 1)
                .and_then(|next| next.alias.as_ref())
                .is_some_and(|next| Rc::ptr_eq(frame, next));
            if !same_next {
                return true;
            }
        }
        false
    }

    /// Parses a token at the current position.
    ///
    /// Returns a token with [`TokenId::EndOfInput`] if there is no more
    /// token.
    pub fn token(&mut self) -> Result<Token> {
        self.skip_blanks_and_comment()?;

        let index = self.index;
        if let Some(token) = self.operator(index)? {
            return Ok(token);
        }

        let word = self.word(super::is_token_delimiter)?;

        let id = if word.units.is_empty() {
            TokenId::EndOfInput
        } else {
            match word.to_string_if_literal() {
                Some(literal) => self.classify_literal(&literal)?,
                None => TokenId::Token(None),
            }
        };
        Ok(Token { word, id, index })
    }

    /// Classifies a fully-literal word as a keyword or IO_NUMBER.
    fn classify_literal(&mut self, literal: &str) -> Result<TokenId> {
        if !literal.is_empty() && literal.bytes().all(|b| b.is_ascii_digit()) {
            // An all-digit word immediately followed by `<` or `>` is an
            // IO_NUMBER token.
            if let Some('<' | '>') = self.peek_char()? {
                if let Ok(fd) = literal.parse::<RawFd>() {
                    return Ok(TokenId::IoNumber(fd));
                }
            }
        }
        Ok(TokenId::Token(literal.parse::<Keyword>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn peek_and_consume() {
        let mut lexer = Lexer::with_code("ab");
        assert_eq!(lexer.peek_char().unwrap(), Some('a'));
        assert_eq!(lexer.index(), 0);
        lexer.consume_char();
        assert_eq!(lexer.peek_char().unwrap(), Some('b'));
        lexer.consume_char();
        assert_eq!(lexer.peek_char().unwrap(), None);
    }

    #[test]
    fn rewind_rereads_consumed_characters() {
        let mut lexer = Lexer::with_code("xy");
        let start = lexer.index();
        lexer.peek_char().unwrap();
        lexer.consume_char();
        lexer.rewind(start);
        assert_eq!(lexer.peek_char().unwrap(), Some('x'));
    }

    #[test]
    fn line_numbers_increase_per_newline() {
        let mut lexer = Lexer::with_code("a\nb\nc");
        assert_eq!(lexer.location().unwrap(), Location::new(1, 1));
        lexer.consume_char(); // a
        lexer.peek_char().unwrap();
        lexer.consume_char(); // newline
        assert_eq!(lexer.location().unwrap(), Location::new(2, 1));
        lexer.consume_char(); // b
        lexer.peek_char().unwrap();
        lexer.consume_char(); // newline
        assert_eq!(lexer.location().unwrap(), Location::new(3, 1));
    }

    #[test]
    fn end_of_input_location() {
        let mut lexer = Lexer::with_code("a\n");
        lexer.peek_char().unwrap();
        lexer.consume_char();
        lexer.peek_char().unwrap();
        lexer.consume_char();
        assert_eq!(lexer.peek_char().unwrap(), None);
        assert_eq!(lexer.location().unwrap(), Location::new(2, 1));
    }

    #[test]
    fn skip_blanks_and_comment_stops_before_newline() {
        let mut lexer = Lexer::with_code("  # comment here\nfoo");
        lexer.skip_blanks_and_comment().unwrap();
        assert_eq!(lexer.peek_char().unwrap(), Some('\n'));
    }

    #[test]
    fn line_continuation_is_removed() {
        let mut lexer = Lexer::with_code("\\\nx");
        assert!(lexer.line_continuation().unwrap());
        assert_eq!(lexer.peek_char().unwrap(), Some('x'));
    }

    #[test]
    fn backslash_without_newline_is_not_a_continuation() {
        let mut lexer = Lexer::with_code("\\x");
        assert!(!lexer.line_continuation().unwrap());
        assert_eq!(lexer.peek_char().unwrap(), Some('\\'));
    }

    #[test]
    fn tokenizing_keywords_and_words() {
        let mut lexer = Lexer::with_code("if foo");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::Token(Some(Keyword::If)));
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::Token(None));
        assert_eq!(token.to_string(), "foo");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::EndOfInput);
    }

    #[test]
    fn io_number_classification() {
        let mut lexer = Lexer::with_code("2>file");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::IoNumber(2));

        // Not an IO_NUMBER if a blank intervenes
        let mut lexer = Lexer::with_code("2 >file");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::Token(None));

        // Not an IO_NUMBER if not followed by < or >
        let mut lexer = Lexer::with_code("22;");
        let token = lexer.token().unwrap();
        assert_eq!(token.id, TokenId::Token(None));
    }

    #[test]
    fn alias_substitution_replays_replacement() {
        let mut lexer = Lexer::with_code("ll -a");
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "ll");

        let alias = Rc::new(Alias {
            name: "ll".to_string(),
            replacement: "ls -l".to_string(),
            origin: Location::dummy(),
        });
        lexer.substitute_alias(token.index, &alias);

        assert!(lexer.is_alias_active(token.index, "ll"));
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "ls");
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "-l");
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "-a");
        assert_matches!(lexer.token().unwrap().id, TokenId::EndOfInput);
    }

    #[test]
    fn blank_ending_alias_flags_next_word() {
        let mut lexer = Lexer::with_code("sudo cmd");
        let token = lexer.token().unwrap();
        let alias = Rc::new(Alias {
            name: "sudo".to_string(),
            replacement: "sudo ".to_string(),
            origin: Location::dummy(),
        });
        lexer.substitute_alias(token.index, &alias);
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "sudo");
        let token = lexer.token().unwrap();
        assert_eq!(token.to_string(), "cmd");
        assert!(lexer.is_after_blank_ending_alias(token.index));
    }
}
