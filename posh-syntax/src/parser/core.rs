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

//! Fundamentals of the syntax parser

use super::lex::{Keyword, Lexer, Token, TokenId};
use crate::alias::{EmptyGlossary, Glossary};
use crate::source::Location;
use crate::syntax::HereDoc;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Types of syntax errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// A `'` without a matching closing `'`
    #[error("the single quotation is not closed")]
    UnclosedSingleQuote {
        /// Location of the opening quotation
        opening_location: Location,
    },
    /// A `"` without a matching closing `"`
    #[error("the double quotation is not closed")]
    UnclosedDoubleQuote {
        /// Location of the opening quotation
        opening_location: Location,
    },
    /// A `${` without a matching `}`
    #[error("the parameter expansion is not closed")]
    UnclosedParam {
        /// Location of the `$`
        opening_location: Location,
    },
    /// A parameter expansion without a parameter name, e.g. `${}`
    #[error("the parameter expansion is missing a name")]
    EmptyParam,
    /// An unrecognized modifier in a braced parameter expansion
    #[error("invalid use of the parameter expansion modifier")]
    InvalidModifier,
    /// A `$(` without a matching `)`
    #[error("the command substitution is not closed")]
    UnclosedCommandSubstitution {
        /// Location of the `$`
        opening_location: Location,
    },
    /// A backquote without a matching closing backquote
    #[error("the backquote is not closed")]
    UnclosedBackquote {
        /// Location of the opening backquote
        opening_location: Location,
    },
    /// A `$((` without a matching `))`
    #[error("the arithmetic expansion is not closed")]
    UnclosedArith {
        /// Location of the `$`
        opening_location: Location,
    },
    /// The input ended before the here-document delimiter line
    #[error("the here-document content is missing the delimiter `{delimiter}`")]
    UnclosedHereDocContent {
        /// Delimiter the content should have ended with
        delimiter: String,
    },
    /// A `<<` operator without a following word
    #[error("the here-document operator is missing its delimiter")]
    MissingHereDocDelimiter,
    /// A redirection operator without a following word
    #[error("the redirection operator is missing its operand")]
    MissingRedirOperand,
    /// A `(` without a matching `)` in a subshell
    #[error("the subshell is not closed")]
    UnclosedSubshell {
        /// Location of the opening parenthesis
        opening_location: Location,
    },
    /// A `{` without a matching `}`
    #[error("the grouping is not closed")]
    UnclosedGrouping {
        /// Location of the opening brace
        opening_location: Location,
    },
    /// An `if` command without `then`
    #[error("the if command is missing `then`")]
    IfMissingThen,
    /// An `if` command without `fi`
    #[error("the if command is missing `fi`")]
    IfMissingFi,
    /// A `while` or `until` loop without `do`
    #[error("the loop is missing `do`")]
    LoopMissingDo,
    /// A `while`, `until` or `for` loop without `done`
    #[error("the loop is missing `done`")]
    LoopMissingDone,
    /// A `for` loop without a valid variable name
    #[error("the for loop is missing a variable name")]
    ForInvalidName,
    /// A `case` command without `in`
    #[error("the case command is missing `in`")]
    CaseMissingIn,
    /// A `case` command without `esac`
    #[error("the case command is missing `esac`")]
    CaseMissingEsac,
    /// A case pattern list without the terminating `)`
    #[error("the case pattern is missing `)`")]
    UnclosedPatternList,
    /// An unmatched `(` or `)` in a function definition
    #[error("`(` must be followed by `)` in a function definition")]
    UnmatchedParenthesis,
    /// A function definition without a valid name
    #[error("invalid function name")]
    InvalidFunctionName,
    /// A function definition without a compound-command body
    #[error("the function definition is missing its body")]
    MissingFunctionBody,
    /// Commands nested too deeply for the parser
    #[error("the nesting of commands is too deep")]
    MaxRecursionDepthExceeded,
    /// Catch-all for a token that does not fit the grammar
    #[error("syntax error near unexpected token `{0}`")]
    UnexpectedToken(String),
}

/// Types of errors that may happen in parsing
#[derive(Clone, Debug)]
pub enum ErrorCause {
    /// Error in an underlying input function
    Io(crate::input::Error),
    /// Syntax error
    Syntax(SyntaxError),
}

/// Compares two error causes.
///
/// I/O errors compare by identity since `std::io::Error` itself is not
/// comparable.
impl PartialEq for ErrorCause {
    fn eq(&self, other: &ErrorCause) -> bool {
        match (self, other) {
            (ErrorCause::Syntax(a), ErrorCause::Syntax(b)) => a == b,
            (ErrorCause::Io(a), ErrorCause::Io(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for ErrorCause {}

impl ErrorCause {
    /// Returns whether the error may be resolved by reading more input.
    ///
    /// The interactive driver keeps reading continuation lines when a
    /// parse fails with an incomplete-input error instead of reporting
    /// it.
    #[must_use]
    pub fn is_incomplete_input(&self) -> bool {
        use SyntaxError::*;
        match self {
            ErrorCause::Io(_) => false,
            ErrorCause::Syntax(e) => matches!(
                e,
                UnclosedSingleQuote { .. }
                    | UnclosedDoubleQuote { .. }
                    | UnclosedParam { .. }
                    | UnclosedCommandSubstitution { .. }
                    | UnclosedBackquote { .. }
                    | UnclosedArith { .. }
                    | UnclosedHereDocContent { .. }
                    | UnclosedSubshell { .. }
                    | UnclosedGrouping { .. }
                    | UnclosedPatternList
            ),
        }
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCause::Io(e) => write!(f, "cannot read commands: {e}"),
            ErrorCause::Syntax(e) => e.fmt(f),
        }
    }
}

impl From<SyntaxError> for ErrorCause {
    fn from(e: SyntaxError) -> ErrorCause {
        ErrorCause::Syntax(e)
    }
}

/// Explanation of a failure in parsing
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Location of the error
    pub location: Location,
}

/// Entire result of parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Set of data used in syntax parsing
#[derive(Clone, Debug)]
pub struct Config {
    /// Aliases the parser should substitute
    pub aliases: Rc<dyn Glossary>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            aliases: Rc::new(EmptyGlossary),
        }
    }
}

/// Maximum depth of nested commands the parser accepts
///
/// Deeper scripts fail with [`SyntaxError::MaxRecursionDepthExceeded`]
/// rather than overflowing the native stack.
pub(crate) const MAX_DEPTH: usize = 300;

/// Syntax parser
///
/// A parser manages a [`Lexer`] and a one-token lookahead, and tracks the
/// here-document operators whose contents are still to be read.
#[derive(Debug)]
pub struct Parser<'a, 'b> {
    lexer: &'a mut Lexer<'b>,
    config: Config,
    token: Option<Token>,
    here_docs: Vec<Rc<HereDoc>>,
    depth: usize,
}

impl<'a, 'b> Parser<'a, 'b> {
    /// Creates a new parser based on the given lexer.
    #[must_use]
    pub fn new(lexer: &'a mut Lexer<'b>) -> Parser<'a, 'b> {
        Self::with_config(lexer, Config::default())
    }

    /// Creates a new parser with the given configuration.
    #[must_use]
    pub fn with_config(lexer: &'a mut Lexer<'b>, config: Config) -> Parser<'a, 'b> {
        Parser {
            lexer,
            config,
            token: None,
            here_docs: Vec::new(),
            depth: 0,
        }
    }

    /// Peeks the next token, reading it from the lexer if necessary.
    pub(crate) fn peek_token(&mut self) -> Result<&Token> {
        if self.token.is_none() {
            self.token = Some(self.lexer.token()?);
        }
        Ok(self.token.as_ref().unwrap())
    }

    /// Consumes the current token.
    pub(crate) fn take_token(&mut self) -> Result<Token> {
        match self.token.take() {
            Some(token) => Ok(token),
            None => self.lexer.token(),
        }
    }

    /// Discards the lookahead token, forcing the next peek to re-lex.
    ///
    /// This is used after alias substitution has rewritten the lexer
    /// buffer under the token.
    pub(crate) fn invalidate_token(&mut self) {
        self.token = None;
    }

    /// Returns an error reporting that the peeked token is unexpected.
    pub(crate) fn unexpected_token(token: &Token) -> Error {
        let text = match token.id {
            TokenId::EndOfInput => "end of input".to_string(),
            _ => token.to_string(),
        };
        Error {
            cause: ErrorCause::Syntax(SyntaxError::UnexpectedToken(text)),
            location: token.word.location,
        }
    }

    /// If the next token is the given keyword, consumes it and returns
    /// true.
    pub(crate) fn consume_keyword_if(&mut self, keyword: Keyword) -> Result<bool> {
        if self.peek_token()?.id == TokenId::Token(Some(keyword)) {
            self.take_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Performs alias substitution on the next token if applicable.
    ///
    /// At command-word position, a token naming an alias is replaced by
    /// the alias replacement text and re-lexed, repeatedly, until no
    /// substitution applies. A token resulting from substitution of an
    /// alias is never substituted by the same alias again. Reserved words
    /// are not substituted at command-word position.
    ///
    /// When `command_position` is false, substitution only happens if the
    /// token follows the blank-ending replacement of another alias.
    pub(crate) fn maybe_substitute_alias(&mut self, command_position: bool) -> Result<()> {
        if self.config.aliases.is_empty() {
            return Ok(());
        }

        loop {
            // Copy what we need out of the lookahead token before
            // touching the lexer again.
            let (index, name) = {
                let token = self.peek_token()?;
                let TokenId::Token(keyword) = token.id else {
                    return Ok(());
                };
                if command_position && keyword.is_some() {
                    // Reserved words are recognized before aliases.
                    return Ok(());
                }
                let Some(name) = token.word.to_string_if_literal() else {
                    return Ok(());
                };
                (token.index, name)
            };

            if !command_position && !self.lexer.is_after_blank_ending_alias(index) {
                return Ok(());
            }
            if self.lexer.is_alias_active(index, &name) {
                return Ok(());
            }
            let Some(alias) = self.config.aliases.look_up(&name) else {
                return Ok(());
            };

            self.token = None;
            self.lexer.substitute_alias(index, &alias);
        }
    }

    /// Registers a here-document operator whose content is to be read at
    /// the next newline token.
    pub(crate) fn defer_here_doc(&mut self, here_doc: Rc<HereDoc>) {
        self.here_docs.push(here_doc);
    }

    /// Reads the contents of pending here-documents, in operator order.
    pub(crate) fn here_doc_contents(&mut self) -> Result<()> {
        for here_doc in self.here_docs.drain(..) {
            self.lexer.here_doc_content(&here_doc)?;
        }
        Ok(())
    }

    /// Returns whether any here-document operator is waiting for its
    /// content.
    pub(crate) fn has_pending_here_docs(&self) -> bool {
        !self.here_docs.is_empty()
    }

    /// Runs a parse function one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            let location = self.peek_token()?.word.location;
            return Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::MaxRecursionDepthExceeded),
                location,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
