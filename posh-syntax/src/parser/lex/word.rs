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

//! Word and text lexing
//!
//! This module parses the quote- and expansion-aware parts of the
//! lexical grammar: [`Word`]s made of [`WordUnit`]s and [`Text`]s made of
//! [`TextUnit`]s. The delimiter that ends a word depends on context and
//! is passed in as a function: for an ordinary token it is any blank or
//! operator character, for the word in `${x:-word}` it is `}`.

use super::core::Lexer;
use crate::parser::core::{Error, ErrorCause, Result, SyntaxError};
use crate::source::Location;
use crate::syntax::*;

/// Set of characters that a backslash escapes inside double quotes
fn is_escapable_in_double_quotes(c: char) -> bool {
    matches!(c, '$' | '`' | '"' | '\\')
}

impl Lexer<'_> {
    /// Parses a parameter identifier after `$` or `${`.
    ///
    /// Returns `None` if the current position does not start a parameter
    /// identifier. When `multi_digit` is false, a positional parameter is
    /// at most one digit long, which is the rule for parameters without
    /// braces.
    fn param_id(&mut self, multi_digit: bool) -> Result<Option<String>> {
        let Some(c) = self.peek_char()? else {
            return Ok(None);
        };

        if c == '_' || c.is_ascii_alphabetic() {
            let mut id = String::new();
            while let Some(sc) =
                self.consume_char_if(|c| c == '_' || c.is_ascii_alphanumeric())?
            {
                id.push(sc.value);
            }
            return Ok(Some(id));
        }

        if c.is_ascii_digit() {
            let mut id = String::new();
            if multi_digit {
                while let Some(sc) = self.consume_char_if(|c| c.is_ascii_digit())? {
                    id.push(sc.value);
                }
            } else {
                self.consume_char();
                id.push(c);
            }
            return Ok(Some(id));
        }

        if SpecialParam::from_char(c).is_some() {
            self.consume_char();
            return Ok(Some(c.to_string()));
        }

        Ok(None)
    }

    /// Parses the modifier of a braced parameter expansion.
    ///
    /// The current position must be just after the parameter identifier.
    /// This function does not consume the closing brace.
    fn param_modifier(&mut self) -> Result<Modifier> {
        let Some(c) = self.peek_char()? else {
            return Ok(Modifier::None);
        };
        match c {
            '}' => Ok(Modifier::None),
            ':' | '-' | '=' | '?' | '+' => {
                let condition = if c == ':' {
                    self.consume_char();
                    SwitchCondition::UnsetOrEmpty
                } else {
                    SwitchCondition::Unset
                };
                let location = self.location()?;
                let r#type = match self.peek_char()? {
                    Some('-') => SwitchType::Default,
                    Some('=') => SwitchType::Assign,
                    Some('?') => SwitchType::Error,
                    Some('+') => SwitchType::Alter,
                    _ => {
                        return Err(Error {
                            cause: ErrorCause::Syntax(SyntaxError::InvalidModifier),
                            location,
                        })
                    }
                };
                self.consume_char();
                let word = self.word(|c| c == '}')?;
                Ok(Modifier::Switch(Switch {
                    r#type,
                    condition,
                    word,
                }))
            }
            '#' | '%' => {
                self.consume_char();
                let side = if c == '#' {
                    TrimSide::Prefix
                } else {
                    TrimSide::Suffix
                };
                let length = if self.consume_char_if(|c2| c2 == c)?.is_some() {
                    TrimLength::Longest
                } else {
                    TrimLength::Shortest
                };
                let pattern = self.word(|c| c == '}')?;
                Ok(Modifier::Trim(Trim {
                    side,
                    length,
                    pattern,
                }))
            }
            _ => Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::InvalidModifier),
                location: self.location()?,
            }),
        }
    }

    /// Parses a braced parameter expansion. The `${` must have been
    /// consumed; `location` is the position of the `$`.
    fn braced_param(&mut self, location: Location) -> Result<TextUnit> {
        let unclosed = |location| Error {
            cause: ErrorCause::Syntax(SyntaxError::UnclosedParam {
                opening_location: location,
            }),
            location,
        };

        // `${#}` is the number of positional parameters, while `${#x}`
        // is the length of `$x`.
        let mut modifier_is_length = false;
        if self.peek_char()? == Some('#') {
            let index = self.index();
            self.consume_char();
            if self.peek_char()? == Some('}') {
                self.rewind(index);
            } else {
                modifier_is_length = true;
            }
        }

        let Some(id) = self.param_id(true)? else {
            return Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::EmptyParam),
                location,
            });
        };
        let param = Param::from_id(&id).ok_or_else(|| unclosed(location))?;

        let modifier = if modifier_is_length {
            Modifier::Length
        } else {
            self.param_modifier()?
        };

        if self.consume_char_if(|c| c == '}')?.is_none() {
            return Err(unclosed(location));
        }

        Ok(TextUnit::BracedParam(BracedParam {
            param,
            modifier,
            location,
        }))
    }

    /// Parses a command substitution after `$(`.
    ///
    /// The content is captured as a raw string with balanced
    /// parentheses, honoring interior quoting; it is re-parsed when the
    /// substitution is executed.
    fn command_substitution(&mut self, location: Location) -> Result<TextUnit> {
        let unclosed = Err(Error {
            cause: ErrorCause::Syntax(SyntaxError::UnclosedCommandSubstitution {
                opening_location: location,
            }),
            location,
        });

        let mut content = String::new();
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek_char()? else {
                return unclosed;
            };
            self.consume_char();
            match c {
                '(' => {
                    depth += 1;
                    content.push(c);
                }
                ')' => {
                    if depth == 0 {
                        return Ok(TextUnit::CommandSubst {
                            content: content.into(),
                            location,
                        });
                    }
                    depth -= 1;
                    content.push(c);
                }
                '\'' => {
                    content.push(c);
                    loop {
                        let Some(c) = self.peek_char()? else {
                            return unclosed;
                        };
                        self.consume_char();
                        content.push(c);
                        if c == '\'' {
                            break;
                        }
                    }
                }
                '"' | '`' => {
                    let quote = c;
                    content.push(c);
                    loop {
                        let Some(c) = self.peek_char()? else {
                            return unclosed;
                        };
                        self.consume_char();
                        content.push(c);
                        if c == quote {
                            break;
                        }
                        if c == '\\' {
                            if let Some(c) = self.peek_char()? {
                                self.consume_char();
                                content.push(c);
                            }
                        }
                    }
                }
                '\\' => {
                    content.push(c);
                    if let Some(c) = self.peek_char()? {
                        self.consume_char();
                        content.push(c);
                    }
                }
                _ => content.push(c),
            }
        }
    }

    /// Parses an arithmetic expansion after `$((`.
    fn arithmetic(&mut self, location: Location) -> Result<TextUnit> {
        let unclosed = |location| Error {
            cause: ErrorCause::Syntax(SyntaxError::UnclosedArith {
                opening_location: location,
            }),
            location,
        };

        let mut units = Vec::new();
        let mut depth = 0usize;
        loop {
            while self.line_continuation()? {}
            let Some(c) = self.peek_char()? else {
                return Err(unclosed(location));
            };
            match c {
                '(' => {
                    self.consume_char();
                    depth += 1;
                    units.push(Literal('('));
                }
                ')' => {
                    self.consume_char();
                    if depth > 0 {
                        depth -= 1;
                        units.push(Literal(')'));
                        continue;
                    }
                    // The first unnested `)` must begin the closing `))`.
                    if self.consume_char_if(|c| c == ')')?.is_none() {
                        return Err(unclosed(location));
                    }
                    return Ok(TextUnit::Arith {
                        content: Text(units),
                        location,
                    });
                }
                '\\' => {
                    self.consume_char();
                    match self.peek_char()? {
                        Some(c2 @ ('$' | '`' | '\\')) => {
                            self.consume_char();
                            units.push(Backslashed(c2));
                        }
                        _ => units.push(Literal('\\')),
                    }
                }
                '$' => {
                    let location = self.location()?;
                    self.consume_char();
                    units.push(self.dollar_unit(location)?);
                }
                '`' => units.push(self.backquote(false)?),
                _ => {
                    self.consume_char();
                    units.push(Literal(c));
                }
            }
        }
    }

    /// Parses a text unit starting with `$`. The `$` must have been
    /// consumed; `location` is its position.
    fn dollar_unit(&mut self, location: Location) -> Result<TextUnit> {
        match self.peek_char()? {
            Some('{') => {
                self.consume_char();
                self.braced_param(location)
            }
            Some('(') => {
                self.consume_char();
                if self.peek_char()? == Some('(') {
                    self.consume_char();
                    self.arithmetic(location)
                } else {
                    self.command_substitution(location)
                }
            }
            _ => match self.param_id(false)? {
                Some(id) => {
                    let param = Param::from_id(&id)
                        .expect("param_id returned an invalid identifier");
                    Ok(TextUnit::RawParam { param, location })
                }
                // A lone `$` is a literal dollar sign.
                None => Ok(Literal('$')),
            },
        }
    }

    /// Parses a backquoted command substitution, including the quotes.
    ///
    /// Within backquotes, a backslash escapes `$`, `` ` `` and `\`, and
    /// also `"` when the backquote itself occurs inside double quotes.
    pub(crate) fn backquote(&mut self, double_quote_escapes: bool) -> Result<TextUnit> {
        let location = self.location()?;
        let opened = self.consume_char_if(|c| c == '`')?.is_some();
        debug_assert!(opened, "backquote must start with `");

        let mut content = Vec::new();
        loop {
            let Some(c) = self.peek_char()? else {
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::UnclosedBackquote {
                        opening_location: location,
                    }),
                    location,
                });
            };
            self.consume_char();
            match c {
                '`' => return Ok(TextUnit::Backquote { content, location }),
                '\\' => match self.peek_char()? {
                    Some(c2)
                        if c2 == '$'
                            || c2 == '`'
                            || c2 == '\\'
                            || (double_quote_escapes && c2 == '"') =>
                    {
                        self.consume_char();
                        content.push(BackquoteUnit::Backslashed(c2));
                    }
                    _ => content.push(BackquoteUnit::Literal('\\')),
                },
                _ => content.push(BackquoteUnit::Literal(c)),
            }
        }
    }

    /// Parses a text unit.
    ///
    /// Returns `None` when the current character is a delimiter or the
    /// end of input. `is_escapable` decides which characters a backslash
    /// escapes in this context.
    fn text_unit(
        &mut self,
        is_delimiter: fn(char) -> bool,
        is_escapable: fn(char) -> bool,
        double_quoted: bool,
    ) -> Result<Option<TextUnit>> {
        while self.line_continuation()? {}
        let Some(c) = self.peek_char()? else {
            return Ok(None);
        };
        if is_delimiter(c) {
            return Ok(None);
        }
        match c {
            '\\' => {
                self.consume_char();
                match self.peek_char()? {
                    Some(c2) if is_escapable(c2) => {
                        self.consume_char();
                        Ok(Some(Backslashed(c2)))
                    }
                    _ => Ok(Some(Literal('\\'))),
                }
            }
            '$' => {
                let location = self.location()?;
                self.consume_char();
                self.dollar_unit(location).map(Some)
            }
            '`' => self.backquote(double_quoted).map(Some),
            _ => {
                self.consume_char();
                Ok(Some(Literal(c)))
            }
        }
    }

    /// Parses a text, a sequence of text units.
    pub(crate) fn text(
        &mut self,
        is_delimiter: fn(char) -> bool,
        is_escapable: fn(char) -> bool,
        double_quoted: bool,
    ) -> Result<Text> {
        let mut units = Vec::new();
        while let Some(unit) = self.text_unit(is_delimiter, is_escapable, double_quoted)? {
            units.push(unit);
        }
        Ok(Text(units))
    }

    /// Parses a single-quoted string after the opening quote.
    fn single_quote(&mut self, opening_location: Location) -> Result<WordUnit> {
        let mut value = String::new();
        loop {
            let Some(c) = self.peek_char()? else {
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::UnclosedSingleQuote {
                        opening_location,
                    }),
                    location: opening_location,
                });
            };
            self.consume_char();
            if c == '\'' {
                return Ok(SingleQuote(value));
            }
            value.push(c);
        }
    }

    /// Parses a double-quoted text after the opening quote.
    fn double_quote(&mut self, opening_location: Location) -> Result<WordUnit> {
        let text = self.text(|c| c == '"', is_escapable_in_double_quotes, true)?;
        if self.consume_char_if(|c| c == '"')?.is_none() {
            return Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::UnclosedDoubleQuote {
                    opening_location,
                }),
                location: opening_location,
            });
        }
        Ok(DoubleQuote(text))
    }

    /// Parses a word unit.
    ///
    /// Returns `None` when the current character is an unquoted delimiter
    /// or the end of input.
    fn word_unit(&mut self, is_delimiter: fn(char) -> bool) -> Result<Option<WordUnit>> {
        while self.line_continuation()? {}
        let Some(c) = self.peek_char()? else {
            return Ok(None);
        };
        if is_delimiter(c) {
            return Ok(None);
        }
        let location = self.location()?;
        match c {
            '\'' => {
                self.consume_char();
                self.single_quote(location).map(Some)
            }
            '"' => {
                self.consume_char();
                self.double_quote(location).map(Some)
            }
            '\\' => {
                self.consume_char();
                match self.peek_char()? {
                    Some(c2) => {
                        self.consume_char();
                        Ok(Some(Unquoted(Backslashed(c2))))
                    }
                    None => Ok(Some(Unquoted(Literal('\\')))),
                }
            }
            '$' => {
                self.consume_char();
                self.dollar_unit(location).map(|unit| Some(Unquoted(unit)))
            }
            '`' => self.backquote(false).map(|unit| Some(Unquoted(unit))),
            _ => {
                self.consume_char();
                Ok(Some(Unquoted(Literal(c))))
            }
        }
    }

    /// Parses a word, a possibly empty sequence of word units up to an
    /// unquoted delimiter.
    pub fn word(&mut self, is_delimiter: fn(char) -> bool) -> Result<Word> {
        let location = self.location()?;
        let mut units = Vec::new();
        while let Some(unit) = self.word_unit(is_delimiter)? {
            units.push(unit);
        }
        Ok(Word { units, location })
    }
}

impl Word {
    /// Parses a tilde expansion at the beginning of the word.
    ///
    /// If the word starts with an unquoted `~`, the literal characters up
    /// to the first `/` (or the end of the word) become a
    /// [`Tilde`] unit. No substitution happens if any of those characters
    /// is quoted or is an expansion.
    pub fn parse_tilde_front(&mut self) {
        match self.units.first() {
            Some(Unquoted(Literal('~'))) => {}
            _ => return,
        }

        let mut name = String::new();
        let mut count = 1;
        for unit in &self.units[1..] {
            match unit {
                Unquoted(Literal('/')) => break,
                Unquoted(Literal(c)) => {
                    name.push(*c);
                    count += 1;
                }
                _ => return,
            }
        }

        self.units.splice(..count, std::iter::once(Tilde(name)));
    }
}
