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

//! Compound command parsing and the command dispatcher

use super::core::{Error, ErrorCause, Parser, Result, SyntaxError};
use super::lex::{Keyword, Operator, TokenId};
use crate::syntax::{
    CaseItem, Command, CompoundCommand, ElifThen, FullCompoundCommand, List, Word,
};
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Consumes the given keyword or fails with the given error.
    fn require_keyword(&mut self, keyword: Keyword, error: SyntaxError) -> Result<()> {
        if self.consume_keyword_if(keyword)? {
            Ok(())
        } else {
            let location = self.peek_token()?.word.location;
            Err(Error {
                cause: ErrorCause::Syntax(error),
                location,
            })
        }
    }

    /// Parses a command.
    ///
    /// This is the dispatcher over simple commands, compound commands and
    /// function definitions. Alias substitution is performed here since
    /// the replacement text decides which kind of command follows.
    pub fn command(&mut self) -> Result<Command> {
        self.nested(|parser| {
            parser.maybe_substitute_alias(true)?;

            if let Some(compound) = parser.full_compound_command()? {
                return Ok(Command::Compound(compound));
            }

            let token = parser.peek_token()?;
            match token.id {
                TokenId::Token(Some(Keyword::Function)) => {
                    parser.take_token()?;
                    let token = parser.peek_token()?;
                    match token.id {
                        TokenId::Token(_) => {
                            let name = parser.take_token()?.word;
                            parser.function_definition(name, true)
                        }
                        _ => Err(Self::unexpected_token(token)),
                    }
                }
                TokenId::Token(Some(keyword))
                    if keyword.is_clause_delimiter()
                        || keyword == Keyword::Bang
                        || keyword == Keyword::In =>
                {
                    Err(Self::unexpected_token(token))
                }
                TokenId::Token(_) => parser.simple_command(),
                TokenId::IoNumber(_) => parser.simple_command(),
                TokenId::Operator(op) if starts_redirection(op) => parser.simple_command(),
                _ => Err(Self::unexpected_token(token)),
            }
        })
    }

    /// Parses a compound command with optional trailing redirections.
    ///
    /// Returns `None` if the current token does not start a compound
    /// command.
    pub fn full_compound_command(&mut self) -> Result<Option<FullCompoundCommand>> {
        let Some(command) = self.compound_command()? else {
            return Ok(None);
        };
        let mut redirs = Vec::new();
        while let Some(redir) = self.redirection()? {
            redirs.push(redir);
        }
        Ok(Some(FullCompoundCommand { command, redirs }))
    }

    /// Parses a compound command.
    pub fn compound_command(&mut self) -> Result<Option<CompoundCommand>> {
        let token = self.peek_token()?;
        match token.id {
            TokenId::Operator(Operator::OpenParen) => self.subshell().map(Some),
            TokenId::Token(Some(Keyword::OpenBrace)) => self.grouping().map(Some),
            TokenId::Token(Some(Keyword::If)) => self.if_command().map(Some),
            TokenId::Token(Some(Keyword::While)) => self.while_loop().map(Some),
            TokenId::Token(Some(Keyword::Until)) => self.until_loop().map(Some),
            TokenId::Token(Some(Keyword::For)) => self.for_loop().map(Some),
            TokenId::Token(Some(Keyword::Case)) => self.case_command().map(Some),
            _ => Ok(None),
        }
    }

    /// Parses a brace grouping. The current token must be `{`.
    fn grouping(&mut self) -> Result<CompoundCommand> {
        let opening_location = self.take_token()?.word.location;
        let body = self.compound_list()?;
        self.require_keyword(
            Keyword::CloseBrace,
            SyntaxError::UnclosedGrouping { opening_location },
        )?;
        Ok(CompoundCommand::Grouping(body))
    }

    /// Parses a subshell. The current token must be `(`.
    fn subshell(&mut self) -> Result<CompoundCommand> {
        let location = self.take_token()?.word.location;
        let body = self.compound_list()?;
        if self.peek_token()?.id == TokenId::Operator(Operator::CloseParen) {
            self.take_token()?;
            Ok(CompoundCommand::Subshell {
                body: Rc::new(body),
                location,
            })
        } else {
            let error_location = self.peek_token()?.word.location;
            Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::UnclosedSubshell {
                    opening_location: location,
                }),
                location: error_location,
            })
        }
    }

    /// Parses an if command. The current token must be `if`.
    fn if_command(&mut self) -> Result<CompoundCommand> {
        self.take_token()?;
        let condition = self.compound_list()?;
        self.require_keyword(Keyword::Then, SyntaxError::IfMissingThen)?;
        let body = self.compound_list()?;

        let mut elifs = Vec::new();
        while self.consume_keyword_if(Keyword::Elif)? {
            let condition = self.compound_list()?;
            self.require_keyword(Keyword::Then, SyntaxError::IfMissingThen)?;
            let body = self.compound_list()?;
            elifs.push(ElifThen { condition, body });
        }

        let r#else = if self.consume_keyword_if(Keyword::Else)? {
            Some(self.compound_list()?)
        } else {
            None
        };

        self.require_keyword(Keyword::Fi, SyntaxError::IfMissingFi)?;
        Ok(CompoundCommand::If {
            condition,
            body,
            elifs,
            r#else,
        })
    }

    /// Parses the `do ... done` part shared by the loop commands.
    fn do_group(&mut self) -> Result<List> {
        self.require_keyword(Keyword::Do, SyntaxError::LoopMissingDo)?;
        let body = self.compound_list()?;
        self.require_keyword(Keyword::Done, SyntaxError::LoopMissingDone)?;
        Ok(body)
    }

    /// Parses a while loop. The current token must be `while`.
    fn while_loop(&mut self) -> Result<CompoundCommand> {
        self.take_token()?;
        let condition = self.compound_list()?;
        let body = self.do_group()?;
        Ok(CompoundCommand::While { condition, body })
    }

    /// Parses an until loop. The current token must be `until`.
    fn until_loop(&mut self) -> Result<CompoundCommand> {
        self.take_token()?;
        let condition = self.compound_list()?;
        let body = self.do_group()?;
        Ok(CompoundCommand::Until { condition, body })
    }

    /// Parses a for loop. The current token must be `for`.
    fn for_loop(&mut self) -> Result<CompoundCommand> {
        self.take_token()?;

        {
            let token = self.peek_token()?;
            let valid = matches!(token.id, TokenId::Token(_))
                && token
                    .word
                    .to_string_if_literal()
                    .is_some_and(|n| crate::syntax::is_name(&n));
            if !valid {
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::ForInvalidName),
                    location: token.word.location,
                });
            }
        }
        let name = self.take_token()?.word;

        self.linebreak()?;

        let values = if self.consume_keyword_if(Keyword::In)? {
            let mut values = Vec::new();
            // Reserved words are ordinary words in the value list.
            while let TokenId::Token(_) = self.peek_token()?.id {
                let mut word = self.take_token()?.word;
                word.parse_tilde_front();
                values.push(word);
            }
            Some(values)
        } else {
            None
        };

        if self.peek_token()?.id == TokenId::Operator(Operator::Semicolon) {
            self.take_token()?;
        }
        self.linebreak()?;

        let body = self.do_group()?;
        Ok(CompoundCommand::For { name, values, body })
    }

    /// Parses a case command. The current token must be `case`.
    fn case_command(&mut self) -> Result<CompoundCommand> {
        self.take_token()?;

        let token = self.peek_token()?;
        let mut subject = match token.id {
            TokenId::Token(_) => self.take_token()?.word,
            _ => return Err(Self::unexpected_token(token)),
        };
        subject.parse_tilde_front();

        self.linebreak()?;
        self.require_keyword(Keyword::In, SyntaxError::CaseMissingIn)?;
        self.linebreak()?;

        let mut items = Vec::new();
        loop {
            if self.consume_keyword_if(Keyword::Esac)? {
                break;
            }
            if self.peek_token()?.id == TokenId::Operator(Operator::OpenParen) {
                self.take_token()?;
            }

            let mut patterns: Vec<Word> = Vec::new();
            loop {
                let token = self.peek_token()?;
                match token.id {
                    TokenId::Token(_) => patterns.push(self.take_token()?.word),
                    _ => {
                        let location = token.word.location;
                        return Err(Error {
                            cause: ErrorCause::Syntax(SyntaxError::UnclosedPatternList),
                            location,
                        });
                    }
                }
                if self.peek_token()?.id == TokenId::Operator(Operator::Bar) {
                    self.take_token()?;
                } else {
                    break;
                }
            }

            if self.peek_token()?.id != TokenId::Operator(Operator::CloseParen) {
                let location = self.peek_token()?.word.location;
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::UnclosedPatternList),
                    location,
                });
            }
            self.take_token()?;

            let body = self.compound_list()?;
            items.push(CaseItem { patterns, body });

            if self.peek_token()?.id == TokenId::Operator(Operator::SemicolonSemicolon) {
                self.take_token()?;
                self.linebreak()?;
            } else {
                self.require_keyword(Keyword::Esac, SyntaxError::CaseMissingEsac)?;
                break;
            }
        }

        Ok(CompoundCommand::Case { subject, items })
    }
}

/// Returns true if the operator can begin a simple command, i.e. is a
/// redirection operator.
fn starts_redirection(op: Operator) -> bool {
    use Operator::*;
    matches!(
        op,
        Less | LessAnd | LessLess | LessLessDash | LessGreater | Greater | GreaterAnd
            | GreaterGreater | GreaterBar
    )
}
