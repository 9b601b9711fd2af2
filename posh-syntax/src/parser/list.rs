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

//! Parsing of lists, and-or lists and pipelines

use super::core::{Parser, Result};
use super::lex::{Keyword, Operator, TokenId};
use crate::syntax::{AndOr, AndOrList, Item, List, Pipeline};
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Consumes a newline token, if any, and reads the contents of the
    /// here-documents whose operators appeared on the finished line.
    fn newline(&mut self) -> Result<bool> {
        if self.peek_token()?.id == TokenId::Operator(Operator::Newline) {
            self.take_token()?;
            self.here_doc_contents()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes any number of newline tokens.
    pub(crate) fn linebreak(&mut self) -> Result<()> {
        while self.newline()? {}
        Ok(())
    }

    /// Parses a pipeline, a `!`-negatable sequence of commands separated
    /// by `|`.
    pub fn pipeline(&mut self) -> Result<Pipeline> {
        let negation = self.consume_keyword_if(Keyword::Bang)?;

        let first = self.command()?;
        let mut commands = vec![Rc::new(first)];
        while self.peek_token()?.id == TokenId::Operator(Operator::Bar) {
            self.take_token()?;
            self.linebreak()?;
            commands.push(Rc::new(self.command()?));
        }

        Ok(Pipeline { commands, negation })
    }

    /// Parses an and-or list, pipelines separated by `&&` and `||`.
    pub fn and_or_list(&mut self) -> Result<AndOrList> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_token()?.id {
                TokenId::Operator(Operator::AndAnd) => AndOr::AndThen,
                TokenId::Operator(Operator::BarBar) => AndOr::OrElse,
                _ => break,
            };
            self.take_token()?;
            self.linebreak()?;
            rest.push((op, self.pipeline()?));
        }
        Ok(AndOrList { first, rest })
    }

    /// Returns whether the peeked token ends a compound list.
    fn ends_compound_list(&mut self) -> Result<bool> {
        Ok(match self.peek_token()?.id {
            TokenId::EndOfInput => true,
            TokenId::Operator(Operator::CloseParen | Operator::SemicolonSemicolon) => true,
            TokenId::Token(Some(keyword)) => keyword.is_clause_delimiter(),
            _ => false,
        })
    }

    /// Parses a possibly empty list of and-or lists separated by `;`, `&`
    /// and newlines.
    ///
    /// This is the body parser for compound commands: it accepts newlines
    /// between items and stops before a token that ends the enclosing
    /// construct.
    pub fn compound_list(&mut self) -> Result<List> {
        let mut items = Vec::new();
        loop {
            self.linebreak()?;
            if self.ends_compound_list()? {
                break;
            }

            let and_or = Rc::new(self.and_or_list()?);
            let token = self.peek_token()?;
            let async_flag = match token.id {
                TokenId::Operator(Operator::Semicolon) => {
                    self.take_token()?;
                    None
                }
                TokenId::Operator(Operator::And) => {
                    let location = token.word.location;
                    self.take_token()?;
                    Some(location)
                }
                _ => None,
            };
            items.push(Item { and_or, async_flag });
        }
        Ok(List(items))
    }

    /// Parses a possibly empty list on a single line.
    ///
    /// Unlike [`compound_list`](Self::compound_list), this function does
    /// not skip newlines; the caller decides what to do at the end of the
    /// line.
    pub fn list(&mut self) -> Result<List> {
        let mut items = Vec::new();
        loop {
            match self.peek_token()?.id {
                TokenId::EndOfInput | TokenId::Operator(Operator::Newline) => break,
                _ => {}
            }

            let and_or = Rc::new(self.and_or_list()?);
            let token = self.peek_token()?;
            match token.id {
                TokenId::Operator(Operator::Semicolon) => {
                    self.take_token()?;
                    items.push(Item {
                        and_or,
                        async_flag: None,
                    });
                }
                TokenId::Operator(Operator::And) => {
                    let location = token.word.location;
                    self.take_token()?;
                    items.push(Item {
                        and_or,
                        async_flag: Some(location),
                    });
                }
                _ => {
                    items.push(Item {
                        and_or,
                        async_flag: None,
                    });
                    break;
                }
            }
        }
        Ok(List(items))
    }

    /// Parses one complete command line, including the contents of any
    /// here-documents started on it.
    ///
    /// Returns `None` if the end of input is reached before any command.
    /// An empty line yields `Some` empty list, so that the caller can
    /// distinguish it from the end of input.
    pub fn command_line(&mut self) -> Result<Option<List>> {
        let list = self.list()?;
        let token = self.peek_token()?;
        match token.id {
            TokenId::EndOfInput => {
                if self.has_pending_here_docs() {
                    // Reading at the end of input reports the missing
                    // delimiter.
                    self.here_doc_contents()?;
                }
                if list.0.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(list))
                }
            }
            TokenId::Operator(Operator::Newline) => {
                self.take_token()?;
                self.here_doc_contents()?;
                Ok(Some(list))
            }
            _ => Err(Self::unexpected_token(token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::core::{ErrorCause, SyntaxError};
    use crate::parser::lex::Lexer;
    use crate::syntax::{Command, RedirBody};
    use assert_matches::assert_matches;

    fn parse_line(code: &str) -> Option<List> {
        let mut lexer = Lexer::with_code(code);
        let mut parser = Parser::new(&mut lexer);
        parser.command_line().unwrap()
    }

    #[test]
    fn empty_and_comment_only_input() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("\n").unwrap().0.len(), 0);
        assert_eq!(parse_line("# comment\n").unwrap().0.len(), 0);
        assert_eq!(parse_line("   \n").unwrap().0.len(), 0);
    }

    #[test]
    fn semicolon_and_ampersand_separators() {
        let list = parse_line("a; b& c\n").unwrap();
        assert_eq!(list.0.len(), 3);
        assert!(list.0[0].async_flag.is_none());
        assert!(list.0[1].async_flag.is_some());
        assert!(list.0[2].async_flag.is_none());
    }

    #[test]
    fn and_or_lists() {
        let list = parse_line("a && b || c\n").unwrap();
        let and_or = &list.0[0].and_or;
        assert_eq!(and_or.rest.len(), 2);
        assert_eq!(and_or.rest[0].0, AndOr::AndThen);
        assert_eq!(and_or.rest[1].0, AndOr::OrElse);
    }

    #[test]
    fn and_or_allows_newline_after_operator() {
        let list = parse_line("a &&\n\nb\n").unwrap();
        assert_eq!(list.0[0].and_or.rest.len(), 1);
    }

    #[test]
    fn pipelines() {
        let list = parse_line("a | b | c\n").unwrap();
        let pipeline = &list.0[0].and_or.first;
        assert_eq!(pipeline.commands.len(), 3);
        assert!(!pipeline.negation);

        let list = parse_line("! a | b\n").unwrap();
        let pipeline = &list.0[0].and_or.first;
        assert_eq!(pipeline.commands.len(), 2);
        assert!(pipeline.negation);
    }

    #[test]
    fn pipeline_allows_newline_after_bar() {
        let list = parse_line("a |\nb\n").unwrap();
        assert_eq!(list.0[0].and_or.first.commands.len(), 2);
    }

    #[test]
    fn here_doc_content_read_after_newline() {
        let mut lexer = Lexer::with_code("cat <<EOF && echo ok\nheredoc body\nEOF\nnext\n");
        let mut parser = Parser::new(&mut lexer);
        let list = parser.command_line().unwrap().unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        assert_matches!(&**command, Command::Simple(simple) => {
            assert_matches!(&simple.redirs[0].body, RedirBody::HereDoc(here_doc) => {
                assert_eq!(here_doc.content.get().unwrap().to_string(), "heredoc body\n");
            });
        });

        let list = parser.command_line().unwrap().unwrap();
        assert_eq!(list.to_string(), "next");
    }

    #[test]
    fn two_here_docs_on_one_line() {
        let mut lexer = Lexer::with_code("cat <<ONE; cat <<TWO\n1\nONE\n2\nTWO\n");
        let mut parser = Parser::new(&mut lexer);
        let list = parser.command_line().unwrap().unwrap();
        assert_eq!(list.0.len(), 2);
        for (item, expected) in list.0.iter().zip(["1\n", "2\n"]) {
            let command = &item.and_or.first.commands[0];
            assert_matches!(&**command, Command::Simple(simple) => {
                assert_matches!(&simple.redirs[0].body, RedirBody::HereDoc(here_doc) => {
                    assert_eq!(here_doc.content.get().unwrap().to_string(), expected);
                });
            });
        }
    }

    #[test]
    fn here_doc_missing_content_at_end_of_input() {
        let mut lexer = Lexer::with_code("cat <<EOF");
        let mut parser = Parser::new(&mut lexer);
        let e = parser.command_line().unwrap_err();
        assert_matches!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::UnclosedHereDocContent { .. })
        );
    }

    #[test]
    fn syntax_error_near_unexpected_token() {
        let mut lexer = Lexer::with_code("echo )\n");
        let mut parser = Parser::new(&mut lexer);
        let e = parser.command_line().unwrap_err();
        assert_matches!(&e.cause, ErrorCause::Syntax(SyntaxError::UnexpectedToken(tok)) => {
            assert_eq!(tok, ")");
        });
        assert_eq!(e.cause.to_string(), "syntax error near unexpected token `)`");
    }

    #[test]
    fn error_carries_line_number() {
        let mut lexer = Lexer::with_code("echo ok\n fi\n");
        let mut parser = Parser::new(&mut lexer);
        parser.command_line().unwrap();
        let e = parser.command_line().unwrap_err();
        assert_eq!(e.location.line.get(), 2);
    }
}
