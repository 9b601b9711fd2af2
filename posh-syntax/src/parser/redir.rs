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

//! Redirection parsing

use super::core::{Error, ErrorCause, Parser, Result, SyntaxError};
use super::lex::{Operator, TokenId};
use crate::syntax::{Fd, HereDoc, Redir, RedirBody, RedirOp};
use std::cell::OnceCell;
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Parses the operand word of a redirection operator.
    fn redir_operand(&mut self, operator_location: crate::source::Location) -> Result<crate::syntax::Word> {
        let token = self.peek_token()?;
        match token.id {
            TokenId::Token(_) => {
                let token = self.take_token()?;
                Ok(token.word)
            }
            _ => Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::MissingRedirOperand),
                location: operator_location,
            }),
        }
    }

    /// Parses a redirection, if the next token begins one.
    ///
    /// A leading IO_NUMBER token binds to the redirection operator that
    /// follows it. A here-document operator queues its content to be read
    /// after the next newline token.
    pub fn redirection(&mut self) -> Result<Option<Redir>> {
        let fd = match self.peek_token()?.id {
            TokenId::IoNumber(fd) => {
                self.take_token()?;
                Some(Fd(fd))
            }
            _ => None,
        };

        let token = self.peek_token()?;
        let TokenId::Operator(operator) = token.id else {
            // The lexer only produces an IO_NUMBER immediately before `<`
            // or `>`, so fd must be None here.
            debug_assert!(fd.is_none());
            return Ok(None);
        };
        let operator_location = token.word.location;

        match operator {
            Operator::LessLess | Operator::LessLessDash => {
                let remove_tabs = operator == Operator::LessLessDash;
                self.take_token()?;
                let token = self.peek_token()?;
                let delimiter = match token.id {
                    TokenId::Token(_) => self.take_token()?.word,
                    _ => {
                        return Err(Error {
                            cause: ErrorCause::Syntax(SyntaxError::MissingHereDocDelimiter),
                            location: operator_location,
                        })
                    }
                };
                let here_doc = Rc::new(HereDoc {
                    delimiter,
                    remove_tabs,
                    content: OnceCell::new(),
                });
                self.defer_here_doc(Rc::clone(&here_doc));
                Ok(Some(Redir {
                    fd,
                    body: RedirBody::HereDoc(here_doc),
                }))
            }
            _ => match RedirOp::try_from(operator) {
                Ok(operator) => {
                    self.take_token()?;
                    let mut operand = self.redir_operand(operator_location)?;
                    operand.parse_tilde_front();
                    Ok(Some(Redir {
                        fd,
                        body: RedirBody::Normal { operator, operand },
                    }))
                }
                Err(()) => {
                    debug_assert!(fd.is_none());
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lex::Lexer;
    use assert_matches::assert_matches;

    fn parse_redir(code: &str) -> Option<Redir> {
        let mut lexer = Lexer::with_code(code);
        let mut parser = Parser::new(&mut lexer);
        parser.redirection().unwrap()
    }

    #[test]
    fn file_redirections() {
        let redir = parse_redir(">out").unwrap();
        assert_eq!(redir.fd, None);
        assert_eq!(redir.fd_or_default(), Fd::STDOUT);
        assert_matches!(redir.body, RedirBody::Normal { operator, operand } => {
            assert_eq!(operator, RedirOp::FileOut);
            assert_eq!(operand.to_string(), "out");
        });

        let redir = parse_redir("<in").unwrap();
        assert_eq!(redir.fd_or_default(), Fd::STDIN);

        let redir = parse_redir("2>>log").unwrap();
        assert_eq!(redir.fd, Some(Fd(2)));
        assert_matches!(redir.body, RedirBody::Normal { operator, .. } => {
            assert_eq!(operator, RedirOp::FileAppend);
        });
    }

    #[test]
    fn fd_copy_redirections() {
        let redir = parse_redir("2>&1").unwrap();
        assert_eq!(redir.fd, Some(Fd(2)));
        assert_matches!(redir.body, RedirBody::Normal { operator, operand } => {
            assert_eq!(operator, RedirOp::FdOut);
            assert_eq!(operand.to_string(), "1");
        });

        let redir = parse_redir("<&-").unwrap();
        assert_matches!(redir.body, RedirBody::Normal { operator, operand } => {
            assert_eq!(operator, RedirOp::FdIn);
            assert_eq!(operand.to_string(), "-");
        });
    }

    #[test]
    fn not_a_redirection() {
        assert_eq!(parse_redir("word"), None);
        assert_eq!(parse_redir(";"), None);
        assert_eq!(parse_redir(""), None);
    }

    #[test]
    fn missing_operand_is_an_error() {
        let mut lexer = Lexer::with_code("> ;");
        let mut parser = Parser::new(&mut lexer);
        let e = parser.redirection().unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::MissingRedirOperand)
        );
    }

    #[test]
    fn here_doc_operator_queues_content() {
        let mut lexer = Lexer::with_code("<<EOF\nbody\nEOF\n");
        let mut parser = Parser::new(&mut lexer);
        let redir = parser.redirection().unwrap().unwrap();
        assert!(parser.has_pending_here_docs());
        // Consume the newline and read the content.
        parser.take_token().unwrap();
        parser.here_doc_contents().unwrap();
        assert_matches!(redir.body, RedirBody::HereDoc(here_doc) => {
            assert_eq!(here_doc.content.get().unwrap().to_string(), "body\n");
        });
    }
}
