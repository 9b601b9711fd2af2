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

//! Simple command and function definition parsing

use super::core::{Error, ErrorCause, Parser, Result, SyntaxError};
use super::lex::{Operator, TokenId};
use crate::syntax::{
    Assign, Command, FunctionDefinition, SimpleCommand, Word, is_name,
};
use std::rc::Rc;

impl Parser<'_, '_> {
    /// Parses a simple command, including the `name()` style function
    /// definition that starts like one.
    ///
    /// The dispatcher has already performed alias substitution and ruled
    /// out compound commands, so the current token is a word, an
    /// IO_NUMBER, or a redirection operator.
    pub(super) fn simple_command(&mut self) -> Result<Command> {
        let mut assigns = Vec::new();
        let mut words: Vec<Word> = Vec::new();
        let mut redirs = Vec::new();

        loop {
            if let Some(redir) = self.redirection()? {
                redirs.push(redir);
                continue;
            }

            if !words.is_empty() {
                // A blank-ending alias replacement makes the next word an
                // alias candidate too.
                self.maybe_substitute_alias(false)?;
            }

            let token = self.peek_token()?;
            let TokenId::Token(_) = token.id else {
                break;
            };
            let token = self.take_token()?;
            let mut word = token.word;

            if words.is_empty() {
                // Assignments are recognized only before the command word.
                match Assign::try_from(word) {
                    Ok(mut assign) => {
                        assign.value.parse_tilde_front();
                        assigns.push(assign);
                        continue;
                    }
                    Err(original) => word = original,
                }

                // `name ( )` is a function definition command.
                if assigns.is_empty()
                    && redirs.is_empty()
                    && self.peek_token()?.id == TokenId::Operator(Operator::OpenParen)
                {
                    return self.function_definition(word, false);
                }
            }

            word.parse_tilde_front();
            words.push(word);
        }

        debug_assert!(!(assigns.is_empty() && words.is_empty() && redirs.is_empty()));
        Ok(Command::Simple(SimpleCommand {
            assigns,
            words,
            redirs: Rc::new(redirs),
        }))
    }

    /// Parses the rest of a function definition after the name.
    ///
    /// If `has_keyword` is true, the parentheses after the name are
    /// optional, which is the `function name` form.
    pub(super) fn function_definition(
        &mut self,
        name: Word,
        has_keyword: bool,
    ) -> Result<Command> {
        if name.to_string_if_literal().filter(|n| is_name(n)).is_none() {
            return Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::InvalidFunctionName),
                location: name.location,
            });
        }

        let has_parens = self.peek_token()?.id == TokenId::Operator(Operator::OpenParen);
        if has_parens {
            let open = self.take_token()?;
            if self.peek_token()?.id != TokenId::Operator(Operator::CloseParen) {
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::UnmatchedParenthesis),
                    location: open.word.location,
                });
            }
            self.take_token()?;
        } else if !has_keyword {
            // Unreachable from simple_command, which only calls here on `(`.
            return Err(Error {
                cause: ErrorCause::Syntax(SyntaxError::UnmatchedParenthesis),
                location: name.location,
            });
        }

        self.linebreak()?;

        let location = name.location;
        let body = match self.full_compound_command()? {
            Some(body) => body,
            None => {
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::MissingFunctionBody),
                    location,
                })
            }
        };

        Ok(Command::Function(FunctionDefinition {
            has_keyword,
            name,
            body: Rc::new(body),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{AliasSet, HashEntry};
    use crate::parser::core::Config;
    use crate::parser::lex::Lexer;
    use crate::source::Location;
    use crate::syntax::{CompoundCommand, Redir, RedirBody, RedirOp};
    use assert_matches::assert_matches;

    fn parse_command(code: &str) -> Command {
        let mut lexer = Lexer::with_code(code);
        let mut parser = Parser::new(&mut lexer);
        parser.command().unwrap()
    }

    fn simple(code: &str) -> SimpleCommand {
        match parse_command(code) {
            Command::Simple(simple) => simple,
            command => panic!("not a simple command: {command:?}"),
        }
    }

    #[test]
    fn words_and_arguments() {
        let command = simple("echo foo bar");
        assert!(command.assigns.is_empty());
        assert_eq!(command.words.len(), 3);
        assert_eq!(command.words[0].to_string(), "echo");
        assert_eq!(command.words[2].to_string(), "bar");
    }

    #[test]
    fn assignments_before_the_command_word() {
        let command = simple("a=1 b=2 cmd c=3");
        assert_eq!(command.assigns.len(), 2);
        assert_eq!(command.assigns[0].name, "a");
        assert_eq!(command.assigns[0].value.to_string(), "1");
        assert_eq!(command.assigns[1].name, "b");
        // After the command word, `c=3` is an ordinary argument.
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.words[1].to_string(), "c=3");
    }

    #[test]
    fn assignment_only_command() {
        let command = simple("a=1");
        assert_eq!(command.assigns.len(), 1);
        assert!(command.words.is_empty());
    }

    #[test]
    fn invalid_name_is_not_an_assignment() {
        let command = simple("1a=x");
        assert!(command.assigns.is_empty());
        assert_eq!(command.words[0].to_string(), "1a=x");

        let command = simple("=x");
        assert_eq!(command.words[0].to_string(), "=x");
    }

    #[test]
    fn redirections_anywhere() {
        let command = simple(">a cmd <b arg 2>>c");
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.redirs.len(), 3);
        assert_matches!(&command.redirs[1], Redir { body: RedirBody::Normal { operator, .. }, .. } => {
            assert_eq!(*operator, RedirOp::FileIn);
        });
    }

    #[test]
    fn tilde_in_command_words() {
        let command = simple("echo ~user");
        assert_matches!(
            command.words[1].units.first(),
            Some(crate::syntax::WordUnit::Tilde(name)) => {
                assert_eq!(name, "user");
            }
        );
    }

    #[test]
    fn function_definition() {
        let command = parse_command("f() { echo; }");
        assert_matches!(command, Command::Function(def) => {
            assert!(!def.has_keyword);
            assert_eq!(def.name.to_string(), "f");
            assert_matches!(&def.body.command, CompoundCommand::Grouping(_));
        });
    }

    #[test]
    fn function_definition_with_newline_before_body() {
        let command = parse_command("f()\n{ echo; }");
        assert_matches!(command, Command::Function(_));
    }

    #[test]
    fn function_definition_with_keyword() {
        let command = parse_command("function f { echo; }");
        assert_matches!(command, Command::Function(def) => {
            assert!(def.has_keyword);
            assert_eq!(def.name.to_string(), "f");
        });

        let command = parse_command("function f() ( echo )");
        assert_matches!(command, Command::Function(def) => {
            assert!(def.has_keyword);
        });
    }

    #[test]
    fn function_definition_errors() {
        let mut lexer = Lexer::with_code("f( echo");
        let mut parser = Parser::new(&mut lexer);
        let e = parser.command().unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::UnmatchedParenthesis)
        );

        let mut lexer = Lexer::with_code("f() echo");
        let mut parser = Parser::new(&mut lexer);
        let e = parser.command().unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::Syntax(SyntaxError::MissingFunctionBody)
        );
    }

    fn config_with_alias(name: &str, replacement: &str) -> Config {
        let mut aliases = AliasSet::new();
        aliases.insert(HashEntry::new(
            name.to_string(),
            replacement.to_string(),
            Location::dummy(),
        ));
        Config {
            aliases: Rc::new(aliases),
        }
    }

    #[test]
    fn alias_substitution_at_command_word() {
        let mut lexer = Lexer::with_code("ll x");
        let mut parser = Parser::with_config(&mut lexer, config_with_alias("ll", "ls -l"));
        let command = parser.command().unwrap();
        assert_matches!(command, Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["ls", "-l", "x"]);
        });
    }

    #[test]
    fn alias_not_substituted_at_argument_position() {
        let mut lexer = Lexer::with_code("echo ll");
        let mut parser = Parser::with_config(&mut lexer, config_with_alias("ll", "ls -l"));
        let command = parser.command().unwrap();
        assert_matches!(command, Command::Simple(simple) => {
            assert_eq!(simple.words[1].to_string(), "ll");
        });
    }

    #[test]
    fn alias_expanding_to_compound_command() {
        let mut lexer = Lexer::with_code("loop");
        let mut parser = Parser::with_config(
            &mut lexer,
            config_with_alias("loop", "while true; do echo; done"),
        );
        let command = parser.command().unwrap();
        assert_matches!(command, Command::Compound(full) => {
            assert_matches!(full.command, CompoundCommand::While { .. });
        });
    }

    #[test]
    fn recursive_alias_is_not_substituted_again() {
        let mut lexer = Lexer::with_code("echo hi");
        let mut parser = Parser::with_config(&mut lexer, config_with_alias("echo", "echo -n"));
        let command = parser.command().unwrap();
        assert_matches!(command, Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["echo", "-n", "hi"]);
        });
    }

    #[test]
    fn blank_ending_alias_enables_next_word_substitution() {
        let mut aliases = AliasSet::new();
        aliases.insert(HashEntry::new(
            "run".to_string(),
            "env ".to_string(),
            Location::dummy(),
        ));
        aliases.insert(HashEntry::new(
            "ll".to_string(),
            "ls -l".to_string(),
            Location::dummy(),
        ));
        let config = Config {
            aliases: Rc::new(aliases),
        };
        let mut lexer = Lexer::with_code("run ll");
        let mut parser = Parser::with_config(&mut lexer, config);
        let command = parser.command().unwrap();
        assert_matches!(command, Command::Simple(simple) => {
            let words: Vec<String> = simple.words.iter().map(Word::to_string).collect();
            assert_eq!(words, ["env", "ls", "-l"]);
        });
    }
}
