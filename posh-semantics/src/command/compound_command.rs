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

//! Compound command semantics

use super::{filter_loop_divert, wait_for_child, Command};
use crate::expansion::{expand_word, expand_words};
use crate::handle::Handle;
use crate::redir::RedirGuard;
use posh_env::semantics::{ExitStatus, Field, Result};
use posh_env::stack::Frame;
use posh_env::variable::Scope;
use posh_env::Env;
use posh_fnmatch::{Pattern, PatternChar};
use posh_syntax::syntax::{
    CaseItem, CompoundCommand, ElifThen, FullCompoundCommand, List, Word,
};
use std::ops::ControlFlow::Continue;
use std::rc::Rc;

impl Command for FullCompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        if self.redirs.is_empty() {
            return self.command.execute(env);
        }

        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&self.redirs) {
            drop(guard);
            return error.handle(env);
        }
        self.command.execute(&mut guard)
    }
}

impl Command for CompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        use CompoundCommand::*;
        match self {
            Grouping(body) => body.execute(env),
            Subshell { body, .. } => execute_subshell(env, body),
            If {
                condition,
                body,
                elifs,
                r#else,
            } => execute_if(env, condition, body, elifs, r#else.as_ref()),
            While { condition, body } => execute_loop(env, condition, body, false),
            Until { condition, body } => execute_loop(env, condition, body, true),
            For { name, values, body } => execute_for(env, name, values.as_deref(), body),
            Case { subject, items } => execute_case(env, subject, items),
        }
    }
}

fn execute_subshell(env: &mut Env, body: &Rc<List>) -> Result {
    let child_body = Rc::clone(body);
    match env.run_in_subshell(move |env| child_body.execute(env)) {
        Ok(pid) => {
            env.exit_status = wait_for_child(env, pid);
            Continue(())
        }
        Err(errno) => {
            env.print_error(&format!("cannot start subshell: {errno}"));
            env.exit_status = ExitStatus::ERROR;
            Continue(())
        }
    }
}

/// Evaluates a condition list with errexit suppressed.
fn evaluate_condition(env: &mut Env, condition: &List) -> Result<bool> {
    let mut env = env.push_frame(Frame::Condition);
    condition.execute(&mut env)?;
    Continue(env.exit_status.is_successful())
}

fn execute_if(
    env: &mut Env,
    condition: &List,
    body: &List,
    elifs: &[ElifThen],
    r#else: Option<&List>,
) -> Result {
    if evaluate_condition(env, condition)? {
        return body.execute(env);
    }
    for ElifThen { condition, body } in elifs {
        if evaluate_condition(env, condition)? {
            return body.execute(env);
        }
    }
    match r#else {
        Some(body) => body.execute(env),
        None => {
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

/// Executes a while loop (or, with `until`, an until loop).
fn execute_loop(env: &mut Env, condition: &List, body: &List, until: bool) -> Result {
    let mut status = ExitStatus::SUCCESS;
    let mut env = env.push_frame(Frame::Loop);
    loop {
        if evaluate_condition(&mut env, condition)? == until {
            break;
        }
        match filter_loop_divert(body.execute(&mut env)) {
            Ok(true) => status = env.exit_status,
            Ok(false) => {
                status = env.exit_status;
                break;
            }
            Err(result) => return result,
        }
    }
    env.exit_status = status;
    Continue(())
}

fn execute_for(
    env: &mut Env,
    name: &Word,
    values: Option<&[Word]>,
    body: &List,
) -> Result {
    let fields = match values {
        Some(words) => match expand_words(env, words) {
            Ok(fields) => fields,
            Err(error) => return error.handle(env),
        },
        None => {
            let values = env.variables.positional_params().values.clone();
            values
                .into_iter()
                .map(|value| Field {
                    value,
                    origin: name.location,
                })
                .collect()
        }
    };

    let name = name
        .to_string_if_literal()
        .expect("for-loop variable name must be literal");

    let mut iterated = false;
    let mut env = env.push_frame(Frame::Loop);
    for field in fields {
        let mut variable = env.get_or_create_variable(name.clone(), Scope::Global);
        if variable.assign(field.value).is_err() {
            let error = crate::expansion::Error {
                cause: crate::expansion::ErrorCause::AssignReadOnly { name: name.clone() },
                location: field.origin,
            };
            return error.handle(&mut env);
        }

        iterated = true;
        match filter_loop_divert(body.execute(&mut env)) {
            Ok(true) => {}
            Ok(false) => break,
            Err(result) => return result,
        }
    }
    if !iterated {
        env.exit_status = ExitStatus::SUCCESS;
    }
    Continue(())
}

/// Compiles a case pattern from an expanded word, keeping quoted
/// characters literal.
fn compile_pattern(env: &mut Env, word: &Word) -> std::result::Result<Pattern, crate::expansion::Error> {
    let field = crate::expansion::expand_word_attr_single(env, word)?;
    let chars: Vec<PatternChar> = field
        .chars
        .iter()
        .filter(|c| !c.is_quoting)
        .map(|c| {
            if c.is_quoted {
                PatternChar::Literal(c.value)
            } else {
                PatternChar::Normal(c.value)
            }
        })
        .collect();
    let literal: String = chars.iter().map(|c| c.char_value()).collect();
    Ok(Pattern::parse(chars).unwrap_or_else(|_| {
        // An uncompilable pattern falls back to literal comparison.
        Pattern::parse(literal.chars().map(PatternChar::Literal))
            .expect("literal pattern cannot fail to compile")
    }))
}

fn execute_case(env: &mut Env, subject: &Word, items: &[CaseItem]) -> Result {
    let subject = match expand_word(env, subject) {
        Ok(field) => field.value,
        Err(error) => return error.handle(env),
    };

    env.exit_status = ExitStatus::SUCCESS;
    for item in items {
        for pattern in &item.patterns {
            let pattern = match compile_pattern(env, pattern) {
                Ok(pattern) => pattern,
                Err(error) => return error.handle(env),
            };
            if pattern.is_match(&subject) {
                return item.body.execute(env);
            }
        }
    }
    Continue(())
}
