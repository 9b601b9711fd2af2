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

//! Break built-in
//!
//! **`break [n]`** quits the execution of the *n*th innermost `for`,
//! `while`, or `until` loop. If *n* is greater than the number of
//! enclosing loops, the outermost one is exited. Outside any loop, the
//! built-in prints a diagnostic and succeeds; POSIX leaves the behavior
//! unspecified in that case.
//!
//! A successful invocation returns a result whose divert is
//! `Break(Divert::Break { count: n - 1 })`; the enclosing loops consume
//! the count.

use crate::common::{parse_count, report_error};
use posh_env::builtin::Result;
use posh_env::semantics::{Divert, ExitStatus, Field};
use posh_env::Env;

/// Shared implementation of the break and continue built-ins
///
/// Parses the operand and clamps it to the number of lexically
/// enclosing loops. Returns `None` with a diagnostic when there is no
/// enclosing loop.
pub(crate) fn enclosing_loop_count(
    env: &mut Env,
    name: &str,
    args: &[Field],
) -> std::result::Result<Option<usize>, Result> {
    let count = match args.first() {
        None => 1,
        Some(field) => match parse_count(&field.value).filter(|&n| n > 0) {
            Some(count) => count,
            None => {
                return Err(report_error(
                    env,
                    name,
                    &format!("`{}' is not a positive integer", field.value),
                ))
            }
        },
    };

    let max = env.stack.loop_count(count);
    if max == 0 {
        env.print_error(&format!("{name}: not in a loop"));
        return Ok(None);
    }
    Ok(Some(max))
}

/// Entry point for executing the `break` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match enclosing_loop_count(env, "break", &args) {
        Ok(Some(count)) => Result::from(Divert::Break { count: count - 1 }),
        Ok(None) => Result::new(ExitStatus::SUCCESS),
        Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::stack::Frame;

    #[test]
    fn break_without_loop_is_a_diagnosed_no_op() {
        let mut env = Env::new_virtual();
        env.arg0 = "posh".to_string();
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Continue(())
        );
        assert!(env.virtual_system().stderr().contains("not in a loop"));
    }

    #[test]
    fn break_counts_are_clamped_to_enclosing_loops() {
        let mut env = Env::new_virtual();
        let mut env = env.push_frame(Frame::Loop);
        let mut env = env.push_frame(Frame::Loop);

        let result = main(&mut env, vec![]);
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Break { count: 0 })
        );

        let result = main(&mut env, Field::dummies(["5"]));
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Break { count: 1 })
        );
    }

    #[test]
    fn invalid_operand() {
        let mut env = Env::new_virtual();
        let mut env = env.push_frame(Frame::Loop);
        let result = main(&mut env, Field::dummies(["x"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        let result = main(&mut env, Field::dummies(["0"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }
}
