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

//! And-or list semantics

use super::{apply_errexit, Command};
use posh_env::semantics::Result;
use posh_env::stack::Frame;
use posh_env::Env;
use posh_syntax::syntax::{AndOr, AndOrList};

/// Executes the and-or list.
///
/// The pipelines are executed sequentially; `&&` and `||` inspect the
/// exit status of the previous pipeline to decide whether the next one
/// runs. Every pipeline except the last executes with a
/// [`Condition`](Frame::Condition) frame pushed, which suppresses the
/// `ErrExit` option. The errexit check runs only after the final
/// pipeline actually executes: a protected failure that short-circuits
/// the rest of the list does not make the shell exit.
impl Command for AndOrList {
    fn execute(&self, env: &mut Env) -> Result {
        if self.rest.is_empty() {
            self.first.execute(env)?;
            return apply_errexit(env);
        }

        {
            let mut env = env.push_frame(Frame::Condition);
            self.first.execute(&mut env)?;
        }

        for (index, (op, pipeline)) in self.rest.iter().enumerate() {
            let succeeded = env.exit_status.is_successful();
            let run = match op {
                AndOr::AndThen => succeeded,
                AndOr::OrElse => !succeeded,
            };
            if !run {
                continue;
            }

            if index + 1 == self.rest.len() {
                pipeline.execute(env)?;
                return apply_errexit(env);
            }
            let mut env = env.push_frame(Frame::Condition);
            pipeline.execute(&mut env)?;
        }

        Result::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use crate::command::tests::{run, test_env};
    use posh_env::semantics::{ExitStatus, Result};

    #[test]
    fn and_then_runs_on_success_only() {
        let mut env = test_env();
        run(&mut env, "status 0 && echo yes");
        assert_eq!(env.virtual_system().stdout(), "yes\n");

        let mut env = test_env();
        run(&mut env, "status 1 && echo no");
        assert_eq!(env.virtual_system().stdout(), "");
        assert_eq!(env.exit_status, ExitStatus(1));
    }

    #[test]
    fn or_else_runs_on_failure_only() {
        let mut env = test_env();
        run(&mut env, "status 1 || echo fallback");
        assert_eq!(env.virtual_system().stdout(), "fallback\n");

        let mut env = test_env();
        run(&mut env, "status 0 || echo no");
        assert_eq!(env.virtual_system().stdout(), "");
    }

    #[test]
    fn chains_evaluate_left_to_right() {
        let mut env = test_env();
        let result = run(&mut env, "status 1 && echo skipped || echo taken");
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.virtual_system().stdout(), "taken\n");

        let mut env = test_env();
        run(&mut env, "status 0 && status 1 || echo rescued");
        assert_eq!(env.virtual_system().stdout(), "rescued\n");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }
}
