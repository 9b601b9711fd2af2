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

//! Trap built-in
//!
//! **`trap [action condition...]`** sets the action for each named
//! condition:
//!
//! - `-` resets the condition to the default action,
//! - an empty action ignores the condition,
//! - any other string is a command executed when the condition occurs.
//!
//! Without arguments, the configured traps are printed in a form
//! suitable for re-input to the shell.

use crate::common::{output, report_error};
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::trap::{Action, Condition};
use posh_env::Env;
use std::fmt::Write;

fn show_traps(env: &mut Env) -> Result {
    let mut lines = String::new();
    for (condition, action) in env.traps.iter() {
        match action {
            Action::Default => {}
            Action::Ignore => {
                let _ = writeln!(lines, "trap -- '' {condition}");
            }
            Action::Command(command) => {
                let quoted = command.replace('\'', "'\\''");
                let _ = writeln!(lines, "trap -- '{quoted}' {condition}");
            }
        }
    }
    output(env, &lines)
}

/// Entry point for executing the `trap` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut args = args.iter();
    let Some(first) = args.next() else {
        return show_traps(env);
    };
    if first.value == "-p" && args.len() == 0 {
        return show_traps(env);
    }

    let action = match first.value.as_str() {
        "-" => Action::Default,
        "" => Action::Ignore,
        command => Action::Command(command.into()),
    };

    let override_ignore = env.is_interactive();
    for operand in args {
        let Ok(condition) = operand.value.parse::<Condition>() else {
            return report_error(
                env,
                "trap",
                &format!("`{}' is not a valid condition", operand.value),
            );
        };

        let mut traps = std::mem::take(&mut env.traps);
        let result =
            traps.set_action(&mut *env.system, condition, action.clone(), override_ignore);
        env.traps = traps;

        if let Err(error) = result {
            return report_error(env, "trap", &format!("{condition}: {error}"));
        }
    }
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::signal;
    use posh_env::system::Disposition;

    #[test]
    fn setting_and_listing_traps() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["echo caught", "INT", "TERM"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(
            env.virtual_system().disposition(signal::sigint()),
            Disposition::Catch
        );

        main(&mut env, vec![]);
        let stdout = env.virtual_system().stdout();
        assert!(stdout.contains("trap -- 'echo caught' INT"));
        assert!(stdout.contains("trap -- 'echo caught' TERM"));
    }

    #[test]
    fn resetting_and_ignoring() {
        let mut env = Env::new_virtual();
        main(&mut env, Field::dummies(["", "TERM"]));
        assert_eq!(
            env.virtual_system().disposition(signal::number_from_name("TERM").unwrap()),
            Disposition::Ignore
        );

        main(&mut env, Field::dummies(["-", "TERM"]));
        assert_eq!(
            env.virtual_system().disposition(signal::number_from_name("TERM").unwrap()),
            Disposition::Default
        );
    }

    #[test]
    fn exit_trap() {
        let mut env = Env::new_virtual();
        main(&mut env, Field::dummies(["echo bye", "EXIT"]));
        assert_eq!(
            env.traps.get_action(Condition::Exit),
            &Action::Command("echo bye".into())
        );

        main(&mut env, Field::dummies(["echo bye", "0"]));
        assert_eq!(
            env.traps.get_action(Condition::Exit),
            &Action::Command("echo bye".into())
        );
    }

    #[test]
    fn invalid_condition() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["echo", "NOSIG"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }

    #[test]
    fn untrappable_signal() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["echo", "KILL"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }
}
