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

//! Alias built-in
//!
//! **`alias [name[=value]...]`** defines aliases or prints existing
//! ones. A `name=value` operand defines an alias; a bare `name` prints
//! its definition.

use crate::common::{output, report_failure};
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;
use posh_syntax::alias::HashEntry;

fn quote_replacement(replacement: &str) -> String {
    format!("'{}'", replacement.replace('\'', "'\\''"))
}

/// Entry point for executing the `alias` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        let mut lines: Vec<String> = env
            .aliases
            .iter()
            .map(|entry| {
                format!(
                    "alias {}={}\n",
                    entry.0.name,
                    quote_replacement(&entry.0.replacement)
                )
            })
            .collect();
        lines.sort();
        return output(env, &lines.concat());
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in args {
        match operand.value.split_once('=') {
            Some((name, replacement)) if !name.is_empty() => {
                env.aliases.replace(HashEntry::new(
                    name.to_string(),
                    replacement.to_string(),
                    operand.origin,
                ));
            }
            _ => match env.aliases.get(operand.value.as_str()) {
                Some(entry) => {
                    let line = format!(
                        "alias {}={}\n",
                        entry.0.name,
                        quote_replacement(&entry.0.replacement)
                    );
                    let _ = output(env, &line);
                }
                None => {
                    let result = report_failure(
                        env,
                        "alias",
                        &format!("no such alias `{}'", operand.value),
                    );
                    exit_status = result.exit_status();
                }
            },
        }
    }
    Result::new(exit_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defining_and_printing_aliases() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["ll=ls -l"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(
            env.aliases.get("ll").unwrap().0.replacement,
            "ls -l"
        );

        main(&mut env, vec![]);
        assert_eq!(env.virtual_system().stdout(), "alias ll='ls -l'\n");
    }

    #[test]
    fn unknown_alias_fails() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["nope"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
    }
}
