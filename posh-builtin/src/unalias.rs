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

//! Unalias built-in
//!
//! **`unalias name...`** removes alias definitions; **`unalias -a`**
//! removes them all.

use crate::common::report_failure;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;

/// Entry point for executing the `unalias` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.iter().any(|f| f.value == "-a") {
        env.aliases.clear();
        return Result::new(ExitStatus::SUCCESS);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in args {
        if !env.aliases.remove(operand.value.as_str()) {
            let result = report_failure(
                env,
                "unalias",
                &format!("no such alias `{}'", operand.value),
            );
            exit_status = result.exit_status();
        }
    }
    Result::new(exit_status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::alias::HashEntry;
    use posh_syntax::source::Location;

    fn define(env: &mut Env, name: &str) {
        env.aliases.insert(HashEntry::new(
            name.to_string(),
            "x".to_string(),
            Location::dummy(),
        ));
    }

    #[test]
    fn removing_aliases() {
        let mut env = Env::new_virtual();
        define(&mut env, "a");
        define(&mut env, "b");
        let result = main(&mut env, Field::dummies(["a"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert!(env.aliases.get("a").is_none());
        assert!(env.aliases.get("b").is_some());
    }

    #[test]
    fn removing_all_aliases() {
        let mut env = Env::new_virtual();
        define(&mut env, "a");
        define(&mut env, "b");
        main(&mut env, Field::dummies(["-a"]));
        assert!(env.aliases.is_empty());
    }

    #[test]
    fn removing_unknown_alias_fails() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["nope"]));
        assert_eq!(result.exit_status(), ExitStatus::FAILURE);
    }
}
