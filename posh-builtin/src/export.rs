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

//! Export built-in
//!
//! **`export name[=value]...`** marks the named variables for export,
//! optionally assigning values. Without operands (or with `-p`), the
//! exported variables are printed.

use crate::common::{output, report_error};
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::variable::Scope;
use posh_env::Env;
use posh_syntax::syntax::is_name;

/// Prints the exported variables.
fn show_exported(env: &mut Env) -> Result {
    let mut lines: Vec<String> = env
        .variables
        .iter()
        .filter(|(_, var)| var.exported)
        .map(|(name, var)| match &var.value {
            Some(value) => format!("export {name}={value}\n"),
            None => format!("export {name}\n"),
        })
        .collect();
    lines.sort();
    output(env, &lines.concat())
}

/// Applies one `name[=value]` operand with the given attribute setter.
pub(crate) fn assign_operand(
    env: &mut Env,
    builtin_name: &str,
    operand: &Field,
    set_attribute: fn(&mut posh_env::variable::VariableRefMut<'_>, &Field),
) -> std::result::Result<(), Result> {
    let (name, value) = match operand.value.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (operand.value.as_str(), None),
    };
    if !is_name(name) {
        return Err(report_error(
            env,
            builtin_name,
            &format!("`{}' is not a valid variable name", operand.value),
        ));
    }

    let mut variable = env.get_or_create_variable(name.to_string(), Scope::Global);
    if let Some(value) = value {
        if variable.assign(value.to_string()).is_err() {
            return Err(report_error(
                env,
                builtin_name,
                &format!("{name}: read-only variable"),
            ));
        }
    }
    set_attribute(&mut variable, operand);
    Ok(())
}

/// Entry point for executing the `export` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands: Vec<&Field> = args.iter().filter(|f| f.value != "-p").collect();
    if operands.is_empty() {
        return show_exported(env);
    }

    for operand in operands {
        if let Err(result) = assign_operand(env, "export", operand, |variable, _| {
            variable.export(true);
        }) {
            return result;
        }
    }
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_marks_and_assigns() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["a=1", "b"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        let a = env.variables.get("a").unwrap();
        assert_eq!(a.value.as_deref(), Some("1"));
        assert!(a.exported);
        // `b` is exported but remains unset.
        let b = env.variables.get("b").unwrap();
        assert_eq!(b.value, None);
        assert!(b.exported);
    }

    #[test]
    fn listing_exported_variables() {
        let mut env = Env::new_virtual();
        main(&mut env, Field::dummies(["b=2", "a=1"]));
        main(&mut env, vec![]);
        assert_eq!(env.virtual_system().stdout(), "export a=1\nexport b=2\n");
    }

    #[test]
    fn invalid_name_is_an_error() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["1bad=x"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }

    #[test]
    fn read_only_variable_resists_export_assignment() {
        use posh_syntax::source::Location;
        let mut env = Env::new_virtual();
        let mut var = env.variables.get_or_new("r", Scope::Global);
        var.assign("old").unwrap();
        var.make_read_only(Location::dummy());
        let result = main(&mut env, Field::dummies(["r=new"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert_eq!(env.variables.get_scalar("r"), Some("old"));
    }
}
