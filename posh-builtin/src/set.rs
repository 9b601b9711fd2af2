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

//! Set built-in
//!
//! **`set`** without arguments prints the variables. With arguments, it
//! modifies shell options (`-e`, `+x`, `-o errexit`, ...) and replaces
//! the positional parameters with the remaining operands. A lone `--`
//! makes the following operands positional parameters even if they
//! start with a hyphen; `set --` with nothing after it clears them.

use crate::common::{output, report_error};
use posh_env::builtin::Result;
use posh_env::option::{self, State};
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;

fn show_variables(env: &mut Env) -> Result {
    let mut lines: Vec<String> = env
        .variables
        .iter()
        .filter_map(|(name, var)| {
            let value = var.value.as_deref()?;
            Some(format!("{name}={value}\n"))
        })
        .collect();
    lines.sort();
    output(env, &lines.concat())
}

fn show_option_settings(env: &mut Env) -> Result {
    let mut lines = String::new();
    for option in enumset::EnumSet::<option::Option>::all() {
        let state = env.options.get(option);
        lines.push_str(&format!("{option:15} {state}\n"));
    }
    output(env, &lines)
}

/// Modifies one option by its long name.
fn set_long_option(env: &mut Env, name: &str, state: State) -> std::result::Result<(), Result> {
    match name.parse::<option::Option>() {
        Ok(option) if option.is_modifiable() => {
            env.options.set(option, state);
            Ok(())
        }
        _ => Err(report_error(
            env,
            "set",
            &format!("`{name}' is not a valid option name"),
        )),
    }
}

/// Entry point for executing the `set` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        return show_variables(env);
    }

    let mut params: Option<Vec<String>> = None;
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        let value = arg.value.as_str();
        match value {
            "--" => {
                params = Some(iter.map(|f| f.value.clone()).collect());
                break;
            }
            "-o" | "+o" => {
                let state = if value == "-o" { State::On } else { State::Off };
                match iter.next() {
                    Some(name) => {
                        if let Err(result) = set_long_option(env, &name.value, state) {
                            return result;
                        }
                    }
                    None => return show_option_settings(env),
                }
            }
            _ if value.len() >= 2 && (value.starts_with('-') || value.starts_with('+')) => {
                let invert = value.starts_with('+');
                for c in value[1..].chars() {
                    match option::parse_short(c) {
                        Some((option, state)) if option.is_modifiable() => {
                            let state = if invert { !state } else { state };
                            env.options.set(option, state);
                        }
                        _ => {
                            return report_error(
                                env,
                                "set",
                                &format!("`-{c}' is not a valid option"),
                            )
                        }
                    }
                }
            }
            _ => {
                // The first non-option argument starts the new
                // positional parameters.
                let mut values = vec![arg.value.clone()];
                values.extend(iter.map(|f| f.value.clone()));
                params = Some(values);
                break;
            }
        }
    }

    if let Some(values) = params {
        env.variables.positional_params_mut().values = values;
    }
    Result::new(ExitStatus::SUCCESS)
}
