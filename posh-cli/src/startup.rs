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

//! Command line argument parsing for the shell
//!
//! The invocation grammar is
//! `posh [--login] [-abCefhimnsuvx]... [-c command [name [arg...]]]
//! [-o option]... [script [arg...]]`.

use posh_env::option::{self, Option as ShellOption, State};
use thiserror::Error;

/// Where the shell reads commands from
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// A command string given with `-c`
    Command(String),
    /// A script file named as the first operand
    File(String),
    /// The standard input
    Stdin,
}

/// Result of parsing the command line arguments
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// Where commands come from
    pub source: Source,
    /// Value for `$0`
    pub arg0: String,
    /// Initial positional parameters
    pub positional_params: Vec<String>,
    /// Option settings from the command line, in order
    pub options: Vec<(ShellOption, State)>,
    /// Whether `-i` or `+i` appeared explicitly
    pub interactivity_forced: bool,
}

/// Error in the command line arguments
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvocationError {
    #[error("option `{0}' is not valid")]
    InvalidOption(String),
    #[error("option `-o {0}' is not valid")]
    InvalidLongOption(String),
    #[error("option `-o' is missing its argument")]
    MissingOptionArgument,
    #[error("option `-c' is missing the command string")]
    MissingCommand,
}

/// Parses the command line arguments of the shell.
pub fn parse_arguments(args: Vec<String>) -> Result<Invocation, InvocationError> {
    let mut iter = args.into_iter();
    let mut arg0 = iter.next().unwrap_or_else(|| "posh".to_string());

    // A leading hyphen in the name requests a login shell.
    let mut options: Vec<(ShellOption, State)> = Vec::new();
    if arg0.starts_with('-') {
        options.push((ShellOption::Login, State::On));
    }

    let mut interactivity_forced = false;
    let mut command = None;
    let mut operands: Vec<String> = Vec::new();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--login" => options.push((ShellOption::Login, State::On)),
            "-" | "--" => {
                operands.extend(iter);
                break;
            }
            "-o" | "+o" => {
                let state = if arg == "-o" { State::On } else { State::Off };
                let name = iter.next().ok_or(InvocationError::MissingOptionArgument)?;
                match name.parse::<ShellOption>() {
                    Ok(option) => options.push((option, state)),
                    Err(_) => return Err(InvocationError::InvalidLongOption(name)),
                }
            }
            _ if arg.starts_with('-') || arg.starts_with('+') => {
                let invert = arg.starts_with('+');
                for c in arg[1..].chars() {
                    let Some((option, state)) = option::parse_short(c) else {
                        return Err(InvocationError::InvalidOption(arg.clone()));
                    };
                    if option == ShellOption::Interactive {
                        interactivity_forced = true;
                    }
                    let state = if invert { !state } else { state };
                    options.push((option, state));
                    if option == ShellOption::CmdLine && !invert {
                        command = Some(());
                    }
                }
            }
            _ => {
                operands.push(arg);
                operands.extend(iter);
                break;
            }
        }
    }

    let read_stdin = options
        .iter()
        .any(|&(option, state)| option == ShellOption::Stdin && state == State::On);

    let (source, arg0, positional_params) = if command.is_some() {
        let mut operands = operands.into_iter();
        let command = operands.next().ok_or(InvocationError::MissingCommand)?;
        let arg0 = operands.next().unwrap_or(arg0);
        (Source::Command(command), arg0, operands.collect())
    } else if !read_stdin && !operands.is_empty() {
        let mut operands = operands.into_iter();
        let script = operands.next().unwrap();
        (Source::File(script.clone()), script, operands.collect())
    } else {
        // Reading the standard input; operands become positional
        // parameters.
        (Source::Stdin, arg0, operands)
    };

    Ok(Invocation {
        source,
        arg0,
        positional_params,
        options,
        interactivity_forced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn plain_invocation_reads_stdin() {
        let invocation = parse_arguments(args(&["posh"])).unwrap();
        assert_eq!(invocation.source, Source::Stdin);
        assert_eq!(invocation.arg0, "posh");
        assert!(invocation.positional_params.is_empty());
        assert!(invocation.options.is_empty());
    }

    #[test]
    fn command_string_with_name_and_args() {
        let invocation =
            parse_arguments(args(&["posh", "-c", "echo hi", "myname", "a1", "a2"])).unwrap();
        assert_eq!(invocation.source, Source::Command("echo hi".to_string()));
        assert_eq!(invocation.arg0, "myname");
        assert_eq!(invocation.positional_params, ["a1", "a2"]);
    }

    #[test]
    fn missing_command_string_is_an_error() {
        assert_eq!(
            parse_arguments(args(&["posh", "-c"])),
            Err(InvocationError::MissingCommand)
        );
    }

    #[test]
    fn script_file_with_positional_params() {
        let invocation = parse_arguments(args(&["posh", "script.sh", "p1"])).unwrap();
        assert_eq!(invocation.source, Source::File("script.sh".to_string()));
        assert_eq!(invocation.arg0, "script.sh");
        assert_eq!(invocation.positional_params, ["p1"]);
    }

    #[test]
    fn stdin_flag_makes_operands_positional() {
        let invocation = parse_arguments(args(&["posh", "-s", "p1", "p2"])).unwrap();
        assert_eq!(invocation.source, Source::Stdin);
        assert_eq!(invocation.positional_params, ["p1", "p2"]);
    }

    #[test]
    fn short_options_accumulate() {
        let invocation = parse_arguments(args(&["posh", "-ex", "+f"])).unwrap();
        assert_eq!(
            invocation.options,
            [
                (ShellOption::ErrExit, State::On),
                (ShellOption::XTrace, State::On),
                (ShellOption::Glob, State::On),
            ]
        );
    }

    #[test]
    fn long_options() {
        let invocation =
            parse_arguments(args(&["posh", "-o", "errexit", "+o", "glob"])).unwrap();
        assert_eq!(
            invocation.options,
            [
                (ShellOption::ErrExit, State::On),
                (ShellOption::Glob, State::Off),
            ]
        );
        assert_eq!(
            parse_arguments(args(&["posh", "-o", "bogus"])),
            Err(InvocationError::InvalidLongOption("bogus".to_string()))
        );
    }

    #[test]
    fn login_shell_by_name_or_option() {
        let invocation = parse_arguments(args(&["-posh"])).unwrap();
        assert_eq!(invocation.options, [(ShellOption::Login, State::On)]);

        let invocation = parse_arguments(args(&["posh", "--login"])).unwrap();
        assert_eq!(invocation.options, [(ShellOption::Login, State::On)]);
    }

    #[test]
    fn double_dash_ends_options() {
        let invocation = parse_arguments(args(&["posh", "--", "-x"])).unwrap();
        assert_eq!(invocation.source, Source::File("-x".to_string()));
    }

    #[test]
    fn invalid_option_is_an_error() {
        assert_eq!(
            parse_arguments(args(&["posh", "-Z"])),
            Err(InvocationError::InvalidOption("-Z".to_string()))
        );
    }
}
