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

//! Type definitions for shell options
//!
//! This module defines the [`OptionSet`] struct, a map from [`Option`]
//! to [`State`]. The option set merely stores whether each option is on
//! or off; it is the rest of the shell that changes behavior according
//! to the options.

use enumset::{EnumSet, EnumSetType};
use std::fmt::{Display, Formatter};
use std::ops::Not;
use std::str::FromStr;

/// State of an option: either enabled or disabled
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    /// Enabled
    On,
    /// Disabled
    Off,
}

pub use State::*;

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            On => "on",
            Off => "off",
        };
        s.fmt(f)
    }
}

impl Not for State {
    type Output = Self;
    #[must_use]
    fn not(self) -> Self {
        match self {
            On => Off,
            Off => On,
        }
    }
}

/// Shell option
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
#[non_exhaustive]
pub enum Option {
    /// Exports all variables when they are assigned.
    AllExport,
    /// Allows overwriting an existing file with the `>` redirection.
    Clobber,
    /// Executes a command string specified as a command line argument.
    CmdLine,
    /// Makes the shell exit when a command returns a non-zero exit
    /// status.
    ErrExit,
    /// Makes the shell actually run commands.
    Exec,
    /// Enables pathname expansion.
    Glob,
    /// Remembers the full pathname of executed commands.
    HashAll,
    /// Enables features for interactive use.
    Interactive,
    /// Makes the shell act as a login shell.
    Login,
    /// Enables job control.
    Monitor,
    /// Reports the results of asynchronous jobs as they finish.
    Notify,
    /// Reads commands from the standard input.
    Stdin,
    /// Expands unset variables to an empty string rather than erroring
    /// out.
    Unset,
    /// Echoes the input before parsing and executing.
    Verbose,
    /// Prints expanded words before command execution.
    XTrace,
}

pub use self::Option::*;

impl Option {
    /// Whether this option can be modified by the set built-in.
    ///
    /// Unmodifiable options can be set only on shell startup.
    #[must_use]
    pub fn is_modifiable(self) -> bool {
        !matches!(self, CmdLine | Interactive | Login | Stdin)
    }

    /// Returns the option name, all in lower case without punctuation.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            AllExport => "allexport",
            Clobber => "clobber",
            CmdLine => "cmdline",
            ErrExit => "errexit",
            Exec => "exec",
            Glob => "glob",
            HashAll => "hashall",
            Interactive => "interactive",
            Login => "login",
            Monitor => "monitor",
            Notify => "notify",
            Stdin => "stdin",
            Unset => "unset",
            Verbose => "verbose",
            XTrace => "xtrace",
        }
    }

    /// Returns the single-character name of this option and the state
    /// the character selects, if the option has one.
    #[must_use]
    pub fn short_name(self) -> std::option::Option<(char, State)> {
        match self {
            AllExport => Some(('a', On)),
            Clobber => Some(('C', Off)),
            CmdLine => Some(('c', On)),
            ErrExit => Some(('e', On)),
            Exec => Some(('n', Off)),
            Glob => Some(('f', Off)),
            HashAll => Some(('h', On)),
            Interactive => Some(('i', On)),
            Login => Some(('l', On)),
            Monitor => Some(('m', On)),
            Notify => Some(('b', On)),
            Stdin => Some(('s', On)),
            Unset => Some(('u', Off)),
            Verbose => Some(('v', On)),
            XTrace => Some(('x', On)),
        }
    }

    /// Returns the state of this option in the default option set.
    #[must_use]
    pub fn default_state(self) -> State {
        match self {
            Clobber | Exec | Glob | Unset => On,
            _ => Off,
        }
    }
}

impl Display for Option {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Error type indicating that a string does not name a valid option
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FromStrError {
    /// The input string does not match any option name.
    NoSuchOption,
    /// The input string is a prefix of more than one option name.
    Ambiguous,
}

pub use FromStrError::*;

/// Parses an option name.
///
/// The name may be abbreviated as long as it is an unambiguous prefix of
/// a valid long option name. A full option name is never considered
/// ambiguous.
impl FromStr for Option {
    type Err = FromStrError;
    fn from_str(name: &str) -> Result<Self, FromStrError> {
        const OPTIONS: &[(&str, Option)] = &[
            ("allexport", AllExport),
            ("clobber", Clobber),
            ("cmdline", CmdLine),
            ("errexit", ErrExit),
            ("exec", Exec),
            ("glob", Glob),
            ("hashall", HashAll),
            ("interactive", Interactive),
            ("login", Login),
            ("monitor", Monitor),
            ("notify", Notify),
            ("stdin", Stdin),
            ("unset", Unset),
            ("verbose", Verbose),
            ("xtrace", XTrace),
        ];

        match OPTIONS.binary_search_by_key(&name, |&(full_name, _)| full_name) {
            Ok(index) => Ok(OPTIONS[index].1),
            Err(index) => {
                let mut candidates = OPTIONS[index..]
                    .iter()
                    .filter(|&(full_name, _)| full_name.starts_with(name));
                match candidates.next() {
                    Some(first) => match candidates.next() {
                        Some(_) => Err(Ambiguous),
                        None => Ok(first.1),
                    },
                    None => Err(NoSuchOption),
                }
            }
        }
    }
}

/// Parses a short option name.
///
/// Returns the option and the state the character selects, e.g. `'e'`
/// maps to `(ErrExit, On)` and `'f'` to `(Glob, Off)`.
#[must_use]
pub fn parse_short(name: char) -> std::option::Option<(self::Option, State)> {
    EnumSet::<Option>::all()
        .iter()
        .find_map(|option| match option.short_name() {
            Some((c, state)) if c == name => Some((option, state)),
            _ => None,
        })
}

/// Collection of all option states
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionSet {
    /// Set of options that are enabled
    enabled: EnumSet<Option>,
}

impl Default for OptionSet {
    /// Returns the option set of a plain non-interactive shell.
    fn default() -> Self {
        let enabled = EnumSet::all()
            .iter()
            .filter(|option: &Option| option.default_state() == On)
            .collect();
        OptionSet { enabled }
    }
}

impl OptionSet {
    /// Returns the state of an option.
    #[must_use]
    pub fn get(&self, option: Option) -> State {
        if self.enabled.contains(option) {
            On
        } else {
            Off
        }
    }

    /// Sets the state of an option.
    pub fn set(&mut self, option: Option, state: State) {
        match state {
            On => self.enabled.insert(option),
            Off => self.enabled.remove(option),
        };
    }

    /// Computes the value of the `$-` special parameter.
    ///
    /// The result contains the short name of every option whose current
    /// state is the one its short name selects and differs from the
    /// default.
    #[must_use]
    pub fn shell_flags(&self) -> String {
        let mut flags: Vec<char> = EnumSet::<Option>::all()
            .iter()
            .filter_map(|option| {
                let (c, state) = option.short_name()?;
                if self.get(option) == state && state != option.default_state() {
                    Some(c)
                } else {
                    None
                }
            })
            .collect();
        flags.sort_unstable();
        flags.into_iter().collect()
    }
}
