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

//! Signal and other event handling settings
//!
//! A [`TrapSet`] is a mapping from [`Condition`]s to [`Action`]s. When
//! the mapping is modified, the corresponding signal disposition is
//! updated in the underlying [`System`].
//!
//! The trap set also tracks the _internal_ signal handling the shell
//! needs for itself (catching SIGINT in an interactive shell, for
//! example). The effective disposition for a signal is computed from the
//! user-defined trap and the internal requirement: a user action always
//! wins, and removing it falls back to the internal one.
//!
//! The installed handler never executes trap actions itself; it only
//! raises a pending flag. The executor drains the flags through
//! [`System::caught_signals`] at command boundaries and runs the actions
//! then.

use crate::signal;
use crate::system::{Disposition, Errno, System};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Condition under which a trap action is executed
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// The shell is exiting (condition number 0, spelled `EXIT`)
    Exit,
    /// The specified signal was delivered
    Signal(signal::Number),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Exit => "EXIT".fmt(f),
            Condition::Signal(number) => number.fmt(f),
        }
    }
}

/// Error parsing a condition
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ParseConditionError;

impl FromStr for Condition {
    type Err = ParseConditionError;

    /// Parses a condition name or number.
    ///
    /// `EXIT` and `0` name the exit condition; other conditions are
    /// spelled as a signal name (with or without the `SIG` prefix) or a
    /// signal number.
    fn from_str(s: &str) -> Result<Condition, ParseConditionError> {
        if s == "EXIT" || s == "0" {
            return Ok(Condition::Exit);
        }
        if let Ok(number) = s.parse::<i32>() {
            return signal::Number::from_raw(number)
                .map(Condition::Signal)
                .ok_or(ParseConditionError);
        }
        signal::number_from_name(s)
            .map(Condition::Signal)
            .ok_or(ParseConditionError)
    }
}

/// Action taken when the condition occurs
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Perform the default action: signal dispositions are reset, and
    /// nothing happens on exit.
    #[default]
    Default,
    /// Ignore the condition.
    Ignore,
    /// Execute the command string.
    Command(Rc<str>),
}

/// Error setting a trap action
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SetActionError {
    /// The signal was ignored on shell entry and the shell is not
    /// interactive, so it cannot be trapped.
    #[error("the signal has been ignored since the shell startup")]
    InitiallyIgnored,
    /// SIGKILL cannot be trapped.
    #[error("SIGKILL cannot be trapped")]
    SIGKILL,
    /// SIGSTOP cannot be trapped.
    #[error("SIGSTOP cannot be trapped")]
    SIGSTOP,
    /// Error in the underlying system call
    #[error("system error: {0}")]
    SystemError(Errno),
}

impl From<Errno> for SetActionError {
    fn from(errno: Errno) -> Self {
        SetActionError::SystemError(errno)
    }
}

/// Collection of trap actions and internal signal handling state
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    /// User-defined traps
    traps: BTreeMap<Condition, Action>,
    /// Signals the shell itself wants to catch
    internal_catches: BTreeSet<i32>,
    /// Signals whose initial disposition has been examined, with a flag
    /// telling whether it was `Ignore`
    touched: BTreeMap<i32, bool>,
}

impl TrapSet {
    /// Creates an empty trap set.
    #[must_use]
    pub fn new() -> TrapSet {
        Default::default()
    }

    /// Returns the action for a condition.
    #[must_use]
    pub fn get_action(&self, condition: Condition) -> &Action {
        self.traps.get(&condition).unwrap_or(&Action::Default)
    }

    /// Returns an iterator over the conditions with non-default actions.
    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &Action)> {
        self.traps.iter()
    }

    /// Computes the disposition a signal should have in the system.
    fn effective_disposition(&self, signal: signal::Number) -> Disposition {
        match self.get_action(Condition::Signal(signal)) {
            Action::Command(_) => Disposition::Catch,
            Action::Ignore => Disposition::Ignore,
            Action::Default => {
                if self.internal_catches.contains(&signal.as_raw()) {
                    Disposition::Catch
                } else {
                    Disposition::Default
                }
            }
        }
    }

    /// Applies the effective disposition for a signal to the system,
    /// recording whether the signal was initially ignored.
    ///
    /// Returns the flag telling whether the signal was ignored on shell
    /// entry.
    fn update_disposition(
        &mut self,
        system: &mut dyn System,
        signal: signal::Number,
    ) -> Result<bool, Errno> {
        let disposition = self.effective_disposition(signal);
        let old = system.sigaction(signal, disposition)?;
        let initially_ignored = *self
            .touched
            .entry(signal.as_raw())
            .or_insert(old == Disposition::Ignore);
        Ok(initially_ignored)
    }

    /// Sets the action for a condition.
    ///
    /// For a signal condition, the signal disposition in the system is
    /// updated accordingly. A signal that was ignored on entry to the
    /// shell cannot be trapped unless `override_ignore` is true, which
    /// the trap built-in sets in an interactive shell.
    pub fn set_action(
        &mut self,
        system: &mut dyn System,
        condition: Condition,
        action: Action,
        override_ignore: bool,
    ) -> Result<(), SetActionError> {
        let Condition::Signal(signal) = condition else {
            self.store(condition, action);
            return Ok(());
        };

        if signal == signal::sigkill() {
            return Err(SetActionError::SIGKILL);
        }
        if signal == signal::sigstop() {
            return Err(SetActionError::SIGSTOP);
        }

        if !override_ignore {
            if let Some(&true) = self.touched.get(&signal.as_raw()) {
                return Err(SetActionError::InitiallyIgnored);
            }
        }

        let previous = self.traps.insert(condition, action.clone());
        let initially_ignored = match self.update_disposition(system, signal) {
            Ok(flag) => flag,
            Err(errno) => {
                restore(&mut self.traps, condition, previous);
                return Err(errno.into());
            }
        };

        if initially_ignored && !override_ignore {
            // The first examination revealed the signal was ignored on
            // entry; undo everything.
            restore(&mut self.traps, condition, previous);
            system.sigaction(signal, Disposition::Ignore).ok();
            return Err(SetActionError::InitiallyIgnored);
        }

        self.store(condition, self.traps[&condition].clone());
        return Ok(());

        fn restore(
            traps: &mut BTreeMap<Condition, Action>,
            condition: Condition,
            previous: Option<Action>,
        ) {
            match previous {
                Some(action) => traps.insert(condition, action),
                None => traps.remove(&condition),
            };
        }
    }

    fn store(&mut self, condition: Condition, action: Action) {
        if action == Action::Default {
            self.traps.remove(&condition);
        } else {
            self.traps.insert(condition, action);
        }
    }

    /// Makes the shell catch a signal for its own purposes.
    ///
    /// The signal is delivered to the flag-setting handler unless a
    /// user-defined trap overrides it.
    pub fn catch_signal_internally(
        &mut self,
        system: &mut dyn System,
        signal: signal::Number,
    ) -> Result<(), Errno> {
        self.internal_catches.insert(signal.as_raw());
        self.update_disposition(system, signal)?;
        Ok(())
    }

    /// Resets traps for a subshell.
    ///
    /// Trap actions that are commands are reset to the default action,
    /// as a subshell does not inherit them. Ignored conditions stay
    /// ignored.
    pub fn enter_subshell(&mut self, system: &mut dyn System) {
        let commands: Vec<Condition> = self
            .traps
            .iter()
            .filter(|(_, action)| matches!(action, Action::Command(_)))
            .map(|(&condition, _)| condition)
            .collect();
        for condition in commands {
            self.traps.remove(&condition);
            if let Condition::Signal(signal) = condition {
                let _: Result<_, _> = self.update_disposition(system, signal);
            }
        }
    }

    /// Resets the dispositions of internally caught signals to the
    /// default, for a child process about to exec.
    pub fn disable_internal_catches(&mut self, system: &mut dyn System) {
        let signals: Vec<i32> = self.internal_catches.iter().copied().collect();
        self.internal_catches.clear();
        for raw in signals {
            if let Some(signal) = signal::Number::from_raw(raw) {
                let _: Result<_, _> = self.update_disposition(system, signal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::VirtualSystem;
    use assert_matches::assert_matches;

    fn sigterm() -> signal::Number {
        signal::number_from_name("TERM").unwrap()
    }

    #[test]
    fn condition_parsing() {
        assert_eq!("EXIT".parse(), Ok(Condition::Exit));
        assert_eq!("0".parse(), Ok(Condition::Exit));
        assert_eq!("INT".parse(), Ok(Condition::Signal(signal::sigint())));
        assert_eq!("SIGINT".parse(), Ok(Condition::Signal(signal::sigint())));
        assert_eq!(
            libc::SIGINT.to_string().parse(),
            Ok(Condition::Signal(signal::sigint()))
        );
        assert_eq!("NOPE".parse::<Condition>(), Err(ParseConditionError));
    }

    #[test]
    fn setting_a_command_trap_installs_catch() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        traps
            .set_action(
                &mut system,
                Condition::Signal(sigterm()),
                Action::Command("echo caught".into()),
                false,
            )
            .unwrap();
        assert_eq!(system.disposition(sigterm()), Disposition::Catch);
        assert_matches!(
            traps.get_action(Condition::Signal(sigterm())),
            Action::Command(command) => assert_eq!(&**command, "echo caught")
        );
    }

    #[test]
    fn resetting_a_trap_restores_default() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        traps
            .set_action(
                &mut system,
                Condition::Signal(sigterm()),
                Action::Ignore,
                false,
            )
            .unwrap();
        assert_eq!(system.disposition(sigterm()), Disposition::Ignore);

        traps
            .set_action(
                &mut system,
                Condition::Signal(sigterm()),
                Action::Default,
                false,
            )
            .unwrap();
        assert_eq!(system.disposition(sigterm()), Disposition::Default);
        assert_eq!(traps.iter().count(), 0);
    }

    #[test]
    fn initially_ignored_signal_cannot_be_trapped() {
        let mut system = VirtualSystem::new();
        system.set_initial_disposition(sigterm(), Disposition::Ignore);
        let mut traps = TrapSet::new();

        let result = traps.set_action(
            &mut system,
            Condition::Signal(sigterm()),
            Action::Command("echo".into()),
            false,
        );
        assert_eq!(result, Err(SetActionError::InitiallyIgnored));
        assert_eq!(system.disposition(sigterm()), Disposition::Ignore);
        assert_eq!(traps.get_action(Condition::Signal(sigterm())), &Action::Default);

        // An interactive shell can override the initial ignore.
        let result = traps.set_action(
            &mut system,
            Condition::Signal(sigterm()),
            Action::Command("echo".into()),
            true,
        );
        assert_eq!(result, Ok(()));
        assert_eq!(system.disposition(sigterm()), Disposition::Catch);
    }

    #[test]
    fn kill_and_stop_cannot_be_trapped() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        assert_eq!(
            traps.set_action(
                &mut system,
                Condition::Signal(signal::sigkill()),
                Action::Ignore,
                false,
            ),
            Err(SetActionError::SIGKILL)
        );
        assert_eq!(
            traps.set_action(
                &mut system,
                Condition::Signal(signal::sigstop()),
                Action::Ignore,
                false,
            ),
            Err(SetActionError::SIGSTOP)
        );
    }

    #[test]
    fn exit_trap_needs_no_disposition() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        traps
            .set_action(
                &mut system,
                Condition::Exit,
                Action::Command("echo bye".into()),
                false,
            )
            .unwrap();
        assert_matches!(traps.get_action(Condition::Exit), Action::Command(_));
    }

    #[test]
    fn subshell_resets_command_traps_but_not_ignores() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        traps
            .set_action(
                &mut system,
                Condition::Signal(sigterm()),
                Action::Command("echo".into()),
                false,
            )
            .unwrap();
        traps
            .set_action(
                &mut system,
                Condition::Signal(signal::sigquit()),
                Action::Ignore,
                false,
            )
            .unwrap();

        traps.enter_subshell(&mut system);
        assert_eq!(traps.get_action(Condition::Signal(sigterm())), &Action::Default);
        assert_eq!(system.disposition(sigterm()), Disposition::Default);
        assert_eq!(
            traps.get_action(Condition::Signal(signal::sigquit())),
            &Action::Ignore
        );
        assert_eq!(system.disposition(signal::sigquit()), Disposition::Ignore);
    }

    #[test]
    fn internal_catch_yields_to_user_trap_and_returns() {
        let mut system = VirtualSystem::new();
        let mut traps = TrapSet::new();
        traps
            .catch_signal_internally(&mut system, signal::sigint())
            .unwrap();
        assert_eq!(system.disposition(signal::sigint()), Disposition::Catch);

        traps
            .set_action(
                &mut system,
                Condition::Signal(signal::sigint()),
                Action::Ignore,
                false,
            )
            .unwrap();
        assert_eq!(system.disposition(signal::sigint()), Disposition::Ignore);

        traps
            .set_action(
                &mut system,
                Condition::Signal(signal::sigint()),
                Action::Default,
                false,
            )
            .unwrap();
        // The internal catch is still wanted.
        assert_eq!(system.disposition(signal::sigint()), Disposition::Catch);
    }
}
