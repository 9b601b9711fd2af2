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

//! Initial expansion
//!
//! The initial expansion walks the units of a word and produces
//! [attributed characters](super::attr): tilde expansion, parameter
//! expansion with all its modifiers, command substitution, and
//! arithmetic expansion, all in a single pass that remembers quoting.
//!
//! A word usually expands to one field; `$@` produces one field per
//! positional parameter, and `"$@"` with no positional parameters
//! produces no field at all.

use super::attr::{AttrChar, AttrField, Origin};
use super::{Error, ErrorCause, Result};
use posh_env::option::{Option as ShellOption, State};
use posh_env::variable::{Scope, VariableSet};
use posh_env::Env;
use posh_fnmatch::{Pattern, PatternChar};
use posh_syntax::source::Location;
use posh_syntax::syntax::*;

/// Adapter exposing shell variables to the arithmetic evaluator
struct ArithEnv<'a>(&'a VariableSet);

impl posh_arith::Env for ArithEnv<'_> {
    fn get_variable(&self, name: &str) -> Option<&str> {
        self.0.get_scalar(name)
    }
}

/// Looked-up value of a parameter
#[derive(Clone, Debug)]
enum Value {
    /// The parameter is unset.
    Unset,
    /// Single string value
    Scalar(String),
    /// One value per positional parameter (`$@` and `$*`)
    Params(Vec<String>),
}

impl Value {
    /// Returns whether the value triggers a `:`-conditioned switch.
    fn is_vacant(&self) -> bool {
        match self {
            Value::Unset => true,
            Value::Scalar(value) => value.is_empty(),
            Value::Params(values) => values.is_empty(),
        }
    }
}

/// In-progress expansion of one word
struct Expander<'e> {
    env: &'e mut Env,
    /// Fields being built; always non-empty
    fields: Vec<Vec<AttrChar>>,
    /// Index of a field to be removed if it ends up containing only
    /// quoting characters, which implements `"$@"` with no positional
    /// parameters expanding to no field
    removable_field: Option<usize>,
}

impl<'e> Expander<'e> {
    fn new(env: &'e mut Env) -> Self {
        Expander {
            env,
            fields: vec![Vec::new()],
            removable_field: None,
        }
    }

    fn push(&mut self, c: AttrChar) {
        if !c.is_quoting && self.removable_field == Some(self.fields.len() - 1) {
            self.removable_field = None;
        }
        self.fields.last_mut().unwrap().push(c);
    }

    fn push_char(&mut self, value: char, origin: Origin, is_quoted: bool) {
        self.push(AttrChar {
            value,
            origin,
            is_quoted,
            is_quoting: false,
        });
    }

    fn push_quoting(&mut self, value: char) {
        self.push(AttrChar {
            value,
            origin: Origin::Literal,
            is_quoted: false,
            is_quoting: true,
        });
    }

    fn push_str(&mut self, value: &str, origin: Origin, is_quoted: bool) {
        for c in value.chars() {
            self.push_char(c, origin, is_quoted);
        }
    }

    /// Ends the current field and starts a new one.
    fn break_field(&mut self) {
        self.fields.push(Vec::new());
    }

    /// Marks the current field for removal if nothing is added to it.
    fn mark_removable(&mut self) {
        let index = self.fields.len() - 1;
        if self.fields[index].iter().all(|c| c.is_quoting) {
            self.removable_field = Some(index);
        }
    }

    fn finish(mut self, origin: Location) -> Vec<AttrField> {
        if let Some(index) = self.removable_field {
            if self.fields[index].iter().all(|c| c.is_quoting) {
                self.fields.remove(index);
            }
        }
        self.fields
            .into_iter()
            .map(|chars| AttrField { chars, origin })
            .collect()
    }

    fn expand_word_units(&mut self, units: &[WordUnit], quoted: bool) -> Result<()> {
        for unit in units {
            match unit {
                Unquoted(unit) => self.expand_text_unit(unit, quoted)?,
                SingleQuote(value) => {
                    self.push_quoting('\'');
                    for c in value.chars() {
                        self.push_char(c, Origin::Literal, true);
                    }
                    self.push_quoting('\'');
                }
                DoubleQuote(Text(units)) => {
                    self.push_quoting('"');
                    for unit in units {
                        self.expand_text_unit(unit, true)?;
                    }
                    self.push_quoting('"');
                }
                Tilde(name) => self.expand_tilde(name),
            }
        }
        Ok(())
    }

    fn expand_text_unit(&mut self, unit: &TextUnit, quoted: bool) -> Result<()> {
        match unit {
            Literal(value) => self.push_char(*value, Origin::Literal, quoted),
            Backslashed(value) => {
                self.push(AttrChar {
                    value: '\\',
                    origin: Origin::Literal,
                    is_quoted: quoted,
                    is_quoting: true,
                });
                self.push_char(*value, Origin::Literal, true);
            }
            RawParam { param, location } => {
                self.expand_param(param, &Modifier::None, location, quoted)?;
            }
            BracedParam(braced) => {
                self.expand_param(&braced.param, &braced.modifier, &braced.location, quoted)?;
            }
            CommandSubst { content, location } => {
                let output =
                    super::expand_command_substitution(self.env, content, location)?;
                self.push_str(&output, Origin::SoftExpansion, quoted);
            }
            Backquote { content, location } => {
                let mut command = String::new();
                for unit in content {
                    match unit {
                        BackquoteUnit::Literal(c) => command.push(*c),
                        BackquoteUnit::Backslashed(c) => command.push(*c),
                    }
                }
                let output =
                    super::expand_command_substitution(self.env, &command, location)?;
                self.push_str(&output, Origin::SoftExpansion, quoted);
            }
            Arith { content, location } => {
                let expression = expand_text_to_string(self.env, content)?;
                match posh_arith::eval(&expression, &ArithEnv(&self.env.variables)) {
                    Ok(value) => {
                        self.push_str(&value.to_string(), Origin::SoftExpansion, quoted);
                    }
                    Err(error) => {
                        return Err(Error {
                            cause: ErrorCause::Arith(error.cause),
                            location: *location,
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Expands a tilde prefix to the home directory.
    ///
    /// An empty name expands to `$HOME`; a user name is resolved through
    /// the system. The result is not subject to field splitting or
    /// pathname expansion. If the name cannot be resolved, the original
    /// characters are kept unchanged.
    fn expand_tilde(&mut self, name: &str) {
        let home = if name.is_empty() {
            self.env
                .variables
                .get_scalar(posh_env::variable::HOME)
                .map(ToString::to_string)
        } else {
            self.env.system.home_dir(name)
        };
        match home {
            Some(home) => self.push_str(&home, Origin::HardExpansion, false),
            None => {
                self.push_char('~', Origin::Literal, false);
                self.push_str(name, Origin::Literal, false);
            }
        }
    }

    /// Looks up the value of a parameter.
    fn lookup(&mut self, param: &Param) -> Value {
        match param.r#type {
            ParamType::Variable => match self.env.variables.get_scalar(&param.id) {
                Some(value) => Value::Scalar(value.to_string()),
                None => Value::Unset,
            },
            ParamType::Positional(index) => {
                let values = &self.env.variables.positional_params().values;
                match index.checked_sub(1).and_then(|i| values.get(i)) {
                    Some(value) => Value::Scalar(value.clone()),
                    None => Value::Unset,
                }
            }
            ParamType::Special(special) => self.lookup_special(special),
        }
    }

    fn lookup_special(&mut self, special: SpecialParam) -> Value {
        use SpecialParam::*;
        match special {
            At | Asterisk => {
                Value::Params(self.env.variables.positional_params().values.clone())
            }
            Number => {
                Value::Scalar(self.env.variables.positional_params().values.len().to_string())
            }
            Question => Value::Scalar(self.env.exit_status.to_string()),
            Hyphen => Value::Scalar(self.env.options.shell_flags()),
            Dollar => Value::Scalar(self.env.main_pid.to_string()),
            Exclamation => match self.env.jobs.last_async_pid() {
                Some(pid) => Value::Scalar(pid.to_string()),
                None => Value::Scalar(String::new()),
            },
            Zero => Value::Scalar(self.env.arg0.clone()),
        }
    }

    /// Expands a parameter with its modifier.
    fn expand_param(
        &mut self,
        param: &Param,
        modifier: &Modifier,
        location: &Location,
        quoted: bool,
    ) -> Result<()> {
        let value = self.lookup(param);

        match modifier {
            Modifier::None => self.push_value(value, param, location, quoted),

            Modifier::Length => {
                let length = match value {
                    Value::Unset => 0,
                    Value::Scalar(value) => value.len(),
                    Value::Params(values) => values.len(),
                };
                self.push_str(&length.to_string(), Origin::SoftExpansion, quoted);
                Ok(())
            }

            Modifier::Switch(switch) => {
                let triggered = match switch.condition {
                    SwitchCondition::Unset => matches!(value, Value::Unset),
                    SwitchCondition::UnsetOrEmpty => value.is_vacant(),
                };
                match switch.r#type {
                    SwitchType::Default => {
                        if triggered {
                            self.expand_word_units(&switch.word.units, quoted)
                        } else {
                            self.push_value(value, param, location, quoted)
                        }
                    }
                    SwitchType::Alter => {
                        if triggered {
                            Ok(())
                        } else {
                            self.expand_word_units(&switch.word.units, quoted)
                        }
                    }
                    SwitchType::Assign => {
                        if triggered {
                            if param.r#type != ParamType::Variable {
                                return Err(Error {
                                    cause: ErrorCause::NotAssignable {
                                        name: param.id.clone(),
                                    },
                                    location: *location,
                                });
                            }
                            let text =
                                super::expand_word_to_string(self.env, &switch.word)?;
                            self.env
                                .get_or_create_variable(param.id.clone(), Scope::Global)
                                .assign(text.clone())
                                .map_err(|_| Error {
                                    cause: ErrorCause::AssignReadOnly {
                                        name: param.id.clone(),
                                    },
                                    location: *location,
                                })?;
                            self.push_str(&text, Origin::SoftExpansion, quoted);
                            Ok(())
                        } else {
                            self.push_value(value, param, location, quoted)
                        }
                    }
                    SwitchType::Error => {
                        if triggered {
                            let message = if switch.word.units.is_empty() {
                                None
                            } else {
                                Some(super::expand_word_to_string(self.env, &switch.word)?)
                            };
                            Err(Error {
                                cause: ErrorCause::VacantParameter {
                                    name: param.id.clone(),
                                    message,
                                },
                                location: *location,
                            })
                        } else {
                            self.push_value(value, param, location, quoted)
                        }
                    }
                }
            }

            Modifier::Trim(trim) => {
                let value = match value {
                    Value::Unset => {
                        self.check_unset(param, location)?;
                        String::new()
                    }
                    Value::Scalar(value) => value,
                    Value::Params(values) => values.join(" "),
                };
                let trimmed = apply_trim(self.env, &value, trim)?;
                self.push_str(&trimmed, Origin::SoftExpansion, quoted);
                Ok(())
            }
        }
    }

    /// Reports an error if the `Unset` option requires unset parameters
    /// to be diagnosed.
    fn check_unset(&self, param: &Param, location: &Location) -> Result<()> {
        if self.env.options.get(ShellOption::Unset) == State::Off {
            Err(Error {
                cause: ErrorCause::UnsetParameter {
                    name: param.id.clone(),
                },
                location: *location,
            })
        } else {
            Ok(())
        }
    }

    /// Pushes the value of a parameter with no modifier applied.
    fn push_value(
        &mut self,
        value: Value,
        param: &Param,
        location: &Location,
        quoted: bool,
    ) -> Result<()> {
        match value {
            Value::Unset => self.check_unset(param, location),
            Value::Scalar(value) => {
                self.push_str(&value, Origin::SoftExpansion, quoted);
                Ok(())
            }
            Value::Params(values) => {
                let separate_fields =
                    quoted && param.r#type == ParamType::Special(SpecialParam::At);
                if separate_fields {
                    if values.is_empty() {
                        self.mark_removable();
                        return Ok(());
                    }
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            self.break_field();
                        }
                        self.push_str(value, Origin::SoftExpansion, true);
                    }
                } else if quoted {
                    // "$*" joins with the first IFS character.
                    let separator = self.join_separator();
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            if let Some(separator) = separator {
                                self.push_char(separator, Origin::SoftExpansion, true);
                            }
                        }
                        self.push_str(value, Origin::SoftExpansion, true);
                    }
                } else {
                    // Unquoted $@ and $* produce one provisional field
                    // per parameter; field splitting refines them.
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            self.break_field();
                        }
                        self.push_str(value, Origin::SoftExpansion, false);
                    }
                }
                Ok(())
            }
        }
    }

    /// Returns the character that joins `"$*"` values.
    fn join_separator(&self) -> Option<char> {
        match self.env.variables.get_scalar(posh_env::variable::IFS) {
            Some(ifs) => ifs.chars().next(),
            None => Some(' '),
        }
    }
}

/// Applies a trim modifier to a parameter value.
fn apply_trim(env: &mut Env, value: &str, trim: &Trim) -> Result<String> {
    let pattern_field = expand_word_attr_single(env, &trim.pattern)?;
    let pattern_chars: Vec<PatternChar> = pattern_field
        .chars
        .iter()
        .filter(|c| !c.is_quoting)
        .map(|c| {
            if c.is_quoted {
                PatternChar::Literal(c.value)
            } else {
                PatternChar::Normal(c.value)
            }
        })
        .collect();

    let Ok(pattern) = Pattern::parse(pattern_chars) else {
        // An invalid pattern matches nothing; the value stays intact.
        return Ok(value.to_string());
    };

    // Character boundaries of the value, in ascending order. The order
    // of examination decides whether the shortest or longest match
    // wins: the first matching boundary is used.
    let mut boundaries: Vec<usize> = value
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(value.len()))
        .collect();
    let ascending = match (trim.side, trim.length) {
        // The prefix grows with the boundary index.
        (TrimSide::Prefix, TrimLength::Shortest) => true,
        (TrimSide::Prefix, TrimLength::Longest) => false,
        // The suffix shrinks as its start index grows.
        (TrimSide::Suffix, TrimLength::Shortest) => false,
        (TrimSide::Suffix, TrimLength::Longest) => true,
    };
    if !ascending {
        boundaries.reverse();
    }

    for i in boundaries {
        match trim.side {
            TrimSide::Prefix => {
                if pattern.is_match(&value[..i]) {
                    return Ok(value[i..].to_string());
                }
            }
            TrimSide::Suffix => {
                if pattern.is_match(&value[i..]) {
                    return Ok(value[..i].to_string());
                }
            }
        }
    }
    Ok(value.to_string())
}

/// Performs the initial expansion of a word, returning attributed
/// fields.
pub fn expand_word_attr(env: &mut Env, word: &Word) -> Result<Vec<AttrField>> {
    let mut expander = Expander::new(env);
    expander.expand_word_units(&word.units, false)?;
    Ok(expander.finish(word.location))
}

/// Performs the initial expansion of a word into a single attributed
/// field, joining multiple fields with spaces.
pub fn expand_word_attr_single(env: &mut Env, word: &Word) -> Result<AttrField> {
    let mut fields = expand_word_attr(env, word)?.into_iter();
    let mut result = fields
        .next()
        .unwrap_or_else(|| AttrField::new(word.location));
    for field in fields {
        result.chars.push(AttrChar {
            value: ' ',
            origin: Origin::SoftExpansion,
            is_quoted: false,
            is_quoting: false,
        });
        result.chars.extend(field.chars);
    }
    Ok(result)
}

/// Expands a text to a plain string.
pub fn expand_text_to_string(env: &mut Env, text: &Text) -> Result<String> {
    let mut expander = Expander::new(env);
    for unit in &text.0 {
        expander.expand_text_unit(unit, false)?;
    }
    let fields = expander.finish(Location::dummy());
    Ok(fields
        .into_iter()
        .map(|field| field.remove_quotes().value)
        .collect::<Vec<String>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn word(s: &str) -> Word {
        Word::from_str(s).unwrap()
    }

    fn expand_values(env: &mut Env, s: &str) -> Vec<String> {
        expand_word_attr(env, &word(s))
            .unwrap()
            .into_iter()
            .map(|f| f.remove_quotes().value)
            .collect()
    }

    fn set_params(env: &mut Env, values: &[&str]) {
        env.variables.positional_params_mut().values =
            values.iter().map(ToString::to_string).collect();
    }

    #[test]
    fn switch_modifiers() {
        let mut env = Env::new_virtual();
        assert_eq!(expand_values(&mut env, "${x:-default}"), ["default"]);
        assert_eq!(expand_values(&mut env, "${x:+alt}"), [""]);

        env.variables
            .get_or_new("x", Scope::Global)
            .assign("set")
            .unwrap();
        assert_eq!(expand_values(&mut env, "${x:-default}"), ["set"]);
        assert_eq!(expand_values(&mut env, "${x:+alt}"), ["alt"]);
        assert_eq!(expand_values(&mut env, "${x+alt}"), ["alt"]);

        env.variables
            .get_or_new("e", Scope::Global)
            .assign("")
            .unwrap();
        // Without the colon, an empty value does not trigger the switch.
        assert_eq!(expand_values(&mut env, "${e-default}"), [""]);
        assert_eq!(expand_values(&mut env, "${e:-default}"), ["default"]);
    }

    #[test]
    fn assign_modifier_updates_variable() {
        let mut env = Env::new_virtual();
        assert_eq!(expand_values(&mut env, "${x:=new}"), ["new"]);
        assert_eq!(env.variables.get_scalar("x"), Some("new"));
    }

    #[test]
    fn assign_modifier_fails_on_read_only() {
        let mut env = Env::new_virtual();
        let mut var = env.variables.get_or_new("r", Scope::Global);
        var.assign("").unwrap();
        var.make_read_only(Location::dummy());
        // The value is empty, so := triggers and fails.
        let e = expand_word_attr(&mut env, &word("${r:=new}")).unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::AssignReadOnly {
                name: "r".to_string()
            }
        );
        assert_eq!(env.variables.get_scalar("r"), Some(""));
    }

    #[test]
    fn error_modifier() {
        let mut env = Env::new_virtual();
        let e = expand_word_attr(&mut env, &word("${x:?no good}")).unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::VacantParameter {
                name: "x".to_string(),
                message: Some("no good".to_string()),
            }
        );

        let e = expand_word_attr(&mut env, &word("${x:?}")).unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::VacantParameter {
                name: "x".to_string(),
                message: None,
            }
        );
    }

    #[test]
    fn length_modifier() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("hello")
            .unwrap();
        assert_eq!(expand_values(&mut env, "${#x}"), ["5"]);
        assert_eq!(expand_values(&mut env, "${#unset}"), ["0"]);
        set_params(&mut env, &["a", "b", "c"]);
        assert_eq!(expand_values(&mut env, "${#}"), ["3"]);
    }

    #[test]
    fn trim_modifiers() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("f", Scope::Global)
            .assign("a/b/c.txt")
            .unwrap();
        assert_eq!(expand_values(&mut env, "${f%.txt}"), ["a/b/c"]);
        assert_eq!(expand_values(&mut env, "${f%/*}"), ["a/b"]);
        assert_eq!(expand_values(&mut env, "${f%%/*}"), ["a"]);
        assert_eq!(expand_values(&mut env, "${f#*/}"), ["b/c.txt"]);
        assert_eq!(expand_values(&mut env, "${f##*/}"), ["c.txt"]);
        // No match leaves the value intact.
        assert_eq!(expand_values(&mut env, "${f%xyz}"), ["a/b/c.txt"]);
    }

    #[test]
    fn trim_with_quoted_pattern_characters() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("a*b")
            .unwrap();
        // A quoted asterisk matches itself only.
        assert_eq!(expand_values(&mut env, "${x#a'*'}"), ["b"]);
    }

    #[test]
    fn special_parameters() {
        let mut env = Env::new_virtual();
        env.arg0 = "posh".to_string();
        env.exit_status = posh_env::semantics::ExitStatus(3);
        set_params(&mut env, &["one", "two"]);
        assert_eq!(expand_values(&mut env, "$#"), ["2"]);
        assert_eq!(expand_values(&mut env, "$?"), ["3"]);
        assert_eq!(expand_values(&mut env, "$0"), ["posh"]);
        assert_eq!(expand_values(&mut env, "$1-$2"), ["one-two"]);
    }

    #[test]
    fn quoted_at_expands_to_one_field_per_parameter() {
        let mut env = Env::new_virtual();
        set_params(&mut env, &["a b", "c"]);
        assert_eq!(expand_values(&mut env, "\"$@\""), ["a b", "c"]);
        assert_eq!(expand_values(&mut env, "\"x$@\""), ["xa b", "c"]);
        assert_eq!(expand_values(&mut env, "\"$@\"y"), ["a b", "cy"]);
    }

    #[test]
    fn quoted_at_with_no_parameters_expands_to_no_field() {
        let mut env = Env::new_virtual();
        set_params(&mut env, &[]);
        assert_eq!(expand_values(&mut env, "\"$@\""), Vec::<String>::new());
        // With adjacent content the field survives.
        assert_eq!(expand_values(&mut env, "\"x$@\""), ["x"]);
    }

    #[test]
    fn quoted_asterisk_joins_with_first_ifs_character() {
        let mut env = Env::new_virtual();
        set_params(&mut env, &["a", "b", "c"]);
        assert_eq!(expand_values(&mut env, "\"$*\""), ["a b c"]);

        env.variables
            .get_or_new(posh_env::variable::IFS, Scope::Global)
            .assign(":-")
            .unwrap();
        assert_eq!(expand_values(&mut env, "\"$*\""), ["a:b:c"]);

        env.variables
            .get_or_new(posh_env::variable::IFS, Scope::Global)
            .assign("")
            .unwrap();
        assert_eq!(expand_values(&mut env, "\"$*\""), ["abc"]);
    }

    #[test]
    fn quoted_asterisk_with_no_parameters_is_one_empty_field() {
        let mut env = Env::new_virtual();
        set_params(&mut env, &[]);
        assert_eq!(expand_values(&mut env, "\"$*\""), [""]);
    }

    #[test]
    fn unset_parameter_with_nounset() {
        let mut env = Env::new_virtual();
        env.options.set(ShellOption::Unset, State::Off);
        let e = expand_word_attr(&mut env, &word("$nope")).unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::UnsetParameter {
                name: "nope".to_string()
            }
        );
        // A default switch rescues the expansion.
        assert_eq!(expand_values(&mut env, "${nope:-ok}"), ["ok"]);
    }

    #[test]
    fn tilde_expansion() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("HOME", Scope::Global)
            .assign("/home/me")
            .unwrap();
        env.virtual_system_mut()
            .home_dirs
            .insert("alice".to_string(), "/home/alice".to_string());

        let mut w = word("~/docs");
        w.parse_tilde_front();
        assert_eq!(
            expand_word_attr(&mut env, &w).unwrap()[0]
                .clone()
                .remove_quotes()
                .value,
            "/home/me/docs"
        );

        let mut w = word("~alice");
        w.parse_tilde_front();
        assert_eq!(
            expand_word_attr(&mut env, &w).unwrap()[0]
                .clone()
                .remove_quotes()
                .value,
            "/home/alice"
        );

        // Unknown user names stay unchanged.
        let mut w = word("~nobody");
        w.parse_tilde_front();
        assert_eq!(
            expand_word_attr(&mut env, &w).unwrap()[0]
                .clone()
                .remove_quotes()
                .value,
            "~nobody"
        );
    }

    #[test]
    fn heredoc_style_text_expansion() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("value")
            .unwrap();
        let text = Text::from_literal_chars("line1\n".chars());
        assert_eq!(expand_text_to_string(&mut env, &text).unwrap(), "line1\n");
    }
}
