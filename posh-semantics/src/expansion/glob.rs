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

//! Pathname expansion
//!
//! A field containing an unquoted `*`, `?` or `[` is matched against the
//! file system, one pattern component per pathname component. On zero
//! matches the field is kept as is, with quote removal applied. The
//! whole stage is skipped when the `Glob` option is off.

use super::attr::{AttrField, Origin};
use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::Field;
use posh_env::Env;
use posh_fnmatch::{Config, Pattern, PatternChar};
use std::ffi::CString;

/// Joins a candidate path and an entry name.
fn join(candidate: &str, name: &str) -> String {
    if candidate.is_empty() {
        name.to_string()
    } else if candidate.ends_with('/') {
        format!("{candidate}{name}")
    } else {
        format!("{candidate}/{name}")
    }
}

/// Returns the directory to scan for the given candidate prefix.
fn dir_path(candidate: &str) -> &str {
    if candidate.is_empty() {
        "."
    } else {
        candidate
    }
}

fn to_c_string(path: &str) -> Option<CString> {
    CString::new(path).ok()
}

/// Performs pathname expansion on a field.
pub fn glob(env: &mut Env, field: AttrField) -> Vec<Field> {
    if env.options.get(ShellOption::Glob) == State::Off {
        return vec![field.remove_quotes()];
    }

    // Translate the field into pattern characters, noting whether any
    // unquoted metacharacter makes the walk worthwhile.
    let mut has_metachar = false;
    let chars: Vec<PatternChar> = field
        .chars
        .iter()
        .filter(|c| !c.is_quoting)
        .map(|c| {
            let active = !c.is_quoted && c.origin != Origin::HardExpansion;
            if active {
                if matches!(c.value, '*' | '?' | '[') {
                    has_metachar = true;
                }
                PatternChar::Normal(c.value)
            } else {
                PatternChar::Literal(c.value)
            }
        })
        .collect();

    if !has_metachar {
        return vec![field.remove_quotes()];
    }

    // Split the pattern into pathname components.
    let mut components: Vec<Vec<PatternChar>> = vec![Vec::new()];
    for c in &chars {
        if c.char_value() == '/' {
            components.push(Vec::new());
        } else {
            components.last_mut().unwrap().push(*c);
        }
    }

    let absolute = components.first().is_some_and(Vec::is_empty);
    if absolute {
        components.remove(0);
    }
    let require_directory = components.last().is_some_and(Vec::is_empty);
    components.retain(|component| !component.is_empty());

    let mut candidates: Vec<String> = if absolute {
        vec!["/".to_string()]
    } else {
        vec![String::new()]
    };

    let config = Config::with_literal_period(true);
    for component in &components {
        let is_pattern = component.iter().any(|c| {
            matches!(c, PatternChar::Normal('*' | '?' | '['))
        });

        if is_pattern {
            let Ok(pattern) =
                Pattern::parse_with_config(component.iter().copied(), config)
            else {
                // An uncompilable component matches nothing.
                candidates.clear();
                break;
            };
            let mut next = Vec::new();
            for candidate in &candidates {
                let Some(dir) = to_c_string(dir_path(candidate)) else {
                    continue;
                };
                let Ok(mut entries) = env.system.read_dir(&dir) else {
                    continue;
                };
                entries.sort();
                for entry in entries {
                    if pattern.is_match(&entry) {
                        next.push(join(candidate, &entry));
                    }
                }
            }
            candidates = next;
        } else {
            let literal: String = component.iter().map(|c| c.char_value()).collect();
            for candidate in &mut candidates {
                *candidate = join(candidate, &literal);
            }
        }
    }

    // Keep only paths that actually exist, honoring a trailing slash.
    candidates.retain(|candidate| match to_c_string(candidate) {
        Some(path) => {
            if require_directory {
                env.system.is_directory(&path)
            } else {
                env.system.path_exists(&path)
            }
        }
        None => false,
    });
    candidates.sort();

    if candidates.is_empty() {
        // No match: the pattern is kept literally.
        return vec![field.remove_quotes()];
    }

    let origin = field.origin;
    candidates
        .into_iter()
        .map(|mut value| {
            if require_directory && !value.ends_with('/') {
                value.push('/');
            }
            Field {
                value,
                origin,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::source::Location;

    fn unquoted_field(s: &str) -> AttrField {
        AttrField {
            chars: s
                .chars()
                .map(|value| super::super::attr::AttrChar {
                    value,
                    origin: Origin::Literal,
                    is_quoted: false,
                    is_quoting: false,
                })
                .collect(),
            origin: Location::dummy(),
        }
    }

    fn test_env() -> Env {
        let mut env = Env::new_virtual();
        let system = env.virtual_system_mut();
        system.create_file("/src/main.rs", *b"");
        system.create_file("/src/lib.rs", *b"");
        system.create_file("/src/notes.txt", *b"");
        system.create_file("/src/sub/deep.rs", *b"");
        system.create_file("/.hidden", *b"");
        system.create_file("/visible", *b"");
        env
    }

    fn glob_values(env: &mut Env, s: &str) -> Vec<String> {
        glob(env, unquoted_field(s))
            .into_iter()
            .map(|f| f.value)
            .collect()
    }

    #[test]
    fn matches_are_sorted() {
        let mut env = test_env();
        assert_eq!(
            glob_values(&mut env, "/src/*.rs"),
            ["/src/lib.rs", "/src/main.rs"]
        );
    }

    #[test]
    fn question_mark_and_brackets() {
        let mut env = test_env();
        assert_eq!(glob_values(&mut env, "/src/????.rs"), ["/src/main.rs"]);
        assert_eq!(glob_values(&mut env, "/src/[lm]*.rs"), ["/src/lib.rs", "/src/main.rs"]);
    }

    #[test]
    fn no_match_keeps_pattern() {
        let mut env = test_env();
        assert_eq!(glob_values(&mut env, "/src/*.nope"), ["/src/*.nope"]);
    }

    #[test]
    fn leading_period_needs_explicit_match() {
        let mut env = test_env();
        assert_eq!(glob_values(&mut env, "/*e*"), ["/visible"]);
        assert_eq!(glob_values(&mut env, "/.h*"), ["/.hidden"]);
    }

    #[test]
    fn intermediate_pattern_components() {
        let mut env = test_env();
        assert_eq!(glob_values(&mut env, "/s*/deep.rs"), ["/s*/deep.rs"]);
        assert_eq!(glob_values(&mut env, "/*/sub/*.rs"), ["/src/sub/deep.rs"]);
    }

    #[test]
    fn trailing_slash_requires_directory() {
        let mut env = test_env();
        assert_eq!(glob_values(&mut env, "/sr*/"), ["/src/"]);
    }

    #[test]
    fn quoted_metacharacters_do_not_glob() {
        let mut env = test_env();
        let mut field = unquoted_field("/src/*.rs");
        for c in &mut field.chars {
            c.is_quoted = true;
        }
        let fields = glob(&mut env, field);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "/src/*.rs");
    }

    #[test]
    fn noglob_disables_expansion() {
        let mut env = test_env();
        env.options.set(ShellOption::Glob, State::Off);
        assert_eq!(glob_values(&mut env, "/src/*.rs"), ["/src/*.rs"]);
    }
}
