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

//! Continue built-in
//!
//! **`continue [n]`** resumes the next iteration of the *n*th innermost
//! enclosing loop. The operand handling is shared with the break
//! built-in.

use crate::r#break::enclosing_loop_count;
use posh_env::builtin::Result;
use posh_env::semantics::{Divert, ExitStatus, Field};
use posh_env::Env;

/// Entry point for executing the `continue` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match enclosing_loop_count(env, "continue", &args) {
        Ok(Some(count)) => Result::from(Divert::Continue { count: count - 1 }),
        Ok(None) => Result::new(ExitStatus::SUCCESS),
        Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::stack::Frame;

    #[test]
    fn continue_diverts_with_count() {
        let mut env = Env::new_virtual();
        let mut env = env.push_frame(Frame::Loop);
        let result = main(&mut env, Field::dummies(["1"]));
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Continue { count: 0 })
        );
    }
}
