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

//! Implementations of [`Display`] for the shell language syntax types
//!
//! The `Display` implementations produce single-line canonical source
//! code with here-document contents omitted. When a [`List`] is formatted
//! with the alternate flag (`{:#}`), every item is followed by its
//! terminating `;` or `&` and a space, which is the form needed inside
//! compound commands (`{ foo; }`).

use super::*;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter, Write};

impl Display for SpecialParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use SpecialParam::*;
        let c = match self {
            At => '@',
            Asterisk => '*',
            Number => '#',
            Question => '?',
            Hyphen => '-',
            Dollar => '$',
            Exclamation => '!',
            Zero => '0',
        };
        f.write_char(c)
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl Display for SwitchType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use SwitchType::*;
        let c = match self {
            Alter => '+',
            Default => '-',
            Assign => '=',
            Error => '?',
        };
        f.write_char(c)
    }
}

impl Display for SwitchCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SwitchCondition::Unset => Ok(()),
            SwitchCondition::UnsetOrEmpty => f.write_char(':'),
        }
    }
}

impl Display for Switch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.condition, self.r#type, self.word)
    }
}

impl Display for Trim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let c = match self.side {
            TrimSide::Prefix => '#',
            TrimSide::Suffix => '%',
        };
        f.write_char(c)?;
        if self.length == TrimLength::Longest {
            f.write_char(c)?;
        }
        self.pattern.fmt(f)
    }
}

impl Display for BracedParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.modifier {
            Modifier::None => write!(f, "${{{}}}", self.param),
            Modifier::Length => write!(f, "${{#{}}}", self.param),
            Modifier::Switch(switch) => write!(f, "${{{}{}}}", self.param, switch),
            Modifier::Trim(trim) => write!(f, "${{{}{}}}", self.param, trim),
        }
    }
}

impl Display for TextUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal(c) => f.write_char(*c),
            Backslashed(c) => write!(f, "\\{c}"),
            RawParam { param, .. } => write!(f, "${param}"),
            BracedParam(param) => param.fmt(f),
            CommandSubst { content, .. } => write!(f, "$({content})"),
            Backquote { content, .. } => {
                f.write_char('`')?;
                for unit in content {
                    match unit {
                        BackquoteUnit::Literal(c) => f.write_char(*c)?,
                        BackquoteUnit::Backslashed(c) => write!(f, "\\{c}")?,
                    }
                }
                f.write_char('`')
            }
            Arith { content, .. } => write!(f, "$(({content}))"),
        }
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl Display for WordUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Unquoted(unit) => unit.fmt(f),
            SingleQuote(s) => write!(f, "'{s}'"),
            DoubleQuote(text) => write!(f, "\"{text}\""),
            Tilde(name) => write!(f, "~{name}"),
        }
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.units.iter().try_for_each(|unit| unit.fmt(f))
    }
}

impl Display for Assign {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl Display for RedirOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        let s = match self {
            FileIn => "<",
            FileInOut => "<>",
            FileOut => ">",
            FileAppend => ">>",
            FileClobber => ">|",
            FdIn => "<&",
            FdOut => ">&",
        };
        s.fmt(f)
    }
}

impl Display for Redir {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{fd}")?;
        }
        match &self.body {
            RedirBody::Normal { operator, operand } => write!(f, "{operator}{operand}"),
            RedirBody::HereDoc(here_doc) => {
                let op = if here_doc.remove_tabs { "<<-" } else { "<<" };
                write!(f, "{op}{}", here_doc.delimiter)
            }
        }
    }
}

impl Display for SimpleCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut space = |f: &mut Formatter<'_>| {
            if std::mem::replace(&mut first, false) {
                Ok(())
            } else {
                f.write_char(' ')
            }
        };
        for assign in &self.assigns {
            space(f)?;
            assign.fmt(f)?;
        }
        for word in &self.words {
            space(f)?;
            word.fmt(f)?;
        }
        for redir in self.redirs.iter() {
            space(f)?;
            redir.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for CaseItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) {};;",
            self.patterns.iter().format(" | "),
            self.body
        )
    }
}

impl Display for CompoundCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use CompoundCommand::*;
        match self {
            Grouping(list) => write!(f, "{{ {list:#}}}"),
            Subshell { body, .. } => write!(f, "({body})"),
            For { name, values, body } => {
                write!(f, "for {name}")?;
                if let Some(values) = values {
                    f.write_str(" in")?;
                    for value in values {
                        write!(f, " {value}")?;
                    }
                    f.write_char(';')?;
                }
                write!(f, " do {body:#}done")
            }
            While { condition, body } => write!(f, "while {condition:#}do {body:#}done"),
            Until { condition, body } => write!(f, "until {condition:#}do {body:#}done"),
            If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                write!(f, "if {condition:#}then {body:#}")?;
                for ElifThen { condition, body } in elifs {
                    write!(f, "elif {condition:#}then {body:#}")?;
                }
                if let Some(r#else) = r#else {
                    write!(f, "else {else:#}")?;
                }
                f.write_str("fi")
            }
            Case { subject, items } => {
                write!(f, "case {subject} in")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(" esac")
            }
        }
    }
}

impl Display for FullCompoundCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.command.fmt(f)?;
        self.redirs.iter().try_for_each(|redir| write!(f, " {redir}"))
    }
}

impl Display for FunctionDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.has_keyword {
            f.write_str("function ")?;
        }
        write!(f, "{}() {}", self.name, self.body)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(c) => c.fmt(f),
            Command::Compound(c) => c.fmt(f),
            Command::Function(c) => c.fmt(f),
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.negation {
            f.write_str("! ")?;
        }
        write!(f, "{}", self.commands.iter().format(" | "))
    }
}

impl Display for AndOr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AndOr::AndThen => f.write_str("&&"),
            AndOr::OrElse => f.write_str("||"),
        }
    }
}

impl Display for AndOrList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.first.fmt(f)?;
        self.rest
            .iter()
            .try_for_each(|(op, pipeline)| write!(f, " {op} {pipeline}"))
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.and_or.fmt(f)?;
        if self.async_flag.is_some() {
            f.write_char('&')?;
        }
        Ok(())
    }
}

impl Display for List {
    /// In the normal form, items are separated by `; `, with `&` attached
    /// to asynchronous items. In the alternate form (`{:#}`), every item
    /// including the last is followed by its terminator and a space.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut items = self.0.iter().peekable();
        while let Some(item) = items.next() {
            item.fmt(f)?;
            let last = items.peek().is_none();
            if f.alternate() {
                if item.async_flag.is_none() {
                    f.write_char(';')?;
                }
                f.write_char(' ')?;
            } else if !last {
                if item.async_flag.is_none() {
                    f.write_char(';')?;
                }
                f.write_char(' ')?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse_and_print(code: &str) -> String {
        List::from_str(code).unwrap().to_string()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_and_print("echo  foo   bar"), "echo foo bar");
        assert_eq!(parse_and_print("a=1 b=2 cmd"), "a=1 b=2 cmd");
        assert_eq!(parse_and_print("cmd >out 2>&1 <in"), "cmd >out 2>&1 <in");
    }

    #[test]
    fn quoted_words() {
        assert_eq!(parse_and_print(r#"echo 'a b' "c $d" e\ f"#), r#"echo 'a b' "c $d" e\ f"#);
    }

    #[test]
    fn expansions() {
        assert_eq!(parse_and_print("echo $foo ${bar:-x} $((1 + 2))"), "echo $foo ${bar:-x} $((1 + 2))");
        assert_eq!(parse_and_print("echo $(date) `uname`"), "echo $(date) `uname`");
        assert_eq!(parse_and_print("echo ${x%.txt} ${#x}"), "echo ${x%.txt} ${#x}");
    }

    #[test]
    fn lists_and_pipelines() {
        assert_eq!(parse_and_print("a;b&c|d&&e||f"), "a; b& c | d && e || f");
        assert_eq!(parse_and_print("! a | b"), "! a | b");
    }

    #[test]
    fn compound_commands() {
        assert_eq!(parse_and_print("{ a; b; }"), "{ a; b; }");
        assert_eq!(parse_and_print("(a;b)"), "(a; b)");
        assert_eq!(
            parse_and_print("if a; then b; else c; fi"),
            "if a; then b; else c; fi"
        );
        assert_eq!(
            parse_and_print("while a; do b; done"),
            "while a; do b; done"
        );
        assert_eq!(
            parse_and_print("for i in 1 2; do echo $i; done"),
            "for i in 1 2; do echo $i; done"
        );
        assert_eq!(
            parse_and_print("case $x in a|b) echo;; *) ;; esac"),
            "case $x in (a | b) echo;; (*) ;; esac"
        );
    }

    #[test]
    fn function_definitions() {
        assert_eq!(parse_and_print("f() { echo; }"), "f() { echo; }");
    }

    #[test]
    fn round_trip_is_stable() {
        for code in [
            "echo hello; echo world",
            "for i in 1 2 3; do echo $i; done",
            "f() { local x=$1; echo $x; }; x=outer; f inner; echo $x",
            "if a && ! b | c; then d >e; fi&",
            "case $1 in (x) y;; esac",
        ] {
            let once = parse_and_print(code);
            let twice = parse_and_print(&once);
            assert_eq!(once, twice, "unstable for {code:?}");
        }
    }
}
