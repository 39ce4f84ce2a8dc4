use std::collections::HashSet;

use crate::api::Action;
use crate::constant::DOUBLE_DASH;
use crate::error::{Error, ErrorKind};
use crate::ini;
use crate::matcher::{classify, is_negative_number, is_option, Lookup, OptionToken, Token};
use crate::model::ParserOptions;
use crate::parser::printer::Printer;
use crate::parser::suggest::closest;
use crate::parser::tree::{CommandId, FlagId, Tree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The result of a successful resolution.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) command: CommandId,
    pub(crate) remaining: Vec<String>,
}

/// Transient state for one resolution over an argument vector.
struct ParseState {
    args: Vec<String>,
    index: usize,
    command: CommandId,
    lookup: Lookup,
    positional: usize,
    retargs: Vec<String>,
    required: Vec<FlagId>,
    touched: HashSet<FlagId>,
}

impl ParseState {
    fn pop(&mut self) -> Option<String> {
        let arg = self.args.get(self.index).cloned();

        if arg.is_some() {
            self.index += 1;
        }

        arg
    }

    fn peek(&self) -> Option<&str> {
        self.args.get(self.index).map(String::as_str)
    }

    fn drain(&mut self) -> Vec<String> {
        let rest = self.args[self.index..].to_vec();
        self.index = self.args.len();
        rest
    }
}

/// Walks the arguments left to right, resolving each against the descriptor tree and mutating its fields.
pub(crate) struct Resolver<'p, 'a> {
    tree: &'p mut Tree<'a>,
    options: &'p ParserOptions,
    state: ParseState,
}

impl<'p, 'a> Resolver<'p, 'a> {
    pub(crate) fn new(
        tree: &'p mut Tree<'a>,
        options: &'p ParserOptions,
        args: Vec<String>,
    ) -> Result<Self, Error> {
        let lookup = Lookup::for_scope(tree, CommandId::ROOT)?;
        let required = required_flags(tree, CommandId::ROOT);

        Ok(Self {
            tree,
            options,
            state: ParseState {
                args,
                index: 0,
                command: CommandId::ROOT,
                lookup,
                positional: 0,
                retargs: Vec::default(),
                required,
                touched: HashSet::default(),
            },
        })
    }

    pub(crate) fn resolve(mut self) -> Result<Outcome, Error> {
        while let Some(arg) = self.state.pop() {
            let position = self.state.index - 1;

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Resolving token {position}: {arg:?}.");
            }

            match classify(&arg, self.options.style) {
                Token::DoubleDash if self.options.pass_double_dash => {
                    let rest = self.state.drain();
                    self.add_args(rest, position + 1)?;
                    break;
                }
                Token::DoubleDash | Token::Positional(_) => {
                    if self.non_option(&arg, position)? {
                        break;
                    }
                }
                Token::Option(token) => {
                    let result = if token.is_long {
                        self.parse_long(&token)
                    } else {
                        self.parse_short(&token)
                    };

                    match result {
                        Err(error)
                            if error.kind() == ErrorKind::UnknownFlag
                                && self.options.ignore_unknown =>
                        {
                            #[cfg(feature = "tracing_debug")]
                            {
                                debug!("Passing through unknown option {arg:?}.");
                            }

                            self.state.retargs.push(arg.clone());
                        }
                        Err(error) => return Err(error.at(position)),
                        Ok(()) => {}
                    }
                }
            }
        }

        self.check_required()?;
        self.check_positionals()?;
        self.check_commands()?;
        self.check_extra_args()?;

        Ok(Outcome {
            command: self.state.command,
            remaining: self.state.retargs,
        })
    }

    /// Returns whether the remaining arguments were passed through.
    fn non_option(&mut self, arg: &str, position: usize) -> Result<bool, Error> {
        let command = self.state.lookup.command(arg);

        // Everything from the first non-option on is an argument, pending positionals first.
        if self.options.pass_after_non_option && command.is_none() {
            let mut rest = vec![arg.to_string()];
            rest.extend(self.state.drain());
            self.add_args(rest, position)?;
            return Ok(true);
        }

        if self.has_pending_positional() {
            self.bind_positional(arg).map_err(|error| error.at(position))?;
            return Ok(false);
        }

        if let Some(command) = command {
            self.descend(command)?;
            return Ok(false);
        }

        self.state.retargs.push(arg.to_string());
        Ok(false)
    }

    fn descend(&mut self, command: CommandId) -> Result<(), Error> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Descending into command {:?}.",
                self.tree.command(command).name
            );
        }

        self.state.lookup = Lookup::for_scope(self.tree, command)?;
        self.state.command = command;
        self.state.positional = 0;
        self.state
            .required
            .extend(required_flags(self.tree, command));
        Ok(())
    }

    fn has_pending_positional(&self) -> bool {
        self.state.positional < self.tree.command(self.state.command).positionals.len()
    }

    fn bind_positional(&mut self, token: &str) -> Result<(), Error> {
        let cursor = self.state.positional;
        let node = &mut self.tree.command_mut(self.state.command).positionals[cursor];
        node.capture(token)?;

        if !node.is_repeatable() {
            self.state.positional += 1;
        }

        Ok(())
    }

    fn add_args(&mut self, tokens: Vec<String>, position: usize) -> Result<(), Error> {
        for (offset, token) in tokens.into_iter().enumerate() {
            if self.has_pending_positional() {
                self.bind_positional(&token)
                    .map_err(|error| error.at(position + offset))?;
            } else {
                self.state.retargs.push(token);
            }
        }

        Ok(())
    }

    fn parse_long(&mut self, token: &OptionToken) -> Result<(), Error> {
        let id = self
            .state
            .lookup
            .long(token.name)
            .ok_or_else(|| unknown_flag(token.name))?;
        self.parse_option(id, true, token.argument)
    }

    fn parse_short(&mut self, token: &OptionToken) -> Result<(), Error> {
        let cluster = token.name;
        let mut argument = token.argument;

        for (offset, c) in cluster.char_indices() {
            let id = self
                .state
                .lookup
                .short(c)
                .ok_or_else(|| unknown_flag(&c.to_string()))?;
            let next_offset = offset + c.len_utf8();
            let mut is_last = next_offset == cluster.len();

            // The rest of the cluster is an attached argument when it does not start with another flag.
            if !is_last && argument.is_none() && self.tree.flag(id).can_argument() {
                let rest = &cluster[next_offset..];
                let next_is_flag = rest
                    .chars()
                    .next()
                    .map_or(false, |next| self.state.lookup.short(next).is_some());

                if !next_is_flag {
                    argument = Some(rest);
                    is_last = true;
                }
            }

            let node = self.tree.flag(id);

            if !is_last && node.can_argument() && !node.is_optional() {
                return Err(Error::new(
                    ErrorKind::ExpectedArgument,
                    format!("expected argument for flag `{node}'"),
                ));
            }

            if is_last {
                return self.parse_option(id, true, argument);
            }

            self.parse_option(id, false, None)?;
        }

        Ok(())
    }

    /// Resolve one occurrence of a flag.
    /// `can_argument` is false for flags in the middle of a short cluster.
    fn parse_option(
        &mut self,
        id: FlagId,
        can_argument: bool,
        argument: Option<&str>,
    ) -> Result<(), Error> {
        if matches!(self.tree.flag(id).flag.action, Action::Help) {
            return Err(Error::new(
                ErrorKind::Help,
                Printer::new(self.tree, self.options, self.state.command).render(),
            ));
        }

        self.touch(id);
        let node = self.tree.flag(id);

        if !node.can_argument() {
            if can_argument && argument.is_some() {
                return Err(Error::new(
                    ErrorKind::NoArgumentForBool,
                    format!("bool flag `{node}' cannot have an argument"),
                ));
            }

            self.set(id, None)
        } else if let Some(terminator) = node.flag.terminator.clone() {
            if argument.is_some() {
                return Err(Error::new(
                    ErrorKind::ExpectedArgument,
                    format!("terminated flag `{node}' cannot take an inline argument"),
                ));
            }

            self.capture_terminated(id, &terminator)
        } else if can_argument && argument.is_some() {
            self.set(id, argument)
        } else if node.is_optional() {
            let values = node.flag.optional_value.clone().unwrap_or_default();
            self.tree.flag_mut(id).clear();

            for value in &values {
                self.set(id, Some(value))?;
            }

            self.mark_set(id);
            Ok(())
        } else if can_argument {
            let node = self.tree.flag(id);
            let next = self.state.peek().ok_or_else(|| {
                Error::new(
                    ErrorKind::ExpectedArgument,
                    format!("expected argument for flag `{node}'"),
                )
            })?;

            if self.options.pass_double_dash && next == DOUBLE_DASH {
                return Err(Error::new(
                    ErrorKind::ExpectedArgument,
                    format!("expected argument for flag `{node}', but got double dash `--'"),
                ));
            }

            if is_option(next, self.options.style)
                && !(node.is_numeric() && is_negative_number(next))
            {
                return Err(Error::new(
                    ErrorKind::ExpectedArgument,
                    format!("expected argument for flag `{node}', but got option `{next}'"),
                ));
            }

            let position = self.state.index;
            let value = self.state.pop();
            self.set(id, value.as_deref())
                .map_err(|error| error.at(position))
        } else {
            Err(Error::new(
                ErrorKind::ExpectedArgument,
                format!("expected argument for flag `{node}'"),
            ))
        }
    }

    /// The first occurrence of a repeatable flag replaces its defaults (or previously loaded values).
    fn touch(&mut self, id: FlagId) {
        if self.tree.flag(id).kind().is_repeatable() && self.state.touched.insert(id) {
            self.tree.flag_mut(id).clear();
        }
    }

    fn capture_terminated(&mut self, id: FlagId, terminator: &str) -> Result<(), Error> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Capturing for {} until {terminator:?}.", self.tree.flag(id));
        }

        self.tree.flag_mut(id).begin_capture();

        while let Some(token) = self.state.pop() {
            if token == terminator {
                break;
            }

            let position = self.state.index - 1;
            self.set(id, Some(&token))
                .map_err(|error| error.at(position))?;
        }

        self.mark_set(id);
        Ok(())
    }

    fn set(&mut self, id: FlagId, value: Option<&str>) -> Result<(), Error> {
        if matches!(self.tree.flag(id).flag.action, Action::Include) {
            let path = value.unwrap_or_default();

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Including {path:?}.");
            }

            ini::include(self.tree, path, self.options.ignore_unknown)?;
        } else {
            self.tree.flag_mut(id).capture(value)?;
        }

        self.mark_set(id);
        Ok(())
    }

    fn mark_set(&mut self, id: FlagId) {
        self.tree.flag_mut(id).is_set = true;
        self.state.required.retain(|required| *required != id);
    }

    fn check_required(&self) -> Result<(), Error> {
        let names: Vec<String> = self
            .state
            .required
            .iter()
            .filter(|id| !self.tree.flag(**id).is_set)
            .map(|id| format!("`{}'", self.tree.flag(*id)))
            .collect();

        match names.len() {
            0 => Ok(()),
            1 => Err(Error::new(
                ErrorKind::Required,
                format!("the required flag {} was not specified", names[0]),
            )),
            _ => Err(Error::new(
                ErrorKind::Required,
                format!(
                    "the required flags {} were not specified",
                    join_names(&names)
                ),
            )),
        }
    }

    fn check_positionals(&self) -> Result<(), Error> {
        let names: Vec<String> = self
            .tree
            .command(self.state.command)
            .positionals
            .iter()
            .filter(|node| node.positional.required && !node.is_set)
            .map(|node| format!("`{}'", node.positional.name))
            .collect();

        match names.len() {
            0 => Ok(()),
            1 => Err(Error::new(
                ErrorKind::Required,
                format!("the required argument {} was not provided", names[0]),
            )),
            _ => Err(Error::new(
                ErrorKind::Required,
                format!(
                    "the required arguments {} were not provided",
                    join_names(&names)
                ),
            )),
        }
    }

    fn check_commands(&self) -> Result<(), Error> {
        let node = self.tree.command(self.state.command);

        if node.commands.is_empty() || node.subcommands_optional {
            return Ok(());
        }

        let mut names: Vec<&str> = node
            .commands
            .iter()
            .map(|id| self.tree.command(*id).name.as_str())
            .collect();
        names.sort();
        let list = names.join(", ");
        let message = match self.state.retargs.first() {
            Some(first) => match closest(first, &names) {
                Some((candidate, distance))
                    if (distance as f64) / (candidate.chars().count() as f64) < 0.5 =>
                {
                    format!("Unknown command `{first}', did you mean `{candidate}'?")
                }
                _ => format!("Unknown command `{first}'. Please specify one command of: {list}"),
            },
            None => format!("Please specify one command of: {list}"),
        };

        Err(Error::new(ErrorKind::Required, message))
    }

    fn check_extra_args(&self) -> Result<(), Error> {
        let node = self.tree.command(self.state.command);

        if node.reject_extra_args && !self.state.retargs.is_empty() {
            let extra: Vec<String> = self
                .state
                .retargs
                .iter()
                .map(|arg| format!("`{arg}'"))
                .collect();
            return Err(Error::new(
                ErrorKind::TooManyArgs,
                format!("too many arguments: {}", extra.join(", ")),
            ));
        }

        Ok(())
    }
}

fn required_flags(tree: &Tree, command: CommandId) -> Vec<FlagId> {
    tree.command_groups(command)
        .into_iter()
        .flat_map(|group| tree.group(group).flags.iter().copied())
        .filter(|id| tree.flag(*id).flag.required)
        .collect()
}

fn unknown_flag(name: &str) -> Error {
    Error::new(ErrorKind::UnknownFlag, format!("unknown flag `{name}'"))
}

/// `a`, `a and b`, `a, b and c`.
fn join_names(names: &[String]) -> String {
    match names.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
        None => String::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        Callback, Collection, Command, Flag, Group, Handler, Mapping, Nested, Optional,
        Positional, Scalar, Switch,
    };
    use crate::model::OptionStyle;
    use crate::test::assert_contains;
    use rand::seq::SliceRandom;
    use rand::{thread_rng, Rng};
    use rstest::rstest;
    use std::collections::HashMap;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn resolve(tree: &mut Tree, options: &ParserOptions, args: &[&str]) -> Result<Outcome, Error> {
        Resolver::new(tree, options, strings(args))?.resolve()
    }

    fn resolve_remaining(
        tree: &mut Tree,
        options: &ParserOptions,
        args: &[&str],
    ) -> Result<Vec<String>, Error> {
        resolve(tree, options, args).map(|outcome| outcome.remaining)
    }

    #[test]
    fn empty() {
        let options = ParserOptions::none();
        let mut tree = Tree::build(Command::new("program"), &options).unwrap();
        let args: &[&str] = &[];

        let outcome = resolve(&mut tree, &options, args).unwrap();

        assert_eq!(
            outcome,
            Outcome {
                command: CommandId::ROOT,
                remaining: Vec::default()
            }
        );
    }

    #[test]
    fn boolean_clusters() {
        // Setup
        let options = ParserOptions::none();
        let names = ['a', 'b', 'c', 'd', 'e', 'f', 'g'];
        let mut rng = thread_rng();

        for _ in 0..20 {
            let count = rng.gen_range(1..=names.len());
            let mut cluster: Vec<char> = names.choose_multiple(&mut rng, count).copied().collect();
            cluster.shuffle(&mut rng);
            let mut values = vec![false; names.len()];

            {
                let mut root = Command::new("program");

                for (value, name) in values.iter_mut().zip(names.iter()) {
                    root = root.add(Flag::new(Scalar::new(value)).short(*name));
                }

                let mut tree = Tree::build(root, &options).unwrap();
                let token = format!("-{}", cluster.iter().collect::<String>());

                // Execute
                let remaining =
                    resolve_remaining(&mut tree, &options, &[token.as_str(), "rest"]).unwrap();

                // Verify
                assert_eq!(remaining, vec!["rest"]);
            }

            for (value, name) in values.iter().zip(names.iter()) {
                assert_eq!(*value, cluster.contains(name), "{name} in {cluster:?}");
            }
        }
    }

    #[rstest]
    #[case(&["-vab"], "ab", false)]
    #[case(&["-v=value"], "value", false)]
    #[case(&["-vxyz"], "xyz", false)]
    #[case(&["-v", "value"], "value", false)]
    #[case(&["-fv=value"], "value", true)]
    #[case(&["-ffv", "value"], "value", true)]
    #[case(&["-v=a=b"], "a=b", false)]
    #[case(&["--value=a=b"], "a=b", false)]
    #[case(&["--VALUE", "x"], "x", false)]
    fn short_arguments(#[case] args: &[&str], #[case] expected: &str, #[case] expected_f: bool) {
        // Setup
        let options = ParserOptions::none();
        let mut value = String::default();
        let mut f = false;

        {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut value)).short('v').long("value"))
                .add(Flag::new(Scalar::new(&mut f)).short('f'));
            let mut tree = Tree::build(root, &options).unwrap();

            // Execute
            let remaining = resolve_remaining(&mut tree, &options, args).unwrap();

            // Verify
            assert!(remaining.is_empty());
        }

        assert_eq!(value, expected);
        assert_eq!(f, expected_f);
    }

    #[rstest]
    #[case(&["-vf"], ErrorKind::ExpectedArgument, "expected argument for flag `-v'")]
    #[case(&["-vvalue"], ErrorKind::ExpectedArgument, "expected argument for flag `-v'")]
    #[case(&["-fvx=1"], ErrorKind::ExpectedArgument, "expected argument for flag `-v'")]
    #[case(&["-f=true"], ErrorKind::NoArgumentForBool, "bool flag `-f' cannot have an argument")]
    #[case(&["-v"], ErrorKind::ExpectedArgument, "expected argument for flag `-v'")]
    #[case(&["-v", "-f"], ErrorKind::ExpectedArgument, "expected argument for flag `-v', but got option `-f'")]
    #[case(&["-v", "--"], ErrorKind::ExpectedArgument, "expected argument for flag `-v', but got double dash `--'")]
    #[case(&["-x"], ErrorKind::UnknownFlag, "unknown flag `x'")]
    #[case(&["-fx"], ErrorKind::UnknownFlag, "unknown flag `x'")]
    #[case(&["--nope"], ErrorKind::UnknownFlag, "unknown flag `nope'")]
    #[case(&["-n", "x"], ErrorKind::Marshal, "invalid argument for flag `-n' (expected u8): invalid digit found in string")]
    #[case(&["-n", "-1"], ErrorKind::Marshal, "invalid argument for flag `-n' (expected u8): invalid digit found in string")]
    fn short_errors(#[case] args: &[&str], #[case] kind: ErrorKind, #[case] message: &str) {
        // Setup
        let options = ParserOptions::none().pass_double_dash(true);
        let mut value = String::default();
        let mut f = false;
        let mut n: u8 = 0;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut value)).short('v'))
            .add(Flag::new(Scalar::new(&mut f)).short('f'))
            .add(Flag::new(Scalar::new(&mut n)).short('n'));
        let mut tree = Tree::build(root, &options).unwrap();

        // Execute
        let error = resolve(&mut tree, &options, args).unwrap_err();

        // Verify
        assert_eq!(error.kind(), kind);
        assert_eq!(error.message(), message);
    }

    #[test]
    fn error_position() {
        let options = ParserOptions::none();
        let mut n: u8 = 0;
        let root = Command::new("program").add(Flag::new(Scalar::new(&mut n)).short('n'));
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &["a", "-n", "x"]).unwrap_err();
        assert_eq!(error.position(), Some(2));

        let error = resolve(&mut tree, &options, &["a", "-z"]).unwrap_err();
        assert_eq!(error.position(), Some(1));
    }

    #[test]
    fn repeated_booleans() {
        let options = ParserOptions::none();
        let mut verbose: Vec<bool> = Vec::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Collection::new(&mut verbose)).short('v'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-vvv", "-v"]).unwrap();
        }

        assert_eq!(verbose, vec![true, true, true, true]);
    }

    #[test]
    fn repeated_replaces_defaults() {
        // Setup
        let options = ParserOptions::none();
        let mut items: Vec<String> = Vec::default();
        let environment: HashMap<&str, &str> = HashMap::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Collection::new(&mut items)).long("item").default("x"));
            let mut tree = Tree::build(root, &options).unwrap();
            tree.store_defaults(&environment).unwrap();

            // Execute
            resolve(&mut tree, &options, &["--item", "a", "--item", "b"]).unwrap();
        }

        // Verify
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn switch_target() {
        let options = ParserOptions::none();
        let mut level: u8 = 1;

        {
            let root = Command::new("program")
                .add(Flag::new(Switch::new(&mut level, 3)).short('q'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-q"]).unwrap();
        }

        assert_eq!(level, 3);
    }

    #[test]
    fn negative_number_argument() {
        let options = ParserOptions::none();
        let mut n: i32 = 0;

        {
            let root = Command::new("program").add(Flag::new(Scalar::new(&mut n)).short('n'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-n", "-5"]).unwrap();
        }

        assert_eq!(n, -5);
    }

    // -s 1 2 3 END -m bin -xyz --foo bar -v 'foo bar' ; -v -m -xyz --foo
    #[rstest]
    #[case(
        &["-s", "1", "2", "3", "END", "-m", "bin", "-xyz", "--foo", "bar", "-v", "foo bar", ";", "-v", "-m", "-xyz", "--foo"],
        vec![1, 2, 3],
        vec![vec!["bin", "-xyz", "--foo", "bar", "-v", "foo bar"], vec!["-xyz", "--foo"]],
        true,
    )]
    #[case(&["-s", "1", "2", "END", "-s", "3", "4"], vec![3, 4], vec![], false)]
    #[case(&["-s", "4", "5"], vec![4, 5], vec![], false)]
    #[case(&["-vm", "--foo", "-v", "bar", ";", "-s", "1", "2"], vec![1, 2], vec![vec!["--foo", "-v", "bar"]], true)]
    #[case(&["-m", "--foo", "-v;", "-v"], vec![], vec![vec!["--foo", "-v;", "-v"]], false)]
    #[case(&["-m", ";", "-s", "END"], vec![], vec![vec![]], false)]
    #[case(&["-m"], vec![], vec![vec![]], false)]
    #[case(&["-m", "a", ";", "-m", ";", "-m", "b"], vec![], vec![vec!["a"], vec![], vec!["b"]], false)]
    #[case(&["-m", ""], vec![], vec![vec![""]], false)]
    fn terminated(
        #[case] args: &[&str],
        #[case] expected_slice: Vec<i32>,
        #[case] expected_multiple: Vec<Vec<&str>>,
        #[case] expected_v: bool,
    ) {
        // Setup
        let options = ParserOptions::none();
        let mut slice: Vec<i32> = Vec::default();
        let mut multiple: Vec<Vec<String>> = Vec::default();
        let mut v = false;

        {
            let root = Command::new("program")
                .add(Flag::new(Collection::new(&mut slice)).short('s').terminator("END"))
                .add(Flag::new(Nested::new(&mut multiple)).short('m').terminator(";"))
                .add(Flag::new(Scalar::new(&mut v)).short('v'));
            let mut tree = Tree::build(root, &options).unwrap();

            // Execute
            let remaining = resolve_remaining(&mut tree, &options, args).unwrap();

            // Verify
            assert!(remaining.is_empty());
        }

        assert_eq!(slice, expected_slice);
        assert_eq!(multiple, expected_multiple);
        assert_eq!(v, expected_v);
    }

    #[test]
    fn terminated_double_dash() {
        let options = ParserOptions::none().pass_double_dash(true);
        let mut multiple: Vec<Vec<String>> = Vec::default();
        let mut v = false;

        let remaining = {
            let root = Command::new("program")
                .add(Flag::new(Nested::new(&mut multiple)).short('m').terminator(";"))
                .add(Flag::new(Scalar::new(&mut v)).short('v'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve_remaining(
                &mut tree,
                &options,
                &["-m", "--foo", "--", "bar", ";", "-v", "--", "--foo", "bar"],
            )
            .unwrap()
        };

        assert_eq!(multiple, vec![vec!["--foo", "--", "bar"]]);
        assert!(v);
        assert_eq!(remaining, vec!["--foo", "bar"]);
    }

    #[rstest]
    #[case(&["-m=foo", "bar"])]
    #[case(&["-m=", "foo", "bar"])]
    fn terminated_inline(#[case] args: &[&str]) {
        let options = ParserOptions::none();
        let mut multiple: Vec<Vec<String>> = Vec::default();
        let root = Command::new("program")
            .add(Flag::new(Nested::new(&mut multiple)).short('m').terminator(";"));
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, args).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ExpectedArgument);
    }

    #[rstest]
    #[case(&["--level"], Some(5))]
    #[case(&["--level=2"], Some(2))]
    #[case(&["-l2"], Some(2))]
    #[case(&["-l", "2"], Some(5))]
    #[case(&[], None)]
    fn optional_argument(#[case] args: &[&str], #[case] expected: Option<u32>) {
        let options = ParserOptions::none();
        let mut level: Option<u32> = None;

        {
            let root = Command::new("program").add(
                Flag::new(Optional::new(&mut level))
                    .short('l')
                    .long("level")
                    .optional_value("5"),
            );
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, args).unwrap();
        }

        assert_eq!(level, expected);
    }

    #[test]
    fn optional_multiple_values() {
        let options = ParserOptions::none();
        let mut tags: Vec<String> = Vec::default();

        {
            let root = Command::new("program").add(
                Flag::new(Collection::new(&mut tags))
                    .long("tag")
                    .optional_value("a")
                    .optional_value("b"),
            );
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["--tag=x", "--tag"]).unwrap();
        }

        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn map_values() {
        let options = ParserOptions::none();
        let mut values: HashMap<String, i64> = HashMap::default();

        {
            let root =
                Command::new("program").add(Flag::new(Mapping::new(&mut values)).short('d'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-d", "a:1", "-db:2", "-d=c:3"]).unwrap();
        }

        assert_eq!(
            values,
            HashMap::from([
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ])
        );
    }

    #[test]
    fn callbacks() {
        let options = ParserOptions::none();
        let mut count = 0;
        let mut seen: Vec<String> = Vec::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Callback::new(|| {
                    count += 1;
                    Ok(())
                })).short('c'))
                .add(Flag::new(Handler::new(|value: String| {
                    seen.push(value);
                    Ok(())
                })).long("say"));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-cc", "--say", "hi", "--say=there"]).unwrap();
        }

        assert_eq!(count, 2);
        assert_eq!(seen, vec!["hi", "there"]);
    }

    #[test]
    fn callback_error_propagates() {
        let options = ParserOptions::none();
        let root = Command::new("program").add(
            Flag::new(Callback::new(|| Err(Error::new(ErrorKind::Unknown, "refused")))).short('c'),
        );
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &["-c"]).unwrap_err();

        assert_eq!(error, Error::new(ErrorKind::Unknown, "refused").at(0));
    }

    #[rstest]
    #[case(&[], "the required flags `-a, --alpha', `-b' and `--gamma' were not specified")]
    #[case(&["-a", "1"], "the required flags `-b' and `--gamma' were not specified")]
    #[case(&["-a", "1", "-b", "2"], "the required flag `--gamma' was not specified")]
    fn required(#[case] args: &[&str], #[case] message: &str) {
        // Setup
        let options = ParserOptions::none();
        let mut a: u32 = 0;
        let mut b: u32 = 0;
        let mut c: u32 = 0;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut a)).short('a').long("alpha").required())
            .add(Flag::new(Scalar::new(&mut b)).short('b').required())
            .add(Flag::new(Scalar::new(&mut c)).long("gamma").required());
        let mut tree = Tree::build(root, &options).unwrap();

        // Execute
        let error = resolve(&mut tree, &options, args).unwrap_err();

        // Verify
        assert_eq!(error.kind(), ErrorKind::Required);
        assert_eq!(error.message(), message);
    }

    #[test]
    fn required_in_subcommand() {
        let options = ParserOptions::none();
        let mut a: u32 = 0;
        let root = Command::new("program")
            .subcommands_optional()
            .command(Command::new("sub").add(Flag::new(Scalar::new(&mut a)).short('a').required()));
        let mut tree = Tree::build(root, &options).unwrap();

        assert!(resolve(&mut tree, &options, &[]).is_ok());
        let error = resolve(&mut tree, &options, &["sub"]).unwrap_err();
        assert_eq!(error.message(), "the required flag `-a' was not specified");
    }

    #[test]
    fn required_three() {
        let options = ParserOptions::none();
        let mut a = false;
        let mut b = false;
        let mut c = false;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut a)).short('a').required())
            .add(Flag::new(Scalar::new(&mut b)).short('b').required())
            .add(Flag::new(Scalar::new(&mut c)).short('c').required());
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &[]).unwrap_err();

        assert_eq!(
            error.message(),
            "the required flags `-a', `-b' and `-c' were not specified"
        );
    }

    #[test]
    fn positionals() {
        let options = ParserOptions::none();
        let mut verbose = false;
        let mut name = String::default();
        let mut rest: Vec<u32> = Vec::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut verbose)).short('v'))
                .positional(Positional::new(Scalar::new(&mut name), "NAME").required())
                .positional(Positional::new(Collection::new(&mut rest), "REST"));
            let mut tree = Tree::build(root, &options).unwrap();
            let remaining = resolve_remaining(&mut tree, &options, &["x", "1", "-v", "2"]).unwrap();
            assert!(remaining.is_empty());
        }

        assert_eq!(name, "x");
        assert_eq!(rest, vec![1, 2]);
    }

    #[test]
    fn positional_required() {
        let options = ParserOptions::none();
        let mut a = String::default();
        let mut b = String::default();
        let root = Command::new("program")
            .positional(Positional::new(Scalar::new(&mut a), "A").required())
            .positional(Positional::new(Scalar::new(&mut b), "B").required());
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &[]).unwrap_err();
        assert_eq!(
            error.message(),
            "the required arguments `A' and `B' were not provided"
        );

        let error = resolve(&mut tree, &options, &["a"]).unwrap_err();
        assert_eq!(error.message(), "the required argument `B' was not provided");
    }

    #[test]
    fn positional_invalid() {
        let options = ParserOptions::none();
        let mut n: u32 = 0;
        let root =
            Command::new("program").positional(Positional::new(Scalar::new(&mut n), "N"));
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &["x"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Marshal);
        assert_eq!(
            error.message(),
            "invalid argument for positional `N' (expected u32): invalid digit found in string"
        );
    }

    #[rstest]
    #[case(ParserOptions::none().pass_double_dash(true), &["-v", "--", "-v", "-g"], vec!["-v", "-g"])]
    #[case(ParserOptions::none(), &["-v", "--", "x"], vec!["--", "x"])]
    #[case(ParserOptions::none().pass_after_non_option(true), &["-v", "arg", "-v", "-g"], vec!["arg", "-v", "-g"])]
    #[case(ParserOptions::none().ignore_unknown(true), &["hello", "world", "-v", "--foo=bar", "--verbose", "-f"], vec!["hello", "world", "--foo=bar", "-f"])]
    #[case(ParserOptions::none(), &["-", "---x"], vec!["-", "---x"])]
    fn pass_through(
        #[case] options: ParserOptions,
        #[case] args: &[&str],
        #[case] expected: Vec<&str>,
    ) {
        let mut v = false;

        let remaining = {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut v)).short('v').long("verbose"));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve_remaining(&mut tree, &options, args).unwrap()
        };

        assert_eq!(remaining, expected);
        assert!(v || args.iter().all(|arg| *arg != "-v"));
    }

    #[test]
    fn pass_after_non_option_positional() {
        let options = ParserOptions::none().pass_after_non_option(true);
        let mut v = false;
        let mut rest: Vec<String> = Vec::default();

        let remaining = {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut v)).short('v'))
                .positional(Positional::new(Collection::new(&mut rest), "REST"));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve_remaining(&mut tree, &options, &["-v", "arg", "-v", "-g"]).unwrap()
        };

        assert!(remaining.is_empty());
        assert_eq!(rest, vec!["arg", "-v", "-g"]);
    }

    #[test]
    fn pass_after_non_option_scalar_positional() {
        let options = ParserOptions::none().pass_after_non_option(true);
        let mut v = false;
        let mut source = String::default();

        let remaining = {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut v)).short('v'))
                .positional(Positional::new(Scalar::new(&mut source), "SOURCE"));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve_remaining(&mut tree, &options, &["a", "-v", "--unknown", "b"]).unwrap()
        };

        assert!(!v);
        assert_eq!(source, "a");
        assert_eq!(remaining, vec!["-v", "--unknown", "b"]);
    }

    #[test]
    fn windows_style() {
        let options = ParserOptions::none().style(OptionStyle::Windows);
        let mut v = false;
        let mut name = String::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut v)).short('v'))
                .add(Flag::new(Scalar::new(&mut name)).long("name"));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["/v", "/name:x"]).unwrap();
        }

        assert!(v);
        assert_eq!(name, "x");
    }

    fn command_tree<'a>(global: &'a mut bool, local: &'a mut bool) -> Command<'a> {
        Command::new("program")
            .add(Flag::new(Scalar::new(global)).short('g'))
            .command(
                Command::new("add")
                    .alias("a")
                    .add(Flag::new(Scalar::new(local)).short('l')),
            )
            .command(Command::new("remove"))
    }

    #[rstest]
    #[case(&["-g", "add", "-l"], true, true)]
    #[case(&["a", "-g", "-l"], true, true)]
    #[case(&["add"], false, false)]
    fn subcommand_scope(#[case] args: &[&str], #[case] expected_global: bool, #[case] expected_local: bool) {
        let options = ParserOptions::none();
        let mut global = false;
        let mut local = false;

        {
            let mut tree = Tree::build(command_tree(&mut global, &mut local), &options).unwrap();
            let outcome = resolve(&mut tree, &options, args).unwrap();
            assert_eq!(tree.command_path(outcome.command), vec!["program", "add"]);
        }

        assert_eq!(global, expected_global);
        assert_eq!(local, expected_local);
    }

    #[test]
    fn subcommand_flag_before_command() {
        let options = ParserOptions::none();
        let mut global = false;
        let mut local = false;
        let mut tree = Tree::build(command_tree(&mut global, &mut local), &options).unwrap();

        let error = resolve(&mut tree, &options, &["-l", "add"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnknownFlag);
    }

    #[rstest]
    #[case(&[], "Please specify one command of: add, remove")]
    #[case(&["ad"], "Unknown command `ad', did you mean `add'?")]
    #[case(&["remve"], "Unknown command `remve', did you mean `remove'?")]
    #[case(&["xyz"], "Unknown command `xyz'. Please specify one command of: add, remove")]
    fn subcommand_required(#[case] args: &[&str], #[case] message: &str) {
        let options = ParserOptions::none();
        let mut global = false;
        let mut local = false;
        let mut tree = Tree::build(command_tree(&mut global, &mut local), &options).unwrap();

        let error = resolve(&mut tree, &options, args).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Required);
        assert_eq!(error.message(), message);
    }

    #[test]
    fn subcommands_optional() {
        let options = ParserOptions::none();
        let root = Command::new("program")
            .subcommands_optional()
            .command(Command::new("add"));
        let mut tree = Tree::build(root, &options).unwrap();

        let remaining = resolve_remaining(&mut tree, &options, &["x"]).unwrap();

        assert_eq!(remaining, vec!["x"]);
    }

    #[test]
    fn reject_extra_args() {
        let options = ParserOptions::none();
        let root = Command::new("program").reject_extra_args();
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &["x", "y"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::TooManyArgs);
        assert_eq!(error.message(), "too many arguments: `x', `y'");
    }

    #[test]
    fn help_flag() {
        let options = ParserOptions::default();
        let mut v = false;
        let root = Command::new("program")
            .add(Flag::new(Scalar::new(&mut v)).short('v').description("Be loud"))
            .command(Command::new("add").description("Add things"));
        let mut tree = Tree::build(root, &options).unwrap();

        let error = resolve(&mut tree, &options, &["add", "--help"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Help);
        assert_contains!(error.message(), "Usage:\n  program [OPTIONS] add");
        assert_contains!(error.message(), "Be loud");
    }

    #[test]
    fn group_namespaces() {
        let options = ParserOptions::none();
        let mut host = String::default();

        {
            let root = Command::new("program").group(
                Group::new("Server")
                    .namespace("server")
                    .add(Flag::new(Scalar::new(&mut host)).long("host")),
            );
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["--server.host", "localhost"]).unwrap();
        }

        assert_eq!(host, "localhost");
    }

    #[test]
    fn last_write_wins() {
        let options = ParserOptions::none();
        let mut name = String::default();

        {
            let root = Command::new("program")
                .add(Flag::new(Scalar::new(&mut name)).short('n'));
            let mut tree = Tree::build(root, &options).unwrap();
            resolve(&mut tree, &options, &["-n", "a", "-nb"]).unwrap();
        }

        assert_eq!(name, "b");
    }

    #[rstest]
    #[case(&["a"], "a")]
    #[case(&["a", "b", "c"], "a, b and c")]
    #[case(&["a", "b"], "a and b")]
    fn join(#[case] names: &[&str], #[case] expected: &str) {
        assert_eq!(join_names(&strings(names)), expected);
    }
}
