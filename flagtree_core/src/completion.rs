use crate::api::Completer;
use crate::constant::DOUBLE_DASH;
use crate::matcher::{classify, is_option, Lookup, OptionToken, Token};
use crate::model::ParserOptions;
use crate::parser::{CommandId, FlagId, Tree};

/// Completes the last element of `args` against the tree, resolving the preceding ones.
/// Fields are never written to.
pub(crate) fn complete(tree: &Tree, options: &ParserOptions, args: &[&str]) -> Vec<String> {
    let mut walk = Walk::new(tree, options);
    let (last, preceding) = match args.split_last() {
        Some((last, preceding)) => (*last, preceding),
        None => ("", args),
    };
    let pending = walk.resolve(preceding);
    let mut out = match pending {
        Some(id) => complete_value(tree.completer(id), "", last),
        None => walk.complete_last(last),
    };
    out.sort();
    out
}

/// Completes file system paths that start with `prefix`.
///
/// Pass this to [`Flag::complete_with`](crate::Flag::complete_with) or
/// [`Positional::complete_with`](crate::Positional::complete_with) for path valued fields.
/// ```
/// use flagtree_core::complete_filenames;
///
/// let completions = complete_filenames("/definitely/not/a/dir/x");
/// assert!(completions.is_empty());
/// ```
pub fn complete_filenames(prefix: &str) -> Vec<String> {
    let (directory, partial) = match prefix.rfind(std::path::is_separator) {
        Some(index) => (&prefix[..=index], &prefix[index + 1..]),
        None => ("", prefix),
    };
    let read_from = if directory.is_empty() { "." } else { directory };
    let mut out: Vec<String> = std::fs::read_dir(read_from)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.starts_with(partial))
                .map(|name| format!("{directory}{name}"))
                .collect()
        })
        .unwrap_or_default();
    out.sort();
    out
}

struct Walk<'t, 'a> {
    tree: &'t Tree<'a>,
    options: &'t ParserOptions,
    command: CommandId,
    lookup: Lookup,
    positional: usize,
    passed: bool,
}

impl<'t, 'a> Walk<'t, 'a> {
    fn new(tree: &'t Tree<'a>, options: &'t ParserOptions) -> Self {
        Self {
            tree,
            options,
            command: CommandId::ROOT,
            lookup: Lookup::for_scope(tree, CommandId::ROOT).unwrap_or_default(),
            positional: 0,
            passed: false,
        }
    }

    /// Returns the flag still waiting for its argument.
    fn resolve(&mut self, args: &[&str]) -> Option<FlagId> {
        let mut index = 0;

        while index < args.len() {
            let arg = args[index];
            index += 1;

            match classify(arg, self.options.style) {
                Token::DoubleDash if self.options.pass_double_dash => {
                    self.pass(args.len() - index);
                    return None;
                }
                Token::Option(token) if token.argument.is_none() => {
                    let (flag, can_argument) = self.resolve_option(&token);

                    match flag {
                        None if self.options.pass_after_non_option => {
                            self.pass(args.len() - index);
                            return None;
                        }
                        Some(id) => {
                            let node = self.tree.flag(id);

                            if node.can_argument() && !node.is_optional() && can_argument {
                                if index < args.len() {
                                    index += 1;
                                } else {
                                    return Some(id);
                                }
                            }
                        }
                        None => {}
                    }
                }
                Token::Option(_) => {}
                Token::DoubleDash | Token::Positional(_) => self.non_option(arg),
            }
        }

        None
    }

    /// Everything from here on is an argument; `count` of them fill positionals before the last.
    fn pass(&mut self, count: usize) {
        let tree = self.tree;
        let positionals = &tree.command(self.command).positionals;
        self.passed = true;

        for _ in 0..count {
            match positionals.get(self.positional) {
                Some(node) if !node.is_repeatable() => self.positional += 1,
                _ => break,
            }
        }
    }

    fn resolve_option(&self, token: &OptionToken) -> (Option<FlagId>, bool) {
        if token.is_long {
            return (self.lookup.long(token.name), true);
        }

        let mut flag = None;

        for (offset, c) in token.name.char_indices() {
            flag = self.lookup.short(c);

            match flag {
                None => break,
                Some(id)
                    if offset == 0
                        && self.tree.flag(id).can_argument()
                        && token.name.len() != c.len_utf8() =>
                {
                    return (flag, false);
                }
                Some(_) => {}
            }
        }

        (flag, true)
    }

    fn non_option(&mut self, arg: &str) {
        let tree = self.tree;
        let positionals = &tree.command(self.command).positionals;

        if let Some(node) = positionals.get(self.positional) {
            if !node.is_repeatable() {
                self.positional += 1;
            }
        } else if let Some(command) = self.lookup.command(arg) {
            self.command = command;
            self.lookup = Lookup::for_scope(self.tree, command).unwrap_or_default();
            self.positional = 0;
        }
    }

    fn complete_last(&self, last: &str) -> Vec<String> {
        let positionals = &self.tree.command(self.command).positionals;

        if self.passed {
            return match positionals.get(self.positional) {
                Some(node) => complete_value(node.positional.completer.as_ref(), "", last),
                None => Vec::default(),
            };
        }

        if last == "-" {
            return self.short_names("-", "");
        }

        if last == DOUBLE_DASH {
            return self.long_names(DOUBLE_DASH, "");
        }

        if is_option(last, self.options.style) {
            let Token::Option(token) = classify(last, self.options.style) else {
                unreachable!("internal error - option spelled tokens classify as options");
            };
            return self.complete_option(&token);
        }

        match positionals.get(self.positional) {
            Some(node) => complete_value(node.positional.completer.as_ref(), "", last),
            None => self.command_names(last),
        }
    }

    fn complete_option(&self, token: &OptionToken) -> Vec<String> {
        match (token.argument, token.is_long) {
            (Some(argument), _) => {
                let flag = if token.is_long {
                    self.lookup.long(token.name)
                } else {
                    let mut chars = token.name.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => self.lookup.short(c),
                        _ => None,
                    }
                };
                let prefix = format!(
                    "{}{}{}",
                    token.prefix,
                    token.name,
                    token.delimiter.map(String::from).unwrap_or_default()
                );

                match flag {
                    Some(id) => complete_value(self.tree.completer(id), &prefix, argument),
                    None => Vec::default(),
                }
            }
            (None, true) => self.long_names(token.prefix, token.name),
            (None, false) => {
                let Some(first) = token.name.chars().next() else {
                    return self.short_names(token.prefix, "");
                };

                match self.lookup.short(first) {
                    Some(id) if self.tree.flag(id).can_argument() => complete_value(
                        self.tree.completer(id),
                        &format!("{}{first}", token.prefix),
                        &token.name[first.len_utf8()..],
                    ),
                    _ => self.short_names(token.prefix, token.name),
                }
            }
        }
    }

    fn long_names(&self, prefix: &str, partial: &str) -> Vec<String> {
        let partial = partial.to_lowercase();
        self.lookup
            .long_flags()
            .filter(|id| !self.tree.flag(*id).flag.hidden)
            .filter_map(|id| self.tree.flag(id).flag.long.clone())
            .filter(|long| long.to_lowercase().starts_with(&partial))
            .map(|long| format!("{prefix}{long}"))
            .collect()
    }

    fn short_names(&self, prefix: &str, partial: &str) -> Vec<String> {
        if !partial.is_empty() {
            return vec![format!("{prefix}{partial}")];
        }

        self.lookup
            .short_flags()
            .filter(|(_, id)| !self.tree.flag(*id).flag.hidden)
            .map(|(c, _)| format!("{prefix}{c}"))
            .collect()
    }

    fn command_names(&self, partial: &str) -> Vec<String> {
        self.tree
            .command(self.command)
            .commands
            .iter()
            .map(|id| self.tree.command(*id).name.clone())
            .filter(|name| name.starts_with(partial))
            .collect()
    }
}

fn complete_value(completer: Option<&Completer>, prefix: &str, partial: &str) -> Vec<String> {
    match completer {
        Some(completer) => completer(partial)
            .into_iter()
            .map(|value| format!("{prefix}{value}"))
            .collect(),
        None => Vec::default(),
    }
}
