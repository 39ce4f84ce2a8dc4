use crate::error::Error;

pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: &Error);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: &Error) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

/// The arguments of a failed parse, with a caret under the offending one.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    position: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(position: usize, tokens: &[String]) -> Self {
        Self {
            position,
            tokens: tokens.to_vec(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let projection = self.tokens.join(" ");
        let offset: usize = self
            .tokens
            .iter()
            .take(self.position)
            .map(|token| token.chars().count() + 1)
            .sum();
        let width = std::cmp::min(offset, projection.chars().count());

        write!(f, "{projection}\n{:width$}^", "")
    }
}

/// Wrap `paragraph` into lines of at most `width` characters, hyphenating words that do not fit.
/// Line breaks in the paragraph are kept.
pub(crate) fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    paragraph
        .split('\n')
        .flat_map(|line| {
            let lines = chunk(line, width);

            if lines.is_empty() {
                vec![String::default()]
            } else {
                lines
            }
        })
        .collect()
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let width = std::cmp::max(width, 2);
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            let length = word.chars().count();

            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + length + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let chars: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while chars.len() - left > width {
        let part: String = chars[left..left + increment].iter().collect();
        lines.push(format!("{part}-"));
        left += increment;
    }

    current.extend(&chars[left..]);
}

#[cfg(test)]
pub(crate) mod util {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct InMemoryInterface {
        message: RefCell<Option<Vec<String>>>,
        error: RefCell<Option<String>>,
        error_context: RefCell<Option<String>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            self.message
                .borrow_mut()
                .get_or_insert_with(Vec::default)
                .push(message);
        }

        fn print_error(&self, error: &Error) {
            // Assumes print_error() is only ever called once.
            self.error.borrow_mut().replace(error.to_string());
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            // Assumes print_error_context() is only ever called once.
            self.error_context
                .borrow_mut()
                .replace(error_context.to_string());
        }
    }

    impl InMemoryInterface {
        pub(crate) fn consume(&self) -> (Option<String>, Option<String>, Option<String>) {
            (
                self.message.take().map(|messages| messages.join("\n")),
                self.error.take(),
                self.error_context.take(),
            )
        }
    }
}
