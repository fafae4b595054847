use super::ConsoleSink;
use crate::config::{ConsoleOutputListener, LogSettings};
use crate::domain::Severity;

/// Longest console write, in characters.
pub const MAX_LEN: usize = 1100;

pub(crate) const TOP_BORDER: &str = "┌────────────────────────────────────────────────────────────────────────────────────────────────────────────────";
pub(crate) const MIDDLE_BORDER: &str = "├┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄";
pub(crate) const BOTTOM_BORDER: &str = "└────────────────────────────────────────────────────────────────────────────────────────────────────────────────";
pub(crate) const LEFT_BORDER: &str = "│ ";
const PLACEHOLDER: &str = " ";

/// Renders one record onto a console sink, with or without borders.
pub(crate) struct ConsolePrinter<'a> {
    sink: &'a dyn ConsoleSink,
    listener: Option<&'a dyn ConsoleOutputListener>,
    border: bool,
    single_tag: bool,
}

impl<'a> ConsolePrinter<'a> {
    pub(crate) fn new(
        sink: &'a dyn ConsoleSink,
        listener: Option<&'a dyn ConsoleOutputListener>,
        settings: &LogSettings,
    ) -> Self {
        Self {
            sink,
            listener,
            border: settings.border_switch,
            single_tag: settings.single_tag_switch,
        }
    }

    pub(crate) fn print(&self, severity: Severity, tag: &str, head: Option<&[String]>, msg: &str) {
        if self.single_tag {
            let block = self.single_tag_block(head, msg);
            self.print_single_tag(severity, tag, &block);
        } else {
            self.print_border(severity, tag, TOP_BORDER);
            self.print_head(severity, tag, head);
            self.print_msg(severity, tag, msg);
            self.print_border(severity, tag, BOTTOM_BORDER);
        }
    }

    fn print_border(&self, severity: Severity, tag: &str, border: &str) {
        if self.border {
            self.emit(severity, tag, border);
        }
    }

    fn print_head(&self, severity: Severity, tag: &str, head: Option<&[String]>) {
        let Some(head) = head else {
            return;
        };
        for line in head {
            if self.border {
                self.emit(severity, tag, &format!("{LEFT_BORDER}{line}"));
            } else {
                self.emit(severity, tag, line);
            }
        }
        self.print_border(severity, tag, MIDDLE_BORDER);
    }

    fn print_msg(&self, severity: Severity, tag: &str, msg: &str) {
        let chars = CharIndex::new(msg);
        let len = chars.len();
        if len <= MAX_LEN {
            self.print_sub_msg(severity, tag, msg);
            return;
        }
        let mut index = 0;
        while index < len {
            let end = (index + MAX_LEN).min(len);
            self.print_sub_msg(severity, tag, chars.slice(index, end));
            index = end;
        }
    }

    fn print_sub_msg(&self, severity: Severity, tag: &str, msg: &str) {
        if !self.border {
            self.emit(severity, tag, msg);
            return;
        }
        for line in msg.split('\n') {
            self.emit(severity, tag, &format!("{LEFT_BORDER}{line}"));
        }
    }

    fn single_tag_block(&self, head: Option<&[String]>, msg: &str) -> String {
        let mut block = String::with_capacity(msg.len() + 512);
        if self.border {
            block.push_str(PLACEHOLDER);
            block.push('\n');
            block.push_str(TOP_BORDER);
            block.push('\n');
            if let Some(head) = head {
                for line in head {
                    block.push_str(LEFT_BORDER);
                    block.push_str(line);
                    block.push('\n');
                }
                block.push_str(MIDDLE_BORDER);
                block.push('\n');
            }
            for line in msg.split('\n') {
                block.push_str(LEFT_BORDER);
                block.push_str(line);
                block.push('\n');
            }
            block.push_str(BOTTOM_BORDER);
        } else {
            if let Some(head) = head {
                block.push_str(PLACEHOLDER);
                block.push('\n');
                for line in head {
                    block.push_str(line);
                    block.push('\n');
                }
            }
            block.push_str(msg);
        }
        block
    }

    fn print_single_tag(&self, severity: Severity, tag: &str, msg: &str) {
        let chars = CharIndex::new(msg);
        let len = chars.len();
        let bottom_len = BOTTOM_BORDER.chars().count();
        let count_of_sub = if self.border {
            len.saturating_sub(bottom_len) / MAX_LEN
        } else {
            len / MAX_LEN
        };

        if count_of_sub == 0 {
            self.emit(severity, tag, msg);
            return;
        }

        if self.border {
            let first = format!("{}\n{BOTTOM_BORDER}", chars.slice(0, MAX_LEN));
            self.emit(severity, tag, &first);
            let mut index = MAX_LEN;
            for _ in 1..count_of_sub {
                let chunk = format!(
                    "{PLACEHOLDER}\n{TOP_BORDER}\n{LEFT_BORDER}{}\n{BOTTOM_BORDER}",
                    chars.slice(index, index + MAX_LEN)
                );
                self.emit(severity, tag, &chunk);
                index += MAX_LEN;
            }
            if index != len - bottom_len {
                let rest = format!(
                    "{PLACEHOLDER}\n{TOP_BORDER}\n{LEFT_BORDER}{}",
                    chars.slice(index, len)
                );
                self.emit(severity, tag, &rest);
            }
        } else {
            self.emit(severity, tag, chars.slice(0, MAX_LEN));
            let mut index = MAX_LEN;
            for _ in 1..count_of_sub {
                let chunk = format!("{PLACEHOLDER}\n{}", chars.slice(index, index + MAX_LEN));
                self.emit(severity, tag, &chunk);
                index += MAX_LEN;
            }
            if index != len {
                let rest = format!("{PLACEHOLDER}\n{}", chars.slice(index, len));
                self.emit(severity, tag, &rest);
            }
        }
    }

    fn emit(&self, severity: Severity, tag: &str, text: &str) {
        self.sink.write(severity, tag, text);
        if let Some(listener) = self.listener {
            listener.on_console_output(severity, tag, text);
        }
    }
}

/// Character-indexed view of a string, so chunking never splits a
/// multi-byte character.
struct CharIndex<'s> {
    text: &'s str,
    bounds: Vec<usize>,
}

impl<'s> CharIndex<'s> {
    fn new(text: &'s str) -> Self {
        let bounds = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, bounds }
    }

    fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    fn slice(&self, start: usize, end: usize) -> &'s str {
        &self.text[self.bounds[start]..self.bounds[end]]
    }
}
