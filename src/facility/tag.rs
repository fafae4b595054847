use crate::config::LogSettings;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::path::Path;

/// Tag and head lines resolved for one record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagHead {
    pub tag: String,
    pub console_head: Option<Vec<String>>,
    /// Prefix of the on-disk body: `": "` or `" [<head>]: "`.
    pub file_head: String,
}

impl TagHead {
    fn plain(tag: String) -> Self {
        Self {
            tag,
            console_head: None,
            file_head: ": ".to_string(),
        }
    }
}

const INTERNAL_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "tokio::",
    "futures",
    "rask_logkit::",
    "<std",
    "<core",
    "<alloc",
    "<tokio",
    "<futures",
    "<rask_logkit",
    "__rust",
    "rust_begin_unwind",
    "__libc",
];

const RUNTIME_ENTRY_POINTS: &[&str] = &["main", "_start"];

/// A caller frame taken from a captured backtrace.
#[derive(Debug, Clone, PartialEq)]
struct Frame {
    function: String,
    location: Option<String>,
}

impl Frame {
    fn render(&self) -> String {
        match &self.location {
            Some(location) => format!("{}({})", self.function, location),
            None => self.function.clone(),
        }
    }
}

/// Resolves the tag and head for a call made at `location`.
///
/// `tag` is `None` for the global-tag variants of the logging calls.
pub(crate) fn resolve(
    tag: Option<&str>,
    settings: &LogSettings,
    location: &'static Location<'static>,
) -> TagHead {
    let has_global = settings.has_global_tag();
    if has_global && !settings.head_switch {
        return TagHead::plain(settings.global_tag.clone());
    }

    let requested = tag.unwrap_or(&settings.global_tag);
    let needs_frames = settings.head_switch && (settings.stack_deep > 1 || settings.stack_offset > 0);
    let frames = if needs_frames { caller_frames() } else { Vec::new() };

    // A non-zero offset moves the head to an outer caller when one is known.
    let offset_frame = (settings.stack_offset > 0)
        .then(|| frames.get(settings.stack_offset))
        .flatten();

    let tag = if !has_global && requested.trim().is_empty() {
        file_stem(location.file())
    } else {
        requested.to_string()
    };

    if !settings.head_switch {
        return TagHead::plain(tag);
    }

    let thread = std::thread::current();
    let thread_name = match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    };

    let site = match offset_frame {
        Some(frame) => frame.render(),
        None => format!("{}:{}", location.file(), location.line()),
    };
    let head = format!("{thread_name}, {site}");
    let file_head = format!(" [{head}]: ");

    if settings.stack_deep <= 1 {
        return TagHead {
            tag,
            console_head: Some(vec![head]),
            file_head,
        };
    }

    let indent = " ".repeat(thread_name.len() + 2);
    let mut console_head = Vec::with_capacity(settings.stack_deep);
    console_head.push(head);
    console_head.extend(
        frames
            .iter()
            .skip(settings.stack_offset + 1)
            .take(settings.stack_deep - 1)
            .map(|frame| format!("{indent}{}", frame.render())),
    );

    TagHead {
        tag,
        console_head: Some(console_head),
        file_head,
    }
}

/// File name of `path` up to its first dot.
fn file_stem(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);
    match name.find('.') {
        Some(index) => name[..index].to_string(),
        None => name.to_string(),
    }
}

/// Frames outside this crate, the runtime and the standard library,
/// innermost first. The first one is the logging call site.
fn caller_frames() -> Vec<Frame> {
    parse_backtrace(&Backtrace::force_capture().to_string())
        .into_iter()
        .filter(|frame| !is_internal(&frame.function))
        .collect()
}

fn is_internal(function: &str) -> bool {
    RUNTIME_ENTRY_POINTS.contains(&function)
        || INTERNAL_PREFIXES
            .iter()
            .any(|prefix| function.starts_with(prefix))
}

/// Parses the `Display` form of a backtrace:
///
/// ```text
///    3: app::handler
///              at ./src/handler.rs:12:5
/// ```
fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        let line = line.trim_start();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut()
                && last.location.is_none()
            {
                last.location = Some(location.trim().to_string());
            }
            continue;
        }
        if let Some((index, function)) = line.split_once(": ")
            && !index.is_empty()
            && index.chars().all(|c| c.is_ascii_digit())
        {
            frames.push(Frame {
                function: function.trim().to_string(),
                location: None,
            });
        }
    }
    frames
}
