//! core::location
//!
//! Source location resolution for groups and examples.
//!
//! # Resolution order
//!
//! 1. An explicit override from the `caller` tag
//! 2. The body handle's declared source position
//! 3. The first call-stack frame that does not belong to the framework
//!
//! The resolved path is rewritten relative to the working directory
//! (`/work/spec/cart.rs` becomes `./spec/cart.rs`). Paths naming an
//! ephemeral script (`-e` by default) resolve to no path at all.
//!
//! # Invariants
//!
//! - Resolution never fails; unknown paths are absent and unknown lines are 0
//! - Frames are `path:line` or `path:line:col`, most recent first

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use super::types::BodyHandle;
use super::value::MetadataValue;

/// Default sentinel paths for inline/interactive scripts.
pub const DEFAULT_EPHEMERAL_SENTINELS: [&str; 1] = ["-e"];

/// Default framework-frame patterns: this crate's own sources.
pub const DEFAULT_FRAMEWORK_PATTERNS: [&str; 1] = [r"[/\\]specmeta(-[^/\\]+)?[/\\]src[/\\]"];

/// Decides whether a stack frame belongs to the framework itself.
pub trait FrameClassifier: Send + Sync {
    fn is_framework_frame(&self, frame: &str) -> bool;
}

impl<F> FrameClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_framework_frame(&self, frame: &str) -> bool {
        self(frame)
    }
}

/// Classifies frames by matching them against regular expressions.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    patterns: Vec<Regex>,
}

impl PatternClassifier {
    /// Compile a classifier from pattern sources.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl FrameClassifier for PatternClassifier {
    fn is_framework_frame(&self, frame: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(frame))
    }
}

/// Parse a `path:line` or `path:line:col` frame.
///
/// The path is the shortest prefix followed by `:` and at least one digit,
/// so trailing decorations after the line number are ignored.
///
/// # Example
///
/// ```
/// use specmeta::core::location::parse_frame;
///
/// assert_eq!(parse_frame("spec/cart.rs:10:5"), Some(("spec/cart.rs", 10)));
/// assert_eq!(parse_frame("spec/cart.rs:10"), Some(("spec/cart.rs", 10)));
/// assert_eq!(parse_frame("no line here"), None);
/// ```
pub fn parse_frame(frame: &str) -> Option<(&str, u32)> {
    for (idx, _) in frame.match_indices(':') {
        if idx == 0 {
            continue;
        }
        let rest = &frame[idx + 1..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            continue;
        }
        let line = rest[..digits].parse().ok()?;
        return Some((&frame[..idx], line));
    }
    None
}

/// A `path:line:col` frame for the caller of the function it is used in.
///
/// Declaration layers mark their entry points `#[track_caller]` and call
/// this to record where a group or example was declared.
#[track_caller]
pub fn caller_frame() -> String {
    let location = std::panic::Location::caller();
    format!(
        "{}:{}:{}",
        location.file(),
        location.line(),
        location.column()
    )
}

/// The outcome of location resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedLocation {
    /// Path relative to the working directory where possible.
    pub file_path: Option<String>,
    pub line_number: u32,
}

impl ResolvedLocation {
    /// `"<file_path>:<line_number>"`, with an empty path when absent.
    ///
    /// # Example
    ///
    /// ```
    /// use specmeta::core::location::ResolvedLocation;
    ///
    /// let resolved = ResolvedLocation {
    ///     file_path: Some("./spec/foo_spec.rb".into()),
    ///     line_number: 10,
    /// };
    /// assert_eq!(resolved.location(), "./spec/foo_spec.rb:10");
    /// ```
    pub fn location(&self) -> String {
        format!(
            "{}:{}",
            self.file_path.as_deref().unwrap_or(""),
            self.line_number
        )
    }
}

/// Resolves where a group or example was declared.
#[derive(Clone)]
pub struct LocationResolver {
    classifier: Arc<dyn FrameClassifier>,
    working_dir: Option<PathBuf>,
    ephemeral_sentinels: Vec<String>,
}

impl LocationResolver {
    /// Resolver using the process working directory and default sentinels.
    pub fn new(classifier: Arc<dyn FrameClassifier>) -> Self {
        Self {
            classifier,
            working_dir: None,
            ephemeral_sentinels: DEFAULT_EPHEMERAL_SENTINELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Use a fixed working directory instead of the process one.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Replace the ephemeral-script sentinels.
    pub fn with_ephemeral_sentinels<I, S>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ephemeral_sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }

    pub fn classifier(&self) -> &dyn FrameClassifier {
        self.classifier.as_ref()
    }

    fn working_dir(&self) -> Option<PathBuf> {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    /// Resolve file and line for a declaration.
    ///
    /// `explicit` is the value of the consumed `caller` tag. A list whose
    /// second element is a line number is taken as `[file, line]`; any other
    /// list is scanned as a backtrace.
    pub fn resolve(
        &self,
        explicit: Option<&MetadataValue>,
        body: Option<&BodyHandle>,
        frames: &[String],
    ) -> ResolvedLocation {
        let (raw_path, line_number) = if let Some(explicit) = explicit {
            self.from_explicit(explicit)
        } else if let Some(position) = body.and_then(BodyHandle::source_location) {
            (Some(position.file.clone()), position.line)
        } else {
            self.from_frames(frames.iter().map(String::as_str))
        };

        let file_path = raw_path.and_then(|path| self.relative_path(&path));
        ResolvedLocation {
            file_path,
            line_number,
        }
    }

    fn from_explicit(&self, explicit: &MetadataValue) -> (Option<String>, u32) {
        let Some(items) = explicit.as_list() else {
            return match explicit.as_str() {
                Some(frame) => self.from_frames(std::iter::once(frame)),
                None => (None, 0),
            };
        };

        if let [file, line, ..] = items {
            if let Some(line) = line_number_of(line) {
                return (file.as_str().map(str::to_string), line);
            }
        }

        self.from_frames(items.iter().filter_map(MetadataValue::as_str))
    }

    fn from_frames<'a, I>(&self, frames: I) -> (Option<String>, u32)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let frames: Vec<&str> = frames.into_iter().collect();
        let chosen = frames
            .iter()
            .copied()
            .find(|frame| !self.classifier.is_framework_frame(frame))
            .or_else(|| frames.first().copied());

        match chosen.and_then(parse_frame) {
            Some((path, line)) => (Some(path.to_string()), line),
            None => (None, 0),
        }
    }

    /// First frame outside the framework, for error reporting.
    pub fn first_caller_frame<'a>(&self, frames: &'a [String]) -> Option<&'a str> {
        frames
            .iter()
            .map(String::as_str)
            .find(|frame| !self.classifier.is_framework_frame(frame))
    }

    /// Rewrite a path relative to the working directory.
    ///
    /// Returns `None` for ephemeral-script sentinels. A path outside the
    /// working directory is returned unchanged.
    pub fn relative_path(&self, path: &str) -> Option<String> {
        if self.ephemeral_sentinels.iter().any(|s| s == path) {
            return None;
        }

        let Some(cwd) = self.working_dir() else {
            return Some(path.to_string());
        };

        match Path::new(path).strip_prefix(&cwd) {
            Ok(rest) if rest.as_os_str().is_empty() => Some(".".to_string()),
            Ok(rest) => Some(format!("./{}", rest.display())),
            Err(_) => Some(path.to_string()),
        }
    }

    /// Expand a (possibly relative) path against the working directory.
    pub fn absolute_path(&self, path: &str) -> String {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.display().to_string();
        }
        let path = path.strip_prefix(".").unwrap_or(path);
        match self.working_dir() {
            Some(cwd) => cwd.join(path).display().to_string(),
            None => path.display().to_string(),
        }
    }
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("working_dir", &self.working_dir)
            .field("ephemeral_sentinels", &self.ephemeral_sentinels)
            .finish_non_exhaustive()
    }
}

fn line_number_of(value: &MetadataValue) -> Option<u32> {
    match value {
        MetadataValue::Integer(i) => u32::try_from(*i).ok(),
        MetadataValue::Text(s) => s.parse().ok(),
        _ => None,
    }
}
