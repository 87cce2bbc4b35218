//! Read-modify-write access to the site's `games.js` data file.
//!
//! The site keeps its upcoming games as a JavaScript array literal:
//!
//! ```text
//! const comingSoonGames = [
//!     { id: 1030300, name: "Hollow Knight: Silksong", year: 2025 },
//!     { id: 2358720, name: "Black Myth: Wukong", release_info: "TBA", release_type: "window" }
//! ];
//! ```
//!
//! This module treats that file as text, not as JavaScript. It finds the
//! array, splits it into `{ ... }` blocks, and rewrites only the
//! `release_info` and `release_type` fields of blocks that have a `name`.
//! Every other byte of the file is written back unchanged.
//!
//! # Limitations
//!
//! - A block ends at its first `}`; nested objects inside a record are not supported.
//! - The array ends at the first `];` after its opening bracket.

use crate::models::{DateRecord, GameEntry};
use crate::utils::{escape_js_string, unescape_js_string};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, instrument};

/// A double-quoted JS string body, honoring backslash escapes.
const JS_STRING: &str = r#""((?:[^"\\]|\\.)*)""#;

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*?\}").unwrap());

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"\bname:\s*{}", JS_STRING)).unwrap());

static RELEASE_INFO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\brelease_info:\s*{}", JS_STRING)).unwrap());

static RELEASE_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\brelease_type:\s*{}", JS_STRING)).unwrap());

/// Field removal patterns: `, field: "..."` first, then a leading `field: "...",`.
static STRIP_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["release_info", "release_type"]
        .iter()
        .flat_map(|field| {
            [
                format!(r",\s*\b{}:\s*{}", field, JS_STRING),
                format!(r"\b{}:\s*{}\s*,\s*", field, JS_STRING),
            ]
        })
        .map(|pattern| Regex::new(&pattern).unwrap())
        .collect()
});

/// Errors about the shape of the games file.
#[derive(Debug)]
pub enum StoreError {
    /// No `const <name> = [ ... ];` declaration was found.
    ArrayNotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ArrayNotFound(name) => write!(f, "array `const {} = [...]` not found", name),
        }
    }
}

impl Error for StoreError {}

/// One `{ ... }` record block inside the array.
#[derive(Debug, Clone)]
pub struct Block {
    /// Byte range of the block in the whole file, braces included.
    pub range: Range<usize>,
    /// Parsed view, or `None` when the block has no `name` field.
    pub entry: Option<GameEntry>,
}

/// The games file split into the array's record blocks.
#[derive(Debug, Clone)]
pub struct GamesDocument {
    content: String,
    blocks: Vec<Block>,
}

impl GamesDocument {
    /// Locate `array_name` in `content` and index its blocks.
    pub fn parse(content: String, array_name: &str) -> Result<Self, StoreError> {
        let body = locate_array(&content, array_name)
            .ok_or_else(|| StoreError::ArrayNotFound(array_name.to_string()))?;

        let blocks = BLOCK_RE
            .find_iter(&content[body.clone()])
            .map(|m| {
                let range = body.start + m.start()..body.start + m.end();
                Block {
                    entry: parse_entry(m.as_str()),
                    range,
                }
            })
            .collect::<Vec<_>>();

        debug!(array_name, blocks = blocks.len(), "Indexed games array");
        Ok(Self { content, blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Rebuild the file with fresh records.
    ///
    /// `records[i]` replaces the release fields of block `i`; blocks with no
    /// record (or past the end of `records`) are copied unchanged, as is all
    /// text between and around blocks.
    pub fn render(&self, records: &[Option<DateRecord>]) -> String {
        let mut out = String::with_capacity(self.content.len() + records.len() * 64);
        let mut cursor = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            out.push_str(&self.content[cursor..block.range.start]);
            let text = &self.content[block.range.clone()];
            match records.get(i).and_then(Option::as_ref) {
                Some(record) => out.push_str(&patch_block(text, record)),
                None => out.push_str(text),
            }
            cursor = block.range.end;
        }
        out.push_str(&self.content[cursor..]);
        out
    }
}

/// Byte range of the array body (between `[` and `];`) for `const <name> = [...];`.
pub fn locate_array(content: &str, array_name: &str) -> Option<Range<usize>> {
    let pattern = format!(r"(?s)const\s+{}\s*=\s*\[(.*?)\];", regex::escape(array_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)?.get(1).map(|m| m.range())
}

/// Read the name and current release fields of one block.
pub fn parse_entry(block: &str) -> Option<GameEntry> {
    let name = NAME_RE.captures(block)?;
    let field = |re: &Regex| re.captures(block).map(|c| unescape_js_string(&c[1]));
    Some(GameEntry {
        name: unescape_js_string(&name[1]),
        release_info: field(&*RELEASE_INFO_RE),
        release_type: field(&*RELEASE_TYPE_RE),
    })
}

/// Replace a block's `release_info`/`release_type` pair with `record`.
///
/// Old values are removed wherever they sit. The new pair goes after the
/// last field, ahead of any `//` comment ending that line, and the text
/// between it and the closing brace is kept.
pub fn patch_block(block: &str, record: &DateRecord) -> String {
    let mut stripped = block.to_string();
    for re in STRIP_RES.iter() {
        stripped = re.replace(&stripped, "").into_owned();
    }

    let close = stripped.rfind('}').unwrap_or(stripped.len());
    let (body, tail) = stripped.split_at(close);
    let content = body.trim_end();
    let before_brace = &body[content.len()..];

    // Fields appended after a trailing line comment would be commented out.
    let line_start = content.rfind('\n').map_or(0, |i| i + 1);
    let code_end = line_comment_start(&content[line_start..])
        .map_or(content.len(), |i| line_start + i);
    let code = content[..code_end].trim_end();
    let comment = &content[code.len()..];

    let fields = format!(
        r#"release_info: "{}", release_type: "{}""#,
        escape_js_string(record.text()),
        record.release_type()
    );
    if code.ends_with(',') {
        format!("{} {},{}{}{}", code, fields, comment, before_brace, tail)
    } else {
        format!("{}, {}{}{}{}", code, fields, comment, before_brace, tail)
    }
}

/// Byte offset of a `//` comment in `line`, ignoring slashes inside string literals.
fn line_comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev_slash = false;
    for (i, ch) in line.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => {
                quote = Some(ch);
                prev_slash = false;
            }
            '/' if prev_slash => return Some(i - 1),
            '/' => prev_slash = true,
            _ => prev_slash = false,
        }
    }
    None
}

/// Read the games file.
///
/// # Arguments
///
/// * `path` - Location of the site's `games.js`
///
/// # Returns
///
/// The whole file as a string.
///
/// # Errors
///
/// Returns a "games file not found" error when `path` does not exist, or
/// the underlying I/O error for any other read failure.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_games_file(path: &Path) -> Result<String, Box<dyn Error>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            info!(bytes = content.len(), "Read games file");
            Ok(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("games file not found: {}", path.display()).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Replace a file's contents without ever leaving it half-written.
///
/// The content goes to a temp file next to the target, which is then
/// renamed over it. A symlinked `path` is resolved first so the link stays
/// in place and its target is replaced, and an existing file's permissions
/// are carried over to the new one.
///
/// # Arguments
///
/// * `path` - The file to replace (created if missing)
/// * `content` - The full new contents
///
/// # Returns
///
/// `Ok(())` once the new contents are in place.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, written or synced,
/// if permissions cannot be copied, or if the final rename fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_atomically(path: &Path, content: &str) -> Result<(), Box<dyn Error>> {
    let target = match std::fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(e.into()),
    };
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    if let Ok(existing) = std::fs::metadata(&target) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target)?;
    debug!(target = %target.display(), "Replaced file");
    info!(bytes = content.len(), "Wrote games file");
    Ok(())
}
