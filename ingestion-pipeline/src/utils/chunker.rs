use serde::{Deserialize, Serialize};

/// Heading used when a document has no detectable headings.
pub const FALLBACK_HEADING: &str = "Document";

/// A heading plus the body lines that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkerOptions {
    /// Emit a chunk with empty text for a heading directly followed by another
    /// heading. Off by default: such headings are dropped.
    pub keep_empty_sections: bool,
}

/// Splits extracted document text into heading-delimited chunks.
///
/// Lines before the first heading are discarded. A document without any
/// heading becomes a single `"Document"` chunk holding the trimmed input, and
/// blank input yields no chunks.
pub fn chunk_text(text: &str, options: ChunkerOptions) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current_heading: Option<String> = None;
    let mut current_content: Vec<&str> = Vec::new();
    let mut found_heading = false;

    for raw_line in split_lines(text) {
        let line = raw_line.trim();
        if is_heading(line) {
            found_heading = true;
            flush(&mut chunks, current_heading.take(), &current_content, options);
            current_heading = Some(line.to_string());
            current_content.clear();
        } else {
            current_content.push(line);
        }
    }
    flush(&mut chunks, current_heading, &current_content, options);

    if !found_heading {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![Chunk {
            heading: FALLBACK_HEADING.to_string(),
            text: trimmed.to_string(),
        }];
    }

    chunks
}

fn flush(
    chunks: &mut Vec<Chunk>,
    heading: Option<String>,
    content: &[&str],
    options: ChunkerOptions,
) {
    let Some(heading) = heading else {
        return;
    };
    if content.is_empty() && !options.keep_empty_sections {
        return;
    }
    chunks.push(Chunk {
        heading,
        text: content.join("\n"),
    });
}

/// Splits on every line boundary a PDF text layer can carry: `\r\n`, lone `\r`
/// and `\n`, vertical tab, form feed, the information separators, NEL and the
/// Unicode line and paragraph separators. A trailing break does not produce an
/// extra empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(pos) = rest.find(is_line_break) else {
            let line = rest;
            rest = "";
            return Some(line);
        };
        let (line, after) = rest.split_at(pos);
        let width = if after.starts_with("\r\n") {
            2
        } else {
            after.chars().next().map_or(0, char::len_utf8)
        };
        rest = &after[width..];
        Some(line)
    })
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// A trimmed line is a heading when it is all caps and longer than three
/// characters, ends with a colon, or is longer than twenty characters and
/// already in title case.
pub fn is_heading(line: &str) -> bool {
    let len = line.chars().count();
    (len > 3 && is_all_upper(line))
        || line.ends_with(':')
        || (len > 20 && line == title_case(line))
}

/// True when the line has at least one cased character and none are lowercase.
fn is_all_upper(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Uppercases the first cased character of every word and lowercases the rest.
/// Any uncased character (digit, apostrophe, space) starts a new word.
fn title_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut previous_cased = false;
    for c in line.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && previous_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}
