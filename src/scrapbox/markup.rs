//! Scrapbox markup → ratatui `Text` renderer.
//!
//! Only three constructs are understood: indentation (rendered as a bold
//! `・` bullet), bold spans `[* text]` and bracket links `[Page title]`.
//! Everything else is shown verbatim.
//!
//! Rendering runs in a fixed order over a flat list of segments:
//!
//! ```text
//! raw ──▶ normalize ──▶ bold pass ──▶ link pass ──▶ Text<'static> + links
//! ```
//!
//! Each pass only scans and rewrites `Plain` segments, so text styled by an
//! earlier step is never matched again.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use regex::Regex;

use super::types::{Content, Link, push_unique};

/// Marker inserted in front of indented lines.
pub const BULLET: &str = "・";

/// `[* text]`. Only ASCII whitespace may follow the star. Replacement
/// looks for the literal `[* ` form.
static BOLD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\*[\t\n\f\r ]([^(\[|\])]+)\]").expect("bold pattern is valid")
});

/// `[text]` where text does not start with `$`, `*`, `(`, `|` or `)` and
/// contains none of `[`, `]`, `(`, `|`, `)`.
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^($|*)][^(\[|\])]+)\]").expect("link pattern is valid")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[0-9A-Za-z_!?/+\-~;.,*&@#$%()'\[\]]+").expect("url pattern is valid")
});

/// Returns the first bare URL in `text`, if any.
pub fn find_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}

/// Parses a page's raw text into styled content and its de-duplicated links.
pub fn parse(raw: &str, accent: Color) -> Content {
    let segments = normalize(raw);
    let segments = render_pass(segments, &BOLD_PATTERN, Kind::Bold, |m| format!("[* {m}]"), |_| {});

    let mut links = Vec::new();
    let segments = render_pass(
        segments,
        &LINK_PATTERN,
        Kind::Link,
        |m| format!("[{m}]"),
        |m| {
            push_unique(&mut links, Link::new(m));
        },
    );

    Content {
        body: into_text(segments, accent),
        links,
    }
}

// ── Segments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Plain,
    Bold,
    Link,
}

#[derive(Debug, Clone)]
struct Segment {
    text: String,
    kind: Kind,
}

impl Segment {
    fn new(text: impl Into<String>, kind: Kind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Appends plain text, merging with a trailing plain segment.
fn push_plain(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.kind == Kind::Plain => last.text.push_str(text),
        _ => segments.push(Segment::new(text, Kind::Plain)),
    }
}

// ── Normalizer ──────────────────────────────────────────────────────────────

fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{3000}'
}

/// Byte offset where the bullet goes: the first non-space char of a line
/// that starts with whitespace.
fn bullet_position(line: &str) -> Option<usize> {
    let mut chars = line.char_indices();
    let (_, first) = chars.next()?;
    if !is_space(first) {
        return None;
    }
    chars.find(|&(_, c)| !is_space(c)).map(|(at, _)| at)
}

/// Drops the title line and bullets every indented line after it.
fn normalize(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (i, line) in raw.split('\n').skip(1).enumerate() {
        if i > 0 {
            push_plain(&mut segments, "\n");
        }
        match bullet_position(line) {
            Some(at) => {
                push_plain(&mut segments, &line[..at]);
                segments.push(Segment::new(BULLET, Kind::Bold));
                push_plain(&mut segments, &line[at..]);
            }
            None => push_plain(&mut segments, line),
        }
    }
    segments
}

// ── Bold / link passes ──────────────────────────────────────────────────────

/// Collects every match over the plain text first, then replaces each
/// match's bracketed form everywhere it occurs.
fn render_pass(
    segments: Vec<Segment>,
    pattern: &Regex,
    kind: Kind,
    bracketed: impl Fn(&str) -> String,
    mut on_match: impl FnMut(&str),
) -> Vec<Segment> {
    let matches: Vec<String> = segments
        .iter()
        .filter(|s| s.kind == Kind::Plain)
        .flat_map(move |s| {
            pattern
                .captures_iter(&s.text)
                .map(|caps| caps[1].to_string())
        })
        .collect();

    let mut segments = segments;
    for matched in matches {
        on_match(&matched);
        segments = replace_all(segments, &bracketed(&matched), &matched, kind);
    }
    segments
}

fn replace_all(segments: Vec<Segment>, needle: &str, replacement: &str, kind: Kind) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.kind != Kind::Plain || !segment.text.contains(needle) {
            out.push(segment);
            continue;
        }
        let mut rest = segment.text.as_str();
        while let Some(at) = rest.find(needle) {
            push_plain(&mut out, &rest[..at]);
            out.push(Segment::new(replacement, kind));
            rest = &rest[at + needle.len()..];
        }
        push_plain(&mut out, rest);
    }
    out
}

// ── Output ──────────────────────────────────────────────────────────────────

fn into_text(segments: Vec<Segment>, accent: Color) -> Text<'static> {
    let mut lines = vec![Line::default()];
    for segment in segments {
        let style = match segment.kind {
            Kind::Plain => Style::default(),
            Kind::Bold => Style::default().add_modifier(Modifier::BOLD),
            Kind::Link => Style::default().fg(accent),
        };
        for (i, part) in segment.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if part.is_empty() {
                continue;
            }
            // ratatui renders \t as zero-width
            let content = part.replace('\t', "    ");
            if let Some(line) = lines.last_mut() {
                line.push_span(Span::styled(content, style));
            }
        }
    }
    Text::from(lines)
}
