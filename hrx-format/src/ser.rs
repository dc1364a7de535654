//! Serialization of entries back into HRX text.

use std::collections::BTreeSet;

use crate::entry::Entry;

pub(crate) fn serialize(entries: &[Entry], last_comment: Option<&str>, preferred: usize) -> String {
    if entries.is_empty() && last_comment.is_none() {
        return String::new();
    }

    let width = boundary_length(entries, last_comment, preferred);
    let boundary = format!("<{}>", "=".repeat(width));
    let mut out = String::new();

    for entry in entries {
        if let Some(comment) = entry.comment() {
            start_line(&mut out);
            out.push_str(&boundary);
            out.push('\n');
            out.push_str(comment);
            out.push('\n');
        }

        start_line(&mut out);
        out.push_str(&boundary);
        out.push(' ');
        out.push_str(entry.path().as_str());
        out.push('\n');

        if let Entry::File(file) = entry {
            out.push_str(file.content());
        }
    }

    if let Some(comment) = last_comment {
        start_line(&mut out);
        out.push_str(&boundary);
        out.push('\n');
        out.push_str(comment);
    }

    out
}

/// Boundaries must begin a line, so break the line if the previous content
/// left one open.
#[inline(always)]
fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// The smallest width, starting from `preferred`, whose boundary begins no
/// line of any content or comment.
pub(crate) fn boundary_length(entries: &[Entry], last_comment: Option<&str>, preferred: usize) -> usize {
    let mut forbidden = BTreeSet::new();

    let texts = entries
        .iter()
        .flat_map(|entry| [entry.content(), entry.comment()])
        .chain(std::iter::once(last_comment))
        .flatten();
    for text in texts {
        forbidden.extend(text.split('\n').filter_map(boundary_width));
    }

    let mut width = preferred;
    while forbidden.contains(&width) {
        width += 1;
    }

    if width != preferred {
        tracing::debug!(
            "boundary length {} collides with archived text, using {}",
            preferred,
            width
        );
    }
    width
}

/// Width of the boundary that starts `line`, if any.
fn boundary_width(line: &str) -> Option<usize> {
    let rest = line.strip_prefix('<')?;
    let width = rest.bytes().take_while(|b| *b == b'=').count();
    if width > 0 && rest.as_bytes().get(width) == Some(&b'>') {
        Some(width)
    } else {
        None
    }
}
