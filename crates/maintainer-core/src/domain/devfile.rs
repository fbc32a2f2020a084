//! Devfile rewriting for the deprecate action.
//!
//! The tag is inserted as a text edit on `metadata.tags`, so comments, quoting
//! and indentation of the rest of the file are left alone. The edited text is
//! parsed back and must equal the original document with the tag appended;
//! layouts the edit does not understand (multi-line flow lists, flow-style
//! `metadata`) are emitted through serde_yaml instead.

use serde_yaml::Value;

use super::errors::StackError;
use super::stack::parse_deprecated;

/// Tag appended to `metadata.tags` when a stack gets deprecated.
pub const DEPRECATED_TAG: &str = "Deprecated";

/// Append `tag` to `metadata.tags`.
pub fn transform(raw_content: &str, tag: &str) -> Result<String, StackError> {
    // Same acceptance rules as the deprecated flag.
    parse_deprecated(raw_content)?;

    let expected = with_tag(raw_content, tag)?;
    let edited = insert_tag(raw_content, tag).filter(|edited| {
        serde_yaml::from_str::<Value>(edited).is_ok_and(|doc| doc == expected)
    });
    match edited {
        Some(edited) => Ok(edited),
        None => serde_yaml::to_string(&expected).map_err(StackError::definition),
    }
}

fn with_tag(raw_content: &str, tag: &str) -> Result<Value, StackError> {
    let mut doc: Value = serde_yaml::from_str(raw_content).map_err(StackError::definition)?;
    doc.get_mut("metadata")
        .and_then(|metadata| metadata.get_mut("tags"))
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| StackError::MalformedDefinition("metadata.tags is not a list".into()))?
        .push(Value::String(tag.to_string()));
    Ok(doc)
}

fn insert_tag(raw_content: &str, tag: &str) -> Option<String> {
    let lines: Vec<&str> = raw_content.split_inclusive('\n').collect();
    let metadata = lines.iter().position(|line| {
        key_line(line).is_some_and(|key| key.indent == 0 && key.key == "metadata" && key.value.is_empty())
    })?;
    let tags = find_child(&lines, metadata, "tags")?;
    let key = key_line(lines[tags])?;

    let mut out = String::with_capacity(raw_content.len() + tag.len() + 8);
    if key.value.is_empty() {
        let (item_indent, last) = block_items(&lines, tags, key.indent)?;
        let eol = if lines[last].ends_with("\r\n") { "\r\n" } else { "\n" };
        lines[..=last].iter().for_each(|line| out.push_str(line));
        let trailing = if lines[last].ends_with('\n') {
            eol
        } else {
            out.push_str(eol);
            ""
        };
        out.push_str(&format!("{}- {tag}{trailing}", " ".repeat(item_indent)));
        lines[last + 1..].iter().for_each(|line| out.push_str(line));
    } else if key.value.starts_with('[') {
        let line = lines[tags];
        let open = line.find('[')?;
        let close = open + line[open..].find(']')?;
        let separator = if line[open + 1..close].trim().is_empty() { "" } else { ", " };
        lines[..tags].iter().for_each(|line| out.push_str(line));
        out.push_str(&line[..close]);
        out.push_str(separator);
        out.push_str(tag);
        out.push_str(&line[close..]);
        lines[tags + 1..].iter().for_each(|line| out.push_str(line));
    } else {
        return None;
    }
    Some(out)
}

/// `key: value` line of a block mapping. `value` has any trailing comment removed.
struct KeyLine<'a> {
    indent: usize,
    key: &'a str,
    value: &'a str,
}

fn key_line(line: &str) -> Option<KeyLine<'_>> {
    let body = line.trim_end_matches(['\r', '\n']);
    let content = body.trim_start_matches(' ');
    if content.starts_with('#') || content.starts_with('-') {
        return None;
    }
    let (colon, _) = content.char_indices().find(|&(index, ch)| {
        ch == ':'
            && content[index + 1..]
                .chars()
                .next()
                .is_none_or(|next| next == ' ' || next == '\t')
    })?;
    let value = content[colon + 1..].trim();
    let value = if value.starts_with('#') {
        ""
    } else {
        value.find(" #").map_or(value, |hash| value[..hash].trim_end())
    };
    Some(KeyLine {
        indent: body.len() - content.len(),
        key: content[..colon].trim().trim_matches(['"', '\'']),
        value,
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_filler(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Line index of `name` among the direct children of the mapping opened at `parent`.
fn find_child(lines: &[&str], parent: usize, name: &str) -> Option<usize> {
    let parent_indent = indent_of(lines[parent]);
    let mut child_indent = None;
    for (index, line) in lines.iter().enumerate().skip(parent + 1) {
        if is_filler(line) {
            continue;
        }
        let indent = indent_of(line);
        if indent <= parent_indent {
            return None;
        }
        if indent != *child_indent.get_or_insert(indent) {
            continue;
        }
        if key_line(line).is_some_and(|key| key.key == name) {
            return Some(index);
        }
    }
    None
}

/// Indentation of the block sequence under `key` and the index of its last line.
fn block_items(lines: &[&str], key: usize, key_indent: usize) -> Option<(usize, usize)> {
    let mut item_indent = None;
    let mut last = None;
    for (index, line) in lines.iter().enumerate().skip(key + 1) {
        if is_filler(line) {
            continue;
        }
        let indent = indent_of(line);
        let content = line.trim_start_matches(' ');
        let is_item = content.starts_with("- ") || content.trim_end() == "-";
        match item_indent {
            None if is_item && indent >= key_indent => {
                item_indent = Some(indent);
                last = Some(index);
            }
            None => return None,
            Some(item) if indent > item || (indent == item && is_item) => last = Some(index),
            Some(_) => break,
        }
    }
    Some((item_indent?, last?))
}
