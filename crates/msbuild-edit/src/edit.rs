//! Mutating operations on project files.
//!
//! Both operations stream the document through quick-xml event by event into
//! a fresh buffer and only write the file once the whole rewrite succeeded.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::warn;

use crate::attr_value;
use crate::entity::FileReference;
use crate::error::EditError;

const INDENT_ITEM: &str = "\n    ";
const INDENT_CHILD: &str = "\n      ";

/// Delete every `PackageReference` whose `Include` matches `package_id`
/// case-insensitively. The file is only rewritten when at least one element
/// was removed; the removed count is returned.
pub fn remove_package_reference(path: &Path, package_id: &str) -> Result<usize, EditError> {
    if package_id.trim().is_empty() {
        return Err(EditError::InvalidArgument("package id is empty"));
    }
    if !path.is_file() {
        return Err(EditError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| EditError::io(path, e))?;

    let mut reader = Reader::from_str(&content);
    let mut writer = Writer::new(Vec::new());
    let mut removed = 0usize;
    // indentation preceding the next element, held back so a removal can
    // take its leading whitespace with it
    let mut pending_ws: Option<BytesText> = None;
    loop {
        match reader.read_event().map_err(|e| EditError::xml(path, e))? {
            Event::Eof => break,
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {
                if let Some(prev) = pending_ws.replace(t) {
                    emit(&mut writer, Event::Text(prev), path)?;
                }
            }
            Event::Start(e) => {
                if is_package_reference(&e, package_id, path)? {
                    pending_ws = None;
                    let end = e.to_end().into_owned();
                    reader
                        .read_to_end(end.name())
                        .map_err(|err| EditError::xml(path, err))?;
                    removed += 1;
                } else {
                    flush_text(&mut writer, &mut pending_ws, path)?;
                    emit(&mut writer, Event::Start(e), path)?;
                }
            }
            Event::Empty(e) => {
                if is_package_reference(&e, package_id, path)? {
                    pending_ws = None;
                    removed += 1;
                } else {
                    flush_text(&mut writer, &mut pending_ws, path)?;
                    emit(&mut writer, Event::Empty(e), path)?;
                }
            }
            event => {
                flush_text(&mut writer, &mut pending_ws, path)?;
                emit(&mut writer, event, path)?;
            }
        }
    }
    flush_text(&mut writer, &mut pending_ws, path)?;

    if removed > 0 {
        fs::write(path, writer.into_inner()).map_err(|e| EditError::io(path, e))?;
    }
    Ok(removed)
}

/// Add or update direct assembly references.
///
/// The target container is the first `ItemGroup` with a direct `Reference`
/// child; when none exists a fresh `ItemGroup` is appended under the root.
/// A pair whose name matches an existing reference case-insensitively updates
/// its `HintPath` child in place; all other pairs append a new `Reference`
/// carrying the hint path and `Private` set to `true`. Pairs with a blank
/// name or path are skipped with a warning.
pub fn add_file_references(path: &Path, references: &[FileReference]) -> Result<(), EditError> {
    if references.is_empty() {
        return Err(EditError::NoReferences);
    }
    if !path.is_file() {
        return Err(EditError::NotFound(path.to_path_buf()));
    }

    // within-call dedupe by name, last hint wins
    let mut picked: Vec<FileReference> = Vec::new();
    for reference in references {
        if reference.name.trim().is_empty() || reference.hint_path.trim().is_empty() {
            warn!(
                name = %reference.name,
                hint_path = %reference.hint_path,
                "skipping invalid reference entry"
            );
            continue;
        }
        match picked
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&reference.name))
        {
            Some(p) => p.hint_path = reference.hint_path.clone(),
            None => picked.push(reference.clone()),
        }
    }

    let content = fs::read_to_string(path).map_err(|e| EditError::io(path, e))?;
    let layout = scan_reference_groups(&content, path)?;

    let mut updates: HashMap<String, String> = HashMap::new();
    let mut to_append: Vec<FileReference> = Vec::new();
    for reference in picked {
        if layout
            .existing
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&reference.name))
        {
            updates.insert(reference.name.to_ascii_lowercase(), reference.hint_path);
        } else {
            to_append.push(reference);
        }
    }

    let output = rewrite_references(&content, path, layout.target, &updates, &to_append)?;
    fs::write(path, output).map_err(|e| EditError::io(path, e))
}

struct Layout {
    /// Occurrence index of the first `ItemGroup` with a direct `Reference`
    /// child, counting `ItemGroup` start and self-closing events alike.
    target: Option<usize>,
    /// `Include` names of the `Reference` elements inside that group.
    existing: Vec<String>,
}

fn scan_reference_groups(content: &str, path: &Path) -> Result<Layout, EditError> {
    let mut reader = Reader::from_str(content);
    let mut group_counter = 0usize;
    // stack of open elements; Some(index) marks an ItemGroup frame
    let mut stack: Vec<Option<usize>> = Vec::new();
    let mut target: Option<usize> = None;
    let mut existing: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(|e| EditError::xml(path, e))? {
            Event::Eof => break,
            Event::Start(e) => {
                let group = if e.local_name().as_ref() == b"ItemGroup" {
                    group_counter += 1;
                    Some(group_counter - 1)
                } else {
                    None
                };
                if e.local_name().as_ref() == b"Reference" {
                    note_reference(&e, &stack, &mut target, &mut existing, path)?;
                }
                stack.push(group);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"ItemGroup" {
                    group_counter += 1;
                } else if e.local_name().as_ref() == b"Reference" {
                    note_reference(&e, &stack, &mut target, &mut existing, path)?;
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            _ => {}
        }
    }
    Ok(Layout { target, existing })
}

fn note_reference(
    element: &BytesStart,
    stack: &[Option<usize>],
    target: &mut Option<usize>,
    existing: &mut Vec<String>,
    path: &Path,
) -> Result<(), EditError> {
    // only direct children of an ItemGroup count
    let Some(Some(group)) = stack.last() else {
        return Ok(());
    };
    match target {
        None => *target = Some(*group),
        Some(t) if *t == *group => {}
        _ => return Ok(()),
    }
    if let Some(name) = attr_value(element, b"Include", path)? {
        if !name.is_empty() {
            existing.push(name);
        }
    }
    Ok(())
}

fn rewrite_references(
    content: &str,
    path: &Path,
    target: Option<usize>,
    updates: &HashMap<String, String>,
    to_append: &[FileReference],
) -> Result<Vec<u8>, EditError> {
    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new(Vec::new());
    let mut group_counter = 0usize;
    let mut depth = 0usize;
    let mut group_depth = 0usize;
    let mut in_target = false;
    let mut pending_hint: Option<String> = None;
    let mut ref_child_depth = 0usize;

    loop {
        match reader.read_event().map_err(|e| EditError::xml(path, e))? {
            Event::Eof => break,
            Event::Start(e) => {
                if depth == ref_child_depth && e.local_name().as_ref() == b"HintPath" {
                    if let Some(hint) = pending_hint.take() {
                        // swap the hint text, keep the element as-is otherwise
                        let end = e.to_end().into_owned();
                        emit(&mut writer, Event::Start(e), path)?;
                        emit(&mut writer, Event::Text(BytesText::new(&hint)), path)?;
                        reader
                            .read_to_end(end.name())
                            .map_err(|err| EditError::xml(path, err))?;
                        emit(&mut writer, Event::End(end), path)?;
                        continue;
                    }
                }
                if e.local_name().as_ref() == b"ItemGroup" {
                    let index = group_counter;
                    group_counter += 1;
                    if target == Some(index) {
                        in_target = true;
                        group_depth = depth;
                    }
                } else if in_target
                    && depth == group_depth + 1
                    && e.local_name().as_ref() == b"Reference"
                {
                    if let Some(name) = attr_value(&e, b"Include", path)? {
                        if let Some(hint) = updates.get(&name.to_ascii_lowercase()) {
                            pending_hint = Some(hint.clone());
                            ref_child_depth = depth + 1;
                        }
                    }
                }
                depth += 1;
                emit(&mut writer, Event::Start(e), path)?;
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"ItemGroup" {
                    group_counter += 1;
                    emit(&mut writer, Event::Empty(e), path)?;
                } else if pending_hint.is_some()
                    && depth == ref_child_depth
                    && e.local_name().as_ref() == b"HintPath"
                {
                    // expand a self-closing HintPath to carry the new text
                    if let Some(hint) = pending_hint.take() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        emit(&mut writer, Event::Start(e), path)?;
                        emit(&mut writer, Event::Text(BytesText::new(&hint)), path)?;
                        emit(&mut writer, Event::End(BytesEnd::new(name)), path)?;
                    }
                } else if depth == 0 && target.is_none() && !to_append.is_empty() {
                    // self-closing root; expand it to hold the new group
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    emit(&mut writer, Event::Start(e), path)?;
                    write_item_group(&mut writer, to_append, path)?;
                    emit(&mut writer, Event::End(BytesEnd::new(name)), path)?;
                } else {
                    emit(&mut writer, Event::Empty(e), path)?;
                }
            }
            Event::End(e) => {
                if pending_hint.is_some()
                    && depth == ref_child_depth
                    && e.local_name().as_ref() == b"Reference"
                {
                    pending_hint = None;
                }
                if in_target && depth == group_depth + 1 && e.local_name().as_ref() == b"ItemGroup"
                {
                    write_references(&mut writer, to_append, path)?;
                    in_target = false;
                } else if depth == 1 && target.is_none() && !to_append.is_empty() {
                    // root closes without any Reference-bearing ItemGroup
                    write_item_group(&mut writer, to_append, path)?;
                }
                depth = depth.saturating_sub(1);
                emit(&mut writer, Event::End(e), path)?;
            }
            event => emit(&mut writer, event, path)?,
        }
    }
    Ok(writer.into_inner())
}

fn write_item_group<W: io::Write>(
    writer: &mut Writer<W>,
    references: &[FileReference],
    path: &Path,
) -> Result<(), EditError> {
    emit(writer, Event::Text(BytesText::new("  ")), path)?;
    emit(writer, Event::Start(BytesStart::new("ItemGroup")), path)?;
    emit(writer, Event::Text(BytesText::new(INDENT_ITEM)), path)?;
    write_references(writer, references, path)?;
    emit(writer, Event::End(BytesEnd::new("ItemGroup")), path)?;
    emit(writer, Event::Text(BytesText::new("\n")), path)?;
    Ok(())
}

fn write_references<W: io::Write>(
    writer: &mut Writer<W>,
    references: &[FileReference],
    path: &Path,
) -> Result<(), EditError> {
    for reference in references {
        let mut start = BytesStart::new("Reference");
        start.push_attribute(("Include", reference.name.as_str()));
        emit(writer, Event::Start(start), path)?;
        emit(writer, Event::Text(BytesText::new(INDENT_CHILD)), path)?;
        emit(writer, Event::Start(BytesStart::new("HintPath")), path)?;
        emit(
            writer,
            Event::Text(BytesText::new(&reference.hint_path)),
            path,
        )?;
        emit(writer, Event::End(BytesEnd::new("HintPath")), path)?;
        emit(writer, Event::Text(BytesText::new(INDENT_CHILD)), path)?;
        emit(writer, Event::Start(BytesStart::new("Private")), path)?;
        emit(writer, Event::Text(BytesText::new("true")), path)?;
        emit(writer, Event::End(BytesEnd::new("Private")), path)?;
        emit(writer, Event::Text(BytesText::new(INDENT_ITEM)), path)?;
        emit(writer, Event::End(BytesEnd::new("Reference")), path)?;
        emit(writer, Event::Text(BytesText::new("\n  ")), path)?;
    }
    Ok(())
}

fn is_package_reference(
    element: &BytesStart,
    package_id: &str,
    path: &Path,
) -> Result<bool, EditError> {
    if element.local_name().as_ref() != b"PackageReference" {
        return Ok(false);
    }
    Ok(attr_value(element, b"Include", path)?
        .map(|value| value.eq_ignore_ascii_case(package_id))
        .unwrap_or(false))
}

fn emit<W: io::Write>(writer: &mut Writer<W>, event: Event, path: &Path) -> Result<(), EditError> {
    writer
        .write_event(event)
        .map_err(|e| EditError::xml(path, e))
}

fn flush_text<W: io::Write>(
    writer: &mut Writer<W>,
    pending: &mut Option<BytesText>,
    path: &Path,
) -> Result<(), EditError> {
    if let Some(text) = pending.take() {
        emit(writer, Event::Text(text), path)?;
    }
    Ok(())
}
