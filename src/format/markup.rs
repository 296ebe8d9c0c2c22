// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Identity handling for BPMN/DMN markup.
//!
//! Only the opening `definitions` element is inspected: its `id` and `name` attributes are
//! lifted out on parse and written back on export. That tag is re-serialized; everything
//! around it is kept byte-for-byte.

use std::borrow::Cow;
use std::ops::Range;

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

const ROOT: &[u8] = b"definitions";

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("missing definitions element")]
    NoDefinitions,
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute on definitions: {0}")]
    Attr(#[from] AttrError),
    #[error("definitions tag is not valid utf-8")]
    NotUtf8,
}

/// Identity attributes found on the root element, with the markup minus those attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMarkup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub body: String,
}

struct RootTag<'a> {
    /// Byte range of the whole tag, `<` through `>`.
    range: Range<usize>,
    tag: BytesStart<'a>,
    empty: bool,
}

/// The first `definitions` start tag, in any namespace. Comments, the declaration and
/// processing instructions are skipped by the reader.
fn root_tag(text: &str) -> Result<RootTag<'_>, MarkupError> {
    let mut reader = Reader::from_str(text);
    loop {
        let (tag, empty) = match reader.read_event()? {
            Event::Start(tag) => (tag, false),
            Event::Empty(tag) => (tag, true),
            Event::Eof => return Err(MarkupError::NoDefinitions),
            _ => continue,
        };
        if tag.local_name().as_ref() != ROOT {
            continue;
        }
        // `tag` holds the bytes between `<` and `>` (minus the `/` of an empty tag).
        let end = reader.buffer_position();
        let start = end
            .checked_sub(tag.len() + if empty { 3 } else { 2 })
            .filter(|start| text.as_bytes().get(*start) == Some(&b'<'))
            .ok_or(MarkupError::NoDefinitions)?;
        return Ok(RootTag {
            range: start..end,
            tag,
            empty,
        });
    }
}

fn attr_text(value: Result<Cow<'_, str>, quick_xml::Error>, raw: &[u8]) -> String {
    match value {
        Ok(value) => value.into_owned(),
        Err(err) => {
            tracing::debug!(%err, "keeping undecodable attribute value as written");
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

/// Writes `root` back without its `id`/`name`, prepending `identity` when given.
fn rewrite(root: &RootTag<'_>, identity: Option<(&str, &str)>) -> Result<String, MarkupError> {
    let qname = std::str::from_utf8(root.tag.name().as_ref())
        .map_err(|_| MarkupError::NotUtf8)?
        .to_owned();
    let mut tag = BytesStart::new(qname);
    if let Some((id, name)) = identity {
        tag.push_attribute(("id", id));
        tag.push_attribute(("name", name));
    }
    for attr in root.tag.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" | b"name" => {}
            // Single-quoted values may hold a bare `"`; re-escape them for double quotes.
            _ if attr.value.contains(&b'"') => {
                let key =
                    std::str::from_utf8(attr.key.as_ref()).map_err(|_| MarkupError::NotUtf8)?;
                let value = attr_text(attr.unescape_value(), &attr.value);
                tag.push_attribute((key, value.as_str()));
            }
            _ => tag.push_attribute(attr),
        }
    }

    let mut writer = Writer::new(Vec::new());
    let event = if root.empty {
        Event::Empty(tag)
    } else {
        Event::Start(tag)
    };
    writer.write_event(event)?;
    String::from_utf8(writer.into_inner()).map_err(|_| MarkupError::NotUtf8)
}

fn splice(text: &str, range: Range<usize>, tag: &str) -> String {
    let mut out = String::with_capacity(text.len() + tag.len());
    out.push_str(&text[..range.start]);
    out.push_str(tag);
    out.push_str(&text[range.end..]);
    out
}

/// Lifts `id`/`name` off the root `definitions` element.
pub fn split_identity(text: &str) -> Result<SplitMarkup, MarkupError> {
    let root = root_tag(text)?;

    let mut id = None;
    let mut name = None;
    for attr in root.tag.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" => id = Some(attr_text(attr.unescape_value(), &attr.value)),
            b"name" => name = Some(attr_text(attr.unescape_value(), &attr.value)),
            _ => {}
        }
    }

    let tag = rewrite(&root, None)?;
    Ok(SplitMarkup {
        id,
        name,
        body: splice(text, root.range, &tag),
    })
}

/// Writes `id`/`name` onto the root `definitions` element, replacing existing values.
pub fn inject_identity(text: &str, id: &str, name: &str) -> Result<String, MarkupError> {
    let root = root_tag(text)?;
    let tag = rewrite(&root, Some((id, name)))?;
    Ok(splice(text, root.range, &tag))
}
