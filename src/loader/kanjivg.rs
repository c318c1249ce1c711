use crate::foundation::error::{DmakError, DmakResult};
use crate::strokes::model::{CharStrokes, OrderLabel, RawStroke};
use std::borrow::Cow;

const KVG_NAMESPACE: &str = "http://kanjivg.tagaini.net";

/// Extract stroke paths, their group nesting and order labels from one KanjiVG document.
///
/// Paths are collected from the `kvg:<code>` group in document order. `<text>` elements are
/// assigned to strokes by position (first text to first stroke, ...); extra texts are ignored.
pub fn parse_kanjivg(xml: &str, code: &str) -> DmakResult<CharStrokes> {
    let xml = declare_kvg_namespace(xml);
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(&xml, opts)
        .map_err(|e| DmakError::load(format!("parse KanjiVG document {code}: {e}")))?;

    let root_id = format!("kvg:{code}");
    let root = doc
        .descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some(root_id.as_str()))
        .ok_or_else(|| DmakError::load(format!("KanjiVG document has no element '{root_id}'")))?;

    let mut strokes = collect_paths(root);

    let texts = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "text");
    for (stroke, text) in strokes.iter_mut().zip(texts) {
        match text_label(text) {
            Some(label) => stroke.text = Some(label),
            None => tracing::warn!(code, "stroke-order text without a usable position"),
        }
    }

    Ok(strokes)
}

/// Walk the subtree under `root` with an explicit stack of child iterators.
///
/// Each stack frame records whether entering it pushed a group id, so leaving it pops exactly
/// that id.
fn collect_paths(root: roxmltree::Node<'_, '_>) -> Vec<RawStroke> {
    let mut out = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    let mut stack = vec![(root.children(), false)];

    loop {
        let Some((children, _)) = stack.last_mut() else {
            break;
        };
        let Some(child) = children.next() else {
            if let Some((_, true)) = stack.pop() {
                groups.pop();
            }
            continue;
        };
        if !child.is_element() {
            continue;
        }

        match child.tag_name().name() {
            "g" => {
                let pushed = match child.attribute("id") {
                    Some(id) => {
                        groups.push(id.to_owned());
                        true
                    }
                    None => false,
                };
                stack.push((child.children(), pushed));
            }
            "path" => {
                if let Some(d) = child.attribute("d") {
                    out.push(RawStroke {
                        path: d.to_owned(),
                        groups: groups.clone(),
                        text: None,
                    });
                }
            }
            _ => {}
        }
    }
    out
}

fn text_label(node: roxmltree::Node<'_, '_>) -> Option<OrderLabel> {
    let value = node.text().unwrap_or_default().trim().to_owned();
    let (x, y) = match node.attribute("transform") {
        Some(t) => matrix_translation(t)?,
        None => (
            node.attribute("x")?.trim().parse().ok()?,
            node.attribute("y")?.trim().parse().ok()?,
        ),
    };
    Some(OrderLabel { value, x, y })
}

/// Translation part `(e, f)` of `matrix(a b c d e f)`.
fn matrix_translation(transform: &str) -> Option<(f64, f64)> {
    let inner = transform
        .trim()
        .strip_prefix("matrix")?
        .trim_start()
        .strip_prefix('(')?;
    let inner = &inner[..inner.find(')')?];
    let nums: Vec<f64> = inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match nums.as_slice() {
        [_, _, _, _, e, f] => Some((*e, *f)),
        _ => None,
    }
}

/// KanjiVG declares `xmlns:kvg` only as a fixed DTD attribute default, which XML parsers that
/// skip attribute defaults never see. Declare it on the root element when missing.
fn declare_kvg_namespace(xml: &str) -> Cow<'_, str> {
    let Some(start) = find_svg_start_tag(xml) else {
        return Cow::Borrowed(xml);
    };
    let tag_end = xml[start..].find('>').map_or(xml.len(), |i| start + i);
    if xml[start..tag_end].contains("xmlns:kvg") || !xml.contains("kvg:") {
        return Cow::Borrowed(xml);
    }
    let insert_at = start + "<svg".len();
    let mut out = String::with_capacity(xml.len() + KVG_NAMESPACE.len() + 16);
    out.push_str(&xml[..insert_at]);
    out.push_str(&format!(" xmlns:kvg=\"{KVG_NAMESPACE}\""));
    out.push_str(&xml[insert_at..]);
    Cow::Owned(out)
}

fn find_svg_start_tag(xml: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(i) = xml[from..].find("<svg") {
        let at = from + i;
        match xml[at + 4..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' => return Some(at),
            _ => from = at + 4,
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/loader/kanjivg.rs"]
mod tests;
