//! Page tree helpers
//!
//! MediaBox and Resources are inheritable page attributes, so both are looked
//! up through the `/Parent` chain when the page itself does not carry them.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{ScanError, ScanResult};
use crate::geometry::PageSize;

/// US Letter, used when no MediaBox can be found
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guards against cyclic `/Parent` links
const MAX_TREE_DEPTH: usize = 64;

/// Effective page box in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageBox {
    pub fn size(&self) -> PageSize {
        PageSize::new((self.x1 - self.x0).abs(), (self.y1 - self.y0).abs())
    }

    /// Lower-left corner (device space origin)
    pub fn origin(&self) -> (f64, f64) {
        (self.x0.min(self.x1), self.y0.min(self.y1))
    }
}

/// Page object ids in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(*v as f64),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Find an attribute on the page or the nearest ancestor that defines it
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

/// Effective MediaBox of a page
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let coords = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| resolve(doc, item).and_then(number))
                .collect::<Vec<_>>()
        })
        .filter(|values| values.len() == 4);

    let [x0, y0, x1, y1] = match coords {
        Some(values) => [values[0], values[1], values[2], values[3]],
        None => {
            tracing::warn!(?page_id, "Page has no usable MediaBox, assuming US Letter");
            DEFAULT_MEDIA_BOX
        }
    };

    PageBox { x0, y0, x1, y1 }
}

/// Where a page's resource dictionary lives
enum ResourcesLocation {
    Inline,
    Indirect(ObjectId),
}

/// Make sure the page owns a resource dictionary and report where it is
///
/// Inherited resources are copied onto the page so additions do not leak to
/// sibling pages.
fn own_resources(doc: &mut Document, page_id: ObjectId) -> ScanResult<ResourcesLocation> {
    let page = doc.get_object(page_id)?.as_dict()?;
    match page.get(b"Resources") {
        Ok(Object::Reference(id)) => return Ok(ResourcesLocation::Indirect(*id)),
        Ok(Object::Dictionary(_)) => return Ok(ResourcesLocation::Inline),
        _ => {}
    }

    let copied = inherited(doc, page_id, b"Resources")
        .and_then(|obj| obj.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(copied));
    Ok(ResourcesLocation::Inline)
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> ScanResult<&mut Dictionary> {
    Ok(doc.get_object_mut(page_id)?.as_dict_mut()?)
}

fn resources_mut<'a>(
    doc: &'a mut Document,
    page_id: ObjectId,
    location: &ResourcesLocation,
) -> ScanResult<&'a mut Dictionary> {
    match location {
        ResourcesLocation::Inline => Ok(page_dict_mut(doc, page_id)?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
        ResourcesLocation::Indirect(id) => Ok(doc.get_object_mut(*id)?.as_dict_mut()?),
    }
}

/// Register an XObject in the page resources under a fresh name
///
/// Returns the name the content stream must use to paint it.
pub fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    prefix: &str,
    xobject_id: ObjectId,
) -> ScanResult<String> {
    let location = own_resources(doc, page_id)?;

    let xobjects_ref = match resources_mut(doc, page_id, &location)?.get(b"XObject") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let xobjects = match xobjects_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => {
            let resources = resources_mut(doc, page_id, &location)?;
            if !matches!(resources.get(b"XObject"), Ok(Object::Dictionary(_))) {
                resources.set("XObject", Object::Dictionary(Dictionary::new()));
            }
            resources.get_mut(b"XObject")?.as_dict_mut()?
        }
    };

    let name = (0..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .ok_or_else(|| ScanError::Encode("No free XObject name".to_string()))?;
    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));

    Ok(name)
}

/// Append drawing operators after the existing page content
///
/// The existing content is wrapped in `q ... Q` so graphics state it leaves
/// behind does not affect the appended operators.
pub fn append_page_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> ScanResult<()> {
    let existing: Vec<Object> = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open));
        contents.extend(existing);
    }

    let mut tail = Vec::with_capacity(content.len() + 2);
    if !contents.is_empty() {
        tail.extend_from_slice(b"Q\n");
    }
    tail.extend_from_slice(&content);
    let tail_id = doc.add_object(Stream::new(Dictionary::new(), tail));
    contents.push(Object::Reference(tail_id));

    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}
