//! Replays content streams to receivers, descending into form XObjects.

use super::content::{Instruction, parse_content};
use super::operator::Operator;
use super::receiver::Receiver;
use crate::document::tolerance::MAX_FORM_DEPTH;
use crate::document::xref::ObjectTable;
use crate::error::{PdfError, Result};
use crate::font::{Font, FontCache};
use crate::model::geometry::{MATRIX_IDENTITY, matrix_from_object};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Parsed content streams shared by every page of a document, keyed by
/// the MD5 of the decoded content.
#[derive(Debug, Default)]
pub struct ContentCache {
    parsed: Mutex<FxHashMap<[u8; 16], Arc<Vec<Instruction>>>>,
}

impl ContentCache {
    pub fn instructions(&self, data: &[u8]) -> Result<Arc<Vec<Instruction>>> {
        let key = md5::compute(data).0;
        if let Some(found) = self.lock().get(&key) {
            return Ok(Arc::clone(found));
        }
        let parsed = Arc::new(parse_content(data)?);
        self.lock().insert(key, Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<[u8; 16], Arc<Vec<Instruction>>>> {
        self.parsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What a receiver can look up while handling an operator: the object
/// table and the resources of the page or form being replayed.
pub struct Scope<'a> {
    objects: &'a ObjectTable,
    fonts: &'a FontCache,
    resources: PDFDict,
    depth: usize,
}

impl<'a> Scope<'a> {
    pub fn new(objects: &'a ObjectTable, fonts: &'a FontCache, resources: PDFDict) -> Self {
        Self {
            objects,
            fonts,
            resources,
            depth: 0,
        }
    }

    fn nested(&self, resources: PDFDict) -> Self {
        Self {
            resources,
            depth: self.depth + 1,
            ..*self
        }
    }

    pub const fn objects(&self) -> &'a ObjectTable {
        self.objects
    }

    pub const fn resources(&self) -> &PDFDict {
        &self.resources
    }

    /// 0 for page content, 1 inside a form drawn by the page, and so on.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// A resource category such as `/Font`, empty when absent.
    pub fn category(&self, name: &str) -> Result<PDFDict> {
        match self.resources.get(name) {
            Some(value) => self.objects.resolve_dict(value),
            None => Ok(PDFDict::new()),
        }
    }

    /// The font a `Tf` operand names, if the resources have it.
    pub fn font(&self, label: &str) -> Result<Option<Arc<Font>>> {
        match self.category("Font")?.get(label) {
            Some(entry) => self.fonts.load(self.objects, entry).map(Some),
            None => Ok(None),
        }
    }

    /// The XObject a `Do` operand names, with its reference when indirect.
    pub fn xobject(&self, label: &str) -> Result<Option<(Option<PDFObjRef>, PDFStream)>> {
        let Some(entry) = self.category("XObject")?.get(label).cloned() else {
            return Ok(None);
        };
        let r = entry.as_ref().ok().copied();
        match self.objects.resolve(&entry)? {
            PDFObject::Stream(stream) => Ok(Some((r, *stream))),
            PDFObject::Null => Ok(None),
            other => Err(PdfError::malformed(format!(
                "XObject /{label} is a {}, not a stream",
                other.type_name()
            ))),
        }
    }
}

/// Drives receivers through page and form content.
pub struct Walker<'a> {
    objects: &'a ObjectTable,
    fonts: &'a FontCache,
    contents: &'a ContentCache,
}

impl<'a> Walker<'a> {
    pub const fn new(objects: &'a ObjectTable, fonts: &'a FontCache, contents: &'a ContentCache) -> Self {
        Self {
            objects,
            fonts,
            contents,
        }
    }

    /// Replays a page: `BeginPage` with `page_info`, the content, `EndPage`.
    pub fn walk_page(
        &self,
        content: &[u8],
        resources: PDFDict,
        page_info: &[PDFObject],
        receivers: &mut [&mut dyn Receiver],
    ) -> Result<()> {
        let scope = Scope::new(self.objects, self.fonts, resources);
        dispatch(receivers, &scope, Operator::BeginPage, page_info)?;
        let instructions = self.contents.instructions(content)?;
        let mut visited = FxHashSet::default();
        self.replay(&instructions, &scope, &mut visited, receivers)?;
        dispatch(receivers, &scope, Operator::EndPage, &[])
    }

    fn replay(
        &self,
        instructions: &[Instruction],
        scope: &Scope<'_>,
        visited: &mut FxHashSet<PDFObjRef>,
        receivers: &mut [&mut dyn Receiver],
    ) -> Result<()> {
        for ins in instructions {
            dispatch(receivers, scope, ins.op, &ins.operands)?;
            if ins.op == Operator::InvokeXObject {
                match ins.operands.first() {
                    Some(PDFObject::Name(label)) => self.form(label, scope, visited, receivers)?,
                    other => debug!(?other, "Do without a name operand"),
                }
            }
        }
        Ok(())
    }

    /// Replays a form XObject inside `BeginFormXObject`/`EndFormXObject`.
    /// Images and other XObject types are left to the receivers.
    fn form(
        &self,
        label: &str,
        scope: &Scope<'_>,
        visited: &mut FxHashSet<PDFObjRef>,
        receivers: &mut [&mut dyn Receiver],
    ) -> Result<()> {
        let (r, stream) = scope
            .xobject(label)?
            .ok_or_else(|| PdfError::malformed(format!("XObject /{label} is not in the resources")))?;
        if stream.get("Subtype").and_then(|s| s.as_name().ok()) != Some("Form") {
            return Ok(());
        }
        if scope.depth() >= MAX_FORM_DEPTH {
            warn!(label, depth = scope.depth(), "form XObjects nested too deeply, skipping");
            return Ok(());
        }
        if let Some(r) = r {
            if !visited.insert(r) {
                warn!(label, %r, "form XObject draws itself, skipping");
                return Ok(());
            }
        }

        let result = self.replay_form(label, &stream, scope, visited, receivers);
        if let Some(r) = r {
            visited.remove(&r);
        }
        result
    }

    fn replay_form(
        &self,
        label: &str,
        stream: &PDFStream,
        scope: &Scope<'_>,
        visited: &mut FxHashSet<PDFObjRef>,
        receivers: &mut [&mut dyn Receiver],
    ) -> Result<()> {
        let resources = match stream.get("Resources") {
            Some(value) => self.objects.resolve_dict(value)?,
            None => scope.resources().clone(),
        };
        let matrix = match stream.get("Matrix") {
            Some(value) => matrix_from_object(&self.objects.dereference_recursive(value)?),
            None => None,
        }
        .unwrap_or(MATRIX_IDENTITY);
        let (a, b, c, d, e, f) = matrix;
        let event = [
            PDFObject::name(label),
            PDFObject::Array([a, b, c, d, e, f].into_iter().map(PDFObject::Real).collect()),
        ];

        let inner = scope.nested(resources);
        dispatch(receivers, &inner, Operator::BeginFormXObject, &event)?;
        let instructions = self.contents.instructions(stream.data()?)?;
        self.replay(&instructions, &inner, visited, receivers)?;
        dispatch(receivers, &inner, Operator::EndFormXObject, &event)
    }
}

fn dispatch(
    receivers: &mut [&mut dyn Receiver],
    scope: &Scope<'_>,
    op: Operator,
    operands: &[PDFObject],
) -> Result<()> {
    for receiver in receivers.iter_mut() {
        if receiver.supports(op) {
            receiver.handle(scope, op, operands)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testutil::{stream, table};
    use crate::interp::receiver::RegisterReceiver;

    fn walk(objects: &ObjectTable, content: &str, resources_id: u32) -> Result<RegisterReceiver> {
        let fonts = FontCache::default();
        let contents = ContentCache::default();
        let resources = objects.resolve_dict(&PDFObject::Ref(PDFObjRef::new(resources_id, 0)))?;
        let mut reg = RegisterReceiver::new();
        Walker::new(objects, &fonts, &contents).walk_page(
            content.as_bytes(),
            resources,
            &[PDFObject::Int(1)],
            &mut [&mut reg],
        )?;
        Ok(reg)
    }

    #[test]
    fn forms_are_replayed_between_events() {
        let form = stream("/Type /XObject /Subtype /Form /Matrix [1 0 0 1 5 5]", "BT (in form) Tj ET");
        let objects = table(&["<< /Type /Catalog >>", &form, "<< /XObject << /Fm1 2 0 R >> >>"]);
        let reg = walk(&objects, "q /Fm1 Do Q", 3).unwrap();
        let names: Vec<_> = reg.callbacks.iter().map(|cb| cb.op.name()).collect();
        assert_eq!(
            names,
            [
                "begin_page",
                "save_graphics_state",
                "invoke_xobject",
                "begin_form_xobject",
                "begin_text_object",
                "show_text",
                "end_text_object",
                "end_form_xobject",
                "restore_graphics_state",
                "end_page"
            ]
        );
        let begin = reg.first_occurrence_of(Operator::BeginFormXObject).unwrap();
        assert_eq!(begin.args[0], PDFObject::name("Fm1"));
        assert_eq!(begin.args[1].as_array().unwrap()[4], PDFObject::Real(5.0));
    }

    #[test]
    fn self_drawing_form_stops() {
        let form = stream("/Subtype /Form /Resources 3 0 R", "/Fm1 Do (x) Tj");
        let objects = table(&["<< /Type /Catalog >>", &form, "<< /XObject << /Fm1 2 0 R >> >>"]);
        let reg = walk(&objects, "/Fm1 Do", 3).unwrap();
        assert_eq!(reg.count(Operator::BeginFormXObject), 1);
        assert_eq!(reg.count(Operator::InvokeXObject), 2);
        assert_eq!(reg.count(Operator::ShowText), 1);
    }

    #[test]
    fn missing_xobject_is_malformed() {
        let objects = table(&["<< /Type /Catalog >>", "<< >>"]);
        assert!(walk(&objects, "/Nope Do", 2).unwrap_err().is_malformed());
    }

    #[test]
    fn images_are_not_descended_into() {
        let image = stream("/Subtype /Image /Width 1 /Height 1", "x");
        let objects = table(&["<< /Type /Catalog >>", &image, "<< /XObject << /Im1 2 0 R >> >>"]);
        let reg = walk(&objects, "/Im1 Do", 3).unwrap();
        assert_eq!(reg.count(Operator::InvokeXObject), 1);
        assert_eq!(reg.count(Operator::BeginFormXObject), 0);
    }

    #[test]
    fn identical_content_is_parsed_once() {
        let cache = ContentCache::default();
        let first = cache.instructions(b"BT ET").unwrap();
        let second = cache.instructions(b"BT ET").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
