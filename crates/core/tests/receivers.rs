//! Walking page content with receivers.

mod common;

use common::{HELVETICA, Pdf, stream, text_document};
use quire_core::interp::{Operator, Scope};
use quire_core::{
    Document, PDFObject, PageTextReceiver, PrintReceiver, Receiver, RegisterReceiver, Result,
};

const CONTENT: &str = "q 1 0 0 1 10 10 cm BT /F1 12 Tf 72 700 Td (Hi) Tj [(a) -250 (b)] TJ ET Q";

fn document(content: &str) -> Document {
    Document::open(text_document(HELVETICA, &[content]).classic("/Root 1 0 R"), "").unwrap()
}

#[test]
fn register_sees_every_operator_in_order() {
    let doc = document(CONTENT);
    let mut reg = RegisterReceiver::new();
    doc.page(1).unwrap().walk(&mut [&mut reg]).unwrap();

    let begin = reg.first_occurrence_of(Operator::BeginPage).unwrap();
    assert_eq!(begin.args[0], PDFObject::Int(1));
    assert_eq!(begin.args[2], PDFObject::Int(0));
    assert_eq!(reg.callbacks.last().unwrap().op, Operator::EndPage);

    assert_eq!(reg.count(Operator::ShowText), 1);
    assert_eq!(reg.count(Operator::ShowTextWithPositioning), 1);
    let font = reg
        .series(&[Operator::SetTextFontAndSize, Operator::MoveTextPosition, Operator::ShowText])
        .unwrap();
    assert_eq!(font[0].args, [PDFObject::name("F1"), PDFObject::Int(12)]);
    assert_eq!(font[2].args, [PDFObject::String(b"Hi".to_vec())]);
    assert!(reg.series(&[Operator::BeginTextObject, Operator::ShowText]).is_none());
}

/// Collects the strings shown on a page, ignoring everything else.
#[derive(Default)]
struct Shown(Vec<Vec<u8>>);

impl Receiver for Shown {
    fn supports(&self, op: Operator) -> bool {
        matches!(op, Operator::ShowText | Operator::ShowTextWithPositioning)
    }

    fn handle(&mut self, _scope: &Scope<'_>, _op: Operator, operands: &[PDFObject]) -> Result<()> {
        for operand in operands {
            match operand {
                PDFObject::String(s) => self.0.push(s.clone()),
                PDFObject::Array(items) => self
                    .0
                    .extend(items.iter().filter_map(|i| i.as_string().ok()).map(<[u8]>::to_vec)),
                _ => {}
            }
        }
        Ok(())
    }
}

#[test]
fn several_receivers_share_one_walk() {
    let doc = document(CONTENT);
    let page = doc.page(1).unwrap();
    let mut shown = Shown::default();
    let mut text = PageTextReceiver::new();
    let mut printer = PrintReceiver;
    page.walk(&mut [&mut shown, &mut text, &mut printer]).unwrap();

    assert_eq!(shown.0, [b"Hi".to_vec(), b"a".to_vec(), b"b".to_vec()]);
    let origins: Vec<(f64, f64)> = text.runs().iter().map(|r| (r.x, r.y)).collect();
    assert_eq!(origins[0], (82.0, 710.0));
    assert_eq!(text.runs().len(), 4);
}

#[test]
fn forms_are_entered_with_their_resources() {
    let mut pdf = Pdf::new();
    pdf.add("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add("<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 612 792] >>");
    pdf.add("<< /Type /Page /Parent 2 0 R /Resources << /XObject << /Fm1 5 0 R >> >> /Contents 4 0 R >>");
    pdf.add(stream("", b"q 1 0 0 1 100 0 cm /Fm1 Do Q"));
    pdf.add(stream(
        "/Type /XObject /Subtype /Form /BBox [0 0 612 792] /Resources << /Font << /F9 6 0 R >> >>",
        b"BT /F9 10 Tf 0 500 Td (Inside) Tj ET",
    ));
    pdf.add(HELVETICA);
    let doc = Document::open(pdf.classic("/Root 1 0 R"), "").unwrap();
    let page = doc.page(1).unwrap();

    let mut reg = RegisterReceiver::new();
    page.walk(&mut [&mut reg]).unwrap();
    let begin = reg.first_occurrence_of(Operator::BeginFormXObject).unwrap();
    assert_eq!(begin.args[0], PDFObject::name("Fm1"));
    assert_eq!(reg.count(Operator::EndFormXObject), 1);

    let runs = page.runs(Default::default()).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].text.as_str(), runs[0].x, runs[0].y), ("Inside", 100.0, 500.0));
    assert_eq!(page.text(None).unwrap(), "Inside");
}
