//! Observers of a content-stream walk.

use super::operator::Operator;
use super::walker::Scope;
use crate::error::Result;
use crate::model::objects::PDFObject;
use tracing::info;

/// Something that wants to hear about operators as a page is replayed.
///
/// Every receiver passed to a walk sees every operator it `supports`, in
/// content order, with the operands exactly as they were written.
pub trait Receiver {
    fn supports(&self, _op: Operator) -> bool {
        true
    }

    fn handle(&mut self, scope: &Scope<'_>, op: Operator, operands: &[PDFObject]) -> Result<()>;
}

/// One recorded callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    pub op: Operator,
    pub args: Vec<PDFObject>,
}

/// Records every callback, for tests and inspection.
#[derive(Debug, Default, Clone)]
pub struct RegisterReceiver {
    pub callbacks: Vec<Callback>,
}

impl RegisterReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `op` fired.
    pub fn count(&self, op: Operator) -> usize {
        self.callbacks.iter().filter(|cb| cb.op == op).count()
    }

    pub fn all(&self, op: Operator) -> Vec<&Callback> {
        self.callbacks.iter().filter(|cb| cb.op == op).collect()
    }

    pub fn all_args(&self, op: Operator) -> Vec<&[PDFObject]> {
        self.all(op).into_iter().map(|cb| cb.args.as_slice()).collect()
    }

    pub fn first_occurrence_of(&self, op: Operator) -> Option<&Callback> {
        self.callbacks.iter().find(|cb| cb.op == op)
    }

    pub fn final_occurrence_of(&self, op: Operator) -> Option<&Callback> {
        self.callbacks.iter().rev().find(|cb| cb.op == op)
    }

    /// The first place where `ops` fired back to back, in that order.
    pub fn series(&self, ops: &[Operator]) -> Option<&[Callback]> {
        if ops.is_empty() {
            return None;
        }
        self.callbacks
            .windows(ops.len())
            .find(|window| window.iter().zip(ops).all(|(cb, op)| cb.op == *op))
    }
}

impl Receiver for RegisterReceiver {
    fn handle(&mut self, _scope: &Scope<'_>, op: Operator, operands: &[PDFObject]) -> Result<()> {
        self.callbacks.push(Callback {
            op,
            args: operands.to_vec(),
        });
        Ok(())
    }
}

/// Logs every operator and its operands at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintReceiver;

impl Receiver for PrintReceiver {
    fn handle(&mut self, _scope: &Scope<'_>, op: Operator, operands: &[PDFObject]) -> Result<()> {
        info!("{op} => {operands:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(ops: &[Operator]) -> RegisterReceiver {
        RegisterReceiver {
            callbacks: ops
                .iter()
                .enumerate()
                .map(|(i, op)| Callback {
                    op: *op,
                    args: vec![PDFObject::Int(i as i64)],
                })
                .collect(),
        }
    }

    #[test]
    fn occurrences_and_counts() {
        use Operator::*;
        let reg = register(&[BeginTextObject, ShowText, ShowText, EndTextObject]);
        assert_eq!(reg.count(ShowText), 2);
        assert_eq!(reg.first_occurrence_of(ShowText).unwrap().args, vec![PDFObject::Int(1)]);
        assert_eq!(reg.final_occurrence_of(ShowText).unwrap().args, vec![PDFObject::Int(2)]);
        assert_eq!(reg.all_args(EndTextObject), vec![&[PDFObject::Int(3)][..]]);
        assert!(reg.first_occurrence_of(InvokeXObject).is_none());
    }

    #[test]
    fn series_needs_adjacent_callbacks() {
        use Operator::*;
        let reg = register(&[BeginTextObject, SetTextFontAndSize, ShowText, EndTextObject]);
        let found = reg.series(&[SetTextFontAndSize, ShowText]).unwrap();
        assert_eq!(found[0].args, vec![PDFObject::Int(1)]);
        assert!(reg.series(&[BeginTextObject, ShowText]).is_none());
        assert!(reg.series(&[]).is_none());
    }
}
