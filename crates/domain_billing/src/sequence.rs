//! Invoice number allocation
//!
//! Invoice numbers form one global sequence: the next candidate is the
//! highest persisted number plus one. Within a run, a candidate handed to a
//! shell that is later discarded is not handed out again, so numbers issued
//! by one sequence strictly increase even when the store did not grow.
//!
//! Allocation is read-then-increment against the store and is only sound
//! with a single writer.

use core_kernel::{InvoiceNumber, PortError};

use crate::ports::{sequence_exhausted, InvoicePort};

/// Hands out invoice number candidates for one billing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSequence {
    /// `None` once the last representable number was handed out
    next: Option<InvoiceNumber>,
}

impl Default for InvoiceSequence {
    fn default() -> Self {
        Self::starting_at(InvoiceNumber::FIRST)
    }
}

impl InvoiceSequence {
    pub fn starting_at(next: InvoiceNumber) -> Self {
        Self { next: Some(next) }
    }

    /// Allocates the next candidate
    ///
    /// `persisted_next` is the store's current `max + 1`; the candidate is
    /// never lower than it nor lower than anything this sequence already
    /// handed out.
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` once every `u32` number has been handed out.
    pub fn allocate(&mut self, persisted_next: InvoiceNumber) -> Result<InvoiceNumber, PortError> {
        let floor = self.next.ok_or_else(|| sequence_exhausted(InvoiceNumber::new(u32::MAX)))?;
        let number = floor.max(persisted_next);
        self.next = number.next();
        Ok(number)
    }

    /// Re-reads the store and allocates the next candidate
    pub fn allocate_from<S: InvoicePort + ?Sized>(&mut self, store: &S) -> Result<InvoiceNumber, PortError> {
        self.allocate(store.next_invoice_number()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_first() {
        let mut sequence = InvoiceSequence::default();
        assert_eq!(sequence.allocate(InvoiceNumber::FIRST).unwrap(), InvoiceNumber::new(1));
        assert_eq!(sequence.allocate(InvoiceNumber::FIRST).unwrap(), InvoiceNumber::new(2));
    }

    #[test]
    fn test_discarded_candidates_are_not_reused() {
        let mut sequence = InvoiceSequence::starting_at(InvoiceNumber::new(5));

        // store still reports 5 as next because nothing was persisted
        let first = sequence.allocate(InvoiceNumber::new(5)).unwrap();
        let second = sequence.allocate(InvoiceNumber::new(5)).unwrap();
        assert_eq!(first, InvoiceNumber::new(5));
        assert_eq!(second, InvoiceNumber::new(6));
    }

    #[test]
    fn test_follows_store_growth() {
        let mut sequence = InvoiceSequence::default();
        sequence.allocate(InvoiceNumber::FIRST).unwrap();

        let number = sequence.allocate(InvoiceNumber::new(10)).unwrap();
        assert_eq!(number, InvoiceNumber::new(10));
        assert_eq!(sequence.allocate(InvoiceNumber::new(10)).unwrap(), InvoiceNumber::new(11));
    }

    #[test]
    fn test_last_number_is_handed_out_once() {
        let mut sequence = InvoiceSequence::starting_at(InvoiceNumber::new(u32::MAX));

        assert_eq!(sequence.allocate(InvoiceNumber::FIRST).unwrap(), InvoiceNumber::new(u32::MAX));
        let err = sequence.allocate(InvoiceNumber::FIRST).unwrap_err();
        assert!(err.is_conflict());
    }
}
