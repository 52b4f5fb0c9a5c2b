use std::{cell::RefCell, rc::Rc};

use crate::tracker::HandRecord;

use super::{HandSink, SinkError};

/// Keeps every emitted hand in memory.
///
/// The storage is shared, so the caller can hold on to it after handing the
/// sink to a session.
#[derive(Default)]
pub struct VecSink {
    storage: Rc<RefCell<Vec<HandRecord>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_storage(storage: Rc<RefCell<Vec<HandRecord>>>) -> Self {
        Self { storage }
    }

    pub fn get_storage(&self) -> Rc<RefCell<Vec<HandRecord>>> {
        self.storage.clone()
    }
}

impl HandSink for VecSink {
    fn record(&mut self, hand: &HandRecord) -> Result<(), SinkError> {
        self.storage.try_borrow_mut()?.push(hand.clone());
        Ok(())
    }
}
