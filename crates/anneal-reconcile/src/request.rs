//! Reconciliation request

use anneal_types::Release;

/// One reconciliation request for a declared object
///
/// Created by the wrapping controller per enqueued object, lives for a
/// single driver invocation, and is mutated only by the driver and the
/// action adapters it invokes sequentially.
#[derive(Debug)]
pub struct Request {
    /// The declared object being reconciled
    pub object: Release,
}

impl Request {
    pub fn new(object: Release) -> Self {
        Self { object }
    }
}
