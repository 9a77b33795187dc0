use crate::{admission_request::AdmissionRequest, errors::Result, operation::Operation};

/// An admission plugin.
///
/// Plugins declare the operations they care about through `handles`; the
/// chain never invokes them for any other operation.
pub trait Interface: Send + Sync {
    fn handles(&self, operation: Operation) -> bool;

    /// The mutating side of the plugin, if it has one.
    fn as_mutation(&self) -> Option<&dyn MutationInterface> {
        None
    }

    /// The validating side of the plugin, if it has one.
    fn as_validation(&self) -> Option<&dyn ValidationInterface> {
        None
    }
}

/// Plugins that may change the object of the request.
pub trait MutationInterface: Interface {
    fn admit(&self, request: &mut AdmissionRequest) -> Result<()>;
}

/// Plugins that accept or reject a request without changing it.
pub trait ValidationInterface: Interface {
    fn validate(&self, request: &AdmissionRequest) -> Result<()>;
}
