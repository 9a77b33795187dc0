//! In-process admission chain.
//!
//! Admission plugins inspect, mutate or reject API requests after they have
//! been decoded and before they are persisted. This crate provides the
//! typed request attributes handed to plugins, the polymorphic object model,
//! the plugin traits, a registry to build plugins by name, an ordered chain
//! driven by a YAML configuration, and the `admission.k8s.io/v1`
//! AdmissionReview codec.

pub mod admission_request;
pub mod admission_review;
pub mod chain;
pub mod config;
pub mod errors;
mod handler;
mod interfaces;
pub mod object;
mod operation;
pub mod plugins;

pub use admission_request::{AdmissionRequest, GroupVersionKind, GroupVersionResource};
pub use chain::AdmissionChain;
pub use errors::{AdmissionError, FieldError, Result};
pub use handler::Handler;
pub use interfaces::{Interface, MutationInterface, ValidationInterface};
pub use object::{Object, UnstructuredObject};
pub use operation::Operation;
pub use plugins::{Factory, Plugins};
