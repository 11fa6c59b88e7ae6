//! Typed configuration model for tag-manager objects.
//!
//! - **Parameter tree**: recursive scalar/list/map values with structural
//!   equality and conversion to and from the flat wire representation
//! - **Conditions**: typed predicates over parameter lists, used by trigger
//!   filters
//! - **Managed objects**: tags, triggers and variables, compared by content
//!   while ignoring the remote-assigned id
//! - **Resource groups**: name-keyed collections of one object kind
//!
//! # Example
//!
//! ```ignore
//! use tagsync_model::{ManagedObject, ParameterNode, Tag};
//!
//! let tag = Tag::new("GA4 Config", "gaawc")
//!     .with_parameter(ParameterNode::scalar("template", "G-XXXX").with_key("measurementId"));
//! let wire = tag.to_wire();
//! assert!(Tag::from_wire(wire).content_eq(&tag));
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod condition;
pub mod group;
pub mod kind;
pub mod object;
pub mod parameter;
pub mod schema;
pub mod wire;

pub use condition::{ConditionNode, conditions_eq, conditions_from_wire, conditions_to_wire};
pub use group::ResourceGroup;
pub use kind::ObjectKind;
pub use object::{ManagedObject, Tag, Trigger, Variable};
pub use parameter::{
    LIST_KIND, MAP_KIND, ParameterBody, ParameterNode, parameters_eq, parameters_from_wire,
    parameters_to_wire,
};
pub use schema::{MAX_PARAMETER_DEPTH, ParameterSchema};
pub use wire::{
    WireCondition, WireObject, WireParameter, WireTag, WireTrigger, WireVariable, WireWorkspace,
};
