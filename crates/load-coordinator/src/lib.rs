//! Loads models into a single display slot.
//!
//! Loads are tagged with a generation number. Only the newest generation may
//! replace what is on screen, a second load of the same content is dropped
//! while the first is in flight, and a failed load leaves the display alone.
//! [`LivePreview`] debounces source edits on top of that.

pub mod coordinator;
pub mod errors;
pub mod events;
pub mod preview;
pub mod request;
pub mod store;
pub mod traits;

pub use coordinator::{Collaborators, Coordinator, CoordinatorConfig, LoadedModel};
pub use errors::{GenerateError, LoadError, StoreError};
pub use events::{CoordinatorEvent, LoadOutcome};
pub use preview::{LivePreview, PreviewConfig};
pub use request::{content_identity, LoadPayload, LoadRequest};
pub use store::FileStore;
pub use traits::{CodeGenerator, DocumentRef, DocumentStore, Renderer, SceneHandle};
