//! Blendwrap Shared Schema
//!
//! Types shared by the two roles of the `blendwrap` binary: the launcher,
//! which runs as a build action and spawns Blender, and the callback, which
//! Blender's interpreter re-enters to drive the export.
//!
//! # Example
//!
//! ```
//! use blendwrap_spec::{ExportArguments, InvocationRequest, OutputDeclaration, ReservedKeys};
//! use blendwrap_spec::TransferArtifact;
//!
//! let request = InvocationRequest::new(
//!     "/usr/bin/blender",
//!     "export_callback.py",
//!     "scene.blend",
//!     vec![OutputDeclaration::new("gltf", "out/scene.gltf")],
//!     ExportArguments::parse_json(r#"{"export_materials": "EXPORT"}"#).unwrap(),
//!     &ReservedKeys::default(),
//! )
//! .unwrap();
//!
//! let artifact = TransferArtifact::from_request(&request);
//! assert_eq!(artifact.outputs.len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`arguments`]: the opaque export-argument mapping
//! - [`artifact`]: the `{outputs, arguments}` transfer artifact
//! - [`bridge`]: environment variables carrying the payload to the child
//! - [`format`]: output keys and the export formats they select
//! - [`request`]: the validated invocation request
//! - [`reserved`]: the reserved export-argument denylist
//! - [`error`]: error types

pub mod arguments;
pub mod artifact;
pub mod bridge;
pub mod error;
pub mod format;
pub mod request;
pub mod reserved;

pub use arguments::ExportArguments;
pub use artifact::{TransferArtifact, ARTIFACT_FILE_NAME};
pub use bridge::{BridgePayload, ARGS_FILE_VAR, SENTINEL_VAR, WRAPPER_EXE_VAR};
pub use error::{CodedError, SpecError, SpecResult};
pub use format::{ExportFormat, OutputRole, PASSTHROUGH_KEYS};
pub use request::{InvocationRequest, OutputDeclaration};
pub use reserved::{ReservedKeys, DEFAULT_RESERVED_KEYS};
