/*!
 * Project sessions.
 *
 * This module provides:
 * - The active project session binding the engine to a document
 * - The interaction surface the session reports to
 * - The registry of known projects
 */

pub mod project;
pub mod registry;
pub mod surface;

// Re-export main types
pub use project::Project;
pub use registry::{ProjectRecord, ProjectRegistry};
pub use surface::{Choice, InteractionSurface, NullSurface};
