//! Schema versioning for the JSON report projection.
//!
//! # Version History
//!
//! | Version | Changes |
//! |---------|---------|
//! | 1 | Initial report schema |
//!
//! # Breaking Changes (require SCHEMA_VERSION bump)
//!
//! - Removing or renaming fields
//! - Changing field types
//! - Serializing an absent section as `null` instead of omitting it
//! - Removing enum variants
//!
//! # Non-Breaking Changes (safe without version bump)
//!
//! - Adding new optional sections with `skip_serializing_if`
//! - Adding new enum variants

/// Current report schema version. Bump when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;
