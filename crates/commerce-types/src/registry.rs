//! Registry trait for self-registering backend implementations.
//!
//! Every pluggable backend (currently the storage backends) declares the
//! name it is referenced by in configuration files together with a factory
//! function that builds it from its configuration table.

/// Base trait for implementation registries.
///
/// Each backend module provides a `Registry` struct implementing this
/// trait, tying the configuration name to the factory that constructs
/// the backend.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this
	/// implementation, e.g. "memory" for `storage.backend = "memory"`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
