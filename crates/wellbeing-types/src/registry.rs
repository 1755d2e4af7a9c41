//! Registry trait for self-registering backend implementations.

/// Ties an implementation to the name it is configured under.
///
/// Each backend module provides a `Registry` struct implementing this trait,
/// e.g. `"http"` for `[backend.implementations.http]`.
pub trait ImplementationRegistry {
	/// Name used in configuration files to reference this implementation.
	const NAME: &'static str;

	/// Factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds the implementation from its config.
	fn factory() -> Self::Factory;
}
