//! Named provider factories.

// std
use std::sync::LazyLock;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::{Provider, builtin},
};

/// Flat configuration handed to a factory when a provider is built.
pub type ProviderConfig = BTreeMap<String, String>;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// Builds configured [`Provider`] instances for one provider family.
///
/// Factories run synchronously and perform no I/O. Closures with the matching signature
/// implement this trait.
pub trait ProviderFactory
where
	Self: Send + Sync,
{
	/// Validates `config` and builds a provider named `name`.
	fn build(&self, name: &str, config: &ProviderConfig) -> Result<Provider, ConfigError>;
}
impl<F> ProviderFactory for F
where
	F: Send + Sync + Fn(&str, &ProviderConfig) -> Result<Provider, ConfigError>,
{
	fn build(&self, name: &str, config: &ProviderConfig) -> Result<Provider, ConfigError> {
		self(name, config)
	}
}

/// Mapping from provider type name to factory.
///
/// Registration needs `&mut self`; lookups through `&Registry` are safe from any number of
/// threads.
#[derive(Clone, Default)]
pub struct Registry {
	factories: HashMap<String, Arc<dyn ProviderFactory>>,
}
impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding every built-in provider family.
	pub fn builtin() -> Self {
		let mut registry = Self::new();

		for (name, factory) in builtin::factories() {
			registry.factories.insert(name.to_owned(), factory);
		}

		registry
	}

	/// Process-wide registry of built-in providers, built on first use.
	pub fn global() -> &'static Registry {
		&GLOBAL
	}

	/// Registers `factory` under `name`.
	///
	/// Fails with [`Error::DuplicateProvider`] if the name is taken; the existing registration is
	/// left untouched.
	pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
	where
		F: 'static + ProviderFactory,
	{
		let name = name.into();

		if self.factories.contains_key(&name) {
			return Err(Error::DuplicateProvider { name });
		}

		self.factories.insert(name, Arc::new(factory));

		Ok(())
	}

	/// Builds a provider of type `name` from `config`.
	pub fn new_provider(&self, name: &str, config: &ProviderConfig) -> Result<Provider> {
		let factory = self
			.factories
			.get(name)
			.ok_or_else(|| Error::UnknownProvider { name: name.to_owned() })?;

		Ok(factory.build(name, config)?)
	}

	/// Returns true if a factory is registered under `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names = self.factories.keys().map(String::as_str).collect::<Vec<_>>();

		names.sort_unstable();

		names
	}
}
impl Debug for Registry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Registry").field("providers", &self.names()).finish()
	}
}
