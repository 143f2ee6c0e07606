//! Models Repository Resolver
//!
//! Resolves a Digital Twin Model Identifier (DTMI) to its JSON model
//! definition and the transitive closure of its dependencies against a
//! model repository: a structured file tree, addressable on a local
//! filesystem or over HTTP, where each model's storage path is computed
//! deterministically from its identifier.
//!
//! ## Addressing convention
//!
//! ```text
//! dtmi:com:example:Thermostat;1
//!   -> <base>/dtmi/com/example/thermostat-1.json
//!   -> <base>/dtmi/com/example/thermostat-1.expanded.json  (precomputed closure)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use models_repository::{DependencyResolution, RepositoryClient, RepositoryLocation};
//!
//! let client = RepositoryClient::new(
//!     RepositoryLocation::parse("https://devicemodels.azure.com"),
//!     DependencyResolution::Enabled,
//! );
//! let models = client.resolve(&["dtmi:com:example:TemperatureController;1"])?;
//! for (dtmi, _definition) in &models {
//!     println!("resolved {dtmi}");
//! }
//! # Ok::<(), models_repository::ResolverError>(())
//! ```
//!
//! DTDL grammar validation is out of scope: an external parser is expected
//! to be injected by the caller, reaching back into the resolver through
//! [`RepositoryClient::parser_dtmi_resolver`].

pub mod config;
pub mod convention;
pub mod dtmi;
pub mod error;
pub mod fetch;
pub mod index;
pub mod metadata;
pub mod resolver;
pub mod validation;

pub use config::RepoConfig;
pub use dtmi::Dtmi;
pub use error::{ResolverError, Result};
pub use fetch::{FetchResult, LocalFetcher, ModelFetcher, RemoteFetcher, RepositoryLocation};
pub use index::{build_index, IndexStats, ModelIndexEntry, ModelIndexPage, PageLinks};
pub use metadata::ModelMetadata;
pub use resolver::{DependencyResolution, RepositoryClient};
pub use validation::StrictValidator;
