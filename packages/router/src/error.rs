use thiserror::Error;

/// Errors surfaced by the router.
///
/// These are the only fatal conditions in the router core: a requested
/// configuration that cannot be resolved to a view implementation. Every
/// other failure class (unserializable props, unparsable query-string
/// values, platform history diverging from the in-memory stack) is recovered
/// locally and never becomes an `Err`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The props name a component for which no view implementation is
    /// registered.
    #[error("no view implementation registered for component {0:?}")]
    UnknownComponent(String),

    /// The props carry no usable `component` key, so there is nothing to
    /// resolve against the registry.
    #[error("history entry props do not name a component")]
    MissingComponentName,
}
