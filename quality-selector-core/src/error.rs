/// Reasons a quality selection request was not applied.
///
/// A failed selection never mutates the host's levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("no quality level matches the requested filter")]
    NoMatch,

    #[error("quality levels are not supported by this player")]
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("no plugin registered under `{0}`")]
    UnknownPlugin(String),

    #[error("plugin `{0}` is already registered")]
    AlreadyRegistered(String),

    #[error("invalid options for plugin `{name}`")]
    InvalidOptions {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
