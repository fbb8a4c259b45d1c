use thiserror::Error;

/// Problems with the supplied options. These are always fatal and are raised before any output
/// is written.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("selection_and and selection_or cannot be used together")]
    ConflictingSelection,

    #[error("unsupported selection key: {0}")]
    UnsupportedSelectionKey(String),

    #[error("selection key `{key}` expects {expected} values, got {got}")]
    SelectionValueType {
        key: String,
        expected: &'static str,
        got: String,
    },

    #[error("show_total_citation needs show_citation = \"bs\"")]
    TotalCitationNeedsScrape,

    #[error("show_citation = \"bs\" needs a googlescholarID")]
    MissingScholarId,

    #[error("count_publisher groups must not be empty")]
    EmptyVenueGroup,

    #[error("failed to read configuration: {0}")]
    Parse(String),
}

/// Raised while turning entries into HTML.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("entry `{id}` has no `{field}` field")]
    MissingField { id: String, field: &'static str },
}
