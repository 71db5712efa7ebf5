//! Tracing filter construction
//!
//! The subscriber itself is installed by the CLI; this module only turns a
//! [`LoggingConfig`](crate::config::LoggingConfig) into `EnvFilter` directives.

/// Build filter directives string from LoggingConfig
///
/// The base level comes first, followed by one `reconciler::<component>=<level>`
/// directive per override in component order.
///
/// # Examples
///
/// ```
/// use reconciler::config::LoggingConfig;
/// use reconciler::logging::build_filter_directives;
///
/// let mut config = LoggingConfig::default();
/// config.components.insert("pricing".to_string(), "debug".to_string());
///
/// let filter_str = build_filter_directives(&config);
/// assert_eq!(filter_str, "info,reconciler::pricing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.to_ascii_lowercase();

    for (component, level) in &config.components {
        filter_str.push_str(&format!(
            ",reconciler::{}={}",
            component,
            level.to_ascii_lowercase()
        ));
    }

    filter_str
}
