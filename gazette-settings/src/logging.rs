use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{ops::AddAssign, str::FromStr};
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// The minimum level that logs should be reported at.
    ///
    /// Each entry can be one of `ERROR`, `WARN`, `INFO`, `DEBUG`, or `TRACE`
    /// (in increasing verbosity), with an optional component that specifies
    /// the source of the logs, such as `gazette_web=DEBUG`.
    ///
    /// The environment variable `GAZETTE_LOGGING__LEVELS` replaces the value
    /// from the config files entirely. Directives from the `RUST_LOG`
    /// environment variable are merged in on top of either source, and take
    /// precedence.
    pub levels: DirectiveWrapper,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// The supported log output formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// [`tracing-subscriber`]'s human targeted, pretty format. Includes more
    /// information, multiple lines per log event.
    Pretty,

    /// [MozLog](https://wiki.mozilla.org/Firefox/Services/Logging) JSON
    /// format. One line per log event.
    MozLog,

    /// [`tracing-subscriber`]'s default format. One line per log event.
    Compact,
}

/// A validated collection of tracing filter directives.
///
/// Tracing's `Directive` type is neither `Clone` nor serializable, so the
/// directives are kept as their string form and validated on the way in. This
/// type deserializes from either a comma separated string of directives
/// (`"INFO,component1=WARN"`) or from a sequence of such strings (`["INFO",
/// "component1=WARN,component2=DEBUG"]`). Config files use sequences, but
/// environment variables are always strings.
///
/// Every entry in this struct is guaranteed to be parsable as a valid
/// [`Directive`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DirectiveList", into = "Vec<String>")]
pub struct DirectiveWrapper(Vec<String>);

/// The raw forms [`DirectiveWrapper`] can deserialize from.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirectiveList {
    /// A single, possibly comma separated, directive string.
    One(String),
    /// A sequence of possibly comma separated directive strings.
    Many(Vec<String>),
}

impl TryFrom<DirectiveList> for DirectiveWrapper {
    type Error = String;

    fn try_from(value: DirectiveList) -> Result<Self, Self::Error> {
        let parts = match value {
            DirectiveList::One(s) => vec![s],
            DirectiveList::Many(v) => v,
        };

        let mut rv = DirectiveWrapper(Vec::new());
        for part in parts {
            let parsed: DirectiveWrapper =
                part.parse().map_err(|err: anyhow::Error| err.to_string())?;
            rv += parsed;
        }
        Ok(rv)
    }
}

impl From<DirectiveWrapper> for Vec<String> {
    fn from(val: DirectiveWrapper) -> Self {
        val.0
    }
}

impl FromStr for DirectiveWrapper {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = s.split(',').map(|s| s.to_string()).collect();

        // Test that each part can be parsed as a logging filter directive.
        if let Some(err) = parts.iter().find_map(|p| p.parse::<Directive>().err()) {
            return Err(err).context("valid syntax");
        }

        // Crate names contain hyphens, log targets never do.
        if parts.iter().any(|p| p.contains('-')) {
            bail!("log targets must not include hyphens");
        }

        Ok(Self(parts))
    }
}

impl AddAssign for DirectiveWrapper {
    fn add_assign(&mut self, rhs: Self) {
        self.0.extend(rhs.0)
    }
}

impl From<&DirectiveWrapper> for EnvFilter {
    fn from(val: &DirectiveWrapper) -> Self {
        let mut rv = EnvFilter::default();
        for directive in &val.0 {
            // Every entry was validated when the wrapper was built.
            rv = rv.add_directive(directive.parse().unwrap());
        }

        // Directives from RUST_LOG are always respected, on top of the
        // configured ones.
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            for directive in rust_log.split(',') {
                if let Ok(directive) = directive.parse() {
                    rv = rv.add_directive(directive);
                }
            }
        }

        rv
    }
}

#[cfg(test)]
mod tests {
    use super::DirectiveWrapper;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn parses_a_single_directive() {
        let parsed: DirectiveWrapper = "INFO".parse().expect("should parse");
        assert_eq!(Vec::<String>::from(parsed), vec!["INFO".to_string()]);
    }

    #[test]
    fn parses_comma_separated_directives() {
        let parsed: DirectiveWrapper = "INFO,gazette_web=DEBUG".parse().expect("should parse");
        assert_eq!(
            Vec::<String>::from(parsed),
            vec!["INFO".to_string(), "gazette_web=DEBUG".to_string()]
        );
    }

    #[test]
    fn rejects_invalid_directives() {
        assert!("not a directive!".parse::<DirectiveWrapper>().is_err());
    }

    #[test]
    fn rejects_hyphenated_targets() {
        assert!("gazette-web=DEBUG".parse::<DirectiveWrapper>().is_err());
    }

    #[test]
    fn deserializes_from_a_string() {
        let parsed: DirectiveWrapper =
            serde_json::from_str(r#""INFO,gazette_web=DEBUG""#).expect("should deserialize");
        assert_eq!(Vec::<String>::from(parsed).len(), 2);
    }

    #[test]
    fn deserializes_from_a_sequence() {
        let parsed: DirectiveWrapper =
            serde_json::from_str(r#"["INFO", "gazette_web=DEBUG,gazette_newsapi=WARN"]"#)
                .expect("should deserialize");
        assert_eq!(Vec::<String>::from(parsed).len(), 3);
    }

    #[test]
    fn converts_to_an_env_filter() {
        let parsed: DirectiveWrapper = "INFO,gazette_web=DEBUG".parse().expect("should parse");
        let filter = EnvFilter::from(&parsed);
        assert!(!filter.to_string().is_empty());
    }
}
