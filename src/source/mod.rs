//! Configuration sources
//!
//! A source contributes key/value pairs to the shared flat store. Sources
//! drain in the order they were registered; later sources override earlier
//! ones, matched case-insensitively.

pub mod dotenv;
pub mod env;
pub mod file;

use crate::error::ConfigError;
use crate::store::FlatMap;

pub use dotenv::DotenvFile;
pub use env::EnvSource;
pub use file::{JsonFile, TomlFile};

/// A producer of flat configuration entries.
///
/// Implementations flatten their own nested structure into
/// [`SEPARATOR`](crate::store::SEPARATOR)-joined keys before inserting.
pub trait Source {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Insert this source's entries into the store
    fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError>;
}

/// Drain an ordered list of sources into one flat store.
///
/// Purely additive/overriding; no validation happens at this stage.
pub fn aggregate(sources: &[Box<dyn Source>]) -> Result<FlatMap, ConfigError> {
    let mut store = FlatMap::new();
    for source in sources {
        source.populate(&mut store)?;
        tracing::debug!(
            source = source.name(),
            entries = store.len(),
            "drained configuration source"
        );
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Static(&'static [(&'static str, &'static str)]);

    impl Source for Static {
        fn name(&self) -> &str {
            "static"
        }

        fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError> {
            for (key, value) in self.0 {
                store.insert(*key, *value);
            }
            Ok(())
        }
    }

    #[test]
    fn test_later_source_wins_across_casing() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(Static(&[("server__port", "8080"), ("server__host", "a")])),
            Box::new(Static(&[("SERVER__PORT", "9090")])),
        ];
        let store = aggregate(&sources).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("server__port"), Some("9090"));
        assert_eq!(store.get("server__host"), Some("a"));
    }
}
