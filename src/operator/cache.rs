//! Shared cache of compiled LIKE patterns.
//!
//! Filters are usually recompiled whenever their definition changes, and the
//! same LIKE literals tend to reappear across filters. Compiled regexes are
//! kept here so repeated compilations do not rebuild them.

use crate::config::LikeDefaults;
use crate::error::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cache configuration parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of patterns to keep.
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_size: 1000 }
    }
}

/// Cache statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

type PatternKey = (String, bool);

#[derive(Debug, Default)]
struct CacheStorage {
    patterns: HashMap<PatternKey, Arc<Regex>>,
    /// Insertion order, oldest first.
    insertion_order: Vec<PatternKey>,
    stats: CacheStats,
}

/// Thread-safe cache from (regex source, case sensitivity) to compiled regex.
#[derive(Debug)]
pub struct PatternCache {
    storage: RwLock<CacheStorage>,
    config: CacheConfig,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            storage: RwLock::new(CacheStorage::default()),
            config,
        }
    }

    /// Compile an OGC LIKE pattern, reusing a cached regex when available.
    pub fn like_regex(
        &self,
        pattern: &str,
        chars: LikeDefaults,
        match_case: bool,
    ) -> Result<Arc<Regex>> {
        let source = like_to_regex(pattern, chars);
        self.get_or_compile(&source, match_case)
    }

    /// Look up or compile an anchored regex source.
    pub fn get_or_compile(&self, source: &str, match_case: bool) -> Result<Arc<Regex>> {
        let key = (source.to_string(), match_case);

        let cached = self.read().patterns.get(&key).cloned();
        if let Some(regex) = cached {
            self.write().stats.hits += 1;
            return Ok(regex);
        }

        let flags = if match_case { "(?s)" } else { "(?si)" };
        let regex = Arc::new(Regex::new(&format!("{flags}^{source}$"))?);

        let mut storage = self.write();
        storage.stats.misses += 1;
        if !storage.patterns.contains_key(&key) {
            if storage.patterns.len() >= self.config.max_size && !storage.insertion_order.is_empty()
            {
                let oldest = storage.insertion_order.remove(0);
                storage.patterns.remove(&oldest);
                storage.stats.evictions += 1;
            }
            storage.insertion_order.push(key.clone());
            storage.patterns.insert(key, regex.clone());
        }

        Ok(regex)
    }

    pub fn len(&self) -> usize {
        self.read().patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.read().stats.clone()
    }

    pub fn clear(&self) {
        let mut storage = self.write();
        storage.patterns.clear();
        storage.insertion_order.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheStorage> {
        self.storage
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheStorage> {
        self.storage
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CACHE: OnceLock<PatternCache> = OnceLock::new();

/// Process-wide pattern cache.
pub fn global_pattern_cache() -> &'static PatternCache {
    GLOBAL_CACHE.get_or_init(PatternCache::new)
}

/// Initialize the global cache with a custom configuration.
///
/// Has no effect once the cache has been used.
pub fn init_global_cache(config: CacheConfig) {
    let _ = GLOBAL_CACHE.set(PatternCache::with_config(config));
}

/// Translate an OGC LIKE pattern into an unanchored regex source.
///
/// The wildcard becomes `.*`, the single character marker becomes `.`, and
/// the escape character makes the following character literal. A trailing
/// escape character is taken literally.
///
/// ```rust
/// use ogc_filter::config::LikeDefaults;
/// use ogc_filter::operator::like_to_regex;
///
/// assert_eq!(like_to_regex("Sm*th", LikeDefaults::default()), "Sm.*th");
/// assert_eq!(like_to_regex(r"a\*b.", LikeDefaults::default()), r"a\*b.");
/// ```
pub fn like_to_regex(pattern: &str, chars: LikeDefaults) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut escaped = false;

    for c in pattern.chars() {
        if escaped {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            escaped = false;
        } else if c == chars.escape_char {
            escaped = true;
        } else if c == chars.wild_card {
            out.push_str(".*");
        } else if c == chars.single_char {
            out.push('.');
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }

    if escaped {
        out.push_str(&regex::escape(
            chars.escape_char.encode_utf8(&mut [0; 4]),
        ));
    }

    out
}
