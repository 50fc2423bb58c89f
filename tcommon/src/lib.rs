//! Shared future aliases and keyed containers for workspace crates.
//!
//! ```rust
//! use tcommon::{BoxFuture, Registry};
//!
//! fn answer<'a>() -> BoxFuture<'a, u32> {
//!     Box::pin(async { 42 })
//! }
//!
//! let mut registry = Registry::new();
//! registry.insert("add".to_string(), 1_u32);
//! assert_eq!(registry.get("add"), Some(&1));
//! let _future = answer();
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use tcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod registry {
    //! Generic registry map wrapper used by name-keyed tables.
    //!
    //! Insertion replaces any previous value under the same key; callers that
    //! need "last registration wins" semantics get them for free.
    //!
    //! ```rust
    //! use tcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //! registry.insert("alpha".to_string(), 2_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&2));
    //! assert_eq!(registry.len(), 1);
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.items.iter()
        }

        pub fn clear(&mut self) {
            self.items.clear();
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }

    impl<K, V> FromIterator<(K, V)> for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
            Self {
                items: iter.into_iter().collect(),
            }
        }
    }
}

pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::Registry;

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);

        let removed = registry.remove("alpha");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn insert_overwrites_and_clear_empties() {
        let mut registry = Registry::new();
        registry.insert("alpha".to_string(), 1_u32);
        let previous = registry.insert("alpha".to_string(), 2_u32);
        registry.insert("beta".to_string(), 3_u32);

        assert_eq!(previous, Some(1));
        assert_eq!(registry.get("alpha"), Some(&2));
        assert_eq!(registry.len(), 2);

        let mut keys = registry.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["alpha".to_string(), "beta".to_string()]);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_collects_from_pairs() {
        let registry = [("a", 1_u8), ("b", 2_u8), ("a", 3_u8)]
            .into_iter()
            .collect::<Registry<_, _>>();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a"), Some(&3));
    }
}
