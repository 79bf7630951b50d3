use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::value::Value;

/// The keyword bag shared by reference along one end-to-end chain invocation.
///
/// Levels remove the entries they claim, so levels further down the chain
/// only ever see what is left. The bag is never copied mid-chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Kwargs {
    entries: BTreeMap<String, Value>,
}

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into this bag. Entries from `other` win.
    pub fn extend(&mut self, other: Kwargs) {
        self.entries.extend(other.entries);
    }

    /// Move every entry out, leaving the bag empty.
    pub fn take(&mut self) -> Kwargs {
        std::mem::take(self)
    }

    pub(crate) fn key_list(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Kwargs::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl IntoIterator for Kwargs {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build a [`Kwargs`] bag: `kwargs! { "b_param" => "x", "count" => 3 }`.
#[macro_export]
macro_rules! kwargs {
    () => {
        $crate::Kwargs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut bag = $crate::Kwargs::new();
        $( bag.insert($key, $value); )+
        bag
    }};
}
