pub use std::collections::{BTreeMap, VecDeque};

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
