use super::*;
use crate::Array;

fn sample() -> Table {
    let mut t = Table::new();
    t.insert("b", 2i64);
    t.insert("a", 1i64);
    t.insert("name", "apple");
    t
}

#[test]
fn insert_get_contains() {
    let mut t = Table::new();
    assert!(t.is_empty());
    assert_eq!(t.len(), 0);

    assert!(t.insert("k", 1i64).is_none());
    assert_eq!(t.len(), 1);
    assert!(t.contains_key("k"));
    assert!(!t.contains_key("missing"));
    assert_eq!(t.get("k").unwrap().as_integer(), Some(1));
    assert!(t.get("missing").is_none());

    // insert-or-assign replaces and returns the old value
    let old = t.insert("k", 2i64).unwrap();
    assert_eq!(old.as_integer(), Some(1));
    assert_eq!(t.len(), 1);
    assert_eq!(t.get("k").unwrap().as_integer(), Some(2));
}

#[test]
fn emplace_does_not_overwrite() {
    let mut t = Table::new();
    let (slot, inserted) = t.emplace("k", 1i64);
    assert!(inserted);
    assert_eq!(slot.as_integer(), Some(1));

    let (slot, inserted) = t.emplace("k", 99i64);
    assert!(!inserted);
    assert_eq!(slot.as_integer(), Some(1));
    assert_eq!(t.len(), 1);
}

#[test]
fn remove_preserves_order() {
    let mut t = sample();
    let removed = t.remove("a").unwrap();
    assert_eq!(removed.as_integer(), Some(1));
    assert!(t.remove("a").is_none());

    let keys: Vec<&str> = t.keys().collect();
    assert_eq!(keys, ["b", "name"]);

    let (key, value) = t.remove_entry("name").unwrap();
    assert_eq!(key, "name");
    assert_eq!(value.as_str(), Some("apple"));
}

#[test]
fn iteration_is_insertion_ordered() {
    let t = sample();
    let keys: Vec<&str> = t.keys().collect();
    assert_eq!(keys, ["b", "a", "name"]);

    let pairs: Vec<(&str, i64)> = t
        .iter()
        .filter_map(|(k, v)| v.as_integer().map(|i| (k, i)))
        .collect();
    assert_eq!(pairs, [("b", 2), ("a", 1)]);

    assert_eq!(t.entries().len(), 3);
    assert_eq!(t.get_key_value("a"), Some(("a", &Value::Integer(1))));
}

#[test]
fn values_mut() {
    let mut t = sample();
    for value in t.values_mut() {
        if let Value::Integer(i) = value {
            *i *= 10;
        }
    }
    assert_eq!(t.get("a").unwrap().as_integer(), Some(10));
    assert_eq!(t.get("b").unwrap().as_integer(), Some(20));
}

#[test]
fn equality_ignores_order_and_flags() {
    let mut a = Table::new();
    a.insert("x", 1i64);
    a.insert("y", 2i64);

    let mut b = Table::new();
    b.insert("y", 2i64);
    b.insert("x", 1i64);
    assert_eq!(a, b);

    // the inline flag does not participate in structural equality
    let mut c = Table::new_inline();
    c.insert("x", 1i64);
    c.insert("y", 2i64);
    assert!(c.is_inline());
    assert_eq!(a, c);

    let mut d = Table::new();
    d.insert("x", 1i64);
    assert_ne!(a, d);

    let mut e = Table::new();
    e.insert("x", 1i64);
    e.insert("y", 3i64);
    assert_ne!(a, e);
}

#[test]
fn dotted_index_returns_views() {
    let mut inner = Table::new();
    inner.insert("c", 7i64);
    let mut mid = Table::new();
    mid.insert("b", inner);
    let mut root = Table::new();
    root.insert("a", mid);
    root.insert("top", true);

    assert_eq!(root["top"].as_bool(), Some(true));
    assert_eq!(root["a.b.c"].as_integer(), Some(7));
    assert_eq!(root["a"]["b"]["c"].as_integer(), Some(7));

    // missing paths are null views, chainable
    assert!(root["a.z.c"].is_none());
    assert!(root["z"]["y"].is_none());
    assert!(root["top.anything"].is_none());
}

#[test]
fn into_iterator() {
    let t = sample();
    let count = (&t).into_iter().count();
    assert_eq!(count, 3);

    let owned: Vec<(String, Value)> = t.into_iter().collect();
    assert_eq!(owned[0].0, "b");

    let rebuilt: Table = owned.into_iter().collect();
    assert_eq!(rebuilt.len(), 3);
    assert_eq!(rebuilt.get("name").unwrap().as_str(), Some("apple"));
}

#[test]
fn deep_clone_shares_nothing() {
    let mut arr = Array::new();
    arr.push(1i64);
    let mut t = Table::new();
    t.insert("xs", arr);

    let mut copy = t.clone();
    copy.get_mut("xs")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .push(2i64);
    assert_eq!(t.get("xs").unwrap().as_array().unwrap().len(), 1);
    assert_eq!(copy.get("xs").unwrap().as_array().unwrap().len(), 2);
}
