use vessel_collections::{
    configure, varray, vdict, Array, CollectionError, Dictionary, EngineConfig, FromVariant, Status, TypedArray,
    TypedDictionary, Variant, VariantType,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ints(array: &Array) -> Vec<i64> {
    array
        .typed::<i64>()
        .iter_live()
        .collect::<Result<Vec<_>, _>>()
        .expect("all elements are integers")
}

#[test]
fn test_sequence_end_to_end() {
    init_logging();

    let array = Array::new();
    array.push(1i64).unwrap();
    array.push(2i64).unwrap();
    array.push(3i64).unwrap();

    assert_eq!(array.len(), 3);
    assert_eq!(array.index_of(2i64), 1);
    assert!(array.remove(2i64));
    assert_eq!(array.len(), 2);
    assert_eq!(ints(&array), vec![1, 3]);

    assert_eq!(array.index_of(2i64), -1);
    assert!(!array.remove(2i64));
}

#[test]
fn test_mapping_end_to_end() {
    init_logging();

    let dict = Dictionary::new();
    dict.add("a", 1i64).unwrap();
    dict.add("b", 2i64).unwrap();

    let keys = dict.keys().unwrap();
    let values = dict.values().unwrap();
    insta::assert_snapshot!(keys.to_string(), @r#"["a", "b"]"#);
    assert_eq!(ints(&values), vec![1, 2]);

    dict.set("a", 99i64).unwrap();
    assert_eq!(dict.get("a"), Ok(Variant::Int(99)));
    assert_eq!(dict.len(), 2);
    insta::assert_snapshot!(dict.to_string(), @r#"{"a": 99, "b": 2}"#);

    // The key arrays taken earlier are independent of the update.
    assert_eq!(ints(&values), vec![1, 2]);
}

#[test]
fn test_set_then_get_round_trips() {
    let view = TypedArray::<i64>::from_slice(&[0, 0, 0]);
    for i in 0..view.len() {
        let value = (i as i64 + 1) * 10;
        view.set(i, value).unwrap();
        assert_eq!(view.get(i), Ok(value));
    }

    let names = TypedArray::<String>::from_collection(Some(vec!["x".to_string()])).unwrap();
    names.set(0, "renamed".to_string()).unwrap();
    assert_eq!(names.get(0).unwrap(), "renamed");

    assert_eq!(
        view.set(3, 1),
        Err(CollectionError::IndexOutOfRange { index: 3, count: 3 })
    );
}

#[test]
fn test_absent_source_is_rejected() {
    assert_eq!(
        Array::from_collection(None::<Vec<i64>>).unwrap_err(),
        CollectionError::NullInput("collection")
    );
    assert_eq!(
        Dictionary::from_collection(None::<Vec<(i64, i64)>>).unwrap_err(),
        CollectionError::NullInput("collection")
    );

    let empty = Array::from_collection(Some(Vec::<i64>::new())).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_shallow_duplicate_shares_nested_containers() {
    let array = varray![varray![1i64], 5i64];
    let copy = array.duplicate(false).unwrap();
    assert_eq!(copy, array);

    copy.set(1, 6i64).unwrap();
    assert_eq!(array.get(1), Ok(Variant::Int(5)));

    let nested = Array::from_variant(&copy.get(0).unwrap()).unwrap();
    nested.push(2i64).unwrap();
    insta::assert_snapshot!(array.to_string(), @"[[1, 2], 5]");
}

#[test]
fn test_deep_duplicate_isolates_every_level() {
    let inner = vdict!["k" => 1i64];
    let array = varray![inner, varray![1i64]];
    let copy = array.duplicate(true).unwrap();

    let nested_dict = Dictionary::from_variant(&copy.get(0).unwrap()).unwrap();
    nested_dict.set("k", 2i64).unwrap();
    let nested_array = Array::from_variant(&copy.get(1).unwrap()).unwrap();
    nested_array.clear().unwrap();

    insta::assert_snapshot!(array.to_string(), @r#"[{"k": 1}, [1]]"#);
    insta::assert_snapshot!(copy.to_string(), @r#"[{"k": 2}, []]"#);
}

#[test]
fn test_concatenation_leaves_operands_alone() {
    let a = varray![1i64, 2i64];
    let b = varray!["x"];

    let joined = (&a + &b).unwrap();
    assert_eq!(joined.len(), a.len() + b.len());
    insta::assert_snapshot!(joined.to_string(), @r#"[1, 2, "x"]"#);
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 1);

    let left = TypedArray::<i64>::from_slice(&[1]);
    let right = TypedArray::<i64>::from_slice(&[2, 3]);
    let both = (&left + &right).unwrap();
    assert_eq!(both.iter_live().collect::<Result<Vec<_>, _>>(), Ok(vec![1, 2, 3]));
}

#[test]
fn test_resize_grows_and_shrinks() {
    init_logging();
    configure(EngineConfig::default());

    let array = varray![1i64, 2i64, 3i64];
    array.resize(5).unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(array.get(4), Ok(Variant::Nil));

    array.resize(1).unwrap();
    assert_eq!(ints(&array), vec![1]);
}

#[test]
fn test_resize_past_limit_is_reported() {
    init_logging();
    configure(EngineConfig {
        max_len: 8,
        ..EngineConfig::default()
    });

    let array = varray![1i64];
    assert_eq!(
        array.resize(9),
        Err(CollectionError::NativeOperation {
            operation: "resize",
            status: Status::OutOfMemory,
        })
    );
    assert_eq!(array.len(), 1);

    configure(EngineConfig::default());
}

#[test]
fn test_seeded_shuffle_keeps_elements() {
    let seeded = EngineConfig {
        shuffle_seed: Some(11),
        ..EngineConfig::default()
    };

    configure(seeded.clone());
    let first: Array = (0..16i64).collect();
    first.shuffle().unwrap();

    configure(seeded);
    let second: Array = (0..16i64).collect();
    second.shuffle().unwrap();

    assert_eq!(first, second);
    let mut sorted = ints(&first);
    sorted.sort_unstable();
    assert_eq!(sorted, (0..16).collect::<Vec<_>>());

    configure(EngineConfig::default());
}

#[test]
fn test_mapping_add_contains_remove() {
    let dict = Dictionary::new();
    dict.add(1i64, "one").unwrap();

    assert!(dict.contains_key(1i64));
    assert_eq!(dict.get(1i64), Ok(Variant::from("one")));
    assert!(dict.contains(1i64, "one"));
    assert!(!dict.contains(1i64, "uno"));

    assert_eq!(
        dict.add(1i64, "again"),
        Err(CollectionError::DuplicateKey { key: "1".to_string() })
    );
    assert_eq!(dict.get(1i64), Ok(Variant::from("one")));

    assert!(!dict.remove_entry(1i64, "uno"));
    assert!(dict.remove(1i64));
    assert!(!dict.contains_key(1i64));
    assert!(!dict.remove(1i64));
    assert_eq!(dict.try_get(1i64), None);
    assert_eq!(
        dict.get(1i64),
        Err(CollectionError::KeyNotFound { key: "1".to_string() })
    );
}

#[test]
fn test_typed_mismatch_leaves_container_unmodified() {
    let array = varray![1i64, "two", 3.5];
    let view = array.typed::<i64>();

    assert_eq!(view.get(0), Ok(1));
    assert_eq!(
        view.get(1),
        Err(CollectionError::TypeConversion {
            expected: "i64",
            found: VariantType::String,
        })
    );
    assert!(matches!(
        view.get(2),
        Err(CollectionError::TypeConversion {
            found: VariantType::Float,
            ..
        })
    ));

    insta::assert_snapshot!(array.to_string(), @r#"[1, "two", 3.5]"#);
    assert_eq!(view.get(7), Err(CollectionError::IndexOutOfRange { index: 7, count: 3 }));
}

#[test]
fn test_views_share_one_array() {
    let array = varray![1i64];
    let as_ints = array.typed::<i64>();
    let as_variants = array.typed::<Variant>();
    let as_optional = array.typed::<Option<i64>>();

    as_ints.push(2).unwrap();
    as_variants.push(Variant::Nil).unwrap();

    assert_eq!(array.len(), 3);
    assert_eq!(as_optional.get(2), Ok(None));
    assert_eq!(as_optional.get(1), Ok(Some(2)));
    assert!(as_ints.get(2).is_err());

    // Explicit downcast hands back the very same array.
    assert!(std::ptr::eq(as_ints.as_untyped(), &array));
}

#[test]
fn test_live_iteration_sees_replacements() {
    let array = varray![1i64, 2i64, 3i64];
    let mut seen = Vec::new();

    for (i, item) in array.typed::<i64>().iter_live().enumerate() {
        let item = item.unwrap();
        if i == 0 {
            array.set(2, 30i64).unwrap();
        }
        seen.push(item);
    }
    assert_eq!(seen, vec![1, 2, 30]);
}

#[test]
fn test_live_iteration_fails_fast_on_growth() {
    let array = varray![1i64, 2i64];
    let mut iter = array.iter_live();

    assert_eq!(iter.next(), Some(Ok(Variant::Int(1))));
    array.push(3i64).unwrap();
    assert_eq!(
        iter.next(),
        Some(Err(CollectionError::CountChanged { expected: 2, actual: 3 }))
    );
    assert_eq!(iter.next(), None);
}

#[test]
fn test_snapshot_iteration_ignores_mutation() {
    let array = varray![1i64, 2i64];
    let snapshot = array.typed::<i64>().iter_snapshot().unwrap();
    array.clear().unwrap();
    array.push(9i64).unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.collect::<Result<Vec<_>, _>>(), Ok(vec![1, 2]));
}

#[test]
fn test_entry_enumerator_is_a_snapshot() {
    let dict = TypedDictionary::<String, i64>::new();
    dict.add("a".to_string(), 1).unwrap();
    dict.add("b".to_string(), 2).unwrap();

    let mut entries = dict.iter_snapshot().unwrap();
    assert_eq!(entries.next(), Some(Ok(("a".to_string(), 1))));

    dict.set("a".to_string(), 100).unwrap();
    dict.remove(&"b".to_string());
    dict.add("c".to_string(), 3).unwrap();

    assert_eq!(entries.next(), Some(Ok(("b".to_string(), 2))));
    assert_eq!(entries.next(), None);

    entries.reset();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries.next(), Some(Ok(("a".to_string(), 1))));

    insta::assert_snapshot!(dict.to_string(), @r#"{"a": 100, "c": 3}"#);
}

#[test]
fn test_typed_dictionary_views() {
    let dict = vdict!["hp" => 10i64, "name" => "slime"];
    let stats = dict.typed::<String, i64>();

    assert_eq!(stats.get(&"hp".to_string()), Ok(10));
    assert!(matches!(
        stats.get(&"name".to_string()),
        Err(CollectionError::TypeConversion {
            found: VariantType::String,
            ..
        })
    ));
    assert_eq!(stats.try_get(&"mp".to_string()), Ok(None));
    assert!(stats.try_get(&"name".to_string()).is_err());
    assert!(stats.contains_entry(&"hp".to_string(), &10));
    assert!(stats.remove_entry(&"hp".to_string(), &10));
    assert_eq!(dict.len(), 1);

    let keys = stats.keys().unwrap();
    assert_eq!(keys.get(0), Ok("name".to_string()));
    assert!(stats.values().unwrap().get(0).is_err());
}

#[test]
fn test_typed_dictionary_duplicate_is_isolated() {
    let scores: TypedDictionary<String, i64> = vec![("a".to_string(), 1), ("b".to_string(), 2)].into_iter().collect();
    let copy = scores.duplicate(false).unwrap();

    copy.set("a".to_string(), 5).unwrap();
    assert_eq!(scores.get(&"a".to_string()), Ok(1));
    assert_eq!(copy.get(&"a".to_string()), Ok(5));
    assert_ne!(scores, copy);
}

#[test]
fn test_copy_to_validates_capacity() {
    let dict = vdict![1i64 => true, 2i64 => false];
    let mut small = vec![(Variant::Nil, Variant::Nil); 1];
    assert_eq!(
        dict.copy_to(&mut small, 0),
        Err(CollectionError::DestinationTooSmall {
            required: 2,
            capacity: 1,
        })
    );
    assert_eq!(small, vec![(Variant::Nil, Variant::Nil)]);

    let typed = dict.typed::<i64, bool>();
    let mut dest = vec![(0i64, false); 3];
    typed.copy_to(&mut dest, 1).unwrap();
    assert_eq!(dest, vec![(0, false), (1, true), (2, false)]);

    let array = TypedArray::<i64>::from_slice(&[4, 5]);
    let mut out = [0i64; 2];
    array.copy_to(&mut out, 0).unwrap();
    assert_eq!(out, [4, 5]);
    assert!(matches!(
        array.copy_to(&mut out, 1),
        Err(CollectionError::DestinationTooSmall { .. })
    ));
}

#[test]
fn test_dispose_twice_is_harmless() {
    init_logging();

    let array = varray![1i64, 2i64];
    let alias = array.duplicate(false).unwrap();
    array.dispose().unwrap();
    alias.dispose().unwrap();

    let view = TypedArray::<i64>::from_slice(&[7]);
    view.into_untyped().dispose().unwrap();

    let dict = vdict!["a" => 1i64];
    dict.dispose().unwrap();

    // Storage released above must not disturb containers built afterwards.
    let fresh = varray![3i64];
    assert_eq!(ints(&fresh), vec![3]);
}

#[test]
fn test_duplicate_key_in_source_is_rejected() {
    let pairs = vec![("a", 1i64), ("a", 2i64)];
    assert_eq!(
        Dictionary::from_collection(Some(pairs.clone())).unwrap_err(),
        CollectionError::DuplicateKey { key: "\"a\"".to_string() }
    );

    let collected: Dictionary = pairs.into_iter().collect();
    assert_eq!(collected.get("a"), Ok(Variant::Int(2)));
}

#[test]
fn test_containers_nest_through_variants() {
    let inner = TypedArray::<i64>::from_slice(&[1, 2]);
    let outer = TypedArray::<TypedArray<i64>>::new();
    outer.push(inner).unwrap();

    let back = outer.get(0).unwrap();
    back.push(3).unwrap();
    insta::assert_snapshot!(outer.to_string(), @"[[1, 2, 3]]");
    insta::assert_snapshot!(format!("{:?}", varray![]), @"Array([])");
}

#[test]
fn test_self_containing_array_stays_usable() {
    init_logging();

    let array = Array::new();
    array.push(1i64).unwrap();
    array.push(&array).unwrap();

    insta::assert_snapshot!(array.to_string(), @"[1, [...]]");
    assert_eq!(array.index_of(&array), 1);
    assert!(array.contains(&array));

    let shallow = array.duplicate(false).unwrap();
    assert_eq!(shallow, array);
    assert_eq!(
        array.duplicate(true),
        Err(CollectionError::NativeOperation {
            operation: "duplicate",
            status: Status::Failed,
        })
    );

    // Breaking the cycle makes deep copies possible again.
    array.remove_at(1).unwrap();
    assert_eq!(ints(&array.duplicate(true).unwrap()), vec![1]);
}

#[test]
fn test_self_containing_dictionary_stays_usable() {
    let dict = Dictionary::new();
    dict.set("me", &dict).unwrap();

    insta::assert_snapshot!(dict.to_string(), @r#"{"me": {...}}"#);
    assert!(dict.contains("me", &dict));
    assert!(matches!(
        dict.duplicate(true),
        Err(CollectionError::NativeOperation {
            status: Status::Failed,
            ..
        })
    ));
}

#[test]
fn test_nan_key_is_upserted() {
    let dict = Dictionary::new();
    dict.set(f64::NAN, 1i64).unwrap();
    dict.set(f64::NAN, 2i64).unwrap();

    assert_eq!(dict.len(), 1);
    assert!(dict.contains_key(f64::NAN));
    assert_eq!(dict.get(f64::NAN), Ok(Variant::Int(2)));
    assert!(matches!(dict.add(f64::NAN, 3i64), Err(CollectionError::DuplicateKey { .. })));
    assert!(dict.remove(f64::NAN));
    assert!(dict.is_empty());

    // Plain element search keeps IEEE semantics.
    let array = varray![f64::NAN];
    assert_eq!(array.index_of(f64::NAN), -1);
}

#[test]
fn test_dictionary_equality_ignores_insertion_order() {
    let forward = vdict!["a" => 1i64, "b" => 2i64];
    let backward = vdict!["b" => 2i64, "a" => 1i64];
    assert_eq!(forward, backward);

    backward.set("b", 3i64).unwrap();
    assert_ne!(forward, backward);
    assert_ne!(forward, vdict!["a" => 1i64]);
}

#[test]
fn test_deep_dictionary_duplicate_isolates_nested_containers() {
    let dict = vdict!["list" => varray![1i64], "map" => vdict!["k" => 1i64]];
    let shallow = dict.duplicate(false).unwrap();
    let deep = dict.duplicate(true).unwrap();

    let list = Array::from_variant(&deep.get("list").unwrap()).unwrap();
    list.push(2i64).unwrap();
    let map = Dictionary::from_variant(&deep.get("map").unwrap()).unwrap();
    map.set("k", 2i64).unwrap();

    insta::assert_snapshot!(dict.to_string(), @r#"{"list": [1], "map": {"k": 1}}"#);
    insta::assert_snapshot!(deep.to_string(), @r#"{"list": [1, 2], "map": {"k": 2}}"#);

    let shared = Array::from_variant(&shallow.get("list").unwrap()).unwrap();
    shared.push(3i64).unwrap();
    insta::assert_snapshot!(dict.to_string(), @r#"{"list": [1, 3], "map": {"k": 1}}"#);
}

#[test]
fn test_interior_nul_renders_escaped() {
    let array = varray!["a\0b"];
    insta::assert_snapshot!(array.to_string(), @r#"["a\u{0}b"]"#);
    assert_eq!(array.get(0), Ok(Variant::from("a\0b")));
}
