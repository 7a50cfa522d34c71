#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use crate::icall::array::*;
    use crate::icall::dict::*;
    use crate::icall::vessel_string_free;
    use crate::{configure, EngineConfig, RawArray, RawDictionary, Status, Variant, VariantType};

    fn new_array(items: &[Variant]) -> RawArray {
        let mut raw = RawArray::default();
        let status = unsafe { vessel_array_ctor_from_variants(items.as_ptr(), items.len(), &mut raw) };
        assert_eq!(status, Status::Ok);
        raw
    }

    fn at(raw: &RawArray, index: i64) -> Result<Variant, Status> {
        let mut out = Variant::Nil;
        unsafe { vessel_array_at(raw, index, &mut out) }.into_result()?;
        Ok(out)
    }

    fn array_text(raw: &RawArray) -> String {
        unsafe {
            let ptr = vessel_array_to_string(raw);
            assert!(!ptr.is_null());
            let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
            vessel_string_free(ptr);
            text
        }
    }

    #[test]
    fn test_variant_creation() {
        assert_eq!(Variant::from(true), Variant::Bool(true));
        assert_eq!(Variant::from(42i64), Variant::Int(42));
        assert_eq!(Variant::from(1.5), Variant::Float(1.5));
        assert_eq!(Variant::from("hello"), Variant::from("hello".to_string()));
        assert_eq!(Variant::default(), Variant::Nil);
    }

    #[test]
    fn test_variant_types() {
        assert_eq!(Variant::Nil.get_type(), VariantType::Nil);
        assert_eq!(Variant::from("x").get_type(), VariantType::String);
        assert_eq!(Variant::Int(1).get_type(), VariantType::Int);
        assert_eq!(VariantType::Dictionary.to_string(), "Dictionary");
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(Variant::Bool(false).to_string(), "false");
        assert_eq!(Variant::Int(-7).to_string(), "-7");
        assert_eq!(Variant::Float(2.0).to_string(), "2.0");
        assert_eq!(Variant::from("plain").to_string(), "plain");
        assert_eq!(Variant::Nil.to_string(), "null");

        let mut raw = new_array(&[Variant::Int(1), Variant::from("a"), Variant::Nil]);
        insta::assert_snapshot!(array_text(&raw), @r#"[1, "a", null]"#);
        unsafe { vessel_array_dispose(&mut raw) };
    }

    #[test]
    fn test_array_bounds_are_checked() {
        let mut raw = new_array(&[Variant::Int(10), Variant::Int(20)]);

        assert_eq!(at(&raw, 1), Ok(Variant::Int(20)));
        assert_eq!(at(&raw, 2), Err(Status::ParameterRangeError));
        assert_eq!(at(&raw, -1), Err(Status::ParameterRangeError));

        let value = Variant::Int(5);
        assert_eq!(unsafe { vessel_array_set_at(&raw, 2, &value) }, Status::ParameterRangeError);
        assert_eq!(unsafe { vessel_array_remove_at(&raw, 9) }, Status::ParameterRangeError);
        assert_eq!(unsafe { vessel_array_insert(&raw, 2, &value) }, Status::Ok);
        assert_eq!(unsafe { vessel_array_count(&raw) }, 3);

        unsafe { vessel_array_dispose(&mut raw) };
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut raw = new_array(&[Variant::Int(1)]);

        assert_eq!(unsafe { vessel_array_dispose(&mut raw) }, Status::Ok);
        assert!(raw.is_null());
        assert_eq!(unsafe { vessel_array_dispose(&mut raw) }, Status::Ok);

        // A released handle reports errors instead of touching freed storage.
        assert_eq!(unsafe { vessel_array_count(&raw) }, 0);
        assert_eq!(at(&raw, 0), Err(Status::InvalidParameter));

        let mut dict = RawDictionary::default();
        unsafe {
            assert_eq!(vessel_dictionary_ctor(&mut dict), Status::Ok);
            assert_eq!(vessel_dictionary_dispose(&mut dict), Status::Ok);
            assert_eq!(vessel_dictionary_dispose(&mut dict), Status::Ok);
        }
    }

    #[test]
    fn test_resize_respects_max_len() {
        configure(EngineConfig {
            max_len: 4,
            shuffle_seed: None,
        });

        let mut raw = new_array(&[Variant::Int(1)]);
        assert_eq!(unsafe { vessel_array_resize(&raw, 3) }, Status::Ok);
        assert_eq!(at(&raw, 2), Ok(Variant::Nil));
        assert_eq!(unsafe { vessel_array_resize(&raw, 5) }, Status::OutOfMemory);
        assert_eq!(unsafe { vessel_array_resize(&raw, -1) }, Status::InvalidParameter);
        assert_eq!(unsafe { vessel_array_count(&raw) }, 3);

        unsafe { vessel_array_dispose(&mut raw) };
        configure(EngineConfig::default());
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let items: Vec<Variant> = (0..32).map(Variant::Int).collect();
        let seeded = EngineConfig {
            shuffle_seed: Some(7),
            ..EngineConfig::default()
        };

        configure(seeded.clone());
        let mut first = new_array(&items);
        assert_eq!(unsafe { vessel_array_shuffle(&first) }, Status::Ok);

        configure(seeded);
        let mut second = new_array(&items);
        assert_eq!(unsafe { vessel_array_shuffle(&second) }, Status::Ok);

        assert_eq!(array_text(&first), array_text(&second));

        let mut seen: Vec<i64> = (0..32)
            .map(|i| match at(&first, i) {
                Ok(Variant::Int(n)) => n,
                other => panic!("unexpected element {:?}", other),
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());

        unsafe {
            vessel_array_dispose(&mut first);
            vessel_array_dispose(&mut second);
        }
        configure(EngineConfig::default());
    }

    #[test]
    fn test_shallow_duplicate_shares_nested_storage() {
        let mut inner = new_array(&[Variant::Int(1)]);
        let mut nested = Variant::Nil;
        unsafe { vessel_variant_from_array(&inner, &mut nested) };

        let mut outer = new_array(&[nested]);
        let mut shallow = RawArray::default();
        let mut deep = RawArray::default();
        unsafe {
            vessel_array_duplicate(&outer, false, &mut shallow);
            vessel_array_duplicate(&outer, true, &mut deep);
        }

        let two = Variant::Int(2);
        unsafe { vessel_array_add(&inner, &two) };

        assert_eq!(array_text(&outer), "[[1, 2]]");
        assert_eq!(array_text(&shallow), "[[1, 2]]");
        assert_eq!(array_text(&deep), "[[1]]");

        unsafe {
            vessel_array_dispose(&mut inner);
            vessel_array_dispose(&mut outer);
            vessel_array_dispose(&mut shallow);
            vessel_array_dispose(&mut deep);
        }
    }

    #[test]
    fn test_dictionary_upsert_and_add() {
        let mut dict = RawDictionary::default();
        let (a, b) = (Variant::from("a"), Variant::from("b"));

        unsafe {
            vessel_dictionary_ctor(&mut dict);
            assert_eq!(vessel_dictionary_add(&dict, &a, &Variant::Int(1)), Status::Ok);
            assert_eq!(vessel_dictionary_add(&dict, &a, &Variant::Int(2)), Status::AlreadyExists);
            assert_eq!(vessel_dictionary_set_value(&dict, &b, &Variant::Int(2)), Status::Ok);
            assert_eq!(vessel_dictionary_set_value(&dict, &a, &Variant::Int(99)), Status::Ok);
            assert_eq!(vessel_dictionary_count(&dict), 2);

            let mut out = Variant::Nil;
            assert_eq!(vessel_dictionary_get_value(&dict, &a, &mut out), Status::Ok);
            assert_eq!(out, Variant::Int(99));
            assert_eq!(
                vessel_dictionary_get_value(&dict, &Variant::from("zz"), &mut out),
                Status::DoesNotExist
            );

            assert!(!vessel_dictionary_remove(&dict, &b, &Variant::Int(3)));
            assert!(vessel_dictionary_remove(&dict, &b, &Variant::Int(2)));
            assert!(!vessel_dictionary_remove_key(&dict, &b));

            let text = vessel_dictionary_to_string(&dict);
            insta::assert_snapshot!(CStr::from_ptr(text).to_string_lossy(), @r#"{"a": 99}"#);
            vessel_string_free(text);

            vessel_dictionary_dispose(&mut dict);
        }
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"shuffle_seed": 3}"#).unwrap();
        assert_eq!(config.shuffle_seed, Some(3));
        assert_eq!(config.max_len, crate::config::DEFAULT_MAX_LEN);
    }

    #[test]
    fn test_self_containing_array_is_guarded() {
        let mut raw = new_array(&[Variant::Int(1)]);
        let mut itself = Variant::Nil;
        unsafe {
            assert_eq!(vessel_variant_from_array(&raw, &mut itself), Status::Ok);
            assert_eq!(vessel_array_add(&raw, &itself), 1);
        }

        assert_eq!(array_text(&raw), "[1, [...]]");
        assert_eq!(itself, itself.clone());
        assert_eq!(unsafe { vessel_array_index_of(&raw, &itself) }, 1);

        let mut shallow = RawArray::default();
        let mut deep = RawArray::default();
        unsafe {
            assert_eq!(vessel_array_duplicate(&raw, false, &mut shallow), Status::Ok);
            assert_eq!(vessel_array_duplicate(&raw, true, &mut deep), Status::Failed);
        }
        assert!(deep.is_null());
        assert_eq!(array_text(&shallow), "[1, [1, [...]]]");

        unsafe {
            vessel_array_dispose(&mut raw);
            vessel_array_dispose(&mut shallow);
        }
    }

    #[test]
    fn test_self_containing_dictionary_is_guarded() {
        let mut dict = RawDictionary::default();
        let mut itself = Variant::Nil;
        let key = Variant::from("self");
        unsafe {
            vessel_dictionary_ctor(&mut dict);
            vessel_variant_from_dictionary(&dict, &mut itself);
            assert_eq!(vessel_dictionary_set_value(&dict, &key, &itself), Status::Ok);

            let text = vessel_dictionary_to_string(&dict);
            insta::assert_snapshot!(CStr::from_ptr(text).to_string_lossy(), @r#"{"self": {...}}"#);
            vessel_string_free(text);

            let mut copy = RawDictionary::default();
            assert_eq!(vessel_dictionary_duplicate(&dict, true, &mut copy), Status::Failed);
            assert!(vessel_dictionary_contains(&dict, &key, &itself));

            vessel_dictionary_dispose(&mut dict);
        }
    }

    #[test]
    fn test_nan_keys_match_themselves() {
        let nan = Variant::Float(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.key_eq(&Variant::Float(f64::NAN)));
        assert!(!nan.key_eq(&Variant::Float(1.0)));

        let mut dict = RawDictionary::default();
        unsafe {
            vessel_dictionary_ctor(&mut dict);
            assert_eq!(vessel_dictionary_set_value(&dict, &nan, &Variant::Int(1)), Status::Ok);
            assert_eq!(vessel_dictionary_set_value(&dict, &nan, &Variant::Int(2)), Status::Ok);
            assert_eq!(vessel_dictionary_count(&dict), 1);
            assert_eq!(vessel_dictionary_add(&dict, &nan, &Variant::Int(3)), Status::AlreadyExists);

            let mut out = Variant::Nil;
            assert_eq!(vessel_dictionary_get_value(&dict, &nan, &mut out), Status::Ok);
            assert_eq!(out, Variant::Int(2));
            assert!(vessel_dictionary_contains_key(&dict, &nan));
            assert!(vessel_dictionary_remove_key(&dict, &nan));
            assert_eq!(vessel_dictionary_count(&dict), 0);

            vessel_dictionary_dispose(&mut dict);
        }
    }

    #[test]
    fn test_dictionary_equality_ignores_order() {
        let (a, b) = (Variant::from("a"), Variant::from("b"));
        let mut first = RawDictionary::default();
        let mut second = RawDictionary::default();
        let (mut left, mut right) = (Variant::Nil, Variant::Nil);
        unsafe {
            vessel_dictionary_ctor(&mut first);
            vessel_dictionary_ctor(&mut second);
            vessel_dictionary_set_value(&first, &a, &Variant::Int(1));
            vessel_dictionary_set_value(&first, &b, &Variant::Int(2));
            vessel_dictionary_set_value(&second, &b, &Variant::Int(2));
            vessel_dictionary_set_value(&second, &a, &Variant::Int(1));
            vessel_variant_from_dictionary(&first, &mut left);
            vessel_variant_from_dictionary(&second, &mut right);
        }
        assert_eq!(left, right);

        unsafe { vessel_dictionary_set_value(&second, &a, &Variant::Int(5)) };
        assert_ne!(left, right);

        unsafe {
            vessel_dictionary_dispose(&mut first);
            vessel_dictionary_dispose(&mut second);
        }
    }

    #[test]
    fn test_interior_nul_is_escaped() {
        let mut raw = new_array(&[Variant::from("a\0b")]);
        insta::assert_snapshot!(array_text(&raw), @r#"["a\u{0}b"]"#);
        unsafe { vessel_array_dispose(&mut raw) };
    }
}
