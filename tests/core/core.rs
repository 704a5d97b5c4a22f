use serde_json::json;
use warren::{AccessLevel, Export, Registry, RegistryConfig, RegistryError, Resolved};

fn sealed_public(registry: &Registry, path: &str, symbols: &[(&str, Export)]) {
    let symbols: Vec<(String, Export)> = symbols
        .iter()
        .map(|(n, e)| (n.to_string(), e.clone()))
        .collect();
    registry
        .namespace(path)
        .and_then(|ns| {
            ns.code(move |_importer, _system, exports| {
                for (name, export) in symbols {
                    exports.insert(name, export);
                }
            })
        })
        .and_then(|ns| ns.seal())
        .expect("registration should succeed");
}

#[test]
fn end_to_end_util_double() {
    let registry = Registry::new();
    sealed_public(
        &registry,
        "util",
        &[(
            "double",
            Export::func(|args| json!(args[0].as_i64().unwrap_or(0) * 2)),
        )],
    );

    let ran = registry
        .namespace("consumer")
        .and_then(|ns| {
            ns.code_with_imports(&["util:double"], |_system, _own, imports| {
                assert_eq!(imports.len(), 1);
                let double = imports[0].as_symbol().expect("double resolves");
                assert_eq!(double.call(&[json!(21)]), Some(json!(42)));
            })
        })
        .is_some();
    assert!(ran);
}

#[test]
fn private_namespaces_are_never_importable() {
    let registry = Registry::new();
    registry
        .namespace("outer")
        .and_then(|ns| ns.private("secret"))
        .and_then(|ns| ns.seal())
        .expect("secret registration");

    for specifier in ["outer.secret", "outer.secret:anything"] {
        let result = registry.namespace("elsewhere").and_then(|ns| {
            ns.code_with_imports(&[specifier], |_system, _own, _imports| {
                panic!("registrant must not run when an import fails");
            })
        });
        assert!(result.is_none(), "{specifier} should fail");
        match registry.last_error() {
            Some(RegistryError::Access(msg)) => assert!(msg.contains("private"), "{msg}"),
            other => panic!("expected an access error, got {other:?}"),
        }
    }
}

#[test]
fn protected_namespaces_import_only_into_nested_callers() {
    let registry = Registry::new();
    registry
        .namespace("a")
        .and_then(|ns| ns.protected("b"))
        .and_then(|ns| {
            ns.code(|_importer, _system, exports| {
                exports.insert("inner", Export::value(json!("ok")));
            })
        })
        .expect("a.b registration");
    // The nested caller must exist before a.b is sealed: sealing blocks
    // creation of new children, not mutation of existing ones.
    registry.namespace("a.b.c").expect("create nested caller");
    registry
        .namespace("a.b")
        .and_then(|ns| ns.seal())
        .expect("seal a.b");

    let nested = registry
        .namespace("a.b.c")
        .and_then(|ns| {
            ns.code_with_imports(&["a.b"], |_system, _own, imports| {
                let snap = imports[0].as_namespace().expect("whole namespace");
                assert!(snap.contains("inner"));
            })
        })
        .is_some();
    assert!(nested, "a.b.c sits under a.b and may import it");

    let stranger = registry.namespace("x.y").and_then(|ns| {
        ns.code_with_imports(&["a.b"], |_system, _own, _imports| {
            panic!("x.y must not import protected a.b");
        })
    });
    assert!(stranger.is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::Access(_))
    ));
}

#[test]
fn protected_prefix_comparison_is_segment_wise_not_substring() {
    // "a.bc" starts with the string "a.b" but is a sibling, not a
    // descendant. The raw-string comparison would wrongly allow it.
    let registry = Registry::new();
    registry.namespace("a").and_then(|ns| ns.protected("b")).expect("create a.b");
    registry.namespace("a.b.d").expect("create nested caller first");
    registry
        .namespace("a.b")
        .and_then(|ns| ns.seal())
        .expect("seal a.b");

    let sibling = registry.namespace("a.bc").and_then(|ns| {
        ns.code_with_imports(&["a.b"], |_system, _own, _imports| {
            panic!("a.bc must not import protected a.b");
        })
    });
    assert!(sibling.is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::Access(_))
    ));

    // Equality and deeper nesting are both allowed.
    let own = registry
        .namespace("a.b.d")
        .and_then(|ns| ns.code_with_imports(&["a.b"], |_system, _own, _imports| {}))
        .is_some();
    assert!(own);
}

#[test]
fn ref_shares_the_live_value_while_import_copies_the_map() {
    let registry = Registry::new();
    sealed_public(&registry, "vals", &[("tau", Export::value(json!(6.28)))]);

    let session = registry.namespace("vals").expect("session on sealed ns");
    let first = session.symbol("tau").expect("live ref");
    let second = session.symbol("tau").expect("live ref again");
    assert!(
        Export::ptr_eq(&first, &second),
        "both refs share one allocation"
    );

    let snapshot = session.import().expect("public sealed import");
    let copied = snapshot.get("tau").expect("snapshot holds tau");
    assert!(
        Export::ptr_eq(&first, copied),
        "shallow copy shares the values"
    );
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn import_requires_public_and_sealed() {
    let registry = Registry::new();

    // Not sealed yet: incomplete.
    let open = registry.namespace("wip").expect("open session");
    assert!(open.import().is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::State(_))
    ));
    assert!(open.symbol("x").is_none());

    // Sealed but protected: wrong visibility for this surface.
    registry
        .namespace("guarded")
        .and_then(|ns| ns.protected("inner"))
        .and_then(|ns| ns.seal())
        .expect("guarded.inner registration");
    let session = registry.namespace("guarded.inner").expect("session");
    assert!(session.import().is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::Access(_))
    ));
}

#[test]
fn sealing_twice_fails_and_leaves_the_seal_intact() {
    let registry = Registry::new();
    let sealed = registry
        .namespace("once")
        .and_then(|ns| ns.seal())
        .expect("first seal succeeds");
    assert!(sealed.is_sealed());

    assert!(sealed.seal().is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::State(_))
    ));

    let again = registry.namespace("once").expect("reopen session");
    assert!(again.is_sealed(), "failed second seal changed nothing");
}

#[test]
fn sealed_parents_reject_new_children() {
    let registry = Registry::new();
    registry
        .namespace("parent")
        .and_then(|ns| ns.seal())
        .expect("seal parent");

    for name in ["child", "other-child"] {
        let result = registry
            .namespace("parent")
            .and_then(|ns| ns.create(name, false, None));
        assert!(result.is_none(), "{name} must not be created");
        assert!(matches!(
            registry.last_error(),
            Some(RegistryError::State(_))
        ));
    }

    // Lazy creation through a sealed intermediate fails the same way.
    assert!(registry.namespace("parent.deep.path").is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::State(_))
    ));
}

#[test]
fn children_of_a_sealed_parent_stay_independently_mutable() {
    let registry = Registry::new();
    registry
        .namespace("top.kid")
        .expect("create both levels while open");
    registry
        .namespace("top")
        .and_then(|ns| ns.seal())
        .expect("seal top only");

    let ran = registry
        .namespace("top.kid")
        .and_then(|ns| {
            ns.code(|_importer, _system, exports| {
                exports.insert("still_open", Export::value(json!(true)));
            })
        })
        .and_then(|ns| ns.seal())
        .is_some();
    assert!(ran, "sealing does not cascade to existing children");
}

#[test]
fn join_is_idempotent_and_access_redeclaration_is_rejected() {
    let registry = Registry::new();
    registry
        .namespace("lib")
        .and_then(|ns| ns.protected("net"))
        .expect("create lib.net");

    // Same access, joined again: same node, no error.
    let rejoined = registry
        .namespace("lib")
        .and_then(|ns| ns.protected("net"))
        .expect("idempotent join");
    assert_eq!(rejoined.access(), AccessLevel::Protected);

    // Redeclaring with a different level is a state error.
    let conflicting = registry.namespace("lib").and_then(|ns| ns.public("net"));
    assert!(conflicting.is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::State(_))
    ));

    // Plain create (join = false) on an existing name fails too.
    let duplicate = registry
        .namespace("lib")
        .and_then(|ns| ns.create("net", false, None));
    assert!(duplicate.is_none());
}

#[test]
fn code_is_rejected_on_sealed_namespaces() {
    let registry = Registry::new();
    registry
        .namespace("done")
        .and_then(|ns| ns.seal())
        .expect("seal");

    let result = registry.namespace("done").and_then(|ns| {
        ns.code(|_importer, _system, _exports| {
            panic!("registrant must not run on a sealed namespace");
        })
    });
    assert!(result.is_none());
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::State(_))
    ));
}

#[test]
fn blank_path_segments_always_fail() {
    let registry = Registry::new();
    registry.namespace("a.b").expect("seed the tree");

    for path in ["a..b", ".a", "a.", "a. .b"] {
        assert!(registry.namespace(path).is_none(), "{path}");
        assert!(matches!(
            registry.last_error(),
            Some(RegistryError::Syntax(_))
        ));
    }
}

#[test]
fn system_namespace_designation_distributes_a_frozen_snapshot() {
    let registry = Registry::new();

    registry
        .namespace("kernel")
        .and_then(|ns| {
            ns.code(|_importer, system, exports| {
                exports.insert("answer", Export::value(json!(42)));
                match system {
                    warren::SystemAccess::Unset(designator) => {
                        assert_eq!(designator.path(), "kernel");
                        let snapshot = designator.designate();
                        assert!(snapshot.contains("answer"));
                    }
                    warren::SystemAccess::Ready(_) => {
                        panic!("nothing designated yet")
                    }
                }
            })
        })
        .and_then(|ns| ns.seal())
        .expect("kernel registration");

    let observed = registry
        .namespace("app")
        .and_then(|ns| {
            ns.code(|_importer, system, _exports| {
                let snapshot = system.snapshot().expect("system namespace is designated");
                assert_eq!(
                    snapshot.get("answer").and_then(|e| e.as_value()).cloned(),
                    Some(json!(42))
                );
            })
        })
        .is_some();
    assert!(observed);
}

#[test]
fn seal_system_is_idempotent_for_the_same_namespace() {
    let registry = Registry::new();
    registry
        .namespace("kernel")
        .and_then(|ns| ns.seal_system())
        .and_then(|ns| ns.seal_system())
        .expect("same namespace may re-designate");
}

#[test]
#[should_panic(expected = "system namespace can only be set once")]
fn conflicting_system_designation_panics() {
    let registry = Registry::new();
    registry
        .namespace("first")
        .and_then(|ns| ns.seal_system())
        .expect("first designation");
    let _ = registry
        .namespace("second")
        .and_then(|ns| ns.seal_system());
}

#[test]
fn missing_symbols_resolve_absent_by_default_and_fail_when_strict() {
    let registry = Registry::new();
    sealed_public(&registry, "util", &[("present", Export::value(json!(1)))]);

    let lenient = registry
        .namespace("app")
        .and_then(|ns| {
            ns.code_with_imports(&["util: present, missing"], |_system, _own, imports| {
                assert_eq!(imports.len(), 2);
                assert!(imports[0].as_symbol().is_some());
                assert!(imports[1].as_symbol().is_none());
                assert!(matches!(&imports[1], Resolved::Symbol { name, .. } if name == "missing"));
            })
        })
        .is_some();
    assert!(lenient);

    let strict = Registry::with_config(RegistryConfig {
        strict_imports: true,
    });
    sealed_public(&strict, "util", &[("present", Export::value(json!(1)))]);
    let result = strict.namespace("app").and_then(|ns| {
        ns.code_with_imports(&["util: present, missing"], |_system, _own, _imports| {
            panic!("strict mode must fail before the registrant runs");
        })
    });
    assert!(result.is_none());
    assert!(matches!(
        strict.last_error(),
        Some(RegistryError::NotFound(_))
    ));
}

#[test]
fn importer_capability_respects_the_calling_path() {
    let registry = Registry::new();
    registry
        .namespace("a")
        .and_then(|ns| ns.protected("b"))
        .and_then(|ns| {
            ns.code(|_importer, _system, exports| {
                exports.insert("token", Export::value(json!("t")));
            })
        })
        .expect("a.b registration");
    registry.namespace("a.b.inner").expect("create nested caller");
    registry
        .namespace("a.b")
        .and_then(|ns| ns.seal())
        .expect("seal a.b");

    registry
        .namespace("a.b.inner")
        .and_then(|ns| {
            ns.code(|importer, _system, _exports| {
                assert_eq!(importer.caller_path(), "a.b.inner");
                let snap = importer.namespace("a.b").expect("nested caller imports");
                assert!(snap.contains("token"));
                let token = importer.symbol("a.b", "token").expect("single symbol");
                assert_eq!(token.as_value(), Some(&json!("t")));
            })
        })
        .expect("nested registrant");

    registry
        .namespace("outsider")
        .and_then(|ns| {
            ns.code(|importer, _system, _exports| {
                assert!(importer.namespace("a.b").is_none());
            })
        })
        .expect("outsider registrant runs, its import fails");
    assert!(matches!(
        registry.last_error(),
        Some(RegistryError::Access(_))
    ));
}

#[test]
fn whole_namespace_imports_are_ordered_with_symbol_imports() {
    let registry = Registry::new();
    sealed_public(&registry, "m1", &[("a", Export::value(json!(1)))]);
    sealed_public(
        &registry,
        "m2",
        &[
            ("x", Export::value(json!("x"))),
            ("y", Export::value(json!("y"))),
        ],
    );

    registry
        .namespace("app")
        .and_then(|ns| {
            ns.code_with_imports(&["m2: y, x", "m1"], |_system, _own, imports| {
                assert_eq!(imports.len(), 3);
                assert!(matches!(&imports[0], Resolved::Symbol { name, .. } if name == "y"));
                assert!(matches!(&imports[1], Resolved::Symbol { name, .. } if name == "x"));
                let snap = imports[2].as_namespace().expect("m1 as a whole");
                assert!(snap.contains("a"));
            })
        })
        .expect("ordered imports");
}

#[test]
fn version_and_describe_report_registry_shape() {
    let registry = Registry::new();
    assert_eq!(Registry::version(), [1, 0, 0]);

    registry
        .namespace("acme.net")
        .and_then(|ns| {
            ns.code(|_importer, _system, exports| {
                exports.insert("get", Export::value(json!("fn")));
            })
        })
        .and_then(|ns| ns.seal())
        .expect("acme.net registration");

    let description = registry.describe();
    assert_eq!(description["system_designated"], json!(false));
    let net = &description["namespaces"]["acme"]["children"]["net"];
    assert_eq!(net["sealed"], json!(true));
    assert_eq!(net["access"], json!("public"));
    assert_eq!(net["exports"], json!(["get"]));
}
