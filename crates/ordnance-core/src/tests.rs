#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::constants::*;
    use crate::content::ContentPack;
    use crate::descriptor::*;
    use crate::enums::*;
    use crate::error::{ContentError, ReplicationError};
    use crate::events::FxEvent;
    use crate::message::CreateProjectile;
    use crate::registry::DescriptorRegistry;
    use crate::types::*;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    // ---- Range ----

    #[test]
    fn test_range_without_drag_is_speed_times_lifetime() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                lifetime: 40.0,
                ..BehaviorDescriptor::new("slug", 5.0, 9.0)
            })
            .unwrap();
        assert!(approx(d.range, 200.0, 1e-4), "range was {}", d.range);
    }

    #[test]
    fn test_range_with_drag_matches_closed_form() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                drag: 0.05,
                lifetime: 60.0,
                ..BehaviorDescriptor::new("flak", 4.0, 1.0)
            })
            .unwrap();
        let expected = 4.0 * (1.0 - 0.95f32.powf(60.0)) / 0.05;
        assert!(approx(d.range, expected, 1e-3));

        // Summing the per-tick decay converges on the same figure.
        let mut speed = 4.0f32;
        let mut travelled = 0.0f32;
        for _ in 0..60 {
            travelled += speed;
            speed *= 0.95;
        }
        assert!(approx(d.range, travelled, 1e-2), "{} vs {}", d.range, travelled);
    }

    #[test]
    fn test_range_override_and_floor() {
        let mut registry = DescriptorRegistry::new();
        let overridden = registry
            .register(BehaviorDescriptor {
                range_override: 123.0,
                max_range: 500.0,
                ..BehaviorDescriptor::new("a", 5.0, 1.0)
            })
            .unwrap();
        assert_eq!(overridden.range, 123.0);

        let floored = registry
            .register(BehaviorDescriptor {
                max_range: 500.0,
                ..BehaviorDescriptor::new("b", 5.0, 1.0)
            })
            .unwrap();
        assert_eq!(floored.range, 500.0);

        let unit = registry
            .register(BehaviorDescriptor {
                spawn_unit: Some(UnitSpawnSpec {
                    kind: UnitKindId(3),
                    speed: 2.0,
                    lifetime: 90.0,
                }),
                ..BehaviorDescriptor::new("c", 5.0, 1.0)
            })
            .unwrap();
        assert_eq!(unit.range, 180.0);
    }

    // ---- Finalize ----

    #[test]
    fn test_pierce_cap_forces_pierce() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                pierce_cap: 3,
                ..BehaviorDescriptor::new("needle", 6.0, 4.0)
            })
            .unwrap();
        assert!(d.pierce);
        assert!(!d.pierce_building, "building pierce stays opt-in");
    }

    #[test]
    fn test_chain_defaults_status_and_despawn_hit() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                chain: Some(ChainSpec::new(3, 8)),
                ..BehaviorDescriptor::new("arc", 3.0, 12.0)
            })
            .unwrap();
        assert_eq!(d.status, StatusEffect::Shocked);
        assert!(d.despawn_hit);
        let strike = d.chain.as_ref().unwrap().strike_descriptor().unwrap();
        assert_eq!(strike.name, CHAIN_STRIKE);

        let explicit = registry
            .register(BehaviorDescriptor {
                status: StatusEffect::Burning,
                collides_air: false,
                chain: Some(ChainSpec::new(1, 4)),
                ..BehaviorDescriptor::new("ground-arc", 3.0, 12.0)
            })
            .unwrap();
        assert_eq!(explicit.status, StatusEffect::Burning, "explicit status kept");
        let strike = explicit.chain.as_ref().unwrap().strike_descriptor().unwrap();
        assert_eq!(strike.name, CHAIN_STRIKE_GROUND);
        assert!(!strike.collides_air);
    }

    #[test]
    fn test_set_defaults_false_skips_default_rules() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                set_defaults: false,
                splash: Some(SplashSpec {
                    damage: 10.0,
                    radius: 20.0,
                    scaled: false,
                }),
                ..BehaviorDescriptor::new("quiet", 3.0, 1.0)
            })
            .unwrap();
        assert!(!d.despawn_hit);
    }

    #[test]
    fn test_splash_forces_despawn_hit() {
        let mut registry = DescriptorRegistry::new();
        let d = registry
            .register(BehaviorDescriptor {
                splash: Some(SplashSpec {
                    damage: 10.0,
                    radius: 20.0,
                    scaled: false,
                }),
                ..BehaviorDescriptor::new("shell", 3.0, 1.0)
            })
            .unwrap();
        assert!(d.despawn_hit);
        assert_eq!(d.splash_radius(), 20.0);
    }

    #[test]
    fn test_light_radius_and_draw_size_derived() {
        let mut registry = DescriptorRegistry::new();
        let small = registry
            .register(BehaviorDescriptor {
                hit_size: 3.0,
                ..BehaviorDescriptor::new("small", 2.0, 1.0)
            })
            .unwrap();
        assert_eq!(small.presentation.light_radius, LIGHT_RADIUS_MIN);

        let big = registry
            .register(BehaviorDescriptor {
                hit_size: 10.0,
                trail: TrailSpec {
                    length: 20,
                    ..Default::default()
                },
                ..BehaviorDescriptor::new("big", 3.0, 1.0)
            })
            .unwrap();
        assert_eq!(big.presentation.light_radius, 50.0);
        assert_eq!(big.draw_size, 120.0);
    }

    #[test]
    fn test_frag_child_never_inherits_velocity() {
        let mut registry = DescriptorRegistry::new();
        let child = registry
            .register(BehaviorDescriptor::new("shard", 2.0, 3.0))
            .unwrap();
        assert!(child.keep_velocity);
        let parent = registry
            .register(BehaviorDescriptor {
                frag: Some(FragSpec::new(DescriptorLink::to(Arc::clone(&child)), 9)),
                ..BehaviorDescriptor::new("cluster", 3.0, 1.0)
            })
            .unwrap();
        let spawned = parent.frag.as_ref().unwrap().child().unwrap();
        assert!(!spawned.keep_velocity);
        assert!(spawned.id.is_some(), "variant has its own identity");
        assert_ne!(spawned.id, child.id);
        assert!(child.keep_velocity, "shared child untouched");

        // The variant is memoized per source descriptor.
        let again = registry.without_velocity_inheritance(&child).unwrap();
        assert!(Arc::ptr_eq(spawned, &again));
    }

    #[test]
    fn test_finalize_runs_once() {
        let mut registry = DescriptorRegistry::new();
        let mut d = BehaviorDescriptor::new("once", 2.0, 1.0);
        d.finalize(&mut registry).unwrap();
        assert!(d.is_finalized());
        d.speed = 100.0;
        d.finalize(&mut registry).unwrap();
        assert_eq!(d.range, 80.0, "second finalize must not recompute");
    }

    #[test]
    fn test_struct_update_literal_starts_unfinalized() {
        let literal = BehaviorDescriptor {
            pierce_cap: 2,
            ..BehaviorDescriptor::new("literal", 2.0, 1.0)
        };
        assert!(!literal.is_finalized());

        let mut registry = DescriptorRegistry::new();
        let registered = registry.register(literal).unwrap();
        assert!(registered.is_finalized());
        assert!(registered.pierce, "finalize ran on the literal");

        let strike = registry.chain_strike(true).unwrap();
        assert!(strike.is_finalized());
        assert!(strike.id.is_some());
    }

    // ---- Registry ----

    #[test]
    fn test_registry_builtins_and_ids() {
        let mut registry = DescriptorRegistry::new();
        assert_eq!(registry.len(), 2);
        let d = registry
            .register(BehaviorDescriptor::new("first", 1.0, 1.0))
            .unwrap();
        assert_eq!(d.id, Some(DescriptorId(2)));
        assert!(Arc::ptr_eq(registry.get(DescriptorId(2)).unwrap(), &d));
        assert!(registry.get(DescriptorId(99)).is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = DescriptorRegistry::new();
        registry
            .register(BehaviorDescriptor::new("dup", 1.0, 1.0))
            .unwrap();
        let err = registry
            .register(BehaviorDescriptor::new("dup", 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateName(name) if name == "dup"));
    }

    #[test]
    fn test_derive_produces_independent_descriptor() {
        let mut registry = DescriptorRegistry::new();
        let base = registry
            .register(BehaviorDescriptor::new("base", 4.0, 10.0))
            .unwrap();
        let long = registry
            .derive(&base, "base-long", |d| d.range_override = 400.0)
            .unwrap();
        assert_ne!(long.id, base.id);
        assert_eq!(long.range, 400.0);
        assert_eq!(base.range, 160.0, "base unchanged");
        assert!(long.is_finalized());
    }

    // ---- Estimates ----

    #[test]
    fn test_estimate_damage_counts_splash_and_frags() {
        let mut registry = DescriptorRegistry::new();
        let shard = registry
            .register(BehaviorDescriptor::new("shard", 2.0, 4.0))
            .unwrap();
        let shell = registry
            .register(BehaviorDescriptor {
                splash: Some(SplashSpec {
                    damage: 20.0,
                    radius: 16.0,
                    scaled: false,
                }),
                frag: Some(FragSpec::new(DescriptorLink::to(shard), 6)),
                ..BehaviorDescriptor::new("shell", 3.0, 10.0)
            })
            .unwrap();
        // 10 + 20 * 0.75 + 4 * 6 / 2
        assert!(approx(shell.estimate_damage(), 37.0, 1e-4));
    }

    // ---- Content ----

    #[test]
    fn test_content_pack_resolves_forward_references() {
        let json = r#"{
            "descriptors": [
                { "name": "cluster", "speed": 3, "damage": 5,
                  "frag": { "bullet": "shard", "count": 4 } },
                { "name": "shard", "speed": 2, "damage": 1, "lifetime": 20 }
            ]
        }"#;
        let mut registry = DescriptorRegistry::new();
        let loaded = ContentPack::from_json(json)
            .unwrap()
            .load_into(&mut registry)
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "cluster");
        let frag = loaded[0].frag.as_ref().unwrap();
        assert_eq!(frag.count, 4);
        assert_eq!(frag.bullet.get().unwrap().name, "shard");
        assert!(loaded[0].despawn_hit);
    }

    #[test]
    fn test_content_pack_rejects_self_fragment() {
        let json = r#"{ "descriptors": [
            { "name": "ouroboros", "frag": { "bullet": "ouroboros" } }
        ] }"#;
        let mut registry = DescriptorRegistry::new();
        let err = ContentPack::from_json(json)
            .unwrap()
            .load_into(&mut registry)
            .unwrap_err();
        match err {
            ContentError::CyclicReference(path) => {
                assert_eq!(path, vec!["ouroboros".to_string(), "ouroboros".to_string()])
            }
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn test_content_pack_rejects_longer_cycle() {
        let json = r#"{ "descriptors": [
            { "name": "a", "frag": { "bullet": "b" } },
            { "name": "b", "chain": { "count": 1, "strike": "c" } },
            { "name": "c", "spawn_bullets": ["a"] }
        ] }"#;
        let mut registry = DescriptorRegistry::new();
        let err = ContentPack::from_json(json)
            .unwrap()
            .load_into(&mut registry)
            .unwrap_err();
        assert!(matches!(err, ContentError::CyclicReference(ref p) if p.len() == 4));
    }

    #[test]
    fn test_content_pack_unknown_reference() {
        let json = r#"{ "descriptors": [ { "name": "a", "frag": { "bullet": "ghost" } } ] }"#;
        let mut registry = DescriptorRegistry::new();
        let err = ContentPack::from_json(json)
            .unwrap()
            .load_into(&mut registry)
            .unwrap_err();
        assert!(matches!(err, ContentError::UnknownReference { ref to, .. } if to == "ghost"));
    }

    #[test]
    fn test_content_pack_bad_json() {
        assert!(matches!(
            ContentPack::from_json("{ not json"),
            Err(ContentError::Parse(_))
        ));
    }

    // ---- Replication message ----

    #[test]
    fn test_create_message_round_trip() {
        let msg = CreateProjectile {
            descriptor: DescriptorId(517),
            team: Team(7),
            x: -12.25,
            y: 3.5e4,
            angle: 271.125,
            damage: -1.0,
            velocity_scale: 0.875,
            lifetime_scale: 1.5,
        };
        let bytes = msg.encode();
        assert_eq!(bytes.len(), CreateProjectile::ENCODED_LEN);
        let back = CreateProjectile::decode(&bytes).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.damage_override(), None);
    }

    #[test]
    fn test_create_message_rejects_wrong_length() {
        let bytes = [0u8; 26];
        assert_eq!(
            CreateProjectile::decode(&bytes),
            Err(ReplicationError::LengthMismatch {
                expected: 27,
                actual: 26
            })
        );
    }

    // ---- Events ----

    #[test]
    fn test_fx_event_serde_tagged() {
        let ev = FxEvent::Shake {
            intensity: 2.0,
            duration: 2.0,
            position: glam::Vec2::new(1.0, 2.0),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"Shake\""));
        let back: FxEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_status_effect_serde_kebab() {
        let json = serde_json::to_string(&StatusEffect::Shocked).unwrap();
        assert_eq!(json, "\"shocked\"");
        let back: LiquidKind = serde_json::from_str("\"cryofluid\"").unwrap();
        assert_eq!(back, LiquidKind::Cryofluid);
    }

    // ---- Time ----

    #[test]
    fn test_sim_time_tracks_ticks_and_seconds() {
        let mut time = SimTime::default();
        for _ in 0..60 {
            time.advance(1.0);
        }
        time.advance(0.5);
        assert_eq!(time.tick, 61);
        assert!((time.elapsed_ticks - 60.5).abs() < 1e-9);
        assert!((time.elapsed_secs() - 60.5 / 60.0).abs() < 1e-9);
    }
}
