use holosync_shared::{CarrierKind, DamageSource, Position, ViewerId};
use holosync_server::RenderState;
use holosync_test::TestHost;

fn active_host() -> TestHost {
    TestHost::builder().loaded_chunk(0, 0).build()
}

#[test]
fn active_carriers_survive_every_host_hook() {
    let mut test = active_host();
    let kinds = [
        (CarrierKind::Text, RenderState::text("text")),
        (CarrierKind::Item, RenderState::Item(holosync_shared::ItemStack::new(1, 1))),
        (CarrierKind::Mount, RenderState::Mount),
    ];
    let mut handles = Vec::new();
    for (kind, render) in kinds {
        handles.push(test.spawn(kind, Position::new(3.0, 70.0, 3.0), render).unwrap());
    }

    for handle in &handles {
        let hooks = test.manager.host_hooks_mut(handle).unwrap();
        for _ in 0..100 {
            hooks.tick();
            hooks.inactive_tick();
            hooks.apply_physics(0.08);
        }
        hooks.damage(&DamageSource::Environment("void".to_string()), f32::MAX);
        hooks.damage(&DamageSource::Player(ViewerId::new(1)), 20.0);
        hooks.play_sound("entity.generic.hurt", 1.0, 1.0);
        hooks.set_custom_name(None);
        hooks.set_custom_name_visible(false);
        hooks.die();
        assert!(hooks.save().is_none());
        assert!(!hooks.is_collidable());

        let carrier = test.manager.carrier(handle).unwrap();
        assert!(carrier.is_active(), "{} should still be active", handle);
        assert!(!carrier.is_dead());
        assert_eq!(carrier.position(), Position::new(3.0, 70.0, 3.0));
    }
}

#[test]
fn host_cannot_rename_text_carrier() {
    let mut test = active_host();
    let handle = test.spawn_text(Position::new(1.0, 64.0, 1.0), "Shop").unwrap();

    let hooks = test.manager.host_hooks_mut(&handle).unwrap();
    hooks.set_custom_name(Some("Hijacked".into()));

    let carrier = test.manager.carrier(&handle).unwrap();
    assert_eq!(carrier.custom_name().map(|name| name.plain_text()), Some("Shop".to_string()));
    assert!(carrier.is_custom_name_visible());
}

#[test]
fn player_hit_is_reported_as_touch() {
    let mut test = active_host();
    let handle = test.spawn_text(Position::new(1.0, 64.0, 1.0), "Touch me").unwrap();

    let touch = test
        .manager
        .host_hooks_mut(&handle)
        .unwrap()
        .damage(&DamageSource::Player(ViewerId::new(9)), 5.0)
        .unwrap();

    assert_eq!(touch.viewer, ViewerId::new(9));
    assert_eq!(touch.entity, handle.id());
}
