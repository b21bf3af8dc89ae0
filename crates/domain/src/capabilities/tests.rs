use proptest::prelude::*;

use crate::{
    Capabilities, Capability, Permission, PermissionPredicate, PermissionSet, PropertyLimit,
    Subscription, SubscriptionTier, User, UserId, resolve_capabilities,
};

fn permissions(names: &[Permission]) -> PermissionSet {
    PermissionSet::from(names)
}

fn client(plan: Option<&str>, granted: &[Permission]) -> User {
    let user = User::new(UserId::new("c-1"), "CLIENT").with_permissions(permissions(granted));
    match plan {
        Some(name) => user.with_subscription(Subscription::new(name, "active")),
        None => user,
    }
}

fn assert_admin(capabilities: &Capabilities) {
    assert!(capabilities.can_create_properties());
    assert!(capabilities.can_manage_properties());
    assert!(capabilities.can_view_properties());
    assert!(capabilities.can_make_reservations());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Unbounded);
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Admin);
    assert!(capabilities.has_permission("anything_at_all"));
}

#[test]
fn staff_flag_on_client_role_yields_admin_capabilities() {
    let user = client(Some("Básica"), &[]).with_staff(true);
    assert_admin(&resolve_capabilities(&user));
}

#[test]
fn superuser_flag_ignores_empty_role() {
    let user = User::new(UserId::new("root"), "").with_superuser(true);
    assert_admin(&resolve_capabilities(&user));
}

#[test]
fn locale_admin_role_is_privileged_without_flags() {
    let user = User::new(UserId::new("a-1"), "Administrador");
    let capabilities = resolve_capabilities(&user);
    assert_admin(&capabilities);
    assert!(capabilities.is_privileged());
    assert_eq!(capabilities, Capabilities::admin());
}

#[test]
fn basic_plan_blocks_publishing_despite_grant() {
    let capabilities = resolve_capabilities(&client(
        Some("BÁSICA"),
        &[Permission::PropertyWrite, Permission::PropertyRead],
    ));

    assert!(!capabilities.can_create_properties());
    assert!(!capabilities.can_manage_properties());
    assert!(capabilities.can_view_properties());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(0));
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Basic);
    // The predicate still reflects the raw grant.
    assert!(capabilities.has(Permission::PropertyWrite));
}

#[test]
fn premium_plan_keeps_grants_and_caps_quota() {
    let capabilities = resolve_capabilities(&client(
        Some("Premium"),
        &[Permission::PropertyRead, Permission::PropertyWrite],
    ));

    assert!(capabilities.can_create_properties());
    assert!(capabilities.can_manage_properties());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(5));
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Premium);
    assert!(capabilities.can_add_property(4));
    assert!(!capabilities.can_add_property(5));
}

#[test]
fn premium_plan_without_grant_cannot_publish() {
    let capabilities = resolve_capabilities(&client(Some("premium"), &[]));
    assert!(!capabilities.can_create_properties());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(5));
    assert!(!capabilities.can_add_property(0));
}

#[test]
fn esmeralda_plan_is_unbounded_but_still_permission_gated() {
    let capabilities =
        resolve_capabilities(&client(Some("Esmeralda"), &[Permission::ReservationWrite]));

    assert!(capabilities.can_make_reservations());
    assert!(!capabilities.can_create_properties());
    assert!(!capabilities.can_manage_properties());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Unbounded);
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Esmeralda);
}

#[test]
fn unrecognized_plan_falls_back_to_basic_restrictions() {
    let capabilities = resolve_capabilities(&client(
        Some("Oro"),
        &[Permission::PropertyWrite, Permission::ReservationWrite],
    ));

    assert!(!capabilities.can_create_properties());
    assert!(capabilities.can_make_reservations());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(0));
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Basic);
}

#[test]
fn client_without_subscription_keeps_base_values() {
    let capabilities = resolve_capabilities(&client(None, &[Permission::PropertyRead]));

    assert!(capabilities.can_view_properties());
    assert!(!capabilities.can_create_properties());
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(0));
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Basic);
}

#[test]
fn client_without_subscription_may_still_hold_create_grant() {
    let capabilities = resolve_capabilities(&client(None, &[Permission::PropertyWrite]));
    assert!(capabilities.can_create_properties());
    assert!(!capabilities.can_add_property(0));
}

#[test]
fn lower_case_client_role_skips_tier_override() {
    let user = User::new(UserId::new("c-2"), "client")
        .with_permissions(permissions(&[
            Permission::PropertyRead,
            Permission::PropertyWrite,
        ]))
        .with_subscription(Subscription::new("Premium", "active"));
    let capabilities = resolve_capabilities(&user);

    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Basic);
    assert_eq!(capabilities.property_limit(), PropertyLimit::Limited(0));
    assert!(capabilities.can_create_properties());
    assert!(capabilities.can_manage_properties());
}

#[test]
fn other_roles_ignore_subscription() {
    let user = User::new(UserId::new("h-1"), "HOST")
        .with_permissions(permissions(&[Permission::PropertyWrite]))
        .with_subscription(Subscription::new("Básica", "active"));
    let capabilities = resolve_capabilities(&user);

    assert!(capabilities.can_create_properties());
    assert!(!capabilities.can_manage_properties());
    assert_eq!(capabilities.subscription_tier(), SubscriptionTier::Basic);
}

#[test]
fn empty_user_resolves_to_restricted_set() {
    let capabilities = resolve_capabilities(&User::default());
    assert_eq!(capabilities, Capabilities::restricted());
    for capability in Capability::all() {
        assert!(!capabilities.allows(*capability));
    }
    assert!(!capabilities.has_permission("ver_propiedades"));
}

#[test]
fn capabilities_do_not_track_later_user_changes() {
    let user = client(Some("Premium"), &[Permission::PropertyWrite]);
    let before = resolve_capabilities(&user);

    let downgraded = user.with_subscription(Subscription::new("Básica", "active"));
    let after = resolve_capabilities(&downgraded);

    assert!(before.can_create_properties());
    assert!(!after.can_create_properties());
}

#[test]
fn capability_transport_values_roundtrip() {
    for capability in Capability::all() {
        assert_eq!(capability.as_str().parse::<Capability>().ok(), Some(*capability));
    }
    assert!("publish_everything".parse::<Capability>().is_err());
}

fn permission_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("cud_propiedad".to_owned()),
            Just("ver_propiedades".to_owned()),
            Just("cud_reserva".to_owned()),
            "[a-z_]{1,12}",
        ],
        0..6,
    )
}

fn plan_names() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("Básica".to_owned()),
        Just("PREMIUM".to_owned()),
        Just("esmeralda".to_owned()),
        "[A-Za-z ]{0,10}",
    ])
}

fn role_names() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CLIENT".to_owned()),
        Just("client".to_owned()),
        Just("HOST".to_owned()),
        Just(String::new()),
        "[A-Za-z]{0,10}",
    ]
}

fn build_user(
    role: String,
    is_superuser: bool,
    is_staff: bool,
    granted: Vec<String>,
    plan: Option<String>,
) -> User {
    let user = User::new(UserId::new("p-1"), role)
        .with_superuser(is_superuser)
        .with_staff(is_staff)
        .with_permissions(granted.into_iter().collect());
    match plan {
        Some(name) => user.with_subscription(Subscription::new(name, "active")),
        None => user,
    }
}

proptest! {
    #[test]
    fn privilege_flags_always_win(
        role in role_names(),
        superuser in any::<bool>(),
        granted in permission_names(),
        plan in plan_names(),
        probe in "[a-z_]{0,16}",
    ) {
        let user = build_user(role, superuser, !superuser, granted, plan);
        let capabilities = resolve_capabilities(&user);
        prop_assert_eq!(&capabilities, &Capabilities::admin());
        prop_assert!(capabilities.has_permission(probe.as_str()));
    }

    #[test]
    fn admin_role_in_any_casing_is_privileged(
        base in prop_oneof![
            Just("admin"),
            Just("superuser"),
            Just("administrator"),
            Just("administrador"),
        ],
        upper_mask in prop::collection::vec(any::<bool>(), 16),
        granted in permission_names(),
        plan in plan_names(),
    ) {
        let role: String = base
            .chars()
            .zip(upper_mask.iter().cycle())
            .map(|(character, upper)| {
                if *upper {
                    character.to_ascii_uppercase()
                } else {
                    character
                }
            })
            .collect();
        let user = build_user(role, false, false, granted, plan);
        prop_assert_eq!(resolve_capabilities(&user), Capabilities::admin());
    }

    #[test]
    fn resolution_is_idempotent(
        role in role_names(),
        superuser in any::<bool>(),
        staff in any::<bool>(),
        granted in permission_names(),
        plan in plan_names(),
        probes in prop::collection::vec("[a-z_]{0,16}", 0..8),
    ) {
        let user = build_user(role, superuser, staff, granted, plan);
        let first = resolve_capabilities(&user);
        let second = resolve_capabilities(&user);

        prop_assert_eq!(&first, &second);
        for probe in probes.iter().map(String::as_str).chain(
            Permission::all().iter().map(|permission| permission.as_str()),
        ) {
            prop_assert_eq!(first.has_permission(probe), second.has_permission(probe));
        }
    }

    #[test]
    fn view_and_reservation_follow_grants_for_non_privileged(
        role in role_names(),
        granted in permission_names(),
        plan in plan_names(),
    ) {
        let user = build_user(role, false, false, granted, plan);
        prop_assume!(!user.role().is_privileged());
        let capabilities = resolve_capabilities(&user);

        prop_assert_eq!(
            capabilities.can_view_properties(),
            user.permissions().contains("ver_propiedades")
        );
        prop_assert_eq!(
            capabilities.can_make_reservations(),
            user.permissions().contains("cud_reserva")
        );
        prop_assert!(!capabilities.is_privileged());
    }
}
