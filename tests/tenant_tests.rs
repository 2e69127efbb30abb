//! Tenant isolation, authentication and role gating

mod common;

use common::*;
use hunter::core::error::ShopError;
use hunter::core::tenant::{CompanyFilter, RequestContext, Role};
use hunter::engine::{company, customer, estimate, settings, vehicle};
use hunter::entities::company::{CompanyPatch, NewCompany, NewUser};
use hunter::entities::customer::CustomerInput;
use hunter::entities::estimate::{EstimateFilter, NewEstimate};
use hunter::entities::settings::SettingsInput;
use hunter::entities::vehicle::VehicleInput;

#[test]
fn test_cross_tenant_access_is_not_found() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let south = create_shop(&mut store, &root, "south");
    let ana = create_customer(&mut store, &north, "Ana");

    let err = customer::get(&store, &south, &ana.id).unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }), "{err:?}");

    let err = customer::update(
        &mut store,
        &south,
        &ana.id,
        CustomerInput {
            first_name: "Mallory".to_string(),
            last_name: "X".to_string(),
            phone: "0".to_string(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));

    let err = customer::delete(&mut store, &south, &ana.id).unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));

    assert!(customer::list(&store, &south, None).unwrap().is_empty());
    let still_there = customer::get(&store, &north, &ana.id).unwrap();
    assert_eq!(still_there.customer.first_name, "Ana");
}

#[test]
fn test_cannot_reference_other_tenant_rows() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let south = create_shop(&mut store, &root, "south");
    let ana = create_customer(&mut store, &north, "Ana");
    let car = create_vehicle(&mut store, &north, &ana);

    let err = vehicle::create(
        &mut store,
        &south,
        VehicleInput {
            customer_id: Some(ana.id.clone()),
            year: Some(2020),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));

    let err = estimate::create(
        &mut store,
        &south,
        NewEstimate {
            customer_id: Some(ana.id.clone()),
            vehicle_id: Some(car.id.clone()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { .. }));
}

#[test]
fn test_super_admin_sees_every_tenant_without_override() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let south = create_shop(&mut store, &root, "south");
    create_customer(&mut store, &north, "Ana");
    create_customer(&mut store, &south, "Beto");

    assert_eq!(root.company_filter(), CompanyFilter::All);
    let all = customer::list(&store, &root, None).unwrap();
    assert_eq!(all.len(), 2);

    let scoped = root
        .clone()
        .with_override(Some(north.identity.company_id.clone()));
    let only_north = customer::list(&store, &scoped, None).unwrap();
    assert_eq!(only_north.len(), 1);
    assert_eq!(only_north[0].customer.first_name, "Ana");
}

#[test]
fn test_super_admin_creates_in_own_company_unless_overridden() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");

    let own = create_customer(&mut store, &root, "Root");
    assert_eq!(own.company_id, root.identity.company_id);

    let scoped = root
        .clone()
        .with_override(Some(north.identity.company_id.clone()));
    let placed = create_customer(&mut store, &scoped, "Placed");
    assert_eq!(placed.company_id, north.identity.company_id);
    assert!(customer::get(&store, &north, &placed.id).is_ok());
}

#[test]
fn test_override_is_ignored_for_regular_users() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let south = create_shop(&mut store, &root, "south");
    create_customer(&mut store, &south, "Beto");

    let sneaky = north
        .clone()
        .with_override(Some(south.identity.company_id.clone()));
    assert_eq!(sneaky.company_id(), north.identity.company_id);
    assert!(customer::list(&store, &sneaky, None).unwrap().is_empty());

    let mine = create_customer(&mut store, &sneaky, "Ana");
    assert_eq!(mine.company_id, north.identity.company_id);
}

#[test]
fn test_estimate_list_is_scoped() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let south = create_shop(&mut store, &root, "south");
    for ctx in [&north, &south] {
        let c = create_customer(&mut store, ctx, "Ana");
        let v = create_vehicle(&mut store, ctx, &c);
        estimate::create(
            &mut store,
            ctx,
            NewEstimate {
                customer_id: Some(c.id),
                vehicle_id: Some(v.id),
                ..Default::default()
            },
        )
        .unwrap();
    }

    let filter = EstimateFilter::default();
    assert_eq!(estimate::list(&store, &north, &filter).unwrap().len(), 1);
    let all = estimate::list(&store, &root, &filter).unwrap();
    assert_eq!(all.len(), 2);
    let companies: Vec<&str> = all.iter().map(|e| e.company_name.as_str()).collect();
    assert!(companies.contains(&"north Motors"));
    assert!(companies.contains(&"south Motors"));
}

#[test]
fn test_authentication_rules() {
    let (mut store, root) = setup_store();
    create_shop(&mut store, &root, "north");

    assert!(company::authenticate(store.conn(), "ADMIN@north.test", "shop-pass").is_ok());
    assert!(matches!(
        company::authenticate(store.conn(), "admin@north.test", "wrong"),
        Err(ShopError::NotAuthenticated)
    ));
    assert!(matches!(
        company::authenticate(store.conn(), "nobody@north.test", "shop-pass"),
        Err(ShopError::NotAuthenticated)
    ));
}

#[test]
fn test_inactive_company_blocks_login() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");

    company::update(
        &mut store,
        &root,
        &north.identity.company_id,
        CompanyPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(matches!(
        company::authenticate(store.conn(), "admin@north.test", "shop-pass"),
        Err(ShopError::NotAuthenticated)
    ));
}

#[test]
fn test_company_admin_ops_require_super_admin() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");

    let err = company::list(&store, &north).unwrap_err();
    assert!(matches!(err, ShopError::Forbidden { required: Role::SuperAdmin }));

    let err = company::create(
        &mut store,
        &north,
        NewCompany {
            name: "Rogue".to_string(),
            slug: "rogue".to_string(),
            admin_name: None,
            admin_email: "r@rogue.test".to_string(),
            admin_password: "x".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ShopError::Forbidden { .. }));

    assert_eq!(company::list(&store, &root).unwrap().len(), 2);
}

#[test]
fn test_company_slug_and_email_conflicts() {
    let (mut store, root) = setup_store();
    create_shop(&mut store, &root, "north");

    let dup_slug = company::create(
        &mut store,
        &root,
        NewCompany {
            name: "North Again".to_string(),
            slug: "north".to_string(),
            admin_name: None,
            admin_email: "other@north.test".to_string(),
            admin_password: "x".to_string(),
        },
    );
    assert!(matches!(dup_slug, Err(ShopError::Conflict(_))));

    let dup_email = company::create(
        &mut store,
        &root,
        NewCompany {
            name: "East".to_string(),
            slug: "east".to_string(),
            admin_name: None,
            admin_email: "Admin@North.test".to_string(),
            admin_password: "x".to_string(),
        },
    );
    assert!(matches!(dup_email, Err(ShopError::Conflict(_))));

    let bad_slug = company::create(
        &mut store,
        &root,
        NewCompany {
            name: "West".to_string(),
            slug: "West Side".to_string(),
            admin_name: None,
            admin_email: "w@west.test".to_string(),
            admin_password: "x".to_string(),
        },
    );
    assert!(matches!(bad_slug, Err(ShopError::ValidationFailed(_))));
}

#[test]
fn test_company_delete_cascades_and_protects_own() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    let ana = create_customer(&mut store, &north, "Ana");
    create_vehicle(&mut store, &north, &ana);

    let err = company::delete(&mut store, &root, &root.identity.company_id).unwrap_err();
    assert!(matches!(err, ShopError::ValidationFailed(_)));

    company::delete(&mut store, &root, &north.identity.company_id).unwrap();
    assert!(customer::list(&store, &root, None).unwrap().is_empty());
    assert!(vehicle::list(&store, &root, None, None).unwrap().is_empty());
    assert!(company::authenticate(store.conn(), "admin@north.test", "shop-pass").is_err());
}

fn add_tech(store: &mut hunter::store::Store, root: &RequestContext, shop: &RequestContext) -> RequestContext {
    company::add_user(
        store,
        root,
        &shop.identity.company_id,
        NewUser {
            name: "Tito".to_string(),
            email: "tito@north.test".to_string(),
            password: "wrench".to_string(),
            role: Some(Role::Tech),
        },
    )
    .unwrap();
    RequestContext::new(company::authenticate(store.conn(), "tito@north.test", "wrench").unwrap())
}

#[test]
fn test_settings_lazy_create_and_admin_update() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    store
        .conn()
        .execute("DELETE FROM shop_settings", [])
        .unwrap();

    let lazy = settings::get(&mut store, &north).unwrap();
    assert_eq!(lazy.tax_rate, d("11.5"));
    assert_eq!(lazy.labor_rate, d("85.00"));
    assert_eq!(lazy.company_id, north.identity.company_id);

    let updated = settings::update(
        &mut store,
        &north,
        SettingsInput {
            shop_name: Some("North Motors".to_string()),
            tax_rate: Some(d("7")),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.tax_rate, d("7"));
    assert_eq!(updated.labor_rate, d("85.00"));
    assert_eq!(updated.id, lazy.id);

    let tech = add_tech(&mut store, &root, &north);
    let err = settings::update(&mut store, &tech, SettingsInput::default()).unwrap_err();
    assert!(matches!(err, ShopError::Forbidden { required: Role::Admin }));
    assert_eq!(settings::get(&mut store, &tech).unwrap().tax_rate, d("7"));
}

#[test]
fn test_new_estimate_uses_shop_tax_rate() {
    let (mut store, root) = setup_store();
    let north = create_shop(&mut store, &root, "north");
    settings::update(
        &mut store,
        &north,
        SettingsInput {
            tax_rate: Some(d("6.25")),
            ..Default::default()
        },
    )
    .unwrap();
    let ana = create_customer(&mut store, &north, "Ana");
    let car = create_vehicle(&mut store, &north, &ana);

    let detail = estimate::create(
        &mut store,
        &north,
        NewEstimate {
            customer_id: Some(ana.id),
            vehicle_id: Some(car.id),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(detail.estimate.tax_rate, d("6.25"));
}
