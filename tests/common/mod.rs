//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use rust_decimal::Decimal;
use tempfile::TempDir;

use hunter::core::tenant::RequestContext;
use hunter::engine::{company, customer, vehicle};
use hunter::entities::company::NewCompany;
use hunter::entities::customer::{Customer, CustomerInput};
use hunter::entities::vehicle::{Vehicle, VehicleInput};
use hunter::store::Store;

pub const ROOT_EMAIL: &str = "root@hunter.test";
pub const ROOT_PASSWORD: &str = "root-secret";

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// In-memory store with a bootstrapped super admin; returns its context
pub fn setup_store() -> (Store, RequestContext) {
    let mut store = Store::open_in_memory().unwrap();
    company::bootstrap(
        &mut store,
        NewCompany {
            name: "Hunter HQ".to_string(),
            slug: "hq".to_string(),
            admin_name: Some("Root".to_string()),
            admin_email: ROOT_EMAIL.to_string(),
            admin_password: ROOT_PASSWORD.to_string(),
        },
    )
    .unwrap()
    .unwrap();
    let identity = company::authenticate(store.conn(), ROOT_EMAIL, ROOT_PASSWORD).unwrap();
    (store, RequestContext::new(identity))
}

/// Create a tenant with an ADMIN and log in as that admin
pub fn create_shop(store: &mut Store, root: &RequestContext, slug: &str) -> RequestContext {
    let email = format!("admin@{}.test", slug);
    company::create(
        store,
        root,
        NewCompany {
            name: format!("{} Motors", slug),
            slug: slug.to_string(),
            admin_name: None,
            admin_email: email.clone(),
            admin_password: "shop-pass".to_string(),
        },
    )
    .unwrap();
    let identity = company::authenticate(store.conn(), &email, "shop-pass").unwrap();
    RequestContext::new(identity)
}

pub fn create_customer(store: &mut Store, ctx: &RequestContext, first: &str) -> Customer {
    customer::create(
        store,
        ctx,
        CustomerInput {
            first_name: first.to_string(),
            last_name: "Ortega".to_string(),
            phone: "787-555-0100".to_string(),
            email: Some(format!("{}@mail.test", first.to_lowercase())),
            ..Default::default()
        },
    )
    .unwrap()
}

pub fn create_vehicle(store: &mut Store, ctx: &RequestContext, owner: &Customer) -> Vehicle {
    vehicle::create(
        store,
        ctx,
        VehicleInput {
            customer_id: Some(owner.id.clone()),
            year: Some(2019),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            license_plate: Some("jkl123".to_string()),
            mileage: Some(48_000),
            ..Default::default()
        },
    )
    .unwrap()
}

/// Helper to get a hunter command bound to a database in `tmp`
pub fn hunter(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("hunter"));
    cmd.arg("--db")
        .arg(db_path(tmp))
        .env_remove("HUNTER_USER")
        .env_remove("HUNTER_PASSWORD")
        .env_remove("HUNTER_DB")
        .env_remove("HUNTER_LOG")
        .env("NO_COLOR", "1");
    cmd
}

pub fn db_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("hunter.db")
}

/// A hunter command logged in as the super admin
pub fn hunter_root(tmp: &TempDir) -> Command {
    let mut cmd = hunter(tmp);
    cmd.args(["--as", ROOT_EMAIL, "--password", ROOT_PASSWORD]);
    cmd
}

/// Initialized database in a temp directory
pub fn setup_shop_db() -> TempDir {
    let tmp = TempDir::new().unwrap();
    hunter(&tmp)
        .args([
            "init",
            "--email",
            ROOT_EMAIL,
            "--admin-password",
            ROOT_PASSWORD,
        ])
        .assert()
        .success();
    tmp
}

/// Run a command with `--format id` and return the printed ID
pub fn create_id(mut cmd: Command) -> String {
    let output = cmd.args(["--format", "id"]).output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
