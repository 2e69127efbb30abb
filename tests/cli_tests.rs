//! CLI and basic command tests

mod common;

use common::{create_id, db_path, hunter, hunter_root, setup_shop_db, ROOT_EMAIL};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    hunter(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("estimates and work orders"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    hunter(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    hunter(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter"));
}

// ============================================================================
// Init and Authentication
// ============================================================================

#[test]
fn test_init_creates_database_once() {
    let tmp = setup_shop_db();
    assert!(db_path(&tmp).exists());

    hunter(&tmp)
        .args(["init", "--email", "other@hunter.test", "--admin-password", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn test_commands_require_login() {
    let tmp = setup_shop_db();
    hunter(&tmp)
        .args(["customer", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));

    hunter(&tmp)
        .args(["--as", ROOT_EMAIL, "--password", "wrong", "customer", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_credentials_from_env() {
    let tmp = setup_shop_db();
    hunter(&tmp)
        .env("HUNTER_USER", ROOT_EMAIL)
        .env("HUNTER_PASSWORD", common::ROOT_PASSWORD)
        .args(["customer", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No customers found"));
}

#[test]
fn test_verbose_flag_overrides_log_env() {
    let tmp = setup_shop_db();
    hunter_root(&tmp)
        .env("HUNTER_LOG", "debug")
        .args(["customer", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("opening store"));

    hunter_root(&tmp)
        .env("HUNTER_LOG", "trace")
        .args(["-v", "customer", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("opening store").not());
}

// ============================================================================
// Shop Flow
// ============================================================================

fn shop_admin(tmp: &TempDir) -> assert_cmd::Command {
    let mut cmd = hunter(tmp);
    cmd.args(["--as", "admin@north.test", "--password", "shop-pass"]);
    cmd
}

fn setup_north() -> TempDir {
    let tmp = setup_shop_db();
    let mut cmd = hunter_root(&tmp);
    cmd.args([
        "company",
        "new",
        "--name",
        "North Motors",
        "--slug",
        "north",
        "--admin-email",
        "admin@north.test",
        "--admin-password",
        "shop-pass",
    ]);
    let company_id = create_id(cmd);
    assert!(company_id.starts_with("CMPY-"), "{company_id}");
    tmp
}

fn new_customer_and_vehicle(tmp: &TempDir) -> (String, String) {
    let mut cmd = shop_admin(tmp);
    cmd.args([
        "customer",
        "new",
        "--first-name",
        "Ana",
        "--last-name",
        "Ortega",
        "--phone",
        "787-555-0100",
    ]);
    let customer = create_id(cmd);

    let mut cmd = shop_admin(tmp);
    cmd.args([
        "vehicle", "new", "--customer", &customer, "--year", "2019", "--make", "Toyota",
        "--model", "Corolla",
    ]);
    let vehicle = create_id(cmd);
    (customer, vehicle)
}

#[test]
fn test_customer_list_csv() {
    let tmp = setup_north();
    new_customer_and_vehicle(&tmp);

    shop_admin(&tmp)
        .args(["customer", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,NAME,PHONE,EMAIL,VEHICLES,ESTIMATES"))
        .stdout(predicate::str::contains("Ana Ortega,787-555-0100,-,1,0"));
}

#[test]
fn test_customer_search_and_edit() {
    let tmp = setup_north();
    let (customer, _) = new_customer_and_vehicle(&tmp);

    shop_admin(&tmp)
        .args(["customer", "edit", &customer, "--city", "Ponce"])
        .assert()
        .success();

    shop_admin(&tmp)
        .args(["customer", "show", &customer, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"city\": \"Ponce\""))
        .stdout(predicate::str::contains("\"firstName\": \"Ana\""));

    shop_admin(&tmp)
        .args(["customer", "list", "--search", "ORTE", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(customer.as_str()));
}

#[test]
fn test_other_tenant_cannot_see_customer() {
    let tmp = setup_north();
    let (customer, _) = new_customer_and_vehicle(&tmp);

    hunter_root(&tmp)
        .args([
            "company",
            "new",
            "--name",
            "South Garage",
            "--slug",
            "south",
            "--admin-email",
            "admin@south.test",
            "--admin-password",
            "south-pass",
        ])
        .assert()
        .success();

    hunter(&tmp)
        .args(["--as", "admin@south.test", "--password", "south-pass"])
        .args(["customer", "show", &customer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    hunter_root(&tmp)
        .args(["customer", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(customer.as_str()));
}

#[test]
fn test_estimate_to_completed_work_order() {
    let tmp = setup_north();
    let (customer, vehicle) = new_customer_and_vehicle(&tmp);

    let mut cmd = shop_admin(&tmp);
    cmd.args([
        "estimate",
        "new",
        "--customer",
        &customer,
        "--vehicle",
        &vehicle,
        "--description",
        "Front brakes",
    ]);
    let estimate = create_id(cmd);

    let items = tmp.path().join("items.yaml");
    fs::write(
        &items,
        "- type: PART\n  description: Brake pads\n  unitPrice: 89.99\n  cost: 40\n\
         - type: LABOR\n  description: Install pads\n  hours: 2\n  taxable: false\n",
    )
    .unwrap();

    shop_admin(&tmp)
        .args(["estimate", "edit", &estimate, "--items"])
        .arg(&items)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"subtotal\": 259.99"))
        .stdout(predicate::str::contains("\"taxAmount\": 10.35"))
        .stdout(predicate::str::contains("\"total\": 270.34"));

    shop_admin(&tmp)
        .args(["estimate", "status", &estimate, "SENT"])
        .assert()
        .success();
    shop_admin(&tmp)
        .args(["estimate", "status", &estimate, "approved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened work order WO-"));

    let mut cmd = shop_admin(&tmp);
    cmd.args(["wo", "list", "--status", "active"]);
    let work_order = create_id(cmd);
    assert!(work_order.starts_with("WORD-"), "{work_order}");

    shop_admin(&tmp)
        .args(["wo", "status", &work_order, "COMPLETED"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid status transition"));

    shop_admin(&tmp)
        .args(["wo", "edit", &work_order, "--status", "IN_PROGRESS", "--bay", "3"])
        .assert()
        .success();
    shop_admin(&tmp)
        .args(["wo", "status", &work_order, "COMPLETED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is COMPLETED"));

    shop_admin(&tmp)
        .args(["estimate", "list", "--status", "completed", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(estimate.as_str()));

    shop_admin(&tmp)
        .args(["report", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalEstimates\": 1"))
        .stdout(predicate::str::contains("\"completedWorkOrders\": 1"));
}

#[test]
fn test_wo_task_toggle() {
    let tmp = setup_north();
    let (customer, vehicle) = new_customer_and_vehicle(&tmp);
    let mut cmd = shop_admin(&tmp);
    cmd.args(["estimate", "new", "--customer", &customer, "--vehicle", &vehicle]);
    let estimate = create_id(cmd);
    for status in ["SENT", "APPROVED"] {
        shop_admin(&tmp)
            .args(["estimate", "status", &estimate, status])
            .assert()
            .success();
    }
    let mut cmd = shop_admin(&tmp);
    cmd.args(["wo", "list"]);
    let work_order = create_id(cmd);

    let tasks = tmp.path().join("tasks.yaml");
    fs::write(&tasks, "- description: Lift car\n- description: Road test\n").unwrap();
    shop_admin(&tmp)
        .args(["wo", "edit", &work_order, "--tasks"])
        .arg(&tasks)
        .assert()
        .success()
        .stdout(predicate::str::contains("(0/2 tasks)"));

    shop_admin(&tmp)
        .args(["wo", "toggle", &work_order, "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1/2 tasks)"));

    shop_admin(&tmp)
        .args(["wo", "toggle", &work_order, "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task 5 does not exist"));
}

#[test]
fn test_delete_requires_confirmation() {
    let tmp = setup_north();
    let (customer, _) = new_customer_and_vehicle(&tmp);

    shop_admin(&tmp)
        .args(["customer", "delete", &customer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    shop_admin(&tmp)
        .args(["customer", "delete", &customer, "--yes"])
        .assert()
        .success();

    shop_admin(&tmp)
        .args(["vehicle", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_settings_set_keeps_other_values() {
    let tmp = setup_north();

    shop_admin(&tmp)
        .args(["settings", "set", "--tax-rate", "7", "--phone", "787-555-0199"])
        .assert()
        .success();
    shop_admin(&tmp)
        .args(["settings", "set", "--city", "Ponce", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"taxRate\": 7"))
        .stdout(predicate::str::contains("\"phone\": \"787-555-0199\""))
        .stdout(predicate::str::contains("\"shopName\": \"North Motors\""));
}

#[test]
fn test_company_admin_is_super_admin_only() {
    let tmp = setup_north();
    shop_admin(&tmp)
        .args(["company", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SUPER_ADMIN"));

    hunter_root(&tmp)
        .args(["company", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("north"));
}
