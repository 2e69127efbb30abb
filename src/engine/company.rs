//! Tenants, users and authentication

use chrono::Utc;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::core::entity::Entity;
use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::tenant::{CompanyFilter, Identity, RequestContext, Role};
use crate::engine::{non_blank, require_fields};
use crate::entities::company::{
    is_valid_slug, Company, CompanyCounts, CompanyDetail, CompanyPatch, NewCompany, NewUser, User,
};
use crate::entities::settings::ShopSettings;
use crate::store::records::{self, Record};
use crate::store::{get_scoped, ScopedQuery, Store};

const HASH_SCHEME: &str = "sha256";
const SALT_BYTES: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

/// Salted digest in the form `sha256$<salt>$<digest>`
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::rng().fill(&mut salt[..]);
    let salt = to_hex(&salt);
    format!("{}${}${}", HASH_SCHEME, salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(HASH_SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
        _ => false,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_taken(conn: &Connection, email: &str) -> ShopResult<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM users WHERE email = ?1", [email], |_| Ok(()))
        .optional()?
        .is_some())
}

fn slug_taken(conn: &Connection, slug: &str, except: Option<&EntityId>) -> ShopResult<bool> {
    let found: Option<EntityId> = conn
        .query_row("SELECT id FROM companies WHERE slug = ?1", [slug], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(match (found, except) {
        (Some(id), Some(except)) => &id != except,
        (Some(_), None) => true,
        (None, _) => false,
    })
}

/// Fail with NotFound unless the company exists
pub(crate) fn ensure_company(conn: &Connection, id: &EntityId) -> ShopResult<()> {
    let exists = conn
        .query_row("SELECT 1 FROM companies WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(ShopError::not_found(Company::NAME, id))
    }
}

/// Company + first user + settings, inside the caller's transaction
fn create_tenant(conn: &Connection, input: NewCompany, role: Role) -> ShopResult<(Company, User)> {
    require_fields(&[
        ("name", &input.name),
        ("slug", &input.slug),
        ("adminEmail", &input.admin_email),
        ("adminPassword", &input.admin_password),
    ])?;
    let slug = input.slug.trim().to_string();
    if !is_valid_slug(&slug) {
        return Err(ShopError::validation(format!(
            "slug '{}' may only contain lowercase letters, digits and dashes",
            slug
        )));
    }
    if slug_taken(conn, &slug, None)? {
        return Err(ShopError::Conflict(format!("slug '{}' is already in use", slug)));
    }
    let email = normalize_email(&input.admin_email);
    if email_taken(conn, &email)? {
        return Err(ShopError::Conflict(format!("email '{}' is already registered", email)));
    }

    let now = Utc::now();
    let name = input.name.trim().to_string();
    let company = Company {
        id: EntityId::new(EntityPrefix::Cmpy),
        name: name.clone(),
        slug,
        is_active: true,
        created: now,
    };
    records::insert_company(conn, &company)?;

    let user = User {
        id: EntityId::new(EntityPrefix::User),
        company_id: company.id.clone(),
        name: non_blank(input.admin_name).unwrap_or_else(|| name.clone()),
        email,
        role,
        is_active: true,
        created: now,
    };
    records::insert_user(conn, &user, &hash_password(&input.admin_password))?;
    records::upsert_settings(conn, &ShopSettings::defaults_for(&company.id, Some(name)))?;

    Ok((company, user))
}

/// Create the system company and its SUPER_ADMIN on an empty database
///
/// Returns `None` when users already exist.
pub fn bootstrap(store: &mut Store, input: NewCompany) -> ShopResult<Option<User>> {
    let tx = store.transaction()?;
    let users: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if users > 0 {
        debug!(users, "bootstrap skipped, database already has users");
        return Ok(None);
    }
    let (company, user) = create_tenant(&tx, input, Role::SuperAdmin)?;
    tx.commit()?;
    info!(company = %company.id, user = %user.id, "bootstrapped system company");
    Ok(Some(user))
}

struct Login {
    user: User,
    password_hash: String,
    company_active: bool,
}

fn find_login(conn: &Connection, email: &str) -> ShopResult<Option<Login>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {}, t.password_hash, c.is_active FROM users t \
                 JOIN companies c ON c.id = t.company_id WHERE t.email = ?1",
                User::COLUMNS
            ),
            [normalize_email(email)],
            |row| {
                Ok(Login {
                    user: User::from_row(row)?,
                    password_hash: row.get(User::WIDTH)?,
                    company_active: row.get(User::WIDTH + 1)?,
                })
            },
        )
        .optional()?)
}

fn login_identity(login: &Login) -> ShopResult<Identity> {
    if !login.user.is_active || !login.company_active {
        return Err(ShopError::NotAuthenticated);
    }
    Ok(Identity {
        user_id: login.user.id.clone(),
        company_id: login.user.company_id.clone(),
        role: login.user.role,
    })
}

/// Identity of an active user of an active company
pub fn identify(conn: &Connection, email: &str) -> ShopResult<Identity> {
    let login = find_login(conn, email)?.ok_or(ShopError::NotAuthenticated)?;
    login_identity(&login)
}

/// [`identify`], additionally checking the password
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> ShopResult<Identity> {
    let login = find_login(conn, email)?.ok_or(ShopError::NotAuthenticated)?;
    let identity = login_identity(&login)?;
    if !verify_password(password, &login.password_hash) {
        debug!(email, "password rejected");
        return Err(ShopError::NotAuthenticated);
    }
    Ok(identity)
}

fn counts(conn: &Connection, company_id: &EntityId) -> ShopResult<CompanyCounts> {
    let filter = CompanyFilter::Company(company_id.clone());
    Ok(CompanyCounts {
        users: crate::store::count_scoped(conn, "users", &filter)?,
        customers: crate::store::count_scoped(conn, "customers", &filter)?,
        vehicles: crate::store::count_scoped(conn, "vehicles", &filter)?,
        estimates: crate::store::count_scoped(conn, "estimates", &filter)?,
        work_orders: crate::store::count_scoped(conn, "work_orders", &filter)?,
    })
}

fn users_of(conn: &Connection, company_id: &EntityId) -> ShopResult<Vec<User>> {
    ScopedQuery::new(User::select())
        .and_eq("t.company_id", company_id)
        .order_by("t.created ASC")
        .fetch_all(conn, User::from_row)
}

fn detail(conn: &Connection, company: Company) -> ShopResult<CompanyDetail> {
    let shop_name = records::settings_for(conn, &company.id)?.and_then(|s| s.shop_name);
    Ok(CompanyDetail {
        counts: counts(conn, &company.id)?,
        users: users_of(conn, &company.id)?,
        shop_name,
        company,
    })
}

/// Every company, newest first (super admin)
pub fn list(store: &Store, ctx: &RequestContext) -> ShopResult<Vec<CompanyDetail>> {
    ctx.require_role(Role::SuperAdmin)?;
    let conn = store.conn();
    let companies = ScopedQuery::new(Company::select())
        .order_by("t.created DESC")
        .fetch_all(conn, Company::from_row)?;
    companies.into_iter().map(|c| detail(conn, c)).collect()
}

pub fn get(store: &Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<CompanyDetail> {
    ctx.require_role(Role::SuperAdmin)?;
    let company = get_scoped::<Company>(store.conn(), &CompanyFilter::All, id)?;
    detail(store.conn(), company)
}

/// New tenant with an ADMIN user and default settings (super admin)
pub fn create(store: &mut Store, ctx: &RequestContext, input: NewCompany) -> ShopResult<CompanyDetail> {
    ctx.require_role(Role::SuperAdmin)?;
    let tx = store.transaction()?;
    let (company, user) = create_tenant(&tx, input, Role::Admin)?;
    let detail = detail(&tx, company)?;
    tx.commit()?;
    info!(company = %detail.company.id, admin = %user.email, "created company");
    Ok(detail)
}

pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    id: &EntityId,
    patch: CompanyPatch,
) -> ShopResult<Company> {
    ctx.require_role(Role::SuperAdmin)?;
    let tx = store.transaction()?;
    let mut company = get_scoped::<Company>(&tx, &CompanyFilter::All, id)?;

    if let Some(name) = non_blank(patch.name) {
        company.name = name;
    }
    if let Some(slug) = non_blank(patch.slug) {
        if slug != company.slug {
            if !is_valid_slug(&slug) {
                return Err(ShopError::validation(format!(
                    "slug '{}' may only contain lowercase letters, digits and dashes",
                    slug
                )));
            }
            if slug_taken(&tx, &slug, Some(id))? {
                return Err(ShopError::Conflict(format!("slug '{}' is already in use", slug)));
            }
            company.slug = slug;
        }
    }
    if let Some(active) = patch.is_active {
        company.is_active = active;
    }

    records::update_company(&tx, &company)?;
    tx.commit()?;
    info!(company = %company.id, active = company.is_active, "updated company");
    Ok(company)
}

/// Delete a company and everything it owns (super admin)
pub fn delete(store: &mut Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<()> {
    ctx.require_role(Role::SuperAdmin)?;
    if ctx.identity.company_id == *id {
        return Err(ShopError::validation("cannot delete your own company"));
    }
    let tx = store.transaction()?;
    get_scoped::<Company>(&tx, &CompanyFilter::All, id)?;
    tx.execute("DELETE FROM companies WHERE id = ?1", [id])?;
    tx.commit()?;
    info!(company = %id, "deleted company");
    Ok(())
}

/// Add a login to a company (super admin); role defaults to ADMIN
pub fn add_user(
    store: &mut Store,
    ctx: &RequestContext,
    company_id: &EntityId,
    input: NewUser,
) -> ShopResult<User> {
    ctx.require_role(Role::SuperAdmin)?;
    require_fields(&[
        ("name", &input.name),
        ("email", &input.email),
        ("password", &input.password),
    ])?;
    let tx = store.transaction()?;
    ensure_company(&tx, company_id)?;
    let email = normalize_email(&input.email);
    if email_taken(&tx, &email)? {
        return Err(ShopError::Conflict(format!("email '{}' is already registered", email)));
    }
    let user = User {
        id: EntityId::new(EntityPrefix::User),
        company_id: company_id.clone(),
        name: input.name.trim().to_string(),
        email,
        role: input.role.unwrap_or_default(),
        is_active: true,
        created: Utc::now(),
    };
    records::insert_user(&tx, &user, &hash_password(&input.password))?;
    tx.commit()?;
    info!(user = %user.id, company = %company_id, role = %user.role, "added user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "md5$aa$bb"));
    }
}
