//! Database schema
//!
//! Every owned row cascades from its parent, so deleting a company removes
//! the whole tenant. Money columns are TEXT holding a decimal string.

pub(super) const SCHEMA_VERSION: i64 = 1;

pub(super) const SQL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT,
    phone TEXT NOT NULL,
    phone2 TEXT,
    address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    notes TEXT,
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vehicles (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    year INTEGER NOT NULL,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    trim TEXT,
    color TEXT,
    vin TEXT,
    license_plate TEXT,
    mileage INTEGER,
    engine_type TEXT,
    transmission TEXT,
    notes TEXT,
    created TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS estimates (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    vehicle_id TEXT NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
    estimate_number TEXT NOT NULL,
    status TEXT NOT NULL,
    description TEXT,
    diagnostic_notes TEXT,
    customer_notes TEXT,
    internal_notes TEXT,
    tax_rate TEXT NOT NULL,
    subtotal TEXT NOT NULL,
    tax_amount TEXT NOT NULL,
    discount TEXT NOT NULL,
    total TEXT NOT NULL,
    approved_date TEXT,
    completed_date TEXT,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS estimate_items (
    id TEXT PRIMARY KEY,
    estimate_id TEXT NOT NULL REFERENCES estimates(id) ON DELETE CASCADE,
    item_type TEXT NOT NULL,
    description TEXT NOT NULL,
    part_number TEXT,
    brand TEXT,
    supplier TEXT,
    quantity TEXT NOT NULL,
    unit_price TEXT NOT NULL,
    cost TEXT NOT NULL,
    taxable INTEGER NOT NULL,
    amount TEXT NOT NULL,
    hours TEXT,
    labor_rate TEXT,
    notes TEXT,
    sort_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS work_orders (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    work_order_number TEXT NOT NULL,
    estimate_id TEXT NOT NULL UNIQUE REFERENCES estimates(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    assigned_to TEXT,
    bay TEXT,
    start_date TEXT,
    estimated_completion TEXT,
    completed_date TEXT,
    delivered_date TEXT,
    tech_notes TEXT,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS work_tasks (
    id TEXT PRIMARY KEY,
    work_order_id TEXT NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    assigned_to TEXT,
    time_spent TEXT,
    notes TEXT,
    completed_at TEXT,
    sort_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS shop_settings (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL UNIQUE REFERENCES companies(id) ON DELETE CASCADE,
    shop_name TEXT,
    address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    phone TEXT,
    email TEXT,
    website TEXT,
    tax_rate TEXT NOT NULL,
    labor_rate TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_company ON users(company_id);
CREATE INDEX IF NOT EXISTS idx_customers_company ON customers(company_id);
CREATE INDEX IF NOT EXISTS idx_vehicles_company ON vehicles(company_id);
CREATE INDEX IF NOT EXISTS idx_vehicles_customer ON vehicles(customer_id);
CREATE INDEX IF NOT EXISTS idx_estimates_company ON estimates(company_id, created);
CREATE INDEX IF NOT EXISTS idx_estimates_customer ON estimates(customer_id);
CREATE INDEX IF NOT EXISTS idx_estimates_vehicle ON estimates(vehicle_id);
CREATE INDEX IF NOT EXISTS idx_items_estimate ON estimate_items(estimate_id, sort_order);
CREATE INDEX IF NOT EXISTS idx_work_orders_company ON work_orders(company_id, created);
CREATE INDEX IF NOT EXISTS idx_tasks_work_order ON work_tasks(work_order_id, sort_order);
"#;
