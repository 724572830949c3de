//! SQL schema for the tally SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS transaction_series (
    series_id           TEXT PRIMARY KEY,
    organization_id     TEXT NOT NULL,
    owner_id            TEXT NOT NULL,
    pay_to_id           TEXT,
    title               TEXT NOT NULL,
    amount_cents        INTEGER NOT NULL,
    flow                TEXT NOT NULL,      -- 'expense' | 'income'
    category_id         TEXT,
    start_date          TEXT NOT NULL,      -- ISO 8601 date
    recurrence_kind     TEXT NOT NULL,      -- 'weekly' | 'monthly' | 'yearly'
    recurrence_interval INTEGER NOT NULL,
    installments_total  INTEGER,
    recurrence_until    TEXT,
    active              INTEGER NOT NULL DEFAULT 1,
    created_at          TEXT NOT NULL
);

-- Occurrences are created only by the materialiser.
-- The UNIQUE pair makes re-materialisation a no-op, never a duplicate.
CREATE TABLE IF NOT EXISTS transaction_occurrences (
    occurrence_id     TEXT PRIMARY KEY,
    series_id         TEXT NOT NULL REFERENCES transaction_series(series_id)
                        ON DELETE CASCADE,
    installment_index INTEGER NOT NULL,
    due_date          TEXT NOT NULL,
    amount_cents      INTEGER NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    paid_at           TEXT,
    value_paid_cents  INTEGER,
    UNIQUE (series_id, installment_index)
);

CREATE TABLE IF NOT EXISTS goals (
    goal_id             TEXT PRIMARY KEY,
    organization_id     TEXT NOT NULL,
    owner_id            TEXT NOT NULL,
    title               TEXT NOT NULL,
    target_amount_cents INTEGER NOT NULL,
    saved_amount_cents  INTEGER NOT NULL DEFAULT 0,
    deadline            TEXT NOT NULL,
    achieved            INTEGER NOT NULL DEFAULT 0,
    active              INTEGER NOT NULL DEFAULT 1,
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notification_policies (
    policy_id            TEXT PRIMARY KEY,
    organization_id      TEXT NOT NULL,
    scope                TEXT NOT NULL,     -- 'transaction' | 'goal'
    event                TEXT NOT NULL,     -- 'due_soon' | 'overdue'
    days_before          INTEGER,
    days_overdue         INTEGER,
    repeat_every_minutes INTEGER,
    max_occurrences      INTEGER,
    channels             TEXT NOT NULL,     -- comma list: 'push,sms'
    flow_filter          TEXT,
    category_id          TEXT,
    amount_min_cents     INTEGER,
    amount_max_cents     INTEGER,
    quiet_hours_start    TEXT,              -- 'HH:MM'
    quiet_hours_end      TEXT,
    utc_offset           TEXT NOT NULL,     -- '+HH:MM'
    weekdays_mask        INTEGER NOT NULL DEFAULT 127,
    active               INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL
);

-- The dedup ledger. One row per (policy, resource); written only by upsert.
CREATE TABLE IF NOT EXISTS notification_state (
    state_id         TEXT PRIMARY KEY,
    policy_id        TEXT NOT NULL REFERENCES notification_policies(policy_id)
                       ON DELETE CASCADE,
    resource_kind    TEXT NOT NULL,
    resource_id      TEXT NOT NULL,
    last_notified_at TEXT NOT NULL,
    occurrences      INTEGER NOT NULL,
    next_eligible_at TEXT,
    status           TEXT NOT NULL DEFAULT 'active',
    UNIQUE (policy_id, resource_kind, resource_id)
);

-- The audit log is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS notification_runs (
    run_id        TEXT PRIMARY KEY,
    policy_id     TEXT NOT NULL,
    resource_kind TEXT NOT NULL,
    resource_id   TEXT NOT NULL,
    channel       TEXT NOT NULL,
    sent_at       TEXT NOT NULL,
    status        TEXT NOT NULL,            -- 'sent' | 'failed'
    error         TEXT
);

CREATE INDEX IF NOT EXISTS occurrences_series_idx
    ON transaction_occurrences(series_id);
CREATE INDEX IF NOT EXISTS occurrences_status_idx
    ON transaction_occurrences(status, due_date);
CREATE INDEX IF NOT EXISTS policies_event_idx
    ON notification_policies(event, active);
CREATE INDEX IF NOT EXISTS runs_sent_idx
    ON notification_runs(sent_at);

PRAGMA user_version = 1;
";
