//! SQL schema for the greenroom SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id        TEXT PRIMARY KEY,
    display_name      TEXT NOT NULL,
    bio               TEXT,
    tech_stack        TEXT NOT NULL DEFAULT '[]',       -- JSON array of strings
    social_links      TEXT NOT NULL DEFAULT '{}',       -- JSON object, fixed key set
    avatar            TEXT,                             -- JSON MediaRef or NULL
    visibility        TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'public' | 'rejected'
    onboarding_status TEXT NOT NULL DEFAULT 'pending',
    role              TEXT NOT NULL DEFAULT 'user',
    slug              TEXT,
    terms_accepted_at TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

-- Slug uniqueness is an invariant of *public* profiles only; in-flight
-- submissions may hold colliding slug candidates.
CREATE UNIQUE INDEX IF NOT EXISTS profiles_public_slug_idx
    ON profiles(slug) WHERE visibility = 'public';

CREATE TABLE IF NOT EXISTS songs (
    song_id     TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES profiles(profile_id),
    title       TEXT NOT NULL,
    genres      TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    audio       TEXT NOT NULL,                -- JSON MediaRef
    is_probe    INTEGER NOT NULL DEFAULT 1,
    price_cents INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    message_id   TEXT PRIMARY KEY,
    recipient_id TEXT NOT NULL REFERENCES profiles(profile_id),
    sender_id    TEXT,
    kind         TEXT NOT NULL,
    subject      TEXT NOT NULL,
    body         TEXT NOT NULL,
    read         INTEGER NOT NULL DEFAULT 0,
    related_slug TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS content_filters (
    word     TEXT PRIMARY KEY,
    severity TEXT NOT NULL DEFAULT 'severe',
    active   INTEGER NOT NULL DEFAULT 1
);

-- Fixed-id configuration rows; ids 201/202 hold the curation mail templates.
CREATE TABLE IF NOT EXISTS promo_slots (
    slot_id    INTEGER PRIMARY KEY,
    subject    TEXT NOT NULL,
    body       TEXT NOT NULL,
    media      TEXT,              -- JSON MediaRef or NULL
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS credentials (
    login         TEXT PRIMARY KEY,
    profile_id    TEXT NOT NULL UNIQUE REFERENCES profiles(profile_id),
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS songs_owner_idx        ON songs(owner_id);
CREATE INDEX IF NOT EXISTS messages_recipient_idx ON messages(recipient_id);
CREATE INDEX IF NOT EXISTS profiles_status_idx    ON profiles(onboarding_status);

PRAGMA user_version = 1;
";
