//! Database schema and migrations for rankgate.
//!
//! Migrations are applied in order; the `schema_version` table records how
//! many have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Ranks and accounts
    r#"
-- Permission profiles shared by accounts. Flags are nullable on purpose:
-- NULL means "not granted", exactly like 0.
CREATE TABLE user_ranks (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL UNIQUE,
    admin_view          INTEGER DEFAULT 0,
    exercise_add        INTEGER DEFAULT 0,
    exercise_edit       INTEGER DEFAULT 0,
    exercise_delete     INTEGER DEFAULT 0,
    lesson_add          INTEGER DEFAULT 0,
    lesson_edit         INTEGER DEFAULT 0,
    lesson_delete       INTEGER DEFAULT 0,
    comment_add         INTEGER DEFAULT 0,
    comment_edit        INTEGER DEFAULT 0,
    comment_delete      INTEGER DEFAULT 0,
    user_add            INTEGER DEFAULT 0,
    user_edit           INTEGER DEFAULT 0,
    user_delete         INTEGER DEFAULT 0,
    user_group_add      INTEGER DEFAULT 0,
    user_group_edit     INTEGER DEFAULT 0,
    user_group_delete   INTEGER DEFAULT 0,
    user_rank_add       INTEGER DEFAULT 0,
    user_rank_edit      INTEGER DEFAULT 0,
    user_rank_delete    INTEGER DEFAULT 0
);

-- Login identities
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,   -- compared exactly (BINARY collation)
    password_hash   TEXT,                   -- Argon2id, base64
    salt            TEXT,                   -- 32 random bytes, base64
    rank_id         INTEGER REFERENCES user_ranks(id),
    banned          INTEGER NOT NULL DEFAULT 0,
    activated       INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    last_login_at   TEXT
);

CREATE INDEX idx_users_rank_id ON users(rank_id);
"#,
];
