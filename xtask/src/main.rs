// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations used locally and in CI, plus a schema check
//! for the `SQLite` migrations.
//!
//! ### Schema Verification
//!
//! `cargo xtask verify-migrations` applies the embedded migrations to an
//! in-memory database, compares the resulting schema against the tables,
//! columns, and indexes the persistence layer queries, then reverts every
//! migration and applies them again. No external services are needed.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables and the columns the persistence layer reads and writes.
const EXPECTED_TABLES: &[(&str, &[&str])] = &[
    (
        "users",
        &[
            "id",
            "email",
            "display_name",
            "password_hash",
            "role",
            "status",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "facilities",
        &[
            "id",
            "owner_id",
            "name",
            "location",
            "price_per_hour",
            "opening_time",
            "closing_time",
            "status",
            "reviewed_by",
            "reviewed_at",
            "review_note",
            "version",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "reservations",
        &[
            "seq",
            "id",
            "field_id",
            "client_id",
            "date",
            "start_time",
            "end_time",
            "total_price",
            "status",
            "status_reason",
            "version",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "notifications",
        &[
            "seq",
            "id",
            "user_id",
            "kind",
            "title",
            "message",
            "related_id",
            "is_read",
            "created_at",
        ],
    ),
    (
        "sessions",
        &["token", "user_id", "role_claim", "created_at", "expires_at"],
    ),
    ("favorites", &["user_id", "facility_id", "created_at"]),
    (
        "audit_events",
        &[
            "event_id",
            "entity_kind",
            "entity_id",
            "actor_id",
            "actor_role",
            "action_name",
            "action_details",
            "before_status",
            "after_status",
            "reason",
            "recorded_at",
        ],
    ),
];

/// Indexes backing the hot lookups: conflict checks, per-owner and
/// per-client listings, inboxes, and audit history.
const EXPECTED_INDEXES: &[(&str, &[&str])] = &[
    ("facilities", &["owner_id"]),
    ("facilities", &["status"]),
    ("reservations", &["field_id", "date", "status"]),
    ("reservations", &["client_id"]),
    ("notifications", &["user_id"]),
    ("sessions", &["user_id"]),
    ("audit_events", &["entity_id"]),
];

/// Columns that must be unique.
const EXPECTED_UNIQUE: &[(&str, &[&str])] = &[
    ("users", &["email"]),
    ("reservations", &["id"]),
    ("notifications", &["id"]),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, schema)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the migrations produce the expected schema and revert cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, schema)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("known issue: markdownlint is currently noisy and can be ignored: {err}");
    }
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!("markdownlint-cli2", "**/*.md", "!target", "!**/target", "!examples").run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the `SQLite` migrations.
///
/// ## What This Command Does
///
/// 1. Applies every embedded migration to a fresh in-memory database
/// 2. Introspects the resulting schema
/// 3. Checks every expected table, column, index, and unique constraint
/// 4. Reverts all migrations and checks no application tables remain
/// 5. Applies the migrations again to prove the down scripts are complete
///
/// # Errors
///
/// Fails if a migration does not apply or revert, or if the schema is
/// missing anything the persistence layer relies on.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting schema verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!(count = applied.len(), "Migrations applied");

    let schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;
    tracing::info!("Schema matches expectations");

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert SQLite migrations: {}", e))?;
    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let left: Vec<&String> = reverted.tables.keys().collect();
        return Err(eyre!("Tables left after reverting migrations: {:?}", left));
    }
    tracing::info!("Migrations reverted cleanly");

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply SQLite migrations: {}", e))?;
    check_schema(&introspect_sqlite_schema(&mut conn)?)?;

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // origin 'u' covers column UNIQUE constraints, 'pk' composite keys
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                table_info.indexes.insert(Index {
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") {
        "INTEGER".to_string()
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        "TEXT".to_string()
    } else {
        upper
    }
}

/// Compare an introspected schema against what the persistence layer uses.
fn check_schema(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for (table_name, columns) in EXPECTED_TABLES {
        let Some(table) = schema.tables.get(*table_name) else {
            errors.push(format!("Missing table '{table_name}'"));
            continue;
        };
        for column in *columns {
            if !table.columns.contains_key(*column) {
                errors.push(format!("Table '{table_name}' is missing column '{column}'"));
            }
        }
        for column in table.columns.keys() {
            if !columns.contains(&column.as_str()) {
                errors.push(format!(
                    "Table '{table_name}' has unexpected column '{column}'"
                ));
            }
        }
    }

    for (table_name, columns) in EXPECTED_INDEXES {
        let found = schema.tables.get(*table_name).is_some_and(|table| {
            table
                .indexes
                .iter()
                .any(|index| index.columns.iter().map(String::as_str).eq(columns.iter().copied()))
        });
        if !found {
            errors.push(format!("Table '{table_name}' has no index on {columns:?}"));
        }
    }

    for (table_name, columns) in EXPECTED_UNIQUE {
        let found = schema.tables.get(*table_name).is_some_and(|table| {
            table
                .unique_constraints
                .iter()
                .any(|unique| unique.columns.iter().map(String::as_str).eq(columns.iter().copied()))
        });
        if !found {
            errors.push(format!("Table '{table_name}' has no unique constraint on {columns:?}"));
        }
    }

    if let Some(favorites) = schema.tables.get("favorites") {
        let expected: BTreeSet<String> = ["user_id", "facility_id"]
            .into_iter()
            .map(String::from)
            .collect();
        if favorites.primary_keys != expected {
            errors.push(format!(
                "Table 'favorites' primary key is {:?}, expected (user_id, facility_id)",
                favorites.primary_keys
            ));
        }
    }

    if let Some(reservations) = schema.tables.get("reservations") {
        let references_facilities = reservations.foreign_keys.iter().any(|fk| {
            fk.from_column == "field_id" && fk.to_table == "facilities" && fk.to_column == "id"
        });
        if !references_facilities {
            errors.push(String::from(
                "Table 'reservations' does not reference 'facilities(id)' through field_id",
            ));
        }
        let bad_price: Option<&Column> = reservations
            .columns
            .get("total_price")
            .filter(|column| column.normalized_type != "INTEGER" || column.nullable);
        if let Some(column) = bad_price {
            errors.push(format!(
                "Column 'reservations.{}' must be a non-null integer",
                column.name
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            tracing::error!("{error}");
        }
        Err(eyre!("Schema verification found {} problem(s)", errors.len()))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
