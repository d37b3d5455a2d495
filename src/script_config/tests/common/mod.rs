#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use script_config::configs::{BasicsConfig, FieldsConfig, MetasConfig};
use script_config::db::{connection, migrate};
use script_config::facade::ConfigsFacade;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Cnt {
    #[diesel(sql_type = BigInt)]
    cnt: i64,
}
#[derive(QueryableByName)]
struct FkViolation {
    #[diesel(sql_type = Text)]
    table: String,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");

    // open a connection with PRAGMAs applied
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

/// Façade over a fresh database plus a second connection for raw assertions.
pub fn setup_facade() -> (TestDb, ConfigsFacade, SqliteConnection) {
    let (db, conn) = setup_db();
    let raw = connection::connect_sqlite(&db.path).expect("connect raw");
    (db, ConfigsFacade::new(Arc::new(Mutex::new(conn))), raw)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    diesel::sql_query(format!("SELECT COUNT(*) AS cnt FROM {table};"))
        .get_result::<Cnt>(conn)
        .unwrap()
        .cnt
}

pub fn count_metas_for(conn: &mut SqliteConnection, quote_id: &str) -> i64 {
    diesel::sql_query("SELECT COUNT(*) AS cnt FROM metas_config WHERE quote_id = ?;")
        .bind::<Text, _>(quote_id)
        .get_result::<Cnt>(conn)
        .unwrap()
        .cnt
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let rows: Vec<FkViolation> = diesel::sql_query("PRAGMA foreign_key_check;")
        .load(conn)
        .unwrap();
    let tables: Vec<String> = rows.into_iter().map(|r| r.table).collect();
    assert!(tables.is_empty(), "foreign key violations in {tables:?}");
}

// ---- fixtures ----

pub fn meta(id: &str, key: &str, children: Vec<MetasConfig>) -> MetasConfig {
    MetasConfig {
        meta_id: Some(id.to_string()),
        quote_id: String::new(),
        meta_key: Some(key.to_string()),
        meta_value: None,
        meta_typed: Some(0),
        meta_list: children,
    }
}

pub fn basics(id: &str) -> BasicsConfig {
    BasicsConfig {
        basic_id: id.to_string(),
        scripts_id: format!("script-{id}"),
        api_url_field: format!("https://example.com/{id}/feed"),
        url_params_field: Some("page=1".to_string()),
        url_typed_field: 1,
        root_path: "data.items".to_string(),
        fields_config: None,
        meta_list: Vec::new(),
    }
}

pub fn fields(id: &str) -> FieldsConfig {
    FieldsConfig {
        field_id: id.to_string(),
        quote_id: id.to_string(),
        id_field: "id".to_string(),
        title_field: "title".to_string(),
        pic_field: Some("thumb".to_string()),
        content_field: None,
        tags_field: Some("tags".to_string()),
        source_url_field: None,
        meta_list: Vec::new(),
    }
}

/// The "B1" aggregate: basics tree of depth 2, fields tree of depth 3.
pub fn b1() -> BasicsConfig {
    let mut f = fields("F1");
    f.meta_list = vec![meta(
        "fm1",
        "fm1",
        vec![meta(
            "fm1.child1",
            "fm1.child1",
            vec![meta("fm1.child1.child1", "fm1.child1.child1", vec![])],
        )],
    )];

    let mut b = basics("B1");
    b.fields_config = Some(f);
    b.meta_list = vec![meta("bm1", "bm1", vec![meta("bm1.child1", "bm1.child1", vec![])])];
    b
}

/// Keys of a node list, in order.
pub fn keys(nodes: &[MetasConfig]) -> Vec<&str> {
    nodes.iter().filter_map(|n| n.meta_key.as_deref()).collect()
}
