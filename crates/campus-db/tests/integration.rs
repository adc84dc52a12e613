use campus_db::{open_database, schema_version, DbRuntimeSettings, LATEST_VERSION};

#[test]
fn opened_database_has_crud_tables() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("campus.db");
    let pool = open_database(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("failed to open database");
    let conn = pool.get().expect("failed to get connection");

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(
        tables,
        vec!["clubs", "event_registrations", "events", "members"]
    );
}

#[test]
fn reopening_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("campus.db");
    let path = path.to_str().unwrap();

    {
        let pool = open_database(path, DbRuntimeSettings::default()).unwrap();
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO clubs (name, email, password_hash) VALUES ('Drama Club', 'drama@univ.com', 'x')",
                [],
            )
            .unwrap();
    }

    let pool = open_database(path, DbRuntimeSettings::default()).unwrap();
    let conn = pool.get().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), LATEST_VERSION);
    let clubs: i64 = conn
        .query_row("SELECT COUNT(*) FROM clubs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(clubs, 1);
}
