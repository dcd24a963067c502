//! Integration tests for the svp-dict-catalog crate.

use rusqlite::Connection;
use svp_dict_catalog::{CatalogError, CatalogQuery, Migration};
use svp_dict_core::DescriptionSource;
use svp_dict_extract::parse_export_symbols;

const LIB: &str = "AXA.PGMR";

const SOURCE: &str = "\
// SVPSIN_getReclamo : Obtiene un reclamo
ctl-opt nomain;

// Anula un reclamo
dcl-proc anulaReclamo export;
end-proc;
";

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    let mut migration = Migration::new(conn, "svp_").unwrap();
    migration.up().unwrap();
    migration.into_connection()
}

#[test]
fn test_migration_lifecycle_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");

    {
        let mut migration = Migration::new(Connection::open(&path).unwrap(), "svp_").unwrap();
        migration.up().unwrap();
        let query = CatalogQuery::new(migration.connection(), "svp_").unwrap();
        query
            .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_ANULARECLAMO"])
            .unwrap();
    }

    let mut migration = Migration::new(Connection::open(&path).unwrap(), "svp_").unwrap();
    let status = migration.status().unwrap();
    assert!(status.tables_exist);
    assert_eq!(status.srvpgm_count, 1);
    assert_eq!(status.procedure_count, 2);
    assert_eq!(status.described_count, 0);

    migration.down().unwrap();
    assert!(!migration.status().unwrap().tables_exist);
}

#[test]
fn test_sync_from_export_listing() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    let listing = "  SVPSIN_GETRECLAMO   *NO\n  SVPSIN_ANULARECLAMO *NO\n  SVPCOB_PAGO *NO\n";

    let report = query
        .sync_exports(LIB, "SVPSIN", parse_export_symbols(listing, "SVPSIN"))
        .unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.added, 2);
    assert_eq!(report.removed, 0);

    assert_eq!(
        query.procedure_names(LIB, "SVPSIN").unwrap(),
        vec!["SVPSIN_ANULARECLAMO", "SVPSIN_GETRECLAMO"]
    );
}

#[test]
fn test_resync_preserves_descriptions_and_drops_stale_procedures() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_ANULARECLAMO"])
        .unwrap();
    query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap();

    let report = query
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_NUEVO"])
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.removed, 1);

    let records = query.procedures(LIB, "SVPSIN").unwrap();
    let names: Vec<_> = records.iter().map(|r| r.procedure_name.as_str()).collect();
    assert_eq!(names, vec!["SVPSIN_GETRECLAMO", "SVPSIN_NUEVO"]);
    assert_eq!(records[0].description.as_deref(), Some("Obtiene un reclamo"));
    assert!(!records[1].is_described());
}

#[test]
fn test_fill_from_source_records_strategy_and_checksum() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_ANULARECLAMO", "SVPSIN_ERROR"])
        .unwrap();

    let report = query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap();
    assert_eq!(report.updated, 2);
    assert!(!report.source_unchanged);

    let records = query.procedures(LIB, "SVPSIN").unwrap();
    let anula = &records[0];
    assert_eq!(anula.procedure_name, "SVPSIN_ANULARECLAMO");
    assert_eq!(anula.description.as_deref(), Some("Anula un reclamo"));
    assert_eq!(anula.description_source, Some(DescriptionSource::BlockHeader));
    assert!(!records[1].is_described());

    let again = query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap();
    assert!(again.source_unchanged);
    assert_eq!(again.updated, 0);

    let forced = query.fill_from_source(LIB, "SVPSIN", SOURCE, true).unwrap();
    assert!(!forced.source_unchanged);
    assert_eq!(forced.updated, 2);
}

#[test]
fn test_fill_from_source_requires_synced_service_program() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    let err = query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap_err();
    assert!(matches!(err, CatalogError::ServiceProgramNotFound { .. }));
}

#[test]
fn test_fill_from_names_respects_force_and_manual() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query
        .sync_exports(LIB, "SVPCOB", ["SVPCOB_GETPAGO", "SVPCOB_UPDPAGO", "SVPCOB_SETCUOTA"])
        .unwrap();
    query
        .set_description(LIB, "SVPCOB", "SVPCOB_SETCUOTA", "Graba la cuota del mes")
        .unwrap();
    query
        .fill_from_source(LIB, "SVPCOB", "// SVPCOB_getPago : Lee el pago\n", false)
        .unwrap();

    let report = query.fill_from_names(LIB, "SVPCOB", false).unwrap();
    assert_eq!(report.examined, 3);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 2);

    let records = query.procedures(LIB, "SVPCOB").unwrap();
    assert_eq!(records[0].description.as_deref(), Some("Lee el pago"));
    assert_eq!(records[1].description.as_deref(), Some("Graba la cuota del mes"));
    assert_eq!(records[2].description.as_deref(), Some("Actualiza pago"));
    assert_eq!(records[2].description_source, Some(DescriptionSource::NameInference));

    let forced = query.fill_from_names(LIB, "SVPCOB", true).unwrap();
    assert_eq!(forced.updated, 2);
    let records = query.procedures(LIB, "SVPCOB").unwrap();
    assert_eq!(records[0].description.as_deref(), Some("Obtiene pago"));
    assert_eq!(records[1].description_source, Some(DescriptionSource::Manual));
}

#[test]
fn test_shorten_descriptions() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query.sync_exports(LIB, "SVPA", ["SVPA_X", "SVPA_Y"]).unwrap();
    query.sync_exports(LIB, "SVPB", ["SVPB_Z"]).unwrap();
    conn.execute(
        "UPDATE svp_srvpgm_method SET description = '-------- // SVPA_X(): Calcula // v2'",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE svp_srvpgm_method SET description = '------' WHERE method_name = 'SVPA_Y'",
        [],
    )
    .unwrap();

    assert_eq!(query.shorten_descriptions(Some((LIB, "SVPA"))).unwrap(), 2);
    let records = query.procedures(LIB, "SVPA").unwrap();
    assert_eq!(records[0].description.as_deref(), Some("Calcula"));
    assert_eq!(records[1].description, None);

    let untouched = query.procedures(LIB, "SVPB").unwrap();
    assert_eq!(
        untouched[0].description.as_deref(),
        Some("-------- // SVPA_X(): Calcula // v2")
    );

    assert_eq!(query.shorten_descriptions(None).unwrap(), 1);
    assert_eq!(query.shorten_descriptions(None).unwrap(), 0);
}

#[test]
fn test_search_matches_names_and_descriptions() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_ANULARECLAMO"])
        .unwrap();
    query.sync_exports(LIB, "SVPCOB", ["SVPCOB_PAGO"]).unwrap();
    query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap();

    let by_name = query.search("pago").unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].srvpgm_name, "SVPCOB");

    let by_description = query.search("Anula").unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].procedure_name, "SVPSIN_ANULARECLAMO");

    assert_eq!(query.search("reclamo").unwrap().len(), 2);
}

#[test]
fn test_list_and_delete_service_programs() {
    let conn = setup();
    let query = CatalogQuery::new(&conn, "svp_").unwrap();
    query
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_GETRECLAMO", "SVPSIN_ANULARECLAMO"])
        .unwrap();
    query.sync_exports("AXA.PRUEBA", "SVPCOB", ["SVPCOB_PAGO"]).unwrap();
    query.fill_from_source(LIB, "SVPSIN", SOURCE, false).unwrap();

    let listed = query.list_service_programs().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].program.qualified_name(), "AXA.PGMR/SVPSIN");
    assert_eq!(listed[0].procedure_count, 2);
    assert_eq!(listed[0].described_count, 2);
    assert_eq!(listed[1].program.library, "AXA.PRUEBA");

    assert!(query.delete_service_program(LIB, "SVPSIN").unwrap());
    assert!(!query.delete_service_program(LIB, "SVPSIN").unwrap());
    assert!(query.procedures(LIB, "SVPSIN").unwrap().is_empty());
    assert_eq!(query.list_service_programs().unwrap().len(), 1);
}

#[test]
fn test_clear_removes_everything() {
    let conn = Connection::open_in_memory().unwrap();
    let mut migration = Migration::new(conn, "svp_").unwrap();
    migration.up().unwrap();
    CatalogQuery::new(migration.connection(), "svp_")
        .unwrap()
        .sync_exports(LIB, "SVPSIN", ["SVPSIN_A"])
        .unwrap();

    assert_eq!(migration.clear().unwrap(), 1);
    let status = migration.status().unwrap();
    assert_eq!(status.srvpgm_count, 0);
    assert_eq!(status.procedure_count, 0);
}
