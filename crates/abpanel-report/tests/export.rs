//! Tests for inventory and history CSV export/import.

use abpanel_core::{ExecutionEngine, HistoryLog, InventoryLedger, PanelComposer, required_volume};
use abpanel_model::{PanelError, ReagentDraft, ReagentField, StainType};
use abpanel_report::{
    ReportError, export_history, export_inventory, load_inventory, read_inventory_csv,
    save_inventory, write_history_csv, write_inventory_csv, write_inventory_snapshot_csv,
};
use chrono::{NaiveDate, NaiveDateTime};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 15)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

fn render_inventory(ledger: &InventoryLedger) -> String {
    let mut buffer = Vec::new();
    write_inventory_csv(ledger.records(), &mut buffer).expect("write inventory");
    String::from_utf8(buffer).expect("utf8")
}

fn executed_history(ledger: &mut InventoryLedger) -> HistoryLog {
    let mut history = HistoryLog::new();
    let mut engine = ExecutionEngine::new();
    let ids: Vec<_> = ledger.records().iter().map(|record| record.id).collect();

    let mut composer = PanelComposer::default();
    composer.toggle(ids[0]);
    composer.toggle(ids[1]);
    composer.set_name("PanelA");
    let plan = engine.prepare(&composer, ledger, &history).expect("plan");
    engine
        .commit_at(plan, ledger, &mut history, "alice", at(9, 30))
        .expect("commit");

    let mut composer = PanelComposer::default();
    composer.toggle(ids[2]);
    composer.set_name("CD8 only");
    composer.set_cell_count(10.0);
    let plan = engine.prepare(&composer, ledger, &history).expect("plan");
    engine
        .commit_at(plan, ledger, &mut history, "bob", at(14, 5))
        .expect("commit");
    history
}

#[test]
fn inventory_export_snapshot() {
    let ledger = InventoryLedger::seeded();
    insta::assert_snapshot!(render_inventory(&ledger), @r"
    Antigen,Clone,Metal,Concentration (mg/mL),Antibody per Test (µg),Volume per Test (µL),Stock Volume (µL),Alert Threshold (µL),Date Conjugated,Notes
    CD3,UCHT1,170Er,0.5,1.0,2.0,500.00,50.0,2024-10-15,Core marker
    CD4,RPA-T4,145Nd,0.5,1.0,2.0,450.00,50.0,2024-10-12,T-helper cells
    CD8,SK1,146Nd,0.5,1.0,2.0,35.00,50.0,2024-09-20,Cytotoxic T cells
    ");
}

#[test]
fn history_export_snapshot() {
    let mut ledger = InventoryLedger::seeded();
    let history = executed_history(&mut ledger);
    let mut buffer = Vec::new();
    write_history_csv(history.recent_first(), &mut buffer).expect("write history");
    let rendered = String::from_utf8(buffer).expect("utf8");
    insta::assert_snapshot!(rendered, @r"
    Timestamp,User,Panel Name,Cell Count (millions),Antibodies Used,Total Volume (µL)
    2024-10-15 14:05:00,bob,CD8 only,10.0,CD8(146Nd),5.00
    2024-10-15 09:30:00,alice,PanelA,4.0,CD3(170Er); CD4(145Nd),4.00
    ");
}

#[test]
fn stock_is_rounded_to_two_decimals() {
    let mut ledger = InventoryLedger::new();
    ledger
        .add(&ReagentDraft::new("CD19", "12.3456").with_notes("dim, check titration"))
        .expect("add");
    let rendered = render_inventory(&ledger);
    let row = rendered.lines().nth(1).expect("data row");
    assert!(row.contains(",12.35,"));
    assert!(row.ends_with("\"dim, check titration\""));
}

#[test]
fn inventory_round_trips_through_import() {
    let mut ledger = InventoryLedger::seeded();
    let cd4 = ledger.records()[1].id;
    ledger
        .update(cd4, ReagentField::Notes, "helper, \"bright\"")
        .expect("edit");
    let rendered = render_inventory(&ledger);

    let imported = read_inventory_csv(rendered.as_bytes()).expect("import");

    assert_eq!(imported.len(), 3);
    for (original, read) in ledger.records().iter().zip(imported.records()) {
        assert_eq!(read.antigen, original.antigen);
        assert_eq!(read.metal, original.metal);
        assert_eq!(read.notes, original.notes);
        assert_eq!(read.stock_volume, original.stock_volume);
        assert_eq!(read.alert_threshold, original.alert_threshold);
        assert_eq!(read.stain_type, original.stain_type);
    }
}

fn ledger_with_intracellular() -> InventoryLedger {
    let mut ledger = InventoryLedger::seeded();
    ledger
        .add(
            &ReagentDraft::new("IFNg", "80")
                .with_metal("165Ho")
                .with_volume_per_test("2.0")
                .with_stain_type(StainType::Intracellular),
        )
        .expect("add");
    ledger
}

#[test]
fn snapshot_keeps_intracellular_scaling() {
    let ledger = ledger_with_intracellular();
    let original = ledger.records().last().expect("IFNg");
    assert_eq!(required_volume(original, 4.0), 0.4);

    let mut buffer = Vec::new();
    write_inventory_snapshot_csv(ledger.records(), &mut buffer).expect("write");
    let rendered = String::from_utf8(buffer).expect("utf8");
    assert!(rendered.lines().next().expect("header").ends_with(",Stain Type"));

    let reloaded = read_inventory_csv(rendered.as_bytes()).expect("import");
    let read = reloaded.records().last().expect("IFNg");
    assert_eq!(read.stain_type, StainType::Intracellular);
    assert_eq!(required_volume(read, 4.0), required_volume(original, 4.0));
    assert_eq!(reloaded.records()[0].stain_type, StainType::Extracellular);
}

#[test]
fn plain_export_stays_ten_columns() {
    let ledger = ledger_with_intracellular();
    let rendered = render_inventory(&ledger);
    for line in rendered.lines() {
        assert_eq!(line.split(',').count(), 10, "{line}");
    }
}

#[test]
fn saved_file_reloads_with_stain_types() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = ledger_with_intracellular();
    let path = dir.path().join("inventory.csv");

    save_inventory(&ledger, &path).expect("save");
    let reloaded = load_inventory(&path).expect("load");

    let ifng = reloaded.find_by_identity("IFNg", "165Ho").expect("IFNg");
    assert_eq!(ifng.stain_type, StainType::Intracellular);
    assert_eq!(required_volume(ifng, 4.0), 0.4);
}

#[test]
fn import_reads_optional_stain_type() {
    let data = "Antigen,Metal,Stock Volume (µL),Volume per Test (µL),Stain Type\n\
                IFNg,165Ho,80,2.0,Intracellular\n\
                CD3,170Er,500,2.0,\n";
    let ledger = read_inventory_csv(data.as_bytes()).expect("import");
    assert_eq!(ledger.records()[0].stain_type, StainType::Intracellular);
    assert_eq!(ledger.records()[1].stain_type, StainType::Extracellular);
    // Blank threshold falls back to the default.
    assert_eq!(ledger.records()[1].alert_threshold, 50.0);
}

#[test]
fn import_reports_bad_row() {
    let data = "Antigen,Stock Volume (µL)\nCD3,500\nCD4,lots\n";
    let error = read_inventory_csv(data.as_bytes()).unwrap_err();
    match error {
        ReportError::InvalidRow { row, source } => {
            assert_eq!(row, 3);
            assert!(matches!(source, PanelError::Validation { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn import_requires_stock_column() {
    let data = "Antigen,Metal\nCD3,170Er\n";
    assert!(matches!(
        read_inventory_csv(data.as_bytes()),
        Err(ReportError::MissingColumn { .. })
    ));
}

#[test]
fn export_to_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut ledger = InventoryLedger::seeded();
    let history = executed_history(&mut ledger);

    let inventory_path = dir.path().join("antibody_inventory.csv");
    let history_path = dir.path().join("panel_history.csv");
    export_inventory(&ledger, &inventory_path).expect("export inventory");
    export_history(&history, &history_path).expect("export history");

    let reloaded = load_inventory(&inventory_path).expect("load inventory");
    assert_eq!(reloaded.records()[0].stock_volume, 498.0);
    assert_eq!(reloaded.records()[2].stock_volume, 30.0);
    let history_text = std::fs::read_to_string(&history_path).expect("read history");
    assert_eq!(history_text.lines().count(), 3);

    let missing = load_inventory(&dir.path().join("nope.csv"));
    assert!(matches!(missing, Err(ReportError::Io { .. })));
}
