use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use abpanel_core::{PanelSummary, group_by_stain};
use abpanel_model::{HistoryEntry, ReagentRecord, Shortfall};

pub fn print_inventory(records: &[&ReagentRecord], alert_count: usize) {
    if records.is_empty() {
        println!("No reagents match.");
    } else {
        let groups = group_by_stain(records);
        for (title, section) in [
            ("Extracellular", &groups.extracellular),
            ("Intracellular", &groups.intracellular),
        ] {
            if section.is_empty() {
                continue;
            }
            println!("{title}:");
            println!("{}", inventory_table(section));
        }
    }
    match alert_count {
        0 => println!("All reagents above their alert threshold."),
        1 => println!("1 reagent at or below its alert threshold."),
        n => println!("{n} reagents at or below their alert threshold."),
    }
}

fn inventory_table(records: &[&ReagentRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Antigen"),
        header_cell("Clone"),
        header_cell("Metal"),
        header_cell("µL/test"),
        header_cell("Stock (µL)"),
        header_cell("Alert (µL)"),
        header_cell("Conjugated"),
        header_cell("Notes"),
    ]);
    apply_table_style(&mut table);
    for index in [0, 4, 5, 6] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for record in records {
        table.add_row(vec![
            dim_cell(record.id),
            Cell::new(&record.antigen).add_attribute(Attribute::Bold),
            Cell::new(&record.clone),
            Cell::new(&record.metal),
            Cell::new(format!("{:.2}", record.volume_per_test)),
            stock_cell(record),
            dim_cell(format!("{:.2}", record.alert_threshold)),
            Cell::new(&record.date_conjugated),
            Cell::new(&record.notes),
        ]);
    }
    table
}

pub fn print_panel(summary: &PanelSummary<'_>) {
    let name = if summary.name.trim().is_empty() {
        "(unnamed)"
    } else {
        summary.name.as_str()
    };
    println!("Panel: {name}");
    println!("Cells: {} million", summary.cell_count);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Antigen"),
        header_cell("Metal"),
        header_cell("Stain"),
        header_cell("Required (µL)"),
        header_cell("Stock (µL)"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for line in &summary.lines {
        let required = Cell::new(format!("{:.2}", line.required));
        let required = if line.required > line.reagent.stock_volume {
            required.fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            required
        };
        table.add_row(vec![
            Cell::new(&line.reagent.antigen).add_attribute(Attribute::Bold),
            Cell::new(&line.reagent.metal),
            dim_cell(line.reagent.stain_type),
            required,
            stock_cell(line.reagent),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format!("{:.2}", summary.total_volume())).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
}

pub fn print_shortfalls(shortfalls: &[Shortfall]) {
    eprintln!("Insufficient stock:");
    for shortfall in shortfalls {
        eprintln!("- {shortfall} (short {:.2} µL)", shortfall.missing());
    }
}

pub fn print_entry(entry: &HistoryEntry) {
    println!(
        "Executed '{}' for {} at {} ({} million cells)",
        entry.panel_name,
        entry.user,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.cell_count
    );
    println!("Used: {}", entry.antibody_list());
    println!("Total: {:.2} µL", entry.total_volume());
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stock_cell(record: &ReagentRecord) -> Cell {
    let cell = Cell::new(format!("{:.2}", record.stock_volume));
    if record.is_low_stock() {
        cell.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Green)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
