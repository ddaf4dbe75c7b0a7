use std::io::IsTerminal;

use colored::Colorize;
use comfy_table::{presets, Cell, CellAlignment, Color, Table};
use gradewatch_core::{Exercise, Graded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Pretty,
    Plain,
}

/// Explicit flags win; otherwise decorate exactly when stdout is a
/// terminal.
pub fn resolve_style(pretty: bool, plain: bool) -> OutputStyle {
    if pretty {
        OutputStyle::Pretty
    } else if plain {
        OutputStyle::Plain
    } else if std::io::stdout().is_terminal() {
        OutputStyle::Pretty
    } else {
        OutputStyle::Plain
    }
}

pub fn course_heading(code: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Pretty => code.bold().to_string(),
        OutputStyle::Plain => code.to_string(),
    }
}

/// The per-course status table. Passed exercises are highlighted in the
/// pretty style.
pub fn exercise_table(exercises: &[Exercise], style: OutputStyle) -> Table {
    let mut table = Table::new();
    table.load_preset(match style {
        OutputStyle::Pretty => presets::UTF8_FULL,
        OutputStyle::Plain => presets::NOTHING,
    });
    table.set_header(vec!["Exercise", "Del", "Cor", "Res"]);

    for exercise in exercises {
        let cells = vec![
            exercise.name.clone(),
            yes_no(exercise.status.delivered).to_string(),
            yes_no(exercise.status.corrected).to_string(),
            exercise.status.graded.to_string(),
        ];
        let passed = exercise.status.graded == Graded::Pass;
        table.add_row(cells.into_iter().map(|text| {
            let cell = Cell::new(text);
            if passed && style == OutputStyle::Pretty {
                cell.fg(Color::Green)
            } else {
                cell
            }
        }));
    }

    for index in 1..=3 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Center);
        }
    }
    table
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
