use std::io::{self, Write};

use indexmap::IndexSet;

use super::executor::CommandResult;
use crate::{catalog::defs::TableSchema, core::Record};

lazy_static! {
    static ref HELP: Vec<(&'static str, &'static str)> = vec![
        ("create_table <table> <column:type> ...", "create a table; types are int, str, bool"),
        ("list_tables", "show every table"),
        ("drop_table <table>", "delete a table's definition"),
        ("info <table>", "show a table's columns and record count"),
        ("insert into <table> values (<value>, ...)", "add a record"),
        ("select from <table> [where <column> = <value>]", "show records"),
        ("update <table> set <column> = <value> where <column> = <value>", "change records"),
        ("delete from <table> where <column> = <value>", "remove records"),
        ("help", "show this help"),
        ("exit", "leave the program"),
    ];
}

/// Write the user-facing rendering of `result`.
pub fn render<W: Write>(output: &mut W, result: &CommandResult) -> io::Result<()> {
    match result {
        CommandResult::Created { table, schema } => writeln!(
            output,
            "Table \"{}\" created with columns: {}",
            table,
            schema.describe()
        ),
        CommandResult::Dropped { table } => writeln!(output, "Table \"{}\" dropped.", table),
        CommandResult::Tables(tables) => {
            if tables.is_empty() {
                return writeln!(output, "No tables.");
            }
            for table in tables {
                writeln!(output, "- {}", table)?;
            }
            Ok(())
        }
        CommandResult::Info(info) => {
            writeln!(output, "Table: {}", info.name)?;
            writeln!(output, "Columns: {}", info.schema.describe())?;
            writeln!(output, "Records: {}", info.record_count)
        }
        CommandResult::Inserted { table, id } => writeln!(
            output,
            "Record with ID={} inserted into \"{}\".",
            id, table
        ),
        CommandResult::Records { schema, records } => {
            if records.is_empty() {
                return writeln!(output, "No records found.");
            }
            write_grid(output, schema, records)
        }
        CommandResult::Updated { table, ids } => {
            if ids.is_empty() {
                return writeln!(output, "No records matched.");
            }
            for id in ids {
                writeln!(output, "Record with ID={} in \"{}\" updated.", id, table)?;
            }
            Ok(())
        }
        CommandResult::Deleted { table, count } => {
            if *count == 0 {
                return writeln!(output, "Nothing to delete.");
            }
            writeln!(output, "Deleted {} record(s) from \"{}\".", count, table)
        }
        CommandResult::Cancelled => writeln!(output, "Operation cancelled."),
        CommandResult::Help => write_help(output),
        CommandResult::Exit => writeln!(output, "Bye."),
    }
}

fn write_help<W: Write>(output: &mut W) -> io::Result<()> {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    writeln!(output, "Commands:")?;
    for (usage, description) in HELP.iter() {
        writeln!(output, "  {:width$}  {}", usage, description, width = width)?;
    }
    Ok(())
}

/// Schema columns first, then any stray fields found in the records.
fn grid_columns<'a>(schema: &'a TableSchema, records: &'a [Record]) -> Vec<&'a str> {
    let mut columns = schema
        .columns
        .keys()
        .map(String::as_str)
        .collect::<IndexSet<_>>();
    for record in records {
        columns.extend(record.fields.keys().map(String::as_str));
    }
    columns.into_iter().collect()
}

fn write_grid<W: Write>(
    output: &mut W,
    schema: &TableSchema,
    records: &[Record],
) -> io::Result<()> {
    let columns = grid_columns(schema, records);
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(ToString::to_string).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let border = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+", border);

    let line = |cells: &[&str]| {
        let cells = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!(" {}{} ", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("|");
        format!("|{}|", cells)
    };

    writeln!(output, "{}", border)?;
    writeln!(output, "{}", line(&columns[..]))?;
    writeln!(output, "{}", border)?;
    for row in &rows {
        let cells = row.iter().map(String::as_str).collect::<Vec<_>>();
        writeln!(output, "{}", line(&cells[..]))?;
    }
    writeln!(output, "{}", border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::defs::Metadata, core::Datum};

    fn rendered(result: &CommandResult) -> String {
        let mut out = vec![];
        render(&mut out, result).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn grid_of_records() {
        let mut metadata = Metadata::new();
        let schema = metadata
            .create_table("users", &["name:str", "age:int"])
            .unwrap()
            .clone();
        let records = vec![
            [
                ("ID", Datum::Int(1)),
                ("name", Datum::from("Sergei")),
                ("age", Datum::Int(28)),
            ]
            .into_iter()
            .collect(),
            [("ID", Datum::Int(2)), ("name", Datum::from("Аня"))]
                .into_iter()
                .collect(),
        ];

        let text = rendered(&CommandResult::Records { schema, records });
        let expected = "\
+----+--------+-----+
| ID | name   | age |
+----+--------+-----+
| 1  | Sergei | 28  |
| 2  | Аня    |     |
+----+--------+-----+
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_results_have_their_own_messages() {
        assert_eq!(rendered(&CommandResult::Tables(vec![])), "No tables.\n");
        assert_eq!(
            rendered(&CommandResult::Records {
                schema: TableSchema::default(),
                records: vec![],
            }),
            "No records found.\n"
        );
        assert_eq!(
            rendered(&CommandResult::Updated {
                table: "t".into(),
                ids: vec![],
            }),
            "No records matched.\n"
        );
        assert_eq!(
            rendered(&CommandResult::Deleted {
                table: "t".into(),
                count: 0,
            }),
            "Nothing to delete.\n"
        );
    }

    #[test]
    fn table_list() {
        let text = rendered(&CommandResult::Tables(vec!["users".into(), "tags".into()]));
        assert_eq!(text, "- users\n- tags\n");
    }

    #[test]
    fn help_lists_every_command() {
        let text = rendered(&CommandResult::Help);
        for word in [
            "create_table",
            "list_tables",
            "drop_table",
            "info",
            "insert",
            "select",
            "update",
            "delete",
            "exit",
        ] {
            assert!(text.contains(word), "{}", word);
        }
    }
}
