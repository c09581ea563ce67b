use serde::Serialize;
use std::fmt;

/// One column of a registered table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// One registered table with its columns in schema order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
}

/// Textual listing of tables and columns, regenerated per request from the
/// live store and fed verbatim into prompt construction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SchemaDescription {
    pub tables: Vec<TableDescription>,
}

impl SchemaDescription {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            let columns = table
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.data_type))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}({columns})", table.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_tables_with_columns() {
        let description = SchemaDescription {
            tables: vec![TableDescription {
                name: "orders".to_string(),
                columns: vec![
                    ColumnDescription {
                        name: "id".to_string(),
                        data_type: "Int64".to_string(),
                        nullable: true,
                    },
                    ColumnDescription {
                        name: "amount".to_string(),
                        data_type: "Float64".to_string(),
                        nullable: true,
                    },
                ],
            }],
        };
        assert_eq!(description.to_string(), "orders(id Int64, amount Float64)\n");
    }

    #[test]
    fn empty_description_renders_nothing() {
        let description = SchemaDescription { tables: vec![] };
        assert!(description.is_empty());
        assert_eq!(description.to_string(), "");
    }
}
