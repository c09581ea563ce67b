use datafusion::sql::sqlparser::ast::Statement;
use datafusion::sql::sqlparser::dialect::GenericDialect;
use datafusion::sql::sqlparser::parser::Parser;
use snafu::ResultExt;

use crate::error::{self as agent_error, AgentError, AgentResult};

/// Strip surrounding markdown code fences and whitespace from a raw model
/// completion. Language tags on the opening fence ("sql", "sqlite") are
/// dropped too. Text without fences passes through trimmed.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest
            .strip_prefix("sqlite")
            .or_else(|| rest.strip_prefix("sql"))
            .unwrap_or(rest);
        rest.strip_suffix("```").unwrap_or(rest)
    } else {
        trimmed
    };
    inner.trim().to_string()
}

/// Reject anything that is not exactly one `SELECT`-shaped statement. The
/// model output is untrusted text; a `DROP TABLE` must never reach the
/// store.
pub fn ensure_read_only(statement: &str) -> AgentResult<()> {
    let parsed = Parser::parse_sql(&GenericDialect {}, statement).context(
        agent_error::SqlParseSnafu {
            statement: statement.to_string(),
        },
    )?;
    let [single] = parsed.as_slice() else {
        return Err(AgentError::StatementRejected {
            statement: statement.to_string(),
        });
    };
    match single {
        Statement::Query(_) => Ok(()),
        _ => Err(AgentError::StatementRejected {
            statement: statement.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_sql_is_unwrapped() {
        assert_eq!(strip_code_fences("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(strip_code_fences("```sqlite\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(strip_code_fences("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn plain_sql_is_only_trimmed() {
        assert_eq!(strip_code_fences("  SELECT * FROM products \n"), "SELECT * FROM products");
    }

    #[test]
    fn select_statements_pass_the_gate() {
        assert!(ensure_read_only("SELECT * FROM products").is_ok());
        assert!(ensure_read_only("SELECT name, SUM(sales) FROM products GROUP BY name").is_ok());
        assert!(ensure_read_only("WITH t AS (SELECT 1 AS x) SELECT x FROM t").is_ok());
    }

    #[test]
    fn mutating_statements_are_rejected() {
        for statement in [
            "DROP TABLE products",
            "DELETE FROM products",
            "INSERT INTO products VALUES (1)",
            "UPDATE products SET sales = 0",
            "CREATE TABLE t (x INT)",
        ] {
            assert!(matches!(
                ensure_read_only(statement),
                Err(AgentError::StatementRejected { .. })
            ));
        }
    }

    #[test]
    fn multiple_statements_are_rejected() {
        assert!(matches!(
            ensure_read_only("SELECT 1; DROP TABLE products"),
            Err(AgentError::StatementRejected { .. })
        ));
    }

    #[test]
    fn unparseable_text_is_a_parse_error() {
        assert!(matches!(
            ensure_read_only("this is not sql at all !!"),
            Err(AgentError::SqlParse { .. })
        ));
    }
}
