use core_store::SchemaDescription;

/// Fixed instruction prompt. The contract with every backend is the same:
/// one SQL statement, no prose, no markdown.
pub const SYSTEM_PROMPT: &str = "You are a SQL expert. Given a question and a database schema, \
     respond with a single valid SQL SELECT statement that answers the question. \
     Return ONLY the SQL statement, with no explanation and no markdown.";

/// Concatenate the live schema listing with the user's question.
#[must_use]
pub fn build_user_prompt(schema: &SchemaDescription, question: &str) -> String {
    format!(
        "Given the following table schemas:\n\n{schema}\n\
         Write a single, valid SQL query to answer the question: \"{question}\"\n\n\
         - Use only the provided table and column names.\n\
         - Do not add any comments or explanations.\n\n\
         Query:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::schema::{ColumnDescription, TableDescription};

    #[test]
    fn user_prompt_contains_schema_and_question() {
        let schema = SchemaDescription {
            tables: vec![TableDescription {
                name: "products".to_string(),
                columns: vec![ColumnDescription {
                    name: "sales".to_string(),
                    data_type: "Int64".to_string(),
                    nullable: true,
                }],
            }],
        };
        let prompt = build_user_prompt(&schema, "What is the total sales?");
        assert!(prompt.contains("products(sales Int64)"));
        assert!(prompt.contains("What is the total sales?"));
    }
}
