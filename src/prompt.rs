//! Prompt construction for the agent gateway.
//!
//! The instruction block is fixed policy text; the only per-session part is
//! the data summary embedded in its ABOUT THE DATA section and the user's
//! question appended last. The full policy is rebuilt and resent with every
//! question rather than cached in agent-side instructions; the agent is
//! treated as stateless.

use crate::table::Table;

/// One line per table: its name and up to `cap` column names, in table order.
pub fn summarize_tables(tables: &[Table], cap: usize) -> String {
    tables
        .iter()
        .map(|t| t.summary_line(cap))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The fixed policy text with the per-session data summary embedded.
pub fn policy_text(tables: &[Table], summary_columns: usize) -> String {
    let summary = summarize_tables(tables, summary_columns);
    format!(
        "You are a strict data assistant working with one or more tables loaded from CSV files.

GENERAL RULES
- You MUST always inspect the tables before answering.
- You are NOT allowed to answer from general knowledge or guesses.
- Never respond with \"you can find it in column X\" or \"it is stored in the table\".
- Always return the actual values from the tables.

TEXT QUESTIONS (FAQs / policies, etc.)
- For questions like \"what is the return policy\" or \"what is the warranty\", do this:
  1. Look through all text columns for rows matching the question's keywords
     (case-insensitive substring matching).
  2. If there is a column named 'Answer', 'Policy', 'Description', 'Details'
     or similar, treat that as the main answer column.
  3. Return the cell text from the most relevant row(s).
  4. If multiple rows are relevant, list them clearly (e.g. bullet points).

NUMERIC QUESTIONS
- For numeric questions (totals, counts, averages, etc.), compute the result
  from the numeric columns (sum, mean, count, group-by) and give the computed
  result rather than an estimate.

ABOUT THE DATA
The following tables are loaded from CSV files:
{summary}

ANSWER STYLE
- Answer in plain English.
- Quote the actual text or numbers from the tables.
- Only mention file/column names briefly if helpful."
    )
}

/// Final directive: policy text (summary embedded) + the literal question.
/// Pure; identical inputs yield an identical string.
pub fn build_prompt(tables: &[Table], question: &str, summary_columns: usize) -> String {
    format!(
        "{}\n\nNow answer this question using the tables only:\n{}",
        policy_text(tables, summary_columns),
        question
    )
}
