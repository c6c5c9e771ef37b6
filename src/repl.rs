//! Interactive front-end.
//!
//! Input lines are collected until one ends with `;`, then the collected text
//! is executed as one script. Lines starting with `.` at the beginning of a
//! statement are shell commands.

use std::io::{self, BufRead, Write};

use crate::engine::{ComplexError, Engine, StatementResult};
use crate::graph_catalog::SchemaView;

const PROMPT: &str = "complexgraph> ";
const CONTINUATION_PROMPT: &str = "         ...> ";

const HELP: &str = "\
Statements end with `;` and may span several lines.
  ENTITY, RELATIONSHIP      define schema
  INSERT, CONNECT           create vertices and edges
  UPDATE, DELETE            modify elements by alias, id or pattern
  MATCH ... RETURN ...      query the graph
Commands:
  .help                     show this text
  .schema                   list defined entity and relationship types
  .exit                     leave the shell";

/// One-line rendering used by the shell and the `run` command.
pub fn format_error(err: &ComplexError) -> String {
    match err.position() {
        Some(position) => format!(
            "{} at line {}, column {}: {}",
            err.kind(),
            position.line,
            position.column,
            err
        ),
        None => format!("{}: {}", err.kind(), err),
    }
}

pub fn print_results<W: Write>(output: &mut W, results: &[StatementResult]) -> io::Result<()> {
    for result in results {
        writeln!(output, "{}", result)?;
    }
    Ok(())
}

async fn print_schema<W: Write>(engine: &Engine, output: &mut W) -> io::Result<()> {
    let schema = engine.schema().await;
    let mut entities: Vec<_> = schema.entities().collect();
    entities.sort_by(|a, b| a.name.cmp(&b.name));
    for entity in entities {
        let fields: Vec<String> = schema
            .effective_fields(&entity.name)
            .unwrap_or_default()
            .iter()
            .map(|field| format!("{}: {}", field.name, field.field_type))
            .collect();
        match &entity.parent {
            Some(parent) => writeln!(
                output,
                "ENTITY {} EXTENDS {} {{ {} }}",
                entity.name,
                parent,
                fields.join(", ")
            )?,
            None => writeln!(output, "ENTITY {} {{ {} }}", entity.name, fields.join(", "))?,
        }
    }
    let mut relationships: Vec<_> = schema.relationships().collect();
    relationships.sort_by(|a, b| a.name.cmp(&b.name));
    for relationship in relationships {
        writeln!(
            output,
            "RELATIONSHIP {} ({} -> {})",
            relationship.name, relationship.source, relationship.target
        )?;
    }
    Ok(())
}

/// The part of `line` before a `//` or `--` comment. Markers inside string
/// literals are not comments.
fn strip_line_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '/' | '-' if !in_string && line[idx + 1..].starts_with(c) => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Runs the shell until `.exit` or end of input.
pub async fn run_repl<R: BufRead, W: Write>(
    engine: &Engine,
    input: R,
    mut output: W,
) -> io::Result<()> {
    let mut buffer = String::new();
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if buffer.trim().is_empty() && trimmed.starts_with('.') {
            match trimmed {
                ".exit" | ".quit" => return Ok(()),
                ".help" => writeln!(output, "{}", HELP)?,
                ".schema" => print_schema(engine, &mut output).await?,
                other => writeln!(output, "Unknown command `{}`; try .help", other)?,
            }
        } else if !trimmed.is_empty() || !buffer.is_empty() {
            buffer.push_str(&line);
            buffer.push('\n');
            if strip_line_comment(trimmed).trim_end().ends_with(';') {
                match engine.execute(&buffer).await {
                    Ok(results) => print_results(&mut output, &results)?,
                    Err(err) => writeln!(output, "{}", format_error(&err))?,
                }
                buffer.clear();
            }
        }

        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };
        write!(output, "{}", prompt)?;
        output.flush()?;
    }

    if !buffer.trim().is_empty() {
        writeln!(output, "\nDiscarded unterminated input (missing `;`)")?;
    }
    writeln!(output)?;
    Ok(())
}
