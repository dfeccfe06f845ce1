//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;
use host_runtime::HostValue;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(runtime: &Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Corten Bridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Type script code or 'exit' to quit.");
    println!();

    let mut line_buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { "> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline && (trimmed == "exit" || trimmed == ".exit" || trimmed == "quit") {
                    println!("Goodbye!");
                    break;
                }

                if !in_multiline && trimmed.starts_with('.') {
                    handle_repl_command(trimmed, runtime);
                    continue;
                }

                if in_multiline {
                    line_buffer.push('\n');
                }
                line_buffer.push_str(&line);

                if !is_input_complete(&line_buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;
                let _ = editor.add_history_entry(&line_buffer);

                match runtime.execute_string(&line_buffer) {
                    Ok(value) => println!("{}", format_value(&value)),
                    Err(e) => eprintln!("Error: {}", e),
                }
                line_buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    println!("^C");
                    line_buffer.clear();
                    in_multiline = false;
                } else {
                    println!("Press Ctrl-D or type 'exit' to quit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Handle special REPL commands
fn handle_repl_command(command: &str, runtime: &Runtime) {
    let context = runtime.context();
    match command {
        ".help" => {
            println!("REPL Commands:");
            println!("  .help     - Show this help message");
            println!("  .clear    - Clear the screen");
            println!("  .config   - Show the bridge configuration");
            println!("  .gc       - Collect garbage until the heap settles");
            println!("  .error    - Show the last bridge diagnostic");
            println!("  .exit     - Exit the REPL");
            println!("  exit      - Exit the REPL");
            println!("  quit      - Exit the REPL");
        }
        ".clear" => {
            print!("\x1B[2J\x1B[1;1H");
        }
        ".config" => match context.config().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        },
        ".gc" => {
            let mut passes = 1;
            while !context.idle_notification() {
                passes += 1;
            }
            println!(
                "Heap settled after {} pass(es), {} wrapper(s) live",
                passes,
                context.wrapper_count()
            );
        }
        ".error" => match context.last_error() {
            Some(message) => println!("{}", message),
            None => println!("No diagnostics"),
        },
        _ => {
            println!("Unknown command: {}", command);
            println!("Type .help for available commands");
        }
    }
}

/// Check if the input appears to be complete
///
/// This is a simple heuristic that checks for balanced braces/brackets/parens
fn is_input_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut string_char = ' ';
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }

        if !in_string {
            match c {
                '"' | '\'' => {
                    in_string = true;
                    string_char = c;
                }
                '{' | '[' | '(' => depth += 1,
                '}' | ']' | ')' => depth -= 1,
                _ => {}
            }
        } else if c == string_char {
            in_string = false;
        }
    }

    depth <= 0 && !in_string
}

/// Containers nested deeper than this print as `...`, which also stops
/// self-containing values.
const MAX_DISPLAY_DEPTH: usize = 4;

/// Format a converted value for display
fn format_value(value: &HostValue) -> String {
    format_nested(value, 0)
}

fn format_nested(value: &HostValue, depth: usize) -> String {
    match value {
        HostValue::Undef => "undefined".to_string(),
        HostValue::Str(s) => format!("'{}'", s),
        HostValue::Ref(_) if depth >= MAX_DISPLAY_DEPTH => "...".to_string(),
        HostValue::Ref(r) => match (r.array_elements(), r.hash_entries()) {
            (Some(elements), _) => {
                let items: Vec<String> = elements
                    .iter()
                    .map(|element| format_nested(element, depth + 1))
                    .collect();
                format!("[{}]", items.join(", "))
            }
            (_, Some(mut entries)) => {
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                let items: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, format_nested(v, depth + 1)))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            _ => value.to_display_string(),
        },
        other => other.to_display_string(),
    }
}
