//! Minimal interactive demo of the `lineedit` crate: a toy REPL that
//! echoes back whatever it reads, with history persistence, a filename
//! completer, and Ctrl-C handled as "start this line over" rather than
//! killing the process.

use lineedit::config::Config;
use lineedit::completion::FilenameCompleter;
use lineedit::editor::{default_history_path, Editor};

fn main() {
    let config = Config::builder().auto_add_history(true).build();
    let mut editor = Editor::new(config);
    editor.set_completer(FilenameCompleter::new());

    if let Some(path) = default_history_path() {
        editor.load_history(&path);
    }

    println!("lineedit demo. Ctrl-D exits, Ctrl-C clears the current line.");

    loop {
        let result = editor.handle_interrupt(
            |_ed| {
                println!("^C");
                Some(String::new())
            },
            |ed| ed.read_line("> "),
        );

        match result {
            Ok(Some(line)) => {
                if line == "exit" {
                    break;
                }
                if !line.is_empty() {
                    let _ = editor.output_line(&format!("=> {line}"));
                }
            }
            Ok(None) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("lineedit-demo: {e}");
                break;
            }
        }
    }

    editor.save_history();

    if let Ok(Some(secret)) = editor.read_password("password: ", Some('*')) {
        println!("got {} chars", secret.chars().count());
    }
}
