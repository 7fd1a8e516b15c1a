use std::io::{self, Read};
use std::process::ExitCode;

// Usage: markclip [FORMAT] < page.html
fn main() -> ExitCode {
    let format = std::env::args().nth(1).unwrap_or_else(|| "markdown".to_string());

    let mut html = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut html) {
        eprintln!("markclip: failed to read stdin: {err}");
        return ExitCode::FAILURE;
    }

    let node = markclip::dom::parse_document(&html);
    match markclip::convert(&node, &format) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("markclip: {err}");
            ExitCode::from(2)
        }
    }
}
