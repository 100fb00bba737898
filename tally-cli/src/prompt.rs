use anyhow::Result;
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Ask a yes/no question. Anything but `y`/`yes` (including EOF) is no.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} (yes/no)"))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
