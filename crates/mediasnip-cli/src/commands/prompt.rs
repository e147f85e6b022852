//! Line-based terminal prompts

use anyhow::{bail, Result};
use std::fmt::Display;
use std::io::{self, Write};

/// Print `question` and read one trimmed line. EOF is an error so a closed
/// stdin cannot spin a retry loop forever.
pub fn ask(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        bail!("No input available on stdin");
    }
    Ok(input.trim().to_string())
}

/// Like [`ask`], returning `default` for an empty answer.
pub fn ask_or(question: &str, default: &str) -> Result<String> {
    let answer = ask(&format!("{} [{}]: ", question, default))?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum Choice {
    Index(usize),
    Cancel,
}

/// Interpret a menu answer against `count` numbered entries (1-based).
pub fn parse_choice(input: &str, count: usize) -> Result<Choice, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Ok(Choice::Cancel);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(Choice::Index(n - 1)),
        Ok(_) => Err(format!("Please select a number between 1 and {}.", count)),
        Err(_) => Err("Please enter a valid number or 'q' to cancel.".to_string()),
    }
}

/// Numbered menu; asks again until the answer is valid. `None` means the
/// user cancelled with `q`.
pub fn choose<T: Display>(title: &str, items: &[T]) -> Result<Option<usize>> {
    println!("\n{}", title);
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }

    loop {
        let answer = ask("Select a number (or 'q' to cancel): ")?;
        match parse_choice(&answer, items.len()) {
            Ok(Choice::Index(i)) => return Ok(Some(i)),
            Ok(Choice::Cancel) => return Ok(None),
            Err(msg) => println!("Error: {}", msg),
        }
    }
}
