use colored::Colorize;
use envsweep_core::Prompter;
use std::io::{BufRead, Write};

/// Prompter on the controlling terminal (stdout/stdin)
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn show(&mut self, text: &str) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        if text.starts_with("WARNING") {
            writeln!(stdout, "{}", text.yellow().bold())?;
        } else {
            writeln!(stdout, "{}", text)?;
        }
        writeln!(stdout)
    }

    fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        print!("{} [y/N]: ", question.bold());
        std::io::stdout().flush()?;

        let mut input = String::new();
        // EOF counts as "no"
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            println!();
            return Ok(false);
        }

        let answer = input.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}
