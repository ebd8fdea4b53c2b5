use std::io::{self, BufRead, Write};

/// Yes/no capability consulted before anything is deleted.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

impl<K: Confirm + ?Sized> Confirm for &K {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        (**self).confirm(prompt)
    }
}

/// Accepts without asking, for `--yes`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        tracing::debug!(prompt, "confirmation assumed");
        Ok(true)
    }
}

/// Asks on stderr and reads one line from stdin.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        ask(prompt, &mut io::stdin().lock(), &mut io::stderr().lock())
    }
}

fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

/// Only a lone `y` or `Y` counts as yes.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  y \r\n"));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn ask_writes_prompt_and_reads_answer() {
        let mut input = io::Cursor::new(b"Y\n".to_vec());
        let mut output = Vec::new();

        let accepted = ask("delete 3 entries?", &mut input, &mut output).unwrap();

        assert!(accepted);
        assert_eq!(String::from_utf8(output).unwrap(), "delete 3 entries? [y/N]: ");
    }

    #[test]
    fn eof_declines() {
        let mut input = io::Cursor::new(Vec::new());
        let mut output = Vec::new();
        assert!(!ask("go?", &mut input, &mut output).unwrap());
    }
}
