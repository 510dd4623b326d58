// Where the human's answers come from
use crate::frame::Decision;
use std::io::{self, BufRead, ErrorKind, Write};

pub trait Prompt {
    fn rounds(&mut self) -> io::Result<u8>;

    fn decision(&mut self) -> io::Result<Decision>;
}

pub fn parse_rounds(line: &str) -> Option<u8> {
    line.trim().parse::<u8>().ok().filter(|&n| n > 0)
}

pub fn parse_decision(line: &str) -> Option<Decision> {
    match line.trim().to_ascii_lowercase().as_str() {
        "1" | "hit" => Some(Decision::Hit),
        "2" | "stand" => Some(Decision::Stand),
        _ => None,
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "input closed"));
        }

        Ok(line)
    }

    fn ask<T>(&mut self, question: &str, retry: &str, parse: fn(&str) -> Option<T>) -> io::Result<T> {
        writeln!(self.output, "{}", question)?;

        loop {
            if let Some(answer) = parse(&self.read_line()?) {
                return Ok(answer);
            }

            writeln!(self.output, "{}", retry)?;
        }
    }
}

impl<R: BufRead, W: Write> Prompt for Console<R, W> {
    fn rounds(&mut self) -> io::Result<u8> {
        self.ask(
            "How many rounds do you want to play?",
            "Please enter a number between 1 and 255.",
            parse_rounds,
        )
    }

    fn decision(&mut self) -> io::Result<Decision> {
        self.ask(
            "Choose the number that matches your choice:\n1.Hit\n2.Stand",
            "Invalid choice please pick again:\n1.Hit\n2.Stand",
            parse_decision,
        )
    }
}
