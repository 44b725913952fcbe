use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use super::entry::{Dictionary, KeyValuePair, lower};
use crate::non_concurrent::rbtree::RBTreeError;

/// One line of dictionary input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `+ <key> <value>`
    Insert(KeyValuePair),
    /// `- <key>`
    Remove { key: String },
    /// `! Save <path>`
    Save { path: PathBuf },
    /// `! Load <path>`
    Load { path: PathBuf },
    /// `print`
    Print,
    /// any other word
    Lookup { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing key after `{0}`")]
    MissingKey(&'static str),

    #[error("missing value for `{0}`")]
    MissingValue(String),

    #[error("`{0}` is not a number between 0 and 2^64-1")]
    BadValue(String),

    #[error("expected `Save` or `Load` after `!`, found `{0}`")]
    UnknownAction(String),

    #[error("missing file name")]
    MissingPath,
}

impl Command {
    /// Parses one input line. Blank lines are `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };

        let command = match first {
            "+" => {
                let key = words.next().ok_or(ParseError::MissingKey("+"))?;
                let raw = words.next().ok_or_else(|| ParseError::MissingValue(lower(key)))?;
                let value = raw.parse().map_err(|_| ParseError::BadValue(raw.to_owned()))?;
                Command::Insert(KeyValuePair::new(key, value))
            }
            "-" => {
                let key = words.next().ok_or(ParseError::MissingKey("-"))?;
                Command::Remove { key: lower(key) }
            }
            // `! Save path` and `!Save path`; the path is the rest of the line
            "!" | "!Save" | "!Load" => {
                let rest = line.trim_start()[1..].trim_start();
                let (action, path) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let path = path.trim();
                if action.is_empty() {
                    return Err(ParseError::UnknownAction(String::new()));
                }
                if !matches!(action, "Save" | "Load") {
                    return Err(ParseError::UnknownAction(action.to_owned()));
                }
                if path.is_empty() {
                    return Err(ParseError::MissingPath);
                }
                let path = PathBuf::from(path);
                match action {
                    "Save" => Command::Save { path },
                    _ => Command::Load { path },
                }
            }
            "print" => Command::Print,
            word => Command::Lookup { key: lower(word) },
        };
        Ok(Some(command))
    }
}

/// Which snapshot format `! Save` and `! Load` use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PersistFormat {
    #[default]
    Binary,
    Text,
}

/// A dictionary plus the status-line protocol around it.
pub struct Session {
    tree: Dictionary,
    format: PersistFormat,
}

impl Session {
    pub fn new(format: PersistFormat) -> Self {
        Self { tree: Dictionary::new(), format }
    }

    pub fn tree(&self) -> &Dictionary {
        &self.tree
    }

    /// Runs every line of `input`, writing one status line per command.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Some(command)) => self.execute(command, out)?,
                Ok(None) => {}
                Err(err) => writeln!(out, "Error: {err}")?,
            }
        }
        out.flush()
    }

    /// Applies one command. Only a failure to write to `out` is an error here;
    /// everything else becomes a status line.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        debug!("executing {command:?}");
        match command {
            Command::Insert(entry) => match self.tree.insert(entry) {
                Ok(()) => writeln!(out, "OK"),
                Err(RBTreeError::DuplicateKey) => writeln!(out, "Exist"),
                Err(err) => writeln!(out, "Error: {err}"),
            },
            Command::Remove { key } => match self.tree.remove(&KeyValuePair::probe(&key)) {
                Ok(_) => writeln!(out, "OK"),
                Err(RBTreeError::NotFound | RBTreeError::EmptyTree) => writeln!(out, "NoSuchWord"),
                Err(err) => writeln!(out, "Error: {err}"),
            },
            Command::Lookup { key } => match self.tree.find(&KeyValuePair::probe(&key)) {
                Ok(entry) => writeln!(out, "OK: {}", entry.value),
                Err(_) => writeln!(out, "NoSuchWord"),
            },
            Command::Print => {
                write!(out, "{}", self.tree.pretty())?;
                writeln!(out)
            }
            Command::Save { path } => match self.save(&path) {
                Ok(()) => writeln!(out, "OK"),
                Err(err) => writeln!(out, "Error: {err}"),
            },
            Command::Load { path } => {
                if !path.exists() {
                    return writeln!(out, "Error: File '{}' does not exist", path.display());
                }
                let Ok(file) = File::open(&path) else {
                    return writeln!(out, "Error: Cannot open file");
                };
                match self.load(file) {
                    Ok(()) => writeln!(out, "OK"),
                    Err(err) => writeln!(out, "Error: {err}"),
                }
            }
        }
    }

    fn save(&self, path: &Path) -> Result<(), RBTreeError> {
        let mut writer = BufWriter::new(File::create(path)?);
        match self.format {
            PersistFormat::Binary => self.tree.write_binary(&mut writer)?,
            PersistFormat::Text => self.tree.write_text(&mut writer)?,
        }
        writer.flush()?;
        info!("saved {} entries to {}", self.tree.len(), path.display());
        Ok(())
    }

    fn load(&mut self, file: File) -> Result<(), RBTreeError> {
        let mut reader = BufReader::new(file);
        match self.format {
            PersistFormat::Binary => self.tree.load_binary(&mut reader)?,
            PersistFormat::Text => self.tree.load_text(&mut reader)?,
        }
        info!("loaded {} entries", self.tree.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(session: &mut Session, input: &str) -> String {
        let mut out = Vec::new();
        session.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(Command::parse("+ Word 12"), Ok(Some(Command::Insert(KeyValuePair::new("word", 12)))));
        assert_eq!(Command::parse("- WORD"), Ok(Some(Command::Remove { key: "word".into() })));
        assert_eq!(Command::parse("! Save /tmp/a b"), Ok(Some(Command::Save { path: "/tmp/a b".into() })));
        assert_eq!(Command::parse("!Load  x.bin "), Ok(Some(Command::Load { path: "x.bin".into() })));
        assert_eq!(Command::parse("print"), Ok(Some(Command::Print)));
        assert_eq!(Command::parse("Hello"), Ok(Some(Command::Lookup { key: "hello".into() })));
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn bang_words_are_lookups() {
        assert_eq!(Command::parse("!foo"), Ok(Some(Command::Lookup { key: "!foo".into() })));
        assert_eq!(Command::parse("!Saved x"), Ok(Some(Command::Lookup { key: "!saved".into() })));
        let mut session = Session::new(PersistFormat::Binary);
        assert_eq!(run(&mut session, "!foo\n"), "NoSuchWord\n");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Command::parse("+"), Err(ParseError::MissingKey("+")));
        assert_eq!(Command::parse("+ a"), Err(ParseError::MissingValue("a".into())));
        assert_eq!(Command::parse("+ a -1"), Err(ParseError::BadValue("-1".into())));
        assert_eq!(Command::parse("-"), Err(ParseError::MissingKey("-")));
        assert_eq!(Command::parse("! Drop x"), Err(ParseError::UnknownAction("Drop".into())));
        assert_eq!(Command::parse("! Save"), Err(ParseError::MissingPath));
    }

    #[test]
    fn status_lines() {
        let mut session = Session::new(PersistFormat::Binary);
        let input = "+ a 1\n+ A 2\na\nb\n- b\n- A\na\n+ x\n";
        let expected = "OK\nExist\nOK: 1\nNoSuchWord\nNoSuchWord\nOK\nNoSuchWord\nError: missing value for `x`\n";
        assert_eq!(run(&mut session, input), expected);
        assert!(session.tree().is_empty());
    }

    #[test]
    fn print_dumps_tree() {
        let mut session = Session::new(PersistFormat::Binary);
        let output = run(&mut session, "+ b 2\n+ a 1\n+ c 3\nprint\n");
        assert_eq!(output, "OK\nOK\nOK\n    (c 3, 1)\n /\n(b 2, 0)\n \\\n    (a 1, 1)\n\n");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        let mut session = Session::new(PersistFormat::Binary);
        let output = run(&mut session, &format!("! Load {}\n", path.display()));
        assert_eq!(output, format!("Error: File '{}' does not exist\n", path.display()));
    }

    #[test]
    fn save_and_load_in_both_formats() {
        for format in [PersistFormat::Binary, PersistFormat::Text] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("dict");
            let mut session = Session::new(format);
            let mut input = String::new();
            for i in 0..10 {
                input.push_str(&format!("+ w{i} {i}\n"));
            }
            input.push_str(&format!("! Save {}\n- w3\n! Load {}\nw3\n", path.display(), path.display()));

            let output = run(&mut session, &input);
            assert_eq!(output, format!("{}OK\nOK\nOK\nOK: 3\n", "OK\n".repeat(10)));
            assert_eq!(session.tree().len(), 10);
        }
    }

    #[test]
    fn corrupt_file_keeps_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let mut session = Session::new(PersistFormat::Binary);
        let output = run(&mut session, &format!("+ keep 1\n! Load {}\nkeep\n", path.display()));
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "OK");
        assert!(lines[1].starts_with("Error: corrupt tree stream"));
        assert_eq!(lines[2], "OK: 1");
    }
}
