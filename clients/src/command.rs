//! Shell commands.
//!
//! A line is split on whitespace. The first word names the command: an
//! exact match wins, otherwise it must be a case-insensitive prefix of
//! exactly one command name. The remaining words are the arguments.

use std::path::PathBuf;
use std::str::FromStr;

use ained::{CoefficientBank, Metric, UNBOUNDED_REACH};
use thiserror::Error;

/// Factor used when `update_coeffs_*` is given none.
pub const DEFAULT_FACTOR: f32 = 0.7;

/// One entry of the command table.
#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    /// Command word.
    pub name: &'static str,
    /// Argument synopsis.
    pub usage: &'static str,
    /// One-line description.
    pub help: &'static str,
}

/// Every command, in help order.
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo { name: "quit", usage: "quit", help: "leave the shell" },
    CommandInfo { name: "help", usage: "help", help: "this help message" },
    CommandInfo { name: "print", usage: "print", help: "print the memory grid" },
    CommandInfo { name: "info", usage: "info", help: "print registers, dipoles and words" },
    CommandInfo { name: "coeffs", usage: "coeffs", help: "print both coefficient kernels" },
    CommandInfo {
        name: "update_coeffs_euclidean",
        usage: "update_coeffs_euclidean [high|low] [factor] [reach]",
        help: "load a Euclidean decay kernel",
    },
    CommandInfo {
        name: "update_coeffs_manhattan",
        usage: "update_coeffs_manhattan [high|low] [factor] [reach]",
        help: "load a Manhattan decay kernel",
    },
    CommandInfo { name: "set", usage: "set <row> <col> <0|1>", help: "stage one bit" },
    CommandInfo { name: "commit", usage: "commit", help: "write the staged word" },
    CommandInfo { name: "clear", usage: "clear", help: "zero the whole grid" },
    CommandInfo { name: "store", usage: "store <name>", help: "write <name>.mem and <name>.state" },
    CommandInfo { name: "restore", usage: "restore <name>", help: "load <name>.mem and <name>.state" },
    CommandInfo { name: "flip", usage: "flip <row> <col>", help: "cross flip on the full grid" },
    CommandInfo {
        name: "seed",
        usage: "seed <dipole> <s0> <s1> <s2>",
        help: "set the generator seeds of one dipole",
    },
    CommandInfo { name: "test", usage: "test", help: "masked raw write demo" },
];

/// A parsed shell command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leave the shell.
    Quit,
    /// Print the command table.
    Help,
    /// Print the memory grid.
    Print,
    /// Print registers, dipoles and words.
    Info,
    /// Print both coefficient kernels.
    Coeffs,
    /// Generate and load a kernel.
    UpdateCoeffs {
        /// Distance metric.
        metric: Metric,
        /// Target bank.
        bank: CoefficientBank,
        /// Decay factor, `0..=1`.
        factor: f32,
        /// Largest distance with a non-zero value.
        reach: u32,
    },
    /// Stage one bit.
    Set {
        /// Grid row.
        row: usize,
        /// Grid column.
        col: usize,
        /// New bit value.
        value: bool,
    },
    /// Write the staged word.
    Commit,
    /// Zero the grid.
    Clear,
    /// Save the device image.
    Store(PathBuf),
    /// Load a device image.
    Restore(PathBuf),
    /// Cross flip on the full grid.
    Flip {
        /// Grid row.
        row: usize,
        /// Grid column.
        col: usize,
    },
    /// Set one dipole's seeds.
    Seed {
        /// Dipole index.
        dipole: usize,
        /// `s0, s1, s2`.
        seeds: [u32; 3],
    },
    /// Masked raw write demo.
    Test,
}

/// Why a line did not parse.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// No command starts with the word.
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    /// More than one command starts with the word.
    #[error("ambiguous command `{word}`: {}", .candidates.join(", "))]
    Ambiguous {
        /// The word typed.
        word: String,
        /// Commands it could mean.
        candidates: Vec<&'static str>,
    },

    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// An argument did not parse.
    #[error("invalid {what} `{value}`")]
    InvalidArgument {
        /// Which argument.
        what: &'static str,
        /// What was typed.
        value: String,
    },
}

/// Resolves a command word against [`COMMANDS`].
///
/// # Errors
///
/// [`ParseError::Unknown`] or [`ParseError::Ambiguous`].
pub fn resolve(word: &str) -> Result<&'static CommandInfo, ParseError> {
    let lower = word.to_ascii_lowercase();
    if let Some(exact) = COMMANDS.iter().find(|c| c.name == lower) {
        return Ok(exact);
    }
    let matches: Vec<&'static CommandInfo> =
        COMMANDS.iter().filter(|c| c.name.starts_with(&lower)).collect();
    match matches.as_slice() {
        [] => Err(ParseError::Unknown(word.to_owned())),
        [only] => Ok(only),
        many => Err(ParseError::Ambiguous {
            word: word.to_owned(),
            candidates: many.iter().map(|c| c.name).collect(),
        }),
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if word.is_empty() {
            return Err(ParseError::Empty);
        }
        let info = resolve(word)?;
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let bare = |cmd: Self| {
            if args.is_empty() {
                Ok(cmd)
            } else {
                Err(ParseError::Usage(info.usage))
            }
        };

        match info.name {
            "quit" => bare(Self::Quit),
            "help" => bare(Self::Help),
            "print" => bare(Self::Print),
            "info" => bare(Self::Info),
            "coeffs" => bare(Self::Coeffs),
            "commit" => bare(Self::Commit),
            "clear" => bare(Self::Clear),
            "test" => bare(Self::Test),
            "update_coeffs_euclidean" => update_coeffs(Metric::Euclidean, &args, info.usage),
            "update_coeffs_manhattan" => update_coeffs(Metric::Manhattan, &args, info.usage),
            "set" => match args.as_slice() {
                [row, col, value] => Ok(Self::Set {
                    row: number(row, "row")?,
                    col: number(col, "column")?,
                    value: match *value {
                        "0" => false,
                        "1" => true,
                        other => return Err(invalid("value", other)),
                    },
                }),
                _ => Err(ParseError::Usage(info.usage)),
            },
            "flip" => match args.as_slice() {
                [row, col] => Ok(Self::Flip {
                    row: number(row, "row")?,
                    col: number(col, "column")?,
                }),
                _ => Err(ParseError::Usage(info.usage)),
            },
            "seed" => match args.as_slice() {
                [dipole, s0, s1, s2] => Ok(Self::Seed {
                    dipole: number(dipole, "dipole")?,
                    seeds: [number(s0, "seed")?, number(s1, "seed")?, number(s2, "seed")?],
                }),
                _ => Err(ParseError::Usage(info.usage)),
            },
            // File names run to the end of the line.
            "store" if !rest.is_empty() => Ok(Self::Store(PathBuf::from(rest))),
            "restore" if !rest.is_empty() => Ok(Self::Restore(PathBuf::from(rest))),
            _ => Err(ParseError::Usage(info.usage)),
        }
    }
}

fn update_coeffs(metric: Metric, args: &[&str], usage: &'static str) -> Result<Command, ParseError> {
    let mut args = args.iter().copied().peekable();
    let bank = match args.peek().and_then(|a| a.parse::<CoefficientBank>().ok()) {
        Some(bank) => {
            args.next();
            bank
        }
        None => CoefficientBank::High,
    };
    let factor = match args.next() {
        Some(a) => a
            .parse::<f32>()
            .ok()
            .filter(|f| (0.0..=1.0).contains(f))
            .ok_or_else(|| invalid("factor", a))?,
        None => DEFAULT_FACTOR,
    };
    let reach = match args.next() {
        Some(a) => number(a, "reach")?,
        None => UNBOUNDED_REACH,
    };
    if args.next().is_some() {
        return Err(ParseError::Usage(usage));
    }
    Ok(Command::UpdateCoeffs {
        metric,
        bank,
        factor,
        reach,
    })
}

/// Parses a decimal or `0x` hexadecimal integer.
fn number<T: TryFrom<u64>>(s: &str, what: &'static str) -> Result<T, ParseError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| invalid(what, s))
}

fn invalid(what: &'static str, value: &str) -> ParseError {
    ParseError::InvalidArgument {
        what,
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    #[test]
    fn test_exact_and_prefix() {
        assert_eq!(parse("print"), Ok(Command::Print));
        assert_eq!(parse("PR"), Ok(Command::Print));
        assert_eq!(parse("  q  "), Ok(Command::Quit));
        assert_eq!(parse("res x"), Ok(Command::Restore(PathBuf::from("x"))));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let err = parse("c").unwrap_err();
        assert_eq!(
            err,
            ParseError::Ambiguous {
                word: "c".into(),
                candidates: vec!["coeffs", "commit", "clear"],
            }
        );
        assert!(err.to_string().contains("coeffs, commit, clear"));
        assert!(matches!(parse("se 1 2 3"), Err(ParseError::Ambiguous { .. })));
        assert!(matches!(parse("update"), Err(ParseError::Ambiguous { .. })));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("launch"), Err(ParseError::Unknown("launch".into())));
    }

    #[test]
    fn test_set() {
        assert_eq!(
            parse("set 127 0x3f 1"),
            Ok(Command::Set {
                row: 127,
                col: 63,
                value: true
            })
        );
        assert_eq!(parse("set 1 2"), Err(ParseError::Usage("set <row> <col> <0|1>")));
        assert!(matches!(
            parse("set 1 2 7"),
            Err(ParseError::InvalidArgument { what: "value", .. })
        ));
        assert!(matches!(
            parse("set -1 2 0"),
            Err(ParseError::InvalidArgument { what: "row", .. })
        ));
    }

    #[test]
    fn test_update_coeffs_defaults() {
        assert_eq!(
            parse("update_coeffs_manhattan"),
            Ok(Command::UpdateCoeffs {
                metric: Metric::Manhattan,
                bank: CoefficientBank::High,
                factor: DEFAULT_FACTOR,
                reach: UNBOUNDED_REACH,
            })
        );
        assert_eq!(
            parse("update_coeffs_e low 0.5 3"),
            Ok(Command::UpdateCoeffs {
                metric: Metric::Euclidean,
                bank: CoefficientBank::Low,
                factor: 0.5,
                reach: 3,
            })
        );
        assert_eq!(
            parse("update_coeffs_m 0.25"),
            Ok(Command::UpdateCoeffs {
                metric: Metric::Manhattan,
                bank: CoefficientBank::High,
                factor: 0.25,
                reach: UNBOUNDED_REACH,
            })
        );
        assert!(matches!(
            parse("update_coeffs_m high 1.5"),
            Err(ParseError::InvalidArgument { what: "factor", .. })
        ));
        assert!(matches!(parse("update_coeffs_m high 0.5 2 9"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_store_keeps_spaces() {
        assert_eq!(
            parse("store my run 1"),
            Ok(Command::Store(PathBuf::from("my run 1")))
        );
        assert!(matches!(parse("store"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_flip_and_seed() {
        assert_eq!(parse("flip 3 4"), Ok(Command::Flip { row: 3, col: 4 }));
        assert_eq!(
            parse("seed 2 10 0x20 30"),
            Ok(Command::Seed {
                dipole: 2,
                seeds: [10, 32, 30]
            })
        );
        assert!(matches!(
            parse("seed 0 1 2 4294967296"),
            Err(ParseError::InvalidArgument { what: "seed", .. })
        ));
    }

    #[test]
    fn test_bare_commands_reject_arguments() {
        assert_eq!(parse("commit now"), Err(ParseError::Usage("commit")));
    }

    #[test]
    fn test_table_names_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            assert!(COMMANDS[i + 1..].iter().all(|b| b.name != a.name));
            assert_eq!(resolve(a.name).unwrap().name, a.name);
        }
    }
}
