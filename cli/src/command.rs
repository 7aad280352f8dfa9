use std::str::FromStr;
use sweeper_core::{Coord, Coord2};

/// One line of player input. Coordinates are typed one-based, column first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open(Coord2),
    Flag(Coord2),
    Pause,
    Resume,
    Restart,
    Show,
    Scores,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Show);
        };

        let command = match verb.to_lowercase().as_str() {
            "open" | "o" => Self::Open(parse_coords(&mut words)?),
            "flag" | "f" => Self::Flag(parse_coords(&mut words)?),
            "pause" | "p" => Self::Pause,
            "resume" | "r" => Self::Resume,
            "restart" => Self::Restart,
            "show" => Self::Show,
            "scores" => Self::Scores,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command `{other}`, try `help`")),
        };

        match words.next() {
            Some(extra) => Err(format!("Unexpected `{extra}`")),
            None => Ok(command),
        }
    }
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Coord2, String> {
    let mut axis = |name: &str| -> Result<Coord, String> {
        let word = words.next().ok_or_else(|| format!("Missing {name}"))?;
        match word.parse::<Coord>() {
            Ok(value) if value >= 1 => Ok(value - 1),
            _ => Err(format!("Bad {name} `{word}`, expected a number from 1")),
        }
    };
    let column = axis("column")?;
    let row = axis("row")?;
    Ok((column, row))
}

pub const HELP: &str = "\
Commands:
  open <column> <row>   open a cell (o)
  flag <column> <row>   place or remove a flag (f)
  pause / resume        stop and restart the clock (p / r)
  restart               new game on the same level
  show                  draw the board again
  scores                best times
  quit                  leave (q)";
