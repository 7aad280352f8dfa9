use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use sweeper_core::*;

use crate::command::{Command, HELP};

#[derive(Clone, Debug)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
    pub start_tile: StartTile,
    pub records: PathBuf,
}

/// Line-oriented driver that owns the current session and the score table.
pub struct Shell<R, W> {
    settings: Settings,
    session: GameSession,
    scores: ScoreBoard,
    games: u64,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(settings: Settings, input: R, output: W) -> anyhow::Result<Self> {
        let session = new_session(&settings, 0)?;
        Ok(Self::with_session(settings, session, input, output))
    }

    pub fn with_session(settings: Settings, session: GameSession, input: R, output: W) -> Self {
        let scores = ScoreBoard::load(&settings.records);
        Self {
            settings,
            session,
            scores,
            games: 0,
            input,
            output,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{HELP}")?;
        self.render()?;

        while let Some(line) = self.read_line()? {
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(message) => {
                    writeln!(self.output, "{message}")?;
                    continue;
                }
            };
            if !self.dispatch(command)? {
                break;
            }
        }
        Ok(())
    }

    /// Runs one command; `false` means the player asked to leave.
    fn dispatch(&mut self, command: Command) -> anyhow::Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => writeln!(self.output, "{HELP}")?,
            Command::Show => self.render()?,
            Command::Scores => self.render_scores()?,
            Command::Restart => {
                self.games += 1;
                self.session = new_session(&self.settings, self.games)?;
                self.render()?;
            }
            Command::Resume => {
                writeln!(self.output, "Not paused")?;
            }
            Command::Pause => {
                if ignored(self.session.pause()) {
                    return Ok(true);
                }
                return self.wait_for_resume();
            }
            Command::Open(coords) => {
                if ignored(self.session.open(coords)) {
                    return Ok(true);
                }
                self.render()?;
                if let Some(outcome) = self.session.outcome() {
                    return self.announce(outcome);
                }
            }
            Command::Flag(coords) => {
                if !ignored(self.session.toggle_flag(coords)) {
                    self.render()?;
                }
            }
        }
        Ok(true)
    }

    /// Blocks on the pause screen, which only understands `resume` and `quit`.
    fn wait_for_resume(&mut self) -> anyhow::Result<bool> {
        writeln!(self.output, "Paused, type `resume` to continue")?;
        while let Some(line) = self.read_line()? {
            match line.parse::<Command>() {
                Ok(Command::Quit) => return Ok(false),
                Ok(Command::Resume) => {
                    self.session.resume()?;
                    self.render()?;
                    return Ok(true);
                }
                _ => writeln!(self.output, "Paused, type `resume` to continue")?,
            }
        }
        Ok(false)
    }

    fn announce(&mut self, outcome: Outcome) -> anyhow::Result<bool> {
        let seconds = outcome.seconds();
        if !outcome.is_won() {
            writeln!(self.output, "Boom! You lost after {seconds} seconds.")?;
            writeln!(self.output, "Type `restart` for a new game or `quit`.")?;
            return Ok(true);
        }

        writeln!(self.output, "You won in {seconds} seconds!")?;
        let tier = self.session.tier();
        if self.scores.is_new_best(tier, seconds) {
            writeln!(
                self.output,
                "New {} record! Enter your name (up to {MAX_NAME_LEN} characters):",
                tier.name()
            )?;
            let Some(name) = self.read_line()? else {
                return Ok(false);
            };
            if let Err(err) = self.scores.record(tier, &name, seconds) {
                log::warn!("{}: {:?}", err, err);
            }
            self.render_scores()?;
        }
        writeln!(self.output, "Type `restart` for a new game or `quit`.")?;
        Ok(true)
    }

    fn render(&mut self) -> io::Result<()> {
        let board = self.session.board();
        let (width, height) = board.size();
        writeln!(
            self.output,
            "{} {}x{}  mines left: {}  time: {}s  {:?}",
            self.session.tier().name(),
            width,
            height,
            board.mines_left(),
            self.session.elapsed_seconds(),
            self.session.state()
        )?;

        let grid = board.visible_grid();
        let header: String = (1..=width).map(|x| format!("{:>3}", x)).collect();
        writeln!(self.output, "   {header}")?;
        for y in 0..height {
            let row: String = (0..width)
                .map(|x| format!("{:>3}", grid[(x, y).to_nd_index()].glyph()))
                .collect();
            writeln!(self.output, "{:>3}{row}", y + 1)?;
        }
        Ok(())
    }

    fn render_scores(&mut self) -> io::Result<()> {
        for (tier, entry) in Tier::RANKED.iter().zip(self.scores.entries()) {
            if entry.is_set() {
                writeln!(self.output, "{:<7} {} {}s", tier.name(), entry.name, entry.seconds)?;
            } else {
                writeln!(self.output, "{:<7} no record", tier.name())?;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Invalid moves are silently dropped; returns whether `result` was one.
fn ignored<T>(result: Result<T>) -> bool {
    match result {
        Ok(_) => false,
        Err(err) => {
            log::debug!("Ignored move: {}", err);
            true
        }
    }
}

fn new_session(settings: &Settings, games: u64) -> Result<GameSession> {
    let config = settings.difficulty.config;
    let board = match settings.seed {
        // each restart gets the next seed so a seeded run stays reproducible
        Some(seed) => Board::with_seed(config, seed.wrapping_add(games), settings.start_tile),
        None => Board::with_start_tile(config, settings.start_tile),
    };
    GameSession::with_board(settings.difficulty, board)
}
