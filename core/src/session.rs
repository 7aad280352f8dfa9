use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Unstarted -> Active (first open, starts the clock)
/// - Active -> Paused -> Active
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Unstarted,
    Active,
    Paused,
    Won,
    Lost,
}

impl SessionState {
    /// Won and Lost accept no further moves.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// How a finished session ended, with its final time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won { seconds: u32 },
    Lost { seconds: u32 },
}

impl Outcome {
    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won { .. })
    }

    pub const fn seconds(self) -> u32 {
        match self {
            Self::Won { seconds } | Self::Lost { seconds } => seconds,
        }
    }
}

/// One game from first click to win or loss. Restarting builds a new
/// session; a finished one is never reset in place.
///
/// Every action has an `*_at` form taking the clock reading explicitly; the
/// plain form reads [`Instant::now`].
#[derive(Clone, Debug)]
pub struct GameSession {
    difficulty: Difficulty,
    board: Board,
    state: SessionState,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl GameSession {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::from_parts(difficulty, Board::new(difficulty.config))
    }

    /// Plays on a prepared board, which must match the difficulty's config.
    pub fn with_board(difficulty: Difficulty, board: Board) -> Result<Self> {
        if board.config() != difficulty.config {
            return Err(GameError::InvalidLayout);
        }
        Ok(Self::from_parts(difficulty, board))
    }

    fn from_parts(difficulty: Difficulty, board: Board) -> Self {
        log::debug!(
            "New {} session on {:?}",
            difficulty.tier.name(),
            difficulty.config
        );
        Self {
            difficulty,
            board,
            state: SessionState::Unstarted,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Fresh session with the same difficulty and placement rule, and a new
    /// mine layout.
    pub fn restart(&self) -> Self {
        let board = Board::with_start_tile(self.difficulty.config, self.board.start_tile());
        Self::from_parts(self.difficulty, board)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn tier(&self) -> Tier {
        self.difficulty.tier
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn open(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        self.open_at(coords, Instant::now())
    }

    pub fn open_at(&mut self, coords: Coord2, now: Instant) -> Result<OpenOutcome> {
        self.check_playable()?;
        let outcome = self.board.open(coords)?;

        if self.state == SessionState::Unstarted {
            log::debug!("Session started");
            self.state = SessionState::Active;
            self.started_at = Some(now);
        }

        match outcome {
            OpenOutcome::Exploded => {
                self.board.reveal_mines();
                self.finish(SessionState::Lost, now);
            }
            OpenOutcome::Opened(_) if self.board.is_won() => {
                self.finish(SessionState::Won, now);
            }
            OpenOutcome::Opened(_) => {}
        }
        Ok(outcome)
    }

    /// Flags may be placed before the first open as well as during play.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        self.check_playable()?;
        self.board.toggle_flag(coords)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.pause_at(Instant::now())
    }

    pub fn pause_at(&mut self, now: Instant) -> Result<()> {
        match self.state {
            SessionState::Active => {}
            state if state.is_finished() => return Err(GameError::AlreadyEnded),
            _ => return Err(GameError::NotRunning),
        }
        self.stop_clock(now);
        self.state = SessionState::Paused;
        log::debug!("Session paused at {:?}", self.accumulated);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.resume_at(Instant::now())
    }

    pub fn resume_at(&mut self, now: Instant) -> Result<()> {
        match self.state {
            SessionState::Paused => {}
            state if state.is_finished() => return Err(GameError::AlreadyEnded),
            _ => return Err(GameError::NotPaused),
        }
        self.started_at = Some(now);
        self.state = SessionState::Active;
        log::debug!("Session resumed");
        Ok(())
    }

    /// Time spent in the Active state so far.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let running = self
            .started_at
            .map_or(Duration::ZERO, |started_at| now.saturating_duration_since(started_at));
        self.accumulated + running
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds_at(Instant::now())
    }

    /// Whole seconds, rounded up; the final time once the session ended.
    pub fn elapsed_seconds_at(&self, now: Instant) -> u32 {
        match self.outcome() {
            Some(outcome) => outcome.seconds(),
            None => whole_seconds(self.elapsed_at(now)),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        // a finished game takes at least a second so 0 keeps meaning "no record"
        let seconds = || whole_seconds(self.accumulated).max(1);
        match self.state {
            SessionState::Won => Some(Outcome::Won { seconds: seconds() }),
            SessionState::Lost => Some(Outcome::Lost { seconds: seconds() }),
            _ => None,
        }
    }

    fn check_playable(&self) -> Result<()> {
        match self.state {
            SessionState::Paused => Err(GameError::Paused),
            state if state.is_finished() => Err(GameError::AlreadyEnded),
            _ => Ok(()),
        }
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(started_at);
        }
    }

    fn finish(&mut self, state: SessionState, now: Instant) {
        self.stop_clock(now);
        self.state = state;
        log::debug!("Session ended {:?} after {:?}", state, self.accumulated);
    }
}

fn whole_seconds(elapsed: Duration) -> u32 {
    let seconds = elapsed.as_secs() + u64::from(elapsed.subsec_nanos() > 0);
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALL: [Coord2; 5] = [(3, 0), (3, 1), (3, 2), (3, 3), (3, 4)];

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn session_with(size: Coord2, mines: &[Coord2], first: Coord2) -> GameSession {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        let difficulty = Difficulty::custom(size.0, size.1, layout.mine_count()).unwrap();
        let mut board = Board::new(difficulty.config);
        board.place_mines_with(layout, first).unwrap();
        GameSession::with_board(difficulty, board).unwrap()
    }

    #[test]
    fn clock_runs_only_while_active() {
        let t0 = Instant::now();
        let mut session = session_with((5, 5), &WALL, (0, 0));

        assert_eq!(session.state(), SessionState::Unstarted);
        assert_eq!(session.elapsed_seconds_at(t0 + ms(5000)), 0);
        assert_eq!(session.toggle_flag((4, 4)), Ok(FlagOutcome::Flagged));
        assert_eq!(session.state(), SessionState::Unstarted);
        assert_eq!(session.pause_at(t0), Err(GameError::NotRunning));
        assert_eq!(session.resume_at(t0), Err(GameError::NotPaused));

        session.open_at((0, 0), t0).unwrap();
        assert_eq!(session.state(), SessionState::Active);

        session.pause_at(t0 + ms(3200)).unwrap();
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(session.elapsed_seconds_at(t0 + ms(100_000)), 4);
        assert_eq!(session.open_at((4, 0), t0 + ms(4000)), Err(GameError::Paused));
        assert_eq!(session.toggle_flag((4, 0)), Err(GameError::Paused));
        assert_eq!(session.pause_at(t0 + ms(4000)), Err(GameError::NotRunning));

        session.resume_at(t0 + ms(10_000)).unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.elapsed_at(t0 + ms(12_000)), ms(5200));
        assert_eq!(session.elapsed_seconds_at(t0 + ms(12_000)), 6);
        assert_eq!(session.outcome(), None);
    }

    #[test]
    fn winning_finalizes_time() {
        let t0 = Instant::now();
        let mut session = session_with((5, 5), &WALL, (0, 0));

        assert_eq!(session.open_at((0, 0), t0), Ok(OpenOutcome::Opened(15)));
        for y in 0..4 {
            session.open_at((4, y), t0 + ms(1000)).unwrap();
        }
        assert_eq!(session.state(), SessionState::Active);
        session.open_at((4, 4), t0 + ms(7500)).unwrap();

        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.outcome(), Some(Outcome::Won { seconds: 8 }));
        assert_eq!(session.elapsed_seconds_at(t0 + ms(60_000)), 8);
        assert_eq!(session.open_at((3, 0), t0), Err(GameError::AlreadyEnded));
        assert_eq!(session.toggle_flag((3, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(session.pause_at(t0), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn instant_win_still_takes_a_second() {
        let t0 = Instant::now();
        let mut session = session_with((1, 5), &[(0, 0), (0, 1), (0, 2), (0, 3)], (0, 4));

        session.open_at((0, 4), t0).unwrap();

        assert_eq!(session.outcome(), Some(Outcome::Won { seconds: 1 }));
    }

    #[test]
    fn losing_reveals_mines_but_keeps_flags() {
        let t0 = Instant::now();
        let mut session = session_with((5, 5), &WALL, (0, 0));

        session.open_at((0, 0), t0).unwrap();
        session.toggle_flag((3, 1)).unwrap();
        session.toggle_flag((4, 0)).unwrap();
        assert_eq!(session.open_at((3, 0), t0 + ms(2000)), Ok(OpenOutcome::Exploded));

        assert_eq!(session.state(), SessionState::Lost);
        assert_eq!(session.outcome(), Some(Outcome::Lost { seconds: 2 }));

        let board = session.board();
        assert_eq!(board.triggered_mine(), Some((3, 0)));
        assert_eq!(board.visible_state((3, 0)), Ok(VisibleCell::Mine));
        assert_eq!(board.visible_state((3, 2)), Ok(VisibleCell::Mine));
        assert_eq!(board.visible_state((3, 1)), Ok(VisibleCell::Flagged));
        assert_eq!(board.visible_state((4, 0)), Ok(VisibleCell::Flagged));
        assert_eq!(board.visible_state((4, 1)), Ok(VisibleCell::Hidden));
    }

    #[test]
    fn zero_first_click_flood_fills_and_stays_active() {
        // (7, 7) is walled in by mines, so the flood cannot win the game
        let mines = [
            (6, 6),
            (6, 7),
            (7, 6),
            (0, 7),
            (1, 7),
            (2, 7),
            (3, 7),
            (4, 7),
            (5, 7),
            (7, 0),
        ];
        let mut session = session_with((8, 8), &mines, (0, 0));

        let outcome = session.open((0, 0)).unwrap();

        assert!(matches!(outcome, OpenOutcome::Opened(count) if count >= 1));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.outcome(), None);
        assert_eq!(session.board().visible_state((7, 7)), Ok(VisibleCell::Hidden));
    }

    #[test]
    fn seeded_zero_start_opens_a_region() {
        let config = GameConfig::new((8, 8), 10).unwrap();
        let difficulty = Difficulty::custom(8, 8, 10).unwrap();
        let board = Board::with_seed(config, 2024, StartTile::AlwaysZero);
        let mut session = GameSession::with_board(difficulty, board).unwrap();

        let outcome = session.open((4, 4)).unwrap();

        assert!(matches!(outcome, OpenOutcome::Opened(count) if count >= 9));
        assert_ne!(session.state(), SessionState::Lost);
    }

    #[test]
    fn restart_builds_a_fresh_session() {
        let mut session = GameSession::new(Difficulty::NORMAL);
        session.open((5, 5)).unwrap();

        let restarted = session.restart();

        assert_eq!(restarted.state(), SessionState::Unstarted);
        assert_eq!(restarted.difficulty(), Difficulty::NORMAL);
        assert!(!restarted.board().mines_placed());
        assert_eq!(restarted.board().opened_count(), 0);
        assert!(session.board().mines_placed());
    }

    #[test]
    fn mismatched_board_is_rejected() {
        let board = Board::new(Difficulty::EASY.config);
        assert!(GameSession::with_board(Difficulty::HARD, board).is_err());
    }
}
