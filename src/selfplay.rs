//! Driving games: seats, a single-game driver, and self-play training

use std::io::{BufRead, Write};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    mdp::MdpAgent,
    tictactoe::{Board, Episode, Game, Outcome, Player},
    Error, Result,
};

/// An interactive move source: prompts are written to `output`, moves
/// read from `input`. Both are injected so games are testable with
/// in-memory buffers.
pub struct Prompt<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
}

impl<'a> Prompt<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Prompt { input, output }
    }

    /// Ask for a move until a legal one is entered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PromptClosed`] when the input stream ends, or an
    /// IO error if reading or writing fails.
    fn ask(&mut self, board: &Board, player: Player) -> Result<usize> {
        writeln!(self.output, "{board}")?;
        write!(self.output, "Player {player}, enter move (0-8): ")?;
        self.output.flush()?;

        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::PromptClosed);
            }

            match line.trim().parse::<usize>() {
                Ok(pos) if pos < 9 && board.is_empty(pos) => return Ok(pos),
                _ => {
                    write!(self.output, "Invalid move. Enter move (0-8): ")?;
                    self.output.flush()?;
                }
            }
        }
    }
}

/// Who occupies one side of the board
pub enum Seat<'a> {
    /// A learning agent picks from its policy
    Agent(&'a mut MdpAgent),
    /// A person answers interactive prompts
    Human(Prompt<'a>),
}

impl Seat<'_> {
    fn choose(&mut self, board: &Board, player: Player) -> Result<usize> {
        match self {
            Seat::Agent(agent) => agent.next_move(board),
            Seat::Human(prompt) => prompt.ask(board, player),
        }
    }
}

/// Drive one game between the two seats and return the finished episode.
///
/// # Errors
///
/// Returns an error if a seat fails to produce a move or produces an
/// illegal one.
pub fn play_game(mut x: Seat<'_>, mut o: Seat<'_>) -> Result<Episode> {
    let mut game = Game::new();

    while game.outcome().is_none() {
        let board = game.board();
        let player = game.to_move();
        let position = match player {
            Player::X => x.choose(&board, player)?,
            Player::O => o.choose(&board, player)?,
        };
        game.play(position)?;
    }

    game.into_episode()
}

/// Configuration for a self-play session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of games to play
    pub num_games: usize,
    /// Show a progress bar while training
    pub progress: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            num_games: 1000,
            progress: false,
        }
    }
}

/// Outcome tally of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResults {
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
}

impl SessionResults {
    pub fn total(&self) -> usize {
        self.x_wins + self.o_wins + self.draws
    }
}

/// Self-play session: two agents play and both learn from every game.
pub struct TrainingSession {
    pub agent_x: MdpAgent,
    pub agent_o: MdpAgent,
    pub config: SessionConfig,
    pub results: SessionResults,
}

impl TrainingSession {
    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the agents are not an X/O pair.
    pub fn new(agent_x: MdpAgent, agent_o: MdpAgent, config: SessionConfig) -> Result<Self> {
        if agent_x.player() != Player::X || agent_o.player() != Player::O {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "session needs an X agent and an O agent, got {} and {}",
                    agent_x.player(),
                    agent_o.player()
                ),
            });
        }

        Ok(TrainingSession {
            agent_x,
            agent_o,
            config,
            results: SessionResults::default(),
        })
    }

    /// Play the configured number of games, feeding each finished
    /// episode to both agents.
    ///
    /// # Errors
    ///
    /// Returns an error if a game cannot be driven to completion or a
    /// learning step fails to converge.
    pub fn run(&mut self) -> Result<()> {
        let bar = if self.config.progress {
            create_progress_bar(self.config.num_games as u64)?
        } else {
            ProgressBar::hidden()
        };

        for _ in 0..self.config.num_games {
            let episode = play_game(
                Seat::Agent(&mut self.agent_x),
                Seat::Agent(&mut self.agent_o),
            )?;

            match episode.outcome {
                Outcome::Win(Player::X) => self.results.x_wins += 1,
                Outcome::Win(Player::O) => self.results.o_wins += 1,
                Outcome::Draw => self.results.draws += 1,
            }

            let batch = [episode];
            self.agent_x.learn_from_games(&batch)?;
            self.agent_o.learn_from_games(&batch)?;

            bar.inc(1);
            bar.set_message(format!(
                "X {} / O {} / draw {}",
                self.results.x_wins, self.results.o_wins, self.results.draws
            ));
        }

        bar.finish_and_clear();
        Ok(())
    }
}

fn create_progress_bar(total_games: u64) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
        .map_err(|e| Error::ProgressBarTemplate {
            message: e.to_string(),
        })?;
    let bar = ProgressBar::new(total_games);
    bar.set_style(style);
    Ok(bar)
}
