//! noughts CLI - train, play against, and export MDP agents

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use noughts::{
    export::export_policy_csv,
    mdp::{AgentConfig, AgentSnapshot, MdpAgent},
    selfplay::{play_game, Prompt, Seat, SessionConfig, TrainingSession},
    Player,
};

#[derive(Parser)]
#[command(name = "noughts")]
#[command(version, about = "Noughts-and-crosses agents trained by value iteration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a pair of agents through self-play
    Train(TrainArgs),

    /// Play against a trained agent
    Play(PlayArgs),

    /// Export a trained agent's policy and values as CSV
    Export(ExportArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Number of self-play games
    #[arg(long, default_value_t = 1000)]
    games: usize,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Reward for winning a game
    #[arg(long, default_value_t = 3.0)]
    win_reward: f64,

    /// Reward for losing a game
    #[arg(long, default_value_t = -1.0)]
    loss_reward: f64,

    /// Discount factor for value iteration
    #[arg(long, default_value_t = 0.3)]
    discount_factor: f64,

    /// Where to write the X agent's snapshot
    #[arg(long, default_value = "agent-x.json")]
    out_x: PathBuf,

    /// Where to write the O agent's snapshot
    #[arg(long, default_value = "agent-o.json")]
    out_o: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HumanSide {
    X,
    O,
}

#[derive(Args)]
struct PlayArgs {
    /// Snapshot of the agent to play against
    #[arg(long)]
    agent: PathBuf,

    /// Which side the human plays
    #[arg(long, value_enum, default_value_t = HumanSide::O)]
    side: HumanSide,

    /// Let the agent learn from the played game and update the snapshot
    #[arg(long)]
    learn: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Snapshot of the trained agent
    #[arg(long)]
    agent: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "policy.csv")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Play(args) => run_play(args),
        Commands::Export(args) => run_export(args),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config = AgentConfig {
        win_reward: args.win_reward,
        loss_reward: args.loss_reward,
        discount_factor: args.discount_factor,
    };

    let agent_x = MdpAgent::with_config(Player::X, config, args.seed);
    let agent_o = MdpAgent::with_config(Player::O, config, args.seed.map(|s| s.wrapping_add(1)));

    let session_config = SessionConfig {
        num_games: args.games,
        progress: true,
    };
    let mut session =
        TrainingSession::new(agent_x, agent_o, session_config).context("set up session")?;
    session.run().context("run self-play")?;

    println!(
        "Played {} games: X wins {}, O wins {}, draws {}",
        session.results.total(),
        session.results.x_wins,
        session.results.o_wins,
        session.results.draws
    );

    session
        .agent_x
        .snapshot()
        .save_json(&args.out_x)
        .with_context(|| format!("save X agent to {}", args.out_x.display()))?;
    session
        .agent_o
        .snapshot()
        .save_json(&args.out_o)
        .with_context(|| format!("save O agent to {}", args.out_o.display()))?;
    println!(
        "Saved agents to {} and {}",
        args.out_x.display(),
        args.out_o.display()
    );

    Ok(())
}

fn run_play(args: PlayArgs) -> Result<()> {
    let snapshot = AgentSnapshot::load_json(&args.agent)
        .with_context(|| format!("load agent from {}", args.agent.display()))?;
    let mut agent = MdpAgent::from_snapshot(&snapshot).context("rebuild agent")?;

    let expected = match args.side {
        HumanSide::X => Player::O,
        HumanSide::O => Player::X,
    };
    anyhow::ensure!(
        agent.player() == expected,
        "the loaded agent plays {}, but the human side {:?} needs a {} agent",
        agent.player(),
        args.side,
        expected
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let episode = {
        let human = Seat::Human(Prompt::new(&mut input, &mut output));
        let machine = Seat::Agent(&mut agent);
        match args.side {
            HumanSide::X => play_game(human, machine)?,
            HumanSide::O => play_game(machine, human)?,
        }
    };

    println!("{}", episode.terminal);
    match episode.outcome {
        noughts::Outcome::Win(player) => println!("Player {player} wins!"),
        noughts::Outcome::Draw => println!("Match draws"),
    }

    if args.learn {
        agent.learn_from_games(std::slice::from_ref(&episode))?;
        agent.snapshot().save_json(&args.agent)?;
        println!("Agent updated from this game");
    }

    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let snapshot = AgentSnapshot::load_json(&args.agent)
        .with_context(|| format!("load agent from {}", args.agent.display()))?;
    let agent = MdpAgent::from_snapshot(&snapshot).context("rebuild agent")?;

    export_policy_csv(&agent, &args.out)
        .with_context(|| format!("write CSV to {}", args.out.display()))?;
    println!("Exported {} states to {}", agent.states().len(), args.out.display());

    Ok(())
}
