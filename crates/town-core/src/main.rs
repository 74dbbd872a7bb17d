//! Agent town console runner
//!
//! Loads a town configuration, builds scripted agents and lets the human
//! drive the run from the terminal.
//!
//! Examples:
//!   cargo run -p town-core -- --config town.toml
//!   cargo run -p town-core -- --config town.toml --user-role 1 --window 3

use anyhow::Context as _;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use town_core::{
    default_config_toml, ConsoleTransport, Inbound, Instruction, ScriptedAgentFactory,
    SimulationContext, Sink, StepController, StepOutcome, TickReport, TownConfig,
    DEFAULT_CONFIG_PATH,
};
use town_events::ParseInstructionError;

/// Command line arguments for the town runner
#[derive(Parser, Debug)]
#[command(name = "agent_town")]
#[command(about = "A small society of generative agents, one of them played by you")]
struct Args {
    /// Path to the town configuration
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Index of the agent you play (overrides the config)
    #[arg(long)]
    user_role: Option<usize>,

    /// Ticks of observations to keep (overrides the config)
    #[arg(long)]
    window: Option<usize>,

    /// Restore agent memory from checkpoints
    #[arg(long)]
    from_checkpoint: bool,

    /// Seed for the scripted agents (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so narration on stdout stays readable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_town=info,town_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.print_default_config {
        print!("{}", default_config_toml()?);
        return Ok(());
    }

    let mut config = TownConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(user_role) = args.user_role {
        config.simulation.user_role = user_role;
    }
    if let Some(window) = args.window {
        config.simulation.timewindow_size = window;
    }
    if let Some(seed) = args.seed {
        config.scripted.seed = seed;
    }
    config.simulation.from_checkpoint |= args.from_checkpoint;
    config.validate()?;

    let base_dir = args.config.parent().unwrap_or_else(|| Path::new("."));
    let profiles = config.load_profiles(base_dir)?;

    let controller = StepController::from_config(&config.simulation);
    let mut factory = ScriptedAgentFactory::new(config.scripted.clone());
    let sink = Sink::new(Box::new(ConsoleTransport::stdio(
        config.simulation.exit_token.clone(),
    )));
    let mut ctx = controller.init(&profiles, config.simulation.user_role, &mut factory, sink)?;

    loop {
        let Some(instruction) = next_instruction(&mut ctx)? else {
            continue;
        };
        match controller.step(&mut ctx, instruction) {
            Ok(StepOutcome::Exited { ticks }) => {
                tracing::info!(ticks, "Goodbye");
                break;
            }
            Ok(StepOutcome::Ticked(report)) => announce_failures(&mut ctx, &report),
            Err(e) => {
                ctx.sink_mut().inform(format!("[error] {}", e));
            }
        }
    }

    Ok(())
}

/// Asks the human what to do next. `None` means ask again.
fn next_instruction(ctx: &mut SimulationContext) -> anyhow::Result<Option<Instruction>> {
    let choices = StepController::choices();
    let answer = ctx
        .sink_mut()
        .ask_human("Pick an action to perform?", &choices)?;
    let Inbound::Message(text) = answer else {
        return Ok(Some(Instruction::Exit));
    };

    match text.parse::<Instruction>() {
        Ok(instruction) => Ok(Some(instruction)),
        Err(ParseInstructionError::MissingTarget) => {
            let human = ctx.human_name().to_string();
            let names: Vec<String> = ctx.simulated_names().into_iter().map(String::from).collect();
            let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let answer = ctx.sink_mut().ask_human(
                &format!("As {}, which agent do you want to talk to?", human),
                &name_refs,
            )?;
            Ok(answer.into_message().map(Instruction::interview))
        }
        Err(e) => {
            ctx.sink_mut().inform(format!("[error] {}", e));
            Ok(None)
        }
    }
}

fn announce_failures(ctx: &mut SimulationContext, report: &TickReport) {
    for failure in &report.failures {
        let line = serde_json::to_string(failure).unwrap_or_else(|_| format!("{:?}", failure));
        ctx.sink_mut().inform(format!("[warning] {}", line));
    }
}
