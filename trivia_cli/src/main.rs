//! A terminal trivia quiz.
//!
//! Loads the question pool, plays one timed session through the session
//! actor, and prints the result. Also manages the pool file.

use std::path::PathBuf;

use anyhow::{Context, Error, bail};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::io::{AsyncBufReadExt, BufReader};
use trivia_cli::{
    commands::{self, AddArgs, PLAY_COMMANDS, PlayCommand},
    config::{CliConfig, Overrides},
    render,
};
use trivia_engine::{
    FilePool, QuestionId, QuestionPool, QuizEvent, SessionActor, SessionHandle, pool::select_batch,
};

const HELP: &str = "\
Play a timed multiple-choice trivia quiz

USAGE:
  trivia_cli [OPTIONS] [COMMAND]

COMMANDS:
  play                     Play one session (default)
  list                     List the questions in the pool
  add                      Add a question to the pool
  remove ID                Remove a question from the pool

OPTIONS:
  --pool       PATH        Question pool file       [default: env TRIVIA_POOL_PATH or questions.json]
  --time       SECS        Seconds per question     [default: env TRIVIA_TIME_PER_QUESTION or 30]
  --batch      N           Questions per session    [default: env TRIVIA_BATCH_SIZE or 10]
  --export     PATH        Write the result as JSON after playing

ADD OPTIONS:
  --question   TEXT        Question text
  --options    A|B|C|D     The four options separated by '|'
  --correct    OPTION      Correct option, A-D or 1-4
  --category   TEXT        Category
  --difficulty LEVEL       easy, medium or hard     [default: medium]
  --hint       TEXT        Optional hint

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TRIVIA_REVEAL_MS         Reveal window after an answer in ms [default: 2000]
  TRIVIA_SKIP_REVEAL_MS    Reveal window after a skip in ms    [default: 1000]
  RUST_LOG                 Log level (e.g., info, debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let subcommand = pargs.subcommand()?.unwrap_or_else(|| "play".to_string());
    let overrides = Overrides {
        pool_path: pargs.opt_value_from_str("--pool")?,
        time_per_question_secs: pargs.opt_value_from_str("--time")?,
        batch_size: pargs.opt_value_from_str("--batch")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = CliConfig::from_env(overrides)?;
    info!("Using question pool at {}", config.pool_path.display());

    match subcommand.as_str() {
        "play" => {
            let export: Option<PathBuf> = pargs.opt_value_from_str("--export")?;
            play(config, export).await
        }
        "list" => {
            let pool = open_pool(&config)?;
            print!("{}", render::question_list(pool.list()));
            Ok(())
        }
        "add" => {
            let args = AddArgs {
                question: pargs.value_from_str("--question")?,
                options: pargs.value_from_str("--options")?,
                correct: pargs.value_from_str("--correct")?,
                category: pargs.value_from_str("--category")?,
                difficulty: pargs.opt_value_from_str("--difficulty")?,
                hint: pargs.opt_value_from_str("--hint")?,
            };
            let draft = commands::build_draft(args)?;
            let mut pool = open_pool(&config)?;
            let question = pool.add(draft)?;
            println!("Added question {}", question.id());
            Ok(())
        }
        "remove" => {
            let id: String = pargs.free_from_str().context("remove needs a question ID")?;
            let mut pool = open_pool(&config)?;
            let question = pool.remove(&QuestionId::new(&id))?;
            println!("Removed \"{}\"", question.prompt());
            Ok(())
        }
        other => bail!("unknown command '{other}', see --help"),
    }
}

fn open_pool(config: &CliConfig) -> Result<FilePool, Error> {
    FilePool::open(&config.pool_path)
        .with_context(|| format!("failed to open {}", config.pool_path.display()))
}

async fn play(config: CliConfig, export: Option<PathBuf>) -> Result<(), Error> {
    let pool = open_pool(&config)?;
    if pool.is_empty() {
        bail!(
            "the question pool at {} is empty, add questions with `trivia_cli add`",
            config.pool_path.display()
        );
    }

    let batch = select_batch(pool.list(), config.session.batch_size, &mut rand::rng());
    let (actor, handle) = SessionActor::new(config.session.clone())?;
    let actor_task = tokio::spawn(actor.run());

    let mut events = handle.subscribe().await?;
    let snapshot = handle.start(batch).await?;
    print!("{PLAY_COMMANDS}");
    print!("{}", render::question(&snapshot));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                if on_event(&handle, &event).await? {
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed
                    handle.finish().await?;
                    break;
                };
                if on_input(&handle, &line).await? {
                    break;
                }
            }
        }
    }

    let snapshot = handle.snapshot().await?;
    let result = handle.result().await?;
    print!(
        "{}",
        render::result_summary(&result, snapshot.state.questions())
    );

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Result written to {}", path.display());
    }

    handle.close().await?;
    actor_task.await?;
    Ok(())
}

/// Print a session event. Returns true once the session is over.
async fn on_event(handle: &SessionHandle, event: &QuizEvent) -> Result<bool, Error> {
    match event {
        QuizEvent::Answered { index, .. } => {
            println!("{event}");
            // the advance may already have landed
            let snapshot = handle.snapshot().await?;
            if let Some(reveal) = render::reveal_at(&snapshot, *index) {
                print!("{reveal}");
            }
        }
        QuizEvent::Advanced { .. } => {
            let snapshot = handle.snapshot().await?;
            print!("{}", render::question(&snapshot));
        }
        QuizEvent::Finished { .. } => {
            println!("{event}");
            return Ok(true);
        }
        // help results are printed from the reply
        QuizEvent::Eliminated(_)
        | QuizEvent::Hint(_)
        | QuizEvent::Skipped { .. }
        | QuizEvent::Started { .. } => {}
        _ => println!("{event}"),
    }
    Ok(false)
}

/// Act on one line of player input. Returns true if the player quit.
async fn on_input(handle: &SessionHandle, line: &str) -> Result<bool, Error> {
    match commands::parse_play_command(line) {
        Ok(PlayCommand::Answer(option)) => {
            if let Err(e) = handle.answer(option).await {
                println!("{e}");
            }
        }
        Ok(PlayCommand::Help(kind)) => match handle.use_help(kind).await {
            Ok(outcome) => print!("{}", render::help_outcome(&outcome)),
            Err(e) => println!("{e}"),
        },
        Ok(PlayCommand::Status) => {
            let snapshot = handle.snapshot().await?;
            print!("{}", render::question(&snapshot));
        }
        Ok(PlayCommand::Commands) => print!("{PLAY_COMMANDS}"),
        Ok(PlayCommand::Quit) => {
            handle.finish().await?;
            return Ok(true);
        }
        Err(e) => println!("{e}"),
    }
    Ok(false)
}
