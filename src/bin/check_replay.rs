use std::error::Error;
use std::process;

use clap::Parser;

use hanasolve::{Instance, RecordedGame, check_game, decompress_link, link};

#[derive(Parser, Debug)]
#[command(
    name = "check-replay",
    about = "Locate the first losing turn of a recorded replay."
)]
struct Args {
    /// Replay link or bare compressed game string
    #[arg(required = true)]
    replay: String,
}

fn main() {
    flexi_logger::Logger::try_with_env_or_str("info")
        .expect("logger spec")
        .start()
        .expect("logger start");
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let game = decompress_link(&args.replay)?;
    let total = game.actions.len();
    let record = RecordedGame {
        instance: Instance::new(game.deck, game.num_players)?,
        actions: game.actions,
    };

    let outcome = check_game(&record)?;
    match outcome.first_losing_turn {
        0 => println!("Infeasible from the start ({total} recorded actions)."),
        turn if turn == total + 1 => println!("The recorded replay already wins."),
        turn => println!("Game was lost by the action on turn {turn} of {total}."),
    }
    if let Some(certificate) = &outcome.certificate {
        println!("Certificate replay: {}", link(certificate)?);
    }
    Ok(())
}
