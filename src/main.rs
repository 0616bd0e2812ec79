use naval_match::{
    init_logging, Bot, BotOutcome, FrameReceiver, FrameSender, MatchConfig, Server, Strictness,
    TcpTransport, Transport, TransportKind, WebSocketTransport, DEFAULT_BIND, WIN_THRESHOLD,
};

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Host a match and wait for two players.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, value_enum, default_value_t = TransportKind::Ws)]
        transport: TransportKind,
        #[arg(long, default_value_t = WIN_THRESHOLD, help = "Hits needed to win")]
        win_threshold: u32,
        #[arg(long, help = "Reject moves once a player has won")]
        lock_after_win: bool,
        #[arg(long, help = "Reject shots at cells that were already hit")]
        reject_repeat_shots: bool,
        #[arg(long, help = "Reject board changes after the match started")]
        lock_board_after_start: bool,
        #[arg(long, help = "Require boards to hold exactly the standard fleet")]
        validate_fleet: bool,
    },
    /// Join a match as a headless bot.
    Bot {
        #[arg(long, default_value = "127.0.0.1:3000")]
        connect: String,
        #[arg(long, value_enum, default_value_t = TransportKind::Ws)]
        transport: TransportKind,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = WIN_THRESHOLD, help = "Hits the server needs to declare a win")]
        win_threshold: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            transport,
            win_threshold,
            lock_after_win,
            reject_repeat_shots,
            lock_board_after_start,
            validate_fleet,
        } => {
            if win_threshold == 0 {
                return Err(anyhow::anyhow!("--win-threshold must be at least 1"));
            }
            let config = MatchConfig {
                win_threshold,
                strictness: Strictness {
                    lock_after_win,
                    reject_repeat_shots,
                    lock_board_after_start,
                    validate_fleet,
                },
            };
            let server = Server::bind(&bind, transport, config).await?;
            server
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for Ctrl+C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
        }
        Commands::Bot {
            connect,
            transport,
            seed,
            win_threshold,
        } => {
            let mut rng = if let Some(s) = seed {
                SmallRng::seed_from_u64(s)
            } else {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            };
            let mut bot = Bot::new(&mut rng)?.with_win_threshold(win_threshold);
            let outcome = match transport {
                TransportKind::Ws => {
                    let url = if connect.contains("://") {
                        connect
                    } else {
                        format!("ws://{}", connect)
                    };
                    let (mut sender, mut receiver) = WebSocketTransport::connect(&url).await?.split();
                    play(&mut bot, &mut sender, &mut receiver).await?
                }
                TransportKind::Tcp => {
                    let (mut sender, mut receiver) = TcpTransport::connect(&connect).await?.split();
                    play(&mut bot, &mut sender, &mut receiver).await?
                }
            };
            println!(
                "Match over: {:?} after {} shots ({} hits)",
                outcome,
                bot.shots_fired(),
                bot.hits_landed()
            );
        }
    }
    Ok(())
}

async fn play<S: FrameSender, R: FrameReceiver>(
    bot: &mut Bot,
    sender: &mut S,
    receiver: &mut R,
) -> anyhow::Result<BotOutcome> {
    let outcome = bot.play(sender, receiver).await;
    sender.close().await?;
    outcome
}
