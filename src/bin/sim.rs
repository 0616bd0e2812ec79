use naval_match::{
    init_logging, serve_connection, spawn_coordinator, Bot, BotOutcome, FrameSender,
    InMemoryTransport, MatchConfig, Transport,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

/// Play one bot-versus-bot match against an in-process coordinator and print
/// a JSON summary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);
    let mut bot1 = Bot::new(&mut rng1)?;
    let mut bot2 = Bot::new(&mut rng2)?;

    let (coordinator, _task) = spawn_coordinator(MatchConfig::default());
    let (server1, client1) = InMemoryTransport::pair();
    let (server2, client2) = InMemoryTransport::pair();
    tokio::spawn(serve_connection(server1, coordinator.clone()));
    // Seat the first bot before the second connects so seat numbers follow the seeds.
    while coordinator.snapshot().await?.players.is_empty() {
        tokio::task::yield_now().await;
    }
    tokio::spawn(serve_connection(server2, coordinator.clone()));

    let f1 = async move {
        let (mut tx, mut rx) = client1.split();
        let outcome = bot1.play(&mut tx, &mut rx).await?;
        tx.close().await?;
        Ok::<(BotOutcome, usize), anyhow::Error>((outcome, bot1.shots_fired()))
    };
    let f2 = async move {
        let (mut tx, mut rx) = client2.split();
        let outcome = bot2.play(&mut tx, &mut rx).await?;
        tx.close().await?;
        Ok::<(BotOutcome, usize), anyhow::Error>((outcome, bot2.shots_fired()))
    };

    let (res1, res2) = tokio::try_join!(f1, f2)?;

    let winner = match (&res1.0, &res2.0) {
        (BotOutcome::Won, _) => Some("player1"),
        (_, BotOutcome::Won) => Some("player2"),
        _ => None,
    };

    let result = json!({
        "player1": {"outcome": format!("{:?}", res1.0), "shots": res1.1},
        "player2": {"outcome": format!("{:?}", res2.0), "shots": res2.1},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
