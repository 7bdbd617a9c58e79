use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use holdem_stats::{Intent, StatisticsViewModel, StatsStore, StoreConfig};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args()?;
    let config = StoreConfig::from_env();
    let mut store = StatsStore::connect(&config).context("unable to build stats store")?;

    store.dispatch(Intent::InitializeDashboard {
        player_id: args.player_id.clone(),
    });
    settle(&mut store)?;

    for _ in 0..args.more_pages {
        if !store.view_model().has_next_page {
            println!("No more hand history pages.");
            break;
        }
        store.dispatch(Intent::LoadMoreHistory {
            player_id: args.player_id.clone(),
        });
        settle(&mut store)?;
    }

    if let Some(hand_id) = args.hand_id {
        store.dispatch(Intent::LoadHandDetails { hand_id });
        settle(&mut store)?;
    }

    print_view(&store.view_model());
    for line in store.logs() {
        eprintln!("{line}");
    }
    store.discard();
    Ok(())
}

struct Args {
    player_id: String,
    more_pages: usize,
    hand_id: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut player_id = None;
    let mut more_pages = 0;
    let mut hand_id = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--more" => {
                let raw = args.next().ok_or_else(|| anyhow!("--more needs a page count"))?;
                more_pages = raw
                    .parse::<usize>()
                    .with_context(|| format!("invalid page count {raw}"))?;
            }
            "--hand" => {
                hand_id = Some(args.next().ok_or_else(|| anyhow!("--hand needs a hand id"))?);
            }
            _ if player_id.is_none() => player_id = Some(arg),
            _ => return Err(anyhow!("unexpected argument {arg}")),
        }
    }

    let player_id = player_id
        .ok_or_else(|| anyhow!("usage: stats_dashboard <player-id> [--more N] [--hand ID]"))?;
    Ok(Args {
        player_id,
        more_pages,
        hand_id,
    })
}

fn settle(store: &mut StatsStore) -> Result<()> {
    if store.wait_idle(SETTLE_TIMEOUT) {
        Ok(())
    } else {
        Err(anyhow!(
            "{} fetches still in flight after {}s",
            store.inflight(),
            SETTLE_TIMEOUT.as_secs()
        ))
    }
}

fn print_view(view: &StatisticsViewModel) {
    if let Some(err) = view.error.as_deref() {
        println!("Error: {err}");
    }

    match view.player_stats.as_ref() {
        Some(stats) => {
            println!("Player: {} ({})", stats.player_name, stats.player_id);
            println!(
                "Rank: {}",
                view.player_rank
                    .map(|r| format!("#{r}"))
                    .unwrap_or_else(|| "unranked".to_string())
            );
        }
        None => println!("Player: n/a"),
    }
    println!("Win rate: {}", view.win_rate_formatted);
    println!("Hands played: {}", view.hands_played);
    println!("Hands won: {}", view.win_percentage);
    println!("Profit/loss: {:.2}", view.profit_loss);
    println!("Average pot won: {:.0}", view.avg_pot_won);

    println!("Top players:");
    for entry in &view.top_three {
        println!(
            "  {:>2}. {:<20} {:>12.2} ({} hands won)",
            entry.rank, entry.player_name, entry.total_winnings, entry.hands_won
        );
    }

    println!(
        "Hand history: {} hands, page {}/{}",
        view.hand_history.len(),
        if view.total_pages == 0 {
            0
        } else {
            view.current_page + 1
        },
        view.total_pages
    );
    if let Some(hand) = view.selected_hand.as_ref() {
        println!(
            "Hand #{}: pot {:.2}, board [{}], winner {} ({})",
            hand.hand_number,
            hand.pot_size,
            hand.community_cards.join(" "),
            hand.winner_name.as_deref().unwrap_or("-"),
            hand.winning_hand.as_deref().unwrap_or("-")
        );
    }
}
