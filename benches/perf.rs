use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use holdem_stats::state::{
    Delta, HandHistoryEntry, HandHistoryPlayer, LeaderboardEntry, PlayerStatistics, StatsState,
    apply_delta,
};
use holdem_stats::view_model::StatisticsViewModel;

fn sample_stats() -> PlayerStatistics {
    PlayerStatistics {
        player_id: "p50".to_string(),
        player_name: "Player 50".to_string(),
        total_games: 120,
        total_hands: 9000,
        hands_won: 2100,
        hands_lost: 6900,
        total_winnings: 125_000.0,
        total_losses: 98_500.0,
        biggest_pot_won: 8_000.0,
        vpip: 24.0,
        pfr: 18.0,
        aggression: 2.2,
        win_rate: 5.5,
        showdown_win_rate: 51.0,
        created_at: None,
        updated_at: None,
    }
}

fn sample_leaderboard(len: u32) -> Vec<LeaderboardEntry> {
    (1..=len)
        .map(|rank| LeaderboardEntry {
            rank,
            player_id: format!("p{rank}"),
            player_name: format!("Player {rank}"),
            total_winnings: 1_000_000.0 / f64::from(rank),
            hands_won: u64::from(10_000 / rank),
            win_rate: 10.0 / f64::from(rank),
        })
        .collect()
}

fn sample_hands(start: u64, count: u64) -> Vec<HandHistoryEntry> {
    (start..start + count)
        .map(|id| HandHistoryEntry {
            id: id.to_string(),
            hand_number: id,
            players: (0..6)
                .map(|seat| HandHistoryPlayer {
                    player_id: format!("p{seat}"),
                    player_name: format!("Player {seat}"),
                    seat_position: seat,
                    starting_chips: 1000.0,
                    ending_chips: 1000.0 + f64::from(seat) * 10.0 - 25.0,
                    hole_cards: None,
                })
                .collect(),
            community_cards: vec!["AS".into(), "KD".into(), "7C".into()],
            pot_size: 150.0,
            winner_id: Some("p5".to_string()),
            winner_name: Some("Player 5".to_string()),
            winning_hand: Some("Pair".to_string()),
            timestamp: None,
            actions: Vec::new(),
        })
        .collect()
}

fn bench_view_model(c: &mut Criterion) {
    let mut state = StatsState::new();
    state = apply_delta(state, Delta::SetPlayerStats(sample_stats()));
    state = apply_delta(state, Delta::SetLeaderboard(sample_leaderboard(100)));
    state = apply_delta(state, Delta::SetHandHistory(sample_hands(0, 200)));

    c.bench_function("derive_view_model", |b| {
        b.iter(|| StatisticsViewModel::derive(black_box(&state), 1))
    });
}

fn bench_append_history(c: &mut Criterion) {
    let base = apply_delta(StatsState::new(), Delta::SetHandHistory(sample_hands(0, 200)));
    let page = sample_hands(200, 20);

    c.bench_function("append_history_page", |b| {
        b.iter(|| {
            apply_delta(
                black_box(base.clone()),
                Delta::Batch(vec![
                    Delta::AppendHandHistory(page.clone()),
                    Delta::SetPagination {
                        current_page: 10,
                        total_pages: 20,
                    },
                    Delta::SetLoading(false),
                ]),
            )
        })
    });
}

criterion_group!(benches, bench_view_model, bench_append_history);
criterion_main!(benches);
