use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use edge_terminal::board::{build_board, BoardInputs, LeagueMode};
use edge_terminal::csv_text::parse_records;

fn sample_moneyline_csv(games: usize) -> String {
    let mut out =
        String::from("game_id,team,opponent,win_probability,goals,acceptable_american_odds\n");
    for i in 0..games {
        out.push_str(&format!(
            "g{i},\"Home Club {i}, HC\",Away Club {i},0.61,3.1{},-14{}\n",
            i % 10,
            i % 10
        ));
        out.push_str(&format!(
            "g{i},Away Club {i},\"Home Club {i}, HC\",0.39,2.4{},+15{}\n",
            i % 10,
            i % 10
        ));
    }
    out
}

fn bench_parse_records(c: &mut Criterion) {
    let csv = sample_moneyline_csv(250);
    c.bench_function("parse_records_500_rows", |b| {
        b.iter(|| {
            let records = parse_records(black_box(&csv));
            black_box(records.len());
        })
    });
}

fn bench_build_board(c: &mut Criterion) {
    let records = parse_records(&sample_moneyline_csv(250));
    c.bench_function("build_board_250_games", |b| {
        b.iter(|| {
            let inputs = BoardInputs {
                moneyline: records.clone(),
                ..Default::default()
            };
            let board = build_board(LeagueMode::Nhl, "2026-01-10", black_box(inputs));
            black_box(board.boxes.len());
        })
    });
}

criterion_group!(benches, bench_parse_records, bench_build_board);
criterion_main!(benches);
