use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use mindmaze::engine::scoring::compute_score;
use mindmaze::engine::stats::{HistorySummary, performance_series};
use mindmaze::session::question::{Difficulty, QuizQuestion};
use mindmaze::session::result::QuizResult;
use mindmaze::session::setup::ScoringMode;
use mindmaze::store::history::{HistoryFilter, filter_entries};
use mindmaze::store::schema::HistoryEntry;

const CATEGORIES: [&str; 4] = ["javascript", "python", "react", "golang"];
const MODES: [&str; 3] = ["standard", "timed", "challenge"];

fn make_result(count: usize) -> QuizResult {
    let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
    let mut result = QuizResult::new();
    for i in 0..count {
        let question = QuizQuestion {
            id: format!("q{i}"),
            question: format!("Question {i}?"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "b".to_string(),
            difficulty: difficulties[i % difficulties.len()],
            explanation: String::new(),
        };
        let answer = match i % 4 {
            0 => None,
            1 => Some("a".to_string()),
            _ => Some("b".to_string()),
        };
        result.record(&question, answer, (i % 25) as f64);
    }
    result
}

fn make_history(count: usize) -> Vec<HistoryEntry> {
    let result = make_result(10);
    (0..count)
        .map(|i| HistoryEntry {
            id: i as i64,
            date: Utc.timestamp_millis_opt(1_700_000_000_000 + i as i64 * 60_000).unwrap(),
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            mode: MODES[i % MODES.len()].to_string(),
            score: (i % 150) as u32,
            result: result.clone(),
        })
        .collect()
}

fn bench_scoring(c: &mut Criterion) {
    let result = make_result(20);

    for mode in [ScoringMode::Standard, ScoringMode::Timed, ScoringMode::Challenge] {
        c.bench_function(&format!("compute_score {mode} (20 answers)"), |b| {
            b.iter(|| compute_score(black_box(&result), black_box(mode)))
        });
    }
}

fn bench_history(c: &mut Criterion) {
    let history = make_history(5_000);

    c.bench_function("history summary (5000 entries)", |b| {
        b.iter(|| HistorySummary::from_entries(black_box(&history)))
    });

    c.bench_function("performance series (5000 entries)", |b| {
        b.iter(|| performance_series(black_box(&history)))
    });

    let mut filter = HistoryFilter::default();
    filter.toggle_category("python");
    filter.toggle_mode("timed");
    c.bench_function("filter history (5000 entries)", |b| {
        b.iter(|| filter_entries(black_box(&history), black_box(&filter)).len())
    });
}

criterion_group!(benches, bench_scoring, bench_history);
criterion_main!(benches);
