use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static! {
    pub static ref SHUFFLES_COUNTER: CounterVec = register_counter_vec!(
        "secret_santa_shuffles_total",
        "Secret Santa draws by variant and outcome",
        &["variant", "status"]
    ).unwrap();

    pub static ref MATCH_ATTEMPTS: HistogramVec = register_histogram_vec!(
        "secret_santa_match_attempts",
        "Candidates generated before a valid Secret Santa matching was found",
        &["variant"],
        vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0]
    ).unwrap();
}
