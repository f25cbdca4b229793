//! Load check for a running gateway: concurrent new joiners submit the onboarding form,
//! ask policy and helpdesk questions and leave feedback.
//! Run with the gateway up: cargo run --bin stress_test
//! Target defaults to http://127.0.0.1:8000; override with HR_STRESS_BASE_URL.

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const CONCURRENT_JOINERS: usize = 10;
const ROUNDS_PER_JOINER: usize = 5;

const QUESTIONS: &[&str] = &[
    "How many days of paid leave do I get?",
    "When is salary credited each month?",
    "What does the health insurance cover?",
    "How do I claim travel reimbursements?",
    "Who do I contact for laptop issues?",
];

#[derive(Default)]
struct Tally {
    success: AtomicU32,
    failure: AtomicU32,
    latencies: RwLock<Vec<u64>>,
}

impl Tally {
    async fn record(&self, result: Result<reqwest::Response, reqwest::Error>, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(resp) if resp.status().is_success() => {
                self.success.fetch_add(1, Ordering::Relaxed);
                self.latencies.write().await.push(elapsed_ms);
            }
            _ => {
                self.failure.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

fn joiner(id: usize, round: usize) -> Value {
    json!({
        "employee_code": format!("LOAD{:03}-{}", id, round),
        "employee_name": format!("Load Tester {}", id),
        "gender": "Other",
        "date_of_birth": "1995-06-15",
        "date_of_joining": "2026-11-02",
        "designation": "Associate Engineer",
        "ctc_at_joining": 900000.0,
        "aadhaar_number": "999988887777",
        "personal_email_id": format!("load{}@example.com", id),
        "official_email_id": format!("load{}@acme.co.in", id),
        "contact_number": "+91 90000 00000",
        "emergency_contact_name": "Load Contact",
        "emergency_contact_number": "+91 90000 00001",
    })
}

#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("HR_STRESS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    println!(
        "[STRESS TEST] {} joiners x {} rounds x 3 requests against {}",
        CONCURRENT_JOINERS, ROUNDS_PER_JOINER, base_url
    );

    let tally = Arc::new(Tally::default());
    let client = Client::new();

    let mut handles = Vec::new();
    for id in 0..CONCURRENT_JOINERS {
        let client = client.clone();
        let tally = Arc::clone(&tally);
        let base_url = base_url.clone();

        handles.push(tokio::spawn(async move {
            for round in 0..ROUNDS_PER_JOINER {
                let started = Instant::now();
                let res = client
                    .post(format!("{}/api/onboard", base_url))
                    .json(&joiner(id, round))
                    .send()
                    .await;
                tally.record(res, started).await;

                let scope = if round % 2 == 0 { "onboarding" } else { "employee" };
                let mut ask = json!({
                    "scope": scope,
                    "message": QUESTIONS[(id + round) % QUESTIONS.len()],
                });
                if scope == "onboarding" {
                    ask["mode"] = json!("global");
                }
                let started = Instant::now();
                let res = client
                    .post(format!("{}/api/ask", base_url))
                    .json(&ask)
                    .send()
                    .await;
                tally.record(res, started).await;

                let started = Instant::now();
                let res = client
                    .post(format!("{}/api/feedback", base_url))
                    .json(&json!({
                        "rating": 1 + (id + round) % 5,
                        "category": "Onboarding",
                        "message": "Load test feedback, please ignore.",
                        "anonymous": round % 2 == 0,
                    }))
                    .send()
                    .await;
                tally.record(res, started).await;
            }
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    let s = tally.success.load(Ordering::Relaxed);
    let f = tally.failure.load(Ordering::Relaxed);
    let total = s + f;
    let success_rate = if total > 0 { (s as f64 / total as f64) * 100.0 } else { 0.0 };
    let latencies = tally.latencies.read().await;
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
    };

    println!(
        "[STRESS TEST] Success rate: {:.1}% | Average latency: {:.0}ms",
        success_rate, avg_latency_ms
    );
    println!("[STRESS TEST] Total: {} | Success: {} | Failure: {}", total, s, f);
    println!("[STRESS TEST] Check the employee sheet for {} new rows.", CONCURRENT_JOINERS * ROUNDS_PER_JOINER);
}
