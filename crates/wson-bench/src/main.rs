//! Benchmark for WSON encoding and decoding of JSON documents.
//!
//! Loads a JSON file (or generates tabular rows when no path is given),
//! converts it to a WSON value tree and times both directions, with and
//! without a process-scoped identifier cache.

use std::fs;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wson::{IdentifierCache, Text, Value, from_bytes, from_bytes_with_cache, to_bytes, validate};

const ENCODE_ITERS: u32 = 20;
const DECODE_ITERS: u32 = 20;
const SYNTHETIC_ROWS: usize = 50_000;

// =============================================================================
// INPUT
// =============================================================================

/// Converts parsed JSON into a value tree. Integers that fit in 32 bits use
/// the Int32 form; wider integers keep their digits as BigInt text.
fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(int) => Value::Int32(int),
                Err(_) => Value::BigInt(Text::from(i.to_string())),
            },
            None => Value::Float64(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Text::from(k.as_str()), from_json(v)))
                .collect(),
        ),
    }
}

fn synthetic_rows(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                Value::map([
                    ("id", Value::Int32(i as i32)),
                    ("name", Value::string(&format!("city-{i}"))),
                    ("population", Value::Int32((i * 37 % 1_000_000) as i32)),
                    ("lat", Value::Float64(i as f64 * 0.001)),
                    ("lon", Value::Float64(-(i as f64) * 0.002)),
                    ("capital", Value::Bool(i % 97 == 0)),
                    ("timezone", Value::Null),
                ])
            })
            .collect(),
    )
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Serialize)]
struct Timing {
    name: &'static str,
    avg_micros: u128,
    throughput_mb_s: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    json_bytes: usize,
    wson_bytes: usize,
    timings: Vec<Timing>,
    cache_hits: u64,
    cache_misses: u64,
}

fn timing(name: &'static str, bytes: usize, avg: Duration) -> Timing {
    let throughput = (bytes as f64 / 1_000_000.0) / avg.as_secs_f64();
    println!("{name}: {avg:?} ({throughput:.2} MB/s)");
    Timing {
        name,
        avg_micros: avg.as_micros(),
        throughput_mb_s: throughput,
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    let path = std::env::args().nth(1);
    let (source, json_data) = match &path {
        Some(path) => {
            info!(%path, "loading JSON");
            (path.clone(), fs::read_to_string(path).expect("Failed to read file"))
        }
        None => {
            info!(rows = SYNTHETIC_ROWS, "no input given, generating rows");
            let rows = synthetic_rows(SYNTHETIC_ROWS);
            let json = serde_json::to_string(&to_json(&rows)).expect("Failed to serialize rows");
            ("synthetic".to_string(), json)
        }
    };

    let parse_start = Instant::now();
    let json: serde_json::Value = serde_json::from_str(&json_data).expect("Failed to parse JSON");
    let tree = from_json(&json);
    println!("Parsed JSON ({} bytes) in {:?}", json_data.len(), parse_start.elapsed());

    let mut timings = Vec::new();

    // Warmup
    let encoded = to_bytes(&tree);
    validate(&encoded).expect("Encoder produced an invalid buffer");

    let encode_start = Instant::now();
    for _ in 0..ENCODE_ITERS {
        let bytes = to_bytes(&tree);
        assert_eq!(bytes.len(), encoded.len());
    }
    timings.push(timing("encode", encoded.len(), encode_start.elapsed() / ENCODE_ITERS));

    let decode_start = Instant::now();
    for _ in 0..DECODE_ITERS {
        let _ = from_bytes(&encoded);
    }
    timings.push(timing("decode (call cache)", encoded.len(), decode_start.elapsed() / DECODE_ITERS));

    let mut cache = IdentifierCache::new();
    let _ = from_bytes_with_cache(&encoded, &mut cache);
    let cached_start = Instant::now();
    for _ in 0..DECODE_ITERS {
        let _ = from_bytes_with_cache(&encoded, &mut cache);
    }
    timings.push(timing("decode (process cache)", encoded.len(), cached_start.elapsed() / DECODE_ITERS));

    let validate_start = Instant::now();
    for _ in 0..DECODE_ITERS {
        validate(&encoded).expect("Failed to validate");
    }
    timings.push(timing("validate", encoded.len(), validate_start.elapsed() / DECODE_ITERS));

    assert_eq!(from_bytes(&encoded), tree, "Round trip should be lossless");

    let stats = cache.stats();
    let report = Report {
        source,
        json_bytes: json_data.len(),
        wson_bytes: encoded.len(),
        timings,
        cache_hits: stats.hits,
        cache_misses: stats.misses,
    };

    println!("\n=== Summary ===");
    println!(
        "Size vs JSON: {:.1}%",
        100.0 * report.wson_bytes as f64 / report.json_bytes as f64
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("Failed to serialize report")
    );
}

/// Inverse of [`from_json`] for generated rows.
fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int32(i) => serde_json::Value::from(*i),
        Value::Float64(f) => serde_json::Value::from(*f),
        Value::String(t) | Value::BigInt(t) | Value::BigDecimal(t) => {
            serde_json::Value::String(t.to_string_lossy())
        }
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(pairs) => serde_json::Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string_lossy(), to_json(v)))
                .collect(),
        ),
    }
}
