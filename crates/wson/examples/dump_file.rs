//! Simple dumper to inspect WSON files.

use std::fs;
use wson::{from_bytes, validate, Value};

fn format_scalar(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("{}", b),
        Value::Int32(i) => format!("{}", i),
        Value::Float64(f) => format!("{:.6}", f),
        Value::String(t) => {
            let s = t.to_string_lossy();
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::BigInt(t) => format!("BIGINT({})", t),
        Value::BigDecimal(t) => format!("BIGDECIMAL({})", t),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Map(pairs) => format!("{{{} pairs}}", pairs.len()),
    }
}

#[derive(Default)]
struct Counts {
    scalars: usize,
    arrays: usize,
    maps: usize,
    max_depth: usize,
}

fn count(value: &Value, counts: &mut Counts) {
    let mut pending = vec![(value, 1)];
    while let Some((value, depth)) = pending.pop() {
        counts.max_depth = counts.max_depth.max(depth);
        match value {
            Value::Array(items) => {
                counts.arrays += 1;
                pending.extend(items.iter().map(|v| (v, depth + 1)));
            }
            Value::Map(pairs) => {
                counts.maps += 1;
                pending.extend(pairs.iter().map(|(_, v)| (v, depth + 1)));
            }
            _ => counts.scalars += 1,
        }
    }
}

fn print_tree(value: &Value, indent: usize, budget: &mut usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if *budget == 0 {
                    println!("{}... and {} more items", pad, items.len() - i);
                    return;
                }
                *budget -= 1;
                println!("{}[{}] {}", pad, i, format_scalar(item));
                print_tree(item, indent + 1, budget);
            }
        }
        Value::Map(pairs) => {
            for (i, (key, item)) in pairs.iter().enumerate() {
                if *budget == 0 {
                    println!("{}... and {} more pairs", pad, pairs.len() - i);
                    return;
                }
                *budget -= 1;
                println!("{}{} = {}", pad, key, format_scalar(item));
                print_tree(item, indent + 1, budget);
            }
        }
        _ => {}
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/sample.wson".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    match validate(&data) {
        Ok(()) => println!("Structure: valid"),
        Err(e) => println!("Structure: {} (decoding leniently)", e),
    }

    let value = from_bytes(&data);

    let mut counts = Counts::default();
    count(&value, &mut counts);
    println!("\n=== Summary ===");
    println!("  Scalars: {}", counts.scalars);
    println!("  Arrays: {}", counts.arrays);
    println!("  Maps: {}", counts.maps);
    println!("  Max depth: {}", counts.max_depth);

    println!("\n=== Root ===");
    println!("{}", format_scalar(&value));

    // Show the first entries in detail
    println!("\n=== First 40 entries ===");
    let mut budget = 40;
    print_tree(&value, 1, &mut budget);
}
