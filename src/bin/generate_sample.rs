use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const REGIONS: [&str; 4] = ["UK", "US", "DE", "FR"];
const SEGMENTS: [&str; 3] = ["SMB", "Mid-Market", "Enterprise"];
const LEAD_SOURCES: [&str; 5] = ["Website", "Referral", "Event", "Partner", "Outbound"];
const SALESPEOPLE: [&str; 6] = ["Alice", "Bob", "Cara", "Dev", "Emma", "Femi"];

/// Stage name and relative weight.
const STAGES: [(&str, f64); 5] = [
    ("Prospecting", 0.15),
    ("Proposal", 0.15),
    ("Negotiation", 0.15),
    ("Closed Won", 0.35),
    ("Closed Lost", 0.20),
];

const ROWS: usize = 400;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for (item, weight) in items {
            if target < *weight {
                return *item;
            }
            target -= weight;
        }
        items[items.len() - 1].0
    }

    /// Log-normal deal size, rounded to whole pounds.
    fn deal_size(&mut self, segment: &str) -> f64 {
        let median: f64 = match segment {
            "Enterprise" => 40_000.0,
            "Mid-Market" => 12_000.0,
            _ => 3_000.0,
        };
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        (median * (0.6 * z).exp()).round()
    }
}

struct Row {
    deal_id: String,
    region: &'static str,
    company_size: &'static str,
    deal_stage: &'static str,
    deal_size: f64,
    lead_source: &'static str,
    salesperson: &'static str,
    deal_closure_date: Option<String>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let fy_start = NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date");

    (0..ROWS)
        .map(|i| {
            let company_size = rng.pick(&SEGMENTS);
            let deal_stage = rng.weighted(&STAGES);
            let date = fy_start + Duration::days((rng.next_f64() * 455.0) as i64);

            // A handful of dirty dates so the revenue section has something to skip.
            let deal_closure_date = match i % 53 {
                7 => None,
                19 => Some("TBC".to_string()),
                31 => Some(date.format("%d.%m.%Y").to_string()),
                _ => Some(date.format("%Y-%m-%d").to_string()),
            };

            Row {
                deal_id: format!("D{:04}", i + 1),
                region: rng.pick(&REGIONS),
                company_size,
                deal_stage,
                deal_size: rng.deal_size(company_size),
                lead_source: rng.pick(&LEAD_SOURCES),
                salesperson: rng.pick(&SALESPEOPLE),
                deal_closure_date,
            }
        })
        .collect()
}

const HEADER: [&str; 8] = [
    "Deal_ID",
    "Region",
    "Company_Size",
    "Deal_Stage",
    "Deal_Size",
    "Lead_Source",
    "Salesperson",
    "Deal_Closure_Date",
];

fn write_csv(path: &str, rows: &[Row]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer.write_record(HEADER).expect("Failed to write header");
    for row in rows {
        let size = row.deal_size.to_string();
        writer
            .write_record([
                row.deal_id.as_str(),
                row.region,
                row.company_size,
                row.deal_stage,
                size.as_str(),
                row.lead_source,
                row.salesperson,
                row.deal_closure_date.as_deref().unwrap_or(""),
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn to_batch(rows: &[Row]) -> RecordBatch {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(
        HEADER
            .iter()
            .map(|name| match *name {
                "Deal_Size" => Field::new(*name, DataType::Float64, false),
                "Deal_Closure_Date" => Field::new(*name, DataType::Utf8, true),
                _ => Field::new(*name, DataType::Utf8, false),
            })
            .collect::<Vec<_>>(),
    ));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(text(|r| r.deal_id.as_str())),
            Arc::new(text(|r| r.region)),
            Arc::new(text(|r| r.company_size)),
            Arc::new(text(|r| r.deal_stage)),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.deal_size).collect::<Vec<_>>(),
            )),
            Arc::new(text(|r| r.lead_source)),
            Arc::new(text(|r| r.salesperson)),
            Arc::new(StringArray::from(
                rows.iter()
                    .map(|r| r.deal_closure_date.as_deref())
                    .collect::<Vec<_>>(),
            )),
        ],
    )
    .expect("Failed to create RecordBatch")
}

fn main() {
    let mut rng = SimpleRng::new(2025);
    let rows = generate(&mut rng);

    let csv_path = "paddle_opp_data.csv";
    write_csv(csv_path, &rows);

    let batch = to_batch(&rows);
    let parquet_path = "paddle_opp_data.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    let preview = pretty_format_batches(&[batch.slice(0, 5)]).expect("Failed to format preview");
    println!("{preview}");
    println!("Wrote {} opportunities to {csv_path} and {parquet_path}", rows.len());
}
