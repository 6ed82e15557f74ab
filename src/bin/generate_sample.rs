use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use saint_heatmap::HeatmapConfig;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// SAINT-like score: mostly near `centre`, clipped to [0, 1], rounded
    /// to two decimals; `None` with probability `missing`.
    fn score(&mut self, centre: f64, missing: f64) -> Option<f64> {
        if self.next_f64() < missing {
            return None;
        }
        let v = (centre + (self.next_f64() - 0.5) * 0.4).clamp(0.0, 1.0);
        Some((v * 100.0).round() / 100.0)
    }
}

struct Prey {
    gene: String,
    scores: Vec<Option<f64>>,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let config = HeatmapConfig::default();
    let score_columns: Vec<&str> = config.conditions.iter().map(|c| c.column.as_str()).collect();

    let mut genes: Vec<(String, f64)> = Vec::new();
    // Category members: confident in the SE baits, some left out entirely.
    for category in &config.categories {
        for (i, gene) in category.members.iter().enumerate() {
            if i % 3 != 2 {
                genes.push((gene.clone(), 0.85));
            }
        }
    }
    // Unlisted preys spanning the threshold.
    for i in 0..40 {
        genes.push((format!("PREY{i:03}"), 0.35 + (i % 8) as f64 * 0.08));
    }
    // Contaminants and the excluded identifier score high on purpose.
    for name in ["Cont_KRT1", "Cont_KRT10", "Cont_TRYP_PIG", "TXP0CG47"] {
        genes.push((name.to_string(), 0.95));
    }

    let preys: Vec<Prey> = genes
        .into_iter()
        .map(|(gene, centre)| Prey {
            gene,
            scores: score_columns.iter().map(|_| rng.score(centre, 0.08)).collect(),
        })
        .collect();

    // CSV
    let csv_path = "merged_proteomics_data.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    let mut header = vec![config.id_column.as_str()];
    header.extend(&score_columns);
    writer.write_record(&header)?;
    for prey in &preys {
        let mut record = vec![prey.gene.clone()];
        record.extend(
            prey.scores
                .iter()
                .map(|s| s.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // Parquet
    let mut fields = vec![Field::new(&config.id_column, DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        preys.iter().map(|p| p.gene.as_str()).collect::<Vec<_>>(),
    ))];
    for (j, name) in score_columns.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            preys.iter().map(|p| p.scores[j]).collect::<Vec<_>>(),
        )));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let parquet_path = "merged_proteomics_data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} preys × {} score columns to {csv_path} and {parquet_path}",
        preys.len(),
        score_columns.len()
    );
    Ok(())
}
