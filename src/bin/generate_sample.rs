//! Writes a synthetic county features/target pair for manual pipeline runs.
//!
//! The data carries the defects the cleaner has to handle: sentinel codes,
//! counts larger than the population and invalid targets.

use std::path::PathBuf;

use anyhow::Result;
use county_clean::config::{COUNT_COLUMNS, DROPPED_COLUMNS, MISSING_SENTINELS, RATE_COLUMNS};
use county_clean::data::writer::{write_csv, write_parquet};
use county_clean::{Cell, Column, Table};

const COUNTIES: usize = 200;

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// One of the published sentinel codes, `p` of the time.
    fn maybe_sentinel(&mut self, p: f64, value: f64) -> f64 {
        if self.next_f64() < p {
            MISSING_SENTINELS[(self.next_u64() % MISSING_SENTINELS.len() as u64) as usize]
        } else {
            value
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);
    let mut rng = SimpleRng::new(42);

    let keys: Vec<u64> = (0..COUNTIES as u64).collect();
    let population: Vec<f64> = (0..COUNTIES)
        .map(|_| rng.uniform(1_000.0, 500_000.0).round())
        .collect();

    let mut columns = vec![
        Column::new(
            "State_FIPS_Code",
            (0..COUNTIES).map(|i| Cell::Integer(1 + (i / 40) as i64)).collect(),
        ),
        Column::new(
            "County_FIPS_Code",
            (0..COUNTIES).map(|i| Cell::Integer(1 + 2 * (i % 40) as i64)).collect(),
        ),
        Column::from_values("Population_Size", population.clone()),
    ];

    for name in RATE_COLUMNS {
        let values = (0..COUNTIES)
            .map(|_| {
                let rate = round1(rng.uniform(200.0, 3_000.0));
                rng.maybe_sentinel(0.05, rate)
            })
            .collect::<Vec<f64>>();
        columns.push(Column::from_values(name, values));
    }

    for name in COUNT_COLUMNS {
        let values = population
            .iter()
            .map(|&pop| {
                // A few counties report more people than they have.
                let share = if rng.next_f64() < 0.01 { 1.2 } else { rng.uniform(0.0, 0.3) };
                rng.maybe_sentinel(0.03, (pop * share).round())
            })
            .collect::<Vec<f64>>();
        columns.push(Column::from_values(name, values));
    }

    for name in DROPPED_COLUMNS {
        if columns.iter().any(|c| c.name == name) {
            continue;
        }
        let values = (0..COUNTIES)
            .map(|_| {
                let v = round1(rng.uniform(0.0, 100.0));
                rng.maybe_sentinel(0.1, v)
            })
            .collect::<Vec<f64>>();
        columns.push(Column::from_values(name, values));
    }

    let features = Table::new(keys.clone(), columns)?;

    let ale = (0..COUNTIES)
        .map(|_| {
            let v = round1(rng.uniform(68.0, 84.0));
            rng.maybe_sentinel(0.04, v)
        })
        .collect::<Vec<f64>>();
    let target = Table::new(keys, vec![Column::from_values("ALE", ale)])?;

    std::fs::create_dir_all(&out_dir)?;
    write_csv(&features, &out_dir.join("features.csv"), "row_id")?;
    write_csv(&target, &out_dir.join("target.csv"), "row_id")?;
    write_parquet(&features, &out_dir.join("features.parquet"), "row_id")?;
    write_parquet(&target, &out_dir.join("target.parquet"), "row_id")?;

    println!(
        "Wrote {COUNTIES} counties ({} feature columns) to {}",
        features.width(),
        out_dir.display()
    );
    Ok(())
}
