use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use zip::write::SimpleFileOptions;

const ROWS: usize = 1000;
const ARCHIVE: &str = "german_credit.zip";
const ENTRY: &str = "german_credit_data.csv";
/// Missing-value spelling used by the published dataset.
const MISSING: &str = "NA";

/// One applicant, in the column layout of the public German credit CSV.
#[derive(Debug, Serialize)]
struct Applicant {
    #[serde(rename = "")]
    index: usize,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Sex")]
    sex: &'static str,
    #[serde(rename = "Job")]
    job: u8,
    #[serde(rename = "Housing")]
    housing: &'static str,
    #[serde(rename = "Saving accounts")]
    saving_accounts: &'static str,
    #[serde(rename = "Checking account")]
    checking_account: &'static str,
    #[serde(rename = "Credit amount")]
    credit_amount: u32,
    #[serde(rename = "Duration")]
    duration: u32,
    #[serde(rename = "Purpose")]
    purpose: &'static str,
    #[serde(rename = "Risk")]
    risk: &'static str,
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<T: Copy>(&mut self, choices: &[(T, f64)]) -> T {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut r = self.next_f64() * total;
        for &(item, w) in choices {
            if r < w {
                return item;
            }
            r -= w;
        }
        choices[choices.len() - 1].0
    }
}

fn applicant(index: usize, rng: &mut SimpleRng) -> Applicant {
    // Right-skewed ages, clipped to the range seen in the real data.
    let age = (19.0 + rng.gauss(0.0, 1.0).abs() * 16.0).min(75.0) as u32;
    let duration = rng.weighted(&[(6, 1.0), (12, 3.0), (18, 2.0), (24, 2.5), (36, 1.0), (48, 0.5)]);
    let credit_amount = (duration as f64 * rng.gauss(140.0, 60.0).max(25.0)).round() as u32 + 250;

    // Long, large loans are the risky ones.
    let bad_odds = 0.18 + 0.004 * duration as f64 + if age < 25 { 0.08 } else { 0.0 };
    let risk = if rng.next_f64() < bad_odds { "bad" } else { "good" };

    Applicant {
        index,
        age,
        sex: rng.weighted(&[("male", 0.69), ("female", 0.31)]),
        job: rng.weighted(&[(0, 0.022), (1, 0.2), (2, 0.63), (3, 0.148)]),
        housing: rng.weighted(&[("own", 0.713), ("rent", 0.179), ("free", 0.108)]),
        saving_accounts: rng.weighted(&[
            ("little", 0.603),
            ("moderate", 0.103),
            ("quite rich", 0.063),
            ("rich", 0.048),
            (MISSING, 0.183),
        ]),
        checking_account: rng.weighted(&[
            ("little", 0.274),
            ("moderate", 0.269),
            ("rich", 0.063),
            (MISSING, 0.394),
        ]),
        credit_amount,
        duration,
        purpose: rng.weighted(&[
            ("car", 0.337),
            ("radio/TV", 0.28),
            ("furniture/equipment", 0.181),
            ("business", 0.097),
            ("education", 0.059),
            ("repairs", 0.022),
            ("domestic appliances", 0.012),
            ("vacation/others", 0.012),
        ]),
        risk,
    }
}

/// Serialize `rows` synthetic applicants as CSV with a header row.
fn applicants_csv(rows: usize, seed: u64) -> Result<Vec<u8>> {
    let mut rng = SimpleRng::new(seed);
    let mut writer = csv::Writer::from_writer(Vec::new());
    for i in 0..rows {
        writer
            .serialize(applicant(i, &mut rng))
            .context("serializing applicant row")?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing CSV buffer")
}

fn main() -> Result<()> {
    env_logger::init();
    let data = applicants_csv(ROWS, 42)?;

    let file = File::create(ARCHIVE).with_context(|| format!("creating {ARCHIVE}"))?;
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(ENTRY, SimpleFileOptions::default())?;
    zip.write_all(&data)?;
    zip.finish()?;

    log::info!("Wrote {} bytes of CSV into {ARCHIVE}/{ENTRY}", data.len());
    println!("Wrote {ROWS} applicants to {ARCHIVE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_index_column_and_na_gaps() {
        let text = String::from_utf8(applicants_csv(200, 7).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(concat!(
                ",Age,Sex,Job,Housing,Saving accounts,Checking account,",
                "Credit amount,Duration,Purpose,Risk"
            ))
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 200);
        assert!(rows.iter().any(|r| r.contains(",NA,")));
        assert!(rows.iter().all(|r| !r.contains(",,")));
    }

    #[test]
    fn same_seed_same_data() {
        assert_eq!(applicants_csv(50, 1).unwrap(), applicants_csv(50, 1).unwrap());
    }
}
