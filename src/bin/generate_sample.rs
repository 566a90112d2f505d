//! Writes synthetic L/M/R drilling logs (Shift_JIS, like the field loggers)
//! into `sample_data/` for trying out the viewer.

use std::fs;
use std::path::Path;

use encoding_rs::SHIFT_JIS;

/// Depth step of the loggers (m).
const STEP: f64 = 0.02;
const HOLE_LENGTH: f64 = 24.0;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Ground profile: a softer band and a hard lens, different per channel.
fn ground_energy(depth: f64, soft_at: f64, hard_at: f64) -> f64 {
    let soft = -60.0 * (-(depth - soft_at).powi(2) / 8.0).exp();
    let hard = 140.0 * (-(depth - hard_at).powi(2) / 1.5).exp();
    220.0 + 2.5 * depth + soft + hard
}

fn generate_log(rng: &mut SimpleRng, soft_at: f64, hard_at: f64) -> String {
    let n = (HOLE_LENGTH / STEP) as usize + 1;
    let mut out = String::from("穿孔長,穿孔エネルギー,回転圧,備考\n");
    let mut spikes = 0;
    for k in 0..n {
        let depth = k as f64 * STEP;
        let mut energy = ground_energy(depth, soft_at, hard_at) + rng.gauss(0.0, 8.0);
        // Rod changes and bit chatter show up as isolated spikes.
        if rng.next_f64() < 0.004 {
            energy += rng.gauss(0.0, 1.0).signum() * (150.0 + 100.0 * rng.next_f64());
            spikes += 1;
        }
        let pressure = 8.0 + rng.gauss(0.0, 0.3);
        out.push_str(&format!("{depth:.2},{energy:.1},{pressure:.2},\n"));
    }
    // A logger hiccup the loader has to skip.
    out.push_str("---,---,---,通信エラー\n");
    println!("  {n} rows, {spikes} spikes");
    out
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("sample_data");
    fs::create_dir_all(dir)?;

    let holes = [("L", 6.0, 15.0), ("M", 9.0, 14.0), ("R", 5.0, 17.5)];
    for (label, soft_at, hard_at) in holes {
        let path = dir.join(format!("20240514_drilling_{label}.csv"));
        println!("{}", path.display());
        let text = generate_log(&mut rng, soft_at, hard_at);
        let (bytes, _, had_errors) = SHIFT_JIS.encode(&text);
        anyhow::ensure!(!had_errors, "sample text is not representable in Shift_JIS");
        fs::write(&path, &bytes)?;
    }

    println!("Open the files with File → Open logs…, then enter station 250+11.");
    Ok(())
}
