/// Tunnel geometry calculators.
///
/// ```text
///   "250+11" ──► survey ──► signed distance ──► lmr ──► (X, Y, Z)
/// ```

pub mod lmr;
pub mod survey;
