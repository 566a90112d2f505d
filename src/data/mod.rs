/// Data layer: core types, loading, noise removal and merging.
///
/// Architecture:
/// ```text
///  *_L.csv / *_M.csv / *_R.csv   (UTF-8 or Shift_JIS)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode, find columns → ChannelDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  depth range, thinning, resampling
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  noise    │  LOWESS trend + spike rejection (per channel, rayon)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ process   │  survey regions → distance → XYZ → MergedDataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod noise;
pub mod process;
