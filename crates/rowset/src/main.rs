// rowset — command-line front end
//
// Usage:
//   rowset generate --rows 1000 --features 10 --out data.npy
//   rowset inspect data.npy
//   rowset split data.npy --ratios 0.7,0.15,0.15 --seed 42 --out-dir splits
//   rowset iterate data.npy --target-cols 10 --batch-size 64
//   rowset run --config run.toml
//
// Log verbosity follows RUST_LOG (default: info).

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use rowset::data::synthetic::{self, SyntheticConfig};
use rowset::data::{DataLoader, DataLoaderConfig, Dataset, Partitions, SplitConfig, TableDataset};
use rowset::{npy, DType, RunConfig};

const USAGE: &str = "\
rowset — load, split and batch sample tables stored as .npy files

Usage:
  rowset generate --out <file> [--rows <n>] [--features <n>] [--noise <x>] [--seed <n>] [--dtype f32|f64]
  rowset inspect <file>
  rowset split <file> [--ratios <a,b[,c]>] [--seed <n>] [--no-shuffle] [--out-dir <dir>]
  rowset iterate <file> [--target-cols <c,..>] [--batch-size <n>] [--no-shuffle]
                        [--drop-last] [--seed <n>] [--workers <n>]
  rowset run --config <file.toml|file.json>
  rowset --help";

/// Cursor over the arguments that follow the subcommand.
struct Args {
    args: Vec<String>,
    pos: usize,
}

impl Args {
    fn next(&mut self) -> Option<String> {
        let a = self.args.get(self.pos).cloned();
        self.pos += 1;
        a
    }

    /// The value following `flag`.
    fn value(&mut self, flag: &str) -> Result<String> {
        self.next()
            .ok_or_else(|| anyhow!("{flag} expects a value"))
    }

    fn parsed<T>(&mut self, flag: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let v = self.value(flag)?;
        v.parse()
            .with_context(|| format!("invalid value for {flag}: '{v}'"))
    }

    fn list<T>(&mut self, flag: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let v = self.value(flag)?;
        v.split(',')
            .map(|s| {
                s.trim()
                    .parse()
                    .with_context(|| format!("invalid entry in {flag}: '{s}'"))
            })
            .collect()
    }
}

fn parse_dtype(s: &str) -> Result<DType> {
    match s {
        "f32" => Ok(DType::F32),
        "f64" => Ok(DType::F64),
        other => bail!("unsupported --dtype '{other}' (expected f32 or f64)"),
    }
}

fn generate(mut args: Args) -> Result<()> {
    let mut cfg = SyntheticConfig::default();
    let mut out: Option<PathBuf> = None;
    let mut dtype = DType::F64;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--rows" => cfg.rows = args.parsed("--rows")?,
            "--features" => cfg.features = args.parsed("--features")?,
            "--noise" => cfg.noise = args.parsed("--noise")?,
            "--seed" => cfg.seed = args.parsed("--seed")?,
            "--dtype" => dtype = parse_dtype(&args.value("--dtype")?)?,
            "--out" => out = Some(PathBuf::from(args.value("--out")?)),
            other => bail!("unknown argument for generate: {other}"),
        }
    }
    let out = out.context("generate requires --out <file>")?;

    let table = synthetic::linear_table(&cfg)?;
    npy::save(&out, &table, dtype).with_context(|| format!("writing {}", out.display()))?;
    log::info!(
        "wrote {}x{} synthetic table to {} (target is column {})",
        table.nrows(),
        table.ncols(),
        out.display(),
        cfg.features
    );
    Ok(())
}

fn inspect(mut args: Args) -> Result<()> {
    let path = PathBuf::from(args.next().context("inspect requires a file")?);
    let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let header = npy::header_info(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    let table = npy::from_bytes(&bytes)?;

    println!("file:          {}", path.display());
    println!("version:       {}.{}", header.version.0, header.version.1);
    println!("dtype:         {} ({})", header.dtype, header.descr);
    println!("stored shape:  {:?}", header.shape);
    println!("fortran order: {}", header.fortran_order);
    println!("table:         {} rows x {} cols", table.nrows(), table.ncols());
    println!();
    println!("{:>6} {:>12} {:>12} {:>12} {:>12}", "col", "mean", "std", "min", "max");
    for (c, s) in table.column_stats().iter().enumerate() {
        println!(
            "{:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            c, s.mean, s.std, s.min, s.max
        );
    }
    Ok(())
}

fn split(mut args: Args) -> Result<()> {
    let path = PathBuf::from(args.next().context("split requires a file")?);
    let mut cfg = SplitConfig::default();
    let mut out_dir: Option<PathBuf> = None;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--ratios" => cfg.ratios = args.list("--ratios")?,
            "--seed" => cfg.seed = Some(args.parsed("--seed")?),
            "--no-shuffle" => cfg.shuffle = false,
            "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
            other => bail!("unknown argument for split: {other}"),
        }
    }

    let ds = TableDataset::from_npy(&path).with_context(|| format!("loading {}", path.display()))?;
    let parts = Partitions::from_splits(ds.split(&cfg)?)?;
    for (name, part) in parts.named() {
        println!("{name:>5}: {} samples", part.len());
        if let Some(dir) = &out_dir {
            std::fs::create_dir_all(dir)?;
            let file = dir.join(format!("{name}.npy"));
            part.save_npy(&file, DType::F64)
                .with_context(|| format!("writing {}", file.display()))?;
            log::info!("wrote {}", file.display());
        }
    }
    Ok(())
}

fn iterate(mut args: Args) -> Result<()> {
    let path = PathBuf::from(args.next().context("iterate requires a file")?);
    let mut cfg = DataLoaderConfig::default();
    let mut target_cols: Vec<usize> = Vec::new();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--target-cols" => target_cols = args.list("--target-cols")?,
            "--batch-size" => cfg.batch_size = args.parsed("--batch-size")?,
            "--no-shuffle" => cfg.shuffle = false,
            "--drop-last" => cfg.drop_last = true,
            "--seed" => cfg.seed = Some(args.parsed("--seed")?),
            "--workers" => cfg.num_workers = args.parsed("--workers")?,
            other => bail!("unknown argument for iterate: {other}"),
        }
    }

    let ds = TableDataset::from_npy(&path)
        .with_context(|| format!("loading {}", path.display()))?
        .with_target_cols(&target_cols)?;
    let mut loader = DataLoader::new(&ds, cfg)?;
    println!(
        "{} samples, {} features, {} targets, {} batches",
        ds.len(),
        ds.num_features(),
        ds.num_targets(),
        loader.num_batches()
    );
    for (i, batch) in loader.iter_batches().enumerate() {
        let batch = batch?;
        println!(
            "batch {i:>4}: features {:?} targets {:?}",
            batch.features.shape(),
            batch.targets.shape()
        );
    }
    Ok(())
}

fn run(mut args: Args) -> Result<()> {
    let mut config_path: Option<PathBuf> = None;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
            other => bail!("unknown argument for run: {other}"),
        }
    }
    let config_path = config_path.context("run requires --config <file>")?;
    let config = RunConfig::from_path(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let summary = rowset::run(&config)?;
    println!(
        "{} rows, {} features, {} targets",
        summary.rows, summary.num_features, summary.num_targets
    );
    for p in &summary.partitions {
        println!("{:>5}: {} samples, {} batches", p.name, p.samples, p.batches);
    }
    Ok(())
}

fn dispatch(argv: Vec<String>) -> Result<()> {
    let mut args = Args { args: argv, pos: 1 };
    let Some(cmd) = args.next() else {
        println!("{USAGE}");
        return Ok(());
    };
    match cmd.as_str() {
        "generate" => generate(args),
        "inspect" => inspect(args),
        "split" => split(args),
        "iterate" => iterate(args),
        "run" => run(args),
        "--help" | "-h" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dispatch(std::env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Printed directly so failures show even with RUST_LOG=off
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
