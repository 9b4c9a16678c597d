use std::{
    fs::File,
    io::{self, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, ensure};
use asteroids_evaluator::{network::Network, simulation::SimConfig};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::create(path),
            None => Ok(Output::stdout()),
        }
    }

    fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    fn create(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Loads a simulation config file if given, then applies the command-line overrides.
pub fn load_sim_config(
    path: Option<&Path>,
    max_ticks: Option<usize>,
    runs: Option<usize>,
) -> anyhow::Result<SimConfig> {
    let mut config = match path {
        Some(path) => read_json_file("simulation config", path)?,
        None => SimConfig::default(),
    };
    if let Some(max_ticks) = max_ticks {
        config.max_ticks = max_ticks;
    }
    if let Some(runs) = runs {
        config.num_runs = runs;
    }
    Ok(config)
}

pub fn read_network_file<P>(path: P) -> anyhow::Result<Network>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open weights file: {}", path.display()))?;
    let network = Network::load(BufReader::new(file))
        .with_context(|| format!("Failed to load network from {}", path.display()))?;
    Ok(network)
}

pub fn write_network_file<P>(network: &Network, path: P) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create weights file: {}", path.display()))?;
    network
        .save(BufWriter::new(file))
        .with_context(|| format!("Failed to save network to {}", path.display()))?;
    Ok(())
}

/// Comma-separated hidden layer widths, e.g. `16` or `20,10`. Empty entries are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerWidths(pub Vec<usize>);

impl FromStr for LayerWidths {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut widths = vec![];
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let width: usize = part
                .parse()
                .with_context(|| format!("invalid hidden layer size {part:?}"))?;
            ensure!(width > 0, "hidden layer size must be positive");
            widths.push(width);
        }
        Ok(Self(widths))
    }
}

pub fn format_layers(layers: &[usize]) -> String {
    layers
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
