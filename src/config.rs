use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use yaml_rust::Yaml;
use yaml_rust::YamlLoader;

use super::error::TransitError;
use super::modes::{Mode, ALL_MODES};
use super::RoutingConfig;


static DEFAULT_SEED: u64 = 100;
static DEFAULT_JOURNEY_COUNT: usize = 1000;
static DEFAULT_NUM_CANDIDATES: usize = 8;
static DEFAULT_TRANSFER_PENALTY_SAME_MODE: f64 = 3.;
static DEFAULT_TRANSFER_PENALTY_MODE_CHANGE: f64 = 5.;

// (mode, minutes between adjacent stations, minutes between departures)
static DEFAULT_MODE_TABLE: [(Mode, f64, f64); 4] = [
    (Mode::Tram, 2., 6.),
    (Mode::Trolley, 2.5, 8.),
    (Mode::Metro, 1.5, 4.),
    (Mode::Commuter, 3., 15.),
];

static DEFAULT_HEADWAY_EXCEPTIONS: [(&str, f64); 3] = [
    ("U6", 3.),
    ("S45", 10.),
    ("S50", 30.),
];

#[derive(Clone, Debug, PartialEq)]
pub struct ModeTiming {
    pub travel_time: f64,
    pub headway: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub mode_timings: HashMap<Mode, ModeTiming>,
    pub headway_exceptions: HashMap<String, f64>,
    pub transfer_penalty_same_mode: f64,
    pub transfer_penalty_mode_change: f64,
    pub num_candidates: usize,
    pub journey_count: usize,
    pub seed: u64,
    pub line_dir: Option<PathBuf>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mode_timings = DEFAULT_MODE_TABLE.iter()
            .map(|(mode, travel_time, headway)|
                 (*mode, ModeTiming {travel_time: *travel_time, headway: *headway}))
            .collect();
        let headway_exceptions = DEFAULT_HEADWAY_EXCEPTIONS.iter()
            .map(|(line, headway)| (String::from(*line), *headway))
            .collect();

        NetworkConfig {
            mode_timings,
            headway_exceptions,
            transfer_penalty_same_mode: DEFAULT_TRANSFER_PENALTY_SAME_MODE,
            transfer_penalty_mode_change: DEFAULT_TRANSFER_PENALTY_MODE_CHANGE,
            num_candidates: DEFAULT_NUM_CANDIDATES,
            journey_count: DEFAULT_JOURNEY_COUNT,
            seed: DEFAULT_SEED,
            line_dir: None,
        }
    }
}

impl NetworkConfig {
    /// Reads a yaml config file.  A relative `line_dir` is taken relative to the directory the
    /// config file is in.
    pub fn from_cfg(config_path: &Path) -> Result<NetworkConfig, TransitError> {
        let file_contents = std::fs::read_to_string(config_path)?;
        let docs = YamlLoader::load_from_str(&file_contents).map_err(|err|
            TransitError::Config(format!("failed to parse {}: {}", config_path.display(), err)))?;
        let mut cfg = match docs.first() {
            Some(doc) => NetworkConfig::from_yaml(doc)?,
            None => NetworkConfig::default(),
        };

        if let Some(line_dir) = cfg.line_dir.take() {
            let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            cfg.line_dir = Some(str_to_absolute_path(&line_dir.to_string_lossy(), base_dir));
        }
        Ok(cfg)
    }

    /// Builds a config from a parsed yaml document.  Keys that are absent keep their default
    /// values.
    pub fn from_yaml(yaml_cfg: &Yaml) -> Result<NetworkConfig, TransitError> {
        let mut cfg = NetworkConfig::default();

        if let Some(val) = get_f64(yaml_cfg, "transfer_penalty_same_mode")? {
            cfg.transfer_penalty_same_mode = val;
        }
        if let Some(val) = get_f64(yaml_cfg, "transfer_penalty_mode_change")? {
            cfg.transfer_penalty_mode_change = val;
        }
        if let Some(val) = get_usize(yaml_cfg, "num_candidates")? {
            if val == 0 {
                return Err(TransitError::Config(String::from("num_candidates must be positive")));
            }
            cfg.num_candidates = val;
        }
        if let Some(val) = get_usize(yaml_cfg, "journey_count")? {
            cfg.journey_count = val;
        }
        if let Some(val) = get_usize(yaml_cfg, "seed")? {
            cfg.seed = val as u64;
        }
        if ! yaml_cfg["line_dir"].is_badvalue() {
            let line_dir = yaml_cfg["line_dir"].as_str().ok_or_else(||
                TransitError::Config(String::from("line_dir must be a string")))?;
            cfg.line_dir = Some(PathBuf::from(line_dir));
        }

        let modes_cfg = &yaml_cfg["modes"];
        if ! modes_cfg.is_badvalue() {
            for mode in ALL_MODES.iter() {
                let mode_cfg = &modes_cfg[mode.as_str()];
                if mode_cfg.is_badvalue() {
                    continue;
                }
                let timing = cfg.mode_timings.get_mut(mode).ok_or_else(||
                    TransitError::Config(format!("no timing for mode {}", mode)))?;
                if let Some(val) = get_f64(mode_cfg, "travel_time")? {
                    timing.travel_time = val;
                }
                if let Some(val) = get_f64(mode_cfg, "headway")? {
                    timing.headway = val;
                }
            }
        }

        match &yaml_cfg["headway_exceptions"] {
            Yaml::Hash(exceptions) => {
                for (line, headway) in exceptions {
                    let line = match line {
                        Yaml::String(ss) => ss.clone(),
                        Yaml::Integer(ii) => ii.to_string(),
                        _ => return Err(TransitError::Config(
                            format!("bad line id in headway_exceptions: {:?}", line))),
                    };
                    let headway = yaml_as_f64(headway).ok_or_else(||
                        TransitError::Config(format!("bad headway for line {}", line)))?;
                    cfg.headway_exceptions.insert(line, headway);
                }
            }
            Yaml::BadValue => (),
            other => return Err(TransitError::Config(
                format!("headway_exceptions must be a mapping, got {:?}", other))),
        }

        for (mode, timing) in &cfg.mode_timings {
            if timing.travel_time < 0. || timing.headway <= 0. {
                return Err(TransitError::Config(format!("invalid timing for mode {}", mode)));
            }
        }
        Ok(cfg)
    }
}

impl RoutingConfig for NetworkConfig {
    fn get_travel_time(&self, mode: Mode) -> f64 {
        match self.mode_timings.get(&mode) {
            Some(timing) => timing.travel_time,
            None => f64::INFINITY,
        }
    }

    fn get_headway(&self, mode: Mode) -> f64 {
        match self.mode_timings.get(&mode) {
            Some(timing) => timing.headway,
            None => f64::INFINITY,
        }
    }

    fn get_headway_exception(&self, line_id: &str) -> Option<f64> {
        self.headway_exceptions.get(line_id).copied()
    }

    fn get_transfer_penalty_same_mode(&self) -> f64 {
        self.transfer_penalty_same_mode
    }

    fn get_transfer_penalty_mode_change(&self) -> f64 {
        self.transfer_penalty_mode_change
    }

    fn get_num_candidates(&self) -> usize {
        self.num_candidates
    }
}

pub fn str_to_absolute_path(path_str: &str, default_base_dir: &Path) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        return path;
    } else {
        return [default_base_dir, Path::new(&path)].iter().collect();
    }
}

// yaml-rust doesn't coerce integers to floats, so accept either.
fn yaml_as_f64(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Real(_) => value.as_f64(),
        Yaml::Integer(ii) => Some(*ii as f64),
        _ => None,
    }
}

fn get_f64(yaml_cfg: &Yaml, key: &str) -> Result<Option<f64>, TransitError> {
    let value = &yaml_cfg[key];
    if value.is_badvalue() {
        return Ok(None);
    }
    match yaml_as_f64(value) {
        Some(val) => Ok(Some(val)),
        None => Err(TransitError::Config(format!("{} must be a number", key))),
    }
}

fn get_usize(yaml_cfg: &Yaml, key: &str) -> Result<Option<usize>, TransitError> {
    let value = &yaml_cfg[key];
    if value.is_badvalue() {
        return Ok(None);
    }
    match value.as_i64() {
        Some(val) if val >= 0 => Ok(Some(val as usize)),
        _ => Err(TransitError::Config(format!("{} must be a non-negative integer", key))),
    }
}
