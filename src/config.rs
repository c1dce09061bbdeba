//! Mechanism for loading and sharing the histogramming configuration

use crate::{numeric::Float, tla::format_threshold, Result};

use eyre::{ensure, format_err, WrapErr};

use std::{collections::HashSet, fs, path::Path, str::FromStr};

/// Selection of the optional histogram groups, decoded from a detail string
///
/// The detail string is a whitespace-separated list of tokens. Tokens that
/// are not understood are ignored, since a single detail string is usually
/// shared between several histogram groups.
///
/// - `kinematic` adds momentum components and transverse energy
/// - `NLeading<N>` adds per-rank copies for the N leading particles
/// - `TLA` adds the trigger-level analysis dijet histograms
/// - `TLA_leadPts=`, `TLA_subleadPts=`, `TLA_mjjs=`, `TLA_yStars=` and
///   `TLA_yStarAntis=` take comma-separated TLA region thresholds
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfoSwitch {
    kinematic: bool,
    num_leading: usize,
    tla: bool,
    tla_thresholds: TlaThresholds,
}

/// Thresholds defining the grid of TLA regions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TlaThresholds {
    /// Cuts on the leading particle pT (GeV)
    pub lead_pts: Vec<Float>,

    /// Cuts on the subleading particle pT (GeV)
    pub sublead_pts: Vec<Float>,

    /// Cuts on the dijet invariant mass (GeV)
    pub mjjs: Vec<Float>,

    /// Upper cuts on |y*|
    pub y_stars: Vec<Float>,

    /// Lower cuts on |y*|
    pub y_star_antis: Vec<Float>,
}
//
impl TlaThresholds {
    /// Number of distinct TLA regions these thresholds define
    pub fn num_regions(&self) -> usize {
        self.lead_pts.len()
            * self.sublead_pts.len()
            * self.mjjs.len()
            * (self.y_stars.len() + self.y_star_antis.len())
    }
}

impl InfoSwitch {
    /// Decode a detail string
    pub fn parse(detail_str: &str) -> Result<Self> {
        let mut switch = Self::default();
        for token in detail_str.split_whitespace() {
            if token == "kinematic" {
                switch.kinematic = true;
            } else if token == "TLA" {
                switch.tla = true;
            } else if let Some(count) = token.strip_prefix("NLeading") {
                switch.num_leading = ConfigItem::new("NLeading", count).parse()?;
            } else if let Some((key, values)) = token.split_once('=') {
                let thresholds = &mut switch.tla_thresholds;
                let (name, target) = match key {
                    "TLA_leadPts" => ("TLA_leadPts", &mut thresholds.lead_pts),
                    "TLA_subleadPts" => ("TLA_subleadPts", &mut thresholds.sublead_pts),
                    "TLA_mjjs" => ("TLA_mjjs", &mut thresholds.mjjs),
                    "TLA_yStars" => ("TLA_yStars", &mut thresholds.y_stars),
                    "TLA_yStarAntis" => ("TLA_yStarAntis", &mut thresholds.y_star_antis),
                    _ => continue,
                };
                *target = parse_thresholds(name, values)?;
            }
        }
        Ok(switch)
    }

    /// Truth that momentum components and transverse energy are histogrammed
    pub fn kinematic(&self) -> bool {
        self.kinematic
    }

    /// Number of leading particles which get their own histograms
    pub fn num_leading(&self) -> usize {
        self.num_leading
    }

    /// Truth that trigger-level analysis histograms are enabled
    pub fn tla(&self) -> bool {
        self.tla
    }

    /// Thresholds of the TLA regions
    pub fn tla_thresholds(&self) -> &TlaThresholds {
        &self.tla_thresholds
    }
}

/// Decode a comma-separated threshold list
///
/// Thresholds end up in histogram names, so two values which render the same
/// would lead to a name collision and are rejected here.
///
fn parse_thresholds(key: &'static str, values: &str) -> Result<Vec<Float>> {
    let mut names = HashSet::new();
    values
        .split(',')
        .filter(|value| !value.is_empty())
        .map(|value| -> Result<Float> {
            let threshold = ConfigItem::new(key, value).parse::<Float>()?;
            ensure!(
                threshold.is_finite(),
                "Threshold {} of {} is not finite",
                value,
                key
            );
            ensure!(
                names.insert(format_threshold(threshold)),
                "Threshold {} appears twice in {}",
                value,
                key
            );
            Ok(threshold)
        })
        .collect()
}

/// Configuration line standing for an empty item
const EMPTY_ITEM: &str = "-";

/// Configuration of a histogramming run of the command-line driver
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfiguration {
    /// Name of the histogram group, prepended to all full histogram names
    pub name: String,

    /// Prefix of the basic histogram names
    pub prefix: String,

    /// Human-readable name of the particles, used in axis labels
    pub title: String,

    /// Detail string selecting the optional histogram groups
    pub detail_str: String,
}
//
impl RunConfiguration {
    /// Load the configuration from a file and print it out
    ///
    /// The configuration items are the first four non-blank lines of the
    /// file, taken whole since titles and detail strings contain spaces. A
    /// line holding only `-` stands for an empty item, e.g. no name prefix.
    ///
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Failed to read {}", file_name.display()))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode the configuration items from the contents of a file
    pub fn parse(config_str: &str) -> Result<Self> {
        let mut config_iter = config_str
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());

        // This closure fetches the next configuration item, handling
        // unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<String> {
            config_iter
                .next()
                .map(|line| match line {
                    EMPTY_ITEM => String::new(),
                    _ => line.to_owned(),
                })
                .ok_or_else(|| format_err!("Missing configuration of {}", name))
        };

        let config = Self {
            name: next_item("name")?,
            prefix: next_item("prefix")?,
            title: next_item("title")?,
            detail_str: next_item("detail_str")?,
        };

        // Check the detail string right away, for better error reporting
        InfoSwitch::parse(&config.detail_str).wrap_err("Invalid detail string")?;
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("NAME       : {}", self.name);
        println!("PREFIX     : {}", self.prefix);
        println!("TITLE      : {}", self.title);
        println!("DETAIL     : {}", self.detail_str);
    }
}

/// A value from a configuration source, tagged with the setting which it is
/// supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a setting tag and raw data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: ::std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detail_string() {
        let switch = InfoSwitch::parse("").unwrap();
        assert!(!switch.kinematic());
        assert_eq!(switch.num_leading(), 0);
        assert!(!switch.tla());
        assert_eq!(switch.tla_thresholds().num_regions(), 0);
    }

    #[test]
    fn full_detail_string() {
        let switch = InfoSwitch::parse(
            "kinematic clean NLeading4 TLA TLA_leadPts=200,250 TLA_subleadPts=150 \
             TLA_mjjs=500,600,700 TLA_yStars=0.3,0.6 TLA_yStarAntis=0.6 other=1",
        )
        .unwrap();
        assert!(switch.kinematic());
        assert_eq!(switch.num_leading(), 4);
        assert!(switch.tla());
        let thresholds = switch.tla_thresholds();
        assert_eq!(thresholds.lead_pts, vec![200., 250.]);
        assert_eq!(thresholds.sublead_pts, vec![150.]);
        assert_eq!(thresholds.mjjs, vec![500., 600., 700.]);
        assert_eq!(thresholds.y_stars, vec![0.3, 0.6]);
        assert_eq!(thresholds.y_star_antis, vec![0.6]);
        assert_eq!(thresholds.num_regions(), 2 * 3 * 3);
    }

    #[test]
    fn bad_thresholds() {
        assert!(InfoSwitch::parse("NLeadingfour").is_err());
        assert!(InfoSwitch::parse("TLA_mjjs=500,abc").is_err());
        assert!(InfoSwitch::parse("TLA_mjjs=inf").is_err());
        assert!(InfoSwitch::parse("TLA_yStars=0.1,0.10").is_err());
    }

    #[test]
    fn run_configuration() {
        let config =
            RunConfiguration::parse("jets/\n\n  jet_\nAntiKt4 jet\nkinematic NLeading2\n")
                .unwrap();
        assert_eq!(config.name, "jets/");
        assert_eq!(config.prefix, "jet_");
        assert_eq!(config.title, "AntiKt4 jet");
        assert_eq!(config.detail_str, "kinematic NLeading2");
        assert!(RunConfiguration::parse("jets/\njet_\n").is_err());
        let config = RunConfiguration::parse("-\n-\njet\n-\n").unwrap();
        assert_eq!(config.name, "");
        assert_eq!(config.prefix, "");
        assert_eq!(config.title, "jet");
        assert_eq!(config.detail_str, "");
        assert!(RunConfiguration::parse("a\nb\nc\nNLeadingx\n").is_err());
    }
}
