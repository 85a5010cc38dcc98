// src/config.rs

use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use thiserror::Error;

use crate::color::Color;
use crate::geometry::PolygonTemplate;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open config file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("config line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Resolved run configuration. Built once at startup from the defaults and
/// an optional config file; immutable afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub winres: Vec2,
    pub window_title: String,
    pub seed: u64,
    pub max_fps: u32,
    pub bg_color: Color,
    pub outline_color: Color,
    pub outline_size: f32,
    pub transition_smoothness: f32,
    pub polygon_colors: Vec<Color>,
    pub polygon_count: u32,
    pub min_size: f32,
    pub max_size: f32,
    pub print_every: u64,
    pub template: PolygonTemplate,
    pub tick_updates: bool,
}

impl Default for Config {
    fn default() -> Self {
        let template = PolygonTemplate::new(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(-1.0, 1.5),
            Vec2::new(1.1, 1.0),
            Vec2::new(1.5, -1.1),
            Vec2::new(3.0, -3.0),
        ])
        .unwrap_or_else(|_| unreachable!("default template is valid"));

        Self {
            winres: Vec2::new(1920.0, 1080.0),
            window_title: "poly-outline".to_string(),
            seed: 0,
            max_fps: 60,
            bg_color: Color::new(0xdb, 0xdb, 0xdb, 0xff),
            outline_color: Color::new(0x48, 0x48, 0x48, 0xff),
            outline_size: 2.5,
            transition_smoothness: 0.5,
            polygon_colors: vec![
                Color::new(0x3c, 0xa4, 0xcb, 0xff),
                Color::new(0x8a, 0xbc, 0x3f, 0xff),
                Color::new(0xe0, 0x3e, 0x41, 0xff),
                Color::new(0xcc, 0x66, 0x9c, 0xff),
            ],
            polygon_count: 100,
            min_size: 2.0,
            max_size: 50.0,
            print_every: 200,
            template,
            tick_updates: true,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses the line-oriented config format: one directive per line, blank
    /// lines and `//` comments ignored, unknown tokens warned about and
    /// skipped. Starts from the defaults, so a partial file only overrides
    /// what it names.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        for (line_index, raw_line) in text.lines().enumerate() {
            let line_no = line_index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let token = tokens.next().unwrap_or_default();
            let rest: Vec<&str> = tokens.collect();

            match token {
                "winres" => {
                    let [w, h] = parse_args::<f32, 2>(line_no, token, &rest)?;
                    config.winres = Vec2::new(w, h);
                }
                "window_title" => {
                    // Everything after the token, verbatim (titles may
                    // contain spaces).
                    config.window_title = line[token.len()..].trim().to_string();
                }
                "seed" => {
                    config.seed = parse_arg(line_no, token, &rest)?;
                }
                "max_fps" => {
                    config.max_fps = parse_arg(line_no, token, &rest)?;
                }
                "bgColor" => {
                    config.bg_color = parse_color(line_no, token, &rest)?;
                }
                "outlineColor" => {
                    config.outline_color = parse_color(line_no, token, &rest)?;
                }
                "outlineSize" => {
                    config.outline_size = parse_arg(line_no, token, &rest)?;
                }
                "transitionSmoothness" => {
                    config.transition_smoothness = parse_arg(line_no, token, &rest)?;
                }
                "polygonColors" => {
                    // Appends to the palette, matching the tool this one
                    // descends from; the defaults are never displaced.
                    for arg in &rest {
                        config.polygon_colors.push(
                            arg.parse().map_err(|e| ConfigError::Parse {
                                line: line_no,
                                message: format!("{token}: {e}"),
                            })?,
                        );
                    }
                }
                "polygonCount" => {
                    config.polygon_count = parse_arg(line_no, token, &rest)?;
                }
                "minSize" => {
                    config.min_size = parse_arg(line_no, token, &rest)?;
                }
                "maxSize" => {
                    config.max_size = parse_arg(line_no, token, &rest)?;
                }
                "print_every" => {
                    config.print_every = parse_arg(line_no, token, &rest)?;
                }
                "vertices" => {
                    let mut points = Vec::with_capacity(rest.len());
                    for arg in &rest {
                        points.push(parse_point(arg).map_err(|message| {
                            ConfigError::Parse {
                                line: line_no,
                                message: format!("{token}: {message}"),
                            }
                        })?);
                    }
                    config.template =
                        PolygonTemplate::new(points).map_err(|e| ConfigError::Parse {
                            line: line_no,
                            message: format!("{token}: {e}"),
                        })?;
                }
                "tick_updates" => {
                    let flag: u8 = parse_arg(line_no, token, &rest)?;
                    config.tick_updates = flag != 0;
                }
                _ => {
                    log::warn!("config line {line_no}: skipping unknown token {token:?}");
                }
            }
        }

        Ok(config)
    }

    /// Seconds per frame when pacing is enabled; `None` when `max_fps` is 0.
    pub fn frame_interval(&self) -> Option<std::time::Duration> {
        if self.max_fps == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs_f64(
                1.0 / f64::from(self.max_fps),
            ))
        }
    }
}

fn parse_arg<T: FromStr>(line: usize, token: &str, rest: &[&str]) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let [value] = parse_args::<T, 1>(line, token, rest)?;
    Ok(value)
}

fn parse_args<T: FromStr, const N: usize>(
    line: usize,
    token: &str,
    rest: &[&str],
) -> Result<[T; N], ConfigError>
where
    T::Err: std::fmt::Display,
{
    if rest.len() < N {
        return Err(ConfigError::Parse {
            line,
            message: format!("{token}: expected {N} value(s), got {}", rest.len()),
        });
    }
    let mut values = Vec::with_capacity(N);
    for arg in &rest[..N] {
        values.push(arg.parse::<T>().map_err(|e| ConfigError::Parse {
            line,
            message: format!("{token}: invalid value {arg:?}: {e}"),
        })?);
    }
    match values.try_into() {
        Ok(array) => Ok(array),
        Err(_) => unreachable!("length checked above"),
    }
}

fn parse_color(line: usize, token: &str, rest: &[&str]) -> Result<Color, ConfigError> {
    let arg = rest.first().ok_or_else(|| ConfigError::Parse {
        line,
        message: format!("{token}: expected a color"),
    })?;
    arg.parse().map_err(|e| ConfigError::Parse {
        line,
        message: format!("{token}: {e}"),
    })
}

/// One template point: cartesian `x,y` or polar `p<r>,<theta_degrees>`.
fn parse_point(token: &str) -> Result<Vec2, String> {
    let (text, polar) = match token.strip_prefix('p') {
        Some(stripped) => (stripped, true),
        None => (token, false),
    };
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated values in {token:?}"))?;
    let a: f32 = a
        .parse()
        .map_err(|_| format!("invalid number {a:?} in {token:?}"))?;
    let b: f32 = b
        .parse()
        .map_err(|_| format!("invalid number {b:?} in {token:?}"))?;

    if polar {
        let theta = b.to_radians();
        Ok(Vec2::new(a * theta.cos(), a * theta.sin()))
    } else {
        Ok(Vec2::new(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sample_file() {
        let text = "\
// demo config
winres 1280 720
window_title Spinning Field
seed 42
max_fps 144

bgColor #000000ff
outlineColor #ff0000ff
outlineSize 3.5
transitionSmoothness 1.0
polygonColors #3ca4cbff #8abc3fff
polygonCount 500
minSize 4
maxSize 12
print_every 100
vertices 0,0 1,0 1,1 0,1
tick_updates 0
";
        let config = Config::parse(text).unwrap();
        assert_eq!(config.winres, Vec2::new(1280.0, 720.0));
        assert_eq!(config.window_title, "Spinning Field");
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_fps, 144);
        assert_eq!(config.bg_color, Color::new(0, 0, 0, 255));
        assert_eq!(config.outline_color, Color::new(255, 0, 0, 255));
        assert_eq!(config.outline_size, 3.5);
        assert_eq!(config.transition_smoothness, 1.0);
        // The palette directive appends to the four defaults.
        assert_eq!(config.polygon_colors.len(), 6);
        assert_eq!(
            config.polygon_colors[4],
            Color::new(0x3c, 0xa4, 0xcb, 0xff)
        );
        assert_eq!(config.polygon_count, 500);
        assert_eq!(config.min_size, 4.0);
        assert_eq!(config.max_size, 12.0);
        assert_eq!(config.print_every, 100);
        assert_eq!(config.template.len(), 4);
        assert!(!config.tick_updates);
    }

    #[test]
    fn polar_point_converts_to_cartesian() {
        let v = parse_point("p10,90").unwrap();
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 10.0).abs() < 1e-5);

        let v = parse_point("p2,0").unwrap();
        assert!((v.x - 2.0).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
    }

    #[test]
    fn unknown_token_is_skipped_not_fatal() {
        let config = Config::parse("frobnicate 12\npolygonCount 7\n").unwrap();
        assert_eq!(config.polygon_count, 7);
    }

    #[test]
    fn malformed_number_is_a_parse_error() {
        let err = Config::parse("polygonCount many\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn missing_argument_is_a_parse_error() {
        let err = Config::parse("winres 1920\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn bad_hex_color_is_a_parse_error() {
        let err = Config::parse("bgColor #dbdbdb\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn degenerate_vertices_are_rejected() {
        let err = Config::parse("vertices 0,0 1,1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let config = Config::parse("\n// polygonCount 9\n\nseed 3\n").unwrap();
        assert_eq!(config.polygon_count, Config::default().polygon_count);
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn frame_interval_handles_unlimited() {
        let mut config = Config::default();
        config.max_fps = 60;
        let dt = config.frame_interval().unwrap();
        assert!((dt.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
        config.max_fps = 0;
        assert!(config.frame_interval().is_none());
    }
}
